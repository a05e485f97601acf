// Public modules
pub mod domains;
pub mod errors;
pub mod validation;

/// Initialize env_logger once for binaries and integration harnesses that
/// embed the library. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::builder().try_init();
}
