pub mod types;

pub use types::{Municipality, MunicipalityDirectory, Region};
