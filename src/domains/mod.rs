pub mod ai;
pub mod export;
pub mod municipality;
pub mod record;

pub use municipality::{Municipality, MunicipalityDirectory, Region};
pub use record::{MaintenanceRecord, RecordRepository, RecordService};
