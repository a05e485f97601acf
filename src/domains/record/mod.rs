pub mod projector;
pub mod repository;
pub mod seed;
pub mod service;
pub mod types;

pub use projector::{DashboardStats, ReportCriteria, StatusPartition, TabCounts};
pub use repository::RecordRepository;
pub use service::RecordService;
pub use types::{
    EvidenceSlot, ImageData, MaintenanceImage, MaintenanceNature, MaintenanceRecord,
    MaintenanceStage, MaintenanceStatus, Nature, NewMaintenanceRecord, ServiceTitle, ServiceType,
    UpdateMaintenanceRecord,
};
