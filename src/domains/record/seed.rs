// src/domains/record/seed.rs

use crate::domains::record::types::{
    MaintenanceNature, MaintenanceRecord, MaintenanceStage, MaintenanceStatus, Nature,
    ServiceTitle, ServiceType,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

/// Demo records loaded into a fresh repository. Evidence slots start empty:
/// payloads are opaque byte buffers attached by technicians, not remote URLs.
pub fn initial_records() -> Vec<MaintenanceRecord> {
    vec![MaintenanceRecord {
        id: Uuid::new_v4(),
        municipality_id: "m1".to_string(),
        title: ServiceTitle::Standard(ServiceType::Type50A),
        nature: Nature::Standard(MaintenanceNature::PreventiveProgrammed),
        description:
            "Manutenção preventiva semestral realizada nos ativos de alta tensão em Tabatinga."
                .to_string(),
        date: NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid seed date"),
        status: MaintenanceStatus::Completed,
        stages: vec![
            MaintenanceStage::new(
                "Inspeção Inicial",
                "Verificação inicial do transformador TX-01 antes da limpeza e reaperto. \
                 Presença de fuligem nos isoladores.",
            ),
            MaintenanceStage::new(
                "Execução Técnica",
                "Realizado reaperto de conexões e limpeza química dos barramentos.",
            ),
        ],
        technician: "João Silva".to_string(),
        ai_notes: None,
        legacy_file_name: None,
        created_at: Utc::now(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::municipality::MunicipalityDirectory;
    use crate::domains::record::types::validate_record;

    #[test]
    fn test_seed_records_are_valid() {
        let directory = MunicipalityDirectory::amazonas();
        let records = initial_records();
        assert!(!records.is_empty());
        for record in &records {
            validate_record(record, &directory).unwrap();
        }
    }

    #[test]
    fn test_seed_record_shape() {
        let records = initial_records();
        let first = &records[0];
        assert_eq!(first.municipality_id, "m1");
        assert_eq!(first.status, MaintenanceStatus::Completed);
        assert_eq!(first.stages.len(), 2);
        assert_eq!(first.stages[0].name, "Inspeção Inicial");
        assert_eq!(first.total_evidence(), 0);
    }
}
