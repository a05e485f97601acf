// src/domains/export/table.rs
//
// Flat tabular projection of a record set: one summary row per record and
// one detail row per (record, stage) pair. Pure transform over its inputs;
// serializing the same collection twice yields identical output.

use crate::domains::export::csv_record::{csv_date_to_string, CsvRecord};
use crate::domains::municipality::MunicipalityDirectory;
use crate::domains::record::types::MaintenanceRecord;
use serde::Serialize;

/// Placeholder rendered when a municipality reference cannot be resolved.
/// A recoverable condition, not an error.
pub const UNRESOLVED: &str = "N/A";

/// One row per record on the summary sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub id: String,
    pub date: String,
    pub municipality: String,
    pub region: String,
    pub technician: String,
    pub service: String,
    pub nature: String,
    pub status: String,
    pub description: String,
}

impl CsvRecord for SummaryRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "ID",
            "Data",
            "Município",
            "Região",
            "Técnico",
            "Serviço",
            "Natureza",
            "Status",
            "Resumo Geral",
        ]
    }

    fn to_csv(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.date.clone(),
            self.municipality.clone(),
            self.region.clone(),
            self.technician.clone(),
            self.service.clone(),
            self.nature.clone(),
            self.status.clone(),
            self.description.clone(),
        ]
    }
}

/// One row per (record, stage) pair on the detail sheet. Carries the record
/// id so the two sheets stay joinable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDetailRow {
    pub record_id: String,
    pub date: String,
    pub location: String,
    pub stage: String,
    pub stage_description: String,
    pub evidence_count: usize,
}

impl CsvRecord for StageDetailRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "ID Manutenção",
            "Data",
            "Local",
            "Etapa",
            "Descrição da Etapa",
            "Qtd Fotos",
        ]
    }

    fn to_csv(&self) -> Vec<String> {
        vec![
            self.record_id.clone(),
            self.date.clone(),
            self.location.clone(),
            self.stage.clone(),
            self.stage_description.clone(),
            self.evidence_count.to_string(),
        ]
    }
}

/// The tabular report: summary and detail sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    pub summary_rows: Vec<SummaryRow>,
    pub detail_rows: Vec<StageDetailRow>,
}

/// Projects the record set into its tabular form, resolving municipality
/// references through the directory.
pub fn to_table(
    records: &[MaintenanceRecord],
    directory: &MunicipalityDirectory,
) -> TableReport {
    let mut summary_rows = Vec::with_capacity(records.len());
    let mut detail_rows = Vec::new();

    for record in records {
        let municipality = directory.find(&record.municipality_id);
        let municipality_name = municipality
            .map(|m| m.name.clone())
            .unwrap_or_else(|| UNRESOLVED.to_string());
        let region = municipality
            .map(|m| m.region.display_name().to_string())
            .unwrap_or_else(|| UNRESOLVED.to_string());

        summary_rows.push(SummaryRow {
            id: record.id.to_string(),
            date: csv_date_to_string(&record.date),
            municipality: municipality_name.clone(),
            region,
            technician: record.technician.clone(),
            service: record.display_title().to_string(),
            nature: record.display_nature().to_string(),
            status: record.status.as_str().to_string(),
            description: record.description.clone(),
        });

        for stage in &record.stages {
            detail_rows.push(StageDetailRow {
                record_id: record.id.to_string(),
                date: csv_date_to_string(&record.date),
                location: municipality_name.clone(),
                stage: stage.name.clone(),
                stage_description: stage.description.clone(),
                evidence_count: stage.evidence_count(),
            });
        }
    }

    TableReport {
        summary_rows,
        detail_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::record::repository::RecordRepository;
    use crate::domains::record::types::{
        EvidenceSlot, ImageData, MaintenanceImage, MaintenanceNature, Nature,
        NewMaintenanceRecord, ServiceTitle, ServiceType,
    };

    fn repo_with_one_record(municipality: &str) -> RecordRepository {
        let mut repo = RecordRepository::new();
        repo.create(NewMaintenanceRecord {
            municipality_id: municipality.to_string(),
            title: ServiceTitle::Standard(ServiceType::Type50A),
            nature: Nature::Standard(MaintenanceNature::PreventiveProgrammed),
            description: "Limpeza e reaperto.".to_string(),
            date: None,
            status: None,
            technician: Some("João Silva".to_string()),
            stages: None,
        })
        .unwrap();
        repo
    }

    #[test]
    fn test_summary_and_detail_rows() {
        let repo = repo_with_one_record("m1");
        let report = to_table(repo.list(), &MunicipalityDirectory::amazonas());

        assert_eq!(report.summary_rows.len(), 1);
        let summary = &report.summary_rows[0];
        assert_eq!(summary.municipality, "Tabatinga");
        assert_eq!(summary.region, "Rio Solimões");
        assert_eq!(summary.service, "Serviço tipo 50A");
        assert_eq!(summary.status, "PENDING");

        // One detail row per stage, joinable on the record id.
        assert_eq!(report.detail_rows.len(), 3);
        assert!(report.detail_rows.iter().all(|d| d.record_id == summary.id));
        assert_eq!(report.detail_rows[0].stage, "Inspeção Inicial");
    }

    #[test]
    fn test_unresolved_municipality_renders_na() {
        let repo = repo_with_one_record("m999");
        let report = to_table(repo.list(), &MunicipalityDirectory::amazonas());
        assert_eq!(report.summary_rows[0].municipality, UNRESOLVED);
        assert_eq!(report.summary_rows[0].region, UNRESOLVED);
        assert_eq!(report.detail_rows[0].location, UNRESOLVED);
    }

    #[test]
    fn test_evidence_count_per_stage() {
        let mut repo = repo_with_one_record("m1");
        let record_id = repo.list()[0].id;
        let stage_id = repo.list()[0].stages[0].id;
        repo.attach_evidence(
            record_id,
            stage_id,
            EvidenceSlot::Before,
            MaintenanceImage::new(ImageData::new("image/jpeg", vec![0xFF, 0xD8])),
        )
        .unwrap();
        repo.attach_evidence(
            record_id,
            stage_id,
            EvidenceSlot::After,
            MaintenanceImage::new(ImageData::new("image/jpeg", vec![0xFF, 0xD8])),
        )
        .unwrap();

        let report = to_table(repo.list(), &MunicipalityDirectory::amazonas());
        assert_eq!(report.detail_rows[0].evidence_count, 2);
        assert_eq!(report.detail_rows[1].evidence_count, 0);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let repo = repo_with_one_record("m1");
        let directory = MunicipalityDirectory::amazonas();
        assert_eq!(to_table(repo.list(), &directory), to_table(repo.list(), &directory));
    }
}
