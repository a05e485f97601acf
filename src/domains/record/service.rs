// src/domains/record/service.rs

use crate::domains::ai::types::AiOutcome;
use crate::domains::municipality::MunicipalityDirectory;
use crate::domains::record::repository::RecordRepository;
use crate::domains::record::types::{
    MaintenanceRecord, NewMaintenanceRecord, UpdateMaintenanceRecord,
};
use crate::errors::{DomainError, ServiceResult};
use crate::validation::Validate;
use log::{info, warn};
use uuid::Uuid;

/// Service for record-related operations: validated saves, the edit-session
/// contract, and application of deferred AI outcomes.
pub struct RecordService {
    repo: RecordRepository,
    directory: MunicipalityDirectory,
    editing: Option<Uuid>,
}

impl RecordService {
    pub fn new(repo: RecordRepository, directory: MunicipalityDirectory) -> Self {
        Self {
            repo,
            directory,
            editing: None,
        }
    }

    pub fn repository(&self) -> &RecordRepository {
        &self.repo
    }

    pub fn directory(&self) -> &MunicipalityDirectory {
        &self.directory
    }

    pub fn records(&self) -> &[MaintenanceRecord] {
        self.repo.list()
    }

    /// The record currently open for editing, if any.
    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn open_editor(&mut self, id: Uuid) -> ServiceResult<()> {
        self.repo.get(id)?;
        self.editing = Some(id);
        Ok(())
    }

    pub fn close_editor(&mut self) {
        self.editing = None;
    }

    /// Saves the form payload: updates the open record when an edit session
    /// is active, creates a new record otherwise. Either way the edit session
    /// ends afterwards.
    pub fn save(&mut self, form: NewMaintenanceRecord) -> ServiceResult<MaintenanceRecord> {
        let saved = match self.editing {
            Some(id) => self.update_record(id, patch_from_form(form))?,
            None => self.create_record(form)?,
        };
        self.close_editor();
        Ok(saved)
    }

    /// Creates a new record after validating the DTO and its municipality
    /// reference.
    pub fn create_record(&mut self, new: NewMaintenanceRecord) -> ServiceResult<MaintenanceRecord> {
        new.validate()?;
        self.check_municipality(&new.municipality_id)?;
        Ok(self.repo.create(new)?)
    }

    /// Applies a validated patch to an existing record.
    pub fn update_record(
        &mut self,
        id: Uuid,
        patch: UpdateMaintenanceRecord,
    ) -> ServiceResult<MaintenanceRecord> {
        patch.validate()?;
        if let Some(municipality_id) = &patch.municipality_id {
            self.check_municipality(municipality_id)?;
        }
        Ok(self.repo.update(id, patch)?)
    }

    /// Deletes a record. When the deleted record is the one open for editing
    /// the edit session is closed as well, so no dangling reference survives.
    pub fn delete(&mut self, id: Uuid) -> ServiceResult<()> {
        self.repo.remove(id)?;
        if self.editing == Some(id) {
            info!("deleted record {} was open for editing, closing editor", id);
            self.close_editor();
        }
        Ok(())
    }

    pub fn clone_record(&mut self, id: Uuid) -> ServiceResult<MaintenanceRecord> {
        Ok(self.repo.clone_record(id)?)
    }

    /// Merges an asynchronous AI result back into the collection. The target
    /// is re-checked first: outcomes for records or stages that no longer
    /// exist are dropped with a log line, never an error.
    pub fn apply_ai_outcome(&mut self, outcome: AiOutcome) -> bool {
        let record_id = outcome.record_id();
        if self.repo.find(record_id).is_none() {
            warn!(
                "dropping AI outcome for record {} which no longer exists",
                record_id
            );
            return false;
        }
        match outcome {
            AiOutcome::RecordNotes { record_id, notes } => {
                let patch = UpdateMaintenanceRecord {
                    ai_notes: Some(Some(notes)),
                    ..Default::default()
                };
                self.repo.update(record_id, patch).is_ok()
            }
            AiOutcome::RecordDescription { record_id, text } => {
                let patch = UpdateMaintenanceRecord {
                    description: Some(text),
                    ..Default::default()
                };
                self.repo.update(record_id, patch).is_ok()
            }
            AiOutcome::StageDescription {
                record_id,
                stage_id,
                text,
            } => self.patch_stage(record_id, stage_id, |stage| stage.description = text),
            AiOutcome::GeneratedEvidence {
                record_id,
                stage_id,
                slot,
                image,
            } => match self.repo.attach_evidence(record_id, stage_id, slot, image) {
                Ok(_) => true,
                Err(err) => {
                    warn!("dropping generated evidence: {}", err);
                    false
                }
            },
        }
    }

    fn patch_stage<F>(&mut self, record_id: Uuid, stage_id: Uuid, apply: F) -> bool
    where
        F: FnOnce(&mut crate::domains::record::types::MaintenanceStage),
    {
        let Some(record) = self.repo.find(record_id) else {
            return false;
        };
        let mut stages = record.stages.clone();
        let Some(stage) = stages.iter_mut().find(|s| s.id == stage_id) else {
            warn!(
                "dropping AI outcome for stage {} which no longer exists on record {}",
                stage_id, record_id
            );
            return false;
        };
        apply(stage);
        let patch = UpdateMaintenanceRecord {
            stages: Some(stages),
            ..Default::default()
        };
        self.repo.update(record_id, patch).is_ok()
    }

    fn check_municipality(&self, municipality_id: &str) -> ServiceResult<()> {
        if !self.directory.contains(municipality_id) {
            return Err(DomainError::IncompleteRecord(format!(
                "municipality '{}' does not exist",
                municipality_id
            ))
            .into());
        }
        Ok(())
    }
}

/// Whole-field update derived from the same payload the creation form
/// submits. The AI note is not form-editable and stays untouched.
fn patch_from_form(form: NewMaintenanceRecord) -> UpdateMaintenanceRecord {
    UpdateMaintenanceRecord {
        municipality_id: Some(form.municipality_id),
        title: Some(form.title),
        nature: Some(form.nature),
        description: Some(form.description),
        date: form.date,
        status: form.status,
        technician: form.technician,
        stages: form.stages,
        ai_notes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::record::types::{
        EvidenceSlot, ImageData, MaintenanceImage, MaintenanceNature, MaintenanceStatus, Nature,
        ServiceTitle, ServiceType,
    };
    use crate::errors::ServiceError;

    fn service() -> RecordService {
        RecordService::new(RecordRepository::new(), MunicipalityDirectory::amazonas())
    }

    fn form(municipality: &str) -> NewMaintenanceRecord {
        NewMaintenanceRecord {
            municipality_id: municipality.to_string(),
            title: ServiceTitle::Standard(ServiceType::Type50A),
            nature: Nature::Standard(MaintenanceNature::CorrectiveEmergency),
            description: "Religamento após queda de alimentador.".to_string(),
            date: None,
            status: None,
            technician: Some("João Silva".to_string()),
            stages: None,
        }
    }

    #[test]
    fn test_create_rejects_unknown_municipality() {
        let mut svc = service();
        let err = svc.create_record(form("m999")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::IncompleteRecord(_))
        ));
        assert!(svc.records().is_empty());
    }

    #[test]
    fn test_save_routes_through_edit_session() {
        let mut svc = service();
        let created = svc.save(form("m1")).unwrap();
        assert_eq!(svc.records().len(), 1);
        assert!(svc.editing().is_none());

        svc.open_editor(created.id).unwrap();
        let mut edited = form("m1");
        edited.status = Some(MaintenanceStatus::Completed);
        let saved = svc.save(edited).unwrap();

        // Same record updated in place, session closed after saving.
        assert_eq!(saved.id, created.id);
        assert_eq!(svc.records().len(), 1);
        assert_eq!(svc.records()[0].status, MaintenanceStatus::Completed);
        assert!(svc.editing().is_none());
    }

    #[test]
    fn test_delete_closes_open_edit_session() {
        let mut svc = service();
        let record = svc.save(form("m1")).unwrap();
        svc.open_editor(record.id).unwrap();
        assert_eq!(svc.editing(), Some(record.id));

        svc.delete(record.id).unwrap();
        assert!(svc.editing().is_none());
        assert!(svc.records().is_empty());
    }

    #[test]
    fn test_delete_other_record_keeps_session() {
        let mut svc = service();
        let open = svc.save(form("m1")).unwrap();
        let other = svc.save(form("m3")).unwrap();
        svc.open_editor(open.id).unwrap();

        svc.delete(other.id).unwrap();
        assert_eq!(svc.editing(), Some(open.id));
    }

    #[test]
    fn test_stale_ai_outcome_is_dropped() {
        let mut svc = service();
        let record = svc.save(form("m1")).unwrap();
        svc.delete(record.id).unwrap();

        let applied = svc.apply_ai_outcome(AiOutcome::RecordNotes {
            record_id: record.id,
            notes: "fuligem nos isoladores".to_string(),
        });
        assert!(!applied);
    }

    #[test]
    fn test_ai_outcome_applies_to_existing_targets() {
        let mut svc = service();
        let record = svc.save(form("m1")).unwrap();
        let stage_id = record.stages[0].id;

        assert!(svc.apply_ai_outcome(AiOutcome::RecordNotes {
            record_id: record.id,
            notes: "fuligem nos isoladores".to_string(),
        }));
        assert!(svc.apply_ai_outcome(AiOutcome::StageDescription {
            record_id: record.id,
            stage_id,
            text: "Inspeção concluída sem anomalias.".to_string(),
        }));
        assert!(svc.apply_ai_outcome(AiOutcome::GeneratedEvidence {
            record_id: record.id,
            stage_id,
            slot: EvidenceSlot::Before,
            image: MaintenanceImage::new(ImageData::new("image/jpeg", vec![0xFF, 0xD8])),
        }));

        let stored = svc.repository().get(record.id).unwrap();
        assert_eq!(stored.ai_notes.as_deref(), Some("fuligem nos isoladores"));
        assert_eq!(stored.stages[0].description, "Inspeção concluída sem anomalias.");
        assert_eq!(stored.stages[0].evidence_count(), 1);
    }

    #[test]
    fn test_ai_outcome_for_missing_stage_is_dropped() {
        let mut svc = service();
        let record = svc.save(form("m1")).unwrap();
        let applied = svc.apply_ai_outcome(AiOutcome::StageDescription {
            record_id: record.id,
            stage_id: Uuid::new_v4(),
            text: "texto".to_string(),
        });
        assert!(!applied);
    }
}
