// src/domains/record/repository.rs

use crate::domains::record::types::{
    EvidenceSlot, MaintenanceImage, MaintenanceRecord, MaintenanceStage, MaintenanceStatus,
    NewMaintenanceRecord, ServiceTitle, UpdateMaintenanceRecord, CLONE_MARKER,
    DEFAULT_TECHNICIAN,
};
use crate::errors::{DomainError, DomainResult};
use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

/// In-memory authoritative collection of maintenance records.
///
/// Constructed once per process and injected into whatever layer needs it;
/// mutations are synchronous and atomic with respect to the single execution
/// context. Newest records sit at the front: most-recent-first ordering is a
/// product decision, not incidental.
#[derive(Debug, Default)]
pub struct RecordRepository {
    records: Vec<MaintenanceRecord>,
}

impl RecordRepository {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Loads an initial record set, preserving the given order.
    pub fn with_records(records: Vec<MaintenanceRecord>) -> Self {
        Self { records }
    }

    /// The default three-stage template for a blank record.
    pub fn default_stages() -> Vec<MaintenanceStage> {
        vec![
            MaintenanceStage::new("Inspeção Inicial", ""),
            MaintenanceStage::new("Execução Técnica", ""),
            MaintenanceStage::new("Finalização", ""),
        ]
    }

    /// Creates a record from the DTO, assigning a fresh id and filling
    /// unspecified fields with their documented defaults.
    pub fn create(&mut self, new: NewMaintenanceRecord) -> DomainResult<MaintenanceRecord> {
        let record = MaintenanceRecord {
            id: Uuid::new_v4(),
            municipality_id: new.municipality_id,
            title: new.title,
            nature: new.nature,
            description: new.description,
            date: new.date.unwrap_or_else(|| Utc::now().date_naive()),
            status: new.status.unwrap_or(MaintenanceStatus::Pending),
            stages: new.stages.unwrap_or_else(Self::default_stages),
            technician: new
                .technician
                .unwrap_or_else(|| DEFAULT_TECHNICIAN.to_string()),
            ai_notes: None,
            legacy_file_name: None,
            created_at: Utc::now(),
        };
        info!(
            "created maintenance record {} at municipality {}",
            record.id, record.municipality_id
        );
        self.records.insert(0, record.clone());
        Ok(record)
    }

    /// Merges the supplied fields over the stored record. The id and the
    /// creation timestamp are not part of the DTO and cannot change.
    pub fn update(
        &mut self,
        id: Uuid,
        patch: UpdateMaintenanceRecord,
    ) -> DomainResult<MaintenanceRecord> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DomainError::EntityNotFound("maintenance record".to_string(), id))?;

        if let Some(municipality_id) = patch.municipality_id {
            record.municipality_id = municipality_id;
        }
        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(nature) = patch.nature {
            record.nature = nature;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(date) = patch.date {
            record.date = date;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(technician) = patch.technician {
            record.technician = technician;
        }
        if let Some(stages) = patch.stages {
            record.stages = stages;
        }
        if let Some(ai_notes) = patch.ai_notes {
            record.ai_notes = ai_notes;
        }
        debug!("updated maintenance record {}", id);
        Ok(record.clone())
    }

    /// Removes the record, cascading over its stages and images (ownership is
    /// structural, nothing can outlive the record). Irreversible.
    pub fn remove(&mut self, id: Uuid) -> DomainResult<MaintenanceRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DomainError::EntityNotFound("maintenance record".to_string(), id))?;
        let removed = self.records.remove(index);
        info!(
            "removed maintenance record {} ({} stages, {} evidence photos)",
            id,
            removed.stages.len(),
            removed.total_evidence()
        );
        Ok(removed)
    }

    /// Clones an existing record: fresh id, status reset to pending, title
    /// marked as a copy, date reset to today. Everything else is carried over.
    pub fn clone_record(&mut self, id: Uuid) -> DomainResult<MaintenanceRecord> {
        let source = self.get(id)?.clone();
        let copy = MaintenanceRecord {
            id: Uuid::new_v4(),
            title: ServiceTitle::Custom(format!("{}{}", source.display_title(), CLONE_MARKER)),
            status: MaintenanceStatus::Pending,
            date: Utc::now().date_naive(),
            created_at: Utc::now(),
            ..source
        };
        info!("cloned maintenance record {} into {}", id, copy.id);
        self.records.insert(0, copy.clone());
        Ok(copy)
    }

    pub fn find(&self, id: Uuid) -> Option<&MaintenanceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get(&self, id: Uuid) -> DomainResult<&MaintenanceRecord> {
        self.find(id)
            .ok_or_else(|| DomainError::EntityNotFound("maintenance record".to_string(), id))
    }

    /// All records in repository order (most recent first).
    pub fn list(&self) -> &[MaintenanceRecord] {
        &self.records
    }

    /// Records matching the predicate, preserving repository order.
    pub fn list_where<P>(&self, predicate: P) -> Vec<&MaintenanceRecord>
    where
        P: Fn(&MaintenanceRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Places evidence into a stage slot, returning the image it replaced.
    pub fn attach_evidence(
        &mut self,
        record_id: Uuid,
        stage_id: Uuid,
        slot: EvidenceSlot,
        image: MaintenanceImage,
    ) -> DomainResult<Option<MaintenanceImage>> {
        let stage = self.stage_mut(record_id, stage_id)?;
        let replaced = stage.set_slot(slot, image);
        debug!(
            "attached evidence to record {} stage {} slot {}",
            record_id, stage_id, slot
        );
        Ok(replaced)
    }

    /// Clears a stage slot, destroying the image's ownership link.
    pub fn remove_evidence(
        &mut self,
        record_id: Uuid,
        stage_id: Uuid,
        slot: EvidenceSlot,
    ) -> DomainResult<Option<MaintenanceImage>> {
        let stage = self.stage_mut(record_id, stage_id)?;
        let removed = stage.clear_slot(slot);
        debug!(
            "cleared evidence on record {} stage {} slot {}",
            record_id, stage_id, slot
        );
        Ok(removed)
    }

    fn stage_mut(&mut self, record_id: Uuid, stage_id: Uuid) -> DomainResult<&mut MaintenanceStage> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| {
                DomainError::EntityNotFound("maintenance record".to_string(), record_id)
            })?;
        record
            .find_stage_mut(stage_id)
            .ok_or_else(|| DomainError::EntityNotFound("maintenance stage".to_string(), stage_id))
    }
}
