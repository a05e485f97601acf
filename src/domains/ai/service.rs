// src/domains/ai/service.rs

use crate::domains::ai::client::AiBridge;
use crate::domains::ai::types::{AiError, AiOutcome};
use crate::domains::record::types::{EvidenceSlot, ImageData, MaintenanceImage, MaintenanceRecord};
use log::debug;
use uuid::Uuid;

/// Wrapper over the AI bridge that produces target-tagged outcome messages.
///
/// Every operation here suspends; results come back as `AiOutcome` values the
/// record service applies only after re-checking the target still exists.
pub struct AiAssistant<B: AiBridge> {
    bridge: B,
}

impl<B: AiBridge> AiAssistant<B> {
    pub fn new(bridge: B) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Reviews free text. Input under 3 characters (trimmed) is returned
    /// unchanged without touching the bridge.
    pub async fn improve_text(&self, text: &str) -> Result<String, AiError> {
        if text.trim().len() < 3 {
            debug!("text too short for review, returning unchanged");
            return Ok(text.to_string());
        }
        self.bridge.improve_text(text).await
    }

    /// Reviewed general description for a record, as a deferred outcome.
    pub async fn improve_record_description(
        &self,
        record_id: Uuid,
        text: &str,
    ) -> Result<AiOutcome, AiError> {
        let improved = self.improve_text(text).await?;
        Ok(AiOutcome::RecordDescription {
            record_id,
            text: improved,
        })
    }

    /// Reviewed technical description for one stage, as a deferred outcome.
    pub async fn improve_stage_description(
        &self,
        record_id: Uuid,
        stage_id: Uuid,
        text: &str,
    ) -> Result<AiOutcome, AiError> {
        let improved = self.improve_text(text).await?;
        Ok(AiOutcome::StageDescription {
            record_id,
            stage_id,
            text: improved,
        })
    }

    /// Analysis of attached evidence, destined for the record's AI note.
    pub async fn analyze_evidence(
        &self,
        record_id: Uuid,
        image: &ImageData,
        context: &str,
    ) -> Result<AiOutcome, AiError> {
        let notes = self.bridge.analyze_image(image, context).await?;
        Ok(AiOutcome::RecordNotes { record_id, notes })
    }

    /// Generated evidence destined for one stage slot.
    pub async fn generate_evidence(
        &self,
        record_id: Uuid,
        stage_id: Uuid,
        slot: EvidenceSlot,
        prompt: &str,
    ) -> Result<AiOutcome, AiError> {
        let data = self.bridge.generate_image(prompt).await?;
        Ok(AiOutcome::GeneratedEvidence {
            record_id,
            stage_id,
            slot,
            image: MaintenanceImage::new(data),
        })
    }

    /// Executive summary over the full collection. Consumed directly by the
    /// dashboard; not record-targeted, so no outcome message.
    pub async fn summarize(&self, records: &[MaintenanceRecord]) -> Result<String, AiError> {
        self.bridge.generate_summary(records).await
    }
}
