// src/domains/ai/types.rs

use crate::domains::record::types::{EvidenceSlot, MaintenanceImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failures of the external generative service. Always non-fatal to the
/// record being edited; callers convert them into transient notices.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("Nenhuma imagem gerada pela IA")]
    NoImageProduced,
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Unavailable(err.to_string())
    }
}

/// Connection settings for the generative service, read from the
/// environment. The core never needs this; only the HTTP client does.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub endpoint: String,
}

impl AiConfig {
    pub const DEFAULT_TEXT_MODEL: &'static str = "gemini-3-flash-preview";
    pub const DEFAULT_IMAGE_MODEL: &'static str = "gemini-2.5-flash-image";
    pub const DEFAULT_ENDPOINT: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";

    /// Reads `GEMINI_API_KEY` (or legacy `API_KEY`) plus optional model and
    /// endpoint overrides from the environment.
    pub fn from_env() -> Result<Self, AiError> {
        dotenv::dotenv().ok();
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| AiError::Unavailable("GEMINI_API_KEY is not set".to_string()))?;
        Ok(Self {
            api_key,
            text_model: std::env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| Self::DEFAULT_TEXT_MODEL.to_string()),
            image_model: std::env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| Self::DEFAULT_IMAGE_MODEL.to_string()),
            endpoint: std::env::var("GEMINI_ENDPOINT")
                .unwrap_or_else(|_| Self::DEFAULT_ENDPOINT.to_string()),
        })
    }
}

/// Result message produced by an asynchronous AI call, tagged with the ids of
/// its target. The consumer checks the target still exists before applying;
/// a stale outcome is dropped, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AiOutcome {
    /// Analysis note attached to the whole record.
    RecordNotes { record_id: Uuid, notes: String },
    /// Reviewed replacement for the record's general description.
    RecordDescription { record_id: Uuid, text: String },
    /// Reviewed replacement for one stage's technical description.
    StageDescription {
        record_id: Uuid,
        stage_id: Uuid,
        text: String,
    },
    /// Generated evidence destined for one stage slot.
    GeneratedEvidence {
        record_id: Uuid,
        stage_id: Uuid,
        slot: EvidenceSlot,
        image: MaintenanceImage,
    },
}

impl AiOutcome {
    pub fn record_id(&self) -> Uuid {
        match self {
            AiOutcome::RecordNotes { record_id, .. }
            | AiOutcome::RecordDescription { record_id, .. }
            | AiOutcome::StageDescription { record_id, .. }
            | AiOutcome::GeneratedEvidence { record_id, .. } => *record_id,
        }
    }
}
