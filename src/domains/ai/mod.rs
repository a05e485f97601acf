pub mod client;
pub mod service;
pub mod types;

pub use client::{AiBridge, GeminiClient};
pub use service::AiAssistant;
pub use types::{AiConfig, AiError, AiOutcome};
