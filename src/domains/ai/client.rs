// src/domains/ai/client.rs

use crate::domains::ai::types::{AiConfig, AiError};
use crate::domains::record::types::{ImageData, MaintenanceRecord};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use serde::{Deserialize, Serialize};

/// Boundary to the external generative text/image service. The core consumes
/// this capability; it never depends on a concrete provider.
#[async_trait]
pub trait AiBridge: Send + Sync {
    /// Describes a piece of evidence in the context of the record being
    /// edited.
    async fn analyze_image(&self, image: &ImageData, context: &str) -> Result<String, AiError>;

    /// Reviews technical text (spelling, grammar, terminology). Input under
    /// 3 characters is returned unchanged without a remote call.
    async fn improve_text(&self, text: &str) -> Result<String, AiError>;

    /// Produces a technical report image for the given prompt.
    async fn generate_image(&self, prompt: &str) -> Result<ImageData, AiError>;

    /// Free-form executive summary over the full record collection.
    async fn generate_summary(&self, records: &[MaintenanceRecord]) -> Result<String, AiError>;
}

// ── Wire types for the generateContent REST surface ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    /// Base64 payload.
    data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.clone())
    }

    fn first_inline_image(&self) -> Option<ImageData> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.inline_data.as_ref())
            .find_map(|inline| {
                BASE64
                    .decode(&inline.data)
                    .ok()
                    .map(|bytes| ImageData::new(inline.mime_type.clone(), bytes))
            })
    }
}

fn text_request(prompt: String, temperature: Option<f32>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(prompt),
                inline_data: None,
            }],
        }],
        generation_config: temperature.map(|t| GenerationConfig {
            temperature: Some(t),
            image_config: None,
        }),
    }
}

/// HTTP client for the Gemini `generateContent` surface.
pub struct GeminiClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Builds a client from environment configuration.
    pub fn from_env() -> Result<Self, AiError> {
        Ok(Self::new(AiConfig::from_env()?))
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, model, self.config.api_key
        );
        debug!("calling generative model {}", model);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AiBridge for GeminiClient {
    async fn analyze_image(&self, image: &ImageData, context: &str) -> Result<String, AiError> {
        let prompt = format!(
            "Você é um engenheiro eletricista analisando evidências fotográficas de \
             manutenção em subestações de alta tensão. Descreva tecnicamente o que a \
             imagem mostra, apontando condições relevantes (fuligem, corrosão, \
             vazamentos, conexões frouxas). Contexto do registro: \"{}\". \
             RESPONDA EM UM PARÁGRAFO CURTO EM PORTUGUÊS.",
            context
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime.clone(),
                            data: BASE64.encode(&image.bytes),
                        }),
                    },
                ],
            }],
            generation_config: None,
        };
        let response = self.generate(&self.config.text_model, &request).await?;
        response
            .first_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| AiError::Unavailable("resposta vazia do serviço".to_string()))
    }

    async fn improve_text(&self, text: &str) -> Result<String, AiError> {
        if text.trim().len() < 3 {
            return Ok(text.to_string());
        }
        let prompt = format!(
            "Você é um revisor técnico especializado em engenharia elétrica e manutenção \
             de subestações. Corrija a ortografia, gramática e pontuação do seguinte texto \
             em português. Mantenha o tom profissional e técnico. Se encontrar termos \
             técnicos escritos de forma errada (ex: fuzivel, dijuntor, fase errada), \
             corrija-os para a norma técnica. RETORNE APENAS O TEXTO CORRIGIDO, sem \
             explicações adicionais.\n\nTexto: \"{}\"",
            text
        );
        let request = text_request(prompt, Some(0.2));
        let response = self.generate(&self.config.text_model, &request).await?;
        // An empty response falls back to the original text.
        Ok(response
            .first_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| text.to_string()))
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageData, AiError> {
        let full_prompt = format!(
            "Crie uma imagem técnica de alta qualidade para um relatório de manutenção \
             elétrica: {}. Estilo: Foto realista, iluminação de campo, detalhado.",
            prompt
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(full_prompt),
                    inline_data: None,
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                image_config: Some(ImageConfig {
                    aspect_ratio: "16:9".to_string(),
                }),
            }),
        };
        let response = self.generate(&self.config.image_model, &request).await?;
        response.first_inline_image().ok_or(AiError::NoImageProduced)
    }

    async fn generate_summary(&self, records: &[MaintenanceRecord]) -> Result<String, AiError> {
        let payload = serde_json::to_string(records)
            .map_err(|e| AiError::Unavailable(e.to_string()))?;
        let prompt = format!(
            "Gere um resumo executivo profissional para um supervisor de manutenção. \
             Considere os seguintes registros: {}. Foque em estatísticas (pendentes vs \
             concluídas), destaques técnicos e recomendações estratégicas para a região \
             do Amazonas.",
            payload
        );
        let request = text_request(prompt, None);
        let response = self.generate(&self.config.text_model, &request).await?;
        response
            .first_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| AiError::Unavailable("resposta vazia do serviço".to_string()))
    }
}
