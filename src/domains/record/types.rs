// src/domains/record/types.rs

use crate::domains::municipality::MunicipalityDirectory;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{Validate, ValidationBuilder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;
use uuid::Uuid;

/// Placeholder stored when a record is created without an assigned technician.
pub const DEFAULT_TECHNICIAN: &str = "Usuário Conectado";

/// Suffix appended to the title of a cloned record.
pub const CLONE_MARKER: &str = " (cópia)";

/// Maintenance lifecycle status. Exactly two values; there is no
/// intermediate "in progress" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    Pending,
    Completed,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "PENDING",
            MaintenanceStatus::Completed => "COMPLETED",
        }
    }

    /// Portuguese label shown on cards and report rows.
    pub fn label(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "Pendente",
            MaintenanceStatus::Completed => "Concluída",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard service catalogue. Free text goes through `ServiceTitle::Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Type50A,
    Type50B,
}

impl ServiceType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceType::Type50A => "Serviço tipo 50A",
            ServiceType::Type50B => "Serviço tipo 50B",
        }
    }

    /// Checklist template pre-filled into the general description when this
    /// service type is selected over an untouched description.
    pub fn template(&self) -> &'static str {
        match self {
            ServiceType::Type50A => {
                "- Manutenção no alimentador 01 e 02\n\
                 - Serviços realizados: limpeza e reapertos\n\
                 - Troca dos silicones dos isoladores\n\
                 - SWG: limpeza e reaperto das conexões\n\
                 - TX (Transformadores): limpeza e reaperto das conexões, verificação se há vazamentos"
            }
            ServiceType::Type50B => {
                "- Teste de proteções dos relés\n\
                 - Megagem dos transformadores\n\
                 - Megagem de cabos e barramentos"
            }
        }
    }

    pub fn all() -> [ServiceType; 2] {
        [ServiceType::Type50A, ServiceType::Type50B]
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Record title: a catalogue service or operator-supplied free text.
/// The "Other" form option maps to `Custom`; an empty `Custom` is rejected at
/// validation so no placeholder value is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ServiceTitle {
    Standard(ServiceType),
    Custom(String),
}

impl ServiceTitle {
    pub fn display(&self) -> &str {
        match self {
            ServiceTitle::Standard(t) => t.display_name(),
            ServiceTitle::Custom(s) => s,
        }
    }

    pub fn service_type(&self) -> Option<ServiceType> {
        match self {
            ServiceTitle::Standard(t) => Some(*t),
            ServiceTitle::Custom(_) => None,
        }
    }

    fn validate_not_sentinel(&self, field: &str) -> DomainResult<()> {
        if let ServiceTitle::Custom(text) = self {
            if text.trim().is_empty() {
                return Err(DomainError::InvalidSentinel {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for ServiceTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Standard maintenance nature catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceNature {
    PreventiveProgrammed,
    CorrectiveProgrammed,
    CorrectiveEmergency,
}

impl MaintenanceNature {
    pub fn display_name(&self) -> &'static str {
        match self {
            MaintenanceNature::PreventiveProgrammed => "Manutenção Preventiva Programada",
            MaintenanceNature::CorrectiveProgrammed => "Manutenção Corretiva Programada",
            MaintenanceNature::CorrectiveEmergency => "Manutenção Corretiva Emergencial",
        }
    }

    pub fn all() -> [MaintenanceNature; 3] {
        [
            MaintenanceNature::PreventiveProgrammed,
            MaintenanceNature::CorrectiveProgrammed,
            MaintenanceNature::CorrectiveEmergency,
        ]
    }
}

impl fmt::Display for MaintenanceNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Record nature: catalogue value or operator-supplied free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Nature {
    Standard(MaintenanceNature),
    Custom(String),
}

impl Nature {
    pub fn display(&self) -> &str {
        match self {
            Nature::Standard(n) => n.display_name(),
            Nature::Custom(s) => s,
        }
    }

    fn validate_not_sentinel(&self, field: &str) -> DomainResult<()> {
        if let Nature::Custom(text) = self {
            if text.trim().is_empty() {
                return Err(DomainError::InvalidSentinel {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Pre-fill rule for the general description when the service selection
/// changes: an empty or still-template description is replaced by the new
/// type's template; operator-edited text is never overwritten.
pub fn service_template_prefill(description: &str, selected: &ServiceTitle) -> Option<&'static str> {
    let service_type = selected.service_type()?;
    let untouched = description.is_empty()
        || ServiceType::all().iter().any(|t| t.template() == description);
    if untouched {
        Some(service_type.template())
    } else {
        None
    }
}

/// Opaque evidence payload: raw bytes plus MIME type. Displayed and
/// transported as a base64 data URL, matching the form/viewer surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Build from raw bytes, sniffing the MIME type from the payload header.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime = image::guess_format(&bytes)
            .ok()
            .and_then(format_mime)
            .unwrap_or("application/octet-stream");
        Self {
            mime: mime.to_string(),
            bytes,
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    pub fn from_data_url(url: &str) -> Result<Self, ValidationError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ValidationError::format("image", "expected a data URL"))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| ValidationError::format("image", "expected base64 data URL payload"))?;
        let bytes = BASE64
            .decode(payload)
            .map_err(|_| ValidationError::format("image", "invalid base64 payload"))?;
        Ok(Self::new(mime, bytes))
    }

    /// File extension used when the payload is written into an export
    /// container.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            _ => "jpeg",
        }
    }

    /// Pixel dimensions, decoded from the payload header only.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        image::io::Reader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
            .map(|(w, h)| (w, h))
    }
}

fn format_mime(format: image::ImageFormat) -> Option<&'static str> {
    match format {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Gif => Some("image/gif"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        ImageData::from_data_url(&url).map_err(serde::de::Error::custom)
    }
}

/// One piece of photographic evidence, owned by exactly one stage slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceImage {
    pub id: Uuid,
    pub data: ImageData,
    pub description: Option<String>,
}

impl MaintenanceImage {
    pub fn new(data: ImageData) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            description: None,
        }
    }

    pub fn with_description(data: ImageData, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            description: Some(description.into()),
        }
    }
}

/// The three fixed evidence positions on a stage, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSlot {
    Before,
    During,
    After,
}

impl EvidenceSlot {
    pub const ALL: [EvidenceSlot; 3] =
        [EvidenceSlot::Before, EvidenceSlot::During, EvidenceSlot::After];

    /// Portuguese label rendered under the slide placeholder.
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceSlot::Before => "Antes",
            EvidenceSlot::During => "Durante",
            EvidenceSlot::After => "Depois",
        }
    }
}

impl fmt::Display for EvidenceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named phase of a maintenance activity with up to three evidence photos.
/// Each slot holds zero or one image; there is no variable-length image list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceStage {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub before: Option<MaintenanceImage>,
    pub during: Option<MaintenanceImage>,
    pub after: Option<MaintenanceImage>,
}

impl MaintenanceStage {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            before: None,
            during: None,
            after: None,
        }
    }

    pub fn slot(&self, slot: EvidenceSlot) -> Option<&MaintenanceImage> {
        match slot {
            EvidenceSlot::Before => self.before.as_ref(),
            EvidenceSlot::During => self.during.as_ref(),
            EvidenceSlot::After => self.after.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: EvidenceSlot) -> &mut Option<MaintenanceImage> {
        match slot {
            EvidenceSlot::Before => &mut self.before,
            EvidenceSlot::During => &mut self.during,
            EvidenceSlot::After => &mut self.after,
        }
    }

    /// Places evidence into the slot, returning the image it replaced.
    pub fn set_slot(
        &mut self,
        slot: EvidenceSlot,
        image: MaintenanceImage,
    ) -> Option<MaintenanceImage> {
        self.slot_mut(slot).replace(image)
    }

    /// Removes and returns the slot's evidence, destroying the ownership link.
    pub fn clear_slot(&mut self, slot: EvidenceSlot) -> Option<MaintenanceImage> {
        self.slot_mut(slot).take()
    }

    /// Number of occupied evidence slots (0–3).
    pub fn evidence_count(&self) -> usize {
        EvidenceSlot::ALL
            .iter()
            .filter(|s| self.slot(**s).is_some())
            .count()
    }

    /// Occupied images in fixed Before/During/After order.
    pub fn images(&self) -> Vec<&MaintenanceImage> {
        EvidenceSlot::ALL
            .iter()
            .filter_map(|s| self.slot(*s))
            .collect()
    }
}

/// One complete maintenance activity performed at one municipality on one
/// date. Owns its stages exclusively; references its municipality by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub municipality_id: String,
    pub title: ServiceTitle,
    pub nature: Nature,
    pub description: String,
    pub date: NaiveDate,
    pub status: MaintenanceStatus,
    pub stages: Vec<MaintenanceStage>,
    pub technician: String,
    pub ai_notes: Option<String>,
    /// Present only on records imported from the legacy archive.
    pub legacy_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRecord {
    pub fn display_title(&self) -> &str {
        self.title.display()
    }

    pub fn display_nature(&self) -> &str {
        self.nature.display()
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy_file_name.is_some()
    }

    /// Total occupied evidence slots across all stages.
    pub fn total_evidence(&self) -> usize {
        self.stages.iter().map(|s| s.evidence_count()).sum()
    }

    pub fn find_stage(&self, stage_id: Uuid) -> Option<&MaintenanceStage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn find_stage_mut(&mut self, stage_id: Uuid) -> Option<&mut MaintenanceStage> {
        self.stages.iter_mut().find(|s| s.id == stage_id)
    }
}

/// Full-record validation used at save time.
pub fn validate_record(
    record: &MaintenanceRecord,
    directory: &MunicipalityDirectory,
) -> DomainResult<()> {
    if record.municipality_id.trim().is_empty() {
        return Err(DomainError::IncompleteRecord(
            "municipality is not set".to_string(),
        ));
    }
    if !directory.contains(&record.municipality_id) {
        return Err(DomainError::IncompleteRecord(format!(
            "municipality '{}' does not exist",
            record.municipality_id
        )));
    }
    record.title.validate_not_sentinel("title")?;
    record.nature.validate_not_sentinel("nature")?;

    let mut seen = HashSet::new();
    for stage in &record.stages {
        if !seen.insert(stage.id) {
            return Err(DomainError::Validation(ValidationError::entity(&format!(
                "duplicate stage id {} in record",
                stage.id
            ))));
        }
    }
    Ok(())
}

/// DTO used when creating a new record. Unset fields take documented
/// defaults in the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaintenanceRecord {
    pub municipality_id: String,
    pub title: ServiceTitle,
    pub nature: Nature,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub status: Option<MaintenanceStatus>,
    pub technician: Option<String>,
    /// `None` requests the default three-stage template; `Some(vec![])` is an
    /// explicitly empty record.
    pub stages: Option<Vec<MaintenanceStage>>,
}

impl Validate for NewMaintenanceRecord {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("municipality_id", Some(self.municipality_id.clone()))
            .required()
            .not_blank()
            .validate()?;

        self.title.validate_not_sentinel("title")?;
        self.nature.validate_not_sentinel("nature")?;

        if let Some(technician) = &self.technician {
            ValidationBuilder::new("technician", Some(technician.clone()))
                .not_blank()
                .max_length(120)
                .validate()?;
        }
        Ok(())
    }
}

/// DTO used when updating an existing record. Supplied fields replace the
/// stored values wholesale; `id` and `created_at` are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMaintenanceRecord {
    pub municipality_id: Option<String>,
    pub title: Option<ServiceTitle>,
    pub nature: Option<Nature>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<MaintenanceStatus>,
    pub technician: Option<String>,
    pub stages: Option<Vec<MaintenanceStage>>,
    /// `Some(None)` clears the AI note, `None` leaves it untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_notes: Option<Option<String>>,
}

impl Validate for UpdateMaintenanceRecord {
    fn validate(&self) -> DomainResult<()> {
        if let Some(municipality_id) = &self.municipality_id {
            ValidationBuilder::new("municipality_id", Some(municipality_id.clone()))
                .not_blank()
                .validate()?;
        }
        if let Some(title) = &self.title {
            title.validate_not_sentinel("title")?;
        }
        if let Some(nature) = &self.nature {
            nature.validate_not_sentinel("nature")?;
        }
        if let Some(technician) = &self.technician {
            ValidationBuilder::new("technician", Some(technician.clone()))
                .not_blank()
                .max_length(120)
                .validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_pixel() -> Vec<u8> {
        // 1x1 transparent PNG
        BASE64
            .decode("iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==")
            .unwrap()
    }

    #[test]
    fn test_data_url_round_trip() {
        let data = ImageData::from_bytes(png_pixel());
        assert_eq!(data.mime, "image/png");
        let url = data.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        let back = ImageData::from_data_url(&url).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_data_url_rejects_plain_urls() {
        assert!(ImageData::from_data_url("https://example.com/x.png").is_err());
        assert!(ImageData::from_data_url("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_image_dimensions() {
        let data = ImageData::from_bytes(png_pixel());
        assert_eq!(data.dimensions(), Some((1, 1)));
    }

    #[test]
    fn test_stage_slots_are_independent() {
        let mut stage = MaintenanceStage::new("Inspeção Inicial", "Verificação do TX-01");
        assert_eq!(stage.evidence_count(), 0);

        let before = MaintenanceImage::new(ImageData::from_bytes(png_pixel()));
        stage.set_slot(EvidenceSlot::Before, before.clone());
        assert_eq!(stage.evidence_count(), 1);
        assert_eq!(stage.slot(EvidenceSlot::Before), Some(&before));
        assert!(stage.slot(EvidenceSlot::During).is_none());

        // A slot holds at most one image; replacing returns the old one.
        let replacement = MaintenanceImage::new(ImageData::from_bytes(png_pixel()));
        let evicted = stage.set_slot(EvidenceSlot::Before, replacement);
        assert_eq!(evicted.map(|i| i.id), Some(before.id));
        assert_eq!(stage.evidence_count(), 1);

        let removed = stage.clear_slot(EvidenceSlot::Before);
        assert!(removed.is_some());
        assert_eq!(stage.evidence_count(), 0);
    }

    #[test]
    fn test_images_in_fixed_order() {
        let mut stage = MaintenanceStage::new("Execução Técnica", "");
        let during = MaintenanceImage::new(ImageData::from_bytes(png_pixel()));
        let before = MaintenanceImage::new(ImageData::from_bytes(png_pixel()));
        stage.set_slot(EvidenceSlot::During, during.clone());
        stage.set_slot(EvidenceSlot::Before, before.clone());

        let ids: Vec<Uuid> = stage.images().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![before.id, during.id]);
    }

    #[test]
    fn test_custom_title_sentinel_rejected() {
        let new = NewMaintenanceRecord {
            municipality_id: "m1".to_string(),
            title: ServiceTitle::Custom("   ".to_string()),
            nature: Nature::Standard(MaintenanceNature::PreventiveProgrammed),
            description: String::new(),
            date: None,
            status: None,
            technician: None,
            stages: None,
        };
        match new.validate() {
            Err(DomainError::InvalidSentinel { field }) => assert_eq!(field, "title"),
            other => panic!("expected InvalidSentinel, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_nature_with_text_accepted() {
        let new = NewMaintenanceRecord {
            municipality_id: "m1".to_string(),
            title: ServiceTitle::Standard(ServiceType::Type50A),
            nature: Nature::Custom("Inspeção de rotina noturna".to_string()),
            description: String::new(),
            date: None,
            status: None,
            technician: None,
            stages: None,
        };
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_service_template_prefill() {
        let standard = ServiceTitle::Standard(ServiceType::Type50B);

        // Empty description gets the template.
        assert_eq!(
            service_template_prefill("", &standard),
            Some(ServiceType::Type50B.template())
        );
        // A still-template description is swapped for the new template.
        assert_eq!(
            service_template_prefill(ServiceType::Type50A.template(), &standard),
            Some(ServiceType::Type50B.template())
        );
        // Operator-edited text is never overwritten.
        assert_eq!(service_template_prefill("texto do técnico", &standard), None);
        // Custom titles never pre-fill.
        let custom = ServiceTitle::Custom("Outro serviço".to_string());
        assert_eq!(service_template_prefill("", &custom), None);
    }
}
