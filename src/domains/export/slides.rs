// src/domains/export/slides.rs
//
// Slide-deck projection of a record set: cover, one overview per record, one
// slide per stage. Pure transform; the generation date is an explicit input
// so output is fully determined by the arguments.

use crate::domains::export::table::UNRESOLVED;
use crate::domains::municipality::MunicipalityDirectory;
use crate::domains::record::types::{EvidenceSlot, MaintenanceImage, MaintenanceRecord};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Band text repeated on every content slide.
pub const DECK_HEADER: &str = "EQUIPE HV - RELATÓRIO DE MANUTENÇÃO";

/// Marker rendered inside an empty evidence placeholder.
pub const PENDING_EVIDENCE: &str = "Evidência pendente";

const NO_DESCRIPTION: &str = "Nenhuma descrição macro informada.";
const NO_STAGE_DESCRIPTION: &str = "Descrição técnica da etapa pendente.";

#[derive(Debug, Clone, Serialize)]
pub struct CoverSlide {
    pub title: String,
    pub subtitle: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewSlide {
    pub record_id: Uuid,
    pub title: String,
    pub location: String,
    pub technician: String,
    pub date: NaiveDate,
    pub nature: String,
    pub description: String,
}

/// One of the three fixed evidence positions on a stage slide. The position
/// never moves or resizes with occupancy; an empty slot renders the
/// pending-evidence marker in place.
#[derive(Debug, Clone, Serialize)]
pub struct EvidencePlaceholder {
    pub slot: EvidenceSlot,
    pub image: Option<MaintenanceImage>,
}

impl EvidencePlaceholder {
    pub fn is_occupied(&self) -> bool {
        self.image.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageSlide {
    pub record_id: Uuid,
    pub stage_id: Uuid,
    pub name: String,
    pub description: String,
    /// Always three entries, in fixed Before/During/After order.
    pub placeholders: [EvidencePlaceholder; 3],
}

#[derive(Debug, Clone, Serialize)]
pub enum Slide {
    Cover(CoverSlide),
    Overview(OverviewSlide),
    Stage(StageSlide),
}

/// Ordered slide-deck description, ready for rendering into a presentation
/// artifact.
#[derive(Debug, Clone, Serialize)]
pub struct SlideDeck {
    pub generated_on: NaiveDate,
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Projects the record set into slide descriptions: one cover, then per
/// record (in repository order) an overview slide followed by exactly one
/// slide per stage. A record with no stages contributes only its overview;
/// a stage with no evidence still renders all three placeholders.
pub fn to_slides(
    records: &[MaintenanceRecord],
    directory: &MunicipalityDirectory,
    generated_on: NaiveDate,
) -> SlideDeck {
    let mut slides = Vec::with_capacity(1 + records.len());

    slides.push(Slide::Cover(CoverSlide {
        title: "Relatório Operacional de Manutenções".to_string(),
        subtitle: format!(
            "Amazonas - Bacias Hidrográficas • {}",
            generated_on.format("%d/%m/%Y")
        ),
        record_count: records.len(),
    }));

    for record in records {
        let location = directory
            .find(&record.municipality_id)
            .map(|m| format!("{} ({})", m.name, m.region.display_name()))
            .unwrap_or_else(|| UNRESOLVED.to_string());

        let description = if record.description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            record.description.clone()
        };

        slides.push(Slide::Overview(OverviewSlide {
            record_id: record.id,
            title: record.display_title().to_uppercase(),
            location,
            technician: record.technician.clone(),
            date: record.date,
            nature: record.display_nature().to_string(),
            description,
        }));

        for stage in &record.stages {
            let description = if stage.description.trim().is_empty() {
                NO_STAGE_DESCRIPTION.to_string()
            } else {
                stage.description.clone()
            };
            let placeholders = EvidenceSlot::ALL.map(|slot| EvidencePlaceholder {
                slot,
                image: stage.slot(slot).cloned(),
            });
            slides.push(Slide::Stage(StageSlide {
                record_id: record.id,
                stage_id: stage.id,
                name: stage.name.clone(),
                description,
                placeholders,
            }));
        }
    }

    SlideDeck {
        generated_on,
        slides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::record::repository::RecordRepository;
    use crate::domains::record::types::{
        ImageData, MaintenanceNature, MaintenanceStage, Nature, NewMaintenanceRecord,
        ServiceTitle, ServiceType,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
    }

    fn new_record(stages: Vec<MaintenanceStage>) -> NewMaintenanceRecord {
        NewMaintenanceRecord {
            municipality_id: "m1".to_string(),
            title: ServiceTitle::Standard(ServiceType::Type50A),
            nature: Nature::Standard(MaintenanceNature::PreventiveProgrammed),
            description: "Manutenção preventiva.".to_string(),
            date: None,
            status: None,
            technician: Some("João Silva".to_string()),
            stages: Some(stages),
        }
    }

    #[test]
    fn test_zero_stage_record_emits_cover_plus_overview() {
        let mut repo = RecordRepository::new();
        repo.create(new_record(vec![])).unwrap();

        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());
        assert_eq!(deck.len(), 2);
        assert!(matches!(deck.slides[0], Slide::Cover(_)));
        assert!(matches!(deck.slides[1], Slide::Overview(_)));
    }

    #[test]
    fn test_two_stage_record_emits_overview_plus_two_stage_slides() {
        let mut repo = RecordRepository::new();
        repo.create(new_record(vec![
            MaintenanceStage::new("Inspeção Inicial", "Verificação do TX-01."),
            MaintenanceStage::new("Execução Técnica", ""),
        ]))
        .unwrap();

        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());
        assert_eq!(deck.len(), 4);
        match &deck.slides[3] {
            Slide::Stage(stage) => {
                assert_eq!(stage.name, "Execução Técnica");
                // An empty stage description gets the pending placeholder text.
                assert_eq!(stage.description, NO_STAGE_DESCRIPTION);
            }
            other => panic!("expected stage slide, got {:?}", other),
        }
    }

    #[test]
    fn test_single_occupied_slot_keeps_fixed_order() {
        let mut repo = RecordRepository::new();
        let mut stage = MaintenanceStage::new("Inspeção Inicial", "TX-01.");
        stage.set_slot(
            EvidenceSlot::Before,
            MaintenanceImage::new(ImageData::new("image/jpeg", vec![0xFF, 0xD8])),
        );
        repo.create(new_record(vec![stage])).unwrap();

        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());
        let Slide::Stage(stage) = &deck.slides[2] else {
            panic!("expected stage slide");
        };

        let slots: Vec<EvidenceSlot> = stage.placeholders.iter().map(|p| p.slot).collect();
        assert_eq!(
            slots,
            vec![EvidenceSlot::Before, EvidenceSlot::During, EvidenceSlot::After]
        );
        assert!(stage.placeholders[0].is_occupied());
        assert!(!stage.placeholders[1].is_occupied());
        assert!(!stage.placeholders[2].is_occupied());
    }

    #[test]
    fn test_cover_counts_and_record_order() {
        let mut repo = RecordRepository::new();
        repo.create(new_record(vec![])).unwrap();
        let newest = repo.create(new_record(vec![])).unwrap();

        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());
        let Slide::Cover(cover) = &deck.slides[0] else {
            panic!("expected cover");
        };
        assert_eq!(cover.record_count, 2);
        assert!(cover.subtitle.contains("30/09/2024"));

        // Overviews follow repository order (most recent first).
        let Slide::Overview(first_overview) = &deck.slides[1] else {
            panic!("expected overview");
        };
        assert_eq!(first_overview.record_id, newest.id);
    }

    #[test]
    fn test_unresolved_municipality_on_overview() {
        let mut repo = RecordRepository::new();
        let mut dto = new_record(vec![]);
        dto.municipality_id = "m404".to_string();
        repo.create(dto).unwrap();

        let deck = to_slides(repo.list(), &MunicipalityDirectory::amazonas(), today());
        let Slide::Overview(overview) = &deck.slides[1] else {
            panic!("expected overview");
        };
        assert_eq!(overview.location, UNRESOLVED);
    }
}
