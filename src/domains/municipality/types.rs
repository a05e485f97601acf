// src/domains/municipality/types.rs

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// River basins covered by the maintenance teams.
/// Closed set: there is no free-text escape for regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Solimoes,
    Japura,
    Jurua,
}

impl Region {
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Solimoes => "Rio Solimões",
            Region::Japura => "Rio Japurá",
            Region::Jurua => "Rio Juruá",
        }
    }

    pub fn all() -> [Region; 3] {
        [Region::Solimoes, Region::Japura, Region::Jurua]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Immutable reference entity: one municipality served by the team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: String,
    pub name: String,
    pub region: Region,
    pub latitude: f64,
    pub longitude: f64,
}

impl Municipality {
    fn new(id: &str, name: &str, region: Region, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            region,
            latitude,
            longitude,
        }
    }
}

static AMAZONAS_MUNICIPALITIES: Lazy<Vec<Municipality>> = Lazy::new(|| {
    vec![
        Municipality::new("m1", "Tabatinga", Region::Solimoes, -4.23, -69.93),
        Municipality::new("m2", "Benjamin Constant", Region::Solimoes, -4.38, -70.03),
        Municipality::new("m3", "Coari", Region::Solimoes, -4.08, -63.14),
        Municipality::new("m5", "Tefé", Region::Solimoes, -3.35, -64.71),
        Municipality::new("m6", "Japurá", Region::Japura, -1.82, -66.93),
        Municipality::new("m7", "Maraã", Region::Japura, -1.83, -65.57),
        Municipality::new("m8", "Eirunepé", Region::Jurua, -6.66, -69.87),
        Municipality::new("m9", "Itamarati", Region::Jurua, -6.73, -69.21),
        Municipality::new("m10", "Carauari", Region::Jurua, -4.88, -66.89),
    ]
});

/// Lookup table over the static municipality reference data.
/// Loaded once, never mutated.
#[derive(Debug, Clone)]
pub struct MunicipalityDirectory {
    municipalities: Vec<Municipality>,
}

impl MunicipalityDirectory {
    /// Directory backed by the nine Amazonas municipalities.
    pub fn amazonas() -> Self {
        Self {
            municipalities: AMAZONAS_MUNICIPALITIES.clone(),
        }
    }

    /// Directory over an explicit municipality list (tests, future regions).
    pub fn new(municipalities: Vec<Municipality>) -> Self {
        Self { municipalities }
    }

    pub fn find(&self, id: &str) -> Option<&Municipality> {
        self.municipalities.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn all(&self) -> &[Municipality] {
        &self.municipalities
    }

    pub fn by_region(&self, region: Region) -> Vec<&Municipality> {
        self.municipalities
            .iter()
            .filter(|m| m.region == region)
            .collect()
    }
}

impl Default for MunicipalityDirectory {
    fn default() -> Self {
        Self::amazonas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_lookup() {
        let dir = MunicipalityDirectory::amazonas();
        let tabatinga = dir.find("m1").unwrap();
        assert_eq!(tabatinga.name, "Tabatinga");
        assert_eq!(tabatinga.region, Region::Solimoes);
        assert!(dir.find("nope").is_none());
        assert_eq!(dir.all().len(), 9);
    }

    #[test]
    fn test_by_region() {
        let dir = MunicipalityDirectory::amazonas();
        let jurua: Vec<_> = dir.by_region(Region::Jurua).iter().map(|m| m.name.clone()).collect();
        assert_eq!(jurua, vec!["Eirunepé", "Itamarati", "Carauari"]);
    }

    #[test]
    fn test_region_display() {
        assert_eq!(Region::Solimoes.to_string(), "Rio Solimões");
        assert_eq!(Region::Japura.display_name(), "Rio Japurá");
    }
}
