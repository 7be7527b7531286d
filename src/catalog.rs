use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Rank labels in column order. Ordinal 0 is reserved for labels outside
/// this list.
pub const RANK_ORDER: [&str; 8] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII"];

/// Battle rating steps in ascending order.
pub const RATING_STEPS: [&str; 34] = [
    "1.0", "1.3", "1.7", "2.0", "2.3", "2.7", "3.0", "3.3", "3.7", "4.0", "4.3", "4.7", "5.0",
    "5.3", "5.7", "6.0", "6.3", "6.7", "7.0", "7.3", "7.7", "8.0", "8.3", "8.7", "9.0", "9.3",
    "9.7", "10.0", "10.3", "10.7", "11.0", "11.3", "11.7", "12.0",
];

/// Wiki thumbnails for vehicles whose catalog entry ships without one.
const THUMBNAIL_OVERRIDES: [(&str, &str); 10] = [
    (
        "m4a1",
        "https://old-wiki.warthunder.com/images/thumb/a/a6/GarageImage_M4A1.jpg/800px-GarageImage_M4A1.jpg",
    ),
    (
        "m26",
        "https://old-wiki.warthunder.com/images/thumb/4/43/GarageImage_M26.jpg/800px-GarageImage_M26.jpg",
    ),
    (
        "m1_abrams",
        "https://old-wiki.warthunder.com/images/thumb/d/da/GarageImage_M1_Abrams.jpg/800px-GarageImage_M1_Abrams.jpg",
    ),
    (
        "m36_gmc",
        "https://old-wiki.warthunder.com/images/thumb/3/32/GarageImage_M36_GMC.jpg/800px-GarageImage_M36_GMC.jpg",
    ),
    (
        "m18_premium",
        "https://old-wiki.warthunder.com/images/thumb/a/a5/GarageImage_M18_GMC.jpg/800px-GarageImage_M18_GMC.jpg",
    ),
    (
        "m42_duster",
        "https://old-wiki.warthunder.com/images/thumb/3/31/GarageImage_M42.jpg/800px-GarageImage_M42.jpg",
    ),
    (
        "f86f2",
        "https://old-wiki.warthunder.com/images/thumb/0/0f/GarageImage_F-86F-2.jpg/800px-GarageImage_F-86F-2.jpg",
    ),
    (
        "a2d1",
        "https://old-wiki.warthunder.com/images/thumb/7/74/GarageImage_A2D-1.jpg/800px-GarageImage_A2D-1.jpg",
    ),
    ("xm8_ags", ""),
    ("m1128_wolfpack", ""),
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid catalog JSON5: {0}")]
    Json5(#[from] json5::Error),
    #[error("duplicate vehicle id `{0}`")]
    DuplicateVehicle(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub nation: String,
    pub class: String,
    pub rank: String,
    #[serde(rename = "br", alias = "rating")]
    pub rating: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        rename = "stackOf",
        alias = "stack_of",
        skip_serializing_if = "Option::is_none"
    )]
    pub stack_of: Option<String>,
}

impl Vehicle {
    pub fn new(id: &str, name: &str, nation: &str, class: &str, rank: &str, rating: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            nation: nation.to_string(),
            class: class.to_string(),
            rank: rank.to_string(),
            rating: rating.to_string(),
            notes: None,
            image: None,
            stack_of: None,
        }
    }

    pub fn stacked_under(mut self, parent: &str) -> Self {
        self.stack_of = Some(parent.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn rank_ordinal(&self) -> u8 {
        rank_ordinal(&self.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nation {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleClass {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub from: String,
    pub to: String,
}

impl RelationEdge {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Read-only catalog data for one render cycle.
///
/// `relations` is `None` when the source carries no curated links at all;
/// the connector router then derives a fallback chain. `Some(vec![])` means
/// the source explicitly has no links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub nations: Vec<Nation>,
    #[serde(default)]
    pub classes: Vec<VehicleClass>,
    #[serde(default, rename = "links", alias = "relations")]
    pub relations: Option<Vec<RelationEdge>>,
}

impl CatalogSnapshot {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles,
            ..Default::default()
        }
    }

    pub fn with_relations(mut self, relations: Vec<RelationEdge>) -> Self {
        self.relations = Some(relations);
        self
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        let snapshot: Self = serde_json::from_str(input)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_json5_str(input: &str) -> Result<Self, CatalogError> {
        let snapshot: Self = json5::from_str(input)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for vehicle in &self.vehicles {
            if !seen.insert(vehicle.id.as_str()) {
                return Err(CatalogError::DuplicateVehicle(vehicle.id.clone()));
            }
        }
        Ok(())
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }

    pub fn nation_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.nations
            .iter()
            .find(|nation| nation.id == id)
            .map(|nation| nation.name.as_str())
            .unwrap_or(id)
    }

    pub fn class_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.classes
            .iter()
            .find(|class| class.id == id)
            .map(|class| class.name.as_str())
            .unwrap_or(id)
    }

    /// Declared stacking parent for every stacked vehicle in the catalog.
    pub fn declared_parents(&self) -> HashMap<&str, &str> {
        self.vehicles
            .iter()
            .filter_map(|vehicle| {
                vehicle
                    .stack_of
                    .as_deref()
                    .map(|parent| (vehicle.id.as_str(), parent))
            })
            .collect()
    }

    pub fn apply_thumbnail_overrides<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let overrides: HashMap<&str, &str> = overrides
            .into_iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .collect();
        for vehicle in &mut self.vehicles {
            if let Some(url) = overrides.get(vehicle.id.as_str()) {
                vehicle.image = Some(url.to_string());
            }
        }
    }

    pub fn apply_builtin_thumbnails(&mut self) {
        self.apply_thumbnail_overrides(THUMBNAIL_OVERRIDES);
    }
}

pub fn load_catalog(path: &Path) -> Result<CatalogSnapshot, CatalogError> {
    let contents = std::fs::read_to_string(path)?;
    parse_catalog(&contents, is_json5_path(path))
}

pub fn parse_catalog(contents: &str, json5: bool) -> Result<CatalogSnapshot, CatalogError> {
    if json5 {
        CatalogSnapshot::from_json5_str(contents)
    } else {
        CatalogSnapshot::from_json_str(contents)
    }
}

/// Reads a standalone relations file: either a bare array of edges or an
/// object with a `links` array.
pub fn load_relations(path: &Path) -> Result<Vec<RelationEdge>, CatalogError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RelationsFile {
        Bare(Vec<RelationEdge>),
        Wrapped {
            #[serde(alias = "relations")]
            links: Vec<RelationEdge>,
        },
    }

    let contents = std::fs::read_to_string(path)?;
    let parsed: RelationsFile = if is_json5_path(path) {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    Ok(match parsed {
        RelationsFile::Bare(links) | RelationsFile::Wrapped { links } => links,
    })
}

pub(crate) fn is_json5_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false)
}

pub fn rank_ordinal(label: &str) -> u8 {
    let label = label.trim();
    RANK_ORDER
        .iter()
        .position(|rank| *rank == label)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(0)
}

pub fn rank_label(ordinal: u8) -> &'static str {
    match ordinal {
        0 => "?",
        n => RANK_ORDER.get(n as usize - 1).copied().unwrap_or("?"),
    }
}

/// Sort key for a rating. Known steps sort by position; anything else sorts
/// after every known step, then by its raw text.
pub fn rating_key(rating: &str) -> (usize, &str) {
    let trimmed = rating.trim();
    let position = RATING_STEPS
        .iter()
        .position(|step| *step == trimmed)
        .unwrap_or(RATING_STEPS.len());
    (position, trimmed)
}
