//! Closed resource classifications and the row types of the flat document

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scarcity class of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Exotic,
    Unique,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Exotic,
        Rarity::Unique,
    ];

    pub const NAMES: &'static [&'static str] = &["common", "uncommon", "rare", "exotic", "unique"];

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Exotic => "exotic",
            Rarity::Unique => "unique",
        }
    }

    /// Case-insensitive parse; `None` for anything outside the set
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Material class of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Organic,
    Inorganic,
    Manufactured,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Organic,
        ResourceType::Inorganic,
        ResourceType::Manufactured,
    ];

    pub const NAMES: &'static [&'static str] = &["organic", "inorganic", "manufactured"];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Organic => "organic",
            ResourceType::Inorganic => "inorganic",
            ResourceType::Manufactured => "manufactured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of a single-column lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRow {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub name: String,
    pub short_name: String,
    pub rarity: Rarity,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub mass: f64,
    pub value: f64,
    pub value_to_mass: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRow {
    pub name: String,
    pub body_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRow {
    pub name: String,
    pub system: String,
    #[serde(rename = "type")]
    pub body_type: String,
    pub gravity: f64,
    pub temperature: String,
    pub atmosphere: String,
    pub magnetosphere: String,
    pub water: String,
    pub fauna_count: i64,
    pub flora_count: i64,
    pub hab_rank: i64,
    /// Hours
    pub day_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeRow {
    pub system: String,
    pub body: String,
    pub biome: String,
    pub coverage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitRow {
    pub system: String,
    pub body: String,
    #[serde(rename = "trait")]
    pub trait_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyResourceRow {
    pub system: String,
    pub body: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyOrganicRow {
    pub system: String,
    pub body: String,
    pub organism: String,
    pub resource: String,
    pub domesticable: bool,
}

/// The flattened document: one section per target table, keyed by table name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatDocument {
    pub resource_rarities: Vec<LookupRow>,
    pub resource_types: Vec<LookupRow>,
    pub resources: Vec<ResourceRow>,
    pub systems: Vec<SystemRow>,
    pub bodies: Vec<BodyRow>,
    pub biomes: Vec<BiomeRow>,
    pub traits: Vec<TraitRow>,
    pub body_resources: Vec<BodyResourceRow>,
    pub body_organics: Vec<BodyOrganicRow>,
}

impl FlatDocument {
    /// Row count per section, in insertion order
    pub fn row_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("resource_rarities", self.resource_rarities.len()),
            ("resource_types", self.resource_types.len()),
            ("resources", self.resources.len()),
            ("systems", self.systems.len()),
            ("bodies", self.bodies.len()),
            ("biomes", self.biomes.len()),
            ("traits", self.traits.len()),
            ("body_resources", self.body_resources.len()),
            ("body_organics", self.body_organics.len()),
        ]
    }
}
