//! Table definitions for the galaxy database

use super::types::*;
use crate::model::{Rarity, ResourceType};

// =============================================================================
// Lookup Tables (closed sets)
// =============================================================================

pub static RESOURCE_RARITIES: TableSchema = TableSchema {
    name: "resource_rarities",
    columns: &[Column::key("name", ColumnType::Text).one_of(Rarity::NAMES)],
    foreign_keys: &[],
    unique_keys: &[],
};

pub static RESOURCE_TYPES: TableSchema = TableSchema {
    name: "resource_types",
    columns: &[Column::key("name", ColumnType::Text).one_of(ResourceType::NAMES)],
    foreign_keys: &[],
    unique_keys: &[],
};

// =============================================================================
// Resource Catalog
// =============================================================================

pub static RESOURCES: TableSchema = TableSchema {
    name: "resources",
    columns: &[
        Column::key("name", ColumnType::Text),
        Column::required("short_name", ColumnType::Text).unique(),
        Column::required("rarity", ColumnType::Text).one_of(Rarity::NAMES),
        Column::required("type", ColumnType::Text).one_of(ResourceType::NAMES),
        Column::required("mass", ColumnType::Real),
        Column::required("value", ColumnType::Real),
        Column::new("value_to_mass", ColumnType::Real),
    ],
    foreign_keys: &[
        ForeignKey::new(&["rarity"], "resource_rarities", &["name"]),
        ForeignKey::new(&["type"], "resource_types", &["name"]),
    ],
    unique_keys: &[],
};

// =============================================================================
// Systems and Bodies
// =============================================================================

pub static SYSTEMS: TableSchema = TableSchema {
    name: "systems",
    columns: &[
        Column::key("name", ColumnType::Text),
        Column::required("body_count", ColumnType::Integer),
    ],
    foreign_keys: &[],
    unique_keys: &[],
};

/// Body names are the primary key, so they must be unique across systems.
/// `(name, system)` is declared unique as well so child rows can reference
/// the pair.
pub static BODIES: TableSchema = TableSchema {
    name: "bodies",
    columns: &[
        Column::key("name", ColumnType::Text),
        Column::required("system", ColumnType::Text),
        Column::required("type", ColumnType::Text),
        Column::required("gravity", ColumnType::Real),
        Column::required("temperature", ColumnType::Text),
        Column::required("atmosphere", ColumnType::Text),
        Column::required("magnetosphere", ColumnType::Text),
        Column::required("water", ColumnType::Text),
        Column::required("fauna_count", ColumnType::Integer),
        Column::required("flora_count", ColumnType::Integer),
        Column::required("hab_rank", ColumnType::Integer),
        Column::required("day_length", ColumnType::Real),
    ],
    foreign_keys: &[ForeignKey::new(&["system"], "systems", &["name"])],
    unique_keys: &[&["name", "system"]],
};

// =============================================================================
// Per-body Child Tables
// =============================================================================

/// A child row's body must exist in the system the row names
const BODY_PARENT_KEY: ForeignKey =
    ForeignKey::new(&["body", "system"], "bodies", &["name", "system"]);

const BODY_PARENT_KEYS: &[ForeignKey] = &[BODY_PARENT_KEY];

pub static BIOMES: TableSchema = TableSchema {
    name: "biomes",
    columns: &[
        Column::required("system", ColumnType::Text),
        Column::required("body", ColumnType::Text),
        Column::required("biome", ColumnType::Text),
        Column::new("coverage", ColumnType::Text),
    ],
    foreign_keys: BODY_PARENT_KEYS,
    unique_keys: &[],
};

pub static TRAITS: TableSchema = TableSchema {
    name: "traits",
    columns: &[
        Column::required("system", ColumnType::Text),
        Column::required("body", ColumnType::Text),
        Column::required("trait", ColumnType::Text),
    ],
    foreign_keys: BODY_PARENT_KEYS,
    unique_keys: &[],
};

pub static BODY_RESOURCES: TableSchema = TableSchema {
    name: "body_resources",
    columns: &[
        Column::required("system", ColumnType::Text),
        Column::required("body", ColumnType::Text),
        Column::required("resource", ColumnType::Text),
    ],
    foreign_keys: &[
        BODY_PARENT_KEY,
        ForeignKey::new(&["resource"], "resources", &["name"]),
    ],
    unique_keys: &[],
};

pub static BODY_ORGANICS: TableSchema = TableSchema {
    name: "body_organics",
    columns: &[
        Column::required("system", ColumnType::Text),
        Column::required("body", ColumnType::Text),
        Column::required("organism", ColumnType::Text),
        Column::required("resource", ColumnType::Text),
        Column::required("domesticable", ColumnType::Boolean),
    ],
    foreign_keys: &[
        BODY_PARENT_KEY,
        ForeignKey::new(&["resource"], "resources", &["name"]),
    ],
    unique_keys: &[],
};

// =============================================================================
// Registry
// =============================================================================

/// All tables, parents before children
pub static ALL_TABLES: &[&TableSchema] = &[
    &RESOURCE_RARITIES,
    &RESOURCE_TYPES,
    &RESOURCES,
    &SYSTEMS,
    &BODIES,
    &BIOMES,
    &TRAITS,
    &BODY_RESOURCES,
    &BODY_ORGANICS,
];

pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().copied().find(|t| t.name == name)
}
