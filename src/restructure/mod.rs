//! Flatten the nested galaxy export into the per-table flat document
//!
//! Input is a mapping of system name to system, where a system is a mapping
//! of body name to body object, a list of body objects, or an object holding
//! either under `bodies`. Every problem is collected into a
//! [`ValidationReport`]; a run with any violation produces no document.

mod catalog;
mod validate;

pub use catalog::ResourceCatalog;
pub use validate::{Location, Problem, ValidationReport, Violation};

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::files::{check_destination, read_json, write_json_atomic};
use crate::model::*;
use crate::parser::{
    find_field, parse_biome, parse_count, parse_day_length, parse_gravity, parse_organism,
    parse_text,
};
use crate::ui::{Phase, Ui};

/// Defaults used for unreadable values in lenient mode
const DEFAULT_COUNT: i64 = 0;
const DEFAULT_DAY_LENGTH_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct RestructureOptions {
    /// Coerce unreadable counts and day lengths to defaults instead of failing
    pub lenient: bool,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct Restructured {
    pub document: FlatDocument,
    /// Organism/resource pairs listed as both domesticable and gatherable
    /// on the same body; each contributes two rows
    pub overlapping_organics: usize,
    /// Values replaced by defaults in lenient mode
    pub coerced_values: usize,
}

/// Restructure an in-memory source document against a resource catalog
pub fn restructure(
    source: &Value,
    catalog: &Value,
    options: RestructureOptions,
) -> std::result::Result<Restructured, ValidationReport> {
    let mut report = ValidationReport::new();
    let catalog = ResourceCatalog::from_value(catalog, &mut report);

    let mut flattener = Flattener {
        catalog: &catalog,
        options,
        report,
        document: FlatDocument::default(),
        seen_bodies: HashMap::new(),
        overlapping_organics: 0,
        coerced_values: 0,
    };

    flattener.document.resource_rarities = Rarity::ALL
        .iter()
        .map(|r| LookupRow {
            name: r.to_string(),
        })
        .collect();
    flattener.document.resource_types = ResourceType::ALL
        .iter()
        .map(|t| LookupRow {
            name: t.to_string(),
        })
        .collect();
    flattener.document.resources = catalog.rows().to_vec();

    flattener.flatten_galaxy(source);

    if !flattener.report.is_empty() {
        return Err(flattener.report);
    }

    Ok(Restructured {
        document: flattener.document,
        overlapping_organics: flattener.overlapping_organics,
        coerced_values: flattener.coerced_values,
    })
}

/// Read the source and catalog files, restructure, and write the flat
/// document to `output`. Nothing is written when validation fails.
pub fn restructure_file(
    source_path: &Path,
    catalog_path: &Path,
    output_path: &Path,
    options: RestructureOptions,
    force: bool,
    ui: &mut impl Ui,
) -> Result<Restructured> {
    check_destination(output_path, force)?;

    ui.set_phase(Phase::Reading);
    let source = read_json(source_path)?;
    let catalog = read_json(catalog_path)?;

    ui.set_phase(Phase::Validating);
    let restructured = restructure(&source, &catalog, options).map_err(Error::Validation)?;

    for (table, count) in restructured.document.row_counts() {
        ui.log(format!("{}: {} rows", table, count));
    }
    if restructured.overlapping_organics > 0 {
        ui.log(format!(
            "{} organism(s) listed as both domesticable and gatherable",
            restructured.overlapping_organics
        ));
    }
    if restructured.coerced_values > 0 {
        ui.log(format!(
            "{} unreadable value(s) replaced by defaults",
            restructured.coerced_values
        ));
    }

    ui.set_phase(Phase::Writing);
    write_json_atomic(output_path, &restructured.document, force)?;

    info!(
        output = %output_path.display(),
        systems = restructured.document.systems.len(),
        bodies = restructured.document.bodies.len(),
        "wrote flat document"
    );

    Ok(restructured)
}

struct Flattener<'a> {
    catalog: &'a ResourceCatalog,
    options: RestructureOptions,
    report: ValidationReport,
    document: FlatDocument,
    /// body name -> owning system, for global uniqueness
    seen_bodies: HashMap<String, String>,
    overlapping_organics: usize,
    coerced_values: usize,
}

impl Flattener<'_> {
    fn flatten_galaxy(&mut self, source: &Value) {
        let Some(systems) = source.as_object() else {
            self.report.push(Violation::new(
                Location::Document,
                "systems",
                Problem::Malformed("top level must map system names to systems".to_string()),
            ));
            return;
        };

        for (system, value) in systems {
            let bodies = match system_bodies(value) {
                Ok(bodies) => bodies,
                Err(why) => {
                    self.report.push(Violation::new(
                        Location::System {
                            system: system.clone(),
                        },
                        "bodies",
                        Problem::Malformed(why),
                    ));
                    continue;
                }
            };

            let mut body_count = 0;
            for (key, body) in bodies {
                if self.flatten_body(system, key, body) {
                    body_count += 1;
                }
            }

            if body_count == 0 {
                warn!(system = %system, "system has no bodies");
            }
            debug!(system = %system, bodies = body_count, "flattened system");

            self.document.systems.push(SystemRow {
                name: system.clone(),
                body_count,
            });
        }
    }

    /// Returns true when the body produced a row
    fn flatten_body(&mut self, system: &str, key: Option<&str>, value: &Value) -> bool {
        let system_location = || Location::System {
            system: system.to_string(),
        };

        let Some(obj) = value.as_object() else {
            self.report.push(Violation::new(
                system_location(),
                key.unwrap_or("body"),
                Problem::Malformed(format!("expected a body object, found {}", value)),
            ));
            return false;
        };

        let name = match key {
            Some(k) => k.trim().to_string(),
            None => match find_field(obj, &["name"]).map(parse_text) {
                Some(Ok(name)) => name,
                Some(Err(why)) => {
                    self.report
                        .push(Violation::new(system_location(), "name", Problem::Malformed(why)));
                    return false;
                }
                None => {
                    self.report
                        .push(Violation::new(system_location(), "name", Problem::Missing));
                    return false;
                }
            },
        };

        let location = Location::Body {
            system: system.to_string(),
            body: name.clone(),
        };

        if let Some(owner) = self.seen_bodies.get(&name) {
            self.report.push(Violation::new(
                location,
                "name",
                Problem::Duplicate(format!("body in system {}", owner)),
            ));
            return false;
        }
        self.seen_bodies.insert(name.clone(), system.to_string());

        let before = self.report.len();

        let body_type = self.field(obj, &location, "type", &["type"], parse_text, None);
        let gravity = self.field(obj, &location, "gravity", &["gravity"], parse_gravity, None);
        let temperature = self.field(obj, &location, "temperature", &["temperature"], lowercase, None);
        let atmosphere = self.field(obj, &location, "atmosphere", &["atmosphere"], lowercase, None);
        let magnetosphere =
            self.field(obj, &location, "magnetosphere", &["magnetosphere"], lowercase, None);
        let water = self.field(obj, &location, "water", &["water"], lowercase, None);
        let fauna_count = self.field(
            obj,
            &location,
            "fauna_count",
            &["fauna_count", "fauna"],
            parse_count,
            Some(DEFAULT_COUNT),
        );
        let flora_count = self.field(
            obj,
            &location,
            "flora_count",
            &["flora_count", "flora"],
            parse_count,
            Some(DEFAULT_COUNT),
        );
        let hab_rank = self.field(
            obj,
            &location,
            "hab_rank",
            &["hab_rank"],
            parse_count,
            Some(DEFAULT_COUNT),
        );
        let day_length = self.field(
            obj,
            &location,
            "day_length",
            &["day_length", "planet_length"],
            parse_day_length,
            Some(DEFAULT_DAY_LENGTH_HOURS),
        );

        let biomes = self.biomes(obj, &location);
        let traits = self.traits(obj, &location);
        let resources = self.resources(obj, &location);
        let domesticable = self.organics(obj, &location, "domesticable");
        let gatherable = self.organics(obj, &location, "gatherable");

        if self.report.len() > before {
            return false;
        }

        let (
            Some(body_type),
            Some(gravity),
            Some(temperature),
            Some(atmosphere),
            Some(magnetosphere),
            Some(water),
            Some(fauna_count),
            Some(flora_count),
            Some(hab_rank),
            Some(day_length),
        ) = (
            body_type,
            gravity,
            temperature,
            atmosphere,
            magnetosphere,
            water,
            fauna_count,
            flora_count,
            hab_rank,
            day_length,
        )
        else {
            return false;
        };

        self.document.bodies.push(BodyRow {
            name: name.clone(),
            system: system.to_string(),
            body_type,
            gravity,
            temperature,
            atmosphere,
            magnetosphere,
            water,
            fauna_count,
            flora_count,
            hab_rank,
            day_length,
        });

        let row_key = || (system.to_string(), name.clone());

        for (biome, coverage) in biomes {
            let (system, body) = row_key();
            self.document.biomes.push(BiomeRow {
                system,
                body,
                biome,
                coverage,
            });
        }
        for trait_name in traits {
            let (system, body) = row_key();
            self.document.traits.push(TraitRow {
                system,
                body,
                trait_name,
            });
        }
        for resource in resources {
            let (system, body) = row_key();
            self.document.body_resources.push(BodyResourceRow {
                system,
                body,
                resource,
            });
        }

        {
            let gatherable_pairs: HashSet<&(String, String)> = gatherable.iter().collect();
            for pair in domesticable.iter().filter(|p| gatherable_pairs.contains(p)) {
                self.overlapping_organics += 1;
                warn!(
                    system = %system,
                    body = %name,
                    organism = %pair.0,
                    resource = %pair.1,
                    "organism is both domesticable and gatherable; keeping both rows"
                );
            }
        }

        let flagged = domesticable
            .into_iter()
            .map(|pair| (pair, true))
            .chain(gatherable.into_iter().map(|pair| (pair, false)));
        for ((organism, resource), domesticable) in flagged {
            let (system, body) = row_key();
            self.document.body_organics.push(BodyOrganicRow {
                system,
                body,
                organism,
                resource,
                domesticable,
            });
        }

        true
    }

    /// Read one required scalar. In lenient mode an unreadable value falls
    /// back to `fallback` when one is given.
    fn field<T>(
        &mut self,
        obj: &Map<String, Value>,
        location: &Location,
        field: &str,
        aliases: &[&str],
        parse: impl Fn(&Value) -> std::result::Result<T, String>,
        fallback: Option<T>,
    ) -> Option<T> {
        let value = match find_field(obj, aliases) {
            None | Some(Value::Null) => {
                self.report
                    .push(Violation::new(location.clone(), field, Problem::Missing));
                return None;
            }
            Some(v) => v,
        };

        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(why) => match fallback {
                Some(default) if self.options.lenient => {
                    warn!(location = %location, field, %why, "using default for unreadable value");
                    self.coerced_values += 1;
                    Some(default)
                }
                _ => {
                    self.report
                        .push(Violation::new(location.clone(), field, Problem::Malformed(why)));
                    None
                }
            },
        }
    }

    /// A list field; absent means empty
    fn list<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        location: &Location,
        field: &str,
    ) -> &'v [Value] {
        match find_field(obj, &[field]) {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items.as_slice(),
            Some(other) => {
                self.report.push(Violation::new(
                    location.clone(),
                    field,
                    Problem::Malformed(format!("expected a list, found {}", other)),
                ));
                &[]
            }
        }
    }

    fn biomes(
        &mut self,
        obj: &Map<String, Value>,
        location: &Location,
    ) -> Vec<(String, Option<String>)> {
        let mut biomes = Vec::new();
        for item in self.list(obj, location, "biomes") {
            match parse_biome(item) {
                Ok(biome) => biomes.push(biome),
                Err(why) if self.options.lenient => {
                    warn!(location = %location, %why, "skipping unreadable biome");
                    self.coerced_values += 1;
                }
                Err(why) => {
                    self.report
                        .push(Violation::new(location.clone(), "biomes", Problem::Malformed(why)));
                }
            }
        }
        biomes
    }

    fn traits(&mut self, obj: &Map<String, Value>, location: &Location) -> Vec<String> {
        let mut traits = Vec::new();
        for item in self.list(obj, location, "traits") {
            match parse_text(item) {
                Ok(t) => traits.push(t),
                Err(why) => {
                    self.report
                        .push(Violation::new(location.clone(), "traits", Problem::Malformed(why)));
                }
            }
        }
        traits
    }

    /// Resource references resolved to canonical catalog names
    fn resources(&mut self, obj: &Map<String, Value>, location: &Location) -> Vec<String> {
        let mut resources = Vec::new();
        for item in self.list(obj, location, "resources") {
            match parse_text(item) {
                Ok(reference) => match self.catalog.resolve(&reference) {
                    Some(name) => resources.push(name.to_string()),
                    None => self.report.push(Violation::new(
                        location.clone(),
                        format!("resource: {}", reference),
                        Problem::UnknownResource,
                    )),
                },
                Err(why) => {
                    self.report.push(Violation::new(
                        location.clone(),
                        "resources",
                        Problem::Malformed(why),
                    ));
                }
            }
        }
        resources
    }

    /// (organism, canonical resource) pairs of one organism list
    fn organics(
        &mut self,
        obj: &Map<String, Value>,
        location: &Location,
        list: &str,
    ) -> Vec<(String, String)> {
        let mut organics = Vec::new();
        for item in self.list(obj, location, list) {
            match parse_organism(item) {
                Ok((organism, reference)) => match self.catalog.resolve(&reference) {
                    Some(name) => organics.push((organism, name.to_string())),
                    None => self.report.push(Violation::new(
                        location.clone(),
                        format!("{} resource: {}", list, reference),
                        Problem::UnknownResource,
                    )),
                },
                Err(why) => {
                    self.report
                        .push(Violation::new(location.clone(), list, Problem::Malformed(why)));
                }
            }
        }
        organics
    }
}

fn lowercase(value: &Value) -> std::result::Result<String, String> {
    parse_text(value).map(|s| s.to_lowercase())
}

/// Bodies of one system as (name from key, body value) pairs.
///
/// A `bodies` wrapper is only recognised when it is the system's sole key,
/// so a body that happens to be called "bodies" is still a body.
fn system_bodies(value: &Value) -> std::result::Result<Vec<(Option<&str>, &Value)>, String> {
    match value {
        Value::Array(items) => Ok(items.iter().map(|v| (None, v)).collect()),
        Value::Object(obj) => match find_field(obj, &["bodies"]) {
            Some(inner @ (Value::Array(_) | Value::Object(_))) if obj.len() == 1 => {
                system_bodies(inner)
            }
            _ => Ok(obj.iter().map(|(k, v)| (Some(k.as_str()), v)).collect()),
        },
        other => Err(format!("expected a list or mapping of bodies, found {}", other)),
    }
}
