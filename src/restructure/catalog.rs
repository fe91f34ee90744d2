use serde_json::Value;
use std::collections::HashMap;

use super::validate::{Location, Problem, ValidationReport, Violation};
use crate::model::{Rarity, ResourceRow, ResourceType};
use crate::parser::{find_field, parse_text};

/// The static resource catalog, indexed by full and short name
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    rows: Vec<ResourceRow>,
    /// lowercased full or short name -> canonical full name
    index: HashMap<String, String>,
}

impl ResourceCatalog {
    /// Parse the catalog array, recording a violation for every bad entry.
    ///
    /// Names of invalid entries are still indexed so that body references to
    /// them are not reported a second time as unknown.
    pub fn from_value(json: &Value, report: &mut ValidationReport) -> Self {
        let mut catalog = Self::default();

        let Some(entries) = json.as_array() else {
            report.push(Violation::new(
                Location::Document,
                "resources",
                Problem::Malformed("resource catalog must be an array".to_string()),
            ));
            return catalog;
        };

        for (i, entry) in entries.iter().enumerate() {
            catalog.add_entry(i, entry, report);
        }

        catalog
    }

    fn add_entry(&mut self, position: usize, entry: &Value, report: &mut ValidationReport) {
        let Some(obj) = entry.as_object() else {
            report.push(Violation::new(
                Location::Resource(format!("#{}", position)),
                "entry",
                Problem::Malformed(format!("expected an object, found {}", entry)),
            ));
            return;
        };

        let label = match find_field(obj, &["resource", "name"]).map(parse_text) {
            Some(Ok(n)) => n,
            _ => format!("#{}", position),
        };
        let location = || Location::Resource(label.clone());
        let before = report.len();

        let mut text = |aliases: &[&str], field: &str| -> Option<String> {
            match find_field(obj, aliases) {
                None | Some(Value::Null) => {
                    report.push(Violation::new(location(), field, Problem::Missing));
                    None
                }
                Some(v) => match parse_text(v) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        report.push(Violation::new(location(), field, Problem::Malformed(e)));
                        None
                    }
                },
            }
        };

        let name = text(&["resource", "name"], "name");
        let short_name = text(&["shortName", "short_name"], "shortName");
        let rarity_text = text(&["rarity"], "rarity");
        let type_text = text(&["type"], "type");

        let rarity = rarity_text.and_then(|r| {
            let parsed = Rarity::parse(&r);
            if parsed.is_none() {
                report.push(Violation::new(
                    location(),
                    "rarity",
                    Problem::OutOfSet {
                        value: r,
                        allowed: Rarity::NAMES,
                    },
                ));
            }
            parsed
        });
        let resource_type = type_text.and_then(|t| {
            let parsed = ResourceType::parse(&t);
            if parsed.is_none() {
                report.push(Violation::new(
                    location(),
                    "type",
                    Problem::OutOfSet {
                        value: t,
                        allowed: ResourceType::NAMES,
                    },
                ));
            }
            parsed
        });

        let mut number = |field: &str| -> Option<f64> {
            match find_field(obj, &[field]) {
                None | Some(Value::Null) => {
                    report.push(Violation::new(location(), field, Problem::Missing));
                    None
                }
                Some(v) => match v.as_f64() {
                    Some(n) if n.is_finite() && n >= 0.0 => Some(n),
                    _ => {
                        report.push(Violation::new(
                            location(),
                            field,
                            Problem::Malformed(format!("expected a non-negative number, found {}", v)),
                        ));
                        None
                    }
                },
            }
        };

        let mass = number("mass");
        let value = number("value");
        let value_to_mass = match find_field(obj, &["valueToMass", "value_to_mass"]) {
            Some(v) if !v.is_null() => match v.as_f64() {
                Some(n) => Some(n),
                None => {
                    report.push(Violation::new(
                        location(),
                        "valueToMass",
                        Problem::Malformed(format!("expected a number, found {}", v)),
                    ));
                    None
                }
            },
            _ => match (mass, value) {
                (Some(m), Some(v)) if m > 0.0 => Some(v / m),
                _ => None,
            },
        };

        if let Some(name) = &name {
            if let Some(existing) = self.index.get(&name.to_lowercase()) {
                report.push(Violation::new(
                    location(),
                    "name",
                    Problem::Duplicate(format!("resource {}", existing)),
                ));
                return;
            }
        }
        if let (Some(name), Some(short)) = (&name, &short_name) {
            if let Some(existing) = self.index.get(&short.to_lowercase()) {
                if !existing.eq_ignore_ascii_case(name) {
                    report.push(Violation::new(
                        location(),
                        "shortName",
                        Problem::Duplicate(format!("resource {}", existing)),
                    ));
                    return;
                }
            }
        }

        if let Some(name) = &name {
            self.index.insert(name.to_lowercase(), name.clone());
            if let Some(short) = &short_name {
                self.index.insert(short.to_lowercase(), name.clone());
            }
        }

        if report.len() > before {
            return;
        }

        if let (Some(name), Some(short_name), Some(rarity), Some(resource_type), Some(mass), Some(value)) =
            (name, short_name, rarity, resource_type, mass, value)
        {
            self.rows.push(ResourceRow {
                name,
                short_name,
                rarity,
                resource_type,
                mass,
                value,
                value_to_mass,
            });
        }
    }

    /// Canonical full name for a full or short name, ignoring case
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        self.index
            .get(&reference.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn rows(&self) -> &[ResourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
