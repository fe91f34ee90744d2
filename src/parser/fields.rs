//! Coercions for the loosely-typed values found in the source export
//!
//! The export mixes numbers and annotated strings ("0.71g", "24 hours",
//! "Frozen Plains 40%"). Each helper accepts both forms and returns an
//! explanation when the value cannot be read.

use serde_json::{Map, Value};

/// Look up a key case-insensitively, trying each alias in turn
pub fn find_field<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        obj.get(*alias).or_else(|| {
            obj.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(alias))
                .map(|(_, v)| v)
        })
    })
}

/// Non-empty trimmed text
pub fn parse_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::String(_) => Err("empty string".to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected text, found {}", other)),
    }
}

/// Surface gravity in g; accepts `0.71` or `"0.71g"`
pub fn parse_gravity(value: &Value) -> Result<f64, String> {
    let g = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_suffix(|c: char| c == 'g' || c == 'G').unwrap_or(s);
            s.trim().parse::<f64>().ok()
        }
        _ => None,
    };

    match g {
        Some(g) if g.is_finite() && g >= 0.0 => Ok(g),
        _ => Err(format!("unreadable gravity {}", value)),
    }
}

/// Non-negative integer count; accepts `3` or `"3"`
pub fn parse_count(value: &Value) -> Result<i64, String> {
    let n = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match n {
        Some(n) if n >= 0 => Ok(n),
        _ => Err(format!("expected a non-negative integer, found {}", value)),
    }
}

/// Day length in hours; accepts `24`, `"24"`, `"24 hours"` or `"3.5 days"`
pub fn parse_day_length(value: &Value) -> Result<f64, String> {
    let hours = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let mut parts = s.split_whitespace();
            let amount = parts.next().and_then(|p| p.parse::<f64>().ok());
            let unit = parts.next().map(|u| u.to_ascii_lowercase());
            match (amount, unit.as_deref(), parts.next()) {
                (Some(a), None | Some("h" | "hr" | "hrs" | "hour" | "hours"), None) => Some(a),
                (Some(a), Some("d" | "day" | "days"), None) => Some(a * 24.0),
                _ => None,
            }
        }
        _ => None,
    };

    match hours {
        Some(h) if h.is_finite() && h > 0.0 => Ok(h),
        _ => Err(format!("unreadable day length {}", value)),
    }
}

/// A biome entry: `"Frozen Plains 40%"`, `"Frozen Plains"`, or
/// `{"name": ..., "coverage": ...}`. Returns (biome, coverage).
pub fn parse_biome(value: &Value) -> Result<(String, Option<String>), String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            match s.rsplit_once(' ') {
                Some((name, pct)) if pct.ends_with('%') => {
                    let number = pct.trim_end_matches('%');
                    if number.parse::<f64>().is_err() {
                        return Err(format!("unreadable biome coverage {:?}", s));
                    }
                    Ok((name.trim().to_string(), Some(pct.to_string())))
                }
                _ if !s.is_empty() => Ok((s.to_string(), None)),
                _ => Err("empty biome".to_string()),
            }
        }
        Value::Object(obj) => {
            let name = find_field(obj, &["name", "biome"])
                .ok_or_else(|| "biome without a name".to_string())
                .and_then(parse_text)?;
            let coverage = match find_field(obj, &["coverage"]) {
                None | Some(Value::Null) => None,
                Some(v) => Some(parse_text(v)?),
            };
            Ok((name, coverage))
        }
        other => Err(format!("unreadable biome {}", other)),
    }
}

/// An organism entry: `"Grazer (Fiber)"` or `{"name": ..., "resource": ...}`.
/// Returns (organism, resource).
///
/// The resource is the last parenthesised group and the name is everything
/// before the first, so `"Gorgon (Juvenile) (Fiber)"` is a Gorgon yielding
/// Fiber.
pub fn parse_organism(value: &Value) -> Result<(String, String), String> {
    match value {
        Value::String(s) => {
            let malformed = || format!("expected \"Organism (Resource)\", found {:?}", s);
            let (name, _) = s.split_once('(').ok_or_else(malformed)?;
            let (_, last) = s.rsplit_once('(').ok_or_else(malformed)?;
            let resource = last.trim().trim_end_matches(')').trim();
            let name = name.trim();
            if name.is_empty() || resource.is_empty() {
                return Err(format!("expected \"Organism (Resource)\", found {:?}", s));
            }
            Ok((name.to_string(), resource.to_string()))
        }
        Value::Object(obj) => {
            let name = find_field(obj, &["name", "organism"])
                .ok_or_else(|| "organism without a name".to_string())
                .and_then(parse_text)?;
            let resource = find_field(obj, &["resource"])
                .ok_or_else(|| format!("organism {:?} without a resource", name))
                .and_then(parse_text)?;
            Ok((name, resource))
        }
        other => Err(format!("unreadable organism {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_field_ignores_case_and_tries_aliases() {
        let obj = json!({"Planet_Length": "24 hours", "Fauna": "2"});
        let obj = obj.as_object().unwrap();
        assert_eq!(
            find_field(obj, &["day_length", "planet_length"]),
            Some(&json!("24 hours"))
        );
        assert_eq!(find_field(obj, &["fauna_count", "fauna"]), Some(&json!("2")));
        assert_eq!(find_field(obj, &["water"]), None);
    }

    #[test]
    fn test_parse_gravity() {
        assert_eq!(parse_gravity(&json!("0.71g")), Ok(0.71));
        assert_eq!(parse_gravity(&json!(" 1.2 g")), Ok(1.2));
        assert_eq!(parse_gravity(&json!(0.5)), Ok(0.5));
        assert!(parse_gravity(&json!("heavy")).is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&json!("3")), Ok(3));
        assert_eq!(parse_count(&json!(0)), Ok(0));
        assert!(parse_count(&json!("Unknown")).is_err());
        assert!(parse_count(&json!(-1)).is_err());
    }

    #[test]
    fn test_parse_day_length_units() {
        assert_eq!(parse_day_length(&json!("24 hours")), Ok(24.0));
        assert_eq!(parse_day_length(&json!("2 days")), Ok(48.0));
        assert_eq!(parse_day_length(&json!(30.5)), Ok(30.5));
        assert!(parse_day_length(&json!("Unknown")).is_err());
        assert!(parse_day_length(&json!("24 parsecs")).is_err());
    }

    #[test]
    fn test_parse_biome() {
        assert_eq!(
            parse_biome(&json!("Frozen Plains 40%")),
            Ok(("Frozen Plains".to_string(), Some("40%".to_string())))
        );
        assert_eq!(
            parse_biome(&json!("Ocean")),
            Ok(("Ocean".to_string(), None))
        );
        assert_eq!(
            parse_biome(&json!({"name": "Swamp", "coverage": "sparse"})),
            Ok(("Swamp".to_string(), Some("sparse".to_string())))
        );
        assert!(parse_biome(&json!("Desert x%")).is_err());
    }

    #[test]
    fn test_parse_organism() {
        assert_eq!(
            parse_organism(&json!("Ashta (Fiber)")),
            Ok(("Ashta".to_string(), "Fiber".to_string()))
        );
        assert_eq!(
            parse_organism(&json!({"name": "Ashta", "resource": "Fiber"})),
            Ok(("Ashta".to_string(), "Fiber".to_string()))
        );
        assert!(parse_organism(&json!("Ashta")).is_err());
    }

    #[test]
    fn test_parse_organism_takes_last_group_as_resource() {
        assert_eq!(
            parse_organism(&json!("Gorgon (Juvenile) (Fiber)")),
            Ok(("Gorgon".to_string(), "Fiber".to_string()))
        );
        assert!(parse_organism(&json!("(Fiber)")).is_err());
        assert!(parse_organism(&json!("Gorgon ()")).is_err());
    }
}
