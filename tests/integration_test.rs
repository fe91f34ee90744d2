//! End-to-end tests: nested source -> flat document -> SQLite.
//!
//! Source documents are generated in the shape of the game-data export,
//! restructured, loaded into temporary databases, and queried back.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use starfield_db::pipeline::{build, DataDir, DATABASE_FILE, FLAT_FILE, RESOURCES_FILE, SOURCE_FILE};
use starfield_db::restructure::{restructure, restructure_file, Problem, RestructureOptions};
use starfield_db::schema::ALL_TABLES;
use starfield_db::ui::SilentUi;
use starfield_db::writer::{load_document, load_file};
use starfield_db::{Error, FlatDocument};

// =============================================================================
// Test Configuration
// =============================================================================

/// Random seed for reproducible generated galaxies
const RANDOM_SEED: u64 = 42;

fn catalog() -> Value {
    json!([
        {"resource": "Iron", "shortName": "Fe", "rarity": "Common",
         "type": "Inorganic", "mass": 0.9, "value": 5, "valueToMass": 5.56},
        {"resource": "Helium-3", "shortName": "He-3", "rarity": "Uncommon",
         "type": "Inorganic", "mass": 0.2, "value": 8},
        {"resource": "Fiber", "shortName": "Fib", "rarity": "Common",
         "type": "Organic", "mass": 0.1, "value": 2},
        {"resource": "Aldumite", "shortName": "Ad", "rarity": "Unique",
         "type": "Inorganic", "mass": 1.0, "value": 100},
        {"resource": "Adhesive", "shortName": "Adh", "rarity": "Common",
         "type": "Manufactured", "mass": 0.5, "value": 10}
    ])
}

fn body(fauna: u32, flora: u32, resources: &[&str]) -> Value {
    json!({
        "type": "Rock",
        "gravity": "0.71g",
        "temperature": "Cold",
        "atmosphere": "Thin CO2",
        "magnetosphere": "Weak",
        "water": "None",
        "fauna": fauna.to_string(),
        "flora": flora.to_string(),
        "hab_rank": "2",
        "planet_length": "24 hours",
        "biomes": ["Frozen Plains 60%", "Frozen Mountains 40%"],
        "traits": [],
        "resources": resources,
        "domesticable": [],
        "gatherable": ["Ashta (Fiber)"]
    })
}

/// 2 systems, 5 bodies
fn two_system_source() -> Value {
    json!({
        "Alpha Centauri": {
            "Jemison": body(3, 2, &["Fe", "He-3"]),
            "Gagarin": body(0, 0, &["Iron"]),
            "Alpha Centauri I": body(0, 0, &[])
        },
        "Sol": {
            "Earth": body(0, 0, &["Aldumite"]),
            "Luna": body(0, 0, &["fe"])
        }
    })
}

/// A random galaxy: system name -> (body names)
fn random_source(rng: &mut StdRng) -> (Value, Vec<(String, usize)>) {
    let names = ["Fe", "He-3", "Fib", "Ad", "Adh"];
    let mut source = serde_json::Map::new();
    let mut shape = Vec::new();

    for s in 0..rng.gen_range(1..8) {
        let system = format!("System {}", s);
        let mut bodies = serde_json::Map::new();
        let count = rng.gen_range(1..10);
        for b in 0..count {
            let picked: Vec<&str> = names.iter().copied().filter(|_| rng.gen_bool(0.4)).collect();
            bodies.insert(
                format!("{} {}", system, b),
                body(rng.gen_range(0..5), rng.gen_range(0..5), &picked),
            );
        }
        source.insert(system.clone(), Value::Object(bodies));
        shape.push((system, count));
    }

    (Value::Object(source), shape)
}

fn flatten(source: &Value) -> FlatDocument {
    restructure(source, &catalog(), RestructureOptions::default())
        .expect("source should be valid")
        .document
}

fn load(doc: &FlatDocument, db: &Path) {
    let value = serde_json::to_value(doc).expect("document serializes");
    load_document(&value, ALL_TABLES, db, false, &mut SilentUi).expect("load succeeds");
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Every row of a table, rendered and sorted so stores can be compared
fn row_set(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table)).unwrap();
    let width = stmt.column_count();
    let mut rows: Vec<String> = stmt
        .query_map([], |row| {
            let values: Vec<rusqlite::types::Value> =
                (0..width).map(|i| row.get(i)).collect::<Result<_, _>>()?;
            Ok(format!("{:?}", values))
        })
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    rows.sort();
    rows
}

// =============================================================================
// Shared Test Database
// =============================================================================

/// The two-system galaxy, loaded once and reused
static TEST_DB: Lazy<Mutex<TestDatabase>> = Lazy::new(|| Mutex::new(TestDatabase::new()));

struct TestDatabase {
    _dir: TempDir,
    db_path: PathBuf,
}

impl TestDatabase {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("sf.db");
        load(&flatten(&two_system_source()), &db_path);
        Self { _dir: dir, db_path }
    }

    fn connection(&self) -> Connection {
        Connection::open(&self.db_path).expect("Failed to open test database")
    }
}

fn get_test_db() -> Connection {
    TEST_DB.lock().unwrap().connection()
}

// =============================================================================
// Loaded Database
// =============================================================================

#[test]
fn test_body_count_per_system() {
    let conn = get_test_db();
    let mut stmt = conn
        .prepare(
            "SELECT s.name, s.body_count, COUNT(b.name)
             FROM systems s LEFT JOIN bodies b ON b.system = s.name
             GROUP BY s.name ORDER BY s.name",
        )
        .unwrap();
    let counts: Vec<(String, i64, i64)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        counts,
        vec![
            ("Alpha Centauri".to_string(), 3, 3),
            ("Sol".to_string(), 2, 2),
        ]
    );
}

#[test]
fn test_every_body_resolves_to_a_system() {
    let conn = get_test_db();
    let total: i64 = conn
        .query_row("SELECT COUNT(*) FROM bodies", [], |r| r.get(0))
        .unwrap();
    let resolved: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM bodies b JOIN systems s ON s.name = b.system",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(resolved, 5);

    let mut check = conn.prepare("PRAGMA foreign_key_check").unwrap();
    let violations = check.query_map([], |_| Ok(())).unwrap().count();
    assert_eq!(violations, 0);
}

#[test]
fn test_resource_references_use_full_names() {
    let conn = get_test_db();
    let mut stmt = conn
        .prepare("SELECT resource FROM body_resources WHERE body = 'Jemison' ORDER BY resource")
        .unwrap();
    let names: Vec<String> = stmt
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(names, ["Helium-3", "Iron"]);

    let luna: String = conn
        .query_row(
            "SELECT resource FROM body_resources WHERE body = 'Luna'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(luna, "Iron");
}

#[test]
fn test_lookup_tables_are_seeded() {
    let conn = get_test_db();
    assert_eq!(
        row_set(&conn, "resource_rarities").len(),
        5,
        "rarities: common/uncommon/rare/exotic/unique"
    );
    assert_eq!(row_set(&conn, "resource_types").len(), 3);

    let derived: f64 = conn
        .query_row(
            "SELECT value_to_mass FROM resources WHERE name = 'Fiber'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!((derived - 20.0).abs() < 1e-9);
}

#[test]
fn test_organics_are_flagged_gatherable() {
    let conn = get_test_db();
    let (rows, domesticable): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), SUM(domesticable) FROM body_organics",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(rows, 5);
    assert_eq!(domesticable, 0);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_random_galaxies_keep_one_row_per_body() {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);

    for _ in 0..10 {
        let (source, shape) = random_source(&mut rng);
        let doc = flatten(&source);

        let expected_bodies: usize = shape.iter().map(|(_, n)| n).sum();
        assert_eq!(doc.bodies.len(), expected_bodies);

        let pairs: HashSet<(&str, &str)> = doc
            .bodies
            .iter()
            .map(|b| (b.system.as_str(), b.name.as_str()))
            .collect();
        assert_eq!(pairs.len(), expected_bodies);

        for (system, count) in &shape {
            let row = doc.systems.iter().find(|s| &s.name == system).unwrap();
            assert_eq!(row.body_count as usize, *count);
        }

        for r in &doc.body_resources {
            assert!(doc.resources.iter().any(|res| res.name == r.resource));
        }
    }
}

#[test]
fn test_loading_twice_gives_identical_rows() {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED + 1);
    let (source, _) = random_source(&mut rng);
    let doc = flatten(&source);

    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.db");
    let second = dir.path().join("second.db");
    load(&doc, &first);
    load(&doc, &second);

    let a = Connection::open(&first).unwrap();
    let b = Connection::open(&second).unwrap();
    for table in ALL_TABLES {
        assert_eq!(row_set(&a, table.name), row_set(&b, table.name), "{}", table.name);
    }
}

// =============================================================================
// Failure Scenarios
// =============================================================================

#[test]
fn test_unknown_resource_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("source.json");
    let catalog_path = dir.path().join("resources.json");
    let output = dir.path().join("galaxy.json");

    let mut alpha = body(3, 0, &["Unobtainium"]);
    alpha["gatherable"] = json!([]);
    write_json(&source_path, &json!({"Alpha-1": {"Alpha-1 I": alpha}}));
    write_json(&catalog_path, &catalog());

    let err = restructure_file(
        &source_path,
        &catalog_path,
        &output,
        RestructureOptions::default(),
        false,
        &mut SilentUi,
    )
    .unwrap_err();

    let report = match err {
        Error::Validation(report) => report,
        other => panic!("expected a validation error, got {other}"),
    };
    assert_eq!(report.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.body(), Some("Alpha-1 I"));
    assert_eq!(violation.field, "resource: Unobtainium");
    assert_eq!(violation.problem, Problem::UnknownResource);

    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_out_of_set_rarity_is_rejected_by_the_loader() {
    let mut doc = serde_json::to_value(flatten(&two_system_source())).unwrap();
    doc["resources"][0]["rarity"] = json!("legendary");

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sf.db");
    let err = load_document(&doc, ALL_TABLES, &db, false, &mut SilentUi).unwrap_err();

    assert!(
        matches!(err, Error::MalformedDocument { ref table, row: 0, .. } if table == "resources")
    );
    assert!(!db.exists());
}

#[test]
fn test_edited_rarity_section_is_rejected_by_the_loader() {
    let mut doc = serde_json::to_value(flatten(&two_system_source())).unwrap();
    doc["resource_rarities"]
        .as_array_mut()
        .unwrap()
        .push(json!({"name": "legendary"}));
    doc["resources"][0]["rarity"] = json!("legendary");

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sf.db");
    let err = load_document(&doc, ALL_TABLES, &db, false, &mut SilentUi).unwrap_err();

    assert!(matches!(
        err,
        Error::MalformedDocument { ref table, row: 5, .. } if table == "resource_rarities"
    ));
    assert!(!db.exists());
}

#[test]
fn test_child_row_filed_under_another_system_is_rejected() {
    let mut doc = serde_json::to_value(flatten(&two_system_source())).unwrap();
    doc["traits"] = json!([{"system": "Alpha Centauri", "body": "Earth", "trait": "Humans"}]);

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("sf.db");
    let err = load_document(&doc, ALL_TABLES, &db, false, &mut SilentUi).unwrap_err();

    assert!(matches!(err, Error::Integrity { ref table, row: 0, .. } if table == "traits"));
    assert!(!db.exists());
}

#[test]
fn test_hand_edited_document_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let flat = dir.path().join("galaxy.json");
    let db = dir.path().join("sf.db");

    let mut doc = serde_json::to_value(flatten(&two_system_source())).unwrap();
    doc["traits"] = json!([{"system": "Sol", "body": "Earth", "trait": "Humans"}]);
    write_json(&flat, &doc);

    let report = load_file(&flat, &db, false, &mut SilentUi).unwrap();
    assert_eq!(report.rows_in("traits"), Some(1));
    assert_eq!(report.rows_in("bodies"), Some(5));
}

// =============================================================================
// Data Directory Build
// =============================================================================

#[test]
fn test_build_from_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    write_json(&dir.path().join(SOURCE_FILE), &two_system_source());
    write_json(&dir.path().join(RESOURCES_FILE), &catalog());

    let data = DataDir::new(dir.path());
    let report = build(&data, RestructureOptions::default(), false, &mut SilentUi).unwrap();
    assert_eq!(report.restructured.document.bodies.len(), 5);
    assert_eq!(report.load.rows_in("systems"), Some(2));
    assert!(dir.path().join(FLAT_FILE).exists());
    assert!(dir.path().join(DATABASE_FILE).exists());

    // A second run must not clobber the outputs without --force
    let again = build(&data, RestructureOptions::default(), false, &mut SilentUi);
    assert!(matches!(again, Err(Error::DestinationExists(_))));

    build(&data, RestructureOptions::default(), true, &mut SilentUi).unwrap();
}
