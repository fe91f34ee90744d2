//! Restructure and load in one go, using the data directory layout of the
//! dataset repository

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::files::check_destination;
use crate::restructure::{restructure_file, RestructureOptions, Restructured};
use crate::ui::{Phase, Ui};
use crate::writer::{load_file, LoadReport};

pub const SOURCE_FILE: &str = "starfield_data_updated.json";
pub const RESOURCES_FILE: &str = "resources.json";
pub const FLAT_FILE: &str = "galaxy.json";
pub const DATABASE_FILE: &str = "sf.db";

/// File locations inside a data directory
#[derive(Debug, Clone)]
pub struct DataDir {
    pub source: PathBuf,
    pub resources: PathBuf,
    pub flat: PathBuf,
    pub database: PathBuf,
}

impl DataDir {
    pub fn new(dir: &Path) -> Self {
        Self {
            source: dir.join(SOURCE_FILE),
            resources: dir.join(RESOURCES_FILE),
            flat: dir.join(FLAT_FILE),
            database: dir.join(DATABASE_FILE),
        }
    }
}

pub struct BuildReport {
    pub restructured: Restructured,
    pub load: LoadReport,
}

/// Run both stages. Both outputs are checked up front so that a refusal to
/// overwrite the database does not leave a fresh flat document behind.
pub fn build(
    dir: &DataDir,
    options: RestructureOptions,
    force: bool,
    ui: &mut impl Ui,
) -> Result<BuildReport> {
    check_destination(&dir.flat, force)?;
    check_destination(&dir.database, force)?;

    let restructured = restructure_file(&dir.source, &dir.resources, &dir.flat, options, force, ui)?;
    let load = load_file(&dir.flat, &dir.database, force, ui)?;

    ui.set_phase(Phase::Complete);
    Ok(BuildReport { restructured, load })
}
