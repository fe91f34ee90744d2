pub mod cli;
pub mod error;
pub mod files;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod restructure;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{Error, Result};
pub use model::FlatDocument;
pub use restructure::{restructure, restructure_file, RestructureOptions, ValidationReport};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui};
pub use writer::{load_document, load_file, LoadReport};
