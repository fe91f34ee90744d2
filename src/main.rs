use anyhow::{Context, Result};
use starfield_db::{
    cli::{Cli, Commands},
    pipeline::{build, DataDir},
    restructure::{restructure_file, RestructureOptions},
    schema::{DependencyResolver, ALL_TABLES},
    ui::{ConsoleUi, Phase, Ui},
    writer::{generate_schema_sql, load_file},
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut ui = ConsoleUi::new();

    match cli.command {
        Commands::Restructure {
            source,
            output,
            resources,
            lenient,
            force,
        } => {
            let start = Instant::now();

            let restructured = restructure_file(
                &source,
                &resources,
                &output,
                RestructureOptions { lenient },
                force,
                &mut ui,
            )
            .with_context(|| format!("Failed to restructure {:?}", source))?;

            ui.set_phase(Phase::Complete);
            println!(
                "Created {:?} ({} systems, {} bodies) in {:.1}s",
                output,
                restructured.document.systems.len(),
                restructured.document.bodies.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Load {
            input,
            output_db,
            force,
        } => {
            let start = Instant::now();

            let report = load_file(&input, &output_db, force, &mut ui)
                .with_context(|| format!("Failed to load {:?} into {:?}", input, output_db))?;

            ui.set_phase(Phase::Complete);
            println!(
                "Created {:?} ({} records) in {:.1}s",
                output_db,
                report.total_rows(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Build {
            data_dir,
            lenient,
            force,
        } => {
            let start = Instant::now();
            let dir = DataDir::new(&data_dir);

            let report = build(&dir, RestructureOptions { lenient }, force, &mut ui)
                .with_context(|| format!("Failed to build database in {:?}", data_dir))?;

            println!(
                "Created {:?} and {:?} ({} records) in {:.1}s",
                dir.flat,
                dir.database,
                report.load.total_rows(),
                start.elapsed().as_secs_f64()
            );
        }

        Commands::Tables => {
            let order = DependencyResolver::new(ALL_TABLES)?.insertion_order()?;
            println!("Tables in insertion order:\n");
            for table in order {
                println!("  {}", table.name);
            }
        }

        Commands::Schema => {
            let order = DependencyResolver::new(ALL_TABLES)?.insertion_order()?;
            print!("{}", generate_schema_sql(&order));
        }
    }

    Ok(())
}
