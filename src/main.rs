use anyhow::{bail, Context, Result};
use icarus_consumables::{
    cli::{Cli, Commands},
    logging,
    pipeline::{load_catalog, run_pipeline},
    schema::get_table,
    schema::table_names,
    source::ALL_SOURCES,
    ui::{LogUi, SilentUi, UiApp},
};
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = cli.command.pipeline_config();

    match cli.command {
        Commands::Parse { tui, log_file, .. } => {
            let config = config.context("parse command without pipeline settings")?;

            // the terminal UI owns the screen, so logs always go to a file
            let log_file = match (tui, log_file) {
                (_, Some(path)) => Some(path),
                (true, None) => Some(config.output_dir.join("icarus-consumables.log")),
                (false, None) => None,
            };
            logging::init(cli.verbose, log_file.as_deref())?;

            if tui {
                let mut ui = UiApp::new()?;
                match run_pipeline(&config, &mut ui) {
                    Ok(summary) => ui.finish(&summary.to_string())?,
                    Err(e) => {
                        ui.restore()?;
                        return Err(e);
                    }
                }
            } else {
                let summary = run_pipeline(&config, &mut LogUi::new())?;
                println!("\n{}", summary);
                for path in &summary.outputs {
                    println!("  {}", path.display());
                }
            }
        }

        Commands::Inspect { ref item, .. } => {
            logging::init(cli.verbose, None)?;
            let config = config.context("inspect command without pipeline settings")?;

            let assembly = load_catalog(&config, &mut SilentUi::new())?;
            let Some(record) = assembly.catalog.get(item) else {
                bail!("Item not found: {}", item);
            };
            println!("{}", serde_json::to_string_pretty(record)?);
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                let description = get_table(name).map(|t| t.description).unwrap_or_default();
                println!("  {:<18} {}", name, description);
            }
        }

        Commands::ListSources => {
            println!("Source tables:\n");
            for table in ALL_SOURCES {
                let required = if table.required() { "required" } else { "optional" };
                println!(
                    "  {:<24} {:<40} {}",
                    table.name(),
                    PathBuf::from(table.relative_path()).display(),
                    required
                );
            }
        }
    }

    Ok(())
}
