use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{OutputFormat, PipelineConfig};
use crate::writer::Metadata;

#[derive(Parser, Debug)]
#[command(name = "icarus-consumables")]
#[command(version, about = "Build a consumables catalog from Icarus game data exports")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse an export and write the catalog outputs
    Parse {
        /// Export directory or .zip archive
        data: PathBuf,

        /// Directory for generated files
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Output formats (comma-separated)
        #[arg(long, value_enum, value_delimiter = ',', default_value = "json,markdown,sqlite")]
        format: Vec<OutputFormat>,

        /// Directory of override JSON files
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Also dump the identifier index to this file
        #[arg(long)]
        index_export: Option<PathBuf>,

        /// Only include these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Custom cache directory for extracted archives
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,

        /// Force re-extraction even if cached
        #[arg(short, long)]
        force: bool,

        #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
        parser_version: String,

        #[arg(long, default_value = "unknown")]
        game_version: String,

        /// Show the full-screen progress UI
        #[arg(long)]
        tui: bool,

        /// Write logs to this file instead of stderr
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Print one item's catalog record as JSON
    Inspect {
        /// Export directory or .zip archive
        data: PathBuf,

        /// Item name (case-insensitive)
        item: String,

        /// Directory of override JSON files
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Custom cache directory for extracted archives
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,
    },

    /// List all catalog table names
    ListTables,

    /// List the source tables read from an export
    ListSources,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

impl Commands {
    /// Pipeline settings for `parse` and `inspect`; `None` for listing commands
    pub fn pipeline_config(&self) -> Option<PipelineConfig> {
        match self {
            Commands::Parse {
                data,
                output_dir,
                format,
                overrides,
                index_export,
                include,
                exclude,
                cache_dir,
                force,
                parser_version,
                game_version,
                ..
            } => Some(PipelineConfig {
                data: data.clone(),
                output_dir: output_dir.clone(),
                formats: format.clone(),
                overrides_dir: overrides.clone(),
                index_export: index_export.clone(),
                include: include.clone(),
                exclude: exclude.clone(),
                cache_dir: cache_dir.clone(),
                force: *force,
                metadata: Metadata {
                    parser_version: parser_version.clone(),
                    game_version: game_version.clone(),
                },
            }),
            Commands::Inspect {
                data,
                overrides,
                cache_dir,
                ..
            } => {
                let mut config = PipelineConfig::new(data.clone(), PathBuf::new());
                config.overrides_dir = overrides.clone();
                config.cache_dir = cache_dir.clone();
                config.formats.clear();
                Some(config)
            }
            Commands::ListTables | Commands::ListSources => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["icarus-consumables", "parse", "export.zip"]).unwrap();
        let config = cli.command.pipeline_config().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(
            config.formats,
            vec![OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Sqlite]
        );
        assert_eq!(config.metadata.game_version, "unknown");
        assert!(!config.force);
    }

    #[test]
    fn test_parse_format_list() {
        let cli = Cli::try_parse_from([
            "icarus-consumables",
            "parse",
            "data",
            "--format",
            "json,sqlite",
            "--exclude",
            "recipes,item_modifiers",
            "--game-version",
            "2.3.1",
        ])
        .unwrap();
        let config = cli.command.pipeline_config().unwrap();
        assert_eq!(config.formats, vec![OutputFormat::Json, OutputFormat::Sqlite]);
        assert_eq!(
            config.exclude,
            Some(vec!["recipes".to_string(), "item_modifiers".to_string()])
        );
        assert_eq!(config.metadata.game_version, "2.3.1");
    }

    #[test]
    fn test_listing_commands_have_no_config() {
        let cli = Cli::try_parse_from(["icarus-consumables", "list-sources"]).unwrap();
        assert!(cli.command.pipeline_config().is_none());
    }
}
