//! One parse run: resolve the export, load tables, build indices and the
//! catalog, then write the requested outputs

use anyhow::Result;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::archive::ensure_export_dir;
use crate::catalog::{Catalog, CatalogBuilder};
use crate::filter::resolve_tables;
use crate::index::IdentifierIndex;
use crate::recipes::RecipeIndex;
use crate::services::{FarmingService, ModifierService, OverrideService, TagService, TranslationService};
use crate::source::{GameData, SourceTable};
use crate::tier::TierCalculator;
use crate::ui::{Phase, Ui};
use crate::writer::{write_json, write_markdown, write_sqlite, Metadata};

pub const DATABASE_FILE: &str = "consumables.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Sqlite,
}

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Export directory or `.zip` archive
    pub data: PathBuf,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub overrides_dir: Option<PathBuf>,
    pub index_export: Option<PathBuf>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub cache_dir: Option<PathBuf>,
    pub force: bool,
    pub metadata: Metadata,
}

impl PipelineConfig {
    pub fn new(data: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            output_dir: output_dir.into(),
            formats: vec![OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Sqlite],
            overrides_dir: None,
            index_export: None,
            include: None,
            exclude: None,
            cache_dir: None,
            force: false,
            metadata: Metadata {
                parser_version: env!("CARGO_PKG_VERSION").to_string(),
                game_version: "unknown".to_string(),
            },
        }
    }
}

/// Catalog plus the identifier index it was built with
pub struct Assembly {
    pub catalog: Catalog,
    pub ids: IdentifierIndex,
    pub recipe_count: usize,
}

#[derive(Debug)]
pub struct PipelineSummary {
    pub items: usize,
    pub visible: usize,
    pub recipes: usize,
    pub rows_written: u64,
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items ({} visible) from {} recipes, {} files written in {:.1}s",
            self.items,
            self.visible,
            self.recipes,
            self.outputs.len(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Build indices, services and the catalog from loaded tables
pub fn assemble(data: &GameData, overrides: &OverrideService, ui: &mut impl Ui) -> Assembly {
    ui.set_phase(Phase::Indexing);
    let ids = IdentifierIndex::from_game_data(data);
    ui.log(format!(
        "Identifier index: {} concepts, {} collisions",
        ids.len(),
        ids.collisions()
    ));

    let recipes = RecipeIndex::build(
        data.rows(SourceTable::ProcessorRecipes),
        data.rows(SourceTable::ItemsStatic),
        &ids,
    );
    let recipe_count = recipes.len();
    ui.log(format!("Recipe index: {} recipes", recipe_count));

    let catalog = {
        let tiers = TierCalculator::new(data, &ids, &recipes);
        let translations = TranslationService::new(
            data.rows(SourceTable::Itemable),
            data.rows(SourceTable::ItemsStatic),
        );
        let tags = TagService::new(
            data.rows(SourceTable::CraftingTags),
            data.rows(SourceTable::TagQueries),
        );
        let modifiers = ModifierService::new(data.rows(SourceTable::ModifierStates));
        let farming = FarmingService::new(
            data.rows(SourceTable::FarmingSeeds),
            data.rows(SourceTable::FarmingGrowthStates),
            data.rows(SourceTable::ItemRewards),
        );

        ui.set_phase(Phase::Parsing);
        let builder = CatalogBuilder {
            ids: &ids,
            recipes: &recipes,
            tiers: &tiers,
            translations: &translations,
            tags: &tags,
            modifiers: &modifiers,
            farming: &farming,
            overrides,
        };
        builder.build(data)
    };
    ui.log(format!("Catalog: {} items", catalog.len()));

    Assembly {
        catalog,
        ids,
        recipe_count,
    }
}

/// Resolve the export, load it and assemble the catalog
pub fn load_catalog(config: &PipelineConfig, ui: &mut impl Ui) -> Result<Assembly> {
    let export_dir = ensure_export_dir(&config.data, config.cache_dir.clone(), config.force, ui)?;

    ui.set_phase(Phase::Loading);
    ui.set_info(format!("Export: {}", export_dir.display()));
    let data = GameData::load(&export_dir)?;
    ui.log(format!("Loaded {} rows", data.row_count()));

    let overrides = match &config.overrides_dir {
        Some(dir) => OverrideService::load(dir)?,
        None => OverrideService::default(),
    };

    Ok(assemble(&data, &overrides, ui))
}

/// Write the identifier index dump; a failure is logged and the run goes on
pub fn export_index(ids: &IdentifierIndex, path: &Path) {
    if let Err(e) = ids.write_snapshot(path) {
        warn!(path = ?path, error = %e, "identifier index export failed");
    }
}

pub fn run_pipeline(config: &PipelineConfig, ui: &mut impl Ui) -> Result<PipelineSummary> {
    let start = Instant::now();

    // fail on bad table filters before doing any work
    let tables = if config.formats.contains(&OutputFormat::Sqlite) {
        resolve_tables(config.include.clone(), config.exclude.clone())?
    } else {
        Vec::new()
    };

    let Assembly {
        catalog,
        ids,
        recipe_count,
    } = load_catalog(config, ui)?;

    if let Some(path) = &config.index_export {
        export_index(&ids, path);
    }

    ui.set_phase(Phase::Writing);
    let mut outputs = Vec::new();
    let mut rows_written = 0;
    for format in &config.formats {
        match format {
            OutputFormat::Json => {
                outputs.extend(write_json(&catalog, &config.output_dir, &config.metadata)?);
            }
            OutputFormat::Markdown => {
                outputs.push(write_markdown(&catalog, &config.output_dir)?);
            }
            OutputFormat::Sqlite => {
                let db_path = config.output_dir.join(DATABASE_FILE);
                rows_written += write_sqlite(&catalog, &db_path, &tables, ui)?;
                outputs.push(db_path);
            }
        }
    }
    for path in &outputs {
        ui.log(format!("Wrote {}", path.display()));
    }

    let summary = PipelineSummary {
        items: catalog.len(),
        visible: catalog.visible().count(),
        recipes: recipe_count,
        rows_written,
        outputs,
        elapsed: start.elapsed(),
    };
    ui.set_phase(Phase::Complete);
    info!(
        items = summary.items,
        visible = summary.visible,
        rows = summary.rows_written,
        "pipeline complete"
    );

    Ok(summary)
}
