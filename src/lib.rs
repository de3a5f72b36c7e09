pub mod archive;
pub mod catalog;
pub mod cli;
pub mod filter;
pub mod index;
pub mod logging;
pub mod pipeline;
pub mod recipes;
pub mod schema;
pub mod services;
pub mod source;
pub mod tier;
pub mod ui;
pub mod writer;

pub use catalog::{Catalog, Consumable};
pub use cli::{Cli, Commands};
pub use pipeline::{run_pipeline, OutputFormat, PipelineConfig, PipelineSummary};
pub use ui::{LogUi, Phase, SilentUi, Ui, UiApp};
