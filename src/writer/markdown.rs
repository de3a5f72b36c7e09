use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::{Catalog, Consumable};
use crate::services::Category;

pub const MARKDOWN_FILE: &str = "consumables.md";

const HEADER: &str = "| Item | Effects | Modifier | Duration | Ingredients | Bench | Tier | Requirements |";
const DIVIDER: &str = "| :--- | :--- | :--- | :--- | :--- | :--- | :--- | :--- |";

/// Render the guide: one table per category, cheapest tier first
pub fn render_markdown(catalog: &Catalog) -> String {
    let mut lines = vec!["# Icarus Consumables Guide\n".to_string()];

    for category in Category::ALL {
        let mut items: Vec<&Consumable> = catalog.visible().filter(|i| i.category == category).collect();
        if items.is_empty() {
            continue;
        }
        items.sort_by(|a, b| a.tier.total_tier.total_cmp(&b.tier.total_tier));

        lines.push(format!("## {}\n", category.title()));
        lines.push(HEADER.to_string());
        lines.push(DIVIDER.to_string());
        lines.extend(items.into_iter().map(item_line));
        lines.push("\n".to_string());
    }

    lines.join("\n")
}

fn item_line(item: &Consumable) -> String {
    let effects = item
        .base_stats
        .iter()
        .map(|(name, value)| format!("{}: {:+}", name, value))
        .collect::<Vec<_>>()
        .join(", ");

    let (modifier, duration) = match item.modifiers.first() {
        Some(m) => {
            let effects = m
                .effects
                .iter()
                .map(|e| format!("{}: {:+}", e.name, e.value))
                .collect::<Vec<_>>()
                .join(", ");
            (format!("{} ({})", m.display_name, effects), format!("{}s", m.lifetime))
        }
        None => ("- (-)".to_string(), "-".to_string()),
    };

    let (ingredients, bench, requirements) = match item.recipes.first() {
        Some(r) => {
            let ingredients = r
                .inputs
                .iter()
                .map(|i| format!("{}x {}", i.count, i.display_name))
                .collect::<Vec<_>>()
                .join(", ");

            let mut reqs = Vec::new();
            if let Some(talent) = &r.requirement {
                reqs.push(format!("Talent: {}", talent));
            }
            if let Some(flag) = &r.character_req {
                reqs.push(format!("Flag: {}", flag));
            }
            if let Some(session) = &r.session_req {
                reqs.push(format!("Session: {}", session));
            }
            let reqs = if reqs.is_empty() { "-".to_string() } else { reqs.join("; ") };

            (ingredients, r.bench_names.join(", "), reqs)
        }
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };

    let tier = if item.tier.is_harvested {
        "0".to_string()
    } else {
        format!("{:.1}", item.tier.total_tier)
    };

    format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} |",
        item.display_name, effects, modifier, duration, ingredients, bench, tier, requirements
    )
}

pub fn write_markdown(catalog: &Catalog, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    let path = output_dir.join(MARKDOWN_FILE);
    fs::write(&path, render_markdown(catalog)).with_context(|| format!("Failed to write {:?}", path))?;
    info!(path = ?path, "markdown written");
    Ok(path)
}
