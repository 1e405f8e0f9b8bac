use std::path::PathBuf;

use nu_ansi_term::Color::{Blue, Cyan, Green, Yellow};
use shelf_core::ShelfResult;
use shelf_operations::{import, stats, ShelfContext};
use shelf_utils::path::resolve_path;
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::utils::{icon_or, json_output, print_json, score, Colored, Icons};

pub fn import_seed(ctx: &ShelfContext, file: String) -> ShelfResult<()> {
    let path: PathBuf = resolve_path(&file)?;
    let report = import::import_seed_file(ctx, &path)?;

    if json_output() {
        return print_json(&report);
    }

    info!(
        "{} Imported {} categories ({} already present) and {} entries ({} already present) from {}",
        Colored(Green, icon_or(Icons::CHECK, "+")),
        Colored(Green, report.categories_created),
        report.categories_skipped,
        Colored(Green, report.entries_created),
        report.entries_skipped,
        Colored(Blue, path.display())
    );
    Ok(())
}

pub fn display_stats(ctx: &ShelfContext) -> ShelfResult<()> {
    let stats = stats::catalog_stats(ctx)?;

    if json_output() {
        return print_json(&stats);
    }

    let mut builder = Builder::new();
    builder.push_record([
        format!("{} Entries", icon_or(Icons::PACKAGE, "")),
        Colored(Cyan, stats.total_entries).to_string(),
    ]);
    builder.push_record([
        format!("{} Categories", icon_or(Icons::CATEGORY, "")),
        Colored(Cyan, stats.total_categories).to_string(),
    ]);
    builder.push_record([
        format!("{} Synced", icon_or(Icons::SYNC, "")),
        format!(
            "{} of {}",
            Colored(Green, stats.synced_entries),
            stats.total_entries
        ),
    ]);

    let table = builder
        .build()
        .with(Panel::header("Catalog Overview"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");

    if stats.recent_syncs.is_empty() {
        info!("No entries have been synced yet.");
        return Ok(());
    }

    info!("\nRecently synced:");
    for item in &stats.recent_syncs {
        info!(
            "  {} {} ({}) | popularity {} | maintenance {} | {}",
            Icons::ARROW,
            Colored(Blue, &item.entry.name),
            Colored(Cyan, &item.category.name),
            score(item.entry.popularity_score),
            score(item.entry.maintenance_score),
            Colored(Yellow, item.entry.last_synced_at.as_deref().unwrap_or_default())
        );
    }

    Ok(())
}
