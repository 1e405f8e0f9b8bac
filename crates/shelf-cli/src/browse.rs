use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed, Magenta, Yellow};
use shelf_core::ShelfResult;
use shelf_db::{models::catalog::EntryWithCategory, repository::entry::EntrySort};
use shelf_operations::{catalog, entry, ListOptions, ShelfContext};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::{debug, info};

use crate::utils::{
    display_settings, icon_or, json_output, metric, print_json, score, short_date, term_width,
    Colored, Icons,
};

fn entries_table(title: &str, entries: &[EntryWithCategory]) -> String {
    let mut builder = Builder::new();
    builder.push_record([
        "Name".to_string(),
        "Category".to_string(),
        format!("{} Stars", icon_or(Icons::STAR, "")),
        "Popularity".to_string(),
        "Maintenance".to_string(),
        "Synced".to_string(),
    ]);

    for item in entries {
        let entry = &item.entry;
        builder.push_record([
            format!(
                "{} ({})",
                Colored(Blue, &entry.name),
                Colored(Cyan, &entry.slug)
            ),
            Colored(Green, &item.category.name).to_string(),
            metric(entry.stars),
            score(entry.popularity_score),
            score(entry.maintenance_score),
            metric(entry.last_synced_at.as_deref().map(short_date)),
        ]);
    }

    builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string()
}

fn print_entries(title: &str, entries: &[EntryWithCategory], total: usize) {
    if entries.is_empty() {
        info!("No entries found");
        return;
    }

    for item in entries {
        debug!(
            id = item.entry.id,
            slug = %item.entry.slug,
            category = %item.category.slug,
            "listed entry"
        );
    }

    if display_settings().icons() {
        info!("\n{}", entries_table(title, entries));
    } else {
        for item in entries {
            info!(
                "{} ({}) | {} | {}",
                Colored(Blue, &item.entry.name),
                Colored(Cyan, &item.entry.slug),
                Colored(Green, &item.category.name),
                item.entry.description
            );
        }
    }

    info!(
        "Showing {} of {}",
        Colored(Green, entries.len()),
        Colored(Cyan, total)
    );
}

pub fn list_entries(
    ctx: &ShelfContext,
    query: Option<String>,
    category: Option<String>,
    sort: EntrySort,
    limit: Option<usize>,
) -> ShelfResult<()> {
    let result = catalog::list_entries(
        ctx,
        &ListOptions {
            query,
            category,
            sort,
            limit,
        },
    )?;

    if json_output() {
        return print_json(&result);
    }

    print_entries("Catalog", &result.entries, result.total_count);
    Ok(())
}

pub fn search_entries(
    ctx: &ShelfContext,
    query: String,
    category: Option<String>,
    limit: Option<usize>,
) -> ShelfResult<()> {
    let result = catalog::search_entries(ctx, &query, category.as_deref(), limit)?;

    if json_output() {
        return print_json(&result);
    }

    print_entries("Search Results", &result.entries, result.total_count);
    Ok(())
}

pub fn trending_entries(ctx: &ShelfContext, limit: Option<usize>) -> ShelfResult<()> {
    let entries = catalog::trending_entries(ctx, limit)?;

    if json_output() {
        return print_json(&entries);
    }

    if entries.is_empty() {
        info!("No entries have been synced yet. Run `shelf sync` first.");
        return Ok(());
    }

    let total = entries.len();
    print_entries("Trending", &entries, total);
    Ok(())
}

pub fn show_entry(ctx: &ShelfContext, slug: String) -> ShelfResult<()> {
    let item = entry::show_entry(ctx, &slug)?;

    if json_output() {
        return print_json(&item);
    }

    let entry = &item.entry;
    let mut builder = Builder::new();

    builder.push_record([
        format!("{} Name", icon_or(Icons::PACKAGE, "")),
        format!(
            "{} ({})",
            Colored(Blue, &entry.name),
            Colored(Cyan, &entry.slug)
        ),
    ]);
    builder.push_record([
        format!("{} Description", icon_or(Icons::DESCRIPTION, "")),
        entry.description.clone(),
    ]);
    builder.push_record([
        format!("{} Category", icon_or(Icons::CATEGORY, "")),
        format!(
            "{} ({})",
            Colored(Green, &item.category.name),
            Colored(Cyan, &item.category.slug)
        ),
    ]);
    builder.push_record([
        format!("{} Source", icon_or(Icons::LINK, "")),
        Colored(Blue, &entry.source_url).to_string(),
    ]);
    builder.push_record([
        format!("{} Registry", icon_or(Icons::LINK, "")),
        Colored(Blue, &entry.registry_url).to_string(),
    ]);

    if entry.is_synced() {
        builder.push_record([
            format!("{} Stars", icon_or(Icons::STAR, "")),
            format!(
                "{}  {} {}  {} {}",
                metric(entry.stars),
                icon_or(Icons::FORK, "forks"),
                metric(entry.forks),
                icon_or(Icons::WATCH, "watchers"),
                metric(entry.watchers)
            ),
        ]);
        builder.push_record([
            format!("{} Open Issues", icon_or(Icons::ISSUE, "")),
            metric(entry.open_issues),
        ]);
        builder.push_record([
            format!("{} Scores", icon_or(Icons::SCORE, "")),
            format!(
                "popularity {}  maintenance {}",
                score(entry.popularity_score),
                score(entry.maintenance_score)
            ),
        ]);
        if let Some(ref last_commit) = entry.last_commit_at {
            builder.push_record([
                format!("{} Last Commit", icon_or(Icons::CALENDAR, "")),
                Colored(Yellow, short_date(last_commit)).to_string(),
            ]);
        }
        if let Some(ref synced) = entry.last_synced_at {
            builder.push_record([
                format!("{} Synced", icon_or(Icons::SYNC, "")),
                Colored(Yellow, synced).to_string(),
            ]);
        }
    } else {
        builder.push_record([
            format!("{} Metrics", icon_or(Icons::SCORE, "")),
            Colored(LightRed, "not synced yet").to_string(),
        ]);
    }

    if let Some(ref pros) = entry.pros {
        builder.push_record([
            format!("{} Pros", icon_or(Icons::CHECK, "+")),
            Colored(Green, pros).to_string(),
        ]);
    }
    if let Some(ref cons) = entry.cons {
        builder.push_record([
            format!("{} Cons", icon_or(Icons::CROSS, "-")),
            Colored(LightRed, cons).to_string(),
        ]);
    }
    if let Some(ref install) = entry.install_command {
        builder.push_record([
            format!("{} Install", icon_or(Icons::NOTE, "")),
            Colored(Magenta, install).to_string(),
        ]);
    }
    if let Some(ref install_alt) = entry.install_alt_command {
        builder.push_record([
            format!("{} Install (alt)", icon_or(Icons::NOTE, "")),
            Colored(Magenta, install_alt).to_string(),
        ]);
    }
    if let Some(ref example) = entry.code_example {
        builder.push_record([
            format!("{} Example", icon_or(Icons::CODE, "")),
            example.clone(),
        ]);
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!(
        id = entry.id,
        slug = %entry.slug,
        category = %item.category.slug,
        stars = entry.stars,
        popularity_score = entry.popularity_score,
        maintenance_score = entry.maintenance_score,
        "\n{table}"
    );

    Ok(())
}
