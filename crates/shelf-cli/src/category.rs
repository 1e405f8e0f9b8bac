use nu_ansi_term::Color::{Blue, Cyan, Green, Yellow};
use shelf_core::ShelfResult;
use shelf_operations::{category, CategoryInput, CategoryUpdate, ShelfContext};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::info;

use crate::utils::{
    confirm_action, icon_or, json_output, print_json, score, term_width, Colored, Icons,
};

pub fn list_categories(ctx: &ShelfContext) -> ShelfResult<()> {
    let categories = category::list_categories(ctx)?;

    if json_output() {
        return print_json(&categories);
    }

    if categories.is_empty() {
        info!("No categories yet. Add one with `shelf category add <name>`.");
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["Category", "Slug", "Entries"]);
    for item in &categories {
        builder.push_record([
            Colored(Green, &item.category.name).to_string(),
            Colored(Cyan, &item.category.slug).to_string(),
            item.entry_count.to_string(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header(format!(
            "{} Categories",
            icon_or(Icons::CATEGORY, "")
        )))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");
    Ok(())
}

pub fn show_category(ctx: &ShelfContext, slug: String) -> ShelfResult<()> {
    let detail = category::show_category(ctx, &slug)?;

    if json_output() {
        return print_json(&detail);
    }

    info!(
        "{} {} ({}), {} entries",
        icon_or(Icons::CATEGORY, ""),
        Colored(Green, &detail.category.name),
        Colored(Cyan, &detail.category.slug),
        detail.entries.len()
    );

    for entry in &detail.entries {
        info!(
            "  {} {} ({}) | popularity {} | {}",
            Icons::ARROW,
            Colored(Blue, &entry.name),
            Colored(Cyan, &entry.slug),
            score(entry.popularity_score),
            entry.description
        );
    }

    Ok(())
}

pub fn add_category(ctx: &ShelfContext, name: String, slug: Option<String>) -> ShelfResult<()> {
    let category = category::create_category(ctx, CategoryInput { name, slug })?;

    if json_output() {
        return print_json(&category);
    }

    info!(
        "{} Created category {} ({})",
        Colored(Green, icon_or(Icons::CHECK, "+")),
        Colored(Green, &category.name),
        Colored(Cyan, &category.slug)
    );
    Ok(())
}

pub fn edit_category(
    ctx: &ShelfContext,
    slug: String,
    name: Option<String>,
    new_slug: Option<String>,
) -> ShelfResult<()> {
    let category = category::update_category(
        ctx,
        &slug,
        CategoryUpdate {
            name,
            slug: new_slug,
        },
    )?;

    if json_output() {
        return print_json(&category);
    }

    info!(
        "{} Updated category {} ({})",
        Colored(Green, icon_or(Icons::CHECK, "+")),
        Colored(Green, &category.name),
        Colored(Cyan, &category.slug)
    );
    Ok(())
}

pub fn remove_category(ctx: &ShelfContext, slug: String, yes: bool) -> ShelfResult<()> {
    if !yes && !confirm_action(&format!("Delete category {}?", Colored(Yellow, &slug)))? {
        info!("Quitting");
        return Ok(());
    }

    let category = category::delete_category(ctx, &slug)?;

    if json_output() {
        return print_json(&category);
    }

    info!(
        "{} Deleted category {}",
        Colored(Green, icon_or(Icons::CHECK, "+")),
        Colored(Green, &category.name)
    );
    Ok(())
}
