use nu_ansi_term::Color::{Blue, Cyan, Green, Yellow};
use shelf_core::{error::ShelfError, ShelfResult};
use shelf_operations::{entry, EntryInput, EntryUpdate, ShelfContext};
use tracing::info;

use crate::{
    cli::EntryFields,
    utils::{confirm_action, icon_or, json_output, print_json, Colored, Icons},
};

fn require(field: &str, value: Option<String>) -> ShelfResult<String> {
    value.ok_or_else(|| ShelfError::Validation(format!("--{field} is required")))
}

pub fn add_entry(
    ctx: &ShelfContext,
    name: String,
    slug: Option<String>,
    fields: EntryFields,
) -> ShelfResult<()> {
    let input = EntryInput {
        name,
        slug,
        description: require("description", fields.description)?,
        category: require("category", fields.category)?,
        source_url: require("source-url", fields.source_url)?,
        registry_url: require("registry-url", fields.registry_url)?,
        pros: fields.pros,
        cons: fields.cons,
        install_command: fields.install,
        install_alt_command: fields.install_alt,
        code_example: fields.code_example,
    };

    let entry = entry::create_entry(ctx, input)?;

    if json_output() {
        return print_json(&entry);
    }

    info!(
        "{} Added {} ({}) with id {}. Run `shelf sync --entry {}` to fetch its metrics.",
        Colored(Green, icon_or(Icons::CHECK, "+")),
        Colored(Blue, &entry.name),
        Colored(Cyan, &entry.slug),
        entry.id,
        entry.id
    );
    Ok(())
}

pub fn edit_entry(
    ctx: &ShelfContext,
    slug: String,
    name: Option<String>,
    new_slug: Option<String>,
    fields: EntryFields,
) -> ShelfResult<()> {
    let update = EntryUpdate {
        name,
        slug: new_slug,
        description: fields.description,
        category: fields.category,
        source_url: fields.source_url,
        registry_url: fields.registry_url,
        pros: fields.pros,
        cons: fields.cons,
        install_command: fields.install,
        install_alt_command: fields.install_alt,
        code_example: fields.code_example,
    };

    let entry = entry::update_entry(ctx, &slug, update)?;

    if json_output() {
        return print_json(&entry);
    }

    info!(
        "{} Updated {} ({})",
        Colored(Green, icon_or(Icons::CHECK, "+")),
        Colored(Blue, &entry.name),
        Colored(Cyan, &entry.slug)
    );
    Ok(())
}

pub fn remove_entry(ctx: &ShelfContext, slug: String, yes: bool) -> ShelfResult<()> {
    if !yes && !confirm_action(&format!("Remove {} from the catalog?", Colored(Yellow, &slug)))? {
        info!("Quitting");
        return Ok(());
    }

    let entry = entry::delete_entry(ctx, &slug)?;

    if json_output() {
        return print_json(&entry);
    }

    info!(
        "{} Removed {} ({})",
        Colored(Green, icon_or(Icons::CHECK, "+")),
        Colored(Blue, &entry.name),
        Colored(Cyan, &entry.slug)
    );
    Ok(())
}
