use std::{env, sync::Arc};

use clap::Parser;
use cli::{Args, CategoryAction, Commands, EntryAction};
use logging::setup_logging;
use progress::{spawn_event_handler, LogSink, ProgressGuard};
use shelf_config::config::{self, config_path, generate_default_config, get_config};
use shelf_core::{
    error::{ErrorContext, ShelfError},
    utils::setup_required_paths,
    ShelfResult,
};
use shelf_events::EventSinkHandle;
use shelf_operations::ShelfContext;
use shelf_utils::path::resolve_path;
use tracing::{debug, info};
use utils::{display_settings, json_output, print_json, progress_enabled, set_flag};

mod admin;
mod browse;
mod category;
mod cli;
mod entry;
mod logging;
mod progress;
mod sync;
mod utils;

pub fn create_context() -> ShelfResult<(ShelfContext, Option<ProgressGuard>)> {
    let config = get_config();

    if progress_enabled() {
        let (sink, receiver) = shelf_events::ChannelSink::new();
        let events: EventSinkHandle = Arc::new(sink);
        let ctx = ShelfContext::open(config, events)?;
        let guard = spawn_event_handler(receiver);
        Ok((ctx, Some(guard)))
    } else {
        let events: EventSinkHandle = Arc::new(LogSink);
        let ctx = ShelfContext::open(config, events)?;
        Ok((ctx, None))
    }
}

fn show_config() -> ShelfResult<()> {
    let config = get_config().redacted();

    if json_output() {
        return print_json(&config);
    }

    let content = toml::to_string_pretty(&config)
        .map_err(|err| ShelfError::Custom(format!("Failed to render config: {err}")))?;
    info!("# {}\n{}", config_path().display(), content);
    Ok(())
}

async fn dispatch(ctx: &ShelfContext, command: Commands) -> ShelfResult<()> {
    match command {
        Commands::List {
            query,
            category,
            sort,
            limit,
        } => browse::list_entries(ctx, query, category, sort, limit)?,
        Commands::Search {
            query,
            category,
            limit,
        } => browse::search_entries(ctx, query, category, limit)?,
        Commands::Show { slug } => browse::show_entry(ctx, slug)?,
        Commands::Trending { limit } => browse::trending_entries(ctx, limit)?,
        Commands::Category { action } => {
            match action {
                CategoryAction::List => category::list_categories(ctx)?,
                CategoryAction::Show { slug } => category::show_category(ctx, slug)?,
                CategoryAction::Add { name, slug } => category::add_category(ctx, name, slug)?,
                CategoryAction::Edit {
                    slug,
                    name,
                    new_slug,
                } => category::edit_category(ctx, slug, name, new_slug)?,
                CategoryAction::Remove { slug, yes } => {
                    category::remove_category(ctx, slug, yes)?
                }
            }
        }
        Commands::Entry { action } => {
            match action {
                EntryAction::Add { name, slug, fields } => {
                    entry::add_entry(ctx, name, slug, fields)?
                }
                EntryAction::Edit {
                    slug,
                    name,
                    new_slug,
                    fields,
                } => entry::edit_entry(ctx, slug, name, new_slug, fields)?,
                EntryAction::Remove { slug, yes } => entry::remove_entry(ctx, slug, yes)?,
            }
        }
        Commands::Sync { entry } => sync::sync_entries(ctx, entry).await?,
        Commands::Import { file } => admin::import_seed(ctx, file)?,
        Commands::Stats => admin::display_stats(ctx)?,
        Commands::Config | Commands::DefConfig => unreachable!(),
    }

    Ok(())
}

async fn handle_cli() -> ShelfResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    set_flag(&utils::JSON, args.json);
    if args.no_progress {
        set_flag(&utils::PROGRESS, false);
    }

    if let Some(ref c) = args.config {
        let path = resolve_path(c)?;
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        debug!(path = %path.display(), "using config file");
        config::set_config_path(path);
    }

    match args.command {
        Commands::DefConfig => {
            generate_default_config()?;
        }
        command => {
            config::init()?;

            if args.no_color || !display_settings().colors() {
                set_flag(&utils::COLOR, false);
            }

            if matches!(command, Commands::Config) {
                return show_config();
            }

            setup_required_paths()?;

            let (ctx, progress_guard) = create_context()?;
            let result = dispatch(&ctx, command).await;

            // The context holds the event sender; close it before joining the
            // progress thread so the channel drains.
            ctx.close();
            if let Some(guard) = progress_guard {
                guard.finish();
            }
            progress::stop();

            result?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
