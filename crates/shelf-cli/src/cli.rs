use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueHint};
use shelf_db::repository::entry::EntrySort;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress spinners
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

pub fn parse_sort(value: &str) -> Result<EntrySort, String> {
    match value.trim().to_lowercase().as_str() {
        "name" => Ok(EntrySort::Name),
        "recent" => Ok(EntrySort::Recent),
        "oldest" => Ok(EntrySort::Oldest),
        "popularity" | "popular" => Ok(EntrySort::Popularity),
        "maintenance" => Ok(EntrySort::Maintenance),
        other => {
            Err(format!(
                "Invalid sort '{other}'. Valid options are: name, recent, oldest, popularity, maintenance"
            ))
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective configuration to stdout
    Config,

    /// Generate a default config file
    #[clap(name = "defconfig")]
    DefConfig,

    /// List catalog entries
    #[clap(name = "list", visible_alias = "ls")]
    List {
        /// Only entries whose name or description contains this text
        #[arg(required = false, long)]
        query: Option<String>,

        /// Only entries in this category (slug)
        #[arg(required = false, long)]
        category: Option<String>,

        /// Sort order: name, recent, oldest, popularity, maintenance
        #[arg(required = false, short, long, default_value = "name", value_parser = parse_sort)]
        sort: EntrySort,

        /// Maximum number of entries to show
        #[arg(required = false, short, long)]
        limit: Option<usize>,
    },

    /// Search entries by name and description
    #[command(arg_required_else_help = true)]
    #[clap(name = "search", visible_alias = "s", visible_alias = "find")]
    Search {
        /// Text to search for
        #[arg(required = true)]
        query: String,

        /// Only entries in this category (slug)
        #[arg(required = false, long)]
        category: Option<String>,

        /// Maximum number of results (defaults to the configured search limit)
        #[arg(required = false, short, long)]
        limit: Option<usize>,
    },

    /// Show details of an entry
    #[command(arg_required_else_help = true)]
    #[clap(name = "show", visible_alias = "info")]
    Show {
        /// Entry slug
        #[arg(required = true)]
        slug: String,
    },

    /// Show the most recently synced entries
    Trending {
        /// Number of entries (defaults to the configured trending limit)
        #[arg(required = false, short, long)]
        limit: Option<usize>,
    },

    /// Manage categories
    #[command(arg_required_else_help = true)]
    #[clap(name = "category", visible_alias = "cat")]
    Category {
        #[clap(subcommand)]
        action: CategoryAction,
    },

    /// Manage catalog entries
    #[command(arg_required_else_help = true)]
    Entry {
        #[clap(subcommand)]
        action: EntryAction,
    },

    /// Fetch GitHub metrics and recompute scores
    Sync {
        /// Only sync the entry with this id
        #[arg(required = false, short, long)]
        entry: Option<i32>,
    },

    /// Import categories and entries from a seed file
    #[command(arg_required_else_help = true)]
    Import {
        /// Path to the TOML seed file
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: String,
    },

    /// Show catalog totals and recent syncs
    Stats,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories with entry counts
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Show a category and its entries
    #[command(arg_required_else_help = true)]
    Show {
        /// Category slug
        slug: String,
    },

    /// Create a category
    #[command(arg_required_else_help = true)]
    Add {
        /// Display name
        name: String,

        /// Slug (derived from the name when omitted)
        #[arg(required = false, long)]
        slug: Option<String>,
    },

    /// Rename or re-slug a category
    #[command(arg_required_else_help = true)]
    Edit {
        /// Current slug
        slug: String,

        /// New display name
        #[arg(required = false, long)]
        name: Option<String>,

        /// New slug
        #[arg(required = false, long)]
        new_slug: Option<String>,
    },

    /// Delete a category that has no entries
    #[command(arg_required_else_help = true)]
    #[clap(name = "remove", visible_alias = "rm")]
    Remove {
        /// Category slug
        slug: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Default)]
pub struct EntryFields {
    /// Short description
    #[arg(required = false, short, long)]
    pub description: Option<String>,

    /// Category slug or name
    #[arg(required = false, long)]
    pub category: Option<String>,

    /// Source repository URL
    #[arg(required = false, long, value_hint = ValueHint::Url)]
    pub source_url: Option<String>,

    /// Package registry URL
    #[arg(required = false, long, value_hint = ValueHint::Url)]
    pub registry_url: Option<String>,

    /// Advantages
    #[arg(required = false, long)]
    pub pros: Option<String>,

    /// Drawbacks
    #[arg(required = false, long)]
    pub cons: Option<String>,

    /// Install command
    #[arg(required = false, long)]
    pub install: Option<String>,

    /// Alternative install command
    #[arg(required = false, long)]
    pub install_alt: Option<String>,

    /// Usage example
    #[arg(required = false, long)]
    pub code_example: Option<String>,
}

#[derive(Subcommand)]
pub enum EntryAction {
    /// Add an entry to the catalog
    #[command(arg_required_else_help = true)]
    Add {
        /// Display name
        name: String,

        /// Slug (derived from the name when omitted)
        #[arg(required = false, long)]
        slug: Option<String>,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Edit an entry. Pass an empty string to clear an optional field
    #[command(arg_required_else_help = true)]
    Edit {
        /// Current slug
        slug: String,

        /// New display name
        #[arg(required = false, long)]
        name: Option<String>,

        /// New slug
        #[arg(required = false, long)]
        new_slug: Option<String>,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Remove an entry from the catalog
    #[command(arg_required_else_help = true)]
    #[clap(name = "remove", visible_alias = "rm")]
    Remove {
        /// Entry slug
        slug: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
