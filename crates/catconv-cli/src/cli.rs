use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "catconv",
    about = "Catconv: convert v7 catalog and share documents to v8",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Conversion options shared by the catalog and member commands.
///
/// Flags override values read from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// TOML (or `.json`) file with conversion options
    #[arg(long)]
    pub config: Option<String>,

    /// Copy unknown properties into the output
    #[arg(short = 'u', long)]
    pub copy_unknown_properties: bool,

    /// Do not generate ids for members without one
    #[arg(long)]
    pub no_generate_ids: bool,

    /// Length of generated ids
    #[arg(long)]
    pub id_length: Option<usize>,

    /// Do not record v7 path ids in `shareKeys`
    #[arg(long)]
    pub no_share_keys: bool,

    /// Relax required fields
    #[arg(long)]
    pub partial: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a v7 catalog (init) file
    Catalog {
        /// Path to the v7 catalog JSON
        source: String,

        /// Output path (stdout when omitted)
        destination: Option<String>,

        #[command(flatten)]
        options: OptionArgs,

        /// Previously converted v8 catalog to take member ids from
        #[arg(long)]
        ids: Option<String>,

        /// Output a JSON envelope with result, messages and stats
        #[arg(long)]
        json: bool,
    },

    /// Migrate a v7 share document
    Share {
        /// Path to the v7 share JSON
        source: String,

        /// Output path (stdout when omitted)
        destination: Option<String>,

        /// Output a JSON envelope with result, messages and stats
        #[arg(long)]
        json: bool,
    },

    /// Convert a single v7 catalog member
    Member {
        /// Path to the v7 member JSON
        source: String,

        #[command(flatten)]
        options: OptionArgs,

        /// Output a JSON envelope with result, messages and stats
        #[arg(long)]
        json: bool,
    },

    /// List the v7 types with a built-in converter
    Types {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
