use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "account-search")]
#[command(about = "Browse accounts by type and edit their names inline")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides ACCOUNT_SEARCH_DB_PATH)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// How overlapping record fetches are applied (completion, latest)
    #[arg(long, global = true)]
    pub fetch_ordering: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive account table
    Tui {
        /// Account type to filter by on startup
        #[arg(short = 't', long = "type")]
        account_type: Option<String>,
    },

    /// Print the account type filter options
    Types,

    /// Print accounts, optionally filtered by type
    List {
        /// Account type label, e.g. "Customer - Direct"
        #[arg(short = 't', long = "type", default_value = "")]
        account_type: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Rename an account and report the save result
    Update {
        /// Account id
        #[arg(long)]
        id: String,

        /// New account name
        #[arg(long)]
        name: String,
    },

    /// Import accounts from a CSV file with Id,Name,Type columns
    Seed {
        /// CSV file path
        #[arg(long)]
        csv: String,
    },
}

impl Commands {
    /// Commands that draw to the terminal must not log to it
    pub fn is_interactive(&self) -> bool {
        matches!(self, Commands::Tui { .. })
    }
}
