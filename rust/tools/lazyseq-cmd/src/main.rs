use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lazyseq-cmd")]
#[command(about = "Command-line utility for lazyseq sequences")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an integer progression
    Range {
        /// First value
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        start: i64,

        /// Exclusive bound (ignored with --infinite)
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        end: i64,

        /// Increment between values; its sign gives the direction
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        step: i64,

        /// Produce the values through a pull cursor
        #[arg(long)]
        pull: bool,

        /// Ignore --end and count without bound
        #[arg(long, requires = "take")]
        infinite: bool,

        /// Print at most this many values
        #[arg(long)]
        take: Option<usize>,
    },

    /// Print the lines of a file
    Lines {
        /// Also read the whole file through a scoped handle
        #[arg(long)]
        whole: bool,

        /// File to read
        path: String,
    },

    /// Run a query over a JSON table of `{ "id", "name" }` records
    Query {
        /// Path to a JSON file holding an array of records
        #[arg(long)]
        table: String,

        /// Return at most this many rows
        #[arg(long)]
        limit: Option<usize>,

        /// Execute the query first and stream the rows of the resulting cursor
        #[arg(long)]
        executed: bool,
    },
}

fn init_logging(verbose: u8) -> Result<()> {
    let directive = match verbose {
        0 => "lazyseq=info",
        1 => "lazyseq=debug",
        _ => "lazyseq=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Range {
            start,
            end,
            step,
            pull,
            infinite,
            take,
        } => commands::range::run(commands::range::RangeArgs {
            start,
            end,
            step,
            pull,
            infinite,
            take,
        }),
        Commands::Lines { whole, path } => commands::lines::run(path, whole),
        Commands::Query {
            table,
            limit,
            executed,
        } => commands::query::run(table, limit, executed),
    }
}
