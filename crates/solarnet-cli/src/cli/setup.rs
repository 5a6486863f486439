use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "solarnet",
    bin_name = "solarnet",
    version,
    disable_help_subcommand = true,
    about = "Query solar event catalogues and data archives"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Configuration file to load on top of the user config
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Heliophysics Event Knowledgebase
    Hek {
        #[command(subcommand)]
        action: HekCommands,
    },

    /// Data archive file lookup
    Fetch {
        #[command(subcommand)]
        action: FetchCommands,
    },

    /// Time-series factory
    #[command(name = "timeseries")]
    TimeSeries {
        #[command(subcommand)]
        action: TimeSeriesCommands,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum HekCommands {
    /// Search HEK events
    Search(HekSearchArgs),
}

#[derive(Args, Debug, Default)]
pub struct HekSearchArgs {
    /// Event class code (FL, AR, CE, ...). Repeat to OR several.
    #[arg(short, long = "event-type", value_name = "CODE")]
    pub event_types: Vec<String>,

    /// Start of the time window
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// End of the time window
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Relational filter "name op value", e.g. "fl_goescls > M1"
    #[arg(short, long = "filter", value_name = "EXPR")]
    pub filters: Vec<String>,

    /// Columns to request, comma separated
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Rows per page
    #[arg(long)]
    pub limit: Option<u32>,

    /// Print the compiled requests instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum FetchCommands {
    /// List data files
    Search(FetchSearchArgs),
}

#[derive(Args, Debug)]
pub struct FetchSearchArgs {
    /// Instrument name. Repeat to OR several.
    #[arg(short, long, required = true)]
    pub instrument: Vec<String>,

    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub end: String,

    /// Data level
    #[arg(long)]
    pub level: Option<String>,

    /// GOES satellite number
    #[arg(long)]
    pub satellite: Option<u32>,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum TimeSeriesCommands {
    /// Accepted call shapes and the source handling each
    Sources,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_flags() {
        let cli = Cli::try_parse_from([
            "solarnet", "hek", "search", "-e", "FL", "-e", "AR", "--filter", "fl_goescls > M1",
            "--columns", "a,b", "--dry-run",
        ])
        .unwrap();
        let Commands::Hek { action: HekCommands::Search(args) } = cli.command else {
            panic!("expected hek search");
        };
        assert_eq!(args.event_types, vec!["FL", "AR"]);
        assert_eq!(args.filters, vec!["fl_goescls > M1"]);
        assert_eq!(args.columns, vec!["a", "b"]);
        assert!(args.dry_run);
    }

    #[test]
    fn start_requires_end() {
        let err = Cli::try_parse_from(["solarnet", "hek", "search", "--start", "2011-08-09"]);
        assert!(err.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["solarnet", "config", "show", "-v", "--config", "x.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
