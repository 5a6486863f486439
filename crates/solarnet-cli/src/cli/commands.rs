use super::render;
use super::setup::{
    Cli, Commands, ConfigCommands, FetchCommands, FetchSearchArgs, HekCommands, HekSearchArgs,
    TimeSeriesCommands,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use solarnet::attr::{Attr, ParamAttr, Params};
use solarnet::config::{user_config_path, SolarnetConfig};
use solarnet::dataretriever::Fido;
use solarnet::hek::attrs::all_event_types;
use solarnet::hek::{fields, EventType, HekClient, HekQuery, MemoryTransport};
use solarnet::time::TimeRange;
use solarnet::timeseries::TimeSeriesFactory;
use solarnet::vso::{DataAttr, DataQuery};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "SOLARNET_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = SolarnetConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Hek { action } => match action {
            HekCommands::Search(args) => hek_search(&config, args),
        },
        Commands::Fetch { action } => match action {
            FetchCommands::Search(args) => fetch_search(args),
        },
        Commands::TimeSeries { action } => match action {
            TimeSeriesCommands::Sources => timeseries_sources(),
        },
        Commands::Config { action } => match action {
            ConfigCommands::Show => config_show(&config),
        },
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // try_init: a second subscriber (tests) is not an error
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Turn the search flags into query attributes, one per flag group.
fn hek_query(args: &HekSearchArgs) -> Result<Vec<HekQuery>> {
    let mut query = Vec::new();

    if !args.event_types.is_empty() {
        let known = all_event_types();
        let types: Vec<HekQuery> = args
            .event_types
            .iter()
            .map(|code| {
                let event_type = EventType::new(code);
                if !known.contains(&event_type) {
                    tracing::warn!(code = %code, "unknown event type");
                }
                HekQuery::from(event_type)
            })
            .collect();
        query.push(Attr::or_all(types));
    }

    if let (Some(start), Some(end)) = (&args.start, &args.end) {
        query.push(HekQuery::from(TimeRange::parse(start, end)?));
    }

    for expr in &args.filters {
        let filter = expr
            .parse::<ParamAttr>()
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("invalid filter '{}'", expr))?;
        if fields::lookup(&filter.name).is_none() {
            tracing::warn!(field = %filter.name, "not a known HEK field");
        }
        query.push(HekQuery::from(filter));
    }

    if query.is_empty() {
        bail!("Nothing to search for: pass --event-type, --start/--end or --filter");
    }
    Ok(query)
}

#[derive(Serialize)]
struct DryRun<'a> {
    url: &'a str,
    requests: &'a [Params],
}

fn hek_search(config: &SolarnetConfig, args: HekSearchArgs) -> Result<()> {
    let query = hek_query(&args)?;

    if args.dry_run {
        let mut client = HekClient::new(config.hek_url.clone(), MemoryTransport::new())?
            .with_columns(&args.columns);
        if let Some(limit) = args.limit.or(config.result_limit) {
            client = client.with_result_limit(limit);
        }
        let requests = client.compile(query)?;
        if args.json {
            let out = DryRun {
                url: client.url(),
                requests: &requests,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            print!("{}", render::mappings(client.url(), &requests));
        }
        return Ok(());
    }

    let mut client = HekClient::from_config(config)?.with_columns(&args.columns);
    if let Some(limit) = args.limit {
        client = client.with_result_limit(limit);
    }
    let table = client.search(query)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print!("{}", render::hek_table(&table, &args.columns));
    }
    Ok(())
}

fn fetch_query(args: &FetchSearchArgs) -> Result<DataQuery> {
    let range = TimeRange::parse(&args.start, &args.end)?;
    let instruments = Attr::or_all(
        args.instrument
            .iter()
            .map(|name| DataQuery::from(DataAttr::instrument(name))),
    );
    let mut parts = vec![DataQuery::from(DataAttr::time(range)), instruments];
    if let Some(level) = &args.level {
        parts.push(DataAttr::level(level).into());
    }
    if let Some(number) = args.satellite {
        parts.push(DataAttr::SatelliteNumber(number).into());
    }
    Ok(Attr::and_all(parts)?)
}

fn fetch_search(args: FetchSearchArgs) -> Result<()> {
    let query = fetch_query(&args)?;
    let response = Fido::new()?.search(&query)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render::query_response(&response));
    }
    Ok(())
}

fn timeseries_sources() -> Result<()> {
    let factory = TimeSeriesFactory::new()?;
    println!("{}", factory.signatures());
    Ok(())
}

fn config_show(config: &SolarnetConfig) -> Result<()> {
    if let Some(path) = user_config_path() {
        println!("# user config: {}", path.display());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hek_args(event_types: &[&str], filters: &[&str]) -> HekSearchArgs {
        HekSearchArgs {
            event_types: event_types.iter().map(|s| s.to_string()).collect(),
            filters: filters.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_repeated_event_types_fold_into_one_attr() {
        let query = hek_query(&hek_args(&["FL", "AR"], &[])).unwrap();
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_filters_become_params() {
        let query = hek_query(&hek_args(&["FL"], &["fl_goescls > M1", "frm_name = SSW Latest Events"]))
            .unwrap();
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn test_bad_filter_is_reported() {
        let err = hek_query(&hek_args(&[], &["fl_goescls"])).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid filter"));
    }

    #[test]
    fn test_empty_query_is_rejected() {
        assert!(hek_query(&HekSearchArgs::default()).is_err());
    }

    #[test]
    fn test_fetch_query_ors_instruments() {
        let args = FetchSearchArgs {
            instrument: vec!["eve".into(), "lyra".into()],
            start: "2012-01-01".into(),
            end: "2012-01-02".into(),
            level: None,
            satellite: None,
            json: false,
        };
        let query = fetch_query(&args).unwrap();
        assert!(matches!(query, Attr::Or(ref branches) if branches.len() == 2));
    }
}
