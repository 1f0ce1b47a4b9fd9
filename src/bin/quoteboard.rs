use quoteboard::config::Config;
use quoteboard::presenter::TerminalPresenter;
use quoteboard::scrapers::yahoo::YahooScraper;
use quoteboard::services::dashboard_service::DashboardService;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const PROMPT: &str = "輸入台股代號 (例如: 2330, 2454, 0050)";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let defaults = Config::new();
    let default_timeout = defaults.timeout_secs.to_string();
    let default_width = defaults.chart_width.to_string();
    let default_height = defaults.chart_height.to_string();

    let details_arg = Arg::with_name("details")
        .long("details")
        .help("Expand the financial details panel")
        .takes_value(false);

    let app = App::new("QuoteBoard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Taiwan stock quote dashboard")
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("HTTP timeout in seconds")
                .takes_value(true)
                .global(true)
                .default_value(&default_timeout),
        )
        .arg(
            Arg::with_name("suffix")
                .long("suffix")
                .value_name("SUFFIX")
                .help("Market suffix appended to numeric tickers")
                .takes_value(true)
                .global(true)
                .default_value(&defaults.market_suffix),
        )
        .arg(
            Arg::with_name("range")
                .long("range")
                .value_name("RANGE")
                .help("History lookback window (e.g. 1mo, 3mo, 6mo)")
                .takes_value(true)
                .global(true)
                .default_value(&defaults.history_range),
        )
        .arg(
            Arg::with_name("width")
                .long("width")
                .value_name("COLUMNS")
                .help("Chart width")
                .takes_value(true)
                .global(true)
                .default_value(&default_width),
        )
        .arg(
            Arg::with_name("height")
                .long("height")
                .value_name("ROWS")
                .help("Chart height")
                .takes_value(true)
                .global(true)
                .default_value(&default_height),
        );

    let app = app
        .subcommand(
            SubCommand::with_name("show")
                .about("Render the dashboard for one ticker")
                .arg(
                    Arg::with_name("symbol")
                        .value_name("SYMBOL")
                        .help("Ticker, numeric codes get the market suffix")
                        .index(1)
                        .default_value(&defaults.default_symbol),
                )
                .arg(details_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("interactive")
                .about("Prompt for tickers and re-render on every entry")
                .arg(details_arg),
        );

    let matches = app.get_matches();
    // 全域參數會傳遞到子命令
    let scope = matches.subcommand().map(|(_, sub)| sub).unwrap_or(&matches);
    let config = build_config(scope)?;

    match matches.subcommand() {
        Some(("interactive", sub)) => {
            let config = config.with_show_details(sub.is_present("details"));
            run_interactive(config).await
        }
        Some(("show", sub)) => {
            let symbol = sub.value_of("symbol").unwrap_or_default().to_string();
            let config = config.with_show_details(sub.is_present("details"));
            run_once(config, &symbol).await
        }
        _ => {
            info!("No command specified, showing default ticker");
            let symbol = config.default_symbol.clone();
            run_once(config, &symbol).await
        }
    }
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let timeout = parse_number(matches, "timeout")?;
    let width = parse_number(matches, "width")?;
    let height = parse_number(matches, "height")?;

    let mut config = Config::new()
        .with_timeout_secs(timeout as u64)
        .with_chart_size(width, height);
    if let Some(suffix) = matches.value_of("suffix") {
        config = config.with_market_suffix(suffix);
    }
    if let Some(range) = matches.value_of("range") {
        config = config.with_history_range(range);
    }
    Ok(config)
}

fn parse_number(matches: &ArgMatches, name: &str) -> anyhow::Result<usize> {
    let raw = matches.value_of(name).unwrap_or_default();
    raw.parse::<usize>()
        .with_context(|| format!("invalid value for --{}: {}", name, raw))
}

fn service(config: Config) -> anyhow::Result<DashboardService> {
    let scraper = YahooScraper::new(&config).context("failed to build HTTP client")?;
    Ok(DashboardService::new(config, Arc::new(scraper)))
}

async fn run_once(config: Config, symbol: &str) -> anyhow::Result<()> {
    let mut presenter = TerminalPresenter::new(io::stdout(), &config);
    let service = service(config)?;
    service.run(symbol, &mut presenter).await?;
    Ok(())
}

async fn run_interactive(config: Config) -> anyhow::Result<()> {
    let mut presenter = TerminalPresenter::new(io::stdout(), &config);
    let mut current = config.default_symbol.clone();
    let service = service(config)?;

    service.run(&current, &mut presenter).await?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n{} [{}] (:d 詳細資料, :q 離開): ", PROMPT, current);
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let input = line.trim();
        match input {
            ":q" => break,
            ":d" => {
                let show = !presenter.show_details();
                presenter.set_show_details(show);
                debug!("Details panel {}", if show { "expanded" } else { "collapsed" });
            }
            "" => {}
            other => current = other.to_string(),
        }

        println!();
        service.run(&current, &mut presenter).await?;
    }

    info!("Leaving interactive mode");
    Ok(())
}
