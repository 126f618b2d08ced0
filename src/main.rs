//! LeadPulse CLI: prints dashboard views as JSON.
//!
//! Usage: `leadpulse [--fixture <file>] <command> [arg]`
//!
//! Without `--fixture` the hosted record store from ~/.leadpulse/config.json is used.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use leadpulse_lib::analytics::calendar::{parse_timezone, RelativeWindow, ReportClock};
use leadpulse_lib::error::ServiceError;
use leadpulse_lib::gateway::memory::InMemoryGateway;
use leadpulse_lib::reports::ActivityFilters;
use leadpulse_lib::services::{dashboard, leads};
use leadpulse_lib::state::{load_config, AppState};
use leadpulse_lib::types::Config;

const USAGE: &str = "usage: leadpulse [--fixture <file>] <command> [arg]

commands:
  leaderboard          reps ranked by performance score
  daily-report         today's new leads per rep
  follow-ups           leads due for follow-up
  chart [days]         new leads per day
  metrics [repId]      intake counts and distributions
  analytics [period]   leads created in a period: today, week, month, 'last N days' or all
  performance          per-rep lead intake
  activity [search]    website-URL activity report
  quick-filters        preset date ranges
  lead <id>            one lead";

struct Args {
    fixture: Option<PathBuf>,
    command: String,
    arg: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut fixture = None;
    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fixture" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--fixture needs a file path"))?;
                fixture = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let command = positional
        .next()
        .ok_or_else(|| anyhow::anyhow!("missing command\n\n{USAGE}"))?;
    Ok(Args {
        fixture,
        command,
        arg: positional.next(),
    })
}

fn build_state(fixture: Option<&PathBuf>) -> anyhow::Result<AppState> {
    match fixture {
        Some(path) => {
            let config = load_config().unwrap_or_else(|e| {
                log::info!("Using default config with fixture: {e}");
                Config::default()
            });
            let clock = ReportClock::system(parse_timezone(&config.timezone));
            let gateway = InMemoryGateway::load_fixture(path, clock)
                .map_err(|e| anyhow::anyhow!("Failed to load fixture {}: {e}", path.display()))?;
            Ok(AppState::new(config, Arc::new(gateway)))
        }
        None => {
            let config = load_config()
                .map_err(|e| anyhow::anyhow!("Failed to load LeadPulse config: {e}"))?;
            AppState::connect(config)
                .map_err(|e| anyhow::anyhow!("Failed to connect to record store: {e}"))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_number<T: std::str::FromStr>(
    arg: Option<&str>,
    what: &str,
) -> anyhow::Result<Option<T>> {
    arg.map(|raw| {
        raw.parse::<T>()
            .map_err(|_| anyhow::anyhow!("{what} must be a number, got '{raw}'"))
    })
    .transpose()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let state = build_state(args.fixture.as_ref())?;
    let (gateway, ctx) = (state.gateway(), &state.ctx);
    let arg = args.arg.as_deref();

    match args.command.as_str() {
        "leaderboard" => print_json(&dashboard::leaderboard(gateway, ctx).await),
        "daily-report" => print_json(&dashboard::daily_report(gateway, ctx).await),
        "follow-ups" => print_json(&dashboard::follow_ups(gateway, ctx).await),
        "chart" => {
            let days = parse_number::<u32>(arg, "days")?;
            print_json(&dashboard::daily_chart(gateway, ctx, days, None).await)
        }
        "metrics" => {
            let rep_id = parse_number::<i64>(arg, "repId")?;
            print_json(&dashboard::leads_metrics(gateway, ctx, rep_id).await)
        }
        "analytics" => {
            let period = match arg.map(str::trim) {
                None | Some("all") => None,
                Some(text) => Some(
                    RelativeWindow::parse(text)
                        .ok_or_else(|| anyhow::anyhow!("unknown period '{text}'"))?,
                ),
            };
            print_json(&dashboard::leads_analytics(gateway, ctx, period, None).await)
        }
        "performance" => print_json(&dashboard::user_performance(gateway, ctx).await),
        "activity" => {
            let filters = ActivityFilters {
                search_term: arg.map(str::to_string),
                ..Default::default()
            };
            print_json(&dashboard::website_activity(gateway, ctx, &filters).await)
        }
        "quick-filters" => print_json(&dashboard::quick_filters(ctx)),
        "lead" => {
            let id = parse_number::<i64>(arg, "id")?
                .ok_or_else(|| anyhow::anyhow!("lead needs an id"))?;
            match leads::get_lead(gateway, ctx, id).await {
                Ok(lead) => print_json(&lead),
                Err(e) => {
                    print_json(&ServiceError::from(&e))?;
                    std::process::exit(1);
                }
            }
        }
        other => Err(anyhow::anyhow!("unknown command '{other}'\n\n{USAGE}")),
    }
}
