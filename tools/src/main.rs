//! equity-runner: headless runner for the housing-equity core.
//!
//! Usage:
//!   equity-runner --data data/bg_predictions.json
//!   equity-runner --config equity.json --ipc-mode
//!   equity-runner --synthetic 20 --seed 42 > data/synthetic.json

use anyhow::Result;
use equity_core::{
    config::EquityConfig,
    dispatch::{tool_definitions, ToolDispatcher, ToolName, ToolOutcome, ToolResult},
    export::{self, CsvExport},
    query::{self, RankOrder},
    record::Metric,
    render::{PlainTextRenderer, Renderer},
    store::DatasetCache,
    synth::{self, SyntheticSpec},
};
use serde_json::json;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Tool {
        name: String,
        #[serde(default)]
        args: serde_json::Value,
    },
    Tools,
    Export {
        what: ExportTarget,
        #[serde(default)]
        geoid: Option<String>,
        /// Causal-loop arguments for a timeline export.
        #[serde(default)]
        args: serde_json::Value,
    },
    Quit,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum ExportTarget {
    Records,
    Record,
    Timeline,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    if let Some(tracts) = parse_opt::<u32>(&args, "--synthetic") {
        let spec = SyntheticSpec {
            tracts,
            seed: parse_arg(&args, "--seed", 42u64),
            ..SyntheticSpec::default()
        };
        let records = synth::generate(&spec)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let mut config = match flag_value(&args, "--config") {
        Some(path) => EquityConfig::load(path)?,
        None => EquityConfig::default(),
    };
    if let Some(path) = flag_value(&args, "--data") {
        config.dataset_path = path.to_string();
    }

    if !ipc_mode {
        println!("Housing Equity: equity-runner");
        println!("  data:      {}", config.dataset_path);
        println!();
    }

    let cache = DatasetCache::new(&config.dataset_path);
    let store = cache.get()?;
    let dispatcher = ToolDispatcher::new(Arc::clone(&store), config);

    if ipc_mode {
        run_ipc_loop(&dispatcher)?;
    } else {
        print_summary(&dispatcher)?;
    }

    Ok(())
}

fn run_ipc_loop(dispatcher: &ToolDispatcher) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tools => serde_json::to_value(tool_definitions())?,
            IpcCommand::Tool { name, args } => match dispatcher.dispatch(&name, &args) {
                Ok(outcome) => serde_json::to_value(&outcome)?,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
            IpcCommand::Export { what, geoid, args } => export_reply(dispatcher, what, geoid, args)?,
        };
        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
    }
    Ok(())
}

fn export_reply(
    dispatcher: &ToolDispatcher,
    what: ExportTarget,
    geoid: Option<String>,
    args: serde_json::Value,
) -> Result<serde_json::Value> {
    let store = dispatcher.store();
    let export = match what {
        ExportTarget::Records => CsvExport::records(store.records(), export::today())?,
        ExportTarget::Record => {
            let geoid = geoid.unwrap_or_default();
            match store.find_by_geoid(&geoid) {
                Some(record) => CsvExport::record(record)?,
                None => return Ok(json!({ "error": format!("No block group with GEOID {geoid}") })),
            }
        }
        ExportTarget::Timeline => {
            let mut args = if args.is_null() { json!({}) } else { args };
            if let (Some(geoid), Some(map)) = (geoid, args.as_object_mut()) {
                map.entry("geoid").or_insert_with(|| json!(geoid));
            }
            match dispatcher.dispatch(ToolName::CausalLoop.as_str(), &args) {
                Ok(ToolOutcome::Success { result: ToolResult::CausalLoop(result), .. }) => {
                    CsvExport::timeline(&result, export::today())?
                }
                Ok(ToolOutcome::NotFound { message, .. }) => return Ok(json!({ "error": message })),
                Ok(other) => {
                    return Ok(json!({ "error": format!("unexpected causal loop outcome: {other:?}") }))
                }
                Err(e) => return Ok(json!({ "error": e.to_string() })),
            }
        }
    };
    Ok(serde_json::to_value(export)?)
}

fn print_summary(dispatcher: &ToolDispatcher) -> Result<()> {
    let renderer = PlainTextRenderer;
    let store = dispatcher.store();
    let config = dispatcher.config();

    match query::statistics(store.records(), config.high_risk_threshold) {
        Ok(stats) => println!("{}", renderer.render_statistics(&stats)),
        Err(e) => {
            println!("  ({e})");
            return Ok(());
        }
    }

    for metric in [Metric::EquityScore, Metric::GentrificationRisk, Metric::ForeclosureRisk] {
        let top = query::top_areas(store.records(), metric, config.default_top_limit, RankOrder::Highest);
        println!();
        println!("{}", renderer.render_ranking(metric, &top));
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    flag_value(args, flag).and_then(|v| v.parse().ok())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    parse_opt(args, flag).unwrap_or(default)
}
