//! CLI probe for the viewer core.
//!
//! # Responsibility
//! - Load an artifact, optionally filter and search it, print counters.
//! - Keep output deterministic for quick local sanity checks.

use lexview_core::{
    load_artifact, provenance_set, DocumentSession, SearchOutcome, StackedLayout,
};
use std::process::ExitCode;

const USAGE: &str = "usage: lexview_cli <artifact.json> [--tags L1,L2] [--search QUERY] [--log-dir DIR]";

struct Args {
    artifact: String,
    tags: Option<Vec<String>>,
    search: Option<String>,
    log_dir: Option<String>,
}

fn parse_args(mut args: std::env::Args) -> Result<Args, String> {
    args.next();
    let artifact = args.next().ok_or_else(|| USAGE.to_string())?;
    let mut parsed = Args {
        artifact,
        tags: None,
        search: None,
        log_dir: None,
    };
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| format!("missing value for `{flag}`"))?;
        match flag.as_str() {
            "--tags" => {
                parsed.tags = Some(value.split(',').map(str::to_string).collect());
            }
            "--search" => parsed.search = Some(value),
            "--log-dir" => parsed.log_dir = Some(value),
            other => return Err(format!("unknown flag `{other}`\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn run(args: Args) -> Result<(), String> {
    if let Some(log_dir) = &args.log_dir {
        lexview_core::init_logging(lexview_core::default_log_level(), log_dir)?;
    }

    let document = load_artifact(&args.artifact).map_err(|err| err.to_string())?;
    let host = StackedLayout::new(24.0, 600.0);
    let mut session = DocumentSession::new(document, host).map_err(|err| err.to_string())?;

    println!("title={}", session.document().title);
    println!("catalog_layers={}", session.catalog().len());
    println!("boxes={}", session.arena().len());

    if let Some(tags) = args.tags {
        let outcome = session.apply_filter(provenance_set(tags));
        println!(
            "filter_visible={}/{}",
            outcome.visible_units, outcome.total_units
        );
    }

    if let Some(query) = args.search {
        match session.search(&query) {
            SearchOutcome::TooShort => println!("search=ignored"),
            SearchOutcome::Applied { total } => {
                let (current, _) = session.match_counters();
                println!("search_matches={total} current={current}");
            }
        }
    }

    if let Some(anchor) = session.current_toc_anchor() {
        println!("current_anchor={anchor}");
    }

    Ok(())
}

fn main() -> ExitCode {
    match parse_args(std::env::args()) {
        Ok(args) => match run(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("lexview_cli: {message}");
                ExitCode::FAILURE
            }
        },
        Err(message) => {
            eprintln!("lexview_cli: {message}");
            ExitCode::FAILURE
        }
    }
}
