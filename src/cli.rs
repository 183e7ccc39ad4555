use std::fmt::Write as _;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::config::{self, EngineConfig};
use crate::data::loader::inspect_table_asset;
use crate::data::registry::TableCache;
use crate::data::validate::ValidationReport;
use crate::data::TableError;
use crate::dls::par_score_now;
use crate::server;

pub const LOG_ENV: &str = "DLS_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Target,
    Par,
    Table,
    Validate,
}

/// Install the stderr log subscriber, filtered by `DLS_LOG` then `RUST_LOG`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("target") => Some(Command::Target),
        Some("par") => Some(Command::Par),
        Some("table") => Some(Command::Table),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Target) => handle_target(args),
        Some(Command::Par) => handle_par(args),
        Some(Command::Table) => handle_table(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: dls <serve|target|par|table|validate>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr = config::bind_addr();
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn positional<T: std::str::FromStr>(args: &[String], index: usize, name: &str) -> Result<T, String> {
    let raw = args
        .get(index)
        .ok_or_else(|| format!("missing <{name}>"))?;
    raw.parse()
        .map_err(|_| format!("invalid <{name}> '{raw}'"))
}

fn print_json<T: serde::Serialize>(payload: &T) -> i32 {
    match serde_json::to_string_pretty(payload) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize result: {err}");
            1
        }
    }
}

fn report_table_error(err: &TableError) -> i32 {
    eprintln!("{err}");
    1
}

fn handle_target(args: &[String]) -> i32 {
    const USAGE: &str = "usage: dls target <format_overs> <team1_score> <r1> <r2>";
    let parsed = (|| -> Result<(u32, u32, f64, f64), String> {
        Ok((
            positional(args, 2, "format_overs")?,
            positional(args, 3, "team1_score")?,
            positional(args, 4, "r1")?,
            positional(args, 5, "r2")?,
        ))
    })();
    let (format_overs, team1_score, r1, r2) = match parsed {
        Ok(values) => values,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            return 2;
        }
    };

    let cache = match TableCache::global() {
        Ok(cache) => cache,
        Err(err) => return report_table_error(&err),
    };
    let context = match cache.context(format_overs) {
        Ok(context) => context,
        Err(err) => return report_table_error(&err),
    };
    let formula = cache.config().target_formula;
    print_json(&serde_json::json!({
        "format_overs": format_overs,
        "formula": formula,
        "g50": context.g50,
        "target": formula.target(team1_score, r1, r2, context.g50)
    }))
}

fn handle_par(args: &[String]) -> i32 {
    const USAGE: &str = "usage: dls par <team1_score> <r1> <r2_used>";
    let parsed = (|| -> Result<(u32, f64, f64), String> {
        Ok((
            positional(args, 2, "team1_score")?,
            positional(args, 3, "r1")?,
            positional(args, 4, "r2_used")?,
        ))
    })();
    match parsed {
        Ok((team1_score, r1, r2_used)) => print_json(&serde_json::json!({
            "par_score": par_score_now(team1_score, r1, r2_used)
        })),
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            2
        }
    }
}

fn handle_table(args: &[String]) -> i32 {
    let format_overs: u32 = match positional(args, 2, "format_overs") {
        Ok(value) => value,
        Err(msg) => {
            eprintln!("{msg}\nusage: dls table <format_overs> [--table]");
            return 2;
        }
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let table = match TableCache::global().and_then(|cache| cache.get(format_overs)) {
        Ok(table) => table,
        Err(err) => return report_table_error(&err),
    };
    let rows = table.integral_rows();

    if as_table {
        let mut out = String::from("overs_remaining");
        for wickets in 0..crate::data::WICKET_COLUMNS {
            let _ = write!(out, "\tw{wickets}");
        }
        for row in rows.iter().rev() {
            let _ = write!(out, "\n{}", row.overs_remaining);
            for value in row.resources {
                let _ = write!(out, "\t{value:.1}");
            }
        }
        println!("{out}");
        0
    } else {
        print_json(&serde_json::json!({
            "format_overs": format_overs,
            "granularity": table.granularity(),
            "rows": rows
        }))
    }
}

/// Load every configured format's asset and print its diagnostics.
/// Returns false if any format failed.
pub fn validate_configured_tables(config: &EngineConfig) -> bool {
    let mut ok = true;
    for entry in &config.formats {
        let path = config.table_path(entry);
        match inspect_table_asset(&path, entry.format_overs) {
            Ok((_, report)) => {
                println!(
                    "[{}] ok: {} ({} warnings)",
                    entry.format_overs,
                    path.display(),
                    report.diagnostics.len()
                );
                print_diagnostics(&report);
            }
            Err(TableError::Invalid { asset, report }) => {
                ok = false;
                eprintln!("[{}] validation failed: {asset}", entry.format_overs);
                print_diagnostics(&report);
            }
            Err(err) => {
                ok = false;
                eprintln!("[{}] validation failed: {err}", entry.format_overs);
            }
        }
    }
    ok
}

fn print_diagnostics(report: &ValidationReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("  {diagnostic}");
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let config = match args.get(2) {
        Some(path) => EngineConfig::load(Path::new(path)),
        None => EngineConfig::from_env(),
    };
    match config {
        Ok(config) => {
            if validate_configured_tables(&config) {
                0
            } else {
                1
            }
        }
        Err(err) => {
            eprintln!("validation failed: {err}");
            1
        }
    }
}
