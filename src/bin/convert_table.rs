//! Convert an overs-granularity resource CSV into a ball-granularity JSON asset.
//! Run: cargo run --bin convert_table -- data/tables/t20_20.csv data/tables/t20_20_balls.json

use std::fs;
use std::path::Path;

use dls::data::loader::{parse_overs_grid, BallsGridAsset};

const DECIMALS: i32 = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dls::cli::init_logging();
    let args: Vec<String> = std::env::args().collect();
    let (Some(input), Some(output)) = (args.get(1), args.get(2)) else {
        eprintln!("usage: convert_table <input.csv> <output.json>");
        std::process::exit(2);
    };

    let raw = fs::read_to_string(input).map_err(|e| format!("Read {input}: {e}"))?;
    let (table, report) = parse_overs_grid(raw.as_bytes(), input, None)?;
    for diagnostic in &report.diagnostics {
        eprintln!("  {diagnostic}");
    }

    let document = BallsGridAsset::from_table(&table, DECIMALS);
    if let Some(parent) = Path::new(output).parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, serde_json::to_string_pretty(&document)?)?;
    println!(
        "Wrote {}-over ball table ({} rows) to {}",
        table.format_overs(),
        table.format_overs() * 6 + 1,
        output
    );
    Ok(())
}
