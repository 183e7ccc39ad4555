//! Validate every resource table the format config registers.
//! Run: cargo run --bin validate_tables [-- path/to/formats.yaml]

use dls::cli::validate_configured_tables;
use dls::config::EngineConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dls::cli::init_logging();
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env()?,
    };

    let ok = validate_configured_tables(&config);
    println!(
        "Validated {} formats: {}",
        config.formats.len(),
        if ok { "all ok" } else { "errors found" }
    );
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
