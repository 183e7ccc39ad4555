use std::env;

use dls::cli;

fn main() {
    cli::init_logging();
    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
