use clap::Parser;
use sqlpad_repl::{Args, ReplError, Settings};

fn main() {
    let args = Args::parse();
    sqlpad_repl::logging::init();

    let result = Settings::resolve(&args)
        .map_err(ReplError::from)
        .and_then(sqlpad_repl::run);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
