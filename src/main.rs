mod args;
mod lookup;

use clap::Parser;
use log::LevelFilter;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = lookup::run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
