//! Command line tool to edit RINEX V3 Observation files
#[macro_use]
extern crate log;

mod cli;
use cli::Cli;

use env_logger::{Builder, Target};
use log::LevelFilter;
use rnxedit::{editor, Error};

fn run(cli: &Cli) -> Result<(), Error> {
    let opts = cli.opts()?;
    let report = editor::run(&opts)?;
    for path in report.missing.iter() {
        info!("skipped {}", path.display());
    }
    for path in report.outputs.iter() {
        info!("{} generated", path.display());
    }
    for path in report.scratch.iter() {
        info!("result available in {}", path.display());
    }
    Ok(())
}

pub fn main() {
    let cli = Cli::new();

    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false);
    if cli.debug() {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.init();

    if let Err(e) = run(&cli) {
        eprintln!("Error! {}", e);
        std::process::exit(1);
    }
}
