use std::io;

use clap::Parser;
use miette::Result;

use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use wabc::cli::{Args, Mode};
use wabc::driver;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().without_time())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    let options = args.options();

    match args.mode {
        Mode::Compile => {
            let out =
                driver::compile_file(&args.input_file, args.output_file.as_deref(), &options)?;
            info!("Compiled {:?} to {:?}", args.input_file, out);
        }
        Mode::Parse => driver::write_parse_tree(&args.input_file, io::stdout().lock())?,
        Mode::Stages => driver::write_stages(&args.input_file, &options, io::stdout().lock())?,
    }

    Ok(())
}
