use clap::Parser as _;
use tracing::info;

use crate::{
    models::{
        args::{AppArgs, Command},
        config::Config,
    },
    run::Run,
    schemas::schema_gen::SchemaGen,
    utils::{errors::EmptyResult, logger::LoggerUtils},
};

mod inference;
mod models;
mod run;
mod schemas;
mod utils;

fn main() -> EmptyResult {
    let args = AppArgs::parse();

    LoggerUtils::init(args.verbose);

    let version = env!("CARGO_PKG_VERSION");
    info!("🏥 Hospital Readmission Risk Predictor, Version: {version}");

    // The schema does not depend on a valid configuration.
    if let Command::Schema { output } = &args.command {
        return SchemaGen::new().execute(output.as_deref());
    }

    let config = Config::load(args.config.as_deref())?;
    Run::new(args, config).execute()
}
