use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Make sure the model and preprocessor artifacts exist locally,
    /// downloading the missing ones
    Provision {},
    /// Score the readmission risk of one patient record
    Predict {
        /// YAML file holding the patient record, keyed by column name
        #[arg(short, long)]
        record: PathBuf,
        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the JSON schema of the configuration file
    Schema {
        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "readmit",
    version,
    about = "Hospital readmission risk predictor for diabetic patients.",
    long_about = r#"
readmit scores the risk that a diabetic patient is readmitted to hospital,
using a pre-trained preprocessing and classification pipeline.

Before the first prediction the two pipeline artifacts are provisioned: any
artifact missing on disk is downloaded from its configured direct URL, or
from the indirect download provider by file id.

Sources are configured in readmit.yaml or through the MODEL_URL,
PREPROCESSOR_URL, MODEL_SOURCE_ID and PREPROCESSOR_SOURCE_ID environment
variables.

This tool supports clinical decision making; it does not replace clinical
judgment.
"#
)]
pub struct AppArgs {
    /// Path of the configuration file, defaults to ./readmit.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}
