use std::path::Path;

use tracing::{error, info};

use crate::{
    inference::predictor::ReadmissionPredictor,
    models::{
        args::{AppArgs, Command},
        artifact::ProvisionResult,
        config::Config,
        patient::PatientRecord,
    },
    schemas::schema_gen::SchemaGen,
    utils::{
        downloader_def::provisioner::Provisioner,
        errors::{EmptyResult, ResultTrait as _, ResultWithError},
    },
};

/// Main controller: provisions artifacts, then builds the predictor and runs
/// the requested command.
pub struct Run {
    args: AppArgs,
    config: Config,
}

impl Run {
    pub fn new(args: AppArgs, config: Config) -> Self {
        Self { args, config }
    }

    pub fn execute(&self) -> EmptyResult {
        match &self.args.command {
            Command::Provision {} => {
                self.provision()?;
            }
            Command::Predict { record, json } => {
                let predictor = self.load_predictor()?;
                self.predict(&predictor, record, *json)?;
            }
            Command::Schema { output } => {
                SchemaGen::new().execute(output.as_deref())?;
            }
        }
        Ok(())
    }

    /// Ensures both artifacts exist. Any failure stops the run.
    fn provision(&self) -> ResultWithError<ProvisionResult> {
        let provisioner = Provisioner::from_config(&self.config.download)
            .auto_err("Could not set up the artifact downloader")?;
        let result = provisioner.ensure(&self.config.artifact_specs());
        Self::report(&result);

        if !result.all_succeeded {
            error!(
                "⚠️ Model files not found! Make sure {:?} and {:?} exist, or configure download \
                 sources in readmit.yaml or the environment.",
                self.config.model_path(),
                self.config.preprocessor_path()
            );
            return Err("Required model artifacts are unavailable".into());
        }
        Ok(result)
    }

    fn report(result: &ProvisionResult) {
        for outcome in &result.outcomes {
            match outcome.error() {
                None => info!(
                    "{}: ok, {} bytes at {:?}",
                    outcome.artifact.name, outcome.bytes_written, outcome.artifact.local_path
                ),
                Some(err) => error!("{}: {} ({})", outcome.artifact.name, err.kind(), err),
            }
        }
    }

    fn load_predictor(&self) -> ResultWithError<ReadmissionPredictor> {
        self.provision()?;
        let predictor = ReadmissionPredictor::load(
            &self.config.preprocessor_path(),
            &self.config.model_path(),
            self.config.prediction.threshold,
        )?;
        info!("Predictor ready, threshold {}", predictor.threshold());
        Ok(predictor)
    }

    fn predict(&self, predictor: &ReadmissionPredictor, record: &Path, json: bool) -> EmptyResult {
        let record = PatientRecord::from_file(record)?;
        info!("Analyzing patient data...");
        let prediction = predictor.predict(&record)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        } else {
            print!("{prediction}");
        }
        Ok(())
    }
}
