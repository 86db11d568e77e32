use crate::cli::ModelArgs;
use crate::infra::{apply_model_overrides, load_service};
use clap::Args;
use lendwise::config::AppConfig;
use lendwise::error::AppError;
use lendwise::scoring::{validate, ApplicantPayload, ScoringError};
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding a single applicant
    #[arg(long)]
    pub(crate) applicant: PathBuf,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
    /// Include the engineered feature row in the output
    #[arg(long)]
    pub(crate) show_features: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_model_overrides(&mut config, args.model)?;

    let service = load_service(&config)?;

    let raw = std::fs::read_to_string(&args.applicant)?;
    let payload: ApplicantPayload = serde_json::from_str(&raw)?;
    let applicant = validate(payload).map_err(ScoringError::from)?;
    let result = service.score(&applicant).map_err(ScoringError::from)?;

    let mut output = json!({
        "applicant": args.applicant.display().to_string(),
        "loan_grade": result.loan_grade,
        "effective_dti": result.effective_dti,
        "prediction": result.response(service.policy()),
    });

    if args.show_features {
        output["features"] = serde_json::to_value(service.engineer(&applicant))?;
        output["column_order"] = json!(service.column_order().label());
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
