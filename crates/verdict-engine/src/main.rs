//! Verdict CLI
//!
//! Reads a validation request (diagnostic data, optional policy, optional
//! validation time) from the JSON file named by `VERDICT_INPUT`, validates
//! every signature and prints the report as JSON on stdout.

use std::env;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use verdict_core::{DiagnosticData, EtsiPolicy, ValidationPolicy, VerdictError};
use verdict_engine::{DocumentValidator, ValidationReport, ValidatorConfig};

#[derive(Debug, Error)]
enum CliError {
    #[error("VERDICT_INPUT must name the request file")]
    MissingInput,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} has an invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid request: {0}")]
    Request(#[from] serde_json::Error),

    #[error(transparent)]
    Verdict(#[from] VerdictError),

    #[error("validation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Input document of the CLI
#[derive(Debug, Deserialize)]
struct ValidationRequest {
    diagnostic_data: DiagnosticData,

    #[serde(default)]
    policy: Option<EtsiPolicy>,

    #[serde(default)]
    validation_time: Option<DateTime<Utc>>,
}

fn env_validation_time() -> Result<Option<DateTime<Utc>>, CliError> {
    match env::var("VERDICT_VALIDATION_TIME") {
        Ok(value) => DateTime::parse_from_rfc3339(&value)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| CliError::InvalidEnv {
                name: "VERDICT_VALIDATION_TIME",
                value,
            }),
        Err(_) => Ok(None),
    }
}

fn env_config() -> Result<ValidatorConfig, CliError> {
    let mut config = ValidatorConfig::default();
    if let Ok(value) = env::var("VERDICT_MAX_CHAIN_DEPTH") {
        config.max_chain_depth = match value.parse() {
            Ok(depth) if depth > 0 => depth,
            _ => {
                return Err(CliError::InvalidEnv {
                    name: "VERDICT_MAX_CHAIN_DEPTH",
                    value,
                })
            }
        };
    }
    Ok(config)
}

async fn run() -> Result<ValidationReport, CliError> {
    let path = env::var("VERDICT_INPUT").map_err(|_| CliError::MissingInput)?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
    let request: ValidationRequest = serde_json::from_str(&raw)?;

    let policy = request.policy.unwrap_or_default();
    policy.check()?;
    let policy: Arc<dyn ValidationPolicy> = Arc::new(policy);

    // Precedence: environment, then request, then snapshot, then the clock
    let validation_time = env_validation_time()?
        .or(request.validation_time)
        .or(request.diagnostic_data.validation_time())
        .unwrap_or_else(Utc::now);

    let config = env_config()?;
    let diagnostic = Arc::new(request.diagnostic_data);

    info!(
        input = %path,
        policy = policy.name(),
        validation_time = %validation_time,
        max_chain_depth = config.max_chain_depth,
        "Validating"
    );

    let validator = DocumentValidator::new(diagnostic.clone(), policy, validation_time).with_config(config);

    // Timestamps depend on each other through their proofs; signatures do not
    let (poe, timestamps) = validator.extract_poe();
    let poe = Arc::new(poe);

    let mut tasks = JoinSet::new();
    for (index, signature) in diagnostic.signatures().iter().enumerate() {
        let validator = validator.clone();
        let poe = Arc::clone(&poe);
        let id = signature.id.clone();
        tasks.spawn_blocking(move || (index, validator.validate_signature(&poe, &id)));
    }

    let mut signatures = Vec::with_capacity(diagnostic.signatures().len());
    while let Some(joined) = tasks.join_next().await {
        signatures.push(joined?);
    }
    signatures.sort_by_key(|(index, _)| *index);

    Ok(ValidationReport {
        validation_time,
        policy: validator.policy_name().to_string(),
        timestamps,
        signatures: signatures.into_iter().map(|(_, report)| report).collect(),
    })
}

#[tokio::main]
async fn main() {
    let log_level = env::var("VERDICT_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("verdict: a tracing subscriber is already installed");
    }

    let report = match run().await {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "Validation failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!(error = %err, "Failed to serialize the report");
            std::process::exit(1);
        }
    }
}
