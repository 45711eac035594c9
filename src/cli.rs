//! `clinical-triage` command line.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, TriageConfig};
use crate::pipeline::extraction::{Artifact, ClinicalExtractionAgent};
use crate::pipeline::risk::PolicyRiskModel;
use crate::pipeline::TriagePipeline;

/// Exit status when at least one input could not be triaged.
pub const EXIT_INPUT_FAILED: u8 = 1;
/// Exit status when the policy configuration is unusable.
pub const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "clinical-triage",
    version,
    about = "Extract structured findings from referrals and notes, then score clinical risk",
    long_about = "Runs each input through extraction and risk scoring and prints one JSON \
        outcome per input on stdout.\n\n\
        EXAMPLES:\n\
        \n  clinical-triage referral.txt scan.pdf\n\
        \n  clinical-triage --note \"Chest pain since this morning. BP 150/95.\"",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Documents to triage
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Free-text clinical note (repeatable)
    #[arg(short, long = "note", value_name = "TEXT")]
    pub notes: Vec<String>,

    /// Policy file; overrides TRIAGE_CONFIG and the user config dir
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,
}

impl Cli {
    fn load_config(&self) -> Result<TriageConfig, ConfigError> {
        match &self.config {
            Some(path) => TriageConfig::from_path(path),
            None => TriageConfig::load(),
        }
    }

    fn artifacts(&self) -> Vec<(String, Result<Artifact, String>)> {
        let notes = self
            .notes
            .iter()
            .enumerate()
            .map(|(i, text)| (format!("note #{}", i + 1), Ok(Artifact::note(text.as_str()))));

        let files = self.files.iter().map(|path| {
            let label = path.display().to_string();
            let artifact = Artifact::from_path(path).map_err(|e| e.to_string());
            (label, artifact)
        });

        notes.chain(files).collect()
    }
}

/// Triage every input and print results. Returns the process exit status.
pub fn execute(cli: &Cli) -> u8 {
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration rejected");
            eprintln!("error: {e}");
            return EXIT_CONFIG;
        }
    };

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "Configuration rejected");
            eprintln!("error: {e}");
            return EXIT_CONFIG;
        }
    };

    let mut failed = 0usize;
    for (label, artifact) in cli.artifacts() {
        let result = artifact.and_then(|a| pipeline.process(&a).map_err(|e| e.to_string()));
        let rendered = result.and_then(|outcome| {
            if cli.compact {
                serde_json::to_string(&outcome)
            } else {
                serde_json::to_string_pretty(&outcome)
            }
            .map_err(|e| e.to_string())
        });

        match rendered {
            Ok(json) => println!("{json}"),
            Err(e) => {
                failed += 1;
                tracing::warn!(input = %label, error = %e, "Input not triaged");
                eprintln!("error: {label}: {e}");
            }
        }
    }

    if failed > 0 {
        EXIT_INPUT_FAILED
    } else {
        0
    }
}

fn build_pipeline(
    config: &TriageConfig,
) -> Result<TriagePipeline<ClinicalExtractionAgent, PolicyRiskModel>, ConfigError> {
    Ok(TriagePipeline::new(
        ClinicalExtractionAgent::from_config(config)?,
        PolicyRiskModel::from_config(config)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_files_and_notes() {
        let cli = Cli::try_parse_from([
            "clinical-triage",
            "a.txt",
            "b.pdf",
            "--note",
            "Cough",
            "-n",
            "Headache",
        ])
        .unwrap();
        assert_eq!(cli.files, [PathBuf::from("a.txt"), PathBuf::from("b.pdf")]);
        assert_eq!(cli.notes, ["Cough", "Headache"]);
        assert!(!cli.compact);
    }

    #[test]
    fn no_arguments_is_an_error() {
        assert!(Cli::try_parse_from(["clinical-triage"]).is_err());
    }

    #[test]
    fn notes_come_before_files() {
        let cli = Cli::try_parse_from(["clinical-triage", "x.txt", "--note", "Cough"]).unwrap();
        let labels: Vec<String> = cli.artifacts().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["note #1", "x.txt"]);
    }

    #[test]
    fn missing_file_reported_not_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.txt");
        let cli = Cli::try_parse_from(["clinical-triage", missing.to_str().unwrap()]).unwrap();
        assert!(cli.artifacts()[0].1.is_err());
        assert_eq!(execute(&cli), EXIT_INPUT_FAILED);
    }

    #[test]
    fn explicit_config_file_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"thresholds": {"critical_risk": 0.9, "confidence_min": 0.8}}"#)
            .unwrap();

        let cli = Cli::try_parse_from([
            "clinical-triage",
            "--config",
            path.to_str().unwrap(),
            "--note",
            "Cough",
        ])
        .unwrap();
        let config = cli.load_config().unwrap();
        assert_eq!(config.thresholds.critical_risk, 0.9);
    }

    #[test]
    fn invalid_config_exits_with_config_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{"thresholds": {"critical_risk": 1.5}}"#).unwrap();

        let cli = Cli::try_parse_from([
            "clinical-triage",
            "--config",
            path.to_str().unwrap(),
            "--note",
            "Cough",
        ])
        .unwrap();
        assert_eq!(execute(&cli), EXIT_CONFIG);
    }

    #[test]
    fn plain_text_file_triaged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referral.txt");
        std::fs::write(&path, "Patient ID: P-1\nComplaint: headache").unwrap();

        let cli =
            Cli::try_parse_from(["clinical-triage", "--compact", path.to_str().unwrap()]).unwrap();
        assert_eq!(execute(&cli), 0);
    }
}
