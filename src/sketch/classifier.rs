// SPDX-License-Identifier: GPL-3.0-only

//! Classification bridge
//!
//! The sketch classifier itself is an external model. This module defines the
//! narrow contract the session talks to and a command-based implementation
//! that hands a PNG to any program printing JSON results.

use crate::constants::status;
use crate::errors::ClassifyError;
use crate::sketch::surface::SketchSnapshot;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// One label reported by a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// `"<label> (<percent with one decimal>%)"`
    pub fn display_text(&self) -> String {
        format!("{} ({:.1}%)", self.label, self.confidence * 100.0)
    }
}

/// Status text for a finished classification
///
/// Only the first result is shown. Errors collapse to a fixed message; the
/// caller is responsible for logging the detail.
pub fn status_text(result: &Result<Vec<Classification>, ClassifyError>) -> String {
    match result {
        Ok(results) => results
            .first()
            .map(Classification::display_text)
            .unwrap_or_else(|| status::CLASSIFY_ERROR.to_string()),
        Err(_) => status::CLASSIFY_ERROR.to_string(),
    }
}

/// Asynchronous sketch classifier
///
/// Implementations receive an owned snapshot, never a live surface, and
/// return results ordered by decreasing confidence.
pub trait SketchClassifier: Send + Sync {
    fn classify(
        &self,
        snapshot: SketchSnapshot,
    ) -> BoxFuture<'static, Result<Vec<Classification>, ClassifyError>>;
}

/// Validate and parse classifier JSON output
///
/// Expects an array of `{"label": .., "confidence": ..}` objects.
pub fn parse_results(output: &str) -> Result<Vec<Classification>, ClassifyError> {
    let results: Vec<Classification> = serde_json::from_str(output.trim())
        .map_err(|e| ClassifyError::InvalidOutput(e.to_string()))?;

    if results.is_empty() {
        return Err(ClassifyError::EmptyResult);
    }

    if let Some(bad) = results
        .iter()
        .find(|r| !(0.0..=1.0).contains(&r.confidence))
    {
        return Err(ClassifyError::ConfidenceOutOfRange(bad.confidence));
    }

    Ok(results)
}

/// Runs an external program on a PNG of the sketch
///
/// The snapshot is written to a temporary file whose path is appended to the
/// configured arguments. The program must print the JSON results on stdout.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line (`[program, arg1, arg2, ...]`)
    pub fn from_command_line(command: &[String]) -> Result<Self, ClassifyError> {
        let (program, args) = command.split_first().ok_or(ClassifyError::NotConfigured)?;
        if program.trim().is_empty() {
            return Err(ClassifyError::NotConfigured);
        }
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SketchClassifier for CommandClassifier {
    fn classify(
        &self,
        snapshot: SketchSnapshot,
    ) -> BoxFuture<'static, Result<Vec<Classification>, ClassifyError>> {
        run_command(self.program.clone(), self.args.clone(), snapshot).boxed()
    }
}

async fn run_command(
    program: String,
    args: Vec<String>,
    snapshot: SketchSnapshot,
) -> Result<Vec<Classification>, ClassifyError> {
    let png = tokio::task::spawn_blocking(move || snapshot.encode_png())
        .await
        .map_err(|e| ClassifyError::EncodingFailed(e.to_string()))??;

    let path = temp_snapshot_path();
    tokio::fs::write(&path, &png)
        .await
        .map_err(|e| ClassifyError::ProcessFailed(e.to_string()))?;

    debug!(program = %program, path = %path.display(), "Running classifier");
    let output = tokio::process::Command::new(&program)
        .args(&args)
        .arg(&path)
        .output()
        .await;

    if let Err(e) = tokio::fs::remove_file(&path).await {
        warn!(error = %e, path = %path.display(), "Failed to remove snapshot file");
    }

    let output = output.map_err(|e| ClassifyError::ProcessFailed(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClassifyError::ProcessFailed(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    parse_results(&String::from_utf8_lossy(&output.stdout))
}

/// Stand-in used when no classifier command is configured
///
/// Every request fails with [`ClassifyError::NotConfigured`], which the
/// session surfaces as the regular error message.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredClassifier;

impl SketchClassifier for UnconfiguredClassifier {
    fn classify(
        &self,
        _snapshot: SketchSnapshot,
    ) -> BoxFuture<'static, Result<Vec<Classification>, ClassifyError>> {
        async { Err::<Vec<Classification>, _>(ClassifyError::NotConfigured) }.boxed()
    }
}

/// Classifier for a configured command line, or the unconfigured stand-in
pub fn classifier_for_command(command: &[String]) -> Arc<dyn SketchClassifier> {
    match CommandClassifier::from_command_line(command) {
        Ok(classifier) => {
            debug!(program = %classifier.program(), "Using command classifier");
            Arc::new(classifier)
        }
        Err(_) => Arc::new(UnconfiguredClassifier),
    }
}

fn temp_snapshot_path() -> PathBuf {
    std::env::temp_dir().join(format!("pinch-sketch-{}.png", uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_one_decimal() {
        assert_eq!(Classification::new("cat", 0.8772).display_text(), "cat (87.7%)");
        assert_eq!(Classification::new("sun", 1.0).display_text(), "sun (100.0%)");
    }

    #[test]
    fn test_status_text_uses_first_result() {
        let ok = Ok(vec![
            Classification::new("house", 0.5),
            Classification::new("barn", 0.25),
        ]);
        assert_eq!(status_text(&ok), "house (50.0%)");
        assert_eq!(
            status_text(&Err(ClassifyError::EmptyResult)),
            status::CLASSIFY_ERROR
        );
    }

    #[test]
    fn test_parse_results() {
        let parsed = parse_results(r#" [{"label":"tree","confidence":0.42}] "#).unwrap();
        assert_eq!(parsed, vec![Classification::new("tree", 0.42)]);
    }

    #[test]
    fn test_parse_rejects_bad_output() {
        assert_eq!(parse_results("[]"), Err(ClassifyError::EmptyResult));
        assert!(matches!(
            parse_results("not json"),
            Err(ClassifyError::InvalidOutput(_))
        ));
        assert_eq!(
            parse_results(r#"[{"label":"x","confidence":1.5}]"#),
            Err(ClassifyError::ConfidenceOutOfRange(1.5))
        );
    }

    #[test]
    fn test_from_command_line() {
        assert_eq!(
            CommandClassifier::from_command_line(&[]).unwrap_err(),
            ClassifyError::NotConfigured
        );
        let c = CommandClassifier::from_command_line(&["doodle".to_string(), "--top".to_string()])
            .unwrap();
        assert_eq!(c.program(), "doodle");
    }

    #[tokio::test]
    async fn test_missing_program_reports_process_failure() {
        let c = CommandClassifier::new("/nonexistent/pinch-sketch-classifier", Vec::new());
        let snapshot = SketchSnapshot::from_image(image::RgbaImage::new(4, 4));
        let result = c.classify(snapshot).await;
        assert!(matches!(result, Err(ClassifyError::ProcessFailed(_))));
    }
}
