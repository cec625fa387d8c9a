// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;

use crate::promote::PromotionReport;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only the final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message: Some(message),
                    report: None,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print the final promotion summary: state reached, colors, warnings.
    pub fn report(&self, report: &PromotionReport) {
        match self.mode {
            OutputMode::Normal => {
                println!(
                    "Promotion complete: {} -> {} ({:.1}s)",
                    report.initial_active,
                    report.final_active,
                    report.duration.as_secs_f64()
                );
                if report.has_warnings() {
                    println!(
                        "State reached: {} (with {} warning(s))",
                        report.phase,
                        report.warnings.len()
                    );
                    for warning in &report.warnings {
                        println!("  ! {}", warning.message);
                    }
                } else {
                    println!("State reached: {}", report.phase);
                }
            }
            OutputMode::Quiet => {
                println!("{} active", report.final_active);
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "report",
                    message: None,
                    report: Some(JsonReport::from(report)),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<JsonReport>,
}

#[derive(Serialize)]
struct JsonReport {
    initial_active: String,
    final_active: String,
    phase: String,
    warnings: Vec<String>,
    duration_secs: f64,
}

impl From<&PromotionReport> for JsonReport {
    fn from(report: &PromotionReport) -> Self {
        JsonReport {
            initial_active: report.initial_active.to_string(),
            final_active: report.final_active.to_string(),
            phase: report.phase.to_string(),
            warnings: report
                .warnings
                .iter()
                .map(|w| w.message.clone())
                .collect(),
            duration_secs: report.duration.as_secs_f64(),
        }
    }
}
