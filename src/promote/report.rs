// ABOUTME: Promotion phases and the final run report.
// ABOUTME: The report is what the CLI prints and what decides the exit code.

use std::fmt;
use std::time::Duration;

use crate::diagnostics::Warning;
use crate::types::Color;

/// Phases of the promotion state machine, in order. `Aborted` is only
/// reachable before `Switched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    StandbyStarting,
    StandbyHealthy,
    Switched,
    Verified,
    VerifiedWithWarnings,
    Draining,
    Done,
    Aborted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "IDLE",
            Phase::StandbyStarting => "STANDBY_STARTING",
            Phase::StandbyHealthy => "STANDBY_HEALTHY",
            Phase::Switched => "SWITCHED",
            Phase::Verified => "VERIFIED",
            Phase::VerifiedWithWarnings => "VERIFIED_WITH_WARNINGS",
            Phase::Draining => "DRAINING",
            Phase::Done => "DONE",
            Phase::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// Summary of one completed promotion run.
#[derive(Debug)]
pub struct PromotionReport {
    /// Color serving traffic when the run began.
    pub initial_active: Color,
    /// Color serving traffic when the run ended.
    pub final_active: Color,
    /// Last phase the machine reached.
    pub phase: Phase,
    pub warnings: Vec<Warning>,
    pub duration: Duration,
}

impl PromotionReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Only pre-switch failures are hard errors, and those never produce
    /// a report; a report always means exit code 0.
    pub fn is_success(&self) -> bool {
        self.phase == Phase::Done
    }
}
