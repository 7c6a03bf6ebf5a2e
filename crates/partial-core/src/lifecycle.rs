//! Request lifecycle phases and timing.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Lifecycle phases, in the order the lifecycle driver runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    RestoreView,
    ApplyRequestValues,
    ProcessValidations,
    UpdateModelValues,
    InvokeApplication,
    RenderResponse,
}

impl PhaseId {
    /// All phases in execution order.
    pub const ALL: [PhaseId; 6] = [
        PhaseId::RestoreView,
        PhaseId::ApplyRequestValues,
        PhaseId::ProcessValidations,
        PhaseId::UpdateModelValues,
        PhaseId::InvokeApplication,
        PhaseId::RenderResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseId::RestoreView => "restore_view",
            PhaseId::ApplyRequestValues => "apply_request_values",
            PhaseId::ProcessValidations => "process_validations",
            PhaseId::UpdateModelValues => "update_model_values",
            PhaseId::InvokeApplication => "invoke_application",
            PhaseId::RenderResponse => "render_response",
        }
    }

    /// Phases that run component processing over the execute ids.
    pub fn is_execute_phase(&self) -> bool {
        matches!(
            self,
            PhaseId::ApplyRequestValues | PhaseId::ProcessValidations | PhaseId::UpdateModelValues
        )
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Mark section start.
    pub fn mark_section_start(&mut self, section: &str) {
        self.mark(&format!("section_{}_start", section));
    }

    /// Mark section sent.
    pub fn mark_section_sent(&mut self, section: &str) {
        self.mark(&format!("section_{}_sent", section));
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get time to first section.
    pub fn time_to_first_section(&self) -> Option<Duration> {
        self.marks
            .iter()
            .filter(|(k, _)| k.ends_with("_sent") && k.starts_with("section_"))
            .map(|(_, t)| t.duration_since(self.start))
            .min()
    }

    /// Get timing for a specific section.
    pub fn section_timing(&self, section: &str) -> Option<SectionTiming> {
        let start_key = format!("section_{}_start", section);
        let sent_key = format!("section_{}_sent", section);

        let start = self.marks.get(&start_key)?;
        let sent = self.marks.get(&sent_key)?;

        Some(SectionTiming {
            name: section.to_string(),
            start: start.duration_since(self.start),
            sent: sent.duration_since(self.start),
            duration: sent.duration_since(*start),
        })
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing information for a section.
#[derive(Debug, Clone)]
pub struct SectionTiming {
    /// Section key.
    pub name: String,
    /// Time from request start to section start.
    pub start: Duration,
    /// Time from request start to section end.
    pub sent: Duration,
    /// Time spent inside the section.
    pub duration: Duration,
}
