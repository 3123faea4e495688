//! Terminal state of each method and the record produced for the report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    invoker::InvocationOutcome,
    metadata::{MethodMetadata, Priority},
};

/// Rendered value and parameters of a disabled method.
pub const DISABLED: &str = "Disabled";
/// Rendered value and parameters of a failed method.
pub const ERROR: &str = "Error";

/// Terminal state of a method within a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MethodState {
    /// Invoked and returned normally.
    Processed,
    /// Not invoked because it is disabled.
    Disabled,
    /// Invocation failed.
    Error,
}

impl MethodState {
    /// Upper-case label used in the report table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processed => "PROCESSED",
            Self::Disabled => "DISABLED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for MethodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of the method being classified.
#[derive(Debug, Clone, Copy)]
pub struct MethodContext<'a> {
    /// Method name.
    pub name: &'a str,
    /// Display name of the declared return type.
    pub return_type: &'a str,
}

/// Outcome of one method in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Method name.
    pub method_name: String,
    /// Priority bucket.
    pub priority: Priority,
    /// Terminal state.
    pub state: MethodState,
    /// Display name of the return type.
    pub return_type: String,
    /// Rendered return value, or the state marker.
    pub return_value: String,
    /// Rendered argument list, or the state marker.
    pub parameters: String,
    /// Wall-clock time in whole milliseconds.
    pub elapsed_ms: u64,
    /// Error text for failed methods.
    pub error: Option<String>,
}

impl ResultRecord {
    /// Runtime cell as shown in the report.
    #[must_use]
    pub fn runtime(&self) -> String {
        format_runtime(self.elapsed_ms)
    }

    /// Error cell as shown in the report.
    #[must_use]
    pub fn error_cell(&self) -> &str {
        self.error.as_deref().unwrap_or("None")
    }
}

/// Renders elapsed milliseconds for the runtime column.
///
/// Durations under 10 ms are shown as `0.<ms>`: 7 ms renders as `0.7`. This is
/// a display convention only, 7 ms and 0.7 ms are indistinguishable.
#[must_use]
pub fn format_runtime(elapsed_ms: u64) -> String {
    if elapsed_ms < 10 {
        format!("0.{elapsed_ms}")
    } else {
        elapsed_ms.to_string()
    }
}

fn disabled() -> (MethodState, String, String, Option<String>) {
    (MethodState::Disabled, DISABLED.to_string(), DISABLED.to_string(), None)
}

/// Maps metadata and outcome onto exactly one terminal state.
///
/// Only an invoked method can be `Processed` or `Error`; a skipped outcome is
/// reported as disabled even when the metadata says enabled.
#[must_use]
pub fn classify(
    method: MethodContext<'_>,
    metadata: &MethodMetadata,
    outcome: InvocationOutcome,
    elapsed_ms: u64,
) -> ResultRecord {
    let (state, return_value, parameters, error) = match outcome {
        // Never invoked: either disabled or skipped by the caller.
        InvocationOutcome::Skipped => disabled(),
        _ if !metadata.enabled => disabled(),
        InvocationOutcome::Failure { error } => (
            MethodState::Error,
            ERROR.to_string(),
            ERROR.to_string(),
            Some(error),
        ),
        InvocationOutcome::Success { value, parameters } => {
            (MethodState::Processed, value, parameters, None)
        }
    };

    ResultRecord {
        method_name: method.name.to_string(),
        priority: metadata.priority,
        state,
        return_type: method.return_type.to_string(),
        return_value,
        parameters,
        elapsed_ms,
        error,
    }
}

/// Counts derived from the records of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Every classified method.
    pub total: usize,
    /// Processed methods.
    pub successful: usize,
    /// Methods in the error state.
    pub failed: usize,
    /// Disabled methods.
    pub disabled: usize,
}

impl RunSummary {
    /// Tallies records by state.
    #[must_use]
    pub fn from_records(records: &[ResultRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total += 1;
            match record.state {
                MethodState::Processed => summary.successful += 1,
                MethodState::Error => summary.failed += 1,
                MethodState::Disabled => summary.disabled += 1,
            }
            summary
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: MethodContext<'static> = MethodContext {
        name: "check",
        return_type: "String",
    };

    fn success() -> InvocationOutcome {
        InvocationOutcome::Success {
            value: "ok".into(),
            parameters: "[1]".into(),
        }
    }

    fn failure() -> InvocationOutcome {
        InvocationOutcome::Failure {
            error: "method raised: boom".into(),
        }
    }

    #[test]
    fn disabled_wins_over_any_outcome() {
        let metadata = MethodMetadata::new().with_enabled(false);
        for outcome in [success(), failure(), InvocationOutcome::Skipped] {
            let record = classify(CTX, &metadata, outcome, 0);
            assert_eq!(record.state, MethodState::Disabled);
            assert_eq!(record.return_value, "Disabled");
            assert_eq!(record.parameters, "Disabled");
            assert!(record.error.is_none());
        }
    }

    #[test]
    fn skipped_outcome_is_never_a_success() {
        let record = classify(CTX, &MethodMetadata::new(), InvocationOutcome::Skipped, 0);
        assert_eq!(record.state, MethodState::Disabled);
        assert_eq!(record.return_value, "Disabled");
        assert_eq!(RunSummary::from_records(&[record]).successful, 0);
    }

    #[test]
    fn failures_become_error_records() {
        let record = classify(CTX, &MethodMetadata::new(), failure(), 3);
        assert_eq!(record.state, MethodState::Error);
        assert_eq!(record.return_value, "Error");
        assert_eq!(record.parameters, "Error");
        assert_eq!(record.error_cell(), "method raised: boom");
    }

    #[test]
    fn successes_keep_rendered_values() {
        let metadata = MethodMetadata::new().with_priority(Priority::High);
        let record = classify(CTX, &metadata, success(), 12);
        assert_eq!(record.state, MethodState::Processed);
        assert_eq!(record.priority, Priority::High);
        assert_eq!(record.return_value, "ok");
        assert_eq!(record.parameters, "[1]");
        assert_eq!(record.error_cell(), "None");
        assert_eq!(record.runtime(), "12");
    }

    #[test]
    fn runtime_uses_leading_zero_under_ten_ms() {
        assert_eq!(format_runtime(7), "0.7");
        assert_eq!(format_runtime(0), "0.0");
        assert_eq!(format_runtime(10), "10");
        assert_eq!(format_runtime(42), "42");
    }

    #[test]
    fn summary_counts_each_state() {
        let records = vec![
            classify(CTX, &MethodMetadata::new(), success(), 0),
            classify(CTX, &MethodMetadata::new(), failure(), 0),
            classify(CTX, &MethodMetadata::new().with_enabled(false), success(), 0),
            classify(CTX, &MethodMetadata::new(), success(), 0),
        ];
        assert_eq!(
            RunSummary::from_records(&records),
            RunSummary {
                total: 4,
                successful: 2,
                failed: 1,
                disabled: 1
            }
        );
    }
}
