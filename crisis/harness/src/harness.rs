//! Run driver: descriptor check, banner, per-method evaluation and report.

use std::{io::Write, time::Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    classifier::{classify, MethodContext, ResultRecord, RunSummary},
    config::HostDescriptor,
    error::HarnessError,
    invoker::{InvocationOutcome, Invoker},
    metadata::MethodMetadata,
    registry::{HostType, RegisteredMethod},
    reporter::Reporter,
    telemetry::{HarnessTelemetry, RunTelemetry},
};

/// Records and counts produced by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Identifier shared with the run's log events.
    pub run_id: Uuid,
    /// Host type that was run.
    pub host: String,
    /// One record per tagged method, in declaration order.
    pub records: Vec<ResultRecord>,
    /// Counts over `records`.
    pub summary: RunSummary,
}

/// Drives one host type through discovery, invocation, classification and reporting.
#[derive(Debug, Default, Clone)]
pub struct Harness {
    invoker: Invoker,
    telemetry: HarnessTelemetry,
}

impl Harness {
    /// Harness without logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Harness that reports run events through `telemetry`.
    #[must_use]
    pub fn with_telemetry(telemetry: HarnessTelemetry) -> Self {
        Self {
            invoker: Invoker::new(),
            telemetry,
        }
    }

    /// Runs every tagged method of `host` and writes the report to `out`.
    ///
    /// Fails with [`HarnessError::MissingDescriptor`] before anything is
    /// printed or invoked when the host has no descriptor. Method failures
    /// never abort the run; they end up as error records.
    pub fn run<W: Write>(&self, host: &HostType, out: &mut W) -> Result<RunOutcome, HarnessError> {
        let run = self.telemetry.run(host.name());
        let Some(descriptor) = host.descriptor() else {
            let _ = run.fatal("missing host descriptor");
            return Err(HarnessError::MissingDescriptor(host.name().to_string()));
        };

        if !descriptor.silent {
            write!(out, "{}", banner(host.name(), descriptor))?;
        }
        let _ = run.started(host.tagged_methods().count());

        let records: Vec<ResultRecord> = host
            .tagged_methods()
            .map(|(method, metadata)| self.evaluate(method, metadata, &run))
            .collect();

        let report = Reporter::new(descriptor).render(&records);
        write!(out, "{report}")?;
        out.flush()?;

        let summary = RunSummary::from_records(&records);
        let _ = run.completed(&summary);
        Ok(RunOutcome {
            run_id: run.run_id(),
            host: host.name().to_string(),
            records,
            summary,
        })
    }

    fn evaluate(
        &self,
        method: &RegisteredMethod,
        metadata: &MethodMetadata,
        run: &RunTelemetry,
    ) -> ResultRecord {
        let started = Instant::now();
        let outcome = if metadata.enabled {
            self.invoker.invoke(method, metadata)
        } else {
            InvocationOutcome::Skipped
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let record = classify(
            MethodContext {
                name: method.name(),
                return_type: &method.signature().return_type,
            },
            metadata,
            outcome,
            elapsed_ms,
        );
        let _ = run.classified(&record);
        record
    }
}

/// Banner printed before the table of a non-silent run.
#[must_use]
pub fn banner(host: &str, descriptor: &HostDescriptor) -> String {
    format!(
        "\nProcessing...\n\nClass : {host}\ncreatedBy : {}\n\nlastModified : {}\n",
        descriptor.created_by, descriptor.last_modified
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use anyhow::bail;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        classifier::MethodState,
        config::DisplayOrder,
        metadata::{Priority, TypeTag},
        reporter::NONE_PRIORITY_WARNING,
    };

    #[derive(Default)]
    struct Service;

    fn service(descriptor: Option<HostDescriptor>, calls: Arc<AtomicUsize>) -> HostType {
        let mut host = HostType::with_default::<Service>("Service")
            .method(
                "broken",
                MethodMetadata::new().with_priority(Priority::Low),
                0,
                |_, _| -> anyhow::Result<()> { bail!("boom") },
            )
            .unwrap()
            .method(
                "ready",
                MethodMetadata::new().with_priority(Priority::High),
                0,
                |_, _| Ok("ok"),
            )
            .unwrap()
            .method(
                "paused",
                MethodMetadata::new()
                    .with_priority(Priority::Medium)
                    .with_enabled(false)
                    .with_parameters(["7"])
                    .with_types([TypeTag::Int]),
                1,
                move |_, args| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(args.int(0)?)
                },
            )
            .unwrap()
            .untagged("helper", 0, |_, _| Ok(()))
            .unwrap()
            .build();
        host.set_descriptor(descriptor);
        host
    }

    fn plain() -> HostDescriptor {
        HostDescriptor::new()
            .with_colorize(false)
            .with_authorship("qa", "2024-03-01")
    }

    fn run(host: &HostType) -> (Result<RunOutcome, HarnessError>, String) {
        let mut out = Vec::new();
        let outcome = Harness::new().run(host, &mut out);
        (outcome, String::from_utf8(out).unwrap())
    }

    fn row_index(output: &str, method: &str) -> usize {
        output
            .lines()
            .position(|line| line.split_whitespace().nth(2) == Some(method))
            .unwrap()
    }

    #[test]
    fn mixed_outcomes_end_to_end() {
        let calls = Arc::new(AtomicUsize::new(0));
        let host = service(Some(plain()), Arc::clone(&calls));
        let (outcome, output) = run(&host);
        let outcome = outcome.unwrap();

        assert_eq!(
            outcome.summary,
            RunSummary {
                total: 3,
                successful: 1,
                failed: 1,
                disabled: 1
            }
        );
        let states: Vec<(&str, MethodState)> = outcome
            .records
            .iter()
            .map(|r| (r.method_name.as_str(), r.state))
            .collect();
        assert_eq!(
            states,
            [
                ("broken", MethodState::Error),
                ("ready", MethodState::Processed),
                ("paused", MethodState::Disabled),
            ]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(output.starts_with("\nProcessing...\n\nClass : Service\ncreatedBy : qa\n\nlastModified : 2024-03-01\n"));
        assert!(row_index(&output, "ready") < row_index(&output, "paused"));
        assert!(row_index(&output, "paused") < row_index(&output, "broken"));
        assert!(output.contains("method raised: boom"));
        assert!(output.ends_with("\nTotal : 3, Successful : 1, Failed : 1, Disabled : 1\n\n"));
        assert!(!output.contains(NONE_PRIORITY_WARNING));
    }

    #[test]
    fn missing_descriptor_is_fatal_before_any_output() {
        let host = service(None, Arc::default());
        let (outcome, output) = run(&host);
        assert!(matches!(outcome, Err(HarnessError::MissingDescriptor(name)) if name == "Service"));
        assert!(output.is_empty());
    }

    #[test]
    fn only_and_order_shape_the_table() {
        let host = service(Some(plain().with_only(Priority::Medium)), Arc::default());
        let (outcome, output) = run(&host);
        assert_eq!(outcome.unwrap().records.len(), 3);
        assert!(output.contains("paused"));
        assert!(!output.contains("ready "));
        assert!(!output.contains("broken"));

        let host = service(
            Some(plain().with_order(DisplayOrder::Ascending)),
            Arc::default(),
        );
        let (_, output) = run(&host);
        assert!(row_index(&output, "broken") < row_index(&output, "paused"));
        assert!(row_index(&output, "paused") < row_index(&output, "ready"));
    }

    #[test]
    fn silent_runs_skip_the_banner() {
        let host = service(Some(plain().with_silent(true)), Arc::default());
        let (_, output) = run(&host);
        assert!(!output.contains("Processing..."));
        assert!(output.starts_with("\nPriority"));
    }

    #[test]
    fn none_priority_methods_are_counted_but_hidden() {
        let host = HostType::with_default::<Service>("Quiet")
            .descriptor(plain().with_silent(true))
            .method("hidden", MethodMetadata::new().with_priority(Priority::None), 0, |_, _| {
                Ok(1)
            })
            .unwrap()
            .build();
        let (outcome, output) = run(&host);
        assert_eq!(outcome.unwrap().summary.successful, 1);
        assert!(output.starts_with(NONE_PRIORITY_WARNING));
        assert!(!output.contains("hidden"));
    }

    #[test]
    fn run_events_are_logged() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("harness.log");
        let telemetry = HarnessTelemetry::builder("harness")
            .log_path(&path)
            .build()
            .unwrap();
        let harness = Harness::with_telemetry(telemetry);
        let host = service(Some(plain()), Arc::default());
        let outcome = harness.run(&host, &mut Vec::new()).unwrap();
        assert!(harness.run(&service(None, Arc::default()), &mut Vec::new()).is_err());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("harness.run.started"));
        assert!(content.contains("harness.run.completed"));
        assert!(content.contains("harness.run.fatal"));
        assert!(content.contains(&outcome.run_id.to_string()));
    }
}
