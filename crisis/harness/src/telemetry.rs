//! Structured run events written through the shared JSON logger.

use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::{json, Value};
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use uuid::Uuid;

use crate::classifier::{ResultRecord, RunSummary};

/// Builder for harness telemetry sinks.
pub struct HarnessTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
}

impl HarnessTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            min_level: LogLevel::Info,
        }
    }

    /// Sets the log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the minimum level written to the log.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<HarnessTelemetry> {
        let logger = match self.log_path {
            Some(path) => Some(JsonLogger::with_min_level(path, self.min_level)?),
            None => None,
        };
        Ok(HarnessTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
            }),
        })
    }
}

/// Telemetry handle shared by harness runs. Without a log path every call is a no-op.
#[derive(Clone)]
pub struct HarnessTelemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
}

impl fmt::Debug for HarnessTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessTelemetry")
            .field("module", &self.inner.module)
            .field("logging", &self.inner.logger.is_some())
            .finish()
    }
}

impl Default for HarnessTelemetry {
    fn default() -> Self {
        Self::disabled()
    }
}

impl HarnessTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> HarnessTelemetryBuilder {
        HarnessTelemetryBuilder::new(module)
    }

    /// Telemetry that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                module: "harness".into(),
                logger: None,
            }),
        }
    }

    /// Logs structured metadata.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let record = LogRecord::new(&self.inner.module, level, message).with_fields(metadata);
            logger.log(&record)?;
        }
        Ok(())
    }

    /// Opens a scope for one run, tagging every event with a fresh run id.
    #[must_use]
    pub fn run(&self, host: &str) -> RunTelemetry {
        RunTelemetry {
            telemetry: self.clone(),
            run_id: Uuid::new_v4(),
            host: host.to_string(),
        }
    }
}

/// Telemetry scoped to a single run.
#[derive(Debug, Clone)]
pub struct RunTelemetry {
    telemetry: HarnessTelemetry,
    run_id: Uuid,
    host: String,
}

impl RunTelemetry {
    /// Identifier attached to every event of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run accepted and about to discover methods.
    pub fn started(&self, methods: usize) -> Result<()> {
        self.emit(
            LogLevel::Info,
            "harness.run.started",
            json!({ "methods": methods }),
        )
    }

    /// One method reached its terminal state.
    pub fn classified(&self, record: &ResultRecord) -> Result<()> {
        let level = if record.error.is_some() {
            LogLevel::Warn
        } else {
            LogLevel::Debug
        };
        self.emit(
            level,
            "harness.method.classified",
            json!({
                "method": record.method_name,
                "priority": record.priority,
                "state": record.state,
                "elapsed_ms": record.elapsed_ms,
                "error": record.error,
            }),
        )
    }

    /// Run finished with the given counts.
    pub fn completed(&self, summary: &RunSummary) -> Result<()> {
        self.emit(
            LogLevel::Info,
            "harness.run.completed",
            json!({
                "total": summary.total,
                "successful": summary.successful,
                "failed": summary.failed,
                "disabled": summary.disabled,
            }),
        )
    }

    /// Run aborted before any method executed.
    pub fn fatal(&self, reason: &str) -> Result<()> {
        self.emit(
            LogLevel::Error,
            "harness.run.fatal",
            json!({ "reason": reason }),
        )
    }

    fn emit(&self, level: LogLevel, message: &str, fields: Value) -> Result<()> {
        let mut metadata = json!({
            "run_id": self.run_id.to_string(),
            "host": self.host,
        });
        if let (Some(target), Value::Object(extra)) = (metadata.as_object_mut(), fields) {
            target.extend(extra);
        }
        self.telemetry.log(level, message, metadata)
    }
}
