#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Crisis harness: runs the tagged methods of registered host types with
//! coerced arguments, classifies every outcome and prints a priority report.

/// Method metadata, priorities and declared parameter types.
pub mod metadata;

/// Dynamically typed argument and return values.
pub mod value;

/// Fatal and per-method error types.
pub mod error;

/// Text-to-value parameter coercion.
pub mod coerce;

/// Host descriptor and display order.
pub mod config;

/// Host type registration and lookup.
pub mod registry;

/// Single-method invocation.
pub mod invoker;

/// Terminal states, records and run counts.
pub mod classifier;

/// Bucketing and report rendering.
pub mod reporter;

/// JSON-lines run telemetry.
pub mod telemetry;

/// Run driver.
pub mod harness;

pub use classifier::{classify, MethodState, ResultRecord, RunSummary};
pub use coerce::coerce;
pub use config::{DisplayOrder, HostDescriptor};
pub use error::{CoercionError, HarnessError, InvocationError, FATAL_ERROR};
pub use harness::{Harness, RunOutcome};
pub use invoker::{InvocationOutcome, Invoker};
pub use metadata::{MethodMetadata, Priority, TypeTag};
pub use registry::{HostCatalog, HostType, HostTypeBuilder, MethodSignature, RegisteredMethod};
pub use reporter::{paint, Buckets, ColorCategory, Report, Reporter};
pub use telemetry::{HarnessTelemetry, HarnessTelemetryBuilder, RunTelemetry};
pub use value::{Args, Value};
