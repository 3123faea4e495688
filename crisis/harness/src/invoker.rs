//! Invocation of a single registered method with coerced arguments.

use std::{
    any::Any,
    panic::{catch_unwind, AssertUnwindSafe},
};

use serde::{Deserialize, Serialize};

use crate::{
    coerce::{coerce_array, coerce_positional},
    error::InvocationError,
    metadata::MethodMetadata,
    registry::RegisteredMethod,
    value::{render_list, Value},
};

/// Rendered value when the method's result is disabled.
pub const RESULT_DISABLED: &str = "result is disabled";
/// Rendered parameter list of a method that takes no arguments.
pub const NO_PARAMETERS: &str = "None";

/// Result of invoking one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationOutcome {
    /// The method returned normally.
    Success {
        /// Rendered return value.
        value: String,
        /// Rendered argument list.
        parameters: String,
    },
    /// Instantiation, coercion or the method itself failed.
    Failure {
        /// Rendered error.
        error: String,
    },
    /// The method was not invoked.
    Skipped,
}

/// Invokes methods one at a time, converting every failure into data.
#[derive(Debug, Default, Clone, Copy)]
pub struct Invoker;

impl Invoker {
    /// Creates an invoker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Coerces the arguments and invokes `method` on a fresh host instance.
    ///
    /// Never panics and never returns an error: failures, including panics
    /// raised by the method body, come back as [`InvocationOutcome::Failure`].
    /// The process panic hook still runs for a captured panic; callers that
    /// print the report to a terminal may install a quiet hook around the run.
    /// A method that never returns blocks the caller.
    #[must_use]
    pub fn invoke(&self, method: &RegisteredMethod, metadata: &MethodMetadata) -> InvocationOutcome {
        match Self::try_invoke(method, metadata) {
            Ok((value, parameters)) => InvocationOutcome::Success { value, parameters },
            Err(err) => InvocationOutcome::Failure {
                error: err.to_string(),
            },
        }
    }

    fn try_invoke(
        method: &RegisteredMethod,
        metadata: &MethodMetadata,
    ) -> Result<(String, String), InvocationError> {
        let arity = method.signature().arity;
        let (args, parameters) = if arity == 0 {
            (Vec::new(), NO_PARAMETERS.to_string())
        } else if metadata.array {
            let values = coerce_array(metadata)?;
            let rendered = render_list(&values);
            (vec![Value::Array(values)], rendered)
        } else {
            let values = coerce_positional(metadata, arity)?;
            let rendered = render_list(&values);
            (values, rendered)
        };

        if !metadata.result_enabled {
            return Ok((RESULT_DISABLED.to_string(), parameters));
        }

        let value = catch_unwind(AssertUnwindSafe(|| method.call(&args)))
            .map_err(|payload| InvocationError::Panicked(panic_message(payload.as_ref())))??;
        Ok((value.to_string(), parameters))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use anyhow::bail;

    use super::*;
    use crate::{metadata::TypeTag, registry::HostType};

    #[derive(Default)]
    struct Sample;

    fn host(calls: Arc<AtomicUsize>) -> HostType {
        HostType::with_default::<Sample>("Sample")
            .method("greet", MethodMetadata::new().with_parameters(["stray"]), 0, |_, args| {
                Ok(format!("hello ({} args)", args.len()))
            })
            .unwrap()
            .method(
                "add",
                MethodMetadata::new()
                    .with_parameters(["2", "3"])
                    .with_types([TypeTag::Int]),
                2,
                |_, args| Ok(args.int(0)? + args.int(1)?),
            )
            .unwrap()
            .method(
                "sum",
                MethodMetadata::new()
                    .with_parameters(["1", "2", "3"])
                    .with_types([TypeTag::Int])
                    .with_array(true),
                1,
                |_, args| {
                    let values = args.array(0)?;
                    Ok(values
                        .iter()
                        .map(|value| match value {
                            Value::Int(v) => *v,
                            _ => 0,
                        })
                        .sum::<i32>())
                },
            )
            .unwrap()
            .method(
                "quiet",
                MethodMetadata::new().with_result(false),
                0,
                move |_, _| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                },
            )
            .unwrap()
            .method(
                "typo",
                MethodMetadata::new()
                    .with_parameters(["abc"])
                    .with_types([TypeTag::Int]),
                1,
                |_, args| Ok(args.int(0)?),
            )
            .unwrap()
            .method("fails", MethodMetadata::new(), 0, |_, _| -> anyhow::Result<()> {
                bail!("database offline")
            })
            .unwrap()
            .method("panics", MethodMetadata::new(), 0, |_, _| -> anyhow::Result<()> {
                panic!("index out of range")
            })
            .unwrap()
            .build()
    }

    fn invoke(host: &HostType, name: &str) -> InvocationOutcome {
        let method = host.method(name).unwrap();
        Invoker::new().invoke(method, method.metadata().unwrap())
    }

    #[test]
    fn zero_arity_ignores_metadata_parameters() {
        let host = host(Arc::default());
        assert_eq!(
            invoke(&host, "greet"),
            InvocationOutcome::Success {
                value: "hello (0 args)".into(),
                parameters: "None".into()
            }
        );
    }

    #[test]
    fn positional_arguments_are_coerced() {
        let host = host(Arc::default());
        assert_eq!(
            invoke(&host, "add"),
            InvocationOutcome::Success {
                value: "5".into(),
                parameters: "[2, 3]".into()
            }
        );
    }

    #[test]
    fn array_mode_passes_one_argument() {
        let host = host(Arc::default());
        assert_eq!(
            invoke(&host, "sum"),
            InvocationOutcome::Success {
                value: "6".into(),
                parameters: "[1, 2, 3]".into()
            }
        );
    }

    #[test]
    fn disabled_result_skips_the_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let host = host(Arc::clone(&calls));
        assert_eq!(
            invoke(&host, "quiet"),
            InvocationOutcome::Success {
                value: RESULT_DISABLED.into(),
                parameters: "None".into()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failures_are_captured() {
        let host = host(Arc::default());
        let InvocationOutcome::Failure { error } = invoke(&host, "typo") else {
            panic!("expected coercion failure");
        };
        assert!(error.contains("cannot coerce \"abc\" to int"));

        let InvocationOutcome::Failure { error } = invoke(&host, "fails") else {
            panic!("expected raised failure");
        };
        assert_eq!(error, "method raised: database offline");

        let InvocationOutcome::Failure { error } = invoke(&host, "panics") else {
            panic!("expected panic failure");
        };
        assert_eq!(error, "method panicked: index out of range");
    }

    #[test]
    fn instantiation_failures_are_captured() {
        let host = HostType::builder::<Sample, _>("Broken", || bail!("no connection"))
            .method("ping", MethodMetadata::new(), 0, |_, _| Ok("pong"))
            .unwrap()
            .build();
        assert_eq!(
            invoke(&host, "ping"),
            InvocationOutcome::Failure {
                error: "instantiation failed: no connection".into()
            }
        );
    }
}
