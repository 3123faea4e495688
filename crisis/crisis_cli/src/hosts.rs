use anyhow::{bail, ensure, Context};
use crisis_harness::{
    DisplayOrder, HarnessError, HostCatalog, HostDescriptor, HostType, MethodMetadata, Priority,
    TypeTag, Value,
};

struct Calculator {
    rounding: u32,
}

impl Calculator {
    fn round(&self, value: f64) -> f64 {
        let scale = 10_f64.powi(i32::try_from(self.rounding).unwrap_or(0));
        (value * scale).round() / scale
    }
}

struct Greeter {
    salutation: String,
    history: Vec<String>,
}

impl Greeter {
    fn new() -> Self {
        Self {
            salutation: "Hello".into(),
            history: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Unconfigured;

/// Demo host types available to the CLI.
pub fn catalog() -> Result<HostCatalog, HarnessError> {
    let mut catalog = HostCatalog::new();
    catalog.register(calculator()?);
    catalog.register(greeter()?);
    catalog.register(unconfigured()?);
    Ok(catalog)
}

fn calculator() -> Result<HostType, HarnessError> {
    Ok(HostType::builder("Calculator", || Ok(Calculator { rounding: 2 }))
        .descriptor(HostDescriptor::new().with_authorship("crisis", "2024-01-15"))
        .method(
            "add",
            MethodMetadata::new()
                .with_priority(Priority::High)
                .with_parameters(["2", "3"])
                .with_types([TypeTag::Int]),
            2,
            |_, args| Ok(args.int(0)? + args.int(1)?),
        )?
        .method(
            "divide",
            MethodMetadata::new()
                .with_parameters(["10", "0"])
                .with_types([TypeTag::Int]),
            2,
            |_, args| {
                let divisor = args.int(1)?;
                ensure!(divisor != 0, "division by zero");
                Ok(args.int(0)? / divisor)
            },
        )?
        .method(
            "average",
            MethodMetadata::new()
                .with_priority(Priority::Low)
                .with_parameters(["1.5", "2.5", "4"])
                .with_types([TypeTag::Double])
                .with_array(true),
            1,
            |calculator, args| {
                let values = args.array(0)?;
                let mut sum = 0.0_f64;
                for value in &values {
                    let Value::Double(v) = value else {
                        bail!("expected doubles, found {}", value.kind());
                    };
                    sum += *v;
                }
                #[allow(clippy::cast_precision_loss)]
                let mean = sum / values.len().max(1) as f64;
                Ok(calculator.round(mean))
            },
        )?
        .method(
            "negate",
            MethodMetadata::new()
                .with_priority(Priority::Low)
                .with_enabled(false)
                .with_parameters(["4"])
                .with_types([TypeTag::Long]),
            1,
            |_, args| Ok(-args.long(0)?),
        )?
        .method(
            "ratio",
            MethodMetadata::new()
                .with_result(false)
                .with_parameters(["1", "3"])
                .with_types([TypeTag::Float]),
            2,
            |_, args| Ok(args.float(0)? / args.float(1)?),
        )?
        .method(
            "describe",
            MethodMetadata::new().with_priority(Priority::None),
            0,
            |calculator, _| Ok(format!("calculator rounding to {} places", calculator.rounding)),
        )?
        .untagged("reset", 0, |calculator, _| {
            calculator.rounding = 0;
            Ok(())
        })?
        .build())
}

fn greeter() -> Result<HostType, HarnessError> {
    Ok(HostType::builder("Greeter", || Ok(Greeter::new()))
        .descriptor(
            HostDescriptor::new()
                .with_order(DisplayOrder::Ascending)
                .with_suppressed_warnings(true)
                .with_authorship("crisis", "2024-02-02"),
        )
        .method(
            "greet",
            MethodMetadata::new()
                .with_priority(Priority::High)
                .with_parameters(["world"]),
            1,
            |greeter, args| {
                let line = format!("{} {}", greeter.salutation, args.str(0)?);
                greeter.history.push(line.clone());
                Ok(line)
            },
        )?
        .method(
            "shout",
            MethodMetadata::new()
                .with_parameters(["hey", "3"])
                .with_types([TypeTag::Str, TypeTag::Int]),
            2,
            |_, args| {
                let times = usize::try_from(args.int(1)?)?;
                Ok(args.str(0)?.to_uppercase().repeat(times))
            },
        )?
        .method(
            "initial",
            MethodMetadata::new()
                .with_priority(Priority::Low)
                .with_parameters(["zeta"])
                .with_types([TypeTag::Char]),
            1,
            |_, args| Ok(args.char(0)?.to_ascii_uppercase()),
        )?
        .method(
            "formal",
            MethodMetadata::new()
                .with_priority(Priority::Low)
                .with_parameters(["TRUE"])
                .with_types([TypeTag::Bool]),
            1,
            |greeter, args| {
                if args.bool(0)? {
                    greeter.salutation = "Good day".into();
                }
                Ok(greeter.salutation.clone())
            },
        )?
        .method(
            "recall",
            MethodMetadata::new().with_priority(Priority::High),
            0,
            |greeter, _| {
                greeter
                    .history
                    .first()
                    .cloned()
                    .context("nothing greeted yet")
            },
        )?
        .method(
            "latest",
            MethodMetadata::new(),
            0,
            |greeter, _| Ok(greeter.history[greeter.history.len().saturating_sub(1)].clone()),
        )?
        .method(
            "mood",
            MethodMetadata::new().with_priority(Priority::None),
            0,
            |_, _| Ok("cheerful"),
        )?
        .build())
}

fn unconfigured() -> Result<HostType, HarnessError> {
    Ok(HostType::with_default::<Unconfigured>("Unconfigured")
        .method("ping", MethodMetadata::new(), 0, |_, _| Ok("pong"))?
        .build())
}
