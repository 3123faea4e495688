//! Conversion of raw parameter text into typed values.

use std::{fmt::Display, str::FromStr};

use crate::{
    error::{CoercionError, InvocationError},
    metadata::{MethodMetadata, TypeTag},
    value::Value,
};

/// Converts `raw` into a value of the declared type.
///
/// Booleans follow the lenient convention: only `true` (any case) is true,
/// every other text is false. Characters take the first char of the text.
/// Floating-point text is trimmed and may carry an `f`/`d` suffix (`1.5f`);
/// integer text is parsed as is.
pub fn coerce(raw: &str, target: TypeTag) -> Result<Value, CoercionError> {
    match target {
        TypeTag::Int => parse(raw, raw, target).map(Value::Int),
        TypeTag::Bool => Ok(Value::Bool(raw.eq_ignore_ascii_case("true"))),
        TypeTag::Double => parse(float_literal(raw), raw, target).map(Value::Double),
        TypeTag::Float => parse(float_literal(raw), raw, target).map(Value::Float),
        TypeTag::Long => parse(raw, raw, target).map(Value::Long),
        TypeTag::Short => parse(raw, raw, target).map(Value::Short),
        TypeTag::Byte => parse(raw, raw, target).map(Value::Byte),
        TypeTag::Char => raw.chars().next().map(Value::Char).ok_or(CoercionError::EmptyChar),
        TypeTag::Str => Ok(Value::Str(raw.to_string())),
    }
}

fn float_literal(raw: &str) -> &str {
    let text = raw.trim();
    text.strip_suffix(|c: char| matches!(c, 'f' | 'F' | 'd' | 'D'))
        .unwrap_or(text)
}

fn parse<T>(text: &str, raw: &str, target: TypeTag) -> Result<T, CoercionError>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse().map_err(|err: T::Err| CoercionError::Parse {
        raw: raw.to_string(),
        target,
        reason: err.to_string(),
    })
}

/// Coerces the first `count` parameter values, one per method position.
pub fn coerce_positional(
    metadata: &MethodMetadata,
    count: usize,
) -> Result<Vec<Value>, InvocationError> {
    (0..count)
        .map(|position| -> Result<Value, InvocationError> {
            let raw = metadata
                .parameters
                .get(position)
                .ok_or(InvocationError::MissingArgument {
                    position,
                    supplied: metadata.parameters.len(),
                })?;
            Ok(coerce(raw, metadata.type_at(position))?)
        })
        .collect()
}

/// Coerces every parameter value for array mode.
pub fn coerce_array(metadata: &MethodMetadata) -> Result<Vec<Value>, CoercionError> {
    metadata
        .parameters
        .iter()
        .enumerate()
        .map(|(position, raw)| coerce(raw, metadata.type_at(position)))
        .collect()
}
