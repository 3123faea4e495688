use std::fmt;

use crate::error::InvocationError;

/// Typed value produced by coercion or returned by a registered method.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// Boolean.
    Bool(bool),
    /// 64-bit float.
    Double(f64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit signed integer.
    Long(i64),
    /// 16-bit signed integer.
    Short(i16),
    /// 8-bit signed integer.
    Byte(i8),
    /// Single character.
    Char(char),
    /// String.
    Str(String),
    /// Array-mode argument or list result.
    Array(Vec<Value>),
    /// Method returned nothing.
    Unit,
}

impl Value {
    /// Short name of the variant, used in argument type errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Double(_) => "double",
            Self::Float(_) => "float",
            Self::Long(_) => "long",
            Self::Short(_) => "short",
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Unit => "unit",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            // Debug keeps the fractional part: 2.0 instead of 2.
            Self::Double(v) => write!(f, "{v:?}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Array(values) => f.write_str(&render_list(values)),
            Self::Unit => f.write_str("()"),
        }
    }
}

/// Renders values as `[a, b, c]`.
#[must_use]
pub fn render_list(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    i32 => Int,
    bool => Bool,
    f64 => Double,
    f32 => Float,
    i64 => Long,
    i16 => Short,
    i8 => Byte,
    char => Char,
    String => Str,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Coerced arguments handed to a registered method.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

macro_rules! typed_accessor {
    ($($name:ident => $variant:ident : $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Reads position `position` as `", stringify!($ty), "`.")]
            pub fn $name(&self, position: usize) -> Result<$ty, InvocationError> {
                match self.get(position)?.clone() {
                    Value::$variant(v) => Ok(v),
                    other => Err(InvocationError::ArgumentType {
                        position,
                        expected: stringify!($name),
                        found: other.kind(),
                    }),
                }
            }
        )*
    };
}

impl<'a> Args<'a> {
    /// Wraps a slice of coerced values.
    #[must_use]
    pub const fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// Number of arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments were passed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `position`.
    pub fn get(&self, position: usize) -> Result<&'a Value, InvocationError> {
        self.values
            .get(position)
            .ok_or(InvocationError::MissingArgument {
                position,
                supplied: self.values.len(),
            })
    }

    typed_accessor! {
        int => Int: i32,
        bool => Bool: bool,
        double => Double: f64,
        float => Float: f32,
        long => Long: i64,
        short => Short: i16,
        byte => Byte: i8,
        char => Char: char,
        str => Str: String,
        array => Array: Vec<Value>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_like_report_cells() {
        assert_eq!(Value::Double(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::from(vec![1_i32, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(Value::from(()).to_string(), "()");
        assert_eq!(Value::from("ok").to_string(), "ok");
    }

    #[test]
    fn accessors_report_type_mismatches() {
        let values = [Value::Int(4), Value::Str("x".into())];
        let args = Args::new(&values);
        assert_eq!(args.int(0).unwrap(), 4);
        assert_eq!(args.str(1).unwrap(), "x");
        let err = args.int(1).unwrap_err();
        assert!(matches!(
            err,
            InvocationError::ArgumentType { position: 1, expected: "int", found: "string" }
        ));
        assert!(matches!(
            args.bool(2),
            Err(InvocationError::MissingArgument { position: 2, supplied: 2 })
        ));
    }
}
