use std::fmt;

use serde::{Deserialize, Serialize};

/// Priority bucket of a tagged method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Never rendered in the report.
    #[default]
    None,
    /// Routine checks.
    Low,
    /// Default priority for tagged methods.
    Medium,
    /// Checks rendered first in descending order.
    High,
}

impl Priority {
    /// Upper-case label used in the report table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declared target type of a parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    /// 32-bit signed integer.
    Int,
    /// Boolean.
    Bool,
    /// 64-bit float.
    Double,
    /// 32-bit float.
    Float,
    /// 64-bit signed integer.
    Long,
    /// 16-bit signed integer.
    Short,
    /// 8-bit signed integer.
    Byte,
    /// Single character.
    Char,
    /// Raw string.
    #[default]
    Str,
}

impl TypeTag {
    /// Resolves a tag from its textual name. Unknown names fall back to [`TypeTag::Str`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "i32" | "integer" => Self::Int,
            "bool" | "boolean" => Self::Bool,
            "double" | "f64" => Self::Double,
            "float" | "f32" => Self::Float,
            "long" | "i64" => Self::Long,
            "short" | "i16" => Self::Short,
            "byte" | "i8" => Self::Byte,
            "char" | "character" => Self::Char,
            _ => Self::Str,
        }
    }

    /// Canonical lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Double => "double",
            Self::Float => "float",
            Self::Long => "long",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Str => "string",
        }
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.name().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Execution metadata attached to a registered method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MethodMetadata {
    /// Priority bucket used by the report.
    pub priority: Priority,
    /// Whether the method runs at all.
    pub enabled: bool,
    /// Whether the return value is rendered.
    pub result_enabled: bool,
    /// Raw parameter values, in position order.
    pub parameters: Vec<String>,
    /// Declared parameter types; a single entry applies to every position.
    pub types: Vec<TypeTag>,
    /// Passes every parameter as one array argument.
    pub array: bool,
}

impl Default for MethodMetadata {
    fn default() -> Self {
        Self {
            priority: Priority::Medium,
            enabled: true,
            result_enabled: true,
            parameters: Vec::new(),
            types: vec![TypeTag::Str],
            array: false,
        }
    }
}

impl MethodMetadata {
    /// Metadata with default values (medium priority, enabled, string parameters).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Enables or disables the method.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enables or disables rendering of the return value.
    #[must_use]
    pub fn with_result(mut self, result_enabled: bool) -> Self {
        self.result_enabled = result_enabled;
        self
    }

    /// Sets the raw parameter values.
    #[must_use]
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the declared parameter types.
    #[must_use]
    pub fn with_types(mut self, types: impl IntoIterator<Item = TypeTag>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Switches array mode on or off.
    #[must_use]
    pub fn with_array(mut self, array: bool) -> Self {
        self.array = array;
        self
    }

    /// Declared type for a parameter position.
    #[must_use]
    pub fn type_at(&self, position: usize) -> TypeTag {
        match self.types.as_slice() {
            [single] => *single,
            types => types.get(position).copied().unwrap_or_default(),
        }
    }

    /// Checks that positional types line up with the parameter values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.array && self.types.len() > 1 && self.types.len() != self.parameters.len() {
            return Err(format!(
                "{} declared types for {} parameter values",
                self.types.len(),
                self.parameters.len()
            ));
        }
        Ok(())
    }
}
