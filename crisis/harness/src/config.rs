//! Type-level descriptor controlling how a host type's run is reported.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::metadata::Priority;

/// Order in which priority buckets are rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayOrder {
    /// Low, then Medium, then High.
    #[serde(alias = "low")]
    Ascending,
    /// High, then Medium, then Low.
    #[default]
    #[serde(alias = "medium", alias = "high")]
    Descending,
}

/// Descriptor that marks a host type as runnable and configures its report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HostDescriptor {
    /// Bucket ordering when no single bucket is selected.
    pub priority_order: DisplayOrder,
    /// Restricts the table to one bucket; `None` renders all of them.
    pub priority_only: Priority,
    /// Hides the warning about excluded `None`-priority methods.
    pub suppress_warnings: bool,
    /// Author shown in the banner.
    pub created_by: String,
    /// Modification date shown in the banner.
    pub last_modified: String,
    /// Skips the banner.
    pub silent: bool,
    /// Wraps state and summary cells in ANSI colour codes.
    pub colorize: bool,
}

impl Default for HostDescriptor {
    fn default() -> Self {
        Self {
            priority_order: DisplayOrder::Descending,
            priority_only: Priority::None,
            suppress_warnings: false,
            created_by: String::new(),
            last_modified: String::new(),
            silent: false,
            colorize: true,
        }
    }
}

impl HostDescriptor {
    /// Descriptor with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a descriptor from a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading host descriptor {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parses a descriptor from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Sets the bucket order.
    #[must_use]
    pub fn with_order(mut self, order: DisplayOrder) -> Self {
        self.priority_order = order;
        self
    }

    /// Restricts rendering to a single bucket.
    #[must_use]
    pub fn with_only(mut self, only: Priority) -> Self {
        self.priority_only = only;
        self
    }

    /// Hides the `None`-priority warning.
    #[must_use]
    pub fn with_suppressed_warnings(mut self, suppress: bool) -> Self {
        self.suppress_warnings = suppress;
        self
    }

    /// Sets the banner author and modification date.
    #[must_use]
    pub fn with_authorship(
        mut self,
        created_by: impl Into<String>,
        last_modified: impl Into<String>,
    ) -> Self {
        self.created_by = created_by.into();
        self.last_modified = last_modified.into();
        self
    }

    /// Skips the banner.
    #[must_use]
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Enables or disables colour output.
    #[must_use]
    pub fn with_colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_partial_toml_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("calculator.toml");
        fs::write(
            &path,
            "priority_order = \"low\"\npriority_only = \"medium\"\ncreated_by = \"ops\"\n",
        )
        .unwrap();
        let descriptor = HostDescriptor::load(&path).unwrap();
        assert_eq!(descriptor.priority_order, DisplayOrder::Ascending);
        assert_eq!(descriptor.priority_only, Priority::Medium);
        assert_eq!(descriptor.created_by, "ops");
        assert!(descriptor.colorize);
        assert!(!descriptor.silent);
    }

    #[test]
    fn order_accepts_priority_aliases() {
        let descriptor = HostDescriptor::from_toml("priority_order = \"high\"").unwrap();
        assert_eq!(descriptor.priority_order, DisplayOrder::Descending);
        let descriptor = HostDescriptor::from_toml("priority_order = \"ascending\"").unwrap();
        assert_eq!(descriptor.priority_order, DisplayOrder::Ascending);
        assert!(HostDescriptor::from_toml("priority_order = \"sideways\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = HostDescriptor::load("/nonexistent/crisis.toml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/crisis.toml"));
    }
}
