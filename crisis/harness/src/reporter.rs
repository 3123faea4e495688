//! Priority bucketing and fixed-width report rendering.

use std::fmt;

use crate::{
    classifier::{MethodState, ResultRecord, RunSummary},
    config::{DisplayOrder, HostDescriptor},
    metadata::Priority,
};

/// Warning emitted when `None`-priority methods are left out of the table.
pub const NONE_PRIORITY_WARNING: &str =
    "WARNING : You are using NONE PRIORITY, method data won't be displayed !";

const RESET: &str = "\u{1b}[0m";
const COLUMNS: [(&str, usize); 8] = [
    ("Priority", 15),
    ("State", 15),
    ("Method name", 25),
    ("Return Type", 25),
    ("Return Value", 25),
    ("Parameters", 30),
    ("Runtime", 20),
    ("Error", 20),
];

/// Colour applied to a report cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCategory {
    /// Processed methods and the success count.
    Success,
    /// Failed methods and the failure count.
    Failure,
    /// Disabled methods, the disabled count and warnings.
    Warning,
}

impl ColorCategory {
    const fn code(self) -> &'static str {
        match self {
            Self::Success => "\u{1b}[32m",
            Self::Failure => "\u{1b}[31m",
            Self::Warning => "\u{1b}[33m",
        }
    }
}

impl From<MethodState> for ColorCategory {
    fn from(state: MethodState) -> Self {
        match state {
            MethodState::Processed => Self::Success,
            MethodState::Error => Self::Failure,
            MethodState::Disabled => Self::Warning,
        }
    }
}

/// Pads `text` to `width` and wraps it in the category colour when `enabled`.
///
/// Padding happens inside the escape sequence, so the visible width is the
/// same with and without colour.
#[must_use]
pub fn paint(category: ColorCategory, text: &str, width: usize, enabled: bool) -> String {
    if enabled {
        format!("{}{text:<width$}{RESET}", category.code())
    } else {
        format!("{text:<width$}")
    }
}

/// Records partitioned by priority, each bucket in discovery order.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    none: Vec<&'a ResultRecord>,
    low: Vec<&'a ResultRecord>,
    medium: Vec<&'a ResultRecord>,
    high: Vec<&'a ResultRecord>,
}

impl<'a> Buckets<'a> {
    /// Places every record in exactly one bucket.
    #[must_use]
    pub fn partition(records: &'a [ResultRecord]) -> Self {
        let mut buckets = Self::default();
        for record in records {
            match record.priority {
                Priority::None => buckets.none.push(record),
                Priority::Low => buckets.low.push(record),
                Priority::Medium => buckets.medium.push(record),
                Priority::High => buckets.high.push(record),
            }
        }
        buckets
    }

    /// Records in one bucket.
    #[must_use]
    pub fn bucket(&self, priority: Priority) -> &[&'a ResultRecord] {
        match priority {
            Priority::None => &self.none,
            Priority::Low => &self.low,
            Priority::Medium => &self.medium,
            Priority::High => &self.high,
        }
    }

    /// Records to render: a single bucket when `only` is set, otherwise all
    /// non-`None` buckets in `order`.
    #[must_use]
    pub fn select(&self, order: DisplayOrder, only: Priority) -> Vec<&'a ResultRecord> {
        let sequence: &[Priority] = match (only, order) {
            (Priority::None, DisplayOrder::Ascending) => {
                &[Priority::Low, Priority::Medium, Priority::High]
            }
            (Priority::None, DisplayOrder::Descending) => {
                &[Priority::High, Priority::Medium, Priority::Low]
            }
            (Priority::Low, _) => &[Priority::Low],
            (Priority::Medium, _) => &[Priority::Medium],
            (Priority::High, _) => &[Priority::High],
        };
        sequence
            .iter()
            .flat_map(|priority| self.bucket(*priority).iter().copied())
            .collect()
    }
}

/// Rendered report of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// `None`-priority warning, when applicable.
    pub warning: Option<String>,
    /// Column header line.
    pub header: String,
    /// One line per rendered record.
    pub rows: Vec<String>,
    /// Summary line with run counts.
    pub summary: String,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(warning) = &self.warning {
            writeln!(f, "{warning}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.header)?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        write!(f, "\n{}\n\n", self.summary)
    }
}

/// Renders records according to a host descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    descriptor: &'a HostDescriptor,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for one host's descriptor.
    #[must_use]
    pub const fn new(descriptor: &'a HostDescriptor) -> Self {
        Self { descriptor }
    }

    /// Builds the full report: warning, table and summary.
    #[must_use]
    pub fn render(&self, records: &[ResultRecord]) -> Report {
        let buckets = Buckets::partition(records);
        let warning = (!buckets.bucket(Priority::None).is_empty()
            && !self.descriptor.suppress_warnings)
            .then(|| {
                paint(
                    ColorCategory::Warning,
                    NONE_PRIORITY_WARNING,
                    0,
                    self.descriptor.colorize,
                )
            });
        let rows = buckets
            .select(self.descriptor.priority_order, self.descriptor.priority_only)
            .into_iter()
            .map(|record| self.row(record))
            .collect();
        Report {
            warning,
            header: header(),
            rows,
            summary: self.summary_line(&RunSummary::from_records(records)),
        }
    }

    /// Formats one table row.
    #[must_use]
    pub fn row(&self, record: &ResultRecord) -> String {
        let [(_, priority), (_, state), (_, name), (_, return_type), (_, value), (_, params), (_, runtime), (_, error)] =
            COLUMNS;
        format!(
            "{:<priority$} {} {:<name$} {:<return_type$} {:<value$} {:<params$} {:<runtime$} {:<error$}",
            record.priority.label(),
            paint(
                record.state.into(),
                record.state.label(),
                state,
                self.descriptor.colorize
            ),
            record.method_name,
            record.return_type,
            record.return_value,
            record.parameters,
            record.runtime(),
            record.error_cell(),
        )
    }

    /// Formats the summary line.
    #[must_use]
    pub fn summary_line(&self, summary: &RunSummary) -> String {
        let colorize = self.descriptor.colorize;
        format!(
            "Total : {}, {}, {}, {}",
            summary.total,
            paint(
                ColorCategory::Success,
                &format!("Successful : {}", summary.successful),
                0,
                colorize
            ),
            paint(
                ColorCategory::Failure,
                &format!("Failed : {}", summary.failed),
                0,
                colorize
            ),
            paint(
                ColorCategory::Warning,
                &format!("Disabled : {}", summary.disabled),
                0,
                colorize
            ),
        )
    }
}

fn header() -> String {
    COLUMNS
        .iter()
        .map(|(title, width)| format!("{title:<width$}"))
        .collect::<Vec<_>>()
        .join(" ")
}
