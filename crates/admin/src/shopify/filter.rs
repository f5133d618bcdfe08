//! Search filter builder for the `query:` argument of list connections.
//!
//! The Admin API search syntax is a space-separated list of `field:value`
//! terms combined with an implicit AND. The platform silently ignores terms
//! it cannot parse and returns unfiltered results, so rendering must be
//! exact:
//!
//! - clauses render in insertion order, joined by a single space
//! - values are quoted when they contain whitespace or any of
//!   `" \ ' : ( ) *`, start with `-`, or are a bare `AND`/`OR`/`NOT` in any
//!   case; inside quotes `\` and `"` are backslash-escaped
//! - empty values and raw clauses are emitted literally (`status:` stays
//!   `status:`); they are passed through, not dropped
//!
//! ```
//! use agent_helper_admin::shopify::SearchFilter;
//!
//! let filter = SearchFilter::new()
//!     .status("active")
//!     .text("garlic salt")
//!     .created_after("2024-01-01");
//! assert_eq!(
//!     filter.render().as_deref(),
//!     Some(r#"status:active "garlic salt" created_at:>=2024-01-01"#)
//! );
//! ```

use core::fmt;

/// Comparison used by a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOp {
    /// `field:value`
    #[default]
    Eq,
    /// `field:>value`
    Gt,
    /// `field:>=value`
    Gte,
    /// `field:<value`
    Lt,
    /// `field:<=value`
    Lte,
}

impl FilterOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => ":",
            Self::Gt => ":>",
            Self::Gte => ":>=",
            Self::Lt => ":<",
            Self::Lte => ":<=",
        }
    }
}

/// A single search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    /// `field<op>value`, or a bare term when `field` is `None`.
    Term {
        /// Field name, e.g. `status` or `created_at`.
        field: Option<String>,
        /// Comparison operator (ignored for bare terms).
        op: FilterOp,
        /// Value, escaped on render.
        value: String,
    },
    /// Caller-supplied text emitted verbatim.
    Raw(String),
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term { field, op, value } => {
                if let Some(field) = field {
                    write!(f, "{field}{}", op.as_str())?;
                }
                f.write_str(&escape_value(value))
            }
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Ordered set of clauses rendered into a search string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    clauses: Vec<FilterClause>,
}

impl SearchFilter {
    /// An empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Add `field<op>value`.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        self.clauses.push(FilterClause::Term {
            field: Some(field.into()),
            op,
            value: value.into(),
        });
        self
    }

    /// Add `status:<value>`.
    #[must_use]
    pub fn status(self, status: impl Into<String>) -> Self {
        self.field("status", FilterOp::Eq, status)
    }

    /// Add a free-text term.
    #[must_use]
    pub fn text(mut self, term: impl Into<String>) -> Self {
        self.clauses.push(FilterClause::Term {
            field: None,
            op: FilterOp::Eq,
            value: term.into(),
        });
        self
    }

    /// Add `created_at:>=<date>`.
    #[must_use]
    pub fn created_after(self, date: impl Into<String>) -> Self {
        self.field("created_at", FilterOp::Gte, date)
    }

    /// Add `created_at:<=<date>`.
    #[must_use]
    pub fn created_before(self, date: impl Into<String>) -> Self {
        self.field("created_at", FilterOp::Lte, date)
    }

    /// Add a clause emitted exactly as given.
    #[must_use]
    pub fn raw(mut self, clause: impl Into<String>) -> Self {
        self.clauses.push(FilterClause::Raw(clause.into()));
        self
    }

    /// Append every clause of `other`.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    /// The clauses in render order.
    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// Whether no clause has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render the search string, or `None` when there are no clauses.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        if self.clauses.is_empty() {
            return None;
        }
        Some(
            self.clauses
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

/// Words the search syntax reads as boolean connectives.
const CONNECTIVES: [&str; 3] = ["AND", "OR", "NOT"];

fn needs_quotes(value: &str) -> bool {
    value.starts_with('-')
        || CONNECTIVES.iter().any(|word| value.eq_ignore_ascii_case(word))
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\\' | '\'' | ':' | '(' | ')' | '*'))
}

fn escape_value(value: &str) -> String {
    if !needs_quotes(value) {
        return value.to_owned();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
