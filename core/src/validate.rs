//! Document validation against a [`Schema`].
//!
//! Validation is a pure function of `(schema, document)`: it never mutates
//! either side, never fails with an error, and always walks the schema in
//! declaration order so that reports are deterministic.
//!
//! # Examples
//!
//! ```
//! use docschema_core::*;
//!
//! let schema = Schema::new([FieldSpec::required("id", [TypeTag::Int])]).unwrap();
//!
//! assert!(validate(&schema, &Document::new().with("id", 3)).is_ok());
//!
//! let violations = validate(&schema, &Document::new()).unwrap_err();
//! assert_eq!(violations, vec![Violation::missing("id")]);
//!
//! let violations = validate(&schema, &Document::new().with("id", "3")).unwrap_err();
//! assert_eq!(violations[0].to_string(), "field 'id': expected int, got string");
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{Document, FieldSpec, Schema, TypeSet, TypeTag, Value};

/// What went wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required, non-nullable field is absent.
    #[error("missing required field")]
    Missing,
    /// The value's runtime type is not among the accepted types.
    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: TypeSet, actual: TypeTag },
    /// The field is not declared by the schema (strict policy only).
    #[error("unknown field")]
    Unknown,
}

/// A single constraint failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("field '{field}': {kind}")]
pub struct Violation {
    /// Name of the offending field.
    pub field: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: ViolationKind::Missing,
        }
    }

    pub fn type_mismatch(field: &str, expected: TypeSet, actual: TypeTag) -> Self {
        Self {
            field: field.to_string(),
            kind: ViolationKind::TypeMismatch { expected, actual },
        }
    }

    pub fn unknown(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: ViolationKind::Unknown,
        }
    }
}

/// How fields that the schema does not declare are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Undeclared fields are ignored.
    #[default]
    Permissive,
    /// Each undeclared field is reported as [`ViolationKind::Unknown`].
    Strict,
}

/// How many violations a single validation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Every violation, in schema order.
    #[default]
    All,
    /// Only the first violation found.
    First,
}

/// Configurable document validator.
///
/// A `Validator` holds options only, never a document or per-call state, so
/// one instance can be shared across threads and reused for any schema.
///
/// # Examples
///
/// ```
/// use docschema_core::*;
///
/// let schema = Schema::new([FieldSpec::required("id", [TypeTag::Int])]).unwrap();
/// let doc = Document::new().with("id", 1).with("extra", true);
///
/// assert!(Validator::new().validate(&schema, &doc).is_ok());
///
/// let strict = Validator::new().with_unknown_fields(UnknownFieldPolicy::Strict);
/// assert_eq!(
///     strict.validate(&schema, &doc).unwrap_err(),
///     vec![Violation::unknown("extra")]
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    unknown_fields: UnknownFieldPolicy,
    report: ReportMode,
}

impl Validator {
    /// Creates a permissive validator that reports every violation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn with_report_mode(mut self, mode: ReportMode) -> Self {
        self.report = mode;
        self
    }

    pub fn unknown_fields(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }

    pub fn report_mode(&self) -> ReportMode {
        self.report
    }

    /// Validates one document.
    ///
    /// Missing and type-mismatch violations come first, in schema
    /// declaration order. Under the strict policy, unknown-field violations
    /// follow in document key order.
    pub fn validate(&self, schema: &Schema, document: &Document) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();

        for spec in schema.fields() {
            if let Some(violation) = check_field(spec, document.get(&spec.name)) {
                violations.push(violation);
                if self.report == ReportMode::First {
                    return Err(violations);
                }
            }
        }

        if self.unknown_fields == UnknownFieldPolicy::Strict {
            for name in document.field_names() {
                if schema.contains(name) {
                    continue;
                }
                violations.push(Violation::unknown(name));
                if self.report == ReportMode::First {
                    return Err(violations);
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Validates every document independently, in input order.
    ///
    /// A rejected document never stops the batch; the report lists each
    /// rejected document's index alongside its violations.
    pub fn validate_batch(&self, schema: &Schema, documents: &[Document]) -> BatchReport {
        let rejected = documents
            .iter()
            .enumerate()
            .filter_map(|(index, doc)| self.reject(schema, index, doc))
            .collect();
        self.finish_batch(documents.len(), rejected)
    }

    /// Same as [`validate_batch`](Self::validate_batch), spread over the
    /// rayon thread pool. The report is identical to the sequential one.
    pub fn validate_batch_parallel(&self, schema: &Schema, documents: &[Document]) -> BatchReport {
        let rejected = documents
            .par_iter()
            .enumerate()
            .filter_map(|(index, doc)| self.reject(schema, index, doc))
            .collect();
        self.finish_batch(documents.len(), rejected)
    }

    fn reject(&self, schema: &Schema, index: usize, doc: &Document) -> Option<RejectedDocument> {
        self.validate(schema, doc)
            .err()
            .map(|violations| RejectedDocument { index, violations })
    }

    fn finish_batch(&self, total: usize, rejected: Vec<RejectedDocument>) -> BatchReport {
        let report = BatchReport { total, rejected };
        debug!(
            total = report.total,
            accepted = report.accepted(),
            rejected = report.rejected.len(),
            "validated document batch"
        );
        report
    }
}

/// Validates `document` against `schema` with the default options
/// (permissive unknown fields, all violations).
pub fn validate(schema: &Schema, document: &Document) -> Result<(), Vec<Violation>> {
    Validator::default().validate(schema, document)
}

fn check_field(spec: &FieldSpec, value: Option<&Value>) -> Option<Violation> {
    match value {
        None if spec.required && !spec.is_nullable() => Some(Violation::missing(&spec.name)),
        None => None,
        Some(value) => {
            let actual = value.type_tag();
            if spec.accepts(actual) {
                None
            } else {
                Some(Violation::type_mismatch(&spec.name, spec.types.clone(), actual))
            }
        }
    }
}

/// A document that failed validation within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedDocument {
    /// Position of the document in the input.
    pub index: usize,
    pub violations: Vec<Violation>,
}

/// Outcome of validating a batch of documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of documents validated.
    pub total: usize,
    /// Rejected documents in input order.
    pub rejected: Vec<RejectedDocument>,
}

impl BatchReport {
    pub fn accepted(&self) -> usize {
        self.total - self.rejected.len()
    }

    /// Returns `true` if every document passed.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
