//! Schema model and validator for document-store collections.
//!
//! This crate defines the in-memory schema of a collection and the engine
//! that checks documents against it:
//!
//! - [`TypeTag`] / [`TypeSet`]: primitive value types (`int`, `double`,
//!   `string`, `bool`, `date`, `null`) and the set a field accepts.
//! - [`FieldSpec`]: one field's name, required flag, and accepted types.
//! - [`Schema`]: an immutable, ordered collection of field specs with
//!   unique names.
//! - [`Value`] / [`Document`]: typed document values.
//!
//! Validation ([`validate`], [`Validator`]) never fails and never mutates its
//! inputs; it returns the list of [`Violation`]s in schema declaration order.
//!
//! # Example
//!
//! ```
//! use docschema_core::*;
//!
//! let schema = Schema::new([
//!     FieldSpec::required("id", [TypeTag::Int]),
//!     FieldSpec::optional("int_with_nan", [TypeTag::Int]).nullable(),
//! ])
//! .unwrap();
//!
//! let doc = Document::new().with("id", 3).with("int_with_nan", Value::Null);
//! assert!(validate(&schema, &doc).is_ok());
//!
//! let doc = Document::new().with("id", 3).with("int_with_nan", 1.5);
//! let violations = validate(&schema, &doc).unwrap_err();
//! assert!(matches!(violations[0].kind, ViolationKind::TypeMismatch { .. }));
//! ```

mod types;
mod validate;
mod value;

pub use types::*;
pub use validate::{
    BatchReport, RejectedDocument, ReportMode, UnknownFieldPolicy, Validator, Violation,
    ViolationKind, validate,
};
pub use value::{Document, Value};
