//! Schema loading, document reading and validator configuration.
//!
//! This crate is the glue between files on disk and the validation engine in
//! [`docschema_core`]:
//!
//! - [`load_schema`] parses a schema description (field list or
//!   `$jsonSchema` collection validator, JSON or YAML) into a
//!   [`Schema`](docschema_core::Schema), rejecting malformed descriptions.
//! - [`to_json_schema`] renders a schema back as a collection validator.
//! - [`read_documents`] turns a JSON array or JSON-lines file into typed
//!   [`Document`](docschema_core::Document)s.
//! - [`ValidatorConfig`] is the YAML configuration for the validator.
//!
//! # Quick start
//!
//! ```no_run
//! use docschema_loader::{ValidatorConfig, load_schema, read_documents};
//!
//! let schema = load_schema("schema.json").unwrap();
//! let docs = read_documents("rows.jsonl").unwrap();
//! let validator = ValidatorConfig::load("validator.yml").unwrap().validator();
//!
//! let report = validator.validate_batch(&schema, &docs);
//! println!("{} of {} documents accepted", report.accepted(), report.total);
//! ```

mod config;
mod document;
mod error;
mod loader;

pub use config::ValidatorConfig;
pub use document::{document_from_json, parse_documents, read_documents};
pub use error::{LoadError, Result};
pub use loader::{
    SchemaFormat, load_schema, parse_schema_json, parse_schema_yaml, schema_from_value,
    to_json_schema,
};
