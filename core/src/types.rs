//! Schema type definitions for document-store collections.
//!
//! A [`Schema`] is an ordered, immutable list of [`FieldSpec`]s. Each field
//! names the set of runtime types it accepts ([`TypeSet`]); nullability is not
//! a separate flag but the presence of [`TypeTag::Null`] in that set, which is
//! how document-store validators spell it (`bsonType: ["int", "null"]`).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Primitive type tag of a document value.
///
/// Tag names follow the `bsonType` vocabulary. When parsed, a few common
/// spellings are accepted as aliases (`integer`, `float`, `datetime`, ...).
///
/// # Examples
///
/// ```
/// use docschema_core::TypeTag;
///
/// assert_eq!("int".parse::<TypeTag>().unwrap(), TypeTag::Int);
/// assert_eq!("float".parse::<TypeTag>().unwrap(), TypeTag::Double);
/// assert_eq!(TypeTag::Date.to_string(), "date");
/// assert!("decimal".parse::<TypeTag>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// 64-bit signed integer.
    #[serde(alias = "integer", alias = "long")]
    Int,
    /// 64-bit floating point.
    #[serde(alias = "float", alias = "number")]
    Double,
    /// UTF-8 string.
    String,
    /// Boolean.
    #[serde(alias = "boolean")]
    Bool,
    /// UTC timestamp.
    #[serde(alias = "datetime")]
    Date,
    /// Explicit absence of a value.
    Null,
}

impl TypeTag {
    /// Every tag, in canonical order.
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Int,
        TypeTag::Double,
        TypeTag::String,
        TypeTag::Bool,
        TypeTag::Date,
        TypeTag::Null,
    ];

    /// Returns the canonical `bsonType` name.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Bool => "bool",
            TypeTag::Date => "date",
            TypeTag::Null => "null",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "long" => Ok(TypeTag::Int),
            "double" | "float" | "number" => Ok(TypeTag::Double),
            "string" => Ok(TypeTag::String),
            "bool" | "boolean" => Ok(TypeTag::Bool),
            "date" | "datetime" => Ok(TypeTag::Date),
            "null" => Ok(TypeTag::Null),
            _ => Err(SchemaError::UnknownType(s.to_string())),
        }
    }
}

/// Ordered, duplicate-free set of accepted [`TypeTag`]s.
///
/// Insertion order is kept so that reports and exports list the types the
/// way the schema author wrote them.
///
/// # Examples
///
/// ```
/// use docschema_core::{TypeSet, TypeTag};
///
/// let set = TypeSet::new([TypeTag::Int, TypeTag::Null, TypeTag::Int]);
/// assert_eq!(set.len(), 2);
/// assert!(set.is_nullable());
/// assert_eq!(set.to_string(), "[int, null]");
/// assert_eq!(TypeSet::new([TypeTag::Bool]).to_string(), "bool");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TypeTag>", into = "Vec<TypeTag>")]
pub struct TypeSet {
    tags: Vec<TypeTag>,
}

impl TypeSet {
    /// Builds a set from tags, dropping repeats.
    pub fn new(tags: impl IntoIterator<Item = TypeTag>) -> Self {
        let mut set = Self::default();
        for tag in tags {
            set.insert(tag);
        }
        set
    }

    fn insert(&mut self, tag: TypeTag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Returns `true` if `tag` is accepted.
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Returns `true` if the set includes the `null` alternative.
    pub fn is_nullable(&self) -> bool {
        self.contains(TypeTag::Null)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.tags.iter().copied()
    }

    pub fn as_slice(&self) -> &[TypeTag] {
        &self.tags
    }
}

impl From<Vec<TypeTag>> for TypeSet {
    fn from(tags: Vec<TypeTag>) -> Self {
        Self::new(tags)
    }
}

impl From<TypeSet> for Vec<TypeTag> {
    fn from(set: TypeSet) -> Self {
        set.tags
    }
}

impl FromIterator<TypeTag> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [single] = self.tags.as_slice() {
            return write!(f, "{single}");
        }
        let names: Vec<&str> = self.tags.iter().map(TypeTag::name).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Constraint for a single document field.
///
/// # Examples
///
/// ```
/// use docschema_core::{FieldSpec, TypeTag};
///
/// let id = FieldSpec::required("id", [TypeTag::Int]);
/// assert!(id.required);
/// assert!(!id.is_nullable());
///
/// let score = FieldSpec::optional("score", [TypeTag::Double]).nullable();
/// assert!(score.is_nullable());
/// assert!(score.accepts(TypeTag::Null));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in documents.
    pub name: String,
    /// Whether the field must be present.
    pub required: bool,
    /// Accepted runtime types.
    pub types: TypeSet,
}

impl FieldSpec {
    /// Creates a field that must be present.
    pub fn required(name: &str, types: impl IntoIterator<Item = TypeTag>) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            types: TypeSet::new(types),
        }
    }

    /// Creates a field that may be left out.
    pub fn optional(name: &str, types: impl IntoIterator<Item = TypeTag>) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            types: TypeSet::new(types),
        }
    }

    /// Adds the `null` alternative to the accepted types.
    pub fn nullable(mut self) -> Self {
        self.types.insert(TypeTag::Null);
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.types.is_nullable()
    }

    /// Returns `true` if a value tagged `tag` satisfies this field.
    pub fn accepts(&self, tag: TypeTag) -> bool {
        self.types.contains(tag)
    }
}

/// Structural problems that make a schema unusable.
///
/// These are raised while a schema is built or loaded, never while a
/// document is validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field name is empty or whitespace-only.
    #[error("field name cannot be empty")]
    EmptyFieldName,
    /// Two fields share a name.
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    /// A field accepts no types at all.
    #[error("field '{0}' must accept at least one type")]
    EmptyTypeSet(String),
    /// A type name outside the supported vocabulary.
    #[error("unknown type: {0}")]
    UnknownType(String),
}

/// Immutable, ordered collection of field constraints.
///
/// Field order is declaration order and drives the order in which
/// violations are reported.
///
/// # Examples
///
/// ```
/// use docschema_core::{FieldSpec, Schema, SchemaError, TypeTag};
///
/// let schema = Schema::new([
///     FieldSpec::required("id", [TypeTag::Int]),
///     FieldSpec::optional("note", [TypeTag::String]).nullable(),
/// ])
/// .unwrap();
/// assert_eq!(schema.len(), 2);
/// assert!(schema.field("note").unwrap().is_nullable());
///
/// let dup = Schema::new([
///     FieldSpec::required("id", [TypeTag::Int]),
///     FieldSpec::optional("id", [TypeTag::String]),
/// ]);
/// assert_eq!(dup.unwrap_err(), SchemaError::DuplicateField("id".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    title: Option<String>,
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema, checking that names are non-empty and unique and
    /// that every field accepts at least one type.
    pub fn new(fields: impl IntoIterator<Item = FieldSpec>) -> Result<Self, SchemaError> {
        let fields: Vec<FieldSpec> = fields.into_iter().collect();
        let mut seen: HashSet<&str> = HashSet::new();

        for field in &fields {
            let name = field.name.as_str();
            if name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateField(name.to_string()));
            }
            if field.types.is_empty() {
                return Err(SchemaError::EmptyTypeSet(name.to_string()));
            }
        }

        let index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();

        Ok(Self {
            title: None,
            fields,
            index,
        })
    }

    /// Attaches a descriptive title (usually the collection name).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields flagged as required, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Fields whose type-set includes `null`, in declaration order.
    pub fn nullable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_nullable())
    }
}
