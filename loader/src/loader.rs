//! Schema loading from external descriptions.
//!
//! Two description shapes are understood, in JSON or YAML:
//!
//! - **Field list**: a `fields` map of `name: { types: [...], required: bool }`.
//! - **Collection validator**: the `$jsonSchema` object a document store
//!   attaches to a collection (`required` names plus `properties` carrying a
//!   `bsonType` string or list). The wrapping `validator` / `$jsonSchema` keys
//!   are optional.
//!
//! ```
//! use docschema_loader::parse_schema_yaml;
//!
//! let schema = parse_schema_yaml(r#"
//! fields:
//!   id:           { types: [int], required: true }
//!   int_with_nan: { types: [int, null] }
//! "#).unwrap();
//! assert_eq!(schema.len(), 2);
//! assert!(schema.field("int_with_nan").unwrap().is_nullable());
//! ```
//!
//! Field order is preserved from the description; it is the order in which
//! violations are later reported.

use std::fmt;
use std::path::Path;

use docschema_core::{FieldSpec, Schema, SchemaError, TypeSet, TypeTag};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{LoadError, Result};

/// Shape of a schema description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// `fields: { name: { types, required } }`.
    FieldList,
    /// `$jsonSchema: { required, properties: { name: { bsonType } } }`.
    CollectionValidator,
}

impl SchemaFormat {
    /// Detects the description shape, looking through the optional
    /// `validator` and `$jsonSchema` wrappers.
    pub fn detect(value: &Value) -> Option<Self> {
        Description::deserialize(value)
            .ok()
            .and_then(|desc| desc.unwrap_validator().format())
    }
}

/// Loads a schema file, choosing the parser from its extension.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedExtension`] for anything but `.json`,
/// `.yaml` and `.yml`, [`LoadError::IoError`] if the file cannot be read,
/// and parse or structure errors as for [`schema_from_value`].
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = match ext.as_str() {
        "json" | "yaml" | "yml" => std::fs::read_to_string(path)?,
        _ => return Err(LoadError::UnsupportedExtension(path.display().to_string())),
    };

    let schema = if ext == "json" {
        parse_schema_json(&content)?
    } else {
        parse_schema_yaml(&content)?
    };
    debug!(path = %path.display(), fields = schema.len(), "loaded schema file");
    Ok(schema)
}

/// Parses a JSON schema description.
///
/// A field name repeated inside `fields` or `properties` is reported as
/// [`SchemaError::DuplicateField`] rather than letting the last entry win.
pub fn parse_schema_json(content: &str) -> Result<Schema> {
    let desc: Description = serde_json::from_str(content)?;
    build_schema(desc)
}

/// Parses a YAML schema description.
///
/// A bare `null` in a type list is read as the `null` type.
pub fn parse_schema_yaml(content: &str) -> Result<Schema> {
    let desc: Description = serde_yaml::from_str(content)?;
    build_schema(desc)
}

/// Builds a [`Schema`] from an already parsed description.
///
/// # Errors
///
/// Returns [`LoadError::InvalidFormat`] if the shape is not recognised,
/// and [`LoadError::InvalidSchema`] for structural problems such as an empty
/// type list, an unknown type name, or a duplicate field.
pub fn schema_from_value(value: &Value) -> Result<Schema> {
    let desc = Description::deserialize(value)
        .map_err(|err| LoadError::InvalidFormat(err.to_string()))?;
    build_schema(desc)
}

fn build_schema(desc: Description) -> Result<Schema> {
    let desc = desc.unwrap_validator();
    let format = desc.format().ok_or_else(|| {
        LoadError::InvalidFormat("expected a `fields` map or a `properties` map".to_string())
    })?;

    let schema = match format {
        SchemaFormat::FieldList => parse_field_list(desc)?,
        SchemaFormat::CollectionValidator => parse_collection_validator(desc)?,
    };
    debug!(
        ?format,
        fields = schema.len(),
        required = schema.required_fields().count(),
        "parsed schema description"
    );
    Ok(schema)
}

/// Top level of either description shape. Keys it does not name
/// (`description`, `additionalProperties`, ...) are ignored.
#[derive(Debug, Default, Deserialize)]
struct Description {
    #[serde(default)]
    validator: Option<Box<Description>>,
    #[serde(default, rename = "$jsonSchema")]
    json_schema: Option<Box<Description>>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    fields: Option<Entries>,
    #[serde(default)]
    properties: Option<Entries>,
    #[serde(default, rename = "bsonType")]
    bson_type: Option<Value>,
    #[serde(default)]
    required: Option<Value>,
}

impl Description {
    fn unwrap_validator(mut self) -> Self {
        if let Some(inner) = self.validator.take() {
            self = *inner;
        }
        if let Some(inner) = self.json_schema.take() {
            self = *inner;
        }
        self
    }

    fn format(&self) -> Option<SchemaFormat> {
        if self.properties.is_some() {
            Some(SchemaFormat::CollectionValidator)
        } else if self.fields.is_some() {
            Some(SchemaFormat::FieldList)
        } else {
            None
        }
    }

    fn titled(&self, schema: Schema) -> Schema {
        match &self.title {
            Some(title) => schema.with_title(title.as_str()),
            None => schema,
        }
    }
}

/// A name-keyed map read as ordered pairs, repeated names included.
#[derive(Debug, Default)]
struct Entries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Entries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// A type list written either as a single name or as a sequence. A missing
/// name is YAML's bare `null`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeNames {
    One(Option<String>),
    Many(Vec<Option<String>>),
}

impl TypeNames {
    fn parse(self) -> std::result::Result<TypeSet, SchemaError> {
        let names = match self {
            TypeNames::One(name) => vec![name],
            TypeNames::Many(names) => names,
        };
        names
            .into_iter()
            .map(|name| match name {
                Some(name) => name.parse::<TypeTag>(),
                None => Ok(TypeTag::Null),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawField {
    types: TypeNames,
    #[serde(default)]
    required: bool,
}

fn parse_field_list(mut desc: Description) -> Result<Schema> {
    let Entries(fields) = desc.fields.take().unwrap_or_default();

    let mut specs = Vec::with_capacity(fields.len());
    for (name, raw) in fields {
        let raw: RawField = serde_json::from_value(raw)
            .map_err(|err| LoadError::InvalidFormat(format!("field '{name}': {err}")))?;
        specs.push(FieldSpec {
            types: raw.types.parse()?,
            required: raw.required,
            name,
        });
    }

    Ok(desc.titled(Schema::new(specs)?))
}

fn parse_collection_validator(mut desc: Description) -> Result<Schema> {
    if let Some(root) = &desc.bson_type {
        if root.as_str() != Some("object") {
            return Err(LoadError::InvalidFormat(format!(
                "root bsonType must be \"object\", found {root}"
            )));
        }
    }

    let Entries(properties) = desc.properties.take().unwrap_or_default();
    let required = required_names(desc.required.take())?;

    for name in &required {
        if !properties.iter().any(|(declared, _)| declared == name) {
            return Err(LoadError::InvalidFormat(format!(
                "required field '{name}' is not declared in properties"
            )));
        }
    }

    let mut specs = Vec::with_capacity(properties.len());
    for (name, mut property) in properties {
        let bson_type = property
            .get_mut("bsonType")
            .map(Value::take)
            .ok_or_else(|| LoadError::InvalidFormat(format!("property '{name}' has no bsonType")))?;
        let names: TypeNames = serde_json::from_value(bson_type)
            .map_err(|err| LoadError::InvalidFormat(format!("property '{name}': {err}")))?;
        specs.push(FieldSpec {
            required: required.contains(&name),
            types: names.parse()?,
            name,
        });
    }

    Ok(desc.titled(Schema::new(specs)?))
}

fn required_names(value: Option<Value>) -> Result<Vec<String>> {
    match value {
        None => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value).map_err(|err| {
            LoadError::InvalidFormat(format!("`required` must be a list of names: {err}"))
        }),
    }
}

/// Renders a schema as a collection validator (`{"$jsonSchema": ...}`).
///
/// Single-type fields are written with a scalar `bsonType`, the way such
/// validators are usually hand-written.
///
/// ```
/// use docschema_core::{FieldSpec, Schema, TypeTag};
/// use docschema_loader::to_json_schema;
///
/// let schema = Schema::new([
///     FieldSpec::required("id", [TypeTag::Int]),
///     FieldSpec::optional("note", [TypeTag::String]).nullable(),
/// ])
/// .unwrap();
/// let json = to_json_schema(&schema);
/// assert_eq!(json["$jsonSchema"]["required"], serde_json::json!(["id"]));
/// assert_eq!(
///     json["$jsonSchema"]["properties"]["note"]["bsonType"],
///     serde_json::json!(["string", "null"])
/// );
/// ```
pub fn to_json_schema(schema: &Schema) -> Value {
    let mut properties = Map::new();
    for field in schema.fields() {
        let bson_type = match field.types.as_slice() {
            [single] => Value::from(single.name()),
            tags => Value::from(tags.iter().map(TypeTag::name).collect::<Vec<_>>()),
        };
        let mut property = Map::new();
        property.insert("bsonType".to_string(), bson_type);
        properties.insert(field.name.clone(), Value::Object(property));
    }

    let required: Vec<&str> = schema
        .required_fields()
        .map(|f| f.name.as_str())
        .collect();

    let mut inner = Map::new();
    inner.insert("bsonType".to_string(), Value::from("object"));
    if let Some(title) = schema.title() {
        inner.insert("title".to_string(), Value::from(title));
    }
    inner.insert("required".to_string(), Value::from(required));
    inner.insert("properties".to_string(), Value::Object(properties));

    let mut root = Map::new();
    root.insert("$jsonSchema".to_string(), Value::Object(inner));
    Value::Object(root)
}
