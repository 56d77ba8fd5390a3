//! Content type and entry descriptors
//!
//! Descriptors are the locally authored definitions pushed to the space.
//! Entry descriptors are accepted both in the remote envelope shape
//! (`sys.id`, `sys.contentType.sys.id`) and in a flat shape
//! (`id`, `contentType`) for files written by hand.

use crate::error::{Result, SyncError};
use crate::source::{DescriptorSource, Document};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A content type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Remaining top-level keys (`displayField`, `description`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single field of a content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    /// Editor widget hint; never sent as part of the content type itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A content type split into what goes to each endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedModel {
    pub id: String,
    /// Content type body with `id` and every `appearance` removed
    pub body: Value,
    /// Editor interface controls, one per field that had an appearance
    pub controls: Vec<Value>,
}

impl ModelDescriptor {
    /// Strip appearances from the fields and collect them as editor controls
    pub fn prepare(self) -> Result<PreparedModel> {
        let mut controls = Vec::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            if let Some(appearance) = field.appearance {
                controls.push(editor_control(&self.id, &field.id, appearance)?);
            }

            let mut body = Map::with_capacity(field.attributes.len() + 1);
            body.insert("id".to_string(), Value::String(field.id));
            body.extend(field.attributes);
            fields.push(Value::Object(body));
        }

        let mut body = self.extra;
        if let Some(name) = self.name {
            body.insert("name".to_string(), Value::String(name));
        }
        body.insert("fields".to_string(), Value::Array(fields));

        Ok(PreparedModel {
            id: self.id,
            body: Value::Object(body),
            controls,
        })
    }
}

/// `{fieldId, ...appearance}`; a bare string is shorthand for `widgetId`
fn editor_control(model_id: &str, field_id: &str, appearance: Value) -> Result<Value> {
    let mut control = Map::new();
    control.insert("fieldId".to_string(), Value::String(field_id.to_string()));

    match appearance {
        Value::Object(settings) => control.extend(settings),
        Value::String(widget) => {
            control.insert("widgetId".to_string(), Value::String(widget));
        }
        other => {
            return Err(SyncError::Descriptor {
                name: model_id.to_string(),
                message: format!(
                    "appearance of field {field_id} must be an object or widget id, got {other}"
                ),
            })
        }
    }

    Ok(Value::Object(control))
}

/// Link to another resource: `{ "sys": { "id": ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSys {
    pub id: String,
}

/// Flat content type reference: either a plain id or a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentTypeRef {
    Id(String),
    Link(Link),
}

impl ContentTypeRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Link(link) => &link.sys.id,
        }
    }
}

/// Remote metadata carried by entries exported from a space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntrySys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "contentType",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<Link>,
}

/// An entry definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<EntrySys>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "contentType",
        alias = "content_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<ContentTypeRef>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl EntryDescriptor {
    /// Entry id, from `sys` first and the flat `id` otherwise
    pub fn entry_id(&self) -> Option<&str> {
        self.sys
            .as_ref()
            .and_then(|sys| sys.id.as_deref())
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Content type id, from `sys.contentType` first and the flat key otherwise
    pub fn content_type_id(&self) -> Option<&str> {
        self.sys
            .as_ref()
            .and_then(|sys| sys.content_type.as_ref())
            .map(|link| link.sys.id.as_str())
            .or(self.content_type.as_ref().map(ContentTypeRef::id))
            .filter(|id| !id.is_empty())
    }

    /// Request body for create and update calls
    pub fn body(&self) -> Value {
        json!({ "fields": self.fields })
    }
}

/// Expand nested arrays into their leaves, depth first
pub fn flatten(value: Value) -> Vec<Value> {
    let mut out = Vec::new();
    flatten_into(value, &mut out);
    out
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        leaf => out.push(leaf),
    }
}

/// Load every content type descriptor from a source
pub fn load_models(source: &dyn DescriptorSource) -> Result<Vec<ModelDescriptor>> {
    load(source)
}

/// Load every entry descriptor from a source, flattening nested arrays
pub fn load_entries(source: &dyn DescriptorSource) -> Result<Vec<EntryDescriptor>> {
    load(source)
}

fn load<T: serde::de::DeserializeOwned>(source: &dyn DescriptorSource) -> Result<Vec<T>> {
    let mut descriptors = Vec::new();
    for Document { name, value } in source.documents()? {
        for (index, item) in flatten(value).into_iter().enumerate() {
            let descriptor = serde_json::from_value(item).map_err(|e| SyncError::Descriptor {
                name: format!("{name}[{index}]"),
                message: e.to_string(),
            })?;
            descriptors.push(descriptor);
        }
    }
    Ok(descriptors)
}
