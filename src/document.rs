//! Schema document structs for serde deserialization.
//!
//! This module defines the raw, un-resolved shape of an input document: a
//! named-schema table plus an operation list. Nothing here is semantically
//! validated beyond what the document format itself requires; reference
//! resolution, composition merging, and discriminant detection happen in the
//! type model builder.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::GenError;

/// Root schema document.
#[derive(Debug, Deserialize)]
pub struct Document {
    /// Named schema table, in declaration order.
    #[serde(default)]
    pub schemas: Vec<NamedEntry>,
    /// Operation list, in declaration order.
    #[serde(default)]
    pub operations: Vec<RawOperation>,
}

/// One entry of the named schema table.
#[derive(Debug, Deserialize)]
pub struct NamedEntry {
    /// Schema name; must be unique within the document.
    pub name: String,
    /// The schema node itself.
    pub schema: RawNode,
}

/// A raw RPC operation: request, response, and error schemas.
#[derive(Debug, Deserialize)]
pub struct RawOperation {
    /// Operation name; must be unique within the document.
    pub name: String,
    /// Request schema (usually a `$ref`).
    pub request: RawNode,
    /// Response schema.
    pub response: RawNode,
    /// Error schema.
    pub error: RawNode,
}

/// An un-resolved schema node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    /// Base type tag (string, integer, boolean, bytes, unknown, object, array).
    #[serde(rename = "type")]
    pub node_type: Option<RawType>,

    /// Reference to another named schema.
    #[serde(rename = "$ref")]
    pub ref_name: Option<String>,

    /// Ordered field list for object types.
    pub fields: Option<Vec<RawField>>,

    /// Item schema for array types.
    pub items: Option<Box<RawNode>>,

    /// Ordered literal string values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,

    /// Single literal string value; shorthand for a one-value enum.
    #[serde(rename = "const")]
    pub const_value: Option<String>,

    /// Union members, in declaration order.
    pub one_of: Option<Vec<RawNode>>,

    /// Composition fragments to merge into one object.
    pub all_of: Option<Vec<RawNode>>,

    /// Discriminator hint for a `oneOf` union.
    pub discriminator: Option<RawDiscriminator>,

    /// Whether an explicit null is accepted in place of the value.
    pub nullable: Option<bool>,
}

/// A single object field with its required flag.
#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    /// Wire name of the field.
    pub name: String,
    /// Field schema.
    pub schema: RawNode,
    /// Whether the field must be present in payloads.
    #[serde(default)]
    pub required: bool,
}

/// Discriminator hint for polymorphic unions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDiscriminator {
    /// Wire name of the tag field.
    pub property_name: String,
    /// Optional mapping from tag value to referenced schema name.
    pub mapping: Option<BTreeMap<String, String>>,
}

/// Base type tags accepted by the document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawType {
    /// UTF-8 text.
    String,
    /// Whole number.
    Integer,
    /// True or false.
    Boolean,
    /// Byte sequence, carried encoded as a string on the wire.
    Bytes,
    /// Opaque value; accepted as-is.
    Unknown,
    /// Object with an ordered field list.
    Object,
    /// Homogeneous array.
    Array,
}

impl Document {
    /// Parse a schema document from a JSON string.
    ///
    /// # Errors
    /// Returns [`GenError::MalformedDocument`] when the text is not valid
    /// JSON in the document shape, or when schema or operation names repeat.
    pub fn from_json(text: &str) -> Result<Self, GenError> {
        let document: Self = serde_json::from_str(text)
            .map_err(|e| GenError::MalformedDocument(format!("failed to parse document: {e}")))?;

        let mut schema_names = HashSet::new();
        for entry in &document.schemas {
            if !schema_names.insert(entry.name.as_str()) {
                return Err(GenError::MalformedDocument(format!(
                    "duplicate schema name '{}'",
                    entry.name
                )));
            }
        }

        let mut operation_names = HashSet::new();
        for operation in &document.operations {
            if !operation_names.insert(operation.name.as_str()) {
                return Err(GenError::MalformedDocument(format!(
                    "duplicate operation name '{}'",
                    operation.name
                )));
            }
        }

        Ok(document)
    }
}

impl RawNode {
    /// Whether this node is a bare reference with no other structure.
    pub fn is_plain_ref(&self) -> bool {
        self.ref_name.is_some()
            && self.fields.is_none()
            && self.one_of.is_none()
            && self.all_of.is_none()
            && self.enum_values.is_none()
    }
}
