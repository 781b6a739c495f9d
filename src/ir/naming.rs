//! Naming normalization: wire names to idiomatic identifiers.
//!
//! The transformation is pure and deterministic: wire names are tokenized on
//! separators and case transitions, then reassembled as camelCase. Per
//! object, the resulting map must be a bijection; a collision aborts the run
//! with the offending wire names and owning object.

use std::collections::HashMap;

use super::model::{SchemaModel, SchemaNode, Shape};
use super::utils::TS_RESERVED_WORDS;
use crate::error::GenError;

/// Derive the idiomatic identifier for a wire name.
///
/// Tokenizes on `_`, `-`, `.`, and space, and on lower-or-digit to upper
/// case transitions, then rejoins the tokens in camelCase. Identifiers that
/// would start with a digit or shadow a reserved word get a `_` prefix.
pub fn idiomatic_name(wire: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in wire.chars() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        let boundary = c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
        if boundary && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    let mut result = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let lower = token.to_ascii_lowercase();
        if i == 0 {
            result.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                result.extend(first.to_uppercase());
                result.extend(chars);
            }
        }
    }

    if result.is_empty() {
        return "_field".to_string();
    }
    if result
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
    {
        result = format!("_{result}");
    }
    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result = format!("_{result}");
    }
    result
}

/// Per-object bijection between wire and idiomatic field names.
#[derive(Debug, Clone)]
pub struct NameMapping {
    /// Stable path of the owning object, rooted at its named type.
    pub object: String,
    /// `(wire, idiomatic)` pairs in field order.
    pub pairs: Vec<(String, String)>,
}

/// All name mappings of a model, in walk order.
#[derive(Debug, Default)]
pub struct NamingTable {
    /// One mapping per reachable object.
    pub maps: Vec<NameMapping>,
}

/// Build the naming table for every object reachable from a named schema.
///
/// References are not followed: the referenced type owns its own mappings,
/// so every inline object is visited exactly once and cycles cannot recur.
///
/// # Errors
/// Returns [`GenError::FieldNameCollision`] when two wire names in one
/// object normalize to the same identifier.
pub fn build_naming(model: &SchemaModel) -> Result<NamingTable, GenError> {
    let mut table = NamingTable::default();
    for named in model.types() {
        collect_object_maps(&named.node, &named.name, &mut table.maps)?;
    }
    Ok(table)
}

/// Walk a node, recording a mapping for each object encountered.
fn collect_object_maps(
    node: &SchemaNode,
    path: &str,
    maps: &mut Vec<NameMapping>,
) -> Result<(), GenError> {
    match &node.shape {
        Shape::Object(object) => {
            let mut pairs = Vec::with_capacity(object.fields.len());
            let mut claimed: HashMap<String, &str> = HashMap::new();
            for field in &object.fields {
                let idiomatic = idiomatic_name(&field.wire_name);
                if let Some(first) = claimed.get(idiomatic.as_str()) {
                    return Err(GenError::FieldNameCollision {
                        object: path.to_string(),
                        first: (*first).to_string(),
                        second: field.wire_name.clone(),
                        idiomatic,
                    });
                }
                claimed.insert(idiomatic.clone(), field.wire_name.as_str());
                pairs.push((field.wire_name.clone(), idiomatic));
            }
            maps.push(NameMapping {
                object: path.to_string(),
                pairs,
            });
            for field in &object.fields {
                let child_path = format!("{path}/{}", field.wire_name);
                collect_object_maps(&field.schema, &child_path, maps)?;
            }
        }
        Shape::Array(inner) => collect_object_maps(inner, path, maps)?,
        Shape::Union(union) => {
            for (i, member) in union.members.iter().enumerate() {
                let member_path = format!("{path}/{i}");
                collect_object_maps(member, &member_path, maps)?;
            }
        }
        Shape::Primitive(_) | Shape::Enum(_) | Shape::Reference(_) => {}
    }
    Ok(())
}
