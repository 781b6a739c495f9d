//! Resolved schema model.
//!
//! This module defines the intermediate representation every emitter
//! consumes: a name-indexed arena of resolved schema nodes plus the method
//! registry. The model is immutable once built; references between named
//! schemas stay graph edges (cycles included) and are never expanded.

use std::collections::HashMap;

/// Base primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// UTF-8 text.
    String,
    /// Whole number.
    Integer,
    /// True or false.
    Boolean,
    /// Byte sequence; travels as an encoded string on the wire.
    Bytes,
    /// Opaque value, accepted without inspection.
    Unknown,
}

/// A resolved schema node: a shape plus nullability.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// The shape of the value.
    pub shape: Shape,
    /// Whether an explicit null is accepted in place of the value.
    pub nullable: bool,
}

/// The closed set of resolved shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A base type.
    Primitive(Primitive),
    /// An object with an ordered field list.
    Object(ObjectShape),
    /// A homogeneous array.
    Array(Box<SchemaNode>),
    /// A union of members, tagged or untagged.
    Union(UnionShape),
    /// An ordered set of literal string values.
    Enum(Vec<String>),
    /// A named edge to another top-level schema.
    Reference(String),
}

/// Object shape: ordered fields with required flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    /// Fields in first-appearance order.
    pub fields: Vec<FieldShape>,
}

/// One object field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    /// Field name as it appears in wire payloads.
    pub wire_name: String,
    /// Field schema.
    pub schema: SchemaNode,
    /// Whether the field must be present in payloads; optional otherwise.
    pub required: bool,
}

/// Union shape: ordered members plus an optional discriminant.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionShape {
    /// Members in declaration order.
    pub members: Vec<SchemaNode>,
    /// Tag field and value mapping, when one was found.
    pub discriminant: Option<Discriminant>,
}

/// Discriminant of a tagged union.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminant {
    /// Wire name of the tag field.
    pub wire_field: String,
    /// Tag values in member order.
    pub variants: Vec<TagVariant>,
}

/// One tag value of a discriminated union.
#[derive(Debug, Clone, PartialEq)]
pub struct TagVariant {
    /// Literal tag value selecting this member.
    pub tag: String,
    /// Index into the union's member list.
    pub member: usize,
    /// Whether the member itself carries the tag field as a literal.
    /// Unpinned variants come from an explicit mapping and need the tag
    /// intersected onto the member type at emission.
    pub pinned: bool,
}

/// A named top-level schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSchema {
    /// Unique name within the model.
    pub name: String,
    /// Resolved node.
    pub node: SchemaNode,
}

/// A resolved RPC operation binding its three schema names.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Operation name as dispatched on the wire.
    pub name: String,
    /// Name of the request schema.
    pub request: String,
    /// Name of the response schema.
    pub response: String,
    /// Name of the error schema.
    pub error: String,
}

/// Immutable operation catalog, in declaration order.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    operations: Vec<Operation>,
    index: HashMap<String, usize>,
}

impl MethodRegistry {
    /// Build a registry from resolved operations.
    pub fn new(operations: Vec<Operation>) -> Self {
        let index = operations
            .iter()
            .enumerate()
            .map(|(i, op)| (op.name.clone(), i))
            .collect();
        Self { operations, index }
    }

    /// All operations in declaration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// The resolved model: named schemas plus the method registry.
///
/// Declared schemas come first in declaration order, followed by types
/// synthesized for inline operation schemas in operation order, so emission
/// order is stable across runs.
#[derive(Debug)]
pub struct SchemaModel {
    types: Vec<NamedSchema>,
    registry: MethodRegistry,
    index: HashMap<String, usize>,
}

impl SchemaModel {
    /// Build a model from resolved parts. Names are assumed unique; the
    /// builder enforces that before construction.
    pub fn new(types: Vec<NamedSchema>, registry: MethodRegistry) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self {
            types,
            registry,
            index,
        }
    }

    /// All named schemas in emission order.
    pub fn types(&self) -> &[NamedSchema] {
        &self.types
    }

    /// Resolve a name to its node.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.index.get(name).map(|&i| &self.types[i].node)
    }

    /// The operation catalog.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn string_node() -> SchemaNode {
        SchemaNode {
            shape: Shape::Primitive(Primitive::String),
            nullable: false,
        }
    }

    #[test]
    fn test_model_lookup() {
        let model = SchemaModel::new(
            vec![NamedSchema {
                name: "Hash".into(),
                node: string_node(),
            }],
            MethodRegistry::default(),
        );
        assert!(model.get("Hash").is_some());
        assert!(model.get("Missing").is_none());
    }

    #[test]
    fn test_registry_lookup_and_order() {
        let registry = MethodRegistry::new(vec![
            Operation {
                name: "status".into(),
                request: "StatusRequest".into(),
                response: "StatusResponse".into(),
                error: "RpcError".into(),
            },
            Operation {
                name: "block".into(),
                request: "BlockRequest".into(),
                response: "BlockResponse".into(),
                error: "RpcError".into(),
            },
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.operations()[0].name, "status");
        assert_eq!(registry.get("block").unwrap().request, "BlockRequest");
        assert!(registry.get("gasPrice").is_none());
    }

    #[test]
    fn test_node_structural_equality() {
        let a = SchemaNode {
            shape: Shape::Array(Box::new(string_node())),
            nullable: false,
        };
        let b = SchemaNode {
            shape: Shape::Array(Box::new(string_node())),
            nullable: false,
        };
        assert_eq!(a, b);

        let c = SchemaNode {
            shape: Shape::Array(Box::new(SchemaNode {
                shape: Shape::Primitive(Primitive::Bytes),
                nullable: false,
            })),
            nullable: false,
        };
        assert_ne!(a, c);
    }
}
