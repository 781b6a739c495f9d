//! Type model resolution: raw document to `SchemaModel`.
//!
//! This stage owns all semantic rules of the input format:
//! - reference resolution against the named table (references stay edges,
//!   cycles included; nothing is expanded)
//! - all-of composition flattened by structural field merge
//! - discriminated-union detection, by explicit hint or by the shared
//!   single-literal-field scan
//! - synthesis of named request/response/error types for inline operation
//!   schemas

use std::collections::{HashMap, HashSet};

use super::model::{
    Discriminant, FieldShape, MethodRegistry, NamedSchema, ObjectShape, Operation, Primitive,
    SchemaModel, SchemaNode, Shape, TagVariant, UnionShape,
};
use super::naming::idiomatic_name;
use super::utils::capitalize_first;
use crate::document::{Document, RawDiscriminator, RawField, RawNode, RawOperation, RawType};
use crate::error::GenError;

/// Resolve a parsed document into the immutable schema model.
///
/// # Errors
/// Returns [`GenError::UnresolvedReference`], [`GenError::ConflictingComposition`],
/// or [`GenError::DuplicateTypeName`]; any failure aborts the run.
pub fn resolve_document(document: &Document) -> Result<SchemaModel, GenError> {
    Resolver::new(document).run()
}

/// Resolution context over one document.
struct Resolver<'a> {
    /// The document being resolved.
    document: &'a Document,
    /// Raw named-schema table.
    raw: HashMap<&'a str, &'a RawNode>,
}

impl<'a> Resolver<'a> {
    /// Build the context from a parsed document.
    fn new(document: &'a Document) -> Self {
        let raw = document
            .schemas
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.schema))
            .collect();
        Self { document, raw }
    }

    /// Resolve every named schema and operation.
    fn run(&self) -> Result<SchemaModel, GenError> {
        let mut types = Vec::with_capacity(self.document.schemas.len());
        for entry in &self.document.schemas {
            let node = self.resolve_node(&entry.schema, &entry.name)?;
            types.push(NamedSchema {
                name: entry.name.clone(),
                node,
            });
        }

        let mut operations = Vec::with_capacity(self.document.operations.len());
        for operation in &self.document.operations {
            let request =
                self.operation_type(operation, &operation.request, "Request", &mut types)?;
            let response =
                self.operation_type(operation, &operation.response, "Response", &mut types)?;
            let error = self.operation_type(operation, &operation.error, "Error", &mut types)?;
            operations.push(Operation {
                name: operation.name.clone(),
                request,
                response,
                error,
            });
        }

        Ok(SchemaModel::new(types, MethodRegistry::new(operations)))
    }

    /// Resolve one operation schema to a type name, synthesizing a named
    /// type when the schema is inline.
    fn operation_type(
        &self,
        operation: &'a RawOperation,
        raw: &'a RawNode,
        suffix: &str,
        types: &mut Vec<NamedSchema>,
    ) -> Result<String, GenError> {
        if raw.is_plain_ref()
            && let Some(name) = &raw.ref_name
        {
            if !self.raw.contains_key(name.as_str()) {
                return Err(GenError::UnresolvedReference {
                    name: name.clone(),
                    owner: operation.name.clone(),
                });
            }
            return Ok(name.clone());
        }

        let type_name = format!(
            "{}{}",
            capitalize_first(&idiomatic_name(&operation.name)),
            suffix
        );
        if types.iter().any(|t| t.name == type_name) {
            return Err(GenError::DuplicateTypeName(type_name));
        }
        let node = self.resolve_node(raw, &type_name)?;
        types.push(NamedSchema {
            name: type_name.clone(),
            node,
        });
        Ok(type_name)
    }

    /// Resolve a raw node into its shape. `owner` names the schema or
    /// operation being resolved, for error context.
    fn resolve_node(&self, raw: &'a RawNode, owner: &str) -> Result<SchemaNode, GenError> {
        let nullable = raw.nullable.unwrap_or(false);

        if let Some(name) = &raw.ref_name {
            if !self.raw.contains_key(name.as_str()) {
                return Err(GenError::UnresolvedReference {
                    name: name.clone(),
                    owner: owner.to_string(),
                });
            }
            return Ok(SchemaNode {
                shape: Shape::Reference(name.clone()),
                nullable,
            });
        }

        if let Some(fragments) = &raw.all_of {
            return self.resolve_all_of(fragments, owner, nullable);
        }

        if let Some(members) = &raw.one_of {
            let shape = self.resolve_union(members, raw.discriminator.as_ref(), owner)?;
            return Ok(SchemaNode { shape, nullable });
        }

        if let Some(values) = &raw.enum_values {
            return Ok(SchemaNode {
                shape: Shape::Enum(values.clone()),
                nullable,
            });
        }

        if let Some(value) = &raw.const_value {
            return Ok(SchemaNode {
                shape: Shape::Enum(vec![value.clone()]),
                nullable,
            });
        }

        let shape = if raw.node_type == Some(RawType::Object)
            || (raw.node_type.is_none() && raw.fields.is_some())
        {
            let mut fields = Vec::new();
            if let Some(raw_fields) = &raw.fields {
                for field in raw_fields {
                    fields.push(FieldShape {
                        wire_name: field.name.clone(),
                        schema: self.resolve_node(&field.schema, owner)?,
                        required: field.required,
                    });
                }
            }
            Shape::Object(ObjectShape { fields })
        } else {
            match raw.node_type {
                Some(RawType::Array) => {
                    let items = match &raw.items {
                        Some(items) => self.resolve_node(items, owner)?,
                        // Bare arrays accept anything
                        None => SchemaNode {
                            shape: Shape::Primitive(Primitive::Unknown),
                            nullable: false,
                        },
                    };
                    Shape::Array(Box::new(items))
                }
                Some(RawType::String) => Shape::Primitive(Primitive::String),
                Some(RawType::Integer) => Shape::Primitive(Primitive::Integer),
                Some(RawType::Boolean) => Shape::Primitive(Primitive::Boolean),
                Some(RawType::Bytes) => Shape::Primitive(Primitive::Bytes),
                Some(RawType::Unknown | RawType::Object) | None => {
                    Shape::Primitive(Primitive::Unknown)
                }
            }
        };

        Ok(SchemaNode { shape, nullable })
    }

    /// Flatten an all-of composition into one object by structural merge.
    /// A field repeated with an identical shape is kept once; a repeat with
    /// a different shape is a conflict.
    fn resolve_all_of(
        &self,
        fragments: &'a [RawNode],
        owner: &str,
        nullable: bool,
    ) -> Result<SchemaNode, GenError> {
        let mut fields: Vec<FieldShape> = Vec::new();
        for fragment in fragments {
            let mut visited = HashSet::new();
            for raw_field in self.composition_fields(fragment, owner, &mut visited)? {
                let resolved = FieldShape {
                    wire_name: raw_field.name.clone(),
                    schema: self.resolve_node(&raw_field.schema, owner)?,
                    required: raw_field.required,
                };
                match fields.iter().find(|f| f.wire_name == resolved.wire_name) {
                    Some(existing) if *existing == resolved => {}
                    Some(_) => {
                        return Err(GenError::ConflictingComposition {
                            type_name: owner.to_string(),
                            detail: format!(
                                "field '{}' appears with conflicting shapes",
                                resolved.wire_name
                            ),
                        });
                    }
                    None => fields.push(resolved),
                }
            }
        }
        Ok(SchemaNode {
            shape: Shape::Object(ObjectShape { fields }),
            nullable,
        })
    }

    /// Collect the raw fields contributed by one composition fragment,
    /// following references and nested all-ofs. `visited` marks the current
    /// reference path, so a composition that reaches itself is rejected
    /// while diamonds (the same type via two fragments) are not.
    fn composition_fields(
        &self,
        raw: &'a RawNode,
        owner: &str,
        visited: &mut HashSet<&'a str>,
    ) -> Result<Vec<&'a RawField>, GenError> {
        if let Some(name) = &raw.ref_name {
            let Some(target) = self.raw.get(name.as_str()) else {
                return Err(GenError::UnresolvedReference {
                    name: name.clone(),
                    owner: owner.to_string(),
                });
            };
            if !visited.insert(name.as_str()) {
                return Err(GenError::ConflictingComposition {
                    type_name: owner.to_string(),
                    detail: format!("composition cycle through '{name}'"),
                });
            }
            let fields = self.composition_fields(target, owner, visited)?;
            visited.remove(name.as_str());
            return Ok(fields);
        }

        if let Some(fragments) = &raw.all_of {
            let mut fields = Vec::new();
            for fragment in fragments {
                fields.extend(self.composition_fields(fragment, owner, visited)?);
            }
            return Ok(fields);
        }

        if raw.node_type == Some(RawType::Object) || raw.fields.is_some() {
            return Ok(raw.fields.as_deref().unwrap_or_default().iter().collect());
        }

        Err(GenError::ConflictingComposition {
            type_name: owner.to_string(),
            detail: "composition fragment is not an object".to_string(),
        })
    }

    /// Resolve a one-of union and detect its discriminant.
    fn resolve_union(
        &self,
        members: &'a [RawNode],
        hint: Option<&'a RawDiscriminator>,
        owner: &str,
    ) -> Result<Shape, GenError> {
        let resolved = members
            .iter()
            .map(|member| self.resolve_node(member, owner))
            .collect::<Result<Vec<_>, _>>()?;
        let discriminant = self.detect_discriminant(members, hint, owner);
        Ok(Shape::Union(UnionShape {
            members: resolved,
            discriminant,
        }))
    }

    /// Find the union's discriminant, if any. An explicit hint is validated
    /// against the members; otherwise every field of the first member is
    /// probed for a required single-literal value shared by all members with
    /// pairwise-distinct tags. No qualifying field means the union stays
    /// untagged.
    fn detect_discriminant(
        &self,
        members: &'a [RawNode],
        hint: Option<&'a RawDiscriminator>,
        owner: &str,
    ) -> Option<Discriminant> {
        if members.is_empty() {
            return None;
        }

        if let Some(hint) = hint {
            return self.discriminant_from_hint(members, hint, owner);
        }

        let mut all_fields = Vec::with_capacity(members.len());
        for member in members {
            all_fields.push(self.member_fields(member, owner)?);
        }

        for candidate in &all_fields[0] {
            let field_name = candidate.name.as_str();
            let mut variants = Vec::new();
            let mut tags = HashSet::new();
            let mut qualified = true;
            for (i, fields) in all_fields.iter().enumerate() {
                let tag = fields
                    .iter()
                    .find(|f| f.name == field_name && f.required)
                    .and_then(|f| literal_tag(f));
                match tag {
                    Some(tag) if tags.insert(tag) => variants.push(TagVariant {
                        tag: tag.to_string(),
                        member: i,
                        pinned: true,
                    }),
                    _ => {
                        qualified = false;
                        break;
                    }
                }
            }
            if qualified {
                return Some(Discriminant {
                    wire_field: field_name.to_string(),
                    variants,
                });
            }
        }
        None
    }

    /// Validate an explicit discriminator hint. A member either pins the tag
    /// field itself, or is a reference named in the hint's mapping. A hint
    /// that cannot be proven for every member is discarded and the union is
    /// treated as untagged.
    fn discriminant_from_hint(
        &self,
        members: &'a [RawNode],
        hint: &'a RawDiscriminator,
        owner: &str,
    ) -> Option<Discriminant> {
        let mut variants = Vec::with_capacity(members.len());
        let mut tags = HashSet::new();
        for (i, member) in members.iter().enumerate() {
            let own_tag = self.member_fields(member, owner).and_then(|fields| {
                fields
                    .iter()
                    .find(|f| f.name == hint.property_name && f.required)
                    .and_then(|f| literal_tag(f))
                    .map(str::to_string)
            });
            let (tag, pinned) = match own_tag {
                Some(tag) => (tag, true),
                None => {
                    let ref_name = member.ref_name.as_deref()?;
                    let tag = hint
                        .mapping
                        .as_ref()?
                        .iter()
                        .find(|(_, target)| target.as_str() == ref_name)
                        .map(|(tag, _)| tag.clone())?;
                    (tag, false)
                }
            };
            if !tags.insert(tag.clone()) {
                return None;
            }
            variants.push(TagVariant {
                tag,
                member: i,
                pinned,
            });
        }
        Some(Discriminant {
            wire_field: hint.property_name.clone(),
            variants,
        })
    }

    /// Object fields of a union member, following references and all-of
    /// composition. `None` when the member is not object-shaped.
    fn member_fields(&self, member: &'a RawNode, owner: &str) -> Option<Vec<&'a RawField>> {
        let mut visited = HashSet::new();
        self.composition_fields(member, owner, &mut visited).ok()
    }
}

/// Extract the single literal string value of a field schema, if it has one
/// (`const` or a one-value `enum`).
fn literal_tag(field: &RawField) -> Option<&str> {
    if let Some(value) = &field.schema.const_value {
        return Some(value);
    }
    if let Some(values) = &field.schema.enum_values
        && values.len() == 1
    {
        return Some(&values[0]);
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> Result<SchemaModel, GenError> {
        let document = Document::from_json(text).unwrap();
        resolve_document(&document)
    }

    #[test]
    fn test_resolve_basic_shapes() {
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "Hash", "schema": { "type": "bytes" } },
                    { "name": "Heights", "schema": { "type": "array", "items": { "type": "integer" } } },
                    { "name": "Block", "schema": { "type": "object", "fields": [
                        { "name": "block_hash", "schema": { "$ref": "Hash" }, "required": true },
                        { "name": "note", "schema": { "type": "string", "nullable": true } }
                    ] } }
                ]
            }"#,
        )
        .unwrap();

        assert!(matches!(
            model.get("Hash").unwrap().shape,
            Shape::Primitive(Primitive::Bytes)
        ));
        assert!(matches!(model.get("Heights").unwrap().shape, Shape::Array(_)));
        let Shape::Object(object) = &model.get("Block").unwrap().shape else {
            panic!("expected object");
        };
        assert_eq!(object.fields.len(), 2);
        assert!(object.fields[0].required);
        assert!(!object.fields[1].required);
        assert!(object.fields[1].schema.nullable);
    }

    #[test]
    fn test_unresolved_reference() {
        let err = resolve(
            r#"{
                "schemas": [
                    { "name": "Block", "schema": { "type": "object", "fields": [
                        { "name": "hash", "schema": { "$ref": "Missing" }, "required": true }
                    ] } }
                ]
            }"#,
        )
        .unwrap_err();
        match err {
            GenError::UnresolvedReference { name, owner } => {
                assert_eq!(name, "Missing");
                assert_eq!(owner, "Block");
            }
            other => panic!("expected UnresolvedReference, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_cycle_is_preserved() {
        // A block header references a validator set which references back;
        // both must resolve with the cycle kept as edges.
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "Header", "schema": { "type": "object", "fields": [
                        { "name": "validators", "schema": { "$ref": "ValidatorSet" }, "required": true }
                    ] } },
                    { "name": "ValidatorSet", "schema": { "type": "object", "fields": [
                        { "name": "last_header", "schema": { "$ref": "Header" } }
                    ] } }
                ]
            }"#,
        )
        .unwrap();
        let Shape::Object(header) = &model.get("Header").unwrap().shape else {
            panic!("expected object");
        };
        assert_eq!(
            header.fields[0].schema.shape,
            Shape::Reference("ValidatorSet".into())
        );
    }

    #[test]
    fn test_all_of_merge() {
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "Base", "schema": { "type": "object", "fields": [
                        { "name": "id", "schema": { "type": "string" }, "required": true }
                    ] } },
                    { "name": "Extended", "schema": { "allOf": [
                        { "$ref": "Base" },
                        { "type": "object", "fields": [
                            { "name": "height", "schema": { "type": "integer" }, "required": true }
                        ] }
                    ] } }
                ]
            }"#,
        )
        .unwrap();
        let Shape::Object(object) = &model.get("Extended").unwrap().shape else {
            panic!("expected object");
        };
        let names: Vec<_> = object.fields.iter().map(|f| f.wire_name.as_str()).collect();
        assert_eq!(names, vec!["id", "height"]);
    }

    #[test]
    fn test_all_of_conflict() {
        let err = resolve(
            r#"{
                "schemas": [
                    { "name": "Broken", "schema": { "allOf": [
                        { "type": "object", "fields": [
                            { "name": "id", "schema": { "type": "string" }, "required": true }
                        ] },
                        { "type": "object", "fields": [
                            { "name": "id", "schema": { "type": "integer" }, "required": true }
                        ] }
                    ] } }
                ]
            }"#,
        )
        .unwrap_err();
        match err {
            GenError::ConflictingComposition { type_name, detail } => {
                assert_eq!(type_name, "Broken");
                assert!(detail.contains("id"));
            }
            other => panic!("expected ConflictingComposition, got {other:?}"),
        }
    }

    #[test]
    fn test_all_of_cycle_rejected() {
        let err = resolve(
            r#"{
                "schemas": [
                    { "name": "Loop", "schema": { "allOf": [ { "$ref": "Loop" } ] } }
                ]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, GenError::ConflictingComposition { .. }));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_discriminant_auto_detected() {
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "Event", "schema": { "oneOf": [
                        { "type": "object", "fields": [
                            { "name": "kind", "schema": { "const": "ping" }, "required": true },
                            { "name": "x", "schema": { "type": "integer" }, "required": true }
                        ] },
                        { "type": "object", "fields": [
                            { "name": "kind", "schema": { "enum": ["pong"] }, "required": true },
                            { "name": "y", "schema": { "type": "string" }, "required": true }
                        ] }
                    ] } }
                ]
            }"#,
        )
        .unwrap();
        let Shape::Union(union) = &model.get("Event").unwrap().shape else {
            panic!("expected union");
        };
        let discriminant = union.discriminant.as_ref().unwrap();
        assert_eq!(discriminant.wire_field, "kind");
        let tags: Vec<_> = discriminant.variants.iter().map(|v| v.tag.as_str()).collect();
        assert_eq!(tags, vec!["ping", "pong"]);
        assert!(discriminant.variants.iter().all(|v| v.pinned));
    }

    #[test]
    fn test_discriminant_from_mapping_hint() {
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "Dog", "schema": { "type": "object", "fields": [
                        { "name": "bark", "schema": { "type": "boolean" }, "required": true }
                    ] } },
                    { "name": "Cat", "schema": { "type": "object", "fields": [
                        { "name": "lives", "schema": { "type": "integer" }, "required": true }
                    ] } },
                    { "name": "Pet", "schema": {
                        "oneOf": [ { "$ref": "Dog" }, { "$ref": "Cat" } ],
                        "discriminator": { "propertyName": "pet_type", "mapping": { "dog": "Dog", "cat": "Cat" } }
                    } }
                ]
            }"#,
        )
        .unwrap();
        let Shape::Union(union) = &model.get("Pet").unwrap().shape else {
            panic!("expected union");
        };
        let discriminant = union.discriminant.as_ref().unwrap();
        assert_eq!(discriminant.wire_field, "pet_type");
        assert!(discriminant.variants.iter().all(|v| !v.pinned));
        assert_eq!(discriminant.variants[0].tag, "dog");
        assert_eq!(discriminant.variants[1].tag, "cat");
    }

    #[test]
    fn test_union_without_common_tag_is_untagged() {
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "Value", "schema": { "oneOf": [
                        { "type": "string" },
                        { "type": "object", "fields": [
                            { "name": "raw", "schema": { "type": "bytes" }, "required": true }
                        ] }
                    ] } }
                ]
            }"#,
        )
        .unwrap();
        let Shape::Union(union) = &model.get("Value").unwrap().shape else {
            panic!("expected union");
        };
        assert!(union.discriminant.is_none());
    }

    #[test]
    fn test_duplicate_tags_fall_back_to_untagged() {
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "Odd", "schema": { "oneOf": [
                        { "type": "object", "fields": [
                            { "name": "kind", "schema": { "const": "same" }, "required": true }
                        ] },
                        { "type": "object", "fields": [
                            { "name": "kind", "schema": { "const": "same" }, "required": true }
                        ] }
                    ] } }
                ]
            }"#,
        )
        .unwrap();
        let Shape::Union(union) = &model.get("Odd").unwrap().shape else {
            panic!("expected union");
        };
        assert!(union.discriminant.is_none());
    }

    #[test]
    fn test_operation_types_synthesized_and_referenced() {
        let model = resolve(
            r#"{
                "schemas": [
                    { "name": "RpcError", "schema": { "type": "object", "fields": [
                        { "name": "message", "schema": { "type": "string" }, "required": true }
                    ] } }
                ],
                "operations": [
                    { "name": "gas_price",
                      "request": { "type": "object", "fields": [
                          { "name": "block_height", "schema": { "type": "integer" } }
                      ] },
                      "response": { "type": "object", "fields": [
                          { "name": "price", "schema": { "type": "string" }, "required": true }
                      ] },
                      "error": { "$ref": "RpcError" } }
                ]
            }"#,
        )
        .unwrap();
        let operation = model.registry().get("gas_price").unwrap();
        assert_eq!(operation.request, "GasPriceRequest");
        assert_eq!(operation.response, "GasPriceResponse");
        assert_eq!(operation.error, "RpcError");
        assert!(model.get("GasPriceRequest").is_some());
        assert!(model.get("GasPriceResponse").is_some());
    }

    #[test]
    fn test_synthesized_name_collision() {
        let err = resolve(
            r#"{
                "schemas": [
                    { "name": "StatusRequest", "schema": { "type": "object", "fields": [] } }
                ],
                "operations": [
                    { "name": "status",
                      "request": { "type": "object", "fields": [] },
                      "response": { "type": "unknown" },
                      "error": { "type": "unknown" } }
                ]
            }"#,
        )
        .unwrap_err();
        match err {
            GenError::DuplicateTypeName(name) => assert_eq!(name, "StatusRequest"),
            other => panic!("expected DuplicateTypeName, got {other:?}"),
        }
    }
}
