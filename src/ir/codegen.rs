//! Code generation from the schema model to TypeScript AST.
//!
//! Four of the five artifacts are built here: type declarations, the method
//! registry, the naming map, and the discriminated-union helpers. Validators
//! live in `validator.rs`. Every function is a pure map from the immutable
//! model to AST; nothing here mutates shared state.

use super::emit::Emit;
use super::model::{
    NamedSchema, ObjectShape, Primitive, SchemaModel, SchemaNode, Shape, UnionShape,
};
use super::naming::{NamingTable, idiomatic_name};
use super::ts::{
    TsConstDef, TsExpr, TsFunction, TsImport, TsModule, TsParam, TsPrimitive, TsProp, TsStmt,
    TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{quote_if_needed, string_literal};

/// Convert a resolved node to its TypeScript type.
pub fn ts_type(node: &SchemaNode) -> TsType {
    let base = match &node.shape {
        Shape::Primitive(p) => TsType::Primitive(match p {
            // Byte sequences travel encoded as strings
            Primitive::String | Primitive::Bytes => TsPrimitive::String,
            Primitive::Integer => TsPrimitive::Number,
            Primitive::Boolean => TsPrimitive::Boolean,
            Primitive::Unknown => TsPrimitive::Unknown,
        }),
        Shape::Object(object) => TsType::Object(object_props(object)),
        Shape::Array(inner) => TsType::Array(Box::new(ts_type(inner))),
        Shape::Enum(values) => TsType::Union(
            values
                .iter()
                .map(|value| TsType::Literal(value.clone()))
                .collect(),
        ),
        Shape::Reference(name) => TsType::Ref(name.clone()),
        Shape::Union(union) => union_ts_type(union),
    };
    if node.nullable {
        TsType::Union(vec![base, TsType::Primitive(TsPrimitive::Null)])
    } else {
        base
    }
}

/// Object fields as TypeScript properties, renamed to idiomatic identifiers.
fn object_props(object: &ObjectShape) -> Vec<TsProp> {
    object
        .fields
        .iter()
        .map(|field| TsProp {
            name: idiomatic_name(&field.wire_name),
            ty: ts_type(&field.schema),
            optional: !field.required,
        })
        .collect()
}

/// A union as a TypeScript type. Discriminated unions alternate their
/// members directly when each member pins its own tag; a mapping-asserted
/// tag is intersected onto the member instead.
fn union_ts_type(union: &UnionShape) -> TsType {
    match &union.discriminant {
        Some(discriminant) => TsType::Union(
            discriminant
                .variants
                .iter()
                .map(|variant| {
                    let member_ty = ts_type(&union.members[variant.member]);
                    if variant.pinned {
                        member_ty
                    } else {
                        TsType::Intersection(vec![
                            TsType::Object(vec![TsProp {
                                name: idiomatic_name(&discriminant.wire_field),
                                ty: TsType::Literal(variant.tag.clone()),
                                optional: false,
                            }]),
                            member_ty,
                        ])
                    }
                })
                .collect(),
        ),
        None => TsType::Union(union.members.iter().map(ts_type).collect()),
    }
}

// =============================================================================
// Type declarations
// =============================================================================

/// Emit one type declaration per named schema, in model order.
pub fn codegen_types(model: &SchemaModel) -> TsModule {
    let mut module = TsModule::default();
    for named in model.types() {
        module.types.push(type_def(named));
    }
    module
}

/// Pick the declaration kind for a named schema.
fn type_def(named: &NamedSchema) -> TsTypeDef {
    let kind = match &named.node.shape {
        Shape::Object(object) if !named.node.nullable => TypeDefKind::Interface {
            properties: object_props(object),
        },
        Shape::Enum(values) if !named.node.nullable => TypeDefKind::ConstEnum {
            values: values.clone(),
        },
        _ => TypeDefKind::TypeAlias {
            ty: ts_type(&named.node),
        },
    };
    TsTypeDef {
        name: named.name.clone(),
        kind,
    }
}

// =============================================================================
// Method registry
// =============================================================================

/// Emit the method registry: a const table binding each operation name to
/// its three type names, the `OperationName` key union, the `OperationTypes`
/// static binding, and `selectMethods` for building a restricted subset
/// whose excluded operations are structurally absent.
pub fn codegen_registry(model: &SchemaModel) -> TsModule {
    let mut module = TsModule::default();
    let registry = model.registry();

    let mut imported: Vec<String> = Vec::new();
    for operation in registry.operations() {
        for name in [&operation.request, &operation.response, &operation.error] {
            if !imported.contains(name) {
                imported.push(name.clone());
            }
        }
    }
    if !imported.is_empty() {
        module.imports.push(TsImport {
            items: imported,
            from: "./types".into(),
        });
    }

    module.types.push(TsTypeDef {
        name: "OperationName".into(),
        kind: TypeDefKind::TypeAlias {
            ty: TsType::Ref("keyof typeof methods".into()),
        },
    });
    module.types.push(TsTypeDef {
        name: "OperationTypes".into(),
        kind: TypeDefKind::Interface {
            properties: registry
                .operations()
                .iter()
                .map(|operation| TsProp {
                    name: operation.name.clone(),
                    ty: TsType::Object(vec![
                        TsProp {
                            name: "request".into(),
                            ty: TsType::Ref(operation.request.clone()),
                            optional: false,
                        },
                        TsProp {
                            name: "response".into(),
                            ty: TsType::Ref(operation.response.clone()),
                            optional: false,
                        },
                        TsProp {
                            name: "error".into(),
                            ty: TsType::Ref(operation.error.clone()),
                            optional: false,
                        },
                    ]),
                    optional: false,
                })
                .collect(),
        },
    });

    module.consts.push(TsConstDef {
        name: "methods".into(),
        value: TsExpr::Object(
            registry
                .operations()
                .iter()
                .map(|operation| {
                    (
                        quote_if_needed(&operation.name),
                        TsExpr::Object(vec![
                            ("request".into(), TsExpr::Str(operation.request.clone())),
                            ("response".into(), TsExpr::Str(operation.response.clone())),
                            ("error".into(), TsExpr::Str(operation.error.clone())),
                        ]),
                    )
                })
                .collect(),
        ),
        as_const: true,
    });

    module.functions.push(TsFunction {
        name: "selectMethods".into(),
        type_params: vec!["K extends OperationName".into()],
        params: vec![TsParam {
            name: "names".into(),
            ty: TsType::Ref("readonly K[]".into()),
            default_value: None,
        }],
        return_type: Some(TsType::Ref("Pick<typeof methods, K>".into())),
        body: vec![
            TsStmt::Raw("const subset = {} as Pick<typeof methods, K>;".into()),
            TsStmt::Raw("for (const name of names) {\n  subset[name] = methods[name];\n}".into()),
            TsStmt::Raw("return subset;".into()),
        ],
    });

    module
}

// =============================================================================
// Naming map
// =============================================================================

/// Emit the naming map: per-object bijections between wire and idiomatic
/// field names, plus the two lookup helpers the transport uses at runtime.
pub fn codegen_naming(table: &NamingTable) -> TsModule {
    let mut module = TsModule::default();

    module.types.push(TsTypeDef {
        name: "ObjectPath".into(),
        kind: TypeDefKind::TypeAlias {
            ty: TsType::Ref("keyof typeof nameMaps".into()),
        },
    });

    module.consts.push(TsConstDef {
        name: "nameMaps".into(),
        value: TsExpr::Object(
            table
                .maps
                .iter()
                .map(|map| {
                    let to_wire = TsExpr::Object(
                        map.pairs
                            .iter()
                            .map(|(wire, idiomatic)| {
                                (quote_if_needed(idiomatic), TsExpr::Str(wire.clone()))
                            })
                            .collect(),
                    );
                    let from_wire = TsExpr::Object(
                        map.pairs
                            .iter()
                            .map(|(wire, idiomatic)| {
                                (quote_if_needed(wire), TsExpr::Str(idiomatic.clone()))
                            })
                            .collect(),
                    );
                    (
                        string_literal(&map.object),
                        TsExpr::Object(vec![
                            ("toWire".into(), to_wire),
                            ("fromWire".into(), from_wire),
                        ]),
                    )
                })
                .collect(),
        ),
        as_const: true,
    });

    module.functions.push(name_lookup_fn("wireName", "toWire"));
    module.functions.push(name_lookup_fn("idiomaticName", "fromWire"));

    module
}

/// One direction of the naming lookup.
fn name_lookup_fn(fn_name: &str, table_prop: &str) -> TsFunction {
    TsFunction {
        name: fn_name.into(),
        type_params: vec![],
        params: vec![
            TsParam {
                name: "object".into(),
                ty: TsType::Ref("ObjectPath".into()),
                default_value: None,
            },
            TsParam {
                name: "field".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                default_value: None,
            },
        ],
        return_type: Some(TsType::Ref("string | undefined".into())),
        body: vec![TsStmt::Raw(format!(
            "return (nameMaps[object].{table_prop} as Record<string, string | undefined>)[field];"
        ))],
    }
}

// =============================================================================
// Discriminator helpers
// =============================================================================

/// Emit one narrowing helper per discriminated union. Untagged unions get
/// none, intentionally.
pub fn codegen_unions(model: &SchemaModel) -> TsModule {
    let mut module = TsModule::default();
    let mut imported: Vec<String> = Vec::new();

    for named in model.types() {
        let Shape::Union(union) = &named.node.shape else {
            continue;
        };
        let Some(discriminant) = &union.discriminant else {
            continue;
        };

        if !imported.contains(&named.name) {
            imported.push(named.name.clone());
        }
        for variant in &discriminant.variants {
            if let Shape::Reference(target) = &union.members[variant.member].shape
                && !imported.contains(target)
            {
                imported.push(target.clone());
            }
        }

        let tag_prop = idiomatic_name(&discriminant.wire_field);
        let mut return_props = Vec::new();
        let mut lines = vec!["return {".to_string()];
        for variant in &discriminant.variants {
            let member_ty = ts_type(&union.members[variant.member]);
            let member_ty_str = member_ty.emit();
            return_props.push(TsProp {
                name: variant.tag.clone(),
                ty: member_ty,
                optional: true,
            });
            lines.push(format!(
                "  {}: value.{} === {} ? (value as {}) : undefined,",
                quote_if_needed(&variant.tag),
                tag_prop,
                string_literal(&variant.tag),
                member_ty_str
            ));
        }
        lines.push("};".to_string());

        module.functions.push(TsFunction {
            name: format!("split{}", named.name),
            type_params: vec![],
            params: vec![TsParam {
                name: "value".into(),
                ty: TsType::Ref(named.name.clone()),
                default_value: None,
            }],
            return_type: Some(TsType::Object(return_props)),
            body: vec![TsStmt::Raw(lines.join("\n"))],
        });
    }

    if !imported.is_empty() {
        module.imports.push(TsImport {
            items: imported,
            from: "./types".into(),
        });
    }

    module
}
