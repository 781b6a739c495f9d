//! Validator emission: runtime checks mirroring the emitted types.
//!
//! Every named schema gets a `validate{Name}` function over the wire-shaped
//! payload. A validator returns a first-class result, never throws: on
//! success the payload is rebuilt with idiomatic field names, so an accepted
//! value is directly assignable to the emitted type; on failure the issue
//! carries a JSON-pointer-like path plus expected and actual shape text.
//!
//! Discriminated unions read the tag first and run only the matching
//! variant; untagged unions probe members in declaration order and report
//! the last failure on exhaustion. The shared `check*` combinators live in a
//! static prelude block.

use super::model::{Primitive, SchemaModel, SchemaNode, Shape};
use super::naming::idiomatic_name;
use super::ts::{
    TsConstDef, TsExpr, TsFunction, TsImport, TsModule, TsParam, TsPrimitive, TsProp, TsStmt,
    TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{quote_if_needed, string_literal};

/// Runtime support emitted once per validators artifact.
const PRELUDE: &str = r#"export interface ValidationIssue {
  path: string;
  expected: string;
  actual: string;
}

export type ValidationResult<T> = { ok: true; value: T } | { ok: false; issue: ValidationIssue };

type Check<T> = (value: unknown, path: string) => ValidationResult<T>;

type FieldSpec = readonly [wire: string, idiomatic: string, required: boolean, check: Check<unknown>];

function failure(path: string, expected: string, actual: string): { ok: false; issue: ValidationIssue } {
  return { ok: false, issue: { path, expected, actual } };
}

function succeed<T>(value: T): { ok: true; value: T } {
  return { ok: true, value };
}

function describe(value: unknown): string {
  if (value === null) return "null";
  if (Array.isArray(value)) return "array";
  return typeof value;
}

function checkString(value: unknown, path: string): ValidationResult<string> {
  return typeof value === "string" ? succeed(value) : failure(path, "string", describe(value));
}

function checkInteger(value: unknown, path: string): ValidationResult<number> {
  return typeof value === "number" && Number.isInteger(value)
    ? succeed(value)
    : failure(path, "integer", describe(value));
}

function checkBoolean(value: unknown, path: string): ValidationResult<boolean> {
  return typeof value === "boolean" ? succeed(value) : failure(path, "boolean", describe(value));
}

function checkEnum(value: unknown, path: string, values: readonly string[]): ValidationResult<string> {
  if (typeof value === "string" && values.includes(value)) return succeed(value);
  return failure(path, "one of " + values.map((v) => JSON.stringify(v)).join(" | "), describe(value));
}

function checkArray<T>(value: unknown, path: string, item: Check<T>): ValidationResult<T[]> {
  if (!Array.isArray(value)) return failure(path, "array", describe(value));
  const items: T[] = [];
  for (let i = 0; i < value.length; i++) {
    const result = item(value[i], path + "/" + i);
    if (!result.ok) return result;
    items.push(result.value);
  }
  return succeed(items);
}

function checkFields(value: unknown, path: string, fields: readonly FieldSpec[]): ValidationResult<Record<string, unknown>> {
  if (typeof value !== "object" || value === null || Array.isArray(value)) {
    return failure(path, "object", describe(value));
  }
  const raw = value as Record<string, unknown>;
  const out: Record<string, unknown> = {};
  for (const [wire, idiomatic, required, check] of fields) {
    if (!(wire in raw)) {
      if (required) return failure(path + "/" + wire, "required field", "missing");
      continue;
    }
    const result = check(raw[wire], path + "/" + wire);
    if (!result.ok) return result;
    out[idiomatic] = result.value;
  }
  return succeed(out);
}

function checkTagged(value: unknown, path: string, tagField: string, variants: Readonly<Record<string, Check<unknown>>>): ValidationResult<unknown> {
  if (typeof value !== "object" || value === null || Array.isArray(value)) {
    return failure(path, "object", describe(value));
  }
  const tag = (value as Record<string, unknown>)[tagField];
  if (typeof tag !== "string") {
    return failure(path + "/" + tagField, "string tag", describe(tag));
  }
  const variant = variants[tag];
  if (variant === undefined) {
    const expected = "one of " + Object.keys(variants).map((k) => JSON.stringify(k)).join(" | ");
    return failure(path + "/" + tagField, expected, JSON.stringify(tag));
  }
  return variant(value, path);
}

function withTag<T>(result: ValidationResult<T>, field: string, tag: string): ValidationResult<T> {
  if (!result.ok) return result;
  return succeed({ ...(result.value as Record<string, unknown>), [field]: tag } as T);
}

function checkFirstMatch(value: unknown, path: string, members: readonly Check<unknown>[]): ValidationResult<unknown> {
  let last: ValidationResult<unknown> = failure(path, "non-empty union", describe(value));
  for (const member of members) {
    last = member(value, path);
    if (last.ok) return last;
  }
  return last;
}"#;

/// Emit the validators artifact for a model.
pub fn codegen_validators(model: &SchemaModel) -> TsModule {
    let mut module = TsModule::default();

    let type_names: Vec<String> = model.types().iter().map(|t| t.name.clone()).collect();
    if !type_names.is_empty() {
        module.imports.push(TsImport {
            items: type_names,
            from: "./types".into(),
        });
    }

    module.raw_blocks.push(PRELUDE.to_string());

    module.types.push(TsTypeDef {
        name: "ValidationMode".into(),
        kind: TypeDefKind::Interface {
            properties: ["requests", "responses", "errors"]
                .into_iter()
                .map(|direction| TsProp {
                    name: direction.into(),
                    ty: TsType::Primitive(TsPrimitive::Boolean),
                    optional: false,
                })
                .collect(),
        },
    });

    module.consts.push(TsConstDef {
        name: "validators".into(),
        value: TsExpr::Object(
            model
                .types()
                .iter()
                .map(|named| {
                    (
                        quote_if_needed(&named.name),
                        TsExpr::Ident(format!("validate{}", named.name)),
                    )
                })
                .collect(),
        ),
        as_const: true,
    });

    module.consts.push(TsConstDef {
        name: "operationValidators".into(),
        value: TsExpr::Object(
            model
                .registry()
                .operations()
                .iter()
                .map(|operation| {
                    (
                        quote_if_needed(&operation.name),
                        TsExpr::Object(vec![
                            (
                                "request".into(),
                                TsExpr::Ident(format!("validate{}", operation.request)),
                            ),
                            (
                                "response".into(),
                                TsExpr::Ident(format!("validate{}", operation.response)),
                            ),
                            (
                                "error".into(),
                                TsExpr::Ident(format!("validate{}", operation.error)),
                            ),
                        ]),
                    )
                })
                .collect(),
        ),
        as_const: true,
    });

    for named in model.types() {
        module.functions.push(validator_fn(&named.name, &named.node));
    }

    module.functions.push(checker_factory());

    module
}

/// One exported validator per named schema.
fn validator_fn(name: &str, node: &SchemaNode) -> TsFunction {
    let expr = check_expr(node, "value", "path", 0, 0);
    TsFunction {
        name: format!("validate{name}"),
        type_params: vec![],
        params: vec![
            TsParam {
                name: "value".into(),
                ty: TsType::Primitive(TsPrimitive::Unknown),
                default_value: None,
            },
            TsParam {
                name: "path".into(),
                ty: TsType::Primitive(TsPrimitive::String),
                default_value: Some("\"$\"".into()),
            },
        ],
        return_type: Some(TsType::Ref(format!("ValidationResult<{name}>"))),
        body: vec![
            TsStmt::VarDecl {
                name: "result".into(),
                init: TsExpr::Raw(expr),
            },
            TsStmt::Raw(format!(
                "return result.ok ? {{ ok: true, value: result.value as {name} }} : result;"
            )),
        ],
    }
}

/// The direction-parameterized checking surface. Disabled directions pass
/// payloads through untouched; the choice is a runtime capability, not a
/// generation-time switch.
fn checker_factory() -> TsFunction {
    TsFunction {
        name: "createChecker".into(),
        type_params: vec![],
        params: vec![TsParam {
            name: "mode".into(),
            ty: TsType::Ref("ValidationMode".into()),
            default_value: None,
        }],
        return_type: None,
        body: vec![TsStmt::Raw(
            r#"return {
  request(operation: keyof typeof operationValidators, value: unknown): ValidationResult<unknown> {
    return mode.requests ? operationValidators[operation].request(value) : succeed(value);
  },
  response(operation: keyof typeof operationValidators, value: unknown): ValidationResult<unknown> {
    return mode.responses ? operationValidators[operation].response(value) : succeed(value);
  },
  error(operation: keyof typeof operationValidators, value: unknown): ValidationResult<unknown> {
    return mode.errors ? operationValidators[operation].error(value) : succeed(value);
  },
};"#
            .into(),
        )],
    }
}

/// Build the check expression for a node, shape for shape.
///
/// `depth` numbers the lambda parameters (`v0`, `p0`, ...) so nested checks
/// never shadow each other; `indent` is the relative indent of multiline
/// spec tables within the expression.
fn check_expr(node: &SchemaNode, value: &str, path: &str, depth: usize, indent: usize) -> String {
    let base = shape_check_expr(&node.shape, value, path, depth, indent);
    if node.nullable {
        format!("{value} === null ? succeed(null) : {base}")
    } else {
        base
    }
}

/// Check expression for a bare shape.
fn shape_check_expr(shape: &Shape, value: &str, path: &str, depth: usize, indent: usize) -> String {
    match shape {
        Shape::Primitive(Primitive::String | Primitive::Bytes) => {
            format!("checkString({value}, {path})")
        }
        Shape::Primitive(Primitive::Integer) => format!("checkInteger({value}, {path})"),
        Shape::Primitive(Primitive::Boolean) => format!("checkBoolean({value}, {path})"),
        Shape::Primitive(Primitive::Unknown) => format!("succeed({value})"),
        Shape::Reference(name) => format!("validate{name}({value}, {path})"),
        Shape::Enum(values) => {
            let literals = values
                .iter()
                .map(|v| string_literal(v))
                .collect::<Vec<_>>()
                .join(", ");
            format!("checkEnum({value}, {path}, [{literals}])")
        }
        Shape::Array(inner) => {
            let item = format!("v{depth}");
            let item_path = format!("p{depth}");
            let inner_expr = check_expr(inner, &item, &item_path, depth + 1, indent);
            format!("checkArray({value}, {path}, ({item}, {item_path}) => {inner_expr})")
        }
        Shape::Object(object) => {
            let pad = "  ".repeat(indent + 1);
            let close_pad = "  ".repeat(indent);
            let mut out = format!("checkFields({value}, {path}, [\n");
            for field in &object.fields {
                let item = format!("v{depth}");
                let item_path = format!("p{depth}");
                let field_check = check_expr(&field.schema, &item, &item_path, depth + 1, indent + 1);
                out.push_str(&format!(
                    "{pad}[{}, {}, {}, ({item}, {item_path}) => {field_check}],\n",
                    string_literal(&field.wire_name),
                    string_literal(&idiomatic_name(&field.wire_name)),
                    field.required,
                ));
            }
            out.push_str(&format!("{close_pad}])"));
            out
        }
        Shape::Union(union) => match &union.discriminant {
            Some(discriminant) => {
                let pad = "  ".repeat(indent + 1);
                let close_pad = "  ".repeat(indent);
                let mut out = format!(
                    "checkTagged({value}, {path}, {}, {{\n",
                    string_literal(&discriminant.wire_field)
                );
                for variant in &discriminant.variants {
                    let item = format!("v{depth}");
                    let item_path = format!("p{depth}");
                    let member_check = check_expr(
                        &union.members[variant.member],
                        &item,
                        &item_path,
                        depth + 1,
                        indent + 1,
                    );
                    // A mapping-asserted tag is not among the member's own
                    // fields; re-attach it so the normalized value matches
                    // the emitted intersection type.
                    let body = if variant.pinned {
                        member_check
                    } else {
                        format!(
                            "withTag({member_check}, {}, {})",
                            string_literal(&idiomatic_name(&discriminant.wire_field)),
                            string_literal(&variant.tag)
                        )
                    };
                    out.push_str(&format!(
                        "{pad}{}: ({item}, {item_path}) => {body},\n",
                        quote_if_needed(&variant.tag)
                    ));
                }
                out.push_str(&format!("{close_pad}}})"));
                out
            }
            None => {
                let pad = "  ".repeat(indent + 1);
                let close_pad = "  ".repeat(indent);
                let mut out = format!("checkFirstMatch({value}, {path}, [\n");
                for member in &union.members {
                    let item = format!("v{depth}");
                    let item_path = format!("p{depth}");
                    let member_check =
                        check_expr(member, &item, &item_path, depth + 1, indent + 1);
                    out.push_str(&format!("{pad}({item}, {item_path}) => {member_check},\n"));
                }
                out.push_str(&format!("{close_pad}])"));
                out
            }
        },
    }
}
