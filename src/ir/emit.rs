//! TypeScript code emission via the Emit trait.
//!
//! Each AST node renders itself to a string; emission is purely mechanical
//! and deterministic, so identical models always produce byte-identical
//! artifacts.

use super::ts::{
    TsConstDef, TsExpr, TsFunction, TsImport, TsModule, TsParam, TsPrimitive, TsProp, TsStmt,
    TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{quote_if_needed, string_literal};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Null => "null".to_string(),
            TsPrimitive::Unknown => "unknown".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                // Wrap union and intersection members in parentheses
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => {
                if types.is_empty() {
                    "never".to_string()
                } else {
                    types.iter().map(Emit::emit).collect::<Vec<_>>().join(" | ")
                }
            }
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TsType::Literal(value) => string_literal(value),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{}{}: {}", key, opt, self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                let mut output = format!("export interface {} {{\n", self.name);
                for prop in properties {
                    let key = quote_if_needed(&prop.name);
                    let opt = if prop.optional { "?" } else { "" };
                    output.push_str(&format!("  {}{}: {};\n", key, opt, prop.ty.emit()));
                }
                output.push_str("}\n");
                output
            }
            TypeDefKind::TypeAlias { ty } => {
                format!("export type {} = {};\n", self.name, ty.emit())
            }
            TypeDefKind::ConstEnum { values } => {
                let mut output = format!("export const {} = {{\n", self.name);
                for value in values {
                    output.push_str(&format!(
                        "  {}: {},\n",
                        quote_if_needed(value),
                        string_literal(value)
                    ));
                }
                output.push_str("} as const;\n\n");
                output.push_str(&format!(
                    "export type {} = (typeof {})[keyof typeof {}];\n",
                    self.name, self.name, self.name
                ));
                output
            }
        }
    }
}

// =============================================================================
// Expressions and Statements
// =============================================================================

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Str(value) => string_literal(value),
            TsExpr::Object(entries) => {
                if entries.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = entries
                        .iter()
                        .map(|(key, value)| format!("{}: {}", key, value.emit()))
                        .collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    /// Emit with the given indentation level (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::VarDecl { name, init } => {
                // Multiline initializers carry their own relative indent;
                // every continuation line gets the base prefix prepended.
                let rendered = init.emit();
                let mut lines = rendered.lines();
                let first = lines.next().unwrap_or_default();
                let mut output = format!("{prefix}const {name} = {first}");
                for line in lines {
                    output.push('\n');
                    output.push_str(&prefix);
                    output.push_str(line);
                }
                output.push_str(";\n");
                output
            }
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{prefix}{line}\n")
                    }
                })
                .collect(),
        }
    }
}

// =============================================================================
// Consts, Functions, Imports
// =============================================================================

impl Emit for TsConstDef {
    fn emit(&self) -> String {
        let value = match &self.value {
            // Top-level tables render one entry per line
            TsExpr::Object(entries) if !entries.is_empty() => {
                let mut output = String::from("{\n");
                for (key, value) in entries {
                    output.push_str(&format!("  {}: {},\n", key, value.emit()));
                }
                output.push('}');
                output
            }
            other => other.emit(),
        };
        let suffix = if self.as_const { " as const" } else { "" };
        format!("export const {} = {}{};\n", self.name, value, suffix)
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        match &self.default_value {
            Some(default) => format!("{}: {} = {}", self.name, self.ty.emit(), default),
            None => format!("{}: {}", self.name, self.ty.emit()),
        }
    }
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let type_params = if self.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_params.join(", "))
        };
        let params = self
            .params
            .iter()
            .map(Emit::emit)
            .collect::<Vec<_>>()
            .join(", ");
        let return_type = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();

        let mut output = format!(
            "export function {}{}({}){}",
            self.name, type_params, params, return_type
        );
        if self.body.is_empty() {
            output.push_str(" {}\n");
        } else {
            output.push_str(" {\n");
            for stmt in &self.body {
                output.push_str(&stmt.emit_indented(1));
            }
            output.push_str("}\n");
        }
        output
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        format!(
            "import type {{ {} }} from \"{}\";\n",
            self.items.join(", "),
            self.from
        )
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        for block in &self.raw_blocks {
            output.push_str(block);
            output.push_str("\n\n");
        }

        for type_def in &self.types {
            output.push_str(&type_def.emit());
            output.push('\n');
        }

        for const_def in &self.consts {
            output.push_str(&const_def.emit());
            output.push('\n');
        }

        for function in &self.functions {
            output.push_str(&function.emit());
            output.push('\n');
        }

        output
    }
}

// =============================================================================
// Tests
// =============================================================================
