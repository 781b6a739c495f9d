//! TypeScript AST for artifact emission.
//!
//! A deliberately small surface: the artifacts are type declarations, const
//! data tables, and plain functions, so the AST covers exactly those. Code
//! shapes that do not fit (loop bodies, ternary chains) are carried as raw
//! statements, and the `Emit` trait in `emit.rs` renders everything to
//! source text.

/// TypeScript type representation.
#[derive(Debug, Clone)]
pub enum TsType {
    /// Primitive types: string, number, boolean, null, unknown.
    Primitive(TsPrimitive),
    /// Array type: `T[]`.
    Array(Box<TsType>),
    /// Union type: `A | B | C`. An empty union renders as `never`.
    Union(Vec<TsType>),
    /// Intersection type: `A & B`.
    Intersection(Vec<TsType>),
    /// Object type: `{ foo: string; bar?: number }`.
    Object(Vec<TsProp>),
    /// String literal type: `"foo"`.
    Literal(String),
    /// Named type reference.
    Ref(String),
}

/// TypeScript primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `unknown`
    Unknown,
}

/// Object property definition.
#[derive(Debug, Clone)]
pub struct TsProp {
    /// Property name, unquoted; quoting is applied at emission.
    pub name: String,
    /// Property type.
    pub ty: TsType,
    /// Whether the property may be absent.
    pub optional: bool,
}

/// TypeScript expression. Only the shapes the data-table emitters build;
/// anything else travels as `Raw`.
#[derive(Debug, Clone)]
pub enum TsExpr {
    /// Identifier: `validateBlock`.
    Ident(String),
    /// String literal: `"block_hash"`.
    Str(String),
    /// Object literal with pre-quoted keys: `{ a: 1 }`.
    Object(Vec<(String, TsExpr)>),
    /// Raw expression text.
    Raw(String),
}

/// Statement in a function body.
#[derive(Debug, Clone)]
pub enum TsStmt {
    /// `const name = init;`
    VarDecl {
        /// Variable name.
        name: String,
        /// Initializer expression.
        init: TsExpr,
    },
    /// Raw statement lines, indented as a block at emission.
    Raw(String),
}

/// Function parameter.
#[derive(Debug, Clone)]
pub struct TsParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TsType,
    /// Default value expression, if any.
    pub default_value: Option<String>,
}

/// Function definition. All generated functions are exported declarations.
#[derive(Debug, Clone)]
pub struct TsFunction {
    /// Function name.
    pub name: String,
    /// Type parameters, rendered verbatim: `K extends OperationName`.
    pub type_params: Vec<String>,
    /// Parameters.
    pub params: Vec<TsParam>,
    /// Return type, if annotated.
    pub return_type: Option<TsType>,
    /// Body statements.
    pub body: Vec<TsStmt>,
}

/// Type definition kind.
#[derive(Debug, Clone)]
pub enum TypeDefKind {
    /// `export interface Foo { ... }`
    Interface {
        /// Interface properties.
        properties: Vec<TsProp>,
    },
    /// `export type Foo = ...;`
    TypeAlias {
        /// Aliased type.
        ty: TsType,
    },
    /// `export const Foo = { ... } as const;` plus the derived value type.
    ConstEnum {
        /// Literal string values.
        values: Vec<String>,
    },
}

/// Named type definition.
#[derive(Debug, Clone)]
pub struct TsTypeDef {
    /// Type name.
    pub name: String,
    /// Definition kind.
    pub kind: TypeDefKind,
}

/// Exported const definition.
#[derive(Debug, Clone)]
pub struct TsConstDef {
    /// Const name.
    pub name: String,
    /// Value expression. Top-level object literals render multiline.
    pub value: TsExpr,
    /// Whether to append `as const`.
    pub as_const: bool,
}

/// Import statement. Items are plain names; only type-only imports are
/// generated (artifacts cross-reference each other's types, never values).
#[derive(Debug, Clone)]
pub struct TsImport {
    /// Imported names.
    pub items: Vec<String>,
    /// Module path.
    pub from: String,
}

/// Complete artifact module. Emission order: imports, raw blocks, type
/// definitions, const tables, functions.
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// Type-only imports.
    pub imports: Vec<TsImport>,
    /// Raw support blocks (the validator prelude).
    pub raw_blocks: Vec<String>,
    /// Type definitions.
    pub types: Vec<TsTypeDef>,
    /// Const data tables.
    pub consts: Vec<TsConstDef>,
    /// Functions.
    pub functions: Vec<TsFunction>,
}
