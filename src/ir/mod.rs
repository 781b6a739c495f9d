//! Intermediate representation and emitters.
//!
//! The generator is a four-stage pipeline over this module:
//! 1. Resolution: raw document -> `SchemaModel` (references, composition,
//!    discriminants all settled in `resolve`)
//! 2. Naming: per-object wire/idiomatic bijections in `naming`
//! 3. Codegen: model -> TypeScript AST, one pure function per artifact
//!    (`codegen`, `validator`)
//! 4. Emission: AST -> source text via the `Emit` trait in `emit`
//!
//! ## Module Structure
//!
//! - `model`: resolved schema model (the sole input to every emitter)
//! - `resolve`: type model builder
//! - `naming`: naming normalizer
//! - `ts`: TypeScript AST IR
//! - `codegen`: type, registry, naming-map, and union-helper emitters
//! - `validator`: validator emitter
//! - `emit`: AST to source strings
//! - `utils`: identifier helpers shared across emitters

pub mod codegen;
pub mod emit;
pub mod model;
pub mod naming;
pub mod resolve;
pub mod ts;
pub mod utils;
pub mod validator;
