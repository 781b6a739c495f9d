//! wiregen: schema-to-artifact generator for typed RPC clients.
//!
//! Reads a machine-readable schema document describing a remote procedure
//! interface (a named-schema table plus an operation list) and emits five
//! mutually consistent TypeScript artifacts:
//! - type declarations, one per named schema
//! - runtime validators mirroring the types shape for shape
//! - a method registry binding each operation to its request/response/error
//!   types, with a restricted-subset builder
//! - a bidirectional map between wire field names and idiomatic identifiers
//! - narrowing helpers for discriminated unions
//!
//! The generator is a single-pass, pure transformation: one immutable
//! `SchemaModel` feeds every emitter, failures abort the run with no partial
//! output, and regenerating from an unchanged document is byte-identical.
//! Network transport, caching, and file I/O belong to the consumers of the
//! generated artifacts, not to this crate.

#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

pub mod document;
pub mod error;
mod generate;
mod ir;

pub use document::Document;
pub use error::GenError;
pub use generate::{Artifacts, generate};
pub use ir::model::{MethodRegistry, Operation, SchemaModel};
pub use ir::naming::{NamingTable, build_naming};
pub use ir::resolve::resolve_document;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TEST_DOCUMENT: &str = r##"{
  "schemas": [
    { "name": "CryptoHash", "schema": { "type": "bytes" } },
    { "name": "BlockHeader", "schema": { "type": "object", "fields": [
        { "name": "hash", "schema": { "$ref": "CryptoHash" }, "required": true },
        { "name": "height", "schema": { "type": "integer" }, "required": true },
        { "name": "prev_hash", "schema": { "$ref": "CryptoHash" }, "required": true },
        { "name": "validator_proposals", "schema": { "type": "array", "items": { "$ref": "ValidatorStake" } }, "required": true },
        { "name": "chunk_mask", "schema": { "type": "array", "items": { "type": "boolean" }, "nullable": true } }
    ] } },
    { "name": "ValidatorStake", "schema": { "type": "object", "fields": [
        { "name": "account_id", "schema": { "type": "string" }, "required": true },
        { "name": "stake", "schema": { "type": "string" }, "required": true },
        { "name": "last_header", "schema": { "$ref": "BlockHeader" } }
    ] } },
    { "name": "SyncStatus", "schema": { "enum": ["syncing", "synced"] } },
    { "name": "StatusResponse", "schema": { "type": "object", "fields": [
        { "name": "chain_id", "schema": { "type": "string" }, "required": true },
        { "name": "sync_status", "schema": { "$ref": "SyncStatus" }, "required": true }
    ] } },
    { "name": "BlockRequest", "schema": { "type": "object", "fields": [
        { "name": "block_id", "schema": { "oneOf": [ { "type": "integer" }, { "$ref": "CryptoHash" } ] }, "required": true }
    ] } },
    { "name": "BlockResponse", "schema": { "type": "object", "fields": [
        { "name": "header", "schema": { "$ref": "BlockHeader" }, "required": true }
    ] } },
    { "name": "RpcError", "schema": { "oneOf": [
        { "type": "object", "fields": [
            { "name": "name", "schema": { "const": "HANDLER_ERROR" }, "required": true },
            { "name": "cause", "schema": { "type": "string" }, "required": true }
        ] },
        { "type": "object", "fields": [
            { "name": "name", "schema": { "const": "REQUEST_VALIDATION_ERROR" }, "required": true },
            { "name": "info", "schema": { "type": "unknown" } }
        ] }
    ] } }
  ],
  "operations": [
    { "name": "status",
      "request": { "type": "object", "fields": [] },
      "response": { "$ref": "StatusResponse" },
      "error": { "$ref": "RpcError" } },
    { "name": "block",
      "request": { "$ref": "BlockRequest" },
      "response": { "$ref": "BlockResponse" },
      "error": { "$ref": "RpcError" } },
    { "name": "gas_price",
      "request": { "type": "object", "fields": [
          { "name": "block_height", "schema": { "type": "integer", "nullable": true }, "required": true }
      ] },
      "response": { "type": "object", "fields": [
          { "name": "gas_price", "schema": { "type": "string" }, "required": true }
      ] },
      "error": { "$ref": "RpcError" } }
  ]
}"##;

    /// Generate and check structural sanity of every artifact: balanced
    /// delimiters catch malformed emission early without a TypeScript
    /// toolchain in the loop.
    fn generate_and_verify(document: &str) -> Artifacts {
        let result = generate(document);
        assert!(result.is_ok(), "Generation failed: {:?}", result.err());
        let artifacts = result.unwrap();
        for (name, text) in artifacts.files() {
            assert_balanced(name, text);
        }
        artifacts
    }

    fn assert_balanced(name: &str, text: &str) {
        let mut in_string = false;
        let mut escaped = false;
        let mut depths = [0i64; 3];
        for c in text.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if in_string => escaped = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depths[0] += 1,
                '}' if !in_string => depths[0] -= 1,
                '[' if !in_string => depths[1] += 1,
                ']' if !in_string => depths[1] -= 1,
                '(' if !in_string => depths[2] += 1,
                ')' if !in_string => depths[2] -= 1,
                _ => {}
            }
            assert!(
                depths.iter().all(|&d| d >= 0),
                "unbalanced delimiters in {name}"
            );
        }
        assert_eq!(depths, [0, 0, 0], "unbalanced delimiters in {name}");
        assert!(!in_string, "unterminated string literal in {name}");
    }

    #[test]
    fn test_generate_full_document() {
        let artifacts = generate_and_verify(TEST_DOCUMENT);

        // Types: one declaration per named schema, idiomatic field names,
        // optional and nullable kept distinct.
        assert!(artifacts.types.contains("export type CryptoHash = string;"));
        assert!(artifacts.types.contains("export interface BlockHeader {"));
        assert!(artifacts.types.contains("  prevHash: string;"));
        assert!(
            artifacts
                .types
                .contains("  validatorProposals: ValidatorStake[];")
        );
        assert!(artifacts.types.contains("  chunkMask?: boolean[] | null;"));
        assert!(artifacts.types.contains("  blockId: number | CryptoHash;"));
        assert!(artifacts.types.contains("export const SyncStatus = {"));
        assert!(
            artifacts
                .types
                .contains("export type SyncStatus = (typeof SyncStatus)[keyof typeof SyncStatus];")
        );

        // Synthesized operation types exist for inline schemas.
        assert!(artifacts.types.contains("export interface StatusRequest {"));
        assert!(artifacts.types.contains("export interface GasPriceRequest {"));
        assert!(artifacts.types.contains("export interface GasPriceResponse {"));

        // Validators mirror every named schema.
        assert!(
            artifacts
                .validators
                .contains("export function validateBlockHeader(value: unknown, path: string = \"$\"): ValidationResult<BlockHeader> {")
        );
        assert!(artifacts.validators.contains("export function validateRpcError"));
        assert!(
            artifacts
                .validators
                .contains("export function createChecker(mode: ValidationMode) {")
        );

        // Registry binds all three operations to their type names.
        assert!(artifacts.registry.contains(
            "  status: { request: \"StatusRequest\", response: \"StatusResponse\", error: \"RpcError\" },"
        ));
        assert!(artifacts.registry.contains(
            "  block: { request: \"BlockRequest\", response: \"BlockResponse\", error: \"RpcError\" },"
        ));
        assert!(artifacts.registry.contains(
            "  gas_price: { request: \"GasPriceRequest\", response: \"GasPriceResponse\", error: \"RpcError\" },"
        ));

        // Naming map covers the named objects.
        assert!(artifacts.naming.contains("\"BlockHeader\""));
        assert!(artifacts.naming.contains("prevHash: \"prev_hash\""));
        assert!(artifacts.naming.contains("prev_hash: \"prevHash\""));

        // The discriminated error union gets a narrowing helper.
        assert!(
            artifacts
                .unions
                .contains("export function splitRpcError(value: RpcError):")
        );
        assert!(
            artifacts
                .unions
                .contains("HANDLER_ERROR: value.name === \"HANDLER_ERROR\" ?")
        );
    }

    #[test]
    fn test_regeneration_is_byte_identical() {
        let first = generate_and_verify(TEST_DOCUMENT);
        let second = generate_and_verify(TEST_DOCUMENT);
        assert_eq!(first.types, second.types);
        assert_eq!(first.validators, second.validators);
        assert_eq!(first.registry, second.registry);
        assert_eq!(first.naming, second.naming);
        assert_eq!(first.unions, second.unions);
    }

    #[test]
    fn test_cycle_emitted_as_named_references() {
        let artifacts = generate_and_verify(TEST_DOCUMENT);
        // BlockHeader -> ValidatorStake -> BlockHeader survives as two
        // declarations referencing each other by name, never inlined.
        assert!(artifacts.types.contains("  lastHeader?: BlockHeader;"));
        assert!(
            artifacts
                .types
                .contains("  validatorProposals: ValidatorStake[];")
        );
        assert!(
            artifacts
                .validators
                .contains("checkArray(v0, p0, (v1, p1) => validateValidatorStake(v1, p1))")
        );
        assert!(artifacts.validators.contains("validateBlockHeader(v0, p0)"));
    }

    #[test]
    fn test_discriminated_union_narrowing() {
        let artifacts = generate_and_verify(
            r##"{
  "schemas": [
    { "name": "Event", "schema": { "oneOf": [
        { "type": "object", "fields": [
            { "name": "kind", "schema": { "const": "A" }, "required": true },
            { "name": "x", "schema": { "type": "integer" }, "required": true }
        ] },
        { "type": "object", "fields": [
            { "name": "kind", "schema": { "const": "B" }, "required": true },
            { "name": "y", "schema": { "type": "string" }, "required": true }
        ] }
    ] } }
  ]
}"##,
        );
        // One accessor per tag: a value tagged "A" narrows through the A
        // accessor and is absent from the B accessor.
        assert!(
            artifacts
                .unions
                .contains("export function splitEvent(value: Event):")
        );
        assert!(artifacts.unions.contains(
            "A: value.kind === \"A\" ? (value as { kind: \"A\"; x: number }) : undefined,"
        ));
        assert!(artifacts.unions.contains(
            "B: value.kind === \"B\" ? (value as { kind: \"B\"; y: string }) : undefined,"
        ));
        // Validation dispatches on the tag instead of probing members.
        assert!(
            artifacts
                .validators
                .contains("checkTagged(value, path, \"kind\", {")
        );
    }

    #[test]
    fn test_field_name_collision_fails_generation() {
        let result = generate(
            r##"{
  "schemas": [
    { "name": "Odd", "schema": { "type": "object", "fields": [
        { "name": "foo_bar", "schema": { "type": "string" }, "required": true },
        { "name": "fooBar", "schema": { "type": "string" }, "required": true }
    ] } }
  ]
}"##,
        );
        match result {
            Err(GenError::FieldNameCollision {
                object,
                first,
                second,
                ..
            }) => {
                assert_eq!(object, "Odd");
                assert_eq!(first, "foo_bar");
                assert_eq!(second, "fooBar");
            }
            other => panic!("expected FieldNameCollision, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_reference_fails_generation() {
        let result = generate(
            r##"{
  "schemas": [
    { "name": "Block", "schema": { "type": "object", "fields": [
        { "name": "hash", "schema": { "$ref": "Missing" }, "required": true }
    ] } }
  ]
}"##,
        );
        assert!(matches!(result, Err(GenError::UnresolvedReference { .. })));
    }

    #[test]
    fn test_conflicting_composition_fails_generation() {
        let result = generate(
            r##"{
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
}"##,
        );
        assert!(matches!(result, Err(GenError::ConflictingComposition { .. })));
    }

    #[test]
    fn test_restricted_selection_is_type_bound() {
        let artifacts = generate_and_verify(TEST_DOCUMENT);
        // selectMethods returns Pick<typeof methods, K>: an operation left
        // out of the subset is structurally absent from the result, so a
        // client built from { status, block } cannot reach gas_price.
        assert!(artifacts.registry.contains(
            "export function selectMethods<K extends OperationName>(names: readonly K[]): Pick<typeof methods, K> {"
        ));
        assert!(
            artifacts
                .registry
                .contains("export type OperationName = keyof typeof methods;")
        );
        assert!(artifacts.registry.contains("subset[name] = methods[name];"));
    }

    #[test]
    fn test_directional_validation_gates() {
        let artifacts = generate_and_verify(TEST_DOCUMENT);
        // Each direction is gated independently; a disabled direction passes
        // the payload through instead of validating it.
        assert!(artifacts.validators.contains(
            "return mode.requests ? operationValidators[operation].request(value) : succeed(value);"
        ));
        assert!(artifacts.validators.contains(
            "return mode.responses ? operationValidators[operation].response(value) : succeed(value);"
        ));
        assert!(artifacts.validators.contains(
            "return mode.errors ? operationValidators[operation].error(value) : succeed(value);"
        ));
    }

    #[test]
    fn test_naming_round_trip_bijection() {
        let document = Document::from_json(TEST_DOCUMENT).unwrap();
        let model = resolve_document(&document).unwrap();
        let table = build_naming(&model).unwrap();
        assert!(!table.maps.is_empty());
        for map in &table.maps {
            for (wire, idiomatic) in &map.pairs {
                let back = map
                    .pairs
                    .iter()
                    .find(|(_, i)| i == idiomatic)
                    .map(|(w, _)| w)
                    .unwrap();
                assert_eq!(back, wire, "bijection broken in {}", map.object);
            }
        }
    }

    #[test]
    fn test_empty_document_generates_empty_artifacts() {
        let artifacts = generate_and_verify(r#"{ "schemas": [], "operations": [] }"#);
        assert!(artifacts.types.is_empty());
        assert!(artifacts.unions.is_empty());
        assert!(
            artifacts
                .registry
                .contains("export const methods = {} as const;")
        );
    }
}
