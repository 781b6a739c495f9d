//! Generation error types.
//!
//! Every error here is fatal to the generator run: no artifact is produced
//! when any stage fails. Validation errors raised by the *generated*
//! validators are structured TypeScript values and never surface here.

use thiserror::Error;

/// Errors raised while turning a schema document into artifacts.
#[derive(Debug, Error)]
pub enum GenError {
    /// The document could not be parsed into a named-schema table plus an
    /// operation list.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A `$ref` points at a name that is not in the schema table.
    #[error("unresolved reference '{name}' in '{owner}'")]
    UnresolvedReference {
        /// The dangling reference target.
        name: String,
        /// The schema or operation the reference appears in.
        owner: String,
    },

    /// An all-of composition could not be merged into a single object shape.
    #[error("conflicting composition in '{type_name}': {detail}")]
    ConflictingComposition {
        /// The schema whose composition failed.
        type_name: String,
        /// What clashed: a field with two shapes, a non-object fragment, or
        /// a composition cycle.
        detail: String,
    },

    /// Two wire field names normalize to the same idiomatic identifier
    /// within one object.
    #[error(
        "field name collision in '{object}': '{first}' and '{second}' both normalize to '{idiomatic}'"
    )]
    FieldNameCollision {
        /// Path of the owning object.
        object: String,
        /// Wire name that claimed the identifier first.
        first: String,
        /// Wire name that collided with it.
        second: String,
        /// The shared idiomatic identifier.
        idiomatic: String,
    },

    /// A synthesized operation type name collides with a declared schema.
    #[error("duplicate type name '{0}'")]
    DuplicateTypeName(String),
}
