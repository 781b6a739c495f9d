//! Generation pipeline: document text in, artifact set out.
//!
//! The pipeline is fail-fast by construction: each stage runs to completion
//! before the next starts, and no artifact string exists until every stage
//! has succeeded, so a failed run can never leave a partial artifact set.

use tracing::debug;

use crate::document::Document;
use crate::error::GenError;
use crate::ir::codegen::{codegen_naming, codegen_registry, codegen_types, codegen_unions};
use crate::ir::emit::Emit;
use crate::ir::naming::build_naming;
use crate::ir::resolve::resolve_document;
use crate::ir::validator::codegen_validators;

/// The five generated artifacts, as TypeScript module source text.
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// Type declarations, one per named schema.
    pub types: String,
    /// Runtime validators plus the direction-parameterized checking surface.
    pub validators: String,
    /// Method registry and restricted-subset builder.
    pub registry: String,
    /// Per-object wire/idiomatic naming map.
    pub naming: String,
    /// Discriminated-union narrowing helpers.
    pub unions: String,
}

impl Artifacts {
    /// Stable file names paired with their contents, for the collaborator
    /// that writes artifacts to disk.
    pub fn files(&self) -> [(&'static str, &str); 5] {
        [
            ("types.ts", self.types.as_str()),
            ("validators.ts", self.validators.as_str()),
            ("registry.ts", self.registry.as_str()),
            ("naming.ts", self.naming.as_str()),
            ("unions.ts", self.unions.as_str()),
        ]
    }
}

/// Generate all artifacts from a schema document.
///
/// Re-running on the same document is idempotent and byte-stable: the model
/// preserves declaration order and every emitter is a pure function of it.
///
/// # Errors
/// Any [`GenError`] aborts the run with no output produced.
pub fn generate(document_json: &str) -> Result<Artifacts, GenError> {
    let document = Document::from_json(document_json)?;
    let model = resolve_document(&document)?;
    let naming = build_naming(&model)?;

    debug!(
        types = model.types().len(),
        operations = model.registry().len(),
        objects = naming.maps.len(),
        "resolved schema model"
    );

    let artifacts = Artifacts {
        types: codegen_types(&model).emit(),
        validators: codegen_validators(&model).emit(),
        registry: codegen_registry(&model).emit(),
        naming: codegen_naming(&naming).emit(),
        unions: codegen_unions(&model).emit(),
    };

    debug!(
        total_bytes = artifacts.files().iter().map(|(_, text)| text.len()).sum::<usize>(),
        "emitted artifacts"
    );

    Ok(artifacts)
}
