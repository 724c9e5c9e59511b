//! Cross-field normalization.

use crate::model::{ConfigDocument, JobName};
use tracing::{debug, warn};

/// Fill every empty matrix `os` list with the document's execution target.
///
/// Must run after layering (before it the matrices may not exist) and after
/// the execution target is resolved. Non-empty lists are never touched, so
/// running it twice is a no-op.
pub fn normalize(document: &mut ConfigDocument) {
    if document.execution_target.trim().is_empty() {
        warn!("Skipping matrix fallback: execution target is empty");
        return;
    }

    for name in JobName::matrix_jobs() {
        if let Some(matrix) = document.jobs.matrix_mut(name)
            && matrix.os.is_empty()
        {
            debug!(
                job = %name,
                execution_target = %document.execution_target,
                "Matrix os falls back to execution target"
            );
            matrix.os = vec![document.execution_target.clone()];
        }
    }
}
