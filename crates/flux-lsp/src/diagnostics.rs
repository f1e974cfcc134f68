//! Dispatch diagnostics for one document.
//!
//! Diagnostics are advisory and replace the previous set for the file
//! wholesale on every call; the server publishes whatever this returns.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity};

use flux_analysis::cancel::CancelToken;
use flux_analysis::models::ActionSchema;
use flux_analysis::validate;

use crate::analysis::{analyze_document, span_to_range};

/// Validate every dispatch call in `source` against the action catalog.
pub fn dispatch_diagnostics(
    source: &str,
    catalog: &[ActionSchema],
    cancel: &CancelToken,
) -> Vec<Diagnostic> {
    let analysis = analyze_document(source);
    let structural = validate::validate_file(
        &analysis.parse.syntax(),
        &analysis.semantics,
        catalog,
        cancel,
    );

    structural
        .into_iter()
        .map(|diagnostic| Diagnostic {
            range: span_to_range(source, diagnostic.span),
            severity: Some(DiagnosticSeverity::ERROR),
            source: Some("flux".to_string()),
            message: diagnostic.message,
            ..Default::default()
        })
        .collect()
}
