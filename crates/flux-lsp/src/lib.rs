//! flux Language Server Protocol implementation.
//!
//! Provides live assistance for dispatch calls against flux-style state
//! models:
//!
//! - **Diagnostics**: structural validation of every dispatch call's action
//!   literal against the model-derived action catalog
//! - **Completion**: `type`/`payload` keys inside the action object, and
//!   payload properties at the cursor's nesting depth
//! - **Go-to-definition**: from an action type string to its handler
//! - **Signature help**: a synthesized `dispatch({...}): any` signature
//!
//! The server communicates via stdin/stdout using the LSP protocol over
//! JSON-RPC, powered by the `tower-lsp` framework. The server shell in
//! [`server`] is a thin adapter; all logic lives in the provider modules.

pub mod analysis;
pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod server;
pub mod signature_help;

use tower_lsp::{LspService, Server};

use server::FluxBackend;

/// Run the flux LSP server on stdin/stdout.
///
/// Sets up the tower-lsp service and runs the event loop until the client
/// disconnects.
pub async fn run_server() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(FluxBackend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
