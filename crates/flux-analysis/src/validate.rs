//! Dispatch validator.
//!
//! Orchestrates detection, catalog lookup, and structural matching for
//! every dispatch call in a file. Branches are mutually exclusive and
//! short-circuit: an arity failure never also runs a payload check.

use flux_parser::ast::expr::{CallExpr, Expr, ObjectLiteral, ObjectProp};
use flux_parser::ast::strip_quotes;
use flux_parser::ast::AstNode;
use flux_parser::SyntaxNode;
use flux_types::semantics::node_span;
use flux_types::FileSemantics;

use crate::cancel::CancelToken;
use crate::dispatch;
use crate::matcher::{self, MatchContext, StructuralDiagnostic};
use crate::models::ActionSchema;

/// Validate every dispatch call in a subtree.
///
/// The cancellation token is checked between calls; on cancellation the
/// partial list is returned and the caller discards it.
pub fn validate_file(
    root: &SyntaxNode,
    semantics: &FileSemantics,
    catalog: &[ActionSchema],
    cancel: &CancelToken,
) -> Vec<StructuralDiagnostic> {
    let mut diagnostics = Vec::new();
    for call in dispatch::find_dispatch_calls(root) {
        if cancel.is_cancelled() {
            break;
        }
        diagnostics.extend(validate_dispatch_call(&call, semantics, catalog));
    }
    diagnostics
}

/// Validate a single dispatch call against the action catalog.
pub fn validate_dispatch_call(
    call: &CallExpr,
    semantics: &FileSemantics,
    catalog: &[ActionSchema],
) -> Vec<StructuralDiagnostic> {
    let call_span = node_span(call.syntax());
    let args = call.args();

    // Arity: exactly one argument.
    if args.len() != 1 {
        let message = if args.len() >= 2 {
            "dispatch call has only one argument"
        } else {
            "Please complete dispatch call"
        };
        return vec![StructuralDiagnostic::new(call_span, message)];
    }

    // Shape: the argument must be an object literal.
    let action = match &args[0] {
        Expr::ObjectLiteral(obj) => obj.clone(),
        other => {
            return vec![StructuralDiagnostic::new(
                node_span(other.syntax()),
                "type not match { type: string, payload?: object }",
            )];
        }
    };

    // The `type` property: present, a plain assignment, a string literal.
    let Some(type_prop) = action.prop("type") else {
        return vec![StructuralDiagnostic::new(
            node_span(action.syntax()),
            "cannot find property type for Action { type: string, payload?: object }",
        )];
    };
    let ObjectProp::Assign(type_assign) = &type_prop else {
        return vec![StructuralDiagnostic::new(
            node_span(type_prop.syntax()),
            "something went wrong with your action type",
        )];
    };
    let initializer = type_assign.initializer();
    let type_literal = match &initializer {
        Some(Expr::Literal(lit)) if lit.is_string() => lit.clone(),
        Some(other) => {
            return vec![StructuralDiagnostic::new(
                node_span(other.syntax()),
                "property type should be string",
            )];
        }
        None => {
            return vec![StructuralDiagnostic::new(
                node_span(type_prop.syntax()),
                "property type should be string",
            )];
        }
    };

    // Catalog lookup, quotes normalized on both sides.
    let type_text = type_literal.text();
    let wanted = strip_quotes(&type_text);
    let Some(schema) = catalog
        .iter()
        .find(|schema| strip_quotes(&schema.name) == wanted)
    else {
        return vec![StructuralDiagnostic::new(
            node_span(type_literal.syntax()),
            "cannot find a model action type name matches current one, perhaps spelling mistakes?",
        )];
    };

    // Payload checks, reached only on a catalog hit.
    validate_payload(&action, schema, semantics)
}

fn validate_payload(
    action: &ObjectLiteral,
    schema: &ActionSchema,
    semantics: &FileSemantics,
) -> Vec<StructuralDiagnostic> {
    let payload_prop = action.prop("payload");

    match (&schema.payload, payload_prop) {
        // Payload required but absent.
        (Some(payload_ty), None) if schema.required => {
            vec![StructuralDiagnostic::new(
                node_span(action.syntax()),
                format!(
                    "payload is required in {{type: '{}', payload: {}}}",
                    strip_quotes(&schema.name),
                    payload_ty
                ),
            )]
        }
        // Optional payload, not given: fine.
        (Some(_), None) => Vec::new(),

        // No payload facet in the schema, but a payload was given.
        (None, Some(prop)) => vec![StructuralDiagnostic::new(
            node_span(prop.syntax()),
            "payload is unnecessary",
        )],
        (None, None) => Vec::new(),

        // Payload present and expected: structural match.
        (Some(payload_ty), Some(prop)) => {
            let ObjectProp::Assign(assign) = &prop else {
                // Shorthand `{ payload }` carries no checkable literal.
                return Vec::new();
            };
            let Some(initializer) = assign.initializer() else {
                // Mid-keystroke `payload:` with no value yet.
                return Vec::new();
            };
            let ctx = MatchContext {
                semantics,
                is_action_object: true,
            };
            matcher::match_expr(&initializer, payload_ty, &ctx)
        }
    }
}
