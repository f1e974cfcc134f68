//! Dispatch-call detection.
//!
//! Detection is name-based: a call expression counts as a dispatch call iff
//! its callee's final significant token reads `dispatch`. That covers
//! `dispatch(...)`, `this.props.dispatch(...)`, and `ctx.dispatch(...)`
//! without needing a nominal dispatcher type -- and will also match an
//! unrelated function that happens to be named `dispatch`, which is the
//! accepted trade-off.

use flux_parser::ast::expr::{CallExpr, ObjectLiteral};
use flux_parser::ast::AstNode;
use flux_parser::{SyntaxKind, SyntaxNode};

/// The callee name that marks a dispatch call.
const DISPATCH_NAME: &str = "dispatch";

/// Whether a node is a call expression whose callee ends in `dispatch`.
pub fn is_dispatch_call(node: &SyntaxNode) -> bool {
    if node.kind() != SyntaxKind::CALL_EXPR {
        return false;
    }
    let Some(call) = CallExpr::cast(node.clone()) else {
        return false;
    };
    let Some(callee) = call.callee() else {
        return false;
    };
    callee
        .descendants_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| !t.kind().is_trivia())
        .last()
        .is_some_and(|t| t.text() == DISPATCH_NAME)
}

/// Extract the action object literals around the cursor.
///
/// Finds the LAST dispatch-call ancestor in the node path. `None` means
/// "not inside a dispatch call" -- distinct from `Some(vec![])`, which
/// means "inside one, but nothing typed yet". On success, returns every
/// object literal between the call and the cursor, outer-to-inner: the
/// first is the action object, the rest are nested payload objects.
pub fn action_literals(path: &[SyntaxNode]) -> Option<Vec<ObjectLiteral>> {
    let index = path.iter().rposition(is_dispatch_call)?;
    Some(
        path[index..]
            .iter()
            .filter_map(|n| ObjectLiteral::cast(n.clone()))
            .collect(),
    )
}

/// Collect all dispatch calls in a subtree, outermost first.
///
/// Does not descend into a matched call's children: nested dispatch calls
/// inside an argument list belong to the outer call's validation pass.
pub fn find_dispatch_calls(root: &SyntaxNode) -> Vec<CallExpr> {
    let mut calls = Vec::new();
    collect(root, &mut calls);
    calls
}

fn collect(node: &SyntaxNode, out: &mut Vec<CallExpr>) {
    if is_dispatch_call(node) {
        if let Some(call) = CallExpr::cast(node.clone()) {
            out.push(call);
        }
        return;
    }
    for child in node.children() {
        collect(&child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_path::node_path;

    fn first_call(source: &str) -> SyntaxNode {
        let parse = flux_parser::parse(source);
        parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::CALL_EXPR)
            .expect("call expression")
    }

    #[test]
    fn detects_bare_dispatch() {
        assert!(is_dispatch_call(&first_call("dispatch({})")));
    }

    #[test]
    fn detects_member_chain_dispatch() {
        assert!(is_dispatch_call(&first_call("this.props.dispatch({})")));
        assert!(is_dispatch_call(&first_call("ctx.dispatch({})")));
    }

    #[test]
    fn rejects_other_calls() {
        assert!(!is_dispatch_call(&first_call("put({})")));
        assert!(!is_dispatch_call(&first_call("dispatcher({})")));
        assert!(!is_dispatch_call(&first_call("dispatch.bind(this)")));
    }

    #[test]
    fn action_literals_none_outside_dispatch() {
        let source = "put({ type: 'x' })";
        let parse = flux_parser::parse(source);
        let offset = source.find('x').unwrap() as u32;
        let path = node_path(&parse.syntax(), offset);
        assert!(action_literals(&path).is_none());
    }

    #[test]
    fn action_literals_empty_inside_bare_call() {
        let source = "dispatch()";
        let parse = flux_parser::parse(source);
        let offset = source.find('(').unwrap() as u32 + 1;
        let path = node_path(&parse.syntax(), offset);
        let literals = action_literals(&path).expect("inside dispatch");
        assert!(literals.is_empty());
    }

    #[test]
    fn action_literals_outer_to_inner() {
        let source = "dispatch({ type: 'a', payload: { id: 1 } })";
        let parse = flux_parser::parse(source);
        let offset = source.find("id").unwrap() as u32;
        let path = node_path(&parse.syntax(), offset);
        let literals = action_literals(&path).expect("inside dispatch");
        assert_eq!(literals.len(), 2);
        assert!(literals[0].prop("type").is_some());
        assert!(literals[1].prop("id").is_some());
    }

    #[test]
    fn find_dispatch_calls_skips_nested() {
        let source = "function f() { dispatch({ type: 'a' }); other(); dispatch({ type: 'b' }); }";
        let parse = flux_parser::parse(source);
        let calls = find_dispatch_calls(&parse.syntax());
        assert_eq!(calls.len(), 2);
    }
}
