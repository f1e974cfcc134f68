//! Node-path location: the ancestor chain of syntax nodes enclosing an
//! offset.

use flux_parser::SyntaxNode;
use rowan::TextSize;

/// Hard cap on path length, a defensive bound against pathological trees.
pub const MAX_NODE_PATH: usize = 100;

/// Collect the chain of nodes enclosing `offset`, root-first.
///
/// Spans are treated as inclusive on BOTH ends, so a cursor sitting exactly
/// on a token boundary still resolves into the adjoining node. An offset
/// outside the root (e.g. past end-of-file) yields an empty path.
pub fn node_path(root: &SyntaxNode, offset: u32) -> Vec<SyntaxNode> {
    let target = TextSize::from(offset);
    let mut path = Vec::new();
    let mut current = if contains_inclusive(root, target) {
        Some(root.clone())
    } else {
        None
    };

    while let Some(node) = current {
        if path.len() > MAX_NODE_PATH {
            break;
        }
        current = node.children().find(|c| contains_inclusive(c, target));
        path.push(node);
    }

    path
}

fn contains_inclusive(node: &SyntaxNode, offset: TextSize) -> bool {
    let range = node.text_range();
    range.start() <= offset && offset <= range.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_parser::SyntaxKind;

    #[test]
    fn path_is_root_first_and_ends_at_deepest_node() {
        // Three nested calls: a(b(c(1))). Offset inside the literal.
        let source = "a(b(c(1)))";
        let parse = flux_parser::parse(source);
        let root = parse.syntax();
        let offset = source.find('1').unwrap() as u32;

        let path = node_path(&root, offset);
        assert_eq!(path.first().map(|n| n.kind()), Some(SyntaxKind::SOURCE_FILE));
        assert_eq!(path.last().map(|n| n.kind()), Some(SyntaxKind::LITERAL));

        // Each entry encloses the next.
        for pair in path.windows(2) {
            assert!(pair[0]
                .text_range()
                .contains_range(pair[1].text_range()));
        }

        // Three CALL_EXPR ancestors on the way down.
        let calls = path
            .iter()
            .filter(|n| n.kind() == SyntaxKind::CALL_EXPR)
            .count();
        assert_eq!(calls, 3);
    }

    #[test]
    fn offset_past_end_of_file_returns_empty_path() {
        let parse = flux_parser::parse("x");
        let root = parse.syntax();
        assert!(node_path(&root, 50).is_empty());
    }

    #[test]
    fn offset_at_end_of_file_resolves() {
        let source = "dispatch({ type: 'a' })";
        let parse = flux_parser::parse(source);
        let root = parse.syntax();
        let path = node_path(&root, source.len() as u32);
        assert!(!path.is_empty());
    }

    #[test]
    fn boundary_offset_resolves_into_adjoining_node() {
        // Cursor right after the opening brace of the object literal.
        let source = "dispatch({})";
        let parse = flux_parser::parse(source);
        let root = parse.syntax();
        let offset = source.find('{').unwrap() as u32 + 1;

        let path = node_path(&root, offset);
        assert_eq!(
            path.last().map(|n| n.kind()),
            Some(SyntaxKind::OBJECT_LITERAL)
        );
    }
}
