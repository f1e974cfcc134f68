//! flux parser: error-tolerant parser producing a rowan-based CST.
//!
//! This crate transforms the token stream from `flux-lexer` into a lossless
//! concrete syntax tree (CST) using the `rowan` library. The CST preserves
//! all tokens including whitespace and comments, so node ranges are source
//! byte ranges and the dispatch analysis can anchor diagnostics directly.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

pub use cst::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

use rowan::NodeOrToken;

/// Result of parsing a flux source file.
///
/// Contains the green tree (the immutable, cheap-to-clone CST) and any
/// parse errors encountered. The parser is error-tolerant, so a tree is
/// produced even for wildly malformed input.
#[derive(Clone)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Build the syntax tree root from the green node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The typed AST view of the root.
    pub fn tree(&self) -> ast::item::SourceFile {
        ast::AstNode::cast(self.syntax()).expect("root node is SOURCE_FILE")
    }

    /// Parse errors encountered during parsing.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether parsing completed without errors.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a flux source file into a CST.
///
/// This is the main entry point for the parser. It lexes the source,
/// parses the token stream, and returns a [`Parse`] result containing
/// the syntax tree and any errors.
pub fn parse(source: &str) -> Parse {
    let (tokens, lex_errors) = flux_lexer::Lexer::tokenize_with_errors(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut p);
    let (green, parse_errors) = p.build_tree();
    // Lexer errors come first: they describe the rawest layer of breakage.
    let mut errors: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError::new(e.to_string(), e.span))
        .collect();
    errors.extend(parse_errors);
    Parse { green, errors }
}

/// Render a syntax tree as an indented debug string.
///
/// Nodes print as `KIND@start..end`, tokens as `KIND@start..end "text"`.
/// Used by snapshot tests and for parser debugging.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    fmt_element(&NodeOrToken::Node(node.clone()), 0, &mut out);
    out
}

fn fmt_element(element: &SyntaxElement, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match element {
        NodeOrToken::Node(node) => {
            out.push_str(&format!("{:?}@{:?}\n", node.kind(), node.text_range()));
            for child in node.children_with_tokens() {
                fmt_element(&child, depth + 1, out);
            }
        }
        NodeOrToken::Token(token) => {
            out.push_str(&format!(
                "{:?}@{:?} {:?}\n",
                token.kind(),
                token.text_range(),
                token.text()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lossless() {
        let source = "import a from './x';\nexport default { namespace: 'app' };\n";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors());
        assert_eq!(parse.syntax().text().to_string(), source);
    }

    #[test]
    fn parse_empty_source() {
        let parse = parse("");
        assert!(parse.ok());
        assert_eq!(parse.syntax().kind(), SyntaxKind::SOURCE_FILE);
    }

    #[test]
    fn parse_recovers_from_garbage() {
        let parse = parse("const = ;;; @@@ dispatch({)");
        // Must still produce a full-coverage tree.
        assert_eq!(
            parse.syntax().text().to_string(),
            "const = ;;; @@@ dispatch({)"
        );
        assert!(!parse.ok());
    }
}
