//! Statement and declaration parsing for the flux TypeScript subset.
//!
//! Covers: import declarations, export assignments (`export default`),
//! exported declarations, const/let/var declarations, function declarations,
//! interface / type-alias / enum declarations, blocks, return, if/else, and
//! expression statements.

use crate::syntax_kind::SyntaxKind;

use super::{expressions, types, Parser};

/// Tokens that begin a new statement; used as recovery fences so a malformed
/// construct does not swallow the rest of the file.
const STMT_START: &[SyntaxKind] = &[
    SyntaxKind::IMPORT_KW,
    SyntaxKind::EXPORT_KW,
    SyntaxKind::CONST_KW,
    SyntaxKind::LET_KW,
    SyntaxKind::VAR_KW,
    SyntaxKind::FUNCTION_KW,
    SyntaxKind::INTERFACE_KW,
    SyntaxKind::ENUM_KW,
    SyntaxKind::RETURN_KW,
    SyntaxKind::IF_KW,
];

/// Parse a single statement or declaration.
pub(crate) fn parse_statement(p: &mut Parser) {
    match p.current() {
        SyntaxKind::IMPORT_KW => parse_import_decl(p),
        SyntaxKind::EXPORT_KW => {
            if p.nth(1) == SyntaxKind::DEFAULT_KW {
                parse_export_assign(p);
            } else {
                parse_export_decl(p);
            }
        }
        SyntaxKind::CONST_KW | SyntaxKind::LET_KW | SyntaxKind::VAR_KW => parse_var_decl(p),
        SyntaxKind::FUNCTION_KW => parse_function_decl(p),
        SyntaxKind::ASYNC_KW if p.nth(1) == SyntaxKind::FUNCTION_KW => parse_function_decl(p),
        SyntaxKind::INTERFACE_KW => parse_interface_decl(p),
        SyntaxKind::TYPE_KW if p.nth(1) == SyntaxKind::IDENT => parse_type_alias(p),
        SyntaxKind::ENUM_KW => parse_enum_decl(p),
        SyntaxKind::RETURN_KW => parse_return_stmt(p),
        SyntaxKind::IF_KW => parse_if_stmt(p),
        SyntaxKind::L_BRACE => parse_block(p),
        SyntaxKind::SEMICOLON => {
            // Stray semicolon: consume without wrapping.
            p.advance();
        }
        _ => parse_expr_stmt(p),
    }
}

// ── Imports and exports ────────────────────────────────────────────────

/// `import { a, b } from './x';`, `import x from './x';`, `import './x';`
///
/// The clause between `import` and `from` is kept unstructured: the analysis
/// never inspects it, it only has to survive in the tree.
pub(crate) fn parse_import_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // import

    if p.at(SyntaxKind::STRING) {
        p.advance();
        p.eat(SyntaxKind::SEMICOLON);
        p.close(m, SyntaxKind::IMPORT_DECL);
        return;
    }

    let clause = p.open();
    while !p.at_any(&[
        SyntaxKind::FROM_KW,
        SyntaxKind::STRING,
        SyntaxKind::SEMICOLON,
        SyntaxKind::EOF,
    ]) && !p.at_any(STMT_START)
    {
        p.advance();
    }
    p.close(clause, SyntaxKind::IMPORT_CLAUSE);

    if p.eat(SyntaxKind::FROM_KW) {
        p.expect(SyntaxKind::STRING);
    }
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::IMPORT_DECL);
}

/// `export default <expr>;` -- the export-assignment form model files use.
pub(crate) fn parse_export_assign(p: &mut Parser) {
    let m = p.open();
    p.advance(); // export
    p.advance(); // default
    expressions::expr(p);
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::EXPORT_ASSIGN);
}

/// `export` wrapping another declaration.
pub(crate) fn parse_export_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // export
    match p.current() {
        SyntaxKind::CONST_KW | SyntaxKind::LET_KW | SyntaxKind::VAR_KW => parse_var_decl(p),
        SyntaxKind::FUNCTION_KW => parse_function_decl(p),
        SyntaxKind::ASYNC_KW if p.nth(1) == SyntaxKind::FUNCTION_KW => parse_function_decl(p),
        SyntaxKind::INTERFACE_KW => parse_interface_decl(p),
        SyntaxKind::TYPE_KW => parse_type_alias(p),
        SyntaxKind::ENUM_KW => parse_enum_decl(p),
        _ => p.advance_with_error("expected declaration after `export`"),
    }
    p.close(m, SyntaxKind::EXPORT_DECL);
}

// ── Declarations ───────────────────────────────────────────────────────

/// `const x: T = expr;` (single declarator form).
pub(crate) fn parse_var_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // const/let/var
    parse_name(p);
    if p.at(SyntaxKind::COLON) {
        parse_type_annotation(p);
    }
    if p.eat(SyntaxKind::EQ) {
        expressions::expr(p);
    }
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::VAR_DECL);
}

/// `function name(params) { ... }` with optional `async` and `*`.
pub(crate) fn parse_function_decl(p: &mut Parser) {
    let m = p.open();
    p.eat(SyntaxKind::ASYNC_KW);
    p.expect(SyntaxKind::FUNCTION_KW);
    p.eat(SyntaxKind::STAR);
    if p.at(SyntaxKind::IDENT) {
        parse_name(p);
    }
    parse_param_list(p);
    if p.at(SyntaxKind::COLON) {
        parse_type_annotation(p);
    }
    if p.at(SyntaxKind::L_BRACE) {
        parse_block(p);
    } else {
        p.error("expected function body");
    }
    p.close(m, SyntaxKind::FUNCTION_DECL);
}

/// `interface Name { members }` (an `extends` clause is tolerated and left
/// unstructured).
pub(crate) fn parse_interface_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // interface
    parse_name(p);
    // `extends` is contextual (lexed as an identifier).
    if p.at(SyntaxKind::IDENT) && p.current_text() == "extends" {
        while !p.at_any(&[SyntaxKind::L_BRACE, SyntaxKind::EOF]) && !p.at_any(STMT_START) {
            p.advance();
        }
    }
    if p.at(SyntaxKind::L_BRACE) {
        types::parse_object_type(p);
    } else {
        p.error("expected interface body");
    }
    p.close(m, SyntaxKind::INTERFACE_DECL);
}

/// `type Name = T;`
pub(crate) fn parse_type_alias(p: &mut Parser) {
    let m = p.open();
    p.advance(); // type
    parse_name(p);
    p.expect(SyntaxKind::EQ);
    types::parse_type(p);
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::TYPE_ALIAS_DECL);
}

/// `enum Name { A, B = 1, C = 'x' }`
pub(crate) fn parse_enum_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // enum
    parse_name(p);
    p.expect(SyntaxKind::L_BRACE);
    while !p.at_any(&[SyntaxKind::R_BRACE, SyntaxKind::EOF]) {
        parse_enum_member(p);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::ENUM_DECL);
}

fn parse_enum_member(p: &mut Parser) {
    let m = p.open();
    if p.at_name_like() {
        parse_name(p);
    } else {
        p.advance_with_error("expected enum member name");
        p.close(m, SyntaxKind::ENUM_MEMBER);
        return;
    }
    if p.eat(SyntaxKind::EQ) {
        if p.at_any(&[SyntaxKind::STRING, SyntaxKind::NUMBER]) {
            p.advance();
        } else {
            expressions::expr(p);
        }
    }
    p.close(m, SyntaxKind::ENUM_MEMBER);
}

// ── Statements ─────────────────────────────────────────────────────────

/// `return expr;`
pub(crate) fn parse_return_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // return
    if !p.at_any(&[
        SyntaxKind::SEMICOLON,
        SyntaxKind::R_BRACE,
        SyntaxKind::EOF,
    ]) {
        expressions::expr(p);
    }
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::RETURN_STMT);
}

/// `if (cond) stmt else stmt`
pub(crate) fn parse_if_stmt(p: &mut Parser) {
    let m = p.open();
    p.advance(); // if
    p.expect(SyntaxKind::L_PAREN);
    expressions::expr(p);
    p.expect(SyntaxKind::R_PAREN);
    parse_statement(p);
    if p.eat(SyntaxKind::ELSE_KW) {
        parse_statement(p);
    }
    p.close(m, SyntaxKind::IF_STMT);
}

/// `{ statements }`
pub(crate) fn parse_block(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::L_BRACE);
    while !p.at_any(&[SyntaxKind::R_BRACE, SyntaxKind::EOF]) {
        let before = p.cursor();
        parse_statement(p);
        if p.cursor() == before {
            p.advance_with_error("expected statement");
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::BLOCK);
}

fn parse_expr_stmt(p: &mut Parser) {
    let m = p.open();
    let before = p.cursor();
    expressions::expr(p);
    if p.cursor() == before {
        p.advance_with_error("expected expression");
    }
    p.eat(SyntaxKind::SEMICOLON);
    p.close(m, SyntaxKind::EXPR_STMT);
}

// ── Shared pieces ──────────────────────────────────────────────────────

/// Parse a NAME node wrapping the current name-like token.
pub(crate) fn parse_name(p: &mut Parser) {
    if p.at_name_like() {
        let m = p.open();
        p.advance();
        p.close(m, SyntaxKind::NAME);
    } else {
        p.error("expected identifier");
    }
}

/// `: T` in variable, parameter, or return position.
pub(crate) fn parse_type_annotation(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::COLON);
    types::parse_type(p);
    p.close(m, SyntaxKind::TYPE_ANNOTATION);
}

/// `(a, { b }: T, c? = d)`
pub(crate) fn parse_param_list(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::L_PAREN);
    while !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::EOF]) {
        let before = p.cursor();
        parse_param(p);
        if p.cursor() == before {
            p.advance_with_error("expected parameter");
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::PARAM_LIST);
}

fn parse_param(p: &mut Parser) {
    let m = p.open();
    p.eat(SyntaxKind::DOT_DOT_DOT);
    if p.at(SyntaxKind::L_BRACE) {
        parse_object_pattern(p);
    } else if p.at_name_like() {
        parse_name(p);
    } else {
        p.close(m, SyntaxKind::PARAM);
        return;
    }
    p.eat(SyntaxKind::QUESTION);
    if p.at(SyntaxKind::COLON) {
        parse_type_annotation(p);
    }
    if p.eat(SyntaxKind::EQ) {
        expressions::expr(p);
    }
    p.close(m, SyntaxKind::PARAM);
}

/// Destructuring pattern `{ payload }` / `{ payload: todo }`.
///
/// The binding structure is irrelevant to the analysis (only the parameter's
/// type annotation matters), so the contents are consumed flat with brace
/// depth tracking.
fn parse_object_pattern(p: &mut Parser) {
    let m = p.open();
    p.advance(); // {
    let mut depth = 1u32;
    while depth > 0 && !p.at(SyntaxKind::EOF) {
        match p.current() {
            SyntaxKind::L_BRACE => depth += 1,
            SyntaxKind::R_BRACE => depth -= 1,
            _ => {}
        }
        p.advance();
    }
    p.close(m, SyntaxKind::OBJECT_PATTERN);
}
