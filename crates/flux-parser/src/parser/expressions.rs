//! Expression parser for the flux TypeScript subset.
//!
//! Pratt parsing with binding-power tables for the operators the subset
//! needs, plus postfix handling (call, member access, indexing, conditional)
//! via `open_before` wrapping. Object literals get first-class treatment:
//! they are what the dispatch validator inspects, so their structure must
//! survive half-typed input.

use crate::syntax_kind::SyntaxKind;

use super::{items, MarkClosed, Parser};

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns (left_bp, right_bp) for infix operators. Left < right means
/// left-associative. Returns `None` if the token is not an infix operator.
fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    match op {
        // Logical OR
        SyntaxKind::PIPE_PIPE => Some((5, 6)),
        // Logical AND
        SyntaxKind::AMP_AMP => Some((7, 8)),
        // Equality
        SyntaxKind::EQ_EQ
        | SyntaxKind::EQ_EQ_EQ
        | SyntaxKind::NOT_EQ
        | SyntaxKind::NOT_EQ_EQ => Some((9, 10)),
        // Comparison
        SyntaxKind::LT | SyntaxKind::GT | SyntaxKind::LT_EQ | SyntaxKind::GT_EQ => {
            Some((11, 12))
        }
        // Additive
        SyntaxKind::PLUS | SyntaxKind::MINUS => Some((13, 14)),
        // Multiplicative
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => Some((15, 16)),
        _ => None,
    }
}

/// Binding power to the right of prefix operators (`!`, `-`, `+`, `await`,
/// `new`).
const PREFIX_BP: u8 = 19;

/// Postfix operations (call, member access, indexing) bind tighter than all
/// prefix and infix operators.
const POSTFIX_BP: u8 = 21;

/// Conditional (`a ? b : c`) binds looser than `||` but tighter than
/// assignment.
const COND_BP: u8 = 3;

// ── Entry points ───────────────────────────────────────────────────────

/// Parse an expression at the default (lowest) binding power.
pub(crate) fn expr(p: &mut Parser) {
    expr_bp(p, 0);
}

/// Parse an expression with the given minimum binding power.
fn expr_bp(p: &mut Parser, min_bp: u8) -> Option<MarkClosed> {
    let mut lhs = lhs(p)?;

    loop {
        let current = p.current();

        // ── Postfix: function call ──
        if current == SyntaxKind::L_PAREN && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            parse_arg_list(p);
            lhs = p.close(m, SyntaxKind::CALL_EXPR);
            continue;
        }

        // ── Postfix: member access ──
        if current == SyntaxKind::DOT && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // .
            if p.at_name_like() {
                p.advance();
            } else {
                p.error("expected property name");
            }
            lhs = p.close(m, SyntaxKind::MEMBER_EXPR);
            continue;
        }

        // ── Postfix: index access ──
        if current == SyntaxKind::L_BRACKET && POSTFIX_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // [
            expr_bp(p, 0);
            p.expect(SyntaxKind::R_BRACKET);
            lhs = p.close(m, SyntaxKind::INDEX_EXPR);
            continue;
        }

        // ── Conditional ──
        if current == SyntaxKind::QUESTION && COND_BP >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // ?
            expr_bp(p, 0);
            p.expect(SyntaxKind::COLON);
            expr_bp(p, COND_BP);
            lhs = p.close(m, SyntaxKind::CONDITIONAL_EXPR);
            continue;
        }

        // ── Assignment (right-associative) ──
        if current == SyntaxKind::EQ && 2 >= min_bp {
            let m = p.open_before(lhs);
            p.advance(); // =
            expr_bp(p, 1);
            lhs = p.close(m, SyntaxKind::ASSIGN_EXPR);
            continue;
        }

        // ── Infix binary operators ──
        if let Some((l_bp, r_bp)) = infix_binding_power(current) {
            if l_bp < min_bp {
                break;
            }
            let m = p.open_before(lhs);
            p.advance(); // operator
            expr_bp(p, r_bp);
            lhs = p.close(m, SyntaxKind::BINARY_EXPR);
            continue;
        }

        break;
    }

    Some(lhs)
}

// ── Atom / prefix parsing (LHS) ────────────────────────────────────────

fn lhs(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::STRING
        | SyntaxKind::NUMBER
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NULL_KW
        | SyntaxKind::UNDEFINED_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL))
        }

        // Single-parameter arrow: `x => body`
        SyntaxKind::IDENT if p.nth(1) == SyntaxKind::FAT_ARROW => Some(parse_arrow_fn(p)),

        SyntaxKind::IDENT | SyntaxKind::THIS_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::NAME_REF))
        }

        SyntaxKind::L_BRACE => Some(parse_object_literal(p)),
        SyntaxKind::L_BRACKET => Some(parse_array_literal(p)),

        SyntaxKind::L_PAREN => {
            if is_arrow_ahead(p) {
                Some(parse_arrow_fn(p))
            } else {
                let m = p.open();
                p.advance(); // (
                expr_bp(p, 0);
                p.expect(SyntaxKind::R_PAREN);
                Some(p.close(m, SyntaxKind::PAREN_EXPR))
            }
        }

        SyntaxKind::FUNCTION_KW => Some(parse_function_expr(p)),

        SyntaxKind::ASYNC_KW => {
            if p.nth(1) == SyntaxKind::FUNCTION_KW {
                Some(parse_function_expr(p))
            } else {
                Some(parse_arrow_fn(p))
            }
        }

        SyntaxKind::NEW_KW => {
            let m = p.open();
            p.advance();
            expr_bp(p, PREFIX_BP);
            Some(p.close(m, SyntaxKind::NEW_EXPR))
        }

        SyntaxKind::AWAIT_KW => {
            let m = p.open();
            p.advance();
            expr_bp(p, PREFIX_BP);
            Some(p.close(m, SyntaxKind::AWAIT_EXPR))
        }

        SyntaxKind::YIELD_KW => {
            let m = p.open();
            p.advance();
            p.eat(SyntaxKind::STAR);
            if can_start_expr(p.current()) {
                expr_bp(p, 1);
            }
            Some(p.close(m, SyntaxKind::YIELD_EXPR))
        }

        SyntaxKind::BANG | SyntaxKind::MINUS | SyntaxKind::PLUS => {
            let m = p.open();
            p.advance();
            expr_bp(p, PREFIX_BP);
            Some(p.close(m, SyntaxKind::PREFIX_EXPR))
        }

        kind => {
            // Structural closers are fences, not expression starters; leave
            // them for the enclosing construct to consume.
            if matches!(
                kind,
                SyntaxKind::R_BRACE
                    | SyntaxKind::R_PAREN
                    | SyntaxKind::R_BRACKET
                    | SyntaxKind::COMMA
                    | SyntaxKind::SEMICOLON
                    | SyntaxKind::COLON
                    | SyntaxKind::EOF
            ) {
                p.error("expected expression");
            } else {
                p.advance_with_error("expected expression");
            }
            None
        }
    }
}

/// Whether a token can begin an expression (used after `yield`).
fn can_start_expr(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::STRING
            | SyntaxKind::NUMBER
            | SyntaxKind::TRUE_KW
            | SyntaxKind::FALSE_KW
            | SyntaxKind::NULL_KW
            | SyntaxKind::UNDEFINED_KW
            | SyntaxKind::IDENT
            | SyntaxKind::THIS_KW
            | SyntaxKind::L_BRACE
            | SyntaxKind::L_BRACKET
            | SyntaxKind::L_PAREN
            | SyntaxKind::FUNCTION_KW
            | SyntaxKind::ASYNC_KW
            | SyntaxKind::NEW_KW
            | SyntaxKind::AWAIT_KW
            | SyntaxKind::BANG
            | SyntaxKind::MINUS
            | SyntaxKind::PLUS
    )
}

// ── Object and array literals ──────────────────────────────────────────

/// `{ a: 1, b, *gen() {}, ...rest }`
pub(crate) fn parse_object_literal(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.expect(SyntaxKind::L_BRACE);
    while !p.at_any(&[SyntaxKind::R_BRACE, SyntaxKind::EOF]) {
        let before = p.cursor();
        parse_object_prop(p);
        if p.cursor() == before {
            p.advance_with_error("expected property");
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::OBJECT_LITERAL)
}

fn parse_object_prop(p: &mut Parser) {
    match p.current() {
        SyntaxKind::DOT_DOT_DOT => {
            let m = p.open();
            p.advance();
            expr_bp(p, 2);
            p.close(m, SyntaxKind::SPREAD_PROPERTY);
        }
        // Generator method: `*name(params) { ... }`
        SyntaxKind::STAR => parse_method_property(p),
        // Async method: `async name(params) { ... }`
        SyntaxKind::ASYNC_KW if p.nth(1).is_name_like() && p.nth(2) == SyntaxKind::L_PAREN => {
            parse_method_property(p)
        }
        kind if kind.is_name_like() => {
            if p.nth(1) == SyntaxKind::L_PAREN {
                parse_method_property(p);
            } else if p.nth(1) == SyntaxKind::COLON {
                let m = p.open();
                items::parse_name(p);
                p.advance(); // :
                expr_bp(p, 2);
                p.close(m, SyntaxKind::PROPERTY);
            } else {
                let m = p.open();
                items::parse_name(p);
                p.close(m, SyntaxKind::SHORTHAND_PROPERTY);
            }
        }
        _ => {
            // Leave fences to the object literal loop.
        }
    }
}

/// `name(params) { ... }`, `*name(params) { ... }`, `async name(params) {}`
fn parse_method_property(p: &mut Parser) {
    let m = p.open();
    p.eat(SyntaxKind::ASYNC_KW);
    p.eat(SyntaxKind::STAR);
    if p.at_name_like() {
        items::parse_name(p);
    } else {
        p.error("expected method name");
    }
    items::parse_param_list(p);
    if p.at(SyntaxKind::COLON) {
        items::parse_type_annotation(p);
    }
    if p.at(SyntaxKind::L_BRACE) {
        items::parse_block(p);
    } else {
        p.error("expected method body");
    }
    p.close(m, SyntaxKind::METHOD_PROPERTY);
}

/// `[a, b, ...c]`
fn parse_array_literal(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [
    while !p.at_any(&[SyntaxKind::R_BRACKET, SyntaxKind::EOF]) {
        let before = p.cursor();
        if p.at(SyntaxKind::DOT_DOT_DOT) {
            let s = p.open();
            p.advance();
            expr_bp(p, 2);
            p.close(s, SyntaxKind::SPREAD_PROPERTY);
        } else {
            expr_bp(p, 2);
        }
        if p.cursor() == before {
            p.advance_with_error("expected array element");
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACKET);
    p.close(m, SyntaxKind::ARRAY_LITERAL)
}

// ── Calls and functions ────────────────────────────────────────────────

/// `(arg, arg)` of a call expression.
fn parse_arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    while !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::EOF]) {
        let before = p.cursor();
        expr_bp(p, 2);
        if p.cursor() == before {
            p.advance_with_error("expected argument");
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::ARG_LIST);
}

/// `(params) => body`, `x => body`, `async (params) => body`
fn parse_arrow_fn(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.eat(SyntaxKind::ASYNC_KW);
    if p.at(SyntaxKind::L_PAREN) {
        items::parse_param_list(p);
        if p.at(SyntaxKind::COLON) {
            items::parse_type_annotation(p);
        }
    } else {
        // Single-identifier parameter without parentheses.
        let pl = p.open();
        let param = p.open();
        items::parse_name(p);
        p.close(param, SyntaxKind::PARAM);
        p.close(pl, SyntaxKind::PARAM_LIST);
    }
    p.expect(SyntaxKind::FAT_ARROW);
    if p.at(SyntaxKind::L_BRACE) {
        items::parse_block(p);
    } else {
        expr_bp(p, 1);
    }
    p.close(m, SyntaxKind::ARROW_FN)
}

/// `function (params) { ... }` / `function* name(params) { ... }` in
/// expression position.
fn parse_function_expr(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.eat(SyntaxKind::ASYNC_KW);
    p.expect(SyntaxKind::FUNCTION_KW);
    p.eat(SyntaxKind::STAR);
    if p.at(SyntaxKind::IDENT) {
        items::parse_name(p);
    }
    items::parse_param_list(p);
    if p.at(SyntaxKind::COLON) {
        items::parse_type_annotation(p);
    }
    if p.at(SyntaxKind::L_BRACE) {
        items::parse_block(p);
    } else {
        p.error("expected function body");
    }
    p.close(m, SyntaxKind::FUNCTION_EXPR)
}

/// Decide whether a `(` begins an arrow function's parameter list.
///
/// Scans ahead to the matching `)` and checks whether it is followed by
/// `=>`, or by a return-type annotation (`: T`) and then `=>`. The scan is
/// bounded so pathological input degrades to "not an arrow".
fn is_arrow_ahead(p: &Parser) -> bool {
    debug_assert!(p.at(SyntaxKind::L_PAREN));
    let mut i = 1usize;
    let mut depth = 1u32;
    while depth > 0 {
        match p.nth(i) {
            SyntaxKind::L_PAREN => depth += 1,
            SyntaxKind::R_PAREN => depth -= 1,
            SyntaxKind::EOF => return false,
            _ => {}
        }
        i += 1;
        if i > 200 {
            return false;
        }
    }
    match p.nth(i) {
        SyntaxKind::FAT_ARROW => true,
        SyntaxKind::COLON => {
            let mut j = i + 1;
            while j < i + 100 {
                match p.nth(j) {
                    SyntaxKind::FAT_ARROW => return true,
                    SyntaxKind::SEMICOLON
                    | SyntaxKind::COMMA
                    | SyntaxKind::R_BRACE
                    | SyntaxKind::R_PAREN
                    | SyntaxKind::EOF => return false,
                    _ => {}
                }
                j += 1;
            }
            false
        }
        _ => false,
    }
}
