//! Type-annotation parsing for the flux TypeScript subset.
//!
//! Grammar, loosest first: union (`A | B`) over intersection (`A & B`) over
//! postfix (`T[]`) over primary (object type, parenthesized, literal type,
//! type reference). Generic argument lists on references are consumed flat;
//! the bounded type model does not interpret them.

use crate::syntax_kind::SyntaxKind;

use super::{items, MarkClosed, Parser};

/// Parse a type at the union level.
pub(crate) fn parse_type(p: &mut Parser) -> Option<MarkClosed> {
    // TypeScript permits a leading `|` before the first union member.
    p.eat(SyntaxKind::BAR);
    let first = parse_intersection_type(p)?;
    if p.at(SyntaxKind::BAR) {
        let m = p.open_before(first);
        while p.eat(SyntaxKind::BAR) {
            if parse_intersection_type(p).is_none() {
                break;
            }
        }
        return Some(p.close(m, SyntaxKind::UNION_TYPE));
    }
    Some(first)
}

fn parse_intersection_type(p: &mut Parser) -> Option<MarkClosed> {
    let first = parse_postfix_type(p)?;
    if p.at(SyntaxKind::AMP) {
        let m = p.open_before(first);
        while p.eat(SyntaxKind::AMP) {
            if parse_postfix_type(p).is_none() {
                break;
            }
        }
        return Some(p.close(m, SyntaxKind::INTERSECTION_TYPE));
    }
    Some(first)
}

fn parse_postfix_type(p: &mut Parser) -> Option<MarkClosed> {
    let mut ty = parse_primary_type(p)?;
    while p.at(SyntaxKind::L_BRACKET) && p.nth(1) == SyntaxKind::R_BRACKET {
        let m = p.open_before(ty);
        p.advance(); // [
        p.advance(); // ]
        ty = p.close(m, SyntaxKind::ARRAY_TYPE);
    }
    Some(ty)
}

fn parse_primary_type(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::L_BRACE => Some(parse_object_type(p)),

        SyntaxKind::L_PAREN => {
            let m = p.open();
            p.advance(); // (
            parse_type(p);
            p.expect(SyntaxKind::R_PAREN);
            Some(p.close(m, SyntaxKind::PAREN_TYPE))
        }

        SyntaxKind::STRING
        | SyntaxKind::NUMBER
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NULL_KW
        | SyntaxKind::UNDEFINED_KW => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL_TYPE))
        }

        SyntaxKind::IDENT => {
            let m = p.open();
            p.advance();
            // Qualified reference: `Enum.Member`.
            while p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
                p.advance(); // .
                p.advance(); // ident
            }
            // Generic arguments are consumed flat: `Array<number>`.
            if p.at(SyntaxKind::LT) {
                let mut depth = 1u32;
                p.advance();
                while depth > 0 && !p.at(SyntaxKind::EOF) {
                    match p.current() {
                        SyntaxKind::LT => depth += 1,
                        SyntaxKind::GT => depth -= 1,
                        // A generic list never crosses these fences; bail so
                        // a stray `<` comparison cannot eat the file.
                        SyntaxKind::SEMICOLON | SyntaxKind::R_BRACE => break,
                        _ => {}
                    }
                    p.advance();
                }
            }
            Some(p.close(m, SyntaxKind::TYPE_REF))
        }

        _ => {
            p.error("expected type");
            None
        }
    }
}

/// `{ a: T; b?: U }` -- also used for interface bodies.
pub(crate) fn parse_object_type(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.expect(SyntaxKind::L_BRACE);
    while !p.at_any(&[SyntaxKind::R_BRACE, SyntaxKind::EOF]) {
        let before = p.cursor();
        parse_type_member(p);
        if p.cursor() == before {
            p.advance_with_error("expected type member");
        }
        // Members may be separated by `;`, `,`, or nothing.
        while p.eat(SyntaxKind::SEMICOLON) || p.eat(SyntaxKind::COMMA) {}
    }
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::OBJECT_TYPE)
}

fn parse_type_member(p: &mut Parser) {
    if !p.at_name_like() {
        return;
    }
    let m = p.open();
    items::parse_name(p);
    p.eat(SyntaxKind::QUESTION);
    if p.expect(SyntaxKind::COLON) {
        parse_type(p);
    }
    p.close(m, SyntaxKind::TYPE_MEMBER);
}
