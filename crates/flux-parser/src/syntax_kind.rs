//! SyntaxKind enum for the flux CST.
//!
//! This is a superset of `TokenKind` (mapped to SCREAMING_SNAKE_CASE) plus
//! composite node kinds for CST nodes produced by the parser.

use flux_common::token::TokenKind;

/// Every kind of syntax element in the flux CST.
///
/// Token kinds (leaves) are mapped 1:1 from [`TokenKind`]. Composite node
/// kinds represent parser-produced tree nodes. The first two values are
/// sentinels used by the event-based parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for incomplete/unfinished parser events.
    TOMBSTONE = 0,
    /// Wrapper for tokens/nodes that couldn't be parsed.
    ERROR_NODE = 1,

    // ── Keywords ───────────────────────────────────────────────────────
    IMPORT_KW,
    EXPORT_KW,
    DEFAULT_KW,
    FROM_KW,
    CONST_KW,
    LET_KW,
    VAR_KW,
    FUNCTION_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    INTERFACE_KW,
    TYPE_KW,
    ENUM_KW,
    THIS_KW,
    NEW_KW,
    YIELD_KW,
    ASYNC_KW,
    AWAIT_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    UNDEFINED_KW,

    // ── Operators ──────────────────────────────────────────────────────
    EQ,
    EQ_EQ,
    EQ_EQ_EQ,
    NOT_EQ,
    NOT_EQ_EQ,
    LT,
    GT,
    LT_EQ,
    GT_EQ,
    AMP_AMP,
    PIPE_PIPE,
    AMP,
    BAR,
    BANG,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    QUESTION,
    FAT_ARROW,
    DOT_DOT_DOT,

    // ── Delimiters ─────────────────────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,

    // ── Punctuation ────────────────────────────────────────────────────
    COMMA,
    DOT,
    COLON,
    SEMICOLON,

    // ── Literals, identifiers, trivia ──────────────────────────────────
    STRING,
    NUMBER,
    IDENT,
    WHITESPACE,
    COMMENT,

    // ── Special ────────────────────────────────────────────────────────
    EOF,
    /// Lexer error token.
    ERROR,

    // ── Composite node kinds ───────────────────────────────────────────
    /// Root node of a parsed source file.
    SOURCE_FILE,
    /// `import { a } from './b';` or `import './b';`
    IMPORT_DECL,
    /// The clause between `import` and `from` (unstructured).
    IMPORT_CLAUSE,
    /// Export assignment: `export default <expr>;`
    EXPORT_ASSIGN,
    /// `export` wrapping another declaration.
    EXPORT_DECL,
    /// `const x: T = expr;` (also let/var)
    VAR_DECL,
    /// `function name(params) { ... }` (incl. `function*`)
    FUNCTION_DECL,
    /// `interface Name { members }`
    INTERFACE_DECL,
    /// `type Name = T;`
    TYPE_ALIAS_DECL,
    /// `enum Name { A, B = 1 }`
    ENUM_DECL,
    /// One member of an enum declaration.
    ENUM_MEMBER,
    /// `{ statements }`
    BLOCK,
    /// `return expr;`
    RETURN_STMT,
    /// `if (cond) ... else ...`
    IF_STMT,
    /// Expression statement.
    EXPR_STMT,
    /// Declared name (wraps the name token of a declaration or property).
    NAME,
    /// Reference to a name in expression position (also `this`).
    NAME_REF,
    /// `(a, b: T, { c }?: U = d)`
    PARAM_LIST,
    /// One parameter.
    PARAM,
    /// Destructuring pattern in parameter position: `{ payload }`.
    OBJECT_PATTERN,
    /// `: T` attached to a parameter, variable, or return position.
    TYPE_ANNOTATION,
    /// `{ a: T; b?: U }`
    OBJECT_TYPE,
    /// One member of an object type or interface body.
    TYPE_MEMBER,
    /// `A | B`
    UNION_TYPE,
    /// `A & B`
    INTERSECTION_TYPE,
    /// `T[]`
    ARRAY_TYPE,
    /// `(T)`
    PAREN_TYPE,
    /// `'x'`, `42`, `true` in type position.
    LITERAL_TYPE,
    /// `Name` or `Name.Member` in type position.
    TYPE_REF,
    /// `{ a: 1, b }` in expression position.
    OBJECT_LITERAL,
    /// `a: expr` property assignment.
    PROPERTY,
    /// `{ a }` shorthand property.
    SHORTHAND_PROPERTY,
    /// `name(params) { ... }` or `*name(params) { ... }` method property.
    METHOD_PROPERTY,
    /// `...expr` in an object or array literal.
    SPREAD_PROPERTY,
    /// `[1, 2]`
    ARRAY_LITERAL,
    /// String/number/boolean/null/undefined literal.
    LITERAL,
    /// `a.b`
    MEMBER_EXPR,
    /// `a[b]`
    INDEX_EXPR,
    /// `f(args)`
    CALL_EXPR,
    /// `(args)` of a call.
    ARG_LIST,
    /// `(expr)`
    PAREN_EXPR,
    /// `(params) => body` or `x => body`
    ARROW_FN,
    /// `function (params) { ... }` in expression position.
    FUNCTION_EXPR,
    /// `new Expr(...)`
    NEW_EXPR,
    /// `await expr`
    AWAIT_EXPR,
    /// `yield expr` / `yield* expr`
    YIELD_EXPR,
    /// `!x`, `-x`, `+x`
    PREFIX_EXPR,
    /// `a + b`, `a === b`, ...
    BINARY_EXPR,
    /// `a = b`
    ASSIGN_EXPR,
    /// `a ? b : c`
    CONDITIONAL_EXPR,
}

impl SyntaxKind {
    /// Whether this kind is trivia (whitespace or comment).
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::WHITESPACE | SyntaxKind::COMMENT)
    }

    /// Whether this kind is a keyword token.
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::IMPORT_KW as u16)
            && (self as u16) <= (SyntaxKind::UNDEFINED_KW as u16)
    }

    /// Whether this kind can serve as a property or member name.
    ///
    /// Keywords are valid property names in this subset (`type:` being the
    /// most important case), as are string and number literals.
    pub fn is_name_like(self) -> bool {
        self == SyntaxKind::IDENT
            || self == SyntaxKind::STRING
            || self == SyntaxKind::NUMBER
            || self.is_keyword()
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Import => SyntaxKind::IMPORT_KW,
            TokenKind::Export => SyntaxKind::EXPORT_KW,
            TokenKind::Default => SyntaxKind::DEFAULT_KW,
            TokenKind::From => SyntaxKind::FROM_KW,
            TokenKind::Const => SyntaxKind::CONST_KW,
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::Var => SyntaxKind::VAR_KW,
            TokenKind::Function => SyntaxKind::FUNCTION_KW,
            TokenKind::Return => SyntaxKind::RETURN_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::Interface => SyntaxKind::INTERFACE_KW,
            TokenKind::Type => SyntaxKind::TYPE_KW,
            TokenKind::Enum => SyntaxKind::ENUM_KW,
            TokenKind::ThisKw => SyntaxKind::THIS_KW,
            TokenKind::New => SyntaxKind::NEW_KW,
            TokenKind::Yield => SyntaxKind::YIELD_KW,
            TokenKind::Async => SyntaxKind::ASYNC_KW,
            TokenKind::Await => SyntaxKind::AWAIT_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Null => SyntaxKind::NULL_KW,
            TokenKind::Undefined => SyntaxKind::UNDEFINED_KW,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::EqEqEq => SyntaxKind::EQ_EQ_EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::NotEqEq => SyntaxKind::NOT_EQ_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::AmpAmp => SyntaxKind::AMP_AMP,
            TokenKind::PipePipe => SyntaxKind::PIPE_PIPE,
            TokenKind::Amp => SyntaxKind::AMP,
            TokenKind::Bar => SyntaxKind::BAR,
            TokenKind::Bang => SyntaxKind::BANG,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::Question => SyntaxKind::QUESTION,
            TokenKind::FatArrow => SyntaxKind::FAT_ARROW,
            TokenKind::DotDotDot => SyntaxKind::DOT_DOT_DOT,
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            TokenKind::String => SyntaxKind::STRING,
            TokenKind::Number => SyntaxKind::NUMBER,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}
