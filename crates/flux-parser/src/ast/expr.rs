//! Typed AST nodes for expressions.
//!
//! The dispatch analysis lives entirely in expression territory: call
//! expressions, member chains, object literals and their properties, and
//! the literal leaves inside payloads.

use crate::ast::{ast_node, child_node, first_significant_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

use super::item::{Block, Name, ParamList};

/// Any expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    ObjectLiteral(ObjectLiteral),
    ArrayLiteral(ArrayLiteral),
    Literal(Literal),
    NameRef(NameRef),
    MemberExpr(MemberExpr),
    IndexExpr(IndexExpr),
    CallExpr(CallExpr),
    ParenExpr(ParenExpr),
    ArrowFn(ArrowFn),
    FunctionExpr(FunctionExpr),
    NewExpr(NewExpr),
    AwaitExpr(AwaitExpr),
    YieldExpr(YieldExpr),
    PrefixExpr(PrefixExpr),
    BinaryExpr(BinaryExpr),
    AssignExpr(AssignExpr),
    ConditionalExpr(ConditionalExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::OBJECT_LITERAL => Expr::ObjectLiteral(ObjectLiteral { syntax: node }),
            SyntaxKind::ARRAY_LITERAL => Expr::ArrayLiteral(ArrayLiteral { syntax: node }),
            SyntaxKind::LITERAL => Expr::Literal(Literal { syntax: node }),
            SyntaxKind::NAME_REF => Expr::NameRef(NameRef { syntax: node }),
            SyntaxKind::MEMBER_EXPR => Expr::MemberExpr(MemberExpr { syntax: node }),
            SyntaxKind::INDEX_EXPR => Expr::IndexExpr(IndexExpr { syntax: node }),
            SyntaxKind::CALL_EXPR => Expr::CallExpr(CallExpr { syntax: node }),
            SyntaxKind::PAREN_EXPR => Expr::ParenExpr(ParenExpr { syntax: node }),
            SyntaxKind::ARROW_FN => Expr::ArrowFn(ArrowFn { syntax: node }),
            SyntaxKind::FUNCTION_EXPR => Expr::FunctionExpr(FunctionExpr { syntax: node }),
            SyntaxKind::NEW_EXPR => Expr::NewExpr(NewExpr { syntax: node }),
            SyntaxKind::AWAIT_EXPR => Expr::AwaitExpr(AwaitExpr { syntax: node }),
            SyntaxKind::YIELD_EXPR => Expr::YieldExpr(YieldExpr { syntax: node }),
            SyntaxKind::PREFIX_EXPR => Expr::PrefixExpr(PrefixExpr { syntax: node }),
            SyntaxKind::BINARY_EXPR => Expr::BinaryExpr(BinaryExpr { syntax: node }),
            SyntaxKind::ASSIGN_EXPR => Expr::AssignExpr(AssignExpr { syntax: node }),
            SyntaxKind::CONDITIONAL_EXPR => {
                Expr::ConditionalExpr(ConditionalExpr { syntax: node })
            }
            _ => return None,
        };
        Some(expr)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::ObjectLiteral(e) => e.syntax(),
            Expr::ArrayLiteral(e) => e.syntax(),
            Expr::Literal(e) => e.syntax(),
            Expr::NameRef(e) => e.syntax(),
            Expr::MemberExpr(e) => e.syntax(),
            Expr::IndexExpr(e) => e.syntax(),
            Expr::CallExpr(e) => e.syntax(),
            Expr::ParenExpr(e) => e.syntax(),
            Expr::ArrowFn(e) => e.syntax(),
            Expr::FunctionExpr(e) => e.syntax(),
            Expr::NewExpr(e) => e.syntax(),
            Expr::AwaitExpr(e) => e.syntax(),
            Expr::YieldExpr(e) => e.syntax(),
            Expr::PrefixExpr(e) => e.syntax(),
            Expr::BinaryExpr(e) => e.syntax(),
            Expr::AssignExpr(e) => e.syntax(),
            Expr::ConditionalExpr(e) => e.syntax(),
        }
    }
}

// ── Object literals ──────────────────────────────────────────────────────

ast_node!(ObjectLiteral, OBJECT_LITERAL);

impl ObjectLiteral {
    /// All properties of the literal, in source order.
    pub fn properties(&self) -> impl Iterator<Item = ObjectProp> + '_ {
        self.syntax.children().filter_map(ObjectProp::cast)
    }

    /// Find a property by its raw name text (`type`, `payload`, ...).
    ///
    /// Raw-text comparison mirrors how property names are matched throughout
    /// the analysis: a quoted property name does not match a bare one.
    pub fn prop(&self, name: &str) -> Option<ObjectProp> {
        self.properties().find(|p| p.name_text().as_deref() == Some(name))
    }
}

/// One property of an object literal.
#[derive(Debug, Clone)]
pub enum ObjectProp {
    /// `name: expr`
    Assign(Property),
    /// `name`
    Shorthand(ShorthandProperty),
    /// `name() {}` / `*name() {}` / `async name() {}`
    Method(MethodProperty),
    /// `...expr`
    Spread(SpreadProperty),
}

impl ObjectProp {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::PROPERTY => Some(ObjectProp::Assign(Property { syntax: node })),
            SyntaxKind::SHORTHAND_PROPERTY => {
                Some(ObjectProp::Shorthand(ShorthandProperty { syntax: node }))
            }
            SyntaxKind::METHOD_PROPERTY => {
                Some(ObjectProp::Method(MethodProperty { syntax: node }))
            }
            SyntaxKind::SPREAD_PROPERTY => {
                Some(ObjectProp::Spread(SpreadProperty { syntax: node }))
            }
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            ObjectProp::Assign(p) => p.syntax(),
            ObjectProp::Shorthand(p) => p.syntax(),
            ObjectProp::Method(p) => p.syntax(),
            ObjectProp::Spread(p) => p.syntax(),
        }
    }

    /// The property's raw name text, if it has one.
    pub fn name_text(&self) -> Option<String> {
        match self {
            ObjectProp::Assign(p) => p.name().map(|n| n.text()),
            ObjectProp::Shorthand(p) => p.name().map(|n| n.text()),
            ObjectProp::Method(p) => p.name().map(|n| n.text()),
            ObjectProp::Spread(_) => None,
        }
    }
}

ast_node!(Property, PROPERTY);

impl Property {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// The value expression after the colon.
    pub fn initializer(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ShorthandProperty, SHORTHAND_PROPERTY);

impl ShorthandProperty {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }
}

ast_node!(MethodProperty, METHOD_PROPERTY);

impl MethodProperty {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }

    /// Whether this is a generator method (`*save() {}`), the form effects
    /// conventionally use.
    pub fn is_generator(&self) -> bool {
        super::child_token(&self.syntax, SyntaxKind::STAR).is_some()
    }
}

ast_node!(SpreadProperty, SPREAD_PROPERTY);

// ── Other expression forms ───────────────────────────────────────────────

ast_node!(ArrayLiteral, ARRAY_LITERAL);

ast_node!(Literal, LITERAL);

/// The category of a literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Bool,
    Null,
    Undefined,
}

impl Literal {
    /// The literal's token.
    pub fn token(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }

    /// The literal's raw source text (string literals keep their quotes).
    pub fn text(&self) -> String {
        self.token().map(|t| t.text().to_string()).unwrap_or_default()
    }

    pub fn literal_kind(&self) -> Option<LiteralKind> {
        let kind = match self.token()?.kind() {
            SyntaxKind::STRING => LiteralKind::String,
            SyntaxKind::NUMBER => LiteralKind::Number,
            SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => LiteralKind::Bool,
            SyntaxKind::NULL_KW => LiteralKind::Null,
            SyntaxKind::UNDEFINED_KW => LiteralKind::Undefined,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_string(&self) -> bool {
        self.literal_kind() == Some(LiteralKind::String)
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> String {
        first_significant_token(&self.syntax)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}

ast_node!(MemberExpr, MEMBER_EXPR);

impl MemberExpr {
    /// The expression being accessed (`a` in `a.b`).
    pub fn object(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    /// The accessed member's token (`b` in `a.b`).
    pub fn member_token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind().is_name_like())
            .last()
    }
}

ast_node!(IndexExpr, INDEX_EXPR);

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    /// The callee node (everything before the argument list).
    pub fn callee(&self) -> Option<SyntaxNode> {
        self.syntax
            .children()
            .find(|n| n.kind() != SyntaxKind::ARG_LIST)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }

    /// The call's arguments, in order.
    pub fn args(&self) -> Vec<Expr> {
        self.arg_list()
            .map(|list| list.args().collect())
            .unwrap_or_default()
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ArrowFn, ARROW_FN);

impl ArrowFn {
    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }
}

ast_node!(FunctionExpr, FUNCTION_EXPR);

impl FunctionExpr {
    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }
}

ast_node!(NewExpr, NEW_EXPR);
ast_node!(AwaitExpr, AWAIT_EXPR);
ast_node!(YieldExpr, YIELD_EXPR);
ast_node!(PrefixExpr, PREFIX_EXPR);
ast_node!(BinaryExpr, BINARY_EXPR);
ast_node!(AssignExpr, ASSIGN_EXPR);
ast_node!(ConditionalExpr, CONDITIONAL_EXPR);
