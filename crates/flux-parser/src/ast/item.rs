//! Typed AST nodes for declarations and statements.
//!
//! Covers: SourceFile, ImportDecl, ExportAssign, ExportDecl, VarDecl,
//! FunctionDecl, InterfaceDecl, TypeAliasDecl, EnumDecl, EnumMember, Name,
//! ParamList, Param, ObjectPattern, TypeAnnotation, Block.

use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

use super::expr::Expr;
use super::ty::{ObjectType, TypeNode};

// ── Source File ──────────────────────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    /// All top-level items in the source file.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.syntax.children().filter_map(Item::cast)
    }

    /// The `export default <expr>` assignment, if present.
    ///
    /// Model files are required to use this export form.
    pub fn export_assign(&self) -> Option<ExportAssign> {
        child_node(&self.syntax)
    }

    /// All interface declarations, including `export`-wrapped ones.
    pub fn interfaces(&self) -> Vec<InterfaceDecl> {
        self.declarations()
    }

    /// All type alias declarations, including `export`-wrapped ones.
    pub fn type_aliases(&self) -> Vec<TypeAliasDecl> {
        self.declarations()
    }

    /// All enum declarations, including `export`-wrapped ones.
    pub fn enums(&self) -> Vec<EnumDecl> {
        self.declarations()
    }

    /// Collect declarations of a given type from the top level, looking
    /// through `export` wrappers.
    fn declarations<N: AstNode>(&self) -> Vec<N> {
        let mut out = Vec::new();
        for child in self.syntax.children() {
            if child.kind() == SyntaxKind::EXPORT_DECL {
                if let Some(n) = child_node(&child) {
                    out.push(n);
                }
            } else if let Some(n) = N::cast(child) {
                out.push(n);
            }
        }
        out
    }
}

// ── Item enum ────────────────────────────────────────────────────────────

/// Any top-level statement or declaration.
#[derive(Debug, Clone)]
pub enum Item {
    ImportDecl(ImportDecl),
    ExportAssign(ExportAssign),
    ExportDecl(ExportDecl),
    VarDecl(VarDecl),
    FunctionDecl(FunctionDecl),
    InterfaceDecl(InterfaceDecl),
    TypeAliasDecl(TypeAliasDecl),
    EnumDecl(EnumDecl),
}

impl Item {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::IMPORT_DECL => Some(Item::ImportDecl(ImportDecl { syntax: node })),
            SyntaxKind::EXPORT_ASSIGN => Some(Item::ExportAssign(ExportAssign { syntax: node })),
            SyntaxKind::EXPORT_DECL => Some(Item::ExportDecl(ExportDecl { syntax: node })),
            SyntaxKind::VAR_DECL => Some(Item::VarDecl(VarDecl { syntax: node })),
            SyntaxKind::FUNCTION_DECL => {
                Some(Item::FunctionDecl(FunctionDecl { syntax: node }))
            }
            SyntaxKind::INTERFACE_DECL => {
                Some(Item::InterfaceDecl(InterfaceDecl { syntax: node }))
            }
            SyntaxKind::TYPE_ALIAS_DECL => {
                Some(Item::TypeAliasDecl(TypeAliasDecl { syntax: node }))
            }
            SyntaxKind::ENUM_DECL => Some(Item::EnumDecl(EnumDecl { syntax: node })),
            _ => None,
        }
    }
}

// ── Imports and exports ──────────────────────────────────────────────────

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    /// The module specifier string token, quotes included.
    pub fn module_specifier(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::STRING)
    }
}

ast_node!(ExportAssign, EXPORT_ASSIGN);

impl ExportAssign {
    /// The exported expression.
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ExportDecl, EXPORT_DECL);

impl ExportDecl {
    /// The wrapped declaration.
    pub fn decl(&self) -> Option<Item> {
        self.syntax.children().find_map(Item::cast)
    }
}

// ── Declarations ─────────────────────────────────────────────────────────

ast_node!(VarDecl, VAR_DECL);

impl VarDecl {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(FunctionDecl, FUNCTION_DECL);

impl FunctionDecl {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }

    /// Whether this is a generator (`function*`).
    pub fn is_generator(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::STAR).is_some()
    }
}

ast_node!(InterfaceDecl, INTERFACE_DECL);

impl InterfaceDecl {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<ObjectType> {
        child_node(&self.syntax)
    }
}

ast_node!(TypeAliasDecl, TYPE_ALIAS_DECL);

impl TypeAliasDecl {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn ty(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

ast_node!(EnumDecl, ENUM_DECL);

impl EnumDecl {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = EnumMember> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(EnumMember, ENUM_MEMBER);

impl EnumMember {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// The initializer token (`= 'x'` / `= 1`), if present.
    pub fn value_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::STRING)
            .or_else(|| child_token(&self.syntax, SyntaxKind::NUMBER))
    }
}

// ── Names ────────────────────────────────────────────────────────────────

ast_node!(Name, NAME);

impl Name {
    /// The raw text of the name token (string-literal names keep quotes).
    pub fn text(&self) -> String {
        super::first_significant_token(&self.syntax)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}

// ── Parameters ───────────────────────────────────────────────────────────

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        child_nodes(&self.syntax)
    }

    /// The parameter at the given index, if present.
    pub fn param(&self, index: usize) -> Option<Param> {
        self.params().nth(index)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn pattern(&self) -> Option<ObjectPattern> {
        child_node(&self.syntax)
    }

    /// Whether the parameter is declared optional (`x?: T`).
    pub fn is_optional(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::QUESTION).is_some()
    }

    pub fn annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    /// Whether the parameter has a default value (`x = 1`).
    pub fn has_default(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::EQ).is_some()
    }
}

ast_node!(ObjectPattern, OBJECT_PATTERN);

ast_node!(TypeAnnotation, TYPE_ANNOTATION);

impl TypeAnnotation {
    pub fn ty(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

ast_node!(Block, BLOCK);
