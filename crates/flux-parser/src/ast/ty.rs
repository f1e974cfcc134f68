//! Typed AST nodes for type annotations.

use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

use super::item::Name;

/// Any type-annotation node.
#[derive(Debug, Clone)]
pub enum TypeNode {
    Object(ObjectType),
    Union(UnionType),
    Intersection(IntersectionType),
    Array(ArrayType),
    Paren(ParenType),
    Literal(LiteralType),
    Ref(TypeRef),
}

impl TypeNode {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let ty = match node.kind() {
            SyntaxKind::OBJECT_TYPE => TypeNode::Object(ObjectType { syntax: node }),
            SyntaxKind::UNION_TYPE => TypeNode::Union(UnionType { syntax: node }),
            SyntaxKind::INTERSECTION_TYPE => {
                TypeNode::Intersection(IntersectionType { syntax: node })
            }
            SyntaxKind::ARRAY_TYPE => TypeNode::Array(ArrayType { syntax: node }),
            SyntaxKind::PAREN_TYPE => TypeNode::Paren(ParenType { syntax: node }),
            SyntaxKind::LITERAL_TYPE => TypeNode::Literal(LiteralType { syntax: node }),
            SyntaxKind::TYPE_REF => TypeNode::Ref(TypeRef { syntax: node }),
            _ => return None,
        };
        Some(ty)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            TypeNode::Object(t) => t.syntax(),
            TypeNode::Union(t) => t.syntax(),
            TypeNode::Intersection(t) => t.syntax(),
            TypeNode::Array(t) => t.syntax(),
            TypeNode::Paren(t) => t.syntax(),
            TypeNode::Literal(t) => t.syntax(),
            TypeNode::Ref(t) => t.syntax(),
        }
    }
}

ast_node!(ObjectType, OBJECT_TYPE);

impl ObjectType {
    pub fn members(&self) -> impl Iterator<Item = TypeMember> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(TypeMember, TYPE_MEMBER);

impl TypeMember {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    /// Whether the member is optional (`b?: T`).
    pub fn is_optional(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::QUESTION).is_some()
    }

    pub fn ty(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

ast_node!(UnionType, UNION_TYPE);

impl UnionType {
    pub fn types(&self) -> impl Iterator<Item = TypeNode> + '_ {
        self.syntax.children().filter_map(TypeNode::cast)
    }
}

ast_node!(IntersectionType, INTERSECTION_TYPE);

impl IntersectionType {
    pub fn types(&self) -> impl Iterator<Item = TypeNode> + '_ {
        self.syntax.children().filter_map(TypeNode::cast)
    }
}

ast_node!(ArrayType, ARRAY_TYPE);

impl ArrayType {
    pub fn element(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

ast_node!(ParenType, PAREN_TYPE);

impl ParenType {
    pub fn inner(&self) -> Option<TypeNode> {
        self.syntax.children().find_map(TypeNode::cast)
    }
}

ast_node!(LiteralType, LITERAL_TYPE);

impl LiteralType {
    pub fn token(&self) -> Option<SyntaxToken> {
        super::first_significant_token(&self.syntax)
    }
}

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    /// The dotted identifier segments (`E.A` → `["E", "A"]`).
    pub fn segments(&self) -> Vec<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .collect()
    }

    /// Whether the reference carries generic arguments (`Array<T>`).
    pub fn has_type_args(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::LT).is_some()
    }
}
