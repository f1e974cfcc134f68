//! Lowering from type-annotation syntax to [`Ty`].
//!
//! Lowering is resolver-parameterized: during per-file analysis names
//! resolve through the declaration ASTs (with a cycle guard), and afterwards
//! through the finished name→type table. Anything outside the bounded subset
//! lowers to `Ty::Unknown`, which the matcher never diagnoses.

use flux_parser::ast::strip_quotes;
use flux_parser::ast::ty::TypeNode;
use flux_parser::syntax_kind::SyntaxKind;

use crate::ty::{ObjectTy, Prop, Ty};

/// Hard cap on lowering recursion through nested annotations and aliases.
pub(crate) const MAX_LOWER_DEPTH: u32 = 32;

/// Name resolution strategy for [`lower_type`].
pub(crate) trait ResolveName {
    /// Resolve a bare type name (`Todo`, `string`, ...).
    fn resolve(&mut self, name: &str, depth: u32) -> Ty;

    /// Resolve a dotted reference (`Status.Active`).
    fn resolve_qualified(&mut self, first: &str, second: &str) -> Ty;
}

/// Lower a type-annotation node to a [`Ty`].
pub(crate) fn lower_type(node: &TypeNode, resolver: &mut dyn ResolveName, depth: u32) -> Ty {
    if depth > MAX_LOWER_DEPTH {
        return Ty::Unknown;
    }
    match node {
        TypeNode::Object(obj) => {
            let props = obj
                .members()
                .filter_map(|member| {
                    let name = member.name()?.text();
                    let ty = member
                        .ty()
                        .map(|t| lower_type(&t, resolver, depth + 1))
                        .unwrap_or(Ty::Unknown);
                    Some(Prop {
                        name: strip_quotes(&name).to_string(),
                        ty,
                        optional: member.is_optional(),
                    })
                })
                .collect();
            Ty::Object(ObjectTy { props })
        }

        TypeNode::Union(union) => {
            let arms: Vec<Ty> = union
                .types()
                .map(|t| lower_type(&t, resolver, depth + 1))
                .collect();
            if arms.is_empty() {
                Ty::Unknown
            } else {
                Ty::Union(arms)
            }
        }

        TypeNode::Intersection(inter) => {
            let arms: Vec<Ty> = inter
                .types()
                .map(|t| lower_type(&t, resolver, depth + 1))
                .collect();
            if arms.is_empty() {
                Ty::Unknown
            } else {
                Ty::Intersection(arms)
            }
        }

        TypeNode::Array(arr) => {
            let element = arr
                .element()
                .map(|t| lower_type(&t, resolver, depth + 1))
                .unwrap_or(Ty::Unknown);
            Ty::Array(Box::new(element))
        }

        TypeNode::Paren(paren) => paren
            .inner()
            .map(|t| lower_type(&t, resolver, depth + 1))
            .unwrap_or(Ty::Unknown),

        TypeNode::Literal(lit) => match lit.token() {
            Some(token) => match token.kind() {
                SyntaxKind::STRING => {
                    Ty::StringLiteral(strip_quotes(token.text()).to_string())
                }
                SyntaxKind::NUMBER => Ty::NumberLiteral(token.text().to_string()),
                SyntaxKind::TRUE_KW => Ty::BooleanLiteral(true),
                SyntaxKind::FALSE_KW => Ty::BooleanLiteral(false),
                SyntaxKind::NULL_KW => Ty::Null,
                _ => Ty::Unknown,
            },
            None => Ty::Unknown,
        },

        TypeNode::Ref(reference) => {
            // Generic references (`Array<T>`) are outside the subset.
            if reference.has_type_args() {
                return Ty::Unknown;
            }
            let segments = reference.segments();
            match segments.as_slice() {
                [single] => match predefined(single) {
                    Some(ty) => ty,
                    None => resolver.resolve(single, depth),
                },
                [first, second] => resolver.resolve_qualified(first, second),
                _ => Ty::Unknown,
            }
        }
    }
}

/// Map TypeScript's predefined type names into the subset.
///
/// `object` maps to `Any` rather than an empty record: an empty record would
/// falsely flag every payload property as unknown.
fn predefined(name: &str) -> Option<Ty> {
    let ty = match name {
        "string" => Ty::String,
        "number" => Ty::Number,
        "boolean" => Ty::Boolean,
        "any" => Ty::Any,
        "object" => Ty::Any,
        "unknown" | "never" | "void" => Ty::Unknown,
        _ => return None,
    };
    Some(ty)
}
