//! Per-file semantic tables: declared type names, enums, the default
//! export, and literal-expression typing.
//!
//! `FileSemantics` is derived once per compiled file and stored inside the
//! program snapshot. It deliberately contains no syntax nodes -- only names,
//! lowered types, and byte spans -- so compiled units stay `Send + Sync`
//! behind `Arc` (syntax trees are re-derived from the green node on demand).

use rustc_hash::FxHashMap;

use flux_common::span::Span;
use flux_parser::ast::expr::{Expr, ObjectProp};
use flux_parser::ast::ty::TypeNode;
use flux_parser::{Parse, SyntaxNode};

use crate::lower::{lower_type, ResolveName, MAX_LOWER_DEPTH};
use crate::ty::{EnumTy, ObjectTy, Prop, Ty};

/// Information about a file's `export default` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultExportInfo {
    /// Span of the exported expression.
    pub span: Span,
    /// Whether the exported expression is an object literal (the only form
    /// model extraction accepts).
    pub is_object_literal: bool,
}

/// Semantic tables for one source file.
#[derive(Debug, Default)]
pub struct FileSemantics {
    /// Lowered named types: interfaces and type aliases.
    types: FxHashMap<String, Ty>,
    /// Declared enums by name.
    enums: FxHashMap<String, EnumTy>,
    /// The file's default export, if any.
    pub default_export: Option<DefaultExportInfo>,
}

impl FileSemantics {
    /// Analyze a parsed file: collect and lower its type declarations and
    /// record its default export.
    pub fn analyze(parse: &Parse) -> FileSemantics {
        let file = parse.tree();

        let mut enums: FxHashMap<String, EnumTy> = FxHashMap::default();
        for decl in file.enums() {
            let Some(name) = decl.name() else { continue };
            let members = decl
                .members()
                .filter_map(|m| m.name().map(|n| n.text()))
                .collect();
            let name = name.text();
            enums.insert(
                name.clone(),
                EnumTy {
                    name,
                    members,
                },
            );
        }

        let mut interfaces = FxHashMap::default();
        for decl in file.interfaces() {
            let (Some(name), Some(body)) = (decl.name(), decl.body()) else {
                continue;
            };
            interfaces.insert(name.text(), body);
        }

        let mut aliases = FxHashMap::default();
        for decl in file.type_aliases() {
            let (Some(name), Some(ty)) = (decl.name(), decl.ty()) else {
                continue;
            };
            aliases.insert(name.text(), ty);
        }

        let names: Vec<String> = interfaces
            .keys()
            .chain(aliases.keys())
            .cloned()
            .collect();

        let mut resolver = AstResolver {
            interfaces: &interfaces,
            aliases: &aliases,
            enums: &enums,
            visiting: Vec::new(),
        };
        let mut types = FxHashMap::default();
        for name in names {
            let ty = resolver.resolve(&name, 0);
            types.insert(name, ty);
        }

        let default_export = file.export_assign().and_then(|assign| {
            let expr = assign.expr()?;
            let range = expr.syntax().text_range();
            Some(DefaultExportInfo {
                span: Span::new(range.start().into(), range.end().into()),
                is_object_literal: matches!(expr, Expr::ObjectLiteral(_)),
            })
        });

        FileSemantics {
            types,
            enums,
            default_export,
        }
    }

    /// Look up a declared (and already lowered) type by name.
    pub fn named_type(&self, name: &str) -> Option<&Ty> {
        self.types.get(name)
    }

    /// Look up a declared enum by name.
    pub fn enum_def(&self, name: &str) -> Option<&EnumTy> {
        self.enums.get(name)
    }

    /// Lower a type-annotation node in this file's context.
    ///
    /// Names resolve through the finished tables, so this is cheap and
    /// usable long after analysis (e.g. when extracting handler payloads).
    pub fn lower(&self, node: &TypeNode) -> Ty {
        let mut resolver = TableResolver { semantics: self };
        lower_type(node, &mut resolver, 0)
    }

    /// Compute the narrow type of a literal expression.
    ///
    /// Only literal shapes produce information: string/number/boolean
    /// literals, object literals, and enum member accesses. Everything else
    /// is `Unknown` -- the bounded-subset rule that keeps the matcher from
    /// guessing about arbitrary expressions.
    pub fn type_of_expr(&self, expr: &Expr) -> Ty {
        match expr {
            Expr::Literal(lit) => {
                use flux_parser::ast::expr::LiteralKind;
                match lit.literal_kind() {
                    Some(LiteralKind::String) => Ty::StringLiteral(
                        flux_parser::ast::strip_quotes(&lit.text()).to_string(),
                    ),
                    Some(LiteralKind::Number) => Ty::NumberLiteral(lit.text()),
                    Some(LiteralKind::Bool) => Ty::BooleanLiteral(lit.text() == "true"),
                    Some(LiteralKind::Null) => Ty::Null,
                    Some(LiteralKind::Undefined) | None => Ty::Unknown,
                }
            }

            Expr::ObjectLiteral(obj) => {
                let mut props = Vec::new();
                for prop in obj.properties() {
                    match &prop {
                        ObjectProp::Assign(assign) => {
                            let Some(name) = assign.name() else { continue };
                            let ty = assign
                                .initializer()
                                .map(|init| self.type_of_expr(&init))
                                .unwrap_or(Ty::Unknown);
                            props.push(Prop {
                                name: flux_parser::ast::strip_quotes(&name.text())
                                    .to_string(),
                                ty,
                                optional: false,
                            });
                        }
                        ObjectProp::Shorthand(short) => {
                            let Some(name) = short.name() else { continue };
                            props.push(Prop {
                                name: name.text(),
                                ty: Ty::Unknown,
                                optional: false,
                            });
                        }
                        ObjectProp::Method(method) => {
                            let Some(name) = method.name() else { continue };
                            props.push(Prop {
                                name: name.text(),
                                ty: Ty::Unknown,
                                optional: false,
                            });
                        }
                        ObjectProp::Spread(_) => {}
                    }
                }
                Ty::Object(ObjectTy { props })
            }

            Expr::MemberExpr(member) => {
                let object = member.object();
                let member_name = member.member_token();
                if let (Some(Expr::NameRef(name_ref)), Some(member_token)) =
                    (object, member_name)
                {
                    if let Some(enum_def) = self.enums.get(&name_ref.text()) {
                        let member_text = member_token.text().to_string();
                        if enum_def.members.contains(&member_text) {
                            return Ty::EnumLiteral {
                                enum_name: enum_def.name.clone(),
                                member: member_text,
                            };
                        }
                    }
                }
                Ty::Unknown
            }

            Expr::ParenExpr(paren) => paren
                .inner()
                .map(|inner| self.type_of_expr(&inner))
                .unwrap_or(Ty::Unknown),

            _ => Ty::Unknown,
        }
    }
}

/// Resolve a node's text range as a [`Span`].
pub fn node_span(node: &SyntaxNode) -> Span {
    let range = node.text_range();
    Span::new(range.start().into(), range.end().into())
}

/// Analysis-time resolver: names resolve through declaration ASTs with a
/// cycle guard.
struct AstResolver<'a> {
    interfaces: &'a FxHashMap<String, flux_parser::ast::ty::ObjectType>,
    aliases: &'a FxHashMap<String, TypeNode>,
    enums: &'a FxHashMap<String, EnumTy>,
    visiting: Vec<String>,
}

impl ResolveName for AstResolver<'_> {
    fn resolve(&mut self, name: &str, depth: u32) -> Ty {
        if depth > MAX_LOWER_DEPTH || self.visiting.iter().any(|n| n == name) {
            return Ty::Unknown;
        }
        if let Some(body) = self.interfaces.get(name) {
            let node = TypeNode::Object(body.clone());
            self.visiting.push(name.to_string());
            let ty = lower_type(&node, self, depth + 1);
            self.visiting.pop();
            return ty;
        }
        if let Some(alias) = self.aliases.get(name) {
            let node = alias.clone();
            self.visiting.push(name.to_string());
            let ty = lower_type(&node, self, depth + 1);
            self.visiting.pop();
            return ty;
        }
        if let Some(enum_def) = self.enums.get(name) {
            return Ty::Enum(enum_def.clone());
        }
        Ty::Unknown
    }

    fn resolve_qualified(&mut self, first: &str, second: &str) -> Ty {
        resolve_enum_member(self.enums, first, second)
    }
}

/// Post-analysis resolver: names resolve through the finished tables.
struct TableResolver<'a> {
    semantics: &'a FileSemantics,
}

impl ResolveName for TableResolver<'_> {
    fn resolve(&mut self, name: &str, _depth: u32) -> Ty {
        if let Some(ty) = self.semantics.types.get(name) {
            return ty.clone();
        }
        if let Some(enum_def) = self.semantics.enums.get(name) {
            return Ty::Enum(enum_def.clone());
        }
        Ty::Unknown
    }

    fn resolve_qualified(&mut self, first: &str, second: &str) -> Ty {
        resolve_enum_member(&self.semantics.enums, first, second)
    }
}

fn resolve_enum_member(enums: &FxHashMap<String, EnumTy>, first: &str, second: &str) -> Ty {
    match enums.get(first) {
        Some(enum_def) if enum_def.members.iter().any(|m| m == second) => Ty::EnumLiteral {
            enum_name: enum_def.name.clone(),
            member: second.to_string(),
        },
        _ => Ty::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_parser::ast::AstNode;

    fn analyze(source: &str) -> (Parse, FileSemantics) {
        let parse = flux_parser::parse(source);
        let semantics = FileSemantics::analyze(&parse);
        (parse, semantics)
    }

    #[test]
    fn interface_lowers_to_object() {
        let (_parse, sem) = analyze("interface Todo { id: number; label?: string }");
        let ty = sem.named_type("Todo").expect("Todo");
        assert_eq!(ty.to_string(), "{id: number, label?: string}");
    }

    #[test]
    fn alias_resolves_through_interface() {
        let (_parse, sem) = analyze(
            "interface Todo { id: number }\ntype Payload = Todo | null;",
        );
        let ty = sem.named_type("Payload").expect("Payload");
        assert_eq!(ty.to_string(), "{id: number} | null");
    }

    #[test]
    fn recursive_alias_does_not_loop() {
        let (_parse, sem) = analyze("type A = B;\ntype B = A;");
        // Cycle-guarded lowering resolves to unknown instead of diverging.
        assert_eq!(sem.named_type("A"), Some(&Ty::Unknown));
    }

    #[test]
    fn enum_members_recorded() {
        let (_parse, sem) = analyze("enum Status { Active, Done }");
        let def = sem.enum_def("Status").expect("Status");
        assert_eq!(def.members, vec!["Active", "Done"]);
    }

    #[test]
    fn default_export_info() {
        let (_parse, sem) = analyze("export default { namespace: 'app' };");
        let info = sem.default_export.as_ref().expect("default export");
        assert!(info.is_object_literal);

        let (_parse, sem) = analyze("export default 42;");
        let info = sem.default_export.as_ref().expect("default export");
        assert!(!info.is_object_literal);
    }

    #[test]
    fn type_of_string_literal() {
        let (parse, sem) = analyze("x = 'app/add';");
        let expr = parse
            .syntax()
            .descendants()
            .find_map(flux_parser::ast::expr::Literal::cast)
            .map(Expr::Literal)
            .unwrap();
        assert_eq!(
            sem.type_of_expr(&expr),
            Ty::StringLiteral("app/add".into())
        );
    }

    #[test]
    fn type_of_object_literal() {
        let (parse, sem) = analyze("x = { id: 1, label: 'a' };");
        let expr = parse
            .syntax()
            .descendants()
            .find_map(flux_parser::ast::expr::ObjectLiteral::cast)
            .map(Expr::ObjectLiteral)
            .unwrap();
        let ty = sem.type_of_expr(&expr);
        assert_eq!(ty.to_string(), "{id: 1, label: 'a'}");
    }

    #[test]
    fn type_of_enum_member_access() {
        let (parse, sem) = analyze("enum Status { Active }\nx = Status.Active;");
        let expr = parse
            .syntax()
            .descendants()
            .find_map(flux_parser::ast::expr::MemberExpr::cast)
            .map(Expr::MemberExpr)
            .unwrap();
        assert_eq!(
            sem.type_of_expr(&expr),
            Ty::EnumLiteral {
                enum_name: "Status".into(),
                member: "Active".into()
            }
        );
    }

    #[test]
    fn parameter_annotation_lowering_via_tables() {
        let source = "interface Todo { id: number }\nfunction f(a: { payload: Todo }) {}";
        let (parse, sem) = analyze(source);
        let annotation = parse
            .syntax()
            .descendants()
            .find_map(flux_parser::ast::item::TypeAnnotation::cast)
            .expect("annotation");
        let ty = sem.lower(&annotation.ty().unwrap());
        assert_eq!(ty.to_string(), "{payload: {id: number}}");
    }
}
