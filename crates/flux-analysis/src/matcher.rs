//! Structural type matcher.
//!
//! Compares a literal expression against an expected type and emits one
//! diagnostic per structural mismatch. Only literal shapes are inspected
//! deeply (object literals, string/number/boolean literals, enum member
//! accesses); every other expression produces no diagnostics -- the bounded
//! subset rule.
//!
//! Union handling is a documented heuristic, not a soundness guarantee:
//! each arm is matched independently and the SHORTEST diagnostic list wins,
//! minimizing false positives for legitimately-compatible arms. The
//! tie-break is order-independent, which is why it is preferred over
//! "first compatible arm".

use flux_common::span::Span;
use flux_parser::ast::expr::{Expr, ObjectLiteral, ObjectProp};
use flux_parser::ast::{strip_quotes, AstNode};
use flux_types::semantics::node_span;
use flux_types::{FileSemantics, Ty};

/// One structural mismatch, anchored to a source range.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralDiagnostic {
    pub span: Span,
    pub message: String,
}

impl StructuralDiagnostic {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// Context for one match pass.
pub struct MatchContext<'a> {
    /// Semantic tables of the file the expression lives in (used to type
    /// literal leaves and resolve enum member accesses).
    pub semantics: &'a FileSemantics,
    /// Suppresses checking of the `type` property at the top object level;
    /// the dispatch validator handles that property itself.
    pub is_action_object: bool,
}

/// Attribution frame: the property (and enclosing object) whose value is
/// currently being matched.
struct ParentFrame<'a> {
    object_span: Span,
    expected: &'a Ty,
    property: String,
}

/// Match an expression against an expected type.
pub fn match_expr(
    expr: &Expr,
    expected: &Ty,
    ctx: &MatchContext<'_>,
) -> Vec<StructuralDiagnostic> {
    match_expr_inner(expr, expected, ctx, None)
}

fn match_expr_inner(
    expr: &Expr,
    expected: &Ty,
    ctx: &MatchContext<'_>,
    parent: Option<&ParentFrame<'_>>,
) -> Vec<StructuralDiagnostic> {
    // `any` is the opt-out escape hatch.
    if expected.is_any() {
        return Vec::new();
    }

    match expr {
        Expr::ObjectLiteral(obj) => {
            // Expected-side union: best-effort "does any arm satisfy this";
            // the SHORTEST diagnostic list wins.
            if let Ty::Union(arms) = expected {
                return arms
                    .iter()
                    .map(|arm| match_expr_inner(expr, arm, ctx, parent))
                    .min_by_key(|diags| diags.len())
                    .unwrap_or_default();
            }
            // Expected-side intersection: every facet must hold
            // independently; diagnostics concatenate.
            if let Ty::Intersection(arms) = expected {
                return arms
                    .iter()
                    .flat_map(|arm| match_expr_inner(expr, arm, ctx, parent))
                    .collect();
            }
            match_object(obj, expected, ctx, parent)
        }
        Expr::ParenExpr(paren) => paren
            .inner()
            .map(|inner| match_expr_inner(&inner, expected, ctx, parent))
            .unwrap_or_default(),
        Expr::Literal(_) | Expr::MemberExpr(_) => {
            // Scalar leaves compare at the type level; `types_compatible`
            // already handles union/intersection on either side, so the
            // diagnostic can cite the full expected type (`'asc' | 'desc'`)
            // instead of a single arm.
            let actual = ctx.semantics.type_of_expr(expr);
            match_scalar(&actual, expected, node_span(expr.syntax()), parent)
        }
        // Arbitrary expressions are not validated (bounded subset).
        _ => Vec::new(),
    }
}

/// Match an object literal against an expected type.
fn match_object(
    obj: &ObjectLiteral,
    expected: &Ty,
    ctx: &MatchContext<'_>,
    _parent: Option<&ParentFrame<'_>>,
) -> Vec<StructuralDiagnostic> {
    let obj_span = node_span(obj.syntax());

    let Some(shape) = expected.as_object() else {
        return vec![StructuralDiagnostic::new(
            obj_span,
            format!("type {} is required", expected),
        )];
    };

    let mut diagnostics = Vec::new();

    // Properties present on the literal but unknown to the expected type,
    // plus recursion into known properties' values.
    for prop in obj.properties() {
        let Some(raw_name) = prop.name_text() else {
            continue;
        };
        let name = strip_quotes(&raw_name).to_string();
        if ctx.is_action_object && name == "type" {
            continue;
        }
        match shape.prop(&name) {
            None => diagnostics.push(StructuralDiagnostic::new(
                obj_span,
                format!("property '{}' is not found in type {}", name, expected),
            )),
            Some(expected_prop) => {
                if let ObjectProp::Assign(assign) = &prop {
                    if let Some(initializer) = assign.initializer() {
                        let frame = ParentFrame {
                            object_span: obj_span,
                            expected,
                            property: name,
                        };
                        let nested_ctx = MatchContext {
                            semantics: ctx.semantics,
                            is_action_object: false,
                        };
                        diagnostics.extend(match_expr_inner(
                            &initializer,
                            &expected_prop.ty,
                            &nested_ctx,
                            Some(&frame),
                        ));
                    }
                }
            }
        }
    }

    // Required properties of the expected type missing from the literal.
    for expected_prop in &shape.props {
        if ctx.is_action_object && expected_prop.name == "type" {
            continue;
        }
        if expected_prop.optional {
            continue;
        }
        let present = obj.properties().any(|p| {
            p.name_text()
                .is_some_and(|n| strip_quotes(&n) == expected_prop.name)
        });
        if !present {
            diagnostics.push(StructuralDiagnostic::new(
                obj_span,
                format!(
                    "property '{}' is required in type {}",
                    expected_prop.name, expected
                ),
            ));
        }
    }

    diagnostics
}

/// Match a scalar (non-object) actual type against an expected type.
///
/// On mismatch emits a diagnostic pair when the owning property is known:
/// one naming the enclosing object vs the expected shape, one naming the
/// specific property. Without a parent frame a single diagnostic anchors at
/// the literal itself.
fn match_scalar(
    actual: &Ty,
    expected: &Ty,
    span: Span,
    parent: Option<&ParentFrame<'_>>,
) -> Vec<StructuralDiagnostic> {
    // No information about the actual value: nothing to check.
    if matches!(actual, Ty::Unknown) {
        return Vec::new();
    }
    if types_compatible(actual, expected) {
        return Vec::new();
    }
    match parent {
        Some(frame) => vec![
            StructuralDiagnostic::new(
                frame.object_span,
                format!("object literal does not match type {}", frame.expected),
            ),
            StructuralDiagnostic::new(
                span,
                format!(
                    "property '{}' should be type {}, but found '{}' instead",
                    frame.property,
                    expected,
                    actual.category_name()
                ),
            ),
        ],
        None => vec![StructuralDiagnostic::new(
            span,
            format!("type {} is required", expected),
        )],
    }
}

/// Type-level compatibility for scalar shapes.
///
/// Handles union/intersection on either side so the rule set stays closed
/// under the types lowering can produce, even though literal expressions
/// themselves never type to unions.
pub fn types_compatible(actual: &Ty, expected: &Ty) -> bool {
    match (actual, expected) {
        (_, Ty::Any) | (_, Ty::Unknown) => true,
        (Ty::Any, _) | (Ty::Unknown, _) => true,

        // Actual-side composite types.
        (Ty::Union(arms), _) => arms.iter().any(|arm| types_compatible(arm, expected)),
        (Ty::Intersection(arms), _) => {
            arms.iter().all(|arm| types_compatible(arm, expected))
        }

        // Expected-side composite types.
        (_, Ty::Union(arms)) => arms.iter().any(|arm| types_compatible(actual, arm)),
        (_, Ty::Intersection(arms)) => {
            arms.iter().all(|arm| types_compatible(actual, arm))
        }

        (Ty::StringLiteral(_), Ty::String) => true,
        (Ty::StringLiteral(a), Ty::StringLiteral(b)) => a == b,
        (Ty::String, Ty::String) => true,

        (Ty::NumberLiteral(_), Ty::Number) => true,
        (Ty::NumberLiteral(a), Ty::NumberLiteral(b)) => a == b,
        (Ty::Number, Ty::Number) => true,

        (Ty::BooleanLiteral(_), Ty::Boolean) => true,
        (Ty::BooleanLiteral(a), Ty::BooleanLiteral(b)) => a == b,
        (Ty::Boolean, Ty::Boolean) => true,

        (Ty::Null, Ty::Null) => true,

        (Ty::EnumLiteral { enum_name, .. }, Ty::Enum(def)) => enum_name == &def.name,
        (
            Ty::EnumLiteral { enum_name, member },
            Ty::EnumLiteral {
                enum_name: expected_enum,
                member: expected_member,
            },
        ) => enum_name == expected_enum && member == expected_member,
        (Ty::Enum(a), Ty::Enum(b)) => a.name == b.name,

        // Object and array shapes reaching the scalar path are outside the
        // deep-checked subset; same-category pairs pass, cross-category
        // pairs fail.
        (Ty::Object(_), Ty::Object(_)) => true,
        (Ty::Array(_), Ty::Array(_)) => true,

        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_types::{EnumTy, ObjectTy, Prop};

    fn object_ty(props: Vec<(&str, Ty, bool)>) -> Ty {
        Ty::Object(ObjectTy {
            props: props
                .into_iter()
                .map(|(name, ty, optional)| Prop {
                    name: name.into(),
                    ty,
                    optional,
                })
                .collect(),
        })
    }

    /// Parse a source file, grab the first object literal, and match it.
    fn match_first_object(source: &str, expected: &Ty) -> Vec<StructuralDiagnostic> {
        use flux_parser::ast::AstNode;
        let parse = flux_parser::parse(source);
        let semantics = FileSemantics::analyze(&parse);
        let obj = parse
            .syntax()
            .descendants()
            .find_map(ObjectLiteral::cast)
            .expect("object literal");
        let ctx = MatchContext {
            semantics: &semantics,
            is_action_object: false,
        };
        match_expr(&Expr::ObjectLiteral(obj), expected, &ctx)
    }

    #[test]
    fn any_expected_produces_no_diagnostics() {
        let diags = match_first_object("x = { whatever: 1 };", &Ty::Any);
        assert!(diags.is_empty());
    }

    #[test]
    fn matching_payload_is_clean() {
        let expected = object_ty(vec![("id", Ty::Number, false)]);
        let diags = match_first_object("x = { id: 1 };", &expected);
        assert!(diags.is_empty(), "unexpected: {:?}", diags);
    }

    #[test]
    fn wrong_primitive_emits_pair_citing_property() {
        let expected = object_ty(vec![("id", Ty::Number, false)]);
        let diags = match_first_object("x = { id: 'x' };", &expected);
        assert_eq!(diags.len(), 2);
        assert_eq!(
            diags[0].message,
            "object literal does not match type {id: number}"
        );
        assert_eq!(
            diags[1].message,
            "property 'id' should be type number, but found 'string' instead"
        );
    }

    #[test]
    fn unknown_property_reported() {
        let expected = object_ty(vec![("id", Ty::Number, false)]);
        let diags = match_first_object("x = { id: 1, extra: 2 };", &expected);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "property 'extra' is not found in type {id: number}"
        );
    }

    #[test]
    fn missing_required_property_reported() {
        let expected = object_ty(vec![
            ("id", Ty::Number, false),
            ("label", Ty::String, true),
        ]);
        let diags = match_first_object("x = {};", &expected);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "property 'id' is required in type {id: number, label?: string}"
        );
    }

    #[test]
    fn non_object_expected_yields_type_required() {
        let diags = match_first_object("x = { id: 1 };", &Ty::String);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "type string is required");
    }

    #[test]
    fn nested_object_recursion() {
        let inner = object_ty(vec![("id", Ty::Number, false)]);
        let expected = object_ty(vec![("user", inner, false)]);
        let diags = match_first_object("x = { user: { id: 'bad' } };", &expected);
        assert_eq!(diags.len(), 2);
        assert!(diags[1].message.contains("property 'id'"));
    }

    #[test]
    fn expected_union_picks_best_arm() {
        let expected = Ty::Union(vec![
            object_ty(vec![("id", Ty::Number, false)]),
            object_ty(vec![("name", Ty::String, false)]),
        ]);
        // Satisfies the first arm: no diagnostics at all.
        let diags = match_first_object("x = { id: 1 };", &expected);
        assert!(diags.is_empty(), "unexpected: {:?}", diags);
    }

    #[test]
    fn expected_union_with_no_matching_arm_reports_shortest() {
        let expected = Ty::Union(vec![
            object_ty(vec![("id", Ty::Number, false)]),
            object_ty(vec![
                ("a", Ty::Number, false),
                ("b", Ty::Number, false),
            ]),
        ]);
        let diags = match_first_object("x = {};", &expected);
        // First arm misses one required property, second misses two; the
        // shortest list wins.
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'id'"));
    }

    #[test]
    fn expected_intersection_concatenates() {
        let expected = Ty::Intersection(vec![
            object_ty(vec![("id", Ty::Number, false)]),
            object_ty(vec![("name", Ty::String, false)]),
        ]);
        let diags = match_first_object("x = {};", &expected);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn string_literal_against_literal_union() {
        let expected = Ty::Union(vec![
            Ty::StringLiteral("asc".into()),
            Ty::StringLiteral("desc".into()),
        ]);
        let ok = match_first_object("x = { order: 'asc' };", &object_ty(vec![("order", expected.clone(), false)]));
        assert!(ok.is_empty(), "unexpected: {:?}", ok);

        let bad = match_first_object(
            "x = { order: 'up' };",
            &object_ty(vec![("order", expected, false)]),
        );
        assert_eq!(bad.len(), 2);
        assert!(bad[1]
            .message
            .contains("property 'order' should be type 'asc' | 'desc'"));
    }

    #[test]
    fn enum_literal_compatibility() {
        let status = EnumTy {
            name: "Status".into(),
            members: vec!["Active".into(), "Done".into()],
        };
        let source = "enum Status { Active, Done }\nx = { status: Status.Active };";
        let expected = object_ty(vec![("status", Ty::Enum(status), false)]);
        let diags = match_first_object(source, &expected);
        assert!(diags.is_empty(), "unexpected: {:?}", diags);
    }

    #[test]
    fn enum_literal_mismatch() {
        let other = EnumTy {
            name: "Role".into(),
            members: vec!["Admin".into()],
        };
        let source = "enum Status { Active }\nx = { status: Status.Active };";
        let expected = object_ty(vec![("status", Ty::Enum(other), false)]);
        let diags = match_first_object(source, &expected);
        assert_eq!(diags.len(), 2);
        assert!(diags[1].message.contains("found 'enum' instead"));
    }

    #[test]
    fn action_object_type_property_is_skipped() {
        let parse = flux_parser::parse("x = { type: 'a/b', payload: 1 };");
        let semantics = FileSemantics::analyze(&parse);
        use flux_parser::ast::AstNode;
        let obj = parse
            .syntax()
            .descendants()
            .find_map(ObjectLiteral::cast)
            .unwrap();
        let expected = object_ty(vec![("payload", Ty::Number, false)]);
        let ctx = MatchContext {
            semantics: &semantics,
            is_action_object: true,
        };
        let diags = match_expr(&Expr::ObjectLiteral(obj), &expected, &ctx);
        assert!(diags.is_empty(), "unexpected: {:?}", diags);
    }

    #[test]
    fn identifier_values_are_not_validated() {
        let expected = object_ty(vec![("id", Ty::Number, false)]);
        let diags = match_first_object("x = { id: someVariable };", &expected);
        assert!(diags.is_empty());
    }

    #[test]
    fn type_level_union_rules() {
        // Actual-side union: any compatible arm suffices.
        let actual = Ty::Union(vec![Ty::String, Ty::Number]);
        assert!(types_compatible(&actual, &Ty::Number));
        // Actual-side intersection: every facet must fit.
        let actual = Ty::Intersection(vec![Ty::Number, Ty::String]);
        assert!(!types_compatible(&actual, &Ty::Number));
    }
}
