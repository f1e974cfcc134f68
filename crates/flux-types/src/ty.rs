//! Type representation for the flux structural matcher.
//!
//! Defines the core `Ty` enum and its object/enum components. `Display`
//! renders TypeScript-flavored source text, because every rendered type ends
//! up inside a user-facing diagnostic message.

use std::fmt;

/// A type in the bounded subset the matcher understands.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    /// `any` -- the opt-out escape hatch. Matches everything, both ways.
    Any,
    /// No information. Produces no diagnostics (distinct from `Any` only in
    /// rendering and intent: `Unknown` is "we could not tell").
    Unknown,
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// A string literal type: `'app/add'`. Value stored without quotes.
    StringLiteral(String),
    /// A number literal type: `42`. Raw source text.
    NumberLiteral(String),
    /// A boolean literal type: `true` / `false`.
    BooleanLiteral(bool),
    /// An object/record type.
    Object(ObjectTy),
    /// A declared enum, usable as the union of its members.
    Enum(EnumTy),
    /// One member of an enum: `Status.Active`.
    EnumLiteral { enum_name: String, member: String },
    /// `A | B`
    Union(Vec<Ty>),
    /// `A & B`
    Intersection(Vec<Ty>),
    /// `T[]`
    Array(Box<Ty>),
}

/// An object/record type: an ordered list of named properties.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ObjectTy {
    pub props: Vec<Prop>,
}

impl ObjectTy {
    /// Look up a property by name.
    pub fn prop(&self, name: &str) -> Option<&Prop> {
        self.props.iter().find(|p| p.name == name)
    }
}

/// One property of an object type.
#[derive(Clone, Debug, PartialEq)]
pub struct Prop {
    pub name: String,
    pub ty: Ty,
    pub optional: bool,
}

/// A declared enum: its name and member names.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumTy {
    pub name: String,
    pub members: Vec<String>,
}

impl Ty {
    /// Whether this type is the `any` escape hatch.
    pub fn is_any(&self) -> bool {
        matches!(self, Ty::Any)
    }

    /// The object shape, if this type is object-shaped.
    pub fn as_object(&self) -> Option<&ObjectTy> {
        match self {
            Ty::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Short category word used in "found '...' instead" diagnostics.
    pub fn category_name(&self) -> &'static str {
        match self {
            Ty::Any => "any",
            Ty::Unknown => "unknown",
            Ty::String | Ty::StringLiteral(_) => "string",
            Ty::Number | Ty::NumberLiteral(_) => "number",
            Ty::Boolean | Ty::BooleanLiteral(_) => "boolean",
            Ty::Null => "null",
            Ty::Object(_) => "object",
            Ty::Enum(_) | Ty::EnumLiteral { .. } => "enum",
            Ty::Union(_) => "union",
            Ty::Intersection(_) => "intersection",
            Ty::Array(_) => "array",
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Any => write!(f, "any"),
            Ty::Unknown => write!(f, "unknown"),
            Ty::String => write!(f, "string"),
            Ty::Number => write!(f, "number"),
            Ty::Boolean => write!(f, "boolean"),
            Ty::Null => write!(f, "null"),
            Ty::StringLiteral(s) => write!(f, "'{}'", s),
            Ty::NumberLiteral(n) => write!(f, "{}", n),
            Ty::BooleanLiteral(b) => write!(f, "{}", b),
            Ty::Object(o) => {
                write!(f, "{{")?;
                for (i, p) in o.props.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if p.optional {
                        write!(f, "{}?: {}", p.name, p.ty)?;
                    } else {
                        write!(f, "{}: {}", p.name, p.ty)?;
                    }
                }
                write!(f, "}}")
            }
            Ty::Enum(e) => write!(f, "{}", e.name),
            Ty::EnumLiteral { enum_name, member } => write!(f, "{}.{}", enum_name, member),
            Ty::Union(arms) => {
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", arm)?;
                }
                Ok(())
            }
            Ty::Intersection(arms) => {
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{}", arm)?;
                }
                Ok(())
            }
            Ty::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_object_type() {
        let ty = Ty::Object(ObjectTy {
            props: vec![
                Prop {
                    name: "id".into(),
                    ty: Ty::Number,
                    optional: false,
                },
                Prop {
                    name: "label".into(),
                    ty: Ty::String,
                    optional: true,
                },
            ],
        });
        assert_eq!(ty.to_string(), "{id: number, label?: string}");
    }

    #[test]
    fn display_union_and_literals() {
        let ty = Ty::Union(vec![
            Ty::StringLiteral("a".into()),
            Ty::StringLiteral("b".into()),
            Ty::Number,
        ]);
        assert_eq!(ty.to_string(), "'a' | 'b' | number");
    }

    #[test]
    fn display_nested_payload_shape() {
        let ty = Ty::Object(ObjectTy {
            props: vec![Prop {
                name: "id".into(),
                ty: Ty::Number,
                optional: false,
            }],
        });
        assert_eq!(ty.to_string(), "{id: number}");
    }

    #[test]
    fn prop_lookup() {
        let obj = ObjectTy {
            props: vec![Prop {
                name: "payload".into(),
                ty: Ty::Any,
                optional: true,
            }],
        };
        assert!(obj.prop("payload").is_some());
        assert!(obj.prop("type").is_none());
    }

    #[test]
    fn category_names() {
        assert_eq!(Ty::StringLiteral("x".into()).category_name(), "string");
        assert_eq!(Ty::NumberLiteral("1".into()).category_name(), "number");
        assert_eq!(Ty::Object(ObjectTy::default()).category_name(), "object");
    }
}
