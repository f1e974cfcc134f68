//! Bounded structural type model for the flux language service.
//!
//! This crate is deliberately NOT a TypeScript type checker. It models
//! exactly the type shapes the dispatch validator compares: object/record
//! types, string/number/boolean primitives and literals, enum literals,
//! unions, and intersections. Everything outside that subset lowers to
//! [`ty::Ty::Unknown`], which the matcher treats as "no information" and
//! never diagnoses.

pub mod lower;
pub mod semantics;
pub mod ty;

pub use semantics::FileSemantics;
pub use ty::{EnumTy, ObjectTy, Prop, Ty};
