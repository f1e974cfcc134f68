//! Shared foundation types for the flux language service.
//!
//! Everything downstream of the lexer speaks in byte-offset [`span::Span`]s
//! into the original UTF-8 source text; line/column information is computed
//! on demand via [`span::LineIndex`].

pub mod error;
pub mod span;
pub mod token;
