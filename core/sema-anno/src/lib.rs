//! Linguistic annotation model: the canonical predicate-argument graph
//! produced by the normalizer and consumed by the structural matcher.
//!
//! Annotations are attached by token index in an arena that becomes
//! immutable once frozen; nothing is injected into tokens at runtime.

pub mod annotation;
pub mod document;
pub mod subword;

pub use annotation::{EdgeTarget, ParentEdge, SemanticEdge, TokenAnnotation};
pub use document::{Document, Mention, MentionChain};
pub use subword::Subword;
