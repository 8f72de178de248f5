//! Subword decomposition: splitting compound tokens into constituent
//! morphemes against a compiled morpheme lexicon, with lemma and
//! derivation normalization and a shared per-surface-form cache.

pub mod lexicon;
pub mod split;

pub use lexicon::{LexEntry, Lexicon};
pub use split::{finalize_chain, Decomposer, SegPart, Segmentation};
