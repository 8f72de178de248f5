//! Structural semantic matching: ontology- and embedding-aware
//! subgraph alignment of search-phrase predicate-argument graphs
//! against document graphs, with coordination expansion and
//! coreference-based mention substitution.

pub mod align;
pub mod config;
pub mod coref;
pub mod embedding;
pub mod error;
pub mod manager;
pub mod ontology;
pub mod phrase;
pub mod pool;
pub mod result;

pub use config::MatcherConfig;
pub use coref::{antecedents_of, Antecedent};
pub use embedding::{StaticEmbeddings, WordEmbedding};
pub use error::MatcherError;
pub use manager::SemanticMatcher;
pub use ontology::{Ontology, OntologyEntry};
pub use phrase::SearchPhrase;
pub use result::{Match, MatchType, WordMatch};
