use serde::{Deserialize, Serialize};

/// Tunable policy constants of the structural matcher. The thresholds
/// and caps trade recall against precision and bound the backtracking
/// search on pathological inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum embedding similarity for the embedding channel.
    pub similarity_threshold: f32,
    /// Cap on match candidates produced per search-phrase/document
    /// pair by coordination and coreference expansion.
    pub max_coordination_expansion: usize,
    /// Cap on coreference antecedents considered per document token.
    pub max_coreference_hops: usize,
    /// Symmetric ontology matching (hyponym -> hypernym matches with
    /// negated depth) instead of the default hypernym -> hyponym only.
    pub symmetric_ontology: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            similarity_threshold: 0.82,
            max_coordination_expansion: 64,
            max_coreference_hops: 3,
            symmetric_ontology: false,
        }
    }
}
