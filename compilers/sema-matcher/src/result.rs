use std::fmt;

/// The word-comparison channel that produced a word match. Channels
/// are tried in a fixed order and are never combined; the first
/// successful one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Derivation,
    Synonym,
    Hypernym,
    Embedding,
    Entity,
    Generic,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchType::Exact => "exact",
            MatchType::Derivation => "derivation",
            MatchType::Synonym => "synonym",
            MatchType::Hypernym => "hypernym",
            MatchType::Embedding => "embedding",
            MatchType::Entity => "entity",
            MatchType::Generic => "generic",
        };
        f.write_str(label)
    }
}

/// Alignment of one search-phrase word with one document word.
#[derive(Debug, Clone)]
pub struct WordMatch {
    pub search_phrase_token_index: usize,
    pub document_token_index: usize,
    /// Set when the match landed on a subword of a compound token.
    pub document_subword_index: Option<usize>,
    /// The matched document lemma or derived form.
    pub extracted_word: String,
    pub match_type: MatchType,
    /// Human-readable justification.
    pub explanation: String,
    /// True when the document word was reached through a coreference
    /// mention chain rather than directly.
    pub involves_coreference: bool,
}

/// The result of matching one search phrase against one document.
/// Produced fresh per query; never persisted.
#[derive(Debug, Clone)]
pub struct Match {
    pub search_phrase_label: String,
    pub document_label: String,
    /// One entry per matchable search-phrase token, in phrase token
    /// order.
    pub word_matches: Vec<WordMatch>,
    /// True when any participating edge was uncertain or the match was
    /// resolved only through coreference/coordination ambiguity.
    pub uncertain: bool,
    /// True when the matched document predicate is negated.
    pub negated: bool,
    pub involves_coreference: bool,
}

impl Match {
    pub fn word_match_for_phrase_token(&self, phrase_token: usize) -> Option<&WordMatch> {
        self.word_matches
            .iter()
            .find(|w| w.search_phrase_token_index == phrase_token)
    }
}
