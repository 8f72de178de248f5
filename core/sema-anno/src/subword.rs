use sema_protocol::SemanticRole;

/// One morpheme of a decomposed compound token.
///
/// Subwords of one token form a chain in which each non-head morpheme
/// modifies the next; the last morpheme is the semantic head. For
/// hyphenated coordination ("Haupt- und Seiteneingänge") a morpheme
/// can be borrowed from a sibling token, in which case
/// `containing_token_index` names the token that lexically carries it
/// while `char_start_index` stays relative to that carrier's surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subword {
    pub text: String,
    pub lemma: String,
    pub derived_lemma: Option<String>,
    /// Position within the owning token's subword sequence.
    pub index: usize,
    pub containing_token_index: usize,
    pub char_start_index: usize,
    /// True for the last, semantically dominant morpheme.
    pub is_head: bool,
    /// Index of the subword that modifies this one (the previous
    /// morpheme of the chain).
    pub dependent_index: Option<usize>,
    /// Index of the subword this one modifies (the next morpheme of
    /// the chain). `None` on the head.
    pub governor_index: Option<usize>,
    pub governing_dependency_label: Option<SemanticRole>,
}

impl Subword {
    pub fn derived_or_lemma(&self) -> &str {
        self.derived_lemma.as_deref().unwrap_or(&self.lemma)
    }
}
