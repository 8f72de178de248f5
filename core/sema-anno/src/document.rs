use crate::annotation::{ParentEdge, TokenAnnotation};

/// One mention of an entity: an ordered token span plus its head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Token indices of the span, in document order.
    pub tokens: Vec<usize>,
    /// The span's head token, used for matching.
    pub root: usize,
    /// True when the mention is a pronoun rather than a lexical noun.
    pub is_pronominal: bool,
}

impl Mention {
    pub fn single(index: usize, is_pronominal: bool) -> Self {
        Mention {
            tokens: vec![index],
            root: index,
            is_pronominal,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.tokens.contains(&index)
    }
}

/// Ordered list of mentions referring to one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionChain {
    pub mentions: Vec<Mention>,
}

impl MentionChain {
    /// A chain is only usable as a matching substitute when it is
    /// anchored by at least one non-pronominal mention.
    pub fn has_lexical_anchor(&self) -> bool {
        self.mentions.iter().any(|m| !m.is_pronominal)
    }
}

/// A normalized document: the frozen annotation arena plus its
/// coreference mention chains. Immutable after `freeze`.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tokens: Vec<TokenAnnotation>,
    chains: Vec<MentionChain>,
}

impl Document {
    /// Seals the arena: derives parent edges from the child edges and
    /// takes ownership of the annotations. The normalizer is the only
    /// intended caller.
    pub fn freeze(mut tokens: Vec<TokenAnnotation>, chains: Vec<MentionChain>) -> Self {
        let mut parent_edges: Vec<Vec<ParentEdge>> = vec![Vec::new(); tokens.len()];
        for (source, annotation) in tokens.iter().enumerate() {
            for edge in &annotation.children {
                if let (Some(target), Some(role)) = (edge.token_target(), edge.role) {
                    if target < parent_edges.len() {
                        parent_edges[target].push(ParentEdge {
                            source,
                            role,
                            uncertain: edge.uncertain,
                        });
                    }
                }
            }
        }
        for (annotation, parents) in tokens.iter_mut().zip(parent_edges) {
            annotation.parents = parents;
        }
        Document { tokens, chains }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, index: usize) -> &TokenAnnotation {
        &self.tokens[index]
    }

    pub fn get(&self, index: usize) -> Option<&TokenAnnotation> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[TokenAnnotation] {
        &self.tokens
    }

    pub fn chains(&self) -> &[MentionChain] {
        &self.chains
    }

    /// Chains that contain `index` in one of their mentions.
    pub fn chains_containing(&self, index: usize) -> impl Iterator<Item = &MentionChain> {
        self.chains
            .iter()
            .filter(move |chain| chain.mentions.iter().any(|m| m.contains(index)))
    }
}
