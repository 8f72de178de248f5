use sema_anno::{Document, TokenAnnotation};
use sema_protocol::{MorphFlags, SemanticRole};

/// Wildcard behaviour of a search-phrase word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wildcard {
    /// Ordinary word: compared through the word-matching channels.
    None,
    /// Generic pronoun ("somebody"): matches any nominal.
    Generic,
    /// ENTITY placeholder: matches tokens carrying the entity label.
    Entity(String),
}

pub fn wildcard_of(annotation: &TokenAnnotation) -> Wildcard {
    if let Some(label) = annotation.text.strip_prefix("ENTITY") {
        if !label.is_empty() {
            return Wildcard::Entity(label.to_owned());
        }
    }
    if annotation.flags.contains(MorphFlags::GENERIC) {
        return Wildcard::Generic;
    }
    Wildcard::None
}

/// One required alignment between two matchable phrase tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseEdge {
    pub parent: usize,
    pub child: usize,
    pub role: SemanticRole,
}

/// A compiled search phrase: the normalized predicate-argument graph
/// plus the matchable node set rooted at the phrase's root predicate.
/// Labels need not be unique across phrases.
#[derive(Debug)]
pub struct SearchPhrase {
    pub label: String,
    pub doc: Document,
    pub root: usize,
    /// Matchable tokens in phrase token order; word matches are
    /// reported in this order.
    pub matchable: Vec<usize>,
    pub edges: Vec<PhraseEdge>,
    /// Whether the phrase was registered from raw text rather than a
    /// pre-parsed structure.
    pub from_text: bool,
}

/// Edges that participate in structural alignment. Connector roles are
/// navigation/bookkeeping only: their targets are unmatchable tokens
/// that must never become word matches.
fn is_alignment_role(role: SemanticRole) -> bool {
    !matches!(
        role,
        SemanticRole::Coordinator
            | SemanticRole::Marker
            | SemanticRole::Negator
            | SemanticRole::Preposition
    )
}

impl SearchPhrase {
    /// Compiles a normalized phrase document. Returns `None` when no
    /// matchable word remains (the caller reports this as a
    /// registration error).
    pub fn compile(label: &str, doc: Document, from_text: bool) -> Option<SearchPhrase> {
        let mut candidates: Vec<usize> = (0..doc.len())
            .filter(|&i| doc.token(i).is_matchable && doc.token(i).parents.is_empty())
            .collect();
        if candidates.is_empty() {
            candidates = (0..doc.len()).filter(|&i| doc.token(i).is_matchable).collect();
        }

        let mut best: Option<(usize, Vec<usize>, Vec<PhraseEdge>)> = None;
        for root in candidates {
            let (nodes, edges) = reachable_from(&doc, root);
            let replace = match &best {
                None => true,
                Some((_, best_nodes, _)) => nodes.len() > best_nodes.len(),
            };
            if replace {
                best = Some((root, nodes, edges));
            }
        }
        let (root, mut matchable, edges) = best?;
        matchable.sort_unstable();
        Some(SearchPhrase {
            label: label.to_owned(),
            doc,
            root,
            matchable,
            edges,
            from_text,
        })
    }

    pub fn edges_from(&self, parent: usize) -> impl Iterator<Item = &PhraseEdge> {
        self.edges.iter().filter(move |e| e.parent == parent)
    }
}

fn reachable_from(doc: &Document, root: usize) -> (Vec<usize>, Vec<PhraseEdge>) {
    let mut nodes = vec![root];
    let mut edges = Vec::new();
    let mut queue = vec![root];
    while let Some(current) = queue.pop() {
        for edge in &doc.token(current).children {
            let (Some(target), Some(role)) = (edge.token_target(), edge.role) else {
                continue;
            };
            if !is_alignment_role(role) || !doc.token(target).is_matchable {
                continue;
            }
            if nodes.contains(&target) {
                continue;
            }
            nodes.push(target);
            edges.push(PhraseEdge {
                parent: current,
                child: target,
                role,
            });
            queue.push(target);
        }
    }
    (nodes, edges)
}
