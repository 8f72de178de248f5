use std::fmt::Write as _;

use sema_protocol::{MorphFlags, PartOfSpeech, SemanticRole};

use crate::subword::Subword;

/// Target of a semantic dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTarget {
    /// A real argument: another token of the document.
    Token(usize),
    /// A trace: this token is a semantically empty helper (tense or
    /// passive auxiliary) standing in for the content verb it points
    /// at. Rendered with a negative offset so traces are unmistakable
    /// in debug output.
    Trace(usize),
}

/// One canonical semantic dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticEdge {
    pub target: EdgeTarget,
    /// `None` only for trace edges.
    pub role: Option<SemanticRole>,
    /// True when the edge crosses a raising/modal/control boundary:
    /// the filler is not literally this predicate's argument but must
    /// still participate in matching.
    pub uncertain: bool,
}

impl SemanticEdge {
    pub fn new(target: usize, role: SemanticRole) -> Self {
        SemanticEdge {
            target: EdgeTarget::Token(target),
            role: Some(role),
            uncertain: false,
        }
    }

    pub fn uncertain(target: usize, role: SemanticRole) -> Self {
        SemanticEdge {
            target: EdgeTarget::Token(target),
            role: Some(role),
            uncertain: true,
        }
    }

    pub fn trace(target: usize) -> Self {
        SemanticEdge {
            target: EdgeTarget::Trace(target),
            role: None,
            uncertain: false,
        }
    }

    /// Token index of a real argument edge, `None` for traces.
    pub fn token_target(&self) -> Option<usize> {
        match self.target {
            EdgeTarget::Token(index) => Some(index),
            EdgeTarget::Trace(_) => None,
        }
    }

    fn sort_key(&self) -> i64 {
        match self.target {
            EdgeTarget::Token(index) => index as i64,
            EdgeTarget::Trace(index) => -(index as i64 + 1),
        }
    }
}

/// Inverse of a child edge, derived when the document is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentEdge {
    pub source: usize,
    pub role: SemanticRole,
    pub uncertain: bool,
}

/// Per-token semantic annotation. Built once by the normalizer;
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct TokenAnnotation {
    pub text: String,
    pub lemma: String,
    /// Morphologically reduced form used as an extra matching channel
    /// (nominalization mapped to its verb stem). `None` when it would
    /// equal `lemma`.
    pub derived_lemma: Option<String>,
    pub pos: PartOfSpeech,
    pub flags: MorphFlags,
    pub sentence: usize,
    pub entity_label: Option<String>,
    /// Lower-cased span of a contiguous proper-noun compound headed
    /// here ("peter müller"), used for multiword ontology lookups.
    pub multiword_span: Option<String>,
    pub is_negated: bool,
    pub is_matchable: bool,
    pub is_involved_in_or_conjunction: bool,
    /// Token indices coordinated with this token, in document order.
    /// Populated on the first conjunct only.
    pub righthand_siblings: Vec<usize>,
    pub children: Vec<SemanticEdge>,
    pub parents: Vec<ParentEdge>,
    pub subwords: Vec<Subword>,
}

impl TokenAnnotation {
    pub fn new(text: &str, lemma: &str, pos: PartOfSpeech) -> Self {
        TokenAnnotation {
            text: text.to_owned(),
            lemma: lemma.to_owned(),
            derived_lemma: None,
            pos,
            flags: MorphFlags::empty(),
            sentence: 0,
            entity_label: None,
            multiword_span: None,
            is_negated: false,
            is_matchable: true,
            is_involved_in_or_conjunction: false,
            righthand_siblings: Vec::new(),
            children: Vec::new(),
            parents: Vec::new(),
            subwords: Vec::new(),
        }
    }

    /// The derived lemma when one exists, the lemma otherwise.
    pub fn derived_or_lemma(&self) -> &str {
        self.derived_lemma.as_deref().unwrap_or(&self.lemma)
    }

    /// The head (semantically dominant) subword, when decomposed.
    pub fn head_subword(&self) -> Option<&Subword> {
        self.subwords.iter().find(|s| s.is_head)
    }

    pub fn has_child(&self, target: usize, role: SemanticRole) -> bool {
        self.children
            .iter()
            .any(|e| e.token_target() == Some(target) && e.role == Some(role))
    }

    /// Adds a child edge unless an edge with the same target and role
    /// already exists; an existing certain edge wins over a new
    /// uncertain one.
    pub fn add_child(&mut self, edge: SemanticEdge) {
        if let (Some(target), Some(role)) = (edge.token_target(), edge.role) {
            if self.has_child(target, role) {
                return;
            }
        }
        self.children.push(edge);
    }

    /// Debug/test rendering of the child list, sorted by target index:
    /// `"1:subj; 4:dobj(U)"`; traces render as `"-6:none"`.
    pub fn string_representation_of_children(&self) -> String {
        let mut edges: Vec<&SemanticEdge> = self.children.iter().collect();
        edges.sort_by_key(|e| e.sort_key());
        let mut out = String::new();
        for edge in edges {
            if !out.is_empty() {
                out.push_str("; ");
            }
            match (edge.target, edge.role) {
                (EdgeTarget::Trace(index), _) => {
                    let _ = write!(out, "-{}:none", index + 1);
                }
                (EdgeTarget::Token(index), Some(role)) => {
                    let _ = write!(out, "{}:{}", index, role);
                    if edge.uncertain {
                        out.push_str("(U)");
                    }
                }
                (EdgeTarget::Token(index), None) => {
                    let _ = write!(out, "{}:none", index);
                }
            }
        }
        out
    }
}
