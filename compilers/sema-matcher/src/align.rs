use std::collections::HashSet;

use tracing::trace;

use sema_anno::{Document, Subword, TokenAnnotation};
use sema_protocol::{PartOfSpeech, SemanticRole};

use crate::config::MatcherConfig;
use crate::coref::antecedents_of;
use crate::embedding::WordEmbedding;
use crate::ontology::Ontology;
use crate::phrase::{wildcard_of, PhraseEdge, SearchPhrase, Wildcard};
use crate::result::{Match, MatchType, WordMatch};

/// Everything one phrase-against-document alignment needs.
pub struct AlignParams<'a> {
    pub phrase: &'a SearchPhrase,
    pub phrase_label: &'a str,
    pub doc: &'a Document,
    pub doc_label: &'a str,
    pub ontology: Option<&'a Ontology>,
    pub embeddings: Option<&'a dyn WordEmbedding>,
    pub config: &'a MatcherConfig,
}

/// One accepted phrase-word/document-word pairing.
#[derive(Debug, Clone)]
struct Fit {
    doc_index: usize,
    subword: Option<usize>,
    extracted: String,
    match_type: MatchType,
    explanation: String,
    via_coref: bool,
    uncertain: bool,
}

/// Matches one search phrase against one document: subgraph alignment
/// with backtracking, coordination expansion through the duplicated
/// sibling edges, and coreference-based mention substitution. An
/// alignment either covers every required phrase edge or is discarded.
pub fn match_phrase(params: &AlignParams<'_>) -> Vec<Match> {
    let mut results = Vec::new();
    let mut signatures: HashSet<Vec<(usize, usize, Option<usize>)>> = HashSet::new();
    let budget = params.config.max_coordination_expansion.max(1);

    for d in 0..params.doc.len() {
        for root_fit in candidates_for(params, params.phrase.root, d) {
            for assignment in expand(params, params.phrase.root, &root_fit, budget) {
                if results.len() >= budget {
                    trace!(
                        phrase = params.phrase_label,
                        document = params.doc_label,
                        "expansion cap reached; dropping further combinations"
                    );
                    return results;
                }
                let mut word_matches: Vec<(usize, Fit)> = assignment;
                word_matches.sort_by_key(|(p, _)| *p);
                let signature: Vec<(usize, usize, Option<usize>)> = word_matches
                    .iter()
                    .map(|(p, f)| (*p, f.doc_index, f.subword))
                    .collect();
                if !signatures.insert(signature) {
                    continue;
                }
                let uncertain = word_matches.iter().any(|(_, f)| f.uncertain);
                let involves_coreference = word_matches.iter().any(|(_, f)| f.via_coref);
                let negated = params.doc.token(root_fit.doc_index).is_negated;
                results.push(Match {
                    search_phrase_label: params.phrase_label.to_owned(),
                    document_label: params.doc_label.to_owned(),
                    word_matches: word_matches
                        .into_iter()
                        .map(|(p, f)| WordMatch {
                            search_phrase_token_index: p,
                            document_token_index: f.doc_index,
                            document_subword_index: f.subword,
                            extracted_word: f.extracted,
                            match_type: f.match_type,
                            explanation: f.explanation,
                            involves_coreference: f.via_coref,
                        })
                        .collect(),
                    uncertain,
                    negated,
                    involves_coreference,
                });
            }
        }
    }
    results
}

/// Completes the phrase subtree rooted at `p_idx`, given `fit` for the
/// root of that subtree. Returns every bounded combination of child
/// alignments; an unmatched required edge kills the whole branch.
fn expand(
    params: &AlignParams<'_>,
    p_idx: usize,
    fit: &Fit,
    budget: usize,
) -> Vec<Vec<(usize, Fit)>> {
    let mut assignments: Vec<Vec<(usize, Fit)>> = vec![vec![(p_idx, fit.clone())]];
    let edges: Vec<&PhraseEdge> = params.phrase.edges_from(p_idx).collect();
    for edge in edges {
        let candidates = edge_candidates(params, edge, fit);
        let mut extended = Vec::new();
        'outer: for assignment in &assignments {
            for candidate in &candidates {
                for subtree in expand(params, edge.child, candidate, budget) {
                    if extended.len() >= budget {
                        break 'outer;
                    }
                    let mut merged = assignment.clone();
                    merged.extend(subtree);
                    extended.push(merged);
                }
            }
        }
        if extended.is_empty() {
            return Vec::new();
        }
        assignments = extended;
    }
    assignments
}

/// Document-side candidates for one required phrase edge, starting
/// from the aligned parent. Candidate argument structure is read from
/// the aligned token itself and from its coreferring antecedents, so a
/// mention can satisfy an argument its own clause never expresses.
fn edge_candidates(params: &AlignParams<'_>, edge: &PhraseEdge, fit: &Fit) -> Vec<Fit> {
    let mut out: Vec<Fit> = Vec::new();
    let mut sources: Vec<(usize, bool, bool)> = vec![(fit.doc_index, false, false)];
    for antecedent in antecedents_of(
        params.doc,
        fit.doc_index,
        params.config.max_coreference_hops,
    ) {
        sources.push((antecedent.root, true, antecedent.conjoined));
    }

    for (source, via_coref, conjoined) in sources {
        let annotation = params.doc.token(source);
        for doc_edge in &annotation.children {
            let (Some(target), Some(role)) = (doc_edge.token_target(), doc_edge.role) else {
                continue;
            };
            if !roles_compatible(edge.role, role) {
                continue;
            }
            for mut candidate in candidates_for(params, edge.child, target) {
                candidate.uncertain |= doc_edge.uncertain || conjoined;
                candidate.via_coref |= via_coref;
                push_unique(&mut out, candidate);
            }
        }
        // Compound-internal arguments: a non-head subword satisfies a
        // modifier-like role against the owning token.
        if matches!(
            edge.role,
            SemanticRole::Modifier | SemanticRole::Attribute | SemanticRole::PrepObject
        ) {
            let phrase_child = params.phrase.doc.token(edge.child);
            for subword in &annotation.subwords {
                if subword.is_head {
                    continue;
                }
                if let Some(mut candidate) = subword_fit(phrase_child, source, subword) {
                    candidate.via_coref |= via_coref;
                    candidate.uncertain |= conjoined;
                    push_unique(&mut out, candidate);
                }
            }
        }
    }
    out
}

fn push_unique(out: &mut Vec<Fit>, candidate: Fit) {
    if !out
        .iter()
        .any(|f| f.doc_index == candidate.doc_index && f.subword == candidate.subword)
    {
        out.push(candidate);
    }
}

/// Word-level candidates for one phrase token at one document token:
/// the direct comparison when it succeeds, the coreferring antecedents
/// otherwise.
fn candidates_for(params: &AlignParams<'_>, p_idx: usize, d_idx: usize) -> Vec<Fit> {
    if let Some(fit) = word_fit(params, p_idx, d_idx) {
        return vec![fit];
    }
    let mut fits: Vec<Fit> = Vec::new();
    for antecedent in antecedents_of(params.doc, d_idx, params.config.max_coreference_hops) {
        if let Some(mut fit) = word_fit(params, p_idx, antecedent.root) {
            fit.via_coref = true;
            fit.uncertain |= antecedent.conjoined;
            if !fits.iter().any(|f| f.doc_index == fit.doc_index) {
                fits.push(fit);
            }
        }
    }
    fits
}

/// Label compatibility between a phrase edge and a document edge.
/// Derivationally related words express the same argument through
/// different labels (verb object vs nominalized prepositional object).
fn roles_compatible(phrase_role: SemanticRole, doc_role: SemanticRole) -> bool {
    phrase_role == doc_role
        || matches!(
            (phrase_role, doc_role),
            (SemanticRole::DirectObject, SemanticRole::PrepObject)
                | (SemanticRole::PrepObject, SemanticRole::DirectObject)
                | (SemanticRole::Attribute, SemanticRole::Modifier)
                | (SemanticRole::Modifier, SemanticRole::Attribute)
        )
}

/// The word-comparison cascade: exact lemma, derived lemma, ontology
/// relation, embedding similarity. The first successful channel wins;
/// channels are never combined. Compound tokens additionally expose
/// their head subword to the lemma and derivation channels.
fn word_fit(params: &AlignParams<'_>, p_idx: usize, d_idx: usize) -> Option<Fit> {
    let p = params.phrase.doc.token(p_idx);
    let d = params.doc.token(d_idx);
    if !d.is_matchable {
        return None;
    }
    // A negated phrase predicate requires a negated document
    // predicate; a plain phrase predicate is polarity-unconstrained.
    if p.is_negated && !d.is_negated {
        return None;
    }
    let base_uncertain = d.is_involved_in_or_conjunction;

    match wildcard_of(p) {
        Wildcard::Entity(label) => {
            if d.entity_label.as_deref() == Some(label.as_str()) {
                return Some(Fit {
                    doc_index: d_idx,
                    subword: None,
                    extracted: extracted_word(d),
                    match_type: MatchType::Entity,
                    explanation: format!("Has an entity label matching {}.", label),
                    via_coref: false,
                    uncertain: base_uncertain,
                });
            }
            return None;
        }
        Wildcard::Generic => {
            if matches!(d.pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun) {
                return Some(Fit {
                    doc_index: d_idx,
                    subword: None,
                    extracted: extracted_word(d),
                    match_type: MatchType::Generic,
                    explanation: "Matches any word as a generic pronoun.".to_owned(),
                    via_coref: false,
                    uncertain: base_uncertain,
                });
            }
            return None;
        }
        Wildcard::None => {}
    }

    let head_subword = d.head_subword();

    // 1. Exact lemma / multiword identity.
    if p.lemma == d.lemma
        || p.multiword_span.as_deref() == Some(d.lemma.as_str())
        || (p.multiword_span.is_some() && p.multiword_span == d.multiword_span)
        || d.multiword_span.as_deref() == Some(p.lemma.as_str())
    {
        let extracted = extracted_word(d);
        return Some(Fit {
            doc_index: d_idx,
            subword: None,
            explanation: format!("Matches {} directly.", extracted.to_uppercase()),
            extracted,
            match_type: MatchType::Exact,
            via_coref: false,
            uncertain: base_uncertain,
        });
    }
    if let Some(head) = head_subword {
        if p.lemma == head.lemma {
            return Some(Fit {
                doc_index: d_idx,
                subword: Some(head.index),
                explanation: format!("Matches {} directly.", head.lemma.to_uppercase()),
                extracted: head.lemma.clone(),
                match_type: MatchType::Exact,
                via_coref: false,
                uncertain: base_uncertain,
            });
        }
    }

    // 2. Derived-lemma identity (at least one side via derivation).
    if p.derived_or_lemma() == d.derived_or_lemma() {
        let extracted = d.derived_or_lemma().to_owned();
        return Some(Fit {
            doc_index: d_idx,
            subword: None,
            explanation: format!("Matches {} via derivation.", extracted.to_uppercase()),
            extracted,
            match_type: MatchType::Derivation,
            via_coref: false,
            uncertain: base_uncertain,
        });
    }
    if let Some(head) = head_subword {
        if p.derived_or_lemma() == head.derived_or_lemma() {
            return Some(Fit {
                doc_index: d_idx,
                subword: Some(head.index),
                explanation: format!(
                    "Matches {} via derivation.",
                    head.derived_or_lemma().to_uppercase()
                ),
                extracted: head.derived_or_lemma().to_owned(),
                match_type: MatchType::Derivation,
                via_coref: false,
                uncertain: base_uncertain,
            });
        }
    }

    // 3. Ontology relation, by smallest absolute depth.
    if let Some(ontology) = params.ontology {
        let mut doc_words: Vec<(String, Option<usize>)> = vec![(d.lemma.clone(), None)];
        doc_words.push((d.derived_or_lemma().to_owned(), None));
        if let Some(span) = &d.multiword_span {
            doc_words.push((span.clone(), None));
        }
        if let Some(head) = head_subword {
            doc_words.push((head.lemma.clone(), Some(head.index)));
            doc_words.push((head.derived_or_lemma().to_owned(), Some(head.index)));
        }
        let refs: Vec<&str> = doc_words.iter().map(|(w, _)| w.as_str()).collect();
        let entry = ontology
            .matches(&p.lemma, &refs)
            .or_else(|| ontology.matches(p.derived_or_lemma(), &refs));
        if let Some(entry) = entry {
            let (matched, subword) = doc_words
                .iter()
                .find(|(w, _)| entry.reprs.contains(w))
                .cloned()
                .unwrap_or((d.lemma.clone(), None));
            let (match_type, explanation) = if entry.depth == 0 {
                (
                    MatchType::Synonym,
                    format!("Is a synonym of {} in the ontology.", p.lemma.to_uppercase()),
                )
            } else {
                (
                    MatchType::Hypernym,
                    format!("Is a child of {} in the ontology.", p.lemma.to_uppercase()),
                )
            };
            return Some(Fit {
                doc_index: d_idx,
                subword,
                extracted: matched,
                match_type,
                explanation,
                via_coref: false,
                uncertain: base_uncertain,
            });
        }
    }

    // 4. Embedding similarity, content words only.
    if let Some(embeddings) = params.embeddings {
        if p.pos.is_content_word() && d.pos.is_content_word() {
            let similarity = embeddings.similarity(&p.lemma, &d.lemma);
            if similarity >= params.config.similarity_threshold {
                return Some(Fit {
                    doc_index: d_idx,
                    subword: None,
                    extracted: d.lemma.clone(),
                    match_type: MatchType::Embedding,
                    explanation: format!(
                        "Has a word embedding that is {}% similar to {}.",
                        (similarity * 100.0).round() as u32,
                        p.lemma.to_uppercase()
                    ),
                    via_coref: false,
                    uncertain: base_uncertain,
                });
            }
        }
    }

    None
}

/// Compound-internal comparison against one subword: lemma and
/// derivation channels only.
fn subword_fit(p: &TokenAnnotation, owner: usize, subword: &Subword) -> Option<Fit> {
    if p.lemma == subword.lemma {
        return Some(Fit {
            doc_index: owner,
            subword: Some(subword.index),
            explanation: format!("Matches {} directly.", subword.lemma.to_uppercase()),
            extracted: subword.lemma.clone(),
            match_type: MatchType::Exact,
            via_coref: false,
            uncertain: false,
        });
    }
    if p.derived_or_lemma() == subword.derived_or_lemma() {
        return Some(Fit {
            doc_index: owner,
            subword: Some(subword.index),
            explanation: format!(
                "Matches {} via derivation.",
                subword.derived_or_lemma().to_uppercase()
            ),
            extracted: subword.derived_or_lemma().to_owned(),
            match_type: MatchType::Derivation,
            via_coref: false,
            uncertain: false,
        });
    }
    None
}

fn extracted_word(d: &TokenAnnotation) -> String {
    d.multiword_span.clone().unwrap_or_else(|| d.lemma.clone())
}
