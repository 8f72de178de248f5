use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use sema_anno::{Document, Mention, MentionChain, SemanticEdge, Subword, TokenAnnotation};
use sema_morph::{finalize_chain, Decomposer, Lexicon};
use sema_protocol::{MorphFlags, PartOfSpeech, SemanticRole, SurfaceRelation};

use crate::input::ParsedText;

/// Rewrites raw dependency parses into the canonical predicate-argument
/// graph: passive remapping, auxiliary collapse, coordination
/// propagation, modal/control threading, relative-clause resolution,
/// negation scope, derivation and subword attachment.
pub struct Normalizer {
    decomposer: Arc<Decomposer>,
}

impl Normalizer {
    pub fn new(decomposer: Arc<Decomposer>) -> Self {
        Normalizer { decomposer }
    }

    pub fn decomposer(&self) -> &Arc<Decomposer> {
        &self.decomposer
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.decomposer.lexicon()
    }

    pub fn normalize(&self, parsed: &ParsedText) -> Document {
        let n = parsed.tokens.len();
        let lexicon = self.decomposer.lexicon();
        let heads = sanitize_heads(parsed);

        let mut anns: Vec<TokenAnnotation> = Vec::with_capacity(n);
        for token in &parsed.tokens {
            let lemma = token.lemma.to_lowercase();
            let mut ann = TokenAnnotation::new(&token.text, &lemma, token.pos);
            ann.flags = token.flags;
            ann.sentence = token.sentence;
            ann.entity_label = token.entity_label.clone();
            ann.derived_lemma = lexicon.derived_lemma(&lemma, token.pos);
            if lexicon.is_generic_pronoun(&lemma) {
                ann.flags |= MorphFlags::GENERIC;
            }
            ann.is_matchable = match token.pos {
                PartOfSpeech::Determiner
                | PartOfSpeech::Punctuation
                | PartOfSpeech::Conjunction
                | PartOfSpeech::Particle
                | PartOfSpeech::Preposition => false,
                PartOfSpeech::Pronoun => !token.flags.contains(MorphFlags::RELATIVE),
                _ => true,
            };
            anns.push(ann);
        }

        let mut children_of: Vec<Vec<(usize, SurfaceRelation)>> = vec![Vec::new(); n];
        for token in &parsed.tokens {
            if let Some(head) = heads[token.index] {
                children_of[head].push((token.index, token.relation));
            }
        }

        let mut rel_clauses: Vec<(usize, usize)> = Vec::new();
        let mut open_comps: Vec<(usize, usize)> = Vec::new();
        let mut clausal_comps: Vec<(usize, usize)> = Vec::new();
        let mut conjunct_pairs: Vec<(usize, usize)> = Vec::new();
        let mut disjunctive_heads: Vec<usize> = Vec::new();
        // For a predicative complement, the subject it was resolved to.
        let mut pred_subject: Vec<Option<usize>> = vec![None; n];

        // Pass 1: surface relations to provisional semantic edges, with
        // passive remapping and auxiliary collapse applied inline.
        for h in 0..n {
            let passive = anns[h].flags.contains(MorphFlags::PASSIVE)
                || children_of[h]
                    .iter()
                    .any(|(_, r)| *r == SurfaceRelation::PassiveAuxiliary);
            for &(c, relation) in &children_of[h] {
                match relation {
                    SurfaceRelation::Subject => {
                        let role = if passive {
                            SemanticRole::DirectObject
                        } else {
                            SemanticRole::Subject
                        };
                        anns[h].add_child(SemanticEdge::new(c, role));
                    }
                    SurfaceRelation::Object => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::DirectObject));
                    }
                    SurfaceRelation::IndirectObject => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::IndirectObject));
                    }
                    SurfaceRelation::Agent => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::Subject));
                    }
                    SurfaceRelation::Auxiliary | SurfaceRelation::PassiveAuxiliary => {
                        anns[c].is_matchable = false;
                        anns[c].children = vec![SemanticEdge::trace(h)];
                    }
                    SurfaceRelation::Predicate => {
                        // resolved below once the subject is known
                    }
                    SurfaceRelation::Negation => {
                        anns[h].is_negated = true;
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::Negator));
                        anns[c].is_matchable = false;
                    }
                    SurfaceRelation::Coordinator => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::Coordinator));
                        anns[c].is_matchable = false;
                        if anns[c].flags.contains(MorphFlags::DISJUNCTIVE) {
                            disjunctive_heads.push(h);
                        }
                    }
                    SurfaceRelation::Conjunct => {
                        conjunct_pairs.push((h, c));
                    }
                    SurfaceRelation::RelativeClause => {
                        rel_clauses.push((h, c));
                    }
                    SurfaceRelation::ClausalComplement => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::Complement));
                        clausal_comps.push((h, c));
                    }
                    SurfaceRelation::OpenComplement => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::Complement));
                        open_comps.push((h, c));
                    }
                    SurfaceRelation::Marker => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::Marker));
                        anns[c].is_matchable = false;
                    }
                    SurfaceRelation::Preposition => {
                        anns[h].add_child(SemanticEdge::new(c, SemanticRole::Preposition));
                        // Thread the preposition's object straight to the
                        // governing word; the preposition itself never
                        // becomes a word match.
                        let objects: Vec<usize> = children_of[c]
                            .iter()
                            .filter(|(_, r)| *r == SurfaceRelation::PrepositionalObject)
                            .map(|(o, _)| *o)
                            .collect();
                        for object in objects {
                            anns[h].add_child(SemanticEdge::new(object, SemanticRole::PrepObject));
                        }
                    }
                    SurfaceRelation::PrepositionalObject => {
                        // threaded through the governor's Preposition arm
                    }
                    SurfaceRelation::Modifier => {
                        let role = if anns[c].pos == PartOfSpeech::Adjective {
                            SemanticRole::Attribute
                        } else {
                            SemanticRole::Modifier
                        };
                        anns[h].add_child(SemanticEdge::new(c, role));
                    }
                    SurfaceRelation::Determiner
                    | SurfaceRelation::Punctuation
                    | SurfaceRelation::Root => {}
                }
            }

            // A negating operator among the arguments negates the clause
            // predicate ("NO dog chased...", "NOBODY claimed...").
            for &(c, relation) in &children_of[h] {
                if anns[c].flags.contains(MorphFlags::NEGATING)
                    && matches!(
                        relation,
                        SurfaceRelation::Subject
                            | SurfaceRelation::Object
                            | SurfaceRelation::IndirectObject
                            | SurfaceRelation::Determiner
                    )
                {
                    anns[h].is_negated = true;
                }
            }

            // Copula resolution: the predicative complement becomes an
            // attribute of the subject; the copula itself degrades to an
            // unmatchable trace of the subject.
            let predicate = first_child(&children_of[h], SurfaceRelation::Predicate);
            let subject = first_child(&children_of[h], SurfaceRelation::Subject);
            if let (Some(p), Some(s)) = (predicate, subject) {
                anns[s].add_child(SemanticEdge::new(p, SemanticRole::Attribute));
                pred_subject[p] = Some(s);
                if anns[h].is_negated {
                    anns[p].is_negated = true;
                }
                anns[h].children = vec![SemanticEdge::trace(s)];
                anns[h].is_matchable = false;
            }
        }

        // Pass 2: coordination registration (sibling sets, or-flags).
        let components = build_components(n, &conjunct_pairs);
        let mut comp_of: Vec<Option<usize>> = vec![None; n];
        for (id, comp) in components.iter().enumerate() {
            for &m in comp {
                comp_of[m] = Some(id);
            }
            let first = comp[0];
            anns[first].righthand_siblings = comp[1..].to_vec();
            let disjunctive = comp.iter().any(|m| disjunctive_heads.contains(m));
            if disjunctive {
                for &m in comp {
                    anns[m].is_involved_in_or_conjunction = true;
                }
            }
        }

        // Pass 3: relative clauses. The relativizer is replaced by its
        // antecedent in the clause-internal role; conjoined antecedents
        // other than the attachment point bind uncertainly.
        for &(noun, verb) in &rel_clauses {
            let Some(&(relativizer, relation)) = children_of[verb]
                .iter()
                .find(|(c, _)| anns[*c].flags.contains(MorphFlags::RELATIVE))
            else {
                continue;
            };
            let passive = anns[verb].flags.contains(MorphFlags::PASSIVE)
                || children_of[verb]
                    .iter()
                    .any(|(_, r)| *r == SurfaceRelation::PassiveAuxiliary);
            let role = match relation {
                SurfaceRelation::Subject => {
                    if passive {
                        SemanticRole::DirectObject
                    } else {
                        SemanticRole::Subject
                    }
                }
                SurfaceRelation::Object => SemanticRole::DirectObject,
                SurfaceRelation::IndirectObject => SemanticRole::IndirectObject,
                SurfaceRelation::PrepositionalObject => SemanticRole::PrepObject,
                _ => continue,
            };
            anns[verb]
                .children
                .retain(|e| e.token_target() != Some(relativizer));
            anns[verb].add_child(SemanticEdge::new(noun, role));
            anns[relativizer].is_matchable = false;
            if let Some(id) = comp_of[noun] {
                for &m in &components[id] {
                    if m != noun {
                        anns[verb].add_child(SemanticEdge::uncertain(m, role));
                    }
                }
            }
        }

        // Pass 4: modal/raising/control threading.
        for &(matrix, embedded) in &open_comps {
            let embedded_passive = anns[embedded].flags.contains(MorphFlags::PASSIVE)
                || children_of[embedded]
                    .iter()
                    .any(|(_, r)| *r == SurfaceRelation::PassiveAuxiliary);

            if anns[matrix].pos == PartOfSpeech::Adjective {
                // Raising adjective ("hard to find"): the word the
                // adjective predicates over is the embedded object.
                if let Some(s) = pred_subject[matrix] {
                    if !has_role(&anns[embedded], SemanticRole::DirectObject) {
                        anns[embedded].add_child(SemanticEdge::new(s, SemanticRole::DirectObject));
                    }
                }
                continue;
            }

            if anns[matrix].flags.contains(MorphFlags::MODAL) {
                // The modal carries the embedded predicate's arguments;
                // thread them all across, then degrade the modal to a
                // trace.
                let matrix_edges: Vec<(usize, SemanticRole)> = anns[matrix]
                    .children
                    .iter()
                    .filter_map(|e| match (e.token_target(), e.role) {
                        (Some(t), Some(role)) => Some((t, role)),
                        _ => None,
                    })
                    .filter(|(t, role)| {
                        *t != embedded
                            && matches!(
                                role,
                                SemanticRole::Subject
                                    | SemanticRole::DirectObject
                                    | SemanticRole::IndirectObject
                                    | SemanticRole::Negator
                            )
                    })
                    .collect();
                for (t, role) in matrix_edges {
                    let threaded = match role {
                        SemanticRole::Subject if embedded_passive => SemanticRole::DirectObject,
                        other => other,
                    };
                    anns[embedded].add_child(SemanticEdge::uncertain(t, threaded));
                }
                if anns[matrix].is_negated {
                    anns[embedded].is_negated = true;
                }
                anns[matrix].children = vec![SemanticEdge::trace(embedded)];
                anns[matrix].is_matchable = false;
                continue;
            }

            // Control verb: the object controls when present, the
            // subject otherwise ("asked him to go" vs "tried to go").
            let controllers: Vec<usize> = {
                let objects: Vec<usize> = edge_targets(&anns[matrix], SemanticRole::DirectObject)
                    .filter(|t| *t != embedded)
                    .collect();
                if objects.is_empty() {
                    edge_targets(&anns[matrix], SemanticRole::Subject).collect()
                } else {
                    objects
                }
            };
            let slot = if embedded_passive {
                SemanticRole::DirectObject
            } else {
                SemanticRole::Subject
            };
            if !has_role(&anns[embedded], slot) {
                for t in controllers {
                    anns[embedded].add_child(SemanticEdge::uncertain(t, slot));
                }
            }
        }

        // Pass 5: negation of a reporting verb projects into its
        // clausal complement (lexical rule, not general propagation).
        for &(matrix, embedded) in &clausal_comps {
            if anns[matrix].is_negated && lexicon.is_reporting_verb(&anns[matrix].lemma) {
                anns[embedded].is_negated = true;
            }
        }

        // Pass 6: coordination propagation. Every edge incident on the
        // first conjunct is duplicated onto its righthand siblings,
        // preserving label and uncertainty.
        for comp in &components {
            let first = comp[0];
            let members: HashSet<usize> = comp.iter().copied().collect();
            let outgoing: Vec<SemanticEdge> = anns[first]
                .children
                .iter()
                .filter(|e| {
                    e.role != Some(SemanticRole::Coordinator)
                        && e.token_target().map_or(false, |t| !members.contains(&t))
                })
                .cloned()
                .collect();
            for &m in &comp[1..] {
                for edge in &outgoing {
                    anns[m].add_child(*edge);
                }
            }
            for t in 0..n {
                if members.contains(&t) {
                    continue;
                }
                let incoming: Vec<SemanticEdge> = anns[t]
                    .children
                    .iter()
                    .filter(|e| {
                        e.token_target() == Some(first) && e.role != Some(SemanticRole::Coordinator)
                    })
                    .cloned()
                    .collect();
                for edge in incoming {
                    for &m in &comp[1..] {
                        if let Some(role) = edge.role {
                            let duplicated = if edge.uncertain {
                                SemanticEdge::uncertain(m, role)
                            } else {
                                SemanticEdge::new(m, role)
                            };
                            anns[t].add_child(duplicated);
                        }
                    }
                }
            }
        }

        // Pass 7: subword decomposition, after coordination so that
        // hyphenated conjuncts can borrow their head morphemes.
        self.attach_subwords(&mut anns, &components, &comp_of);

        // Pass 8: multiword spans for ontology lookups.
        attach_multiword_spans(&mut anns);

        let chains = build_chains(parsed, &heads, &anns);
        debug!(tokens = n, chains = chains.len(), "normalized document");
        Document::freeze(anns, chains)
    }

    fn attach_subwords(
        &self,
        anns: &mut [TokenAnnotation],
        components: &[Vec<usize>],
        comp_of: &[Option<usize>],
    ) {
        for i in 0..anns.len() {
            let text = anns[i].text.clone();
            if text.ends_with('-') && comp_of[i].is_some() {
                let Some(seg) = self.decomposer.segment_dangling(&text) else {
                    continue;
                };
                let mut subwords: Vec<Subword> = seg
                    .parts
                    .iter()
                    .map(|p| self.decomposer.subword_from_part(p, i))
                    .collect();
                let comp = &components[comp_of[i].unwrap()];
                let donor = comp
                    .iter()
                    .copied()
                    .filter(|&m| m > i)
                    .find_map(|m| {
                        let donor_seg = self.decomposer.segment(&anns[m].text)?;
                        (donor_seg.parts.len() >= 2).then_some((m, donor_seg))
                    });
                if let Some((m, donor_seg)) = donor {
                    for part in &donor_seg.parts[1..] {
                        subwords.push(self.decomposer.subword_from_part(part, m));
                    }
                } else if let Some(&m) = comp.iter().find(|&&m| m > i) {
                    // The sibling is a single morpheme; borrow it whole.
                    subwords.push(Subword {
                        text: anns[m].text.to_lowercase(),
                        lemma: anns[m].lemma.clone(),
                        derived_lemma: anns[m].derived_lemma.clone(),
                        index: 0,
                        containing_token_index: m,
                        char_start_index: 0,
                        is_head: false,
                        dependent_index: None,
                        governor_index: None,
                        governing_dependency_label: None,
                    });
                }
                if subwords.len() >= 2 {
                    if seg.negated {
                        anns[i].is_negated = true;
                    }
                    anns[i].subwords = finalize_chain(subwords);
                }
            } else {
                let (subwords, negated) = self.decomposer.subwords_for(i, &text, anns[i].pos);
                if !subwords.is_empty() {
                    if negated {
                        anns[i].is_negated = true;
                    }
                    anns[i].subwords = subwords;
                }
            }
        }
    }
}

fn first_child(children: &[(usize, SurfaceRelation)], relation: SurfaceRelation) -> Option<usize> {
    children
        .iter()
        .find(|(_, r)| *r == relation)
        .map(|(c, _)| *c)
}

fn has_role(ann: &TokenAnnotation, role: SemanticRole) -> bool {
    ann.children
        .iter()
        .any(|e| e.role == Some(role) && e.token_target().is_some())
}

fn edge_targets(
    ann: &TokenAnnotation,
    role: SemanticRole,
) -> impl Iterator<Item = usize> + '_ {
    ann.children
        .iter()
        .filter(move |e| e.role == Some(role))
        .filter_map(|e| e.token_target())
}

/// Clears heads that point out of range or form a cycle; the affected
/// tokens degrade to isolated roots instead of poisoning the document.
fn sanitize_heads(parsed: &ParsedText) -> Vec<Option<usize>> {
    let n = parsed.tokens.len();
    let mut heads: Vec<Option<usize>> = parsed
        .tokens
        .iter()
        .map(|t| t.head.filter(|h| *h < n && *h != t.index))
        .collect();
    for start in 0..n {
        let mut seen = HashSet::new();
        let mut current = start;
        while let Some(head) = heads[current] {
            if !seen.insert(current) {
                warn!(token = start, "dependency cycle; degrading to isolated root");
                for &member in &seen {
                    heads[member] = None;
                }
                break;
            }
            current = head;
        }
    }
    heads
}

/// Connected components over the conjunct relation, each sorted in
/// document order. Handles both flat and chained conjunct attachment.
fn build_components(n: usize, pairs: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut component_of: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for &(a, b) in pairs {
        match (component_of[a], component_of[b]) {
            (None, None) => {
                let id = components.len();
                components.push(vec![a, b]);
                component_of[a] = Some(id);
                component_of[b] = Some(id);
            }
            (Some(id), None) => {
                components[id].push(b);
                component_of[b] = Some(id);
            }
            (None, Some(id)) => {
                components[id].push(a);
                component_of[a] = Some(id);
            }
            (Some(id_a), Some(id_b)) if id_a != id_b => {
                let moved = std::mem::take(&mut components[id_b]);
                for &m in &moved {
                    component_of[m] = Some(id_a);
                }
                components[id_a].extend(moved);
            }
            _ => {}
        }
    }
    let mut result: Vec<Vec<usize>> = components.into_iter().filter(|c| c.len() > 1).collect();
    for comp in &mut result {
        comp.sort_unstable();
    }
    result
}

fn attach_multiword_spans(anns: &mut [TokenAnnotation]) {
    for i in 0..anns.len() {
        if !matches!(anns[i].pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun) {
            continue;
        }
        let mut span: Vec<usize> = anns[i]
            .children
            .iter()
            .filter(|e| {
                matches!(
                    e.role,
                    Some(SemanticRole::Modifier) | Some(SemanticRole::Attribute)
                )
            })
            .filter_map(|e| e.token_target())
            .filter(|&t| matches!(anns[t].pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun))
            .collect();
        if span.is_empty() {
            continue;
        }
        span.push(i);
        span.sort_unstable();
        let joined = span
            .iter()
            .map(|&t| anns[t].lemma.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        anns[i].multiword_span = Some(joined);
    }
}

fn build_chains(
    parsed: &ParsedText,
    heads: &[Option<usize>],
    anns: &[TokenAnnotation],
) -> Vec<MentionChain> {
    let n = anns.len();
    parsed
        .clusters
        .iter()
        .map(|cluster| MentionChain {
            mentions: cluster
                .iter()
                .filter_map(|&(start, end)| {
                    if start >= n || end < start {
                        return None;
                    }
                    let end = end.min(n - 1);
                    let tokens: Vec<usize> = (start..=end).collect();
                    let root = tokens
                        .iter()
                        .copied()
                        .find(|&t| heads[t].map_or(true, |h| h < start || h > end))
                        .unwrap_or(start);
                    Some(Mention {
                        tokens,
                        root,
                        is_pronominal: anns[root].pos == PartOfSpeech::Pronoun,
                    })
                })
                .collect(),
        })
        .filter(|chain| !chain.mentions.is_empty())
        .collect()
}
