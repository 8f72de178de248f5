use sema_anno::Document;
use sema_protocol::{MorphFlags, SemanticRole};

/// One usable antecedent of a document token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Antecedent {
    /// Head token of the antecedent mention; matches report this index.
    pub root: usize,
    /// Full mention span, for multiword extraction.
    pub tokens: Vec<usize>,
    /// True when the antecedent is part of a coordinated set, which
    /// makes any match through it uncertain.
    pub conjoined: bool,
}

/// Adapter over the mention chains delivered by the external
/// coreference component.
///
/// `antecedents_of` returns the mentions usable as substitutes for the
/// given token: nearest preceding mention first, then following
/// mentions, restricted to chains anchored by at least one lexical
/// (non-pronominal) mention. Reflexive pronouns resolve to the
/// clause-local subject instead of the chains.
pub fn antecedents_of(document: &Document, index: usize, cap: usize) -> Vec<Antecedent> {
    let annotation = document.token(index);

    if annotation.flags.contains(MorphFlags::REFLEXIVE) {
        return reflexive_antecedents(document, index, cap);
    }

    let mut preceding: Vec<Antecedent> = Vec::new();
    let mut following: Vec<Antecedent> = Vec::new();
    for chain in document.chains_containing(index) {
        if !chain.has_lexical_anchor() {
            continue;
        }
        for mention in &chain.mentions {
            if mention.contains(index) || mention.is_pronominal {
                continue;
            }
            let antecedent = Antecedent {
                root: mention.root,
                tokens: mention.tokens.clone(),
                conjoined: is_conjoined(document, mention.root),
            };
            if mention.root < index {
                preceding.push(antecedent);
            } else {
                following.push(antecedent);
            }
        }
    }
    // Nearest preceding mention first, then nearest following.
    preceding.sort_by_key(|a| std::cmp::Reverse(a.root));
    following.sort_by_key(|a| a.root);
    preceding.extend(following);
    preceding.truncate(cap);
    preceding
}

fn reflexive_antecedents(document: &Document, index: usize, cap: usize) -> Vec<Antecedent> {
    let mut result = Vec::new();
    for parent in &document.token(index).parents {
        let governor = document.token(parent.source);
        for edge in &governor.children {
            if edge.role != Some(SemanticRole::Subject) {
                continue;
            }
            let Some(subject) = edge.token_target() else {
                continue;
            };
            if subject == index {
                continue;
            }
            let antecedent = Antecedent {
                root: subject,
                tokens: vec![subject],
                conjoined: is_conjoined(document, subject),
            };
            if !result.contains(&antecedent) {
                result.push(antecedent);
            }
        }
    }
    result.truncate(cap);
    result
}

/// A token is conjoined when it owns righthand siblings or appears in
/// another token's sibling list.
pub fn is_conjoined(document: &Document, index: usize) -> bool {
    if !document.token(index).righthand_siblings.is_empty() {
        return true;
    }
    document
        .tokens()
        .iter()
        .any(|t| t.righthand_siblings.contains(&index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_anno::{Mention, MentionChain, SemanticEdge, TokenAnnotation};
    use sema_protocol::PartOfSpeech;

    fn noun(lemma: &str) -> TokenAnnotation {
        TokenAnnotation::new(lemma, lemma, PartOfSpeech::Noun)
    }

    #[test]
    fn test_antecedents_ordered_nearest_preceding_first() {
        // dog(0) ... dog(2) ... it(4) ... dog(6)
        let tokens = vec![
            noun("dog"),
            noun("x"),
            noun("dog"),
            noun("y"),
            TokenAnnotation::new("it", "it", PartOfSpeech::Pronoun),
            noun("z"),
            noun("dog"),
        ];
        let chain = MentionChain {
            mentions: vec![
                Mention::single(0, false),
                Mention::single(2, false),
                Mention::single(4, true),
                Mention::single(6, false),
            ],
        };
        let doc = Document::freeze(tokens, vec![chain]);
        let antecedents = antecedents_of(&doc, 4, 10);
        let roots: Vec<usize> = antecedents.iter().map(|a| a.root).collect();
        assert_eq!(roots, vec![2, 0, 6]);
    }

    #[test]
    fn test_pronoun_only_chains_are_unusable() {
        let tokens = vec![
            TokenAnnotation::new("he", "he", PartOfSpeech::Pronoun),
            TokenAnnotation::new("him", "he", PartOfSpeech::Pronoun),
        ];
        let chain = MentionChain {
            mentions: vec![Mention::single(0, true), Mention::single(1, true)],
        };
        let doc = Document::freeze(tokens, vec![chain]);
        assert!(antecedents_of(&doc, 1, 10).is_empty());
    }

    #[test]
    fn test_cap_truncates() {
        let tokens = vec![
            noun("dog"),
            noun("dog"),
            noun("dog"),
            TokenAnnotation::new("it", "it", PartOfSpeech::Pronoun),
        ];
        let chain = MentionChain {
            mentions: vec![
                Mention::single(0, false),
                Mention::single(1, false),
                Mention::single(2, false),
                Mention::single(3, true),
            ],
        };
        let doc = Document::freeze(tokens, vec![chain]);
        assert_eq!(antecedents_of(&doc, 3, 2).len(), 2);
    }

    #[test]
    fn test_reflexive_resolves_to_clause_local_subject() {
        // "The cheetah chased itself": cheetah(0) chased(1) itself(2)
        let mut verb = TokenAnnotation::new("chased", "chase", PartOfSpeech::Verb);
        verb.add_child(SemanticEdge::new(0, SemanticRole::Subject));
        verb.add_child(SemanticEdge::new(2, SemanticRole::DirectObject));
        let mut reflexive = TokenAnnotation::new("itself", "itself", PartOfSpeech::Pronoun);
        reflexive.flags |= MorphFlags::REFLEXIVE;
        let doc = Document::freeze(vec![noun("cheetah"), verb, reflexive], Vec::new());

        let antecedents = antecedents_of(&doc, 2, 10);
        assert_eq!(antecedents.len(), 1);
        assert_eq!(antecedents[0].root, 0);
        assert!(!antecedents[0].conjoined);
    }
}
