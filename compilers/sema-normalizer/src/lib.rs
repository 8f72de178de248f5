//! Dependency normalization: from raw parses to canonical
//! predicate-argument graphs.

pub mod input;
pub mod normalize;
pub mod reader;

pub use input::{MentionSpan, ParsedText, SurfaceToken, TextPipeline, TsvPipeline};
pub use normalize::Normalizer;
pub use reader::read_document;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sema_anno::Document;
    use sema_morph::{Decomposer, Lexicon};
    use sema_protocol::{
        MorphemeDef, MorphemeFlags, MorphemeLexicon, PartOfSpeech, SuffixRule,
    };

    fn entry(text: &str, lemma: &str, flags: MorphemeFlags) -> MorphemeDef {
        MorphemeDef {
            text: text.into(),
            lemma: lemma.into(),
            flags,
        }
    }

    fn normalizer() -> Normalizer {
        let lexicon = MorphemeLexicon {
            version: 1,
            min_morpheme_length: 3,
            max_segmentation_score: 10,
            morphemes: vec![
                entry("haupt", "haupt", MorphemeFlags::empty()),
                entry("seiten", "seite", MorphemeFlags::empty()),
                entry("eingang", "eingang", MorphemeFlags::empty()),
                entry("nicht", "nicht", MorphemeFlags::NEGATOR),
                entry("beachtung", "beachtung", MorphemeFlags::empty()),
            ],
            derivation_rules: vec![SuffixRule {
                pos: PartOfSpeech::Noun,
                suffix: "uit".into(),
                replacement: "ue".into(),
            }],
            inflection_rules: vec![SuffixRule {
                pos: PartOfSpeech::Noun,
                suffix: "änge".into(),
                replacement: "ang".into(),
            }],
            bigraph_blacklist: vec![],
            linking_elements: vec!["s".into()],
            generic_pronouns: vec!["somebody".into(), "jemand".into()],
            reporting_verbs: vec!["say".into(), "claim".into()],
        };
        Normalizer::new(Arc::new(Decomposer::new(Arc::new(Lexicon::from_artifact(
            &lexicon,
        )))))
    }

    /// Rows use spaces instead of tabs for readability.
    fn normalize_rows(rows: &[&str]) -> Document {
        let text = rows
            .iter()
            .map(|r| r.split(' ').collect::<Vec<_>>().join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
        normalizer().normalize(&read_document(&text))
    }

    #[test]
    fn test_initialize_semantic_dependencies() {
        let doc = normalize_rows(&[
            "1 The the DET _ 3 det",
            "2 dog dog NOUN Sing 3 subj",
            "3 chased chase VERB Past|Act 0 root",
            "4 the the DET _ 5 det",
            "5 cat cat NOUN Sing 3 obj",
        ]);
        assert_eq!(
            doc.token(2).string_representation_of_children(),
            "1:subj; 4:dobj"
        );
        assert_eq!(doc.token(0).string_representation_of_children(), "");
        assert_eq!(doc.token(1).string_representation_of_children(), "");
        assert!(!doc.token(0).is_matchable);
        assert!(doc.token(1).is_matchable);
    }

    #[test]
    fn test_auxiliary_collapses_to_trace() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 4 subj",
            "3 has have VERB Pres 4 aux",
            "4 chased chase VERB Part 0 root",
            "5 the the DET _ 6 det",
            "6 cat cat NOUN Sing 4 obj",
        ]);
        assert_eq!(
            doc.token(3).string_representation_of_children(),
            "1:subj; 5:dobj"
        );
        assert_eq!(doc.token(2).string_representation_of_children(), "-4:none");
        assert!(!doc.token(2).is_matchable);
    }

    #[test]
    fn test_passive_remaps_to_active() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 cat cat NOUN Sing 4 subj",
            "3 was be VERB Past 4 auxpass",
            "4 chased chase VERB Part|Pass 0 root",
            "5 by by ADP _ 4 prep",
            "6 the the DET _ 7 det",
            "7 dog dog NOUN Sing 4 agent",
        ]);
        assert_eq!(
            doc.token(3).string_representation_of_children(),
            "1:dobj; 4:prep; 6:subj"
        );
        assert_eq!(doc.token(2).string_representation_of_children(), "-4:none");
    }

    #[test]
    fn test_and_conjunction_registration_and_propagation() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 6 subj",
            "3 and and CONJ _ 2 cc",
            "4 the the DET _ 5 det",
            "5 lion lion NOUN Sing 2 conj",
            "6 chased chase VERB Past|Act 0 root",
            "7 the the DET _ 8 det",
            "8 cat cat NOUN Sing 6 obj",
        ]);
        assert_eq!(doc.token(1).righthand_siblings, vec![4]);
        assert!(doc.token(4).righthand_siblings.is_empty());
        assert!(!doc.token(1).is_involved_in_or_conjunction);
        assert_eq!(doc.token(1).string_representation_of_children(), "2:cc");
        assert_eq!(
            doc.token(5).string_representation_of_children(),
            "1:subj; 4:subj; 7:dobj"
        );
    }

    #[test]
    fn test_or_conjunction_sets_flag_on_all_siblings() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 6 subj",
            "3 or or CONJ Disj 2 cc",
            "4 the the DET _ 5 det",
            "5 lion lion NOUN Sing 2 conj",
            "6 chased chase VERB Past|Act 0 root",
            "7 the the DET _ 8 det",
            "8 cat cat NOUN Sing 6 obj",
        ]);
        assert!(doc.token(1).is_involved_in_or_conjunction);
        assert!(doc.token(4).is_involved_in_or_conjunction);
        assert!(!doc.token(7).is_involved_in_or_conjunction);
    }

    #[test]
    fn test_conjunction_everywhere() {
        // Conjoined subjects, objects and verbs: every conjoined verb
        // ends up with the full argument product.
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 7 subj",
            "3 and and CONJ _ 2 cc",
            "4 the the DET _ 5 det",
            "5 lion lion NOUN Sing 2 conj",
            "6 will will VERB _ 7 aux",
            "7 chase chase VERB Inf 0 root",
            "8 and and CONJ _ 7 cc",
            "9 eat eat VERB Inf 7 conj",
            "10 the the DET _ 11 det",
            "11 cat cat NOUN Sing 7 obj",
            "12 and and CONJ _ 11 cc",
            "13 the the DET _ 14 det",
            "14 mouse mouse NOUN Sing 11 conj",
        ]);
        assert_eq!(
            doc.token(6).string_representation_of_children(),
            "1:subj; 4:subj; 7:cc; 10:dobj; 13:dobj"
        );
        assert_eq!(
            doc.token(8).string_representation_of_children(),
            "1:subj; 4:subj; 10:dobj; 13:dobj"
        );
    }

    #[test]
    fn test_modal_threading_is_uncertain() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 3 subj",
            "3 must must VERB Modal 0 root",
            "4 chase chase VERB Inf 3 xcomp",
            "5 the the DET _ 6 det",
            "6 cat cat NOUN Sing 3 obj",
        ]);
        assert_eq!(
            doc.token(3).string_representation_of_children(),
            "1:subj(U); 5:dobj(U)"
        );
        assert_eq!(doc.token(2).string_representation_of_children(), "-4:none");
        assert!(!doc.token(2).is_matchable);
    }

    #[test]
    fn test_negated_modal_projects_negation() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 3 subj",
            "3 must must VERB Modal 0 root",
            "4 not not PART _ 3 neg",
            "5 chase chase VERB Inf 3 xcomp",
            "6 the the DET _ 7 det",
            "7 cat cat NOUN Sing 3 obj",
        ]);
        assert_eq!(
            doc.token(4).string_representation_of_children(),
            "1:subj(U); 3:neg(U); 6:dobj(U)"
        );
        assert!(doc.token(4).is_negated);
    }

    #[test]
    fn test_subject_control_threading() {
        let doc = normalize_rows(&[
            "1 Somebody somebody PRON Generic 2 subj",
            "2 tries try VERB Pres 0 root",
            "3 to to PART _ 4 mark",
            "4 explain explain VERB Inf 2 xcomp",
        ]);
        assert_eq!(
            doc.token(1).string_representation_of_children(),
            "0:subj; 3:comp"
        );
        assert_eq!(
            doc.token(3).string_representation_of_children(),
            "0:subj(U); 2:mark"
        );
        assert!(doc.token(1).is_matchable);
    }

    #[test]
    fn test_object_control_threading() {
        let doc = normalize_rows(&[
            "1 She she PRON Sing 2 subj",
            "2 asked ask VERB Past 0 root",
            "3 him he PRON Sing 2 obj",
            "4 to to PART _ 5 mark",
            "5 go go VERB Inf 2 xcomp",
        ]);
        assert_eq!(
            doc.token(4).string_representation_of_children(),
            "2:subj(U); 3:mark"
        );
    }

    #[test]
    fn test_raising_adjective_binds_object_certainly() {
        let doc = normalize_rows(&[
            "1 A a DET _ 2 det",
            "2 holiday holiday NOUN Sing 3 subj",
            "3 is be VERB Pres 0 root",
            "4 hard hard ADJ _ 3 pred",
            "5 to to PART _ 6 mark",
            "6 find find VERB Inf 4 xcomp",
        ]);
        // The copula degrades to a trace of its subject.
        assert_eq!(doc.token(2).string_representation_of_children(), "-2:none");
        assert!(!doc.token(2).is_matchable);
        assert_eq!(doc.token(1).string_representation_of_children(), "3:attr");
        assert_eq!(
            doc.token(5).string_representation_of_children(),
            "1:dobj; 4:mark"
        );
    }

    #[test]
    fn test_relative_pronoun_nominative() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 7 subj",
            "3 that that PRON Rel 4 subj",
            "4 chased chase VERB Past|Act 2 relcl",
            "5 the the DET _ 6 det",
            "6 cat cat NOUN Sing 4 obj",
            "7 was be VERB Past 0 root",
            "8 tired tired ADJ _ 7 pred",
        ]);
        assert_eq!(
            doc.token(3).string_representation_of_children(),
            "1:subj; 5:dobj"
        );
        assert!(!doc.token(2).is_matchable);
        assert_eq!(doc.token(1).string_representation_of_children(), "7:attr");
    }

    #[test]
    fn test_relative_pronoun_accusative() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 bear bear NOUN Sing 8 subj",
            "3 that that PRON Rel 6 obj",
            "4 the the DET _ 5 det",
            "5 dog dog NOUN Sing 6 subj",
            "6 chased chase VERB Past|Act 2 relcl",
            "7 . . PUNCT _ 8 punct",
            "8 was be VERB Past 0 root",
            "9 tired tired ADJ _ 8 pred",
        ]);
        assert_eq!(
            doc.token(5).string_representation_of_children(),
            "1:dobj; 4:subj"
        );
    }

    #[test]
    fn test_relative_clause_with_passive() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 cat cat NOUN Sing 8 subj",
            "3 that that PRON Rel 5 subj",
            "4 was be VERB Past 5 auxpass",
            "5 chased chase VERB Part|Pass 2 relcl",
            "6 by by ADP _ 5 prep",
            "7 dog dog NOUN Sing 5 agent",
            "8 ran run VERB Past 0 root",
        ]);
        assert_eq!(
            doc.token(4).string_representation_of_children(),
            "1:dobj; 5:prep; 6:subj"
        );
    }

    #[test]
    fn test_relative_clause_conjoined_antecedents() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 8 subj",
            "3 and and CONJ _ 2 cc",
            "4 the the DET _ 5 det",
            "5 bear bear NOUN Sing 2 conj",
            "6 that that PRON Rel 7 subj",
            "7 growled growl VERB Past|Act 5 relcl",
            "8 fled flee VERB Past 0 root",
        ]);
        // Certain to the attachment antecedent, uncertain to the other
        // conjoined members.
        assert_eq!(
            doc.token(6).string_representation_of_children(),
            "1:subj(U); 4:subj"
        );
    }

    #[test]
    fn test_predicative_adjective() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 3 subj",
            "3 was be VERB Past 0 root",
            "4 big big ADJ _ 3 pred",
        ]);
        assert_eq!(doc.token(1).string_representation_of_children(), "3:attr");
        assert_eq!(doc.token(2).string_representation_of_children(), "-2:none");
        assert!(doc.token(3).is_matchable);
    }

    #[test]
    fn test_negation_particle_within_clause() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 5 subj",
            "3 did do VERB Past 5 aux",
            "4 not not PART _ 5 neg",
            "5 chase chase VERB Inf 0 root",
            "6 the the DET _ 7 det",
            "7 cat cat NOUN Sing 5 obj",
        ]);
        assert!(doc.token(4).is_negated);
        assert_eq!(
            doc.token(4).string_representation_of_children(),
            "1:subj; 3:neg; 6:dobj"
        );
        assert!(!doc.token(3).is_matchable);
    }

    #[test]
    fn test_negating_operator_marks_its_governor() {
        let doc = normalize_rows(&[
            "1 No no DET Negating 2 det",
            "2 dog dog NOUN Sing 3 subj",
            "3 chased chase VERB Past|Act 0 root",
            "4 the the DET _ 5 det",
            "5 cat cat NOUN Sing 3 obj",
        ]);
        assert!(doc.token(1).is_negated);
        assert!(!doc.token(2).is_negated);
    }

    #[test]
    fn test_negated_reporting_verb_projects_into_complement() {
        let doc = normalize_rows(&[
            "1 He he PRON Sing 4 subj",
            "2 did do VERB Past 4 aux",
            "3 not not PART _ 4 neg",
            "4 say say VERB Inf 0 root",
            "5 that that PART _ 8 mark",
            "6 the the DET _ 7 det",
            "7 dog dog NOUN Sing 8 subj",
            "8 chased chase VERB Past|Act 4 ccomp",
            "9 the the DET _ 10 det",
            "10 cat cat NOUN Sing 8 obj",
        ]);
        assert!(doc.token(3).is_negated);
        assert!(doc.token(7).is_negated);
    }

    #[test]
    fn test_nonreporting_verb_negation_stays_local() {
        let doc = normalize_rows(&[
            "1 He he PRON Sing 4 subj",
            "2 did do VERB Past 4 aux",
            "3 not not PART _ 4 neg",
            "4 hope hope VERB Inf 0 root",
            "5 that that PART _ 8 mark",
            "6 the the DET _ 7 det",
            "7 dog dog NOUN Sing 8 subj",
            "8 chased chase VERB Past|Act 4 ccomp",
            "9 the the DET _ 10 det",
            "10 cat cat NOUN Sing 8 obj",
        ]);
        assert!(doc.token(3).is_negated);
        assert!(!doc.token(7).is_negated);
    }

    #[test]
    fn test_preposition_threading() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 conclusion conclusion NOUN Sing 0 root",
            "3 of of ADP _ 2 prep",
            "4 an a DET _ 5 det",
            "5 insurance insurance NOUN Sing 3 pobj",
        ]);
        assert_eq!(
            doc.token(1).string_representation_of_children(),
            "2:prep; 4:pobj"
        );
        assert!(!doc.token(2).is_matchable);
    }

    #[test]
    fn test_dependency_cycle_degrades_without_panic() {
        let doc = normalize_rows(&[
            "1 alpha alpha NOUN _ 2 mod",
            "2 beta beta NOUN _ 1 mod",
        ]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.token(0).string_representation_of_children(), "");
        assert_eq!(doc.token(1).string_representation_of_children(), "");
        assert!(doc.token(0).is_matchable);
    }

    #[test]
    fn test_derived_lemma_from_suffix_rule() {
        let doc = normalize_rows(&["1 pursuit pursuit NOUN Sing 0 root"]);
        assert_eq!(doc.token(0).derived_lemma.as_deref(), Some("pursue"));
    }

    #[test]
    fn test_hyphenated_conjunct_borrows_head_morphemes() {
        let doc = normalize_rows(&[
            "1 Haupt- haupt NOUN Sing 0 root",
            "2 und und CONJ _ 1 cc",
            "3 Seiteneingänge seiteneingang NOUN Plur 1 conj",
        ]);
        let first = &doc.token(0).subwords;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].text, "haupt");
        assert_eq!(first[0].containing_token_index, 0);
        assert_eq!(first[0].char_start_index, 0);
        assert_eq!(first[1].text, "eingänge");
        assert_eq!(first[1].lemma, "eingang");
        assert_eq!(first[1].containing_token_index, 2);
        assert_eq!(first[1].char_start_index, 6);
        assert!(first[1].is_head);

        let second = &doc.token(2).subwords;
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].text, "seiten");
        assert_eq!(second[0].lemma, "seite");
        assert_eq!(second[0].containing_token_index, 2);
        assert_eq!(second[1].text, "eingänge");
    }

    #[test]
    fn test_negating_compound_morpheme_negates_token() {
        let doc = normalize_rows(&["1 Nichtbeachtung nichtbeachtung NOUN Sing 0 root"]);
        assert!(doc.token(0).is_negated);
        assert_eq!(doc.token(0).subwords.len(), 2);
    }

    #[test]
    fn test_proper_noun_multiword_span() {
        let doc = normalize_rows(&[
            "1 Peter peter PROPN Sing 2 mod",
            "2 Müller müller PROPN Sing 3 subj",
            "3 works work VERB Pres 0 root",
        ]);
        assert_eq!(
            doc.token(1).multiword_span.as_deref(),
            Some("peter müller")
        );
    }

    #[test]
    fn test_mention_chains_with_roots() {
        let doc = normalize_rows(&[
            "1 The the DET _ 2 det",
            "2 dog dog NOUN Sing 0 root",
            "",
            "1 It it PRON Sing 2 subj",
            "2 ran run VERB Past 0 root",
            "@coref 1 2",
        ]);
        assert_eq!(doc.chains().len(), 1);
        let chain = &doc.chains()[0];
        assert_eq!(chain.mentions.len(), 2);
        assert_eq!(chain.mentions[0].root, 1);
        assert!(!chain.mentions[0].is_pronominal);
        assert!(chain.mentions[1].is_pronominal);
        assert!(chain.has_lexical_anchor());
    }

    #[test]
    fn test_empty_text_produces_empty_document() {
        let doc = normalizer().normalize(&ParsedText::default());
        assert!(doc.is_empty());
    }
}
