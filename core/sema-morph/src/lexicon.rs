use std::collections::{HashMap, HashSet};

use sema_protocol::{MorphemeFlags, MorphemeLexicon, PartOfSpeech, SuffixRule};

/// One morpheme root known to the decomposer.
#[derive(Debug, Clone)]
pub struct LexEntry {
    pub lemma: String,
    pub flags: MorphemeFlags,
}

/// Runtime form of the compiled morpheme lexicon: root lookup table,
/// boundary rules and the suffix-mapping rule sets.
#[derive(Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, LexEntry>,
    max_entry_chars: usize,
    pub min_morpheme_length: usize,
    pub max_segmentation_score: u32,
    bigraph_blacklist: HashSet<String>,
    linking_elements: Vec<String>,
    derivation_rules: Vec<SuffixRule>,
    inflection_rules: Vec<SuffixRule>,
    generic_pronouns: HashSet<String>,
    reporting_verbs: HashSet<String>,
}

impl Lexicon {
    pub fn from_artifact(source: &MorphemeLexicon) -> Self {
        let mut entries = HashMap::new();
        let mut max_entry_chars = 0;
        for def in &source.morphemes {
            let text = def.text.to_lowercase();
            max_entry_chars = max_entry_chars.max(text.chars().count());
            entries.insert(
                text,
                LexEntry {
                    lemma: def.lemma.to_lowercase(),
                    flags: def.flags,
                },
            );
        }
        Lexicon {
            entries,
            max_entry_chars,
            min_morpheme_length: source.min_morpheme_length.max(2) as usize,
            max_segmentation_score: source.max_segmentation_score,
            bigraph_blacklist: source.bigraph_blacklist.iter().cloned().collect(),
            linking_elements: source.linking_elements.clone(),
            derivation_rules: source.derivation_rules.clone(),
            inflection_rules: source.inflection_rules.clone(),
            generic_pronouns: source
                .generic_pronouns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            reporting_verbs: source
                .reporting_verbs
                .iter()
                .map(|v| v.to_lowercase())
                .collect(),
        }
    }

    pub fn lookup(&self, morpheme: &str) -> Option<&LexEntry> {
        self.entries.get(morpheme)
    }

    pub fn max_entry_chars(&self) -> usize {
        self.max_entry_chars
    }

    pub fn linking_elements(&self) -> &[String] {
        &self.linking_elements
    }

    /// True when the boundary between `left` and `right` would split a
    /// blacklisted letter bigraph.
    pub fn violates_bigraph(&self, left: &str, right: &str) -> bool {
        match (left.chars().last(), right.chars().next()) {
            (Some(a), Some(b)) => {
                let mut bigraph = String::with_capacity(8);
                bigraph.push(a);
                bigraph.push(b);
                self.bigraph_blacklist.contains(&bigraph)
            }
            _ => false,
        }
    }

    /// Rescues a trailing inflected morpheme: strips the longest
    /// matching inflection suffix and returns the lexicon lemma of the
    /// restored stem, if any.
    pub fn rescue_inflected(&self, fragment: &str) -> Option<&LexEntry> {
        let mut rules: Vec<&SuffixRule> = self
            .inflection_rules
            .iter()
            .filter(|r| fragment.ends_with(r.suffix.as_str()))
            .collect();
        rules.sort_by_key(|r| std::cmp::Reverse(r.suffix.chars().count()));
        for rule in rules {
            let stem_len = fragment.len() - rule.suffix.len();
            let mut restored = String::with_capacity(stem_len + rule.replacement.len());
            restored.push_str(&fragment[..stem_len]);
            restored.push_str(&rule.replacement);
            if let Some(entry) = self.entries.get(&restored) {
                return Some(entry);
            }
        }
        None
    }

    /// Computes the derived lemma of `lemma` via the suffix-mapping
    /// rules (deverbal nominalizations to the verb stem, diminutive
    /// stripping). Returns `None` when no rule applies.
    pub fn derived_lemma(&self, lemma: &str, pos: PartOfSpeech) -> Option<String> {
        let mut rules: Vec<&SuffixRule> = self
            .derivation_rules
            .iter()
            .filter(|r| r.pos == pos && lemma.ends_with(r.suffix.as_str()) && lemma.len() > r.suffix.len())
            .collect();
        rules.sort_by_key(|r| std::cmp::Reverse(r.suffix.chars().count()));
        let rule = rules.first()?;
        let stem_len = lemma.len() - rule.suffix.len();
        let mut derived = String::with_capacity(stem_len + rule.replacement.len());
        derived.push_str(&lemma[..stem_len]);
        derived.push_str(&rule.replacement);
        if derived == lemma {
            None
        } else {
            Some(derived)
        }
    }

    pub fn is_generic_pronoun(&self, lemma: &str) -> bool {
        self.generic_pronouns.contains(lemma)
    }

    pub fn is_reporting_verb(&self, lemma: &str) -> bool {
        self.reporting_verbs.contains(lemma)
    }
}
