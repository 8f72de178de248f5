use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use sema_anno::Subword;
use sema_protocol::{MorphemeFlags, PartOfSpeech, SemanticRole};

use crate::lexicon::Lexicon;

/// One morpheme of a raw segmentation, before per-occurrence subword
/// fields are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegPart {
    pub text: String,
    pub lemma: String,
    /// Character offset of the morpheme within the segmented surface.
    pub char_start: usize,
    pub is_negator: bool,
    flags: MorphemeFlags,
}

/// Cached decomposition of one case-folded surface form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segmentation {
    pub parts: Vec<SegPart>,
    pub negated: bool,
}

/// Compound decomposer with an append-only memo keyed by case-folded
/// surface form. Occurrence-specific fields (token index, subword
/// index) are recomputed per token, so the cache is shared freely
/// across documents and worker threads.
pub struct Decomposer {
    lexicon: Arc<Lexicon>,
    cache: RwLock<HashMap<String, Option<Arc<Segmentation>>>>,
}

impl Decomposer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Decomposer {
            lexicon,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Segments a compound surface form into two or more morphemes.
    /// Returns `None` for words that do not decompose: unknown
    /// material, implausible segmentations, or single known morphemes.
    pub fn segment(&self, surface: &str) -> Option<Arc<Segmentation>> {
        let folded = surface.to_lowercase();
        if let Some(cached) = self.cache.read().get(&folded) {
            return cached.clone();
        }
        let computed = self.split_word(&folded, false).map(Arc::new);
        trace!(word = %folded, parts = computed.as_ref().map(|s| s.parts.len()).unwrap_or(0), "segmented");
        self.cache
            .write()
            .entry(folded)
            .or_insert(computed)
            .clone()
    }

    /// Segments the stem of a hyphen-dangling conjunct ("Haupt-").
    /// Unlike `segment`, a single known morpheme is a valid result,
    /// since the head will be borrowed from a sibling token.
    pub fn segment_dangling(&self, surface: &str) -> Option<Arc<Segmentation>> {
        let stem = surface.trim_end_matches('-');
        let folded = format!("{}-", stem.to_lowercase());
        if let Some(cached) = self.cache.read().get(&folded) {
            return cached.clone();
        }
        let computed = self.split_word(&folded[..folded.len() - 1], true).map(Arc::new);
        self.cache
            .write()
            .entry(folded)
            .or_insert(computed)
            .clone()
    }

    fn split_word(&self, word: &str, allow_single: bool) -> Option<Segmentation> {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() || chars.iter().any(|c| !c.is_alphabetic()) {
            return None;
        }
        if let Some(entry) = self.lexicon.lookup(word) {
            if allow_single {
                return Some(Segmentation {
                    parts: vec![SegPart {
                        text: word.to_owned(),
                        lemma: entry.lemma.clone(),
                        char_start: 0,
                        is_negator: entry.flags.contains(MorphemeFlags::NEGATOR),
                        flags: entry.flags,
                    }],
                    negated: entry.flags.contains(MorphemeFlags::NEGATOR),
                });
            }
            // A single known morpheme is not a compound.
            return None;
        }

        let mut best: Option<(u32, Vec<SegPart>)> = None;
        let mut stack = Vec::new();
        self.search(&chars, 0, &mut stack, 0, &mut best);

        let (score, parts) = best?;
        if score > self.lexicon.max_segmentation_score {
            return None;
        }
        if parts.len() < 2 && !allow_single {
            return None;
        }
        let negated = parts.iter().any(|p| p.is_negator);
        Some(Segmentation { parts, negated })
    }

    /// Longest-prefix-first backtracking over the morpheme lexicon.
    fn search(
        &self,
        chars: &[char],
        pos: usize,
        parts: &mut Vec<SegPart>,
        score: u32,
        best: &mut Option<(u32, Vec<SegPart>)>,
    ) {
        if pos == chars.len() {
            if let Some(last) = parts.last() {
                if last.flags.contains(MorphemeFlags::NOT_FINAL) {
                    return;
                }
            }
            if best.as_ref().map(|(s, _)| score < *s).unwrap_or(true) {
                *best = Some((score, parts.clone()));
            }
            return;
        }
        let remaining = chars.len() - pos;
        let longest = remaining.min(self.lexicon.max_entry_chars());

        for len in (1..=longest).rev() {
            let prefix: String = chars[pos..pos + len].iter().collect();
            let Some(entry) = self.lexicon.lookup(&prefix) else {
                continue;
            };
            if len < self.lexicon.min_morpheme_length
                && !entry.flags.contains(MorphemeFlags::SHORT_OK)
            {
                continue;
            }
            if let Some(prev) = parts.last() {
                if self.lexicon.violates_bigraph(&prev.text, &prefix) {
                    continue;
                }
            }
            let part_score = 2 + if len < 4 { 3 } else { 0 };
            parts.push(SegPart {
                text: prefix,
                lemma: entry.lemma.clone(),
                char_start: pos,
                is_negator: entry.flags.contains(MorphemeFlags::NEGATOR),
                flags: entry.flags,
            });
            self.search(chars, pos + len, parts, score + part_score, best);
            // Retry with a linking element consumed after this morpheme.
            for element in self.lexicon.linking_elements() {
                let element_chars: Vec<char> = element.chars().collect();
                let after = pos + len + element_chars.len();
                if after < chars.len() && chars[pos + len..after] == element_chars[..] {
                    self.search(chars, after, parts, score + part_score, best);
                }
            }
            parts.pop();
        }

        // Trailing-fragment rescue via the inflection rules; only valid
        // as the final morpheme.
        if !parts.is_empty() {
            let fragment: String = chars[pos..].iter().collect();
            if self.lexicon.lookup(&fragment).is_none() {
                if let Some(entry) = self.lexicon.rescue_inflected(&fragment) {
                    if let Some(prev) = parts.last() {
                        if self.lexicon.violates_bigraph(&prev.text, &fragment) {
                            return;
                        }
                    }
                    let part_score = 2 + if remaining < 4 { 3 } else { 0 };
                    parts.push(SegPart {
                        text: fragment,
                        lemma: entry.lemma.clone(),
                        char_start: pos,
                        is_negator: entry.flags.contains(MorphemeFlags::NEGATOR),
                        flags: entry.flags,
                    });
                    self.search(chars, chars.len(), parts, score + part_score, best);
                    parts.pop();
                }
            }
        }
    }

    /// Builds the subword list of one token occurrence. Returns the
    /// subwords plus whether a negating morpheme was found.
    pub fn subwords_for(
        &self,
        token_index: usize,
        surface: &str,
        pos: PartOfSpeech,
    ) -> (Vec<Subword>, bool) {
        if !matches!(
            pos,
            PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Other
        ) {
            return (Vec::new(), false);
        }
        let Some(segmentation) = self.segment(surface) else {
            return (Vec::new(), false);
        };
        let subwords = finalize_chain(
            segmentation
                .parts
                .iter()
                .map(|part| self.subword_from_part(part, token_index))
                .collect(),
        );
        (subwords, segmentation.negated)
    }

    /// Converts a cached segmentation part into an occurrence-bound
    /// subword; chain fields are left for `finalize_chain`.
    pub fn subword_from_part(&self, part: &SegPart, containing_token_index: usize) -> Subword {
        Subword {
            text: part.text.clone(),
            lemma: part.lemma.clone(),
            derived_lemma: self.lexicon.derived_lemma(&part.lemma, PartOfSpeech::Noun),
            index: 0,
            containing_token_index,
            char_start_index: part.char_start,
            is_head: false,
            dependent_index: None,
            governor_index: None,
            governing_dependency_label: None,
        }
    }
}

/// Renumbers a composed subword list and rebuilds the morpheme chain:
/// each non-head morpheme governs the next, the last morpheme is the
/// head.
pub fn finalize_chain(mut subwords: Vec<Subword>) -> Vec<Subword> {
    let last = subwords.len().saturating_sub(1);
    for (i, subword) in subwords.iter_mut().enumerate() {
        subword.index = i;
        subword.is_head = i == last;
        subword.dependent_index = if i > 0 { Some(i - 1) } else { None };
        subword.governor_index = if i < last { Some(i + 1) } else { None };
        subword.governing_dependency_label = if i < last {
            Some(SemanticRole::Modifier)
        } else {
            None
        };
    }
    subwords
}
