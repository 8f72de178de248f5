use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum PartOfSpeech {
    Noun = 0,
    ProperNoun = 1,
    Verb = 2,
    Adjective = 3,
    Adverb = 4,
    Pronoun = 5,
    Determiner = 6,
    Preposition = 7,
    Conjunction = 8,
    Particle = 9,
    Numeral = 10,
    Interjection = 11,
    Punctuation = 12,
    Other = 13,
}

impl PartOfSpeech {
    /// Tag used in the raw-parse interchange format.
    pub fn label(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::ProperNoun => "PROPN",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Adjective => "ADJ",
            PartOfSpeech::Adverb => "ADV",
            PartOfSpeech::Pronoun => "PRON",
            PartOfSpeech::Determiner => "DET",
            PartOfSpeech::Preposition => "ADP",
            PartOfSpeech::Conjunction => "CONJ",
            PartOfSpeech::Particle => "PART",
            PartOfSpeech::Numeral => "NUM",
            PartOfSpeech::Interjection => "INTJ",
            PartOfSpeech::Punctuation => "PUNCT",
            PartOfSpeech::Other => "X",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "NOUN" => PartOfSpeech::Noun,
            "PROPN" => PartOfSpeech::ProperNoun,
            "VERB" => PartOfSpeech::Verb,
            "ADJ" => PartOfSpeech::Adjective,
            "ADV" => PartOfSpeech::Adverb,
            "PRON" => PartOfSpeech::Pronoun,
            "DET" => PartOfSpeech::Determiner,
            "ADP" => PartOfSpeech::Preposition,
            "CONJ" => PartOfSpeech::Conjunction,
            "PART" => PartOfSpeech::Particle,
            "NUM" => PartOfSpeech::Numeral,
            "INTJ" => PartOfSpeech::Interjection,
            "PUNCT" => PartOfSpeech::Punctuation,
            "X" => PartOfSpeech::Other,
            _ => return None,
        })
    }

    /// Content words are the ones the embedding channel may compare.
    pub fn is_content_word(self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun
                | PartOfSpeech::ProperNoun
                | PartOfSpeech::Verb
                | PartOfSpeech::Adjective
                | PartOfSpeech::Adverb
        )
    }
}

bitflags! {
    /// Morphological features of a token, as delivered by the external
    /// tagger. One flag per feature value; absent axes stay empty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct MorphFlags: u32 {
        // Number (Bits 0-1)
        const SINGULAR = 1;
        const PLURAL = 2;

        // Person (Bits 2-4)
        const FIRST_PERSON = 4;
        const SECOND_PERSON = 8;
        const THIRD_PERSON = 16;

        // Voice (Bits 5-6)
        const ACTIVE = 32;
        const PASSIVE = 64;

        // Tense (Bits 7-9)
        const PRESENT = 128;
        const PAST = 256;
        const FUTURE = 512;

        // Verb form (Bits 10-12)
        const FINITE = 1024;
        const INFINITIVE = 2048;
        const PARTICIPLE = 4096;

        // Lexical classes that steer normalization (Bits 13-17)
        const MODAL = 8192;
        const REFLEXIVE = 16384;
        const RELATIVE = 32768;
        const GENERIC = 65536;
        const DISJUNCTIVE = 131072;

        // Negation operators / quantifiers ("no", "nobody") (Bit 18)
        const NEGATING = 262144;
    }
}

impl MorphFlags {
    /// Parses one feature label of the interchange format.
    pub fn from_label(label: &str) -> Option<MorphFlags> {
        Some(match label {
            "Sing" => MorphFlags::SINGULAR,
            "Plur" => MorphFlags::PLURAL,
            "First" => MorphFlags::FIRST_PERSON,
            "Second" => MorphFlags::SECOND_PERSON,
            "Third" => MorphFlags::THIRD_PERSON,
            "Act" => MorphFlags::ACTIVE,
            "Pass" => MorphFlags::PASSIVE,
            "Pres" => MorphFlags::PRESENT,
            "Past" => MorphFlags::PAST,
            "Fut" => MorphFlags::FUTURE,
            "Fin" => MorphFlags::FINITE,
            "Inf" => MorphFlags::INFINITIVE,
            "Part" => MorphFlags::PARTICIPLE,
            "Modal" => MorphFlags::MODAL,
            "Reflex" => MorphFlags::REFLEXIVE,
            "Rel" => MorphFlags::RELATIVE,
            "Generic" => MorphFlags::GENERIC,
            "Disj" => MorphFlags::DISJUNCTIVE,
            "Negating" => MorphFlags::NEGATING,
            _ => return None,
        })
    }

    /// Parses a `|`-separated feature column ("Past|Act|Third").
    /// Unknown labels are skipped rather than failing the token.
    pub fn from_column(column: &str) -> MorphFlags {
        let mut flags = MorphFlags::empty();
        if column == "_" {
            return flags;
        }
        for label in column.split('|') {
            if let Some(flag) = MorphFlags::from_label(label) {
                flags |= flag;
            }
        }
        flags
    }
}

bitflags! {
    /// Properties of a morpheme lexicon entry consulted by the
    /// subword decomposer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct MorphemeFlags: u32 {
        /// Entry may appear even though it is below the minimum
        /// morpheme length ("vor").
        const SHORT_OK = 1;
        /// Entry negates the compound it opens ("nicht", "un").
        const NEGATOR = 2;
        /// Entry must not be the final (head) morpheme of a
        /// decomposition ("keit").
        const NOT_FINAL = 4;
    }
}

// rkyv support for MorphemeFlags
impl Archive for MorphemeFlags {
    type Archived = u32;
    type Resolver = ();

    unsafe fn resolve(&self, _pos: usize, _resolver: Self::Resolver, out: *mut Self::Archived) {
        out.write(self.bits());
    }
}

impl<S: rkyv::ser::Serializer + ?Sized> Serialize<S> for MorphemeFlags {
    fn serialize(&self, _serializer: &mut S) -> Result<Self::Resolver, S::Error> {
        Ok(())
    }
}

impl<D: rkyv::Fallible + ?Sized> Deserialize<MorphemeFlags, D> for u32 {
    fn deserialize(&self, _deserializer: &mut D) -> Result<MorphemeFlags, D::Error> {
        Ok(MorphemeFlags::from_bits(*self)
            .unwrap_or_else(|| MorphemeFlags::from_bits_truncate(*self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_morph_column_parsing() {
        let flags = MorphFlags::from_column("Past|Act|Third|Sing");
        assert!(flags.contains(MorphFlags::PAST));
        assert!(flags.contains(MorphFlags::ACTIVE));
        assert!(flags.contains(MorphFlags::THIRD_PERSON));
        assert!(flags.contains(MorphFlags::SINGULAR));
        assert!(!flags.contains(MorphFlags::PASSIVE));
    }

    #[test]
    fn test_morph_column_empty_marker() {
        assert!(MorphFlags::from_column("_").is_empty());
    }

    #[test]
    fn test_morph_column_skips_unknown_labels() {
        let flags = MorphFlags::from_column("Past|Bogus|Act");
        assert_eq!(flags, MorphFlags::PAST | MorphFlags::ACTIVE);
    }

    #[test]
    fn test_pos_label_round_trip() {
        for pos in [
            PartOfSpeech::Noun,
            PartOfSpeech::ProperNoun,
            PartOfSpeech::Verb,
            PartOfSpeech::Pronoun,
            PartOfSpeech::Punctuation,
        ] {
            assert_eq!(PartOfSpeech::from_label(pos.label()), Some(pos));
        }
    }
}
