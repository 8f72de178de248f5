use crate::morphology::{MorphemeFlags, PartOfSpeech};
use alloc::string::String;
use alloc::vec::Vec;
use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// One class of the ontology hierarchy, with its synonym ring and the
/// named individuals that instantiate it. `parent` is the hypernym.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct OntologyClassDef {
    pub name: String,
    pub parent: Option<String>,
    pub synonyms: Vec<String>,
    pub individuals: Vec<String>,
}

#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct OntologySource {
    pub version: u32,
    pub classes: Vec<OntologyClassDef>,
}

/// One root of the morpheme lexicon. `lemma` is the citation form
/// restored when the entry is matched in an inflected or linked shape
/// ("seiten" -> "seite").
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct MorphemeDef {
    pub text: String,
    pub lemma: String,
    pub flags: MorphemeFlags,
}

/// Suffix-mapping rule, used both for derivational normalization
/// (nominalization -> verb stem) and final-morpheme lemmatization.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SuffixRule {
    pub pos: PartOfSpeech,
    pub suffix: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct MorphemeLexicon {
    pub version: u32,
    /// Morphemes shorter than this are rejected unless SHORT_OK.
    pub min_morpheme_length: u32,
    /// Segmentations scoring above this are treated as implausible.
    pub max_segmentation_score: u32,
    pub morphemes: Vec<MorphemeDef>,
    /// derived-lemma rules ("-ung" nominalizations to the verb stem).
    pub derivation_rules: Vec<SuffixRule>,
    /// inflection rules rescuing a trailing inflected morpheme.
    pub inflection_rules: Vec<SuffixRule>,
    /// Letter bigraphs that may never straddle a morpheme boundary.
    pub bigraph_blacklist: Vec<String>,
    /// Linking elements consumed between morphemes ("s").
    pub linking_elements: Vec<String>,
    /// Lemmas of generic pronouns that act as wildcards in search
    /// phrases ("somebody", "jemand").
    pub generic_pronouns: Vec<String>,
    /// Reporting verbs whose negation projects into their clausal
    /// complement ("say", "claim").
    pub reporting_verbs: Vec<String>,
}

/// The compiled artifact loaded at engine construction. Produced from
/// JSON definitions by the atlas compiler, stored as rkyv binary.
#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct Atlas {
    pub version: u32,
    pub ontology: OntologySource,
    pub lexicon: MorphemeLexicon,
}

impl Atlas {
    pub fn empty() -> Self {
        Atlas {
            version: 1,
            ontology: OntologySource::default(),
            lexicon: MorphemeLexicon::default(),
        }
    }
}
