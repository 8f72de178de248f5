use core::fmt;

use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Surface dependency label as delivered by the external parser.
///
/// This is a closed vocabulary: the reader rejects anything else, so
/// the normalizer never sees a label it has no rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum SurfaceRelation {
    Root = 0,
    Subject = 1,
    Object = 2,
    IndirectObject = 3,
    /// "by"-phrase agent of a passive verb.
    Agent = 4,
    /// Tense auxiliary attached to its content verb.
    Auxiliary = 5,
    /// Passive auxiliary attached to its content verb.
    PassiveAuxiliary = 6,
    /// Predicative complement of a copula ("the dog was BIG").
    Predicate = 7,
    /// Negation particle.
    Negation = 8,
    /// Coordinating conjunction token, attached to the first conjunct.
    Coordinator = 9,
    /// Non-initial conjunct, attached to the first conjunct.
    Conjunct = 10,
    /// Relative-clause verb attached to the antecedent noun.
    RelativeClause = 11,
    /// Finite clausal complement ("said THAT ... CHASED ...").
    ClausalComplement = 12,
    /// Non-finite (controlled/raised) clausal complement.
    OpenComplement = 13,
    /// Complementizer or infinitival marker ("that", "to").
    Marker = 14,
    /// Preposition attached to the phrase it modifies.
    Preposition = 15,
    /// Noun governed by a preposition.
    PrepositionalObject = 16,
    Determiner = 17,
    /// Adjectival or generic modifier.
    Modifier = 18,
    Punctuation = 19,
}

impl SurfaceRelation {
    pub fn label(self) -> &'static str {
        match self {
            SurfaceRelation::Root => "root",
            SurfaceRelation::Subject => "subj",
            SurfaceRelation::Object => "obj",
            SurfaceRelation::IndirectObject => "iobj",
            SurfaceRelation::Agent => "agent",
            SurfaceRelation::Auxiliary => "aux",
            SurfaceRelation::PassiveAuxiliary => "auxpass",
            SurfaceRelation::Predicate => "pred",
            SurfaceRelation::Negation => "neg",
            SurfaceRelation::Coordinator => "cc",
            SurfaceRelation::Conjunct => "conj",
            SurfaceRelation::RelativeClause => "relcl",
            SurfaceRelation::ClausalComplement => "ccomp",
            SurfaceRelation::OpenComplement => "xcomp",
            SurfaceRelation::Marker => "mark",
            SurfaceRelation::Preposition => "prep",
            SurfaceRelation::PrepositionalObject => "pobj",
            SurfaceRelation::Determiner => "det",
            SurfaceRelation::Modifier => "mod",
            SurfaceRelation::Punctuation => "punct",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "root" => SurfaceRelation::Root,
            "subj" => SurfaceRelation::Subject,
            "obj" => SurfaceRelation::Object,
            "iobj" => SurfaceRelation::IndirectObject,
            "agent" => SurfaceRelation::Agent,
            "aux" => SurfaceRelation::Auxiliary,
            "auxpass" => SurfaceRelation::PassiveAuxiliary,
            "pred" => SurfaceRelation::Predicate,
            "neg" => SurfaceRelation::Negation,
            "cc" => SurfaceRelation::Coordinator,
            "conj" => SurfaceRelation::Conjunct,
            "relcl" => SurfaceRelation::RelativeClause,
            "ccomp" => SurfaceRelation::ClausalComplement,
            "xcomp" => SurfaceRelation::OpenComplement,
            "mark" => SurfaceRelation::Marker,
            "prep" => SurfaceRelation::Preposition,
            "pobj" => SurfaceRelation::PrepositionalObject,
            "det" => SurfaceRelation::Determiner,
            "mod" => SurfaceRelation::Modifier,
            "punct" => SurfaceRelation::Punctuation,
            _ => return None,
        })
    }
}

impl fmt::Display for SurfaceRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical semantic dependency label after normalization.
///
/// The matcher aligns edges by these labels only; every surface
/// construction (passive, relative clause, control, ...) has been
/// rewritten onto this vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum SemanticRole {
    Subject = 0,
    DirectObject = 1,
    IndirectObject = 2,
    /// Object threaded through a preposition to the governing word.
    PrepObject = 3,
    /// Adjectival attribute, including resolved predicative adjectives.
    Attribute = 4,
    Modifier = 5,
    /// The preposition token itself.
    Preposition = 6,
    /// Edge to the coordinating conjunction token.
    Coordinator = 7,
    /// Embedded clause predicate.
    Complement = 8,
    Marker = 9,
    Negator = 10,
}

impl SemanticRole {
    pub fn label(self) -> &'static str {
        match self {
            SemanticRole::Subject => "subj",
            SemanticRole::DirectObject => "dobj",
            SemanticRole::IndirectObject => "iobj",
            SemanticRole::PrepObject => "pobj",
            SemanticRole::Attribute => "attr",
            SemanticRole::Modifier => "mod",
            SemanticRole::Preposition => "prep",
            SemanticRole::Coordinator => "cc",
            SemanticRole::Complement => "comp",
            SemanticRole::Marker => "mark",
            SemanticRole::Negator => "neg",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "subj" => SemanticRole::Subject,
            "dobj" => SemanticRole::DirectObject,
            "iobj" => SemanticRole::IndirectObject,
            "pobj" => SemanticRole::PrepObject,
            "attr" => SemanticRole::Attribute,
            "mod" => SemanticRole::Modifier,
            "prep" => SemanticRole::Preposition,
            "cc" => SemanticRole::Coordinator,
            "comp" => SemanticRole::Complement,
            "mark" => SemanticRole::Marker,
            "neg" => SemanticRole::Negator,
            _ => return None,
        })
    }
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
