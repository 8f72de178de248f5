#![no_std] // The protocol crate stays embeddable; tools enable "std"

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod ids;
pub mod morphology;
pub mod relations;

// Re-export core types for convenience
pub use ids::{ClassId, MorphemeId, SentenceId, TokenId};
pub use morphology::*;
pub use relations::*;

pub mod model;
pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;
    use rkyv::{from_bytes, to_bytes};

    #[test]
    fn test_enum_serialization() {
        // Basic enum round-trip
        let original = PartOfSpeech::Verb;

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize PartOfSpeech");

        // Deserialize (simulate loading from disk)
        let deserialized: PartOfSpeech =
            from_bytes(&bytes).expect("Failed to deserialize PartOfSpeech");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_id_serialization() {
        // NewType ID round-trip
        let original = ClassId::new(42);

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize ClassId");
        let deserialized: ClassId = from_bytes(&bytes).expect("Failed to deserialize ClassId");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_id_layout() {
        // Zero-cost abstraction: ClassId(u32) should be exactly 4 bytes
        assert_eq!(core::mem::size_of::<ClassId>(), 4);
        assert_eq!(core::mem::size_of::<Option<ClassId>>(), 8); // u32 + tag (padding)
    }

    #[test]
    fn test_atlas_round_trip() {
        let atlas = Atlas {
            version: 1,
            ontology: OntologySource {
                version: 1,
                classes: alloc::vec![OntologyClassDef {
                    name: "animal".into(),
                    parent: None,
                    synonyms: alloc::vec![],
                    individuals: alloc::vec!["Fido".into()],
                }],
            },
            lexicon: MorphemeLexicon::default(),
        };

        let bytes = to_bytes::<_, 1024>(&atlas).expect("Failed to serialize Atlas");
        let deserialized: Atlas = from_bytes(&bytes).expect("Failed to deserialize Atlas");

        assert_eq!(deserialized.ontology.classes.len(), 1);
        assert_eq!(deserialized.ontology.classes[0].individuals[0], "Fido");
    }
}
