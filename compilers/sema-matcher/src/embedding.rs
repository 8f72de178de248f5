use std::collections::HashMap;

/// Consumed contract of the external embedding similarity service:
/// given two lemmas, a similarity score in [0, 1]. Queried only when
/// the lemma, derivation and ontology channels all fail.
pub trait WordEmbedding: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f32;
}

/// Embedding table backed by in-memory word vectors; cosine
/// similarity, clamped to [0, 1]. Unknown words never match.
#[derive(Debug, Default)]
pub struct StaticEmbeddings {
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbeddings {
    pub fn new() -> Self {
        StaticEmbeddings::default()
    }

    pub fn insert(&mut self, word: &str, vector: Vec<f32>) {
        self.vectors.insert(word.to_lowercase(), vector);
    }
}

impl WordEmbedding for StaticEmbeddings {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        let (Some(va), Some(vb)) = (
            self.vectors.get(&a.to_lowercase()),
            self.vectors.get(&b.to_lowercase()),
        ) else {
            return 0.0;
        };
        if va.len() != vb.len() {
            return 0.0;
        }
        let dot: f32 = va.iter().zip(vb).map(|(x, y)| x * y).sum();
        let norm_a: f32 = va.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = vb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}
