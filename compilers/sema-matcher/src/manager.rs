use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use sema_anno::Document;
use sema_morph::{Decomposer, Lexicon};
use sema_normalizer::{Normalizer, ParsedText, TextPipeline, TsvPipeline};
use sema_protocol::Atlas;

use crate::align::{match_phrase, AlignParams};
use crate::config::MatcherConfig;
use crate::embedding::WordEmbedding;
use crate::error::MatcherError;
use crate::ontology::Ontology;
use crate::phrase::SearchPhrase;
use crate::pool;
use crate::result::Match;

/// The structural matcher's engine and state holder: normalization
/// stack, ontology, embedding service, and the document/search-phrase
/// indexes. An explicit value passed to every operation; there is no
/// process-wide implicit instance.
///
/// Index mutation happens on the owning thread only; matching reads
/// immutable state and is safe to call from anywhere once registration
/// has settled.
pub struct SemanticMatcher {
    config: MatcherConfig,
    normalizer: Arc<Normalizer>,
    pipeline: Box<dyn TextPipeline>,
    ontology: Option<Ontology>,
    embeddings: Option<Box<dyn WordEmbedding>>,
    documents: IndexMap<String, Document>,
    phrases: Vec<SearchPhrase>,
}

impl SemanticMatcher {
    /// Builds an engine from a compiled atlas artifact. Fatal problems
    /// with the artifact surface here and nowhere later.
    pub fn new(atlas: &Atlas, config: MatcherConfig) -> Self {
        let lexicon = Arc::new(Lexicon::from_artifact(&atlas.lexicon));
        let decomposer = Arc::new(Decomposer::new(lexicon));
        let normalizer = Arc::new(Normalizer::new(decomposer));
        let ontology = if atlas.ontology.classes.is_empty() {
            None
        } else {
            Some(Ontology::from_sources(
                &[&atlas.ontology],
                config.symmetric_ontology,
            ))
        };
        info!(
            classes = atlas.ontology.classes.len(),
            morphemes = atlas.lexicon.morphemes.len(),
            "semantic matcher initialized"
        );
        SemanticMatcher {
            config,
            normalizer,
            pipeline: Box::new(TsvPipeline),
            ontology,
            embeddings: None,
            documents: IndexMap::new(),
            phrases: Vec::new(),
        }
    }

    /// Loads the rkyv atlas binary produced by the atlas compiler.
    pub fn from_artifact_bytes(bytes: &[u8], config: MatcherConfig) -> Result<Self, MatcherError> {
        let atlas: Atlas = rkyv::from_bytes(bytes)
            .map_err(|e| MatcherError::Artifact(format!("{:?}", e)))?;
        Ok(SemanticMatcher::new(&atlas, config))
    }

    /// Replaces the bundled interchange-format pipeline with another
    /// implementation of the external-parser contract.
    pub fn with_pipeline(mut self, pipeline: Box<dyn TextPipeline>) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn set_embeddings(&mut self, embeddings: Box<dyn WordEmbedding>) {
        self.embeddings = Some(embeddings);
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn ontology(&self) -> Option<&Ontology> {
        self.ontology.as_ref()
    }

    // ------------------------------------------------------------------
    // Search-phrase index
    // ------------------------------------------------------------------

    /// Registers a search phrase from pipeline text. Labels need not
    /// be unique; multiple phrases may share one.
    pub fn register_search_phrase(&mut self, text: &str, label: &str) -> Result<(), MatcherError> {
        let parsed = self.pipeline.parse(text);
        self.add_phrase(&parsed, label, true)
    }

    /// Registers a search phrase from a pre-parsed structure.
    pub fn register_search_phrase_structure(
        &mut self,
        parsed: &ParsedText,
        label: &str,
    ) -> Result<(), MatcherError> {
        self.add_phrase(parsed, label, false)
    }

    fn add_phrase(
        &mut self,
        parsed: &ParsedText,
        label: &str,
        from_text: bool,
    ) -> Result<(), MatcherError> {
        let document = self.normalizer.normalize(parsed);
        let phrase = SearchPhrase::compile(label, document, from_text)
            .ok_or_else(|| MatcherError::EmptySearchPhrase(label.to_owned()))?;
        debug!(label, root = phrase.root, words = phrase.matchable.len(), "registered search phrase");
        self.phrases.push(phrase);
        Ok(())
    }

    pub fn remove_all_search_phrases(&mut self) {
        self.phrases.clear();
    }

    pub fn remove_all_search_phrases_with_label(&mut self, label: &str) {
        self.phrases.retain(|p| p.label != label);
    }

    /// Sorted, deduplicated labels of the registered search phrases.
    pub fn list_search_phrase_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.phrases.iter().map(|p| p.label.clone()).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    // ------------------------------------------------------------------
    // Document index
    // ------------------------------------------------------------------

    /// Registers a document from pipeline text. The label must be
    /// unique among currently registered documents.
    pub fn register_document(&mut self, text: &str, label: &str) -> Result<(), MatcherError> {
        if self.documents.contains_key(label) {
            return Err(MatcherError::DuplicateDocumentLabel(label.to_owned()));
        }
        let parsed = self.pipeline.parse(text);
        let document = self.normalizer.normalize(&parsed);
        debug!(label, tokens = document.len(), "registered document");
        self.documents.insert(label.to_owned(), document);
        Ok(())
    }

    /// Registers a document from a pre-parsed structure.
    pub fn register_document_structure(
        &mut self,
        parsed: &ParsedText,
        label: &str,
    ) -> Result<(), MatcherError> {
        if self.documents.contains_key(label) {
            return Err(MatcherError::DuplicateDocumentLabel(label.to_owned()));
        }
        let document = self.normalizer.normalize(parsed);
        self.documents.insert(label.to_owned(), document);
        Ok(())
    }

    /// Normalizes a batch of `(label, text)` pairs on a fixed-size
    /// worker pool and registers the results in submission order.
    /// Label collisions are rejected up front, before any work runs.
    pub fn register_documents_parallel(
        &mut self,
        batch: Vec<(String, String)>,
        workers: usize,
    ) -> Result<(), MatcherError> {
        let mut seen: Vec<&str> = Vec::with_capacity(batch.len());
        for (label, _) in &batch {
            if self.documents.contains_key(label.as_str()) || seen.contains(&label.as_str()) {
                return Err(MatcherError::DuplicateDocumentLabel(label.clone()));
            }
            seen.push(label);
        }
        for (label, document) in
            pool::normalize_batch(&self.normalizer, self.pipeline.as_ref(), batch, workers)
        {
            self.documents.insert(label, document);
        }
        Ok(())
    }

    /// Removes exactly the document with the given label.
    pub fn remove_document(&mut self, label: &str) -> Result<(), MatcherError> {
        self.documents
            .shift_remove(label)
            .map(|_| ())
            .ok_or_else(|| MatcherError::DocumentNotFound(label.to_owned()))
    }

    /// Bulk removal: documents whose label starts with the given
    /// prefix, or every document when no prefix is given.
    pub fn remove_all_documents(&mut self, label_prefix: Option<&str>) {
        match label_prefix {
            None => self.documents.clear(),
            Some(prefix) => self.documents.retain(|label, _| !label.starts_with(prefix)),
        }
    }

    pub fn get_document(&self, label: &str) -> Option<&Document> {
        self.documents.get(label)
    }

    pub fn document_labels(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Matches every registered search phrase against every registered
    /// document. Matching against an empty document index is the typed
    /// empty-corpus failure, distinct from an empty result list.
    pub fn match_all(&self) -> Result<Vec<Match>, MatcherError> {
        if self.documents.is_empty() {
            return Err(MatcherError::NoDocumentsRegistered);
        }
        let docs: Vec<(&str, &Document)> = self
            .documents
            .iter()
            .map(|(label, doc)| (label.as_str(), doc))
            .collect();
        let phrases: Vec<&SearchPhrase> = self.phrases.iter().collect();
        Ok(self.run(&phrases, &docs))
    }

    /// Matches with optional ad-hoc text on either side. Ad-hoc input
    /// is normalized on the fly, matched, and never persisted.
    pub fn match_text(
        &self,
        document_text: Option<&str>,
        search_phrase_text: Option<&str>,
    ) -> Result<Vec<Match>, MatcherError> {
        match (document_text, search_phrase_text) {
            (None, None) => self.match_all(),
            (Some(doc_text), None) => {
                let parsed = self.pipeline.parse(doc_text);
                let document = self.normalizer.normalize(&parsed);
                let phrases: Vec<&SearchPhrase> = self.phrases.iter().collect();
                Ok(self.run(&phrases, &[("", &document)]))
            }
            (None, Some(phrase_text)) => {
                if self.documents.is_empty() {
                    return Err(MatcherError::NoDocumentsRegistered);
                }
                let parsed = self.pipeline.parse(phrase_text);
                let document = self.normalizer.normalize(&parsed);
                let phrase = SearchPhrase::compile("", document, true)
                    .ok_or_else(|| MatcherError::EmptySearchPhrase(phrase_text.to_owned()))?;
                let docs: Vec<(&str, &Document)> = self
                    .documents
                    .iter()
                    .map(|(label, doc)| (label.as_str(), doc))
                    .collect();
                Ok(self.run(&[&phrase], &docs))
            }
            (Some(doc_text), Some(phrase_text)) => {
                let parsed_doc = self.pipeline.parse(doc_text);
                let document = self.normalizer.normalize(&parsed_doc);
                let parsed_phrase = self.pipeline.parse(phrase_text);
                let phrase_doc = self.normalizer.normalize(&parsed_phrase);
                let phrase = SearchPhrase::compile("", phrase_doc, true)
                    .ok_or_else(|| MatcherError::EmptySearchPhrase(phrase_text.to_owned()))?;
                Ok(self.run(&[&phrase], &[("", &document)]))
            }
        }
    }

    /// Results come back in search-phrase registration order, then
    /// document registration order, then discovery order within a
    /// pair.
    fn run(&self, phrases: &[&SearchPhrase], docs: &[(&str, &Document)]) -> Vec<Match> {
        let mut results = Vec::new();
        for phrase in phrases {
            for (label, document) in docs {
                let params = AlignParams {
                    phrase,
                    phrase_label: &phrase.label,
                    doc: document,
                    doc_label: label,
                    ontology: self.ontology.as_ref(),
                    embeddings: self.embeddings.as_deref(),
                    config: &self.config,
                };
                results.extend(match_phrase(&params));
            }
        }
        debug!(matches = results.len(), "matching complete");
        results
    }
}
