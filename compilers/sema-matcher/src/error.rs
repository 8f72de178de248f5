use thiserror::Error;

/// Error taxonomy of the matching engine. An empty result list is not
/// an error: `NoDocumentsRegistered` is reserved for matching against
/// an empty corpus, which callers must be able to tell apart from
/// "zero matches found".
#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("no documents registered")]
    NoDocumentsRegistered,

    #[error("a document with label '{0}' is already registered")]
    DuplicateDocumentLabel(String),

    #[error("no document with label '{0}' is registered")]
    DocumentNotFound(String),

    #[error("search phrase '{0}' contains no matchable words")]
    EmptySearchPhrase(String),

    #[error("invalid atlas artifact: {0}")]
    Artifact(String),
}
