use sema_protocol::{MorphFlags, PartOfSpeech, SurfaceRelation};

/// One token record as delivered by the external linguistic pipeline.
/// Indices are document-global and zero-based; `head` is `None` on
/// sentence roots.
#[derive(Debug, Clone)]
pub struct SurfaceToken {
    pub index: usize,
    pub sentence: usize,
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub flags: MorphFlags,
    pub head: Option<usize>,
    pub relation: SurfaceRelation,
    pub entity_label: Option<String>,
}

/// A mention span: inclusive global token range.
pub type MentionSpan = (usize, usize);

/// The raw output of the external pipeline for one text: the parsed
/// token sequence plus mention clusters from the coreference
/// component.
#[derive(Debug, Clone, Default)]
pub struct ParsedText {
    pub tokens: Vec<SurfaceToken>,
    pub clusters: Vec<Vec<MentionSpan>>,
}

impl ParsedText {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The consumed contract of the external linguistic pipeline
/// (tokenizer, tagger, dependency parser, coreference component).
/// Implementations never fail: unparseable input degrades to an empty
/// or partial `ParsedText`.
pub trait TextPipeline: Send + Sync {
    fn parse(&self, text: &str) -> ParsedText;
}

/// Pipeline over the tab-separated interchange format: the bundled
/// default used wherever pre-parsed text is handed over as plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TsvPipeline;

impl TextPipeline for TsvPipeline {
    fn parse(&self, text: &str) -> ParsedText {
        crate::reader::read_document(text)
    }
}
