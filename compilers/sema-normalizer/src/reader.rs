//! Reader for the tab-separated raw-parse interchange format.
//!
//! One token per line, sentences separated by blank lines:
//!
//! ```text
//! 1\tThe\tthe\tDET\t_\t2\tdet
//! 2\tdog\tdog\tNOUN\tSing\t3\tsubj
//! 3\tchased\tchase\tVERB\tPast|Act\t0\troot\t_
//! ```
//!
//! Columns: sentence-local 1-based index, text, lemma, POS tag, `|`-
//! separated morph features (`_` for none), 1-based head (0 = root),
//! surface relation, optional entity label. Mention clusters follow as
//! `@coref` lines holding whitespace-separated global 0-based token
//! spans (`3` or `12-13`), one cluster per line.
//!
//! Malformed lines are skipped with a warning rather than failing the
//! document: a single bad record never aborts a batch.

use nom::{
    bytes::complete::{is_not, tag},
    character::complete::{char, digit1},
    combinator::{map_res, opt},
    sequence::preceded,
    IResult,
};
use tracing::warn;

use sema_protocol::{MorphFlags, PartOfSpeech, SurfaceRelation};

use crate::input::{MentionSpan, ParsedText, SurfaceToken};

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn field(input: &str) -> IResult<&str, &str> {
    is_not("\t")(input)
}

/// One raw token line, before index resolution.
struct RawTokenLine<'a> {
    local_index: usize,
    text: &'a str,
    lemma: &'a str,
    pos: &'a str,
    morph: &'a str,
    head: usize,
    relation: &'a str,
    entity: Option<&'a str>,
}

fn token_line(input: &str) -> IResult<&str, RawTokenLine<'_>> {
    let (input, local_index) = number(input)?;
    let (input, text) = preceded(char('\t'), field)(input)?;
    let (input, lemma) = preceded(char('\t'), field)(input)?;
    let (input, pos) = preceded(char('\t'), field)(input)?;
    let (input, morph) = preceded(char('\t'), field)(input)?;
    let (input, head) = preceded(char('\t'), number)(input)?;
    let (input, relation) = preceded(char('\t'), field)(input)?;
    let (input, entity) = opt(preceded(char('\t'), field))(input)?;
    Ok((
        input,
        RawTokenLine {
            local_index,
            text,
            lemma,
            pos,
            morph,
            head,
            relation,
            entity,
        },
    ))
}

fn mention_span(input: &str) -> IResult<&str, MentionSpan> {
    let (input, start) = number(input)?;
    let (input, end) = opt(preceded(char('-'), number))(input)?;
    Ok((input, (start, end.unwrap_or(start))))
}

fn coref_line(input: &str) -> IResult<&str, Vec<MentionSpan>> {
    let (input, _) = tag("@coref")(input)?;
    let mut spans = Vec::new();
    let mut rest = input;
    while let Ok((next, span)) = preceded(take_space, mention_span)(rest) {
        spans.push(span);
        rest = next;
    }
    Ok((rest, spans))
}

fn take_space(input: &str) -> IResult<&str, &str> {
    nom::character::complete::multispace1(input)
}

/// Parses a whole document in the interchange format. Infallible by
/// design: bad lines are dropped, bad head references are cleared
/// later by the normalizer.
pub fn read_document(input: &str) -> ParsedText {
    let mut parsed = ParsedText::default();
    let mut sentence = 0usize;
    // Global index of the first token of the current sentence.
    let mut sentence_base = 0usize;
    let mut sentence_has_tokens = false;

    for (line_number, line) in input.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            if sentence_has_tokens {
                sentence += 1;
                sentence_base = parsed.tokens.len();
                sentence_has_tokens = false;
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if line.starts_with("@coref") {
            match coref_line(line) {
                Ok((_, spans)) if !spans.is_empty() => parsed.clusters.push(spans),
                _ => warn!(line_number, "skipping malformed @coref line"),
            }
            continue;
        }
        match token_line(line) {
            Ok((_, raw)) => {
                let Some(pos) = PartOfSpeech::from_label(raw.pos) else {
                    warn!(line_number, pos = raw.pos, "skipping token with unknown POS tag");
                    continue;
                };
                let Some(relation) = SurfaceRelation::from_label(raw.relation) else {
                    warn!(
                        line_number,
                        relation = raw.relation,
                        "skipping token with unknown relation"
                    );
                    continue;
                };
                let global_index = parsed.tokens.len();
                let expected_local = global_index - sentence_base + 1;
                if raw.local_index != expected_local {
                    warn!(
                        line_number,
                        index = raw.local_index,
                        expected = expected_local,
                        "token index out of sequence"
                    );
                }
                let head = if raw.head == 0 {
                    None
                } else {
                    Some(sentence_base + raw.head - 1)
                };
                parsed.tokens.push(SurfaceToken {
                    index: global_index,
                    sentence,
                    text: raw.text.to_owned(),
                    lemma: raw.lemma.to_owned(),
                    pos,
                    flags: MorphFlags::from_column(raw.morph),
                    head,
                    relation,
                    entity_label: raw
                        .entity
                        .filter(|e| *e != "_")
                        .map(|e| e.to_owned()),
                });
                sentence_has_tokens = true;
            }
            Err(_) => {
                warn!(line_number, "skipping malformed token line");
            }
        }
    }
    parsed
}
