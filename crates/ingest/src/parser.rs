use crate::error::ParseError;
use crate::record::{ParsedRecord, RawRecord};

/// Paragraph positions of each field in an abstract-mode efetch body.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphLayout {
    pub title: usize,
    pub abstract_text: usize,
}

impl ParagraphLayout {
    pub const fn required_paragraphs(&self) -> usize {
        let last = if self.title > self.abstract_text {
            self.title
        } else {
            self.abstract_text
        };
        last + 1
    }
}

/// Layout NCBI emits for `retmode=text&rettype=abstract` on a single record:
/// citation, title, authors, affiliations, abstract, ...
///
/// Purely positional. A multi-record batch or any change to the remote
/// layout will pick the wrong paragraphs.
pub const ABSTRACT_LAYOUT: ParagraphLayout = ParagraphLayout {
    title: 1,
    abstract_text: 4,
};

const PARAGRAPH_SEPARATOR: &str = "\n\n";

pub fn parse_record(raw: &RawRecord) -> Result<ParsedRecord, ParseError> {
    parse_with_layout(raw, ABSTRACT_LAYOUT)
}

pub fn parse_with_layout(
    raw: &RawRecord,
    layout: ParagraphLayout,
) -> Result<ParsedRecord, ParseError> {
    let paragraphs: Vec<&str> = raw.body.split(PARAGRAPH_SEPARATOR).collect();

    let required = layout.required_paragraphs();
    if paragraphs.len() < required {
        return Err(ParseError::MissingParagraphs {
            found: paragraphs.len(),
            required,
        });
    }

    let title = strip_newlines(paragraphs[layout.title]);
    if title.is_empty() {
        return Err(ParseError::EmptyField { field: "title" });
    }

    let abstract_text = strip_newlines(paragraphs[layout.abstract_text]);
    if abstract_text.is_empty() {
        return Err(ParseError::EmptyField { field: "abstract" });
    }

    Ok(ParsedRecord {
        pmid: raw.pmid,
        title,
        abstract_text,
    })
}

/// Joins wrapped lines without inserting a space.
fn strip_newlines(paragraph: &str) -> String {
    paragraph.replace('\n', "")
}
