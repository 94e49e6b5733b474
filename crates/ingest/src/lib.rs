//! PubMed record retrieval: the two-step Entrez exchange and the
//! positional parser for its abstract-mode text output.

pub mod entrez;
pub mod error;
pub mod parser;
pub mod record;

pub use entrez::{EntrezClient, RecordSource, SearchSession};
pub use error::{FetchError, FetchStep, ParseError};
pub use parser::{ABSTRACT_LAYOUT, ParagraphLayout, parse_record};
pub use record::{InvalidPmid, ParsedRecord, Pmid, RawRecord};
