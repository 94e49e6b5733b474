pub mod matcher;
pub mod schema;
pub mod tagger;
pub mod vocabulary;

pub use matcher::{DictionaryMatcher, match_terms};
pub use schema::{AnnotatedRecord, DICTIONARY_TRAIT_TYPE, Field, MatchSpan};
pub use tagger::{NO_TRAIT_LABEL, TaggerClient, TaggerError, Token, TraitTagger, tag_text, tokenize};
pub use vocabulary::{Vocabulary, VocabularyError};

use ingest::{FetchError, ParseError, Pmid, RecordSource};
use std::sync::Arc;

/// Pipeline stage, attached to failures and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Parse,
    Match,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fetch => f.write_str("fetch"),
            Stage::Parse => f.write_str("parse"),
            Stage::Match => f.write_str("match"),
        }
    }
}

/// Matching cannot fail, so only fetch and parse have variants.
#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

impl AnnotateError {
    pub fn stage(&self) -> Stage {
        match self {
            AnnotateError::Fetch(_) => Stage::Fetch,
            AnnotateError::Parse(_) => Stage::Parse,
        }
    }
}

/// Fetch -> parse -> dictionary match for one record.
pub struct Annotator<S> {
    source: S,
    matcher: DictionaryMatcher,
}

impl<S: RecordSource> Annotator<S> {
    pub fn new(source: S, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            source,
            matcher: DictionaryMatcher::new(vocabulary),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.matcher.vocabulary()
    }

    /// Annotate a record with dictionary spans only. Model spans are merged
    /// later with [`AnnotatedRecord::append_model_spans`].
    pub async fn annotate(&self, pmid: Pmid) -> Result<AnnotatedRecord, AnnotateError> {
        tracing::debug!(%pmid, stage = %Stage::Fetch, "Fetching record");
        let raw = self.source.fetch(pmid).await?;

        tracing::debug!(%pmid, stage = %Stage::Parse, bytes = raw.body.len(), "Parsing record");
        let record = ingest::parse_record(&raw)?;

        tracing::debug!(%pmid, stage = %Stage::Match, "Matching vocabulary");
        let title_traits = self.matcher.find(&record.title);
        let abstract_traits = self.matcher.find(&record.abstract_text);

        tracing::info!(
            %pmid,
            title_traits = title_traits.len(),
            abstract_traits = abstract_traits.len(),
            "Annotated record"
        );

        Ok(AnnotatedRecord::new(record, title_traits, abstract_traits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::RawRecord;

    const FIXTURE: &str = "1. Plant Biotechnol J. 2022 Apr;20(4):745-760. doi: 10.1111/pbi.13758.\n\n\
Genome-wide association study and QTL mapping reveal genomic loci\n\
associated with Fusarium ear rot resistance in maize.\n\n\
Wang Y(1), Zhou Z(1), Gao J(1).\n\n\
Author information:\n(1)College of Agronomy.\n\n\
Fusarium ear rot (FER) is a destructive disease in maize. Here we combined a\n\
genome-wide association study with QTL mapping to identify loci for FER\n\
resistance. Several QTL co-localized with yield and flowering time loci.\n\n\
DOI: 10.1111/pbi.13758\nPMID: 34902587";

    struct FixtureSource;

    impl RecordSource for FixtureSource {
        async fn fetch(&self, pmid: Pmid) -> Result<RawRecord, FetchError> {
            Ok(RawRecord::new(pmid, FIXTURE))
        }
    }

    struct BrokenSource;

    impl RecordSource for BrokenSource {
        async fn fetch(&self, pmid: Pmid) -> Result<RawRecord, FetchError> {
            Ok(RawRecord::new(pmid, "only\n\ntwo"))
        }
    }

    struct NoSessionSource;

    impl RecordSource for NoSessionSource {
        async fn fetch(&self, _pmid: Pmid) -> Result<RawRecord, FetchError> {
            Err(FetchError::Protocol { marker: "<WebEnv>" })
        }
    }

    fn vocabulary() -> Arc<Vocabulary> {
        Arc::new(Vocabulary::from_terms([
            "fusarium ear rot",
            "qtl",
            "flowering time",
            "yield",
            "resistance",
        ]))
    }

    #[tokio::test]
    async fn test_annotate_fixture() {
        let annotator = Annotator::new(FixtureSource, vocabulary());
        let record = annotator.annotate(Pmid::new(34902587).unwrap()).await.unwrap();

        assert_eq!(record.pmid.get(), 34902587);
        assert_eq!(
            record.title,
            "Genome-wide association study and QTL mapping reveal genomic lociassociated with Fusarium ear rot resistance in maize."
        );
        assert!(record.abstract_text.starts_with("Fusarium ear rot (FER)"));
        assert!(!record.abstract_text.contains('\n'));

        let title: Vec<(&str, usize)> = record
            .title_traits
            .iter()
            .map(|s| (s.word.as_str(), s.start))
            .collect();
        assert_eq!(
            title,
            vec![("fusarium ear rot", 81), ("qtl", 34), ("resistance", 98)]
        );

        let abstract_words: Vec<&str> = record.abstract_traits.iter().map(|s| s.word.as_str()).collect();
        // "FER\nresistance" joins into "FERresistance", which is not a match.
        assert_eq!(
            abstract_words,
            vec!["fusarium ear rot", "qtl", "qtl", "flowering time", "yield"]
        );
        assert!(record.abstract_traits.iter().all(MatchSpan::is_dictionary));

        let again = annotator.annotate(Pmid::new(34902587).unwrap()).await.unwrap();
        assert_eq!(record, again);
    }

    #[tokio::test]
    async fn test_empty_vocabulary_is_not_an_error() {
        let annotator = Annotator::new(FixtureSource, Arc::new(Vocabulary::empty()));
        let record = annotator.annotate(Pmid::new(1).unwrap()).await.unwrap();

        assert!(record.title_traits.is_empty());
        assert!(record.abstract_traits.is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_carries_stage() {
        let annotator = Annotator::new(BrokenSource, vocabulary());
        let err = annotator.annotate(Pmid::new(1).unwrap()).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Parse);
        assert!(err.to_string().starts_with("parse failed"));
    }

    #[tokio::test]
    async fn test_fetch_failure_carries_stage() {
        let annotator = Annotator::new(NoSessionSource, vocabulary());
        let err = annotator.annotate(Pmid::new(1).unwrap()).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Fetch);
    }
}
