//! IngestionPipeline: source text → paragraphs → weighted, embedded fragments.
//!
//! Importance starts at the base weight and gains a boost for the first
//! paragraph after a chapter heading and another for a tonal shift (a jump in
//! dialogue density from the previous paragraph). Headings are not stored.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info};

use tessera_core::config::IngestionConfig;
use tessera_core::constants::BASE_IMPORTANCE_WEIGHT;
use tessera_core::errors::{TesseraError, TesseraResult};
use tessera_core::fragment::{Fragment, Provenance};
use tessera_core::text::extract_keywords;
use tessera_core::traits::{IEmbeddingProvider, ISegmentStore};

use crate::sparse::SparseActivator;

/// Dialogue-density change that counts as a tonal shift.
const TONAL_SHIFT_DELTA: f64 = 0.5;

/// A paragraph with its computed importance, before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedParagraph {
    pub text: String,
    pub importance: f64,
}

/// Share of a paragraph's characters that sit inside quotation marks.
pub fn dialogue_density(text: &str) -> f64 {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 {
        return 0.0;
    }
    let mut inside = false;
    let mut quoted = 0usize;
    for c in text.chars() {
        match c {
            '"' => inside = !inside,
            '\u{201C}' => inside = true,
            '\u{201D}' => inside = false,
            _ if inside && !c.is_whitespace() => quoted += 1,
            _ => {}
        }
    }
    quoted as f64 / total as f64
}

/// Paragraph splitting and importance weighting, independent of storage.
pub struct ParagraphWeigher {
    heading: Regex,
    config: IngestionConfig,
    upper_bound: f64,
}

impl ParagraphWeigher {
    pub fn new(config: IngestionConfig, upper_bound: f64) -> TesseraResult<Self> {
        let heading = Regex::new(
            r"(?i)^\s*(?:(?:chapter|part|book)\s+(?:\d+|[a-z]+)|prologue|epilogue)\s*[.:]?\s*$|(?-i:^\s*[IVXLC]+\.?\s*$)",
        )
        .map_err(|e| TesseraError::ConfigError(format!("heading pattern: {e}")))?;
        Ok(Self {
            heading,
            config,
            upper_bound,
        })
    }

    pub fn is_heading(&self, paragraph: &str) -> bool {
        !paragraph.contains('\n') && self.heading.is_match(paragraph)
    }

    /// Blank-line separated paragraphs, trimmed, empties dropped.
    pub fn paragraphs(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    out.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line.trim_end());
            }
        }
        if !current.is_empty() {
            out.push(current.join("\n"));
        }
        out.into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }

    pub fn weigh(&self, text: &str) -> Vec<WeightedParagraph> {
        let mut out = Vec::new();
        let mut after_heading = false;
        let mut previous_density: Option<f64> = None;

        for paragraph in Self::paragraphs(text) {
            if self.is_heading(&paragraph) {
                after_heading = true;
                continue;
            }
            let density = dialogue_density(&paragraph);
            let mut importance = BASE_IMPORTANCE_WEIGHT;
            if after_heading {
                importance += self.config.chapter_boost;
            }
            if let Some(prev) = previous_density {
                if (density - prev).abs() >= TONAL_SHIFT_DELTA {
                    importance += self.config.tonal_shift_boost;
                }
            }
            out.push(WeightedParagraph {
                text: paragraph,
                importance: importance.min(self.upper_bound),
            });
            after_heading = false;
            previous_density = Some(density);
        }
        out
    }
}

pub struct IngestionPipeline {
    store: Arc<dyn ISegmentStore>,
    embedder: Arc<dyn IEmbeddingProvider>,
    activator: Arc<SparseActivator>,
    weigher: ParagraphWeigher,
    min_keyword_chars: usize,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn ISegmentStore>,
        embedder: Arc<dyn IEmbeddingProvider>,
        activator: Arc<SparseActivator>,
        config: &tessera_core::TesseraConfig,
    ) -> TesseraResult<Self> {
        Ok(Self {
            store,
            embedder,
            activator,
            weigher: ParagraphWeigher::new(
                config.ingestion.clone(),
                config.rerank.weight_upper_bound,
            )?,
            min_keyword_chars: config.sparse.min_keyword_chars,
        })
    }

    /// Store every paragraph of `text` as a fragment and index it.
    /// Paragraphs whose content is already stored are skipped.
    /// Returns the ids created, in text order.
    pub fn ingest(&self, text: &str, scope: Option<&str>) -> TesseraResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut weighted: Vec<WeightedParagraph> = Vec::new();
        for p in self.weigher.weigh(text) {
            let hash = Fragment::compute_content_hash(&p.text);
            if !seen.insert(hash.clone()) || self.store.find_by_content_hash(&hash)?.is_some() {
                continue;
            }
            weighted.push(p);
        }
        if weighted.is_empty() {
            debug!("nothing new to ingest");
            return Ok(Vec::new());
        }

        let texts: Vec<String> = weighted.iter().map(|p| p.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        let fragments: Vec<Fragment> = weighted
            .into_iter()
            .zip(embeddings)
            .map(|(p, embedding)| {
                let keywords = extract_keywords(&p.text, self.min_keyword_chars);
                let f =
                    Fragment::new(p.text, embedding, p.importance, keywords, Provenance::Authored);
                match scope {
                    Some(s) => f.with_scope(s),
                    None => f,
                }
            })
            .collect();

        self.store.create_bulk(&fragments)?;
        for f in &fragments {
            self.activator.insert(f)?;
        }
        info!(
            fragments = fragments.len(),
            scope = scope.unwrap_or("*"),
            "ingestion complete"
        );
        Ok(fragments.into_iter().map(|f| f.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weigher() -> ParagraphWeigher {
        ParagraphWeigher::new(IngestionConfig::default(), 2.0).unwrap()
    }

    #[test]
    fn splits_on_blank_lines() {
        let paras = ParagraphWeigher::paragraphs("one\ntwo\n\n\n  three  \n\n");
        assert_eq!(paras, vec!["one\ntwo".to_string(), "three".to_string()]);
    }

    #[test]
    fn headings_boost_next_paragraph_and_are_dropped() {
        let out = weigher().weigh("Chapter 1\n\nThe sea was calm.\n\nThe boats were late.");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].importance, 1.5);
        assert_eq!(out[1].importance, 1.0);
    }

    #[test]
    fn dialogue_shift_is_boosted() {
        let out = weigher().weigh("The harbor was quiet.\n\n\"Where are they?\" \"North.\"");
        assert_eq!(out[0].importance, 1.0);
        assert_eq!(out[1].importance, 1.25);
    }

    #[test]
    fn boosts_are_capped() {
        let w = ParagraphWeigher::new(
            IngestionConfig {
                chapter_boost: 5.0,
                tonal_shift_boost: 0.0,
            },
            2.0,
        )
        .unwrap();
        assert_eq!(w.weigh("CHAPTER TWO\n\nText.")[0].importance, 2.0);
    }

    #[test]
    fn heading_detection() {
        let w = weigher();
        assert!(w.is_heading("Chapter 12"));
        assert!(w.is_heading("PART THREE:"));
        assert!(w.is_heading("Epilogue"));
        assert!(w.is_heading("XIV."));
        assert!(!w.is_heading("Part of the crew went home."));
        assert!(!w.is_heading("Chapter 1\nThe sea."));
    }

    #[test]
    fn density_counts_quoted_chars() {
        assert_eq!(dialogue_density("no quotes here"), 0.0);
        assert!(dialogue_density("\"all quoted\"") > 0.7);
    }
}
