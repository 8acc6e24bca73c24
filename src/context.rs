//! Per-conversion state
//!
//! Every side-table a conversion fills in lives here. A fresh context is
//! built for each document, so one engine can serve any number of
//! conversions, in sequence or from several threads, without one document
//! seeing another's references or stored blocks.

use crate::escape::{placeholder_for, raw_placeholder_for};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// HTML hidden from the paragraph and span passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlBlock {
    pub text: String,
    /// Written by the author rather than generated by the engine; only raw
    /// blocks are removed in safe mode
    pub raw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub url: String,
    pub title: Option<String>,
}

#[derive(Debug)]
pub struct ConversionContext {
    /// Link definitions keyed by lower-cased id
    pub references: HashMap<String, LinkReference>,
    pub html_blocks: HashMap<String, HtmlBlock>,
    /// Footnote bodies keyed by normalized id
    pub footnotes: HashMap<String, Vec<String>>,
    /// Footnote ids in first-reference order
    pub footnote_ids: Vec<String>,
    pub list_level: usize,
    /// Whether the previous list item ended with a blank line
    pub last_li_two_eols: bool,
    /// Current depth of nested block-pipeline runs
    pub depth: usize,
    rng: StdRng,
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose email obfuscation is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            references: HashMap::new(),
            html_blocks: HashMap::new(),
            footnotes: HashMap::new(),
            footnote_ids: Vec::new(),
            list_level: 0,
            last_li_two_eols: false,
            depth: 0,
            rng,
        }
    }

    /// Store `text` and return the key that stands in for it
    ///
    /// Author HTML (`raw`) and generated markup are keyed apart, so safe
    /// mode never elides engine output that happens to match author text.
    pub fn hash_html(&mut self, text: &str, raw: bool) -> String {
        let key = if raw { raw_placeholder_for(text) } else { placeholder_for(text) };
        self.html_blocks
            .entry(key.clone())
            .or_insert_with(|| HtmlBlock {
                text: text.to_string(),
                raw,
            });
        key
    }

    /// Uniform sample in `[0, 1)`
    pub fn random(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// 1-based number of a footnote, registering it on first reference
    pub fn footnote_number(&mut self, id: &str) -> usize {
        if let Some(idx) = self.footnote_ids.iter().position(|known| known == id) {
            return idx + 1;
        }
        self.footnote_ids.push(id.to_string());
        self.footnote_ids.len()
    }
}
