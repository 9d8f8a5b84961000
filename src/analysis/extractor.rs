//! Two-pass skill extraction: exact n-gram matching, then semantic lookup

use crate::analysis::normalizer::{preprocess_text, SkillNormalizer};
use crate::analysis::taxonomy::{is_noise_skill, SkillCategory, SkillTaxonomy};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Collection holding one entry per canonical skill.
pub const SKILL_COLLECTION: &str = "skill_taxonomy";

const MIN_FRAGMENT_LEN: usize = 5;
const MAX_NGRAM: usize = 4;
const SEMANTIC_NEIGHBORS: usize = 3;

/// How the input text should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    SkillList,
    FreeText,
}

impl ExtractionMode {
    pub fn parse(s: &str) -> Option<ExtractionMode> {
        match s.to_lowercase().as_str() {
            "list" | "skill_list" | "skills" => Some(ExtractionMode::SkillList),
            "text" | "free_text" => Some(ExtractionMode::FreeText),
            _ => None,
        }
    }
}

/// A single matched skill. Confidence is 1.0 for exact matches, else the
/// cosine similarity that produced the match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill_name: String,
    pub skill_id: i64,
    pub category: SkillCategory,
    pub confidence: f32,
    /// The input fragment that produced this match.
    pub matched_from: String,
}

/// Extracts canonical skills from skill lists or free text.
pub struct SkillExtractor {
    taxonomy: Arc<SkillTaxonomy>,
    normalizer: Arc<SkillNormalizer>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    threshold: f32,
    fragment_regex: Regex,
}

impl SkillExtractor {
    pub fn new(
        taxonomy: Arc<SkillTaxonomy>,
        normalizer: Arc<SkillNormalizer>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        threshold: f32,
    ) -> Self {
        let fragment_regex = Regex::new(r"[.\n;•|]+").expect("Invalid fragment regex");
        Self {
            taxonomy,
            normalizer,
            embedder,
            index,
            threshold,
            fragment_regex,
        }
    }

    /// Dispatch on the input mode.
    pub fn extract(&self, text: &str, mode: ExtractionMode) -> Result<Vec<SkillMatch>> {
        match mode {
            ExtractionMode::SkillList => self.extract_from_list(text),
            ExtractionMode::FreeText => self.extract_from_text(text),
        }
    }

    /// Extract skills from a comma-separated skill string.
    ///
    /// Exact taxonomy hits get confidence 1.0; the remaining tokens are
    /// resolved in one semantic batch against the skill collection.
    pub fn extract_from_list(&self, skills_csv: &str) -> Result<Vec<SkillMatch>> {
        let normalized = self.normalizer.parse_list(skills_csv);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        let mut unmatched = Vec::new();

        for skill in normalized {
            if let Some(canonical) = self.taxonomy.get(&skill) {
                matches.push(SkillMatch {
                    skill_name: canonical.name.clone(),
                    skill_id: canonical.skill_id,
                    category: canonical.category,
                    confidence: 1.0,
                    matched_from: skill,
                });
            } else {
                unmatched.push(skill);
            }
        }

        if !unmatched.is_empty() {
            let embeddings = self.embedder.encode(&unmatched)?;
            let results = self.index.query(SKILL_COLLECTION, &embeddings, 1)?;
            for (token, neighbors) in unmatched.iter().zip(results.iter()) {
                if let Some(best) = neighbors.first() {
                    if best.similarity >= self.threshold {
                        if let Some(canonical) = self.taxonomy.get(&best.document) {
                            matches.push(SkillMatch {
                                skill_name: canonical.name.clone(),
                                skill_id: canonical.skill_id,
                                category: canonical.category,
                                confidence: best.similarity,
                                matched_from: token.clone(),
                            });
                        }
                    }
                }
            }
        }

        Ok(Self::deduplicate(matches))
    }

    /// Extract skills from free-form text (CV, resume, job description).
    ///
    /// Pass 1 matches normalized n-grams against the taxonomy; fragments with
    /// no exact hit are batched through semantic lookup in pass 2.
    pub fn extract_from_text(&self, text: &str) -> Result<Vec<SkillMatch>> {
        let text = preprocess_text(text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let fragments = self.split_fragments(&text);

        let mut all_matches = Vec::new();
        let mut without_exact = Vec::new();

        for fragment in fragments {
            let exact = self.extract_exact_from_fragment(&fragment);
            if exact.is_empty() {
                without_exact.push(fragment);
            } else {
                all_matches.extend(exact);
            }
        }

        if !without_exact.is_empty() {
            all_matches.extend(self.extract_semantic_from_fragments(&without_exact)?);
        }

        Ok(Self::deduplicate(all_matches))
    }

    /// Split text into sentence-like fragments on sentence punctuation,
    /// newlines, and bullet markers. Fragments shorter than 5 characters are
    /// dropped; if nothing survives the whole text is one fragment.
    fn split_fragments(&self, text: &str) -> Vec<String> {
        let fragments: Vec<String> = self
            .fragment_regex
            .split(text)
            .map(|p| p.trim().to_string())
            .filter(|p| p.len() >= MIN_FRAGMENT_LEN)
            .collect();
        if fragments.is_empty() {
            vec![text.to_string()]
        } else {
            fragments
        }
    }

    /// Word n-grams from length `max_n` down to 1, longest first, so
    /// multi-word skills are preferred over their substrings.
    fn ngrams(text: &str, max_n: usize) -> Vec<String> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        let mut out = Vec::new();
        for n in (1..=max_n).rev() {
            if words.len() < n {
                continue;
            }
            for window in words.windows(n) {
                out.push(window.join(" "));
            }
        }
        out
    }

    fn extract_exact_from_fragment(&self, fragment: &str) -> Vec<SkillMatch> {
        let mut matches = Vec::new();
        let mut found: HashSet<String> = HashSet::new();

        for ngram in Self::ngrams(fragment, MAX_NGRAM) {
            let normalized = self.normalizer.normalize(&ngram);
            if normalized.is_empty() || found.contains(&normalized) || is_noise_skill(&normalized) {
                continue;
            }
            if let Some(canonical) = self.taxonomy.get(&normalized) {
                matches.push(SkillMatch {
                    skill_name: canonical.name.clone(),
                    skill_id: canonical.skill_id,
                    category: canonical.category,
                    confidence: 1.0,
                    matched_from: ngram,
                });
                found.insert(normalized);
            }
        }

        matches
    }

    fn extract_semantic_from_fragments(&self, fragments: &[String]) -> Result<Vec<SkillMatch>> {
        let embeddings = self.embedder.encode(fragments)?;
        let results = self.index.query(SKILL_COLLECTION, &embeddings, SEMANTIC_NEIGHBORS)?;

        let mut matches = Vec::new();
        for (fragment, neighbors) in fragments.iter().zip(results.iter()) {
            for neighbor in neighbors {
                if neighbor.similarity < self.threshold || is_noise_skill(&neighbor.document) {
                    continue;
                }
                if let Some(canonical) = self.taxonomy.get(&neighbor.document) {
                    matches.push(SkillMatch {
                        skill_name: canonical.name.clone(),
                        skill_id: canonical.skill_id,
                        category: canonical.category,
                        confidence: neighbor.similarity,
                        matched_from: fragment.clone(),
                    });
                }
            }
        }

        Ok(matches)
    }

    /// Keep the highest-confidence match per skill name, sorted by
    /// descending confidence (name as tie-break for determinism).
    fn deduplicate(matches: Vec<SkillMatch>) -> Vec<SkillMatch> {
        let mut best: HashMap<String, SkillMatch> = HashMap::new();
        for m in matches {
            match best.get(&m.skill_name) {
                Some(existing) if existing.confidence >= m.confidence => {}
                _ => {
                    best.insert(m.skill_name.clone(), m);
                }
            }
        }
        let mut result: Vec<SkillMatch> = best.into_values().collect();
        result.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.skill_name.cmp(&b.skill_name))
        });
        result
    }
}
