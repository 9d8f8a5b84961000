//! Job-requirement resolution: co-occurrence aggregation and fuzzy title lookup

use crate::analysis::normalizer::SkillNormalizer;
use crate::analysis::taxonomy::{is_noise_skill, SkillCategory, SkillTaxonomy};
use crate::data::JobSkillRow;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Collection holding one entry per aggregated job title.
pub const JOB_TITLE_COLLECTION: &str = "job_titles";

const TITLE_NEIGHBORS: usize = 5;
const MERGE_TOP_TITLES: usize = 3;

/// One skill in a title's requirement profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSkill {
    pub skill: String,
    /// Fraction of the title's jobs mentioning this skill, in (0, 1].
    pub frequency: f32,
    /// Distinct jobs mentioning this skill.
    pub count: usize,
}

/// Aggregated requirement profile for one normalized job title.
///
/// Skills are ordered by descending frequency and capped. Never mutated
/// after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequirementProfile {
    pub job_count: usize,
    pub skills: Vec<ProfileSkill>,
}

/// A profile entry materialized with its category and 1-based rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredSkill {
    pub skill_name: String,
    pub category: SkillCategory,
    pub frequency: f32,
    pub importance_rank: usize,
}

/// Outcome of resolving an arbitrary title string.
///
/// `confidence` is 0.0 and `required_skills` empty when no known title is
/// close enough; callers must treat that as "job title not found", never as
/// "zero skills needed".
#[derive(Debug, Clone)]
pub struct TitleResolution {
    pub matched_title: String,
    pub confidence: f32,
    pub required_skills: Vec<RequiredSkill>,
}

/// Aggregate raw job/skill co-occurrence rows into per-title profiles.
///
/// Titles with fewer than `min_jobs` distinct jobs are dropped entirely;
/// skills below `min_ratio` of a title's jobs are dropped; at most
/// `max_skills` survive per title, ordered by descending frequency.
pub fn aggregate_job_skills(
    rows: &[JobSkillRow],
    normalizer: &SkillNormalizer,
    min_jobs: usize,
    min_ratio: f32,
    max_skills: usize,
) -> BTreeMap<String, JobRequirementProfile> {
    // title -> skill -> distinct job ids; title -> distinct job ids
    let mut title_skill_jobs: HashMap<String, HashMap<String, HashSet<&str>>> = HashMap::new();
    let mut title_jobs: HashMap<String, HashSet<&str>> = HashMap::new();

    for row in rows {
        if is_noise_skill(row.skill.as_str()) {
            continue;
        }
        let title = normalizer.normalize_job_title(&row.job_title);
        if title.is_empty() {
            continue;
        }
        title_jobs.entry(title.clone()).or_default().insert(&row.job_id);
        title_skill_jobs
            .entry(title)
            .or_default()
            .entry(row.skill.clone())
            .or_default()
            .insert(&row.job_id);
    }

    let mut profiles = BTreeMap::new();
    for (title, jobs) in title_jobs {
        let job_count = jobs.len();
        if job_count < min_jobs {
            continue;
        }

        let skill_jobs = match title_skill_jobs.get(&title) {
            Some(m) => m,
            None => continue,
        };

        let mut skills: Vec<ProfileSkill> = skill_jobs
            .iter()
            .map(|(skill, jobs_with_skill)| {
                let count = jobs_with_skill.len();
                let frequency = round4(count as f32 / job_count as f32);
                ProfileSkill {
                    skill: skill.clone(),
                    frequency,
                    count,
                }
            })
            .filter(|s| s.frequency >= min_ratio)
            .collect();

        if skills.is_empty() {
            continue;
        }

        skills.sort_by(|a, b| {
            b.frequency
                .partial_cmp(&a.frequency)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.skill.cmp(&b.skill))
        });
        skills.truncate(max_skills);

        profiles.insert(title, JobRequirementProfile { job_count, skills });
    }

    profiles
}

/// Resolves an arbitrary job-title string to the closest known requirement
/// profile, merging several when the match is fuzzy.
pub struct JobTitleResolver {
    profiles: BTreeMap<String, JobRequirementProfile>,
    taxonomy: Arc<SkillTaxonomy>,
    normalizer: Arc<SkillNormalizer>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    title_threshold: f32,
    max_skills: usize,
}

impl JobTitleResolver {
    pub fn new(
        profiles: BTreeMap<String, JobRequirementProfile>,
        taxonomy: Arc<SkillTaxonomy>,
        normalizer: Arc<SkillNormalizer>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        title_threshold: f32,
        max_skills: usize,
    ) -> Self {
        Self {
            profiles,
            taxonomy,
            normalizer,
            embedder,
            index,
            title_threshold,
            max_skills,
        }
    }

    /// All known normalized job titles, sorted.
    pub fn known_titles(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn profile(&self, title: &str) -> Option<&JobRequirementProfile> {
        self.profiles.get(title)
    }

    /// Resolve a title: exact hit at confidence 1.0, else merge the closest
    /// profiles, else a not-found resolution at confidence 0.0.
    pub fn resolve(&self, job_title: &str) -> Result<TitleResolution> {
        let normalized = self.normalizer.normalize_job_title(job_title);

        if self.profiles.contains_key(&normalized) {
            return Ok(TitleResolution {
                required_skills: self.build_required(&normalized),
                matched_title: normalized,
                confidence: 1.0,
            });
        }

        let query = self.embedder.encode(&[normalized.clone()])?;
        let mut results = self.index.query(JOB_TITLE_COLLECTION, &query, TITLE_NEIGHBORS)?;
        let neighbors = results.pop().unwrap_or_default();

        let best = match neighbors.first() {
            Some(n) if n.similarity >= self.title_threshold => n.clone(),
            _ => {
                return Ok(TitleResolution {
                    matched_title: normalized,
                    confidence: 0.0,
                    required_skills: Vec::new(),
                })
            }
        };

        let merged = self.merge_profiles(&neighbors[..neighbors.len().min(MERGE_TOP_TITLES)]);

        Ok(TitleResolution {
            matched_title: best.document,
            confidence: best.similarity,
            required_skills: merged,
        })
    }

    fn build_required(&self, title: &str) -> Vec<RequiredSkill> {
        let profile = match self.profiles.get(title) {
            Some(p) => p,
            None => return Vec::new(),
        };
        profile
            .skills
            .iter()
            .enumerate()
            .map(|(i, s)| RequiredSkill {
                skill_name: s.skill.clone(),
                category: self.taxonomy.category(&s.skill),
                frequency: s.frequency,
                importance_rank: i + 1,
            })
            .collect()
    }

    /// Merge the skill profiles of several similar titles.
    ///
    /// Each skill accumulates `frequency x title_similarity` over the titles
    /// that mention it and is averaged by the number of contributing titles.
    fn merge_profiles(&self, neighbors: &[crate::index::Neighbor]) -> Vec<RequiredSkill> {
        let mut scores: HashMap<String, f32> = HashMap::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for neighbor in neighbors {
            let profile = match self.profiles.get(&neighbor.document) {
                Some(p) => p,
                None => continue,
            };
            for s in &profile.skills {
                *scores.entry(s.skill.clone()).or_insert(0.0) += s.frequency * neighbor.similarity;
                *counts.entry(s.skill.clone()).or_insert(0) += 1;
            }
        }

        let mut merged: Vec<(String, f32)> = scores
            .into_iter()
            .map(|(skill, total)| {
                let n = counts.get(&skill).copied().unwrap_or(1) as f32;
                (skill, total / n)
            })
            .collect();

        merged.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        merged.truncate(self.max_skills);

        merged
            .into_iter()
            .enumerate()
            .map(|(i, (skill, score))| RequiredSkill {
                category: self.taxonomy.category(&skill),
                skill_name: skill,
                frequency: round4(score),
                importance_rank: i + 1,
            })
            .collect()
    }
}

pub(crate) fn round4(x: f32) -> f32 {
    (x * 10_000.0).round() / 10_000.0
}
