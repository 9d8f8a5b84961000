//! Engine facade: wires datasets, embeddings, and the vector index into the
//! analysis components and exposes the public operations.

use crate::analysis::demand::{priority_score, DemandStore, DemandTrend};
use crate::analysis::extractor::{ExtractionMode, SkillExtractor, SkillMatch, SKILL_COLLECTION};
use crate::analysis::gap::{CategoryScore, GapAnalyzer};
use crate::analysis::normalizer::SkillNormalizer;
use crate::analysis::resolver::{aggregate_job_skills, JobTitleResolver, JOB_TITLE_COLLECTION};
use crate::analysis::roadmap::{LearningStyle, Roadmap, RoadmapBuilder, RoadmapSkill};
use crate::analysis::taxonomy::{CategoryClassifier, SkillCategory, SkillTaxonomy};
use crate::config::Config;
use crate::data::Datasets;
use crate::embedding::Embedder;
use crate::error::{Result, SkillGapError};
use crate::index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A matched required skill enriched with its demand trend, when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedSkill {
    pub user_skill: String,
    pub required_skill: String,
    pub category: SkillCategory,
    pub similarity: f32,
    pub frequency: f32,
    pub demand: Option<DemandTrend>,
}

/// A missing required skill with its learning priority.
///
/// `priority_score` blends job frequency with the demand growth signal;
/// without a demand prediction it falls back to the frequency alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingSkill {
    pub skill_name: String,
    pub category: SkillCategory,
    pub frequency: f32,
    pub importance_rank: usize,
    pub priority_score: f32,
    pub demand: Option<DemandTrend>,
}

/// Full gap analysis output for one user / job title pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    pub job_title_matched: String,
    pub job_title_confidence: f32,
    pub matched_skills: Vec<MatchedSkill>,
    pub missing_skills: Vec<MissingSkill>,
    pub category_breakdown: BTreeMap<String, CategoryScore>,
    pub overall_readiness_score: f32,
}

/// Roadmap output bundled with the gap context it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapReport {
    pub job_title_matched: String,
    pub job_title_confidence: f32,
    pub overall_readiness_score: f32,
    pub roadmap: Roadmap,
}

/// The assembled engine. Construction loads and indexes everything; all
/// operations afterwards are read-only.
pub struct SkillGapEngine {
    config: Config,
    normalizer: Arc<SkillNormalizer>,
    extractor: SkillExtractor,
    analyzer: GapAnalyzer,
    resolver: Arc<JobTitleResolver>,
    roadmap: RoadmapBuilder,
    demand: DemandStore,
}

impl SkillGapEngine {
    /// Build the engine from loaded datasets, an embedder, and a vector
    /// index. Rebuilds all three collections from scratch.
    pub fn new(
        config: Config,
        datasets: Datasets,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        let normalizer = Arc::new(SkillNormalizer::new(datasets.synonyms));

        let embeddings = match datasets.embeddings {
            Some(e) => e,
            None => Self::encode_taxonomy(&datasets.taxonomy, embedder.as_ref())?,
        };

        let classifier = CategoryClassifier::from_seeds(&embeddings)?;
        let taxonomy = Arc::new(SkillTaxonomy::build(&datasets.taxonomy, &embeddings, &classifier));
        log::info!("Loaded taxonomy with {} skills", taxonomy.len());

        Self::index_skills(&taxonomy, index.as_ref())?;

        let profiles = aggregate_job_skills(
            &datasets.job_skills,
            &normalizer,
            config.matching.min_jobs_per_title,
            config.matching.min_skill_ratio,
            config.matching.max_profile_skills,
        );
        log::info!(
            "Aggregated {} job titles from {} job/skill rows",
            profiles.len(),
            datasets.job_skills.len()
        );

        Self::index_titles(&profiles, embedder.as_ref(), index.as_ref())?;

        let resolver = Arc::new(JobTitleResolver::new(
            profiles,
            taxonomy.clone(),
            normalizer.clone(),
            embedder.clone(),
            index.clone(),
            config.matching.job_title_threshold,
            config.matching.max_profile_skills,
        ));

        let analyzer = GapAnalyzer::new(
            resolver.clone(),
            taxonomy.clone(),
            config.matching.skill_match_threshold,
        );

        let extractor = SkillExtractor::new(
            taxonomy,
            normalizer.clone(),
            embedder.clone(),
            index.clone(),
            config.matching.skill_match_threshold,
        );

        let mut roadmap = RoadmapBuilder::new(embedder, index, config.roadmap.course_min_similarity);
        roadmap.initialize(&datasets.courses)?;

        let demand = DemandStore::from_records(&datasets.demand);
        if !demand.is_empty() {
            log::info!("Loaded {} demand predictions", demand.len());
        }

        Ok(Self {
            config,
            normalizer,
            extractor,
            analyzer,
            resolver,
            roadmap,
            demand,
        })
    }

    fn encode_taxonomy(
        records: &[crate::data::TaxonomyRecord],
        embedder: &dyn Embedder,
    ) -> Result<HashMap<String, Vec<f32>>> {
        let names: Vec<String> = records.iter().map(|r| r.skill_name.clone()).collect();
        log::info!("Encoding {} taxonomy skills at startup", names.len());
        let vectors = embedder.encode(&names)?;
        Ok(names.into_iter().zip(vectors).collect())
    }

    fn index_skills(taxonomy: &SkillTaxonomy, index: &dyn VectorIndex) -> Result<()> {
        index.delete_collection(SKILL_COLLECTION);
        index.create_collection(SKILL_COLLECTION)?;

        let mut ids = Vec::new();
        let mut documents = Vec::new();
        let mut vectors = Vec::new();
        for skill in taxonomy.iter() {
            if skill.embedding.is_empty() {
                continue;
            }
            ids.push(format!("skill_{}", skill.skill_id));
            documents.push(skill.name.clone());
            vectors.push(skill.embedding.clone());
        }
        index.upsert(SKILL_COLLECTION, &ids, &documents, &vectors)
    }

    fn index_titles(
        profiles: &BTreeMap<String, crate::analysis::resolver::JobRequirementProfile>,
        embedder: &dyn Embedder,
        index: &dyn VectorIndex,
    ) -> Result<()> {
        index.delete_collection(JOB_TITLE_COLLECTION);
        index.create_collection(JOB_TITLE_COLLECTION)?;

        if profiles.is_empty() {
            return Ok(());
        }

        let titles: Vec<String> = profiles.keys().cloned().collect();
        let vectors = embedder.encode(&titles)?;
        let ids: Vec<String> = (0..titles.len()).map(|i| format!("job_{}", i)).collect();
        index.upsert(JOB_TITLE_COLLECTION, &ids, &titles, &vectors)
    }

    /// Extract canonical skills from a skill list or free text.
    pub fn extract(&self, text: &str, mode: ExtractionMode) -> Result<Vec<SkillMatch>> {
        if text.trim().is_empty() {
            return Err(SkillGapError::InvalidInput("empty input text".to_string()));
        }
        self.extractor.extract(text, mode)
    }

    /// Analyze the gap between a user's skills and a target job title.
    ///
    /// An unresolvable title is an error, never an empty "zero skills
    /// needed" report.
    pub fn analyze_gap(&self, user_skills: &[String], job_title: &str) -> Result<GapReport> {
        if job_title.trim().is_empty() {
            return Err(SkillGapError::InvalidInput("empty job title".to_string()));
        }

        // Normalize and dedupe the user's skills first, synonyms included.
        let mut seen = std::collections::HashSet::new();
        let normalized: Vec<String> = user_skills
            .iter()
            .map(|s| self.normalizer.normalize(s))
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        let result = self.analyzer.analyze(&normalized, job_title)?;
        if result.job_title_confidence == 0.0 && result.matched_skills.is_empty() {
            return Err(SkillGapError::JobTitleNotFound(job_title.to_string()));
        }

        let matched = result
            .matched_skills
            .into_iter()
            .map(|m| MatchedSkill {
                demand: self.demand.get_trend(&m.required_skill).cloned(),
                user_skill: m.user_skill,
                required_skill: m.required_skill,
                category: m.category,
                similarity: m.similarity,
                frequency: m.frequency,
            })
            .collect();

        let mut missing: Vec<MissingSkill> = result
            .missing_skills
            .into_iter()
            .map(|m| {
                let demand = self.demand.get_trend(&m.skill_name).cloned();
                let priority = match &demand {
                    Some(trend) => priority_score(
                        m.frequency,
                        trend.growth_rate,
                        self.config.scoring.frequency_weight,
                        self.config.scoring.growth_weight,
                    ),
                    None => m.frequency,
                };
                MissingSkill {
                    skill_name: m.skill_name,
                    category: m.category,
                    frequency: m.frequency,
                    importance_rank: m.importance_rank,
                    priority_score: priority,
                    demand,
                }
            })
            .collect();

        missing.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.skill_name.cmp(&b.skill_name))
        });

        Ok(GapReport {
            job_title_matched: result.job_title_matched,
            job_title_confidence: result.job_title_confidence,
            matched_skills: matched,
            missing_skills: missing,
            category_breakdown: result.category_breakdown,
            overall_readiness_score: result.overall_readiness_score,
        })
    }

    /// Generate a phased learning roadmap for the user's skill gaps.
    pub fn build_roadmap(
        &self,
        user_skills: &[String],
        job_title: &str,
        style: Option<LearningStyle>,
    ) -> Result<RoadmapReport> {
        if !self.roadmap.is_ready() {
            return Err(SkillGapError::NotReady(
                "course catalog is empty; roadmap generation unavailable".to_string(),
            ));
        }

        let gap = self.analyze_gap(user_skills, job_title)?;

        let skills: Vec<RoadmapSkill> = gap
            .missing_skills
            .iter()
            .map(|m| RoadmapSkill {
                skill_name: m.skill_name.clone(),
                category: m.category,
                frequency: m.frequency,
                priority_score: Some(m.priority_score),
            })
            .collect();

        let roadmap = self
            .roadmap
            .build_roadmap(&skills, style, self.config.roadmap.courses_per_skill)?;

        Ok(RoadmapReport {
            job_title_matched: gap.job_title_matched,
            job_title_confidence: gap.job_title_confidence,
            overall_readiness_score: gap.overall_readiness_score,
            roadmap,
        })
    }

    /// All known normalized job titles, sorted.
    pub fn known_job_titles(&self) -> Vec<String> {
        self.resolver.known_titles()
    }
}
