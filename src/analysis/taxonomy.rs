//! Skill taxonomy: canonical skills, fixed categories, and the seed-centroid
//! category classifier

use crate::data::TaxonomyRecord;
use crate::embedding::cosine_similarity;
use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The five fixed skill categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    TechSkills,
    SoftSkills,
    Leadership,
    DomainKnowledge,
    AdaptationSkills,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 5] = [
        SkillCategory::TechSkills,
        SkillCategory::SoftSkills,
        SkillCategory::Leadership,
        SkillCategory::DomainKnowledge,
        SkillCategory::AdaptationSkills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::TechSkills => "tech_skills",
            SkillCategory::SoftSkills => "soft_skills",
            SkillCategory::Leadership => "leadership",
            SkillCategory::DomainKnowledge => "domain_knowledge",
            SkillCategory::AdaptationSkills => "adaptation_skills",
        }
    }

    pub fn parse(s: &str) -> Option<SkillCategory> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomy-adjacent terms too generic to be informative; excluded from
/// extraction results and from job-skill aggregation.
const NOISE_SKILLS: &[&str] = &[
    "company", "other", "environment", "product", "development",
    "business", "design", "delivery", "operations", "maintenance",
    "planning", "construction", "administrative", "analysis",
    "analytical", "research",
];

pub fn is_noise_skill(name: &str) -> bool {
    NOISE_SKILLS.contains(&name)
}

/// Seed skills anchoring each category centroid.
pub fn category_seeds() -> Vec<(SkillCategory, &'static [&'static str])> {
    vec![
        (SkillCategory::TechSkills, &[
            "python", "javascript", "machine learning", "sql", "docker",
            "react", "tensorflow", "kubernetes", "data engineering", "api design",
            "cloud computing", "cybersecurity", "deep learning", "git", "linux",
            "java", "typescript", "postgresql", "mongodb", "nodejs",
            "pytorch", "scikit-learn", "html", "css", "rest api",
        ]),
        (SkillCategory::SoftSkills, &[
            "communication", "teamwork", "problem solving", "time management",
            "critical thinking", "creativity", "negotiation",
            "presentation skills", "emotional intelligence", "conflict resolution",
            "active listening", "empathy", "interpersonal skills", "collaboration",
            "attention to detail", "organizational skills",
        ]),
        (SkillCategory::Leadership, &[
            "project management", "team leadership", "strategic planning",
            "decision making", "mentoring", "stakeholder management",
            "change management", "people management", "agile", "scrum",
            "product management", "program management", "coaching",
            "performance management", "talent management",
        ]),
        (SkillCategory::DomainKnowledge, &[
            "finance", "marketing", "healthcare", "supply chain", "accounting",
            "human resources", "legal", "manufacturing", "retail", "real estate",
            "insurance", "banking", "logistics", "consulting", "sales",
            "customer service", "engineering", "information technology",
        ]),
        (SkillCategory::AdaptationSkills, &[
            "continuous learning", "self-directed learning", "resilience",
            "growth mindset", "digital literacy", "cross-functional collaboration",
            "remote work", "innovation", "entrepreneurship", "cultural awareness",
            "adaptability", "flexibility", "curiosity", "self-motivation",
        ]),
    ]
}

/// A normalized, taxonomy-registered skill. Immutable once loaded.
///
/// An empty embedding means no vector is known for this skill; semantic
/// comparisons treat it as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalSkill {
    pub skill_id: i64,
    pub name: String,
    pub category: SkillCategory,
    pub embedding: Vec<f32>,
}

/// Frozen in-memory skill store keyed by normalized name.
///
/// Built once at startup; rebuilding is a full replace, never an incremental
/// update.
pub struct SkillTaxonomy {
    skills: HashMap<String, CanonicalSkill>,
}

impl SkillTaxonomy {
    /// Build the taxonomy from raw records and an embedding lookup.
    ///
    /// Records without a category are classified by nearest centroid; records
    /// without an embedding default to `tech_skills` with no vector.
    pub fn build(
        records: &[TaxonomyRecord],
        embeddings: &HashMap<String, Vec<f32>>,
        classifier: &CategoryClassifier,
    ) -> Self {
        let mut skills = HashMap::with_capacity(records.len());
        for record in records {
            let embedding = embeddings.get(&record.skill_name).cloned().unwrap_or_default();
            let category = record
                .category
                .as_deref()
                .and_then(SkillCategory::parse)
                .unwrap_or_else(|| {
                    if embedding.is_empty() {
                        SkillCategory::TechSkills
                    } else {
                        classifier.classify(&embedding).0
                    }
                });
            skills.insert(
                record.skill_name.clone(),
                CanonicalSkill {
                    skill_id: record.skill_id,
                    name: record.skill_name.clone(),
                    category,
                    embedding,
                },
            );
        }
        Self { skills }
    }

    pub fn get(&self, name: &str) -> Option<&CanonicalSkill> {
        self.skills.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Embedding vector for a skill, if one is known.
    pub fn vector(&self, name: &str) -> Option<&[f32]> {
        self.skills
            .get(name)
            .map(|s| s.embedding.as_slice())
            .filter(|v| !v.is_empty())
    }

    pub fn category(&self, name: &str) -> SkillCategory {
        self.skills
            .get(name)
            .map(|s| s.category)
            .unwrap_or(SkillCategory::TechSkills)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalSkill> {
        self.skills.values()
    }
}

/// Assigns categories by nearest-centroid similarity against seed embeddings.
pub struct CategoryClassifier {
    centroids: Vec<(SkillCategory, Vec<f32>)>,
}

impl CategoryClassifier {
    /// Compute one centroid per category as the mean of its available seed
    /// vectors. A category with no seed vectors at all is a dataset error.
    pub fn from_seeds(embeddings: &HashMap<String, Vec<f32>>) -> Result<Self> {
        let mut centroids = Vec::new();
        for (category, seeds) in category_seeds() {
            let vectors: Vec<&Vec<f32>> = seeds.iter().filter_map(|s| embeddings.get(*s)).collect();
            if vectors.is_empty() {
                return Err(SkillGapError::Dataset(format!(
                    "no seed skills found in embeddings for category '{}'",
                    category
                )));
            }
            let dim = vectors[0].len();
            let mut centroid = vec![0.0f32; dim];
            for v in &vectors {
                for (acc, x) in centroid.iter_mut().zip(v.iter()) {
                    *acc += x;
                }
            }
            let n = vectors.len() as f32;
            for acc in centroid.iter_mut() {
                *acc /= n;
            }
            centroids.push((category, centroid));
        }
        Ok(Self { centroids })
    }

    /// Nearest-centroid classification: returns the best category and the
    /// similarity that chose it.
    pub fn classify(&self, vector: &[f32]) -> (SkillCategory, f32) {
        let mut best = (SkillCategory::TechSkills, f32::MIN);
        for (category, centroid) in &self.centroids {
            let sim = cosine_similarity(vector, centroid);
            if sim > best.1 {
                best = (*category, sim);
            }
        }
        best
    }
}
