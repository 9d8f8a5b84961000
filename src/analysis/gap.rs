//! Gap analysis: matched/missing skills, category coverage, readiness score

use crate::analysis::resolver::{round4, JobTitleResolver, RequiredSkill};
use crate::analysis::taxonomy::{SkillCategory, SkillTaxonomy};
use crate::embedding::cosine_similarity;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A required skill the user covers, with the user skill that covered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedSkillDetail {
    pub user_skill: String,
    pub required_skill: String,
    pub category: SkillCategory,
    pub similarity: f32,
    /// How common the required skill is for the matched title.
    pub frequency: f32,
}

/// Coverage for a single skill category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: SkillCategory,
    pub total_required: usize,
    pub user_has: usize,
    pub coverage_pct: f32,
    pub missing: Vec<String>,
}

/// Complete gap analysis result.
///
/// `job_title_confidence` of 0.0 with no matched skills means the title
/// could not be resolved; the boundary layer decides how to surface that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysisResult {
    pub job_title_matched: String,
    pub job_title_confidence: f32,
    pub matched_skills: Vec<MatchedSkillDetail>,
    pub missing_skills: Vec<RequiredSkill>,
    pub category_breakdown: BTreeMap<String, CategoryScore>,
    pub overall_readiness_score: f32,
}

/// Compares a user's skill set against a resolved requirement profile.
pub struct GapAnalyzer {
    resolver: Arc<JobTitleResolver>,
    taxonomy: Arc<SkillTaxonomy>,
    threshold: f32,
}

impl GapAnalyzer {
    pub fn new(resolver: Arc<JobTitleResolver>, taxonomy: Arc<SkillTaxonomy>, threshold: f32) -> Self {
        Self {
            resolver,
            taxonomy,
            threshold,
        }
    }

    /// Run the full gap analysis for a set of normalized user skill names
    /// against an arbitrary job-title string.
    pub fn analyze(&self, user_skills: &[String], job_title: &str) -> Result<GapAnalysisResult> {
        let resolution = self.resolver.resolve(job_title)?;

        if resolution.required_skills.is_empty() {
            return Ok(GapAnalysisResult {
                job_title_matched: resolution.matched_title,
                job_title_confidence: resolution.confidence,
                matched_skills: Vec::new(),
                missing_skills: Vec::new(),
                category_breakdown: BTreeMap::new(),
                overall_readiness_score: 0.0,
            });
        }

        let (matched, missing) = self.compute_gap(user_skills, &resolution.required_skills);
        let category_breakdown = Self::category_breakdown(&matched, &missing);

        let total_required = resolution.required_skills.len();
        let readiness = if total_required > 0 {
            round4(matched.len() as f32 / total_required as f32)
        } else {
            0.0
        };

        Ok(GapAnalysisResult {
            job_title_matched: resolution.matched_title,
            job_title_confidence: resolution.confidence,
            matched_skills: matched,
            missing_skills: missing,
            category_breakdown,
            overall_readiness_score: readiness,
        })
    }

    /// Match required skills in rank order: exact name match first, then the
    /// best cosine similarity over the user's skill vectors. A required skill
    /// is claimed at most once.
    fn compute_gap(
        &self,
        user_skills: &[String],
        required_skills: &[RequiredSkill],
    ) -> (Vec<MatchedSkillDetail>, Vec<RequiredSkill>) {
        let mut matched = Vec::new();
        let mut missing = Vec::new();

        // User skills without a taxonomy vector are dropped before comparison.
        let user_vectors: Vec<(&String, &[f32])> = user_skills
            .iter()
            .filter_map(|s| self.taxonomy.vector(s).map(|v| (s, v)))
            .collect();

        for req in required_skills {
            let req_vec = match self.taxonomy.vector(&req.skill_name) {
                Some(v) => v,
                None => {
                    missing.push(req.clone());
                    continue;
                }
            };

            if user_skills.iter().any(|s| s == &req.skill_name) {
                matched.push(MatchedSkillDetail {
                    user_skill: req.skill_name.clone(),
                    required_skill: req.skill_name.clone(),
                    category: req.category,
                    similarity: 1.0,
                    frequency: req.frequency,
                });
                continue;
            }

            let mut best_sim = 0.0f32;
            let mut best_user = "";
            for (user_skill, user_vec) in &user_vectors {
                let sim = cosine_similarity(user_vec, req_vec);
                if sim > best_sim {
                    best_sim = sim;
                    best_user = user_skill;
                }
            }

            if best_sim >= self.threshold {
                matched.push(MatchedSkillDetail {
                    user_skill: best_user.to_string(),
                    required_skill: req.skill_name.clone(),
                    category: req.category,
                    similarity: round4(best_sim),
                    frequency: req.frequency,
                });
            } else {
                missing.push(req.clone());
            }
        }

        (matched, missing)
    }

    fn category_breakdown(
        matched: &[MatchedSkillDetail],
        missing: &[RequiredSkill],
    ) -> BTreeMap<String, CategoryScore> {
        let mut breakdown: BTreeMap<String, CategoryScore> = BTreeMap::new();

        fn entry<'a>(
            breakdown: &'a mut BTreeMap<String, CategoryScore>,
            category: SkillCategory,
        ) -> &'a mut CategoryScore {
            breakdown
                .entry(category.as_str().to_string())
                .or_insert_with(move || CategoryScore {
                    category,
                    total_required: 0,
                    user_has: 0,
                    coverage_pct: 0.0,
                    missing: Vec::new(),
                })
        }

        for m in matched {
            let score = entry(&mut breakdown, m.category);
            score.user_has += 1;
        }
        for m in missing {
            let score = entry(&mut breakdown, m.category);
            score.missing.push(m.skill_name.clone());
        }

        for score in breakdown.values_mut() {
            score.total_required = score.user_has + score.missing.len();
            score.coverage_pct = if score.total_required > 0 {
                round4(score.user_has as f32 / score.total_required as f32)
            } else {
                0.0
            };
        }

        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::SkillNormalizer;
    use crate::analysis::resolver::{aggregate_job_skills, JOB_TITLE_COLLECTION};
    use crate::analysis::taxonomy::CategoryClassifier;
    use crate::data::{JobSkillRow, TaxonomyRecord};
    use crate::embedding::Embedder;
    use crate::index::{InMemoryIndex, VectorIndex};
    use std::collections::HashMap;

    struct FakeEmbedder;

    impl Embedder for FakeEmbedder {
        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            // Titles are resolved exactly in these tests; anything that hits
            // the index matches nothing.
            Ok(texts.iter().map(|_| vec![0.0, 0.0, 0.0, 1.0]).collect())
        }
    }

    fn embeddings() -> HashMap<String, Vec<f32>> {
        let mut e = HashMap::new();
        e.insert("python".to_string(), vec![1.0, 0.0, 0.0, 0.0]);
        e.insert("docker".to_string(), vec![0.0, 1.0, 0.0, 0.0]);
        e.insert("kubernetes".to_string(), vec![0.0, 0.92, 0.39, 0.0]);
        e.insert("communication".to_string(), vec![0.0, 0.0, 1.0, 0.0]);
        // classifier seeds
        e.insert("project management".to_string(), vec![0.0, 0.1, 0.9, 0.0]);
        e.insert("finance".to_string(), vec![0.3, 0.3, 0.3, 0.0]);
        e.insert("resilience".to_string(), vec![0.2, 0.2, 0.2, 0.2]);
        e
    }

    fn taxonomy() -> Arc<SkillTaxonomy> {
        let classifier = CategoryClassifier::from_seeds(&embeddings()).unwrap();
        let mk = |id, name: &str, cat: &str| TaxonomyRecord {
            skill_id: id,
            skill_name: name.to_string(),
            category: Some(cat.to_string()),
            total_count: None,
        };
        let records = vec![
            mk(1, "python", "tech_skills"),
            mk(2, "docker", "tech_skills"),
            mk(3, "kubernetes", "tech_skills"),
            mk(4, "communication", "soft_skills"),
        ];
        Arc::new(SkillTaxonomy::build(&records, &embeddings(), &classifier))
    }

    fn analyzer_with_profile(rows: Vec<JobSkillRow>) -> GapAnalyzer {
        let normalizer = Arc::new(SkillNormalizer::new(HashMap::new()));
        let profiles = aggregate_job_skills(&rows, &normalizer, 3, 0.05, 30);
        let index = Arc::new(InMemoryIndex::new());
        index.create_collection(JOB_TITLE_COLLECTION).unwrap();
        let taxonomy = taxonomy();
        let resolver = Arc::new(JobTitleResolver::new(
            profiles,
            taxonomy.clone(),
            normalizer,
            Arc::new(FakeEmbedder),
            index,
            0.50,
            30,
        ));
        GapAnalyzer::new(resolver, taxonomy, 0.45)
    }

    fn backend_rows() -> Vec<JobSkillRow> {
        let mut rows = Vec::new();
        let mut push = |job: &str, skill: &str| {
            rows.push(JobSkillRow {
                job_id: job.to_string(),
                job_title: "backend engineer".to_string(),
                skill: skill.to_string(),
            });
        };
        // python 9/10, docker 6/10, kubernetes 3/10
        for i in 0..9 {
            push(&format!("j{}", i), "python");
        }
        for i in 0..6 {
            push(&format!("j{}", i), "docker");
        }
        for i in 0..3 {
            push(&format!("j{}", i), "kubernetes");
        }
        push("j9", "communication");
        rows
    }

    #[test]
    fn test_exact_match_scores_one_third_readiness() {
        let analyzer = analyzer_with_profile(backend_rows());
        // Terraform is not in the taxonomy, so it is dropped before comparison.
        let user = vec!["python".to_string(), "terraform".to_string()];
        let result = analyzer.analyze(&user, "Backend Engineer").unwrap();

        assert_eq!(result.job_title_matched, "backend engineer");
        assert_eq!(result.job_title_confidence, 1.0);
        assert_eq!(result.matched_skills.len(), 1);
        assert_eq!(result.matched_skills[0].required_skill, "python");
        assert_eq!(result.matched_skills[0].similarity, 1.0);

        // 4 required: python, docker, kubernetes, communication. One matched.
        assert_eq!(result.missing_skills.len(), 3);
        assert_eq!(result.overall_readiness_score, 0.25);
    }

    #[test]
    fn test_semantic_match_above_threshold() {
        let analyzer = analyzer_with_profile(backend_rows());
        // docker covers kubernetes semantically: cos = 0.92 / 0.9985 ~ 0.9214
        let user = vec!["docker".to_string()];
        let result = analyzer.analyze(&user, "backend engineer").unwrap();

        let k8s = result
            .matched_skills
            .iter()
            .find(|m| m.required_skill == "kubernetes")
            .expect("kubernetes should match semantically");
        assert_eq!(k8s.user_skill, "docker");
        assert!(k8s.similarity >= 0.45 && k8s.similarity < 1.0);
    }

    #[test]
    fn test_category_breakdown_sums_to_required() {
        let analyzer = analyzer_with_profile(backend_rows());
        let user = vec!["python".to_string(), "communication".to_string()];
        let result = analyzer.analyze(&user, "backend engineer").unwrap();

        let total: usize = result.category_breakdown.values().map(|c| c.total_required).sum();
        assert_eq!(total, result.matched_skills.len() + result.missing_skills.len());

        let tech = result.category_breakdown.get("tech_skills").unwrap();
        assert_eq!(tech.total_required, 3);
        assert_eq!(tech.user_has, 1);
        assert_eq!(tech.coverage_pct, round4(1.0 / 3.0));
        assert_eq!(tech.missing, vec!["docker".to_string(), "kubernetes".to_string()]);

        let soft = result.category_breakdown.get("soft_skills").unwrap();
        assert_eq!(soft.user_has, 1);
        assert_eq!(soft.coverage_pct, 1.0);
    }

    #[test]
    fn test_readiness_bounds() {
        let analyzer = analyzer_with_profile(backend_rows());
        let all = vec![
            "python".to_string(),
            "docker".to_string(),
            "kubernetes".to_string(),
            "communication".to_string(),
        ];
        let result = analyzer.analyze(&all, "backend engineer").unwrap();
        assert_eq!(result.overall_readiness_score, 1.0);

        let none: Vec<String> = Vec::new();
        let result = analyzer.analyze(&none, "backend engineer").unwrap();
        assert_eq!(result.overall_readiness_score, 0.0);
    }

    #[test]
    fn test_unresolved_title_yields_empty_zero_result() {
        let analyzer = analyzer_with_profile(backend_rows());
        let result = analyzer
            .analyze(&["python".to_string()], "xyzzy nonexistent role")
            .unwrap();
        assert_eq!(result.job_title_confidence, 0.0);
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
        assert!(result.category_breakdown.is_empty());
        assert_eq!(result.overall_readiness_score, 0.0);
        assert_eq!(result.job_title_matched, "xyzzy nonexistent role");
    }

    #[test]
    fn test_skill_match_threshold_is_inclusive() {
        // cos(containerd, docker) = 180 / (20 * 20) = 0.45 exactly: integral
        // norms keep f32 rounding and the denominator epsilon from moving it.
        let mut e = HashMap::new();
        e.insert("docker".to_string(), vec![20.0, 0.0, 0.0, 0.0, 0.0]);
        e.insert("containerd".to_string(), vec![9.0, 17.0, 5.0, 2.0, 1.0]);
        e.insert("buildah".to_string(), vec![8.998, 17.0, 5.0, 2.0, 1.0]);
        e.insert("communication".to_string(), vec![0.0, 1.0, 0.0, 0.0, 0.0]);
        e.insert("project management".to_string(), vec![0.0, 0.0, 1.0, 0.0, 0.0]);
        e.insert("finance".to_string(), vec![0.0, 0.0, 0.0, 1.0, 0.0]);
        e.insert("resilience".to_string(), vec![0.0, 0.0, 0.0, 0.0, 1.0]);

        let classifier = CategoryClassifier::from_seeds(&e).unwrap();
        let mk = |id, name: &str| TaxonomyRecord {
            skill_id: id,
            skill_name: name.to_string(),
            category: Some("tech_skills".to_string()),
            total_count: None,
        };
        let records = vec![mk(1, "docker"), mk(2, "containerd"), mk(3, "buildah")];
        let taxonomy = Arc::new(SkillTaxonomy::build(&records, &e, &classifier));

        let normalizer = Arc::new(SkillNormalizer::new(HashMap::new()));
        let rows: Vec<JobSkillRow> = (0..3)
            .map(|i| JobSkillRow {
                job_id: format!("j{}", i),
                job_title: "platform engineer".to_string(),
                skill: "docker".to_string(),
            })
            .collect();
        let profiles = aggregate_job_skills(&rows, &normalizer, 3, 0.05, 30);

        let index = Arc::new(InMemoryIndex::new());
        index.create_collection(JOB_TITLE_COLLECTION).unwrap();
        let resolver = Arc::new(JobTitleResolver::new(
            profiles,
            taxonomy.clone(),
            normalizer,
            Arc::new(FakeEmbedder),
            index,
            0.50,
            30,
        ));
        let analyzer = GapAnalyzer::new(resolver, taxonomy, 0.45);

        // Exactly at the threshold: matched.
        let at = analyzer
            .analyze(&["containerd".to_string()], "platform engineer")
            .unwrap();
        assert_eq!(at.matched_skills.len(), 1);
        assert_eq!(at.matched_skills[0].required_skill, "docker");
        assert_eq!(at.matched_skills[0].similarity, 0.45);
        assert!(at.missing_skills.is_empty());

        // Just under: missing.
        let below = analyzer
            .analyze(&["buildah".to_string()], "platform engineer")
            .unwrap();
        assert!(below.matched_skills.is_empty());
        assert_eq!(below.missing_skills.len(), 1);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = analyzer_with_profile(backend_rows());
        let user = vec!["python".to_string(), "docker".to_string()];
        let a = analyzer.analyze(&user, "backend engineer").unwrap();
        let b = analyzer.analyze(&user, "backend engineer").unwrap();
        assert_eq!(a.overall_readiness_score, b.overall_readiness_score);
        let names_a: Vec<_> = a.missing_skills.iter().map(|m| &m.skill_name).collect();
        let names_b: Vec<_> = b.missing_skills.iter().map(|m| &m.skill_name).collect();
        assert_eq!(names_a, names_b);
    }
}
