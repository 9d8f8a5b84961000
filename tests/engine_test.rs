//! End-to-end engine tests over an in-memory index and a deterministic
//! embedder.

use skillgap::analysis::extractor::ExtractionMode;
use skillgap::analysis::roadmap::LearningStyle;
use skillgap::config::Config;
use skillgap::data::{CourseRecord, Datasets, DemandRecord, JobSkillRow, TaxonomyRecord};
use skillgap::embedding::Embedder;
use skillgap::engine::SkillGapEngine;
use skillgap::error::{Result, SkillGapError};
use skillgap::index::InMemoryIndex;
use std::collections::HashMap;
use std::sync::Arc;

struct FakeEmbedder {
    known: HashMap<String, Vec<f32>>,
}

impl Embedder for FakeEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                self.known
                    .get(t.to_lowercase().as_str())
                    .cloned()
                    .unwrap_or_else(|| vec![0.0, 0.0, 0.0, 0.0, 1.0])
            })
            .collect())
    }
}

fn embeddings() -> HashMap<String, Vec<f32>> {
    let mut e = HashMap::new();
    e.insert("python".to_string(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
    e.insert("docker".to_string(), vec![0.0, 1.0, 0.0, 0.0, 0.0]);
    e.insert("kubernetes".to_string(), vec![0.0, 0.0, 1.0, 0.0, 0.0]);
    e.insert("communication".to_string(), vec![0.0, 0.0, 0.0, 1.0, 0.0]);
    // classifier seed coverage for the remaining categories
    e.insert("project management".to_string(), vec![0.4, 0.4, 0.4, 0.0, 0.0]);
    e.insert("finance".to_string(), vec![0.0, 0.0, 0.0, 0.7, 0.7]);
    e.insert("resilience".to_string(), vec![0.2, 0.2, 0.2, 0.2, 0.2]);
    e
}

fn taxonomy_records() -> Vec<TaxonomyRecord> {
    let mk = |id, name: &str| TaxonomyRecord {
        skill_id: id,
        skill_name: name.to_string(),
        category: Some("tech_skills".to_string()),
        total_count: None,
    };
    vec![mk(1, "python"), mk(2, "docker"), mk(3, "kubernetes")]
}

/// 10 backend engineer jobs: python in 9, docker in 6, kubernetes in 3.
fn job_skill_rows() -> Vec<JobSkillRow> {
    let mut rows = Vec::new();
    let mut push = |job: String, skill: &str| {
        rows.push(JobSkillRow {
            job_id: job,
            job_title: "Backend Engineer".to_string(),
            skill: skill.to_string(),
        });
    };
    for i in 0..9 {
        push(format!("j{}", i), "python");
    }
    for i in 0..6 {
        push(format!("j{}", i), "docker");
    }
    for i in 0..3 {
        push(format!("j{}", i), "kubernetes");
    }
    push("j9".to_string(), "docker");
    rows
}

fn courses() -> Vec<CourseRecord> {
    let mk = |title: &str, skill_text: &str| CourseRecord {
        id: None,
        title: title.to_string(),
        platform: "Udemy".to_string(),
        url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        category: "Development".to_string(),
        skill_text: skill_text.to_string(),
        level: "All Levels".to_string(),
        subscribers: 20_000,
        reviews: 500,
        content_hours: 8.0,
    };
    vec![
        mk("Docker Mastery", "docker containers"),
        mk("Kubernetes Basics", "kubernetes orchestration"),
    ]
}

fn demand() -> Vec<DemandRecord> {
    vec![DemandRecord {
        skill_name: "docker".to_string(),
        predicted_trend: "rising".to_string(),
        confidence: 0.9,
        growth_rate: 0.08,
        current_demand: 5000,
    }]
}

fn engine(with_courses: bool) -> SkillGapEngine {
    let mut known = embeddings();
    known.insert("docker containers".to_string(), vec![0.0, 0.95, 0.0, 0.0, 0.05]);
    known.insert("kubernetes orchestration".to_string(), vec![0.0, 0.0, 0.95, 0.0, 0.05]);
    // Distinct title vector so unknown titles (fallback vector) stay far away.
    known.insert("backend engineer".to_string(), vec![0.5, 0.5, 0.5, 0.0, 0.0]);

    let mut synonyms = HashMap::new();
    synonyms.insert("k8s".to_string(), "kubernetes".to_string());

    let datasets = Datasets {
        taxonomy: taxonomy_records(),
        synonyms,
        embeddings: Some(embeddings()),
        job_skills: job_skill_rows(),
        courses: if with_courses { courses() } else { Vec::new() },
        demand: demand(),
    };

    SkillGapEngine::new(
        Config::default(),
        datasets,
        Arc::new(FakeEmbedder { known }),
        Arc::new(InMemoryIndex::new()),
    )
    .unwrap()
}

#[test]
fn gap_analysis_end_to_end() {
    let engine = engine(true);
    let user = vec!["Python".to_string(), "Terraform".to_string()];
    let report = engine.analyze_gap(&user, "Backend Engineer").unwrap();

    assert_eq!(report.job_title_matched, "backend engineer");
    assert_eq!(report.job_title_confidence, 1.0);

    // Terraform is unknown; python matches exactly.
    assert_eq!(report.matched_skills.len(), 1);
    assert_eq!(report.matched_skills[0].required_skill, "python");
    assert_eq!(report.matched_skills[0].similarity, 1.0);

    // docker and kubernetes remain, one of three required matched.
    assert_eq!(report.missing_skills.len(), 2);
    assert!((report.overall_readiness_score - 0.3333).abs() < 1e-4);
}

#[test]
fn missing_skills_are_priority_ordered_with_demand() {
    let engine = engine(true);
    let report = engine
        .analyze_gap(&["python".to_string()], "backend engineer")
        .unwrap();

    // docker: frequency 0.7, rising demand. kubernetes: 0.3, no demand data.
    let docker = &report.missing_skills[0];
    assert_eq!(docker.skill_name, "docker");
    assert!(docker.demand.is_some());
    // 0.6 * 0.7 + 0.4 * ((0.08 + 0.05) / 0.15)
    assert!((docker.priority_score - 0.7667).abs() < 1e-3);

    let k8s = &report.missing_skills[1];
    assert_eq!(k8s.skill_name, "kubernetes");
    assert!(k8s.demand.is_none());
    assert_eq!(k8s.priority_score, k8s.frequency);
}

#[test]
fn synonyms_fold_before_matching() {
    let engine = engine(true);
    let report = engine
        .analyze_gap(&["K8s".to_string()], "backend engineer")
        .unwrap();
    assert!(report
        .matched_skills
        .iter()
        .any(|m| m.required_skill == "kubernetes" && m.similarity == 1.0));
}

#[test]
fn unknown_job_title_is_an_error() {
    let engine = engine(true);
    let result = engine.analyze_gap(&["python".to_string()], "chief unicorn wrangler");
    assert!(matches!(result, Err(SkillGapError::JobTitleNotFound(_))));
}

#[test]
fn empty_job_title_is_invalid_input() {
    let engine = engine(true);
    let result = engine.analyze_gap(&["python".to_string()], "   ");
    assert!(matches!(result, Err(SkillGapError::InvalidInput(_))));
}

#[test]
fn extraction_through_the_engine() {
    let engine = engine(true);
    let matches = engine
        .extract("Python, k8s, underwater basket weaving", ExtractionMode::SkillList)
        .unwrap();
    let names: Vec<&str> = matches.iter().map(|m| m.skill_name.as_str()).collect();
    assert!(names.contains(&"python"));
    assert!(names.contains(&"kubernetes"));
    assert_eq!(matches.len(), 2);
}

#[test]
fn roadmap_covers_all_missing_skills() {
    let engine = engine(true);
    let report = engine
        .build_roadmap(&["python".to_string()], "backend engineer", Some(LearningStyle::Visual))
        .unwrap();

    assert_eq!(report.job_title_matched, "backend engineer");
    assert_eq!(report.roadmap.total_skills, 2);

    let phase_total: usize = report.roadmap.phases.iter().map(|p| p.skills.len()).sum();
    assert_eq!(phase_total, 2);
    // 2 skills split into singleton phases, the third phase is dropped.
    assert_eq!(report.roadmap.phases.len(), 2);
    assert_eq!(report.roadmap.phases[0].name, "Foundation");

    // docker outranks kubernetes on priority, and each finds its course.
    assert_eq!(report.roadmap.phases[0].skills[0].skill_name, "docker");
    assert!(report
        .roadmap
        .phases[0]
        .skills[0]
        .courses
        .iter()
        .any(|c| c.title == "Docker Mastery"));
}

#[test]
fn roadmap_without_catalog_is_not_ready() {
    let engine = engine(false);
    let result = engine.build_roadmap(&["python".to_string()], "backend engineer", None);
    assert!(matches!(result, Err(SkillGapError::NotReady(_))));
}

#[test]
fn known_titles_lists_aggregated_profiles() {
    let engine = engine(true);
    assert_eq!(engine.known_job_titles(), vec!["backend engineer"]);
}
