//! Course matching and phased learning roadmap generation

use crate::analysis::taxonomy::SkillCategory;
use crate::data::CourseRecord;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Collection holding one entry per catalog course.
pub const COURSE_COLLECTION: &str = "course_catalog";

const PHASE_COUNT: usize = 3;
const MAX_OVERFETCH: usize = 20;

/// VAK learning style preference used to re-rank resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
}

impl LearningStyle {
    pub fn parse(s: &str) -> Option<LearningStyle> {
        match s.to_lowercase().as_str() {
            "visual" => Some(LearningStyle::Visual),
            "auditory" => Some(LearningStyle::Auditory),
            "kinesthetic" => Some(LearningStyle::Kinesthetic),
            _ => None,
        }
    }
}

/// A course ranked against one skill. `match_score` starts as raw cosine
/// similarity and is boosted, never re-queried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCandidate {
    pub title: String,
    pub platform: String,
    pub url: String,
    pub category: String,
    pub level: String,
    pub match_score: f32,
    pub subscribers: u64,
    pub reviews: u64,
    pub content_hours: f32,
}

/// A missing skill entering roadmap generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapSkill {
    pub skill_name: String,
    pub category: SkillCategory,
    pub frequency: f32,
    pub priority_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillPlan {
    pub skill_name: String,
    pub category: SkillCategory,
    pub frequency: f32,
    pub priority_score: f32,
    pub courses: Vec<CourseCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub phase: usize,
    pub name: String,
    pub description: String,
    pub weeks: String,
    pub skills: Vec<SkillPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub phases: Vec<RoadmapPhase>,
    pub total_skills: usize,
    pub total_courses: usize,
    pub learning_style: Option<LearningStyle>,
}

/// Matches skills to catalog courses and lays out the phased plan.
pub struct RoadmapBuilder {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    catalog: HashMap<String, CourseRecord>,
    min_similarity: f32,
    ready: bool,
}

impl RoadmapBuilder {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, min_similarity: f32) -> Self {
        Self {
            embedder,
            index,
            catalog: HashMap::new(),
            min_similarity,
            ready: false,
        }
    }

    /// Embed the course catalog and rebuild its collection.
    ///
    /// Rebuild is delete-then-recreate; with no courses the builder stays
    /// unavailable rather than erroring.
    pub fn initialize(&mut self, courses: &[CourseRecord]) -> Result<()> {
        if courses.is_empty() {
            log::warn!("No courses loaded; roadmap generation will be unavailable");
            return Ok(());
        }

        let mut unique: Vec<(String, CourseRecord)> = Vec::with_capacity(courses.len());
        for course in courses {
            let id = course_id(course);
            if !self.catalog.contains_key(&id) {
                self.catalog.insert(id.clone(), course.clone());
                unique.push((id, course.clone()));
            }
        }

        self.index.delete_collection(COURSE_COLLECTION);
        self.index.create_collection(COURSE_COLLECTION)?;

        let texts: Vec<String> = unique.iter().map(|(_, c)| c.skill_text.clone()).collect();
        let vectors = self.embedder.encode(&texts)?;
        let ids: Vec<String> = unique.iter().map(|(id, _)| id.clone()).collect();

        self.index.upsert(COURSE_COLLECTION, &ids, &texts, &vectors)?;
        self.ready = true;
        log::info!("Roadmap builder initialized with {} courses", ids.len());
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Top-k courses for one skill, learning-style aware.
    ///
    /// Over-fetches 2k candidates for re-ranking, discards weak matches,
    /// boosts by style and popularity, then truncates.
    pub fn find_courses(&self, skill_name: &str, k: usize, style: Option<LearningStyle>) -> Result<Vec<CourseCandidate>> {
        if !self.ready || k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.encode(&[skill_name.to_string()])?;
        let overfetch = (k * 2).min(MAX_OVERFETCH);
        let mut results = self.index.query(COURSE_COLLECTION, &query, overfetch)?;
        let neighbors = results.pop().unwrap_or_default();

        let mut candidates = Vec::new();
        for neighbor in neighbors {
            if neighbor.similarity < self.min_similarity {
                continue;
            }
            let record = match self.catalog.get(&neighbor.id) {
                Some(r) => r,
                None => continue,
            };

            let mut candidate = CourseCandidate {
                title: record.title.clone(),
                platform: record.platform.clone(),
                url: record.url.clone(),
                category: record.category.clone(),
                level: record.level.clone(),
                match_score: round3(neighbor.similarity),
                subscribers: record.subscribers,
                reviews: record.reviews,
                content_hours: record.content_hours,
            };
            candidate.match_score = round3(boosted_score(neighbor.similarity, &candidate, style));
            candidates.push(candidate);
        }

        candidates.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });
        candidates.truncate(k);
        Ok(candidates)
    }

    /// Build the three-phase plan from missing skills.
    ///
    /// Skills are ordered by priority (frequency when no priority is given)
    /// and split positionally; the last phase absorbs the remainder.
    pub fn build_roadmap(
        &self,
        missing_skills: &[RoadmapSkill],
        style: Option<LearningStyle>,
        courses_per_skill: usize,
    ) -> Result<Roadmap> {
        if missing_skills.is_empty() {
            return Ok(Roadmap {
                phases: Vec::new(),
                total_skills: 0,
                total_courses: 0,
                learning_style: style,
            });
        }

        let mut sorted: Vec<&RoadmapSkill> = missing_skills.iter().collect();
        sorted.sort_by(|a, b| {
            let pa = a.priority_score.unwrap_or(a.frequency);
            let pb = b.priority_score.unwrap_or(b.frequency);
            pb.partial_cmp(&pa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.skill_name.cmp(&b.skill_name))
        });

        let total = sorted.len();
        let phase_size = std::cmp::max(1, total / PHASE_COUNT);
        let phase_configs = [
            ("Foundation", "High-priority fundamentals", "Weeks 1-4"),
            ("Core Development", "Core technical depth", "Weeks 5-8"),
            ("Specialization", "Advanced and specialized skills", "Weeks 9-12"),
        ];

        let mut phases = Vec::new();
        let mut total_courses = 0;

        for (phase_idx, (name, description, weeks)) in phase_configs.iter().enumerate() {
            let start = phase_idx * phase_size;
            let end = if phase_idx == PHASE_COUNT - 1 {
                total
            } else {
                (start + phase_size).min(total)
            };
            if start >= end {
                continue;
            }

            let mut skills = Vec::new();
            for skill in &sorted[start..end] {
                let courses = self.find_courses(&skill.skill_name, courses_per_skill, style)?;
                total_courses += courses.len();
                skills.push(SkillPlan {
                    skill_name: skill.skill_name.clone(),
                    category: skill.category,
                    frequency: skill.frequency,
                    priority_score: skill.priority_score.unwrap_or(skill.frequency),
                    courses,
                });
            }

            phases.push(RoadmapPhase {
                phase: phase_idx + 1,
                name: name.to_string(),
                description: description.to_string(),
                weeks: weeks.to_string(),
                skills,
            });
        }

        Ok(Roadmap {
            phases,
            total_skills: total,
            total_courses,
            learning_style: style,
        })
    }
}

/// Stable id for a catalog course: explicit id, or platform + title hash.
fn course_id(course: &CourseRecord) -> String {
    if let Some(id) = &course.id {
        return id.clone();
    }
    let digest = md5::compute(course.title.as_bytes());
    let hex = format!("{:x}", digest);
    format!("{}_{}", course.platform.to_lowercase(), &hex[..10])
}

/// Platforms whose catalog skews to video-first material.
fn is_video_heavy(platform: &str) -> bool {
    platform.eq_ignore_ascii_case("udemy")
}

/// Platforms built around structured lecture series.
fn is_lecture_format(platform: &str) -> bool {
    platform.eq_ignore_ascii_case("coursera")
}

fn boosted_score(base: f32, course: &CourseCandidate, style: Option<LearningStyle>) -> f32 {
    let mut boost = 0.0;

    match style {
        Some(LearningStyle::Visual) => {
            if is_video_heavy(&course.platform) {
                boost += 0.03;
            }
            if course.content_hours > 5.0 {
                boost += 0.02;
            }
        }
        Some(LearningStyle::Auditory) => {
            if is_lecture_format(&course.platform) {
                boost += 0.03;
            }
        }
        Some(LearningStyle::Kinesthetic) => {
            if course.content_hours > 10.0 {
                boost += 0.03;
            }
            if course.subscribers > 10_000 {
                boost += 0.02;
            }
        }
        None => {}
    }

    // Social proof, tiered by audience size.
    if course.subscribers > 50_000 {
        boost += 0.02;
    } else if course.subscribers > 10_000 {
        boost += 0.01;
    }

    base + boost
}

fn round3(x: f32) -> f32 {
    (x * 1_000.0).round() / 1_000.0
}
