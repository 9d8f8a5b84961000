//! Console and JSON formatters for analysis results

use crate::analysis::extractor::SkillMatch;
use crate::engine::{GapReport, RoadmapReport};
use crate::error::Result;
use chrono::Utc;
use colored::{Color, Colorize};
use serde::Serialize;

/// Rich console formatter with optional colors.
pub struct ConsoleFormatter {
    use_colors: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };
        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn readiness_badge(&self, score: f32) -> String {
        let pct = (score * 100.0).round() as u8;
        let (badge, color) = match pct {
            80..=100 => ("READY", Color::Green),
            60..=79 => ("CLOSE", Color::BrightGreen),
            40..=59 => ("IN PROGRESS", Color::Yellow),
            20..=39 => ("EARLY", Color::BrightYellow),
            _ => ("JUST STARTING", Color::Red),
        };
        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    pub fn format_matches(&self, matches: &[SkillMatch]) -> String {
        let mut out = String::new();
        out.push_str(&self.format_header("Extracted Skills", 1));

        if matches.is_empty() {
            out.push_str("No skills recognized in the input.\n");
            return out;
        }

        for (i, m) in matches.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} ({}) - confidence {:.2}\n",
                i + 1,
                self.colorize(&m.skill_name, Color::Cyan),
                m.category,
                m.confidence
            ));
            if m.matched_from != m.skill_name {
                out.push_str(&format!("     from: \"{}\"\n", m.matched_from));
            }
        }
        out.push_str(&format!("\n{} skills found\n", matches.len()));
        out
    }

    pub fn format_gap_report(&self, report: &GapReport) -> String {
        let mut out = String::new();
        out.push_str(&self.format_header("Skill Gap Analysis", 1));

        out.push_str(&format!(
            "Target role: {} (match confidence {:.0}%)\n",
            self.colorize(&report.job_title_matched, Color::Cyan),
            report.job_title_confidence * 100.0
        ));
        out.push_str(&format!(
            "Overall readiness: {:.1}% {}\n",
            report.overall_readiness_score * 100.0,
            self.readiness_badge(report.overall_readiness_score)
        ));

        out.push_str(&self.format_header("Skills You Have", 2));
        if report.matched_skills.is_empty() {
            out.push_str("  (none of the required skills matched)\n");
        }
        for m in &report.matched_skills {
            let via = if m.user_skill == m.required_skill {
                String::new()
            } else {
                format!(" (via {})", m.user_skill)
            };
            out.push_str(&format!(
                "  {} {}{} - required by {:.0}% of jobs\n",
                self.colorize("✓", Color::Green),
                m.required_skill,
                via,
                m.frequency * 100.0
            ));
        }

        out.push_str(&self.format_header("Skills To Learn", 2));
        if report.missing_skills.is_empty() {
            out.push_str("  (nothing missing, nice work)\n");
        }
        for m in &report.missing_skills {
            let trend = m
                .demand
                .as_ref()
                .map(|d| format!(", demand {}", d.predicted_trend))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {} {} - priority {:.2} ({:.0}% of jobs{})\n",
                self.colorize("✗", Color::Red),
                m.skill_name,
                m.priority_score,
                m.frequency * 100.0,
                trend
            ));
        }

        out.push_str(&self.format_header("Category Coverage", 2));
        for (name, score) in &report.category_breakdown {
            out.push_str(&format!(
                "  {}: {}/{} ({:.0}%)\n",
                name,
                score.user_has,
                score.total_required,
                score.coverage_pct * 100.0
            ));
        }

        out
    }

    pub fn format_roadmap(&self, report: &RoadmapReport) -> String {
        let mut out = String::new();
        out.push_str(&self.format_header("Learning Roadmap", 1));

        out.push_str(&format!(
            "Target role: {} - current readiness {:.1}%\n",
            self.colorize(&report.job_title_matched, Color::Cyan),
            report.overall_readiness_score * 100.0
        ));

        if report.roadmap.phases.is_empty() {
            out.push_str("\nNo skill gaps to plan for.\n");
            return out;
        }

        for phase in &report.roadmap.phases {
            out.push_str(&self.format_header(
                &format!("Phase {}: {} ({})", phase.phase, phase.name, phase.weeks),
                2,
            ));
            out.push_str(&format!("  {}\n", phase.description));

            for skill in &phase.skills {
                out.push_str(&format!(
                    "\n  {} (priority {:.2})\n",
                    self.colorize(&skill.skill_name, Color::Cyan),
                    skill.priority_score
                ));
                if skill.courses.is_empty() {
                    out.push_str("    no matching courses found\n");
                }
                for course in &skill.courses {
                    out.push_str(&format!(
                        "    • {} [{}] - match {:.3}\n",
                        course.title, course.platform, course.match_score
                    ));
                    if !course.url.is_empty() {
                        out.push_str(&format!("      {}\n", course.url));
                    }
                }
            }
        }

        out.push_str(&format!(
            "\n{} skills, {} courses across {} phases\n",
            report.roadmap.total_skills,
            report.roadmap.total_courses,
            report.roadmap.phases.len()
        ));
        out
    }

    pub fn format_titles(&self, titles: &[String]) -> String {
        let mut out = String::new();
        out.push_str(&self.format_header("Known Job Titles", 1));
        for title in titles {
            out.push_str(&format!("  • {}\n", title));
        }
        out.push_str(&format!("\n{} titles\n", titles.len()));
        out
    }
}

/// JSON formatter for scripting and API-style consumption.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Serialize any result wrapped with a generation timestamp.
    pub fn format<T: Serialize>(&self, payload: &T) -> Result<String> {
        let envelope = serde_json::json!({
            "generated_at": Utc::now().to_rfc3339(),
            "result": payload,
        });
        let out = if self.pretty {
            serde_json::to_string_pretty(&envelope)?
        } else {
            serde_json::to_string(&envelope)?
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::taxonomy::SkillCategory;

    fn sample_match() -> SkillMatch {
        SkillMatch {
            skill_name: "python".to_string(),
            skill_id: 1,
            category: SkillCategory::TechSkills,
            confidence: 1.0,
            matched_from: "Python".to_string(),
        }
    }

    #[test]
    fn test_console_matches_plain_text() {
        let formatter = ConsoleFormatter::new(false);
        let out = formatter.format_matches(&[sample_match()]);
        assert!(out.contains("python"));
        assert!(out.contains("tech_skills"));
        assert!(out.contains("1 skills found"));
    }

    #[test]
    fn test_console_empty_matches() {
        let formatter = ConsoleFormatter::new(false);
        let out = formatter.format_matches(&[]);
        assert!(out.contains("No skills recognized"));
    }

    #[test]
    fn test_json_envelope_has_timestamp_and_result() {
        let formatter = JsonFormatter::new(false);
        let out = formatter.format(&vec![sample_match()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("generated_at").is_some());
        assert_eq!(value["result"][0]["skill_name"], "python");
    }
}
