//! Skill demand trends and priority scoring

use crate::data::DemandRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Expected growth-rate range for normalization.
const GROWTH_MIN: f32 = -0.05;
const GROWTH_MAX: f32 = 0.10;

/// Demand trend signal for one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandTrend {
    pub predicted_trend: String,
    pub confidence: f32,
    pub growth_rate: f32,
    pub current_demand: u64,
}

/// Read-only store of demand predictions keyed by lowercased skill name.
pub struct DemandStore {
    predictions: HashMap<String, DemandTrend>,
}

impl DemandStore {
    pub fn from_records(records: &[DemandRecord]) -> Self {
        let mut predictions = HashMap::with_capacity(records.len());
        for r in records {
            predictions.insert(
                r.skill_name.trim().to_lowercase(),
                DemandTrend {
                    predicted_trend: r.predicted_trend.clone(),
                    confidence: r.confidence,
                    growth_rate: r.growth_rate,
                    current_demand: r.current_demand,
                },
            );
        }
        Self { predictions }
    }

    pub fn get_trend(&self, skill_name: &str) -> Option<&DemandTrend> {
        self.predictions.get(&skill_name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Priority score combining job frequency with a demand-growth signal.
///
/// The growth rate is linearly normalized from its expected range into
/// [0, 1] (clamped) before weighting.
pub fn priority_score(frequency: f32, growth_rate: f32, freq_weight: f32, growth_weight: f32) -> f32 {
    let growth_normalized = ((growth_rate - GROWTH_MIN) / (GROWTH_MAX - GROWTH_MIN)).clamp(0.0, 1.0);
    freq_weight * frequency + growth_weight * growth_normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_score_weights() {
        // growth 0.025 normalizes to exactly 0.5
        let score = priority_score(0.8, 0.025, 0.6, 0.4);
        assert!((score - (0.6 * 0.8 + 0.4 * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_growth_rate_is_clamped() {
        let low = priority_score(0.5, -1.0, 0.6, 0.4);
        let high = priority_score(0.5, 1.0, 0.6, 0.4);
        assert!((low - 0.3).abs() < 1e-6);
        assert!((high - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_trend_lookup_is_case_insensitive() {
        let records = vec![DemandRecord {
            skill_name: "Python ".to_string(),
            predicted_trend: "rising".to_string(),
            confidence: 0.9,
            growth_rate: 0.08,
            current_demand: 1200,
        }];
        let store = DemandStore::from_records(&records);
        assert!(store.get_trend("python").is_some());
        assert!(store.get_trend("  PYTHON ").is_some());
        assert!(store.get_trend("rust").is_none());
    }
}
