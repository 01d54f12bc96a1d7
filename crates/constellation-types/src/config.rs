// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, ClusterResult};
use crate::particle::Category;

/// One entry of the closed pair table used to name the dominant
/// category of a cluster whose two highest counts are tied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRule {
    pub first: Category,
    pub second: Category,
    pub resolved: Category,
}

impl PairRule {
    pub fn new(first: &str, second: &str, resolved: &str) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
            resolved: resolved.to_string(),
        }
    }

    /// Unordered match against `(a, b)`.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// The sentiment vocabulary the default pair table is written for.
pub const DEFAULT_LABELS: [&str; 3] = ["Positive", "Neutral", "Negative"];

/// Default pair table over [`DEFAULT_LABELS`].
pub fn default_pair_rules() -> Vec<PairRule> {
    vec![
        PairRule::new("Positive", "Neutral", "Positive"),
        PairRule::new("Neutral", "Negative", "Negative"),
        PairRule::new("Positive", "Negative", "Neutral"),
    ]
}

/// Runtime configuration for the clustering kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Neighbour radius and centroid tolerance, in ground-plane units.
    /// Default: 150.0.
    pub cluster_radius: f64,

    /// Smallest cluster that survives a pass.
    /// Default: 3.
    pub min_cluster_size: usize,

    /// Centroid distance under which a new cluster inherits the identity
    /// of a known one. `None` uses `cluster_radius`.
    pub identity_threshold: Option<f64>,

    /// Pair table for tied-max dominant categories.
    pub pair_rules: Vec<PairRule>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            cluster_radius: 150.0,
            min_cluster_size: 3,
            identity_threshold: None,
            pair_rules: default_pair_rules(),
        }
    }
}

impl KernelConfig {
    /// Effective identity matching threshold.
    pub fn identity_threshold(&self) -> f64 {
        self.identity_threshold.unwrap_or(self.cluster_radius)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> ClusterResult<()> {
        if !self.cluster_radius.is_finite() || self.cluster_radius <= 0.0 {
            return Err(ClusterError::Config(format!(
                "cluster_radius must be finite and > 0, got {}",
                self.cluster_radius
            )));
        }
        if self.min_cluster_size < 1 {
            return Err(ClusterError::Config(format!(
                "min_cluster_size must be >= 1, got {}",
                self.min_cluster_size
            )));
        }
        if let Some(t) = self.identity_threshold {
            if !t.is_finite() || t <= 0.0 {
                return Err(ClusterError::Config(format!(
                    "identity_threshold must be finite and > 0, got {t}"
                )));
            }
        }
        for (i, rule) in self.pair_rules.iter().enumerate() {
            if rule.first == rule.second {
                return Err(ClusterError::Config(format!(
                    "pair rule {i} pairs '{}' with itself",
                    rule.first
                )));
            }
            if rule.resolved.is_empty() {
                return Err(ClusterError::Config(format!(
                    "pair rule {i} resolves to an empty category"
                )));
            }
            let duplicate = self.pair_rules[..i]
                .iter()
                .any(|earlier| earlier.matches(&rule.first, &rule.second));
            if duplicate {
                return Err(ClusterError::Config(format!(
                    "pair ({}, {}) is listed more than once",
                    rule.first, rule.second
                )));
            }
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ClusterResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ClusterError::Config(format!("JSON parse error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = KernelConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.min_cluster_size, 3);
        assert!((cfg.identity_threshold() - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_zero_radius() {
        let cfg = KernelConfig {
            cluster_radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ClusterError::Config(_))));
    }

    #[test]
    fn test_rejects_nan_radius() {
        let cfg = KernelConfig {
            cluster_radius: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_min_size() {
        let cfg = KernelConfig {
            min_cluster_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_identity_threshold() {
        let cfg = KernelConfig {
            identity_threshold: Some(-1.0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_pair_either_order() {
        let mut cfg = KernelConfig::default();
        cfg.pair_rules
            .push(PairRule::new("Neutral", "Positive", "Neutral"));
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_self_pair() {
        let cfg = KernelConfig {
            pair_rules: vec![PairRule::new("Calm", "Calm", "Calm")],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = KernelConfig::from_json(r#"{"cluster_radius": 40.0}"#).unwrap();
        assert!((cfg.cluster_radius - 40.0).abs() < 1e-12);
        assert_eq!(cfg.min_cluster_size, 3);
        assert_eq!(cfg.pair_rules.len(), 3);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = KernelConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_pair_rule_unordered() {
        let rule = PairRule::new("Positive", "Negative", "Neutral");
        assert!(rule.matches("Negative", "Positive"));
        assert!(rule.matches("Positive", "Negative"));
        assert!(!rule.matches("Positive", "Neutral"));
    }
}
