//! Speaking-rate policy: request validation and per-emotion rate adjustment.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Rate used when a request does not carry one (words per minute).
pub const DEFAULT_RATE: i64 = 150;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Text cannot be empty")]
    EmptyText,

    #[error("Rate must be a number")]
    NonNumericRate,

    #[error("Rate must be between {min} and {max} wpm")]
    RateOutOfRange { rate: i64, min: i64, max: i64 },
}

/// Rate bounds and emotion multipliers. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    pub min_rate: i64,
    pub max_rate: i64,
    pub default_rate: i64,
    pub multipliers: BTreeMap<String, f64>,
}

impl Default for RateConfig {
    fn default() -> Self {
        let multipliers = [
            ("dramatic", 1.2),
            ("cheerful", 1.13),
            ("playful", 1.07),
            ("professional", 1.0),
            ("calm", 0.87),
            ("friendly", 1.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            min_rate: 50,
            max_rate: 400,
            default_rate: DEFAULT_RATE,
            multipliers,
        }
    }
}

impl RateConfig {
    /// Apply `VOCALIZE_MIN_RATE`, `VOCALIZE_MAX_RATE` and `VOCALIZE_DEFAULT_RATE`.
    pub fn with_env_overrides(mut self) -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
        };
        if let Some(v) = read("VOCALIZE_MIN_RATE") {
            self.min_rate = v;
        }
        if let Some(v) = read("VOCALIZE_MAX_RATE") {
            self.max_rate = v;
        }
        if let Some(v) = read("VOCALIZE_DEFAULT_RATE") {
            self.default_rate = v;
        }
        self
    }

    /// Sanity-check a loaded configuration.
    pub fn check(&self) -> Result<(), String> {
        if self.min_rate <= 0 || self.min_rate > self.max_rate {
            return Err(format!(
                "invalid rate bounds: min {} max {}",
                self.min_rate, self.max_rate
            ));
        }
        if self.default_rate < self.min_rate || self.default_rate > self.max_rate {
            return Err(format!(
                "default rate {} outside [{}, {}]",
                self.default_rate, self.min_rate, self.max_rate
            ));
        }
        if let Some((name, m)) = self
            .multipliers
            .iter()
            .find(|(_, m)| !m.is_finite() || **m <= 0.0)
        {
            return Err(format!("multiplier for '{}' must be positive, got {}", name, m));
        }
        Ok(())
    }

    pub fn multiplier(&self, emotion: &str) -> Option<f64> {
        self.multipliers.get(&emotion.to_lowercase()).copied()
    }

    /// Scale `base_rate` by the emotion multiplier, truncate, then clamp.
    /// Unknown or absent emotions leave the rate untouched.
    pub fn compute_rate(&self, base_rate: i64, emotion: Option<&str>) -> i64 {
        let Some(multiplier) = emotion.and_then(|e| self.multiplier(e)) else {
            return base_rate;
        };
        let adjusted = (base_rate as f64 * multiplier).trunc() as i64;
        adjusted.clamp(self.min_rate, self.max_rate)
    }

    /// Validate text and an already-numeric rate. Bounds are inclusive.
    pub fn validate(&self, text: &str, rate: i64) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if rate < self.min_rate || rate > self.max_rate {
            return Err(ValidationError::RateOutOfRange {
                rate,
                min: self.min_rate,
                max: self.max_rate,
            });
        }
        Ok(())
    }

    /// Validate text and a rate taken straight from tool arguments.
    /// A missing or null rate means the configured default. Fractional
    /// rates are bounds-checked as given and truncated only once accepted.
    pub fn validate_request(
        &self,
        text: &str,
        rate: Option<&Value>,
    ) -> Result<i64, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let rate = match rate {
            None | Some(Value::Null) => self.default_rate,
            Some(value) => {
                let rate = parse_rate(value)?;
                if let Some(raw) = value.as_f64() {
                    if raw < self.min_rate as f64 || raw > self.max_rate as f64 {
                        return Err(ValidationError::RateOutOfRange {
                            rate,
                            min: self.min_rate,
                            max: self.max_rate,
                        });
                    }
                }
                rate
            }
        };
        self.validate(text, rate)?;
        Ok(rate)
    }
}

/// Interpret a JSON value as a words-per-minute rate. Fractions truncate.
pub fn parse_rate(value: &Value) -> Result<i64, ValidationError> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f.is_finite() => Ok(f.trunc() as i64),
        _ => Err(ValidationError::NonNumericRate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emotion_rates_match_multipliers() {
        let cfg = RateConfig::default();
        let expected = [
            ("dramatic", 180),
            ("cheerful", 169),
            ("playful", 160),
            ("professional", 150),
            ("calm", 130),
            ("friendly", 150),
        ];
        for (emotion, rate) in expected {
            assert_eq!(cfg.compute_rate(150, Some(emotion)), rate, "{}", emotion);
        }
    }

    #[test]
    fn unknown_or_missing_emotion_keeps_rate() {
        let cfg = RateConfig::default();
        assert_eq!(cfg.compute_rate(150, None), 150);
        assert_eq!(cfg.compute_rate(213, Some("nonexistent")), 213);
        assert_eq!(cfg.compute_rate(150, Some("CHEERFUL")), 169);
    }

    #[test]
    fn adjusted_rate_is_clamped() {
        let cfg = RateConfig::default();
        assert_eq!(cfg.compute_rate(400, Some("dramatic")), 400);
        assert_eq!(cfg.compute_rate(50, Some("calm")), 50);
        for rate in cfg.min_rate..=cfg.max_rate {
            for emotion in cfg.multipliers.keys() {
                let out = cfg.compute_rate(rate, Some(emotion));
                assert!(out >= cfg.min_rate && out <= cfg.max_rate);
            }
        }
    }

    #[test]
    fn validation_rejects_blank_text() {
        let cfg = RateConfig::default();
        assert_eq!(cfg.validate("", 150), Err(ValidationError::EmptyText));
        assert_eq!(cfg.validate("   ", 9999), Err(ValidationError::EmptyText));
    }

    #[test]
    fn validation_bounds_are_inclusive() {
        let cfg = RateConfig::default();
        assert!(cfg.validate("hi", 50).is_ok());
        assert!(cfg.validate("hi", 400).is_ok());
        assert!(matches!(
            cfg.validate("hi", 49),
            Err(ValidationError::RateOutOfRange { rate: 49, .. })
        ));
        let err = cfg.validate("hi", 401).unwrap_err();
        assert_eq!(err.to_string(), "Rate must be between 50 and 400 wpm");
    }

    #[test]
    fn raw_rates_are_parsed() {
        let cfg = RateConfig::default();
        assert_eq!(cfg.validate_request("hi", None), Ok(150));
        assert_eq!(cfg.validate_request("hi", Some(&json!(null))), Ok(150));
        assert_eq!(cfg.validate_request("hi", Some(&json!(200.7))), Ok(200));
        assert_eq!(
            cfg.validate_request("hi", Some(&json!("fast"))),
            Err(ValidationError::NonNumericRate)
        );
        assert_eq!(
            cfg.validate_request("", Some(&json!("fast"))),
            Err(ValidationError::EmptyText)
        );
    }

    #[test]
    fn fractional_rates_are_checked_before_truncation() {
        let cfg = RateConfig::default();
        assert!(matches!(
            cfg.validate_request("hi", Some(&json!(400.7))),
            Err(ValidationError::RateOutOfRange { rate: 400, .. })
        ));
        assert!(matches!(
            cfg.validate_request("hi", Some(&json!(49.9))),
            Err(ValidationError::RateOutOfRange { rate: 49, .. })
        ));
        assert_eq!(cfg.validate_request("hi", Some(&json!(399.9))), Ok(399));
        assert_eq!(cfg.validate_request("hi", Some(&json!(50.0))), Ok(50));
        assert_eq!(cfg.validate_request("hi", Some(&json!(400))), Ok(400));
    }

    #[test]
    fn config_check_catches_bad_values() {
        assert!(RateConfig::default().check().is_ok());

        let mut cfg = RateConfig::default();
        cfg.default_rate = 10;
        assert!(cfg.check().is_err());

        let mut cfg = RateConfig::default();
        cfg.multipliers.insert("sleepy".into(), 0.0);
        assert!(cfg.check().is_err());
    }

    #[test]
    fn deserializes_partial_overrides() {
        let cfg: RateConfig =
            serde_json::from_value(json!({"max_rate": 300, "multipliers": {"calm": 0.5}})).unwrap();
        assert_eq!(cfg.min_rate, 50);
        assert_eq!(cfg.max_rate, 300);
        assert_eq!(cfg.multiplier("calm"), Some(0.5));
        assert_eq!(cfg.multiplier("dramatic"), None);
    }
}
