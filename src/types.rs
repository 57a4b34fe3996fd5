use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::merge_codes::MergeCodeStrategy;

/// Display name used when a stripe carries neither a label nor an activity.
pub const UNKNOWN_ACTIVITY: &str = "Unknown";

// =============================================================================
// Schedule Types
// =============================================================================

/// One labelled activity block on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stripe {
    pub activity: String,
    /// Override name. Preferred over `activity` for display and merge keying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Continues an identically-keyed block from the immediately preceding day.
    #[serde(default)]
    pub merge_with_previous: bool,
}

impl Stripe {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            label: None,
            merge_with_previous: false,
        }
    }

    pub fn continued(activity: impl Into<String>) -> Self {
        Self {
            merge_with_previous: true,
            ..Self::new(activity)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// `label ?? activity ?? "Unknown"`, treating blank strings as absent.
    pub fn display_key(&self) -> &str {
        if let Some(label) = self.label.as_deref() {
            if !label.trim().is_empty() {
                return label;
            }
        }
        if !self.activity.trim().is_empty() {
            return &self.activity;
        }
        UNKNOWN_ACTIVITY
    }
}

/// A calendar day and its stripes, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub stripes: Vec<Stripe>,
}

impl ScheduleDay {
    pub fn new(date: NaiveDate, stripes: Vec<Stripe>) -> Self {
        Self { date, stripes }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            stripes: Vec::new(),
        }
    }
}

// =============================================================================
// JSON Interchange (service boundary)
// =============================================================================

/// Interchange form of a stripe. Every field is optional because the payload
/// usually comes from a text-generation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStripe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        default,
        alias = "merge_with_previous",
        skip_serializing_if = "Option::is_none"
    )]
    pub merge_with_previous: Option<bool>,
}

/// Interchange form of a day: `{ "date": "YYYY-MM-DD", "stripes": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScheduleDay {
    pub date: String,
    #[serde(default)]
    pub stripes: Vec<RawStripe>,
}

impl From<RawStripe> for Stripe {
    fn from(raw: RawStripe) -> Self {
        Stripe {
            activity: raw.activity.unwrap_or_default(),
            label: raw.label,
            merge_with_previous: raw.merge_with_previous.unwrap_or(false),
        }
    }
}

impl From<&Stripe> for RawStripe {
    fn from(stripe: &Stripe) -> Self {
        RawStripe {
            activity: Some(stripe.activity.clone()),
            label: stripe.label.clone(),
            merge_with_previous: Some(stripe.merge_with_previous),
        }
    }
}

impl From<&ScheduleDay> for RawScheduleDay {
    fn from(day: &ScheduleDay) -> Self {
        RawScheduleDay {
            date: day.date.format("%Y-%m-%d").to_string(),
            stripes: day.stripes.iter().map(RawStripe::from).collect(),
        }
    }
}

/// Convert an in-memory schedule to its interchange form.
pub fn schedule_to_raw(days: &[ScheduleDay]) -> Vec<RawScheduleDay> {
    days.iter().map(RawScheduleDay::from).collect()
}

// =============================================================================
// Configuration
// =============================================================================

/// Transcoder configuration (`~/.prodsched/config.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscoderConfig {
    #[serde(default)]
    pub merge_codes: MergeCodeStrategy,
    /// Refuse to render a month with missing days.
    #[serde(default)]
    pub require_full_month: bool,
    /// Try the deterministic decoder before asking the model.
    #[serde(default = "default_local_decode_first")]
    pub local_decode_first: bool,
    #[serde(default)]
    pub model: ModelConfig,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            merge_codes: MergeCodeStrategy::default(),
            require_full_month: false,
            local_decode_first: default_local_decode_first(),
            model: ModelConfig::default(),
        }
    }
}

fn default_local_decode_first() -> bool {
    true
}

/// External text-generation command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default = "default_model_command")]
    pub command: String,
    #[serde(default = "default_model_args")]
    pub args: Vec<String>,
    #[serde(default = "default_model_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            command: default_model_command(),
            args: default_model_args(),
            timeout_secs: default_model_timeout_secs(),
        }
    }
}

fn default_model_command() -> String {
    "claude".to_string()
}

fn default_model_args() -> Vec<String> {
    vec!["--print".to_string()]
}

fn default_model_timeout_secs() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_key_prefers_label() {
        let stripe = Stripe::new("DESIGN").with_label("Design Review");
        assert_eq!(stripe.display_key(), "Design Review");
    }

    #[test]
    fn test_display_key_blank_fallbacks() {
        let blank_label = Stripe::new("AWARD").with_label("  ");
        assert_eq!(blank_label.display_key(), "AWARD");

        let nothing = Stripe::new("");
        assert_eq!(nothing.display_key(), UNKNOWN_ACTIVITY);
    }

    #[test]
    fn test_raw_stripe_accepts_snake_case_flag() {
        let raw: RawStripe =
            serde_json::from_str(r#"{"activity": "PREP", "merge_with_previous": true}"#).unwrap();
        assert_eq!(raw.merge_with_previous, Some(true));

        let stripe = Stripe::from(raw);
        assert!(stripe.merge_with_previous);
    }

    #[test]
    fn test_raw_stripe_tolerates_nulls() {
        let raw: RawStripe =
            serde_json::from_str(r#"{"activity": null, "label": "SHOOT"}"#).unwrap();
        let stripe = Stripe::from(raw);
        assert_eq!(stripe.activity, "");
        assert_eq!(stripe.display_key(), "SHOOT");
        assert!(!stripe.merge_with_previous);
    }

    #[test]
    fn test_schedule_to_raw_formats_dates() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let raw = schedule_to_raw(&[ScheduleDay::new(date, vec![Stripe::continued("EDIT")])]);
        let json = serde_json::to_value(&raw).unwrap();
        assert_eq!(json[0]["date"], "2026-02-02");
        assert_eq!(json[0]["stripes"][0]["activity"], "EDIT");
        assert_eq!(json[0]["stripes"][0]["mergeWithPrevious"], true);
        assert!(json[0]["stripes"][0].get("label").is_none());
    }

    #[test]
    fn test_config_defaults_from_empty_object() {
        let config: TranscoderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TranscoderConfig::default());
        assert!(config.local_decode_first);
        assert_eq!(config.model.command, "claude");
        assert_eq!(config.model.timeout_secs, 300);
    }
}
