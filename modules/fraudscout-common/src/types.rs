use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for a baseline field the model could not fill. Stored records
/// never carry an empty baseline field; they carry this instead.
pub const UNKNOWN: &str = "unknown";

/// Alternate placeholder the model sometimes emits; treated as unfilled by
/// the quality gate.
pub const TO_BE_SUPPLEMENTED: &str = "to be supplemented";

/// Marker for a narrative section with no source material. Sections are
/// marked, never silently omitted.
pub const INFORMATION_MISSING: &str = "information missing";

/// The five labeled sections an SIU-format `process` narrative must carry.
pub const PROCESS_SECTIONS: [&str; 5] = [
    "[Risk Profile]",
    "[Modus Operandi (MO)]",
    "[Red Flags]",
    "[Verification Recommendations]",
    "[Underwriting Implications]",
];

/// One persisted fraud case. `source_url` is the natural key; uniqueness is
/// enforced by the pre-insert dedup check, not by this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub time: String,
    pub region: String,
    pub characters: String,
    pub event: String,
    pub process: String,
    pub result: String,
    pub source_url: String,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_of_business: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modus_operandi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_flags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigative_tips: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underwriting_advice: Option<String>,

    /// Manually curated records marked for priority display.
    #[serde(default)]
    pub is_seed_case: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shown_at: Option<DateTime<Utc>>,
}

impl CaseRecord {
    /// The six baseline fields in scoring order.
    pub fn baseline_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("time", self.time.as_str()),
            ("region", self.region.as_str()),
            ("characters", self.characters.as_str()),
            ("event", self.event.as_str()),
            ("process", self.process.as_str()),
            ("result", self.result.as_str()),
        ]
    }
}

/// One ranked search hit. Ephemeral; consumed by the fetch/extract stages.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    /// Snippet from the search index. Fallback extraction input when the
    /// full-page fetch chain fails.
    pub content: String,
    pub score: f64,
    pub is_hotspot: bool,
}

/// Quality-gate outcome for one extracted record.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub overall_score: f64,
    pub process_score: f64,
    pub per_field_scores: BTreeMap<&'static str, f64>,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}
