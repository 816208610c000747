use std::collections::BTreeMap;

use fraudscout_common::{
    CaseRecord, ValidationResult, INFORMATION_MISSING, TO_BE_SUPPLEMENTED, UNKNOWN,
};

/// Keywords whose presence shows the narrative covers the anomaly that
/// exposed the fraud.
pub(crate) const RED_FLAG_KEYWORDS: &[&str] =
    &["red flag", "detected", "investigat", "evidence", "anomal"];

/// Narrative components every process narrative should cover, as
/// (literal substring, human-readable description).
const NARRATIVE_COMPONENTS: [(&str, &str); 3] = [
    ("method", "how the fraud was carried out"),
    ("evasion", "how it evaded initial review"),
    ("detect", "what triggered detection"),
];

const ACCEPT_OVERALL: f64 = 0.7;
const ACCEPT_PROCESS: f64 = 0.6;

/// Score one extracted record. Pure function; the caller decides what a
/// rejection means (discard vs store-flagged).
pub fn validate(record: &CaseRecord) -> ValidationResult {
    let mut per_field_scores = BTreeMap::new();
    let mut issues = Vec::new();

    for (name, value) in record.baseline_fields() {
        let score = presence_score(value);
        if score == 0.0 {
            issues.push(format!("field {name} is missing or a placeholder"));
        }
        per_field_scores.insert(name, score);
    }
    let baseline_sum: f64 = per_field_scores.values().sum();

    let (process_score, process_issues) = score_process(&record.process);
    issues.extend(process_issues);
    // Report the graduated score for process, not the presence bit.
    per_field_scores.insert("process", process_score);

    // Six presence scores plus the graduated process score.
    let overall_score = (baseline_sum + process_score) / 7.0;
    let is_valid = overall_score >= ACCEPT_OVERALL && process_score >= ACCEPT_PROCESS;

    let mut suggestions = Vec::new();
    if !is_valid {
        if process_score < ACCEPT_PROCESS {
            suggestions
                .push("process narrative below threshold; retry with the next candidate link".to_string());
        }
        if overall_score < ACCEPT_OVERALL {
            suggestions.push("overall quality below threshold; re-extract from fuller source text".to_string());
        }
    }

    ValidationResult {
        is_valid,
        overall_score,
        process_score,
        per_field_scores,
        issues,
        suggestions,
    }
}

/// 1.0 for a filled field, 0.0 for empty or a known placeholder.
fn presence_score(value: &str) -> f64 {
    let v = value.trim().to_lowercase();
    if v.is_empty() || v == UNKNOWN || v == TO_BE_SUPPLEMENTED {
        0.0
    } else {
        1.0
    }
}

/// Graduated score for the process narrative:
/// length band (600+ → 1.0, 400+ → 0.6, else 0.3), minus 0.2 per missing
/// narrative component, minus 0.3 when no red flag is cited and the gap is
/// not marked. Floored at 0.
fn score_process(process: &str) -> (f64, Vec<String>) {
    let mut issues = Vec::new();
    let len = process.chars().count();

    let mut score: f64 = if len >= 600 {
        1.0
    } else if len >= 400 {
        issues.push(format!("process narrative thin ({len} chars, want 600+)"));
        0.6
    } else {
        issues.push(format!("process narrative too short ({len} chars, want 600+)"));
        0.3
    };

    let lower = process.to_lowercase();
    for (needle, description) in NARRATIVE_COMPONENTS {
        if !lower.contains(needle) {
            issues.push(format!("process narrative does not cover {description}"));
            score = (score - 0.2).max(0.0);
        }
    }

    let cites_red_flag = RED_FLAG_KEYWORDS.iter().any(|k| lower.contains(k));
    let marks_gap = lower.contains(INFORMATION_MISSING);
    if !cites_red_flag && !marks_gap {
        issues.push("process narrative cites no red flag and does not mark the gap".to_string());
        score = (score - 0.3).max(0.0);
    }

    (score, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record_with_process(process: &str) -> CaseRecord {
        CaseRecord {
            time: "2026-01-15".to_string(),
            region: "New York, USA".to_string(),
            characters: "John Smith, ABC Insurance".to_string(),
            event: "health insurance fraud".to_string(),
            process: process.to_string(),
            result: "convicted, 5 years".to_string(),
            source_url: "https://example.gov/case1".to_string(),
            created_at: Utc::now(),
            line_of_business: None,
            fraud_type: None,
            modus_operandi: None,
            red_flags: None,
            investigative_tips: None,
            underwriting_advice: None,
            is_seed_case: false,
            last_shown_at: None,
        }
    }

    /// A narrative that covers all three components, cites a red flag, and
    /// pads out to the requested length.
    fn full_narrative(len: usize) -> String {
        let mut s = String::from(
            "The method was staged hospital stays with forged receipts. \
             The scheme relied on evasion of the insurer's first review by splitting claims. \
             Investigators detected the fraud when billing anomalies surfaced as a red flag. ",
        );
        while s.chars().count() < len {
            s.push_str("Further verification confirmed the falsified records. ");
        }
        truncate_chars(&mut s, len);
        s
    }

    fn truncate_chars(s: &mut String, len: usize) {
        if let Some((idx, _)) = s.char_indices().nth(len) {
            s.truncate(idx);
        }
    }

    #[test]
    fn complete_long_record_passes() {
        let record = record_with_process(&full_narrative(700));
        let result = validate(&record);

        assert!(result.is_valid);
        assert_eq!(result.process_score, 1.0);
        assert!(result.overall_score >= 0.99);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn short_process_missing_detection_scores_at_most_0_3_and_fails() {
        // 350 chars covering method and evasion but not the detection trigger.
        let mut process = String::from(
            "The method was simple: fake invoices from an overseas clinic. \
             Claim splitting allowed evasion of the first manual review. ",
        );
        while process.chars().count() < 350 {
            process.push_str("More padding about the scheme itself. ");
        }
        truncate_chars(&mut process, 350);
        assert!(!process.to_lowercase().contains("detect"));

        let result = validate(&record_with_process(&process));

        assert!(result.process_score <= 0.3);
        assert!(!result.is_valid);
        assert!(result
            .issues
            .iter()
            .any(|i| i.contains("triggered detection")));
    }

    #[test]
    fn placeholder_fields_score_zero() {
        let mut record = record_with_process(&full_narrative(700));
        record.time = "unknown".to_string();
        record.region = "To be supplemented".to_string();

        let result = validate(&record);

        assert_eq!(result.per_field_scores["time"], 0.0);
        assert_eq!(result.per_field_scores["region"], 0.0);
        // 4 of 6 presence scores + 1.0 process = 5/7.
        assert!(result.overall_score < ACCEPT_OVERALL);
        assert!(!result.is_valid);
    }

    #[test]
    fn missing_red_flag_penalized_unless_gap_is_marked() {
        // Long narrative covering method and evasion, with no detection
        // wording and no red-flag keyword anywhere.
        let mut bare = String::from(
            "The method involved forged paperwork. Review evasion worked for months. ",
        );
        while bare.chars().count() < 650 {
            bare.push_str("The claims were paid without question for a long while. ");
        }
        let penalized = validate(&record_with_process(&bare));
        // -0.2 for missing "detect", -0.3 for no red flag and no marker.
        assert!((penalized.process_score - 0.5).abs() < 1e-9);

        let marked = format!("{bare} [information missing]");
        let excused = validate(&record_with_process(&marked));
        assert!((excused.process_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn mid_length_narrative_gets_the_middle_band() {
        let record = record_with_process(&full_narrative(450));
        let result = validate(&record);

        assert!((result.process_score - 0.6).abs() < 1e-9);
        assert!(result.is_valid, "0.6 process and full fields should pass overall");
    }

    #[test]
    fn rejection_carries_issues_and_suggestions() {
        let result = validate(&record_with_process("too short"));

        assert!(!result.is_valid);
        assert!(!result.issues.is_empty());
        assert!(result
            .suggestions
            .iter()
            .any(|s| s.contains("next candidate link")));
    }
}
