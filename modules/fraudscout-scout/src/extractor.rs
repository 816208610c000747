// Case extraction: one prompt, one model call, one structured record.
//
// The extractor renders a fixed prompt instructing the engine to answer in
// strict JSON with the six baseline fields, cleans the response, and
// backfills anything missing with the explicit sentinel. Unparseable output
// is terminal for the URL; there is no retry.

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use fraudscout_common::{
    CaseRecord, FraudScoutError, INFORMATION_MISSING, PROCESS_SECTIONS, UNKNOWN,
};

use crate::gateway::TextAnalyst;
use crate::quality::RED_FLAG_KEYWORDS;

/// Input text beyond this is truncated before prompting.
const MAX_CONTENT_CHARS: usize = 50_000;

/// Which prompt rendering the extractor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFormat {
    /// Five-section SIU briefing.
    Siu,
    /// Free-form narrative covering method, evasion, and detection.
    Narrative,
}

impl PromptFormat {
    /// Minimum acceptable process-narrative length for this format.
    pub fn min_process_chars(self) -> usize {
        match self {
            PromptFormat::Siu => 600,
            PromptFormat::Narrative => 300,
        }
    }
}

/// What the engine returns. All keys optional; absences become sentinels.
#[derive(Debug, Deserialize)]
struct ExtractedCase {
    #[serde(rename = "Time")]
    time: Option<String>,
    #[serde(rename = "Region")]
    region: Option<String>,
    #[serde(rename = "Characters")]
    characters: Option<String>,
    #[serde(rename = "Event")]
    event: Option<String>,
    #[serde(rename = "Process")]
    process: Option<String>,
    #[serde(rename = "Result")]
    result: Option<String>,
}

pub struct CaseExtractor {
    analyst: Box<dyn TextAnalyst>,
    format: PromptFormat,
}

impl CaseExtractor {
    pub fn new(analyst: Box<dyn TextAnalyst>, format: PromptFormat) -> Self {
        Self { analyst, format }
    }

    /// Turn one page into a structured case record.
    pub async fn extract(&self, url: &str, title: &str, content: &str) -> Result<CaseRecord> {
        let content = truncate(content, MAX_CONTENT_CHARS);
        let prompt = render_prompt(self.format, url, title, content);

        let raw = self.analyst.analyze(&prompt).await?;
        let cleaned = clean_model_json(&raw);

        let fields: ExtractedCase = serde_json::from_str(&cleaned).map_err(|e| {
            warn!(url, error = %e, "Model output did not parse as JSON");
            FraudScoutError::MalformedOutput(format!("{e} (url: {url})"))
        })?;

        let record = self.assemble(url, fields);
        info!(url, event = record.event.as_str(), "Extracted case");
        Ok(record)
    }

    fn assemble(&self, url: &str, fields: ExtractedCase) -> CaseRecord {
        let mut process = filled_or_unknown(fields.process);

        if process.chars().count() < self.format.min_process_chars() {
            process.push_str("\n\n[Note: source coverage is limited; information missing]");
        }

        // SIU briefings carry all five sections; an absent one is marked,
        // never silently omitted.
        if self.format == PromptFormat::Siu {
            for section in PROCESS_SECTIONS {
                if !process.contains(section) {
                    process.push_str(&format!("\n\n{section}\n{INFORMATION_MISSING}"));
                }
            }
        }

        let lower = process.to_lowercase();
        if !RED_FLAG_KEYWORDS.iter().any(|k| lower.contains(k))
            && !lower.contains(INFORMATION_MISSING)
        {
            process.push_str(
                "\n\n[Note: the source does not describe the detection trigger or red flags; information missing]",
            );
        }

        CaseRecord {
            time: filled_or_unknown(fields.time),
            region: filled_or_unknown(fields.region),
            characters: filled_or_unknown(fields.characters),
            event: filled_or_unknown(fields.event),
            process,
            result: filled_or_unknown(fields.result),
            source_url: url.to_string(),
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
}

fn filled_or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}

fn truncate(content: &str, max: usize) -> &str {
    if content.len() <= max {
        return content;
    }
    let mut end = max;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

/// Strip code fences and control characters so the response parses as JSON.
pub(crate) fn clean_model_json(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }

    text.trim()
        .chars()
        .filter(|c| {
            let cp = *c as u32;
            !(cp <= 0x1F || (0x7F..=0x9F).contains(&cp))
        })
        .collect()
}

fn render_prompt(format: PromptFormat, url: &str, title: &str, content: &str) -> String {
    match format {
        PromptFormat::Siu => render_siu_prompt(url, title, content),
        PromptFormat::Narrative => render_narrative_prompt(url, title, content),
    }
}

fn render_siu_prompt(url: &str, title: &str, content: &str) -> String {
    format!(
        r#"You are a senior SIU investigator specializing in life and health insurance anti-fraud work. Analyze the insurance fraud case in the page below and produce a structured briefing.

Page title: {title}
Page URL: {url}
Page content:
{content}

Produce a briefing with these fields:

1. "Time": the date of the incident or verdict (YYYY-MM-DD where possible)
2. "Region": country and city
3. "Characters": the people, insurers, intermediaries, and medical institutions involved, comma-separated
4. "Event": a short fraud-type label (e.g. "health insurance fraud", "life insurance fraud")
5. "Process": the core of the briefing. Use exactly these five section headers, structured content only, no prose filler:

   [Risk Profile]
   Policy inception date, insured amount, time from inception to claim, waiting-period status. Write "information missing" for anything the source does not state.

   [Modus Operandi (MO)]
   The concrete method: staged hospitalization, forged overseas receipts, fabricated medical records, inflated diagnoses, duplicate claims, and so on. Write "information missing" if not stated.

   [Red Flags]
   The anomalies that triggered alarms: contradictory medical records, timeline inconsistencies, diagnosis/symptom mismatch, suspicious provider credentials. This section matters most; write "information missing" explicitly if the source has none.

   [Verification Recommendations]
   How the facts were or could be verified: claims-database cross-checks, field visits, financial audits, record verification, background checks.

   [Underwriting Implications]
   Front-end controls this case argues for: early-claim alerts, provider blacklists, second review of large claims. Professional judgment is acceptable here.

6. "Result": the verdict, fines, or other sanctions

Output requirements:
- Respond with pure JSON only. No markdown fences, no commentary.
- Every field must be present; write "unknown" for anything the source does not state.
- "Process" must use the five headers above and run at least 600 characters.
- Use exactly these keys: Time, Region, Characters, Event, Process, Result.
"#
    )
}

fn render_narrative_prompt(url: &str, title: &str, content: &str) -> String {
    format!(
        r#"You are a senior insurance anti-fraud analyst. Analyze the insurance fraud case in the page below and produce a structured summary.

Page title: {title}
Page URL: {url}
Page content:
{content}

Produce a summary with these fields:

1. "Time": the date of the incident or verdict (YYYY-MM-DD where possible)
2. "Region": country and city
3. "Characters": the people, insurers, intermediaries, and medical institutions involved, comma-separated
4. "Event": a short fraud-type label
5. "Process": a detailed narrative covering all three of:
   a) the method — how the fraud was carried out, step by step;
   b) the evasion — how it slipped past the insurer's initial review;
   c) the detection — what investigators detected and which red flag exposed it.
   If the source never describes the detection, state explicitly: "the source does not describe the detection; information missing". At least 300 characters.
6. "Result": the verdict, fines, or other sanctions; "pending" for open cases

Output requirements:
- Respond with pure JSON only. No markdown fences, no commentary.
- Every field must be present; write "unknown" for anything the source does not state.
- Use exactly these keys: Time, Region, Characters, Event, Process, Result.
"#
    )
}
