use lazy_static::lazy_static;
use regex::Regex;

use replygate_core::types::{truncate_chars, Verdict, MAX_REASON_LEN};

lazy_static! {
    /// A line that is only a bare verdict word, optionally with a trailing colon.
    static ref BARE_VERDICT_LINE: Regex = Regex::new(r"(?i)^(pass|flag|block)\s*:?\s*$").unwrap();
}

fn verdict_from_word(word: &str) -> Option<Verdict> {
    match word {
        "pass" => Some(Verdict::Pass),
        "flag" => Some(Verdict::Flag),
        "block" => Some(Verdict::Block),
        _ => None,
    }
}

/// Normalize free-text judge output into a verdict and a bounded reason.
///
/// Total over arbitrary input. Parsing precedence, first match wins:
/// an exact verdict word on the first line, then a JSON-object-like
/// substring carrying a `verdict`/`result` field, then a case-insensitive
/// keyword search preferring `block` over `flag` over `pass`. The keyword
/// fallback never invents `block`: it only picks what the text contains,
/// and defaults to `pass` when neither word appears.
pub fn normalize(raw: &str) -> (Verdict, String) {
    let raw = raw.trim();
    let lines: Vec<&str> = raw.split('\n').collect();

    // First line is exactly one verdict word.
    let first_line = lines
        .first()
        .map(|l| l.trim().to_lowercase())
        .unwrap_or_default();
    if let Some(verdict) = verdict_from_word(&first_line) {
        let rest = lines[1..].join("\n");
        return (verdict, truncate_chars(rest.trim(), MAX_REASON_LEN));
    }

    // A JSON object embedded anywhere in the text.
    if let Some(found) = parse_json_verdict(raw) {
        return found;
    }

    // Keyword search, biased toward the safer reading.
    let lowered = raw.to_lowercase();
    let verdict = if lowered.contains("block") {
        Verdict::Block
    } else if lowered.contains("flag") {
        Verdict::Flag
    } else {
        Verdict::Pass
    };

    let mut reason = String::new();
    for line in &lines {
        let line = line.trim();
        if !line.is_empty() && !BARE_VERDICT_LINE.is_match(line) {
            reason = truncate_chars(line, MAX_REASON_LEN);
            break;
        }
    }
    if reason.is_empty() && !raw.is_empty() {
        reason = truncate_chars(raw, MAX_REASON_LEN);
    }
    (verdict, reason)
}

/// Salvage a verdict from JSON-ish output such as `{"verdict": "pass", ...}`.
/// Malformed or non-matching JSON is not an error, just a miss.
fn parse_json_verdict(raw: &str) -> Option<(Verdict, String)> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    let obj: serde_json::Value = serde_json::from_str(&raw[start..=end]).ok()?;
    let word = obj
        .get("verdict")
        .or_else(|| obj.get("result"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_lowercase())?;
    let verdict = verdict_from_word(&word)?;

    let reason = obj
        .get("reason")
        .or_else(|| obj.get("explanation"))
        .map(|v| match v.as_str() {
            Some(s) => s.trim().to_string(),
            None => v.to_string(),
        })
        .unwrap_or_default();
    Some((verdict, truncate_chars(&reason, MAX_REASON_LEN)))
}
