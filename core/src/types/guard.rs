use serde::{Deserialize, Serialize};

use super::truncate_chars;

/// Reasons are bounded at creation; presentation layers may trim further.
pub const MAX_REASON_LEN: usize = 200;

/// The canonical outcome domain of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No issue, the reply may be shown as-is.
    Pass,
    /// Non-fatal concern, the reply is shown but marked unverified.
    Flag,
    /// The reply is withheld.
    Block,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Flag => "flag",
            Verdict::Block => "block",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one guard check. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardResult {
    pub name: String,
    pub verdict: Verdict,
    pub reason: String,
    /// Identifier of the judge model that produced this result; empty when unknown.
    #[serde(default)]
    pub model_id: String,
}

impl GuardResult {
    pub fn new(
        name: impl Into<String>,
        verdict: Verdict,
        reason: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            verdict,
            reason: truncate_chars(reason.into().trim(), MAX_REASON_LEN),
            model_id: model_id.into(),
        }
    }
}

/// The final decision for one request, derived from all guard results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disposition {
    pub blocked: bool,
    /// The first block-verdict result in task order, if any.
    pub blocking_result: Option<GuardResult>,
    /// One result per dispatched task, in configured task order.
    pub results: Vec<GuardResult>,
}
