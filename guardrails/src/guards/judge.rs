use std::time::Instant;

use replygate_core::model::ClassifierClient;
use replygate_core::types::{GuardResult, Verdict};

use super::normalize::normalize;

/// One independent check of a generated reply.
#[async_trait::async_trait]
pub trait GuardCheck: Send + Sync {
    /// Judge the reply. Must not fail: classifier and parsing problems are
    /// absorbed into the returned result.
    async fn check(&self, user_message: &str, reply: &str, model_id: &str) -> GuardResult;
}

/// Call the classification capability and normalize its output into a
/// result. Classifier failures never escape this boundary: they become a
/// `flag` result carrying the error text.
pub(crate) async fn run_judge(
    name: &str,
    system_prompt: &str,
    user_content: &str,
    model_id: &str,
    classifier: &dyn ClassifierClient,
) -> GuardResult {
    let started = Instant::now();
    tracing::info!(guard = name, model = model_id, "guard starting");

    let raw = match classifier
        .classify(system_prompt, user_content, model_id)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(guard = name, elapsed = ?started.elapsed(), error = %e, "guard classifier call failed");
            return GuardResult::new(
                name,
                Verdict::Flag,
                format!("Classifier error: {e}"),
                model_id,
            );
        }
    };

    let (verdict, reason) = normalize(&raw);
    tracing::info!(guard = name, elapsed = ?started.elapsed(), verdict = %verdict, "guard done");
    GuardResult::new(name, verdict, reason, model_id)
}

/// Hard ceiling for guards that are never allowed to block, applied at the
/// guard boundary regardless of what the judge or the normalizer produced.
pub(crate) fn clamp_block(result: GuardResult, fallback_reason: &str) -> GuardResult {
    if result.verdict != Verdict::Block {
        return result;
    }
    let reason = if result.reason.is_empty() {
        fallback_reason.to_string()
    } else {
        result.reason
    };
    GuardResult::new(result.name, Verdict::Flag, reason, result.model_id)
}

/// Render the (message, reply) pair for judges that see both sides.
pub(crate) fn exchange_content(user_message: &str, reply: &str) -> String {
    format!(
        "User message:\n{}\n\nModel response:\n{}",
        or_empty_marker(user_message),
        or_empty_marker(reply)
    )
}

/// Render the reply alone for judges that only inspect the output.
pub(crate) fn reply_content(reply: &str) -> String {
    format!("Model response to check:\n{}", or_empty_marker(reply))
}

fn or_empty_marker(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        "(empty)"
    } else {
        trimmed
    }
}
