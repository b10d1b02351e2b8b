use std::sync::Arc;

use replygate_core::model::ClassifierClient;
use replygate_core::types::GuardResult;

use super::judge::{clamp_block, reply_content, run_judge, GuardCheck};
use super::prompts::FORMAT_SYSTEM;

pub const FORMAT_GUARD: &str = "format";

/// Structure / length judge over the reply only. Never blocks: a `block`
/// verdict from the judge is clamped to `flag` at this boundary.
pub struct FormatGuard {
    pub classifier: Arc<dyn ClassifierClient>,
}

#[async_trait::async_trait]
impl GuardCheck for FormatGuard {
    async fn check(&self, _user_message: &str, reply: &str, model_id: &str) -> GuardResult {
        let content = reply_content(reply);
        let result = run_judge(
            FORMAT_GUARD,
            &FORMAT_SYSTEM,
            &content,
            model_id,
            self.classifier.as_ref(),
        )
        .await;
        clamp_block(result, "Format guard does not block")
    }
}
