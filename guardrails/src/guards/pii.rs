use std::sync::Arc;

use replygate_core::model::ClassifierClient;
use replygate_core::types::GuardResult;

use super::judge::{clamp_block, reply_content, run_judge, GuardCheck};
use super::prompts::PII_SYSTEM;

pub const PII_GUARD: &str = "pii";

/// PII / sensitive-data judge over the reply only. Never blocks.
pub struct PiiGuard {
    pub classifier: Arc<dyn ClassifierClient>,
}

#[async_trait::async_trait]
impl GuardCheck for PiiGuard {
    async fn check(&self, _user_message: &str, reply: &str, model_id: &str) -> GuardResult {
        let content = reply_content(reply);
        let result = run_judge(
            PII_GUARD,
            &PII_SYSTEM,
            &content,
            model_id,
            self.classifier.as_ref(),
        )
        .await;
        clamp_block(result, "PII guard does not block")
    }
}
