use std::sync::Arc;

use replygate_core::model::ClassifierClient;
use replygate_core::types::GuardResult;

use super::judge::{exchange_content, run_judge, GuardCheck};
use super::prompts::SAFETY_SYSTEM;

/// Distinguished task name: the only guard whose timeout behavior is
/// policy-controlled.
pub const SAFETY_GUARD: &str = "safety";

/// Toxicity / harm judge over the full exchange. Allowed to block.
pub struct SafetyGuard {
    pub classifier: Arc<dyn ClassifierClient>,
}

#[async_trait::async_trait]
impl GuardCheck for SafetyGuard {
    async fn check(&self, user_message: &str, reply: &str, model_id: &str) -> GuardResult {
        let content = exchange_content(user_message, reply);
        run_judge(
            SAFETY_GUARD,
            &SAFETY_SYSTEM,
            &content,
            model_id,
            self.classifier.as_ref(),
        )
        .await
    }
}
