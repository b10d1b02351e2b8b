use std::sync::Arc;

use replygate_core::model::ClassifierClient;
use replygate_core::types::GuardResult;

use super::judge::{exchange_content, run_judge, GuardCheck};
use super::prompts::TOPIC_SYSTEM;

pub const TOPIC_GUARD: &str = "topic";

/// Relevance judge over the full exchange. Allowed to block.
pub struct TopicGuard {
    pub classifier: Arc<dyn ClassifierClient>,
}

#[async_trait::async_trait]
impl GuardCheck for TopicGuard {
    async fn check(&self, user_message: &str, reply: &str, model_id: &str) -> GuardResult {
        let content = exchange_content(user_message, reply);
        run_judge(
            TOPIC_GUARD,
            &TOPIC_SYSTEM,
            &content,
            model_id,
            self.classifier.as_ref(),
        )
        .await
    }
}
