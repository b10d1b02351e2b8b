use std::sync::Arc;
use std::time::Instant;

use actix_web::web::{Data, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use replygate_core::error::GatewayError;
use replygate_core::model::ClassifierClient;
use replygate_core::types::{truncate_chars, ChatMessage, GuardResult, Verdict};
use replygate_core::GatewayResult;
use replygate_guardrails::guards::{
    decide, run_guards, FormatGuard, GuardCheck, GuardTask, PiiGuard, SafetyGuard, TopicGuard,
    FORMAT_GUARD, SAFETY_GUARD, TOPIC_GUARD,
};

use crate::config::GuardsConfig;
use crate::http::AppState;

pub const BLOCKED_MESSAGE: &str = "This response was blocked by a safety check.";
pub const MAX_MESSAGE_LENGTH: usize = 32_000;
pub const DEFAULT_SYSTEM: &str =
    "You are a helpful assistant. Answer the user's question clearly and concisely.";

/// Reasons are capped harder at presentation than at creation.
const MAX_PRESENTED_REASON_LEN: usize = 120;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
    /// If true, return the generated reply without running guards.
    #[serde(default)]
    pub skip_guards: bool,
}

#[derive(Debug, Serialize)]
pub struct GuardResultOut {
    pub name: String,
    pub verdict: Verdict,
    pub reason: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub blocked: bool,
    pub guard_results: Vec<GuardResultOut>,
    pub session_id: String,
    pub primary_model: String,
}

/// Multi-turn chat: the generation model answers, the guards validate the
/// answer before it is shown.
pub async fn chat_handler(
    state: Data<AppState>,
    req: Json<ChatRequest>,
) -> GatewayResult<Json<ChatResponse>> {
    let req = req.into_inner();
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(GatewayError::EmptyMessage);
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(GatewayError::MessageTooLong(MAX_MESSAGE_LENGTH));
    }

    let started = Instant::now();
    let session_id = req
        .session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let history = match req.history {
        Some(history) => history,
        None => state.sessions.history(&session_id),
    };
    let system = req
        .system_prompt
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SYSTEM);

    tracing::info!(
        message_len = message.len(),
        skip_guards = req.skip_guards,
        history_len = history.len(),
        "chat request"
    );

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history);
    messages.push(ChatMessage::user(message.as_str()));

    let reply = state.generation.complete(&messages).await?;
    tracing::info!(elapsed = ?started.elapsed(), reply_len = reply.len(), "generation done");

    let primary_model = state.generation.model_name();

    if req.skip_guards {
        state.sessions.append_exchange(&session_id, &message, &reply);
        return Ok(Json(ChatResponse {
            response: reply,
            blocked: false,
            guard_results: Vec::new(),
            session_id,
            primary_model,
        }));
    }

    let tasks = build_guard_tasks(&state.config.guards, state.classifier.clone());
    let settings = state.config.runner_settings();

    // The engine must never prevent a response from being evaluated to
    // completion: an engine-level fault degrades to a single synthetic
    // flag result instead of failing the request.
    let guard_results = {
        let message = message.clone();
        let reply = reply.clone();
        match tokio::spawn(async move { run_guards(&message, &reply, tasks, settings).await }).await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(error = %e, "guard pipeline failed");
                vec![GuardResult::new(
                    "pipeline",
                    Verdict::Flag,
                    format!("Guards error: {e}"),
                    "",
                )]
            }
        }
    };

    tracing::info!(
        elapsed = ?started.elapsed(),
        verdicts = ?guard_results
            .iter()
            .map(|r| (r.name.as_str(), r.verdict.as_str()))
            .collect::<Vec<_>>(),
        "guards done"
    );

    let disposition = decide(guard_results);
    let guard_results = present_results(&disposition.results);

    if disposition.blocked {
        let mut shown = BLOCKED_MESSAGE.to_string();
        if let Some(blocking) = &disposition.blocking_result {
            if !blocking.reason.trim().is_empty() {
                shown = format!("{BLOCKED_MESSAGE} ({}: {})", blocking.name, blocking.reason);
            }
        }
        return Ok(Json(ChatResponse {
            response: shown,
            blocked: true,
            guard_results,
            session_id,
            primary_model,
        }));
    }

    state.sessions.append_exchange(&session_id, &message, &reply);
    tracing::info!(elapsed = ?started.elapsed(), "chat done");
    Ok(Json(ChatResponse {
        response: reply,
        blocked: false,
        guard_results,
        session_id,
        primary_model,
    }))
}

/// Instantiate the enabled guards in canonical order, each bound to its
/// configured judge model.
pub fn build_guard_tasks(
    guards: &GuardsConfig,
    classifier: Arc<dyn ClassifierClient>,
) -> Vec<GuardTask> {
    guards
        .enabled()
        .into_iter()
        .map(|(name, settings)| {
            let check: Arc<dyn GuardCheck> = match name {
                SAFETY_GUARD => Arc::new(SafetyGuard {
                    classifier: classifier.clone(),
                }),
                TOPIC_GUARD => Arc::new(TopicGuard {
                    classifier: classifier.clone(),
                }),
                FORMAT_GUARD => Arc::new(FormatGuard {
                    classifier: classifier.clone(),
                }),
                _ => Arc::new(PiiGuard {
                    classifier: classifier.clone(),
                }),
            };
            GuardTask::new(name, settings.model.as_str(), check)
        })
        .collect()
}

fn present_results(results: &[GuardResult]) -> Vec<GuardResultOut> {
    results
        .iter()
        .map(|r| GuardResultOut {
            name: r.name.clone(),
            verdict: r.verdict,
            reason: presentable_reason(&r.reason),
            model: r.model_id.clone(),
        })
        .collect()
}

/// Strip leading verdict/"reason:" prefixes left over by chatty judges and
/// cap the length for display.
fn presentable_reason(reason: &str) -> String {
    const PREFIXES: [&str; 8] = [
        "pass.", "pass:", "flag.", "flag:", "block.", "block:", "reason:", "reason.",
    ];
    let mut s = reason.trim();
    loop {
        let stripped = PREFIXES.iter().find_map(|prefix| {
            if s.len() >= prefix.len()
                && s.is_char_boundary(prefix.len())
                && s[..prefix.len()].eq_ignore_ascii_case(prefix)
            {
                Some(s[prefix.len()..].trim_start())
            } else {
                None
            }
        });
        match stripped {
            Some(rest) => s = rest,
            None => break,
        }
    }
    truncate_chars(s, MAX_PRESENTED_REASON_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, GuardSettings};
    use crate::http::AppState;
    use actix_web::{test, web, App};
    use replygate_core::model::error::ModelError;
    use replygate_core::model::GenerationClient;
    use replygate_core::session::SessionStore;
    use replygate_core::model::OllamaClient;
    use serde_json::json;

    struct MockGeneration(String);

    #[async_trait::async_trait]
    impl GenerationClient for MockGeneration {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ModelError> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> String {
            "mock-model".to_string()
        }
    }

    struct MockClassifier(String);

    #[async_trait::async_trait]
    impl ClassifierClient for MockClassifier {
        async fn classify(
            &self,
            _system_prompt: &str,
            _user_content: &str,
            _model_id: &str,
        ) -> Result<String, ModelError> {
            Ok(self.0.clone())
        }
    }

    fn all_guards_enabled() -> Config {
        let mut config = Config::default();
        let enabled = GuardSettings {
            enabled: true,
            model: "phi3".to_string(),
        };
        config.guards.safety = enabled.clone();
        config.guards.topic = enabled.clone();
        config.guards.format = enabled.clone();
        config.guards.pii = enabled;
        config
    }

    fn state(reply: &str, judge_output: &str, config: Config) -> AppState {
        AppState {
            config,
            generation: Arc::new(MockGeneration(reply.to_string())),
            classifier: Arc::new(MockClassifier(judge_output.to_string())),
            ollama: OllamaClient::new(None),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    async fn post_chat(state: AppState, body: serde_json::Value) -> serde_json::Value {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/chat", web::post().to(chat_handler)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/chat")
            .set_json(body)
            .to_request();
        test::call_and_read_body_json(&app, req).await
    }

    #[actix_web::test]
    async fn clean_reply_passes_through_unchanged() {
        let state = state(
            "Hi there, how can I help?",
            "pass",
            all_guards_enabled(),
        );
        let body = post_chat(state, json!({ "message": "Hello" })).await;

        assert_eq!(body["blocked"], false);
        assert_eq!(body["response"], "Hi there, how can I help?");
        assert_eq!(body["guard_results"].as_array().unwrap().len(), 4);
        assert_eq!(body["primary_model"], "mock-model");
        for result in body["guard_results"].as_array().unwrap() {
            assert_eq!(result["verdict"], "pass");
        }
    }

    #[actix_web::test]
    async fn blocking_verdict_withholds_the_reply() {
        let state = state(
            "something nasty",
            "block\nclearly harmful",
            all_guards_enabled(),
        );
        let body = post_chat(state, json!({ "message": "Hello" })).await;

        assert_eq!(body["blocked"], true);
        let response = body["response"].as_str().unwrap();
        assert!(response.starts_with(BLOCKED_MESSAGE));
        assert!(response.contains("safety"));
        assert!(response.contains("clearly harmful"));
    }

    #[actix_web::test]
    async fn skip_guards_bypasses_the_engine() {
        let state = state("plain reply", "block\nwould block", all_guards_enabled());
        let body = post_chat(state, json!({ "message": "Hello", "skip_guards": true })).await;

        assert_eq!(body["blocked"], false);
        assert_eq!(body["response"], "plain reply");
        assert!(body["guard_results"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn blocked_exchanges_are_not_recorded() {
        let app_state = state(
            "something nasty",
            "block\nno",
            all_guards_enabled(),
        );
        let sessions = app_state.sessions.clone();
        let body = post_chat(app_state, json!({ "message": "Hello", "session_id": "s1" })).await;

        assert_eq!(body["blocked"], true);
        assert!(sessions.history("s1").is_empty());
    }

    #[actix_web::test]
    async fn no_enabled_guards_means_no_results() {
        let state = state("fine", "block", Config::default());
        let body = post_chat(state, json!({ "message": "Hello" })).await;

        assert_eq!(body["blocked"], false);
        assert!(body["guard_results"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn empty_message_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("x", "pass", Config::default())))
                .route("/chat", web::post().to(chat_handler)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/chat")
            .set_json(json!({ "message": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[core::prelude::v1::test]
    fn build_guard_tasks_follows_canonical_order() {
        let config = all_guards_enabled();
        let tasks = build_guard_tasks(&config.guards, Arc::new(MockClassifier("pass".into())));
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["safety", "topic", "format", "pii"]);
        assert!(tasks.iter().all(|t| t.model_id == "phi3"));
    }

    #[core::prelude::v1::test]
    fn presentable_reason_strips_prefixes_and_truncates() {
        assert_eq!(presentable_reason("pass. Reason: looks fine"), "looks fine");
        assert_eq!(presentable_reason("FLAG: rambling"), "rambling");
        assert_eq!(presentable_reason("  block.block: bad  "), "bad");
        assert_eq!(presentable_reason("no prefix here"), "no prefix here");

        let long = "x".repeat(300);
        assert_eq!(presentable_reason(&long).chars().count(), 120);
    }
}
