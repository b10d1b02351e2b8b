use actix_web::web::{Data, Json};
use serde_json::{json, Map, Value};

use replygate_core::model::GROQ_API_KEY_VAR;

use crate::http::AppState;

/// Health check: generation key, Ollama reachability and which judge models
/// are actually installed.
pub async fn health_handler(state: Data<AppState>) -> Json<Value> {
    let groq_configured = std::env::var(GROQ_API_KEY_VAR)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);

    let (ollama_available, ollama_models) = match state.ollama.list_models().await {
        Ok(models) => (true, models),
        Err(e) => {
            tracing::warn!(error = %e, "ollama health check failed");
            (false, Vec::new())
        }
    };

    let mut guard_models_available = Map::new();
    if ollama_available {
        for (name, settings) in state.config.guards.enabled() {
            // Match by base name so phi3 matches phi3:latest.
            let base = settings.model.split(':').next().unwrap_or(&settings.model);
            let present = ollama_models
                .iter()
                .any(|m| m.contains(&settings.model) || m.starts_with(base));
            guard_models_available.insert(name.to_string(), Value::Bool(present));
        }
    }

    let status = if groq_configured && ollama_available {
        "ok"
    } else {
        "degraded"
    };

    tracing::info!(
        status,
        groq_configured,
        ollama_available,
        models = ?ollama_models,
        "health check"
    );

    Json(json!({
        "status": status,
        "groq_configured": groq_configured,
        "ollama_available": ollama_available,
        "groq_model": state.config.generation.model(),
        "guards_config": state.config.guards,
        "ollama_models": ollama_models,
        "guard_models_available": guard_models_available,
    }))
}
