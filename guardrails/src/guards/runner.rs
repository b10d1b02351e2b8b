use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use replygate_core::types::{GuardResult, Verdict};

use super::judge::GuardCheck;
use super::safety::SAFETY_GUARD;

/// Synthesized reason for a guard that missed its deadline.
const TIMEOUT_REASON: &str = "Timeout";
/// Synthesized reason for the safety guard under the `block` timeout policy.
const SAFETY_TIMEOUT_REASON: &str = "Safety check timed out; response not verified.";

/// What to synthesize when the safety guard specifically fails to answer in
/// time. Every other guard's timeout is always a `flag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafetyTimeoutPolicy {
    #[default]
    Flag,
    Block,
}

/// Execution settings threaded in by the caller for each run. There is no
/// ambient configuration state inside the engine.
#[derive(Debug, Clone, Copy)]
pub struct RunnerSettings {
    pub per_task_timeout: Duration,
    pub on_safety_timeout: SafetyTimeoutPolicy,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            per_task_timeout: Duration::from_secs(45),
            on_safety_timeout: SafetyTimeoutPolicy::Flag,
        }
    }
}

/// A named, enabled guard bound to its judge model. Built per request from
/// configuration and discarded with the request.
pub struct GuardTask {
    pub name: String,
    pub model_id: String,
    pub check: Arc<dyn GuardCheck>,
}

impl GuardTask {
    pub fn new(name: impl Into<String>, model_id: impl Into<String>, check: Arc<dyn GuardCheck>) -> Self {
        Self {
            name: name.into(),
            model_id: model_id.into(),
            check,
        }
    }
}

/// Run all tasks concurrently against a per-task deadline.
///
/// Returns exactly one result per task, in task order, regardless of
/// completion order. Nothing a task does can fail the run: a timeout or a
/// panicked task becomes a synthetic `flag` result, except the safety
/// guard's timeout, which escalates to `block` under the configured policy.
/// A timed-out task is aborted rather than left running.
pub async fn run_guards(
    user_message: &str,
    reply: &str,
    tasks: Vec<GuardTask>,
    settings: RunnerSettings,
) -> Vec<GuardResult> {
    if tasks.is_empty() {
        return Vec::new();
    }

    let user_message = user_message.trim().to_string();
    let reply = reply.trim().to_string();

    tracing::info!(
        count = tasks.len(),
        timeout_secs = settings.per_task_timeout.as_secs(),
        on_safety_timeout = ?settings.on_safety_timeout,
        names = ?tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "dispatching guards"
    );

    // Every task gets the full timeout measured from dispatch, not from when
    // its slot happens to be awaited.
    let deadline = Instant::now() + settings.per_task_timeout;

    let handles: Vec<_> = tasks
        .iter()
        .map(|task| {
            let check = Arc::clone(&task.check);
            let name = task.name.clone();
            let model_id = task.model_id.clone();
            let user_message = user_message.clone();
            let reply = reply.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                let result = check.check(&user_message, &reply, &model_id).await;
                tracing::info!(guard = %name, elapsed = ?started.elapsed(), verdict = %result.verdict, "guard completed");
                result
            })
        })
        .collect();

    let mut results = Vec::with_capacity(tasks.len());
    for (task, handle) in tasks.iter().zip(handles) {
        let abort = handle.abort_handle();
        let result = match tokio::time::timeout_at(deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                tracing::warn!(guard = %task.name, error = %join_err, "guard task failed");
                GuardResult::new(
                    task.name.as_str(),
                    Verdict::Flag,
                    join_err.to_string(),
                    task.model_id.as_str(),
                )
            }
            Err(_) => {
                abort.abort();
                tracing::warn!(
                    guard = %task.name,
                    timeout_secs = settings.per_task_timeout.as_secs(),
                    "guard timed out"
                );
                synthesize_timeout(task, settings.on_safety_timeout)
            }
        };
        results.push(result);
    }
    results
}

fn synthesize_timeout(task: &GuardTask, policy: SafetyTimeoutPolicy) -> GuardResult {
    if task.name == SAFETY_GUARD && policy == SafetyTimeoutPolicy::Block {
        GuardResult::new(
            task.name.as_str(),
            Verdict::Block,
            SAFETY_TIMEOUT_REASON,
            task.model_id.as_str(),
        )
    } else {
        GuardResult::new(
            task.name.as_str(),
            Verdict::Flag,
            TIMEOUT_REASON,
            task.model_id.as_str(),
        )
    }
}
