//! Remediation actions and the collaborator that performs them.

use std::{num::NonZeroU32, time::Duration};

use async_trait::async_trait;
use log::info;

use crate::{error::ActionError, models::RemediationAction};

/// Performs remediation actions against real (or simulated) infrastructure.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Perform `action` and describe what happened.
    async fn execute(&self, action: &RemediationAction) -> Result<String, ActionError>;
}

/// Executor that only waits and reports what it would have done.
#[derive(Debug, Clone)]
pub struct SimulatedActionExecutor {
    latency: Duration,
}

impl SimulatedActionExecutor {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedActionExecutor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

#[async_trait]
impl ActionExecutor for SimulatedActionExecutor {
    async fn execute(&self, action: &RemediationAction) -> Result<String, ActionError> {
        tokio::time::sleep(self.latency).await;

        let outcome = match action {
            RemediationAction::RestartService { service_name } => {
                format!("Service '{service_name}' restarted")
            }
            RemediationAction::ScaleCluster {
                cluster_id,
                desired_capacity,
            } => format!("Cluster '{cluster_id}' scaled to {desired_capacity} nodes"),
            RemediationAction::ManualStep { instructions } => {
                format!("Manual step acknowledged: {instructions}")
            }
        };
        info!("[simulated] {outcome}");
        Ok(outcome)
    }
}

// Words skipped when looking for the target of a step.
const FILLER: [&str; 14] = [
    "the", "a", "an", "our", "all", "service", "services", "pod", "pods", "deployment",
    "cluster", "instance", "node", "nodes",
];
// Words that end the search without a target.
const STOP: [&str; 9] = ["now", "immediately", "again", "if", "when", "and", "then", "on", "to"];

fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .trim_end_matches('.')
}

fn is_one_of(word: &str, list: &[&str]) -> bool {
    list.iter().any(|w| word.eq_ignore_ascii_case(w))
}

fn is_identifier(token: &str) -> bool {
    token.chars().any(char::is_alphanumeric)
        && token
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// First identifier in `words`, skipping articles and generic resource nouns.
fn target<'a>(words: &[&'a str]) -> Option<&'a str> {
    for word in words.iter().copied().map(clean_token) {
        if word.is_empty() || is_one_of(word, &FILLER) {
            continue;
        }
        if is_one_of(word, &STOP) {
            return None;
        }
        return is_identifier(word).then_some(word);
    }
    None
}

/// Derive a structured action from a free-text remediation step.
///
/// `restart <service>` and `scale <cluster> to <n>` (with `n > 0`) map to
/// their actions; anything else becomes a manual step. Articles and generic
/// nouns around the target are ignored, so `Restart the payments service`
/// restarts `payments`. A step with no recognizable target stays manual.
///
/// # Examples
///
/// ```rust
/// use remedy_core::{models::RemediationAction, remediation::derive_action};
///
/// assert_eq!(
///     derive_action("Restart api-gateway"),
///     RemediationAction::RestartService { service_name: "api-gateway".to_string() }
/// );
/// assert!(matches!(
///     derive_action("Scale db-cluster to 0"),
///     RemediationAction::ManualStep { .. }
/// ));
/// ```
pub fn derive_action(text: &str) -> RemediationAction {
    let words: Vec<&str> = text.split_whitespace().collect();
    let verb = words.first().map(|w| clean_token(w)).unwrap_or_default();

    if verb.eq_ignore_ascii_case("restart") {
        if let Some(service) = target(&words[1..]) {
            return RemediationAction::RestartService {
                service_name: service.to_string(),
            };
        }
    }

    if verb.eq_ignore_ascii_case("scale") {
        let to = words
            .iter()
            .position(|w| clean_token(w).eq_ignore_ascii_case("to"));
        if let Some(to) = to {
            let cluster = target(&words[1..to]);
            let capacity = words
                .get(to + 1)
                .and_then(|w| clean_token(w).parse::<NonZeroU32>().ok());
            if let (Some(cluster), Some(desired_capacity)) = (cluster, capacity) {
                return RemediationAction::ScaleCluster {
                    cluster_id: cluster.to_string(),
                    desired_capacity,
                };
            }
        }
    }

    RemediationAction::ManualStep {
        instructions: text.trim().to_string(),
    }
}
