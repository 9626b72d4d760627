//! Chat proxy: relays one user turn to the session's agent thread and returns its reply.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::prompts::{
    CV_MODE_PREFIX, FALLBACK_REPLY, PROFILE_MODE_PREFIX, PROFILE_UPDATED_MARKER,
};
use crate::agent::{AgentError, AgentService};
use crate::chat::sessions::SessionRegistry;

/// Which page the message was sent from; selects the agent's working mode.
/// Unrecognized values deserialize as `Cv`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ChatContext {
    #[default]
    Cv,
    Profile,
}

impl From<String> for ChatContext {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("profile") {
            ChatContext::Profile
        } else {
            ChatContext::Cv
        }
    }
}

impl ChatContext {
    pub fn prefix(self) -> &'static str {
        match self {
            ChatContext::Cv => CV_MODE_PREFIX,
            ChatContext::Profile => PROFILE_MODE_PREFIX,
        }
    }

    pub fn tag(self, message: &str) -> String {
        format!("{}\n\n{message}", self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    /// The agent rewrote the profile document during this turn.
    pub profile_updated: bool,
}

/// Resolves (or creates) the session's thread, runs the tagged message and waits
/// for the agent to finish. Blocks until the agent answers or the transport fails.
pub async fn send_chat(
    registry: &SessionRegistry,
    agent: &dyn AgentService,
    session_id: &str,
    message: &str,
    context: ChatContext,
) -> Result<ChatReply, AgentError> {
    let thread_id = registry.get_or_create_thread(session_id, agent).await?;
    let output = agent.run_wait(&thread_id, &context.tag(message)).await?;

    let response = output
        .reply()
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());
    let profile_updated =
        context == ChatContext::Profile && response.contains(PROFILE_UPDATED_MARKER);

    debug!(
        "Chat turn on thread {thread_id}: {} reply chars, profile_updated={profile_updated}",
        response.len()
    );

    Ok(ChatReply {
        response,
        profile_updated,
    })
}
