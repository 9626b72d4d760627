// Fixed strings exchanged with the agent. The agent's system prompt keys its mode
// off these prefixes, so they must stay byte-for-byte stable.

pub const CV_MODE_PREFIX: &str = "[CV MODE]";

pub const PROFILE_MODE_PREFIX: &str = "[PROFILE EDIT MODE]";

/// Returned when a run finishes without any assistant text (e.g. tool calls only).
pub const FALLBACK_REPLY: &str = "Done.";

/// The agent's profile tool reports success with this marker.
pub const PROFILE_UPDATED_MARKER: &str = "✅ Profile updated";

/// Prefix for chat failures rendered inline as an assistant message.
pub const ERROR_MARKER: &str = "❌ Error:";
