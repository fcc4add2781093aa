mod registry;
mod snapshot;

pub use registry::{AgentAction, AgentRegistry, AgentState, EscapeState};
pub use snapshot::{AgentId, ArenaSnapshot, FriendlyAgent};
