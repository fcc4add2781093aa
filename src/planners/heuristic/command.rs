use crate::infra::Position;
use crate::state::AgentId;

/// Orders for one agent for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub agent_id: AgentId,
    /// Starts at the agent's cell; consecutive cells are orthogonal neighbours.
    pub path: Vec<Position>,
    /// Always the agent's own cell when present.
    pub bomb: Option<Position>,
}

impl Command {
    pub fn movement(agent_id: AgentId, path: Vec<Position>) -> Self {
        Self {
            agent_id,
            path,
            bomb: None,
        }
    }

    pub fn bomb_and_move(agent_id: AgentId, bomb: Position, path: Vec<Position>) -> Self {
        Self {
            agent_id,
            path,
            bomb: Some(bomb),
        }
    }

    /// Cells moved this tick.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Neither moves nor drops a bomb.
    pub fn is_noop(&self) -> bool {
        self.steps() == 0 && self.bomb.is_none()
    }

    pub fn truncate_path(&mut self, max_len: usize) -> bool {
        if self.path.len() > max_len {
            self.path.truncate(max_len);
            true
        } else {
            false
        }
    }
}
