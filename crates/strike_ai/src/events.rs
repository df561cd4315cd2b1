//! Events delivered to an agent's active behaviour

/// Something that happened to the agent this tick
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The agent took damage
    Damaged {
        amount: f32,
        source: Option<u64>,
    },
    /// A target entered the agent's field of view
    TargetFound { target: u64 },
    /// The tracked target left the field of view
    TargetLost { target: u64 },
}

impl AgentEvent {
    /// Damage without a known source
    pub fn damaged(amount: f32) -> Self {
        Self::Damaged {
            amount,
            source: None,
        }
    }
}
