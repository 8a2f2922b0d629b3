use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named phases of one run, executed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Analysis,
    Matching,
    Optimization,
    ConflictResolution,
}

impl PipelineStage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Analysis,
            Self::Matching,
            Self::Optimization,
            Self::ConflictResolution,
        ]
    }

    /// Name of the agent that owns the stage, as shown in the audit log.
    pub const fn agent(self) -> &'static str {
        match self {
            Self::Analysis => "Student Analyzer",
            Self::Matching => "Company Matcher",
            Self::Optimization => "Allocation Optimizer",
            Self::ConflictResolution => "Conflict Resolver",
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Analysis => "student-analyzer",
            Self::Matching => "company-matcher",
            Self::Optimization => "allocation-optimizer",
            Self::ConflictResolution => "conflict-resolver",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|stage| stage.key().eq_ignore_ascii_case(key.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

impl AgentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Processing => "Processing",
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Idle and terminal states may start a new invocation; only Processing may finish one.
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Idle | Self::Success | Self::Error, Self::Processing) => true,
            (Self::Processing, Self::Success | Self::Error) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} cannot move from {} to {}", .stage.agent(), .from.label(), .to.label())]
pub struct TransitionError {
    pub stage: PipelineStage,
    pub from: AgentStatus,
    pub to: AgentStatus,
}

/// Current status for every stage agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentBoard {
    statuses: BTreeMap<PipelineStage, AgentStatus>,
}

impl Default for AgentBoard {
    fn default() -> Self {
        Self {
            statuses: PipelineStage::ordered()
                .into_iter()
                .map(|stage| (stage, AgentStatus::Idle))
                .collect(),
        }
    }
}

impl AgentBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, stage: PipelineStage) -> AgentStatus {
        self.statuses.get(&stage).copied().unwrap_or_default()
    }

    pub fn transition(
        &mut self,
        stage: PipelineStage,
        next: AgentStatus,
    ) -> Result<AgentStatus, TransitionError> {
        let current = self.status(stage);
        if !current.can_transition_to(next) {
            return Err(TransitionError {
                stage,
                from: current,
                to: next,
            });
        }
        self.statuses.insert(stage, next);
        Ok(current)
    }

    pub fn snapshot(&self) -> BTreeMap<PipelineStage, AgentStatus> {
        self.statuses.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_starts_idle_and_follows_state_machine() {
        let mut board = AgentBoard::new();
        assert!(PipelineStage::ordered()
            .iter()
            .all(|stage| board.status(*stage) == AgentStatus::Idle));

        board
            .transition(PipelineStage::Matching, AgentStatus::Processing)
            .expect("idle -> processing");
        board
            .transition(PipelineStage::Matching, AgentStatus::Success)
            .expect("processing -> success");
        board
            .transition(PipelineStage::Matching, AgentStatus::Processing)
            .expect("a finished agent can start again");
    }

    #[test]
    fn rejects_finishing_without_processing() {
        let mut board = AgentBoard::new();
        let err = board
            .transition(PipelineStage::Optimization, AgentStatus::Success)
            .expect_err("idle agents cannot succeed");
        assert_eq!(err.from, AgentStatus::Idle);
        assert_eq!(
            err.to_string(),
            "Allocation Optimizer cannot move from Idle to Success"
        );
    }

    #[test]
    fn stage_keys_round_trip() {
        for stage in PipelineStage::ordered() {
            assert_eq!(PipelineStage::from_key(stage.key()), Some(stage));
        }
        assert_eq!(PipelineStage::from_key("quality-assessor"), None);
    }
}
