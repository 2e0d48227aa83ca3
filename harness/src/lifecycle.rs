//! Experiment lifecycle phases and the run state machine.
//!
//! ```text
//! Pending -> Setup -> Run -> Collect -> Analyze -> Completed
//!              \        \        \         \
//!               +--------+--------+---------+--> Failed
//! ```
//!
//! Phases only advance one step at a time. Once a run is `Completed` or
//! `Failed` the state no longer changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while advancing the lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The requested phase does not follow the current state
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: RunState, to: Phase },

    /// The run already reached a terminal state
    #[error("Run already finished in state {state}")]
    AlreadyFinished { state: RunState },
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// One stage of an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Prepare the environment
    Setup,
    /// Execute the experiment
    Run,
    /// Gather quantitative results
    Collect,
    /// Interpret the collected results
    Analyze,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [Phase::Setup, Phase::Run, Phase::Collect, Phase::Analyze];

    /// The phase that follows this one, if any
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Setup => Some(Phase::Run),
            Phase::Run => Some(Phase::Collect),
            Phase::Collect => Some(Phase::Analyze),
            Phase::Analyze => None,
        }
    }

    /// Short description shown by the CLI
    pub fn description(self) -> &'static str {
        match self {
            Phase::Setup => "Setup experiment environment",
            Phase::Run => "Execute the experiment",
            Phase::Collect => "Collect quantitative data",
            Phase::Analyze => "Analyze and interpret results",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Run => write!(f, "run"),
            Phase::Collect => write!(f, "collect"),
            Phase::Analyze => write!(f, "analyze"),
        }
    }
}

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RunState {
    /// Nothing has run yet
    Pending,
    /// Currently executing a phase
    InPhase { phase: Phase },
    /// All phases finished
    Completed,
    /// A phase failed; later phases were skipped
    Failed { phase: Phase, reason: String },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed { .. })
    }

    /// The phase to run next, or `None` when the run is over
    pub fn next_phase(&self) -> Option<Phase> {
        match self {
            RunState::Pending => Some(Phase::Setup),
            RunState::InPhase { phase } => phase.next(),
            RunState::Completed | RunState::Failed { .. } => None,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Pending => write!(f, "pending"),
            RunState::InPhase { phase } => write!(f, "in {}", phase),
            RunState::Completed => write!(f, "completed"),
            RunState::Failed { phase, reason } => write!(f, "failed in {}: {}", phase, reason),
        }
    }
}

/// Tracks a single run through the phases
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: RunState,
    completed: Vec<Phase>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: RunState::Pending,
            completed: Vec::new(),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Phases that finished successfully, in order
    pub fn completed_phases(&self) -> &[Phase] {
        &self.completed
    }

    /// Enter `phase`. Only the phase directly after the current one is accepted.
    pub fn begin(&mut self, phase: Phase) -> LifecycleResult<()> {
        if self.state.is_terminal() {
            return Err(LifecycleError::AlreadyFinished {
                state: self.state.clone(),
            });
        }

        if self.state.next_phase() != Some(phase) {
            return Err(LifecycleError::InvalidTransition {
                from: self.state.clone(),
                to: phase,
            });
        }

        if let RunState::InPhase { phase: previous } = self.state {
            self.completed.push(previous);
        }

        tracing::debug!("State transition: {} → {}", self.state, phase);
        self.state = RunState::InPhase { phase };
        Ok(())
    }

    /// Mark the current phase as failed
    pub fn fail(&mut self, reason: impl Into<String>) -> LifecycleResult<()> {
        match self.state {
            RunState::InPhase { phase } => {
                self.state = RunState::Failed {
                    phase,
                    reason: reason.into(),
                };
                Ok(())
            }
            _ => Err(LifecycleError::AlreadyFinished {
                state: self.state.clone(),
            }),
        }
    }

    /// Finish the run after the analyze phase
    pub fn complete(&mut self) -> LifecycleResult<()> {
        match self.state {
            RunState::InPhase {
                phase: Phase::Analyze,
            } => {
                self.completed.push(Phase::Analyze);
                self.state = RunState::Completed;
                Ok(())
            }
            RunState::InPhase { phase } => Err(LifecycleError::InvalidTransition {
                from: self.state.clone(),
                to: phase.next().unwrap_or(Phase::Analyze),
            }),
            _ => Err(LifecycleError::AlreadyFinished {
                state: self.state.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert_eq!(Phase::ALL[0], Phase::Setup);
        assert_eq!(Phase::Setup.next(), Some(Phase::Run));
        assert_eq!(Phase::Collect.next(), Some(Phase::Analyze));
        assert_eq!(Phase::Analyze.next(), None);
        assert!(Phase::Setup < Phase::Analyze);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), &RunState::Pending);

        for phase in Phase::ALL {
            lifecycle.begin(phase).unwrap();
            assert_eq!(lifecycle.state(), &RunState::InPhase { phase });
        }
        lifecycle.complete().unwrap();

        assert_eq!(lifecycle.state(), &RunState::Completed);
        assert_eq!(lifecycle.completed_phases(), &Phase::ALL);
    }

    #[test]
    fn test_rejects_skipped_phase() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.begin(Phase::Run).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: RunState::Pending,
                to: Phase::Run,
            }
        );

        lifecycle.begin(Phase::Setup).unwrap();
        assert!(lifecycle.begin(Phase::Collect).is_err());
        assert!(lifecycle.begin(Phase::Setup).is_err());
    }

    #[test]
    fn test_complete_requires_analyze() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin(Phase::Setup).unwrap();
        assert!(lifecycle.complete().is_err());
        assert_eq!(lifecycle.state(), &RunState::InPhase { phase: Phase::Setup });
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin(Phase::Setup).unwrap();
        lifecycle.begin(Phase::Run).unwrap();
        lifecycle.fail("boom").unwrap();

        assert_eq!(
            lifecycle.state(),
            &RunState::Failed {
                phase: Phase::Run,
                reason: "boom".to_string(),
            }
        );
        assert_eq!(lifecycle.completed_phases(), &[Phase::Setup]);
        assert!(matches!(
            lifecycle.begin(Phase::Collect),
            Err(LifecycleError::AlreadyFinished { .. })
        ));
        assert!(lifecycle.fail("again").is_err());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::Pending.to_string(), "pending");
        assert_eq!(
            RunState::InPhase {
                phase: Phase::Collect
            }
            .to_string(),
            "in collect"
        );
        assert_eq!(
            RunState::Failed {
                phase: Phase::Setup,
                reason: "no disk".to_string()
            }
            .to_string(),
            "failed in setup: no disk"
        );
    }
}
