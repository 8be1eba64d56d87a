// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run state machine with typed phase transitions.
//!
//! Implements the run lifecycle:
//! Received → Validated → Executing → Aggregated → Ranked → Done,
//! with Failed reachable from Received or Validated only.
//! Invalid transitions result in StateTransitionError.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::StateTransitionError;

/// Benchmark run phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Input accepted, nothing checked yet.
    Received,

    /// Message and configuration passed validation.
    Validated,

    /// Libraries are being benchmarked.
    Executing,

    /// Every library has a (possibly aggregated) result.
    Aggregated,

    /// Winner has been marked.
    Ranked,

    /// Recommendation produced; the outcome is final.
    Done,

    /// Input rejected; no outcome is produced.
    Failed,
}

impl RunPhase {
    /// Get the phase name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Validated => "Validated",
            Self::Executing => "Executing",
            Self::Aggregated => "Aggregated",
            Self::Ranked => "Ranked",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Check if transition to the target phase is valid.
    pub fn can_transition_to(&self, target: RunPhase) -> bool {
        matches!(
            (self, target),
            (Self::Received, Self::Validated)
                | (Self::Received, Self::Failed)
                | (Self::Validated, Self::Executing)
                | (Self::Validated, Self::Failed)
                | (Self::Executing, Self::Aggregated)
                | (Self::Aggregated, Self::Ranked)
                | (Self::Ranked, Self::Done)
        )
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// State machine for one benchmark run.
#[derive(Debug)]
pub struct RunStateMachine {
    phase: RunPhase,
    started: Instant,
    transition_count: u64,
}

impl RunStateMachine {
    /// Create a state machine in the Received phase.
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Received,
            started: Instant::now(),
            transition_count: 0,
        }
    }

    /// Get the current phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Time since the run was received.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Get total number of transitions.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Attempt to move to a new phase.
    pub fn transition_to(&mut self, target: RunPhase) -> Result<(), StateTransitionError> {
        if self.phase.is_terminal() {
            return Err(StateTransitionError::TerminalState {
                state: self.phase.name(),
            });
        }

        if !self.phase.can_transition_to(target) {
            return Err(StateTransitionError::InvalidTransition {
                from: self.phase.name(),
                to: target.name(),
            });
        }

        tracing::debug!(
            from = self.phase.name(),
            to = target.name(),
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "Run phase transition"
        );

        self.phase = target;
        self.transition_count += 1;

        Ok(())
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
