use thiserror::Error;

use crate::army::StackId;
use crate::battle::BattlePhase;

/// Failures surfaced to the caller before any battle state is touched
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BattleError {
    #[error("No army to command.")]
    NoPlayerArmy,

    #[error("Both armies are empty; there is nothing to fight.")]
    EmptyArmies,

    #[error("Unknown unit definition: {0}")]
    UnknownUnit(String),

    #[error("No battle in progress.")]
    NoActiveBattle,

    #[error("A battle is already in progress.")]
    BattleInProgress,

    #[error("Not allowed during the {actual:?} phase (expected {expected:?})")]
    WrongPhase {
        expected: BattlePhase,
        actual: BattlePhase,
    },

    #[error("Stack {0} cannot be deployed")]
    UnknownStack(StackId),
}

pub type Result<T> = std::result::Result<T, BattleError>;
