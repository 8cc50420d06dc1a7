//! Raffle draw / claim state machine and event check-in linkage.
//!
//! Everything here is synchronous and operates on in-memory documents; services
//! load a document, run one of these transitions, and persist the result.

pub mod check_in;
pub mod claim;
pub mod draw;
pub mod eligibility;
pub mod prizes;

use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

pub use check_in::*;
pub use claim::*;
pub use draw::*;
pub use eligibility::*;
pub use prizes::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("No eligible participants")]
    NoEligibleParticipants,

    #[error("No prizes available")]
    NoPrizesAvailable,

    #[error("No winner is pending claim")]
    NoPendingWinner,

    #[error("Winner {0} is still pending claim")]
    WinnerPending(Uuid),

    #[error("Raffle is completed")]
    RaffleCompleted,

    #[error("Raffle is not active")]
    RaffleNotActive,

    #[error("Prize {0} not found")]
    PrizeNotFound(Uuid),

    #[error("Prize {0} has already been claimed")]
    PrizeClaimed(Uuid),

    #[error("Participant {0} not found")]
    ParticipantNotFound(Uuid),

    #[error("Guest {0} is not on the event guest list")]
    GuestNotInEvent(Uuid),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NoEligibleParticipants => AppError::NoEligibleParticipants,
            WorkflowError::NoPrizesAvailable => AppError::NoPrizesAvailable,
            WorkflowError::PrizeNotFound(_)
            | WorkflowError::ParticipantNotFound(_)
            | WorkflowError::GuestNotInEvent(_) => AppError::NotFound(err.to_string()),
            WorkflowError::NoPendingWinner
            | WorkflowError::WinnerPending(_)
            | WorkflowError::RaffleCompleted
            | WorkflowError::RaffleNotActive
            | WorkflowError::PrizeClaimed(_) => AppError::StateConflict(err.to_string()),
        }
    }
}
