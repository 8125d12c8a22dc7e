// Lottery Program - Errors
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// Errors that may be returned by the Lottery program.
///
/// The discriminant of each variant is the `ProgramError::Custom` code seen by clients,
/// so new variants must only ever be appended.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LotteryError {
    /// Zero tickets requested
    #[error("Ticket count must be greater than zero")]
    InvalidTicketCount,

    /// Attached payment does not cover the tickets
    #[error("Payment does not cover the requested tickets")]
    InsufficientPayment,

    /// More tickets requested than remain in the round
    #[error("Not enough tickets available")]
    InsufficientSupply,

    /// No tickets remain in the round
    #[error("No tickets available")]
    SoldOut,

    /// Draw or reconfiguration attempted in the wrong phase of the round
    #[error("Round is in progress")]
    RoundInProgress,

    /// Only the operator can perform this action
    #[error("Only the lottery operator can perform this action")]
    Unauthorized,

    /// A refund or payout could not be delivered
    #[error("Lamport transfer failed")]
    TransferFailed,

    /// max_tickets outside 1..=MAX_PLAYERS
    #[error("Invalid lottery configuration")]
    InvalidConfiguration,

    /// The winner account passed in does not hold the drawn ticket
    #[error("Winner account does not match the drawn ticket")]
    WinnerMismatch,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
