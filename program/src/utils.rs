// Lottery Program - Utility Functions
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, pubkey::Pubkey, rent::Rent,
};

use crate::{error::LotteryError, state::LOTTERY_SEED};

/// Find the program derived address of the lottery account
pub fn find_lottery_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LOTTERY_SEED], program_id)
}

/// Lamports held by the lottery above its rent-exempt minimum, i.e. the pot
pub fn pot_balance(lottery_info: &AccountInfo, rent: &Rent) -> u64 {
    lottery_info
        .lamports()
        .saturating_sub(rent.minimum_balance(lottery_info.data_len()))
}

/// Move lamports out of an account owned by this program.
///
/// Any failure is reported as `TransferFailed` so the whole instruction aborts.
pub fn transfer_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> ProgramResult {
    if amount == 0 {
        return Ok(());
    }
    if !from.is_writable || !to.is_writable {
        msg!("Transfer accounts must be writable");
        return Err(LotteryError::TransferFailed.into());
    }

    let from_balance = from
        .lamports()
        .checked_sub(amount)
        .ok_or(LotteryError::TransferFailed)?;
    let to_balance = to
        .lamports()
        .checked_add(amount)
        .ok_or(LotteryError::TransferFailed)?;

    **from
        .try_borrow_mut_lamports()
        .map_err(|_| LotteryError::TransferFailed)? = from_balance;
    **to
        .try_borrow_mut_lamports()
        .map_err(|_| LotteryError::TransferFailed)? = to_balance;
    Ok(())
}

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}
