// Lottery Program - Instruction Processor
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};

use crate::{
    error::LotteryError,
    instruction::LotteryInstruction,
    state::{Lottery, LOTTERY_SEED},
    utils::{self, find_lottery_address, lamports_to_sol},
};

/// Program state handler.
pub struct Processor {}

impl Processor {
    /// Process a Lottery instruction
    pub fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::Initialize {
                ticket_cost,
                max_tickets,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts, ticket_cost, max_tickets)
            }
            LotteryInstruction::BuyTicket {
                num_tickets,
                paid_amount,
            } => {
                msg!("Instruction: Buy Ticket");
                Self::process_buy_ticket(program_id, accounts, num_tickets, paid_amount)
            }
            LotteryInstruction::EndGame { random_seed } => {
                msg!("Instruction: End Game");
                Self::process_end_game(program_id, accounts, random_seed)
            }
            LotteryInstruction::ChangeTicketStuff {
                new_ticket_cost,
                new_max_tickets,
            } => {
                msg!("Instruction: Change Ticket Stuff");
                Self::process_change_ticket_stuff(
                    program_id,
                    accounts,
                    new_ticket_cost,
                    new_max_tickets,
                )
            }
        }
    }

    /// Check that `lottery_info` is this program's lottery PDA and load it
    fn load_lottery(
        program_id: &Pubkey,
        lottery_info: &AccountInfo,
    ) -> Result<Lottery, ProgramError> {
        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let (expected_lottery, _) = find_lottery_address(program_id);
        if *lottery_info.key != expected_lottery {
            msg!("Invalid lottery account address");
            return Err(ProgramError::InvalidArgument);
        }
        Lottery::unpack(&lottery_info.data.borrow())
    }

    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        ticket_cost: u64,
        max_tickets: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !operator_info.is_signer {
            msg!("Operator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let (expected_lottery, bump_seed) = find_lottery_address(program_id);
        if *lottery_info.key != expected_lottery {
            msg!("Invalid lottery account address");
            return Err(ProgramError::InvalidArgument);
        }
        if lottery_info.owner == program_id {
            msg!("Lottery account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let lottery = Lottery::new(*operator_info.key, ticket_cost, max_tickets)?;

        let rent = Rent::get()?;
        let rent_lamports = rent.minimum_balance(Lottery::LEN);
        let signer_seeds: &[&[&[u8]]] = &[&[LOTTERY_SEED, &[bump_seed]]];

        if lottery_info.lamports() == 0 {
            invoke_signed(
                &system_instruction::create_account(
                    operator_info.key,
                    lottery_info.key,
                    rent_lamports,
                    Lottery::LEN as u64,
                    program_id,
                ),
                &[
                    operator_info.clone(),
                    lottery_info.clone(),
                    system_program_info.clone(),
                ],
                signer_seeds,
            )?;
        } else {
            // Someone already sent lamports to the address, so create_account would
            // fail. Top it up to rent exemption, then allocate and assign in place.
            msg!("Lottery address is pre-funded with {} lamports", lottery_info.lamports());
            let shortfall = rent_lamports.saturating_sub(lottery_info.lamports());
            if shortfall > 0 {
                invoke(
                    &system_instruction::transfer(operator_info.key, lottery_info.key, shortfall),
                    &[
                        operator_info.clone(),
                        lottery_info.clone(),
                        system_program_info.clone(),
                    ],
                )?;
            }
            invoke_signed(
                &system_instruction::allocate(lottery_info.key, Lottery::LEN as u64),
                &[lottery_info.clone(), system_program_info.clone()],
                signer_seeds,
            )?;
            invoke_signed(
                &system_instruction::assign(lottery_info.key, program_id),
                &[lottery_info.clone(), system_program_info.clone()],
                signer_seeds,
            )?;
        }

        Lottery::pack(lottery, &mut lottery_info.data.borrow_mut())?;

        msg!(
            "Lottery initialized: Operator={}, TicketCost={}, MaxTickets={}",
            operator_info.key,
            ticket_cost,
            max_tickets
        );
        Ok(())
    }

    fn process_buy_ticket(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        num_tickets: u64,
        paid_amount: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let buyer_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !buyer_info.is_signer {
            msg!("Buyer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Self::load_lottery(program_id, lottery_info)?;
        let refund = lottery.buy_ticket(num_tickets, buyer_info.key, paid_amount)?;
        if refund > 0 && !buyer_info.is_writable {
            msg!("Buyer account must be writable to receive a refund of {} lamports", refund);
            return Err(LotteryError::TransferFailed.into());
        }

        if paid_amount > 0 {
            msg!(
                "Collecting {} lamports ({} SOL) from {}",
                paid_amount,
                lamports_to_sol(paid_amount),
                buyer_info.key
            );
            invoke(
                &system_instruction::transfer(buyer_info.key, lottery_info.key, paid_amount),
                &[
                    buyer_info.clone(),
                    lottery_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }

        if refund > 0 {
            msg!("Refunding {} lamports to {}", refund, buyer_info.key);
            utils::transfer_lamports(lottery_info, buyer_info, refund)?;
        }

        Lottery::pack(lottery.clone(), &mut lottery_info.data.borrow_mut())?;

        msg!(
            "Sold {} tickets to {}. Sold {}/{}",
            num_tickets,
            buyer_info.key,
            lottery.tickets_sold(),
            lottery.max_tickets
        );
        Ok(())
    }

    fn process_end_game(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        random_seed: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if !operator_info.is_signer {
            msg!("Operator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut lottery = Self::load_lottery(program_id, lottery_info)?;
        let winner = lottery.end_game(random_seed, operator_info.key)?;
        msg!("Random seed {} drew winner {}", random_seed, winner);

        if *winner_info.key != winner {
            msg!("Winner account {} does not hold the drawn ticket", winner_info.key);
            return Err(LotteryError::WinnerMismatch.into());
        }

        let prize = utils::pot_balance(lottery_info, &Rent::get()?);
        utils::transfer_lamports(lottery_info, winner_info, prize)?;

        // The reset only lands once the payout went through
        Lottery::pack(lottery, &mut lottery_info.data.borrow_mut())?;

        msg!(
            "Paid {} lamports ({} SOL) to {}. New round started",
            prize,
            lamports_to_sol(prize),
            winner
        );
        Ok(())
    }

    fn process_change_ticket_stuff(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        new_ticket_cost: u64,
        new_max_tickets: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;

        if !operator_info.is_signer {
            msg!("Operator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut lottery = Self::load_lottery(program_id, lottery_info)?;
        lottery.change_ticket_stuff(new_ticket_cost, new_max_tickets, operator_info.key)?;
        Lottery::pack(lottery, &mut lottery_info.data.borrow_mut())?;

        msg!(
            "Ticket cost set to {}, max tickets set to {}",
            new_ticket_cost,
            new_max_tickets
        );
        Ok(())
    }
}
