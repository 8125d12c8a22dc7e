// Lottery Program - Instructions
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::utils::find_lottery_address;

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Create the lottery account. The signer becomes the operator for good.
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The operator, pays for the lottery account
    /// 1. `[writable]` The lottery account (PDA)
    /// 2. `[]` System program
    Initialize {
        /// Price of one ticket in lamports
        ticket_cost: u64,
        /// Tickets per round
        max_tickets: u64,
    },

    /// Buy tickets in the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The buyer
    /// 1. `[writable]` The lottery account (PDA)
    /// 2. `[]` System program
    BuyTicket {
        num_tickets: u64,
        /// Lamports attached to the purchase, anything above the price is refunded
        paid_amount: u64,
    },

    /// Draw the winner of a full round, pay out the pot and start a new round
    ///
    /// Accounts expected:
    /// 0. `[signer]` The operator
    /// 1. `[writable]` The lottery account (PDA)
    /// 2. `[writable]` The winner, must hold ticket `random_seed % max_tickets`
    EndGame { random_seed: u64 },

    /// Change ticket price and round size (operator only, between rounds)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The operator
    /// 1. `[writable]` The lottery account (PDA)
    ChangeTicketStuff {
        new_ticket_cost: u64,
        new_max_tickets: u64,
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        // Serializing plain integers into a Vec cannot fail
        self.try_to_vec().unwrap_or_default()
    }
}

/// Create initialize instruction
pub fn initialize(
    program_id: &Pubkey,
    operator: &Pubkey,
    ticket_cost: u64,
    max_tickets: u64,
) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::Initialize {
        ticket_cost,
        max_tickets,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*operator, true),
            AccountMeta::new(lottery, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// Create buy_ticket instruction
pub fn buy_ticket(
    program_id: &Pubkey,
    buyer: &Pubkey,
    num_tickets: u64,
    paid_amount: u64,
) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::BuyTicket {
        num_tickets,
        paid_amount,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*buyer, true),
            AccountMeta::new(lottery, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// Create end_game instruction
pub fn end_game(
    program_id: &Pubkey,
    operator: &Pubkey,
    winner: &Pubkey,
    random_seed: u64,
) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::EndGame { random_seed }.pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*operator, true),
            AccountMeta::new(lottery, false),
            AccountMeta::new(*winner, false),
        ],
        data,
    }
}

/// Create change_ticket_stuff instruction
pub fn change_ticket_stuff(
    program_id: &Pubkey,
    operator: &Pubkey,
    new_ticket_cost: u64,
    new_max_tickets: u64,
) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let data = LotteryInstruction::ChangeTicketStuff {
        new_ticket_cost,
        new_max_tickets,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*operator, true),
            AccountMeta::new(lottery, false),
        ],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_layout_is_tag_then_le_fields() {
        let data = LotteryInstruction::BuyTicket {
            num_tickets: 2,
            paid_amount: 7,
        }
        .pack();
        assert_eq!(data.len(), 17);
        assert_eq!(data[0], 1);
        assert_eq!(&data[1..9], &2u64.to_le_bytes());
        assert_eq!(&data[9..], &7u64.to_le_bytes());

        let data = LotteryInstruction::EndGame { random_seed: 25 }.pack();
        assert_eq!(data, [&[2u8][..], &25u64.to_le_bytes()[..]].concat());
        assert_eq!(
            LotteryInstruction::unpack(&data).unwrap(),
            LotteryInstruction::EndGame { random_seed: 25 }
        );
    }

    #[test]
    fn unpack_rejects_malformed_data() {
        assert_eq!(
            LotteryInstruction::unpack(&[]),
            Err(ProgramError::InvalidInstructionData)
        );
        assert_eq!(
            LotteryInstruction::unpack(&[9, 0, 0]),
            Err(ProgramError::InvalidInstructionData)
        );
        // Truncated u64
        assert_eq!(
            LotteryInstruction::unpack(&[2, 1, 2, 3]),
            Err(ProgramError::InvalidInstructionData)
        );
        // Trailing bytes
        let mut data = LotteryInstruction::EndGame { random_seed: 1 }.pack();
        data.push(0);
        assert_eq!(
            LotteryInstruction::unpack(&data),
            Err(ProgramError::InvalidInstructionData)
        );
    }

    #[test]
    fn builders_target_the_lottery_pda() {
        let program_id = Pubkey::new_unique();
        let operator = Pubkey::new_unique();
        let winner = Pubkey::new_unique();
        let (lottery, _) = find_lottery_address(&program_id);

        let ix = end_game(&program_id, &operator, &winner, 3);
        assert_eq!(ix.program_id, program_id);
        assert_eq!(ix.accounts[0], AccountMeta::new_readonly(operator, true));
        assert_eq!(ix.accounts[1], AccountMeta::new(lottery, false));
        assert_eq!(ix.accounts[2], AccountMeta::new(winner, false));

        let ix = buy_ticket(&program_id, &operator, 1, 1);
        assert_eq!(ix.accounts[2].pubkey, system_program::id());
    }
}
