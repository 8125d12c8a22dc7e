// Lottery Program - State
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::{
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::error::LotteryError;

/// Seed of the program derived address holding the lottery state and its pot
pub const LOTTERY_SEED: &[u8] = b"lottery";

/// Upper bound on tickets per round, fixes the size of the lottery account
pub const MAX_PLAYERS: usize = 256;

const PLAYER_SLOTS_LEN: usize = MAX_PLAYERS * 32;

/// Phase of the current round, derived from `tickets_available`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// Tickets remain to be sold
    Selling,
    /// Every ticket is sold, the round is ready to draw
    Full,
}

/// Lottery account data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lottery {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Sole account allowed to draw and reconfigure, fixed at creation
    pub operator: Pubkey,
    /// Price of one ticket in lamports
    pub ticket_cost: u64,
    /// Tickets per round, also the modulus of the draw
    pub max_tickets: u64,
    /// Tickets left in the current round
    pub tickets_available: u64,
    /// Ticket ledger for the current round, `players[i]` bought ticket `i`
    pub players: Vec<Pubkey>,
}

fn validate_max_tickets(max_tickets: u64) -> Result<(), LotteryError> {
    if max_tickets == 0 || max_tickets > MAX_PLAYERS as u64 {
        return Err(LotteryError::InvalidConfiguration);
    }
    Ok(())
}

impl Lottery {
    /// Create the storage of a fresh lottery with an empty first round
    pub fn new(operator: Pubkey, ticket_cost: u64, max_tickets: u64) -> Result<Self, LotteryError> {
        validate_max_tickets(max_tickets)?;
        Ok(Self {
            is_initialized: true,
            operator,
            ticket_cost,
            max_tickets,
            tickets_available: max_tickets,
            players: Vec::with_capacity(max_tickets as usize),
        })
    }

    pub fn phase(&self) -> RoundPhase {
        if self.tickets_available == 0 {
            RoundPhase::Full
        } else {
            RoundPhase::Selling
        }
    }

    pub fn tickets_sold(&self) -> u64 {
        self.max_tickets - self.tickets_available
    }

    /// Ticket holder drawn by `random_seed`, once the round is full
    pub fn draw_winner(&self, random_seed: u64) -> Option<Pubkey> {
        if self.phase() != RoundPhase::Full {
            return None;
        }
        let winner_index = random_seed.checked_rem(self.max_tickets)?;
        self.players.get(winner_index as usize).copied()
    }

    /// Sell `num_tickets` tickets to `caller`, who attached `paid_amount` lamports.
    ///
    /// Every precondition is checked before anything is written, so a failed purchase
    /// leaves the state untouched. Returns the surplus that must be refunded to `caller`.
    pub fn buy_ticket(
        &mut self,
        num_tickets: u64,
        caller: &Pubkey,
        paid_amount: u64,
    ) -> Result<u64, LotteryError> {
        if num_tickets == 0 {
            return Err(LotteryError::InvalidTicketCount);
        }
        // An overflowing total can never be covered by a u64 payment
        let total_cost = num_tickets
            .checked_mul(self.ticket_cost)
            .ok_or(LotteryError::InsufficientPayment)?;
        if paid_amount < total_cost {
            return Err(LotteryError::InsufficientPayment);
        }
        if self.tickets_available < num_tickets {
            return Err(LotteryError::InsufficientSupply);
        }
        if self.tickets_available == 0 {
            return Err(LotteryError::SoldOut);
        }

        // num_tickets <= tickets_available <= MAX_PLAYERS
        self.players
            .extend(std::iter::repeat(*caller).take(num_tickets as usize));
        self.tickets_available -= num_tickets;

        Ok(paid_amount - total_cost)
    }

    /// Draw the winner of a full round and start the next one.
    ///
    /// Returns the address the whole pot must be paid to. The caller is responsible
    /// for only persisting the reset once that payout went through. A full round that
    /// does not hold `max_tickets` entries is corrupt storage, not a caller error.
    pub fn end_game(&mut self, random_seed: u64, caller: &Pubkey) -> Result<Pubkey, ProgramError> {
        if self.tickets_available != 0 {
            return Err(LotteryError::RoundInProgress.into());
        }
        if *caller != self.operator {
            return Err(LotteryError::Unauthorized.into());
        }
        let winner = self
            .draw_winner(random_seed)
            .ok_or(ProgramError::InvalidAccountData)?;

        self.players.clear();
        self.tickets_available = self.max_tickets;

        Ok(winner)
    }

    /// Change price and round size between rounds
    pub fn change_ticket_stuff(
        &mut self,
        new_ticket_cost: u64,
        new_max_tickets: u64,
        caller: &Pubkey,
    ) -> Result<(), LotteryError> {
        if *caller != self.operator {
            return Err(LotteryError::Unauthorized);
        }
        if self.tickets_available != self.max_tickets {
            return Err(LotteryError::RoundInProgress);
        }
        validate_max_tickets(new_max_tickets)?;

        self.ticket_cost = new_ticket_cost;
        self.max_tickets = new_max_tickets;
        self.tickets_available = new_max_tickets;
        Ok(())
    }
}

impl Sealed for Lottery {}

impl IsInitialized for Lottery {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Lottery {
    const LEN: usize = 1 + 32 + 8 + 8 + 8 + PLAYER_SLOTS_LEN;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Lottery::LEN];
        let (is_initialized, operator, ticket_cost, max_tickets, tickets_available, player_slots) =
            array_refs![src, 1, 32, 8, 8, 8, PLAYER_SLOTS_LEN];

        let is_initialized = match is_initialized {
            [0] => false,
            [1] => true,
            _ => return Err(ProgramError::InvalidAccountData),
        };
        let max_tickets = u64::from_le_bytes(*max_tickets);
        let tickets_available = u64::from_le_bytes(*tickets_available);

        if max_tickets > MAX_PLAYERS as u64
            || tickets_available > max_tickets
            || (is_initialized && max_tickets == 0)
        {
            return Err(ProgramError::InvalidAccountData);
        }

        let sold = (max_tickets - tickets_available) as usize;
        let players = player_slots
            .chunks_exact(32)
            .take(sold)
            .map(|slot| Pubkey::new_from_array(*array_ref![slot, 0, 32]))
            .collect();

        Ok(Lottery {
            is_initialized,
            operator: Pubkey::new_from_array(*operator),
            ticket_cost: u64::from_le_bytes(*ticket_cost),
            max_tickets,
            tickets_available,
            players,
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Lottery::LEN];
        let (
            is_initialized_dst,
            operator_dst,
            ticket_cost_dst,
            max_tickets_dst,
            tickets_available_dst,
            player_slots_dst,
        ) = mut_array_refs![dst, 1, 32, 8, 8, 8, PLAYER_SLOTS_LEN];

        is_initialized_dst[0] = self.is_initialized as u8;
        operator_dst.copy_from_slice(self.operator.as_ref());
        *ticket_cost_dst = self.ticket_cost.to_le_bytes();
        *max_tickets_dst = self.max_tickets.to_le_bytes();
        *tickets_available_dst = self.tickets_available.to_le_bytes();

        player_slots_dst.fill(0);
        for (slot, player) in player_slots_dst.chunks_exact_mut(32).zip(&self.players) {
            slot.copy_from_slice(player.as_ref());
        }
    }
}
