use anchor_lang::prelude::*;
use instructions::*;
use state::RaffleParams;

pub mod draw;
pub mod error;
pub mod instructions;
pub mod state;
pub mod token;

declare_id!("CbfdT5nMML6th7FeJzkcb1kAaBxsRbjnjKJj4BVfr5pA");

#[program]
pub mod raffler {
    use super::*;

    pub fn init_factory(ctx: Context<InitFactory>) -> Result<()> {
        instructions::init_factory::init_factory(ctx)
    }

    pub fn deploy_raffle(
        ctx: Context<DeployRaffle>,
        params: RaffleParams,
        cost_amount: u64,
        prize_amount: u64,
    ) -> Result<()> {
        instructions::deploy_raffle::deploy_raffle(ctx, params, cost_amount, prize_amount)
    }

    pub fn create_rafflable(
        ctx: Context<CreateRafflable>,
        nonce: u64,
        params: RaffleParams,
    ) -> Result<()> {
        instructions::create_rafflable::create_rafflable(ctx, nonce, params)
    }

    pub fn create_raffler(ctx: Context<CreateRaffler>, rafflable: Pubkey) -> Result<()> {
        instructions::create_raffler::create_raffler(ctx, rafflable)
    }

    pub fn set_raffler(ctx: Context<SetRaffler>) -> Result<()> {
        instructions::set_raffler::set_raffler(ctx)
    }

    pub fn configure_cost(ctx: Context<ConfigureCost>, amount: u64) -> Result<()> {
        instructions::configure_cost::configure_cost(ctx, amount)
    }

    pub fn configure_prize(ctx: Context<ConfigurePrize>, amount: u64) -> Result<()> {
        instructions::configure_prize::configure_prize(ctx, amount)
    }

    pub fn fund_prize(ctx: Context<FundPrize>, amount: u64) -> Result<()> {
        instructions::fund_prize::fund_prize(ctx, amount)
    }

    pub fn mint_ticket(ctx: Context<MintTicket>) -> Result<()> {
        instructions::mint_ticket::mint_ticket(ctx)
    }

    pub fn add_entry(ctx: Context<AddEntry>, ticket_id: u64, weight: u64) -> Result<()> {
        instructions::add_entry::add_entry(ctx, ticket_id, weight)
    }

    pub fn draw(ctx: Context<DrawRound>, seed: [u8; 32]) -> Result<()> {
        instructions::draw_round::draw_round(ctx, seed)
    }

    pub fn withdraw_proceeds(ctx: Context<WithdrawProceeds>, amount: u64) -> Result<()> {
        instructions::withdraw_proceeds::withdraw_proceeds(ctx, amount)
    }
}
