use anchor_lang::error_code;

#[error_code]
pub enum RaffleError {
    Overflow,
    #[msg("All tickets of this raffle have been minted")]
    SupplyExhausted,
    #[msg("The hat holds no weight to draw from")]
    EmptyHat,
    #[msg("Entry weight must be greater than zero")]
    InvalidWeight,
    #[msg("Signer is not allowed to perform this action")]
    NotAuthorized,
    #[msg("Payer cannot cover the ticket cost")]
    InsufficientFunds,
    #[msg("Escrow holds less than the requested amount")]
    InsufficientEscrowBalance,
    #[msg("Prize payout failed, the round was not finalized")]
    PayoutFailed,
    #[msg("Round has not been drawn yet")]
    RoundNotFound,
    #[msg("Ticket ledger is already wired to a raffler")]
    AlreadyWired,
    #[msg("Raffler already holds entries and cannot be wired to a ledger")]
    EngineInUse,
    #[msg("Ticket ledger has no raffler to register entries with")]
    EngineNotWired,
    #[msg("Ticket sale is still timelocked")]
    SaleNotStarted,
    #[msg("Supply cap must be greater than zero")]
    InvalidSupply,
    #[msg("Ticket name exceeds 32 bytes")]
    NameTooLong,
    #[msg("Ticket symbol exceeds 10 bytes")]
    SymbolTooLong,
    #[msg("Metadata URI exceeds 200 bytes")]
    MetadataUriTooLong,
    #[msg("Invalid metadata URI format")]
    InvalidMetadataUri,
    #[msg("No token account was supplied for this holder and mint")]
    TokenAccountMissing,
    #[msg("Mint does not match the escrow configuration")]
    InvalidMint,
    #[msg("Ticket does not belong to this raffler")]
    InvalidTicket,
    #[msg("Raffler account has no room for another entry")]
    HatFull,
    #[msg("Invalid slot hashes sysvar account")]
    InvalidSlotHashesAccount,
}

/// Name of the error carried by a failed result, for assertions in tests.
#[cfg(test)]
pub(crate) fn error_name<T: std::fmt::Debug>(result: anchor_lang::Result<T>) -> String {
    match result.expect_err("operation should have failed") {
        anchor_lang::error::Error::AnchorError(err) => err.error_name,
        anchor_lang::error::Error::ProgramError(err) => format!("{:?}", err.program_error),
    }
}
