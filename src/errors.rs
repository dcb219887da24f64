use std::io;

use thiserror::Error;

/// Response code reported to the consensus engine for accepted operations.
pub const CODE_OK: u32 = 0;
/// Response code for malformed transaction bytes or invalid hex fields.
pub const CODE_ENCODING_ERROR: u32 = 1;
/// Response code for ticket rule violations.
pub const CODE_TICKET_ERROR: u32 = 2;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Encoding(String),
    #[error("Ticket must have an address")]
    BadAddress,
    #[error("Ticket nonce must increase on resale")]
    BadNonce,
    #[error("Resale must be signed by the previous owner")]
    BadSignature,
    #[error("Ticket could not be found")]
    TicketNotFound,
    #[error("invalid merkle proof: {0}")]
    InvalidProof(String),
    #[error("cryptography error: {0}")]
    Crypto(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl LedgerError {
    /// Numeric code carried in consensus responses for this error.
    pub fn code(&self) -> u32 {
        match self {
            LedgerError::Encoding(_) => CODE_ENCODING_ERROR,
            LedgerError::BadAddress
            | LedgerError::BadNonce
            | LedgerError::BadSignature
            | LedgerError::TicketNotFound
            | LedgerError::InvalidProof(_) => CODE_TICKET_ERROR,
            LedgerError::Crypto(_) | LedgerError::Config(_) | LedgerError::Io(_) => {
                CODE_ENCODING_ERROR
            }
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
