use serde::{Deserialize, Serialize};

/// On-wire ticket transaction submitted through the consensus engine.
///
/// `ownerAddr` is a `0x`-prefixed 20-byte hex address; `prevOwnerProof` is a
/// `0x`-prefixed 65-byte recoverable signature, empty or `"0x"` for an
/// originating sale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTx {
    pub id: u64,
    pub nonce: u64,
    pub details: String,
    pub owner_addr: String,
    #[serde(default)]
    pub prev_owner_proof: String,
}

/// Latest accepted transaction for a ticket id together with the block
/// heights at which the ticket changed hands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "ticketTx")]
    pub tx: TicketTx,
    #[serde(rename = "changeHeights")]
    pub change_heights: Vec<u64>,
}

/// Payload returned by the `ticket` query path: the ticket as of the
/// resolved height plus its inclusion proof in that block's tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketProofResponse {
    pub ticket: Ticket,
    #[serde(rename = "merkleProof")]
    pub merkle_proof: Vec<String>,
    pub index: Vec<u8>,
}
