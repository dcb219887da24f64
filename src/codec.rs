use primitive_types::U256;

use crate::crypto::keccak256;
use crate::errors::{LedgerError, LedgerResult};
use crate::types::TicketTx;

/// Byte length of a decoded owner address.
pub const ADDRESS_LEN: usize = 20;

/// Parse consensus-delivered bytes into a ticket transaction.
///
/// Unknown JSON fields are ignored and a missing `prevOwnerProof` is
/// treated as empty. Hex-encoded fields are checked here so the later
/// stages can decode them without failing: `ownerAddr` must be empty or a
/// `0x`-prefixed 20-byte value, `prevOwnerProof` empty or valid hex.
pub fn parse_tx(raw: &[u8]) -> LedgerResult<TicketTx> {
    let tx: TicketTx =
        serde_json::from_slice(raw).map_err(|err| LedgerError::Encoding(err.to_string()))?;
    if !tx.owner_addr.is_empty() {
        decode_address(&tx.owner_addr)?;
    }
    decode_proof(&tx.prev_owner_proof)?;
    Ok(tx)
}

/// Decode a `0x`-prefixed 20-byte address.
pub fn decode_address(value: &str) -> LedgerResult<[u8; ADDRESS_LEN]> {
    let bytes = decode_hex(value, "ownerAddr")?;
    if bytes.len() != ADDRESS_LEN {
        return Err(LedgerError::Encoding(format!(
            "ownerAddr must encode exactly {ADDRESS_LEN} bytes"
        )));
    }
    let mut address = [0u8; ADDRESS_LEN];
    address.copy_from_slice(&bytes);
    Ok(address)
}

/// Decode a `0x`-prefixed proof. An empty string and a bare `"0x"` are
/// both the empty proof of an originating sale.
pub fn decode_proof(value: &str) -> LedgerResult<Vec<u8>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    decode_hex(value, "prevOwnerProof")
}

fn decode_hex(value: &str, label: &str) -> LedgerResult<Vec<u8>> {
    let stripped = value
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::Encoding(format!("{label} must be 0x-prefixed hex")))?;
    hex::decode(stripped)
        .map_err(|err| LedgerError::Encoding(format!("invalid {label} encoding: {err}")))
}

/// Keccak-256 over the ABI-style packed tuple
/// `(uint256 id, uint256 nonce, string details, address ownerAddr,
/// bytes prevOwnerProof)`.
///
/// This digest doubles as the Merkle leaf hash and as the signing digest a
/// previous owner commits to when authorizing a resale.
pub fn canonical_hash(tx: &TicketTx) -> LedgerResult<[u8; 32]> {
    let mut data = Vec::new();
    data.extend_from_slice(&pack_uint256(tx.id)?);
    data.extend_from_slice(&pack_uint256(tx.nonce)?);
    data.extend_from_slice(tx.details.as_bytes());
    data.extend_from_slice(&decode_address(&tx.owner_addr)?);
    data.extend_from_slice(&decode_proof(&tx.prev_owner_proof)?);
    Ok(keccak256(&data))
}

/// Pack a counter as a 32-byte big-endian `uint256`, going through its
/// decimal string rendering. Conforming signers hand decimal strings to
/// their ABI packer, so the round-trip must stay in place for their
/// digests to match ours.
fn pack_uint256(value: u64) -> LedgerResult<[u8; 32]> {
    let parsed = U256::from_dec_str(&value.to_string())
        .map_err(|err| LedgerError::Encoding(format!("invalid uint256 literal: {err}")))?;
    let mut packed = [0u8; 32];
    parsed.to_big_endian(&mut packed);
    Ok(packed)
}
