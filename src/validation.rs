use crate::codec;
use crate::crypto;
use crate::errors::{LedgerError, LedgerResult};
use crate::types::TicketTx;

/// Check `next` against the current record for the same id. `prev` is the
/// zero-value transaction when the id has never been seen.
///
/// Rules run in order and the first failure wins: the ticket must carry an
/// owner address, the nonce must strictly increase, and a resale must be
/// signed by the previous owner over the previous ticket's canonical hash.
/// An originating sale (no prior owner) is accepted regardless of its
/// `prevOwnerProof`.
pub fn validate(next: &TicketTx, prev: &TicketTx) -> LedgerResult<()> {
    if next.owner_addr.is_empty() {
        return Err(LedgerError::BadAddress);
    }
    if next.nonce <= prev.nonce {
        return Err(LedgerError::BadNonce);
    }
    if prev.owner_addr.is_empty() {
        return Ok(());
    }

    let prev_hash = codec::canonical_hash(prev)?;
    let proof = codec::decode_proof(&next.prev_owner_proof)?;
    let signer = crypto::recover_proof_signer(&prev_hash, &proof)?;
    if signer != prev.owner_addr.to_lowercase() {
        return Err(LedgerError::BadSignature);
    }
    Ok(())
}
