use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::errors::{LedgerError, LedgerResult};

/// Length of a recoverable resale proof: `r (32) || s (32) || v (1)`.
pub const PROOF_LEN: usize = 65;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive the `0x`-prefixed lowercase address for a public key: the low 20
/// bytes of Keccak-256 over the uncompressed point without its `0x04` tag.
pub fn address_from_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Recover the address that produced `proof` over `digest`.
///
/// `v` uses the Ethereum convention (27 or 28) and is normalized to a
/// recovery id by subtracting 27. Any malformed or unrecoverable proof is a
/// signature failure.
pub fn recover_proof_signer(digest: &[u8; 32], proof: &[u8]) -> LedgerResult<String> {
    if proof.len() != PROOF_LEN {
        return Err(LedgerError::BadSignature);
    }
    let v = proof[PROOF_LEN - 1];
    if v != 27 && v != 28 {
        return Err(LedgerError::BadSignature);
    }
    let recovery = RecoveryId::try_from(v - 27).map_err(|_| LedgerError::BadSignature)?;
    let signature =
        Signature::from_slice(&proof[..PROOF_LEN - 1]).map_err(|_| LedgerError::BadSignature)?;
    let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery)
        .map_err(|_| LedgerError::BadSignature)?;
    Ok(address_from_key(&key))
}

pub fn generate_keypair() -> SigningKey {
    SigningKey::random(&mut rand::thread_rng())
}

/// Sign `digest` with the owner key, producing the 65-byte recoverable
/// proof a reseller places in the successor transaction.
pub fn sign_proof(key: &SigningKey, digest: &[u8; 32]) -> LedgerResult<Vec<u8>> {
    let (signature, recovery) = key
        .sign_prehash_recoverable(digest)
        .map_err(|err| LedgerError::Crypto(err.to_string()))?;
    let mut proof = Vec::with_capacity(PROOF_LEN);
    proof.extend_from_slice(&signature.to_bytes());
    proof.push(27 + recovery.to_byte());
    Ok(proof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_known_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn sign_and_recover_roundtrip() {
        let key = generate_keypair();
        let digest = keccak256(b"ticket resale digest");
        let proof = sign_proof(&key, &digest).unwrap();
        assert_eq!(proof.len(), PROOF_LEN);
        assert!(proof[64] == 27 || proof[64] == 28);

        let signer = recover_proof_signer(&digest, &proof).unwrap();
        assert_eq!(signer, address_from_key(key.verifying_key()));
    }

    #[test]
    fn recover_pinned_signature() {
        let digest: [u8; 32] =
            hex::decode("7b18d23f5a5aa435d7ed1df1481dc3dae7c9e62f2a558269551639affebc43d6")
                .unwrap()
                .try_into()
                .unwrap();
        let proof = hex::decode(
            "900df4edfa44353238dd7aceb4d4dec705178e1dd198aae650033b6e602a4164\
             2a74fba153bca7b8bce9b5344daa6c54620587b4296d9acfbd697f9cfd85d483\
             1c",
        )
        .unwrap();
        let signer = recover_proof_signer(&digest, &proof).unwrap();
        assert_eq!(signer, "0x7805c321eaf86bc71d536124bada129874b3a5a8");
    }

    #[test]
    fn rejects_malformed_proofs() {
        let digest = keccak256(b"digest");
        assert!(matches!(
            recover_proof_signer(&digest, &[0u8; 64]),
            Err(LedgerError::BadSignature)
        ));

        let mut proof = vec![1u8; PROOF_LEN];
        proof[64] = 29;
        assert!(matches!(
            recover_proof_signer(&digest, &proof),
            Err(LedgerError::BadSignature)
        ));
    }

    #[test]
    fn pinned_key_derives_pinned_address() {
        let secret =
            hex::decode("75fbdeb1e4d4c473481e68703e8925fe9301c03880f11d298ee3fbea3f4f2b88")
                .unwrap();
        let key = SigningKey::from_slice(&secret).unwrap();
        assert_eq!(
            address_from_key(key.verifying_key()),
            "0x7805c321eaf86bc71d536124bada129874b3a5a8"
        );
    }
}
