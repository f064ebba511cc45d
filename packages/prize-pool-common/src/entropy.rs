use cosmwasm_std::{Uint128, Uint256};
use sha2::{Digest, Sha256};

/// Domain tag prefixed to every reveal authorization digest.
const REWARD_DOMAIN: &[u8] = b"prize-pool/reward-and-commit/v1";

/// Commitment published at commit time: `sha256(secret)`.
pub fn secret_commitment(secret: &[u8; 32]) -> [u8; 32] {
    Sha256::digest(secret).into()
}

/// `entropy = block_hash XOR secret`
pub fn derive_entropy(block_hash: &[u8; 32], secret: &[u8; 32]) -> [u8; 32] {
    let mut entropy = [0u8; 32];
    for (i, byte) in entropy.iter_mut().enumerate() {
        *byte = block_hash[i] ^ secret[i];
    }
    entropy
}

/// Reduce 256-bit big-endian entropy into `[0, total)`.
///
/// Returns `None` when `total` is zero: there is nothing to select from.
pub fn reduce_entropy(entropy: &[u8; 32], total: u128) -> Option<u128> {
    if total == 0 {
        return None;
    }
    let reduced = Uint256::from_be_bytes(*entropy) % Uint256::from(total);
    Uint128::try_from(reduced).ok().map(|v| v.u128())
}

/// Message signed by the pool's registered signer to authorize a reveal.
///
/// `digest = sha256( domain || draw_id_u64_be || block_hash || secret )`
pub fn reward_digest(draw_id: u64, block_hash: &[u8; 32], secret: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(REWARD_DOMAIN);
    hasher.update(draw_id.to_be_bytes());
    hasher.update(block_hash);
    hasher.update(secret);
    hasher.finalize().into()
}

/// Decode a hex string that must hold exactly 32 bytes.
pub fn decode_hash32(value: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(value).ok()?;
    bytes.try_into().ok()
}

/// Big-endian 32-byte encoding of `value`, handy for building entropy by hand.
pub fn entropy_from_u128(value: u128) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[16..].copy_from_slice(&value.to_be_bytes());
    bytes
}
