//! Cache key derivation.

use sha2::{Digest, Sha256};

const GENERATION_PREFIX: &str = "generation";

/// Deterministic key for a generation result of `prompt` scoped to `owner_id`.
pub fn generation_key(owner_id: &str, prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    format!("{GENERATION_PREFIX}:{owner_id}:{}", hex::encode(digest))
}
