use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Hashes opaque bearer tokens with HMAC-SHA-256 before they touch the
/// store, so raw tokens are never persisted or compared directly.
/// Token issuance happens outside this system; the service only ever
/// verifies presented tokens by hashed lookup.
pub struct TokenHasher {
    key: Zeroizing<Vec<u8>>,
}

impl TokenHasher {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: Zeroizing::new(key.as_ref().to_vec()),
        }
    }

    /// Hex digest of the token, suitable for storage and lookup.
    pub fn hash(&self, token: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC-SHA-256 accepts keys of any size");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHasher").finish_non_exhaustive()
    }
}
