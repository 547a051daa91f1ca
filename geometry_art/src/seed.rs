// Seed sources for a performance.
//
// A performance is seeded exactly once, in one of two modes chosen by
// configuration (never as a fallback):
//
// - Derived: the hosting platform hands us a `PlatformIdentity` (transaction
//   hash + token id). Its concatenation is hashed with a 32-bit polynomial
//   hash, so the same identity always yields the same artwork.
// - Self-generated: no identity is available, so we mint an fxhash-style
//   token (`oo` + 49 base58 symbols). Two calls give two different tokens;
//   the only way to replay one is to persist the token and feed it back via
//   `SeedMode::Replay`.
//
// Either way the result is a `Seed`: the token string plus the numeric value
// that seeds `ArtRng`. The numeric value of every token, derived or minted,
// is `hash_to_seed(token)`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbols used for self-generated tokens (base58: no 0, O, I or l).
pub const TOKEN_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Fixed prefix of every self-generated token.
pub const TOKEN_PREFIX: &str = "oo";

/// Number of random symbols after the prefix.
pub const TOKEN_BODY_LEN: usize = 49;

/// Identity supplied by the minting platform. Created once per performance
/// and passed by value into seeding; nothing else reads or mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIdentity {
    pub transaction_hash: String,
    pub token_id: String,
}

impl PlatformIdentity {
    pub fn new(transaction_hash: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            transaction_hash: transaction_hash.into(),
            token_id: token_id.into(),
        }
    }

    /// The string that gets hashed: hash followed directly by token id.
    pub fn identity_string(&self) -> String {
        format!("{}{}", self.transaction_hash, self.token_id)
    }
}

/// How a performance obtains its seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedMode {
    /// Hash a platform-supplied identity.
    Derived(PlatformIdentity),
    /// Mint a fresh random token.
    SelfGenerated,
    /// Re-use a previously minted (and persisted) token.
    Replay(String),
}

/// The captured seed of one performance. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    token: String,
    value: u32,
}

impl Seed {
    /// Seed from an arbitrary token string.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let value = hash_to_seed(&token);
        Self { token, value }
    }

    /// Seed from a platform identity (derived mode).
    pub fn derived(identity: &PlatformIdentity) -> Self {
        Self::from_token(identity.identity_string())
    }

    /// Resolve a mode to a seed. `SelfGenerated` draws from the thread RNG,
    /// which is the only non-deterministic input anywhere in the crate.
    pub fn resolve(mode: &SeedMode) -> Self {
        Self::resolve_with(mode, &mut rand::rng())
    }

    /// Like `resolve`, with the entropy source supplied by the caller.
    pub fn resolve_with(mode: &SeedMode, entropy: &mut impl Rng) -> Self {
        match mode {
            SeedMode::Derived(identity) => Self::derived(identity),
            SeedMode::SelfGenerated => Self::from_token(generate_token(entropy)),
            SeedMode::Replay(token) => Self::from_token(token.clone()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.token, self.value)
    }
}

/// 32-bit polynomial string hash: `acc = acc * 31 + unit`, wrapping to two's
/// complement at every step, over UTF-16 code units. Returns the absolute
/// value; `i32::MIN` maps to 2^31, which is why the result is a `u32`.
pub fn hash_to_seed(s: &str) -> u32 {
    let hash = s
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(unit as i32));
    hash.unsigned_abs()
}

/// Mint a self-generated token: `oo` followed by 49 symbols drawn uniformly,
/// with replacement, from `TOKEN_ALPHABET`.
pub fn generate_token(entropy: &mut impl Rng) -> String {
    let mut token = String::with_capacity(TOKEN_PREFIX.len() + TOKEN_BODY_LEN);
    token.push_str(TOKEN_PREFIX);
    for _ in 0..TOKEN_BODY_LEN {
        let idx = entropy.random_range(0..TOKEN_ALPHABET.len());
        token.push(TOKEN_ALPHABET[idx] as char);
    }
    token
}
