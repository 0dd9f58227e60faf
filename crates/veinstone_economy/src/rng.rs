//! # Roll Seeding
//!
//! Every mining event gets its own `ChaCha8Rng`, seeded from SipHash-2-4
//! over the player id, the server tick and a monotonic nonce, keyed with a
//! server secret.
//!
//! ## Security Model
//!
//! ```text
//! Player knows:          Server adds:           Result:
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ Own player id   │ +  │ Server secret   │ =  │ Rolls cannot be │
//! │ Roughly the     │    │ Exact tick      │    │ predicted, but  │
//! │ time of day     │    │ Action nonce    │    │ can be replayed │
//! └─────────────────┘    └─────────────────┘    │ by the server   │
//!                                               └─────────────────┘
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use siphasher::sip128::{Hasher128, SipHasher24};
use std::hash::Hasher;

use crate::profile::PlayerId;

/// Derives one RNG per event.
#[derive(Clone)]
pub struct RollSeeder {
    /// Server-side secret (256 bits). NEVER exposed.
    secret: [u64; 4],
    /// Current server tick.
    tick: u64,
    /// Action nonce (monotonic, never reused).
    nonce: u64,
}

impl RollSeeder {
    /// Creates a seeder from 32 bytes of secret.
    ///
    /// Generate the secret with a CSPRNG and never log it.
    #[must_use]
    pub fn new(secret: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(secret.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_le_bytes(bytes);
        }
        Self {
            secret: words,
            tick: 0,
            nonce: 0,
        }
    }

    /// Creates a fixed seeder (NOT FOR PRODUCTION).
    #[must_use]
    pub const fn test_seeder() -> Self {
        Self {
            secret: [0x1234_5678_9ABC_DEF0, 0xFEDC_BA98_7654_3210,
                     0xAAAA_BBBB_CCCC_DDDD, 0x1111_2222_3333_4444],
            tick: 0,
            nonce: 0,
        }
    }

    /// Sets the server tick.
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// Current server tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Derives the RNG for the next event of a player.
    ///
    /// Consumes one nonce, so identical inputs never repeat a stream.
    ///
    /// # Algorithm
    ///
    /// ```text
    /// keys = secret halves mixed with tick and nonce
    /// seed = SipHash-2-4(keys; player, tick, nonce, lane) for lanes 0 and 1
    /// rng  = ChaCha8Rng::from_seed(seed)
    /// ```
    ///
    /// # Security
    ///
    /// A client that knows its player id and the tick still cannot predict
    /// the stream without the server secret. The server can replay any
    /// event from `(secret, player, tick, nonce)`.
    pub fn next_rng(&mut self, player: PlayerId) -> ChaCha8Rng {
        let nonce = self.nonce;
        self.nonce = self.nonce.wrapping_add(1);

        let k1 = self.secret[0].rotate_left(13) ^ self.secret[1] ^ self.tick;
        let k2 = self.secret[2].rotate_left(17) ^ self.secret[3] ^ nonce;

        let mut seed = [0u8; 32];
        for (lane, chunk) in seed.chunks_exact_mut(16).enumerate() {
            let mut hasher = SipHasher24::new_with_keys(k1, k2);
            hasher.write_u64(player);
            hasher.write_u64(self.tick);
            hasher.write_u64(nonce);
            hasher.write_usize(lane);
            let hash = hasher.finish128();
            chunk[..8].copy_from_slice(&hash.h1.to_le_bytes());
            chunk[8..].copy_from_slice(&hash.h2.to_le_bytes());
        }
        ChaCha8Rng::from_seed(seed)
    }
}

impl Default for RollSeeder {
    fn default() -> Self {
        Self::test_seeder()
    }
}

impl std::fmt::Debug for RollSeeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // NEVER expose the secret in debug output
        f.debug_struct("RollSeeder")
            .field("secret", &"[REDACTED]")
            .field("tick", &self.tick)
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// Bernoulli roll that tolerates any probability value.
///
/// Anything at or below zero (or NaN) never succeeds; anything at or above
/// one always does.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    if probability.is_nan() || probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.gen_bool(probability)
    }
}
