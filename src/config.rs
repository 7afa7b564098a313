//! Compile-time constants tying the field, group width, and input domain together.
//!
//! These are not deployment-site configuration — the field and domain are fixed
//! by the cryptographic design. There is no file or environment-variable layer here.

/// The field modulus: the largest prime below 2^64.
pub const PRIME: u64 = 18_446_744_073_709_551_557;

/// Group element / PRG seed width in bytes.
pub const LAMBDA: usize = 16;

/// Input domain bit width: thresholds and inputs are compared as 64-bit integers.
pub const ALPHA_BITS: u32 = 64;
