// Seeded pseudo-randomness for layout perturbation. The same key always yields
// the same sequence, so identical trees produce bit-identical layouts.

const FNV1A_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV1A_PRIME: u64 = 0x0100_0000_01b3;
/// Replaces a zero seed, which would lock xorshift at zero forever.
const ZERO_SEED_FALLBACK: u64 = 0x9e37_79b9_7f4a_7c15;

pub fn fnv1a(key: &str) -> u64 {
    let mut hash = FNV1A_OFFSET;
    for byte in key.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV1A_PRIME);
    }
    hash
}

/// xorshift64* generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jitter {
    state: u64,
}

impl Jitter {
    pub fn seed(key: &str) -> Self {
        let state = match fnv1a(key) {
            0 => ZERO_SEED_FALLBACK,
            hash => hash,
        };
        Self { state }
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        let mixed = x.wrapping_mul(0x2545_f491_4f6c_dd1d);
        // Top 24 bits fit an f32 mantissa exactly.
        (mixed >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in `[-1, 1)`.
    pub fn next_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }
}
