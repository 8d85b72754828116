//! The Grain LFSR stream from the Poseidon reference parameter-generation
//! procedure.
//!
//! Poseidon's round constants and MDS sampling points are "nothing up my
//! sleeve" numbers: they are read from an 80-bit linear feedback shift
//! register that is seeded with the permutation's own parameters and filtered
//! through a shrinking generator. Reproducing the published parameter sets —
//! and hence the published hash values — requires following that procedure
//! bit for bit. To verify that this implementation does, see the tests
//! "first_round_constant_of_width_2_matches_published_value" and friends.

use crate::math::field_element::FieldElement;

/// Number of bits of the feedback shift register.
const STATE_BITS: u32 = 80;

/// Number of initial keystream bits discarded after seeding.
const WARMUP_STEPS: usize = 160;

/// Bit length of the BN254 scalar field modulus; every field element sample
/// draws this many bits.
const FIELD_BITS: usize = 254;

/// The keystream generator from which all Poseidon parameters are derived.
///
/// Bit `i` of `state` holds s_i; the feedback bit is
/// s_62 ⊕ s_51 ⊕ s_38 ⊕ s_23 ⊕ s_13 ⊕ s_0 and enters at position 79.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrainLfsr {
    state: u128,
}

impl GrainLfsr {
    /// Seed the register for a Poseidon instance over a prime field with the
    /// x⁵ S-box and the given state width and round counts.
    pub fn new(state_size: usize, num_full_rounds: usize, num_partial_rounds: usize) -> Self {
        fn pack(state: &mut u128, position: &mut u32, value: u64, width: u32) {
            let mut i = width;
            while i > 0 {
                i -= 1;
                if (value >> i) & 1 == 1 {
                    *state |= 1u128 << *position;
                }
                *position += 1;
            }
        }

        let mut state = 0u128;
        let mut position = 0u32;
        pack(&mut state, &mut position, 1, 2); // field type: prime field
        pack(&mut state, &mut position, 0, 4); // S-box: x^α
        pack(&mut state, &mut position, FIELD_BITS as u64, 12);
        pack(&mut state, &mut position, state_size as u64, 12);
        pack(&mut state, &mut position, num_full_rounds as u64, 10);
        pack(&mut state, &mut position, num_partial_rounds as u64, 10);
        pack(&mut state, &mut position, (1 << 30) - 1, 30);
        debug_assert_eq!(STATE_BITS, position);

        let mut lfsr = Self { state };
        for _ in 0..WARMUP_STEPS {
            lfsr.step();
        }
        lfsr
    }

    /// Advance the register by one step and return the feedback bit.
    fn step(&mut self) -> u64 {
        let s = self.state;
        let bit = ((s >> 62) ^ (s >> 51) ^ (s >> 38) ^ (s >> 23) ^ (s >> 13) ^ s) & 1;
        self.state = (s >> 1) | (bit << (STATE_BITS - 1));
        bit as u64
    }

    /// The next keystream bit, after shrinking: bits are consumed in pairs,
    /// and the second bit of a pair is emitted iff the first bit is 1.
    fn next_bit(&mut self) -> u64 {
        loop {
            let gate = self.step();
            let candidate = self.step();
            if gate == 1 {
                return candidate;
            }
        }
    }

    /// Draw [`FIELD_BITS`] keystream bits, most significant first.
    fn next_limbs(&mut self) -> [u64; 4] {
        let mut limbs = [0u64; 4];
        for _ in 0..FIELD_BITS {
            limbs[3] = (limbs[3] << 1) | (limbs[2] >> 63);
            limbs[2] = (limbs[2] << 1) | (limbs[1] >> 63);
            limbs[1] = (limbs[1] << 1) | (limbs[0] >> 63);
            limbs[0] = (limbs[0] << 1) | self.next_bit();
        }
        limbs
    }

    /// Sample a round constant: draw until the sample is canonical.
    pub fn next_round_constant(&mut self) -> FieldElement {
        loop {
            let limbs = self.next_limbs();
            if FieldElement::is_canonical(limbs) {
                return FieldElement::new(limbs);
            }
        }
    }

    /// Sample an MDS matrix point. The reference procedure reduces these
    /// samples mod p instead of rejecting them.
    pub fn next_matrix_point(&mut self) -> FieldElement {
        FieldElement::new(self.next_limbs())
    }
}
