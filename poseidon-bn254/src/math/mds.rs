//! Construction of the MDS matrix used in Poseidon's linear layer.
//!
//! The matrix is a Cauchy matrix M[i][j] = (x_i + y_j)⁻¹ over sampling points
//! x, y drawn from the [Grain keystream][crate::math::grain::GrainLfsr]
//! *after* the round constants. Cauchy matrices over a prime field are
//! maximum distance separable as long as all x_i and all y_j are pairwise
//! distinct and no x_i + y_j vanishes; with 254-bit samples, a violation is
//! unreachable in practice. The published matrices for every supported width
//! are pinned in the tests of [`poseidon`][crate::math::poseidon].

use itertools::Itertools;

use crate::math::field_element::FieldElement;
use crate::math::grain::GrainLfsr;

/// Sample a `state_size` × `state_size` Cauchy matrix from the keystream.
pub fn cauchy_matrix(lfsr: &mut GrainLfsr, state_size: usize) -> Vec<Vec<FieldElement>> {
    let xs = (0..state_size)
        .map(|_| lfsr.next_matrix_point())
        .collect_vec();
    let ys = (0..state_size)
        .map(|_| lfsr.next_matrix_point())
        .collect_vec();

    xs.iter()
        .map(|&x| ys.iter().map(|&y| (x + y).inverse()).collect_vec())
        .collect_vec()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use itertools::Itertools;
    use num_traits::Zero;

    use super::*;
    use crate::math::other::random_elements;

    fn sample_matrix(state_size: usize) -> Vec<Vec<FieldElement>> {
        let mut lfsr = GrainLfsr::new(state_size, 8, 56);
        cauchy_matrix(&mut lfsr, state_size)
    }

    #[test]
    fn matrix_is_square_with_nonzero_entries() {
        for state_size in [2, 3, 9, 17] {
            let matrix = sample_matrix(state_size);
            assert_eq!(state_size, matrix.len());
            for row in &matrix {
                assert_eq!(state_size, row.len());
                assert!(row.iter().all(|entry| !entry.is_zero()));
            }
        }
    }

    #[test]
    fn matrix_rows_are_pairwise_distinct() {
        let matrix = sample_matrix(9);
        assert!(matrix.iter().all_unique());
    }

    #[test]
    fn matrix_vector_multiplication_is_linear() {
        let state_size = 5;
        let matrix = sample_matrix(state_size);
        let multiply = |v: &[FieldElement]| {
            matrix
                .iter()
                .map(|row| row.iter().zip(v).map(|(&m, &s)| m * s).sum())
                .collect_vec()
        };

        let [a, b]: [FieldElement; 2] = random_elements(2).try_into().unwrap();
        let u: Vec<FieldElement> = random_elements(state_size);
        let v: Vec<FieldElement> = random_elements(state_size);
        let w = u
            .iter()
            .zip(&v)
            .map(|(&uu, &vv)| a * uu + b * vv)
            .collect_vec();

        let expected = multiply(&u)
            .iter()
            .zip(multiply(&v))
            .map(|(&mu, mv)| a * mu + b * mv)
            .collect_vec();
        assert_eq!(expected, multiply(&w));
    }
}
