use num_bigint::ParseBigIntError;
use thiserror::Error;

use crate::math::poseidon::MAX_HASH_INPUTS;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseFieldElementError {
    #[error("value is not a canonical BN254 scalar field element")]
    NotCanonical,

    #[error("expected 32 bytes, but got {0}")]
    InvalidNumBytes(usize),

    #[error("invalid integer literal")]
    ParseIntError(#[from] ParseBigIntError),
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum PoseidonError {
    #[error("input must contain at least one field element")]
    EmptyInput,

    #[error("at most {MAX_HASH_INPUTS} field elements can be hashed at once, but got {0}")]
    TooManyInputs(usize),

    #[error("non-canonical input")]
    NonCanonicalInput(#[from] ParseFieldElementError),
}
