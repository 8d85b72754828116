//! For easy importing of the crate's most used items.
//!
//! ```
//! use poseidon_bn254::prelude::*;
//! ```

pub use crate::error::ParseFieldElementError;
pub use crate::error::PoseidonError;
pub use crate::fe;
pub use crate::fe_array;
pub use crate::fe_vec;
pub use crate::math::field_element::FieldElement;
pub use crate::math::poseidon::Poseidon;
pub use crate::math::poseidon::PoseidonParameters;
pub use crate::math::poseidon::poseidon_bn254;
