pub mod field_element;
pub mod grain;
pub mod mds;
pub mod other;
pub mod poseidon;
