use std::fmt;
use std::fmt::Formatter;
use std::iter::Sum;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Div;
use std::ops::Mul;
use std::ops::MulAssign;
use std::ops::Neg;
use std::ops::Sub;
use std::ops::SubAssign;
use std::str::FromStr;

use arbitrary::Arbitrary;
use arbitrary::Unstructured;
use get_size2::GetSize;
use num_bigint::BigInt;
use num_bigint::BigUint;
use num_bigint::Sign;
use num_traits::ConstOne;
use num_traits::ConstZero;
use num_traits::One;
use num_traits::Zero;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::StandardUniform;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ParseFieldElementError;

/// Element of the BN254 scalar field ℤ_p, where
/// p = 21888242871839275222246405745257275088548364400416034343698204186575808495617.
///
/// In Montgomery representation with R = 2^256, held as four little-endian
/// 64-bit limbs. The raw representation is kept strictly below p at all times;
/// every arithmetic operation reduces its result.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, GetSize)]
#[repr(transparent)]
pub struct FieldElement([u64; 4]);

/// Simplifies constructing [field element][FieldElement]s.
///
/// The type [`FieldElement`] must be in scope for this macro to work.
/// See [`FieldElement::from`] for supported types.
///
/// # Examples
///
/// ```
/// # use poseidon_bn254::prelude::*;
/// let a = fe!(42);
/// let b = fe!(-12); // correctly translates to `-FieldElement::from(12)`
/// let c = fe!(42 - 12);
/// assert_eq!(a + b, c);
/// ```
#[macro_export]
macro_rules! fe {
    ($value:expr) => {
        FieldElement::from($value)
    };
}

/// Simplifies constructing vectors of [field element][FieldElement]s.
///
/// The type [`FieldElement`] must be in scope for this macro to work. See also
/// [`fe!`].
///
/// # Examples
///
/// ```
/// # use poseidon_bn254::prelude::*;
/// let a = fe_vec![1, 2, 3];
/// let b = vec![fe!(1), fe!(2), fe!(3)];
/// assert_eq!(a, b);
/// ```
#[macro_export]
macro_rules! fe_vec {
    ($value:expr; $n:expr) => {
        vec![FieldElement::from($value); $n]
    };
    ($($value:expr),* $(,)?) => {
        vec![$(FieldElement::from($value)),*]
    };
}

/// Simplifies constructing arrays of [field element][FieldElement]s.
///
/// The type [`FieldElement`] must be in scope for this macro to work. See also
/// [`fe!`].
///
/// # Examples
///
/// ```
/// # use poseidon_bn254::prelude::*;
/// let a = fe_array![1, 2, 3];
/// let b = [fe!(1), fe!(2), fe!(3)];
/// assert_eq!(a, b);
/// ```
#[macro_export]
macro_rules! fe_array {
    ($value:expr; $n:expr) => {
        [FieldElement::from($value); $n]
    };
    ($($value:expr),* $(,)?) => {
        [$(FieldElement::from($value)),*]
    };
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldElement")
            .field(&BigUint::from(self))
            .finish()
    }
}

impl fmt::LowerHex for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&BigUint::from(self), f)
    }
}

impl fmt::UpperHex for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&BigUint::from(self), f)
    }
}

impl<'a> Arbitrary<'a> for FieldElement {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        u.arbitrary().map(FieldElement::new)
    }
}

impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut bytes: [u8; Self::BYTES] = (*self).into();
        bytes.reverse();
        hex::encode(bytes).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        let mut bytes = hex::decode(hex_string).map_err(serde::de::Error::custom)?;
        bytes.reverse();
        Self::try_from(bytes.as_slice()).map_err(serde::de::Error::custom)
    }
}

impl Sum for FieldElement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.reduce(|a, b| a + b).unwrap_or_else(FieldElement::zero)
    }
}

impl FieldElement {
    pub const BYTES: usize = 32;

    /// The scalar field's prime modulus p, as little-endian limbs.
    pub const P: [u64; 4] = [
        0x43e1f593f0000001,
        0x2833e84879b97091,
        0xb85045b68181585d,
        0x30644e72e131a029,
    ];

    /// p − 1, the largest canonical value.
    pub const MAX: Self = Self::new([
        0x43e1f593f0000000,
        0x2833e84879b97091,
        0xb85045b68181585d,
        0x30644e72e131a029,
    ]);

    /// p − 2, the exponent used for inversion by Fermat's little theorem.
    const P_MINUS_2: [u64; 4] = [
        0x43e1f593efffffff,
        0x2833e84879b97091,
        0xb85045b68181585d,
        0x30644e72e131a029,
    ];

    /// R² mod p; used for conversion of values into Montgomery representation.
    const R2: [u64; 4] = [
        0x1bb8e645ae216da7,
        0x53fe3ab1e35c59e3,
        0x8c49833d53bb8085,
        0x0216d0b17f4e44a5,
    ];

    /// −p⁻¹ mod 2^64; the Montgomery reduction constant.
    const INV: u64 = 0xc2e1f593efffffff;

    /// Interpret four little-endian limbs as an integer and convert it into a
    /// field element. Values of p and above are reduced.
    #[inline]
    pub const fn new(value: [u64; 4]) -> Self {
        Self(Self::mont_mul(value, Self::R2))
    }

    /// Construct a new field element iff the given value is
    /// [canonical][Self::is_canonical], an error otherwise.
    pub const fn try_new(value: [u64; 4]) -> Result<Self, ParseFieldElementError> {
        if Self::is_canonical(value) {
            Ok(Self::new(value))
        } else {
            Err(ParseFieldElementError::NotCanonical)
        }
    }

    /// The canonical value in [0, p), as little-endian limbs.
    #[inline]
    pub const fn value(&self) -> [u64; 4] {
        self.canonical_representation()
    }

    /// The prime modulus p.
    pub fn modulus() -> BigUint {
        Self::limbs_to_biguint(Self::P)
    }

    #[inline]
    pub const fn is_canonical(value: [u64; 4]) -> bool {
        !Self::geq(value, Self::P)
    }

    #[must_use]
    #[inline]
    pub const fn square(self) -> Self {
        Self(Self::mont_mul(self.0, self.0))
    }

    /// The Poseidon S-box, x ↦ x⁵ mod p.
    ///
    /// Computed as (x²)² · x: two squarings and one multiplication.
    #[must_use]
    #[inline]
    pub const fn pow5(self) -> Self {
        let sq = self.square();
        Self(Self::mont_mul(sq.square().0, self.0))
    }

    #[must_use]
    pub const fn mod_pow(&self, exponent: [u64; 4]) -> Self {
        let mut acc = Self::ONE;
        let mut limb = 4;
        while limb > 0 {
            limb -= 1;
            let mut bit = 64;
            while bit > 0 {
                bit -= 1;
                acc = acc.square();
                if (exponent[limb] >> bit) & 1 == 1 {
                    acc = Self(Self::mont_mul(acc.0, self.0));
                }
            }
        }
        acc
    }

    #[must_use]
    pub const fn mod_pow_u64(&self, exponent: u64) -> Self {
        self.mod_pow([exponent, 0, 0, 0])
    }

    #[must_use]
    #[inline]
    pub fn inverse(&self) -> Self {
        assert_ne!(
            *self,
            Self::ZERO,
            "Attempted to find the multiplicative inverse of zero."
        );

        self.mod_pow(Self::P_MINUS_2)
    }

    /// Return the raw limbs of the Montgomery representation, in little-endian
    /// limb order.
    #[inline]
    pub const fn raw_limbs(&self) -> [u64; 4] {
        self.0
    }

    /// Interpret four limbs as a Montgomery representation and cast them to a
    /// field element. The limbs must stem from [`raw_limbs`][Self::raw_limbs].
    #[inline]
    pub const fn from_raw_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    #[inline]
    const fn canonical_representation(&self) -> [u64; 4] {
        Self::mont_mul(self.0, [1, 0, 0, 0])
    }

    /// Montgomery multiplication: a · b · R⁻¹ mod p, by coarsely integrated
    /// operand scanning. The result is canonical if at least one operand is.
    const fn mont_mul(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
        let mut t = [0u64; 6];
        let mut i = 0;
        while i < 4 {
            let mut carry = 0u64;
            let mut j = 0;
            while j < 4 {
                let sum = t[j] as u128 + a[i] as u128 * b[j] as u128 + carry as u128;
                t[j] = sum as u64;
                carry = (sum >> 64) as u64;
                j += 1;
            }
            let spill = t[4] as u128 + carry as u128;
            t[4] = spill as u64;
            t[5] = (spill >> 64) as u64;

            let m = t[0].wrapping_mul(Self::INV);
            let head = t[0] as u128 + m as u128 * Self::P[0] as u128;
            let mut reduction_carry = (head >> 64) as u64;
            let mut k = 1;
            while k < 4 {
                let sum = t[k] as u128 + m as u128 * Self::P[k] as u128 + reduction_carry as u128;
                t[k - 1] = sum as u64;
                reduction_carry = (sum >> 64) as u64;
                k += 1;
            }
            let tail = t[4] as u128 + reduction_carry as u128;
            t[3] = tail as u64;
            t[4] = t[5] + ((tail >> 64) as u64);
            t[5] = 0;
            i += 1;
        }

        let r = [t[0], t[1], t[2], t[3]];
        if t[4] != 0 || Self::geq(r, Self::P) {
            Self::sub_limbs(r, Self::P).0
        } else {
            r
        }
    }

    const fn geq(a: [u64; 4], b: [u64; 4]) -> bool {
        let mut i = 4;
        while i > 0 {
            i -= 1;
            if a[i] != b[i] {
                return a[i] > b[i];
            }
        }
        true
    }

    const fn add_limbs(a: [u64; 4], b: [u64; 4]) -> ([u64; 4], u64) {
        let mut r = [0u64; 4];
        let mut carry = 0u64;
        let mut i = 0;
        while i < 4 {
            let (s, c1) = a[i].overflowing_add(b[i]);
            let (s, c2) = s.overflowing_add(carry);
            r[i] = s;
            carry = c1 as u64 + c2 as u64;
            i += 1;
        }
        (r, carry)
    }

    const fn sub_limbs(a: [u64; 4], b: [u64; 4]) -> ([u64; 4], u64) {
        let mut r = [0u64; 4];
        let mut borrow = 0u64;
        let mut i = 0;
        while i < 4 {
            let (d, b1) = a[i].overflowing_sub(b[i]);
            let (d, b2) = d.overflowing_sub(borrow);
            r[i] = d;
            borrow = b1 as u64 + b2 as u64;
            i += 1;
        }
        (r, borrow)
    }

    pub(crate) fn limbs_to_biguint(limbs: [u64; 4]) -> BigUint {
        let mut bytes = [0u8; Self::BYTES];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(limbs) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        BigUint::from_bytes_le(&bytes)
    }

    /// The caller guarantees that the value fits in 256 bits.
    fn biguint_to_limbs(value: &BigUint) -> [u64; 4] {
        let mut limbs = [0u64; 4];
        for (limb, digit) in limbs.iter_mut().zip(value.iter_u64_digits()) {
            *limb = digit;
        }
        limbs
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let canonical_value = BigUint::from(self);
        let cutoff = BigUint::from(256u32);
        if canonical_value >= Self::modulus() - cutoff {
            write!(f, "-{}", Self::modulus() - canonical_value)
        } else {
            write!(f, "{canonical_value}")
        }
    }
}

impl FromStr for FieldElement {
    type Err = ParseFieldElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = BigInt::from_str(s)?;
        let modulus = BigInt::from(Self::modulus());

        if parsed >= modulus || parsed <= -modulus.clone() {
            return Err(Self::Err::NotCanonical);
        }
        let normalized = match parsed.sign() {
            Sign::Minus => parsed + modulus,
            _ => parsed,
        };

        let magnitude = BigUint::try_from(normalized).map_err(|_| Self::Err::NotCanonical)?;
        Ok(Self::new(Self::biguint_to_limbs(&magnitude)))
    }
}

impl From<usize> for FieldElement {
    fn from(value: usize) -> Self {
        // targets with wider target pointers don't exist at the time of writing
        #[cfg(any(
            target_pointer_width = "16",
            target_pointer_width = "32",
            target_pointer_width = "64",
        ))]
        Self::new([value as u64, 0, 0, 0])
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        Self::new([value as u64, (value >> 64) as u64, 0, 0])
    }
}

macro_rules! impl_from_small_unsigned_int_for_fe {
    ($($t:ident),+ $(,)?) => {$(
        impl From<$t> for FieldElement {
            fn from(value: $t) -> Self {
                Self::new([u64::from(value), 0, 0, 0])
            }
        }
    )+};
}

impl_from_small_unsigned_int_for_fe!(u8, u16, u32, u64);

impl From<isize> for FieldElement {
    fn from(value: isize) -> Self {
        // targets with wider target pointers don't exist at the time of writing
        #[cfg(any(
            target_pointer_width = "16",
            target_pointer_width = "32",
            target_pointer_width = "64",
        ))]
        Self::from(value as i64)
    }
}

impl From<i128> for FieldElement {
    fn from(value: i128) -> Self {
        let magnitude = Self::from(value.unsigned_abs());
        if value < 0 { -magnitude } else { magnitude }
    }
}

macro_rules! impl_from_small_signed_int_for_fe {
    ($($t:ident),+ $(,)?) => {$(
        impl From<$t> for FieldElement {
            fn from(value: $t) -> Self {
                i128::from(value).into()
            }
        }
    )+};
}

impl_from_small_signed_int_for_fe!(i8, i16, i32, i64);

impl From<FieldElement> for BigUint {
    fn from(elem: FieldElement) -> Self {
        FieldElement::limbs_to_biguint(elem.value())
    }
}

impl From<&FieldElement> for BigUint {
    fn from(elem: &FieldElement) -> Self {
        FieldElement::limbs_to_biguint(elem.value())
    }
}

impl TryFrom<&BigUint> for FieldElement {
    type Error = ParseFieldElementError;

    fn try_from(value: &BigUint) -> Result<Self, Self::Error> {
        if *value >= Self::modulus() {
            return Err(ParseFieldElementError::NotCanonical);
        }
        Ok(Self::new(Self::biguint_to_limbs(value)))
    }
}

impl TryFrom<BigUint> for FieldElement {
    type Error = ParseFieldElementError;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

/// Convert a field element to a byte array, in little-endian byte order.
impl From<FieldElement> for [u8; FieldElement::BYTES] {
    fn from(elem: FieldElement) -> Self {
        // It's crucial to map this to the canonical representation before
        // converting. Otherwise, the representation is degenerate.
        let mut bytes = [0u8; FieldElement::BYTES];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(elem.value()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }
}

impl TryFrom<[u8; FieldElement::BYTES]> for FieldElement {
    type Error = ParseFieldElementError;

    fn try_from(array: [u8; FieldElement::BYTES]) -> Result<Self, Self::Error> {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(array.chunks_exact(8)) {
            // chunks_exact yields only chunks of length 8; unwrap is fine
            *limb = u64::from_le_bytes(chunk.try_into().unwrap());
        }
        Self::try_new(limbs)
    }
}

impl TryFrom<&[u8]> for FieldElement {
    type Error = ParseFieldElementError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; FieldElement::BYTES]>::try_from(bytes)
            .map_err(|_| Self::Error::InvalidNumBytes(bytes.len()))?
            .try_into()
    }
}

impl Distribution<FieldElement> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FieldElement {
        // p has 254 bits; mask the top two bits and rejection-sample
        loop {
            let mut limbs: [u64; 4] = rng.random();
            limbs[3] &= 0x3fff_ffff_ffff_ffff;
            if FieldElement::is_canonical(limbs) {
                return FieldElement::new(limbs);
            }
        }
    }
}

impl Zero for FieldElement {
    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }
}

impl ConstZero for FieldElement {
    const ZERO: Self = Self::new([0, 0, 0, 0]);
}

impl One for FieldElement {
    #[inline]
    fn one() -> Self {
        Self::ONE
    }

    #[inline]
    fn is_one(&self) -> bool {
        self == &Self::ONE
    }
}

impl ConstOne for FieldElement {
    const ONE: Self = Self::new([1, 0, 0, 0]);
}

impl Add for FieldElement {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        // both operands are < p < 2^255, so the limb sum cannot overflow
        let (sum, _) = Self::add_limbs(self.0, rhs.0);
        if Self::geq(sum, Self::P) {
            Self(Self::sub_limbs(sum, Self::P).0)
        } else {
            Self(sum)
        }
    }
}

impl AddAssign for FieldElement {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs
    }
}

impl SubAssign for FieldElement {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs
    }
}

impl MulAssign for FieldElement {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul for FieldElement {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(Self::mont_mul(self.0, rhs.0))
    }
}

impl Neg for FieldElement {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::zero() - self
    }
}

impl Sub for FieldElement {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let (diff, borrow) = Self::sub_limbs(self.0, rhs.0);
        if borrow != 0 {
            Self(Self::add_limbs(diff, Self::P).0)
        } else {
            Self(diff)
        }
    }
}

impl Div for FieldElement {
    type Output = Self;

    #[expect(clippy::suspicious_arithmetic_impl)]
    fn div(self, other: Self) -> Self {
        other.inverse() * self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;
    use test_strategy::proptest;

    use super::*;
    use crate::math::other::random_elements;

    impl proptest::arbitrary::Arbitrary for FieldElement {
        type Parameters = ();

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            arb().boxed()
        }

        type Strategy = BoxedStrategy<Self>;
    }

    #[proptest]
    fn get_size(fe: FieldElement) {
        prop_assert_eq!(32, fe.get_size());
    }

    #[proptest]
    fn serialization_and_deserialization_to_and_from_json_is_identity(fe: FieldElement) {
        let serialized = serde_json::to_string(&fe).unwrap();
        let deserialized: FieldElement = serde_json::from_str(&serialized).unwrap();
        prop_assert_eq!(fe, deserialized);
    }

    #[test]
    fn serialization_uses_big_endian_hex() {
        let serialized = serde_json::to_string(&fe!(255)).unwrap();
        let expected_hex = format!("\"{}ff\"", "0".repeat(62));
        assert_eq!(expected_hex, serialized);
    }

    #[proptest]
    fn addition_is_commutative(a: FieldElement, b: FieldElement) {
        prop_assert_eq!(a + b, b + a);
    }

    #[proptest]
    fn multiplication_is_commutative(a: FieldElement, b: FieldElement) {
        prop_assert_eq!(a * b, b * a);
    }

    #[proptest]
    fn multiplication_distributes_over_addition(
        a: FieldElement,
        b: FieldElement,
        c: FieldElement,
    ) {
        prop_assert_eq!(a * (b + c), a * b + a * c);
    }

    #[proptest]
    fn addition_and_subtraction_are_inverses(a: FieldElement, b: FieldElement) {
        prop_assert_eq!(a, a + b - b);
    }

    #[proptest]
    fn negation_gives_additive_inverse(a: FieldElement) {
        prop_assert_eq!(FieldElement::ZERO, a + (-a));
    }

    #[proptest]
    fn multiplying_with_inverse_gives_one(#[filter(!#a.is_zero())] a: FieldElement) {
        prop_assert_eq!(FieldElement::ONE, a * a.inverse());
    }

    #[proptest]
    fn division_is_multiplication_with_inverse(
        a: FieldElement,
        #[filter(!#b.is_zero())] b: FieldElement,
    ) {
        prop_assert_eq!(a * b.inverse(), a / b);
    }

    #[test]
    #[should_panic(expected = "multiplicative inverse of zero")]
    fn inverting_zero_panics() {
        let _ = FieldElement::ZERO.inverse();
    }

    #[proptest]
    fn pow5_agrees_with_repeated_multiplication(x: FieldElement) {
        prop_assert_eq!(x * x * x * x * x, x.pow5());
    }

    #[proptest]
    fn pow5_agrees_with_mod_pow(x: FieldElement) {
        prop_assert_eq!(x.mod_pow_u64(5), x.pow5());
    }

    #[proptest]
    fn mod_pow_agrees_with_repeated_squaring(x: FieldElement) {
        prop_assert_eq!(x.square().square(), x.mod_pow_u64(4));
    }

    #[test]
    fn minus_one_squared_is_one() {
        assert_eq!(FieldElement::ONE, FieldElement::MAX * FieldElement::MAX);
        assert_eq!(FieldElement::MAX, fe!(-1));
    }

    #[test]
    fn largest_canonical_value_plus_one_wraps_to_zero() {
        assert_eq!(FieldElement::ZERO, FieldElement::MAX + FieldElement::ONE);
    }

    #[test]
    fn modulus_is_not_canonical() {
        assert!(!FieldElement::is_canonical(FieldElement::P));
        assert!(FieldElement::is_canonical(FieldElement::MAX.value()));
        assert!(FieldElement::try_new(FieldElement::P).is_err());
    }

    #[test]
    fn modulus_has_expected_value() {
        let expected = "21888242871839275222246405745257275088548364400416034343698204186575808495617";
        assert_eq!(expected, FieldElement::modulus().to_string());
    }

    #[proptest]
    fn montgomery_conversion_round_trips(fe: FieldElement) {
        prop_assert_eq!(fe, FieldElement::new(fe.value()));
        prop_assert!(FieldElement::is_canonical(fe.value()));
        prop_assert!(FieldElement::is_canonical(fe.raw_limbs()));
        prop_assert_eq!(fe, FieldElement::from_raw_limbs(fe.raw_limbs()));
    }

    #[proptest]
    fn byte_conversion_round_trips(fe: FieldElement) {
        let bytes: [u8; FieldElement::BYTES] = fe.into();
        prop_assert_eq!(fe, FieldElement::try_from(bytes).unwrap());
        prop_assert_eq!(fe, FieldElement::try_from(bytes.as_slice()).unwrap());
    }

    #[test]
    fn bytes_of_modulus_are_rejected() {
        let mut bytes = [0u8; FieldElement::BYTES];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(FieldElement::P) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        let err = FieldElement::try_from(bytes).unwrap_err();
        assert_eq!(ParseFieldElementError::NotCanonical, err);
    }

    #[test]
    fn wrong_number_of_bytes_is_rejected() {
        let err = FieldElement::try_from([0u8; 31].as_slice()).unwrap_err();
        assert_eq!(ParseFieldElementError::InvalidNumBytes(31), err);
    }

    #[proptest]
    fn biguint_conversion_round_trips(fe: FieldElement) {
        let big: BigUint = fe.into();
        prop_assert_eq!(fe, FieldElement::try_from(&big).unwrap());
    }

    #[test]
    fn biguint_modulus_is_rejected() {
        let err = FieldElement::try_from(&FieldElement::modulus()).unwrap_err();
        assert_eq!(ParseFieldElementError::NotCanonical, err);
    }

    #[test]
    fn parsing_from_decimal_strings() {
        assert_eq!(fe!(42), "42".parse::<FieldElement>().unwrap());
        assert_eq!(fe!(-1), "-1".parse::<FieldElement>().unwrap());
        assert_eq!(
            FieldElement::MAX,
            "21888242871839275222246405745257275088548364400416034343698204186575808495616"
                .parse::<FieldElement>()
                .unwrap()
        );

        let modulus_string = FieldElement::modulus().to_string();
        assert!(modulus_string.parse::<FieldElement>().is_err());
        assert!(format!("-{modulus_string}").parse::<FieldElement>().is_err());
        assert!("not a number".parse::<FieldElement>().is_err());
    }

    #[proptest]
    fn parsing_display_output_is_identity(fe: FieldElement) {
        prop_assert_eq!(fe, fe.to_string().parse::<FieldElement>().unwrap());
    }

    #[test]
    fn display_of_small_and_near_modulus_values() {
        assert_eq!("42", fe!(42).to_string());
        assert_eq!("-1", FieldElement::MAX.to_string());
        assert_eq!("-200", fe!(-200).to_string());
        assert_eq!("0", FieldElement::ZERO.to_string());
    }

    #[test]
    fn signed_conversions_wrap_around_the_modulus() {
        assert_eq!(FieldElement::ZERO, fe!(-12) + fe!(12));
        assert_eq!(fe!(30), fe!(42) + fe!(-12i32));
        assert_eq!(fe!(1u64 << 63), fe!(i64::MIN).neg());
    }

    #[test]
    fn u128_conversion_agrees_with_biguint_conversion() {
        let x = u128::MAX;
        let expected = BigUint::from(x) % FieldElement::modulus();
        assert_eq!(expected, BigUint::from(fe!(x)));
    }

    #[proptest]
    fn sum_of_elements_agrees_with_fold(#[strategy(arb())] elements: Vec<FieldElement>) {
        let expected = elements
            .iter()
            .fold(FieldElement::ZERO, |acc, &e| acc + e);
        prop_assert_eq!(expected, elements.into_iter().sum());
    }

    #[test]
    fn random_elements_are_canonical() {
        for fe in random_elements::<FieldElement>(100) {
            assert!(FieldElement::is_canonical(fe.value()));
        }
    }

    #[test]
    fn macros_produce_expected_collections() {
        assert_eq!(vec![fe!(42); 15], fe_vec![42; 15]);
        assert_eq!([fe!(42); 15], fe_array![42; 15]);
        assert_eq!(vec![fe!(1), fe!(2), fe!(3)], fe_vec![1, 2, 3]);
    }

    #[test]
    fn debug_and_hex_formatting() {
        assert_eq!("FieldElement(255)", format!("{:?}", fe!(255)));
        assert_eq!("ff", format!("{:x}", fe!(255)));
        assert_eq!("FF", format!("{:X}", fe!(255)));
    }
}
