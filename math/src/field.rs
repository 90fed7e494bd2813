//! Prime fields with a modulus chosen at runtime.

use crate::{
    primes::{is_prime, prime_factors},
    Error, Poly,
};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::RngCore;
use std::{
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    sync::Arc,
};

/// Maximum number of candidates [`Field::multiplicative_generator`] tests.
pub const MAX_GENERATOR_CANDIDATES: usize = 1 << 16;

/// The prime field `GF(p)`.
///
/// Cloning a [`Field`] is cheap: all clones share the same modulus.
#[derive(Clone)]
pub struct Field {
    modulus: Arc<BigUint>,
}

impl Field {
    /// Creates the field of integers modulo `modulus`.
    ///
    /// Fails with [`Error::NotPrime`] unless `modulus` is prime.
    pub fn new(modulus: BigUint) -> Result<Self, Error> {
        if !is_prime(&modulus) {
            return Err(Error::NotPrime(modulus));
        }
        Ok(Self {
            modulus: Arc::new(modulus),
        })
    }

    /// Returns the modulus `p`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns the bit length of the modulus.
    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Returns the element congruent to `value`.
    pub fn element(&self, value: impl Into<BigUint>) -> Element {
        Element {
            value: value.into() % self.modulus.as_ref(),
            field: self.clone(),
        }
    }

    pub fn zero(&self) -> Element {
        self.element(BigUint::zero())
    }

    pub fn one(&self) -> Element {
        self.element(BigUint::one())
    }

    /// Samples an element uniformly at random.
    pub fn random(&self, rng: &mut impl RngCore) -> Element {
        let value = rng.gen_biguint_below(&self.modulus);
        Element {
            value,
            field: self.clone(),
        }
    }

    /// Samples a non-zero element uniformly at random.
    pub fn random_nonzero(&self, rng: &mut impl RngCore) -> Element {
        let value = rng.gen_biguint_range(&BigUint::one(), &self.modulus);
        Element {
            value,
            field: self.clone(),
        }
    }

    /// Returns the smallest generator of the multiplicative group.
    ///
    /// An element `g` generates the group iff `g^((p - 1) / q) != 1` for every
    /// prime `q` dividing `p - 1`. Fails with [`Error::SamplingExhausted`] if
    /// `p - 1` cannot be factored or no generator is found among the first
    /// [`MAX_GENERATOR_CANDIDATES`] candidates.
    pub fn multiplicative_generator(&self) -> Result<Element, Error> {
        let one = BigUint::one();
        let order = self.modulus.as_ref() - &one;
        let cofactors = prime_factors(&order)?
            .into_iter()
            .map(|q| &order / q)
            .collect::<Vec<_>>();

        // In GF(2) the group is trivial and 1 generates it.
        let mut candidate = one.clone();
        for _ in 0..MAX_GENERATOR_CANDIDATES {
            if cofactors
                .iter()
                .all(|e| candidate.modpow(e, &self.modulus) != one)
            {
                return Ok(self.element(candidate));
            }
            candidate += 1u32;
        }
        Err(Error::SamplingExhausted(MAX_GENERATOR_CANDIDATES))
    }

    /// Builds a polynomial from ascending coefficients.
    pub fn poly<I: Into<BigUint>>(&self, coeffs: impl IntoIterator<Item = I>) -> Poly {
        Poly::from_coefficients(self, coeffs.into_iter().map(|c| self.element(c)))
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.modulus, &other.modulus) || self.modulus == other.modulus
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.modulus.hash(state);
    }
}

impl Debug for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GF({})", self.modulus)
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Finite Field of size {}", self.modulus)
    }
}

/// An element of a [`Field`].
///
/// # Panics
///
/// Arithmetic between elements of different fields panics. Callers accepting
/// elements from untrusted sources should compare [`Element::field`] first.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Element {
    // Invariant: value < field.modulus
    value: BigUint,
    field: Field,
}

impl Element {
    /// Returns the canonical representative in `[0, p)`.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Returns the field this element belongs to.
    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Raises this element to `exp`.
    pub fn pow(&self, exp: &BigUint) -> Self {
        Self {
            value: self.value.modpow(exp, &self.field.modulus),
            field: self.field.clone(),
        }
    }

    /// Returns the multiplicative inverse, or `None` for zero.
    pub fn inv(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }

        // Fermat: a^(p - 2) = a^-1 for prime p
        let exp = self.field.modulus.as_ref() - 2u32;
        Some(self.pow(&exp))
    }

    fn check_field(&self, rhs: &Self) {
        assert!(self.field == rhs.field, "field mismatch");
    }
}

impl Debug for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

// SECTION: arithmetic

impl<'a> AddAssign<&'a Element> for Element {
    fn add_assign(&mut self, rhs: &'a Element) {
        self.check_field(rhs);
        self.value += &rhs.value;
        if self.value >= *self.field.modulus {
            self.value -= self.field.modulus.as_ref();
        }
    }
}

impl<'a> SubAssign<&'a Element> for Element {
    fn sub_assign(&mut self, rhs: &'a Element) {
        self.check_field(rhs);
        if self.value < rhs.value {
            self.value += self.field.modulus.as_ref();
        }
        self.value -= &rhs.value;
    }
}

impl<'a> MulAssign<&'a Element> for Element {
    fn mul_assign(&mut self, rhs: &'a Element) {
        self.check_field(rhs);
        self.value = (&self.value * &rhs.value) % self.field.modulus.as_ref();
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign:ident) => {
        impl<'a> $trait<&'a Element> for Element {
            type Output = Element;

            fn $method(mut self, rhs: &'a Element) -> Element {
                self.$assign(rhs);
                self
            }
        }

        impl<'a, 'b> $trait<&'b Element> for &'a Element {
            type Output = Element;

            fn $method(self, rhs: &'b Element) -> Element {
                self.clone().$method(rhs)
            }
        }
    };
}

impl_binop!(Add, add, add_assign);
impl_binop!(Sub, sub, sub_assign);
impl_binop!(Mul, mul, mul_assign);

impl Neg for Element {
    type Output = Element;

    fn neg(self) -> Element {
        self.field.zero() - &self
    }
}

impl Neg for &Element {
    type Output = Element;

    fn neg(self) -> Element {
        self.clone().neg()
    }
}
