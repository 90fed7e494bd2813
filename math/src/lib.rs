//! Arbitrary-precision prime fields and polynomials over them.
//!
//! # Overview
//!
//! [`Field`] is a cheap-to-clone handle on a prime modulus. Its [`Element`]s
//! remember the field they belong to, so that code accepting values from a
//! caller can reject values drawn from some other field instead of silently
//! reducing them. [`Poly`] is a dense polynomial over a [`Field`].
//!
//! The [`primes`] module provides the number theory needed to build a field
//! from scratch: primality testing, safe prime generation, and factoring
//! `p - 1` to find a multiplicative generator.
//!
//! # Example
//!
//! ```rust
//! use tessera_math::{Field, Poly};
//!
//! let field = Field::new(2039u32.into()).expect("2039 is prime");
//! let f = field.poly([5u32, 2]); // 5 + 2x
//! assert_eq!(f.eval(&field.element(4u32)), field.element(13u32));
//! ```

use thiserror::Error;

pub mod field;
pub mod poly;
pub mod primes;

pub use field::{Element, Field};
pub use poly::Poly;

/// Errors that can arise from field and polynomial operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("modulus is not prime: {0}")]
    NotPrime(num_bigint::BigUint),
    #[error("invalid bit length: {0}")]
    InvalidBits(u64),
    #[error("sampling exhausted after {0} attempts")]
    SamplingExhausted(usize),
    #[error("duplicate interpolation point: {0}")]
    DuplicatePoint(Element),
    #[error("field mismatch")]
    FieldMismatch,
    #[error("division by zero")]
    DivisionByZero,
}
