//! KZG polynomial commitments over a prime field.
//!
//! # Overview
//!
//! A trusted [`setup()`] samples a secret `alpha` and publishes the structured
//! reference string `[g, g * alpha, ..., g * alpha^t]`. A polynomial `f` of
//! degree at most `t` is committed to as `C = f(alpha) * g`, computed from
//! the reference string without knowing `alpha`. An opening at `z` reveals
//! `y = f(z)` together with a commitment to the quotient
//! `q(x) = (f(x) - y) / (x - z)`, which exists only if `y` is correct.
//!
//! The verifier checks
//!
//! ```text
//! e(C, g) == e(q(alpha) * g, (alpha - z) * g) + y * e(g, g)
//! ```
//!
//! where `e` is a [`Pairing`]. This crate ships only the [`Toy`] pairing
//! (field multiplication), which makes the scheme a model of KZG rather than
//! a secure instance of it. The [`forge`] module shows how it breaks.
//!
//! # Example
//!
//! ```rust
//! use num_bigint::BigUint;
//! use rand::rngs::OsRng;
//! use tessera_cryptography::kzg::{commit, open, setup, verify, Config};
//!
//! let cfg = Config {
//!     prime: Some(BigUint::from(2039u32)),
//!     degree_bound: Some(BigUint::from(3u32)),
//!     ..Default::default()
//! };
//! let (params, _) = setup(&mut OsRng, &cfg).expect("setup should succeed");
//!
//! // f(x) = 5 + 2x
//! let field = params.field();
//! let f = field.poly([5u32, 2]);
//! let commitment = commit(&params, &f).expect("commitment should succeed");
//!
//! // Prove that f(4) = 13
//! let opening = open(&params, &field.element(4u32), &f).expect("opening should succeed");
//! assert_eq!(opening.value, field.element(13u32));
//! assert!(verify(&params, &commitment, &opening));
//! ```
//!
//! # Acknowledgements
//!
//! The following resources were used as references when implementing this crate:
//!
//! * <https://link.springer.com/chapter/10.1007/978-3-642-17373-8_11>: Constant-Size Commitments to Polynomials and Their Applications
//! * <https://dankradfeist.de/ethereum/2020/06/16/kate-polynomial-commitments.html>: Kate polynomial commitments

use num_bigint::BigUint;
use tessera_math::{Element, Poly};
use thiserror::Error;
use tracing::trace;

pub mod forge;
pub mod pairing;
pub mod setup;
pub use forge::{forge_opening, forge_polynomial};
pub use pairing::{Pairing, Toy};
pub use setup::{setup, Config, DegreeBound, Parameters, Srs, Trapdoor, TrapdoorPolicy};

/// Errors that can arise during KZG operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("polynomial degree {0} exceeds bound {1}")]
    DegreeExceeded(u64, BigUint),
    #[error("field mismatch")]
    FieldMismatch,
    #[error("sampling exhausted after {0} attempts")]
    SamplingExhausted(usize),
    #[error("reference string too large for degree bound {0}")]
    SrsTooLarge(BigUint),
    #[error("conflicting samples at the same point")]
    ConflictingSamples,
    #[error("no inverse")]
    NoInverse,
}

/// A commitment to a polynomial (or to a quotient, when used as a proof).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Commitment(Element);

impl Commitment {
    pub fn as_element(&self) -> &Element {
        &self.0
    }
}

impl std::fmt::Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({})", self.0)
    }
}

impl From<Element> for Commitment {
    fn from(element: Element) -> Self {
        Self(element)
    }
}

/// A claim that the committed polynomial evaluates to `value` at `point`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Opening {
    /// The evaluation point.
    pub point: Element,
    /// The claimed evaluation.
    pub value: Element,
    /// The commitment to the quotient `(f(x) - value) / (x - point)`.
    pub proof: Commitment,
}

/// Ensures `poly` can be committed to with `params`.
fn check(params: &Parameters, poly: &Poly) -> Result<(), Error> {
    let bound = params.degree_bound();
    if !bound.admits(poly.degree()) {
        return Err(Error::DegreeExceeded(
            poly.degree(),
            bound.as_integer().clone(),
        ));
    }
    if poly.field() != params.field() {
        return Err(Error::FieldMismatch);
    }
    Ok(())
}

/// Sums `coeff[i] * SRS[i]` without checking the degree bound.
fn commit_unchecked(params: &Parameters, poly: &Poly) -> Commitment {
    let powers = params.srs().powers();
    let commitment = poly
        .coefficients()
        .iter()
        .zip(powers)
        .fold(params.field().zero(), |acc, (coeff, power)| {
            acc + &(coeff * power)
        });
    Commitment(commitment)
}

/// Commits to `poly`.
pub fn commit(params: &Parameters, poly: &Poly) -> Result<Commitment, Error> {
    check(params, poly)?;
    Ok(commit_unchecked(params, poly))
}

/// Opens `poly` at `point`, proving the value of `poly(point)`.
pub fn open(params: &Parameters, point: &Element, poly: &Poly) -> Result<Opening, Error> {
    check(params, poly)?;
    if point.field() != params.field() {
        return Err(Error::FieldMismatch);
    }

    // f(x) - f(z) vanishes at z, so the remainder is zero.
    let value = poly.eval(point);
    let shifted = poly.clone() - &Poly::constant(&value);
    let (quotient, remainder) = shifted.div_linear(point);
    debug_assert!(remainder.is_zero());

    Ok(Opening {
        point: point.clone(),
        value,
        proof: commit_unchecked(params, &quotient),
    })
}

/// Verifies `opening` against `commitment` using the [`Toy`] pairing.
pub fn verify(params: &Parameters, commitment: &Commitment, opening: &Opening) -> bool {
    verify_with(params, &Toy, commitment, opening)
}

/// Verifies `opening` against `commitment` using `pairing`.
///
/// Accepts iff `e(C, g) == e(proof, SRS[1] - point * g) + value * e(g, g)`.
/// Values from a field other than the parameters' are rejected.
pub fn verify_with(
    params: &Parameters,
    pairing: &impl Pairing,
    commitment: &Commitment,
    opening: &Opening,
) -> bool {
    let field = params.field();
    if [
        commitment.as_element(),
        &opening.point,
        &opening.value,
        opening.proof.as_element(),
    ]
    .iter()
    .any(|e| e.field() != field)
    {
        trace!("opening from a different field");
        return false;
    }

    let g = params.generator();
    let lhs = pairing.pair(commitment.as_element(), g);
    let divisor = params.srs().tau() - &(&opening.point * g);
    let rhs = pairing.pair(opening.proof.as_element(), &divisor)
        + &(&opening.value * &pairing.pair(g, g));
    if lhs != rhs {
        trace!(point = %opening.point, value = %opening.value, "pairing mismatch");
        return false;
    }
    true
}
