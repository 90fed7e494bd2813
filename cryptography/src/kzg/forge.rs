//! Forge polynomials and openings that pass verification.
//!
//! Two attacks are provided:
//!
//! * [`forge_polynomial`] builds a second polynomial that agrees with a
//!   committed one at `alpha`. Both commit to the same value, so whoever knows
//!   the trapdoor can open the commitment to anything at any other point.
//! * [`forge_opening`] needs no trapdoor. Because the [`super::Toy`] pairing is
//!   invertible, the verification equation can be solved for the proof.

use super::{Commitment, Error, Opening, Parameters};
use rand::RngCore;
use tessera_math::{Element, Field, Poly};
use tracing::debug;

/// Maximum number of draws when sampling a fresh interpolation point.
pub const MAX_SAMPLING_ATTEMPTS: usize = 1024;

/// Number of points the forged polynomial is interpolated through.
const FORGED_POINTS: usize = 3;

/// Returns a polynomial of degree at most 2 that passes through
/// `(alpha, value_at_alpha)` and `(point, value_at_point)`.
///
/// The remaining points are sampled at random `x` distinct from the ones
/// already pinned, with random `y`.
pub fn forge_polynomial(
    rng: &mut impl RngCore,
    field: &Field,
    alpha: &Element,
    value_at_alpha: &Element,
    point: &Element,
    value_at_point: &Element,
) -> Result<Poly, Error> {
    if [alpha, value_at_alpha, point, value_at_point]
        .iter()
        .any(|e| e.field() != field)
    {
        return Err(Error::FieldMismatch);
    }

    let mut points = vec![(alpha.clone(), value_at_alpha.clone())];
    if point != alpha {
        points.push((point.clone(), value_at_point.clone()));
    } else if value_at_point != value_at_alpha {
        return Err(Error::ConflictingSamples);
    }

    let mut attempts = 0;
    while points.len() < FORGED_POINTS {
        if attempts == MAX_SAMPLING_ATTEMPTS {
            return Err(Error::SamplingExhausted(MAX_SAMPLING_ATTEMPTS));
        }
        attempts += 1;

        let x = field.random(rng);
        if points.iter().any(|(used, _)| *used == x) {
            continue;
        }
        points.push((x, field.random(rng)));
    }

    // Points are distinct and share the field, so interpolation cannot fail.
    let forged = Poly::interpolate(field, &points).map_err(|_| Error::FieldMismatch)?;
    debug!(attempts, degree = forged.degree(), "forged polynomial");
    Ok(forged)
}

/// Opens `commitment` to `value` at `point`, without knowing the committed
/// polynomial or the trapdoor.
///
/// Solves `e(C, g) == e(proof, SRS[1] - point * g) + value * e(g, g)` for the
/// proof under the toy pairing. Fails with [`Error::NoInverse`] when `point`
/// is the trapdoor.
pub fn forge_opening(
    params: &Parameters,
    commitment: &Commitment,
    point: &Element,
    value: &Element,
) -> Result<Opening, Error> {
    let field = params.field();
    if [commitment.as_element(), point, value]
        .iter()
        .any(|e| e.field() != field)
    {
        return Err(Error::FieldMismatch);
    }

    let g = params.generator();
    let divisor = params.srs().tau() - &(point * g);
    let inverse = divisor.inv().ok_or(Error::NoInverse)?;
    let target = commitment.as_element() * g - &(value * &(g * g));
    let proof = target * &inverse;

    debug!(%point, %value, "forged opening");
    Ok(Opening {
        point: point.clone(),
        value: value.clone(),
        proof: Commitment::from(proof),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kzg::{commit, open, setup, verify, Config, TrapdoorPolicy};
    use commonware_macros::test_traced;
    use num_bigint::BigUint;
    use rand::{rngs::StdRng, SeedableRng};

    fn config(prime: u64, degree_bound: u64) -> Config {
        Config {
            prime: Some(BigUint::from(prime)),
            degree_bound: Some(BigUint::from(degree_bound)),
            ..Default::default()
        }
    }

    #[test_traced]
    fn test_forge_with_trapdoor() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = Config {
            policy: TrapdoorPolicy::Retain,
            ..config(2039, 3)
        };
        let (params, trapdoor) = setup(&mut rng, &cfg).unwrap();
        let alpha = trapdoor.unwrap().expose();
        let field = params.field();

        let p = field.poly([5u32, 2]);
        let commitment = commit(&params, &p).unwrap();

        // A genuine opening at alpha pins the committed value.
        let genuine = open(&params, &alpha, &p).unwrap();
        assert!(verify(&params, &commitment, &genuine));

        let point = if alpha == field.element(4u32) {
            field.element(5u32)
        } else {
            field.element(4u32)
        };
        let lie = &p.eval(&point) + &field.one();
        let q = forge_polynomial(&mut rng, field, &alpha, &genuine.value, &point, &lie).unwrap();
        assert_ne!(q, p);
        assert!(q.degree() <= 2);
        assert_eq!(commit(&params, &q).unwrap(), commitment);

        let forged = open(&params, &point, &q).unwrap();
        assert_eq!(forged.value, lie);
        assert!(verify(&params, &commitment, &forged));
    }

    #[test]
    fn test_forged_polynomial_interpolates_pins() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = Field::new(BigUint::from(2039u32)).unwrap();
        for _ in 0..100 {
            let alpha = field.random_nonzero(&mut rng);
            let point = field.random(&mut rng);
            let (a, b) = (field.random(&mut rng), field.random(&mut rng));
            let b = if point == alpha { a.clone() } else { b };
            let q = forge_polynomial(&mut rng, &field, &alpha, &a, &point, &b).unwrap();
            assert!(q.degree() <= 2);
            assert_eq!(q.eval(&alpha), a);
            assert_eq!(q.eval(&point), b);
        }
    }

    #[test]
    fn test_forge_same_point() {
        let mut rng = StdRng::seed_from_u64(2);
        let field = Field::new(BigUint::from(2039u32)).unwrap();
        let (x, y) = (field.element(17u32), field.element(99u32));
        let q = forge_polynomial(&mut rng, &field, &x, &y, &x, &y).unwrap();
        assert_eq!(q.eval(&x), y);

        let other = field.element(100u32);
        assert!(matches!(
            forge_polynomial(&mut rng, &field, &x, &y, &x, &other),
            Err(Error::ConflictingSamples)
        ));
    }

    #[test]
    fn test_forge_sampling_exhausted() {
        // GF(2) has no third point
        let mut rng = StdRng::seed_from_u64(3);
        let field = Field::new(BigUint::from(2u32)).unwrap();
        let (zero, one) = (field.zero(), field.one());
        assert!(matches!(
            forge_polynomial(&mut rng, &field, &one, &one, &zero, &zero),
            Err(Error::SamplingExhausted(MAX_SAMPLING_ATTEMPTS))
        ));
    }

    #[test]
    fn test_forge_smallest_field() {
        let mut rng = StdRng::seed_from_u64(4);
        let field = Field::new(BigUint::from(3u32)).unwrap();
        let (one, two) = (field.element(1u32), field.element(2u32));
        let q = forge_polynomial(&mut rng, &field, &one, &two, &two, &one).unwrap();
        assert_eq!(q.eval(&one), two);
        assert_eq!(q.eval(&two), one);
    }

    #[test]
    fn test_forge_field_mismatch() {
        let mut rng = StdRng::seed_from_u64(5);
        let field = Field::new(BigUint::from(2039u32)).unwrap();
        let other = Field::new(BigUint::from(1019u32)).unwrap();
        let x = field.element(1u32);
        let y = other.element(1u32);
        assert!(matches!(
            forge_polynomial(&mut rng, &field, &x, &x, &y, &x),
            Err(Error::FieldMismatch)
        ));
    }

    #[test_traced]
    fn test_forge_opening_any_value() {
        let mut rng = StdRng::seed_from_u64(6);
        let (params, trapdoor) = setup(&mut rng, &config(2039, 3)).unwrap();
        assert!(trapdoor.is_none());
        let field = params.field();

        let p = field.poly([3u32, 1, 4, 1]);
        let commitment = commit(&params, &p).unwrap();
        let point = field.element(10u32);
        let honest = open(&params, &point, &p).unwrap();
        for value in 0..50u32 {
            let value = field.element(value);
            let forged = match forge_opening(&params, &commitment, &point, &value) {
                Ok(forged) => forged,
                // The sampled trapdoor happened to be the point
                Err(Error::NoInverse) => return,
                Err(err) => panic!("unexpected error: {err}"),
            };
            assert!(verify(&params, &commitment, &forged));
            if value == honest.value {
                assert_eq!(forged, honest);
            }
        }
    }

    #[test]
    fn test_forge_opening_at_trapdoor() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = Config {
            trapdoor: Some(BigUint::from(17u32)),
            ..config(2039, 3)
        };
        let (params, _) = setup(&mut rng, &cfg).unwrap();
        let field = params.field();
        let commitment = commit(&params, &field.poly([5u32, 2])).unwrap();
        assert!(matches!(
            forge_opening(
                &params,
                &commitment,
                &field.element(17u32),
                &field.element(1u32)
            ),
            Err(Error::NoInverse)
        ));
    }
}
