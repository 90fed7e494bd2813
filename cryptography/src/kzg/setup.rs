use super::Error;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rand::{CryptoRng, RngCore};
use std::fmt::{Debug, Display, Formatter};
use tessera_math::{primes::safe_prime, Element, Field};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Bit length of the generated prime when [`Config::prime`] is not set.
pub const DEFAULT_SECURITY_BITS: u64 = 16;

/// Default upper bound on the number of powers in the reference string.
pub const DEFAULT_MAX_POWERS: usize = 1 << 20;

/// What [`setup`] does with the trapdoor once the reference string is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrapdoorPolicy {
    /// Drop the trapdoor before returning.
    #[default]
    Discard,
    /// Return the trapdoor alongside the parameters.
    ///
    /// Anyone holding the trapdoor can open commitments to arbitrary values.
    /// Only useful for debugging and for demonstrating forgeries.
    Retain,
}

/// Configuration for [`setup`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Bit length of the safe prime generated when `prime` is not set.
    pub security_bits: u64,

    /// Modulus of the field. Must be prime.
    pub prime: Option<BigUint>,

    /// Maximum degree of committed polynomials.
    ///
    /// A random non-zero bound is sampled if this is not set or is not
    /// smaller than the modulus.
    pub degree_bound: Option<BigUint>,

    /// The trapdoor `alpha`. Sampled uniformly from the non-zero field
    /// elements if not set.
    pub trapdoor: Option<BigUint>,

    /// Whether the trapdoor is returned to the caller.
    pub policy: TrapdoorPolicy,

    /// Upper bound on the length of the reference string (`degree_bound + 1`).
    pub max_powers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            security_bits: DEFAULT_SECURITY_BITS,
            prime: None,
            degree_bound: None,
            trapdoor: None,
            policy: TrapdoorPolicy::default(),
            max_powers: DEFAULT_MAX_POWERS,
        }
    }
}

/// The secret `alpha` behind a reference string ("toxic waste").
///
/// Only produced by [`setup`] under [`TrapdoorPolicy::Retain`]. The secret is
/// zeroized on drop and redacted from debug output.
pub struct Trapdoor {
    field: Field,
    secret: Zeroizing<Vec<u8>>,
}

impl Trapdoor {
    fn new(alpha: &Element) -> Self {
        Self {
            field: alpha.field().clone(),
            secret: Zeroizing::new(alpha.value().to_bytes_le()),
        }
    }

    /// Returns the trapdoor as a field element.
    pub fn expose(&self) -> Element {
        self.field.element(BigUint::from_bytes_le(&self.secret))
    }
}

impl Debug for Trapdoor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trapdoor([REDACTED])")
    }
}

/// Maximum degree of polynomials accepted by a set of [`Parameters`].
///
/// The bound is a field element. Degrees are compared against its canonical
/// representative in `[0, p)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DegreeBound(Element);

impl DegreeBound {
    /// Returns the canonical integer representative of the bound.
    pub fn as_integer(&self) -> &BigUint {
        self.0.value()
    }

    /// Returns `true` if a polynomial of the given degree is within the bound.
    pub fn admits(&self, degree: u64) -> bool {
        BigUint::from(degree) <= *self.as_integer()
    }
}

impl Display for DegreeBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The structured reference string `[g, g * alpha, g * alpha^2, ...]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Srs {
    // Invariant: powers.len() >= 2
    powers: Vec<Element>,
}

impl Srs {
    fn new(generator: &Element, alpha: &Element, len: usize) -> Self {
        let mut powers = Vec::with_capacity(len);
        let mut accumulated = generator.clone();
        for _ in 0..len {
            powers.push(accumulated.clone());
            accumulated *= alpha;
        }
        Self { powers }
    }

    /// Returns all powers, starting with `g`.
    pub fn powers(&self) -> &[Element] {
        &self.powers
    }

    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// Returns `g * alpha`.
    pub fn tau(&self) -> &Element {
        &self.powers[1]
    }
}

/// Public parameters produced by [`setup`].
///
/// Nothing mutates a [`Parameters`] after construction, so it can be shared
/// freely (e.g. behind an `Arc`) between threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    field: Field,
    generator: Element,
    degree_bound: DegreeBound,
    srs: Srs,
    policy: TrapdoorPolicy,
}

impl Parameters {
    /// Returns the field commitments live in.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the generator `g`.
    pub fn generator(&self) -> &Element {
        &self.generator
    }

    pub fn degree_bound(&self) -> &DegreeBound {
        &self.degree_bound
    }

    pub fn srs(&self) -> &Srs {
        &self.srs
    }

    /// Returns what [`setup`] did with the trapdoor.
    pub fn policy(&self) -> TrapdoorPolicy {
        self.policy
    }
}

impl Display for TrapdoorPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discard => write!(f, "discarded"),
            Self::Retain => write!(f, "retained"),
        }
    }
}

impl Display for Parameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KZG parameters over {} with generator {} and degree bound {} (trapdoor {})",
            self.field, self.generator, self.degree_bound, self.policy
        )
    }
}

/// Generates a fresh set of [`Parameters`].
///
/// The trapdoor is returned only under [`TrapdoorPolicy::Retain`]. Otherwise
/// it is dropped before this function returns and cannot be recovered from
/// the parameters (short of breaking the toy pairing, see [`super::forge`]).
pub fn setup(
    rng: &mut (impl RngCore + CryptoRng),
    cfg: &Config,
) -> Result<(Parameters, Option<Trapdoor>), Error> {
    // Select the field
    let modulus = match &cfg.prime {
        Some(prime) => prime.clone(),
        None => safe_prime(rng, cfg.security_bits).map_err(|err| match err {
            tessera_math::Error::SamplingExhausted(attempts) => Error::SamplingExhausted(attempts),
            _ => Error::InvalidParameter("security bits too small"),
        })?,
    };
    let field = Field::new(modulus).map_err(|_| Error::InvalidParameter("modulus is not prime"))?;

    // Select the degree bound
    let degree_bound = match &cfg.degree_bound {
        Some(bound) if bound.is_zero() => {
            return Err(Error::InvalidParameter("degree bound must be positive"));
        }
        Some(bound) if bound < field.modulus() => field.element(bound.clone()),
        _ => field.random_nonzero(rng),
    };
    let len = degree_bound
        .value()
        .to_usize()
        .and_then(|t| t.checked_add(1))
        .filter(|&len| len <= cfg.max_powers)
        .ok_or_else(|| Error::SrsTooLarge(degree_bound.value().clone()))?;

    // Select the trapdoor
    let alpha = match &cfg.trapdoor {
        Some(alpha) => {
            let alpha = field.element(alpha.clone());
            if alpha.is_zero() {
                return Err(Error::InvalidParameter("trapdoor must be non-zero"));
            }
            alpha
        }
        None => field.random_nonzero(rng),
    };

    // Build the reference string
    let generator = field.multiplicative_generator().map_err(|err| match err {
        tessera_math::Error::SamplingExhausted(attempts) => Error::SamplingExhausted(attempts),
        _ => Error::InvalidParameter("modulus has no generator"),
    })?;
    let srs = Srs::new(&generator, &alpha, len);
    let trapdoor = match cfg.policy {
        TrapdoorPolicy::Discard => None,
        TrapdoorPolicy::Retain => {
            warn!("trapdoor retained: parameters are not sound");
            Some(Trapdoor::new(&alpha))
        }
    };
    drop(alpha);

    debug!(
        bits = field.bits(),
        %generator,
        %degree_bound,
        powers = srs.len(),
        "generated parameters"
    );
    Ok((
        Parameters {
            field,
            generator,
            degree_bound: DegreeBound(degree_bound),
            srs,
            policy: cfg.policy,
        },
        trapdoor,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_macros::test_traced;
    use rand::{rngs::StdRng, SeedableRng};
    use test_case::test_case;

    fn config(prime: u64, degree_bound: u64, trapdoor: u64) -> Config {
        Config {
            prime: Some(BigUint::from(prime)),
            degree_bound: Some(BigUint::from(degree_bound)),
            trapdoor: Some(BigUint::from(trapdoor)),
            ..Default::default()
        }
    }

    #[test_traced]
    fn test_srs_powers() {
        let mut rng = StdRng::seed_from_u64(0);
        let (params, trapdoor) = setup(&mut rng, &config(2039, 3, 17)).unwrap();
        assert!(trapdoor.is_none());

        let field = params.field();
        let g = params.generator();
        let alpha = field.element(17u32);
        assert_eq!(params.srs().len(), 4);
        assert_eq!(&params.srs().powers()[0], g);
        assert_eq!(params.srs().tau(), &(g * &alpha));
        for (i, power) in params.srs().powers().iter().enumerate() {
            assert_eq!(power, &(g * &alpha.pow(&BigUint::from(i))));
        }
    }

    #[test]
    fn test_deterministic_given_trapdoor() {
        let (a, _) = setup(&mut StdRng::seed_from_u64(1), &config(2039, 5, 99)).unwrap();
        let (b, _) = setup(&mut StdRng::seed_from_u64(2), &config(2039, 5, 99)).unwrap();
        assert_eq!(a.srs(), b.srs());
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_prime_is_safe() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = Config {
            degree_bound: Some(BigUint::from(8u32)),
            ..Default::default()
        };
        let (params, _) = setup(&mut rng, &cfg).unwrap();
        let p = params.field().modulus();
        assert_eq!(p.bits(), DEFAULT_SECURITY_BITS);
        let q = (p - 1u32) >> 1u32;
        assert!(tessera_math::primes::is_prime(&q));
        assert_eq!(params.degree_bound().as_integer(), &BigUint::from(8u32));
    }

    #[test]
    fn test_rejects_composite_modulus() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            setup(&mut rng, &config(2040, 3, 17)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_tiny_security() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = Config {
            security_bits: 2,
            ..Default::default()
        };
        assert!(matches!(
            setup(&mut rng, &cfg),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test_case(2039; "equal to modulus")]
    #[test_case(5000; "larger than modulus")]
    fn test_degree_bound_resampled(bound: u64) {
        let mut rng = StdRng::seed_from_u64(bound);
        let (params, _) = setup(&mut rng, &config(2039, bound, 17)).unwrap();
        let t = params.degree_bound().as_integer();
        assert!(!t.is_zero());
        assert!(t < params.field().modulus());
        assert_eq!(params.srs().len() as u64, t.to_u64().unwrap() + 1);
    }

    #[test]
    fn test_rejects_zero_degree_bound() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            setup(&mut rng, &config(2039, 0, 17)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_zero_trapdoor() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            setup(&mut rng, &config(2039, 3, 2039)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_srs_too_large() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = Config {
            max_powers: 4,
            ..config(2039, 4, 17)
        };
        assert!(matches!(setup(&mut rng, &cfg), Err(Error::SrsTooLarge(_))));
    }

    #[test]
    fn test_random_trapdoor_nonzero() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            let cfg = Config {
                prime: Some(BigUint::from(7u32)),
                degree_bound: Some(BigUint::from(2u32)),
                policy: TrapdoorPolicy::Retain,
                ..Default::default()
            };
            let (_, trapdoor) = setup(&mut rng, &cfg).unwrap();
            assert!(!trapdoor.unwrap().expose().is_zero());
        }
    }

    #[test_traced]
    fn test_retain_trapdoor() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = Config {
            policy: TrapdoorPolicy::Retain,
            ..config(2039, 3, 17)
        };
        let (params, trapdoor) = setup(&mut rng, &cfg).unwrap();
        let trapdoor = trapdoor.unwrap();
        assert_eq!(trapdoor.expose(), params.field().element(17u32));
        assert_eq!(format!("{trapdoor:?}"), "Trapdoor([REDACTED])");
    }

    #[test]
    fn test_display() {
        let mut rng = StdRng::seed_from_u64(0);
        let (params, _) = setup(&mut rng, &config(2039, 3, 17)).unwrap();
        let display = params.to_string();
        assert!(display.contains("Finite Field of size 2039"));
        assert!(display.contains("degree bound 3"));
        assert!(display.ends_with("(trapdoor discarded)"));

        let cfg = Config {
            policy: TrapdoorPolicy::Retain,
            ..config(2039, 3, 17)
        };
        let (params, trapdoor) = setup(&mut rng, &cfg).unwrap();
        assert!(trapdoor.is_some());
        assert_eq!(params.policy(), TrapdoorPolicy::Retain);
        assert!(params.to_string().ends_with("(trapdoor retained)"));
    }
}
