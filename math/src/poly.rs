use crate::{Element, Error, Field};
use std::{
    fmt::Debug,
    ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign},
};

/// A polynomial with coefficients in a prime [`Field`].
///
/// Coefficients are stored densely in ascending order of degree and kept
/// normalized, so two polynomials are equal iff they have the same field and
/// the same coefficients.
#[derive(Clone, PartialEq, Eq)]
pub struct Poly {
    field: Field,
    // Invariant: the last coefficient (if any) is non-zero
    coeffs: Vec<Element>,
}

impl Poly {
    /// Builds a polynomial from ascending coefficients.
    ///
    /// # Panics
    ///
    /// Panics if a coefficient does not belong to `field`.
    pub fn from_coefficients(field: &Field, coeffs: impl IntoIterator<Item = Element>) -> Self {
        let coeffs = coeffs
            .into_iter()
            .inspect(|c| assert!(c.field() == field, "field mismatch"))
            .collect();
        let mut poly = Self {
            field: field.clone(),
            coeffs,
        };
        poly.normalize();
        poly
    }

    /// The zero polynomial.
    pub fn zero(field: &Field) -> Self {
        Self {
            field: field.clone(),
            coeffs: Vec::new(),
        }
    }

    /// The constant polynomial `c`.
    pub fn constant(c: &Element) -> Self {
        Self::from_coefficients(c.field(), [c.clone()])
    }

    /// The indeterminate `x`.
    pub fn x(field: &Field) -> Self {
        Self::from_coefficients(field, [field.zero(), field.one()])
    }

    fn normalize(&mut self) {
        while self.coeffs.last().is_some_and(Element::is_zero) {
            self.coeffs.pop();
        }
    }

    /// Returns the field of the coefficients.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the coefficients in ascending order of degree.
    ///
    /// The zero polynomial has no coefficients.
    pub fn coefficients(&self) -> &[Element] {
        &self.coeffs
    }

    /// The degree of this polynomial.
    ///
    /// The zero polynomial reports degree 0.
    pub fn degree(&self) -> u64 {
        self.coeffs.len().saturating_sub(1) as u64
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Evaluate a polynomial at a particular point.
    ///
    /// For
    ///
    ///   `p(X) := a_0 + a_1 X + a_2 X^2 + ...`
    ///
    /// this returns:
    ///
    ///   `a_0 + a_1 r + a_2 r^2 + ...`
    pub fn eval(&self, r: &Element) -> Element {
        // Evaluation using Horner's method.
        //
        // p(r)
        // = a_0 + a_1 r + ... + a_n r^N =
        // = a_n r^n + ...
        // = ((a_n) r + a_(n - 1))r + ...)
        let mut acc = self.field.zero();
        for coeff in self.coeffs.iter().rev() {
            acc *= r;
            acc += coeff;
        }
        acc
    }

    /// Divides by `(x - point)` using synthetic division.
    ///
    /// Returns `(q, r)` such that `self = (x - point) * q + r`. The remainder
    /// `r` is `self(point)`.
    pub fn div_linear(&self, point: &Element) -> (Self, Element) {
        let Some((leading, rest)) = self.coeffs.split_last() else {
            return (self.clone(), self.field.zero());
        };

        // Horner's method, keeping the intermediate accumulators as the
        // quotient coefficients (highest degree first).
        let mut acc = leading.clone();
        let mut quotient = Vec::with_capacity(rest.len());
        for coeff in rest.iter().rev() {
            quotient.push(acc.clone());
            acc *= point;
            acc += coeff;
        }
        quotient.reverse();
        (Self::from_coefficients(&self.field, quotient), acc)
    }

    /// Returns the unique polynomial of degree `< points.len()` passing
    /// through every `(x, y)` in `points`.
    ///
    /// Uses the Lagrange form: `sum_i y_i * prod_{j != i} (x - x_j) / (x_i - x_j)`.
    pub fn interpolate(field: &Field, points: &[(Element, Element)]) -> Result<Self, Error> {
        if points
            .iter()
            .any(|(x, y)| x.field() != field || y.field() != field)
        {
            return Err(Error::FieldMismatch);
        }

        // The vanishing polynomial prod_j (x - x_j) lets each basis numerator
        // be recovered with a single synthetic division.
        let vanishing = points.iter().fold(Self::constant(&field.one()), |acc, (x, _)| {
            &acc * &(Self::x(field) - &Self::constant(x))
        });

        let mut result = Self::zero(field);
        for (i, (x_i, y_i)) in points.iter().enumerate() {
            let mut denominator = field.one();
            for (j, (x_j, _)) in points.iter().enumerate() {
                if i == j {
                    continue;
                }
                if x_i == x_j {
                    return Err(Error::DuplicatePoint(x_i.clone()));
                }
                denominator *= &(x_i - x_j);
            }
            let weight = y_i * &denominator.inv().ok_or(Error::DivisionByZero)?;
            let (basis, _) = vanishing.div_linear(x_i);
            result += &(basis * &weight);
        }
        Ok(result)
    }

    fn merge_with(&mut self, rhs: &Self, f: impl Fn(&mut Element, &Element)) {
        assert!(self.field == rhs.field, "field mismatch");
        let len = self.coeffs.len().max(rhs.coeffs.len());
        self.coeffs.resize(len, self.field.zero());
        self.coeffs
            .iter_mut()
            .zip(&rhs.coeffs)
            .for_each(|(a, b)| f(a, b));
        self.normalize();
    }
}

impl Debug for Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Poly(")?;
        if self.coeffs.is_empty() {
            write!(f, "0")?;
        }
        for (i, c) in self.coeffs.iter().enumerate() {
            if i > 0 {
                write!(f, " + {c:?} X^{i}")?;
            } else {
                write!(f, "{c:?}")?;
            }
        }
        write!(f, ")")?;
        Ok(())
    }
}

// SECTION: ring operations

impl<'a> AddAssign<&'a Poly> for Poly {
    fn add_assign(&mut self, rhs: &'a Poly) {
        self.merge_with(rhs, |a, b| *a += b);
    }
}

impl<'a> Add<&'a Poly> for Poly {
    type Output = Self;

    fn add(mut self, rhs: &'a Poly) -> Self::Output {
        self += rhs;
        self
    }
}

impl<'a> SubAssign<&'a Poly> for Poly {
    fn sub_assign(&mut self, rhs: &'a Poly) {
        self.merge_with(rhs, |a, b| *a -= b);
    }
}

impl<'a> Sub<&'a Poly> for Poly {
    type Output = Self;

    fn sub(mut self, rhs: &'a Poly) -> Self::Output {
        self -= rhs;
        self
    }
}

impl<'a> Mul<&'a Poly> for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &'a Poly) -> Poly {
        assert!(self.field == rhs.field, "field mismatch");
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero(&self.field);
        }
        let mut coeffs = vec![self.field.zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += &(a * b);
            }
        }
        Poly::from_coefficients(&self.field, coeffs)
    }
}

// SECTION: scaling by field elements

impl<'a> MulAssign<&'a Element> for Poly {
    fn mul_assign(&mut self, rhs: &'a Element) {
        self.coeffs.iter_mut().for_each(|c| *c *= rhs);
        self.normalize();
    }
}

impl<'a> Mul<&'a Element> for Poly {
    type Output = Self;

    fn mul(mut self, rhs: &'a Element) -> Self::Output {
        self *= rhs;
        self
    }
}
