use tessera_math::Element;

/// A map `e(a, b)` used by the verifier to check openings.
///
/// In a deployed KZG scheme this is a bilinear pairing between two elliptic
/// curve groups. Implementations here act on field elements, so the only way
/// to plug in a sound pairing is to change the group the commitments live in.
pub trait Pairing {
    /// Computes `e(a, b)`.
    fn pair(&self, a: &Element, b: &Element) -> Element;
}

/// The toy pairing `e(a, b) = a * b`.
///
/// It is bilinear over the field, which is enough for honest openings to
/// verify, but it is also trivially invertible, which lets anyone solve the
/// verification equation for a proof.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Toy;

impl Pairing for Toy {
    fn pair(&self, a: &Element, b: &Element) -> Element {
        a * b
    }
}
