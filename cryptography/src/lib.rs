//! Commit to polynomials and prove their evaluations with a toy KZG scheme.
//!
//! # Status
//!
//! `tessera-cryptography` is a **pedagogical** model of KZG commitments. The
//! pairing used to verify openings is multiplication in the same prime field
//! the commitments live in, which makes every opening forgeable (see
//! [`kzg::forge`]). It must not be used to protect anything.

pub mod kzg;
