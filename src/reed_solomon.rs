//! Systematic Reed-Solomon parity generation over GF(256).
//!
//! The generator of degree `n` is the product of `(x - alpha^i)` for `i` in `0..n`,
//! coefficients stored highest degree first with a leading 1.

use tracing::trace;

use crate::gf256::Gf256;

/// Builds the generator polynomial of the given degree.
pub fn generator_polynomial(degree: usize) -> Vec<u8> {
    let mut generator = vec![1u8];
    for i in 0..degree {
        generator = Gf256::poly_multiply(&generator, &[1, Gf256::exp(i)]);
    }
    generator
}

/// Computes the `degree` parity codewords for `data`.
///
/// Shorthand for `ReedSolomonGenerator::new(degree).compute_remainder(data)`.
pub fn syndromes(data: &[u8], degree: usize) -> Vec<u8> {
    ReedSolomonGenerator::new(degree).compute_remainder(data)
}

/// A Reed-Solomon generator of fixed degree, reusable across blocks of one symbol.
pub struct ReedSolomonGenerator {
    generator: Vec<u8>,
    degree: usize,
}

impl ReedSolomonGenerator {
    pub fn new(degree: usize) -> Self {
        Self {
            generator: generator_polynomial(degree),
            degree,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Generator coefficients, highest degree first.
    pub fn generator(&self) -> &[u8] {
        &self.generator
    }

    /// Divides `data * x^degree` by the generator and returns the remainder.
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        if self.degree == 0 {
            return Vec::new();
        }
        let mut work = Vec::with_capacity(data.len() + self.degree);
        work.extend_from_slice(data);
        work.resize(data.len() + self.degree, 0);

        for offset in 0..data.len() {
            let lead = work[offset];
            if lead == 0 {
                continue;
            }
            for (w, &g) in work[offset..].iter_mut().zip(self.generator.iter()) {
                *w ^= Gf256::multiply(g, lead);
            }
        }
        trace!(data_len = data.len(), degree = self.degree, "computed parity block");
        work.split_off(data.len())
    }
}
