//! Arithmetic over GF(2^8) with reduction polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D).
//!
//! The log/antilog tables are built once on first use and shared read-only
//! by every symbol afterwards.

use once_cell::sync::Lazy;

use crate::error::{QrError, Result};

/// Reduction polynomial for the QR code field.
pub const PRIMITIVE_POLYNOMIAL: u16 = 0x11D;

struct Tables {
    log: [u8; 256],
    antilog: [u8; 256],
}

static TABLES: Lazy<Tables> = Lazy::new(|| {
    let mut log = [0u8; 256];
    let mut antilog = [0u8; 256];
    let mut value: u16 = 1;
    for i in 0..255u16 {
        antilog[usize::from(i)] = value as u8;
        log[usize::from(value)] = i as u8;
        value <<= 1;
        if value >= 256 {
            value ^= PRIMITIVE_POLYNOMIAL;
        }
    }
    antilog[255] = antilog[0];
    Tables { log, antilog }
});

/// GF(256) field operations using log/antilog tables.
pub struct Gf256;

impl Gf256 {
    /// Discrete logarithm of `x` to base 2. `log(0)` is defined as 0.
    pub fn log(x: u8) -> u8 {
        TABLES.log[usize::from(x)]
    }

    /// Returns 2 raised to `i`, for `i` in 0..=255.
    pub fn antilog(i: u8) -> u8 {
        TABLES.antilog[usize::from(i)]
    }

    pub fn multiply(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let sum = usize::from(Self::log(a)) + usize::from(Self::log(b));
        TABLES.antilog[sum % 255]
    }

    /// Divides `dividend` by `divisor`.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::DivisionByZero`] when `divisor` is 0.
    pub fn divide(dividend: u8, divisor: u8) -> Result<u8> {
        if divisor == 0 {
            return Err(QrError::DivisionByZero);
        }
        if dividend == 0 {
            return Ok(0);
        }
        let diff = usize::from(Self::log(dividend)) + 255 - usize::from(Self::log(divisor));
        Ok(TABLES.antilog[diff % 255])
    }

    /// Returns alpha^x, with the exponent reduced modulo 255.
    pub fn exp(x: usize) -> u8 {
        TABLES.antilog[x % 255]
    }

    /// Multiplies two polynomials given as coefficient slices, highest degree first.
    ///
    /// The result has `a.len() + b.len() - 1` coefficients. An empty operand
    /// yields an empty product.
    pub fn poly_multiply(a: &[u8], b: &[u8]) -> Vec<u8> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut result = vec![0u8; a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate() {
                result[i + j] ^= Self::multiply(x, y);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_round_trip() {
        for a in 1..=255u8 {
            assert_eq!(Gf256::antilog(Gf256::log(a)), a);
        }
        for i in 0..255u8 {
            assert_eq!(Gf256::log(Gf256::antilog(i)), i);
        }
    }

    #[test]
    fn test_multiply() {
        assert_eq!(Gf256::multiply(2, 2), 4);
        // 128 * 2 overflows and is reduced by 0x11D
        assert_eq!(Gf256::multiply(128, 2), 29);
        assert_eq!(Gf256::multiply(0, 77), 0);
        assert_eq!(Gf256::multiply(77, 0), 0);
        assert_eq!(Gf256::multiply(1, 200), 200);
    }

    #[test]
    fn test_multiply_commutes() {
        for a in (0..=255u8).step_by(7) {
            for b in (0..=255u8).step_by(11) {
                assert_eq!(Gf256::multiply(a, b), Gf256::multiply(b, a));
            }
        }
    }

    #[test]
    fn test_divide() {
        for x in 1..=255u8 {
            assert_eq!(Gf256::divide(x, x), Ok(1));
            assert_eq!(Gf256::divide(0, x), Ok(0));
        }
        assert_eq!(Gf256::divide(29, 2), Ok(128));
        assert_eq!(Gf256::divide(5, 0), Err(QrError::DivisionByZero));
    }

    #[test]
    fn test_divide_inverts_multiply() {
        for a in (1..=255u8).step_by(5) {
            for b in (1..=255u8).step_by(13) {
                let product = Gf256::multiply(a, b);
                assert_eq!(Gf256::divide(product, b), Ok(a));
            }
        }
    }

    #[test]
    fn test_exp() {
        assert_eq!(Gf256::exp(0), 1);
        assert_eq!(Gf256::exp(8), 29);
        assert_eq!(Gf256::exp(255), 1);
        assert_eq!(Gf256::exp(260), Gf256::exp(5));
    }

    #[test]
    fn test_poly_multiply() {
        // (x + 1)(x + 2) = x^2 + 3x + 2
        assert_eq!(Gf256::poly_multiply(&[1, 1], &[1, 2]), vec![1, 3, 2]);
        assert_eq!(Gf256::poly_multiply(&[1], &[5, 6, 7]), vec![5, 6, 7]);
        assert!(Gf256::poly_multiply(&[], &[1]).is_empty());
    }
}
