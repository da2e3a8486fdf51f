//! Per-version capacity and block layout data for QR Code Model 2.
//!
//! Profiles for all 40 versions are derived once from the ISO/IEC 18004
//! block tables and shared read-only afterwards.

use once_cell::sync::Lazy;

use crate::encoder::Mode;
use crate::qrcode::{CorrectionLevel, Version};

/// Data capacity of one version at one correction level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LevelCapacity {
    /// Data codewords (excluding parity).
    pub codewords: usize,
    /// Data bits, `codewords * 8`.
    pub bits: usize,
    pub numeric: usize,
    pub alphanumeric: usize,
    pub binary: usize,
    pub kanji: usize,
}

/// Error correction layout of one version at one correction level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EcBlocks {
    /// Number of blocks the codewords are split into.
    pub blocks: usize,
    /// Total parity codewords across all blocks.
    pub codewords: usize,
}

/// Static description of one QR version.
#[derive(Clone, Debug)]
pub struct VersionProfile {
    pub version: Version,
    /// Data plus parity codewords.
    pub total_codewords: usize,
    capacity: [LevelCapacity; 4],
    error_correction: [EcBlocks; 4],
}

impl VersionProfile {
    pub fn capacity(&self, level: CorrectionLevel) -> &LevelCapacity {
        &self.capacity[level.ordinal()]
    }

    pub fn error_correction(&self, level: CorrectionLevel) -> &EcBlocks {
        &self.error_correction[level.ordinal()]
    }

    /// Maximum number of characters (bytes in binary mode) for the given level and mode.
    pub fn char_capacity(&self, level: CorrectionLevel, mode: Mode) -> usize {
        let cap = self.capacity(level);
        use Mode::*;
        match mode {
            Numeric => cap.numeric,
            Alphanumeric => cap.alphanumeric,
            Binary => cap.binary,
        }
    }

    /// Bits available in the grid for codewords, `total_codewords * 8`.
    pub fn max_bits_data(&self) -> usize {
        self.total_codewords * 8
    }
}

/// Returns the profile of the given version.
pub fn profile(version: Version) -> &'static VersionProfile {
    &PROFILES[usize::from(version.value()) - 1]
}

static PROFILES: Lazy<Vec<VersionProfile>> = Lazy::new(|| {
    (Version::MIN.value()..=Version::MAX.value())
        .map(|v| build_profile(Version(v)))
        .collect()
});

fn build_profile(version: Version) -> VersionProfile {
    let total_codewords = num_raw_data_modules(version) / 8;
    let mut capacity = [LevelCapacity {
        codewords: 0,
        bits: 0,
        numeric: 0,
        alphanumeric: 0,
        binary: 0,
        kanji: 0,
    }; 4];
    let mut error_correction = [EcBlocks { blocks: 0, codewords: 0 }; 4];

    for level in CorrectionLevel::ALL {
        let idx = level.ordinal();
        let blocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, version, level);
        let ecc_codewords = blocks * table_get(&ECC_CODEWORDS_PER_BLOCK, version, level);
        let codewords = total_codewords - ecc_codewords;
        let bits = codewords * 8;
        capacity[idx] = LevelCapacity {
            codewords,
            bits,
            numeric: max_chars(bits, version, CountKind::Numeric),
            alphanumeric: max_chars(bits, version, CountKind::Alphanumeric),
            binary: max_chars(bits, version, CountKind::Binary),
            kanji: max_chars(bits, version, CountKind::Kanji),
        };
        error_correction[idx] = EcBlocks {
            blocks,
            codewords: ecc_codewords,
        };
    }

    VersionProfile {
        version,
        total_codewords,
        capacity,
        error_correction,
    }
}

#[derive(Clone, Copy)]
enum CountKind {
    Numeric,
    Alphanumeric,
    Binary,
    Kanji,
}

/// Width of the character-count field for a kind and version tier.
fn count_bits(kind: CountKind, version: Version) -> usize {
    let tier = usize::from((version.value() + 7) / 17);
    use CountKind::*;
    (match kind {
        Numeric => [10, 12, 14],
        Alphanumeric => [9, 11, 13],
        Binary => [8, 16, 16],
        Kanji => [8, 10, 12],
    })[tier]
}

/// Largest character count whose header and payload fit in `data_bits`.
fn max_chars(data_bits: usize, version: Version, kind: CountKind) -> usize {
    let ccbits = count_bits(kind, version);
    let avail = data_bits.saturating_sub(4 + ccbits);
    use CountKind::*;
    let chars = match kind {
        Numeric => {
            let rem = avail % 10;
            avail / 10 * 3 + usize::from(rem >= 4) + usize::from(rem >= 7)
        }
        Alphanumeric => avail / 11 * 2 + usize::from(avail % 11 >= 6),
        Binary => avail / 8,
        Kanji => avail / 13,
    };
    chars.min((1 << ccbits) - 1)
}

/// Modules available for codewords and remainder bits after all function patterns.
fn num_raw_data_modules(version: Version) -> usize {
    let ver = usize::from(version.value());
    let mut result: usize = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign: usize = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

fn table_get(table: &'static [[u8; 41]; 4], version: Version, level: CorrectionLevel) -> usize {
    usize::from(table[level.ordinal()][usize::from(version.value())])
}

// Index: [level ordinal][version], column 0 unused.
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // L
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // M
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Q
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // H
];

static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // L
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // M
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Q
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // H
];

#[cfg(test)]
mod tests {
    use super::*;
    use CorrectionLevel::*;

    fn v(n: u8) -> Version {
        Version(n)
    }

    #[test]
    fn test_version_1() {
        let p = profile(v(1));
        assert_eq!(p.total_codewords, 26);
        let l = p.capacity(Low);
        assert_eq!((l.codewords, l.bits), (19, 152));
        assert_eq!((l.numeric, l.alphanumeric, l.binary, l.kanji), (41, 25, 17, 10));
        let h = p.capacity(High);
        assert_eq!((h.codewords, h.numeric, h.alphanumeric, h.binary, h.kanji), (9, 17, 10, 7, 4));
        assert_eq!(p.error_correction(Low), &EcBlocks { blocks: 1, codewords: 7 });
        assert_eq!(p.error_correction(High), &EcBlocks { blocks: 1, codewords: 17 });
    }

    #[test]
    fn test_known_rows() {
        let p = profile(v(5));
        assert_eq!(p.total_codewords, 134);
        let q = p.capacity(Quartile);
        assert_eq!((q.codewords, q.numeric, q.alphanumeric, q.binary, q.kanji), (62, 144, 87, 60, 37));
        assert_eq!(p.error_correction(Quartile), &EcBlocks { blocks: 4, codewords: 72 });

        let p = profile(v(10));
        assert_eq!(p.total_codewords, 346);
        assert_eq!(p.capacity(Low).binary, 271);
        assert_eq!(p.capacity(Medium).alphanumeric, 311);

        let p = profile(v(40));
        assert_eq!(p.total_codewords, 3706);
        let l = p.capacity(Low);
        assert_eq!((l.numeric, l.alphanumeric, l.binary, l.kanji), (7089, 4296, 2953, 1817));
        let h = p.capacity(High);
        assert_eq!((h.numeric, h.alphanumeric, h.binary, h.kanji), (3057, 1852, 1273, 784));
    }

    #[test]
    fn test_codewords_add_up() {
        for n in 1..=40 {
            let p = profile(v(n));
            assert_eq!(p.version, v(n));
            for level in CorrectionLevel::ALL {
                let data = p.capacity(level).codewords;
                let ecc = p.error_correction(level).codewords;
                assert_eq!(data + ecc, p.total_codewords);
                assert_eq!(p.capacity(level).bits, data * 8);
            }
        }
    }

    #[test]
    fn test_capacity_shrinks_with_redundancy() {
        for n in 1..=40 {
            let p = profile(v(n));
            let caps: Vec<usize> = CorrectionLevel::ALL.iter().map(|&l| p.capacity(l).binary).collect();
            assert!(caps.windows(2).all(|w| w[0] > w[1]), "version {n}: {caps:?}");
        }
    }

    #[test]
    fn test_char_capacity_by_mode() {
        let p = profile(v(1));
        assert_eq!(p.char_capacity(Low, Mode::Numeric), 41);
        assert_eq!(p.char_capacity(Low, Mode::Alphanumeric), 25);
        assert_eq!(p.char_capacity(Low, Mode::Binary), 17);
        assert_eq!(p.max_bits_data(), 208);
    }
}
