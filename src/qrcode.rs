//! QR symbol construction.
//!
//! This module ties the pipeline together: it resolves the version and correction level from the
//! content and the caller's [`SymbolOptions`], runs the [`Encoder`], then drives the
//! [`MatrixBuilder`] through data placement and masking. The resulting [`Symbol`] is immutable.

use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capacity;
use crate::encoder::{Encoder, Mode};
use crate::error::{QrError, Result};
use crate::matrix::{MatrixBuilder, ModuleGrid, Reserved, ReservedView};

/// A finished QR Code symbol, a square grid of dark and light modules.
///
/// Covers QR Code Model 2 versions 1 to 40 and all four correction levels. The grid is fully
/// built by [`Symbol::new`] and never changes afterwards.
///
/// # Example
///
/// ```rust
/// use qrforge::qrcode::{CorrectionLevel, Symbol, SymbolOptions};
///
/// let options = SymbolOptions::default().with_level(CorrectionLevel::Quartile);
/// let symbol = Symbol::new("HELLO WORLD", &options).unwrap();
///
/// assert_eq!(symbol.version().value(), 1);
/// assert_eq!(symbol.size(), 21);
/// ```
#[derive(Clone, Debug)]
pub struct Symbol {
    version: Version,
    level: CorrectionLevel,
    mask: Mask,
    mode: Mode,
    reserved: Reserved,
    grid: ModuleGrid,
}

impl Symbol {
    /// Encodes `content` into a symbol.
    ///
    /// The smallest version that holds the content is chosen, raised to `options.min_version`
    /// if that is larger. When `options.icon` is set the version is at least 2 and levels L and
    /// M are upgraded to Q, leaving room for a centered logo.
    ///
    /// # Errors
    ///
    /// - [`QrError::UnsupportedVersion`] if `min_version` is outside 1..=40.
    /// - [`QrError::UnsupportedMask`] if `mask` is outside 0..=7.
    /// - [`QrError::CapacityExceeded`] if no version up to 40 holds the content.
    pub fn new(content: &str, options: &SymbolOptions) -> Result<Self> {
        let mask = Mask::new(options.mask)?;
        let mut min_version = match options.min_version {
            Some(v) => Version::new(v)?,
            None => Version::MIN,
        };
        let mut level = options.correction_level;
        if options.icon {
            min_version = min_version.max(Version(2));
            if level < CorrectionLevel::Quartile {
                level = CorrectionLevel::Quartile;
            }
        }

        let mode = Mode::detect(content);
        let version = detect_version(content, level)?.max(min_version);
        debug!(
            version = version.value(),
            level = %level,
            %mode,
            mask = mask.value(),
            icon = options.icon,
            "resolved symbol parameters"
        );

        let bits = Encoder::new(version, level).encode(content)?;
        let mut builder = MatrixBuilder::new(version, level);
        builder.place_data(bits.as_bits())?;
        builder.apply_mask(mask);
        let reserved = builder.reserved().clone();

        Ok(Self {
            version,
            level,
            mask,
            mode,
            reserved,
            grid: builder.finish(),
        })
    }

    /// Rows of modules, `grid()[row][col]`, 0 = light and 1 = dark.
    pub fn grid(&self) -> &[Vec<u8>] {
        &self.grid
    }

    /// Width and height in modules, `17 + 4 * version`.
    pub fn size(&self) -> usize {
        self.grid.len()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Correction level actually used, after the icon upgrade.
    pub fn correction_level(&self) -> CorrectionLevel {
        self.level
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Codeword bits the grid carries, `total_codewords * 8`.
    pub fn max_bits_data(&self) -> usize {
        capacity::profile(self.version).max_bits_data()
    }

    /// Returns the color of the module at the given coordinates: `false` for light, `true` for
    /// dark. Coordinates outside the grid are light.
    pub fn get_module(&self, row: i32, col: i32) -> bool {
        let (Ok(r), Ok(c)) = (usize::try_from(row), usize::try_from(col)) else {
            return false;
        };
        self.grid
            .get(r)
            .and_then(|line| line.get(c))
            .is_some_and(|&m| m != 0)
    }

    /// Debug view distinguishing function-pattern cells from data cells.
    pub fn reserved_view(&self) -> ReservedView {
        ReservedView::new(&self.grid, &self.reserved)
    }
}

/// Returns the smallest version whose capacity for the content's mode holds the content.
///
/// # Errors
///
/// Returns [`QrError::CapacityExceeded`], reported against version 40, if nothing fits.
pub fn detect_version(content: &str, level: CorrectionLevel) -> Result<Version> {
    let mode = Mode::detect(content);
    let given = mode.char_count(content);
    (Version::MIN.value()..=Version::MAX.value())
        .map(Version)
        .find(|&v| capacity::profile(v).char_capacity(level, mode) >= given)
        .ok_or_else(|| QrError::CapacityExceeded {
            mode,
            version: Version::MAX.value(),
            level,
            max: capacity::profile(Version::MAX).char_capacity(level, mode),
            given,
        })
}

/// Caller-facing knobs for [`Symbol::new`].
///
/// Deserializable so a host can keep it in its own configuration; every field is optional.
///
/// ```rust
/// use qrforge::qrcode::{CorrectionLevel, SymbolOptions};
///
/// let options = SymbolOptions::default()
///     .with_level(CorrectionLevel::High)
///     .with_mask(3)
///     .with_min_version(5);
/// assert_eq!(options.min_version, Some(5));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolOptions {
    /// Lower bound for the version, 1..=40.
    pub min_version: Option<u8>,
    pub correction_level: CorrectionLevel,
    /// Mask pattern 0..=7.
    pub mask: u8,
    /// Reserve room for a centered icon.
    pub icon: bool,
}

impl Default for SymbolOptions {
    fn default() -> Self {
        Self {
            min_version: None,
            correction_level: CorrectionLevel::Low,
            mask: 0,
            icon: false,
        }
    }
}

impl SymbolOptions {
    pub fn with_min_version(mut self, version: u8) -> Self {
        self.min_version = Some(version);
        self
    }

    pub fn with_level(mut self, level: CorrectionLevel) -> Self {
        self.correction_level = level;
        self
    }

    pub fn with_mask(mut self, mask: u8) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_icon(mut self, icon: bool) -> Self {
        self.icon = icon;
        self
    }
}

/// The error correction level in a QR Code symbol, ordered by increasing redundancy.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum CorrectionLevel {
    /// Tolerates ~7% erroneous codewords.
    #[serde(rename = "L", alias = "l")]
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[serde(rename = "M", alias = "m")]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    #[serde(rename = "Q", alias = "q")]
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    #[serde(rename = "H", alias = "h")]
    High,
}

impl CorrectionLevel {
    /// All levels, least redundant first.
    pub const ALL: [CorrectionLevel; 4] = [
        CorrectionLevel::Low,
        CorrectionLevel::Medium,
        CorrectionLevel::Quartile,
        CorrectionLevel::High,
    ];

    /// Returns an index in the range 0 to 3, in order of redundancy.
    pub fn ordinal(self) -> usize {
        use CorrectionLevel::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns the 2-bit identifier stored in the format information.
    pub fn format_bits(self) -> u8 {
        use CorrectionLevel::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }

    /// Single-letter name.
    pub fn letter(self) -> char {
        use CorrectionLevel::*;
        match self {
            Low => 'L',
            Medium => 'M',
            Quartile => 'Q',
            High => 'H',
        }
    }
}

impl fmt::Display for CorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for CorrectionLevel {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(CorrectionLevel::Low),
            "M" => Ok(CorrectionLevel::Medium),
            "Q" => Ok(CorrectionLevel::Quartile),
            "H" => Ok(CorrectionLevel::High),
            _ => Err(QrError::UnsupportedCorrectionLevel(s.to_string())),
        }
    }
}

/// A number between 1 and 40 (inclusive).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(pub(crate) u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::UnsupportedVersion`] if the number is outside the range [1, 40].
    pub fn new(ver: u8) -> Result<Self> {
        if (Version::MIN.value()..=Version::MAX.value()).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(QrError::UnsupportedVersion(ver))
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of a symbol of this version, in modules.
    pub const fn size(self) -> usize {
        (self.0 as usize) * 4 + 17
    }
}

impl TryFrom<u8> for Version {
    type Error = QrError;

    fn try_from(ver: u8) -> Result<Self> {
        Version::new(ver)
    }
}

/// A number between 0 and 7 (inclusive).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Mask(pub(crate) u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::UnsupportedMask`] if the number is outside the range [0, 7].
    pub fn new(mask: u8) -> Result<Self> {
        if mask <= 7 {
            Ok(Self(mask))
        } else {
            Err(QrError::UnsupportedMask(mask))
        }
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Mask {
    type Error = QrError;

    fn try_from(mask: u8) -> Result<Self> {
        Mask::new(mask)
    }
}
