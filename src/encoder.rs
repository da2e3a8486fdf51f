//! Turns text into the final interleaved codeword bit stream.
//!
//! The pipeline is: mode detection, capacity check, header and payload
//! packing, terminator and padding, block division, per-block parity,
//! interleaving.

use core::fmt;

use tracing::debug;

use crate::capacity::{self, VersionProfile};
use crate::error::{QrError, Result};
use crate::qrcode::{CorrectionLevel, Version};
use crate::reed_solomon::ReedSolomonGenerator;

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Pad codewords appended after the terminator, in this order, repeating.
const PAD_BYTES: [u32; 2] = [0xEC, 0x11];

/// Data encoding mode of a symbol.
///
/// Kanji content is not detected; it falls back to [`Mode::Binary`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Binary,
}

impl Mode {
    /// Picks the most compact mode able to represent `text`.
    ///
    /// Numeric is tested first, then alphanumeric, otherwise binary.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrforge::encoder::Mode;
    ///
    /// assert_eq!(Mode::detect("12345"), Mode::Numeric);
    /// assert_eq!(Mode::detect("ABC 123"), Mode::Alphanumeric);
    /// assert_eq!(Mode::detect("héllo"), Mode::Binary);
    /// ```
    pub fn detect(text: &str) -> Self {
        if is_numeric(text) {
            Mode::Numeric
        } else if is_alphanumeric(text) {
            Mode::Alphanumeric
        } else {
            Mode::Binary
        }
    }

    /// The 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use Mode::*;
        match self {
            Numeric => 0b0001,
            Alphanumeric => 0b0010,
            Binary => 0b0100,
        }
    }

    /// Width of the character-count field at the given version.
    pub fn num_char_count_bits(self, version: Version) -> u8 {
        use Mode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Binary => [8, 16, 16],
        })[usize::from((version.value() + 7) / 17)]
    }

    /// Length of `text` as counted by this mode: characters, or UTF-8 bytes for binary.
    pub fn char_count(self, text: &str) -> usize {
        match self {
            Mode::Binary => text.len(),
            _ => text.chars().count(),
        }
    }

    pub fn name(self) -> &'static str {
        use Mode::*;
        match self {
            Numeric => "numeric",
            Alphanumeric => "alphanumeric",
            Binary => "binary",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_numeric(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit())
}

pub fn is_alphanumeric(text: &str) -> bool {
    text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
}

/// An append-only sequence of bits, most significant bit first.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct BitBuffer {
    bits: Vec<bool>,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Appends the low `len` bits of `val`, high bit first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0, "Value does not fit in bit length");
        self.bits
            .extend((0..len).rev().map(|i| (val >> i) & 1 != 0));
    }

    pub fn as_bits(&self) -> &[bool] {
        &self.bits
    }

    /// Packs the bits into bytes. A trailing partial byte is padded with zeros.
    pub fn to_codewords(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &b)| acc | (u8::from(b) << (7 - i)))
            })
            .collect()
    }

    /// Builds a buffer from whole codewords.
    pub fn from_codewords(codewords: &[u8]) -> Self {
        let mut bb = Self::with_capacity(codewords.len() * 8);
        for &cw in codewords {
            bb.append_bits(u32::from(cw), 8);
        }
        bb
    }
}

/// Encodes text for a fixed version and correction level.
pub struct Encoder {
    version: Version,
    level: CorrectionLevel,
    profile: &'static VersionProfile,
}

impl Encoder {
    pub fn new(version: Version, level: CorrectionLevel) -> Self {
        Self {
            version,
            level,
            profile: capacity::profile(version),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn correction_level(&self) -> CorrectionLevel {
        self.level
    }

    /// Maximum characters for `mode` at this version and level.
    pub fn capacity(&self, mode: Mode) -> usize {
        self.profile.char_capacity(self.level, mode)
    }

    /// Encodes `text` into the interleaved data and parity bit stream.
    ///
    /// The result holds exactly `total_codewords * 8` bits.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::CapacityExceeded`] before any encoding work when the
    /// text does not fit this version and level.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrforge::encoder::Encoder;
    /// use qrforge::qrcode::{CorrectionLevel, Version};
    ///
    /// let version = Version::new(1).unwrap();
    /// let bits = Encoder::new(version, CorrectionLevel::Medium).encode("HELLO WORLD").unwrap();
    /// assert_eq!(bits.len(), 26 * 8);
    /// ```
    pub fn encode(&self, text: &str) -> Result<BitBuffer> {
        let data = self.data_codewords(text)?;
        let codewords = self.add_ecc_and_interleave(&data);
        Ok(BitBuffer::from_codewords(&codewords))
    }

    /// Header, payload, terminator and padding, packed into data codewords.
    pub fn data_codewords(&self, text: &str) -> Result<Vec<u8>> {
        let mode = Mode::detect(text);
        let count = mode.char_count(text);
        let max = self.capacity(mode);
        if count > max {
            return Err(QrError::CapacityExceeded {
                mode,
                version: self.version.value(),
                level: self.level,
                max,
                given: count,
            });
        }

        let capacitybits = self.profile.capacity(self.level).bits;
        let mut bb = BitBuffer::with_capacity(capacitybits);
        bb.append_bits(mode.mode_bits(), 4);
        bb.append_bits(count as u32, mode.num_char_count_bits(self.version));
        match mode {
            Mode::Numeric => append_numeric(&mut bb, text),
            Mode::Alphanumeric => append_alphanumeric(&mut bb, text),
            Mode::Binary => append_binary(&mut bb, text),
        }
        let payloadbits = bb.len();
        debug_assert!(payloadbits <= capacitybits);

        // Terminator, truncated when the capacity is nearly reached
        let numzerobits = core::cmp::min(4, capacitybits - bb.len());
        bb.append_bits(0, numzerobits as u8);
        let numzerobits = bb.len().wrapping_neg() & 7;
        bb.append_bits(0, numzerobits as u8);
        debug_assert_eq!(bb.len() % 8, 0);

        for &padbyte in PAD_BYTES.iter().cycle() {
            if bb.len() >= capacitybits {
                break;
            }
            bb.append_bits(padbyte, 8);
        }

        debug!(
            %mode,
            chars = count,
            payload_bits = payloadbits,
            capacity_bits = capacitybits,
            version = self.version.value(),
            level = %self.level,
            "packed data bit stream"
        );
        Ok(bb.to_codewords())
    }

    /// Splits data codewords into blocks, computes parity per block and interleaves.
    pub fn add_ecc_and_interleave(&self, data: &[u8]) -> Vec<u8> {
        let ec = self.profile.error_correction(self.level);
        let data_sizes = block_sizes(data.len(), ec.blocks);
        let ecc_sizes = block_sizes(ec.codewords, ec.blocks);
        let data_blocks = divide_in_blocks(data, &data_sizes);

        let mut ecc_blocks: Vec<Vec<u8>> = Vec::with_capacity(ec.blocks);
        let mut cached: Option<ReedSolomonGenerator> = None;
        for (block, &degree) in data_blocks.iter().zip(ecc_sizes.iter()) {
            if cached.as_ref().is_some_and(|rs| rs.degree() != degree) {
                cached = None;
            }
            let rs = cached.get_or_insert_with(|| ReedSolomonGenerator::new(degree));
            ecc_blocks.push(rs.compute_remainder(block));
        }

        debug!(
            blocks = ec.blocks,
            data_codewords = data.len(),
            ecc_codewords = ec.codewords,
            "computed error correction blocks"
        );
        let mut result = interleave(&data_blocks);
        result.extend(interleave(&ecc_blocks));
        debug_assert_eq!(result.len(), self.profile.total_codewords);
        result
    }
}

/// Splits `total` codewords over `blocks` blocks.
///
/// Every block gets `total / blocks`; the last `total % blocks` blocks get one more.
pub fn block_sizes(total: usize, blocks: usize) -> Vec<usize> {
    if blocks == 0 {
        return Vec::new();
    }
    let base = total / blocks;
    let numlong = total % blocks;
    (0..blocks)
        .map(|i| base + usize::from(i >= blocks - numlong))
        .collect()
}

pub fn divide_in_blocks<'a>(data: &'a [u8], sizes: &[usize]) -> Vec<&'a [u8]> {
    let mut rest = data;
    sizes
        .iter()
        .map(|&size| {
            let (block, tail) = rest.split_at(size.min(rest.len()));
            rest = tail;
            block
        })
        .collect()
}

/// Emits codeword 0 of every block, then codeword 1, and so on,
/// skipping blocks shorter than the current index.
pub fn interleave<B: AsRef<[u8]>>(blocks: &[B]) -> Vec<u8> {
    let maxlen = blocks.iter().map(|b| b.as_ref().len()).max().unwrap_or(0);
    let mut result = Vec::with_capacity(blocks.iter().map(|b| b.as_ref().len()).sum());
    for i in 0..maxlen {
        for block in blocks {
            if let Some(&cw) = block.as_ref().get(i) {
                result.push(cw);
            }
        }
    }
    result
}

fn append_numeric(bb: &mut BitBuffer, text: &str) {
    for group in text.as_bytes().chunks(3) {
        let value = group
            .iter()
            .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
        bb.append_bits(value, (group.len() * 3 + 1) as u8);
    }
}

fn append_alphanumeric(bb: &mut BitBuffer, text: &str) {
    let values: Vec<u32> = text
        .chars()
        .filter_map(|c| ALPHANUMERIC_CHARSET.find(c))
        .map(|i| i as u32)
        .collect();
    for pair in values.chunks(2) {
        match *pair {
            [first, second] => bb.append_bits(first * 45 + second, 11),
            [single] => bb.append_bits(single, 6),
            _ => {}
        }
    }
}

fn append_binary(bb: &mut BitBuffer, text: &str) {
    for b in text.bytes() {
        bb.append_bits(u32::from(b), 8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u8) -> Version {
        Version(n)
    }

    fn bits_to_string(bits: &[bool]) -> String {
        bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("1234567890"));
        assert!(!is_numeric("1234abc"));
        assert!(is_numeric(""));
    }

    #[test]
    fn test_is_alphanumeric() {
        assert!(is_alphanumeric("HELLO WORLD"));
        assert!(!is_alphanumeric("Hello World"));
        assert!(is_alphanumeric("$%*+-./:"));
    }

    #[test]
    fn test_detect_mode() {
        assert_eq!(Mode::detect("12345"), Mode::Numeric);
        assert_eq!(Mode::detect("ABC 123"), Mode::Alphanumeric);
        assert_eq!(Mode::detect("héllo"), Mode::Binary);
        assert_eq!(Mode::detect("hello"), Mode::Binary);
        assert_eq!(Mode::detect(""), Mode::Numeric);
    }

    #[test]
    fn test_char_count_bits_tiers() {
        assert_eq!(Mode::Numeric.num_char_count_bits(v(9)), 10);
        assert_eq!(Mode::Numeric.num_char_count_bits(v(10)), 12);
        assert_eq!(Mode::Numeric.num_char_count_bits(v(27)), 14);
        assert_eq!(Mode::Alphanumeric.num_char_count_bits(v(26)), 11);
        assert_eq!(Mode::Binary.num_char_count_bits(v(9)), 8);
        assert_eq!(Mode::Binary.num_char_count_bits(v(10)), 16);
        assert_eq!(Mode::Binary.num_char_count_bits(v(40)), 16);
    }

    #[test]
    fn test_numeric_packing() {
        let mut bb = BitBuffer::new();
        append_numeric(&mut bb, "01234567");
        assert_eq!(bits_to_string(bb.as_bits()), "000000110001010110011000011");
    }

    #[test]
    fn test_alphanumeric_packing() {
        let mut bb = BitBuffer::new();
        append_alphanumeric(&mut bb, "AC-42");
        assert_eq!(bits_to_string(bb.as_bits()), "0011100111011100111001000010");
    }

    #[test]
    fn test_binary_packing_uses_utf8() {
        let mut bb = BitBuffer::new();
        append_binary(&mut bb, "é");
        assert_eq!(bb.to_codewords(), vec![0xC3, 0xA9]);
    }

    #[test]
    fn test_hello_world_data_codewords() {
        let enc = Encoder::new(v(1), CorrectionLevel::Medium);
        let data = enc.data_codewords("HELLO WORLD").unwrap();
        assert_eq!(
            data,
            vec![32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17]
        );
    }

    #[test]
    fn test_hello_world_full_stream() {
        let enc = Encoder::new(v(1), CorrectionLevel::Medium);
        let bits = enc.encode("HELLO WORLD").unwrap();
        assert_eq!(bits.len(), 26 * 8);
        let codewords = bits.to_codewords();
        assert_eq!(&codewords[16..], &[196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }

    #[test]
    fn test_padding_alternates_starting_with_ec() {
        let enc = Encoder::new(v(1), CorrectionLevel::Low);
        let data = enc.data_codewords("1").unwrap();
        assert_eq!(data.len(), 19);
        // 4 mode + 10 count + 4 digit + 4 terminator = 22 bits -> 3 bytes
        assert_eq!(&data[3..7], &[0xEC, 0x11, 0xEC, 0x11]);
    }

    #[test]
    fn test_terminator_truncated_at_capacity() {
        // 25 alphanumeric chars at 1-L use 151 of 152 bits
        let enc = Encoder::new(v(1), CorrectionLevel::Low);
        let data = enc.data_codewords("ABCDEFGHIJKLMNOPQRSTUVWXY").unwrap();
        assert_eq!(data.len(), 19);
        assert_eq!(enc.encode("ABCDEFGHIJKLMNOPQRSTUVWXY").unwrap().len(), 208);
    }

    #[test]
    fn test_capacity_exceeded() {
        let enc = Encoder::new(v(1), CorrectionLevel::Low);
        let err = enc.encode("abcdefghijklmnopqr").unwrap_err();
        assert_eq!(
            err,
            QrError::CapacityExceeded {
                mode: Mode::Binary,
                version: 1,
                level: CorrectionLevel::Low,
                max: 17,
                given: 18,
            }
        );
        assert!(enc.encode("abcdefghijklmnopq").is_ok());
    }

    #[test]
    fn test_binary_capacity_counts_bytes() {
        let enc = Encoder::new(v(1), CorrectionLevel::Low);
        // 9 two-byte characters = 18 bytes
        assert!(enc.encode("ééééééééé").unwrap_err().is_capacity());
    }

    #[test]
    fn test_block_sizes_extra_on_last_blocks() {
        assert_eq!(block_sizes(62, 4), vec![15, 15, 16, 16]);
        assert_eq!(block_sizes(19, 1), vec![19]);
        assert_eq!(block_sizes(72, 4), vec![18, 18, 18, 18]);
        assert!(block_sizes(10, 0).is_empty());
    }

    #[test]
    fn test_interleave_round_robin() {
        let blocks: Vec<Vec<u8>> = vec![vec![1, 2], vec![3, 4], vec![5, 6, 7]];
        assert_eq!(interleave(&blocks), vec![1, 3, 5, 2, 4, 6, 7]);
    }

    #[test]
    fn test_stream_length_for_every_version() {
        for n in 1..=40 {
            for level in CorrectionLevel::ALL {
                let enc = Encoder::new(v(n), level);
                let bits = enc.encode("HELLO").unwrap();
                assert_eq!(bits.len(), capacity::profile(v(n)).total_codewords * 8);
            }
        }
    }

    #[test]
    fn test_multi_block_data_order() {
        // 5-Q: four blocks of 15, 15, 16, 16 data codewords
        let enc = Encoder::new(v(5), CorrectionLevel::Quartile);
        let data = enc.data_codewords("12345").unwrap();
        let all = enc.add_ecc_and_interleave(&data);
        assert_eq!(all.len(), 134);
        assert_eq!(&all[..4], &[data[0], data[15], data[30], data[46]]);
        // codeword 15 exists only in the two long blocks, emitted last
        assert_eq!(&all[60..62], &[data[45], data[61]]);
    }
}
