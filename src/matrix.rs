//! Module grid construction: function patterns, data placement, masking and
//! format/version metadata.
//!
//! A [`MatrixBuilder`] moves through its states exactly once:
//! structural patterns are drawn by [`MatrixBuilder::new`], then
//! [`MatrixBuilder::place_data`] writes the codeword bits, then
//! [`MatrixBuilder::apply_mask`] masks the data area and draws the format
//! information, and [`MatrixBuilder::finish`] hands out the grid.
//!
//! Coordinates are `(row, col)` with `(0, 0)` at the top-left corner.

use crate::error::{QrError, Result};
use crate::qrcode::{CorrectionLevel, Mask, Version};

/// Square grid of modules, `grid[row][col]`, 0 = light and 1 = dark.
pub type ModuleGrid = Vec<Vec<u8>>;

static FINDER_PATTERN: [[u8; 7]; 7] = [
    [1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 0, 1],
    [1, 0, 1, 1, 1, 0, 1],
    [1, 0, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1],
];

static ALIGNMENT_PATTERN: [[u8; 5]; 5] = [
    [1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 1, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 1, 1, 1, 1],
];

static MASK_0: [&[u8]; 2] = [&[1, 0], &[0, 1]];
static MASK_1: [&[u8]; 2] = [&[1, 1], &[0, 0]];
static MASK_2: [&[u8]; 3] = [&[1, 0, 0], &[1, 0, 0], &[1, 0, 0]];
static MASK_3: [&[u8]; 3] = [&[1, 0, 0], &[0, 0, 1], &[0, 1, 0]];
static MASK_4: [&[u8]; 4] = [
    &[1, 1, 1, 0, 0, 0],
    &[1, 1, 1, 0, 0, 0],
    &[0, 0, 0, 1, 1, 1],
    &[0, 0, 0, 1, 1, 1],
];
static MASK_5: [&[u8]; 6] = [
    &[1, 1, 1, 1, 1, 1],
    &[1, 0, 0, 0, 0, 0],
    &[1, 0, 0, 1, 0, 0],
    &[1, 0, 1, 0, 1, 0],
    &[1, 0, 0, 1, 0, 0],
    &[1, 0, 0, 0, 0, 0],
];
static MASK_6: [&[u8]; 6] = [
    &[1, 1, 1, 1, 1, 1],
    &[1, 1, 1, 0, 0, 0],
    &[1, 1, 0, 1, 1, 0],
    &[1, 0, 1, 0, 1, 0],
    &[1, 0, 1, 1, 0, 1],
    &[1, 0, 0, 0, 1, 1],
];
static MASK_7: [&[u8]; 6] = [
    &[1, 0, 1, 0, 1, 0],
    &[0, 0, 0, 1, 1, 1],
    &[1, 0, 0, 0, 1, 1],
    &[0, 1, 0, 1, 0, 1],
    &[1, 1, 1, 0, 0, 0],
    &[0, 1, 1, 1, 0, 0],
];

/// Returns the repeating tile of a mask pattern, indexed `[row][col]`.
pub fn mask_tile(mask: Mask) -> &'static [&'static [u8]] {
    match mask.value() {
        0 => &MASK_0,
        1 => &MASK_1,
        2 => &MASK_2,
        3 => &MASK_3,
        4 => &MASK_4,
        5 => &MASK_5,
        6 => &MASK_6,
        _ => &MASK_7,
    }
}

/// Whether the mask inverts the module at `(row, col)`.
pub fn mask_bit(mask: Mask, row: usize, col: usize) -> u8 {
    let tile = mask_tile(mask);
    let line = tile[row % tile.len()];
    line[col % line.len()]
}

/// XORs the mask tile into every cell of `grid`, reserved cells included.
///
/// Applying the same mask twice restores the grid.
pub fn xor_mask(grid: &mut ModuleGrid, mask: Mask) {
    for (row, line) in grid.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            *cell ^= mask_bit(mask, row, col);
        }
    }
}

/// Side length in modules for a version.
pub fn size_for(version: Version) -> usize {
    17 + 4 * usize::from(version.value())
}

/// Alignment pattern center coordinates for a version, ascending.
///
/// The first is always 6 and the last `size - 7`; the rest are spaced by an
/// even step measured back from the last.
pub fn alignment_pattern_positions(version: Version) -> Vec<usize> {
    let ver = usize::from(version.value());
    if ver == 1 {
        return Vec::new();
    }
    let numalign = ver / 7 + 2;
    let step = if ver == 32 {
        26
    } else {
        (ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2) * 2
    };
    let size = size_for(version);
    let mut result: Vec<usize> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}

/// 15-bit format information: BCH(15,5) code of level and mask, XOR-masked.
pub fn format_bits(level: CorrectionLevel, mask: Mask) -> u32 {
    let data = u32::from((level.format_bits() << 3) | mask.value());
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0b101_0011_0111);
    }
    ((data << 10) | rem) ^ 0b101_0100_0001_0010
}

/// 18-bit version information: BCH(18,6) code of the version number.
pub fn version_bits(version: Version) -> u32 {
    let ver = u32::from(version.value());
    let mut rem = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0b1_1111_0010_0101);
    }
    (ver << 12) | rem
}

fn get_bit(x: u32, i: usize) -> u8 {
    ((x >> i) & 1) as u8
}

/// Position rules deciding which cells belong to function patterns.
///
/// Not materialized: every query is computed from the version, so drawing,
/// placement and masking all see the same answer.
#[derive(Clone, Debug)]
pub struct Reserved {
    version: Version,
    size: usize,
    alignment: Vec<usize>,
}

impl Reserved {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            size: size_for(version),
            alignment: alignment_pattern_positions(version),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// True if `(row, col)` is outside the data area.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.in_finder(row, col)
            || self.in_timing(row, col)
            || self.in_alignment(row, col)
            || self.in_format(row, col)
            || self.in_version(row, col)
    }

    /// Finder pattern plus separator, an 8x8 zone per corner.
    pub fn in_finder(&self, row: usize, col: usize) -> bool {
        let far = self.size - 8;
        (row < 8 && col < 8) || (row >= far && col < 8) || (row < 8 && col >= far)
    }

    pub fn in_timing(&self, row: usize, col: usize) -> bool {
        let inner = 8..self.size - 8;
        (row == 6 && inner.contains(&col)) || (col == 6 && inner.contains(&row))
    }

    pub fn in_alignment(&self, row: usize, col: usize) -> bool {
        self.alignment_centers()
            .any(|(r, c)| row.abs_diff(r) <= 2 && col.abs_diff(c) <= 2)
    }

    /// Format strips along row 8 and column 8, including the dark module.
    pub fn in_format(&self, row: usize, col: usize) -> bool {
        let far = self.size - 8;
        (row == 8 && (col <= 8 || col >= far)) || (col == 8 && (row <= 8 || row >= far))
    }

    pub fn in_version(&self, row: usize, col: usize) -> bool {
        if self.version.value() < 7 {
            return false;
        }
        let block = self.size - 11..self.size - 8;
        (row < 6 && block.contains(&col)) || (col < 6 && block.contains(&row))
    }

    /// Centers of the drawn alignment patterns, skipping those inside a finder zone.
    pub fn alignment_centers(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.alignment
            .iter()
            .flat_map(move |&r| self.alignment.iter().map(move |&c| (r, c)))
            .filter(move |&(r, c)| !self.in_finder(r, c))
    }

    /// Number of reserved cells in the grid.
    pub fn count(&self) -> usize {
        (0..self.size)
            .flat_map(|row| (0..self.size).map(move |col| (row, col)))
            .filter(|&(row, col)| self.contains(row, col))
            .count()
    }
}

/// Order in which data bits fill the non-reserved cells.
///
/// Starts at the bottom-right corner and sweeps two columns at a time,
/// right column first, reversing direction at the top and bottom edges.
/// Column 6 (vertical timing) is skipped.
pub struct Placement<'a> {
    reserved: &'a Reserved,
    row: usize,
    right: Option<usize>,
    upward: bool,
    pending: Option<(usize, usize)>,
}

impl<'a> Placement<'a> {
    pub fn new(reserved: &'a Reserved) -> Self {
        let last = reserved.size() - 1;
        Self {
            reserved,
            row: last,
            right: Some(last),
            upward: true,
            pending: None,
        }
    }

    fn advance(&mut self) {
        let last = self.reserved.size() - 1;
        let at_edge = if self.upward { self.row == 0 } else { self.row == last };
        if at_edge {
            self.upward = !self.upward;
            self.right = self.right.and_then(|r| r.checked_sub(2)).and_then(|r| {
                if r == 6 {
                    r.checked_sub(1)
                } else {
                    Some(r)
                }
            });
        } else if self.upward {
            self.row -= 1;
        } else {
            self.row += 1;
        }
    }
}

impl Iterator for Placement<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cell) = self.pending.take() {
                return Some(cell);
            }
            let right = self.right?;
            let row = self.row;
            let reserved = self.reserved;
            let mut cells = [right, right.wrapping_sub(1)]
                .into_iter()
                .filter(|&col| col < reserved.size())
                .filter(|&col| !reserved.contains(row, col))
                .map(|col| (row, col));
            let first = cells.next();
            self.pending = cells.next();
            self.advance();
            if first.is_some() {
                return first;
            }
        }
    }
}

/// Builder for one symbol's module grid.
pub struct MatrixBuilder {
    version: Version,
    level: CorrectionLevel,
    reserved: Reserved,
    grid: ModuleGrid,
}

impl MatrixBuilder {
    /// Allocates the grid and draws finder, timing, alignment and version patterns.
    pub fn new(version: Version, level: CorrectionLevel) -> Self {
        let reserved = Reserved::new(version);
        let size = reserved.size();
        let mut result = Self {
            version,
            level,
            reserved,
            grid: vec![vec![0u8; size]; size],
        };
        result.draw_finder_patterns();
        result.draw_timing_patterns();
        result.draw_alignment_patterns();
        result.draw_version_info();
        result
    }

    pub fn size(&self) -> usize {
        self.reserved.size()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn reserved(&self) -> &Reserved {
        &self.reserved
    }

    pub fn grid(&self) -> &ModuleGrid {
        &self.grid
    }

    /// Bits the grid accepts, `total_codewords * 8`.
    pub fn max_bits_data(&self) -> usize {
        crate::capacity::profile(self.version).max_bits_data()
    }

    /// Writes `bits` into the data area in placement order.
    ///
    /// Cells left over after the last bit keep the value 0.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::DataTooLong`] without touching the grid when `bits`
    /// is longer than [`max_bits_data`](Self::max_bits_data).
    pub fn place_data(&mut self, bits: &[bool]) -> Result<()> {
        let max = self.max_bits_data();
        if bits.len() > max {
            return Err(QrError::DataTooLong {
                max,
                given: bits.len(),
            });
        }
        let cells: Vec<(usize, usize)> = Placement::new(&self.reserved).take(bits.len()).collect();
        for ((row, col), &bit) in cells.into_iter().zip(bits) {
            self.grid[row][col] = u8::from(bit);
        }
        Ok(())
    }

    /// XORs the mask tile into every non-reserved cell and draws the format information.
    pub fn apply_mask(&mut self, mask: Mask) {
        let size = self.size();
        for row in 0..size {
            for col in 0..size {
                if !self.reserved.contains(row, col) {
                    self.grid[row][col] ^= mask_bit(mask, row, col);
                }
            }
        }
        self.draw_format_info(mask);
    }

    pub fn finish(self) -> ModuleGrid {
        self.grid
    }

    fn draw(&mut self, figure: &[[u8; 7]], row: usize, col: usize) {
        for (dr, line) in figure.iter().enumerate() {
            self.grid[row + dr][col..col + line.len()].copy_from_slice(line);
        }
    }

    fn draw_finder_patterns(&mut self) {
        let far = self.size() - 7;
        self.draw(&FINDER_PATTERN, 0, 0);
        self.draw(&FINDER_PATTERN, 0, far);
        self.draw(&FINDER_PATTERN, far, 0);
    }

    fn draw_timing_patterns(&mut self) {
        for i in 8..self.size() - 8 {
            let bit = u8::from(i % 2 == 0);
            self.grid[6][i] = bit;
            self.grid[i][6] = bit;
        }
    }

    fn draw_alignment_patterns(&mut self) {
        let centers: Vec<(usize, usize)> = self.reserved.alignment_centers().collect();
        for (r, c) in centers {
            for (dr, line) in ALIGNMENT_PATTERN.iter().enumerate() {
                self.grid[r - 2 + dr][c - 2..c + 3].copy_from_slice(line);
            }
        }
    }

    fn draw_version_info(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits = version_bits(self.version);
        let base = self.size() - 11;
        for i in 0..18 {
            let bit = get_bit(bits, i);
            let a = base + i % 3;
            let b = i / 3;
            self.grid[b][a] = bit;
            self.grid[a][b] = bit;
        }
    }

    fn draw_format_info(&mut self, mask: Mask) {
        let bits = format_bits(self.level, mask);
        let size = self.size();

        // Around the top-left finder
        for i in 0..6 {
            self.grid[i][8] = get_bit(bits, i);
        }
        self.grid[7][8] = get_bit(bits, 6);
        self.grid[8][8] = get_bit(bits, 7);
        self.grid[8][7] = get_bit(bits, 8);
        for i in 9..15 {
            self.grid[8][14 - i] = get_bit(bits, i);
        }

        // Split across the top-right and bottom-left finders
        for i in 0..8 {
            self.grid[8][size - 1 - i] = get_bit(bits, i);
        }
        for i in 8..15 {
            self.grid[size - 15 + i][8] = get_bit(bits, i);
        }
        self.grid[size - 8][8] = 1;
    }
}

/// Debug classification of one cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Light,
    Dark,
    ReservedLight,
    ReservedDark,
}

impl Cell {
    pub fn is_dark(self) -> bool {
        matches!(self, Cell::Dark | Cell::ReservedDark)
    }

    pub fn is_reserved(self) -> bool {
        matches!(self, Cell::ReservedLight | Cell::ReservedDark)
    }
}

/// Annotated copy of a finished grid marking function-pattern cells.
///
/// Used by renderers to paint reserved areas in a distinct color; the
/// production grid is left untouched.
#[derive(Clone, Debug)]
pub struct ReservedView {
    cells: Vec<Vec<Cell>>,
}

impl ReservedView {
    pub fn new(grid: &ModuleGrid, reserved: &Reserved) -> Self {
        let cells = grid
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.iter()
                    .enumerate()
                    .map(|(col, &value)| match (reserved.contains(row, col), value != 0) {
                        (false, false) => Cell::Light,
                        (false, true) => Cell::Dark,
                        (true, false) => Cell::ReservedLight,
                        (true, true) => Cell::ReservedDark,
                    })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|line| line.get(col)).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }
}
