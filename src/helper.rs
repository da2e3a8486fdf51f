//! Rendering helpers for finished symbols.
//!
//! Everything here consumes a [`Symbol`] and produces in-memory output: an
//! [`RgbaImage`] with styled modules, an optional centered icon, or console text.

use core::fmt;
use core::num::ParseFloatError;
use core::str::FromStr;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matrix::Cell;
use crate::qrcode::Symbol;

/// Share of the codeword area a centered icon may cover.
const ICON_AREA_RATIO: f64 = 0.15;
/// Largest margin, as a fraction of the module size.
const MAX_MARGIN_RATIO: f32 = 0.2;
/// Largest corner radius, as a fraction of the module size.
const MAX_RADIUS_RATIO: f32 = 0.5;

const RESERVED_DARK_DEBUG: [u8; 3] = [220, 20, 60];
const RESERVED_LIGHT_DEBUG: [u8; 3] = [255, 215, 0];

/// A length given either in pixels or as a percentage of the module size.
///
/// Parses from `"5"`, `"5px"` or `"5%"`, and deserializes from a number or such a string.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "SizeRepr", into = "String")]
pub enum SizeValue {
    Fixed(f32),
    Percent(f32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<SizeRepr> for SizeValue {
    type Error = ParseFloatError;

    fn try_from(repr: SizeRepr) -> Result<Self, Self::Error> {
        match repr {
            SizeRepr::Number(px) => Ok(SizeValue::Fixed(px)),
            SizeRepr::Text(text) => text.parse(),
        }
    }
}

impl From<SizeValue> for String {
    fn from(value: SizeValue) -> Self {
        value.to_string()
    }
}

impl SizeValue {
    /// Resolves to pixels against `reference` (the module size), clamped to `0..=maximum`.
    pub fn resolve(self, reference: f32, maximum: f32) -> f32 {
        let px = match self {
            SizeValue::Fixed(px) => px,
            SizeValue::Percent(pct) => pct / 100.0 * reference,
        };
        if px.is_nan() {
            return 0.0;
        }
        px.clamp(0.0, maximum.max(0.0))
    }
}

impl Default for SizeValue {
    fn default() -> Self {
        SizeValue::Fixed(0.0)
    }
}

impl FromStr for SizeValue {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            Ok(SizeValue::Percent(pct.trim().parse()?))
        } else if let Some(px) = s.strip_suffix("px") {
            Ok(SizeValue::Fixed(px.trim().parse()?))
        } else {
            Ok(SizeValue::Fixed(s.parse()?))
        }
    }
}

impl fmt::Display for SizeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeValue::Fixed(px) => write!(f, "{px}px"),
            SizeValue::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Styling for [`render_image`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Side of one module in pixels.
    pub module_px: u32,
    /// Canvas color, visible through module margins and behind the icon.
    pub background: [u8; 3],
    pub dark: [u8; 3],
    pub light: [u8; 3],
    /// Gap left at the right and bottom of every module, at most 20% of `module_px`.
    pub module_margin: SizeValue,
    /// Corner radius of every module, at most 50% of `module_px`.
    pub module_radius: SizeValue,
    /// Paint function-pattern cells in debug colors.
    pub debug_reserved: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_px: 10,
            background: [0x00, 0xB4, 0xFF],
            dark: [0, 0, 0],
            light: [255, 255, 255],
            module_margin: SizeValue::default(),
            module_radius: SizeValue::default(),
            debug_reserved: false,
        }
    }
}

impl RenderOptions {
    /// Margin in pixels after clamping.
    pub fn margin_px(&self) -> f32 {
        let module = self.module_px as f32;
        self.module_margin.resolve(module, module * MAX_MARGIN_RATIO)
    }

    /// Corner radius in pixels after clamping.
    pub fn radius_px(&self) -> f32 {
        let module = self.module_px as f32;
        self.module_radius.resolve(module, module * MAX_RADIUS_RATIO)
    }
}

fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Side of the square, in modules, that a centered icon may cover.
///
/// `floor(sqrt(floor(max_bits_data * 0.15)))`, made odd so the icon stays centered on a module.
pub fn icon_size_modules(max_bits_data: usize) -> u32 {
    let area = (max_bits_data as f64 * ICON_AREA_RATIO).floor();
    let side = area.sqrt().floor() as u32;
    if side % 2 == 0 {
        side.saturating_sub(1)
    } else {
        side
    }
}

/// True if the pixel centered at `(px, py)` lies in the square `[0, side)` with corners
/// rounded by `radius`.
fn in_rounded_square(px: f32, py: f32, side: f32, radius: f32) -> bool {
    if px < 0.0 || py < 0.0 || px >= side || py >= side {
        return false;
    }
    let radius = radius.min(side / 2.0);
    if radius <= 0.0 {
        return true;
    }
    let cx = px.clamp(radius, side - radius);
    let cy = py.clamp(radius, side - radius);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= radius * radius
}

/// Draws every module of `symbol` as a rounded square.
///
/// The canvas is `size * module_px` pixels square with no quiet zone.
///
/// # Example
///
/// ```rust
/// use qrforge::helper::{render_image, RenderOptions};
/// use qrforge::qrcode::{Symbol, SymbolOptions};
///
/// let symbol = Symbol::new("Hello, World!", &SymbolOptions::default()).unwrap();
/// let img = render_image(&symbol, &RenderOptions::default());
/// assert_eq!(img.dimensions(), (210, 210));
/// ```
pub fn render_image(symbol: &Symbol, options: &RenderOptions) -> RgbaImage {
    let module = options.module_px;
    let side = symbol.size() as u32 * module;
    let mut img = RgbaImage::from_pixel(side, side, rgba(options.background));

    let point = (module as f32 - options.margin_px()).max(0.0);
    let radius = options.radius_px();
    let view = symbol.reserved_view();

    for (row, cells) in view.rows().enumerate() {
        for (col, &cell) in cells.iter().enumerate() {
            let color = match cell {
                Cell::ReservedDark if options.debug_reserved => RESERVED_DARK_DEBUG,
                Cell::ReservedLight if options.debug_reserved => RESERVED_LIGHT_DEBUG,
                c if c.is_dark() => options.dark,
                _ => options.light,
            };
            let color = rgba(color);
            let (x0, y0) = (col as u32 * module, row as u32 * module);
            for dy in 0..module {
                for dx in 0..module {
                    if in_rounded_square(dx as f32 + 0.5, dy as f32 + 0.5, point, radius) {
                        img.put_pixel(x0 + dx, y0 + dy, color);
                    }
                }
            }
        }
    }
    debug!(
        size = symbol.size(),
        module_px = module,
        margin = options.margin_px(),
        radius,
        "rendered symbol"
    );
    img
}

/// Composites `icon` over the center of a canvas produced by [`render_image`].
///
/// The icon is scaled to the square given by [`icon_size_modules`], drawn over a background
/// colored patch. Returns the side of that square in pixels.
pub fn overlay_icon(
    canvas: &mut RgbaImage,
    icon: &RgbaImage,
    symbol: &Symbol,
    options: &RenderOptions,
) -> u32 {
    let side = icon_size_modules(symbol.max_bits_data()) * options.module_px;
    if side == 0 {
        return 0;
    }
    let x = (canvas.width() / 2).saturating_sub(side / 2);
    let y = (canvas.height() / 2).saturating_sub(side / 2);

    let patch = RgbaImage::from_pixel(side, side, rgba(options.background));
    imageops::replace(canvas, &patch, i64::from(x), i64::from(y));
    let scaled = imageops::resize(icon, side, side, FilterType::Triangle);
    imageops::overlay(canvas, &scaled, i64::from(x), i64::from(y));
    side
}

/// Renders the symbol as block characters, two per module, with a `border` of light modules.
pub fn to_text(symbol: &Symbol, border: i32) -> String {
    let size = symbol.size() as i32;
    let mut result = String::new();
    for row in -border..size + border {
        for col in -border..size + border {
            let c = if symbol.get_module(row, col) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Prints the given symbol to the console.
pub fn print_qr(symbol: &Symbol) {
    println!("{}", to_text(symbol, 4));
}
