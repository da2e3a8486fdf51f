//! # qrforge
//!
//! A Rust library for encoding text into QR Code symbols.
//!
//! `qrforge` turns a string into a QR Code Model 2 module grid following ISO/IEC 18004: mode
//! detection, bit-stream packing, Reed-Solomon error correction over GF(256), block
//! interleaving, function-pattern layout, data placement, masking and format/version metadata.
//! It supports versions 1 to 40 and all four correction levels. The finished grid can be drawn
//! into an in-memory image with styled modules and an optional centered icon.
//!
//! ## Features
//!
//! - Encode text in numeric, alphanumeric or byte mode, picked automatically.
//! - Pick the smallest version that fits, with an optional minimum.
//! - Reserve room for a logo: icon symbols use at least version 2 and level Q.
//! - Render to an `image::RgbaImage` with custom colors, module margin and corner radius.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrforge = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! ```rust
//! use qrforge::{CorrectionLevel, Symbol, SymbolOptions};
//! use qrforge::helper::{render_image, RenderOptions, SizeValue};
//!
//! let options = SymbolOptions::default()
//!     .with_level(CorrectionLevel::Medium)
//!     .with_mask(2);
//! let symbol = Symbol::new("https://example.com", &options).unwrap();
//! assert_eq!(symbol.size(), 25);
//!
//! let style = RenderOptions {
//!     module_radius: SizeValue::Percent(30.0),
//!     ..RenderOptions::default()
//! };
//! let img = render_image(&symbol, &style);
//! assert_eq!(img.width(), 250);
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Symbol construction and the option types.
//! - [`encoder`]: Mode detection, bit stream, blocks and interleaving.
//! - [`matrix`]: Module grid layout, data placement and masking.
//! - [`reed_solomon`] and [`gf256`]: Error correction arithmetic.
//! - [`capacity`]: Per-version capacity and block tables.
//! - [`helper`]: Rendering symbols as images or text.

#![forbid(unsafe_code)]

pub mod capacity;
pub mod encoder;
pub mod error;
pub mod gf256;
pub mod helper;
pub mod matrix;
pub mod qrcode;
pub mod reed_solomon;

pub use error::{QrError, Result};
pub use qrcode::{CorrectionLevel, Mask, Symbol, SymbolOptions, Version};
