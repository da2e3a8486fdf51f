//! End-to-end tests for symbol construction.
//!
//! Grids are read back by walking the placement order and removing the mask, so the
//! codeword stream can be checked against known values without a decoder.

use qrforge::encoder::{Encoder, Mode};
use qrforge::helper::{RenderOptions, SizeValue};
use qrforge::matrix::{format_bits, mask_bit, Placement, Reserved};
use qrforge::{CorrectionLevel, Mask, QrError, Symbol, SymbolOptions, Version};

fn read_codewords(symbol: &Symbol) -> Vec<u8> {
    let reserved = Reserved::new(symbol.version());
    let bits: Vec<bool> = Placement::new(&reserved)
        .map(|(r, c)| symbol.grid()[r][c] ^ mask_bit(symbol.mask(), r, c) == 1)
        .collect();
    bits.chunks_exact(8)
        .map(|byte| byte.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)))
        .collect()
}

fn read_format(symbol: &Symbol) -> u32 {
    let g = symbol.grid();
    let mut cells: Vec<u8> = (0..6).map(|r| g[r][8]).collect();
    cells.extend([g[7][8], g[8][8], g[8][7]]);
    cells.extend((9..15).map(|i| g[8][14 - i]));
    cells
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &bit)| acc | (u32::from(bit) << i))
}

#[test]
fn hello_world_medium_codewords() {
    let options = SymbolOptions::default().with_level(CorrectionLevel::Medium);
    let symbol = Symbol::new("HELLO WORLD", &options).unwrap();
    assert_eq!(symbol.version().value(), 1);
    assert_eq!(symbol.mode(), Mode::Alphanumeric);
    assert_eq!(
        read_codewords(&symbol),
        vec![
            32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17, 196, 35, 39,
            119, 235, 215, 231, 226, 93, 23,
        ]
    );
}

#[test]
fn hello_world_quartile_scenario() {
    let options = SymbolOptions::default()
        .with_level(CorrectionLevel::Quartile)
        .with_mask(0);
    let symbol = Symbol::new("HELLO WORLD", &options).unwrap();
    assert_eq!(symbol.mode(), Mode::Alphanumeric);
    assert_eq!(symbol.size(), 17 + 4 * symbol.version().value() as usize);
    let finder = [
        [1, 1, 1, 1, 1, 1, 1],
        [1, 0, 0, 0, 0, 0, 1],
        [1, 0, 1, 1, 1, 0, 1],
        [1, 0, 1, 1, 1, 0, 1],
        [1, 0, 1, 1, 1, 0, 1],
        [1, 0, 0, 0, 0, 0, 1],
        [1, 1, 1, 1, 1, 1, 1],
    ];
    for (r, row) in finder.iter().enumerate() {
        assert_eq!(&symbol.grid()[r][..7], row);
    }
}

#[test]
fn grid_carries_encoder_stream() {
    let cases = [
        ("01234567890123456789", CorrectionLevel::Low, 0, None),
        ("THE QUICK BROWN FOX JUMPS", CorrectionLevel::Medium, 3, Some(5)),
        ("mixed Case bytes / ünïcödé", CorrectionLevel::Quartile, 5, Some(7)),
        ("https://example.com/a/b/c?d=e", CorrectionLevel::High, 7, Some(12)),
    ];
    for (content, level, mask, min_version) in cases {
        let mut options = SymbolOptions::default().with_level(level).with_mask(mask);
        options.min_version = min_version;
        let symbol = Symbol::new(content, &options).unwrap();
        let expected = Encoder::new(symbol.version(), level)
            .encode(content)
            .unwrap()
            .to_codewords();
        assert_eq!(read_codewords(&symbol), expected, "content {content:?}");
    }
}

#[test]
fn format_info_decodes_to_options() {
    for level in CorrectionLevel::ALL {
        for mask in 0..8u8 {
            let options = SymbolOptions::default().with_level(level).with_mask(mask);
            let symbol = Symbol::new("42", &options).unwrap();
            assert_eq!(read_format(&symbol), format_bits(level, Mask::new(mask).unwrap()));
        }
    }
}

#[test]
fn sizes_follow_version() {
    for v in 1..=40u8 {
        let symbol = Symbol::new("7", &SymbolOptions::default().with_min_version(v)).unwrap();
        assert_eq!(symbol.version(), Version::new(v).unwrap());
        assert_eq!(symbol.size(), 17 + 4 * v as usize);
        assert!(symbol.grid().iter().all(|row| row.len() == symbol.size()));
        assert!(symbol.grid().iter().flatten().all(|&m| m <= 1));
    }
}

#[test]
fn mode_detection() {
    assert_eq!(Mode::detect("12345"), Mode::Numeric);
    assert_eq!(Mode::detect("ABC 123"), Mode::Alphanumeric);
    assert_eq!(Mode::detect("héllo"), Mode::Binary);
    assert_eq!(Mode::detect("abc"), Mode::Binary);
}

#[test]
fn capacity_errors() {
    let encoder = Encoder::new(Version::MIN, CorrectionLevel::Low);
    let err = encoder.encode("abcdefghijklmnopqr").unwrap_err();
    assert!(err.is_capacity());
    assert_eq!(
        err.to_string(),
        "data is too long for version 1, correction level L and mode binary: \
         max length 17, given length 18"
    );

    let huge = "z".repeat(3000);
    let err = Symbol::new(&huge, &SymbolOptions::default()).unwrap_err();
    assert!(matches!(err, QrError::CapacityExceeded { version: 40, .. }));
}

#[test]
fn options_from_json() {
    let options: SymbolOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, SymbolOptions::default());

    let options: SymbolOptions =
        serde_json::from_str(r#"{"correction_level": "Q", "mask": 3, "icon": true}"#).unwrap();
    assert_eq!(options.correction_level, CorrectionLevel::Quartile);
    assert_eq!(options.mask, 3);
    assert!(options.icon);
    assert_eq!(options.min_version, None);

    let json = serde_json::to_string(&options).unwrap();
    assert!(json.contains(r#""correction_level":"Q""#));

    assert!(serde_json::from_str::<SymbolOptions>(r#"{"correction_level": "X"}"#).is_err());
}

#[test]
fn render_options_from_json() {
    let options: RenderOptions = serde_json::from_str(
        r#"{"module_px": 8, "module_margin": "25%", "module_radius": 3, "background": [255, 255, 255]}"#,
    )
    .unwrap();
    assert_eq!(options.module_px, 8);
    assert_eq!(options.module_margin, SizeValue::Percent(25.0));
    assert_eq!(options.module_radius, SizeValue::Fixed(3.0));
    assert_eq!(options.background, [255, 255, 255]);
    assert_eq!(options.dark, [0, 0, 0]);
    // 25% of 8 px is capped at 20%
    assert!((options.margin_px() - 1.6).abs() < 1e-6);

    assert!(serde_json::from_str::<RenderOptions>(r#"{"module_radius": "round"}"#).is_err());
}
