#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use fuelbill_pdf::model::{BillForm, LogoKey, NumericField};
use fuelbill_pdf::{BillRecord, InMemoryAssets, RenderConfig, Renderer};

/// A complete formal-template bill: rate 100, total 550, no tax identifier.
pub fn sample_form() -> BillForm {
    BillForm {
        template: Some("template1".to_string()),
        logo: "indian_oil".to_string(),
        station_name: "Highway Fuels".to_string(),
        station_address: "Plot 12, Outer Ring Road, Marathahalli, Bengaluru 560037".to_string(),
        fuel_rate: Some(NumericField::Text("100".to_string())),
        total_amount: Some(NumericField::Text("550".to_string())),
        bill_date: "2024-03-01".to_string(),
        bill_time: "10:30".to_string(),
        customer_name: "Asha Rao".to_string(),
        vehicle_number: "KA01AB1234".to_string(),
        vehicle_type: "petrol".to_string(),
        payment_method: "cash".to_string(),
        invoice_number: "INV-1709280000000-1a2b3c4d".to_string(),
        tax_identifier: "none".to_string(),
        gst: None,
        cst: None,
        txn: None,
        email: "asha@example.com".to_string(),
    }
}

pub fn sample_record() -> BillRecord {
    BillRecord::from_form(&sample_form()).unwrap()
}

/// Small PNG with a gradient, optionally with transparent pixels.
pub fn png(width: u32, height: u32, with_alpha: bool) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        let a = if with_alpha && (x + y) % 2 == 0 { 0 } else { 255 };
        image::Rgba([(x * 8) as u8, (y * 8) as u8, 128, a])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn all_logos() -> InMemoryAssets {
    LogoKey::ALL
        .into_iter()
        .fold(InMemoryAssets::new(), |assets, key| assets.with(key, png(8, 8, true)))
}

/// Renderer over in-memory logos with uncompressed content, so page text can
/// be inspected directly.
pub fn renderer() -> Renderer {
    renderer_with(all_logos(), false)
}

pub fn renderer_with(assets: InMemoryAssets, compress: bool) -> Renderer {
    let config = RenderConfig {
        compress,
        ..RenderConfig::default()
    };
    Renderer::new(Arc::new(assets), config)
}

/// Monospaced TrueType face checked in under `tests/fixtures`.
pub fn fixture_font() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf")
}

/// Uncompressed renderer with the fixture face for both roles.
pub fn truetype_renderer() -> Renderer {
    let config = RenderConfig {
        font: Some(fixture_font()),
        bold_font: Some(fixture_font()),
        compress: false,
    };
    Renderer::new(Arc::new(all_logos()), config)
}

/// Raw or inflated payloads of every stream object in `pdf`.
pub fn streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(start) = find(&pdf[pos..], b"stream\n").map(|i| pos + i) {
        if start >= 3 && &pdf[start - 3..start] == b"end" {
            pos = start + 7;
            continue;
        }
        let data_start = start + 7;
        let Some(len) = find(&pdf[data_start..], b"\nendstream") else {
            break;
        };
        let data = &pdf[data_start..data_start + len];
        out.push(
            miniz_oxide::inflate::decompress_to_vec_zlib(data).unwrap_or_else(|_| data.to_vec()),
        );
        pos = data_start + len;
    }
    out
}

/// The page content stream as text.
pub fn page_content(pdf: &[u8]) -> String {
    streams(pdf)
        .into_iter()
        .map(|s| String::from_utf8_lossy(&s).into_owned())
        .find(|s| s.contains(" Tj"))
        .unwrap_or_default()
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}
