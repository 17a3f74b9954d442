pub mod assets;
pub mod config;
mod error;
mod fonts;
pub mod model;
pub mod pdf;
pub mod service;
pub mod templates;

pub use assets::{AssetResolver, DirectoryAssets, InMemoryAssets};
pub use config::{RenderConfig, ServiceConfig};
pub use error::Error;
pub use fonts::FontRole;
pub use model::{BillForm, BillRecord, TemplateId};
pub use pdf::Renderer;
pub use service::DocumentService;

use std::path::Path;
use std::time::Instant;

/// Parse a bill form from JSON text.
pub fn parse_bill(json: &str) -> Result<BillForm, Error> {
    Ok(serde_json::from_str(json)?)
}

/// Render the bill in `input` (JSON form) and write the PDF to `output`.
pub fn render_bill_file(renderer: &Renderer, input: &Path, output: &Path) -> Result<(), Error> {
    let t0 = Instant::now();

    let json = std::fs::read_to_string(input)?;
    let record = BillRecord::from_form(&parse_bill(&json)?)?;
    let t_parse = t0.elapsed();

    let bytes = renderer.render(&record)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
