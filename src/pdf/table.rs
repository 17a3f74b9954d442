use crate::fonts::FontRole;

use super::layout::{Canvas, DrawOp, PAGE_WIDTH, PT_PER_MM, Rgb, Stroke, WHITE};

/// Left and right page margin reserved around tables (40pt).
pub const TABLE_MARGIN: f32 = 40.0 / PT_PER_MM;

// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableStyle {
    pub font_size: f32,
    pub cell_padding: f32,
    pub header_fill: Rgb,
    pub header_text: Rgb,
    pub body_text: Rgb,
    pub grid: Stroke,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            cell_padding: 1.76,
            header_fill: [41, 128, 185],
            header_text: WHITE,
            body_text: [80, 80, 80],
            grid: Stroke {
                color: [200, 200, 200],
                width: 0.1,
            },
        }
    }
}

/// Give every column its natural width (widest cell plus padding) and share
/// what is left of `available` equally. When the natural widths do not fit,
/// shrink them proportionally. The result always sums to `available`.
fn distribute_columns(natural: &[f32], available: f32) -> Vec<f32> {
    if natural.is_empty() {
        return Vec::new();
    }
    let total: f32 = natural.iter().sum();
    if total <= available {
        let extra = (available - total) / natural.len() as f32;
        natural.iter().map(|w| w + extra).collect()
    } else {
        let scale = available / total;
        natural.iter().map(|w| w * scale).collect()
    }
}

impl Canvas<'_> {
    /// Bordered grid spanning the content width: a filled header row with
    /// bold text, then one row per entry of `rows`. Returns the bottom y.
    pub fn place_table(
        &mut self,
        header: &[String],
        rows: &[Vec<String>],
        start_y: f32,
        style: &TableStyle,
    ) -> f32 {
        let ncols = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        if ncols == 0 {
            return start_y;
        }

        let pad = style.cell_padding;
        let mut natural = vec![0.0f32; ncols];
        for (i, cell) in header.iter().enumerate() {
            let w = self.measure(cell, style.font_size, FontRole::Bold);
            natural[i] = natural[i].max(w + 2.0 * pad);
        }
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                let w = self.measure(cell, style.font_size, FontRole::Regular);
                natural[i] = natural[i].max(w + 2.0 * pad);
            }
        }

        let table_width = PAGE_WIDTH - 2.0 * TABLE_MARGIN;
        let widths = distribute_columns(&natural, table_width);
        let row_h = style.font_size / PT_PER_MM * LINE_HEIGHT_FACTOR + 2.0 * pad;

        log::debug!(
            "TABLE cols={} widths={:?} row_h={:.2} start_y={:.2}",
            ncols,
            widths,
            row_h,
            start_y
        );

        let mut y = start_y;
        let header_row = (!header.is_empty()).then_some((header, FontRole::Bold, style.header_text));
        let body_rows = rows
            .iter()
            .map(|row| (row.as_slice(), FontRole::Regular, style.body_text));

        for (ri, (cells, font, color)) in header_row.into_iter().chain(body_rows).enumerate() {
            let is_header = ri == 0 && !header.is_empty();
            if is_header {
                self.push(DrawOp::Rect {
                    x: TABLE_MARGIN,
                    y,
                    width: table_width,
                    height: row_h,
                    fill: Some(style.header_fill),
                    stroke: None,
                });
            }

            let ascent = style.font_size / PT_PER_MM * self.ascender_ratio(font);
            let baseline = y + pad + ascent;
            let mut x = TABLE_MARGIN;
            for (ci, &w) in widths.iter().enumerate() {
                self.push(DrawOp::Rect {
                    x,
                    y,
                    width: w,
                    height: row_h,
                    fill: None,
                    stroke: Some(style.grid),
                });
                if let Some(text) = cells.get(ci).filter(|t| !t.is_empty()) {
                    let width = self.measure(text, style.font_size, font);
                    self.push(DrawOp::Text {
                        text: text.clone(),
                        x: x + pad,
                        baseline,
                        width,
                        size: style.font_size,
                        color,
                        font,
                    });
                }
                x += w;
            }
            y += row_h;
        }
        y
    }
}
