mod layout;
mod table;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::assets::{AssetResolver, DirectoryAssets};
use crate::config::{RenderConfig, asset_dir_from_env};
use crate::error::Error;
use crate::fonts::{FontEntry, FontRole, FontSet};
use crate::model::BillRecord;
use crate::templates::{self, Primitive};

pub use layout::{
    Align, BLACK, Canvas, DrawOp, PAGE_HEIGHT, PAGE_WIDTH, Rgb, Stroke, TextStyle, WHITE,
};
pub use table::{TABLE_MARGIN, TableStyle};

use layout::{DecodedImage, PT_PER_MM};

impl Canvas<'_> {
    /// Run one template primitive against this canvas.
    pub fn apply(&mut self, primitive: &Primitive) -> Result<(), Error> {
        match primitive {
            Primitive::Text {
                content,
                x,
                y,
                style,
            } => self.place_text(content, *x, *y, style),
            Primitive::Image {
                key,
                x,
                y,
                width,
                height,
            } => self.place_image(*key, *x, *y, *width, *height)?,
            Primitive::WrappedText {
                content,
                x,
                y,
                max_width,
                line_height,
                style,
            } => {
                self.wrap_text(content, *x, *y, *max_width, *line_height, style);
            }
            Primitive::Table {
                header,
                rows,
                start_y,
                style,
            } => {
                self.place_table(header, rows, *start_y, style);
            }
        }
        Ok(())
    }
}

/// Turns bill records into single-page PDF documents.
///
/// Holds only read-only state, so one renderer can serve any number of
/// threads; every render builds its own canvas.
pub struct Renderer {
    assets: Arc<dyn AssetResolver>,
    fonts: FontSet,
    config: RenderConfig,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("assets", &self.assets)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(assets: Arc<dyn AssetResolver>, config: RenderConfig) -> Self {
        let fonts = FontSet::load(&config);
        Self {
            assets,
            fonts,
            config,
        }
    }

    /// Renderer over the logo directory and fonts named by the environment.
    pub fn from_env() -> Self {
        let assets = DirectoryAssets::new(asset_dir_from_env());
        Self::new(Arc::new(assets), RenderConfig::from_env())
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// A blank A4 page measured with this renderer's fonts.
    pub fn canvas(&self) -> Canvas<'_> {
        Canvas::new(&self.fonts, &*self.assets)
    }

    pub fn render(&self, record: &BillRecord) -> Result<Vec<u8>, Error> {
        let t0 = Instant::now();
        let mut canvas = self.canvas();
        for primitive in templates::instructions(record)? {
            canvas.apply(&primitive)?;
        }
        let t_layout = t0.elapsed();

        let bytes = self.serialize(canvas);

        log::debug!(
            "Render {} ({}): layout={:.1}ms, serialize={:.1}ms, {} bytes",
            record.invoice_number,
            record.template.tag(),
            t_layout.as_secs_f64() * 1000.0,
            (t0.elapsed() - t_layout).as_secs_f64() * 1000.0,
            bytes.len()
        );
        Ok(bytes)
    }

    /// Write the canvas as a one-page PDF. The output depends only on the
    /// canvas contents and the configured fonts.
    pub fn serialize(&self, canvas: Canvas<'_>) -> Vec<u8> {
        let (ops, images) = canvas.into_parts();

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let page_id = alloc();
        let content_id = alloc();

        let mut used_chars: BTreeMap<FontRole, BTreeSet<char>> = BTreeMap::new();
        used_chars.entry(FontRole::Regular).or_default();
        for op in &ops {
            if let DrawOp::Text { text, font, .. } = op {
                used_chars.entry(*font).or_default().extend(text.chars());
            }
        }

        let mut fonts: BTreeMap<FontRole, FontEntry> = BTreeMap::new();
        for (role, chars) in &used_chars {
            let pdf_name = match role {
                FontRole::Regular => "F1",
                FontRole::Bold => "F2",
            };
            let source = self.fonts.get(*role);
            let entry = source.register(&mut pdf, pdf_name.to_string(), &mut alloc, chars);
            log::debug!(
                "Font {pdf_name}: {:?} embedded={} chars={}",
                role,
                source.is_embedded(),
                chars.len()
            );
            fonts.insert(*role, entry);
        }

        let image_xobjects: Vec<(String, Ref)> = images
            .iter()
            .enumerate()
            .map(|(i, img)| (format!("Im{}", i + 1), embed_image(&mut pdf, img, &mut alloc)))
            .collect();

        let content = draw(&ops, &fonts, &image_xobjects);
        let raw = content.finish();
        if self.config.compress {
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_id, &compressed)
                .filter(Filter::FlateDecode);
        } else {
            pdf.stream(content_id, raw.as_slice());
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id).kids([page_id]).count(1);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(
            0.0,
            0.0,
            PAGE_WIDTH * PT_PER_MM,
            PAGE_HEIGHT * PT_PER_MM,
        ))
        .parent(pages_id)
        .contents(content_id);
        {
            let mut resources = page.resources();
            {
                let mut font_dict = resources.fonts();
                for entry in fonts.values() {
                    font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
                }
            }
            if !image_xobjects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &image_xobjects {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }
        drop(page);

        pdf.finish()
    }
}

fn rgb(color: Rgb) -> (f32, f32, f32) {
    (
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    )
}

/// Emit the content stream. Page units are converted to points with the y
/// axis flipped to PDF's bottom-left origin.
fn draw(
    ops: &[DrawOp],
    fonts: &BTreeMap<FontRole, FontEntry>,
    image_xobjects: &[(String, Ref)],
) -> Content {
    let mut content = Content::new();
    for op in ops {
        match op {
            DrawOp::Text {
                text,
                x,
                baseline,
                size,
                color,
                font,
                ..
            } => {
                let Some(entry) = fonts.get(font) else {
                    continue;
                };
                let bytes = entry.encode(text);
                if bytes.is_empty() {
                    continue;
                }
                let (r, g, b) = rgb(*color);
                content.set_fill_rgb(r, g, b);
                content
                    .begin_text()
                    .set_font(Name(entry.pdf_name.as_bytes()), *size)
                    .next_line(x * PT_PER_MM, (PAGE_HEIGHT - baseline) * PT_PER_MM)
                    .show(Str(&bytes))
                    .end_text();
            }
            DrawOp::Image {
                image,
                x,
                y,
                width,
                height,
            } => {
                let Some((name, _)) = image_xobjects.get(*image) else {
                    continue;
                };
                content.save_state();
                content.transform([
                    width * PT_PER_MM,
                    0.0,
                    0.0,
                    height * PT_PER_MM,
                    x * PT_PER_MM,
                    (PAGE_HEIGHT - y - height) * PT_PER_MM,
                ]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let (px, py) = (x * PT_PER_MM, (PAGE_HEIGHT - y - height) * PT_PER_MM);
                let (pw, ph) = (width * PT_PER_MM, height * PT_PER_MM);
                content.save_state();
                if let Some(fill) = fill {
                    let (r, g, b) = rgb(*fill);
                    content.set_fill_rgb(r, g, b);
                    content.rect(px, py, pw, ph).fill_nonzero();
                }
                if let Some(stroke) = stroke {
                    let (r, g, b) = rgb(stroke.color);
                    content.set_stroke_rgb(r, g, b);
                    content.set_line_width(stroke.width * PT_PER_MM);
                    content.rect(px, py, pw, ph).stroke();
                }
                content.restore_state();
            }
        }
    }
    content
}

fn embed_image(pdf: &mut Pdf, img: &DecodedImage, alloc: &mut impl FnMut() -> Ref) -> Ref {
    let xobj_ref = alloc();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&img.rgb, 6);

    let smask_ref = img.alpha.as_ref().map(|alpha| {
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(alpha, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(img.width as i32);
        mask.height(img.height as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        mask_ref
    });

    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(img.width as i32);
    xobj.height(img.height as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    xobj_ref
}
