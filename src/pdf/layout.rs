use crate::assets::AssetResolver;
use crate::error::Error;
use crate::fonts::{FontRole, FontSet};
use crate::model::LogoKey;

/// A4 in page units (millimetres). Coordinates grow right and down from the
/// top-left corner.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

pub(crate) const PT_PER_MM: f32 = 72.0 / 25.4;

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Font size is in points; everything else on the canvas is in page units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgb,
    pub align: Align,
    pub font: FontRole,
}

impl TextStyle {
    pub const fn new(size: f32, color: Rgb) -> Self {
        Self {
            size,
            color,
            align: Align::Left,
            font: FontRole::Regular,
        }
    }

    pub const fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub const fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    pub const fn bold(mut self) -> Self {
        self.font = FontRole::Bold;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(12.0, BLACK)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
}

/// One entry of the canvas instruction buffer, fully positioned.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// `x` is the left edge after alignment, `baseline` the text baseline.
    Text {
        text: String,
        x: f32,
        baseline: f32,
        width: f32,
        size: f32,
        color: Rgb,
        font: FontRole,
    },
    /// `image` indexes the canvas's decoded images; `x, y` is the top-left corner.
    Image {
        image: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
}

pub(crate) struct DecodedImage {
    pub(crate) key: LogoKey,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgb: Vec<u8>,
    pub(crate) alpha: Option<Vec<u8>>,
}

fn decode_png(key: LogoKey, data: &[u8]) -> Result<DecodedImage, Error> {
    let cursor = std::io::Cursor::new(data);
    let reader =
        image::ImageReader::with_format(std::io::BufReader::new(cursor), image::ImageFormat::Png);
    let decoded = reader.decode().map_err(|e| Error::InvalidAsset {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    let rgba: image::RgbaImage = decoded.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let alpha = has_alpha.then(|| rgba.pixels().map(|p| p.0[3]).collect());

    Ok(DecodedImage {
        key,
        width,
        height,
        rgb,
        alpha,
    })
}

/// A single fixed-size page. Every primitive appends to the instruction
/// buffer; nothing is drawn until the renderer serializes the canvas.
pub struct Canvas<'a> {
    fonts: &'a FontSet,
    assets: &'a dyn AssetResolver,
    ops: Vec<DrawOp>,
    images: Vec<DecodedImage>,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(fonts: &'a FontSet, assets: &'a dyn AssetResolver) -> Self {
        Self {
            fonts,
            assets,
            ops: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Width of `text` in page units.
    pub fn measure(&self, text: &str, size: f32, font: FontRole) -> f32 {
        self.fonts.get(font).text_width(text, size) / PT_PER_MM
    }

    pub(crate) fn ascender_ratio(&self, font: FontRole) -> f32 {
        self.fonts.get(font).ascender_ratio()
    }

    pub(crate) fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub(crate) fn into_parts(self) -> (Vec<DrawOp>, Vec<DecodedImage>) {
        (self.ops, self.images)
    }

    /// Draw `content` on one line with its baseline at `y`. `x` is the left
    /// edge, centre or right edge depending on `style.align`.
    pub fn place_text(&mut self, content: &str, x: f32, y: f32, style: &TextStyle) {
        let width = self.measure(content, style.size, style.font);
        let left = match style.align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.ops.push(DrawOp::Text {
            text: content.to_string(),
            x: left,
            baseline: y,
            width,
            size: style.size,
            color: style.color,
            font: style.font,
        });
    }

    /// Embed the asset behind `key`, scaled to the box with top-left `x, y`.
    pub fn place_image(
        &mut self,
        key: LogoKey,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), Error> {
        let image = match self.images.iter().position(|img| img.key == key) {
            Some(idx) => idx,
            None => {
                let data = self.assets.load(key)?;
                let decoded = decode_png(key, &data)?;
                log::debug!(
                    "Decoded {key}: {}x{} alpha={}",
                    decoded.width,
                    decoded.height,
                    decoded.alpha.is_some()
                );
                self.images.push(decoded);
                self.images.len() - 1
            }
        };
        self.ops.push(DrawOp::Image {
            image,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    /// Greedy word wrap. Words are taken in order; a word that would push the
    /// measured line past `max_width` starts a new line `line_height` below.
    /// A word alone on its line is kept whole even if it is wider.
    ///
    /// Returns the y one line below the last line drawn.
    pub fn wrap_text(
        &mut self,
        content: &str,
        x: f32,
        y: f32,
        max_width: f32,
        line_height: f32,
        style: &TextStyle,
    ) -> f32 {
        let mut y = y;
        let mut line = String::new();

        for word in content.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if self.measure(&candidate, style.size, style.font) > max_width {
                self.place_text(&line, x, y, style);
                y += line_height;
                line.clear();
                line.push_str(word);
            } else {
                line = candidate;
            }
        }

        if !line.is_empty() {
            self.place_text(&line, x, y, style);
            y += line_height;
        }
        y
    }
}
