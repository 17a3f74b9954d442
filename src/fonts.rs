use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::config::RenderConfig;

/// Which face of the configured pair a piece of text is set in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontRole {
    #[default]
    Regular,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StandardFont {
    Helvetica,
    HelveticaBold,
}

/// Helvetica advance widths (AFM, 1000 units/em) for chars 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// Approximation for WinAnsi bytes above 126.
const HIGH_WINANSI_WIDTH: f32 = 556.0;

impl StandardFont {
    fn base_font(self) -> &'static [u8] {
        match self {
            StandardFont::Helvetica => b"Helvetica",
            StandardFont::HelveticaBold => b"Helvetica-Bold",
        }
    }

    fn width_1000(self, ch: char) -> f32 {
        let table = match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match char_to_winansi(ch) {
            0 => 0.0,
            b @ 32..=126 => table[(b - 32) as usize] as f32,
            _ => HIGH_WINANSI_WIDTH,
        }
    }
}

/// A memory-mapped TrueType/OpenType face.
pub(crate) struct TrueTypeFont {
    ps_name: String,
    data: Mmap,
    face_index: u32,
    units_per_em: f32,
    ascender_ratio: f32,
    /// Written instead of the face if embedding fails at serialization.
    fallback: StandardFont,
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

impl TrueTypeFont {
    /// Everything embedding needs is checked here, so a face that opens is
    /// measured and embedded with the same metrics.
    fn open(path: &Path, fallback: StandardFont) -> Result<Self, String> {
        let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
        let data = unsafe { Mmap::map(&file) }.map_err(|e| e.to_string())?;
        if i32::try_from(data.len()).is_err() {
            return Err(format!("{} bytes is too large to embed", data.len()));
        }
        let face = Face::parse(&data, 0).map_err(|e| e.to_string())?;
        let family = font_family_name(&face).unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Embedded")
                .to_string()
        });
        let units_per_em = face.units_per_em() as f32;
        let ascender_ratio = face.ascender() as f32 / units_per_em;
        let ps_name: String = family.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(Self {
            ps_name,
            data,
            face_index: 0,
            units_per_em,
            ascender_ratio,
            fallback,
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.face_index).ok()
    }
}

pub(crate) enum FontSource {
    Standard(StandardFont),
    TrueType(TrueTypeFont),
}

impl FontSource {
    /// Load the font file at `path`, or the standard font when no path is set.
    /// A file that cannot be used is logged and replaced by the standard font.
    fn load(path: Option<&Path>, standard: StandardFont) -> FontSource {
        let Some(path) = path else {
            return FontSource::Standard(standard);
        };
        match TrueTypeFont::open(path, standard) {
            Ok(font) => {
                log::debug!("Loaded font {} from {}", font.ps_name, path.display());
                FontSource::TrueType(font)
            }
            Err(e) => {
                log::warn!(
                    "Font not usable: {}: {e}, using {}",
                    path.display(),
                    String::from_utf8_lossy(standard.base_font())
                );
                FontSource::Standard(standard)
            }
        }
    }

    /// Width of `text` in points.
    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: f32 = match self {
            FontSource::Standard(font) => text.chars().map(|ch| font.width_1000(ch)).sum(),
            FontSource::TrueType(font) => {
                let Some(face) = font.face() else {
                    return 0.0;
                };
                text.chars()
                    .filter_map(|ch| face.glyph_index(ch))
                    .filter_map(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f32 / font.units_per_em * 1000.0)
                    .sum()
            }
        };
        units * font_size / 1000.0
    }

    pub(crate) fn ascender_ratio(&self) -> f32 {
        match self {
            FontSource::Standard(_) => 0.718,
            FontSource::TrueType(font) => font.ascender_ratio,
        }
    }

    pub(crate) fn is_embedded(&self) -> bool {
        matches!(self, FontSource::TrueType(_))
    }

    /// Write the font objects into `pdf` and return the entry content streams
    /// refer to. TrueType faces are subset to `used_chars`.
    pub(crate) fn register(
        &self,
        pdf: &mut Pdf,
        pdf_name: String,
        alloc: &mut impl FnMut() -> Ref,
        used_chars: &BTreeSet<char>,
    ) -> FontEntry {
        let font_ref = alloc();
        let char_to_gid = match self {
            FontSource::Standard(font) => {
                write_standard(pdf, font_ref, *font);
                None
            }
            FontSource::TrueType(font) => {
                let embedded = embed_truetype(pdf, font_ref, font, used_chars, alloc);
                if embedded.is_none() {
                    log::warn!(
                        "Embedding {} failed, using {}",
                        font.ps_name,
                        String::from_utf8_lossy(font.fallback.base_font())
                    );
                    write_standard(pdf, font_ref, font.fallback);
                }
                embedded
            }
        };
        FontEntry {
            pdf_name,
            font_ref,
            char_to_gid,
        }
    }
}

fn write_standard(pdf: &mut Pdf, font_ref: Ref, font: StandardFont) {
    pdf.type1_font(font_ref)
        .base_font(Name(font.base_font()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
}

/// Regular and bold faces used for one render configuration.
pub(crate) struct FontSet {
    regular: FontSource,
    bold: FontSource,
}

impl FontSet {
    pub(crate) fn load(config: &RenderConfig) -> FontSet {
        FontSet {
            regular: FontSource::load(config.font.as_deref(), StandardFont::Helvetica),
            bold: FontSource::load(config.bold_font.as_deref(), StandardFont::HelveticaBold),
        }
    }

    pub(crate) fn get(&self, role: FontRole) -> &FontSource {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => &self.bold,
        }
    }
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    char_to_gid: Option<BTreeMap<char, u16>>,
}

impl FontEntry {
    /// Bytes for a `Tj` operand in this font's encoding.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes. Unmappable chars
/// are dropped, matching their zero width in measurement.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().map(char_to_winansi).filter(|&b| b != 0).collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &BTreeMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding.
/// The font data is subsetted to only include glyphs used on the page.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font: &TrueTypeFont,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<BTreeMap<char, u16>> {
    let face = font.face()?;
    let units = font.units_per_em;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    // Sorted iteration keeps glyph numbering, and so the output bytes, stable.
    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = BTreeMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let font_data: &[u8] = &font.data;
    let subset_data = subsetter::subset(font_data, font.face_index, &remapper)
        .unwrap_or_else(|e| {
            log::warn!("Font subsetting failed for {}: {e}; embedding full font", font.ps_name);
            font_data.to_vec()
        });

    let data_len = i32::try_from(subset_data.len()).ok()?;
    let descriptor_ref = alloc();
    let data_ref = alloc();
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font.ps_name.as_str();

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = || pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };

    let cid_font_ref = alloc();
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), system_info());
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}
