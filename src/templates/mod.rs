//! Bill templates.
//!
//! A template is a pure function from a [`BillRecord`] to an ordered list of
//! layout primitives. The renderer applies them to a canvas in order.

mod compact;
mod formal;

use crate::error::Error;
use crate::model::{BillRecord, LogoKey, TemplateId};
use crate::pdf::{TableStyle, TextStyle};

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Text {
        content: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Image {
        key: LogoKey,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    WrappedText {
        content: String,
        x: f32,
        y: f32,
        max_width: f32,
        line_height: f32,
        style: TextStyle,
    },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        start_y: f32,
        style: TableStyle,
    },
}

impl Primitive {
    pub(crate) fn text(content: impl Into<String>, x: f32, y: f32, style: TextStyle) -> Self {
        Primitive::Text {
            content: content.into(),
            x,
            y,
            style,
        }
    }

    /// Text content this primitive draws, in order. Images contribute nothing.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            Primitive::Text { content, .. } | Primitive::WrappedText { content, .. } => {
                vec![content.as_str()]
            }
            Primitive::Image { .. } => Vec::new(),
            Primitive::Table { header, rows, .. } => header
                .iter()
                .chain(rows.iter().flatten())
                .map(String::as_str)
                .collect(),
        }
    }
}

/// The layout instructions for `record`'s template. Fails only when the
/// record's amounts give no printable quantity.
pub fn instructions(record: &BillRecord) -> Result<Vec<Primitive>, Error> {
    match record.template {
        TemplateId::Formal => formal::instructions(record),
        TemplateId::Compact => compact::instructions(record),
    }
}
