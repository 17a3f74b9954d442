mod common;

use fuelbill_pdf::model::LogoKey;
use fuelbill_pdf::pdf::{DrawOp, PAGE_WIDTH, TABLE_MARGIN, TableStyle, TextStyle};
use fuelbill_pdf::{Error, FontRole, InMemoryAssets};

fn texts(ops: &[DrawOp]) -> Vec<(String, f32, f32, f32)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                text,
                x,
                baseline,
                width,
                ..
            } => Some((text.clone(), *x, *baseline, *width)),
            _ => None,
        })
        .collect()
}

#[test]
fn text_alignment_resolves_left_edge() {
    let renderer = common::renderer();
    let mut canvas = renderer.canvas();
    let style = TextStyle::default();
    let width = canvas.measure("Fuel Receipt", style.size, style.font);
    assert!(width > 0.0);

    canvas.place_text("Fuel Receipt", 105.0, 30.0, &style);
    canvas.place_text("Fuel Receipt", 105.0, 40.0, &style.centered());
    canvas.place_text("Fuel Receipt", 105.0, 50.0, &style.right());

    let placed = texts(canvas.ops());
    assert_eq!(placed.len(), 3);
    assert!((placed[0].1 - 105.0).abs() < 1e-4);
    assert!((placed[1].1 - (105.0 - width / 2.0)).abs() < 1e-4);
    assert!((placed[2].1 - (105.0 - width)).abs() < 1e-4);
    assert_eq!(placed[1].2, 40.0);
}

#[test]
fn bold_measures_wider() {
    let renderer = common::renderer();
    let canvas = renderer.canvas();
    let regular = canvas.measure("Total Amount", 12.0, FontRole::Regular);
    let bold = canvas.measure("Total Amount", 12.0, FontRole::Bold);
    assert!(bold > regular);
}

#[test]
fn wrapped_lines_stay_within_max_width() {
    let renderer = common::renderer();
    let mut canvas = renderer.canvas();
    let style = TextStyle::default();
    let content = "Station Address: Plot 12, Outer Ring Road, Marathahalli, Bengaluru 560037";

    let end = canvas.wrap_text(content, 140.0, 82.0, 60.0, 8.0, &style);

    let lines = texts(canvas.ops());
    assert!(lines.len() > 1);
    for (i, (text, x, baseline, width)) in lines.iter().enumerate() {
        assert_eq!(*x, 140.0);
        assert_eq!(*baseline, 82.0 + 8.0 * i as f32);
        assert!(
            *width <= 60.0 || !text.contains(' '),
            "line {text:?} is {width}mm wide"
        );
    }
    assert_eq!(end, 82.0 + 8.0 * lines.len() as f32);

    let rejoined: Vec<&str> = lines.iter().map(|l| l.0.as_str()).collect();
    assert_eq!(rejoined.join(" "), content);
}

#[test]
fn overlong_word_gets_its_own_line() {
    let renderer = common::renderer();
    let mut canvas = renderer.canvas();
    let style = TextStyle::default();
    let long = "Supercalifragilisticexpialidocious-Fuel-Station";

    canvas.wrap_text(&format!("At {long} now"), 0.0, 10.0, 20.0, 5.0, &style);

    let lines: Vec<String> = texts(canvas.ops()).into_iter().map(|l| l.0).collect();
    assert_eq!(lines, vec!["At".to_string(), long.to_string(), "now".to_string()]);
}

#[test]
fn empty_wrap_draws_nothing() {
    let renderer = common::renderer();
    let mut canvas = renderer.canvas();
    let end = canvas.wrap_text("   ", 0.0, 10.0, 50.0, 5.0, &TextStyle::default());
    assert_eq!(end, 10.0);
    assert!(canvas.ops().is_empty());
}

#[test]
fn missing_asset_fails_placement() {
    let renderer = common::renderer_with(InMemoryAssets::new(), true);
    let mut canvas = renderer.canvas();
    let err = canvas
        .place_image(LogoKey::Jio, 10.0, 40.0, 40.0, 40.0)
        .unwrap_err();
    assert!(matches!(err, Error::AssetNotFound(_)));
    assert!(canvas.ops().is_empty());
}

#[test]
fn undecodable_asset_is_invalid() {
    let assets = InMemoryAssets::new().with(LogoKey::Jio, b"not a png".to_vec());
    let renderer = common::renderer_with(assets, true);
    let mut canvas = renderer.canvas();
    assert!(matches!(
        canvas.place_image(LogoKey::Jio, 0.0, 0.0, 10.0, 10.0),
        Err(Error::InvalidAsset { .. })
    ));
}

#[test]
fn repeated_logo_is_decoded_once() {
    let renderer = common::renderer();
    let mut canvas = renderer.canvas();
    canvas.place_image(LogoKey::Jio, 0.0, 0.0, 10.0, 10.0).unwrap();
    canvas.place_image(LogoKey::Jio, 50.0, 0.0, 20.0, 20.0).unwrap();
    canvas.place_image(LogoKey::HpOil, 90.0, 0.0, 20.0, 20.0).unwrap();
    assert_eq!(canvas.image_count(), 2);
    assert_eq!(canvas.ops().len(), 3);
}

#[test]
fn table_spans_content_width() {
    let renderer = common::renderer();
    let mut canvas = renderer.canvas();
    let header = vec!["Fuel Rate".to_string(), "Quantity".to_string(), "Total Amount".to_string()];
    let rows = vec![vec!["100".to_string(), "5.50".to_string(), "550".to_string()]];
    let style = TableStyle {
        font_size: 12.0,
        cell_padding: 3.0,
        ..TableStyle::default()
    };

    let bottom = canvas.place_table(&header, &rows, 150.0, &style);
    assert!(bottom > 150.0);

    let ops = canvas.ops();
    let filled: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect {
                x,
                width,
                fill: Some(fill),
                ..
            } => Some((*x, *width, *fill)),
            _ => None,
        })
        .collect();
    assert_eq!(filled.len(), 1, "only the header row is filled");
    assert!((filled[0].0 - TABLE_MARGIN).abs() < 1e-4);
    assert!((filled[0].1 - (PAGE_WIDTH - 2.0 * TABLE_MARGIN)).abs() < 1e-3);
    assert_eq!(filled[0].2, style.header_fill);

    let cells: Vec<f32> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect {
                y,
                width,
                fill: None,
                stroke: Some(_),
                ..
            } if *y == 150.0 => Some(*width),
            _ => None,
        })
        .collect();
    assert_eq!(cells.len(), 3);
    let total: f32 = cells.iter().sum();
    assert!((total - (PAGE_WIDTH - 2.0 * TABLE_MARGIN)).abs() < 1e-3);

    let header_fonts: Vec<FontRole> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { font, baseline, .. } if *baseline < 150.0 + (bottom - 150.0) / 2.0 => {
                Some(*font)
            }
            _ => None,
        })
        .collect();
    assert_eq!(header_fonts, vec![FontRole::Bold; 3]);

    let body: Vec<String> = texts(ops)
        .into_iter()
        .filter(|t| t.2 > 150.0 + (bottom - 150.0) / 2.0)
        .map(|t| t.0)
        .collect();
    assert_eq!(body, vec!["100", "5.50", "550"]);
}
