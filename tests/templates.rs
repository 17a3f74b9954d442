mod common;

use fuelbill_pdf::model::NumericField;
use fuelbill_pdf::pdf::Align;
use fuelbill_pdf::templates::{Primitive, instructions};
use fuelbill_pdf::{BillForm, BillRecord};

fn record(form: &BillForm) -> BillRecord {
    BillRecord::from_form(form).unwrap()
}

fn all_strings(primitives: &[Primitive]) -> Vec<String> {
    primitives
        .iter()
        .flat_map(|p| p.strings())
        .map(str::to_string)
        .collect()
}

fn with_tax(template: &str, kind: &str, value: &str) -> BillForm {
    let mut form = common::sample_form();
    form.template = Some(template.to_string());
    form.tax_identifier = kind.to_string();
    match kind {
        "gst" => form.gst = Some(value.to_string()),
        "cst" => form.cst = Some(value.to_string()),
        "txn" => form.txn = Some(value.to_string()),
        _ => {}
    }
    form
}

fn tax_lines(strings: &[String]) -> Vec<&String> {
    strings.iter().filter(|s| s.contains(" No.: ")).collect()
}

#[test]
fn formal_layout_matches_receipt() {
    let primitives = instructions(&common::sample_record()).unwrap();

    match &primitives[0] {
        Primitive::Text { content, x, y, style } => {
            assert_eq!(content, "Fuel Receipt");
            assert_eq!((*x, *y), (105.0, 30.0));
            assert_eq!(style.size, 20.0);
            assert_eq!(style.color, [51, 102, 204]);
            assert_eq!(style.align, Align::Center);
        }
        other => panic!("expected title, got {other:?}"),
    }
    assert!(primitives.iter().any(|p| matches!(
        p,
        Primitive::Image { x, y, width, height, .. }
            if (*x, *y, *width, *height) == (10.0, 40.0, 40.0, 40.0)
    )));

    let table = primitives
        .iter()
        .find_map(|p| match p {
            Primitive::Table { header, rows, start_y, style } => Some((header, rows, *start_y, style)),
            _ => None,
        })
        .unwrap();
    assert_eq!(table.0, &["Fuel Rate", "Quantity", "Total Amount"]);
    assert_eq!(table.1, &[vec!["100", "5.50", "550"]]);
    assert_eq!(table.2, 150.0);
    assert_eq!(table.3.header_fill, [51, 102, 204]);

    let payment = primitives
        .iter()
        .find_map(|p| match p {
            Primitive::Text { content, style, x, y } if content.starts_with("Payment Method") => {
                Some((content.clone(), *style, *x, *y))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(payment.0, "Payment Method: cash");
    assert_eq!(payment.1.align, Align::Center);
    assert_eq!((payment.2, payment.3), (105.0, 140.0));

    let strings = all_strings(&primitives);
    assert!(tax_lines(&strings).is_empty());
    assert_eq!(strings.last().unwrap(), "Thank you for your purchase!");
}

#[test]
fn formal_wraps_station_address_in_right_column() {
    let primitives = instructions(&common::sample_record()).unwrap();
    let wrapped = primitives
        .iter()
        .find_map(|p| match p {
            Primitive::WrappedText { content, x, y, max_width, line_height, .. } => {
                Some((content.clone(), *x, *y, *max_width, *line_height))
            }
            _ => None,
        })
        .unwrap();
    assert!(wrapped.0.starts_with("Station Address: Plot 12"));
    assert_eq!((wrapped.1, wrapped.2), (140.0, 82.0));
    assert_eq!((wrapped.3, wrapped.4), (60.0, 8.0));
}

#[test]
fn tax_line_only_when_identifier_is_set() {
    for template in ["template1", "template2"] {
        let cases = [
            ("gst", "22AAAAA0000A1Z5", Some("GST No.: 22AAAAA0000A1Z5")),
            ("cst", "CST-9", Some("CST No.: CST-9")),
            ("txn", "T-1001", Some("TXN No.: T-1001")),
            ("none", "", None),
        ];
        for (kind, value, expected) in cases {
            let strings = all_strings(&instructions(&record(&with_tax(template, kind, value))).unwrap());
            let lines = tax_lines(&strings);
            match expected {
                Some(line) => assert_eq!(lines, vec![line], "{template} {kind}"),
                None => assert!(lines.is_empty(), "{template} {kind}"),
            }
        }
    }
}

#[test]
fn txn_does_not_render_gst() {
    let mut form = with_tax("template1", "txn", "T-77");
    form.gst = Some("22AAAAA0000A1Z5".to_string());
    let strings = all_strings(&instructions(&record(&form)).unwrap());
    assert!(strings.iter().any(|s| s == "TXN No.: T-77"));
    assert!(!strings.iter().any(|s| s.starts_with("GST")));
}

#[test]
fn compact_layout_lines() {
    let mut form = common::sample_form();
    form.template = Some("template2".to_string());
    form.fuel_rate = Some(NumericField::Number(96.72));
    form.total_amount = Some(NumericField::Text("500".to_string()));
    let primitives = instructions(&record(&form)).unwrap();

    assert!(matches!(
        primitives[0],
        Primitive::Image { x, y, width, height, .. } if (x, y, width, height) == (80.0, 20.0, 50.0, 50.0)
    ));
    let strings = all_strings(&primitives);
    for expected in [
        "WELCOME !",
        "Receipt No: INV-1709280000000-1a2b3c4d",
        "Product Details:",
        "Fuel Rate: 96.72 /Ltr",
        "Total Amount: 500",
        "Volume(Ltr): 5.17",
        "Veh Type: petrol",
        "Veh No: KA01AB1234",
        "Customer Name: Asha Rao",
        "Date: 2024-03-01",
        "Time: 10:30",
        "Mode: cash",
        "Save fuel, save money",
    ] {
        assert!(strings.iter().any(|s| s == expected), "missing {expected:?}");
    }
    assert!(!primitives.iter().any(|p| matches!(p, Primitive::Table { .. })));

    let row = |label: &str| {
        primitives
            .iter()
            .find_map(|p| match p {
                Primitive::Text { content, y, style, x } if content.starts_with(label) => {
                    Some((*x, *y, style.align))
                }
                _ => None,
            })
            .unwrap()
    };
    let (date_x, date_y, _) = row("Date:");
    let (time_x, time_y, time_align) = row("Time:");
    assert_eq!(date_y, time_y);
    assert_eq!((date_x, time_x), (20.0, 190.0));
    assert_eq!(time_align, Align::Right);
}

#[test]
fn unknown_template_renders_formal() {
    let mut form = common::sample_form();
    form.template = Some("template3".to_string());
    let strings = all_strings(&instructions(&record(&form)).unwrap());
    assert_eq!(strings[0], "Fuel Receipt");
}

#[test]
fn templates_are_pure() {
    let record = common::sample_record();
    let before = record.clone();
    assert_eq!(instructions(&record).unwrap(), instructions(&record).unwrap());
    assert_eq!(record, before);
}
