use crate::error::Error;
use crate::model::BillRecord;
use crate::pdf::{BLACK, PAGE_WIDTH, TableStyle, TextStyle, WHITE};

use super::Primitive;

const TITLE: [u8; 3] = [51, 102, 204];
const PAYMENT: [u8; 3] = [26, 51, 128];
const GREEN: [u8; 3] = [0, 128, 0];

const LEFT_X: f32 = 20.0;
const RIGHT_X: f32 = 140.0;
const ROW_STEP: f32 = 8.0;

pub(super) fn instructions(record: &BillRecord) -> Result<Vec<Primitive>, Error> {
    let quantity = record.quantity()?;
    let center = PAGE_WIDTH / 2.0;
    let body = TextStyle::new(12.0, BLACK);
    let mut out = vec![
        Primitive::text("Fuel Receipt", center, 30.0, TextStyle::new(20.0, TITLE).centered()),
        Primitive::Image {
            key: record.logo,
            x: 10.0,
            y: 40.0,
            width: 40.0,
            height: 40.0,
        },
    ];

    let billed_to = [
        "Billed To:".to_string(),
        format!("Customer Name: {}", record.customer_name),
        format!("Vehicle No: {}", record.vehicle_number),
        format!("Vehicle Type: {}", record.vehicle_type.as_str()),
    ];
    let mut y = 90.0;
    for line in billed_to {
        out.push(Primitive::text(line, LEFT_X, y, body));
        y += ROW_STEP;
    }

    let receipt = [
        "Receipt Details:".to_string(),
        format!("Date: {}", record.bill_date),
        format!("Time: {}", record.bill_time),
        format!("Fuel Station: {}", record.station_name),
    ];
    let mut y = 50.0;
    for line in receipt {
        out.push(Primitive::text(line, RIGHT_X, y, body));
        y += ROW_STEP;
    }
    out.push(Primitive::WrappedText {
        content: format!("Station Address: {}", record.station_address),
        x: RIGHT_X,
        y,
        max_width: 60.0,
        line_height: ROW_STEP,
        style: body,
    });

    if let Some(label) = record.tax_identifier.label() {
        out.push(Primitive::text(label, center, 130.0, body.centered()));
    }

    out.push(Primitive::text(
        format!("Payment Method: {}", record.payment_method.as_str()),
        center,
        140.0,
        TextStyle::new(14.0, PAYMENT).centered(),
    ));

    out.push(Primitive::Table {
        header: vec![
            "Fuel Rate".to_string(),
            "Quantity".to_string(),
            "Total Amount".to_string(),
        ],
        rows: vec![vec![
            record.fuel_rate.literal().to_string(),
            quantity.to_string(),
            record.total_amount.literal().to_string(),
        ]],
        start_y: 150.0,
        style: TableStyle {
            font_size: 12.0,
            cell_padding: 3.0,
            header_fill: TITLE,
            header_text: WHITE,
            ..TableStyle::default()
        },
    });

    out.push(Primitive::text(
        "Thank you for your purchase!",
        center,
        270.0,
        TextStyle::new(14.0, GREEN).centered(),
    ));
    Ok(out)
}
