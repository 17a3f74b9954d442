use crate::error::Error;
use crate::model::BillRecord;
use crate::pdf::{BLACK, PAGE_WIDTH, TextStyle};

use super::Primitive;

const GREEN: [u8; 3] = [0, 128, 0];
const LOGO_SIZE: f32 = 50.0;
const X: f32 = 20.0;

pub(super) fn instructions(record: &BillRecord) -> Result<Vec<Primitive>, Error> {
    let quantity = record.quantity()?;
    let center = PAGE_WIDTH / 2.0;
    let text = TextStyle::new(14.0, BLACK);
    let mut out = vec![
        Primitive::Image {
            key: record.logo,
            x: (PAGE_WIDTH - LOGO_SIZE) / 2.0,
            y: 20.0,
            width: LOGO_SIZE,
            height: LOGO_SIZE,
        },
        Primitive::text("WELCOME !", center, 77.0, TextStyle::new(12.0, BLACK).centered()),
    ];

    let mut y = 87.0;
    out.push(Primitive::text(
        format!("Receipt No: {}", record.invoice_number),
        X,
        y,
        text,
    ));
    y += 10.0;

    let product = [
        "Product Details:".to_string(),
        format!("Fuel Rate: {} /Ltr", record.fuel_rate),
        format!("Total Amount: {}", record.total_amount),
        format!("Volume(Ltr): {quantity}"),
    ];
    for line in product {
        out.push(Primitive::text(line, X, y, text));
        y += 8.0;
    }
    y += 12.0;

    let vehicle = [
        format!("Veh Type: {}", record.vehicle_type.as_str()),
        format!("Veh No: {}", record.vehicle_number),
        format!("Customer Name: {}", record.customer_name),
    ];
    for line in vehicle {
        out.push(Primitive::text(line, X, y, text));
        y += 8.0;
    }
    y += 12.0;

    if let Some(label) = record.tax_identifier.label() {
        out.push(Primitive::text(label, X, y, text));
        y += 10.0;
    }

    out.push(Primitive::text(format!("Date: {}", record.bill_date), X, y, text));
    out.push(Primitive::text(
        format!("Time: {}", record.bill_time),
        190.0,
        y,
        text.right(),
    ));
    y += 10.0;

    out.push(Primitive::text(
        format!("Mode: {}", record.payment_method.as_str()),
        X,
        y,
        text,
    ));

    out.push(Primitive::text(
        "Save fuel, save money",
        center,
        270.0,
        TextStyle::new(16.0, GREEN).centered(),
    ));
    Ok(out)
}
