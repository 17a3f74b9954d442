use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// Template A: title, two columns, summary table.
    #[default]
    Formal,
    /// Template B: centred logo, one column of labelled lines.
    Compact,
}

impl TemplateId {
    /// Resolve a caller-supplied template tag. Unknown or missing tags select
    /// the formal receipt; they are never an error.
    pub fn from_tag(tag: Option<&str>) -> TemplateId {
        let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return TemplateId::Formal;
        };
        match tag.to_ascii_lowercase().as_str() {
            "template1" | "a" | "formal" => TemplateId::Formal,
            "template2" | "b" | "compact" => TemplateId::Compact,
            other => {
                log::warn!("Unknown template `{other}`, falling back to the formal receipt");
                TemplateId::Formal
            }
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            TemplateId::Formal => "template1",
            TemplateId::Compact => "template2",
        }
    }
}

/// Logical asset keys for station logos.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogoKey {
    BharatPetroleum,
    IndianOil,
    HpOil,
    Jio,
    EssarOil,
    Narayana,
    Placeholder,
}

impl LogoKey {
    pub const ALL: [LogoKey; 7] = [
        LogoKey::BharatPetroleum,
        LogoKey::IndianOil,
        LogoKey::HpOil,
        LogoKey::Jio,
        LogoKey::EssarOil,
        LogoKey::Narayana,
        LogoKey::Placeholder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogoKey::BharatPetroleum => "bharat_petroleum",
            LogoKey::IndianOil => "indian_oil",
            LogoKey::HpOil => "hp_oil",
            LogoKey::Jio => "jio",
            LogoKey::EssarOil => "essar_oil",
            LogoKey::Narayana => "narayana",
            LogoKey::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for LogoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogoKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        LogoKey::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| Error::validation("logo", format!("unknown logo `{}`", s.trim())))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleType {
    Petrol,
    Diesel,
    Cng,
    Electric,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Petrol => "petrol",
            VehicleType::Diesel => "diesel",
            VehicleType::Cng => "cng",
            VehicleType::Electric => "electric",
        }
    }
}

impl FromStr for VehicleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "petrol" => Ok(VehicleType::Petrol),
            "diesel" => Ok(VehicleType::Diesel),
            "cng" => Ok(VehicleType::Cng),
            "electric" => Ok(VehicleType::Electric),
            _ => Err(Error::validation(
                "vehicleType",
                format!("expected petrol, diesel, cng or electric, got `{}`", s.trim()),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Online,
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Online => "online",
            PaymentMethod::Card => "card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "online" => Ok(PaymentMethod::Online),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(Error::validation(
                "paymentMethod",
                format!("expected cash, online or card, got `{}`", s.trim()),
            )),
        }
    }
}

/// At most one tax identifier per bill, with its value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TaxIdentifier {
    #[default]
    None,
    Gst(String),
    Cst(String),
    Txn(String),
}

impl TaxIdentifier {
    pub fn kind(&self) -> &'static str {
        match self {
            TaxIdentifier::None => "none",
            TaxIdentifier::Gst(_) => "gst",
            TaxIdentifier::Cst(_) => "cst",
            TaxIdentifier::Txn(_) => "txn",
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            TaxIdentifier::None => None,
            TaxIdentifier::Gst(v) | TaxIdentifier::Cst(v) | TaxIdentifier::Txn(v) => Some(v),
        }
    }

    /// `GST No.: <value>` style line, or `None` when no identifier is set.
    pub fn label(&self) -> Option<String> {
        self.value()
            .map(|v| format!("{} No.: {}", self.kind().to_ascii_uppercase(), v))
    }
}

/// A positive, finite amount together with the text the caller supplied for it.
/// The text is what gets printed; the value is only used for arithmetic.
#[derive(Clone, Debug, PartialEq)]
pub struct Amount {
    value: f64,
    literal: String,
}

impl Amount {
    pub fn from_number(value: f64) -> Option<Amount> {
        (value.is_finite() && value > 0.0).then(|| Amount {
            value,
            literal: value.to_string(),
        })
    }

    pub fn parse(text: &str) -> Option<Amount> {
        let literal = text.trim();
        let value: f64 = literal.parse().ok()?;
        (value.is_finite() && value > 0.0).then(|| Amount {
            value,
            literal: literal.to_string(),
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Litres dispensed, rounded to hundredths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quantity {
    hundredths: u64,
}

impl Quantity {
    /// `None` when the quotient does not fit in whole hundredths of a litre.
    pub fn derive(total_amount: &Amount, fuel_rate: &Amount) -> Option<Quantity> {
        let hundredths = (total_amount.value() / fuel_rate.value() * 100.0).round();
        if !hundredths.is_finite() || hundredths < 0.0 || hundredths >= u64::MAX as f64 {
            return None;
        }
        Some(Quantity {
            hundredths: hundredths as u64,
        })
    }

    pub fn hundredths(self) -> u64 {
        self.hundredths
    }

    pub fn as_f64(self) -> f64 {
        self.hundredths as f64 / 100.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.hundredths / 100, self.hundredths % 100)
    }
}

/// Numbers arrive either as JSON numbers or as the text of a form input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn literal(&self) -> String {
        match self {
            NumericField::Number(n) => n.to_string(),
            NumericField::Text(s) => s.trim().to_string(),
        }
    }

    fn to_amount(&self) -> Option<Amount> {
        match self {
            NumericField::Number(n) => Amount::from_number(*n),
            NumericField::Text(s) => Amount::parse(s),
        }
    }
}

/// Bill data as submitted by a caller, before validation.
///
/// Field names follow the JSON body of the bill form. The tax identifier is
/// selected by `taxIdentifier` and its value lives in the field of the same
/// name (`gst`, `cst` or `txn`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub logo: String,
    pub station_name: String,
    pub station_address: String,
    pub fuel_rate: Option<NumericField>,
    pub total_amount: Option<NumericField>,
    pub bill_date: String,
    pub bill_time: String,
    pub customer_name: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub payment_method: String,
    pub invoice_number: String,
    pub tax_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn: Option<String>,
    pub email: String,
}

/// A validated bill, the only input to rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct BillRecord {
    pub template: TemplateId,
    pub logo: LogoKey,
    pub station_name: String,
    pub station_address: String,
    pub fuel_rate: Amount,
    pub total_amount: Amount,
    pub bill_date: String,
    pub bill_time: String,
    pub customer_name: String,
    pub vehicle_number: String,
    pub vehicle_type: VehicleType,
    pub payment_method: PaymentMethod,
    pub invoice_number: String,
    pub tax_identifier: TaxIdentifier,
    pub email: String,
}

fn required(field: &'static str, value: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(value.to_string())
}

fn tax_value(kind: &'static str, value: Option<&String>) -> Result<String, Error> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::validation(
            kind,
            format!("a value is required when taxIdentifier is `{kind}`"),
        )),
    }
}

fn validate_email(email: &str) -> Result<String, Error> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(Error::validation(
            "email",
            format!("`{email}` is not an email address"),
        ));
    }
    Ok(email.to_string())
}

fn derive_quantity(total_amount: &Amount, fuel_rate: &Amount) -> Result<Quantity, Error> {
    Quantity::derive(total_amount, fuel_rate).ok_or_else(|| {
        Error::ArithmeticDegenerate(format!(
            "{} / {}",
            total_amount.literal(),
            fuel_rate.literal()
        ))
    })
}

impl BillRecord {
    pub fn from_form(form: &BillForm) -> Result<BillRecord, Error> {
        if form.logo.trim().is_empty() {
            return Err(Error::validation("logo", "is required"));
        }
        let logo: LogoKey = form.logo.parse()?;

        let fuel_rate = match &form.fuel_rate {
            None => return Err(Error::validation("fuelRate", "is required")),
            Some(raw) => raw
                .to_amount()
                .ok_or_else(|| Error::ArithmeticDegenerate(raw.literal()))?,
        };
        let total_amount = match &form.total_amount {
            None => return Err(Error::validation("totalAmount", "is required")),
            Some(raw) => raw.to_amount().ok_or_else(|| {
                Error::validation(
                    "totalAmount",
                    format!("`{}` is not a positive number", raw.literal()),
                )
            })?,
        };

        derive_quantity(&total_amount, &fuel_rate)?;

        let tax_identifier = match form.tax_identifier.trim().to_ascii_lowercase().as_str() {
            "" | "none" => TaxIdentifier::None,
            "gst" => TaxIdentifier::Gst(tax_value("gst", form.gst.as_ref())?),
            "cst" => TaxIdentifier::Cst(tax_value("cst", form.cst.as_ref())?),
            "txn" => TaxIdentifier::Txn(tax_value("txn", form.txn.as_ref())?),
            other => {
                return Err(Error::validation(
                    "taxIdentifier",
                    format!("expected none, gst, cst or txn, got `{other}`"),
                ));
            }
        };

        Ok(BillRecord {
            template: TemplateId::from_tag(form.template.as_deref()),
            logo,
            station_name: required("stationName", &form.station_name)?,
            station_address: required("stationAddress", &form.station_address)?,
            fuel_rate,
            total_amount,
            bill_date: required("billDate", &form.bill_date)?,
            bill_time: required("billTime", &form.bill_time)?,
            customer_name: required("customerName", &form.customer_name)?,
            vehicle_number: required("vehicleNumber", &form.vehicle_number)?,
            vehicle_type: form.vehicle_type.parse()?,
            payment_method: form.payment_method.parse()?,
            invoice_number: required("invoiceNumber", &form.invoice_number)?,
            tax_identifier,
            email: validate_email(&form.email)?,
        })
    }

    /// Derived from the two source amounts on every call, never stored.
    pub fn quantity(&self) -> Result<Quantity, Error> {
        derive_quantity(&self.total_amount, &self.fuel_rate)
    }

    /// The form this record was validated from, with amounts kept as their
    /// literal text. Persisted instead of the record itself.
    pub fn to_form(&self) -> BillForm {
        let (gst, cst, txn) = match &self.tax_identifier {
            TaxIdentifier::None => (None, None, None),
            TaxIdentifier::Gst(v) => (Some(v.clone()), None, None),
            TaxIdentifier::Cst(v) => (None, Some(v.clone()), None),
            TaxIdentifier::Txn(v) => (None, None, Some(v.clone())),
        };
        BillForm {
            template: Some(self.template.tag().to_string()),
            logo: self.logo.as_str().to_string(),
            station_name: self.station_name.clone(),
            station_address: self.station_address.clone(),
            fuel_rate: Some(NumericField::Text(self.fuel_rate.literal().to_string())),
            total_amount: Some(NumericField::Text(self.total_amount.literal().to_string())),
            bill_date: self.bill_date.clone(),
            bill_time: self.bill_time.clone(),
            customer_name: self.customer_name.clone(),
            vehicle_number: self.vehicle_number.clone(),
            vehicle_type: self.vehicle_type.as_str().to_string(),
            payment_method: self.payment_method.as_str().to_string(),
            invoice_number: self.invoice_number.clone(),
            tax_identifier: self.tax_identifier.kind().to_string(),
            gst,
            cst,
            txn,
            email: self.email.clone(),
        }
    }
}

impl TryFrom<&BillForm> for BillRecord {
    type Error = Error;

    fn try_from(form: &BillForm) -> Result<Self, Self::Error> {
        BillRecord::from_form(form)
    }
}

/// `INV-<unix millis>-<8 hex digits>`.
pub fn generate_invoice_number() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("INV-{millis}-{:08x}", rand::random::<u32>())
}
