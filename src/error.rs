use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid bill field `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Fuel rate is not a positive number, or total / rate is too large to
    /// print as litres with two decimals.
    #[error("cannot derive a quantity from `{0}`")]
    ArithmeticDegenerate(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("asset `{key}` is not a usable image: {reason}")]
    InvalidAsset { key: String, reason: String },

    #[error("invoice number already exists: {0}")]
    DuplicateInvoice(String),

    #[error("bill not found: {0}")]
    UnknownInvoice(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Message suitable for showing to whoever submitted the bill.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { field, reason } => format!("Invalid {field}: {reason}"),
            Error::ArithmeticDegenerate(_) => {
                "Fuel rate must be greater than zero and give a valid quantity.".to_string()
            }
            Error::DuplicateInvoice(_) => {
                "Invoice number already exists. Please try again.".to_string()
            }
            Error::UnknownInvoice(number) => format!("No bill with invoice number {number}."),
            _ => "Something went wrong!".to_string(),
        }
    }

    /// True for errors caused by the submitted data rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::ArithmeticDegenerate(_)
                | Error::DuplicateInvoice(_)
                | Error::UnknownInvoice(_)
        )
    }
}
