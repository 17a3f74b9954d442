use std::path::PathBuf;

/// Rendering options. Fonts default to the PDF standard Helvetica pair.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// TrueType/OpenType file for regular text.
    pub font: Option<PathBuf>,
    /// TrueType/OpenType file for table headers.
    pub bold_font: Option<PathBuf>,
    /// Flate-compress the page content stream.
    pub compress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font: None,
            bold_font: None,
            compress: true,
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

impl RenderConfig {
    /// Reads `FUELBILL_FONT`, `FUELBILL_BOLD_FONT` and `FUELBILL_UNCOMPRESSED`.
    pub fn from_env() -> Self {
        Self {
            font: env_path("FUELBILL_FONT"),
            bold_font: env_path("FUELBILL_BOLD_FONT"),
            compress: std::env::var("FUELBILL_UNCOMPRESSED").is_err(),
        }
    }
}

/// Logo directory from `FUELBILL_ASSETS`, defaulting to `./assets`.
pub fn asset_dir_from_env() -> PathBuf {
    env_path("FUELBILL_ASSETS").unwrap_or_else(|| PathBuf::from("assets"))
}

/// How issued bills are addressed when handed to delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub sender_name: String,
    pub sender_address: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sender_name: "Fuel Bill Generator".to_string(),
            sender_address: "no-reply@localhost".to_string(),
            subject: "Your Fuel Bill".to_string(),
            body: "Please find your bill attached.".to_string(),
            attachment_name: "FuelBill.pdf".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Defaults with the sender address taken from `FUELBILL_SENDER` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(sender) = std::env::var("FUELBILL_SENDER")
            && !sender.trim().is_empty()
        {
            config.sender_address = sender.trim().to_string();
        }
        config
    }

    /// `"Name" <address>` mailbox for the From header.
    pub fn from_header(&self) -> String {
        format!("\"{}\" <{}>", self.sender_name, self.sender_address)
    }
}
