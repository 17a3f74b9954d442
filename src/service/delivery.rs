use std::fmt::Debug;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// One outgoing message carrying a rendered bill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub invoice_number: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Attachment,
}

pub trait Delivery: Send + Sync + Debug {
    fn deliver(&self, envelope: &Envelope) -> Result<(), Error>;
}

#[derive(Serialize)]
struct MessageMeta<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    attachment: &'a str,
    attachment_bytes: usize,
}

/// Writes each message to `<dir>/<invoice>/`: the attachment under its own
/// filename next to a `message.json` with the headers.
#[derive(Debug, Clone)]
pub struct OutboxDelivery {
    dir: PathBuf,
}

impl OutboxDelivery {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory a message for `invoice_number` is written to.
    pub fn message_dir(&self, invoice_number: &str) -> PathBuf {
        self.dir.join(path_component(invoice_number))
    }
}

// Keep caller-supplied names inside the outbox.
fn path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        _ => cleaned,
    }
}

impl Delivery for OutboxDelivery {
    fn deliver(&self, envelope: &Envelope) -> Result<(), Error> {
        let dir = self.message_dir(&envelope.invoice_number);
        let fail = |e: std::io::Error| Error::Delivery(format!("{}: {e}", dir.display()));

        std::fs::create_dir_all(&dir).map_err(fail)?;
        let attachment = path_component(&envelope.attachment.filename);
        std::fs::write(dir.join(&attachment), &envelope.attachment.content).map_err(fail)?;

        let meta = MessageMeta {
            from: &envelope.from,
            to: &envelope.to,
            subject: &envelope.subject,
            body: &envelope.body,
            attachment: &attachment,
            attachment_bytes: envelope.attachment.content.len(),
        };
        let json = serde_json::to_string_pretty(&meta)?;
        std::fs::write(dir.join("message.json"), json).map_err(fail)?;

        log::debug!("Queued {} for {} in {}", attachment, envelope.to, dir.display());
        Ok(())
    }
}
