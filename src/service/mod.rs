//! Issuing bills: validate, check the invoice number, render, record, deliver.

mod delivery;
mod store;

use std::sync::Arc;

pub use delivery::{Attachment, Delivery, Envelope, OutboxDelivery};
pub use store::{BillStore, InMemoryBillStore, JsonFileStore};

use crate::config::ServiceConfig;
use crate::error::Error;
use crate::model::{BillForm, BillRecord};
use crate::pdf::Renderer;

/// A rendered bill together with the record it was rendered from.
#[derive(Clone, Debug)]
pub struct IssuedBill {
    pub record: BillRecord,
    pub pdf: Vec<u8>,
}

#[derive(Debug)]
pub struct DocumentService {
    renderer: Arc<Renderer>,
    store: Arc<dyn BillStore>,
    delivery: Arc<dyn Delivery>,
    config: ServiceConfig,
}

impl DocumentService {
    pub fn new(
        renderer: Arc<Renderer>,
        store: Arc<dyn BillStore>,
        delivery: Arc<dyn Delivery>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            renderer,
            store,
            delivery,
            config,
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Validate `form`, render it and record it under its invoice number,
    /// then deliver it to the customer.
    ///
    /// Nothing is stored when validation or rendering fails. A delivery
    /// failure leaves the bill stored; use [`DocumentService::resend`].
    pub fn issue(&self, form: &BillForm) -> Result<IssuedBill, Error> {
        let record = BillRecord::from_form(form)?;
        let quantity = record.quantity()?;
        if self.store.contains(&record.invoice_number)? {
            return Err(Error::DuplicateInvoice(record.invoice_number));
        }

        let pdf = self.renderer.render(&record)?;
        self.store.insert(&record)?;

        if let Err(e) = self.delivery.deliver(&self.envelope(&record, &pdf)) {
            log::warn!("Bill {} stored but not delivered: {e}", record.invoice_number);
            return Err(e);
        }

        log::info!(
            "Issued {} to {} ({}, quantity {}, {} bytes)",
            record.invoice_number,
            record.email,
            record.template.tag(),
            quantity,
            pdf.len()
        );
        Ok(IssuedBill { record, pdf })
    }

    /// Render a stored bill again and deliver it.
    pub fn resend(&self, invoice_number: &str) -> Result<IssuedBill, Error> {
        let record = self
            .store
            .get(invoice_number)?
            .ok_or_else(|| Error::UnknownInvoice(invoice_number.to_string()))?;
        let pdf = self.renderer.render(&record)?;
        self.delivery.deliver(&self.envelope(&record, &pdf))?;
        log::info!("Resent {} to {}", record.invoice_number, record.email);
        Ok(IssuedBill { record, pdf })
    }

    fn envelope(&self, record: &BillRecord, pdf: &[u8]) -> Envelope {
        Envelope {
            invoice_number: record.invoice_number.clone(),
            from: self.config.from_header(),
            to: record.email.clone(),
            subject: self.config.subject.clone(),
            body: self.config.body.clone(),
            attachment: Attachment {
                filename: self.config.attachment_name.clone(),
                content: pdf.to_vec(),
            },
        }
    }
}
