use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::Error;
use crate::model::{BillForm, BillRecord};

/// Issued bills keyed by invoice number.
pub trait BillStore: Send + Sync + Debug {
    fn contains(&self, invoice_number: &str) -> Result<bool, Error>;

    /// Store `record` unless its invoice number is taken, in which case the
    /// store is left untouched and `Error::DuplicateInvoice` is returned.
    fn insert(&self, record: &BillRecord) -> Result<(), Error>;

    fn get(&self, invoice_number: &str) -> Result<Option<BillRecord>, Error>;
}

fn lock(
    bills: &Mutex<BTreeMap<String, BillForm>>,
) -> Result<MutexGuard<'_, BTreeMap<String, BillForm>>, Error> {
    bills
        .lock()
        .map_err(|_| Error::Storage("bill store lock poisoned".to_string()))
}

#[derive(Debug, Default)]
pub struct InMemoryBillStore {
    bills: Mutex<BTreeMap<String, BillForm>>,
}

impl InMemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BillStore for InMemoryBillStore {
    fn contains(&self, invoice_number: &str) -> Result<bool, Error> {
        Ok(lock(&self.bills)?.contains_key(invoice_number))
    }

    fn insert(&self, record: &BillRecord) -> Result<(), Error> {
        let mut bills = lock(&self.bills)?;
        if bills.contains_key(&record.invoice_number) {
            return Err(Error::DuplicateInvoice(record.invoice_number.clone()));
        }
        bills.insert(record.invoice_number.clone(), record.to_form());
        Ok(())
    }

    fn get(&self, invoice_number: &str) -> Result<Option<BillRecord>, Error> {
        lock(&self.bills)?
            .get(invoice_number)
            .map(BillRecord::from_form)
            .transpose()
    }
}

/// All bills in one JSON object on disk, rewritten on every insert.
///
/// Only the submitted forms are stored. Records are validated again when
/// read back.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    bills: Mutex<BTreeMap<String, BillForm>>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let bills = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::Storage(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        log::debug!("Opened bill store {} ({} bills)", path.display(), bills.len());
        Ok(Self {
            path,
            bills: Mutex::new(bills),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(lock(&self.bills)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(lock(&self.bills)?.is_empty())
    }

    fn persist(&self, bills: &BTreeMap<String, BillForm>) -> Result<(), Error> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        let content = serde_json::to_string_pretty(bills)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| {
            Error::Storage(format!("failed to write {}: {}", self.path.display(), e.error))
        })?;
        Ok(())
    }
}

impl BillStore for JsonFileStore {
    fn contains(&self, invoice_number: &str) -> Result<bool, Error> {
        Ok(lock(&self.bills)?.contains_key(invoice_number))
    }

    fn insert(&self, record: &BillRecord) -> Result<(), Error> {
        let mut bills = lock(&self.bills)?;
        if bills.contains_key(&record.invoice_number) {
            return Err(Error::DuplicateInvoice(record.invoice_number.clone()));
        }
        bills.insert(record.invoice_number.clone(), record.to_form());
        if let Err(e) = self.persist(&bills) {
            bills.remove(&record.invoice_number);
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, invoice_number: &str) -> Result<Option<BillRecord>, Error> {
        lock(&self.bills)?
            .get(invoice_number)
            .map(BillRecord::from_form)
            .transpose()
    }
}
