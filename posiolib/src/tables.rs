//! Input table discovery and loading. Every input is a semicolon-delimited
//! CSV with a header row, identified by a keyword in its file name.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{PosioError, Result};
use crate::model::{DeliveryRow, GiftCardRow, PaymentRow, SalesRow, VatRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Sales,
    PaymentMethod,
    DeliveryNote,
    Vat,
    GiftCardUsed,
    GiftCardSold,
}

impl InputKind {
    /// Classifies a file by its name. The gift-card keywords are tested
    /// first since they are the most specific.
    pub fn of_file_name(name: &str) -> Option<Self> {
        if name.contains("Presentkort använda") {
            Some(Self::GiftCardUsed)
        } else if name.contains("Presentkort sålda") {
            Some(Self::GiftCardSold)
        } else if name.contains("Försäljning") {
            Some(Self::Sales)
        } else if name.contains("Betalsätt") {
            Some(Self::PaymentMethod)
        } else if name.contains("Följesedlar") {
            Some(Self::DeliveryNote)
        } else if name.contains("Moms") {
            Some(Self::Vat)
        } else {
            None
        }
    }

    fn mandatory() -> [InputKind; 4] {
        [
            Self::Sales,
            Self::PaymentMethod,
            Self::DeliveryNote,
            Self::Vat,
        ]
    }
}

/// Every source table for one run, loaded eagerly and read-only afterwards.
#[derive(Debug, Default)]
pub struct Tables {
    pub sales: Vec<SalesRow>,
    pub payments: Vec<PaymentRow>,
    pub deliveries: Vec<DeliveryRow>,
    pub vat: Vec<VatRow>,
    pub gift_used: Option<Vec<GiftCardRow>>,
    pub gift_sold: Option<Vec<GiftCardRow>>,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(File::open(path)?);
    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        rows.push(record?);
    }
    Ok(rows)
}

fn recognised(dir: &Path) -> Result<Vec<(InputKind, PathBuf)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(kind) = InputKind::of_file_name(&name) {
            found.push((kind, entry.path()));
        }
    }
    Ok(found)
}

impl Tables {
    /// Loads every recognised input file in `dir`. The sales, payment,
    /// delivery-note and VAT tables are mandatory; the two gift-card
    /// tables are optional.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let found = recognised(dir)?;
        let path_of = |kind: InputKind| {
            found
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, p)| p.clone())
        };

        let sales = path_of(InputKind::Sales).ok_or(PosioError::MissingInput("Försäljning"))?;
        let payments =
            path_of(InputKind::PaymentMethod).ok_or(PosioError::MissingInput("Betalsätt"))?;
        let deliveries =
            path_of(InputKind::DeliveryNote).ok_or(PosioError::MissingInput("Följesedlar"))?;
        let vat = path_of(InputKind::Vat).ok_or(PosioError::MissingInput("Moms"))?;

        let mut tables = Tables {
            sales: read_rows(&sales)?,
            payments: read_rows(&payments)?,
            deliveries: read_rows(&deliveries)?,
            vat: read_rows(&vat)?,
            gift_used: None,
            gift_sold: None,
        };
        if let Some(path) = path_of(InputKind::GiftCardUsed) {
            tables.gift_used = Some(read_rows(&path)?);
        }
        if let Some(path) = path_of(InputKind::GiftCardSold) {
            tables.gift_sold = Some(read_rows(&path)?);
        }

        info!(
            sales = tables.sales.len(),
            payments = tables.payments.len(),
            deliveries = tables.deliveries.len(),
            vat = tables.vat.len(),
            gift_used = tables.gift_used.as_ref().map_or(0, Vec::len),
            gift_sold = tables.gift_sold.as_ref().map_or(0, Vec::len),
            "input tables loaded"
        );
        Ok(tables)
    }

    /// Cheap presence check used by the folder watcher: are all mandatory
    /// inputs in place?
    pub fn required_present(dir: &Path) -> Result<bool> {
        let found = recognised(dir)?;
        Ok(InputKind::mandatory()
            .iter()
            .all(|kind| found.iter().any(|(k, _)| k == kind)))
    }

    /// Paths of every recognised input currently in `dir`, for archival
    /// after a successful run.
    pub fn recognised_paths(dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(recognised(dir)?.into_iter().map(|(_, p)| p).collect())
    }
}
