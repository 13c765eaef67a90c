//! Typed source rows — one struct per input table, populated once at load
//! time so a missing column fails the run before any output file exists.

use serde::Deserialize;

/// Sale vs. return, derived from a Dokumenttyp cell. Credit documents come
/// through either as a "Retur..." document type or under the AV credit
/// series; anything else (including an empty cell) counts as a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Sale,
    Return,
}

impl DocumentKind {
    pub fn parse(raw: &str) -> Self {
        let t = raw.trim();
        if t.starts_with("AV") || t.to_lowercase().contains("retur") {
            DocumentKind::Return
        } else {
            DocumentKind::Sale
        }
    }
}

/// One row of the Försäljning table.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesRow {
    #[serde(rename = "Serie")]
    pub serie: String,
    #[serde(rename = "Butikskod")]
    pub store: String,
    #[serde(rename = "Kassa")]
    pub register: String,
    #[serde(rename = "Nummer")]
    pub number: String,
    #[serde(rename = "Dokumenttyp")]
    pub document_type: String,
    /// Day-first date, e.g. "05/03/2025".
    #[serde(rename = "Datum")]
    pub date: String,
    /// "HH:MM:SS".
    #[serde(rename = "Tid")]
    pub time: String,
    #[serde(rename = "Artikelnr")]
    pub article: String,
    #[serde(rename = "Antal")]
    pub quantity: String,
    #[serde(rename = "Nettobelopp")]
    pub net: String,
    #[serde(rename = "Säljare")]
    pub seller: String,
    /// VAT rate as exported, e.g. "12%".
    #[serde(rename = "Moms")]
    pub vat_rate: String,
    #[serde(rename = "Varugrupp")]
    pub product_group: String,
}

impl SalesRow {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::parse(&self.document_type)
    }
}

/// One row of the Betalsätt table.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRow {
    #[serde(rename = "Serie")]
    pub serie: String,
    #[serde(rename = "Nummer")]
    pub number: String,
    #[serde(rename = "Betalsätt")]
    pub method: String,
    #[serde(rename = "Belopp")]
    pub amount: String,
    #[serde(rename = "Dokumenttyp")]
    pub document_type: String,
    #[serde(rename = "Bokföringssuffix")]
    pub suffix: String,
}

impl PaymentRow {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::parse(&self.document_type)
    }
}

/// One row of the Följesedlar table. The upstream system exports delivery
/// notes with English column names, unlike every other table.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryRow {
    #[serde(rename = "Serie")]
    pub serie: String,
    #[serde(rename = "Number")]
    pub number: String,
    #[serde(rename = "Id. Shop")]
    pub shop: String,
    #[serde(rename = "Register")]
    pub register: String,
    #[serde(rename = "Customer Id.")]
    pub customer: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Reference")]
    pub reference: String,
    #[serde(rename = "Employee")]
    pub seller: String,
    /// Empty on the note's reference row.
    #[serde(rename = "Product")]
    pub article: String,
    #[serde(rename = "Qty.")]
    pub quantity: String,
    #[serde(rename = "Gross Amount")]
    pub gross: String,
    #[serde(rename = "Net Amount")]
    pub net: String,
    #[serde(rename = "VAT")]
    pub vat: String,
}

/// One row of the Moms table.
#[derive(Debug, Clone, Deserialize)]
pub struct VatRow {
    #[serde(rename = "Butikskod")]
    pub store: String,
    #[serde(rename = "Momssats")]
    pub rate: String,
    #[serde(rename = "Underlag")]
    pub base: String,
    #[serde(rename = "Momsbelopp")]
    pub vat: String,
    #[serde(rename = "Totalt")]
    pub total: String,
}

/// One row of either Presentkort table (redeemed or sold).
#[derive(Debug, Clone, Deserialize)]
pub struct GiftCardRow {
    #[serde(rename = "Serie")]
    pub serie: String,
    #[serde(rename = "Nummer")]
    pub number: String,
    /// Only the sold file carries a payment method column.
    #[serde(rename = "Betalsätt", default)]
    pub method: String,
    #[serde(rename = "Belopp")]
    pub amount: String,
}
