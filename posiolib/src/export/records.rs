//! Record builders for the interchange format, one per record type. Each
//! builder receives only the tables it consumes plus the run context and
//! appends its rows to the already-open output files.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::Result;
use crate::export::files::FileSet;
use crate::model::{DeliveryRow, DocumentKind, GiftCardRow, PaymentRow, SalesRow, VatRow};
use crate::normalize;
use crate::series::SeriesMap;

/// Format tag and version carried by every interchange file.
const HEADER_TAG: &str = "20120720_001";
const HEADER_VERSION: &str = "1.3.15";

/// Pseudo payment methods for the delivery-note and gift-card summaries.
const METHOD_DELIVERY_NOTES: &str = "Följesedlar";
const METHOD_GIFT_CARD: &str = "Presentkort";

/// Record 00: one constant header row per file, always first.
pub fn header(files: &mut FileSet) -> Result<()> {
    for (_, file) in files.iter_mut() {
        file.append(&["00", HEADER_TAG, HEADER_VERSION])?;
    }
    Ok(())
}

/// Record 99: one constant footer row per file, strictly last.
pub fn footer(files: &mut FileSet) -> Result<()> {
    for (_, file) in files.iter_mut() {
        file.append(&["99"])?;
    }
    Ok(())
}

/// Records 01/02: delivery notes grouped by document number. One 01 header
/// per distinct document, taking its fields from the group's first row;
/// the reference comes from the group's row without an article code, when
/// one exists. Rows without an article code produce no 02 detail row.
pub fn delivery_notes(rows: &[DeliveryRow], map: &SeriesMap, files: &mut FileSet) -> Result<()> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<&DeliveryRow>> = HashMap::new();

    for row in rows {
        let Some(store) = map.store_for_series(&row.serie) else {
            warn!(serie = %row.serie, number = %row.number, "delivery note does not resolve to an output file, skipping");
            continue;
        };
        let key = (store.to_string(), row.number.trim().to_string());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    for key in &order {
        let group = &groups[key];
        let first = group[0];
        let reference = group
            .iter()
            .find(|row| row.article.trim().is_empty())
            .map(|row| row.reference.trim().to_string())
            .unwrap_or_default();

        let Some(file) = files.for_store(&key.0) else {
            continue;
        };
        let date = normalize::iso_date(&first.date);
        file.append(&[
            "01",
            first.shop.trim(),
            first.register.trim(),
            first.customer.trim(),
            date.as_str(),
            reference.as_str(),
            key.1.as_str(),
            first.seller.trim(),
        ])?;

        for row in group {
            if row.article.trim().is_empty() {
                continue;
            }
            let quantity = normalize::scaled_quantity(normalize::parse_amount(&row.quantity));
            let net = normalize::scaled_amount(normalize::parse_amount(&row.net));
            let gross = normalize::scaled_amount(normalize::parse_amount(&row.gross));
            let vat = normalize::percent_code(&row.vat);
            file.append(&[
                "02",
                row.article.trim(),
                quantity.as_str(),
                net.as_str(),
                gross.as_str(),
                vat.as_str(),
            ])?;
        }
    }
    Ok(())
}

/// Records 03, 05, 07, 09 and 11: the same store identity row (store,
/// register, sales date) repeated under several type codes, as the
/// interchange format wants it for downstream compatibility.
pub fn store_identity(code: &str, sales: &[SalesRow], files: &mut FileSet) -> Result<()> {
    let mut first_rows: BTreeMap<&str, &SalesRow> = BTreeMap::new();
    for row in sales {
        first_rows.entry(row.store.trim()).or_insert(row);
    }

    for (store, file) in files.iter_mut() {
        let Some(row) = first_rows.get(store) else {
            continue;
        };
        let date = normalize::iso_date(&row.date);
        file.append(&[code, store, row.register.trim(), date.as_str()])?;
    }
    Ok(())
}

#[derive(Debug, Default)]
struct PayBucket {
    debit: Decimal,
    credit: Decimal,
    suffix: Option<String>,
}

type PayBuckets = BTreeMap<String, BTreeMap<String, PayBucket>>;

fn flush_payment_buckets(buckets: &PayBuckets, files: &mut FileSet) -> Result<()> {
    for (store, methods) in buckets {
        let Some(file) = files.for_store(store) else {
            continue;
        };
        for (method, bucket) in methods {
            let suffix = bucket.suffix.clone().unwrap_or_default();
            let debit = normalize::scaled_amount(bucket.debit);
            let credit = normalize::scaled_amount(bucket.credit);
            file.append(&[
                "04",
                suffix.as_str(),
                method.as_str(),
                debit.as_str(),
                credit.as_str(),
            ])?;
        }
    }
    Ok(())
}

/// Record 04: per output file and payment method, a debit sum from sale
/// documents and a credit sum (absolute) from return documents. A repeated
/// source line for the same (document, method, amount) counts once.
/// Gift-card sales merge in as additional debit; the accounting suffix of
/// a method is the first one seen.
pub fn payments(
    rows: &[PaymentRow],
    gift_sold: Option<&[GiftCardRow]>,
    map: &SeriesMap,
    files: &mut FileSet,
) -> Result<()> {
    let mut buckets = PayBuckets::new();
    let mut seen: HashSet<(String, String, String, Decimal)> = HashSet::new();

    for row in rows {
        let Some(store) = map.store_for_series(&row.serie) else {
            warn!(serie = %row.serie, number = %row.number, "payment row does not resolve to an output file, skipping");
            continue;
        };
        let store = store.to_string();
        let method = row.method.trim().to_string();
        let amount = normalize::parse_amount(&row.amount);
        if !seen.insert((
            store.clone(),
            row.number.trim().to_string(),
            method.clone(),
            amount,
        )) {
            continue;
        }

        let bucket = buckets
            .entry(store)
            .or_default()
            .entry(method)
            .or_default();
        if bucket.suffix.is_none() && !row.suffix.trim().is_empty() {
            bucket.suffix = Some(row.suffix.trim().to_string());
        }
        match row.kind() {
            DocumentKind::Sale => bucket.debit += amount,
            DocumentKind::Return => bucket.credit += amount.abs(),
        }
    }

    for row in gift_sold.unwrap_or_default() {
        let Some(store) = map.store_for_series(&row.serie) else {
            warn!(serie = %row.serie, number = %row.number, "gift card sale does not resolve to an output file, skipping");
            continue;
        };
        let store = store.to_string();
        let method = match row.method.trim() {
            "" => METHOD_GIFT_CARD.to_string(),
            m => m.to_string(),
        };
        let amount = normalize::parse_amount(&row.amount);
        if !seen.insert((
            store.clone(),
            row.number.trim().to_string(),
            method.clone(),
            amount,
        )) {
            continue;
        }
        buckets.entry(store).or_default().entry(method).or_default().debit += amount;
    }

    flush_payment_buckets(&buckets, files)
}

/// Record 04, delivery-note variant: net amounts summed per file under the
/// pseudo payment method "Följesedlar". Negative nets count as credit.
pub fn delivery_note_payments(
    rows: &[DeliveryRow],
    map: &SeriesMap,
    files: &mut FileSet,
) -> Result<()> {
    let mut buckets = PayBuckets::new();
    for row in rows {
        let Some(store) = map.store_for_series(&row.serie) else {
            // already warned by the 01/02 builder for the same row
            continue;
        };
        let amount = normalize::parse_amount(&row.net);
        let bucket = buckets
            .entry(store.to_string())
            .or_default()
            .entry(METHOD_DELIVERY_NOTES.to_string())
            .or_default();
        if amount.is_sign_negative() {
            bucket.credit += amount.abs();
        } else {
            bucket.debit += amount;
        }
    }
    flush_payment_buckets(&buckets, files)
}

/// Record 04, gift-card variant: redeemed gift-card amounts per file under
/// the pseudo payment method "Presentkort".
pub fn gift_card_payments(
    rows: Option<&[GiftCardRow]>,
    map: &SeriesMap,
    files: &mut FileSet,
) -> Result<()> {
    let mut buckets = PayBuckets::new();
    for row in rows.unwrap_or_default() {
        let Some(store) = map.store_for_series(&row.serie) else {
            warn!(serie = %row.serie, number = %row.number, "gift card redemption does not resolve to an output file, skipping");
            continue;
        };
        let amount = normalize::parse_amount(&row.amount);
        let bucket = buckets
            .entry(store.to_string())
            .or_default()
            .entry(METHOD_GIFT_CARD.to_string())
            .or_default();
        if amount.is_sign_negative() {
            bucket.credit += amount.abs();
        } else {
            bucket.debit += amount;
        }
    }
    flush_payment_buckets(&buckets, files)
}

/// Record 06: one row per sales line (article, quantity, price, time,
/// seller, VAT code). Quantities are negated for return documents.
pub fn line_items(sales: &[SalesRow], files: &mut FileSet) -> Result<()> {
    for row in sales {
        let Some(file) = files.for_store(&row.store) else {
            warn!(store = %row.store, number = %row.number, "sales row does not resolve to an output file, skipping");
            continue;
        };
        let mut quantity = normalize::parse_amount(&row.quantity);
        if row.kind() == DocumentKind::Return {
            quantity = -quantity;
        }
        let quantity = normalize::scaled_quantity(quantity);
        let net = normalize::scaled_amount(normalize::parse_amount(&row.net));
        let time = normalize::compact_time(&row.time);
        let vat = normalize::percent_code(&row.vat_rate);
        file.append(&[
            "06",
            row.article.trim(),
            quantity.as_str(),
            net.as_str(),
            time.as_str(),
            row.seller.trim(),
            vat.as_str(),
        ])?;
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SumBucket {
    quantity: Decimal,
    net: Decimal,
}

/// Record 08: quantity and net summed per product group per file. Groups
/// whose code is not numeric are accumulated but not emitted. Return rows
/// contribute negated quantity and net.
pub fn product_groups(sales: &[SalesRow], files: &mut FileSet) -> Result<()> {
    let mut buckets: BTreeMap<String, BTreeMap<String, SumBucket>> = BTreeMap::new();
    for row in sales {
        if files.for_store(&row.store).is_none() {
            continue;
        }
        let mut quantity = normalize::parse_amount(&row.quantity);
        let mut net = normalize::parse_amount(&row.net);
        if row.kind() == DocumentKind::Return {
            quantity = -quantity;
            net = -net;
        }
        let bucket = buckets
            .entry(row.store.trim().to_string())
            .or_default()
            .entry(row.product_group.trim().to_string())
            .or_default();
        bucket.quantity += quantity;
        bucket.net += net;
    }

    for (store, groups) in &buckets {
        let Some(file) = files.for_store(store) else {
            continue;
        };
        for (code, sums) in groups {
            let Ok(numeric) = code.parse::<u32>() else {
                warn!(group = %code, store = %store, "non-numeric product group excluded from output");
                continue;
            };
            let code = normalize::zero_pad3(numeric);
            let quantity = normalize::scaled_quantity(sums.quantity);
            let net = normalize::scaled_amount(sums.net);
            file.append(&["08", code.as_str(), quantity.as_str(), net.as_str()])?;
        }
    }
    Ok(())
}

/// Record 10: quantity and net summed into hour intervals per file.
pub fn hourly(sales: &[SalesRow], files: &mut FileSet) -> Result<()> {
    let mut buckets: BTreeMap<String, BTreeMap<String, SumBucket>> = BTreeMap::new();
    for row in sales {
        if files.for_store(&row.store).is_none() {
            continue;
        }
        let bucket = buckets
            .entry(row.store.trim().to_string())
            .or_default()
            .entry(normalize::bucket_hour(&row.time))
            .or_default();
        bucket.quantity += normalize::parse_amount(&row.quantity);
        bucket.net += normalize::parse_amount(&row.net);
    }

    for (store, intervals) in &buckets {
        let Some(file) = files.for_store(store) else {
            continue;
        };
        for (interval, sums) in intervals {
            let quantity = normalize::scaled_quantity(sums.quantity);
            let net = normalize::scaled_amount(sums.net);
            file.append(&["10", interval.as_str(), quantity.as_str(), net.as_str()])?;
        }
    }
    Ok(())
}

/// Record 12: one row per VAT source row, routed by store code, every
/// amount rendered in hundredths.
pub fn vat_summary(rows: &[VatRow], files: &mut FileSet) -> Result<()> {
    for row in rows {
        let Some(file) = files.for_store(&row.store) else {
            warn!(store = %row.store, "VAT row does not resolve to an output file, skipping");
            continue;
        };
        let code = normalize::percent_code(&row.rate);
        let base = normalize::scaled_amount(normalize::parse_amount(&row.base));
        let vat = normalize::scaled_amount(normalize::parse_amount(&row.vat));
        let total = normalize::scaled_amount(normalize::parse_amount(&row.total));
        file.append(&[
            "12",
            code.as_str(),
            base.as_str(),
            vat.as_str(),
            total.as_str(),
        ])?;
    }
    Ok(())
}
