//! Export orchestration: load every table, resolve series, create the
//! output files and run the record builders in record order.

use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::error::Result;
use crate::export::{files::FileSet, records};
use crate::series::SeriesMap;
use crate::tables::Tables;

/// Runs one full export pass over the input folder. Tables load before any
/// output file is touched, so a missing mandatory input leaves the target
/// folder untouched. The run holds no state across invocations.
pub fn run_export(input_dir: &Path, target_dir: &Path, now: NaiveDateTime) -> Result<()> {
    let tables = Tables::load_dir(input_dir)?;
    let map = SeriesMap::build(&tables.sales);
    if map.is_empty() {
        warn!("sales table resolved no stores; nothing will be written");
    }
    let mut files = FileSet::create(&tables.sales, &map, target_dir, now)?;
    info!(files = files.len(), target = %target_dir.display(), "output files created");

    records::header(&mut files)?;
    records::delivery_notes(&tables.deliveries, &map, &mut files)?;
    records::store_identity("03", &tables.sales, &mut files)?;
    records::payments(&tables.payments, tables.gift_sold.as_deref(), &map, &mut files)?;
    records::delivery_note_payments(&tables.deliveries, &map, &mut files)?;
    records::gift_card_payments(tables.gift_used.as_deref(), &map, &mut files)?;
    records::store_identity("05", &tables.sales, &mut files)?;
    records::line_items(&tables.sales, &mut files)?;
    records::store_identity("07", &tables.sales, &mut files)?;
    records::product_groups(&tables.sales, &mut files)?;
    records::store_identity("09", &tables.sales, &mut files)?;
    records::hourly(&tables.sales, &mut files)?;
    records::store_identity("11", &tables.sales, &mut files)?;
    records::vat_summary(&tables.vat, &mut files)?;
    records::footer(&mut files)?;

    for (store, file) in files.iter_mut() {
        info!(store, lines = file.lines(), path = %file.path().display(), "interchange file written");
    }
    Ok(())
}
