//! Import splitter: one fixed-format accounting file (comma-separated,
//! fields individually quoted) fanned out into four semicolon-joined files
//! by record type. Short rows yield an empty output line instead of
//! failing the run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::error::Result;

/// Paths of the four derived files, returned for reporting.
#[derive(Debug)]
pub struct ImportOutput {
    /// Customer records (01/11).
    pub customers: PathBuf,
    /// Article records (02/22).
    pub articles: PathBuf,
    /// Product group records (03/33 without a sub-group code).
    pub groups: PathBuf,
    /// Product sub-group records (03/33 with a sub-group code).
    pub sub_groups: PathBuf,
}

/// Splits `adm_path` into four files under `<target_dir>/Imported Files`.
pub fn run_import(adm_path: &Path, target_dir: &Path, now: NaiveDateTime) -> Result<ImportOutput> {
    let folder = target_dir.join("Imported Files");
    std::fs::create_dir_all(&folder)?;
    let stamp = now.format("%Y%m%d-%H-%M-%S").to_string();

    let out = ImportOutput {
        customers: folder.join(format!("file_01_11.{stamp}.csv")),
        articles: folder.join(format!("file_artiklar.{stamp}.csv")),
        groups: folder.join(format!("file_huvudgrupp.{stamp}.csv")),
        sub_groups: folder.join(format!("file_varugrupp.{stamp}.csv")),
    };

    let mut customers = BufWriter::new(File::create(&out.customers)?);
    let mut articles = BufWriter::new(File::create(&out.articles)?);
    let mut groups = BufWriter::new(File::create(&out.groups)?);
    let mut sub_groups = BufWriter::new(File::create(&out.sub_groups)?);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(File::open(adm_path)?);

    for record in reader.records() {
        let record = record?;
        let fields: Vec<&str> = record.iter().map(str::trim).collect();
        let Some(&kind) = fields.first() else {
            continue;
        };
        match kind {
            "01" | "11" => writeln!(customers, "{}", transform_customer(&fields))?,
            "02" | "22" => writeln!(articles, "{}", transform_article(&fields))?,
            "03" | "33" => {
                if fields.get(5).is_some_and(|f| !f.is_empty()) {
                    writeln!(sub_groups, "{}", transform_sub_group(&fields))?;
                } else {
                    writeln!(groups, "{}", transform_group(&fields))?;
                }
            }
            // 00 header and 99 footer carry no payload
            _ => {}
        }
    }

    customers.flush()?;
    articles.flush()?;
    groups.flush()?;
    sub_groups.flush()?;
    info!(source = %adm_path.display(), folder = %folder.display(), "accounting file split");
    Ok(out)
}

/// "01" stays False, the modified variant "11" becomes True; the 02/33
/// pairs follow the same rule against their own base code.
fn flag(type_code: &str, base: &str) -> &'static str {
    if type_code == base {
        "False"
    } else {
        "True"
    }
}

/// 01/11: flag, customer code, name, address, description.
fn transform_customer(fields: &[&str]) -> String {
    if fields.len() < 7 {
        warn!(len = fields.len(), "short customer record");
        return String::new();
    }
    let flag = flag(fields[0], "01");
    format!(
        "{flag} ; {} ; {} ; {} ; {}",
        fields[3], fields[4], fields[5], fields[6]
    )
}

/// 02/22: article code, name, two counters, cleaned price, flag last —
/// the layout the article importer downstream expects.
fn transform_article(fields: &[&str]) -> String {
    if fields.len() < 11 {
        warn!(len = fields.len(), "short article record");
        return String::new();
    }
    let flag = flag(fields[0], "02");
    format!(
        "{} ; {} ; {} ; {} ; {} ; {flag}",
        fields[3],
        fields[4],
        fields[6],
        fields[7],
        clean_price(fields[8])
    )
}

/// 03/33 without a sub-group code: flag, group code, name.
fn transform_group(fields: &[&str]) -> String {
    if fields.len() < 7 {
        warn!(len = fields.len(), "short group record");
        return String::new();
    }
    let flag = flag(fields[0], "03");
    format!("{flag} ; {} ; {}", fields[4], fields[6])
}

/// 03/33 with a sub-group code: flag, group code, sub-group code, name.
fn transform_sub_group(fields: &[&str]) -> String {
    if fields.len() < 7 {
        warn!(len = fields.len(), "short sub-group record");
        return String::new();
    }
    let flag = flag(fields[0], "03");
    format!("{flag} ; {} ; {} ; {}", fields[4], fields[5], fields[6])
}

/// Prices arrive as implied-decimal integers with zero padding; "007500"
/// reads back as "75".
fn clean_price(raw: &str) -> String {
    let stripped = raw.strip_suffix("00").unwrap_or(raw);
    let trimmed = stripped.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
