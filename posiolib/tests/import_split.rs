use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use posiolib::import::run_import;
use tempfile::TempDir;

fn run_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 5)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

const ADM: &str = "\
\"00\",\"X\"\n\
\"01\",\"a\",\"b\",\"0398\",\"The Swedish Club\",\"Gullbergsstrandgata 6\",\"Leveranskunder hotell,rest mm\"\n\
\"11\",\"a\",\"b\",\"0399\",\"Acme\",\"Street 1\",\"Desc\"\n\
\"02\",\"a\",\"b\",\"2\",\"Soppa TA\",\"999\",\"60\",\"63\",\"7500\",\"1200\",\"7500\"\n\
\"22\",\"a\",\"b\",\"3\",\"Tea\",\"998\",\"10\",\"11\",\"0\",\"0\",\"0\"\n\
\"03\",\"a\",\"b\",\"c\",\"4\",\"\",\"Huvudgrupp A\"\n\
\"33\",\"a\",\"b\",\"c\",\"4\",\"41\",\"Varugrupp B\"\n\
\"02\",\"short\"\n\
\"99\"\n";

#[test]
fn splits_by_record_type() {
    let dir = TempDir::new().unwrap();
    let adm = dir.path().join("pcs.adm");
    fs::write(&adm, ADM).unwrap();

    let out = run_import(&adm, dir.path(), run_at()).expect("import run");

    assert_eq!(
        fs::read_to_string(&out.customers).unwrap(),
        "False ; 0398 ; The Swedish Club ; Gullbergsstrandgata 6 ; Leveranskunder hotell,rest mm\n\
         True ; 0399 ; Acme ; Street 1 ; Desc\n"
    );
    // short rows become empty lines instead of failing the run
    assert_eq!(
        fs::read_to_string(&out.articles).unwrap(),
        "2 ; Soppa TA ; 60 ; 63 ; 75 ; False\n3 ; Tea ; 10 ; 11 ; 0 ; True\n\n"
    );
    assert_eq!(
        fs::read_to_string(&out.groups).unwrap(),
        "False ; 4 ; Huvudgrupp A\n"
    );
    assert_eq!(
        fs::read_to_string(&out.sub_groups).unwrap(),
        "True ; 4 ; 41 ; Varugrupp B\n"
    );
}

#[test]
fn output_lands_in_timestamped_imported_files_folder() {
    let dir = TempDir::new().unwrap();
    let adm = dir.path().join("pcs.adm");
    fs::write(&adm, ADM).unwrap();

    let out = run_import(&adm, dir.path(), run_at()).expect("import run");

    let folder = dir.path().join("Imported Files");
    assert!(folder.is_dir());
    assert_eq!(
        out.customers.file_name().unwrap().to_string_lossy(),
        "file_01_11.20250305-14-30-00.csv"
    );
    assert_eq!(fs::read_dir(&folder).unwrap().count(), 4);
}

#[test]
fn header_and_footer_records_are_ignored() {
    let dir = TempDir::new().unwrap();
    let adm = dir.path().join("pcs.adm");
    fs::write(&adm, "\"00\",\"X\"\n\"99\"\n").unwrap();

    let out = run_import(&adm, dir.path(), run_at()).expect("import run");

    assert_eq!(fs::read_to_string(&out.customers).unwrap(), "");
    assert_eq!(fs::read_to_string(&out.articles).unwrap(), "");
    assert_eq!(fs::read_to_string(&out.groups).unwrap(), "");
    assert_eq!(fs::read_to_string(&out.sub_groups).unwrap(), "");
}
