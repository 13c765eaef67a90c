//! posiolib — transcoding of point-of-sale exports into the fixed
//! accounting interchange format (records 00–99), and splitting of the
//! accounting master file back into per-type CSV files.

pub mod error;
pub mod import;
pub mod model;
pub mod normalize;
pub mod series;
pub mod tables;

pub mod export {
    pub mod files;
    pub mod records;
    pub mod run;
}
