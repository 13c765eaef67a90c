use std::path::Path;

use posiolib::import::run_import;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: split an accounting file into the current directory.
    let path = std::env::args().nth(1).ok_or("usage: split_adm <file>")?;
    let out = run_import(
        Path::new(&path),
        Path::new("."),
        chrono::Local::now().naive_local(),
    )?;
    println!("wrote {}", out.customers.display());
    Ok(())
}
