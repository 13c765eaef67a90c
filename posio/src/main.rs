use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use posiolib::export::run::run_export;
use posiolib::import::run_import;
use posiolib::tables::Tables;

#[derive(Parser, Debug)]
#[command(name = "posio", version, about = "Transcodes POS exports into accounting interchange files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcode one complete set of POS export files
    Export {
        /// Folder holding the POS export files
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Folder receiving the interchange files
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Split one fixed-format accounting file by record type
    Import {
        /// The accounting file (pcs.adm)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Folder for the derived files (defaults to the file's folder)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Poll a folder and run the pipelines as files arrive
    Watch {
        /// Folder to watch for POS exports and accounting files
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Folder receiving the interchange files
        #[arg(short = 'o', long = "output")]
        output: PathBuf,

        /// Poll interval in seconds
        #[arg(long = "interval", default_value_t = 5)]
        interval: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Command::Export { input, output } => {
            run_export(&input, &output, chrono::Local::now().naive_local())
                .context("export run failed")?;
            Ok(())
        }
        Command::Import { file, output } => {
            let target = match output {
                Some(dir) => dir,
                None => file
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
            };
            run_import(&file, &target, chrono::Local::now().naive_local())
                .context("import run failed")?;
            Ok(())
        }
        Command::Watch {
            input,
            output,
            interval,
        } => watch(&input, &output, Duration::from_secs(interval)),
    }
}

/// Polls the input folder. A complete set of export files triggers one
/// export run; an accounting file triggers the splitter. Consumed inputs
/// move to the "Old Files" archive, which also keeps a finished batch from
/// retriggering on the next poll.
fn watch(input: &Path, output: &Path, interval: Duration) -> anyhow::Result<()> {
    info!(input = %input.display(), output = %output.display(), "watching folder");
    loop {
        match Tables::required_present(input) {
            Ok(true) => {
                let consumed = Tables::recognised_paths(input).unwrap_or_default();
                match run_export(input, output, chrono::Local::now().naive_local()) {
                    Ok(()) => {
                        if let Err(e) = archive(input, &consumed) {
                            error!(error = %e, "failed to archive consumed input files");
                        }
                    }
                    Err(e) => error!(error = %e, "export run failed"),
                }
            }
            Ok(false) => {}
            Err(e) => error!(error = %e, "cannot inspect watch folder"),
        }

        match accounting_file(input) {
            Ok(Some(adm)) => {
                match run_import(&adm, input, chrono::Local::now().naive_local()) {
                    Ok(_) => {
                        if let Err(e) = archive(input, std::slice::from_ref(&adm)) {
                            error!(error = %e, "failed to archive accounting file");
                        }
                    }
                    Err(e) => error!(error = %e, "import run failed"),
                }
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "cannot inspect watch folder"),
        }

        std::thread::sleep(interval);
    }
}

fn accounting_file(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_file() && name.to_string_lossy().ends_with(".adm") {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Moves consumed files into "<input>/Old Files" with a timestamp and
/// "_old" suffix inserted before the extension.
fn archive(input: &Path, files: &[PathBuf]) -> std::io::Result<()> {
    let old = input.join("Old Files");
    std::fs::create_dir_all(&old)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H-%M-%S").to_string();
    for path in files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let target = old.join(format!("{stem}_{stamp}_old{ext}"));
        std::fs::rename(path, &target)?;
        info!(from = %path.display(), to = %target.display(), "archived input file");
    }
    Ok(())
}
