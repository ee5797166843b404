//! `pix-payload`: turns a CSV of charges into static PIX "copia e cola" codes.
//!
//! ```bash
//! pix-payload requests.csv > payloads.csv
//! pix-payload requests.csv qr/ > payloads.csv
//! ```
//!
//! `requests.csv` has the header
//! `merchant_name,pix_key,amount,merchant_city,transaction_id`. Each valid row
//! becomes a `transaction_id,payload` line on stdout; rejected rows are
//! reported on stderr at warn level. With `qr_dir`, a scannable SVG is written
//! for every payload (`row-<n>.svg` for rows without a transaction id).
//!
//! Environment:
//!
//! - `PIX_MERCHANT_NAME`, `PIX_KEY`, `PIX_MERCHANT_CITY` fill blank columns
//! - `PIX_GENERATE_TRANSACTION_IDS=true` gives blank transaction ids a random
//!   25-character id instead of `***`
//! - `RUST_LOG` (`warn`, `debug`, ...) controls logging

use pix_payload::{PayloadBatch, PayloadDefaults, PixError, Result, SvgRenderer};
use std::env;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

/// Positional command line arguments.
struct Args {
    requests: PathBuf,
    qr_dir: Option<PathBuf>,
}

impl Args {
    fn from_env() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let requests = args.next().ok_or(PixError::MissingArgument)?;
        Ok(Args {
            requests: requests.into(),
            qr_dir: args.next().map(PathBuf::from),
        })
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::from_env()?;
    let requests = BufReader::new(File::open(&args.requests)?);

    let mut batch = PayloadBatch::new(PayloadDefaults::from_env()?);
    if let Some(dir) = args.qr_dir {
        fs::create_dir_all(&dir)?;
        batch = batch.with_qr_output(dir, SvgRenderer::new());
    }

    batch.process_csv(requests)?;
    batch.write_output(io::stdout().lock())
}
