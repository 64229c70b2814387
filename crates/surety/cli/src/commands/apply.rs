use super::open_ledger;
use crate::error::{CliError, CliResult};
use crate::output::print_json_line;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use surety_ledger::Envelope;
use tracing::{info, warn};

/// Line written for an envelope that was rejected under `--keep-going`.
#[derive(Debug, Serialize)]
struct Rejection {
    index: usize,
    op: &'static str,
    error: String,
}

/// Replay a JSON array of envelopes against the persisted ledger.
///
/// Every receipt is printed as one JSON line as it commits. Without
/// `keep_going` the first rejected envelope stops the run; earlier envelopes
/// stay committed.
pub fn execute(
    state: &Path,
    envelopes: &Path,
    seed: Option<u64>,
    keep_going: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let bytes = fs::read(envelopes)?;
    let envelopes: Vec<Envelope> = serde_json::from_slice(&bytes)?;
    let mut ledger = open_ledger(state, seed)?;
    info!(count = envelopes.len(), height = ledger.height(), "Applying envelopes");

    let mut rejected = 0usize;
    for (index, envelope) in envelopes.into_iter().enumerate() {
        let op = envelope.op.name();
        match ledger.apply(envelope) {
            Ok(receipt) => print_json_line(out, &receipt)?,
            Err(source) if keep_going => {
                warn!(index, op, error = %source, "Envelope rejected");
                rejected += 1;
                print_json_line(
                    out,
                    &Rejection {
                        index,
                        op,
                        error: source.to_string(),
                    },
                )?;
            }
            Err(source) => return Err(CliError::Envelope { index, source }),
        }
    }

    info!(height = ledger.height(), rejected, "Envelopes applied");
    Ok(())
}
