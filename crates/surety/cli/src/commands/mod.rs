pub mod apply;
pub mod init;
pub mod sample;
pub mod show;

use surety_ledger::{JsonFileStore, SeededIndexSource, SuretyLedger};
use std::path::Path;

use crate::error::CliResult;

/// Reopen the ledger persisted at `state`. Oracle indexes are drawn from the
/// genesis seed unless `seed` overrides it.
pub(crate) fn open_ledger(state: &Path, seed: Option<u64>) -> CliResult<SuretyLedger> {
    let store = JsonFileStore::new(state);
    let ledger = match seed {
        Some(seed) => SuretyLedger::resume(store, SeededIndexSource::new(seed))?,
        None => SuretyLedger::reopen(store)?,
    };
    Ok(ledger)
}
