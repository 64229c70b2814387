use crate::error::{CliError, CliResult};
use crate::output::{print_json, OutputFormat};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use surety_ledger::{JsonFileStore, SuretyLedger};
use surety_types::GenesisConfig;
use tracing::info;

/// Build the genesis ledger described by `genesis` and persist it at `state`.
pub fn execute(
    state: &Path,
    genesis: &Path,
    force: bool,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    if state.exists() && !force {
        return Err(CliError::StateExists(state.to_path_buf()));
    }

    // The new ledger is built beside the old one and only replaces it once
    // genesis has fully committed.
    let config = GenesisConfig::load(genesis)?;
    let staging = staging_path(state);
    if staging.exists() {
        fs::remove_file(&staging)?;
    }
    let built = SuretyLedger::builder(config)
        .store(JsonFileStore::new(&staging))
        .build();
    let ledger = match built {
        Ok(ledger) => ledger,
        Err(err) => {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
    };
    fs::rename(&staging, state)?;
    info!(state = %state.display(), height = ledger.height(), "Ledger initialized");

    let summary = ledger.fetch_data_contract_configuration();
    match format {
        OutputFormat::Json => print_json(out, &summary)?,
        OutputFormat::Table => {
            writeln!(out, "Initialized {}", state.display())?;
            writeln!(out, "  owner:              {}", ledger.owner())?;
            writeln!(out, "  registered airlines: {}", summary.registered_airline_count)?;
            writeln!(out, "  balance:            {} ether", ledger.balance().to_ether_string())?;
            writeln!(out, "  height:             {}", ledger.height())?;
        }
    }
    Ok(())
}

fn staging_path(state: &Path) -> PathBuf {
    let mut name = state.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".init");
    state.with_file_name(name)
}
