use crate::error::CliResult;
use crate::output::print_json;
use std::fs;
use std::io::Write;
use std::path::Path;
use surety_types::{Address, GenesisAirline, GenesisConfig, Wei};

/// Genesis with the owner as first airline, a local relay and two funded
/// partner airlines.
pub fn sample_genesis() -> GenesisConfig {
    let mut genesis = GenesisConfig::new(Address::from_label("airline-1"), "Airline 1");
    genesis.entropy_seed = 7;
    genesis.authorized_callers = vec![Address::from_label("relay")];
    genesis.airlines = (2..=3)
        .map(|n| GenesisAirline {
            address: Address::from_label(&format!("airline-{}", n)),
            name: format!("Airline {}", n),
            fund: Some(Wei::from_ether(10)),
        })
        .collect();
    genesis
}

pub fn execute(path: Option<&Path>, out: &mut dyn Write) -> CliResult<()> {
    let genesis = sample_genesis();
    match path {
        Some(path) => {
            let bytes = serde_json::to_vec_pretty(&genesis)?;
            fs::write(path, bytes)?;
            writeln!(out, "Wrote {}", path.display())?;
        }
        None => print_json(out, &genesis)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_valid() {
        let genesis = sample_genesis();
        genesis.validate().unwrap();
        let json = serde_json::to_string(&genesis).unwrap();
        let parsed: GenesisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genesis);
    }
}
