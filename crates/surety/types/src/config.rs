use crate::address::Address;
use crate::amount::{PayoutMultiplier, Wei};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Smallest oracle response threshold the ledger accepts.
pub const MIN_ORACLE_RESPONSE_THRESHOLD: u32 = 3;

/// Tunable ledger parameters.
///
/// Every field has a default so a genesis file only needs to list the
/// values it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Registered-airline count at which admission switches to voting.
    pub consensus_threshold: u32,
    /// Minimum payment for `submit_fund_airline`.
    pub min_fund: Wei,
    /// Minimum payment for `register_oracle`.
    pub oracle_registration_fee: Wei,
    /// Matching reports needed to finalize a status request.
    pub oracle_response_threshold: u32,
    /// Oracle indexes are drawn from `0..oracle_index_space`.
    pub oracle_index_space: u8,
    pub min_premium: Wei,
    pub max_premium: Wei,
    pub payout: PayoutMultiplier,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            consensus_threshold: 4,
            min_fund: Wei::from_ether(1),
            oracle_registration_fee: Wei::from_ether(1),
            oracle_response_threshold: MIN_ORACLE_RESPONSE_THRESHOLD,
            oracle_index_space: 10,
            min_premium: Wei(1),
            max_premium: Wei::from_ether(1),
            payout: PayoutMultiplier::default(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consensus_threshold == 0 {
            return Err(ConfigError::invalid("consensus_threshold must be at least 1"));
        }
        if self.min_fund.is_zero() {
            return Err(ConfigError::invalid("min_fund must be positive"));
        }
        if self.oracle_response_threshold < MIN_ORACLE_RESPONSE_THRESHOLD {
            return Err(ConfigError::invalid(format!(
                "oracle_response_threshold must be at least {}",
                MIN_ORACLE_RESPONSE_THRESHOLD
            )));
        }
        if self.oracle_index_space == 0 {
            return Err(ConfigError::invalid("oracle_index_space must be at least 1"));
        }
        if self.min_premium.is_zero() {
            return Err(ConfigError::invalid("min_premium must be positive"));
        }
        if self.max_premium < self.min_premium {
            return Err(ConfigError::invalid(
                "max_premium must not be below min_premium",
            ));
        }
        if self.payout.denominator == 0 {
            return Err(ConfigError::invalid("payout denominator must be positive"));
        }
        if self.payout.numerator < self.payout.denominator {
            return Err(ConfigError::invalid(
                "payout multiplier must be at least 1",
            ));
        }
        Ok(())
    }
}

/// The airline that exists from genesis and needs no funding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapAirline {
    pub address: Address,
    pub name: String,
}

/// An airline registered by the bootstrap airline while building genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAirline {
    pub address: Address,
    pub name: String,
    /// Funding submitted right after registration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund: Option<Wei>,
}

/// Everything needed to build a ledger from nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub owner: Address,
    pub bootstrap_airline: BootstrapAirline,
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Seed for the oracle index source.
    #[serde(default)]
    pub entropy_seed: u64,
    /// Relays allowed to submit operation envelopes.
    #[serde(default)]
    pub authorized_callers: Vec<Address>,
    #[serde(default)]
    pub airlines: Vec<GenesisAirline>,
}

impl GenesisConfig {
    /// Minimal genesis where the owner is also the bootstrap airline.
    pub fn new(owner: Address, bootstrap_name: impl Into<String>) -> Self {
        Self {
            owner,
            bootstrap_airline: BootstrapAirline {
                address: owner,
                name: bootstrap_name.into(),
            },
            ledger: LedgerConfig::default(),
            entropy_seed: 0,
            authorized_callers: Vec::new(),
            airlines: Vec::new(),
        }
    }

    /// Load a JSON genesis file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path.as_ref())?;
        let genesis: GenesisConfig = serde_json::from_slice(&bytes)?;
        genesis.validate()?;
        Ok(genesis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger.validate()?;
        if self.owner.is_zero() {
            return Err(ConfigError::invalid("owner must not be the null address"));
        }
        if self.bootstrap_airline.address.is_zero() {
            return Err(ConfigError::invalid(
                "bootstrap airline must not be the null address",
            ));
        }
        if self.bootstrap_airline.name.trim().is_empty() {
            return Err(ConfigError::invalid("bootstrap airline needs a name"));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.consensus_threshold, 4);
        assert_eq!(config.oracle_response_threshold, 3);
        assert_eq!(config.oracle_index_space, 10);
    }

    #[test]
    fn rejects_low_response_threshold() {
        let config = LedgerConfig {
            oracle_response_threshold: 2,
            ..LedgerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_premium_bounds() {
        let config = LedgerConfig {
            min_premium: Wei::from_ether(2),
            ..LedgerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_premium"));
    }

    #[test]
    fn rejects_payout_below_one() {
        let config = LedgerConfig {
            payout: PayoutMultiplier::new(1, 2),
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let owner = Address::from_label("owner");
        let json = serde_json::json!({
            "owner": owner,
            "bootstrap_airline": { "address": owner, "name": "AdminAirline" },
            "ledger": { "consensus_threshold": 10 }
        });
        let genesis: GenesisConfig = serde_json::from_value(json).unwrap();
        assert_eq!(genesis.ledger.consensus_threshold, 10);
        assert_eq!(genesis.ledger.min_fund, Wei::from_ether(1));
        assert!(genesis.airlines.is_empty());
        assert!(genesis.validate().is_ok());
    }

    #[test]
    fn genesis_rejects_null_owner() {
        let genesis = GenesisConfig::new(Address::ZERO, "AdminAirline");
        assert!(genesis.validate().is_err());
    }
}
