use serde::{Deserialize, Serialize};
use std::fmt;

/// Airline admission state.
///
/// Pending airlines wait on a multiparty vote, Registered airlines may
/// fund, and only Funded airlines operate (sponsor, vote, register flights).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirlineState {
    Pending,
    Registered,
    Funded,
}

impl AirlineState {
    pub fn code(&self) -> u8 {
        match self {
            AirlineState::Pending => 0,
            AirlineState::Registered => 1,
            AirlineState::Funded => 2,
        }
    }

    /// Counts toward the registered-airline total.
    pub fn is_admitted(&self) -> bool {
        matches!(self, AirlineState::Registered | AirlineState::Funded)
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, AirlineState::Funded)
    }
}

impl fmt::Display for AirlineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirlineState::Pending => f.write_str("pending"),
            AirlineState::Registered => f.write_str("registered"),
            AirlineState::Funded => f.write_str("funded"),
        }
    }
}

/// Insurance policy state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyState {
    Active,
    Payable,
    Withdrawn,
    Expired,
}

impl PolicyState {
    pub fn code(&self) -> u8 {
        match self {
            PolicyState::Active => 0,
            PolicyState::Payable => 1,
            PolicyState::Withdrawn => 2,
            PolicyState::Expired => 3,
        }
    }

    /// Active and Payable policies still carry a liability.
    pub fn is_open(&self) -> bool {
        matches!(self, PolicyState::Active | PolicyState::Payable)
    }
}

impl fmt::Display for PolicyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyState::Active => f.write_str("active"),
            PolicyState::Payable => f.write_str("payable"),
            PolicyState::Withdrawn => f.write_str("withdrawn"),
            PolicyState::Expired => f.write_str("expired"),
        }
    }
}
