//! # surety-types
//!
//! Shared vocabulary of the Flight Surety ledger:
//!
//! - **Identities**: [`Address`], the 20-byte identity of owners, airlines,
//!   oracles, passengers and relays
//! - **Money**: [`Wei`] amounts with checked arithmetic and the
//!   [`PayoutMultiplier`] applied to airline-fault claims
//! - **Flights**: fixed-width [`FlightCode`] keys and [`FlightStatus`] with
//!   the reporter protocol's wire codes
//! - **Lifecycles**: [`AirlineState`] and [`PolicyState`]
//! - **Notifications**: the append-only event vocabulary
//! - **Configuration**: [`LedgerConfig`] and [`GenesisConfig`]

#![deny(unsafe_code)]

pub mod address;
pub mod amount;
pub mod config;
pub mod flight;
pub mod lifecycle;
pub mod notification;

pub use address::{Address, AddressParseError, ADDRESS_LEN};
pub use amount::{AmountParseError, PayoutMultiplier, Wei, WEI_PER_ETHER};
pub use config::{
    BootstrapAirline, ConfigError, GenesisAirline, GenesisConfig, LedgerConfig,
    MIN_ORACLE_RESPONSE_THRESHOLD,
};
pub use flight::{FlightCode, FlightCodeError, FlightStatus, FLIGHT_CODE_LEN};
pub use lifecycle::{AirlineState, PolicyState};
pub use notification::{Notification, NotificationRecord};
