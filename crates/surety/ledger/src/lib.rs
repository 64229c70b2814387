//! Flight Surety ledger - airline admission, oracle consensus and
//! flight-delay insurance as one atomic state machine.
//!
//! # Components
//!
//! - [`AccessControl`]: owner and authorized relays
//! - [`OperationalGate`]: global pause switch
//! - [`AirlineRegistry`]: direct and vote-gated admission, funding
//! - [`FlightRegistry`]: flight catalog
//! - [`OracleConsensus`]: index sharding and threshold finalization
//! - [`InsuranceLedger`]: policies, escrow and payouts
//!
//! All of them live in one [`LedgerState`]. [`SuretyLedger`] stages every
//! mutating operation on a copy of that state and commits it, together
//! with its notifications, only when the operation succeeds.
//!
//! # Example
//!
//! ```
//! use surety_ledger::{CallContext, SuretyLedger};
//! use surety_types::{Address, FlightCode, GenesisConfig};
//!
//! let owner = Address::from_label("owner");
//! let mut ledger = SuretyLedger::from_genesis(GenesisConfig::new(owner, "Genesis Air")).unwrap();
//! let code = FlightCode::new("ND1309").unwrap();
//! ledger
//!     .register_flight(&CallContext::new(owner), code, 1_700_000_000, "YUL", "CDG")
//!     .unwrap();
//! assert_eq!(ledger.fetch_flights_codes(), vec![code]);
//! ```

#![deny(unsafe_code)]

pub mod access;
pub mod airlines;
pub mod dispatch;
pub mod entropy;
pub mod error;
pub mod flights;
pub mod gate;
pub mod insurance;
pub mod journal;
pub mod ledger;
pub mod oracles;
pub mod state;
pub mod store;

pub use access::AccessControl;
pub use airlines::{required_votes, Airline, AirlineRegistry, Registration, VoteOutcome, VoteTally};
pub use dispatch::{Envelope, Operation, Outcome, Receipt};
pub use entropy::{assign_indexes, DrawContext, IndexSource, ScriptedIndexSource, SeededIndexSource};
pub use error::{StoreError, SuretyError, SuretyResult};
pub use flights::{Flight, FlightInfo, FlightRegistry};
pub use gate::OperationalGate;
pub use insurance::{InsuranceLedger, Policy, PolicyInfo};
pub use journal::Journal;
pub use ledger::{CallContext, ContractConfiguration, LedgerBuilder, SuretyLedger};
pub use oracles::{Oracle, OracleConsensus, RequestKey, ResponseOutcome, StatusRequest};
pub use state::{Inflow, LedgerState, Treasury};
pub use store::{JsonFileStore, LedgerSnapshot, MemoryStore, StateStore};
