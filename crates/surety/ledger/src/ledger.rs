//! The ledger: atomic transaction boundary and typed operation surface.
//!
//! Every mutating operation is staged on a clone of [`LedgerState`] with its
//! own [`Journal`]. On success the staged state replaces the committed one,
//! the height advances, the journal is appended to the notification log and
//! the snapshot is handed to the store. On error the staged copy is dropped.

use crate::airlines::{Airline, Registration, VoteOutcome};
use crate::entropy::{assign_indexes, DrawContext, IndexSource, SeededIndexSource};
use crate::error::{SuretyError, SuretyResult};
use crate::flights::{Flight, FlightInfo};
use crate::insurance::PolicyInfo;
use crate::journal::Journal;
use crate::oracles::{RequestKey, ResponseOutcome};
use crate::state::{Inflow, LedgerState};
use crate::store::{LedgerSnapshot, MemoryStore, StateStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use surety_types::{
    Address, FlightCode, FlightStatus, GenesisConfig, Notification, NotificationRecord, Wei,
};
use tracing::{debug, info};

/// Who is calling and how much value the call carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    #[serde(default)]
    pub value: Wei,
}

impl CallContext {
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: Wei::ZERO,
        }
    }

    pub fn paying(caller: Address, value: Wei) -> Self {
        Self { caller, value }
    }

    fn non_payable(&self) -> SuretyResult<()> {
        if self.value.is_zero() {
            Ok(())
        } else {
            Err(SuretyError::ExcessPayment {
                limit: Wei::ZERO,
                paid: self.value,
            })
        }
    }
}

/// Ledger-wide settings snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfiguration {
    pub operational: bool,
    pub consensus_threshold: u32,
    pub min_fund: Wei,
    pub registered_airline_count: u32,
}

/// A transaction in flight.
struct Stage<'a> {
    state: LedgerState,
    journal: Journal,
    height: u64,
    indexes: &'a mut dyn IndexSource,
}

impl Stage<'_> {
    fn draw_context(&self, ctx: &CallContext) -> DrawContext {
        DrawContext {
            caller: ctx.caller,
            value: ctx.value,
            height: self.height,
        }
    }
}

pub struct LedgerBuilder {
    genesis: GenesisConfig,
    index_source: Option<Box<dyn IndexSource>>,
    store: Option<Box<dyn StateStore>>,
}

impl LedgerBuilder {
    pub fn index_source(mut self, source: impl IndexSource + 'static) -> Self {
        self.index_source = Some(Box::new(source));
        self
    }

    pub fn store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Resume from the store's snapshot if it has one, otherwise build the
    /// genesis state.
    pub fn build(self) -> SuretyResult<SuretyLedger> {
        let LedgerBuilder {
            genesis,
            index_source,
            store,
        } = self;
        let store = store.unwrap_or_else(|| Box::new(MemoryStore::new()));

        if let Some(snapshot) = store.load()? {
            let index_source = index_source
                .unwrap_or_else(|| Box::new(SeededIndexSource::new(snapshot.entropy_seed)));
            return Ok(SuretyLedger::restore(snapshot, index_source, store));
        }

        genesis.validate()?;
        let index_source = index_source
            .unwrap_or_else(|| Box::new(SeededIndexSource::new(genesis.entropy_seed)));
        let mut ledger = SuretyLedger {
            state: LedgerState::new(genesis.owner, genesis.ledger.clone()),
            height: 0,
            log: Vec::new(),
            entropy_seed: genesis.entropy_seed,
            index_source,
            store,
        };
        ledger.apply_genesis(&genesis)?;
        Ok(ledger)
    }
}

/// Flight-delay insurance ledger.
pub struct SuretyLedger {
    state: LedgerState,
    height: u64,
    log: Vec<NotificationRecord>,
    entropy_seed: u64,
    index_source: Box<dyn IndexSource>,
    store: Box<dyn StateStore>,
}

impl std::fmt::Debug for SuretyLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuretyLedger")
            .field("height", &self.height)
            .field("owner", &self.state.access.owner())
            .field("operational", &self.state.gate.is_operational())
            .field("notifications", &self.log.len())
            .finish()
    }
}

impl SuretyLedger {
    pub fn builder(genesis: GenesisConfig) -> LedgerBuilder {
        LedgerBuilder {
            genesis,
            index_source: None,
            store: None,
        }
    }

    /// In-memory ledger with the genesis seed driving oracle indexes.
    pub fn from_genesis(genesis: GenesisConfig) -> SuretyResult<Self> {
        Self::builder(genesis).build()
    }

    /// Reopen a ledger from an existing snapshot, drawing oracle indexes from
    /// `index_source`. Fails with `NotFound` when the store is empty.
    pub fn resume(
        store: impl StateStore + 'static,
        index_source: impl IndexSource + 'static,
    ) -> SuretyResult<Self> {
        let snapshot = store
            .load()?
            .ok_or_else(|| SuretyError::not_found("no ledger snapshot in store"))?;
        Ok(Self::restore(snapshot, Box::new(index_source), Box::new(store)))
    }

    /// Reopen a ledger from an existing snapshot, reseeding oracle indexes
    /// from the seed recorded at genesis.
    pub fn reopen(store: impl StateStore + 'static) -> SuretyResult<Self> {
        let snapshot = store
            .load()?
            .ok_or_else(|| SuretyError::not_found("no ledger snapshot in store"))?;
        let index_source = Box::new(SeededIndexSource::new(snapshot.entropy_seed));
        Ok(Self::restore(snapshot, index_source, Box::new(store)))
    }

    fn restore(
        snapshot: LedgerSnapshot,
        index_source: Box<dyn IndexSource>,
        store: Box<dyn StateStore>,
    ) -> Self {
        info!(
            height = snapshot.height,
            seed = snapshot.entropy_seed,
            "Resuming ledger from snapshot"
        );
        Self {
            state: snapshot.state,
            height: snapshot.height,
            log: snapshot.notifications,
            entropy_seed: snapshot.entropy_seed,
            index_source,
            store,
        }
    }

    fn apply_genesis(&mut self, genesis: &GenesisConfig) -> SuretyResult<()> {
        let bootstrap = genesis.bootstrap_airline.clone();
        self.transact("genesis", false, |stage| {
            stage
                .state
                .airlines
                .bootstrap(bootstrap.address, &bootstrap.name, &mut stage.journal)
        })?;

        let owner = CallContext::new(genesis.owner);
        for relay in &genesis.authorized_callers {
            self.authorize_caller(&owner, *relay)?;
        }

        let sponsor = CallContext::new(genesis.bootstrap_airline.address);
        for airline in &genesis.airlines {
            self.register_airline(&sponsor, airline.address, &airline.name)?;
            if let Some(fund) = airline.fund {
                self.submit_fund_airline(&CallContext::paying(airline.address, fund))?;
            }
        }
        info!(
            owner = %genesis.owner,
            airlines = self.state.airlines.len(),
            height = self.height,
            "Genesis applied"
        );
        Ok(())
    }

    fn transact<T>(
        &mut self,
        op: &'static str,
        gated: bool,
        f: impl FnOnce(&mut Stage<'_>) -> SuretyResult<T>,
    ) -> SuretyResult<T> {
        if gated {
            self.state.gate.require_operational()?;
        }
        let mut stage = Stage {
            state: self.state.clone(),
            journal: Journal::new(),
            height: self.height + 1,
            indexes: self.index_source.as_mut(),
        };
        debug!(op, height = stage.height, "Staging operation");
        let output = match f(&mut stage) {
            Ok(output) => output,
            Err(err) => {
                debug!(op, error = %err, "Operation rejected");
                return Err(err);
            }
        };
        let Stage {
            state,
            journal,
            height,
            ..
        } = stage;
        self.commit(state, journal, height)?;
        Ok(output)
    }

    fn commit(&mut self, state: LedgerState, journal: Journal, height: u64) -> SuretyResult<()> {
        let previous_len = self.log.len();
        let mut notifications = std::mem::take(&mut self.log);
        notifications.extend(
            journal
                .into_events()
                .into_iter()
                .map(|notification| NotificationRecord {
                    height,
                    notification,
                }),
        );
        let snapshot = LedgerSnapshot {
            height,
            state,
            notifications,
            entropy_seed: self.entropy_seed,
            saved_at: Utc::now(),
        };
        match self.store.save(&snapshot) {
            Ok(()) => {
                self.height = snapshot.height;
                self.state = snapshot.state;
                self.log = snapshot.notifications;
                Ok(())
            }
            Err(err) => {
                let mut notifications = snapshot.notifications;
                notifications.truncate(previous_len);
                self.log = notifications;
                Err(err.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Access control and operational gate
    // ------------------------------------------------------------------

    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Address) -> SuretyResult<()> {
        ctx.non_payable()?;
        self.transact("transfer_ownership", false, |stage| {
            stage
                .state
                .access
                .transfer_ownership(&ctx.caller, new_owner, &mut stage.journal)
        })
    }

    /// Give up ownership.
    ///
    /// IRREVERSIBLE: afterwards nobody can pause the ledger, change its
    /// parameters, authorize relays or transfer ownership.
    pub fn renounce_ownership(&mut self, ctx: &CallContext) -> SuretyResult<()> {
        ctx.non_payable()?;
        self.transact("renounce_ownership", false, |stage| {
            stage
                .state
                .access
                .renounce_ownership(&ctx.caller, &mut stage.journal)
        })
    }

    pub fn authorize_caller(&mut self, ctx: &CallContext, relay: Address) -> SuretyResult<bool> {
        ctx.non_payable()?;
        self.transact("authorize_caller", false, |stage| {
            stage
                .state
                .access
                .authorize_caller(&ctx.caller, relay, &mut stage.journal)
        })
    }

    pub fn deauthorize_caller(&mut self, ctx: &CallContext, relay: Address) -> SuretyResult<bool> {
        ctx.non_payable()?;
        self.transact("deauthorize_caller", false, |stage| {
            stage
                .state
                .access
                .deauthorize_caller(&ctx.caller, relay, &mut stage.journal)
        })
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.state.access.is_owner(address)
    }

    pub fn owner(&self) -> Address {
        self.state.access.owner()
    }

    pub fn is_authorized_caller(&self, address: &Address) -> bool {
        self.state.access.is_authorized(address)
    }

    pub fn set_operational(&mut self, ctx: &CallContext, operational: bool) -> SuretyResult<()> {
        ctx.non_payable()?;
        self.transact("set_operational", false, |stage| {
            stage.state.access.require_owner(&ctx.caller)?;
            stage
                .state
                .gate
                .set_operational(operational, &mut stage.journal)
        })
    }

    pub fn is_operational(&self) -> bool {
        self.state.gate.is_operational()
    }

    pub fn set_consensus_threshold(&mut self, ctx: &CallContext, value: u32) -> SuretyResult<()> {
        ctx.non_payable()?;
        self.transact("set_consensus_threshold", false, |stage| {
            stage.state.access.require_owner(&ctx.caller)?;
            if value == 0 {
                return Err(SuretyError::invalid("consensus threshold must be at least 1"));
            }
            stage.state.config.consensus_threshold = value;
            info!(value, "Consensus threshold updated");
            stage
                .journal
                .emit(Notification::ConsensusThresholdUpdated { value });
            Ok(())
        })
    }

    pub fn set_min_fund(&mut self, ctx: &CallContext, value: Wei) -> SuretyResult<()> {
        ctx.non_payable()?;
        self.transact("set_min_fund", false, |stage| {
            stage.state.access.require_owner(&ctx.caller)?;
            if value.is_zero() {
                return Err(SuretyError::invalid("minimum fund must be positive"));
            }
            stage.state.config.min_fund = value;
            info!(value = %value, "Minimum fund updated");
            stage.journal.emit(Notification::MinFundUpdated { value });
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Airlines
    // ------------------------------------------------------------------

    pub fn register_airline(
        &mut self,
        ctx: &CallContext,
        candidate: Address,
        name: &str,
    ) -> SuretyResult<Registration> {
        ctx.non_payable()?;
        self.transact("register_airline", true, |stage| {
            let threshold = stage.state.config.consensus_threshold;
            stage.state.airlines.register(
                &ctx.caller,
                candidate,
                name,
                threshold,
                &mut stage.journal,
            )
        })
    }

    /// Pay the participation fund. Returns the amount credited.
    pub fn submit_fund_airline(&mut self, ctx: &CallContext) -> SuretyResult<Wei> {
        self.transact("submit_fund_airline", true, |stage| {
            let min_fund = stage.state.config.min_fund;
            let amount = stage.state.airlines.submit_fund(
                &ctx.caller,
                ctx.value,
                min_fund,
                &mut stage.journal,
            )?;
            stage.state.treasury.credit(Inflow::AirlineFund, amount)?;
            Ok(amount)
        })
    }

    pub fn multiparty_consensus_vote(
        &mut self,
        ctx: &CallContext,
        candidate: Address,
        approve: bool,
    ) -> SuretyResult<VoteOutcome> {
        ctx.non_payable()?;
        self.transact("multiparty_consensus_vote", true, |stage| {
            stage
                .state
                .airlines
                .vote(&ctx.caller, &candidate, approve, &mut stage.journal)
        })
    }

    pub fn airline(&self, address: &Address) -> Option<&Airline> {
        self.state.airlines.get(address)
    }

    pub fn airlines(&self) -> impl Iterator<Item = &Airline> {
        self.state.airlines.iter()
    }

    // ------------------------------------------------------------------
    // Flights
    // ------------------------------------------------------------------

    pub fn register_flight(
        &mut self,
        ctx: &CallContext,
        code: FlightCode,
        timestamp: u64,
        departure: &str,
        arrival: &str,
    ) -> SuretyResult<FlightInfo> {
        ctx.non_payable()?;
        self.transact("register_flight", true, |stage| {
            let airline_name = stage.state.airlines.require_funded(&ctx.caller)?.name.clone();
            let flight = stage.state.flights.register(
                ctx.caller,
                code,
                timestamp,
                departure,
                arrival,
                &mut stage.journal,
            )?;
            Ok(FlightInfo::project(flight, airline_name))
        })
    }

    pub fn fetch_flights_codes(&self) -> Vec<FlightCode> {
        self.state.flights.codes()
    }

    pub fn fetch_flight_info_by_code(&self, code: &FlightCode) -> SuretyResult<FlightInfo> {
        let flight = self.state.flights.require(code)?;
        let airline_name = self
            .state
            .airlines
            .get(&flight.airline)
            .map(|airline| airline.name.clone())
            .unwrap_or_default();
        Ok(FlightInfo::project(flight, airline_name))
    }

    pub fn flight(&self, code: &FlightCode) -> Option<&Flight> {
        self.state.flights.get(code)
    }

    // ------------------------------------------------------------------
    // Oracles
    // ------------------------------------------------------------------

    /// Register the caller as an oracle and return its three indexes.
    pub fn register_oracle(&mut self, ctx: &CallContext) -> SuretyResult<[u8; 3]> {
        self.transact("register_oracle", true, |stage| {
            let fee = stage.state.config.oracle_registration_fee;
            if ctx.value < fee {
                return Err(SuretyError::InsufficientPayment {
                    required: fee,
                    paid: ctx.value,
                });
            }
            if stage.state.oracles.is_registered(&ctx.caller) {
                return Err(SuretyError::DuplicateOracle(ctx.caller));
            }
            let draw = stage.draw_context(ctx);
            let space = stage.state.config.oracle_index_space;
            let indexes = assign_indexes(&mut *stage.indexes, &draw, space);
            stage.state.oracles.register(
                ctx.caller,
                ctx.value,
                fee,
                indexes,
                &mut stage.journal,
            )?;
            stage.state.treasury.credit(Inflow::OracleFee, ctx.value)?;
            Ok(indexes)
        })
    }

    pub fn get_my_indexes(&self, ctx: &CallContext) -> SuretyResult<[u8; 3]> {
        self.state.oracles.indexes_of(&ctx.caller)
    }

    /// Ask the oracles for a flight's status. Returns the index the request
    /// was opened under. Any caller may ask about any flight, registered or not.
    pub fn fetch_flight_status(
        &mut self,
        ctx: &CallContext,
        airline: Address,
        code: FlightCode,
        timestamp: u64,
    ) -> SuretyResult<u8> {
        ctx.non_payable()?;
        self.transact("fetch_flight_status", true, |stage| {
            let draw = stage.draw_context(ctx);
            let space = stage.state.config.oracle_index_space;
            let index = stage.indexes.draw(&draw, space);
            let key = RequestKey {
                index,
                airline,
                code,
                timestamp,
            };
            let height = stage.height;
            stage
                .state
                .oracles
                .open_request(key, ctx.caller, height, &mut stage.journal);
            Ok(index)
        })
    }

    pub fn submit_oracle_response(
        &mut self,
        ctx: &CallContext,
        index: u8,
        airline: Address,
        code: FlightCode,
        timestamp: u64,
        status: FlightStatus,
    ) -> SuretyResult<ResponseOutcome> {
        ctx.non_payable()?;
        self.transact("submit_oracle_response", true, |stage| {
            let key = RequestKey {
                index,
                airline,
                code,
                timestamp,
            };
            let threshold = stage.state.config.oracle_response_threshold;
            let outcome = stage.state.oracles.submit(
                &ctx.caller,
                key,
                status,
                threshold,
                &mut stage.journal,
            )?;
            if let ResponseOutcome::Finalized { status } = outcome {
                // Only a report naming the registered operator settles the
                // flight and its policies.
                let operated = stage
                    .state
                    .flights
                    .get(&code)
                    .is_some_and(|flight| flight.airline == airline);
                if operated {
                    let effective = stage.state.flights.resolve(&code, status)?;
                    let payout = stage.state.config.payout;
                    stage
                        .state
                        .insurance
                        .resolve(&code, effective, &payout, &mut stage.journal)?;
                }
            }
            Ok(outcome)
        })
    }

    // ------------------------------------------------------------------
    // Insurance
    // ------------------------------------------------------------------

    pub fn buy_insurance(&mut self, ctx: &CallContext, code: FlightCode) -> SuretyResult<PolicyInfo> {
        self.transact("buy_insurance", true, |stage| {
            let flight = stage.state.flights.require(&code)?;
            let info = stage.state.insurance.buy(
                ctx.caller,
                flight,
                ctx.value,
                &stage.state.config,
                stage.height,
                &mut stage.journal,
            )?;
            stage.state.treasury.credit(Inflow::Premium, ctx.value)?;
            Ok(info)
        })
    }

    /// Withdraw the credit of a payable policy. Returns the amount paid out.
    pub fn passenger_withdraw(&mut self, ctx: &CallContext, code: FlightCode) -> SuretyResult<Wei> {
        ctx.non_payable()?;
        self.transact("passenger_withdraw", true, |stage| {
            let amount = stage
                .state
                .insurance
                .withdraw(&ctx.caller, &code, &mut stage.journal)?;
            stage.state.treasury.pay_out(amount)?;
            Ok(amount)
        })
    }

    pub fn fetch_active_insurances_keys_for_passenger(
        &self,
        ctx: &CallContext,
    ) -> SuretyResult<Vec<FlightCode>> {
        self.state.insurance.keys_for(&ctx.caller)
    }

    pub fn fetch_insurances_info_for_passenger_and_code(
        &self,
        ctx: &CallContext,
        code: &FlightCode,
    ) -> SuretyResult<PolicyInfo> {
        self.state.insurance.info(&ctx.caller, code)
    }

    // ------------------------------------------------------------------
    // Ledger-wide
    // ------------------------------------------------------------------

    pub fn fetch_data_contract_configuration(&self) -> ContractConfiguration {
        ContractConfiguration {
            operational: self.state.gate.is_operational(),
            consensus_threshold: self.state.config.consensus_threshold,
            min_fund: self.state.config.min_fund,
            registered_airline_count: self.state.airlines.registered_count(),
        }
    }

    pub fn balance(&self) -> Wei {
        self.state.treasury.balance
    }

    pub fn notifications(&self) -> &[NotificationRecord] {
        &self.log
    }

    /// Notifications committed after `height`.
    pub fn notifications_since(&self, height: u64) -> &[NotificationRecord] {
        let start = self.log.partition_point(|record| record.height <= height);
        &self.log[start..]
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Number of committed transactions, genesis included.
    /// Seed recorded at genesis for oracle index draws.
    pub fn entropy_seed(&self) -> u64 {
        self.entropy_seed
    }

    pub fn height(&self) -> u64 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::ScriptedIndexSource;
    use surety_types::{AirlineState, PolicyState};

    fn owner() -> Address {
        Address::from_label("airline-1")
    }

    fn ledger() -> SuretyLedger {
        SuretyLedger::builder(GenesisConfig::new(owner(), "Genesis Air"))
            .index_source(ScriptedIndexSource::constant(2))
            .build()
            .unwrap()
    }

    fn code() -> FlightCode {
        FlightCode::new("ND1309").unwrap()
    }

    #[test]
    fn genesis_installs_funded_owner_airline() {
        let ledger = ledger();
        assert_eq!(ledger.height(), 1);
        assert!(ledger.is_owner(&owner()));
        let airline = ledger.airline(&owner()).unwrap();
        assert_eq!(airline.state, AirlineState::Funded);
        assert_eq!(ledger.fetch_data_contract_configuration().registered_airline_count, 1);
        assert_eq!(ledger.notifications().len(), 1);
        assert_eq!(ledger.notifications()[0].height, 1);
    }

    #[test]
    fn failed_operation_leaves_no_trace() {
        let mut ledger = ledger();
        let before = ledger.state().clone();
        let stranger = CallContext::new(Address::from_label("stranger"));
        assert!(ledger
            .register_airline(&stranger, Address::from_label("x"), "X")
            .is_err());
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.height(), 1);
        assert_eq!(ledger.notifications().len(), 1);
    }

    #[test]
    fn value_on_non_payable_call_is_rejected() {
        let mut ledger = ledger();
        let err = ledger
            .register_airline(
                &CallContext::paying(owner(), Wei(1)),
                Address::from_label("airline-2"),
                "Second",
            )
            .unwrap_err();
        assert!(matches!(err, SuretyError::ExcessPayment { .. }));
    }

    #[test]
    fn halted_ledger_rejects_business_but_not_admin() {
        let mut ledger = ledger();
        let admin = CallContext::new(owner());
        ledger.set_operational(&admin, false).unwrap();
        assert!(matches!(
            ledger.register_flight(&admin, code(), 1, "YUL", "CDG"),
            Err(SuretyError::SystemHalted)
        ));
        ledger.set_consensus_threshold(&admin, 2).unwrap();
        assert!(ledger.fetch_flights_codes().is_empty());
        ledger.set_operational(&admin, true).unwrap();
        ledger
            .register_flight(&admin, code(), 1, "YUL", "CDG")
            .unwrap();
    }

    #[test]
    fn flight_info_carries_airline_name() {
        let mut ledger = ledger();
        let airline = CallContext::new(owner());
        let info = ledger
            .register_flight(&airline, code(), 1_700_000_000, "YUL", "CDG")
            .unwrap();
        assert_eq!(info.airline_name, "Genesis Air");
        assert_eq!(ledger.fetch_flight_info_by_code(&code()).unwrap(), info);
    }

    #[test]
    fn status_requests_do_not_need_a_registered_flight() {
        let mut ledger = ledger();
        let passenger = CallContext::new(Address::from_label("passenger"));
        let other = Address::from_label("other");
        assert_eq!(
            ledger.fetch_flight_status(&passenger, other, code(), 1).unwrap(),
            2
        );
        let key = RequestKey {
            index: 2,
            airline: other,
            code: code(),
            timestamp: 1,
        };
        assert!(ledger.state().oracles.request(&key).is_some());
        assert_eq!(
            ledger.notifications().last().map(|record| record.notification.name()),
            Some("status_requested")
        );
    }

    #[test]
    fn full_claim_cycle() {
        let mut ledger = ledger();
        let airline = CallContext::new(owner());
        ledger
            .register_flight(&airline, code(), 1, "YUL", "CDG")
            .unwrap();

        let oracles: Vec<CallContext> = (0..3)
            .map(|i| CallContext::paying(Address::from_label(&format!("oracle-{}", i)), Wei::from_ether(1)))
            .collect();
        for oracle in &oracles {
            assert_eq!(ledger.register_oracle(oracle).unwrap(), [2, 2, 2]);
        }

        let passenger = Address::from_label("passenger");
        let premium = Wei::parse_ether("0.0001").unwrap();
        ledger
            .buy_insurance(&CallContext::paying(passenger, premium), code())
            .unwrap();
        let index = ledger
            .fetch_flight_status(&CallContext::new(passenger), owner(), code(), 1)
            .unwrap();

        for (i, oracle) in oracles.iter().enumerate() {
            let outcome = ledger
                .submit_oracle_response(
                    &CallContext::new(oracle.caller),
                    index,
                    owner(),
                    code(),
                    1,
                    FlightStatus::LateAirline,
                )
                .unwrap();
            if i < 2 {
                assert_eq!(outcome, ResponseOutcome::Recorded { reports: i as u32 + 1 });
            } else {
                assert_eq!(outcome, ResponseOutcome::Finalized { status: FlightStatus::LateAirline });
            }
        }

        let ctx = CallContext::new(passenger);
        let info = ledger
            .fetch_insurances_info_for_passenger_and_code(&ctx, &code())
            .unwrap();
        assert_eq!(info.state, PolicyState::Payable);
        let before = ledger.balance();
        let paid = ledger.passenger_withdraw(&ctx, code()).unwrap();
        assert_eq!(paid, Wei::parse_ether("0.00015").unwrap());
        assert_eq!(before.checked_sub(paid), Some(ledger.balance()));
    }

    #[test]
    fn resume_needs_a_snapshot() {
        let err = SuretyLedger::resume(MemoryStore::new(), ScriptedIndexSource::constant(0))
            .unwrap_err();
        assert!(matches!(err, SuretyError::NotFound(_)));
    }

    #[test]
    fn notifications_since_filters_by_height() {
        let mut ledger = ledger();
        let admin = CallContext::new(owner());
        ledger.set_consensus_threshold(&admin, 5).unwrap();
        ledger.set_min_fund(&admin, Wei(10)).unwrap();
        let recent = ledger.notifications_since(2);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].notification, Notification::MinFundUpdated { value: Wei(10) });
    }
}
