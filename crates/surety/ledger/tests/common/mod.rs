#![allow(dead_code)]

use surety_ledger::{CallContext, ScriptedIndexSource, SuretyLedger};
use surety_types::{Address, FlightCode, GenesisConfig, Wei};

pub const DEPARTURE: u64 = 1_700_000_000;

pub fn addr(label: &str) -> Address {
    Address::from_label(label)
}

/// The owner doubles as the genesis airline.
pub fn owner() -> Address {
    addr("airline-1")
}

pub fn airline(n: usize) -> Address {
    addr(&format!("airline-{}", n))
}

pub fn oracle(n: usize) -> Address {
    addr(&format!("oracle-{}", n))
}

pub fn passenger(n: usize) -> Address {
    addr(&format!("passenger-{}", n))
}

pub fn ether(text: &str) -> Wei {
    Wei::parse_ether(text).unwrap()
}

pub fn code(text: &str) -> FlightCode {
    FlightCode::new(text).unwrap()
}

pub fn call(caller: Address) -> CallContext {
    CallContext::new(caller)
}

pub fn pay(caller: Address, value: Wei) -> CallContext {
    CallContext::paying(caller, value)
}

pub fn genesis() -> GenesisConfig {
    GenesisConfig::new(owner(), "Airline 1")
}

pub fn ledger_with(source: ScriptedIndexSource) -> SuretyLedger {
    SuretyLedger::builder(genesis())
        .index_source(source)
        .build()
        .unwrap()
}

pub fn ledger() -> SuretyLedger {
    ledger_with(ScriptedIndexSource::constant(0))
}

/// Register airlines 2..=`count` through the owner and fund each with one ether.
pub fn admit_funded(ledger: &mut SuretyLedger, count: usize) {
    for n in 2..=count {
        ledger
            .register_airline(&call(owner()), airline(n), &format!("Airline {}", n))
            .unwrap();
        ledger
            .submit_fund_airline(&pay(airline(n), Wei::from_ether(1)))
            .unwrap();
    }
}

pub fn register_flight(ledger: &mut SuretyLedger, text: &str) -> FlightCode {
    let code = code(text);
    ledger
        .register_flight(&call(owner()), code, DEPARTURE, "YUL", "CDG")
        .unwrap();
    code
}

pub fn register_oracles(ledger: &mut SuretyLedger, count: usize) -> Vec<Address> {
    (1..=count)
        .map(|n| {
            ledger
                .register_oracle(&pay(oracle(n), Wei::from_ether(1)))
                .unwrap();
            oracle(n)
        })
        .collect()
}
