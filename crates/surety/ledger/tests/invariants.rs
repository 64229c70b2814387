//! Property tests: ledger-wide invariants hold after any operation sequence.

mod common;

use common::*;
use proptest::prelude::*;
use std::collections::BTreeMap;
use surety_ledger::{ScriptedIndexSource, SuretyLedger};
use surety_types::{AirlineState, FlightCode, FlightStatus, Wei};

const AIRLINES: usize = 7;
const ORACLES: usize = 5;
const PASSENGERS: usize = 4;
const FLIGHTS: [&str; 3] = ["ND1309", "ND1310", "AC870"];

#[derive(Clone, Debug)]
enum Step {
    Register { sponsor: usize, candidate: usize },
    Fund { airline: usize, ether: u8 },
    Vote { voter: usize, candidate: usize, approve: bool },
    RegisterFlight { airline: usize, flight: usize },
    RegisterOracle { oracle: usize },
    Buy { passenger: usize, flight: usize, milli: u16 },
    Request { flight: usize, slot: u8 },
    Respond { oracle: usize, flight: usize, slot: u8, status: usize },
    Withdraw { passenger: usize, flight: usize },
    SetOperational { operational: bool },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1..=AIRLINES, 1..=AIRLINES)
            .prop_map(|(sponsor, candidate)| Step::Register { sponsor, candidate }),
        (1..=AIRLINES, 0u8..3).prop_map(|(airline, ether)| Step::Fund { airline, ether }),
        (1..=AIRLINES, 1..=AIRLINES, any::<bool>()).prop_map(|(voter, candidate, approve)| {
            Step::Vote {
                voter,
                candidate,
                approve,
            }
        }),
        (1..=AIRLINES, 0..FLIGHTS.len())
            .prop_map(|(airline, flight)| Step::RegisterFlight { airline, flight }),
        (1..=ORACLES).prop_map(|oracle| Step::RegisterOracle { oracle }),
        (1..=PASSENGERS, 0..FLIGHTS.len(), 0u16..1_500).prop_map(|(passenger, flight, milli)| {
            Step::Buy {
                passenger,
                flight,
                milli,
            }
        }),
        (0..FLIGHTS.len(), 0u8..2).prop_map(|(flight, slot)| Step::Request { flight, slot }),
        (1..=ORACLES, 0..FLIGHTS.len(), 0u8..2, 0..FlightStatus::RESOLVED.len()).prop_map(
            |(oracle, flight, slot, status)| Step::Respond {
                oracle,
                flight,
                slot,
                status,
            }
        ),
        (1..=PASSENGERS, 0..FLIGHTS.len())
            .prop_map(|(passenger, flight)| Step::Withdraw { passenger, flight }),
        any::<bool>().prop_map(|operational| Step::SetOperational { operational }),
    ]
}

fn flight_code(index: usize) -> FlightCode {
    code(FLIGHTS[index])
}

fn operator_of(ledger: &SuretyLedger, flight: usize) -> surety_types::Address {
    ledger
        .flight(&flight_code(flight))
        .map(|flight| flight.airline)
        .unwrap_or_else(owner)
}

/// Run one step; errors are expected and ignored.
fn run(ledger: &mut SuretyLedger, step: &Step) -> bool {
    match *step {
        Step::Register { sponsor, candidate } => ledger
            .register_airline(
                &call(airline(sponsor)),
                airline(candidate),
                &format!("Airline {}", candidate),
            )
            .is_ok(),
        Step::Fund { airline: n, ether } => ledger
            .submit_fund_airline(&pay(airline(n), Wei::from_ether(u128::from(ether))))
            .is_ok(),
        Step::Vote {
            voter,
            candidate,
            approve,
        } => ledger
            .multiparty_consensus_vote(&call(airline(voter)), airline(candidate), approve)
            .is_ok(),
        Step::RegisterFlight { airline: n, flight } => ledger
            .register_flight(&call(airline(n)), flight_code(flight), DEPARTURE, "YUL", "CDG")
            .is_ok(),
        Step::RegisterOracle { oracle: n } => ledger
            .register_oracle(&pay(oracle(n), Wei::from_ether(1)))
            .is_ok(),
        Step::Buy {
            passenger: n,
            flight,
            milli,
        } => ledger
            .buy_insurance(
                &pay(passenger(n), Wei::new(u128::from(milli) * 1_000_000_000_000_000)),
                flight_code(flight),
            )
            .is_ok(),
        Step::Request { flight, slot } => {
            let operator = operator_of(ledger, flight);
            ledger
                .fetch_flight_status(
                    &call(passenger(1)),
                    operator,
                    flight_code(flight),
                    DEPARTURE + u64::from(slot),
                )
                .is_ok()
        }
        Step::Respond {
            oracle: n,
            flight,
            slot,
            status,
        } => {
            let operator = operator_of(ledger, flight);
            ledger
                .submit_oracle_response(
                    &call(oracle(n)),
                    0,
                    operator,
                    flight_code(flight),
                    DEPARTURE + u64::from(slot),
                    FlightStatus::RESOLVED[status],
                )
                .is_ok()
        }
        Step::Withdraw {
            passenger: n,
            flight,
        } => ledger
            .passenger_withdraw(&call(passenger(n)), flight_code(flight))
            .is_ok(),
        Step::SetOperational { operational } => {
            ledger.set_operational(&call(owner()), operational).is_ok()
        }
    }
}

fn check_invariants(ledger: &SuretyLedger) -> Result<(), TestCaseError> {
    let state = ledger.state();

    prop_assert_eq!(state.treasury.reconciled(), Some(state.treasury.balance));

    let admitted = state
        .airlines
        .iter()
        .filter(|airline| airline.state.is_admitted())
        .count() as u32;
    prop_assert_eq!(state.airlines.registered_count(), admitted);

    for tally in state.airlines.tallies() {
        let candidate = state.airlines.get(&tally.candidate);
        prop_assert_eq!(candidate.map(|airline| airline.state), Some(AirlineState::Pending));
    }
    for airline in state.airlines.iter() {
        if airline.state == AirlineState::Funded && !airline.genesis {
            prop_assert!(airline.funded >= state.config.min_fund);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_for_any_operation_sequence(
        steps in prop::collection::vec(step_strategy(), 1..80)
    ) {
        let mut ledger = ledger_with(ScriptedIndexSource::constant(0));
        let mut statuses: BTreeMap<FlightCode, FlightStatus> = BTreeMap::new();

        for step in &steps {
            let before = ledger.state().clone();
            let height = ledger.height();
            let log_len = ledger.notifications().len();

            let committed = run(&mut ledger, step);
            if committed {
                prop_assert_eq!(ledger.height(), height + 1);
            } else {
                prop_assert_eq!(ledger.state(), &before);
                prop_assert_eq!(ledger.height(), height);
                prop_assert_eq!(ledger.notifications().len(), log_len);
            }

            check_invariants(&ledger)?;

            for flight in ledger.state().flights.iter() {
                if let Some(previous) = statuses.get(&flight.code) {
                    if previous.is_resolved() {
                        prop_assert_eq!(flight.status, *previous);
                    }
                }
                statuses.insert(flight.code, flight.status);
            }
        }
    }
}
