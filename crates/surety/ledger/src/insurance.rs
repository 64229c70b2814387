//! Policy lifecycle and escrow accounting.
//!
//! Every open policy is a liability against the treasury: an Active policy
//! owes its full payout if the flight turns out late through airline fault,
//! a Payable policy owes its credit. Purchases are not bounded by that sum;
//! a withdrawal the treasury cannot cover fails instead.

use crate::error::{SuretyError, SuretyResult};
use crate::flights::Flight;
use crate::journal::Journal;
use crate::state::as_pairs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_types::{Address, FlightCode, FlightStatus, LedgerConfig, Notification, PayoutMultiplier, PolicyState, Wei};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub passenger: Address,
    pub code: FlightCode,
    pub amount: Wei,
    pub state: PolicyState,
    pub credit: Wei,
    /// Ledger height of the purchase.
    pub purchased_at: u64,
}

impl Policy {
    /// What this policy could still cost the treasury.
    pub fn liability(&self, payout: &PayoutMultiplier) -> SuretyResult<Wei> {
        match self.state {
            PolicyState::Active => payout
                .apply(self.amount)
                .ok_or(SuretyError::ArithmeticOverflow("policy payout")),
            PolicyState::Payable => Ok(self.credit),
            PolicyState::Withdrawn | PolicyState::Expired => Ok(Wei::ZERO),
        }
    }
}

/// Projection returned by policy lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInfo {
    pub code: FlightCode,
    pub amount: Wei,
    pub state: PolicyState,
    pub credit: Wei,
}

impl From<&Policy> for PolicyInfo {
    fn from(policy: &Policy) -> Self {
        Self {
            code: policy.code,
            amount: policy.amount,
            state: policy.state,
            credit: policy.credit,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceLedger {
    #[serde(with = "as_pairs")]
    policies: BTreeMap<(Address, FlightCode), Policy>,
    by_passenger: BTreeMap<Address, Vec<FlightCode>>,
    by_flight: BTreeMap<FlightCode, Vec<Address>>,
}

impl InsuranceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(&self, passenger: &Address, code: &FlightCode) -> Option<&Policy> {
        self.policies.get(&(*passenger, *code))
    }

    pub fn policies(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Sum of what every open policy could still cost.
    pub fn outstanding_liability(&self, payout: &PayoutMultiplier) -> SuretyResult<Wei> {
        self.policies.values().try_fold(Wei::ZERO, |total, policy| {
            total
                .checked_add(policy.liability(payout)?)
                .ok_or(SuretyError::ArithmeticOverflow("outstanding liability"))
        })
    }

    /// Open an Active policy.
    pub fn buy(
        &mut self,
        passenger: Address,
        flight: &Flight,
        amount: Wei,
        config: &LedgerConfig,
        height: u64,
        journal: &mut Journal,
    ) -> SuretyResult<PolicyInfo> {
        let code = flight.code;
        if flight.status.is_resolved() {
            return Err(SuretyError::FlightResolved(code));
        }
        if amount.is_zero() || amount < config.min_premium {
            return Err(SuretyError::InsufficientPayment {
                required: config.min_premium,
                paid: amount,
            });
        }
        if amount > config.max_premium {
            return Err(SuretyError::ExcessPayment {
                limit: config.max_premium,
                paid: amount,
            });
        }
        if self.policies.contains_key(&(passenger, code)) {
            return Err(SuretyError::DuplicatePolicy { passenger, code });
        }

        let policy = Policy {
            passenger,
            code,
            amount,
            state: PolicyState::Active,
            credit: Wei::ZERO,
            purchased_at: height,
        };
        let info = PolicyInfo::from(&policy);
        self.policies.insert((passenger, code), policy);
        self.by_passenger.entry(passenger).or_default().push(code);
        self.by_flight.entry(code).or_default().push(passenger);

        info!(passenger = %passenger, code = %code, amount = %amount, "Policy bought");
        journal.emit(Notification::PolicyBought {
            passenger,
            code,
            amount,
            state: PolicyState::Active,
        });
        Ok(info)
    }

    /// Settle every Active policy on `code` against the flight's status.
    /// Returns the number of policies resolved.
    pub fn resolve(
        &mut self,
        code: &FlightCode,
        status: FlightStatus,
        payout: &PayoutMultiplier,
        journal: &mut Journal,
    ) -> SuretyResult<usize> {
        let passengers = match self.by_flight.get(code) {
            Some(passengers) => passengers.clone(),
            None => return Ok(0),
        };

        let mut resolved = 0;
        for passenger in passengers {
            let policy = match self.policies.get_mut(&(passenger, *code)) {
                Some(policy) if policy.state == PolicyState::Active => policy,
                _ => continue,
            };
            if status.is_airline_fault() {
                policy.credit = payout
                    .apply(policy.amount)
                    .ok_or(SuretyError::ArithmeticOverflow("policy payout"))?;
                policy.state = PolicyState::Payable;
            } else {
                policy.credit = Wei::ZERO;
                policy.state = PolicyState::Expired;
            }
            resolved += 1;
            journal.emit(Notification::PolicyResolved {
                passenger,
                code: *code,
                state: policy.state,
                credit: policy.credit,
            });
        }
        info!(code = %code, status = %status, resolved, "Policies resolved");
        Ok(resolved)
    }

    /// Mark a Payable policy withdrawn and return the credit to pay out.
    /// The caller debits the treasury.
    pub fn withdraw(
        &mut self,
        passenger: &Address,
        code: &FlightCode,
        journal: &mut Journal,
    ) -> SuretyResult<Wei> {
        let policy = match self.policies.get_mut(&(*passenger, *code)) {
            Some(policy) if policy.state == PolicyState::Payable => policy,
            _ => {
                return Err(SuretyError::NotPayable {
                    passenger: *passenger,
                    code: *code,
                })
            }
        };
        let amount = policy.credit;
        policy.credit = Wei::ZERO;
        policy.state = PolicyState::Withdrawn;

        info!(passenger = %passenger, code = %code, amount = %amount, "Payout withdrawn");
        journal.emit(Notification::Withdrawal {
            passenger: *passenger,
            code: *code,
            amount,
            state: PolicyState::Withdrawn,
        });
        Ok(amount)
    }

    /// Flight codes of every policy `passenger` holds, in purchase order.
    pub fn keys_for(&self, passenger: &Address) -> SuretyResult<Vec<FlightCode>> {
        match self.by_passenger.get(passenger) {
            Some(codes) if !codes.is_empty() => Ok(codes.clone()),
            _ => Err(SuretyError::not_found(format!(
                "no policies for passenger {}",
                passenger
            ))),
        }
    }

    pub fn info(&self, passenger: &Address, code: &FlightCode) -> SuretyResult<PolicyInfo> {
        self.policy(passenger, code)
            .map(PolicyInfo::from)
            .ok_or_else(|| {
                SuretyError::not_found(format!("no policy on {} for {}", code, passenger))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(code: &str) -> Flight {
        Flight {
            code: FlightCode::new(code).unwrap(),
            airline: Address::from_label("airline"),
            departure: "YUL".into(),
            arrival: "CDG".into(),
            timestamp: 1_700_000_000,
            status: FlightStatus::Unknown,
        }
    }

    fn premium() -> Wei {
        Wei::parse_ether("0.0001").unwrap()
    }

    #[test]
    fn premium_bounds() {
        let mut ledger = InsuranceLedger::new();
        let config = LedgerConfig::default();
        let passenger = Address::from_label("passenger");
        let mut journal = Journal::new();

        assert!(matches!(
            ledger.buy(passenger, &flight("ND1"), Wei::ZERO, &config, 1, &mut journal),
            Err(SuretyError::InsufficientPayment { .. })
        ));
        assert!(matches!(
            ledger.buy(passenger, &flight("ND1"), Wei::from_ether(2), &config, 1, &mut journal),
            Err(SuretyError::ExcessPayment { .. })
        ));
        ledger
            .buy(passenger, &flight("ND1"), Wei::from_ether(1), &config, 1, &mut journal)
            .unwrap();
        assert!(matches!(
            ledger.buy(passenger, &flight("ND1"), premium(), &config, 1, &mut journal),
            Err(SuretyError::DuplicatePolicy { .. })
        ));
    }

    #[test]
    fn resolved_flights_cannot_be_insured() {
        let mut ledger = InsuranceLedger::new();
        let mut resolved = flight("ND1");
        resolved.status = FlightStatus::OnTime;
        let err = ledger
            .buy(
                Address::from_label("p"),
                &resolved,
                premium(),
                &LedgerConfig::default(),
                1,
                &mut Journal::new(),
            )
            .unwrap_err();
        assert!(matches!(err, SuretyError::FlightResolved(_)));
    }

    #[test]
    fn airline_fault_makes_policies_payable() {
        let mut ledger = InsuranceLedger::new();
        let config = LedgerConfig::default();
        let passenger = Address::from_label("passenger");
        let code = FlightCode::new("ND1").unwrap();
        let mut journal = Journal::new();
        ledger
            .buy(passenger, &flight("ND1"), premium(), &config, 1, &mut journal)
            .unwrap();

        assert!(matches!(
            ledger.withdraw(&passenger, &code, &mut journal),
            Err(SuretyError::NotPayable { .. })
        ));
        assert_eq!(
            ledger
                .resolve(&code, FlightStatus::LateAirline, &config.payout, &mut journal)
                .unwrap(),
            1
        );
        let info = ledger.info(&passenger, &code).unwrap();
        assert_eq!(info.state, PolicyState::Payable);
        assert_eq!(info.credit, Wei::parse_ether("0.00015").unwrap());

        let paid = ledger.withdraw(&passenger, &code, &mut journal).unwrap();
        assert_eq!(paid, Wei::parse_ether("0.00015").unwrap());
        let info = ledger.info(&passenger, &code).unwrap();
        assert_eq!(info.state, PolicyState::Withdrawn);
        assert_eq!(info.credit, Wei::ZERO);
        assert!(matches!(
            ledger.withdraw(&passenger, &code, &mut journal),
            Err(SuretyError::NotPayable { .. })
        ));
    }

    #[test]
    fn other_statuses_expire_policies() {
        let mut ledger = InsuranceLedger::new();
        let config = LedgerConfig::default();
        let passenger = Address::from_label("passenger");
        let code = FlightCode::new("ND1").unwrap();
        let mut journal = Journal::new();
        ledger
            .buy(passenger, &flight("ND1"), premium(), &config, 1, &mut journal)
            .unwrap();
        ledger
            .resolve(&code, FlightStatus::LateWeather, &config.payout, &mut journal)
            .unwrap();
        let info = ledger.info(&passenger, &code).unwrap();
        assert_eq!(info.state, PolicyState::Expired);
        assert_eq!(info.credit, Wei::ZERO);
        assert_eq!(ledger.outstanding_liability(&config.payout).unwrap(), Wei::ZERO);
        // Resolving again touches nothing.
        assert_eq!(
            ledger
                .resolve(&code, FlightStatus::LateAirline, &config.payout, &mut journal)
                .unwrap(),
            0
        );
    }

    #[test]
    fn keys_follow_purchase_order() {
        let mut ledger = InsuranceLedger::new();
        let config = LedgerConfig::default();
        let passenger = Address::from_label("passenger");
        let mut journal = Journal::new();
        assert!(matches!(ledger.keys_for(&passenger), Err(SuretyError::NotFound(_))));
        for code in ["ZZ9", "AA1", "MM5"] {
            ledger
                .buy(passenger, &flight(code), premium(), &config, 1, &mut journal)
                .unwrap();
        }
        let keys: Vec<String> = ledger
            .keys_for(&passenger)
            .unwrap()
            .iter()
            .map(|code| code.as_str().to_string())
            .collect();
        assert_eq!(keys, vec!["ZZ9", "AA1", "MM5"]);
    }
}
