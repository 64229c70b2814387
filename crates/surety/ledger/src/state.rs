use crate::access::AccessControl;
use crate::airlines::AirlineRegistry;
use crate::error::{SuretyError, SuretyResult};
use crate::flights::FlightRegistry;
use crate::gate::OperationalGate;
use crate::insurance::InsuranceLedger;
use crate::oracles::OracleConsensus;
use serde::{Deserialize, Serialize};
use surety_types::{Address, LedgerConfig, Wei};

/// Funds held by the ledger.
///
/// `balance` always equals the inflows minus `payouts`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    pub balance: Wei,
    pub airline_funds: Wei,
    pub oracle_fees: Wei,
    pub premiums: Wei,
    pub payouts: Wei,
}

/// Source of an inflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inflow {
    AirlineFund,
    OracleFee,
    Premium,
}

impl Treasury {
    pub fn credit(&mut self, kind: Inflow, amount: Wei) -> SuretyResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(SuretyError::ArithmeticOverflow("treasury balance"))?;
        let bucket = match kind {
            Inflow::AirlineFund => &mut self.airline_funds,
            Inflow::OracleFee => &mut self.oracle_fees,
            Inflow::Premium => &mut self.premiums,
        };
        *bucket = bucket
            .checked_add(amount)
            .ok_or(SuretyError::ArithmeticOverflow("treasury inflow"))?;
        Ok(())
    }

    pub fn pay_out(&mut self, amount: Wei) -> SuretyResult<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(SuretyError::ArithmeticOverflow("treasury balance"))?;
        self.payouts = self
            .payouts
            .checked_add(amount)
            .ok_or(SuretyError::ArithmeticOverflow("treasury payouts"))?;
        Ok(())
    }

    /// Inflows minus payouts, for reconciliation against `balance`.
    pub fn reconciled(&self) -> Option<Wei> {
        self.airline_funds
            .checked_add(self.oracle_fees)?
            .checked_add(self.premiums)?
            .checked_sub(self.payouts)
    }
}

/// The single store object holding every component.
///
/// Mutating operations work on a clone and replace the committed value
/// only when they succeed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub config: LedgerConfig,
    pub access: AccessControl,
    pub gate: OperationalGate,
    pub airlines: AirlineRegistry,
    pub flights: FlightRegistry,
    pub oracles: OracleConsensus,
    pub insurance: InsuranceLedger,
    pub treasury: Treasury,
}

impl LedgerState {
    pub fn new(owner: Address, config: LedgerConfig) -> Self {
        Self {
            config,
            access: AccessControl::new(owner),
            gate: OperationalGate::new(),
            airlines: AirlineRegistry::new(),
            flights: FlightRegistry::new(),
            oracles: OracleConsensus::new(),
            insurance: InsuranceLedger::new(),
            treasury: Treasury::default(),
        }
    }

    /// Outstanding liability minus balance; `None` while the treasury
    /// covers every open policy.
    pub fn shortfall(&self) -> SuretyResult<Option<Wei>> {
        let liability = self.insurance.outstanding_liability(&self.config.payout)?;
        Ok(liability.checked_sub(self.treasury.balance).filter(|gap| !gap.is_zero()))
    }
}

/// Serde adapter storing a map with non-string keys as a list of pairs.
pub(crate) mod as_pairs {
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::Serializer;
    use serde::Serialize;
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treasury_tracks_flows() {
        let mut treasury = Treasury::default();
        treasury.credit(Inflow::AirlineFund, Wei::from_ether(10)).unwrap();
        treasury.credit(Inflow::OracleFee, Wei::from_ether(1)).unwrap();
        treasury.credit(Inflow::Premium, Wei(100)).unwrap();
        treasury.pay_out(Wei(150)).unwrap();
        assert_eq!(treasury.balance, Wei(11 * surety_types::WEI_PER_ETHER - 50));
        assert_eq!(treasury.reconciled(), Some(treasury.balance));
    }

    #[test]
    fn overdraft_is_an_error() {
        let mut treasury = Treasury::default();
        treasury.credit(Inflow::Premium, Wei(5)).unwrap();
        assert!(matches!(
            treasury.pay_out(Wei(6)),
            Err(SuretyError::ArithmeticOverflow(_))
        ));
        assert_eq!(treasury.balance, Wei(5));
    }

    #[test]
    fn fresh_state_has_no_shortfall() {
        let state = LedgerState::new(Address::from_label("owner"), LedgerConfig::default());
        assert_eq!(state.shortfall().unwrap(), None);
        let json = serde_json::to_string(&state).unwrap();
        let restored: LedgerState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
