use crate::address::Address;
use crate::amount::Wei;
use crate::flight::{FlightCode, FlightStatus};
use crate::lifecycle::{AirlineState, PolicyState};
use serde::{Deserialize, Serialize};

/// Notification - externally observable record of a committed state change.
///
/// Notifications are appended only when the operation that raised them
/// commits; a failed operation leaves no trace in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    OperationalStatusChanged {
        operational: bool,
    },
    CallerAuthorized {
        caller: Address,
    },
    CallerDeauthorized {
        caller: Address,
    },
    ConsensusThresholdUpdated {
        value: u32,
    },
    MinFundUpdated {
        value: Wei,
    },
    AirlineRegistered {
        airline: Address,
        name: String,
        state: AirlineState,
        registered_count: u32,
    },
    FundSubmitted {
        airline: Address,
        amount: Wei,
    },
    VoteRecorded {
        voter: Address,
        candidate: Address,
        candidate_name: String,
        approve: bool,
        yes_votes: u32,
    },
    AirlineAdmitted {
        airline: Address,
        registered_count: u32,
    },
    FlightRegistered {
        code: FlightCode,
        airline: Address,
        status: FlightStatus,
    },
    OracleRegistered {
        oracle: Address,
        indexes: [u8; 3],
    },
    StatusRequested {
        index: u8,
        airline: Address,
        code: FlightCode,
        timestamp: u64,
    },
    ReportRecorded {
        oracle: Address,
        airline: Address,
        code: FlightCode,
        timestamp: u64,
        status: FlightStatus,
    },
    StatusFinalized {
        airline: Address,
        code: FlightCode,
        timestamp: u64,
        status: FlightStatus,
    },
    PolicyBought {
        passenger: Address,
        code: FlightCode,
        amount: Wei,
        state: PolicyState,
    },
    PolicyResolved {
        passenger: Address,
        code: FlightCode,
        state: PolicyState,
        credit: Wei,
    },
    Withdrawal {
        passenger: Address,
        code: FlightCode,
        amount: Wei,
        state: PolicyState,
    },
}

impl Notification {
    /// Stable snake_case event name.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::OwnershipTransferred { .. } => "ownership_transferred",
            Notification::OperationalStatusChanged { .. } => "operational_status_changed",
            Notification::CallerAuthorized { .. } => "caller_authorized",
            Notification::CallerDeauthorized { .. } => "caller_deauthorized",
            Notification::ConsensusThresholdUpdated { .. } => "consensus_threshold_updated",
            Notification::MinFundUpdated { .. } => "min_fund_updated",
            Notification::AirlineRegistered { .. } => "airline_registered",
            Notification::FundSubmitted { .. } => "fund_submitted",
            Notification::VoteRecorded { .. } => "vote_recorded",
            Notification::AirlineAdmitted { .. } => "airline_admitted",
            Notification::FlightRegistered { .. } => "flight_registered",
            Notification::OracleRegistered { .. } => "oracle_registered",
            Notification::StatusRequested { .. } => "status_requested",
            Notification::ReportRecorded { .. } => "report_recorded",
            Notification::StatusFinalized { .. } => "status_finalized",
            Notification::PolicyBought { .. } => "policy_bought",
            Notification::PolicyResolved { .. } => "policy_resolved",
            Notification::Withdrawal { .. } => "withdrawal",
        }
    }
}

/// A notification tagged with the height of the transaction that committed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub height: u64,
    pub notification: Notification,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_json_uses_event_name() {
        let n = Notification::OperationalStatusChanged { operational: false };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["event"], n.name());
        assert_eq!(json["operational"], false);
    }

    #[test]
    fn record_roundtrip() {
        let record = NotificationRecord {
            height: 7,
            notification: Notification::FundSubmitted {
                airline: Address::from_label("klm"),
                amount: Wei::from_ether(1),
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: NotificationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
