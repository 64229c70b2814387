//! Serializable operation envelopes.
//!
//! An [`Envelope`] is one call as submitted by a relay on behalf of a
//! sender. [`SuretyLedger::apply`] checks the relay, runs the typed
//! operation and answers with a [`Receipt`].
//!
//! ```json
//! {
//!   "relay": "0x…",
//!   "sender": "0x…",
//!   "value": "100000000000000",
//!   "op": { "op": "buy_insurance", "code": "ND1309" }
//! }
//! ```

use crate::airlines::{Registration, VoteOutcome};
use crate::error::{SuretyError, SuretyResult};
use crate::flights::FlightInfo;
use crate::insurance::PolicyInfo;
use crate::ledger::{CallContext, ContractConfiguration, SuretyLedger};
use crate::oracles::ResponseOutcome;
use serde::{Deserialize, Serialize};
use surety_types::{Address, FlightCode, FlightStatus, NotificationRecord, Wei};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    TransferOwnership {
        new_owner: Address,
    },
    RenounceOwnership,
    AuthorizeCaller {
        caller: Address,
    },
    DeauthorizeCaller {
        caller: Address,
    },
    SetOperational {
        operational: bool,
    },
    SetConsensusThreshold {
        value: u32,
    },
    SetMinFund {
        value: Wei,
    },
    RegisterAirline {
        airline: Address,
        name: String,
    },
    SubmitFundAirline,
    MultipartyConsensusVote {
        candidate: Address,
        approve: bool,
    },
    RegisterFlight {
        code: FlightCode,
        timestamp: u64,
        departure: String,
        arrival: String,
    },
    RegisterOracle,
    FetchFlightStatus {
        airline: Address,
        code: FlightCode,
        timestamp: u64,
    },
    SubmitOracleResponse {
        index: u8,
        airline: Address,
        code: FlightCode,
        timestamp: u64,
        status: FlightStatus,
    },
    BuyInsurance {
        code: FlightCode,
    },
    PassengerWithdraw {
        code: FlightCode,
    },
    GetMyIndexes,
    FetchFlightsCodes,
    FetchFlightInfoByCode {
        code: FlightCode,
    },
    FetchActiveInsurancesKeysForPassenger,
    FetchInsurancesInfoForPassengerAndCode {
        code: FlightCode,
    },
    FetchDataContractConfiguration,
    GetBalance,
    IsOperational,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::TransferOwnership { .. } => "transfer_ownership",
            Operation::RenounceOwnership => "renounce_ownership",
            Operation::AuthorizeCaller { .. } => "authorize_caller",
            Operation::DeauthorizeCaller { .. } => "deauthorize_caller",
            Operation::SetOperational { .. } => "set_operational",
            Operation::SetConsensusThreshold { .. } => "set_consensus_threshold",
            Operation::SetMinFund { .. } => "set_min_fund",
            Operation::RegisterAirline { .. } => "register_airline",
            Operation::SubmitFundAirline => "submit_fund_airline",
            Operation::MultipartyConsensusVote { .. } => "multiparty_consensus_vote",
            Operation::RegisterFlight { .. } => "register_flight",
            Operation::RegisterOracle => "register_oracle",
            Operation::FetchFlightStatus { .. } => "fetch_flight_status",
            Operation::SubmitOracleResponse { .. } => "submit_oracle_response",
            Operation::BuyInsurance { .. } => "buy_insurance",
            Operation::PassengerWithdraw { .. } => "passenger_withdraw",
            Operation::GetMyIndexes => "get_my_indexes",
            Operation::FetchFlightsCodes => "fetch_flights_codes",
            Operation::FetchFlightInfoByCode { .. } => "fetch_flight_info_by_code",
            Operation::FetchActiveInsurancesKeysForPassenger => {
                "fetch_active_insurances_keys_for_passenger"
            }
            Operation::FetchInsurancesInfoForPassengerAndCode { .. } => {
                "fetch_insurances_info_for_passenger_and_code"
            }
            Operation::FetchDataContractConfiguration => "fetch_data_contract_configuration",
            Operation::GetBalance => "get_balance",
            Operation::IsOperational => "is_operational",
        }
    }
}

/// One call submitted by `relay` on behalf of `sender`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub relay: Address,
    pub sender: Address,
    #[serde(default)]
    pub value: Wei,
    pub op: Operation,
}

impl Envelope {
    /// A call the sender submits for itself.
    pub fn direct(sender: Address, op: Operation) -> Self {
        Self {
            relay: sender,
            sender,
            value: Wei::ZERO,
            op,
        }
    }

    pub fn relayed(relay: Address, sender: Address, op: Operation) -> Self {
        Self {
            relay,
            sender,
            value: Wei::ZERO,
            op,
        }
    }

    pub fn with_value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }
}

/// Structured result of an applied envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Changed { changed: bool },
    Registration(Registration),
    Amount { amount: Wei },
    Vote(VoteOutcome),
    Flight(FlightInfo),
    Indexes { indexes: [u8; 3] },
    Index { index: u8 },
    Response(ResponseOutcome),
    Policy(PolicyInfo),
    Codes { codes: Vec<FlightCode> },
    Configuration(ContractConfiguration),
    Flag { value: bool },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: Uuid,
    /// Ledger height after the envelope was applied.
    pub height: u64,
    pub outcome: Outcome,
    /// Notifications committed by this envelope.
    pub notifications: Vec<NotificationRecord>,
}

impl SuretyLedger {
    /// Apply one envelope. The relay must be an authorized caller or the owner.
    pub fn apply(&mut self, envelope: Envelope) -> SuretyResult<Receipt> {
        let Envelope {
            relay,
            sender,
            value,
            op,
        } = envelope;
        if !self.is_authorized_caller(&relay) && !self.is_owner(&relay) {
            warn!(relay = %relay, op = op.name(), "Envelope from unauthorized relay");
            return Err(SuretyError::unauthorized(format!(
                "{} is not an authorized relay",
                relay
            )));
        }

        let name = op.name();
        let start = self.height();
        let ctx = CallContext::paying(sender, value);
        let outcome = self.dispatch(&ctx, op)?;
        let receipt = Receipt {
            tx_id: Uuid::new_v4(),
            height: self.height(),
            outcome,
            notifications: self.notifications_since(start).to_vec(),
        };
        info!(
            tx_id = %receipt.tx_id,
            op = name,
            sender = %sender,
            height = receipt.height,
            "Envelope applied"
        );
        Ok(receipt)
    }

    fn dispatch(&mut self, ctx: &CallContext, op: Operation) -> SuretyResult<Outcome> {
        let outcome = match op {
            Operation::TransferOwnership { new_owner } => {
                self.transfer_ownership(ctx, new_owner)?;
                Outcome::Done
            }
            Operation::RenounceOwnership => {
                self.renounce_ownership(ctx)?;
                Outcome::Done
            }
            Operation::AuthorizeCaller { caller } => Outcome::Changed {
                changed: self.authorize_caller(ctx, caller)?,
            },
            Operation::DeauthorizeCaller { caller } => Outcome::Changed {
                changed: self.deauthorize_caller(ctx, caller)?,
            },
            Operation::SetOperational { operational } => {
                self.set_operational(ctx, operational)?;
                Outcome::Done
            }
            Operation::SetConsensusThreshold { value } => {
                self.set_consensus_threshold(ctx, value)?;
                Outcome::Done
            }
            Operation::SetMinFund { value } => {
                self.set_min_fund(ctx, value)?;
                Outcome::Done
            }
            Operation::RegisterAirline { airline, name } => {
                Outcome::Registration(self.register_airline(ctx, airline, &name)?)
            }
            Operation::SubmitFundAirline => Outcome::Amount {
                amount: self.submit_fund_airline(ctx)?,
            },
            Operation::MultipartyConsensusVote { candidate, approve } => {
                Outcome::Vote(self.multiparty_consensus_vote(ctx, candidate, approve)?)
            }
            Operation::RegisterFlight {
                code,
                timestamp,
                departure,
                arrival,
            } => Outcome::Flight(self.register_flight(ctx, code, timestamp, &departure, &arrival)?),
            Operation::RegisterOracle => Outcome::Indexes {
                indexes: self.register_oracle(ctx)?,
            },
            Operation::FetchFlightStatus {
                airline,
                code,
                timestamp,
            } => Outcome::Index {
                index: self.fetch_flight_status(ctx, airline, code, timestamp)?,
            },
            Operation::SubmitOracleResponse {
                index,
                airline,
                code,
                timestamp,
                status,
            } => Outcome::Response(
                self.submit_oracle_response(ctx, index, airline, code, timestamp, status)?,
            ),
            Operation::BuyInsurance { code } => Outcome::Policy(self.buy_insurance(ctx, code)?),
            Operation::PassengerWithdraw { code } => Outcome::Amount {
                amount: self.passenger_withdraw(ctx, code)?,
            },
            Operation::GetMyIndexes => Outcome::Indexes {
                indexes: self.get_my_indexes(ctx)?,
            },
            Operation::FetchFlightsCodes => Outcome::Codes {
                codes: self.fetch_flights_codes(),
            },
            Operation::FetchFlightInfoByCode { code } => {
                Outcome::Flight(self.fetch_flight_info_by_code(&code)?)
            }
            Operation::FetchActiveInsurancesKeysForPassenger => Outcome::Codes {
                codes: self.fetch_active_insurances_keys_for_passenger(ctx)?,
            },
            Operation::FetchInsurancesInfoForPassengerAndCode { code } => {
                Outcome::Policy(self.fetch_insurances_info_for_passenger_and_code(ctx, &code)?)
            }
            Operation::FetchDataContractConfiguration => {
                Outcome::Configuration(self.fetch_data_contract_configuration())
            }
            Operation::GetBalance => Outcome::Amount {
                amount: self.balance(),
            },
            Operation::IsOperational => Outcome::Flag {
                value: self.is_operational(),
            },
        };
        Ok(outcome)
    }
}
