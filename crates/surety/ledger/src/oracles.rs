//! Oracle registration and status consensus.
//!
//! Each oracle holds three indexes. A status request is opened under one
//! index, and only oracles holding that index may report on it. A request
//! finalizes once `oracle_response_threshold` distinct oracles report the
//! same status; the first status to get there wins and later reports are
//! acknowledged without effect.

use crate::error::{SuretyError, SuretyResult};
use crate::journal::Journal;
use crate::state::as_pairs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use surety_types::{Address, FlightCode, FlightStatus, Notification, Wei};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub address: Address,
    pub indexes: [u8; 3],
    pub fee: Wei,
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Identity of a status request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub index: u8,
    pub airline: Address,
    pub code: FlightCode,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub key: RequestKey,
    pub requester: Address,
    /// Ledger height at which the request was opened.
    pub opened_at: u64,
    #[serde(with = "as_pairs")]
    pub reports: BTreeMap<FlightStatus, BTreeSet<Address>>,
    pub responders: BTreeSet<Address>,
    pub finalized: Option<FlightStatus>,
}

impl StatusRequest {
    fn new(key: RequestKey, requester: Address, opened_at: u64) -> Self {
        Self {
            key,
            requester,
            opened_at,
            reports: BTreeMap::new(),
            responders: BTreeSet::new(),
            finalized: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.finalized.is_none()
    }

    pub fn reports_for(&self, status: FlightStatus) -> u32 {
        self.reports
            .get(&status)
            .map(|oracles| oracles.len() as u32)
            .unwrap_or(0)
    }
}

/// What happened to a submitted report. None of these are errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResponseOutcome {
    /// The oracle does not hold the index, or nothing is open under the key.
    IndexMismatch,
    /// The oracle already reported on this request.
    Duplicate,
    AlreadyFinalized,
    Recorded { reports: u32 },
    Finalized { status: FlightStatus },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConsensus {
    oracles: BTreeMap<Address, Oracle>,
    #[serde(with = "as_pairs")]
    requests: BTreeMap<RequestKey, StatusRequest>,
}

impl OracleConsensus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, oracle: &Address) -> bool {
        self.oracles.contains_key(oracle)
    }

    pub fn oracle(&self, oracle: &Address) -> Option<&Oracle> {
        self.oracles.get(oracle)
    }

    pub fn oracles(&self) -> impl Iterator<Item = &Oracle> {
        self.oracles.values()
    }

    pub fn request(&self, key: &RequestKey) -> Option<&StatusRequest> {
        self.requests.get(key)
    }

    pub fn requests(&self) -> impl Iterator<Item = &StatusRequest> {
        self.requests.values()
    }

    /// Record a new oracle with indexes already drawn by the caller.
    pub fn register(
        &mut self,
        oracle: Address,
        paid: Wei,
        required_fee: Wei,
        indexes: [u8; 3],
        journal: &mut Journal,
    ) -> SuretyResult<[u8; 3]> {
        if paid < required_fee {
            return Err(SuretyError::InsufficientPayment {
                required: required_fee,
                paid,
            });
        }
        if self.oracles.contains_key(&oracle) {
            return Err(SuretyError::DuplicateOracle(oracle));
        }
        self.oracles.insert(
            oracle,
            Oracle {
                address: oracle,
                indexes,
                fee: paid,
            },
        );
        info!(oracle = %oracle, ?indexes, fee = %paid, "Oracle registered");
        journal.emit(Notification::OracleRegistered { oracle, indexes });
        Ok(indexes)
    }

    pub fn indexes_of(&self, oracle: &Address) -> SuretyResult<[u8; 3]> {
        self.oracles
            .get(oracle)
            .map(|registered| registered.indexes)
            .ok_or_else(|| SuretyError::unauthorized(format!("{} is not a registered oracle", oracle)))
    }

    /// Open a request under `key`. An existing request is left untouched.
    /// Returns whether a new request was created.
    pub fn open_request(
        &mut self,
        key: RequestKey,
        requester: Address,
        height: u64,
        journal: &mut Journal,
    ) -> bool {
        let created = if self.requests.contains_key(&key) {
            debug!(index = key.index, code = %key.code, "Status request already open");
            false
        } else {
            self.requests
                .insert(key, StatusRequest::new(key, requester, height));
            info!(
                index = key.index,
                airline = %key.airline,
                code = %key.code,
                timestamp = key.timestamp,
                "Status request opened"
            );
            true
        };
        journal.emit(Notification::StatusRequested {
            index: key.index,
            airline: key.airline,
            code: key.code,
            timestamp: key.timestamp,
        });
        created
    }

    pub fn submit(
        &mut self,
        oracle: &Address,
        key: RequestKey,
        status: FlightStatus,
        response_threshold: u32,
        journal: &mut Journal,
    ) -> SuretyResult<ResponseOutcome> {
        let registered = self.oracles.get(oracle).ok_or_else(|| {
            SuretyError::unauthorized(format!("{} is not a registered oracle", oracle))
        })?;
        if !status.is_resolved() {
            return Err(SuretyError::invalid("oracles must report a resolved status"));
        }
        if !registered.holds(key.index) {
            debug!(oracle = %oracle, index = key.index, "Oracle does not hold index");
            return Ok(ResponseOutcome::IndexMismatch);
        }
        let request = match self.requests.get_mut(&key) {
            Some(request) => request,
            None => {
                debug!(oracle = %oracle, index = key.index, code = %key.code, "No open request under key");
                return Ok(ResponseOutcome::IndexMismatch);
            }
        };
        if request.finalized.is_some() {
            debug!(oracle = %oracle, code = %key.code, "Report on finalized request ignored");
            return Ok(ResponseOutcome::AlreadyFinalized);
        }
        if !request.responders.insert(*oracle) {
            debug!(oracle = %oracle, code = %key.code, "Duplicate report ignored");
            return Ok(ResponseOutcome::Duplicate);
        }

        let bucket = request.reports.entry(status).or_default();
        bucket.insert(*oracle);
        let reports = bucket.len() as u32;
        journal.emit(Notification::ReportRecorded {
            oracle: *oracle,
            airline: key.airline,
            code: key.code,
            timestamp: key.timestamp,
            status,
        });

        if reports >= response_threshold {
            request.finalized = Some(status);
            info!(code = %key.code, status = %status, reports, "Status request finalized");
            journal.emit(Notification::StatusFinalized {
                airline: key.airline,
                code: key.code,
                timestamp: key.timestamp,
                status,
            });
            return Ok(ResponseOutcome::Finalized { status });
        }
        Ok(ResponseOutcome::Recorded { reports })
    }
}
