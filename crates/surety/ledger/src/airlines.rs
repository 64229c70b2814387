//! Airline admission.
//!
//! Admission runs in two regimes. While fewer than `consensus_threshold`
//! airlines are registered, any funded airline admits a candidate directly.
//! From then on a candidate starts out pending and needs yes votes from
//! half of the registered airlines, rounded up.

use crate::error::{SuretyError, SuretyResult};
use crate::journal::Journal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_types::{Address, AirlineState, Notification, Wei};
use tracing::{debug, info};

/// A participating airline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub address: Address,
    pub name: String,
    pub state: AirlineState,
    pub funded: Wei,
    /// Created at genesis rather than through registration.
    #[serde(default)]
    pub genesis: bool,
}

/// Ballots cast on a pending candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub candidate: Address,
    pub votes: BTreeMap<Address, bool>,
    pub yes_votes: u32,
}

impl VoteTally {
    fn new(candidate: Address) -> Self {
        Self {
            candidate,
            votes: BTreeMap::new(),
            yes_votes: 0,
        }
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.votes.contains_key(voter)
    }
}

/// Result of `register`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub state: AirlineState,
    pub registered_count: u32,
}

/// Result of `vote`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub yes_votes: u32,
    pub required: u32,
    pub admitted: bool,
}

/// Yes votes needed out of `registered` airlines.
pub fn required_votes(registered: u32) -> u32 {
    registered / 2 + registered % 2
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineRegistry {
    airlines: BTreeMap<Address, Airline>,
    order: Vec<Address>,
    tallies: BTreeMap<Address, VoteTally>,
    registered_count: u32,
}

impl AirlineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the genesis airline: funded, with nothing paid in.
    pub fn bootstrap(
        &mut self,
        address: Address,
        name: &str,
        journal: &mut Journal,
    ) -> SuretyResult<()> {
        validate_candidate(&address, name)?;
        if self.airlines.contains_key(&address) {
            return Err(SuretyError::DuplicateAirline(address));
        }
        self.insert(Airline {
            address,
            name: name.to_string(),
            state: AirlineState::Funded,
            funded: Wei::ZERO,
            genesis: true,
        });
        self.registered_count += 1;
        info!(airline = %address, name, "Genesis airline installed");
        journal.emit(Notification::AirlineRegistered {
            airline: address,
            name: name.to_string(),
            state: AirlineState::Funded,
            registered_count: self.registered_count,
        });
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Option<&Airline> {
        self.airlines.get(address)
    }

    /// Airlines in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Airline> {
        self.order.iter().filter_map(|address| self.airlines.get(address))
    }

    pub fn len(&self) -> usize {
        self.airlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airlines.is_empty()
    }

    pub fn registered_count(&self) -> u32 {
        self.registered_count
    }

    pub fn tally(&self, candidate: &Address) -> Option<&VoteTally> {
        self.tallies.get(candidate)
    }

    pub fn tallies(&self) -> impl Iterator<Item = &VoteTally> {
        self.tallies.values()
    }

    /// Fails with `Unauthorized` unless `caller` is a funded airline.
    pub fn require_funded(&self, caller: &Address) -> SuretyResult<&Airline> {
        match self.airlines.get(caller) {
            Some(airline) if airline.state.is_operational() => Ok(airline),
            Some(airline) => Err(SuretyError::unauthorized(format!(
                "airline {} is {}, not funded",
                caller, airline.state
            ))),
            None => Err(SuretyError::unauthorized(format!(
                "{} is not an airline",
                caller
            ))),
        }
    }

    pub fn register(
        &mut self,
        sponsor: &Address,
        candidate: Address,
        name: &str,
        consensus_threshold: u32,
        journal: &mut Journal,
    ) -> SuretyResult<Registration> {
        self.require_funded(sponsor)?;
        validate_candidate(&candidate, name)?;
        if self.airlines.contains_key(&candidate) {
            return Err(SuretyError::DuplicateAirline(candidate));
        }

        let state = if self.registered_count < consensus_threshold {
            self.registered_count += 1;
            AirlineState::Registered
        } else {
            self.tallies.insert(candidate, VoteTally::new(candidate));
            AirlineState::Pending
        };
        self.insert(Airline {
            address: candidate,
            name: name.to_string(),
            state,
            funded: Wei::ZERO,
            genesis: false,
        });

        info!(
            airline = %candidate,
            sponsor = %sponsor,
            state = %state,
            registered_count = self.registered_count,
            "Airline registered"
        );
        journal.emit(Notification::AirlineRegistered {
            airline: candidate,
            name: name.to_string(),
            state,
            registered_count: self.registered_count,
        });
        Ok(Registration {
            state,
            registered_count: self.registered_count,
        })
    }

    /// Move a registered airline to funded. The caller credits the treasury.
    pub fn submit_fund(
        &mut self,
        caller: &Address,
        amount: Wei,
        min_fund: Wei,
        journal: &mut Journal,
    ) -> SuretyResult<Wei> {
        let airline = self.airlines.get_mut(caller).ok_or_else(|| {
            SuretyError::unauthorized(format!("{} is not an airline", caller))
        })?;
        match airline.state {
            AirlineState::Pending => {
                return Err(SuretyError::unauthorized(format!(
                    "airline {} is still pending admission",
                    caller
                )))
            }
            AirlineState::Funded => return Err(SuretyError::AlreadyFunded(*caller)),
            AirlineState::Registered => {}
        }
        if amount < min_fund {
            return Err(SuretyError::InsufficientPayment {
                required: min_fund,
                paid: amount,
            });
        }

        airline.state = AirlineState::Funded;
        airline.funded = amount;
        info!(airline = %caller, amount = %amount, "Airline funded");
        journal.emit(Notification::FundSubmitted {
            airline: *caller,
            amount,
        });
        Ok(amount)
    }

    pub fn vote(
        &mut self,
        voter: &Address,
        candidate: &Address,
        approve: bool,
        journal: &mut Journal,
    ) -> SuretyResult<VoteOutcome> {
        self.require_funded(voter)?;
        let tally = self.tallies.get_mut(candidate).ok_or_else(|| {
            SuretyError::not_found(format!("no open vote for candidate {}", candidate))
        })?;
        if tally.has_voted(voter) {
            return Err(SuretyError::AlreadyVoted {
                voter: *voter,
                candidate: *candidate,
            });
        }

        tally.votes.insert(*voter, approve);
        if approve {
            tally.yes_votes += 1;
        }
        let yes_votes = tally.yes_votes;
        let required = required_votes(self.registered_count);
        let candidate_name = self
            .airlines
            .get(candidate)
            .map(|airline| airline.name.clone())
            .unwrap_or_default();

        debug!(voter = %voter, candidate = %candidate, approve, yes_votes, required, "Vote recorded");
        journal.emit(Notification::VoteRecorded {
            voter: *voter,
            candidate: *candidate,
            candidate_name,
            approve,
            yes_votes,
        });

        let admitted = yes_votes >= required;
        if admitted {
            self.tallies.remove(candidate);
            if let Some(airline) = self.airlines.get_mut(candidate) {
                airline.state = AirlineState::Registered;
            }
            self.registered_count += 1;
            info!(
                airline = %candidate,
                registered_count = self.registered_count,
                "Airline admitted by vote"
            );
            journal.emit(Notification::AirlineAdmitted {
                airline: *candidate,
                registered_count: self.registered_count,
            });
        }

        Ok(VoteOutcome {
            yes_votes,
            required,
            admitted,
        })
    }

    fn insert(&mut self, airline: Airline) {
        self.order.push(airline.address);
        self.airlines.insert(airline.address, airline);
    }
}

fn validate_candidate(address: &Address, name: &str) -> SuretyResult<()> {
    if address.is_zero() {
        return Err(SuretyError::invalid("airline address must not be null"));
    }
    if name.trim().is_empty() {
        return Err(SuretyError::invalid("airline name must not be empty"));
    }
    Ok(())
}
