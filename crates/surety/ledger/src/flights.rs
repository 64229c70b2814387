use crate::error::{SuretyError, SuretyResult};
use crate::journal::Journal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_types::{Address, FlightCode, FlightStatus, Notification};
use tracing::{debug, info};

/// A registered flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub code: FlightCode,
    pub airline: Address,
    pub departure: String,
    pub arrival: String,
    /// Scheduled departure, unix seconds.
    pub timestamp: u64,
    pub status: FlightStatus,
}

impl Flight {
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Read-only projection returned by flight lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightInfo {
    pub code: FlightCode,
    pub airline: Address,
    pub airline_name: String,
    pub departure: String,
    pub arrival: String,
    pub timestamp: u64,
    pub status: FlightStatus,
}

impl FlightInfo {
    pub fn project(flight: &Flight, airline_name: impl Into<String>) -> Self {
        Self {
            code: flight.code,
            airline: flight.airline,
            airline_name: airline_name.into(),
            departure: flight.departure.clone(),
            arrival: flight.arrival.clone(),
            timestamp: flight.timestamp,
            status: flight.status,
        }
    }
}

/// Flight catalog keyed by code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightCode, Flight>,
    order: Vec<FlightCode>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flight for `airline`, which the caller has already
    /// confirmed is funded.
    pub fn register(
        &mut self,
        airline: Address,
        code: FlightCode,
        timestamp: u64,
        departure: &str,
        arrival: &str,
        journal: &mut Journal,
    ) -> SuretyResult<&Flight> {
        if self.flights.contains_key(&code) {
            return Err(SuretyError::DuplicateFlight(code));
        }
        let flight = Flight {
            code,
            airline,
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            timestamp,
            status: FlightStatus::Unknown,
        };
        info!(code = %code, airline = %airline, timestamp, "Flight registered");
        journal.emit(Notification::FlightRegistered {
            code,
            airline,
            status: FlightStatus::Unknown,
        });
        self.order.push(code);
        Ok(self.flights.entry(code).or_insert(flight))
    }

    pub fn get(&self, code: &FlightCode) -> Option<&Flight> {
        self.flights.get(code)
    }

    pub fn require(&self, code: &FlightCode) -> SuretyResult<&Flight> {
        self.flights
            .get(code)
            .ok_or_else(|| SuretyError::not_found(format!("flight {}", code)))
    }

    /// Codes in registration order.
    pub fn codes(&self) -> Vec<FlightCode> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.order.iter().filter_map(|code| self.flights.get(code))
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Record a finalized status and return the flight's effective status.
    ///
    /// Only the first resolution sticks; later ones leave the flight as is.
    pub fn resolve(&mut self, code: &FlightCode, status: FlightStatus) -> SuretyResult<FlightStatus> {
        let flight = self
            .flights
            .get_mut(code)
            .ok_or_else(|| SuretyError::not_found(format!("flight {}", code)))?;
        if flight.status == FlightStatus::Unknown {
            flight.status = status;
            info!(code = %code, status = %status, "Flight status resolved");
        } else if flight.status != status {
            debug!(
                code = %code,
                current = %flight.status,
                reported = %status,
                "Flight already resolved; keeping first status"
            );
        }
        Ok(flight.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(text: &str) -> FlightCode {
        FlightCode::new(text).unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = FlightRegistry::new();
        let airline = Address::from_label("airline");
        let mut journal = Journal::new();
        registry
            .register(airline, code("ND1309"), 1_700_000_000, "YUL", "CDG", &mut journal)
            .unwrap();
        registry
            .register(airline, code("ND1310"), 1_700_003_600, "CDG", "YUL", &mut journal)
            .unwrap();

        assert_eq!(registry.codes(), vec![code("ND1309"), code("ND1310")]);
        let flight = registry.get(&code("ND1309")).unwrap();
        assert_eq!(flight.status, FlightStatus::Unknown);
        assert_eq!(flight.scheduled_at().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(journal.events().len(), 2);
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let mut registry = FlightRegistry::new();
        let airline = Address::from_label("airline");
        let mut journal = Journal::new();
        registry
            .register(airline, code("ND1309"), 1, "A", "B", &mut journal)
            .unwrap();
        let err = registry
            .register(Address::from_label("other"), code("ND1309"), 2, "C", "D", &mut journal)
            .unwrap_err();
        assert!(matches!(err, SuretyError::DuplicateFlight(_)));
        assert!(registry.require(&code("XX1")).is_err());
    }

    #[test]
    fn first_resolution_wins() {
        let mut registry = FlightRegistry::new();
        let mut journal = Journal::new();
        registry
            .register(Address::from_label("a"), code("ND1"), 1, "A", "B", &mut journal)
            .unwrap();
        assert_eq!(
            registry.resolve(&code("ND1"), FlightStatus::LateAirline).unwrap(),
            FlightStatus::LateAirline
        );
        assert_eq!(
            registry.resolve(&code("ND1"), FlightStatus::OnTime).unwrap(),
            FlightStatus::LateAirline
        );
    }
}
