use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width in bytes of a [`FlightCode`].
pub const FLIGHT_CODE_LEN: usize = 32;

/// FlightCode - fixed-width key identifying a registered flight.
///
/// Built from at most 32 ASCII bytes, zero padded on the right. Codes are
/// unique across the whole ledger, not per airline.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightCode([u8; FLIGHT_CODE_LEN]);

impl FlightCode {
    pub fn new(code: &str) -> Result<Self, FlightCodeError> {
        if code.is_empty() {
            return Err(FlightCodeError::Empty);
        }
        if !code.is_ascii() || code.bytes().any(|b| b == 0 || b.is_ascii_control()) {
            return Err(FlightCodeError::NotAscii(code.to_string()));
        }
        if code.len() > FLIGHT_CODE_LEN {
            return Err(FlightCodeError::TooLong(code.len()));
        }
        let mut bytes = [0u8; FLIGHT_CODE_LEN];
        bytes[..code.len()].copy_from_slice(code.as_bytes());
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; FLIGHT_CODE_LEN] {
        &self.0
    }

    /// The code text without its zero padding.
    pub fn as_str(&self) -> &str {
        let end = self
            .0
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(FLIGHT_CODE_LEN);
        // Construction only admits ASCII, so the prefix is always valid UTF-8.
        std::str::from_utf8(&self.0[..end]).unwrap_or_default()
    }
}

impl fmt::Display for FlightCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FlightCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlightCode({})", self.as_str())
    }
}

impl FromStr for FlightCode {
    type Err = FlightCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for FlightCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FlightCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::new(&text).map_err(serde::de::Error::custom)
    }
}

/// Errors building a flight code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlightCodeError {
    #[error("flight code is empty")]
    Empty,

    #[error("flight code must be printable ASCII: {0:?}")]
    NotAscii(String),

    #[error("flight code is {0} bytes, at most 32 allowed")]
    TooLong(usize),
}

/// Status of a flight as reported by oracle consensus.
///
/// Wire codes follow the reporter protocol: 0, 10, 20, 30, 40, 50.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    pub const RESOLVED: [FlightStatus; 5] = [
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }

    /// Whether oracle consensus has settled this status.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, FlightStatus::Unknown)
    }

    /// Only a delay caused by the airline makes policies payable.
    pub fn is_airline_fault(&self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightStatus::Unknown => "unknown",
            FlightStatus::OnTime => "on_time",
            FlightStatus::LateAirline => "late_airline",
            FlightStatus::LateWeather => "late_weather",
            FlightStatus::LateTechnical => "late_technical",
            FlightStatus::LateOther => "late_other",
        };
        f.write_str(name)
    }
}
