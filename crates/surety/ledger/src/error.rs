use surety_types::{Address, ConfigError, FlightCode, Wei};
use thiserror::Error;

/// Errors from ledger operations.
///
/// Any error aborts the whole operation: no state change, no notification.
#[derive(Debug, Error)]
pub enum SuretyError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("system halted: ledger is not operational")]
    SystemHalted,

    #[error("no state change: {0}")]
    NoStateChange(String),

    #[error("airline already funded: {0}")]
    AlreadyFunded(Address),

    #[error("airline {voter} already voted for {candidate}")]
    AlreadyVoted { voter: Address, candidate: Address },

    #[error("airline already exists: {0}")]
    DuplicateAirline(Address),

    #[error("flight already registered: {0}")]
    DuplicateFlight(FlightCode),

    #[error("oracle already registered: {0}")]
    DuplicateOracle(Address),

    #[error("passenger {passenger} already holds an open policy on {code}")]
    DuplicatePolicy {
        passenger: Address,
        code: FlightCode,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("policy on {code} is not payable for {passenger}")]
    NotPayable {
        passenger: Address,
        code: FlightCode,
    },

    #[error("insufficient payment: required at least {required}, got {paid}")]
    InsufficientPayment { required: Wei, paid: Wei },

    #[error("excess payment: accepted at most {limit}, got {paid}")]
    ExcessPayment { limit: Wei, paid: Wei },

    #[error("flight {0} already has a resolved status")]
    FlightResolved(FlightCode),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SuretyError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SuretyResult<T> = Result<T, SuretyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_errors_show_bounds() {
        let err = SuretyError::InsufficientPayment {
            required: Wei::from_ether(1),
            paid: Wei(5),
        };
        let text = err.to_string();
        assert!(text.contains("1000000000000000000"));
        assert!(text.contains("5 wei"));
    }

    #[test]
    fn store_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: SuretyError = StoreError::from(io).into();
        assert!(matches!(err, SuretyError::Store(StoreError::Io(_))));
        assert!(err.to_string().contains("disk gone"));
    }
}
