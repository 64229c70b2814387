use crate::error::{SuretyError, SuretyResult};
use crate::journal::Journal;
use serde::{Deserialize, Serialize};
use surety_types::Notification;
use tracing::info;

/// Global pause switch checked by every mutating operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalGate {
    operational: bool,
}

impl OperationalGate {
    pub fn new() -> Self {
        Self { operational: true }
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn require_operational(&self) -> SuretyResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::SystemHalted)
        }
    }

    /// Flip the switch. Requesting the current value is rejected with
    /// `NoStateChange` rather than accepted as a no-op.
    pub fn set_operational(&mut self, operational: bool, journal: &mut Journal) -> SuretyResult<()> {
        if self.operational == operational {
            return Err(SuretyError::NoStateChange(format!(
                "operational is already {}",
                operational
            )));
        }
        self.operational = operational;
        info!(operational, "Operational status changed");
        journal.emit(Notification::OperationalStatusChanged { operational });
        Ok(())
    }
}

impl Default for OperationalGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_operational() {
        let gate = OperationalGate::new();
        assert!(gate.is_operational());
        assert!(gate.require_operational().is_ok());
    }

    #[test]
    fn redundant_transition_is_rejected() {
        let mut gate = OperationalGate::new();
        let mut journal = Journal::new();
        assert!(matches!(
            gate.set_operational(true, &mut journal),
            Err(SuretyError::NoStateChange(_))
        ));
        gate.set_operational(false, &mut journal).unwrap();
        assert!(matches!(
            gate.require_operational(),
            Err(SuretyError::SystemHalted)
        ));
        assert!(matches!(
            gate.set_operational(false, &mut journal),
            Err(SuretyError::NoStateChange(_))
        ));
        gate.set_operational(true, &mut journal).unwrap();
        assert_eq!(journal.events().len(), 2);
    }
}
