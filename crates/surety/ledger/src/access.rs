//! Owner and authorized-caller registry.

use crate::error::{SuretyError, SuretyResult};
use crate::journal::Journal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use surety_types::{Address, Notification};
use tracing::{info, warn};

/// Access control value consulted by every privileged operation.
///
/// The owner administers the ledger; authorized callers are the relays
/// allowed to submit operation envelopes on behalf of other senders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    authorized: BTreeSet<Address>,
}

impl AccessControl {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            authorized: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// A renounced ledger has no owner; nobody matches the null identity.
    pub fn is_owner(&self, caller: &Address) -> bool {
        !self.owner.is_zero() && *caller == self.owner
    }

    pub fn require_owner(&self, caller: &Address) -> SuretyResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            warn!(caller = %caller, "Rejected owner-only call");
            Err(SuretyError::unauthorized(format!(
                "{} is not the ledger owner",
                caller
            )))
        }
    }

    pub fn is_authorized(&self, caller: &Address) -> bool {
        self.authorized.contains(caller)
    }

    pub fn authorized_callers(&self) -> impl Iterator<Item = &Address> {
        self.authorized.iter()
    }

    /// Hand ownership to `new_owner`.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
        journal: &mut Journal,
    ) -> SuretyResult<()> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(SuretyError::invalid(
                "new owner must not be the null address; use renounce_ownership",
            ));
        }
        let previous = self.owner;
        self.owner = new_owner;
        info!(previous = %previous, new = %new_owner, "Ownership transferred");
        journal.emit(Notification::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        Ok(())
    }

    /// Give up ownership for good.
    ///
    /// IRREVERSIBLE: the owner becomes the null identity, so every
    /// owner-gated operation (pausing, parameter changes, caller
    /// authorization, ownership transfer) can never be invoked again.
    pub fn renounce_ownership(
        &mut self,
        caller: &Address,
        journal: &mut Journal,
    ) -> SuretyResult<()> {
        self.require_owner(caller)?;
        let previous = self.owner;
        self.owner = Address::ZERO;
        warn!(previous = %previous, "Ownership renounced; owner-gated operations are now unreachable");
        journal.emit(Notification::OwnershipTransferred {
            previous,
            new: Address::ZERO,
        });
        Ok(())
    }

    /// Authorize a relay. Returns whether the set changed; re-authorizing is
    /// a successful no-op.
    pub fn authorize_caller(
        &mut self,
        caller: &Address,
        relay: Address,
        journal: &mut Journal,
    ) -> SuretyResult<bool> {
        self.require_owner(caller)?;
        let changed = self.authorized.insert(relay);
        if changed {
            info!(relay = %relay, "Caller authorized");
            journal.emit(Notification::CallerAuthorized { caller: relay });
        }
        Ok(changed)
    }

    /// Deauthorize a relay. Returns whether the set changed.
    pub fn deauthorize_caller(
        &mut self,
        caller: &Address,
        relay: Address,
        journal: &mut Journal,
    ) -> SuretyResult<bool> {
        self.require_owner(caller)?;
        let changed = self.authorized.remove(&relay);
        if changed {
            info!(relay = %relay, "Caller deauthorized");
            journal.emit(Notification::CallerDeauthorized { caller: relay });
        }
        Ok(changed)
    }
}
