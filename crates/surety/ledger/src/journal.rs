use surety_types::Notification;

/// Notifications raised by the operation currently being staged.
///
/// The journal is discarded with the staged state when the operation
/// fails, so nothing reaches the log unless the operation commits.
#[derive(Debug, Default)]
pub struct Journal {
    events: Vec<Notification>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, notification: Notification) {
        self.events.push(notification);
    }

    pub fn events(&self) -> &[Notification] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Notification> {
        self.events
    }
}
