//! Sequence-numbered write permits.
//!
//! Every write of derived session state takes a [`Ticket`] first. A write is
//! admitted only if its ticket is newer than the last admitted one, so a slow
//! response can never overwrite a fresher one.

/// A write permit; higher numbers were issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Sequencer {
    issued: u64,
    applied: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Record `ticket` as applied if nothing newer has been applied yet.
    pub fn admit(&mut self, ticket: Ticket) -> bool {
        if ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }

    /// Sequence number of the last admitted ticket, `0` if none.
    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}
