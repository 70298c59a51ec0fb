use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Sync,
    Search,
    ImageAudit,
}

/// Identifies one started operation. Completions are applied only while
/// their ticket is still the running one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    kind: OperationKind,
    generation: u64,
}

impl Ticket {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

/// In-flight guard for one operation kind: at most one running task, and a
/// generation counter so cancelled work cannot land late.
#[derive(Debug, Clone)]
pub struct TaskGuard {
    kind: OperationKind,
    next_generation: u64,
    running: Option<u64>,
}

impl TaskGuard {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            next_generation: 1,
            running: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// `None` while another task of this kind is still running.
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.running.is_some() {
            debug!(kind = ?self.kind, "operation already in flight");
            return None;
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.running = Some(generation);
        Some(Ticket {
            kind: self.kind,
            generation,
        })
    }

    /// Returns whether the result for `ticket` should be applied.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if ticket.kind == self.kind && self.running == Some(ticket.generation) {
            self.running = None;
            true
        } else {
            debug!(kind = ?ticket.kind, generation = ticket.generation, "dropping stale completion");
            false
        }
    }

    pub fn cancel(&mut self) -> Option<Ticket> {
        let generation = self.running.take()?;
        debug!(kind = ?self.kind, generation, "operation cancelled");
        Some(Ticket {
            kind: self.kind,
            generation,
        })
    }
}
