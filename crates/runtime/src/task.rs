use futures_util::future::{AbortHandle, AbortRegistration};

/// Identifies one launch of a background task.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TaskTicket(u64);

/// Holds at most one in-flight background task.
///
/// Launching a new task aborts the previous one. A completion is only
/// accepted when it carries the current ticket and the slot was not
/// cancelled in the meantime, so late results from aborted or superseded
/// work are dropped instead of acting on a torn-down session.
#[derive(Debug, Default)]
pub struct TaskSlot {
    current: Option<(TaskTicket, AbortHandle)>,
    next: u64,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registration to wrap the task's future with
    /// (`futures_util::future::Abortable`) and the ticket to complete it with.
    pub fn launch(&mut self) -> (TaskTicket, AbortRegistration) {
        self.cancel();
        let (handle, registration) = AbortHandle::new_pair();
        let ticket = TaskTicket(self.next);
        self.next += 1;
        self.current = Some((ticket, handle));
        (ticket, registration)
    }

    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Consumes the slot entry if `ticket` is still current.
    pub fn complete(&mut self, ticket: TaskTicket) -> bool {
        match self.current {
            Some((t, _)) if t == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
