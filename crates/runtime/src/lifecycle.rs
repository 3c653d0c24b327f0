/// Session lifecycle: constructed once, ready once, disposed once.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Constructed,
    Ready,
    Disposed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: Lifecycle,
    pub to: Lifecycle,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid lifecycle transition {:?} -> {:?}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

impl Lifecycle {
    pub fn mark_ready(&mut self) -> Result<(), InvalidTransition> {
        self.transition(Lifecycle::Ready)
    }

    /// Disposing twice is allowed and does nothing the second time.
    pub fn dispose(&mut self) -> bool {
        let was_live = *self != Lifecycle::Disposed;
        *self = Lifecycle::Disposed;
        was_live
    }

    pub fn is_ready(self) -> bool {
        self == Lifecycle::Ready
    }

    pub fn is_disposed(self) -> bool {
        self == Lifecycle::Disposed
    }

    fn transition(&mut self, to: Lifecycle) -> Result<(), InvalidTransition> {
        let ok = matches!((*self, to), (Lifecycle::Constructed, Lifecycle::Ready));
        if !ok {
            return Err(InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Lifecycle;

    #[test]
    fn ready_only_once() {
        let mut l = Lifecycle::default();
        assert!(l.mark_ready().is_ok());
        assert!(l.mark_ready().is_err());
        assert!(l.is_ready());
    }

    #[test]
    fn disposed_is_terminal() {
        let mut l = Lifecycle::default();
        assert!(l.dispose());
        assert!(!l.dispose());
        assert!(l.mark_ready().is_err());
        assert!(l.is_disposed());
    }
}
