use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{TrustDbError, TrustDbResult};

/// Caller-supplied cancellation and deadline context for one store
/// operation.
///
/// The store has no internal threads; promptness comes from checking the
/// context at operation entry and again immediately before committing a
/// write. A fired context surfaces as [`TrustDbError::Cancelled`] or
/// [`TrustDbError::DeadlineExceeded`], never as an absent result.
#[derive(Clone, Debug, Default)]
pub struct OpCtx {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl OpCtx {
    /// A context that never fires. For bootstrap code and tests.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// A context driven by an external cancellation token, e.g. one tied to
    /// an RPC handler's lifetime.
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Attach a deadline to this context, keeping its cancellation token.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast if the context has fired.
    pub fn check(&self) -> TrustDbResult<()> {
        if self.cancel.is_cancelled() {
            return Err(TrustDbError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(TrustDbError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_never_fires() {
        assert!(OpCtx::background().check().is_ok());
    }

    #[test]
    fn cancelled_token_fires() {
        let token = CancellationToken::new();
        let ctx = OpCtx::with_cancel(token.clone());
        assert!(ctx.check().is_ok());

        token.cancel();
        assert!(matches!(ctx.check(), Err(TrustDbError::Cancelled)));
    }

    #[test]
    fn elapsed_deadline_fires() {
        let ctx = OpCtx::background().deadline_at(Instant::now() - Duration::from_secs(1));
        assert!(matches!(ctx.check(), Err(TrustDbError::DeadlineExceeded)));
    }

    #[test]
    fn future_deadline_does_not_fire() {
        let ctx = OpCtx::with_timeout(Duration::from_secs(60));
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = OpCtx::with_cancel(token).deadline_at(Instant::now() - Duration::from_secs(1));
        assert!(matches!(ctx.check(), Err(TrustDbError::Cancelled)));
    }
}
