//! Single-slot, self-expiring user notice.
//!
//! Only one message is ever shown: raising a new one replaces the text and
//! restarts the clock. Expiry is evaluated lazily against `tokio::time`, so a
//! caller that never polls still sees the message disappear on time, and
//! tests can drive it with `tokio::time::pause`/`advance`.

use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;

/// How long a notice stays visible unless configured otherwise.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Notice {
    // Cow avoids allocation for the static literals the reconciler raises
    message: Option<(Cow<'static, str>, Instant)>,
    ttl: Duration,
}

impl Default for Notice {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl Notice {
    pub fn new(ttl: Duration) -> Self {
        Self { message: None, ttl }
    }

    /// Show `text`, replacing any current message and restarting the timer.
    pub fn raise(&mut self, text: impl Into<Cow<'static, str>>) {
        let text = text.into();
        tracing::debug!(notice = %text, "Raising notice");
        self.message = Some((text, Instant::now()));
    }

    /// Clear the message early. No-op if nothing is showing.
    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn is_active(&self) -> bool {
        self.text().is_some()
    }

    /// The current message, or `None` if there is none or it has expired.
    pub fn text(&self) -> Option<&str> {
        match &self.message {
            Some((text, raised_at)) if raised_at.elapsed() < self.ttl => Some(text.as_ref()),
            _ => None,
        }
    }

    /// Drop the message if it has expired.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired(&mut self) -> bool {
        if let Some((_, raised_at)) = &self.message {
            if raised_at.elapsed() >= self.ttl {
                self.message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn test_notice_expires_after_3_seconds() {
        let mut notice = Notice::default();
        notice.raise("Unable to add a todo");
        assert_eq!(notice.text(), Some("Unable to add a todo"));

        time::advance(Duration::from_secs(2)).await;
        assert!(!notice.clear_expired());
        assert!(notice.is_active()); // Still present at 2s

        time::advance(Duration::from_secs(1)).await;
        assert!(!notice.is_active()); // Expired at 3s even without polling
        assert!(notice.clear_expired());
        assert!(!notice.clear_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_not_expired_before_3_seconds() {
        let mut notice = Notice::default();
        notice.raise("Test");

        time::advance(Duration::from_millis(2999)).await;
        assert!(!notice.clear_expired());
        assert!(notice.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_raise_replaces_text_and_restarts_timer() {
        let mut notice = Notice::default();
        notice.raise("first");

        time::advance(Duration::from_secs(2)).await;
        notice.raise("second");
        assert_eq!(notice.text(), Some("second"));

        time::advance(Duration::from_secs(2)).await;
        assert_eq!(notice.text(), Some("second")); // 4s after first, 2s after second

        time::advance(Duration::from_secs(1)).await;
        assert!(!notice.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl() {
        let mut notice = Notice::new(Duration::from_millis(500));
        notice.raise("short");
        time::advance(Duration::from_millis(500)).await;
        assert!(!notice.is_active());
    }

    #[test]
    fn test_dismiss_clears_active_notice() {
        let mut notice = Notice::default();
        notice.raise(String::from("owned text"));
        notice.dismiss();
        assert!(!notice.is_active());
        assert_eq!(notice.text(), None);
    }

    #[test]
    fn test_dismiss_when_inactive_is_noop() {
        let mut notice = Notice::default();
        notice.dismiss();
        notice.dismiss();
        assert!(!notice.is_active());
        assert!(!notice.clear_expired());
    }
}
