/// How long a notification stays on screen.
pub const NOTIFICATION_LIFETIME_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NotificationKind::Error,
        }
    }
}

/// Holds at most one notification; a new post replaces the old one and
/// restarts the expiry clock.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    active: Option<(Notification, u64)>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, notification: Notification) {
        self.active = Some((notification, NOTIFICATION_LIFETIME_MS));
    }

    pub fn current(&self) -> Option<&Notification> {
        self.active.as_ref().map(|(n, _)| n)
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.active.as_ref().map(|(_, left)| *left)
    }

    pub fn tick(&mut self) {
        self.advance(1);
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        if let Some((_, left)) = self.active.as_mut() {
            *left = left.saturating_sub(elapsed_ms);
            if *left == 0 {
                self.active = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        let queue = NotificationQueue::new();
        assert!(queue.current().is_none());
    }

    #[test]
    fn clears_after_exactly_lifetime() {
        let mut queue = NotificationQueue::new();
        queue.post(Notification::success("+1 point"));
        queue.advance(NOTIFICATION_LIFETIME_MS - 1);
        assert_eq!(queue.current(), Some(&Notification::success("+1 point")));
        queue.tick();
        assert!(queue.current().is_none());
    }

    #[test]
    fn new_post_replaces_and_resets_expiry() {
        let mut queue = NotificationQueue::new();
        queue.post(Notification::success("+1 point"));
        queue.advance(1500);
        queue.post(Notification::error("too slow"));
        assert_eq!(queue.remaining_ms(), Some(NOTIFICATION_LIFETIME_MS));

        queue.advance(1500);
        assert_eq!(
            queue.current().map(|n| n.kind),
            Some(NotificationKind::Error)
        );
        queue.advance(500);
        assert!(queue.current().is_none());
    }

    #[test]
    fn clear_drops_active() {
        let mut queue = NotificationQueue::new();
        queue.post(Notification::error("x was wrong"));
        queue.clear();
        assert!(queue.current().is_none());
        assert_eq!(queue.remaining_ms(), None);
    }
}
