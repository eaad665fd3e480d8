/// Lifecycle of the round countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Expired,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was not running; nothing changed.
    Idle,
    Running,
    /// Remaining time hit zero on this tick. Returned once per countdown.
    Expired,
}

/// Millisecond countdown for one round.
#[derive(Debug, Clone)]
pub struct RoundTimer {
    state: TimerState,
    duration_ms: u64,
    remaining_ms: u64,
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            duration_ms: 0,
            remaining_ms: 0,
        }
    }

    /// Starts a fresh countdown, replacing whatever was running.
    pub fn start(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.remaining_ms = duration_ms;
        self.state = if duration_ms == 0 {
            TimerState::Expired
        } else {
            TimerState::Running
        };
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Idle;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(1);
        if self.remaining_ms == 0 {
            self.state = TimerState::Expired;
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    /// Applies `elapsed_ms` ticks, stopping early on expiry. Returns true if
    /// the countdown expired during this call.
    pub fn advance(&mut self, elapsed_ms: u64) -> bool {
        for _ in 0..elapsed_ms {
            match self.tick() {
                TickOutcome::Expired => return true,
                TickOutcome::Idle => return false,
                TickOutcome::Running => {}
            }
        }
        false
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Remaining time as a 0..=100 progress value.
    pub fn percent_remaining(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.remaining_ms as f64 / (self.duration_ms as f64 / 100.0)
    }
}
