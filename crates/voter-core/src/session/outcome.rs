//! Result of one vote attempt and its human-readable verdict.

use std::time::Duration;

/// `success` only means the vote endpoint answered with a non-empty body.
/// Whether the vote was counted is a separate signal, see [`VoteOutcome::counted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub success: bool,
    pub count_before: i64,
    pub count_after: i64,
}

impl VoteOutcome {
    /// Counter went up between the two reads.
    pub fn counted(&self) -> bool {
        self.count_after > self.count_before
    }

    pub fn difference(&self) -> i64 {
        self.count_after - self.count_before
    }

    /// One line combining both signals for the operator.
    pub fn verdict_line(&self) -> String {
        let counts = format!("{} -> {}", self.count_before, self.count_after);
        match (self.success, self.counted()) {
            (true, true) => format!("vote successful ({counts})"),
            (false, _) => format!("vote failed: empty response ({counts})"),
            (true, false) => format!("vote failed: count unchanged ({counts})"),
        }
    }
}

/// Seconds below two minutes, minutes otherwise.
pub fn format_wait(wait: Duration) -> String {
    let secs = wait.as_secs_f64();
    if secs < 120.0 {
        format!("{secs:.0} seconds")
    } else {
        format!("{:.1} minutes", secs / 60.0)
    }
}
