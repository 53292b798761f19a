//! Continuous mode: pull outcomes forever, pacing with the vote interval.

use super::{VoteError, VoteOutcome};
use crate::cancel::Sleeper;
use std::time::Duration;

/// Pulls from `outcomes` until cancelled, sleeping `interval` after every
/// attempt. Errors other than cancellation are logged and the loop goes on.
///
/// Returns `VoteError::Cancelled` on interrupt, or `VoteError::SequenceEnded`
/// once `outcomes` runs dry, which a vote session does after a fatal error.
pub fn run_continuous<I, S, F>(
    outcomes: I,
    sleeper: &S,
    interval: Duration,
    mut on_outcome: F,
) -> Result<(), VoteError>
where
    I: IntoIterator<Item = Result<VoteOutcome, VoteError>>,
    S: Sleeper + ?Sized,
    F: FnMut(&VoteOutcome),
{
    let mut outcomes = outcomes.into_iter();
    loop {
        match outcomes.next() {
            Some(Ok(outcome)) => {
                tracing::info!(
                    count_before = outcome.count_before,
                    count_after = outcome.count_after,
                    success = outcome.success,
                    "watch iteration finished"
                );
                on_outcome(&outcome);
            }
            Some(Err(e)) if e.is_cancelled() => return Err(e),
            Some(Err(e)) => {
                tracing::error!(error = %e, "vote attempt failed");
            }
            None => {
                tracing::error!(critical = true, "vote sequence ended unexpectedly");
                return Err(VoteError::SequenceEnded);
            }
        }
        sleeper.sleep(interval)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSleeper;

    fn ok(before: i64, after: i64) -> Result<VoteOutcome, VoteError> {
        Ok(VoteOutcome {
            success: true,
            count_before: before,
            count_after: after,
        })
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let items = vec![
            ok(1, 2),
            Err(VoteError::CountNotFound {
                url: "http://site/count".into(),
            }),
            ok(2, 3),
            Err(VoteError::Cancelled),
        ];
        let sleeper = RecordingSleeper::new();
        let mut seen = Vec::new();
        let err = run_continuous(items, &sleeper, Duration::from_secs(5), |o| {
            seen.push(o.count_after)
        })
        .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(seen, vec![2, 3]);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(5); 3]);
    }

    #[test]
    fn ended_sequence_is_reported() {
        let sleeper = RecordingSleeper::new();
        let err = run_continuous(vec![ok(1, 1)], &sleeper, Duration::from_secs(1), |_| {})
            .unwrap_err();
        assert!(matches!(err, VoteError::SequenceEnded));
    }

    #[test]
    fn cancelled_interval_sleep_stops_the_loop() {
        let sleeper = RecordingSleeper::cancel_after(1);
        let items = std::iter::repeat_with(|| ok(1, 2));
        let err = run_continuous(items, &sleeper, Duration::from_secs(1), |_| {}).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(sleeper.sleeps().len(), 1);
    }
}
