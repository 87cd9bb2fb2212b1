//! Periodic scan announcing tasks that are about to hit their deadline.

use crate::store::{EntityStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use taskdeck_core::Task;
use taskdeck_core::deadline::DUE_SOON_WINDOW;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

const DEADLINE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute] UTC");

/// Recurring reminder task sharing read access to the store.
pub struct ReminderScanner {
    store: Arc<dyn EntityStore>,
    interval: Duration,
}

impl ReminderScanner {
    /// Build a scanner ticking every `interval`.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run forever. A failed tick logs a warning; the next tick is scheduled
    /// independently and no state is mutated anywhere.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match scan_once(self.store.as_ref(), OffsetDateTime::now_utc()).await {
                Ok(due) => announce(&due),
                Err(err) => warn!(error = %err, "reminder scan failed"),
            }
        }
    }
}

/// Incomplete tasks whose deadline falls inside `[now, now + 24h]`, both
/// bounds inclusive. The same task is re-reported every tick until it is
/// completed, deleted, or its deadline leaves the window.
///
/// # Errors
/// Propagates the store failure of the underlying query.
pub async fn scan_once(
    store: &dyn EntityStore,
    now: OffsetDateTime,
) -> Result<Vec<Task>, StoreError> {
    store.tasks_due_between(now, now + DUE_SOON_WINDOW).await
}

fn announce(tasks: &[Task]) {
    for task in tasks {
        info!(
            title = %task.title,
            due = %format_deadline(task.max_end_date),
            "task deadline approaching"
        );
    }
}

/// Human-readable deadline used in reminder lines.
#[must_use]
pub fn format_deadline(ts: OffsetDateTime) -> String {
    ts.to_offset(time::UtcOffset::UTC)
        .format(DEADLINE_FORMAT)
        .unwrap_or_else(|_| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use taskdeck_core::TaskDraft;
    use time::Duration as TimeDuration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-06-01 12:00 UTC);

    async fn seed(store: &MemoryStore, title: &str, deadline: OffsetDateTime) -> taskdeck_core::Task {
        store
            .insert_task(TaskDraft {
                title: title.into(),
                kind: "Work".into(),
                max_end_date: deadline,
            })
            .await
            .expect("insert must succeed")
    }

    #[tokio::test]
    async fn scan_reports_only_incomplete_tasks_in_window() {
        let store = MemoryStore::default();
        seed(&store, "due in 2h", NOW + TimeDuration::hours(2)).await;
        seed(&store, "at lower bound", NOW).await;
        seed(&store, "at horizon", NOW + TimeDuration::hours(24)).await;
        seed(&store, "past", NOW - TimeDuration::hours(1)).await;
        seed(&store, "beyond", NOW + TimeDuration::hours(25)).await;
        let done = seed(&store, "done", NOW + TimeDuration::hours(3)).await;
        store
            .set_task_completed(done.id, true)
            .await
            .expect("toggle must succeed");

        let due = scan_once(&store, NOW).await.expect("scan must succeed");
        let titles: Vec<&str> = due.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["due in 2h", "at lower bound", "at horizon"]);
    }

    #[tokio::test]
    async fn scan_repeats_matches_across_ticks() {
        let store = MemoryStore::default();
        seed(&store, "due soon", NOW + TimeDuration::hours(1)).await;

        // No deduplication: the same task shows up on every tick.
        for _ in 0..2 {
            let due = scan_once(&store, NOW).await.expect("scan must succeed");
            assert_eq!(due.len(), 1);
        }
    }

    #[test]
    fn deadline_format_is_stable() {
        assert_eq!(format_deadline(NOW), "2025-06-01 12:00 UTC");
    }
}
