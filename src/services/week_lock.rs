use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use super::calendar::week_anchor;

/// Serialises validate-then-write sequences for one worker's week within this process.
#[derive(Clone, Default)]
pub struct WeekLocks {
    locks: Arc<Mutex<HashMap<(Uuid, NaiveDate), Arc<AsyncMutex<()>>>>>,
}

impl WeekLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the Sunday-anchored weeks containing each of `dates`, in date order.
    pub async fn acquire(&self, user_id: Uuid, dates: &[NaiveDate]) -> Vec<OwnedMutexGuard<()>> {
        // The partial week at the start of the calendar shares one lock
        let mut anchors: Vec<NaiveDate> = dates
            .iter()
            .map(|date| week_anchor(*date).unwrap_or(NaiveDate::MIN))
            .collect();
        anchors.sort();
        anchors.dedup();

        let mut guards = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            let lock = self.lock_for(user_id, anchor);
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    fn lock_for(&self, user_id: Uuid, anchor: NaiveDate) -> Arc<AsyncMutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Drop locks nobody else holds a handle to
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry((user_id, anchor))
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[tokio::test]
    async fn same_week_is_exclusive() {
        let locks = WeekLocks::new();
        let user_id = Uuid::new_v4();
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let friday = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();

        let held = locks.acquire(user_id, &[monday]).await;
        let contender = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire(user_id, &[friday]),
        )
        .await;
        assert!(contender.is_err());

        drop(held);
        let acquired = locks.acquire(user_id, &[friday]).await;
        assert_eq!(acquired.len(), 1);
    }

    #[tokio::test]
    async fn different_weeks_and_users_do_not_block() {
        let locks = WeekLocks::new();
        let user_id = Uuid::new_v4();
        let this_week = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let next_week = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

        let _held = locks.acquire(user_id, &[this_week]).await;
        let other_week = locks.acquire(user_id, &[next_week]).await;
        let other_user = locks.acquire(Uuid::new_v4(), &[this_week]).await;

        assert_eq!(other_week.len(), 1);
        assert_eq!(other_user.len(), 1);
    }
}
