use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::storage::Storage;

use super::{due_reminders, Notifier};

/// A cloneable stop signal for a running scheduler.
#[derive(Debug, Clone, Default)]
pub struct SchedulerHandle {
    stop_signal: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl SchedulerHandle {
    /// Create a new handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the scheduler to stop.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }

    async fn stopped(&self) {
        while !self.should_stop() {
            self.wake.notified().await;
        }
    }
}

/// What one scheduler pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Reminders delivered.
    pub sent: usize,
    /// Missed entries written by the end-of-day sweep.
    pub swept: usize,
}

/// Timer-driven reminder loop for one user.
pub struct ReminderScheduler {
    storage: Storage,
    user_id: i64,
    notifier: Box<dyn Notifier>,
    interval: Duration,
    end_of_day: NaiveTime,
    fired: HashSet<(i64, NaiveDate)>,
    last_sweep: Option<NaiveDate>,
    handle: SchedulerHandle,
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("user_id", &self.user_id)
            .field("notifier", &self.notifier.name())
            .field("interval", &self.interval)
            .field("end_of_day", &self.end_of_day)
            .field("last_sweep", &self.last_sweep)
            .finish_non_exhaustive()
    }
}

impl ReminderScheduler {
    /// Create a scheduler for `user_id`.
    #[must_use]
    pub fn new(
        storage: Storage,
        user_id: i64,
        notifier: Box<dyn Notifier>,
        interval: Duration,
        end_of_day: NaiveTime,
    ) -> Self {
        Self {
            storage,
            user_id,
            notifier,
            interval,
            end_of_day,
            fired: HashSet::new(),
            last_sweep: None,
            handle: SchedulerHandle::new(),
        }
    }

    /// A handle that stops [`run`](Self::run).
    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Check for due reminders every interval until stopped.
    ///
    /// A failing pass is logged and the loop carries on.
    ///
    /// # Errors
    ///
    /// Currently always returns `Ok` once stopped.
    pub async fn run(mut self) -> Result<()> {
        info!(
            user_id = self.user_id,
            notifier = self.notifier.name(),
            interval_secs = self.interval.as_secs(),
            "Reminder scheduler started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let handle = self.handle.clone();

        loop {
            tokio::select! {
                () = handle.stopped() => break,
                _ = ticker.tick() => {
                    let now = Local::now().naive_local();
                    if let Err(e) = self.tick(now).await {
                        warn!("Reminder check failed: {}", e);
                    }
                }
            }
        }

        info!("Reminder scheduler stopped");
        Ok(())
    }

    /// Run one pass as of `now`: deliver due reminders that have not fired
    /// yet today, then run the end-of-day sweep if its time has come.
    ///
    /// # Errors
    ///
    /// Returns an error if loading medications or the sweep fails.
    /// Delivery failures are logged and retried on the next pass.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Result<TickOutcome> {
        let today = now.date();
        self.fired.retain(|(_, date)| *date == today);

        let medications = self.storage.medications_for_user(self.user_id)?;
        let mut outcome = TickOutcome::default();

        for reminder in due_reminders(&medications, now) {
            let key = (reminder.medication_id, reminder.date);
            if self.fired.contains(&key) {
                continue;
            }
            match self.notifier.notify(&reminder).await {
                Ok(()) => {
                    debug!(medication_id = reminder.medication_id, "Reminder sent");
                    self.fired.insert(key);
                    outcome.sent += 1;
                }
                Err(e) => warn!(
                    medication_id = reminder.medication_id,
                    "Failed to deliver reminder: {}", e
                ),
            }
        }

        if now.time() >= self.end_of_day && self.last_sweep != Some(today) {
            outcome.swept = self
                .storage
                .record_missing_as_missed(self.user_id, today, now)?;
            self.last_sweep = Some(today);
            info!(%today, marked = outcome.swept, "End-of-day sweep finished");
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::super::{ChannelNotifier, LogNotifier};
    use super::*;
    use crate::records::{MealTiming, MealType, NewMedication};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn eod() -> NaiveTime {
        NaiveTime::from_hms_opt(23, 59, 0).unwrap()
    }

    fn setup(times: &[(u32, u32)]) -> (Storage, i64, Vec<i64>) {
        let storage = Storage::open_in_memory().unwrap();
        let user = storage
            .insert_user("a@example.com", "+919876543210", "h", Utc::now())
            .unwrap();
        let ids = times
            .iter()
            .map(|&(h, m)| {
                storage
                    .insert_medication(
                        user.id,
                        &NewMedication {
                            name: format!("Med {h}{m}"),
                            dose: "5mg".to_string(),
                            time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
                            meal_type: MealType::Breakfast,
                            meal_timing: MealTiming::After,
                        },
                    )
                    .unwrap()
                    .id
            })
            .collect();
        (storage, user.id, ids)
    }

    #[tokio::test]
    async fn test_tick_sends_due_once_per_day() {
        let (storage, user, ids) = setup(&[(8, 0), (9, 0)]);
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        let mut scheduler = ReminderScheduler::new(
            storage,
            user,
            Box::new(notifier),
            Duration::from_secs(60),
            eod(),
        );

        let first = scheduler.tick(at(8, 0)).await.unwrap();
        assert_eq!(first.sent, 1);
        let reminder = rx.recv().await.unwrap();
        assert_eq!(reminder.medication_id, ids[0]);

        let again = scheduler
            .tick(at(8, 0) + chrono::Duration::seconds(30))
            .await
            .unwrap();
        assert_eq!(again.sent, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_tick_skips_taken_dose() {
        let (storage, user, ids) = setup(&[(8, 0)]);
        storage
            .record_dose(user, ids[0], at(8, 0).date(), true, at(7, 55))
            .unwrap();
        let (notifier, mut rx) = ChannelNotifier::channel(8);
        let mut scheduler = ReminderScheduler::new(
            storage,
            user,
            Box::new(notifier),
            Duration::from_secs(60),
            eod(),
        );

        assert_eq!(scheduler.tick(at(8, 0)).await.unwrap().sent, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_end_of_day_sweep_runs_once() {
        let (storage, user, ids) = setup(&[(8, 0), (20, 0)]);
        storage
            .record_dose(user, ids[0], at(8, 0).date(), true, at(8, 1))
            .unwrap();
        let mut scheduler = ReminderScheduler::new(
            storage,
            user,
            Box::new(LogNotifier),
            Duration::from_secs(60),
            eod(),
        );

        assert_eq!(scheduler.tick(at(23, 58)).await.unwrap().swept, 0);
        assert_eq!(scheduler.tick(at(23, 59)).await.unwrap().swept, 1);
        assert_eq!(scheduler.tick(at(23, 59)).await.unwrap().swept, 0);

        let meds = scheduler.storage.medications_for_user(user).unwrap();
        assert!(meds[0].taken_on(at(0, 0).date()));
        assert_eq!(
            meds[1].record_for(at(0, 0).date()).map(|r| r.taken),
            Some(false)
        );
    }

    #[tokio::test]
    async fn test_failed_delivery_retried() {
        crate::logging::init_test_logging();
        let (storage, user, _) = setup(&[(8, 0)]);
        let (notifier, rx) = ChannelNotifier::channel(1);
        drop(rx);
        let mut scheduler = ReminderScheduler::new(
            storage,
            user,
            Box::new(notifier),
            Duration::from_secs(60),
            eod(),
        );

        assert_eq!(scheduler.tick(at(8, 0)).await.unwrap().sent, 0);
        assert!(scheduler.fired.is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_signal() {
        let (storage, user, _) = setup(&[]);
        let scheduler = ReminderScheduler::new(
            storage,
            user,
            Box::new(LogNotifier),
            Duration::from_millis(10),
            eod(),
        );
        let handle = scheduler.handle();

        let task = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();

        let result = tokio::time::timeout(Duration::from_secs(2), task).await;
        assert!(result.unwrap().unwrap().is_ok());
        assert!(handle.should_stop());
    }

    #[test]
    fn test_handle_clone_shares_signal() {
        let handle = SchedulerHandle::new();
        let clone = handle.clone();
        assert!(!clone.should_stop());
        handle.stop();
        assert!(clone.should_stop());
    }
}
