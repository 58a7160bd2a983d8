//! Scheduled trigger: owns the recurring timer that drives cycles.
//!
//! ```text
//! Uninitialized ──initialize/set_schedule──▶ Scheduled(spec)
//!                                             │  ▲
//!                                set_schedule │  │ initialize / set_schedule
//!                                             ▼  │
//!                                Scheduled(spec')──stop──▶ Stopped
//! ```
//!
//! At most one timer is armed at any time: the slot lock is held while the old
//! timer is aborted and the new one spawned. The timer task only sleeps and
//! spawns cycles, so aborting it never cancels a cycle already in flight.

use linkpost_core::config::RunMode;
use linkpost_core::error::Result;
use linkpost_core::traits::ConfigStore;
use linkpost_core::types::CycleOutcome;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::clock::{Clock, SystemClock};
use crate::cycle::CycleRunner;
use crate::schedule::ScheduleSpec;

/// Who decides when cycles run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerMode {
    /// In-process timer.
    SelfScheduled,
    /// An outside cron calls `run_cycle`; no timers are armed.
    External,
}

impl From<RunMode> for TriggerMode {
    fn from(mode: RunMode) -> Self {
        match mode {
            RunMode::Standalone => TriggerMode::SelfScheduled,
            RunMode::Serverless => TriggerMode::External,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "schedule", rename_all = "camelCase")]
pub enum TriggerState {
    Uninitialized,
    Scheduled(ScheduleSpec),
    Stopped,
}

struct ActiveSchedule {
    spec: ScheduleSpec,
    handle: JoinHandle<()>,
}

struct Slot {
    state: TriggerState,
    active: Option<ActiveSchedule>,
}

pub struct ScheduledTrigger {
    mode: TriggerMode,
    runner: Arc<CycleRunner>,
    store: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    slot: Mutex<Slot>,
    armed: AtomicU64,
}

impl ScheduledTrigger {
    pub fn new(mode: TriggerMode, runner: Arc<CycleRunner>, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            mode,
            runner,
            store,
            clock: Arc::new(SystemClock),
            slot: Mutex::new(Slot {
                state: TriggerState::Uninitialized,
                active: None,
            }),
            armed: AtomicU64::new(0),
        }
    }

    /// Replace the wall clock the timer schedules against.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    pub fn runner(&self) -> &Arc<CycleRunner> {
        &self.runner
    }

    /// Arm the timer from the stored frequency. Failures are logged only.
    pub async fn initialize(&self) {
        if self.mode == TriggerMode::External {
            tracing::info!("🌐 External trigger mode — cycles run via the cron endpoint");
            return;
        }
        match self.store.get().await {
            Ok(config) => {
                self.set_schedule(config.post_frequency.label()).await;
            }
            Err(e) => tracing::error!("❌ Failed to initialize scheduler: {e}"),
        }
    }

    /// Replace the active schedule with the one for `frequency`.
    /// Returns the resolved schedule; in external mode nothing is armed.
    pub async fn set_schedule(&self, frequency: &str) -> ScheduleSpec {
        let spec = ScheduleSpec::from_label(frequency);
        if self.mode == TriggerMode::External {
            tracing::debug!("External trigger mode — ignoring schedule change to {}", spec.frequency);
            return spec;
        }

        let mut slot = self.slot.lock().await;
        if let Some(previous) = slot.active.take() {
            previous.handle.abort();
            tracing::info!("🛑 Cancelled {} schedule", previous.spec.frequency);
        }

        let handle = spawn_timer(spec, self.runner.clone(), self.clock.clone());
        slot.active = Some(ActiveSchedule { spec, handle });
        slot.state = TriggerState::Scheduled(spec);
        self.armed.fetch_add(1, Ordering::Relaxed);

        match spec.next_run(self.clock.now()) {
            Some(next) => tracing::info!(
                "📅 Scheduled {} posts ({}), next run {}",
                spec.frequency,
                spec.cron,
                next.to_rfc3339()
            ),
            None => tracing::warn!("⚠️ Schedule {} has no upcoming run", spec.cron),
        }
        spec
    }

    /// Cancel the active timer. Idempotent.
    pub async fn stop(&self) {
        if self.mode == TriggerMode::External {
            tracing::debug!("External trigger mode — nothing to stop");
            return;
        }
        self.clear_all_schedules().await;
    }

    /// Cancel every armed timer, returning how many were cancelled.
    pub async fn clear_all_schedules(&self) -> usize {
        let mut slot = self.slot.lock().await;
        let cancelled = match slot.active.take() {
            Some(active) => {
                active.handle.abort();
                tracing::info!("🛑 Scheduler stopped ({} schedule cleared)", active.spec.frequency);
                1
            }
            None => 0,
        };
        if slot.state != TriggerState::Uninitialized || cancelled > 0 {
            slot.state = TriggerState::Stopped;
        }
        cancelled
    }

    /// Run one cycle now, independent of any timer.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        self.runner.run_cycle().await
    }

    pub async fn state(&self) -> TriggerState {
        self.slot.lock().await.state
    }

    pub async fn active_schedule(&self) -> Option<ScheduleSpec> {
        self.slot.lock().await.active.as_ref().map(|a| a.spec)
    }

    /// Whether a timer task is currently alive.
    pub async fn is_armed(&self) -> bool {
        self.slot
            .lock()
            .await
            .active
            .as_ref()
            .is_some_and(|a| !a.handle.is_finished())
    }

    /// Total timers armed over the trigger's lifetime.
    pub fn armed_count(&self) -> u64 {
        self.armed.load(Ordering::Relaxed)
    }
}

fn spawn_timer(spec: ScheduleSpec, runner: Arc<CycleRunner>, clock: Arc<dyn Clock>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut after = clock.now();
        loop {
            let Some(next) = spec.next_run(after) else {
                tracing::error!("❌ No upcoming run for {}, timer exiting", spec.cron);
                return;
            };
            let wait = (next - clock.now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let runner = runner.clone();
            tokio::spawn(async move {
                fire(&runner).await;
            });
            after = next;
        }
    })
}

/// Run a cycle for a timer firing. Errors are logged and swallowed so the
/// schedule keeps going.
pub async fn fire(runner: &CycleRunner) -> Option<CycleOutcome> {
    match runner.run_cycle().await {
        Ok(outcome) => {
            tracing::info!(
                "✅ Scheduled cycle complete: '{}' (published: {})",
                outcome.topic,
                outcome.published
            );
            Some(outcome)
        }
        Err(e) => {
            tracing::error!("❌ Scheduled cycle error: {e}");
            None
        }
    }
}

impl Drop for ScheduledTrigger {
    fn drop(&mut self) {
        if let Some(active) = self.slot.get_mut().active.take() {
            active.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::cycle::tests::{CountingPublisher, runner};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use crate::schedule::{DAILY_CRON, MONTHLY_CRON, WEEKLY_CRON};
    use crate::store::UserConfigStore;
    use linkpost_core::types::{Frequency, UserConfigPatch};
    use std::sync::atomic::Ordering as AtomicOrdering;

    fn trigger(mode: TriggerMode, store: Arc<UserConfigStore>, publisher: Arc<CountingPublisher>) -> ScheduledTrigger {
        let runner = Arc::new(runner(store.clone(), publisher, true));
        ScheduledTrigger::new(mode, runner, store)
    }

    #[test]
    fn test_mode_from_run_mode() {
        assert_eq!(TriggerMode::from(RunMode::Standalone), TriggerMode::SelfScheduled);
        assert_eq!(TriggerMode::from(RunMode::Serverless), TriggerMode::External);
    }

    #[tokio::test]
    async fn test_initialize_uses_stored_frequency() {
        let store = Arc::new(UserConfigStore::in_memory());
        store
            .update(UserConfigPatch {
                post_frequency: Some(Frequency::Monthly),
                ..Default::default()
            })
            .await
            .unwrap();

        let t = trigger(TriggerMode::SelfScheduled, store, CountingPublisher::new(false));
        assert_eq!(t.state().await, TriggerState::Uninitialized);
        t.initialize().await;

        let active = t.active_schedule().await.unwrap();
        assert_eq!(active.cron, MONTHLY_CRON);
        assert!(t.is_armed().await);
    }

    #[tokio::test]
    async fn test_replacing_schedule_keeps_one_timer() {
        let store = Arc::new(UserConfigStore::in_memory());
        let t = trigger(TriggerMode::SelfScheduled, store, CountingPublisher::new(false));

        let daily = t.set_schedule("daily").await;
        assert_eq!(daily.cron, DAILY_CRON);
        let weekly = t.set_schedule("Weekly").await;
        assert_eq!(weekly.cron, WEEKLY_CRON);

        assert_eq!(t.active_schedule().await, Some(weekly));
        assert_eq!(t.state().await, TriggerState::Scheduled(weekly));
        assert_eq!(t.armed_count(), 2);
        assert_eq!(t.clear_all_schedules().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_frequency_is_weekly() {
        let store = Arc::new(UserConfigStore::in_memory());
        let t = trigger(TriggerMode::SelfScheduled, store, CountingPublisher::new(false));
        assert_eq!(t.set_schedule("every-other-tuesday").await.cron, WEEKLY_CRON);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_reinitialize_rearms() {
        let store = Arc::new(UserConfigStore::in_memory());
        let t = trigger(TriggerMode::SelfScheduled, store, CountingPublisher::new(false));

        t.initialize().await;
        t.stop().await;
        assert_eq!(t.state().await, TriggerState::Stopped);
        assert!(t.active_schedule().await.is_none());
        assert!(!t.is_armed().await);

        t.stop().await;
        assert_eq!(t.clear_all_schedules().await, 0);
        assert_eq!(t.state().await, TriggerState::Stopped);

        t.initialize().await;
        assert!(matches!(t.state().await, TriggerState::Scheduled(_)));
        assert_eq!(t.armed_count(), 2);
    }

    #[tokio::test]
    async fn test_external_mode_never_arms() {
        let store = Arc::new(UserConfigStore::in_memory());
        let publisher = CountingPublisher::new(false);
        let t = trigger(TriggerMode::External, store, publisher.clone());

        t.initialize().await;
        let spec = t.set_schedule("daily").await;
        assert_eq!(spec.cron, DAILY_CRON);
        assert_eq!(t.armed_count(), 0);
        assert!(t.active_schedule().await.is_none());
        t.stop().await;
        assert_eq!(t.state().await, TriggerState::Uninitialized);

        let outcome = t.run_cycle().await.unwrap();
        assert!(outcome.published);
        assert_eq!(publisher.calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fire_swallows_errors() {
        let store = Arc::new(UserConfigStore::in_memory());
        let failing = runner(store.clone(), CountingPublisher::new(true), true);
        assert!(fire(&failing).await.is_none());

        let ok = runner(store, CountingPublisher::new(false), false);
        assert!(fire(&ok).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_and_survives_failed_cycles() {
        let store = Arc::new(UserConfigStore::in_memory());
        let publisher = CountingPublisher::new(true);
        let monday_morning = Utc.with_ymd_and_hms(2026, 4, 13, 8, 14, 0).unwrap();
        let t = trigger(TriggerMode::SelfScheduled, store, publisher.clone())
            .with_clock(Arc::new(TokioClock::anchored_at(monday_morning)));

        t.set_schedule("daily").await;
        assert_eq!(publisher.calls.load(AtomicOrdering::SeqCst), 0);

        // 08:15 fires once; the publish fails.
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(publisher.calls.load(AtomicOrdering::SeqCst), 1);
        assert!(t.is_armed().await);

        // The next day's 08:15 still fires.
        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(publisher.calls.load(AtomicOrdering::SeqCst), 2);
        assert!(t.is_armed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_does_not_fire() {
        let store = Arc::new(UserConfigStore::in_memory());
        let publisher = CountingPublisher::new(false);
        let monday_morning = Utc.with_ymd_and_hms(2026, 4, 13, 8, 14, 0).unwrap();
        let t = trigger(TriggerMode::SelfScheduled, store, publisher.clone())
            .with_clock(Arc::new(TokioClock::anchored_at(monday_morning)));

        t.set_schedule("daily").await;
        t.stop().await;
        tokio::time::sleep(Duration::from_secs(2 * 24 * 60 * 60)).await;
        assert_eq!(publisher.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_state_json() {
        let json = serde_json::to_value(TriggerState::Stopped).unwrap();
        assert_eq!(json["state"], "stopped");
    }
}
