//! # LinkPost Scheduler
//!
//! Decides *when* posts are generated and owns the user preferences they are
//! generated from.
//!
//! ## Architecture
//! ```text
//! ScheduledTrigger (tokio timer, one armed at a time)
//!   ├── SelfScheduled: postFrequency → ScheduleSpec → cron → sleep → fire
//!   ├── External:      POST /api/cron/scheduled-post → run_cycle
//!   └── CycleRunner
//!         ├── UserConfigStore (userConfig.json | memory)
//!         ├── select_topic (uniform random)
//!         ├── PostComposer → ContentGenerator chain
//!         └── Publisher (when auto-publish is on)
//! ```

pub mod clock;
pub mod cron;
pub mod cycle;
pub mod schedule;
pub mod store;
pub mod trigger;

pub use clock::{Clock, SystemClock, TokioClock};
pub use cron::{CronSchedule, next_run_from_cron};
pub use cycle::{CycleRunner, select_topic};
pub use schedule::ScheduleSpec;
pub use store::UserConfigStore;
pub use trigger::{ScheduledTrigger, TriggerMode, TriggerState};
