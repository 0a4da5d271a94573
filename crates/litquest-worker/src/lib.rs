//! # litquest-worker
//!
//! Scheduled maintenance for the LitQuest notification service. Currently
//! a single cron job: the retention sweep that purges old read
//! notifications.

pub mod jobs;
pub mod scheduler;

pub use scheduler::CronScheduler;
