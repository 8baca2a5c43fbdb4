//! # Upload Engine
//!
//! Reconciles a cloud folder tree of video files against a channel's
//! published uploads, then uploads whatever is missing through resumable
//! chunked sessions. After each confirmed upload a post-upload action marks
//! the source file so the next run skips it; every processed file gets one
//! append-only run log entry.
//!
//! The engine is deliberately stateless between runs: the source tree and
//! the channel inventory are the only state, re-read in full every run, so
//! interrupted or repeated invocations converge instead of duplicating.

pub mod coordinator;
pub mod error;
pub mod inventory;
pub mod post_action;
pub mod reconcile;
pub mod run_log;
pub mod scanner;
pub mod task;
pub mod uploader;

pub use coordinator::{RunSummary, UploadCoordinator};
pub use error::{Result, UploadError};
pub use inventory::{fetch_inventory, ChannelInventory};
pub use reconcile::{candidate_key, reconcile, Reconciliation};
pub use scanner::{ScanReport, Scanner};
pub use task::{build_task, UploadTask};
pub use uploader::Uploader;
