//! Update detection for an installation pinned to a commit of a hosted branch.
//!
//! This crate holds everything that is independent of the host application:
//! - Remote identities and installed version metadata.
//! - The hosting API comparison client.
//! - Check scheduling, per-remote result caching and the error log.
//! - The session context exposing the startup and on-demand entry points.

mod checker;
mod compare;
pub mod error_log;
mod registry;
mod remote;
mod report;
mod schedule;
mod settings;
mod version;

/// Session context with the startup and on-demand check entry points.
pub use checker::{CheckError, StartupOutcome, UpdateChecker};
/// Hosting API comparison client and its result model.
pub use compare::{
    ClientBuildError, ClientConfig, CompareClient, CompareError, CompareOutcome, DEFAULT_API_BASE,
    parse_compare_response,
};
/// Keyed log of the latest failure per category.
pub use error_log::ErrorLog;
/// Latest comparison outcome per remote.
pub use registry::UpdateRegistry;
/// Owner/repository/branch triple and tree URL helpers.
pub use remote::{RemoteIdentity, RemoteParseError};
/// Plain-text rendering of the checker state.
pub use report::render_report;
/// Due-ness decisions for scheduled checks.
pub use schedule::{CheckAction, CheckSchedule, MAX_PERIOD_COMPONENT, SkipReason, maybe_check};
/// Settings schema persisted by the host.
pub use settings::UpdateCheckSettings;
/// Installed version metadata.
pub use version::{VersionRecord, VersionRecordError};
