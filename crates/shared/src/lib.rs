//! Shared errors, configuration, and progress events for the
//! E-Boekhouden migration toolkit.

pub mod config;
pub mod error;
pub mod progress;

pub use config::{FeatureFlags, MigrationConfig, SourceConfig, TargetConfig};
pub use error::{MigrateError, MigrateResult};
pub use progress::{ChannelProgressBus, NullProgressBus, ProgressBus, ProgressEvent};
