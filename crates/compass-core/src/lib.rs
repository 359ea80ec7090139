//! # Daily Compass Core Library
//!
//! Records a once-a-day "compass bias" between two cities and derives what to
//! show about it. The CLI (and any other front end) is a thin layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Record**: the single persisted [`CompassRecord`]
//! - **Storage**: [`StateStore`] implementations and TOML [`Config`]
//! - **Lock Gate**: fixed-zone daily lock with a morning cutoff
//! - **Commit**: pure record transformation, rejected when the gate is closed
//! - **View**: bias, needle angle, daily quote/message, monthly summary
//! - **Render**: SVG dial and postcard
//!
//! ## Key Components
//!
//! - [`Compass`]: application instance over a store, a gate and a config
//! - [`LockGate`]: decides whether today's commit is open
//! - [`CompassView`]: everything a renderer needs

pub mod commit;
pub mod error;
pub mod gate;
pub mod messages;
pub mod record;
pub mod render;
pub mod service;
pub mod storage;
pub mod view;

pub use commit::commit;
pub use error::{CommitError, ConfigError, CoreError, LoadError, StoreError};
pub use gate::{GateStatus, LockGate};
pub use record::{CompassRecord, Position};
pub use service::Compass;
pub use storage::{Config, JsonFileStore, MemoryStore, StateStore};
pub use view::{Bias, BiasBands, CompassView, MonthlyOutcome, MonthlySummary};
