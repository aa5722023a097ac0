// Public modules
pub mod command;
pub mod console;
pub mod error;
pub mod params;
pub mod remote;

// Re-export common types for convenience
pub use command::{
    execute, run, CommandOutput, ExecOptions, ExecValues, DEFAULT_IDLE_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS,
};
pub use console::{Color, Console};
pub use error::{Error, Result, TimeoutKind};
pub use params::{
    classify, load_str, reconcile, reconcile_titled, Reconciliation, TypeMismatch, ValueKind,
};
pub use remote::{execute_remote, RemoteConfig};
