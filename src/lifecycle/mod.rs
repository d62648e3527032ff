//! Match lifecycle: creation, prediction window, result recording, deletion.

mod manager;
mod resolution;
mod settings;

pub use manager::LifecycleManager;
pub use settings::GameSettings;
