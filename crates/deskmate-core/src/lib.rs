pub mod clock;
pub mod config;
pub mod error;
pub mod launch;
pub mod locate;
pub mod log;
pub mod process;
pub mod reconcile;
pub mod supervisor;
pub mod window;

#[cfg(test)]
mod testing;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{OsError, OsResult};
pub use launch::{Launcher, OpenLauncher};
pub use locate::{WindowCandidate, WindowLocator};
pub use process::{ProcessEntry, ProcessTable, SystemProcesses};
pub use reconcile::WindowReconciler;
pub use supervisor::{Platform, Shutdown, Supervisor, TrayCommand, TrayControl, TrayLoop};
pub use window::{WindowHandle, WindowSystem};
