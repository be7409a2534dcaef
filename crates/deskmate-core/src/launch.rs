use crate::{OsError, OsResult};

/// Hands a URI or file path to the desktop shell.
///
/// Used for the store-protocol launch and for opening the log file.
/// Fire-and-forget: success only means the shell accepted the request.
pub trait Launcher: Send + Sync {
    fn launch(&self, target: &str) -> OsResult<()>;
}

/// [`Launcher`] backed by the `open` crate (`ShellExecuteW` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenLauncher;

impl Launcher for OpenLauncher {
    fn launch(&self, target: &str) -> OsResult<()> {
        open::that_detached(target).map_err(OsError::from)
    }
}
