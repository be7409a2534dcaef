use std::fmt;

use crate::OsResult;

/// Opaque reference to a top-level OS window.
///
/// Holds the raw `HWND` value as a pointer-sized integer so the core
/// crate does not depend on any platform bindings. Handles are only
/// meaningful for the launch cycle that discovered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Extended window style bits touched by the reconciler.
pub mod ex_style {
    /// `WS_EX_APPWINDOW`: forces a taskbar button.
    pub const APP_WINDOW: u32 = 0x0004_0000;
    /// `WS_EX_TOOLWINDOW`: no taskbar button, hidden from Alt+Tab.
    pub const TOOL_WINDOW: u32 = 0x0000_0080;
    /// `WS_EX_NOACTIVATE`: never takes focus when shown or clicked.
    pub const NO_ACTIVATE: u32 = 0x0800_0000;

    /// Turns `current` into the overlay style: off the taskbar, out of
    /// the task switcher and unable to steal focus.
    ///
    /// Idempotent: applying it to its own output yields the same bits.
    pub const fn overlay(current: u32) -> u32 {
        (current & !APP_WINDOW) | TOOL_WINDOW | NO_ACTIVATE
    }

    /// Returns whether `style` already carries the overlay bits.
    pub const fn is_overlay(style: u32) -> bool {
        style & APP_WINDOW == 0 && style & TOOL_WINDOW != 0 && style & NO_ACTIVATE != 0
    }
}

/// Window-system operations the locator, reconciler and supervisor need.
///
/// Each platform crate provides its own implementation. Queries on a
/// window that has disappeared return `false`/an error rather than
/// panicking.
pub trait WindowSystem: Send + Sync {
    /// Lists every top-level window in OS enumeration order.
    fn top_level_windows(&self) -> OsResult<Vec<WindowHandle>>;

    fn is_visible(&self, window: WindowHandle) -> bool;

    /// Returns the PID of the process that owns `window`.
    fn owner_pid(&self, window: WindowHandle) -> OsResult<u32>;

    fn class_name(&self, window: WindowHandle) -> OsResult<String>;

    fn title(&self, window: WindowHandle) -> OsResult<String>;

    fn is_minimized(&self, window: WindowHandle) -> bool;

    /// Restores a minimized window to its normal size.
    fn restore(&self, window: WindowHandle) -> OsResult<()>;

    /// Shows the window without activating it.
    fn show_no_activate(&self, window: WindowHandle) -> OsResult<()>;

    /// Reads the extended style bitmask.
    fn ex_style(&self, window: WindowHandle) -> OsResult<u32>;

    /// Writes the extended style bitmask.
    fn set_ex_style(&self, window: WindowHandle, style: u32) -> OsResult<()>;

    /// Finds the first top-level window with the given class name.
    fn find_by_class(&self, class: &str) -> Option<WindowHandle>;

    /// Makes `parent` the parent window of `child`.
    fn set_parent(&self, child: WindowHandle, parent: WindowHandle) -> OsResult<()>;

    /// Returns whether the handle still identifies an existing window.
    fn is_window(&self, window: WindowHandle) -> bool;

    /// Posts `WM_CLOSE` so the window can shut down on its own terms.
    fn post_close(&self, window: WindowHandle) -> OsResult<()>;
}
