//! Win32 implementations of the DeskMate platform traits.
//!
//! Everything except icon decoding is Windows-only; on other targets the
//! crate only exposes [`icon`].

/// Tray icon pixel loading.
pub mod icon;

/// Win32 top-level window enumeration.
#[cfg(windows)]
pub mod enumerate;

/// Detached self-relaunch for restarts.
#[cfg(windows)]
pub mod relaunch;

/// System tray icon and its message pump.
#[cfg(windows)]
pub mod tray;

/// `WindowSystem` backed by `user32`.
#[cfg(windows)]
pub mod window;

#[cfg(windows)]
pub use tray::Tray;
#[cfg(windows)]
pub use window::Win32Windows;
