//! Tray icon with the Restart / View Logs / Exit menu.
//!
//! The icon and the Win32 message pump live on the thread that built the
//! [`Tray`]. Menu clicks arrive on the `tray-icon` event channel while
//! messages are dispatched; [`TrayStopper`] posts `WM_QUIT` to the pump
//! from any thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use deskmate_core::config::TrayConfig;
use deskmate_core::{OsError, OsResult, Shutdown, TrayCommand, TrayControl, TrayLoop};
use tracing::{debug, info};
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, MSG, PostThreadMessageW, TranslateMessage, WM_QUIT,
};

use crate::icon::{self, ICON_SIZE};

/// Stops the tray pump by posting `WM_QUIT` to its thread. Only the first
/// call posts.
pub struct TrayStopper {
    thread_id: u32,
    stopped: AtomicBool,
}

impl TrayControl for TrayStopper {
    fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Stopping tray message pump");
        // SAFETY: posting to a thread id is harmless if the thread has
        // already exited; the call just fails.
        unsafe {
            let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
    }
}

/// The tray icon plus the ids of its menu items.
pub struct Tray {
    // Dropping the icon removes it from the notification area.
    _icon: TrayIcon,
    restart: MenuId,
    view_logs: MenuId,
    exit: MenuId,
    stopper: Arc<TrayStopper>,
}

impl Tray {
    /// Builds the icon on the current thread. [`TrayLoop::run`] must be
    /// called on this same thread.
    pub fn new(config: &TrayConfig) -> OsResult<Self> {
        let icon = Icon::from_rgba(icon::resolve_rgba(&config.icon), ICON_SIZE, ICON_SIZE)
            .map_err(|e| OsError::call("Icon::from_rgba", e))?;

        let menu = Menu::new();
        let restart = MenuItem::new("Restart DesktopMate", true, None);
        let view_logs = MenuItem::new("View Logs", true, None);
        let exit = MenuItem::new("Exit DesktopMate", true, None);
        menu.append_items(&[
            &restart,
            &view_logs,
            &PredefinedMenuItem::separator(),
            &exit,
        ])
        .map_err(|e| OsError::call("Menu::append_items", e))?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(&config.title)
            .with_icon(icon)
            .with_menu(Box::new(menu))
            .build()
            .map_err(|e| OsError::call("TrayIconBuilder::build", e))?;

        // SAFETY: GetCurrentThreadId has no preconditions.
        let thread_id = unsafe { GetCurrentThreadId() };
        info!("Tray icon created");

        Ok(Self {
            _icon: tray_icon,
            restart: restart.id().clone(),
            view_logs: view_logs.id().clone(),
            exit: exit.id().clone(),
            stopper: Arc::new(TrayStopper {
                thread_id,
                stopped: AtomicBool::new(false),
            }),
        })
    }

    fn command_for(&self, id: &MenuId) -> Option<TrayCommand> {
        if *id == self.restart {
            Some(TrayCommand::Restart)
        } else if *id == self.view_logs {
            Some(TrayCommand::ViewLogs)
        } else if *id == self.exit {
            Some(TrayCommand::Exit)
        } else {
            None
        }
    }
}

impl TrayLoop for Tray {
    fn control(&self) -> Arc<dyn TrayControl> {
        self.stopper.clone()
    }

    fn run(
        &mut self,
        dispatch: &mut dyn FnMut(TrayCommand) -> Option<Shutdown>,
    ) -> Option<Shutdown> {
        let mut msg = MSG::default();

        // GetMessageW returns FALSE on WM_QUIT.
        while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            while let Ok(event) = MenuEvent::receiver().try_recv() {
                let Some(command) = self.command_for(&event.id) else {
                    continue;
                };
                debug!(?command, "Tray menu clicked");
                if let Some(shutdown) = dispatch(command) {
                    return Some(shutdown);
                }
            }
        }
        None
    }
}
