use deskmate_core::{OsError, OsResult, WindowHandle, WindowSystem};

use windows::Win32::Foundation::{GetLastError, HWND, LPARAM, SetLastError, WIN32_ERROR, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowW, GWL_EXSTYLE, GetWindowLongPtrW, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsIconic, IsWindow, IsWindowVisible, PostMessageW,
    RealGetWindowClassW, SW_RESTORE, SW_SHOWNOACTIVATE, SetParent, SetWindowLongPtrW,
    ShowWindow, WM_CLOSE,
};
use windows::core::PCWSTR;

use crate::enumerate;

/// [`WindowSystem`] backed by `user32`.
///
/// Stateless: every call goes straight to the OS with the raw handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Windows;

impl Win32Windows {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut _)
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Reads the thread's last error, treating `ERROR_SUCCESS` as `None`.
fn last_error() -> Option<WIN32_ERROR> {
    // SAFETY: GetLastError only reads thread-local state.
    let code = unsafe { GetLastError() };
    (code.0 != 0).then_some(code)
}

impl WindowSystem for Win32Windows {
    fn top_level_windows(&self) -> OsResult<Vec<WindowHandle>> {
        enumerate::top_level_windows()
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        // SAFETY: IsWindowVisible is a read-only query.
        unsafe { IsWindowVisible(hwnd(window)).as_bool() }
    }

    fn owner_pid(&self, window: WindowHandle) -> OsResult<u32> {
        let mut pid = 0u32;
        // SAFETY: pid is a valid out pointer for the duration of the call.
        let thread = unsafe { GetWindowThreadProcessId(hwnd(window), Some(&mut pid)) };
        if thread == 0 {
            return Err(OsError::gone(format!("window {window}")));
        }
        Ok(pid)
    }

    fn class_name(&self, window: WindowHandle) -> OsResult<String> {
        // 256 is the maximum class name length in Win32.
        let mut buffer = [0u16; 256];
        // SAFETY: RealGetWindowClassW writes at most buffer.len() chars.
        let length = unsafe { RealGetWindowClassW(hwnd(window), &mut buffer) };
        if length == 0 {
            return Err(OsError::gone(format!("window {window}")));
        }
        Ok(String::from_utf16_lossy(&buffer[..length as usize]))
    }

    fn title(&self, window: WindowHandle) -> OsResult<String> {
        // SAFETY: both calls only read the window text.
        unsafe {
            let length = GetWindowTextLengthW(hwnd(window));
            if length == 0 {
                return Ok(String::new());
            }
            let mut buffer = vec![0u16; (length + 1) as usize];
            let copied = GetWindowTextW(hwnd(window), &mut buffer);
            Ok(String::from_utf16_lossy(&buffer[..copied as usize]))
        }
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        // SAFETY: IsIconic is a read-only query.
        unsafe { IsIconic(hwnd(window)).as_bool() }
    }

    fn restore(&self, window: WindowHandle) -> OsResult<()> {
        if !self.is_window(window) {
            return Err(OsError::gone(format!("window {window}")));
        }
        // The return value is the previous visibility, not a status.
        unsafe {
            let _ = ShowWindow(hwnd(window), SW_RESTORE);
        }
        Ok(())
    }

    fn show_no_activate(&self, window: WindowHandle) -> OsResult<()> {
        if !self.is_window(window) {
            return Err(OsError::gone(format!("window {window}")));
        }
        unsafe {
            let _ = ShowWindow(hwnd(window), SW_SHOWNOACTIVATE);
        }
        Ok(())
    }

    fn ex_style(&self, window: WindowHandle) -> OsResult<u32> {
        // A zero style is legal, so failure is only visible through
        // the last error.
        // SAFETY: GetWindowLongPtrW reads window data; SetLastError
        // clears the thread-local error slot first.
        let style = unsafe {
            SetLastError(WIN32_ERROR(0));
            GetWindowLongPtrW(hwnd(window), GWL_EXSTYLE)
        };
        if style == 0
            && let Some(code) = last_error()
        {
            return Err(OsError::call(
                "GetWindowLongPtrW",
                format!("error code {}", code.0),
            ));
        }
        Ok(style as u32)
    }

    fn set_ex_style(&self, window: WindowHandle, style: u32) -> OsResult<()> {
        // SAFETY: as above; a zero previous value plus a set last error
        // means the write failed.
        let previous = unsafe {
            SetLastError(WIN32_ERROR(0));
            SetWindowLongPtrW(hwnd(window), GWL_EXSTYLE, style as isize)
        };
        if previous == 0
            && let Some(code) = last_error()
        {
            return Err(OsError::call(
                "SetWindowLongPtrW",
                format!("error code {}", code.0),
            ));
        }
        Ok(())
    }

    fn find_by_class(&self, class: &str) -> Option<WindowHandle> {
        let class = wide(class);
        // SAFETY: class is a null-terminated UTF-16 buffer that lives
        // for the duration of the call.
        let found = unsafe { FindWindowW(PCWSTR(class.as_ptr()), PCWSTR::null()) }.ok()?;
        (!found.is_invalid()).then(|| WindowHandle(found.0 as usize))
    }

    fn set_parent(&self, child: WindowHandle, parent: WindowHandle) -> OsResult<()> {
        // SAFETY: SetParent validates both handles and fails cleanly.
        unsafe { SetParent(hwnd(child), Some(hwnd(parent))) }
            .map(|_| ())
            .map_err(|e| OsError::call("SetParent", e))
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        // SAFETY: IsWindow accepts any handle value.
        unsafe { IsWindow(Some(hwnd(window))).as_bool() }
    }

    fn post_close(&self, window: WindowHandle) -> OsResult<()> {
        // SAFETY: PostMessageW queues WM_CLOSE without waiting for the
        // target thread.
        unsafe { PostMessageW(Some(hwnd(window)), WM_CLOSE, WPARAM(0), LPARAM(0)) }
            .map_err(|e| OsError::call("PostMessageW", e))
    }
}
