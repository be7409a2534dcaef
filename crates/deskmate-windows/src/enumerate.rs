use deskmate_core::{OsError, OsResult, WindowHandle};

use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::EnumWindows;
use windows::core::BOOL;

/// Lists every top-level window in `EnumWindows` order.
///
/// No filtering happens here: visibility and ownership are checked by the
/// locator so the same rules apply on every platform.
pub fn top_level_windows() -> OsResult<Vec<WindowHandle>> {
    let mut handles: Vec<WindowHandle> = Vec::new();

    // SAFETY: EnumWindows runs synchronously and calls the callback once
    // per window. The Vec pointer passed as LPARAM outlives the call.
    unsafe {
        EnumWindows(
            Some(collect_window),
            LPARAM(&mut handles as *mut _ as isize),
        )
        .map_err(|e| OsError::call("EnumWindows", e))?;
    }

    Ok(handles)
}

/// `EnumWindows` callback: pushes each handle and keeps going.
unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec pointer from top_level_windows().
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    handles.push(WindowHandle(hwnd.0 as usize));

    BOOL(1)
}
