//! In-memory collaborators for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::launch::Launcher;
use crate::process::{ProcessEntry, ProcessTable};
use crate::supervisor::{Shutdown, TrayCommand, TrayControl, TrayLoop};
use crate::window::{WindowHandle, WindowSystem};
use crate::{OsError, OsResult};

// -- Clock --

/// Clock whose `sleep` advances virtual time instantly.
pub(crate) struct FakeClock {
    base: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.elapsed.lock().unwrap() += duration;
        std::thread::yield_now();
    }
}

// -- Processes --

struct FakeProcess {
    pid: u32,
    name: String,
    from: Duration,
    until: Option<Duration>,
    killed: bool,
}

/// Process table whose entries appear and vanish on the fake clock.
pub(crate) struct FakeProcesses {
    clock: Arc<FakeClock>,
    procs: Mutex<Vec<FakeProcess>>,
    kills: Mutex<Vec<u32>>,
}

impl FakeProcesses {
    pub(crate) fn new(clock: Arc<FakeClock>) -> Arc<Self> {
        Arc::new(Self {
            clock,
            procs: Mutex::new(Vec::new()),
            kills: Mutex::new(Vec::new()),
        })
    }

    /// Adds a process that is alive from the start.
    pub(crate) fn add(&self, pid: u32, name: &str) {
        self.add_between(pid, name, Duration::ZERO, None);
    }

    /// Adds a process that appears once `from` has elapsed and exits at
    /// `until`, if given.
    pub(crate) fn add_between(
        &self,
        pid: u32,
        name: &str,
        from: Duration,
        until: Option<Duration>,
    ) {
        self.procs.lock().unwrap().push(FakeProcess {
            pid,
            name: name.into(),
            from,
            until,
            killed: false,
        });
    }

    pub(crate) fn kills(&self) -> Vec<u32> {
        self.kills.lock().unwrap().clone()
    }

    fn alive(&self, p: &FakeProcess) -> bool {
        let now = self.clock.elapsed();
        !p.killed && p.from <= now && p.until.is_none_or(|u| now < u)
    }
}

impl ProcessTable for FakeProcesses {
    fn snapshot(&self) -> Vec<ProcessEntry> {
        let procs = self.procs.lock().unwrap();
        procs
            .iter()
            .filter(|p| self.alive(p))
            .map(|p| ProcessEntry {
                pid: p.pid,
                name: p.name.clone(),
            })
            .collect()
    }

    fn name_of(&self, pid: u32) -> Option<String> {
        let procs = self.procs.lock().unwrap();
        procs
            .iter()
            .find(|p| p.pid == pid && self.alive(p))
            .map(|p| p.name.clone())
    }

    fn kill(&self, pid: u32) -> bool {
        let mut procs = self.procs.lock().unwrap();
        let now = self.clock.elapsed();
        let Some(p) = procs.iter_mut().find(|p| {
            p.pid == pid && !p.killed && p.from <= now && p.until.is_none_or(|u| now < u)
        }) else {
            return false;
        };
        p.killed = true;
        self.kills.lock().unwrap().push(pid);
        true
    }
}

// -- Windows --

#[derive(Clone)]
pub(crate) struct FakeWindow {
    pub(crate) handle: WindowHandle,
    pub(crate) pid: u32,
    pub(crate) class: String,
    pub(crate) title: String,
    pub(crate) visible: bool,
    pub(crate) minimized: bool,
    pub(crate) ex_style: u32,
    pub(crate) parent: Option<WindowHandle>,
    pub(crate) closed: bool,
}

impl FakeWindow {
    pub(crate) fn new(handle: usize, pid: u32, class: &str) -> Self {
        Self {
            handle: WindowHandle(handle),
            pid,
            class: class.into(),
            title: String::new(),
            visible: true,
            minimized: false,
            ex_style: crate::window::ex_style::APP_WINDOW,
            parent: None,
            closed: false,
        }
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub(crate) fn minimized(mut self) -> Self {
        self.minimized = true;
        self
    }
}

/// Window system holding an explicitly ordered list of windows.
///
/// Every call is recorded by name so tests can assert ordering.
#[derive(Default)]
pub(crate) struct FakeWindows {
    windows: Mutex<Vec<FakeWindow>>,
    calls: Mutex<Vec<String>>,
    pub(crate) fail_enumeration: AtomicBool,
    pub(crate) fail_style_read: AtomicBool,
    /// Number of upcoming style reads that fail before reads succeed.
    pub(crate) style_read_failures: AtomicUsize,
    pub(crate) reject_parent: AtomicBool,
}

impl FakeWindows {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, window: FakeWindow) {
        self.windows.lock().unwrap().push(window);
    }

    pub(crate) fn get(&self, handle: usize) -> FakeWindow {
        self.windows
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.handle.0 == handle)
            .cloned()
            .expect("window exists")
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn with<T>(&self, handle: WindowHandle, f: impl FnOnce(&mut FakeWindow) -> T) -> OsResult<T> {
        let mut windows = self.windows.lock().unwrap();
        windows
            .iter_mut()
            .find(|w| w.handle == handle && !w.closed)
            .map(f)
            .ok_or_else(|| OsError::gone(format!("window {handle}")))
    }
}

impl WindowSystem for FakeWindows {
    fn top_level_windows(&self) -> OsResult<Vec<WindowHandle>> {
        self.record("enumerate");
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(OsError::call("EnumWindows", "access denied"));
        }
        Ok(self
            .windows
            .lock()
            .unwrap()
            .iter()
            .filter(|w| !w.closed)
            .map(|w| w.handle)
            .collect())
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        self.with(window, |w| w.visible).unwrap_or(false)
    }

    fn owner_pid(&self, window: WindowHandle) -> OsResult<u32> {
        self.with(window, |w| w.pid)
    }

    fn class_name(&self, window: WindowHandle) -> OsResult<String> {
        self.with(window, |w| w.class.clone())
    }

    fn title(&self, window: WindowHandle) -> OsResult<String> {
        self.with(window, |w| w.title.clone())
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        self.with(window, |w| w.minimized).unwrap_or(false)
    }

    fn restore(&self, window: WindowHandle) -> OsResult<()> {
        self.record("restore");
        self.with(window, |w| w.minimized = false)
    }

    fn show_no_activate(&self, window: WindowHandle) -> OsResult<()> {
        self.record("show");
        self.with(window, |w| w.visible = true)
    }

    fn ex_style(&self, window: WindowHandle) -> OsResult<u32> {
        self.record("get_style");
        let transient = self
            .style_read_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if transient || self.fail_style_read.load(Ordering::SeqCst) {
            return Err(OsError::call("GetWindowLongPtrW", "invalid window handle"));
        }
        self.with(window, |w| w.ex_style)
    }

    fn set_ex_style(&self, window: WindowHandle, style: u32) -> OsResult<()> {
        self.record("set_style");
        self.with(window, |w| w.ex_style = style)
    }

    fn find_by_class(&self, class: &str) -> Option<WindowHandle> {
        self.record(&format!("find:{class}"));
        self.windows
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.class == class && !w.closed)
            .map(|w| w.handle)
    }

    fn set_parent(&self, child: WindowHandle, parent: WindowHandle) -> OsResult<()> {
        self.record("set_parent");
        if self.reject_parent.load(Ordering::SeqCst) {
            return Err(OsError::call("SetParent", "access denied"));
        }
        self.with(child, |w| w.parent = Some(parent))
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        self.with(window, |_| ()).is_ok()
    }

    fn post_close(&self, window: WindowHandle) -> OsResult<()> {
        self.record("post_close");
        self.with(window, |w| w.closed = true)
    }
}

// -- Launcher --

#[derive(Default)]
pub(crate) struct FakeLauncher {
    launched: Mutex<Vec<String>>,
    pub(crate) fail: AtomicBool,
}

impl FakeLauncher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

impl Launcher for FakeLauncher {
    fn launch(&self, target: &str) -> OsResult<()> {
        self.launched.lock().unwrap().push(target.into());
        if self.fail.load(Ordering::SeqCst) {
            return Err(OsError::call("ShellExecuteW", "no association"));
        }
        Ok(())
    }
}

// -- Tray --

enum TrayMsg {
    Command(TrayCommand),
    Stop,
}

/// Tray stand-in: `run` blocks on a channel fed by queued menu commands
/// and by `stop()`.
pub(crate) struct FakeTray {
    rx: Receiver<TrayMsg>,
    control: Arc<FakeTrayControl>,
}

pub(crate) struct FakeTrayControl {
    tx: Mutex<Sender<TrayMsg>>,
    stopped: AtomicBool,
    pub(crate) stop_calls: AtomicUsize,
}

impl FakeTray {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            rx,
            control: Arc::new(FakeTrayControl {
                tx: Mutex::new(tx),
                stopped: AtomicBool::new(false),
                stop_calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Queues a menu click to be delivered once `run` starts.
    pub(crate) fn click(&self, command: TrayCommand) {
        let _ = self
            .control
            .tx
            .lock()
            .unwrap()
            .send(TrayMsg::Command(command));
    }

    pub(crate) fn fake_control(&self) -> Arc<FakeTrayControl> {
        self.control.clone()
    }
}

impl FakeTrayControl {
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl TrayControl for FakeTrayControl {
    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if !self.stopped.swap(true, Ordering::SeqCst) {
            let _ = self.tx.lock().unwrap().send(TrayMsg::Stop);
        }
    }
}

impl TrayLoop for FakeTray {
    fn control(&self) -> Arc<dyn TrayControl> {
        self.control.clone()
    }

    fn run(
        &mut self,
        dispatch: &mut dyn FnMut(TrayCommand) -> Option<Shutdown>,
    ) -> Option<Shutdown> {
        while let Ok(msg) = self.rx.recv_timeout(Duration::from_secs(10)) {
            match msg {
                TrayMsg::Command(command) => {
                    if let Some(shutdown) = dispatch(command) {
                        return Some(shutdown);
                    }
                }
                TrayMsg::Stop => return None,
            }
        }
        panic!("fake tray was never stopped");
    }
}
