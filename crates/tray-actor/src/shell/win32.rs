//! Win32 implementation of the shell backend.
//!
//! Owns a message-only window, the `Shell_NotifyIconW` tray entry, the
//! popup menu, and the installed icon. Everything here runs on the
//! actor's thread; only [`Win32Waker`] crosses threads, and it does so
//! by posting into the window's message queue.

use crate::{
    TrayError, TrayResult,
    request::PumpEvent,
    shell::{ShellBackend, ShellEvent, ShellWaker},
    text,
};

use std::cell::Cell;
use std::io::Write;
use std::iter::once;
use std::mem::size_of;
use std::os::windows::ffi::OsStrExt;
use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, error, warn};
use windows::{
    Win32::{
        Foundation::{
            ERROR_CLASS_ALREADY_EXISTS, GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, POINT,
            WPARAM,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            HiDpi::{DPI_AWARENESS_CONTEXT_SYSTEM_AWARE, SetThreadDpiAwarenessContext},
            Shell::{
                NIF_ICON, NIF_INFO, NIF_MESSAGE, NIF_SHOWTIP, NIF_TIP, NIM_ADD, NIM_DELETE,
                NIM_MODIFY, NIM_SETVERSION, NOTIFY_ICON_MESSAGE, NOTIFYICON_VERSION_4,
                NOTIFYICONDATAW, NOTIFYICONDATAW_0, Shell_NotifyIconW,
            },
            WindowsAndMessaging::{
                AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyIcon,
                DestroyMenu, DestroyWindow, DispatchMessageW, GetCursorPos, GetMessageW,
                GetSystemMetrics, HICON, HMENU, HWND_MESSAGE, IMAGE_ICON, LR_DEFAULTSIZE,
                LR_LOADFROMFILE, LoadImageW, MF_SEPARATOR, MF_STRING, MSG, PostMessageW,
                RegisterClassW, SM_MENUDROPALIGNMENT, SetForegroundWindow, TPM_LEFTALIGN,
                TPM_RETURNCMD, TPM_RIGHTALIGN, TrackPopupMenu, TranslateMessage, WINDOW_EX_STYLE,
                WINDOW_STYLE, WM_APP, WM_RBUTTONUP, WNDCLASSW,
            },
        },
    },
    core::PCWSTR, core::w,
};

/// Tray-entry callback message from the shell.
const WMAPP_NOTIFYCALLBACK: u32 = WM_APP + 1;
/// A caller enqueued one request on the mailbox.
const WMAPP_REQUEST: u32 = WM_APP + 2;
/// A caller asked for teardown.
const WMAPP_SHUTDOWN: u32 = WM_APP + 3;

/// Per-window tray-entry identifier. The shell requires uniqueness only
/// within the owning window, and each backend owns a private window.
const TRAY_ICON_ID: u32 = 1;

const CLASS_NAME: PCWSTR = w!("TrayActorMessageWindow");

thread_local! {
    // Wake-ups the menu's modal loop dispatched to the window
    // procedure instead of our pump; replayed once the menu closes.
    // One shell per thread: each actor owns its own pump thread.
    static DEFERRED_REQUESTS: Cell<u32> = const { Cell::new(0) };
    static DEFERRED_SHUTDOWN: Cell<bool> = const { Cell::new(false) };
}

/// Native tray state for one actor. Not `Send`; lives and dies on the
/// actor's thread.
pub(crate) struct Win32Shell {
    hwnd: HWND,
    hmenu: HMENU,
    icon: Option<HICON>,
}

impl Win32Shell {
    /// Creates the hidden window, registers the tray entry, and opts
    /// the calling thread into system DPI awareness. Must be called on
    /// the thread that will pump messages.
    pub(crate) fn new() -> TrayResult<Self> {
        unsafe {
            // Shell metrics come back wrong on Windows 10+ without this.
            let _ = SetThreadDpiAwarenessContext(DPI_AWARENESS_CONTEXT_SYSTEM_AWARE);

            let hinstance: HINSTANCE = GetModuleHandleW(None)
                .map_err(|e| native_rejected("GetModuleHandleW", &e))?
                .into();

            register_window_class(hinstance)?;

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                CLASS_NAME,
                w!("tray-actor"),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                Some(HWND_MESSAGE),
                None,
                Some(hinstance),
                None,
            )
            .map_err(|e| native_rejected("CreateWindowExW", &e))?;

            let hmenu = match CreatePopupMenu() {
                Ok(hmenu) => hmenu,
                Err(e) => {
                    let _ = DestroyWindow(hwnd);
                    return Err(native_rejected("CreatePopupMenu", &e));
                }
            };

            let shell = Self {
                hwnd,
                hmenu,
                icon: None,
            };

            if let Err(e) = shell.add_tray_entry() {
                let _ = DestroyMenu(hmenu);
                let _ = DestroyWindow(hwnd);
                return Err(e);
            }

            debug!(hwnd = hwnd.0 as isize, "tray window created");

            Ok(shell)
        }
    }

    /// Registers the tray entry and opts into version-4 callback
    /// messages, which carry the activation event in the lparam low
    /// word.
    fn add_tray_entry(&self) -> TrayResult<()> {
        let nid = NOTIFYICONDATAW {
            uFlags: NIF_MESSAGE,
            uCallbackMessage: WMAPP_NOTIFYCALLBACK,
            ..self.base_entry()
        };
        self.notify(NIM_ADD, &nid, "Shell_NotifyIconW(NIM_ADD)")?;

        let nid = NOTIFYICONDATAW {
            Anonymous: NOTIFYICONDATAW_0 {
                uVersion: NOTIFYICON_VERSION_4,
            },
            ..self.base_entry()
        };
        if let Err(e) = self.notify(NIM_SETVERSION, &nid, "Shell_NotifyIconW(NIM_SETVERSION)") {
            // Pre-Vista shells reject this; the entry still works with
            // the legacy callback format we match on.
            warn!(error = %e, "could not set notify icon version");
        }

        Ok(())
    }

    fn base_entry(&self) -> NOTIFYICONDATAW {
        NOTIFYICONDATAW {
            cbSize: size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.hwnd,
            uID: TRAY_ICON_ID,
            ..Default::default()
        }
    }

    fn notify(
        &self,
        action: NOTIFY_ICON_MESSAGE,
        nid: &NOTIFYICONDATAW,
        call: &'static str,
    ) -> TrayResult<()> {
        if unsafe { Shell_NotifyIconW(action, nid) }.as_bool() {
            Ok(())
        } else {
            Err(native_rejected(call, &windows::core::Error::from_thread()))
        }
    }

    /// Re-posts wake-ups the window procedure recorded while a modal
    /// menu loop owned the message queue. Requests go first, shutdown
    /// last, preserving the order a caller could have observed.
    fn replay_deferred_wakeups(&self) {
        let requests = DEFERRED_REQUESTS.take();
        let shutdown = DEFERRED_SHUTDOWN.take();
        if requests == 0 && !shutdown {
            return;
        }

        debug!(requests, shutdown, "replaying wake-ups deferred by the menu");
        let waker = Win32Waker {
            hwnd: self.hwnd.0 as isize,
        };
        for _ in 0..requests {
            waker.post(PumpEvent::Request);
        }
        if shutdown {
            waker.post(PumpEvent::Shutdown);
        }
    }
}

impl ShellBackend for Win32Shell {
    fn waker(&self) -> Box<dyn ShellWaker> {
        Box::new(Win32Waker {
            hwnd: self.hwnd.0 as isize,
        })
    }

    fn next_event(&mut self) -> ShellEvent {
        let mut msg = MSG::default();
        loop {
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => return ShellEvent::Quit,
                -1 => {
                    error!(
                        error = %windows::core::Error::from_thread(),
                        "GetMessageW failed"
                    );
                    continue;
                }
                _ => {}
            }

            if msg.hwnd == self.hwnd {
                match msg.message {
                    WMAPP_REQUEST => return ShellEvent::Request,
                    WMAPP_SHUTDOWN => return ShellEvent::Quit,
                    WMAPP_NOTIFYCALLBACK if loword(msg.lParam) == WM_RBUTTONUP => {
                        return ShellEvent::MenuActivated;
                    }
                    _ => {}
                }
            }

            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn set_icon(&mut self, bytes: &[u8]) -> TrayResult<()> {
        // The shell image loader only reads files, so the bytes take a
        // round trip through a temp file. The guard removes it on every
        // exit path below.
        let mut file = tempfile::Builder::new().suffix(".ico").tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        let path: Vec<u16> = file.path().as_os_str().encode_wide().chain(once(0)).collect();
        let handle = unsafe {
            LoadImageW(
                None,
                PCWSTR(path.as_ptr()),
                IMAGE_ICON,
                0,
                0,
                LR_DEFAULTSIZE | LR_LOADFROMFILE,
            )
        }
        .map_err(|e| TrayError::IconLoadFailed {
            reason: e.message(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let hicon = HICON(handle.0);

        let nid = NOTIFYICONDATAW {
            uFlags: NIF_ICON,
            hIcon: hicon,
            ..self.base_entry()
        };
        if let Err(e) = self.notify(NIM_MODIFY, &nid, "Shell_NotifyIconW(NIM_MODIFY)") {
            // The previous icon stays installed and untouched.
            unsafe {
                let _ = DestroyIcon(hicon);
            }
            return Err(e);
        }

        if let Some(old) = self.icon.replace(hicon) {
            unsafe {
                let _ = DestroyIcon(old);
            }
        }

        Ok(())
    }

    fn set_tooltip(&mut self, text: &str) -> TrayResult<()> {
        let mut nid = NOTIFYICONDATAW {
            uFlags: NIF_TIP | NIF_SHOWTIP,
            ..self.base_entry()
        };
        text::copy_truncated(&mut nid.szTip, text)?;
        self.notify(NIM_MODIFY, &nid, "Shell_NotifyIconW(NIM_MODIFY)")
    }

    fn append_menu_item(&mut self, id: u32, text: &str) -> TrayResult<()> {
        let wide = text::to_wide(text)?;
        unsafe { AppendMenuW(self.hmenu, MF_STRING, id as usize, PCWSTR(wide.as_ptr())) }
            .map_err(|e| native_rejected("AppendMenuW", &e))
    }

    fn append_separator(&mut self) -> TrayResult<()> {
        unsafe { AppendMenuW(self.hmenu, MF_SEPARATOR, 0, None) }
            .map_err(|e| native_rejected("AppendMenuW", &e))
    }

    fn show_notification(&mut self, body: &str, title: &str) -> TrayResult<()> {
        let mut nid = NOTIFYICONDATAW {
            uFlags: NIF_INFO,
            ..self.base_entry()
        };
        text::copy_truncated(&mut nid.szInfo, body)?;
        text::copy_truncated(&mut nid.szInfoTitle, title)?;
        self.notify(NIM_MODIFY, &nid, "Shell_NotifyIconW(NIM_MODIFY)")
    }

    fn show_menu(&mut self) -> u32 {
        unsafe {
            let mut pt = POINT::default();
            if let Err(e) = GetCursorPos(&mut pt) {
                warn!(error = %e, "GetCursorPos failed, menu opens at origin");
            }

            // Required for the menu to dismiss when clicking elsewhere.
            let _ = SetForegroundWindow(self.hwnd);

            let align = if GetSystemMetrics(SM_MENUDROPALIGNMENT) == 0 {
                TPM_LEFTALIGN
            } else {
                TPM_RIGHTALIGN
            };

            // With TPM_RETURNCMD the return value is the selected
            // entry's identifier, 0 on dismissal.
            let selected = TrackPopupMenu(
                self.hmenu,
                TPM_RETURNCMD | align,
                pt.x,
                pt.y,
                None,
                self.hwnd,
                None,
            );

            // TrackPopupMenu runs a modal message loop that retrieves
            // and dispatches posted messages itself; any wake-up that
            // arrived while the menu was open went to the window
            // procedure, not to next_event.
            self.replay_deferred_wakeups();

            selected.0 as u32
        }
    }

    fn detach(&mut self) {
        unsafe {
            let nid = self.base_entry();
            if !Shell_NotifyIconW(NIM_DELETE, &nid).as_bool() {
                warn!("Shell_NotifyIconW(NIM_DELETE) failed during teardown");
            }
            if let Some(icon) = self.icon.take() {
                let _ = DestroyIcon(icon);
            }
            if let Err(e) = DestroyMenu(self.hmenu) {
                warn!(error = %e, "DestroyMenu failed during teardown");
            }
            if let Err(e) = DestroyWindow(self.hwnd) {
                warn!(error = %e, "DestroyWindow failed during teardown");
            }
        }
    }
}

/// Posts wake-up messages to the actor's window from caller threads.
///
/// Holds the window handle as a plain integer: `HWND` itself is a raw
/// pointer and not `Send`, but posting to a message queue from another
/// thread is exactly what `PostMessageW` is for.
struct Win32Waker {
    hwnd: isize,
}

// The handle is only ever used with PostMessageW, which is documented
// as safe to call from any thread.
unsafe impl Send for Win32Waker {}
unsafe impl Sync for Win32Waker {}

impl ShellWaker for Win32Waker {
    fn post(&self, event: PumpEvent) {
        let message = match event {
            PumpEvent::Request => WMAPP_REQUEST,
            PumpEvent::Shutdown => WMAPP_SHUTDOWN,
        };
        let hwnd = HWND(self.hwnd as *mut core::ffi::c_void);
        if let Err(e) = unsafe { PostMessageW(Some(hwnd), message, WPARAM(0), LPARAM(0)) } {
            warn!(error = %e, msg = message, "PostMessageW failed");
        }
    }
}

fn register_window_class(hinstance: HINSTANCE) -> TrayResult<()> {
    let class = WNDCLASSW {
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        lpszClassName: CLASS_NAME,
        ..Default::default()
    };

    let atom = unsafe { RegisterClassW(&class) };
    if atom == 0 {
        // A second tray instance in the same process reuses the first
        // registration.
        let last = unsafe { GetLastError() };
        if last != ERROR_CLASS_ALREADY_EXISTS {
            return Err(native_rejected(
                "RegisterClassW",
                &windows::core::Error::from_thread(),
            ));
        }
    }

    Ok(())
}

/// Outside a modal loop the pump intercepts the private wake-up
/// messages before dispatch and this procedure never sees them. While
/// `TrackPopupMenu` runs its own loop they are dispatched here instead;
/// recording them keeps them from vanishing into `DefWindowProcW`, and
/// `show_menu` replays them once the menu closes.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WMAPP_REQUEST => {
            DEFERRED_REQUESTS.set(DEFERRED_REQUESTS.get() + 1);
            LRESULT(0)
        }
        WMAPP_SHUTDOWN => {
            DEFERRED_SHUTDOWN.set(true);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

fn loword(lparam: LPARAM) -> u32 {
    (lparam.0 as u32) & 0xFFFF
}

#[track_caller]
fn native_rejected(call: &'static str, error: &windows::core::Error) -> TrayError {
    TrayError::NativeCallRejected {
        call,
        reason: error.message(),
        location: ErrorLocation::from(Location::caller()),
    }
}
