use std::io::IsTerminal;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use sweepr_core::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Listens for 'q' (or Ctrl-C, which raw mode swallows) and cancels `cancel`.
///
/// The listener stops on its own once `stop` is cancelled. Raw mode is left
/// again before the thread exits.
pub struct QuitListener {
    stop: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl QuitListener {
    /// Returns `None` when stdin is not a terminal.
    pub fn spawn(cancel: CancellationToken) -> Option<Self> {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        enable_raw_mode().ok()?;

        let stop = CancellationToken::new();
        let stop_ref = stop.clone();
        let handle = thread::spawn(move || {
            while !stop_ref.is_cancelled() && !cancel.is_cancelled() {
                if !event::poll(POLL_INTERVAL).unwrap_or(false) {
                    continue;
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    let is_q = key_event.code == KeyCode::Char('q');
                    let is_ctrl_c = key_event.code == KeyCode::Char('c')
                        && key_event.modifiers.contains(KeyModifiers::CONTROL);

                    if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                        cancel.cancel();
                    }
                }
            }
            let _ = disable_raw_mode();
        });

        Some(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for QuitListener {
    fn drop(&mut self) {
        self.stop.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let _ = disable_raw_mode();
    }
}
