//! Loading indicator for catalog loads
//!
//! Shows an animated spinner on stderr while the snapshot is being fetched.
//! Disabled in quiet mode and when stderr is not a terminal.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Characters for the spinning animation
const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub struct LoadingIndicator {
    message: String,
    is_running: Arc<AtomicBool>,
    animation_handle: Option<thread::JoinHandle<()>>,
    enabled: bool,
}

impl LoadingIndicator {
    pub fn new(message: impl Into<String>, quiet_mode: bool) -> Self {
        Self {
            message: message.into(),
            is_running: Arc::new(AtomicBool::new(false)),
            animation_handle: None,
            enabled: !quiet_mode && io::stderr().is_terminal(),
        }
    }

    /// Start the animation thread
    pub fn start(&mut self) {
        if !self.enabled || self.is_running.load(Ordering::Relaxed) {
            return;
        }

        self.is_running.store(true, Ordering::Relaxed);
        let is_running = Arc::clone(&self.is_running);
        let message = self.message.clone();

        self.animation_handle = Some(thread::spawn(move || {
            let mut frame = 0;
            while is_running.load(Ordering::Relaxed) {
                eprint!("\r{} {}", SPINNER_CHARS[frame % SPINNER_CHARS.len()], message);
                io::stderr().flush().unwrap_or(());
                frame += 1;
                thread::sleep(FRAME_INTERVAL);
            }
        }));
    }

    /// Stop the animation and print a completion line
    pub fn complete(&mut self, summary: &str) {
        if !self.enabled {
            return;
        }
        self.stop_animation();
        eprintln!("\r✓ {}{}", summary, " ".repeat(self.message.chars().count().saturating_sub(summary.chars().count())));
        io::stderr().flush().unwrap_or(());
    }

    /// Stop the animation and wipe the line
    pub fn finish(&mut self) {
        if !self.enabled {
            return;
        }
        self.stop_animation();
        eprint!("\r{}\r", " ".repeat(self.message.chars().count() + 2));
        io::stderr().flush().unwrap_or(());
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    fn stop_animation(&mut self) {
        if self.is_running.swap(false, Ordering::Relaxed) {
            if let Some(handle) = self.animation_handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        self.stop_animation();
    }
}
