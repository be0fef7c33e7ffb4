//! Terminal setup and restoration for the full-screen display.

use crate::monitor::error::Result;
use crossterm::{cursor, execute, terminal};
use std::io;
use std::sync::Once;
use tracing::{debug, warn};

static PANIC_HOOK: Once = Once::new();

/// Restore the cursor before the default panic output is printed
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic| {
            let _ = execute!(io::stdout(), cursor::Show);
            original_hook(panic);
        }));
    });
}

/// Hides the cursor and clears the screen; the cursor is shown again when
/// the guard is dropped, on every exit path.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        install_panic_hook();
        execute!(
            io::stdout(),
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0),
            cursor::Hide
        )?;
        debug!("Terminal prepared");
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), cursor::Show) {
            warn!(error = %e, "Could not restore terminal cursor");
        } else {
            debug!("Terminal restored");
        }
    }
}
