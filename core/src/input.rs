//! Platform-agnostic input snapshot state.
//!
//! [`InputState`] is the single process-owned object the windowing layer
//! writes into from its event callbacks and the viewer reads once per frame.
//! Each field has one writer and one per-frame consumer, so no locking is
//! involved: everything happens on the render thread between frames.
//!
//! Scroll input and key-press events accumulate between frames and are
//! cleared when consumed, so a frame never sees the same wheel notch or key
//! tap twice.

use std::collections::HashSet;

/// Physical keyboard key identifier.
///
/// Matches common physical key positions (US QWERTY layout names).
/// Platform layers (e.g. winit, glfw) map their native key codes to this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Space,
    Enter,
    Escape,
    Tab,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Per-frame input snapshot written by event callbacks.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    key_presses: Vec<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    cursor: (f64, f64),
    scroll: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key state change. A release followed by a press produces one
    /// press event; holding a key does not repeat.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.key_presses.push(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Key-press events since the last call, in arrival order. Clears on read.
    pub fn take_key_presses(&mut self) -> Vec<KeyCode> {
        std::mem::take(&mut self.key_presses)
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_down.insert(button);
        } else {
            self.buttons_down.remove(&button);
        }
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Cursor position in framebuffer pixels.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    /// Accumulate a scroll delta from a wheel event.
    pub fn add_scroll(&mut self, dx: f64, dy: f64) {
        self.scroll.0 += dx;
        self.scroll.1 += dy;
    }

    /// Scroll delta accumulated since the last call. Clears on read.
    pub fn consume_scroll(&mut self) -> (f64, f64) {
        std::mem::take(&mut self.scroll)
    }
}
