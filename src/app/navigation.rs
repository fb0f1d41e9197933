//! Single-active-screen navigation.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// The screens of the client. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Sign-in and registration.
    Auth,
    /// Main menu.
    Menu,
    /// Profile editor.
    Profile,
    /// User list.
    UsersList,
    /// Task list.
    TasksList,
    /// Task editor.
    TaskView,
}

impl Screen {
    /// Every screen.
    pub const ALL: [Screen; 6] = [
        Screen::Auth,
        Screen::Menu,
        Screen::Profile,
        Screen::UsersList,
        Screen::TasksList,
        Screen::TaskView,
    ];

    /// Screen name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Auth => "auth",
            Screen::Menu => "menu",
            Screen::Profile => "profile",
            Screen::UsersList => "users_list",
            Screen::TasksList => "tasks_list",
            Screen::TaskView => "task_view",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whatever actually makes screens visible.
///
/// `present` must hide every other screen before returning.
pub trait ScreenHost: Send + Sync {
    /// Make `screen` the only visible screen.
    fn present(&self, screen: Screen);
}

/// Navigation state machine.
///
/// Starts on [`Screen::Auth`]. Any screen can be reached from any other.
pub struct Navigator {
    current: Mutex<Screen>,
    host: Arc<dyn ScreenHost>,
}

impl Navigator {
    /// Create a navigator and present the sign-in screen.
    pub fn new(host: Arc<dyn ScreenHost>) -> Self {
        host.present(Screen::Auth);
        Self {
            current: Mutex::new(Screen::Auth),
            host,
        }
    }

    /// Switch to `screen`.
    ///
    /// Returns `false` without touching the host if `screen` is already
    /// active. The host is called while the state is locked, so concurrent
    /// callers are presented one after the other.
    pub fn show(&self, screen: Screen) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == screen {
            return false;
        }
        debug!(from = %*current, to = %screen, "Navigating");
        self.host.present(screen);
        *current = screen;
        true
    }

    /// The active screen.
    pub fn current(&self) -> Screen {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `screen` is the active one.
    pub fn is_active(&self, screen: Screen) -> bool {
        self.current() == screen
    }
}
