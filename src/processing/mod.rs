pub mod graph_view;
pub mod orchestrator;

use dioxus::prelude::*;

/// Mutable access to a piece of controller state. The components hand the
/// orchestration functions a `Signal`, tests hand them plain state, and
/// the request lifecycle stays identical in both worlds.
pub trait StateHandle<T> {
    fn apply<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T: 'static> StateHandle<T> for Signal<T> {
    fn apply<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.write())
    }
}

impl<T> StateHandle<T> for &mut T {
    fn apply<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(self)
    }
}

#[cfg(test)]
impl<T> StateHandle<T> for std::sync::Arc<std::sync::Mutex<T>> {
    fn apply<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock().expect("state lock poisoned"))
    }
}
