use std::time::{Duration, Instant};

use log::trace;

pub const DEFAULT_COOL_DOWN: Duration = Duration::from_millis(500);

/// Leading-edge debounce around an activation handler.
///
/// The first activation is forwarded right away and starts the cool-down.
/// Activations during the cool-down are dropped, never queued, and do not
/// extend it. Once disposed the handler is never invoked again.
pub struct Debounced<H> {
    handler: H,
    cool_down: Duration,
    with_event: bool,
    cooling_until: Option<Instant>,
    disposed: bool,
}

impl<H> Debounced<H> {
    pub fn new(handler: H, cool_down: Duration) -> Self {
        Self { handler, cool_down, with_event: true, cooling_until: None, disposed: false }
    }

    /// Whether the triggering event is passed on to the handler.
    pub fn with_event(mut self, with_event: bool) -> Self {
        self.with_event = with_event;
        self
    }

    pub fn activate_at<E, R>(&mut self, event: E, now: Instant) -> Option<R>
    where
        H: FnMut(Option<E>) -> R,
    {
        if self.disposed {
            return None;
        }

        if self.is_cooling_down(now) {
            trace!("Dropping activation during cool-down.");
            return None;
        }

        self.cooling_until = Some(now + self.cool_down);
        let event = self.with_event.then_some(event);
        Some((self.handler)(event))
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.cooling_until.is_some_and(|until| now < until)
    }

    /// Releases the pending cool-down; later activations are ignored.
    pub fn dispose(&mut self) {
        self.cooling_until = None;
        self.disposed = true;
    }
}

impl<H> std::fmt::Debug for Debounced<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced")
            .field("cool_down", &self.cool_down)
            .field("with_event", &self.with_event)
            .field("cooling_until", &self.cooling_until)
            .field("disposed", &self.disposed)
            .finish()
    }
}
