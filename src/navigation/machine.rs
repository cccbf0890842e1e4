//! Host signal handling.
//!
//! # Transitions
//! ```text
//! NotLoaded --loading--> Loaded --interactive--> Ready
//!     \________________interactive_______________/
//!          (runs the skipped entered pass first)
//! ```
//! Pop and unload signals do not move the phase.

use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::http::{Method, Request, Response};
use crate::middleware::Dispatcher;
use crate::navigation::history::HistoryState;
use crate::navigation::signal::{HostSignal, ReadyState};
use crate::navigation::state::{LoadPhase, PhaseCell};

/// Called once when the page becomes interactive.
pub type ReadyCallback = Box<dyn FnOnce(&Request, &Response) + Send>;

/// Page-lifetime state machine driving navigation dispatches.
pub struct Navigator {
    dispatcher: Dispatcher,
    phase: PhaseCell,
    on_ready: Mutex<Option<ReadyCallback>>,
}

impl Navigator {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            phase: PhaseCell::new(),
            on_ready: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase.get()
    }

    /// Register the ready callback.
    ///
    /// Listening again after the page became ready starts a new lifetime.
    pub fn listen(&self, on_ready: Option<ReadyCallback>) {
        if self.phase.get() == LoadPhase::Ready {
            self.reset();
        }
        *self.on_ready.lock().unwrap_or_else(PoisonError::into_inner) = on_ready;
    }

    /// Back to `NotLoaded`. Any pending ready callback is kept.
    pub fn reset(&self) {
        tracing::debug!("Navigator reset");
        self.phase.reset();
    }

    pub fn handle(&self, signal: HostSignal) -> Result<()> {
        tracing::debug!(signal = signal.kind(), "Host signal");
        match signal {
            HostSignal::ReadyState {
                state: ReadyState::Loading,
                location,
            } => self.loading(&location),
            HostSignal::ReadyState {
                state: ReadyState::Interactive,
                location,
            } => self.interactive(&location),
            HostSignal::ReadyState {
                state: ReadyState::Complete,
                ..
            } => Ok(()),
            HostSignal::PopState { state: Some(state) } => self.pop(state),
            HostSignal::PopState { state: None } => {
                tracing::debug!("Pop without state ignored");
                Ok(())
            }
            HostSignal::BeforeUnload => self.dispatcher.exited().map(|_| ()),
        }
    }

    fn loading(&self, location: &str) -> Result<()> {
        if self.phase.advance(LoadPhase::Loaded) != LoadPhase::NotLoaded {
            return Ok(());
        }
        tracing::info!(location, "Page loaded");
        self.enter(&Request::new(Method::Get, location))
    }

    fn interactive(&self, location: &str) -> Result<()> {
        if self.phase.get() == LoadPhase::Ready {
            return Ok(());
        }

        let request = Request::new(Method::Get, location);
        if self.phase.advance(LoadPhase::Loaded) == LoadPhase::NotLoaded {
            tracing::info!(location, "Page loaded");
            self.enter(&request)?;
        }
        // Only Ready once the entered pass has succeeded.
        if self.phase.advance(LoadPhase::Ready) == LoadPhase::Ready {
            return Ok(());
        }
        tracing::info!(location, "Page ready");

        let response = Response::ok();
        let routes = self.dispatcher.registry().active_routes(&request.uri, request.method);
        self.dispatcher.updated(&routes, &request, &response)?;

        let callback = self
            .on_ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(callback) = callback {
            callback(&request, &response);
        }
        Ok(())
    }

    fn pop(&self, state: HistoryState) -> Result<()> {
        let HistoryState { request, response } = state;
        tracing::info!(uri = %request.uri, "History pop");
        let routes = self.dispatcher.registry().active_routes(&request.uri, request.method);
        self.dispatcher.entered(&routes, &request)?;
        self.dispatcher.updated(&routes, &request, &response)?;
        Ok(())
    }

    fn enter(&self, request: &Request) -> Result<()> {
        let routes = self.dispatcher.registry().active_routes(&request.uri, request.method);
        self.dispatcher.entered(&routes, request).map(|_| ())
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("phase", &self.phase.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Flow, Lifecycle, Middleware};
    use crate::routing::{PathRouter, RouterRegistry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counts {
        entered: AtomicUsize,
        updated: AtomicUsize,
        exited: AtomicUsize,
    }

    impl Lifecycle for Counts {
        fn entered(&self, _: &Request) -> crate::middleware::HookResult {
            self.entered.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Proceed)
        }

        fn updated(&self, _: &Request, _: &Response) -> crate::middleware::HookResult {
            self.updated.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Proceed)
        }

        fn exited(&self, _: &Request) -> std::result::Result<(), crate::error::BoxError> {
            self.exited.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Entered hook that errors while its counter is non-zero.
    struct FailOnce(Arc<AtomicUsize>);

    impl Lifecycle for FailOnce {
        fn entered(&self, _: &Request) -> crate::middleware::HookResult {
            match self.0.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)) {
                Ok(_) => Err("not ready yet".into()),
                Err(_) => Ok(Flow::Proceed),
            }
        }
    }

    fn setup() -> (Navigator, Arc<Counts>) {
        let registry = Arc::new(RouterRegistry::new());
        let counts = Arc::new(Counts::default());
        let router = PathRouter::new();
        router.get("/home", counts.clone()).unwrap();
        registry.register(Arc::new(router));
        (Navigator::new(Dispatcher::new(registry)), counts)
    }

    #[test]
    fn test_loading_enters_once() {
        let (nav, counts) = setup();
        nav.handle(HostSignal::ready_state(ReadyState::Loading, "/home")).unwrap();
        nav.handle(HostSignal::ready_state(ReadyState::Loading, "/home")).unwrap();

        assert_eq!(nav.phase(), LoadPhase::Loaded);
        assert_eq!(counts.entered.load(Ordering::SeqCst), 1);
        assert_eq!(counts.updated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_interactive_without_loading_runs_entered_first() {
        let (nav, counts) = setup();
        nav.handle(HostSignal::ready_state(ReadyState::Interactive, "/home")).unwrap();

        assert_eq!(nav.phase(), LoadPhase::Ready);
        assert_eq!(counts.entered.load(Ordering::SeqCst), 1);
        assert_eq!(counts.updated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ready_callback_runs_once() {
        let (nav, _) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        nav.listen(Some(Box::new(move |req, res| {
            assert_eq!(req.uri, "/home");
            assert_eq!(res.status, 200);
            seen.fetch_add(1, Ordering::SeqCst);
        })));

        nav.handle(HostSignal::ready_state(ReadyState::Interactive, "/home")).unwrap();
        nav.handle(HostSignal::ready_state(ReadyState::Interactive, "/home")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_interactive_recovers_after_entered_error() {
        let registry = Arc::new(RouterRegistry::new());
        let router = PathRouter::new();
        let failures = Arc::new(AtomicUsize::new(1));
        let remaining = failures.clone();
        router
            .get("/home", Middleware::lifecycle(FailOnce(remaining)))
            .unwrap();
        registry.register(Arc::new(router));
        let nav = Navigator::new(Dispatcher::new(registry));

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        nav.listen(Some(Box::new(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        })));

        let interactive = HostSignal::ready_state(ReadyState::Interactive, "/home");
        assert!(nav.handle(interactive.clone()).is_err());
        assert_eq!(nav.phase(), LoadPhase::Loaded);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        nav.handle(interactive.clone()).unwrap();
        nav.handle(interactive).unwrap();
        assert_eq!(nav.phase(), LoadPhase::Ready);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_loading_after_ready_is_ignored() {
        let (nav, counts) = setup();
        nav.handle(HostSignal::ready_state(ReadyState::Interactive, "/home")).unwrap();
        nav.handle(HostSignal::ready_state(ReadyState::Loading, "/home")).unwrap();
        assert_eq!(counts.entered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unload_dispatches_exited() {
        let (nav, counts) = setup();
        nav.handle(HostSignal::ready_state(ReadyState::Interactive, "/home")).unwrap();
        nav.handle(HostSignal::BeforeUnload).unwrap();
        nav.handle(HostSignal::BeforeUnload).unwrap();
        assert_eq!(counts.exited.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pop_without_state_is_ignored() {
        let (nav, counts) = setup();
        nav.handle(HostSignal::pop(None)).unwrap();
        assert_eq!(counts.entered.load(Ordering::SeqCst), 0);
        assert_eq!(nav.phase(), LoadPhase::NotLoaded);
    }

    #[test]
    fn test_listen_after_ready_starts_new_lifetime() {
        let (nav, counts) = setup();
        nav.handle(HostSignal::ready_state(ReadyState::Interactive, "/home")).unwrap();
        nav.listen(None);
        assert_eq!(nav.phase(), LoadPhase::NotLoaded);

        nav.handle(HostSignal::ready_state(ReadyState::Loading, "/home")).unwrap();
        assert_eq!(counts.entered.load(Ordering::SeqCst), 2);
    }
}
