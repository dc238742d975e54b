//! Scripted media handles for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::handle::{MediaEvent, MediaFactory, MediaHandle, ReadyState};

#[derive(Debug)]
struct FakeState {
    catalog: Rc<HashMap<String, f64>>,
    /// Become ready synchronously inside `load()`.
    immediate: bool,
    src: Option<String>,
    current_time: f64,
    paused: bool,
    ready: ReadyState,
    loads: usize,
    events: Vec<MediaEvent>,
}

/// A handle whose readiness and clock are driven by the test.
pub(crate) struct FakeMedia {
    state: Rc<RefCell<FakeState>>,
    /// Mirror of `state.src`, so `src()` can hand out a borrow.
    src: Option<String>,
}

/// Test-side view of a [`FakeMedia`] after it was boxed away.
#[derive(Clone)]
pub(crate) struct FakeControl {
    state: Rc<RefCell<FakeState>>,
}

impl FakeMedia {
    pub(crate) fn new(catalog: &[(&str, f64)], immediate: bool) -> (Self, FakeControl) {
        let catalog = catalog
            .iter()
            .map(|(src, d)| (src.to_string(), *d))
            .collect();
        Self::with_catalog(Rc::new(catalog), immediate)
    }

    fn with_catalog(catalog: Rc<HashMap<String, f64>>, immediate: bool) -> (Self, FakeControl) {
        let state = Rc::new(RefCell::new(FakeState {
            catalog,
            immediate,
            src: None,
            current_time: 0.0,
            paused: true,
            ready: ReadyState::Empty,
            loads: 0,
            events: Vec::new(),
        }));
        (
            Self {
                state: state.clone(),
                src: None,
            },
            FakeControl { state },
        )
    }
}

impl FakeState {
    fn duration(&self) -> Option<f64> {
        if self.ready < ReadyState::Metadata {
            return None;
        }
        self.src.as_ref().and_then(|s| self.catalog.get(s).copied())
    }
}

impl FakeControl {
    /// Finish loading: metadata and can-play notifications are queued.
    pub(crate) fn become_ready(&self) {
        let mut s = self.state.borrow_mut();
        s.ready = ReadyState::CanPlay;
        s.events.push(MediaEvent::LoadedMetadata);
        s.events.push(MediaEvent::CanPlay);
    }

    /// Move the clock forward while playing and queue a time update.
    pub(crate) fn advance(&self, seconds: f64) {
        let mut s = self.state.borrow_mut();
        if s.paused {
            return;
        }
        let end = s.duration().unwrap_or(f64::MAX);
        s.current_time = (s.current_time + seconds).min(end);
        s.events.push(MediaEvent::TimeUpdate);
    }

    /// Play through to the end of the source.
    pub(crate) fn finish(&self) {
        let mut s = self.state.borrow_mut();
        s.current_time = s.duration().unwrap_or(0.0);
        s.paused = true;
        s.events.push(MediaEvent::Ended);
    }

    pub(crate) fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub(crate) fn src(&self) -> Option<String> {
        self.state.borrow().src.clone()
    }

    pub(crate) fn loads(&self) -> usize {
        self.state.borrow().loads
    }
}

impl MediaHandle for FakeMedia {
    fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_src(&mut self, src: &str) {
        self.src = Some(src.to_string());
        let mut s = self.state.borrow_mut();
        s.src = Some(src.to_string());
        s.ready = ReadyState::Empty;
    }

    fn load(&mut self) {
        let immediate = {
            let mut s = self.state.borrow_mut();
            s.loads += 1;
            s.current_time = 0.0;
            s.paused = true;
            s.ready = ReadyState::Empty;
            s.immediate && s.src.is_some()
        };
        if immediate {
            FakeControl {
                state: self.state.clone(),
            }
            .become_ready();
        }
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut s = self.state.borrow_mut();
        let end = s.duration().unwrap_or(f64::MAX);
        s.current_time = seconds.clamp(0.0, end);
        s.events.push(MediaEvent::TimeUpdate);
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration()
    }

    fn play(&mut self) {
        self.state.borrow_mut().paused = false;
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }
}

/// Hands out [`FakeMedia`] handles and keeps their controls for inspection.
///
/// Clones share the list of created handles, so a test can keep one while
/// the page owns another.
#[derive(Clone)]
pub(crate) struct FakeFactory {
    catalog: Rc<HashMap<String, f64>>,
    immediate: bool,
    created: Rc<RefCell<Vec<(Option<String>, FakeControl)>>>,
}

impl FakeFactory {
    /// Sources listed in `catalog` report the given duration once loaded.
    pub(crate) fn new(catalog: &[(&str, f64)], immediate: bool) -> Self {
        Self {
            catalog: Rc::new(
                catalog
                    .iter()
                    .map(|(src, d)| (src.to_string(), *d))
                    .collect(),
            ),
            immediate,
            created: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Control of the first handle created for `src`.
    pub(crate) fn control_for(&self, src: &str) -> FakeControl {
        self.created
            .borrow()
            .iter()
            .find(|(s, _)| s.as_deref() == Some(src))
            .map(|(_, c)| c.clone())
            .expect("no handle created for src")
    }

    /// Control of the most recent handle created without a source.
    pub(crate) fn empty_control(&self) -> FakeControl {
        self.created
            .borrow()
            .iter()
            .rev()
            .find(|(s, _)| s.is_none())
            .map(|(_, c)| c.clone())
            .expect("no empty handle created")
    }
}

impl MediaFactory for FakeFactory {
    fn create(&self, src: Option<&str>) -> Box<dyn MediaHandle> {
        let (mut media, control) = FakeMedia::with_catalog(self.catalog.clone(), self.immediate);
        if let Some(src) = src {
            media.set_src(src);
            media.load();
        }
        self.created
            .borrow_mut()
            .push((src.map(str::to_string), control));
        Box::new(media)
    }
}
