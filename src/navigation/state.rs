use std::sync::atomic::{AtomicU8, Ordering};

/// Page-load phase of one page lifetime.
///
/// Only ever moves forward until [`PhaseCell::reset`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadPhase {
    NotLoaded = 0,
    Loaded = 1,
    Ready = 2,
}

impl From<u8> for LoadPhase {
    fn from(val: u8) -> Self {
        match val {
            0 => LoadPhase::NotLoaded,
            1 => LoadPhase::Loaded,
            _ => LoadPhase::Ready,
        }
    }
}

/// Atomic holder for a [`LoadPhase`].
#[derive(Debug)]
pub(crate) struct PhaseCell(AtomicU8);

impl PhaseCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(LoadPhase::NotLoaded as u8))
    }

    pub(crate) fn get(&self) -> LoadPhase {
        LoadPhase::from(self.0.load(Ordering::Acquire))
    }

    /// Move forward to `to`, returning the phase held before.
    ///
    /// A cell already at or past `to` is left untouched.
    pub(crate) fn advance(&self, to: LoadPhase) -> LoadPhase {
        LoadPhase::from(self.0.fetch_max(to as u8, Ordering::AcqRel))
    }

    pub(crate) fn reset(&self) {
        self.0.store(LoadPhase::NotLoaded as u8, Ordering::Release);
    }
}
