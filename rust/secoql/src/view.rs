//! Generation tags that let the service discard fetches superseded by a newer
//! request for the same logical view.
//!
//! Each fetch begins by taking the next generation from its view's gate; on
//! completion the result is applied only while that generation is still the
//! latest issued. A stale result is discarded, never served.

use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

pub type Generation = u64;

/// Monotonic generation counter for one fetch path of a view.
#[derive(Debug, Default)]
pub struct Gate {
    issued: AtomicU64,
}

impl Gate {
    /// Issues the next generation, superseding every earlier one.
    pub fn begin(&self) -> Generation {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while no newer generation has been issued.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.issued.load(Ordering::SeqCst) == generation
    }
}

/// Per-view gates. The listing path and the facet path supersede
/// independently, mirroring the two fetch cycles a view runs.
#[derive(Debug, Default)]
pub struct ViewSession {
    pub data: Gate,
    pub facets: Gate,
}

/// Named view sessions, created on first use.
#[derive(Default)]
pub struct ViewRegistry {
    views: Mutex<HashMap<String, Arc<ViewSession>>>,
}

impl ViewRegistry {
    pub fn session(&self, view: &str) -> Arc<ViewSession> {
        let mut views = self.views.lock();
        Arc::clone(views.entry(view.to_string()).or_default())
    }
}
