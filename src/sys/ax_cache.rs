//! Caching proxy over a window's AX element.
//!
//! Attribute reads are expensive cross-process queries, and most window
//! attributes cannot change after the window is created. Permanent
//! attributes (role, subrole, identifier) are fetched at most once for the
//! window's tracked lifetime. The titlebar button set changes rarely;
//! those four slots can be dropped as a group with
//! [`CachedAxWindow::invalidate_button_cache`]. Everything else passes
//! through uncached.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::sys::app::WindowId;
use crate::sys::ax::{AttributeSource, AxAttribute, AxElementRef, AxValue};

/// A cached attribute slot.
///
/// `Absent` is a real, stable result: the source was asked and had no value.
/// A two-state cache cannot tell that apart from "never asked", which would
/// re-fetch genuinely absent attributes forever.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CacheSlot<T> {
    #[default]
    Unfetched,
    Absent,
    Present(T),
}

impl<T> CacheSlot<T> {
    pub fn is_fetched(&self) -> bool {
        !matches!(self, CacheSlot::Unfetched)
    }
}

#[derive(Default)]
struct CacheState {
    // Permanent: immutable by OS contract for the window's lifetime.
    subrole: CacheSlot<String>,
    identifier: CacheSlot<String>,
    role: CacheSlot<String>,
    // Semi-permanent: invalidated as a group on structural changes.
    close_button: CacheSlot<AxElementRef>,
    minimize_button: CacheSlot<AxElementRef>,
    fullscreen_button: CacheSlot<AxElementRef>,
    zoom_button: CacheSlot<AxElementRef>,
}

pub struct CachedAxWindow<S> {
    source: Arc<S>,
    wid: WindowId,
    state: Mutex<CacheState>,
}

impl<S: AttributeSource> CachedAxWindow<S> {
    pub fn new(source: Arc<S>, wid: WindowId) -> Self {
        CachedAxWindow {
            source,
            wid,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn window_id(&self) -> WindowId {
        self.wid
    }

    /// Reads an attribute, consulting the cache according to the key's
    /// caching class.
    pub fn get(&self, attr: AxAttribute) -> Option<AxValue> {
        use AxAttribute::*;
        match attr {
            Subrole => self.cached_string(attr, |s| &mut s.subrole),
            Identifier => self.cached_string(attr, |s| &mut s.identifier),
            Role => self.cached_string(attr, |s| &mut s.role),
            CloseButton => self.cached_element(attr, |s| &mut s.close_button),
            MinimizeButton => self.cached_element(attr, |s| &mut s.minimize_button),
            FullScreenButton => self.cached_element(attr, |s| &mut s.fullscreen_button),
            ZoomButton => self.cached_element(attr, |s| &mut s.zoom_button),
            // Everything else is volatile and forwarded on every access.
            _ => self.source.fetch(self.wid, attr),
        }
    }

    /// Drops the semi-permanent slots. Call when the window's structure may
    /// have changed and the button set could differ.
    pub fn invalidate_button_cache(&self) {
        let mut state = self.state.lock();
        state.close_button = CacheSlot::Unfetched;
        state.minimize_button = CacheSlot::Unfetched;
        state.fullscreen_button = CacheSlot::Unfetched;
        state.zoom_button = CacheSlot::Unfetched;
    }

    /// Drops every slot, permanent ones included. Only useful for a full
    /// resynchronization.
    pub fn invalidate_all_caches(&self) {
        let mut state = self.state.lock();
        *state = CacheState::default();
    }

    fn cached_string(
        &self,
        attr: AxAttribute,
        slot: impl FnOnce(&mut CacheState) -> &mut CacheSlot<String>,
    ) -> Option<AxValue> {
        let mut state = self.state.lock();
        let slot = slot(&mut state);
        match slot {
            CacheSlot::Present(s) => Some(AxValue::String(s.clone())),
            CacheSlot::Absent => None,
            CacheSlot::Unfetched => {
                // The lock is held across the fetch so a concurrent getter of
                // the same slot cannot also miss. Fetches are synchronous;
                // this never spans an await point.
                let value = self.source.fetch(self.wid, attr);
                match value.as_ref().and_then(|v| v.as_str()) {
                    Some(s) => {
                        *slot = CacheSlot::Present(s.to_owned());
                        value
                    }
                    None => {
                        *slot = CacheSlot::Absent;
                        None
                    }
                }
            }
        }
    }

    fn cached_element(
        &self,
        attr: AxAttribute,
        slot: impl FnOnce(&mut CacheState) -> &mut CacheSlot<AxElementRef>,
    ) -> Option<AxValue> {
        let mut state = self.state.lock();
        let slot = slot(&mut state);
        match slot {
            CacheSlot::Present(e) => Some(AxValue::Element(*e)),
            CacheSlot::Absent => None,
            CacheSlot::Unfetched => {
                let value = self.source.fetch(self.wid, attr);
                match value.as_ref().and_then(|v| v.as_element()) {
                    Some(e) => {
                        *slot = CacheSlot::Present(e);
                        value
                    }
                    None => {
                        *slot = CacheSlot::Absent;
                        None
                    }
                }
            }
        }
    }
}
