//! Shared fixtures for reactor tests: a scriptable AX source with
//! per-attribute fetch counting and failure injection for titles.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Event, Reactor};
use crate::common::collections::{HashMap, HashSet};
use crate::sys::app::{AppInfo, WindowId, pid_t};
use crate::sys::ax::{AttributeSource, AxAttribute, AxValue, Error, TitleSource};

#[derive(Default)]
pub(crate) struct SimAx {
    attributes: Mutex<HashMap<(WindowId, AxAttribute), AxValue>>,
    titles: Mutex<HashMap<WindowId, String>>,
    broken_titles: Mutex<HashSet<WindowId>>,
    fetches: Mutex<HashMap<(WindowId, AxAttribute), usize>>,
}

impl SimAx {
    pub(crate) fn set_attribute(&self, wid: WindowId, attr: AxAttribute, value: AxValue) {
        self.attributes.lock().insert((wid, attr), value);
    }

    pub(crate) fn set_title(&self, wid: WindowId, title: &str) {
        self.titles.lock().insert(wid, title.to_owned());
    }

    pub(crate) fn break_title(&self, wid: WindowId) {
        self.broken_titles.lock().insert(wid);
    }

    pub(crate) fn fetch_count(&self, wid: WindowId, attr: AxAttribute) -> usize {
        self.fetches.lock().get(&(wid, attr)).copied().unwrap_or(0)
    }
}

impl AttributeSource for SimAx {
    fn fetch(&self, window: WindowId, attr: AxAttribute) -> Option<AxValue> {
        *self.fetches.lock().entry((window, attr)).or_insert(0) += 1;
        self.attributes.lock().get(&(window, attr)).cloned()
    }
}

impl TitleSource for SimAx {
    async fn fetch_title(&self, window: WindowId) -> Result<String, Error> {
        if self.broken_titles.lock().contains(&window) {
            return Err(Error::WindowGone(window));
        }
        self.titles
            .lock()
            .get(&window)
            .cloned()
            .ok_or(Error::WindowGone(window))
    }
}

pub(crate) fn make_reactor() -> (Arc<SimAx>, Reactor<SimAx>) {
    let source = Arc::new(SimAx::default());
    let reactor = Reactor::new(source.clone());
    (source, reactor)
}

pub(crate) fn launch_app(reactor: &mut Reactor<SimAx>, pid: pid_t, name: &str) {
    reactor
        .handle_event(Event::ApplicationLaunched {
            pid,
            info: AppInfo::named(name),
        })
        .unwrap();
}

pub(crate) fn open_window(
    reactor: &mut Reactor<SimAx>,
    source: &SimAx,
    wid: WindowId,
    workspace: &str,
    title: &str,
) {
    source.set_title(wid, title);
    reactor
        .handle_event(Event::WindowCreated {
            wid,
            workspace: workspace.into(),
            is_floating: false,
        })
        .unwrap();
}

pub(crate) fn focus(reactor: &mut Reactor<SimAx>, workspace: &str, wid: WindowId) {
    reactor
        .handle_event(Event::FocusChanged {
            workspace: workspace.into(),
            wid: Some(wid),
        })
        .unwrap();
}
