use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use strata_wm::actor;
use strata_wm::actor::reactor::replay::{Record, replay};
use strata_wm::actor::reactor::{Event, Reactor};
use strata_wm::common::log;
use strata_wm::model::LayoutKind;
use strata_wm::sys::app::{AppInfo, WindowId};
use strata_wm::sys::ax::{
    AX_STANDARD_WINDOW_SUBROLE, AX_WINDOW_ROLE, AttributeSource, AxAttribute, AxElementRef,
    AxValue, Result as AxResult, TitleSource,
};
use tracing::warn;

#[derive(Parser)]
struct Cli {
    /// Replay a recorded event trace instead of the built-in demo scenario.
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// Record the processed events to the specified file path. Overwrites
    /// the file if it exists.
    #[arg(long, value_name = "PATH")]
    record: Option<PathBuf>,
}

/// Stand-in for the OS accessibility service: every window is a standard
/// window with the full button set, titled after its id.
struct DemoAx;

impl AttributeSource for DemoAx {
    fn fetch(&self, window: WindowId, attr: AxAttribute) -> Option<AxValue> {
        use AxAttribute::*;
        match attr {
            Role => Some(AxValue::String(AX_WINDOW_ROLE.into())),
            Subrole => Some(AxValue::String(AX_STANDARD_WINDOW_SUBROLE.into())),
            CloseButton | MinimizeButton | FullScreenButton | ZoomButton => {
                Some(AxValue::Element(AxElementRef(window.idx.get() as u64)))
            }
            _ => None,
        }
    }
}

impl TitleSource for DemoAx {
    async fn fetch_title(&self, window: WindowId) -> AxResult<String> {
        Ok(format!("window {window}"))
    }
}

fn demo_events() -> Vec<Event> {
    let term = WindowId::new(10, 1);
    let editor = WindowId::new(10, 2);
    let browser = WindowId::new(20, 1);
    let chat = WindowId::new(30, 1);
    vec![
        Event::ApplicationLaunched { pid: 10, info: AppInfo::named("Terminal") },
        Event::ApplicationLaunched { pid: 20, info: AppInfo::named("Browser") },
        Event::ApplicationLaunched { pid: 30, info: AppInfo::named("Chat") },
        Event::WorkspaceCreated { name: "main".into() },
        Event::WorkspaceCreated { name: "chat".into() },
        Event::WindowCreated { wid: term, workspace: "main".into(), is_floating: false },
        Event::WindowCreated { wid: editor, workspace: "main".into(), is_floating: false },
        Event::WindowCreated { wid: browser, workspace: "main".into(), is_floating: false },
        Event::WindowCreated { wid: chat, workspace: "chat".into(), is_floating: true },
        Event::GroupWindows {
            wids: vec![term, editor],
            layout: LayoutKind::Vertical,
        },
        Event::FocusChanged { workspace: "main".into(), wid: Some(browser) },
        Event::FocusChanged { workspace: "main".into(), wid: Some(editor) },
        Event::FocusChanged { workspace: "chat".into(), wid: Some(chat) },
        Event::FocusChanged { workspace: "main".into(), wid: Some(term) },
        Event::WindowDestroyed(editor),
    ]
}

fn main() -> anyhow::Result<()> {
    log::init();
    let cli = Cli::parse();

    let mut reactor = Reactor::new(Arc::new(DemoAx));
    let mut record = Record::new(cli.record.as_deref())?;
    let (events_tx, events_rx) = actor::channel();

    let mut submit = |event: Event| {
        if let Err(err) = record.on_event(&event) {
            warn!(%err, "failed to record event");
        }
        events_tx.send(event);
    };

    match &cli.replay {
        Some(path) => replay(path, &mut submit)
            .with_context(|| format!("replaying {}", path.display()))?,
        None => {
            for event in demo_events() {
                submit(event);
            }
        }
    }
    drop(submit);
    drop(events_tx);

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let dump = runtime.block_on(async {
        reactor.run(events_rx).await;
        reactor.debug_mru().await
    });
    print!("{dump}");
    Ok(())
}
