//! Window, event loop and runtime wiring for a [`UiApp`].
//!
//! `run` creates the bus, starts the network and parse runtimes behind a
//! command router, and drives the app from the winit event loop. Runtime
//! events are drained on the UI thread right before each frame.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use app_api::{RepaintHandle, UiApp};
use bus::{Bus, CoreCommand, CoreEvent};
use html::ExtractOptions;
use net::NetOptions;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

mod renderer;

pub use renderer::{Renderer, RendererError};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
}

#[derive(Debug, Clone, Default)]
pub struct PlatformOptions {
    pub net: NetOptions,
    pub extract: ExtractOptions,
}

#[derive(Debug)]
enum UserEvent {
    /// A runtime event is waiting on the bus.
    Wake,
}

pub fn run<A: UiApp>(mut app: A, opts: PlatformOptions) -> Result<(), PlatformError> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();
    let repaint = RepaintHandle::new(move || {
        let _ = proxy.send_event(UserEvent::Wake);
    });

    let bus = start_runtimes(opts, repaint.clone());
    app.set_bus_sender(bus.cmd_tx.clone());
    app.set_repaint_handle(repaint);

    let mut platform = PlatformApp {
        app,
        bus,
        window: None,
        renderer: None,
        fatal: None,
    };
    event_loop.run_app(&mut platform)?;

    match platform.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Spawn the runtimes and return the UI side of the bus.
///
/// Commands from the UI go through a router thread to the runtime that owns
/// them. Runtime events go through a pump thread that wakes the UI.
pub fn start_runtimes(opts: PlatformOptions, repaint: RepaintHandle) -> Bus {
    let (cmd_tx, cmd_rx) = mpsc::channel::<CoreCommand>();
    let (evt_tx, evt_rx) = mpsc::channel::<CoreEvent>();
    let (runtime_evt_tx, runtime_evt_rx) = mpsc::channel::<CoreEvent>();

    let (net_tx, net_rx) = mpsc::channel();
    let (parse_tx, parse_rx) = mpsc::channel();
    runtime_net::start_net_runtime(net_rx, runtime_evt_tx.clone(), opts.net);
    runtime_parse::start_parse_runtime(parse_rx, runtime_evt_tx, opts.extract);

    thread::spawn(move || route_commands(cmd_rx, net_tx, parse_tx));

    let ui_evt_tx = evt_tx.clone();
    thread::spawn(move || pump_events(runtime_evt_rx, ui_evt_tx, repaint));

    Bus {
        cmd_tx,
        evt_rx,
        evt_tx,
    }
}

fn route_commands(
    cmd_rx: Receiver<CoreCommand>,
    net_tx: Sender<CoreCommand>,
    parse_tx: Sender<CoreCommand>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        let target = match cmd {
            CoreCommand::FetchDocument { .. } | CoreCommand::CancelRequest { .. } => &net_tx,
            CoreCommand::ParseDocument { .. } => &parse_tx,
        };
        if target.send(cmd).is_err() {
            log::error!(target: "platform", "runtime stopped; dropping command");
        }
    }
}

fn pump_events(rx: Receiver<CoreEvent>, ui_tx: Sender<CoreEvent>, repaint: RepaintHandle) {
    while let Ok(evt) = rx.recv() {
        if ui_tx.send(evt).is_err() {
            break;
        }
        repaint.request_repaint();
    }
}

struct PlatformApp<A: UiApp> {
    app: A,
    bus: Bus,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    fatal: Option<PlatformError>,
}

impl<A: UiApp> PlatformApp<A> {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlatformError> {
        if self.window.is_none() {
            let attrs = Window::default_attributes().with_title(self.app.window_title());
            self.window = Some(Arc::new(event_loop.create_window(attrs)?));
        }
        if self.renderer.is_none() {
            if let Some(window) = &self.window {
                self.renderer = Some(Renderer::new(Arc::clone(window))?);
                window.request_redraw();
            }
        }
        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(evt) = self.bus.evt_rx.try_recv() {
            self.app.on_core_event(evt);
        }
    }
}

impl<A: UiApp> ApplicationHandler<UserEvent> for PlatformApp<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.init(event_loop) {
            log::error!(target: "platform", "{err}");
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Wake => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let (Some(window), Some(renderer)) = (self.window.clone(), self.renderer.as_mut()) else {
            return;
        };
        if renderer.on_window_event(&window, &event) {
            window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => renderer.resize(new_size),
            WindowEvent::RedrawRequested => {
                self.drain_events();
                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                let app = &mut self.app;
                let delay = renderer.render(&window, |ctx| app.ui(ctx));
                if delay.is_zero() {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
