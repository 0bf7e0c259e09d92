use std::sync::Arc;
use std::sync::mpsc::Sender;

use bus::{CoreCommand, CoreEvent};
use egui::Context;

/// Wakes the UI thread so the next frame is drawn promptly.
#[derive(Clone)]
pub struct RepaintHandle(Arc<dyn Fn() + Send + Sync>);

impl RepaintHandle {
    pub fn new(wake: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(wake))
    }

    pub fn request_repaint(&self) {
        (self.0)()
    }
}

impl std::fmt::Debug for RepaintHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RepaintHandle")
    }
}

/// An application hosted by the platform event loop.
///
/// The platform calls `ui` once per frame and delivers runtime events
/// through `on_core_event` on the UI thread, before the frame is built.
pub trait UiApp {
    fn ui(&mut self, ctx: &Context);
    fn set_bus_sender(&mut self, tx: Sender<CoreCommand>);
    fn on_core_event(&mut self, evt: CoreEvent);
    fn set_repaint_handle(&mut self, h: RepaintHandle);

    fn window_title(&self) -> String {
        "Burrowser".to_string()
    }
}
