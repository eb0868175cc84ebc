use std::sync::Arc;
use std::time::{Duration, Instant};

use viewctl_rs::settings::ViewSettings;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

use crate::app::app::App;

/// Controller steps are fixed-size, so they run on a fixed 60 Hz clock.
const TICK: Duration = Duration::from_micros(16_667);

/// Deadline of the next controller tick.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    next: Instant,
}

impl TickClock {
    pub fn new(now: Instant) -> Self {
        Self { next: now }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Returns whether a tick is due at `now` and schedules the next one. A
    /// host that stalled for several ticks runs one and starts over from `now`
    /// instead of catching up.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += TICK;
        if self.next <= now {
            self.next = now + TICK;
        }
        true
    }
}

pub struct AppHandler {
    pub app: Option<App>,
    pub settings: ViewSettings,
    clock: TickClock,
    /// First failure while creating the window or scene; `main` reports it.
    pub error: Option<anyhow::Error>,
}

impl AppHandler {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            app: None,
            settings,
            clock: TickClock::new(Instant::now()),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<App> {
        let window_attrs = Window::default_attributes()
            .with_title("viewctl-rs - alt+click to focus, esc to return")
            .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0));
        let window = event_loop.create_window(window_attrs)?;
        Ok(App::new(Arc::new(window), self.settings.clone())?)
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(err) => {
                log::error!("failed to start: {err:#}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(app) = &mut self.app {
            app.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.clock.poll(Instant::now()) {
            if let Some(app) = &mut self.app {
                app.update();
                app.window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.deadline()));
    }
}
