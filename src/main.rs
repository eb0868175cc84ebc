use anyhow::Context;
use viewctl_rs::settings::ViewSettings;
use winit::event_loop::{ControlFlow, EventLoop};

mod app;

use app::handler::AppHandler;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = ViewSettings::load();
    settings.validate().context("invalid view settings")?;

    if std::env::args().skip(1).any(|arg| arg == "--dump-settings") {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut handler = AppHandler::new(settings);
    event_loop.run_app(&mut handler)?;

    match handler.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
