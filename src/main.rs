//! frameloop application entry point.
//!
//! Loads configuration, initializes logging, and drives the frame loop:
//! each event-loop iteration either dispatches a pending OS event or runs
//! one full frame cycle (record → submit → present → fence wait). A close
//! request drops the renderer, which drains the GPU queue, and exits.

use frameloop::core::config::Config;
use frameloop::core::error::Result;
use frameloop::core::log;
use tracing::info;

fn main() {
    let config = Config::from_file_or_default("frameloop.toml");
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);

    info!(version = env!("CARGO_PKG_VERSION"), "frameloop starting");
    info!(
        width = config.window.width,
        height = config.window.height,
        vsync = config.graphics.vsync,
        "Presentation configuration"
    );

    if let Err(e) = run(config) {
        tracing::error!("Fatal: {}", e);
        eprintln!("Fatal: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_os = "windows")]
fn run(config: Config) -> Result<()> {
    use frameloop::core::error::FrameLoopError;
    use frameloop::gfx::Renderer;
    use tracing::error;
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::{ControlFlow, EventLoop};

    let event_loop = EventLoop::new()
        .map_err(|e| FrameLoopError::Initialization(format!("event loop: {}", e)))?;

    // Held in an Option so a close request can drop it, draining the GPU
    // queue, before the event loop unwinds.
    let mut renderer = Some(Renderer::new(&event_loop, &config)?);

    info!("Entering frame loop");

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    ..
                } => {
                    info!("Close requested, shutting down");
                    renderer.take();
                    elwt.exit();
                }
                Event::WindowEvent {
                    event: WindowEvent::RedrawRequested,
                    ..
                } => {
                    if let Some(r) = renderer.as_mut() {
                        if let Err(e) = r.draw() {
                            error!("Draw failed: {}", e);
                            renderer.take();
                            elwt.exit();
                        }
                    }
                }
                // No event pending: run exactly one frame cycle.
                Event::AboutToWait => {
                    if let Some(r) = renderer.as_ref() {
                        r.window().request_redraw();
                    }
                }
                _ => (),
            }
        })
        .map_err(|e| FrameLoopError::Initialization(format!("event loop: {}", e)))
}

#[cfg(not(target_os = "windows"))]
fn run(_config: Config) -> Result<()> {
    Err(frameloop::core::error::FrameLoopError::Initialization(
        "this renderer requires Direct3D 12, which is only available on Windows".to_string(),
    ))
}
