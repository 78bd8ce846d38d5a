//! Spinning-triangle demo: window + driving loop around the gyre renderer.
//!
//! The windowing layer owns the presentable surface and its lifetime; the
//! renderer only references it. This binary is the host-application side of
//! that contract: init once, draw on every redraw, forward resizes.

use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use gyre_engine::logging::{self, LoggingConfig};
use gyre_engine::renderer::Renderer;
use gyre_engine::surface::{SurfaceInit, WindowSurface};

struct DemoApp {
    state: Option<DemoState>,
}

struct DemoState {
    window: Arc<Window>,
    renderer: Renderer<WindowSurface<Window>>,
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("gyre — spinning triangle")
            .with_inner_size(LogicalSize::new(800.0, 600.0));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let surface = WindowSurface::new(
            window.clone(),
            (size.width, size.height),
            SurfaceInit::default(),
        );

        let mut renderer = Renderer::new(surface);
        if let Err(e) = renderer.init_blocking() {
            log::error!("renderer initialization failed: {e}");
            event_loop.exit();
            return;
        }

        window.request_redraw();
        self.state = Some(DemoState { window, renderer });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(new_size) => {
                state
                    .renderer
                    .surface_mut()
                    .resize(new_size.width, new_size.height);
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                state.renderer.draw_frame();
                if !state.renderer.is_ready() {
                    // Surface/device loss; this demo exits rather than
                    // re-initializing.
                    event_loop.exit();
                    return;
                }
                state.window.request_redraw();
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    logging::init_logging(LoggingConfig::default());

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = DemoApp { state: None };
    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    Ok(())
}
