mod demo;

use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use skyview_assets::{AssetLoader, FsLoader, LoadTicket, MemoryLoader};
use skyview_client::{EngineConfig, FollowTarget, GameEngine};
use skyview_common::Size;
use skyview_input::winit::WinitHost;
use skyview_kernel::{FixedStepLoop, FrameLoop, World};
use skyview_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

type DesktopEngine = GameEngine<World, FixedStepLoop, WinitHost, WgpuRenderer>;

#[derive(Parser)]
#[command(name = "skyview-desktop", about = "Skyview desktop window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial window width in physical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Directory whose files are loaded as assets at startup
    #[arg(long)]
    assets: Option<PathBuf>,
}

struct DesktopApp {
    config: EngineConfig,
    initial_size: PhysicalSize<u32>,
    assets: Option<PathBuf>,
    window: Option<Arc<Window>>,
    engine: Option<DesktopEngine>,
    ticket: Option<LoadTicket>,
    last_frame: Instant,
}

impl DesktopApp {
    fn new(cli: &Cli, config: EngineConfig) -> Self {
        Self {
            config,
            initial_size: PhysicalSize::new(cli.width.max(1), cli.height.max(1)),
            assets: cli.assets.clone(),
            window: None,
            engine: None,
            ticket: None,
            last_frame: Instant::now(),
        }
    }

    fn build_engine(&mut self, window: &Arc<Window>) -> Result<DesktopEngine> {
        let host = WinitHost::new(window);
        let size = window.inner_size();
        let renderer = WgpuRenderer::new(
            window.clone(),
            Size::new(size.width, size.height),
            self.config.renderer.clone(),
        )?;

        let mut world = World::with_tick_rate(self.config.tick_rate_hz);
        let shapes = demo::populate(&mut world);

        let loader: Box<dyn AssetLoader> = match &self.assets {
            Some(dir) => Box::new(FsLoader::new(dir)),
            None => Box::new(MemoryLoader::new()),
        };

        let mut engine = GameEngine::new(
            self.config.clone(),
            world,
            self.config.frame_loop(),
            host,
            renderer,
            loader,
        );
        for shape in shapes {
            engine.stage().add_child(shape);
        }
        engine.set_camera_strategy(Box::new(
            FollowTarget::new(self.config.camera_zoom)
                .with_deadzone(Vec2::new(64.0, 48.0))
                .with_bounds(demo::WORLD_BOUNDS),
        ));

        if let Some(dir) = &self.assets {
            let found = FsLoader::new(dir).discover()?;
            tracing::info!(count = found.len(), dir = %dir.display(), "queueing assets");
            engine.add_all(found);
            self.ticket = Some(engine.load());
        }

        engine.start();
        Ok(engine)
    }

    fn check_ticket(&mut self) {
        let Some(ticket) = &mut self.ticket else {
            return;
        };
        match ticket.try_take() {
            Some(Ok(table)) => {
                tracing::info!(count = table.len(), "assets ready");
                self.ticket = None;
            }
            Some(Err(e)) => {
                tracing::warn!("asset load finished with errors: {e}");
                self.ticket = None;
            }
            None => {}
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Skyview")
            .with_inner_size(self.initial_size);
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.build_engine(&window) {
            Ok(engine) => {
                self.engine = Some(engine);
                self.last_frame = Instant::now();
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                tracing::error!("failed to start engine: {e:#}");
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
        let Some(engine) = &mut self.engine else {
            return;
        };
        engine.host_mut().push_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                engine.destroy();
                event_loop.exit();
            }
            // Events are pumped inside a frame, so a stopped loop still
            // needs one redraw to see the focus that resumes it.
            WindowEvent::Focused(true) => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let elapsed = now - self.last_frame;
                self.last_frame = now;
                engine.frame(elapsed);

                if engine.render_count() > 0 && engine.render_count() % 600 == 0 {
                    tracing::debug!(
                        fps = engine.frame_timer().fps(),
                        updates = engine.update_count(),
                        renders = engine.render_count(),
                        "frame stats"
                    );
                }
                self.check_ticket();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let running = self
            .engine
            .as_ref()
            .is_some_and(|e| e.is_running() && e.frame_loop().is_running());
        if let (true, Some(window)) = (running, &self.window) {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("skyview-desktop starting");

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = DesktopApp::new(&cli, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
