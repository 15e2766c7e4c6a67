use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use glam::Vec2;
use skyview_assets::{FsLoader, MemoryLoader};
use skyview_client::{EngineConfig, FixedView, FollowTarget, GameEngine};
use skyview_common::{Color, Key, Size};
use skyview_input::{ContainerMetrics, HeadlessHost, HostEvent};
use skyview_kernel::{Entity, FixedStepLoop, RenderHook, TickContext, World};
use skyview_render::{DebugTextRenderer, Shape, ShapeHandle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

type HeadlessEngine = GameEngine<World, FixedStepLoop, HeadlessHost, DebugTextRenderer>;

#[derive(Parser)]
#[command(name = "skyview-cli", about = "Headless runner for the skyview client loop")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective engine config
    Info,
    /// Run the loop headlessly and print what each frame would draw
    Simulate(SimulateArgs),
    /// Load every file in a directory through the asset pipeline
    Load {
        /// Asset root directory
        dir: PathBuf,
        /// Give up after this many seconds
        #[arg(long, default_value = "10")]
        timeout_secs: u64,
    },
    /// Convert a screen position to world space under a fixed camera
    Pick {
        x: f32,
        y: f32,
        #[arg(long, default_value = "1.0")]
        zoom: f32,
        #[arg(long, default_value = "0.0")]
        origin_x: f32,
        #[arg(long, default_value = "0.0")]
        origin_y: f32,
        #[arg(long, default_value = "800")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
    },
}

#[derive(Args)]
struct SimulateArgs {
    /// Number of host frames to run
    #[arg(short, long, default_value = "5")]
    frames: u64,
    /// Container width; 0 simulates a missing container
    #[arg(long, default_value = "800")]
    width: u32,
    /// Container height; 0 simulates a missing container
    #[arg(long, default_value = "600")]
    height: u32,
    /// Host frame length in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,
    /// Frame at which the window loses focus
    #[arg(long)]
    blur_at: Option<u64>,
    /// Frame at which the window regains focus
    #[arg(long)]
    focus_at: Option<u64>,
    /// Hold the right arrow for the whole run
    #[arg(long)]
    hold_right: bool,
}

/// Moves right while the right arrow is held and keeps its square in step.
struct Rover {
    position: Vec2,
    shape: ShapeHandle,
}

impl Entity for Rover {
    fn update(&mut self, ctx: &TickContext<'_>) {
        if ctx.keys.is_held(Key::Right) {
            self.position.x += 120.0 * ctx.dt as f32;
        }
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn render_hook(&mut self) -> Option<&mut dyn RenderHook> {
        Some(self)
    }
}

impl RenderHook for Rover {
    fn handle_render(&mut self, _delta: f64) {
        self.shape.set_position(self.position - Vec2::splat(8.0));
    }
}

fn headless_engine(config: EngineConfig, size: Size, world: World) -> HeadlessEngine {
    let container = (!size.is_empty()).then(|| ContainerMetrics::new(size));
    let renderer = DebugTextRenderer::new(config.renderer.clone(), size);
    let frame_loop = config.frame_loop();
    GameEngine::new(
        config,
        world,
        frame_loop,
        HeadlessHost::new(container),
        renderer,
        Box::new(MemoryLoader::new()),
    )
}

fn simulate(config: EngineConfig, args: SimulateArgs) {
    let mut world = World::with_tick_rate(config.tick_rate_hz);
    let shape = ShapeHandle::new(Shape::filled(Vec2::ZERO, Vec2::splat(16.0), Color(0xFFD700)));
    let rover = world.spawn(Box::new(Rover {
        position: Vec2::ZERO,
        shape: shape.clone(),
    }));
    world.set_camera_target(Some(rover));

    let zoom = config.camera_zoom;
    let size = Size::new(args.width, args.height);
    let mut engine = headless_engine(config, size, world);
    engine.stage().add_child(shape);
    engine.set_camera_strategy(Box::new(FollowTarget::new(zoom)));
    if args.hold_right {
        engine.host_mut().emit(HostEvent::Key {
            key: Key::Right,
            pressed: true,
        });
    }
    engine.start();

    let step = Duration::from_millis(args.frame_ms);
    for frame in 0..args.frames {
        if args.blur_at == Some(frame) {
            engine.host_mut().emit(HostEvent::Blur);
        }
        if args.focus_at == Some(frame) {
            engine.host_mut().emit(HostEvent::Focus);
        }
        match engine.frame(step) {
            Some(out) => print!("{out}"),
            None => println!(
                "--- frame {frame}: no render (suspended={}) ---",
                engine.focus().is_suspended()
            ),
        }
    }

    let view = engine.camera().view_box();
    println!(
        "updates={} renders={} suspensions={} resumes={}",
        engine.update_count(),
        engine.render_count(),
        engine.focus().suspensions(),
        engine.focus().resumes()
    );
    println!(
        "view box: origin=({:.1}, {:.1}) size=({:.1}, {:.1})",
        view.x, view.y, view.width, view.height
    );
    engine.destroy();
}

fn load(config: EngineConfig, dir: PathBuf, timeout: Duration) -> anyhow::Result<()> {
    let loader = FsLoader::new(&dir);
    let found = loader
        .discover()
        .with_context(|| format!("reading asset directory {}", dir.display()))?;
    println!("Found {} file(s) under {}", found.len(), dir.display());

    let size = config.fallback_surface;
    let renderer = DebugTextRenderer::new(config.renderer.clone(), size);
    let frame_loop = config.frame_loop();
    let mut engine = GameEngine::new(
        config,
        World::new(),
        frame_loop,
        HeadlessHost::default(),
        renderer,
        Box::new(loader),
    );
    engine.add_all(found);
    let mut ticket = engine.load();

    let deadline = Instant::now() + timeout;
    let result = loop {
        engine.poll_loads();
        if let Some(result) = ticket.try_take() {
            break result;
        }
        if Instant::now() > deadline {
            anyhow::bail!("asset load timed out after {}s", timeout.as_secs());
        }
        std::thread::sleep(Duration::from_millis(5));
    };

    for (key, resource) in engine.resources().iter() {
        println!(
            "  {key:<32} {:?} {:>8} bytes  id={}",
            resource.kind,
            resource.len(),
            resource.id
        );
    }
    match result {
        Ok(table) => println!("Loaded {} asset(s)", table.len()),
        Err(e) => {
            println!("Loaded {} asset(s)", engine.resources().len());
            return Err(e.into());
        }
    }
    Ok(())
}

fn pick(config: EngineConfig, screen: Vec2, zoom: f32, origin: Vec2, size: Size) {
    let mut engine = headless_engine(config, size, World::new());
    engine.set_camera_strategy(Box::new(FixedView::new(origin, zoom)));
    // Placement happens during render.
    engine.render(0.0);

    let world = engine.screen_to_world_position(screen.x, screen.y);
    let back = engine.world_to_screen_position(world.x, world.y);
    let scale = engine.stage().scale();
    println!("scale: ({:.3}, {:.3})", scale.x, scale.y);
    println!(
        "screen ({:.2}, {:.2}) -> world ({:.2}, {:.2})",
        screen.x, screen.y, world.x, world.y
    );
    println!(
        "world ({:.2}, {:.2}) -> screen ({:.2}, {:.2})",
        world.x, world.y, back.x, back.y
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("skyview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Simulate(args) => simulate(config, args),
        Commands::Load { dir, timeout_secs } => {
            load(config, dir, Duration::from_secs(timeout_secs))?
        }
        Commands::Pick {
            x,
            y,
            zoom,
            origin_x,
            origin_y,
            width,
            height,
        } => pick(
            config,
            Vec2::new(x, y),
            zoom,
            Vec2::new(origin_x, origin_y),
            Size::new(width, height),
        ),
    }

    Ok(())
}
