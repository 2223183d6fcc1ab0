use std::path::PathBuf;

use cavern_assets::load_obj;
use cavern_collision::CollisionMesh;
use cavern_common::CellId;
use cavern_level::{CellTracker, Level, LevelConfig, PathFollower};
use cavern_nav::{BuildReport, NavGraph, quad_grid};
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cavern-cli", about = "CLI tool for cavern level collision and navigation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Level config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Load a level and print mesh statistics
    Inspect {
        /// Collision mesh file
        #[arg(long)]
        collision: PathBuf,
        /// Navigation mesh file (quads)
        #[arg(long)]
        nav: PathBuf,
    },
    /// Find a route between two navigation cells
    Path {
        /// Navigation mesh file (quads)
        #[arg(long)]
        nav: PathBuf,
        #[arg(long)]
        start: usize,
        #[arg(long)]
        goal: usize,
        /// Cell to mark as an obstacle (repeatable)
        #[arg(long = "block")]
        blocked: Vec<usize>,
    },
    /// Drop a sphere onto the collision mesh and print where it settles
    Drop {
        /// Collision mesh file
        #[arg(long)]
        collision: PathBuf,
        #[arg(long, default_value = "0")]
        x: f32,
        #[arg(long, default_value = "10")]
        y: f32,
        #[arg(long, default_value = "0")]
        z: f32,
        /// Distance to fall
        #[arg(long, default_value = "20")]
        fall: f32,
        #[arg(long, default_value = "1")]
        radius: f32,
    },
    /// Walk an entity along a generated corridor
    Demo {
        /// Corridor length in cells
        #[arg(long, default_value = "6")]
        cells: usize,
        /// Cell to block before searching
        #[arg(long)]
        block: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => LevelConfig::load(path)?,
        None => LevelConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("cavern-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", cavern_assets::crate_info());
            println!("collision: {}", cavern_collision::crate_info());
            println!("nav: {}", cavern_nav::crate_info());
            println!("level: {}", cavern_level::crate_info());
        }
        Commands::Inspect { collision, nav } => {
            let level = Level::load(&collision, &nav, config)?;
            let report = level.build_report();
            let floors = level
                .collision()
                .triangles()
                .iter()
                .filter(|t| t.normal().y >= level.config().floor_normal_y)
                .count();
            println!(
                "collision: {} triangles ({} floor, {} rejected)",
                level.collision().len(),
                floors,
                level.collision().rejected_count()
            );
            println!("navigation: {} cells", level.nav().len());
            println!(
                "edges: {} shared, {} boundary, {} non-manifold, {} degenerate",
                report.shared_edges,
                report.boundary_edges,
                report.non_manifold_edges,
                report.degenerate_edges
            );
            let isolated = level
                .nav()
                .cells()
                .iter()
                .filter(|c| c.neighbors().is_empty())
                .count();
            println!("isolated cells: {isolated}");
        }
        Commands::Path {
            nav,
            start,
            goal,
            blocked,
        } => {
            let (graph, report) = NavGraph::from_mesh(&load_obj(&nav)?);
            let mut level = Level::new(CollisionMesh::default(), graph, report, config)?;
            for cell in blocked {
                level.set_obstacle(CellId(cell), true)?;
            }
            match level.find_path_detailed(CellId(start), CellId(goal)) {
                Some(path) => {
                    let cells: Vec<String> = path.cells().iter().map(|c| c.0.to_string()).collect();
                    println!("route: {}", cells.join(" -> "));
                    println!("cost: {:.3}", path.total_cost());
                }
                None => println!("no path from {start} to {goal}"),
            }
        }
        Commands::Drop {
            collision,
            x,
            y,
            z,
            fall,
            radius,
        } => {
            let mesh = CollisionMesh::from_triangles(load_obj(&collision)?.triangles());
            let level = Level::new(mesh, NavGraph::default(), BuildReport::default(), config)?;
            let origin = Vec3::new(x, y, z);
            let m = level.move_entity(origin, Vec3::new(0.0, -fall, 0.0), radius);
            println!(
                "from ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
                origin.x, origin.y, origin.z, m.position.x, m.position.y, m.position.z
            );
            println!(
                "grounded={}, hit_wall={}, bounces={}",
                m.grounded, m.hit_wall, m.bounces
            );
        }
        Commands::Demo { cells, block } => {
            if cells < 2 {
                anyhow::bail!("demo corridor needs at least 2 cells");
            }
            run_demo(cells, block, config)?;
        }
    }

    Ok(())
}

fn run_demo(cells: usize, block: Option<usize>, config: LevelConfig) -> anyhow::Result<()> {
    const RADIUS: f32 = 0.5;
    let mut level = Level::from_quads(&quad_grid(cells, 1, 2.0), config)?;
    if let Some(cell) = block {
        level.set_obstacle(CellId(cell), true)?;
    }

    let goal = CellId(cells - 1);
    let Some(route) = level.find_path(CellId(0), goal) else {
        println!("no path from {} to {goal}, staying idle", CellId(0));
        return Ok(());
    };
    println!(
        "route: {}",
        route
            .iter()
            .map(|c| c.0.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    let mut position = level.resolve_movement(Vec3::new(1.0, 3.0, 1.0), Vec3::new(0.0, -5.0, 0.0), RADIUS);
    let mut tracker = CellTracker::new();
    tracker.update(&level, position);
    let mut follower = PathFollower::from_route(&level, &route, 0.25);

    let mut ticks = 0;
    while !follower.is_finished() && ticks < 1000 {
        let step = follower.steer(position, 0.5) + Vec3::new(0.0, -0.5, 0.0);
        position = level.move_entity(position, step, RADIUS).position;
        if tracker.update(&level, position) {
            tracing::info!(tick = ticks, cell = ?tracker.current(), "entered cell");
        }
        ticks += 1;
    }
    println!(
        "arrived at ({:.2}, {:.2}, {:.2}) in cell {:?} after {ticks} ticks",
        position.x,
        position.y,
        position.z,
        tracker.current().map(|c| c.0)
    );
    Ok(())
}
