use std::path::Path as FsPath;

use cavern_assets::{MeshError, ObjMesh, QuadFace, load_obj, parse_obj};
use cavern_collision::{CollisionMesh, Resolution, Surface, SweepQuery};
use cavern_common::CellId;
use cavern_nav::{BuildReport, NavError, NavGraph, Path};
use glam::Vec3;

use crate::config::{ConfigError, LevelConfig};

/// Errors from building or mutating a level.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("navigation error: {0}")]
    Nav(#[from] NavError),
}

/// Result of moving an entity through the level for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub position: Vec3,
    /// Touched a floor-classified surface at some point during the move.
    pub grounded: bool,
    /// Touched a wall-classified surface at some point during the move.
    pub hit_wall: bool,
    /// Number of slide bounces taken.
    pub bounces: usize,
}

/// A loaded level: collision mesh, navigation graph and query settings.
#[derive(Debug, Clone)]
pub struct Level {
    collision: CollisionMesh,
    nav: NavGraph,
    config: LevelConfig,
    report: BuildReport,
}

impl Level {
    /// Assemble a level from prebuilt parts, validating the config and
    /// applying its blocked cells.
    pub fn new(
        collision: CollisionMesh,
        nav: NavGraph,
        report: BuildReport,
        config: LevelConfig,
    ) -> Result<Self, LevelError> {
        config.validate()?;
        let mut nav = nav;
        for cell in &config.blocked_cells {
            nav.set_obstacle(*cell, true)?;
        }
        tracing::info!(
            triangles = collision.len(),
            cells = nav.len(),
            blocked = config.blocked_cells.len(),
            "level ready"
        );
        Ok(Self {
            collision,
            nav,
            config,
            report,
        })
    }

    /// Build from a parsed collision mesh and a parsed navigation mesh.
    pub fn from_meshes(
        collision: &ObjMesh,
        nav: &ObjMesh,
        config: LevelConfig,
    ) -> Result<Self, LevelError> {
        let collision = CollisionMesh::from_triangles(collision.triangles());
        let (nav, report) = NavGraph::from_mesh(nav);
        Self::new(collision, nav, report, config)
    }

    /// Build from mesh source text.
    pub fn from_sources(
        collision_src: &str,
        nav_src: &str,
        config: LevelConfig,
    ) -> Result<Self, LevelError> {
        let collision = parse_obj(collision_src)?;
        let nav = parse_obj(nav_src)?;
        Self::from_meshes(&collision, &nav, config)
    }

    /// Load both meshes from disk.
    pub fn load(
        collision_path: impl AsRef<FsPath>,
        nav_path: impl AsRef<FsPath>,
        config: LevelConfig,
    ) -> Result<Self, LevelError> {
        let _span = tracing::info_span!("level_load").entered();
        let collision = load_obj(collision_path)?;
        let nav = load_obj(nav_path)?;
        Self::from_meshes(&collision, &nav, config)
    }

    /// A level whose walkable quads double as its collision floor.
    pub fn from_quads(faces: &[QuadFace], config: LevelConfig) -> Result<Self, LevelError> {
        let collision = CollisionMesh::from_triangles(faces.iter().flat_map(|f| {
            let [a, b, c, d] = f.positions;
            [[a, b, c], [c, d, a]]
        }));
        let (nav, report) = NavGraph::build_with_report(faces);
        Self::new(collision, nav, report, config)
    }

    pub fn collision(&self) -> &CollisionMesh {
        &self.collision
    }

    pub fn nav(&self) -> &NavGraph {
        &self.nav
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn build_report(&self) -> BuildReport {
        self.report
    }

    fn sweep(&self, origin: Vec3, displacement: Vec3, radius: f32) -> Resolution {
        let query = SweepQuery::new(origin, displacement, radius)
            .with_max_bounces(self.config.max_bounces)
            .with_skin_width(self.config.skin_width);
        self.collision.sweep(&query)
    }

    /// Corrected center of a sphere moved by `displacement`.
    pub fn resolve_movement(&self, origin: Vec3, displacement: Vec3, radius: f32) -> Vec3 {
        self.sweep(origin, displacement, radius).position
    }

    /// Move an entity's bounding sphere and report what it touched.
    pub fn move_entity(&self, origin: Vec3, displacement: Vec3, radius: f32) -> Movement {
        let res = self.sweep(origin, displacement, radius);
        let threshold = self.config.floor_normal_y;
        Movement {
            position: res.position,
            grounded: res.touched(Surface::Floor, threshold),
            hit_wall: res.touched(Surface::Wall, threshold),
            bounces: res.contacts.len(),
        }
    }

    /// Whether a particle travelling `displacement` from `origin` hits geometry.
    pub fn test_emitter_collision(&self, origin: Vec3, displacement: Vec3) -> bool {
        self.collision.test_emitter_collision(origin, displacement)
    }

    /// Navigation cell under `point`, using `hint` (usually the entity's
    /// previous cell) to search nearby first.
    pub fn locate_cell(&self, point: Vec3, hint: Option<CellId>) -> Option<CellId> {
        match hint {
            Some(hint) => self.nav.locate_cell_from(point, hint, &self.config.locate),
            None => self.nav.locate_cell(point, &self.config.locate),
        }
    }

    /// Route from `start` to `goal`, start first. `None` means stay put.
    pub fn find_path(&self, start: CellId, goal: CellId) -> Option<Vec<CellId>> {
        self.find_path_detailed(start, goal).map(|p| p.cells())
    }

    /// Route with its accumulated costs.
    pub fn find_path_detailed(&self, start: CellId, goal: CellId) -> Option<Path> {
        self.nav.find_path(start, goal)
    }

    /// Flag a cell as blocked or clear it. Call between ticks, never during
    /// a search.
    pub fn set_obstacle(&mut self, cell: CellId, obstacle: bool) -> Result<(), LevelError> {
        self.nav.set_obstacle(cell, obstacle)?;
        Ok(())
    }

    pub fn is_obstacle(&self, cell: CellId) -> Option<bool> {
        self.nav.cell(cell).map(|c| c.is_obstacle())
    }

    /// Centroids to walk through for a route.
    pub fn waypoints(&self, route: &[CellId]) -> Vec<Vec3> {
        self.nav.waypoints(route)
    }
}
