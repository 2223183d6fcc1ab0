use std::collections::BTreeMap;

use cavern_assets::{ObjMesh, QuadFace};
use cavern_common::{CellId, Ray};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::cell::{Edge, NavCell};

/// Errors from navigation graph operations.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("cell {cell} out of range ({count} cells)")]
    CellOutOfRange { cell: CellId, count: usize },
}

/// Edge statistics gathered while building adjacency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Edges owned by a single cell.
    pub boundary_edges: usize,
    /// Edges shared by exactly two cells; each one links a neighbor pair.
    pub shared_edges: usize,
    /// Edges claimed by three or more cells. Left unlinked.
    pub non_manifold_edges: usize,
    /// Edges whose two endpoints are the same vertex. Ignored.
    pub degenerate_edges: usize,
}

/// Downward probe used to find the cell under a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocateProbe {
    /// How far above the point the probe starts.
    pub height: f32,
    /// How far below the point the probe reaches.
    pub depth: f32,
    /// Scan every cell when the hint and its neighbors all miss.
    pub fallback_full_scan: bool,
}

impl Default for LocateProbe {
    fn default() -> Self {
        Self {
            height: 0.5,
            depth: 4.0,
            fallback_full_scan: true,
        }
    }
}

impl LocateProbe {
    fn ray(&self, point: Vec3) -> Ray {
        Ray::new(point + Vec3::Y * self.height, Vec3::NEG_Y)
            .with_max_distance(self.height + self.depth)
    }
}

/// The navigation graph: one node per quad cell, linked across shared edges.
#[derive(Debug, Clone, Default)]
pub struct NavGraph {
    pub(crate) cells: Vec<NavCell>,
}

impl NavGraph {
    /// Build cells and adjacency from quad faces.
    pub fn build(faces: &[QuadFace]) -> Self {
        Self::build_with_report(faces).0
    }

    /// Build from every quad face of a parsed mesh.
    pub fn from_mesh(mesh: &ObjMesh) -> (Self, BuildReport) {
        Self::build_with_report(&mesh.quads())
    }

    /// Build cells and adjacency, also returning edge statistics.
    ///
    /// Edges are keyed by global vertex index. An edge shared by exactly two
    /// cells links them; edges with more owners are reported and skipped.
    pub fn build_with_report(faces: &[QuadFace]) -> (Self, BuildReport) {
        let _span = tracing::info_span!("nav_build", faces = faces.len()).entered();
        let mut report = BuildReport::default();

        let mut cells: Vec<NavCell> = faces
            .iter()
            .enumerate()
            .map(|(i, face)| NavCell::new(CellId(i), face))
            .collect();

        // Ordered map keeps neighbor lists identical from run to run.
        let mut owners: BTreeMap<Edge, Vec<CellId>> = BTreeMap::new();
        for cell in &cells {
            for edge in cell.edges() {
                if edge.is_degenerate() {
                    tracing::warn!(cell = %cell.id(), ?edge, "skipping degenerate navigation edge");
                    report.degenerate_edges += 1;
                    continue;
                }
                owners.entry(edge).or_default().push(cell.id());
            }
        }

        for (edge, ids) in &owners {
            match ids.as_slice() {
                [_] => report.boundary_edges += 1,
                [a, b] if a == b => {
                    tracing::warn!(cell = %a, ?edge, "cell repeats an edge");
                    report.degenerate_edges += 1;
                }
                [a, b] => {
                    link(&mut cells, *a, *b);
                    report.shared_edges += 1;
                }
                _ => {
                    tracing::warn!(?edge, owners = ids.len(), "non-manifold navigation edge left unlinked");
                    report.non_manifold_edges += 1;
                }
            }
        }

        tracing::debug!(
            cells = cells.len(),
            boundary = report.boundary_edges,
            shared = report.shared_edges,
            non_manifold = report.non_manifold_edges,
            degenerate = report.degenerate_edges,
            "built navigation graph"
        );
        (Self { cells }, report)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[NavCell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&NavCell> {
        self.cells.get(id.0)
    }

    /// Flag or clear a cell as blocked for future searches.
    pub fn set_obstacle(&mut self, id: CellId, obstacle: bool) -> Result<(), NavError> {
        let count = self.cells.len();
        let cell = self
            .cells
            .get_mut(id.0)
            .ok_or(NavError::CellOutOfRange { cell: id, count })?;
        if cell.obstacle != obstacle {
            tracing::debug!(cell = %id, obstacle, "obstacle flag changed");
        }
        cell.obstacle = obstacle;
        Ok(())
    }

    /// Clear every obstacle flag.
    pub fn clear_obstacles(&mut self) {
        for cell in &mut self.cells {
            cell.obstacle = false;
        }
    }

    /// Centroids of the given cells, skipping ids that are out of range.
    pub fn waypoints(&self, route: &[CellId]) -> Vec<Vec3> {
        route
            .iter()
            .filter_map(|id| self.cell(*id).map(NavCell::centroid))
            .collect()
    }

    /// First cell (by index) under `point`, scanning every cell.
    pub fn locate_cell(&self, point: Vec3, probe: &LocateProbe) -> Option<CellId> {
        let ray = probe.ray(point);
        self.cells
            .iter()
            .find(|cell| cell.is_hit_by(&ray))
            .map(NavCell::id)
    }

    /// Cell under `point`, trying `hint` and then its neighbors first.
    ///
    /// Entities that moved since the last tick are almost always still in
    /// their previous cell or next to it. If those all miss the probe falls
    /// back to a full scan, unless `fallback_full_scan` is off.
    pub fn locate_cell_from(&self, point: Vec3, hint: CellId, probe: &LocateProbe) -> Option<CellId> {
        let ray = probe.ray(point);
        if let Some(cell) = self.cell(hint) {
            if cell.is_hit_by(&ray) {
                return Some(hint);
            }
            let near = cell
                .neighbors()
                .iter()
                .copied()
                .find(|n| self.cells[n.0].is_hit_by(&ray));
            if near.is_some() {
                return near;
            }
        }
        if probe.fallback_full_scan {
            tracing::trace!(%hint, "hinted locate missed, scanning all cells");
            self.locate_cell(point, probe)
        } else {
            None
        }
    }
}

fn link(cells: &mut [NavCell], a: CellId, b: CellId) {
    if !cells[a.0].neighbors.contains(&b) {
        cells[a.0].neighbors.push(b);
    }
    if !cells[b.0].neighbors.contains(&a) {
        cells[b.0].neighbors.push(a);
    }
}
