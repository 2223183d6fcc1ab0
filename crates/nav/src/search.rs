use std::cmp::Ordering;
use std::collections::BinaryHeap;

use cavern_common::CellId;

use crate::graph::NavGraph;
use crate::path::Path;

/// Open-list entry. Lower `priority` pops first; equal priorities pop in
/// insertion order.
struct Frontier {
    priority: f32,
    seq: u64,
    path: Path,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: invert both keys.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl NavGraph {
    /// A* search from `start` to `goal` over non-obstacle cells.
    ///
    /// Step cost is the distance between neighboring centroids; the heuristic
    /// is the straight-line distance to the goal's centroid. Returns `None`
    /// for out-of-range ids, a blocked start cell or an unreachable goal.
    pub fn find_path(&self, start: CellId, goal: CellId) -> Option<Path> {
        let _span = tracing::debug_span!("find_path", %start, %goal).entered();
        let (Some(start_cell), Some(goal_cell)) = (self.cell(start), self.cell(goal)) else {
            tracing::debug!(cells = self.len(), "path endpoint out of range");
            return None;
        };
        if start_cell.is_obstacle() {
            tracing::debug!("start cell is an obstacle");
            return None;
        }
        let target = goal_cell.centroid();

        let mut closed = vec![false; self.len()];
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;
        open.push(Frontier {
            priority: 0.0,
            seq,
            path: Path::start(start),
        });

        let mut expanded = 0usize;
        while let Some(Frontier { path, .. }) = open.pop() {
            let current = path.cell();
            if closed[current.0] {
                continue;
            }
            if current == goal {
                tracing::trace!(
                    expanded,
                    cost = path.total_cost(),
                    "path found"
                );
                return Some(path);
            }
            closed[current.0] = true;
            expanded += 1;

            let here = &self.cells[current.0];
            for &next in here.neighbors() {
                let cell = &self.cells[next.0];
                if cell.is_obstacle() || closed[next.0] {
                    continue;
                }
                let step = here.centroid().distance(cell.centroid());
                let extended = path.add_step(next, step);
                seq += 1;
                open.push(Frontier {
                    priority: extended.total_cost() + cell.centroid().distance(target),
                    seq,
                    path: extended,
                });
            }
        }

        tracing::debug!(expanded, "goal unreachable");
        None
    }
}
