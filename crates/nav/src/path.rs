use std::rc::Rc;

use cavern_common::CellId;

/// A route through the graph, stored as a persistent linked list.
///
/// The head is the most recent cell; each step points back towards the
/// start. [`Path::add_step`] returns a new path and leaves `self` untouched,
/// so every branch of the search frontier shares its common prefix.
#[derive(Debug, Clone)]
pub struct Path {
    head: Rc<Step>,
}

#[derive(Debug)]
struct Step {
    cell: CellId,
    total_cost: f32,
    previous: Option<Path>,
}

impl Drop for Step {
    // Unlink iteratively so long chains don't recurse once per step.
    fn drop(&mut self) {
        let mut next = self.previous.take();
        while let Some(path) = next {
            match Rc::try_unwrap(path.head) {
                Ok(mut step) => next = step.previous.take(),
                Err(_) => break,
            }
        }
    }
}

impl Path {
    /// A single-cell path with zero cost.
    pub fn start(cell: CellId) -> Self {
        Self {
            head: Rc::new(Step {
                cell,
                total_cost: 0.0,
                previous: None,
            }),
        }
    }

    /// Extend by one cell at `step_cost`.
    pub fn add_step(&self, cell: CellId, step_cost: f32) -> Self {
        Self {
            head: Rc::new(Step {
                cell,
                total_cost: self.head.total_cost + step_cost,
                previous: Some(self.clone()),
            }),
        }
    }

    /// The last cell reached.
    pub fn cell(&self) -> CellId {
        self.head.cell
    }

    /// Accumulated cost from the start to [`Path::cell`].
    pub fn total_cost(&self) -> f32 {
        self.head.total_cost
    }

    /// The path without its last step.
    pub fn previous(&self) -> Option<&Path> {
        self.head.previous.as_ref()
    }

    /// Number of cells, including the start.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Walk from the last cell back to the start, yielding
    /// `(cell, cost so far)`.
    pub fn iter(&self) -> Steps<'_> {
        Steps { next: Some(self) }
    }

    /// Cells in travel order, start first.
    pub fn cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.iter().map(|(cell, _)| cell).collect();
        cells.reverse();
        cells
    }

    /// Whether two paths share the same head node.
    pub fn ptr_eq(&self, other: &Path) -> bool {
        Rc::ptr_eq(&self.head, &other.head)
    }
}

/// Iterator over a [`Path`] from its last cell back to the start.
pub struct Steps<'a> {
    next: Option<&'a Path>,
}

impl Iterator for Steps<'_> {
    type Item = (CellId, f32);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.next?;
        self.next = path.previous();
        Some((path.cell(), path.total_cost()))
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = (CellId, f32);
    type IntoIter = Steps<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
