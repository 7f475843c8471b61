// Step grid - the step x row boolean matrix
// Owns pattern data only; timing and edit admission live elsewhere

use rand::Rng;

/// The sequencer pattern: an ordered sequence of step columns, each a
/// column of row activation flags.
///
/// Row 0 is the highest pitch, row `num_rows - 1` the lowest. Every
/// column always holds exactly `num_rows` flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGrid {
    steps: Vec<Vec<bool>>,
    num_rows: usize,
}

impl StepGrid {
    /// Create an empty grid with the given dimensions
    pub fn new(num_steps: usize, num_rows: usize) -> Self {
        Self {
            steps: vec![vec![false; num_rows]; num_steps],
            num_rows,
        }
    }

    /// Number of step columns
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Number of rows per column
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Read a cell; out-of-range coordinates read as inactive
    pub fn cell(&self, step: usize, row: usize) -> bool {
        self.steps
            .get(step)
            .and_then(|column| column.get(row))
            .copied()
            .unwrap_or(false)
    }

    /// Write a cell; out-of-range coordinates are a no-op
    pub fn set(&mut self, step: usize, row: usize, active: bool) {
        if let Some(column) = self.steps.get_mut(step) {
            if let Some(cell) = column.get_mut(row) {
                *cell = active;
            }
        }
    }

    /// Deactivate every cell
    pub fn clear(&mut self) {
        for column in &mut self.steps {
            column.fill(false);
        }
    }

    /// Rows active at the given step
    pub fn active_rows(&self, step: usize) -> impl Iterator<Item = usize> + '_ {
        self.steps
            .get(step)
            .into_iter()
            .flatten()
            .enumerate()
            .filter_map(|(row, &active)| active.then_some(row))
    }

    /// Change the step count, preserving the left-aligned overlap
    ///
    /// Steps below `min(old, new)` keep their contents; added steps
    /// start empty. Existing steps are never reordered.
    pub fn resize_steps(&mut self, new_steps: usize) {
        let num_rows = self.num_rows;
        self.steps.resize_with(new_steps, || vec![false; num_rows]);
    }

    /// Replace the pattern with a random one
    ///
    /// Each step activates between zero and `num_rows / 4` rows, picked
    /// uniformly with replacement (duplicate picks collapse, so the
    /// actual density can be lower than the drawn count).
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        self.clear();

        if self.num_rows == 0 {
            return;
        }
        let max_active = self.num_rows / 4;

        for column in &mut self.steps {
            let count = rng.gen_range(0..=max_active);
            for _ in 0..count {
                let row = rng.gen_range(0..self.num_rows);
                column[row] = true;
            }
        }
    }
}
