use std::rc::Rc;

use super::draw_state::DrawState;
use crate::poly::{ColumnSubstitutor, GradientColumnSubstitutor};

/// Surface and gradient specialised to one v
#[derive(Debug)]
pub(crate) struct RowPair {
    pub v: f64,
    pub surface: ColumnSubstitutor,
    pub gradient: GradientColumnSubstitutor,
}

/// Per-tile cache of row substitutors
///
/// Sub-rows are addressed by integer index: sub-row `k` lies at pixel row
/// `origin + k / steps`, so samples on the same sub-row share one entry no
/// matter how their v was computed.
#[derive(Debug)]
pub(crate) struct RowProvider<'a> {
    state: &'a DrawState,
    origin: f64,
    steps: f64,
    rows: Vec<Option<Rc<RowPair>>>,
}

impl<'a> RowProvider<'a> {
    pub fn new(state: &'a DrawState, origin: f64, steps: u32) -> Self {
        RowProvider {
            state,
            origin,
            steps: f64::from(steps.max(1)),
            rows: Vec::new(),
        }
    }

    pub fn get(&mut self, k: usize) -> Rc<RowPair> {
        if k >= self.rows.len() {
            self.rows.resize(k + 1, None);
        }
        if let Some(row) = &self.rows[k] {
            return Rc::clone(row);
        }
        let v = self.state.ray_creator.v_at(self.origin + k as f64 / self.steps);
        let row = Rc::new(RowPair {
            v,
            surface: self.state.rows.for_row(v),
            gradient: self.state.gradient_rows.for_row(v),
        });
        self.rows[k] = Some(Rc::clone(&row));
        row
    }

    /// Drop cached sub-rows with index below `k`
    pub fn release_before(&mut self, k: usize) {
        for slot in self.rows.iter_mut().take(k) {
            *slot = None;
        }
    }
}
