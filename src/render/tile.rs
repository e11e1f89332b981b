//! Tile partition of the output image and the per-tile pixel loop

use glam::Vec3;
use log::trace;

use super::antialiasing::SamplingPoint;
use super::buffer_pool::ColorBufferPool;
use super::cancel::CancellationToken;
use super::draw_state::DrawState;
use super::provider::RowProvider;
use super::tracer::{PolynomialTracer, to_rgb};
use crate::SurfError;

/// Rectangle of the output image with exclusive access to its bytes
///
/// `rows[j]` holds the RGB bytes of pixels `x0..x0 + width` in image row `y0 + j`.
#[derive(Debug)]
pub(crate) struct Tile<'a> {
    pub x0: u32,
    pub y0: u32,
    pub width: u32,
    pub rows: Vec<&'a mut [u8]>,
}

impl Tile<'_> {
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }
}

/// Column and row boundaries of the tile partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TileGrid {
    x_bounds: Vec<u32>,
    y_bounds: Vec<u32>,
}

impl TileGrid {
    /// At least two columns, at most one per worker, and three rows, capped by the image size
    pub fn new(width: u32, height: u32, workers: usize) -> Self {
        let workers = u32::try_from(workers).unwrap_or(u32::MAX);
        let columns = width.min(workers.max(2));
        let rows = height.min(3);
        TileGrid {
            x_bounds: bounds(width, columns),
            y_bounds: bounds(height, rows),
        }
    }

    pub fn columns(&self) -> usize {
        self.x_bounds.len().saturating_sub(1)
    }

    pub fn rows(&self) -> usize {
        self.y_bounds.len().saturating_sub(1)
    }

    /// Cut a row-major RGB image into disjoint tiles
    pub fn split<'a>(&self, image: &'a mut [u8], width: u32) -> Vec<Tile<'a>> {
        let columns = self.columns();
        let mut tiles: Vec<Tile<'a>> = Vec::with_capacity(columns * self.rows());
        for ty in 0..self.rows() {
            for tx in 0..columns {
                tiles.push(Tile {
                    x0: self.x_bounds[tx],
                    y0: self.y_bounds[ty],
                    width: self.x_bounds[tx + 1] - self.x_bounds[tx],
                    rows: Vec::new(),
                });
            }
        }

        let row_bytes = width as usize * 3;
        let mut ty = 0;
        for (y, mut row) in image.chunks_exact_mut(row_bytes).enumerate() {
            while y as u32 >= self.y_bounds[ty + 1] {
                ty += 1;
            }
            for tile in &mut tiles[ty * columns..(ty + 1) * columns] {
                let (segment, rest) = std::mem::take(&mut row).split_at_mut(tile.width as usize * 3);
                tile.rows.push(segment);
                row = rest;
            }
        }
        tiles
    }
}

/// `parts + 1` evenly spread boundaries of `0..len`
fn bounds(len: u32, parts: u32) -> Vec<u32> {
    (0..=parts)
        .map(|i| (u64::from(i) * u64::from(len) / u64::from(parts.max(1))) as u32)
        .collect()
}

/// Render one tile, writing each pixel once its final color is known
pub(crate) fn render_tile(
    state: &DrawState,
    mut tile: Tile<'_>,
    buffers: &ColorBufferPool,
    token: &CancellationToken,
) -> Result<(), SurfError> {
    trace!(
        "tile at ({}, {}) {}x{} started",
        tile.x0,
        tile.y0,
        tile.width,
        tile.height()
    );
    let tracer = PolynomialTracer::new(state);
    if state.pattern.uses_corners() {
        render_antialiased(state, &tracer, &mut tile, buffers, token)?;
    } else {
        render_plain(state, &tracer, &mut tile, token)?;
    }
    trace!("tile at ({}, {}) finished", tile.x0, tile.y0);
    Ok(())
}

/// One ray through every pixel centre
fn render_plain(
    state: &DrawState,
    tracer: &PolynomialTracer<'_>,
    tile: &mut Tile<'_>,
    token: &CancellationToken,
) -> Result<(), SurfError> {
    let mut provider = RowProvider::new(state, f64::from(tile.y0), 1);
    let x0 = tile.x0;
    for (j, out) in tile.rows.iter_mut().enumerate() {
        let row = provider.get(j);
        for (i, pixel) in out.chunks_exact_mut(3).enumerate() {
            token.check()?;
            let u = state.ray_creator.u_at(f64::from(x0) + i as f64);
            pixel.copy_from_slice(&to_rgb(tracer.trace(&row, u)));
        }
        provider.release_before(j + 1);
    }
    Ok(())
}

/// Corner samples shared between neighbouring pixels, refined where they disagree
fn render_antialiased(
    state: &DrawState,
    tracer: &PolynomialTracer<'_>,
    tile: &mut Tile<'_>,
    buffers: &ColorBufferPool,
    token: &CancellationToken,
) -> Result<(), SurfError> {
    let steps = state.pattern.steps() as usize;
    let extra = state.pattern.extra_samples();
    let width = tile.width as usize;
    let stride = width + 1;
    // Pixel (i, j) has its upper-left corner at (x0 - 0.5 + i, y0 - 0.5 + j)
    let x_origin = f64::from(tile.x0) - 0.5;

    // Two rows of corner colors, alternating
    let mut corners = buffers.acquire(2 * stride);
    let mut provider = RowProvider::new(state, f64::from(tile.y0) - 0.5, steps as u32);

    for r in 0..=tile.rows.len() {
        let k = r * steps;
        let row = provider.get(k);
        let current = (r % 2) * stride;
        for c in 0..stride {
            token.check()?;
            corners[current + c] = tracer.trace(&row, state.ray_creator.u_at(x_origin + c as f64));
        }
        if r == 0 {
            continue;
        }

        let previous = ((r - 1) % 2) * stride;
        let out = &mut tile.rows[r - 1];
        for (c, pixel) in out.chunks_exact_mut(3).enumerate() {
            let quad = [
                corners[previous + c],
                corners[previous + c + 1],
                corners[current + c],
                corners[current + c + 1],
            ];
            let color = antialias_pixel(
                state,
                tracer,
                &mut provider,
                &quad,
                x_origin + c as f64,
                k - steps,
                &extra,
                token,
            )?;
            pixel.copy_from_slice(&to_rgb(color));
        }
        provider.release_before(k);
    }
    Ok(())
}

/// Average of the corners, plus extra samples from sub-rows `k0..=k0 + steps` when they differ
#[allow(clippy::too_many_arguments)]
fn antialias_pixel(
    state: &DrawState,
    tracer: &PolynomialTracer<'_>,
    provider: &mut RowProvider<'_>,
    quad: &[Vec3; 4],
    x_corner: f64,
    k0: usize,
    extra: &[SamplingPoint],
    token: &CancellationToken,
) -> Result<Vec3, SurfError> {
    let refine = state.pattern.supersamples() && too_different(quad, state.threshold);
    let corner_sum: Vec3 = quad.iter().copied().sum();
    let mut color = corner_sum * if refine { state.pattern.corner_weight() } else { 0.25 };

    if refine {
        let steps = f64::from(state.pattern.steps());
        for sample in extra {
            token.check()?;
            let row = provider.get(k0 + sample.iv as usize);
            let u = state.ray_creator.u_at(x_corner + f64::from(sample.iu) / steps);
            color += tracer.trace(&row, u) * sample.weight;
        }
    }
    Ok(color.clamp(Vec3::ZERO, Vec3::ONE))
}

/// Any two corners at squared distance `threshold^2` or more
fn too_different(quad: &[Vec3; 4], threshold: f32) -> bool {
    let limit = threshold * threshold;
    (0..4).any(|i| (i + 1..4).any(|j| quad[i].distance_squared(quad[j]) >= limit))
}
