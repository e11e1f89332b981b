//! Tile-parallel renderer with adaptive supersampling and cooperative cancellation
//!
//! A draw call expands the surface once, composes it with the camera's ray
//! family, cuts the image into tiles and runs one task per tile on the
//! renderer's worker pool. Output is RGB, one byte per channel in the order
//! R, G, B, row-major with row 0 at the top of the image.

mod antialiasing;
mod buffer_pool;
mod cancel;
mod draw_state;
mod provider;
mod tile;
mod tracer;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

pub use antialiasing::{AntiAliasingMode, AntiAliasingPattern, SamplingPoint};
pub use buffer_pool::{ColorBufferPool, PoolStats, PooledBuffer};
pub use cancel::CancellationToken;

use crate::SurfError;
use crate::geometry::ClipVolume;
use crate::scene::Scene;
use draw_state::DrawState;
use tile::{TileGrid, render_tile};
use tracer::to_rgb;

/// Options of a draw call that are not part of the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RenderConfig {
    pub antialiasing: AntiAliasingMode,
    pub pattern: AntiAliasingPattern,
    pub clip: ClipVolume,
    /// Overrides the threshold implied by `antialiasing`
    pub threshold: Option<f32>,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_antialiasing(mut self, mode: AntiAliasingMode) -> Self {
        self.antialiasing = mode;
        self
    }

    pub fn with_pattern(mut self, pattern: AntiAliasingPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_clip(mut self, clip: ClipVolume) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Corner color distance from which a pixel is supersampled
    pub fn threshold(&self) -> f32 {
        self.threshold
            .unwrap_or_else(|| self.antialiasing.default_threshold())
    }
}

/// Renders one scene into caller-provided RGB buffers
///
/// The renderer owns (a share of) its worker pool and scratch buffer pool.
/// Draw calls on one renderer are serialised; [`Renderer::stop_drawing`] may be
/// called from any thread at any time.
#[derive(Debug)]
pub struct Renderer {
    scene: Scene,
    config: RenderConfig,
    workers: Arc<ThreadPool>,
    buffers: Arc<ColorBufferPool>,
    draw_lock: Mutex<()>,
    active: Mutex<Option<CancellationToken>>,
}

impl Renderer {
    /// Renderer with its own worker pool sized to the available parallelism
    ///
    /// # Errors
    /// `SurfError::ThreadPool` if the worker threads cannot be spawned
    pub fn new(scene: Scene, config: RenderConfig) -> Result<Self, SurfError> {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let workers = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("algesurf-render-{}", i))
            .build()?;
        Ok(Self::with_resources(
            scene,
            config,
            Arc::new(workers),
            Arc::new(ColorBufferPool::new()),
        ))
    }

    /// Renderer sharing an existing worker pool and buffer pool
    pub fn with_resources(
        scene: Scene,
        config: RenderConfig,
        workers: Arc<ThreadPool>,
        buffers: Arc<ColorBufferPool>,
    ) -> Self {
        Renderer {
            scene,
            config,
            workers,
            buffers,
            draw_lock: Mutex::new(()),
            active: Mutex::new(None),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    pub fn buffer_pool(&self) -> &ColorBufferPool {
        &self.buffers
    }

    /// Whether a draw call is currently running
    pub fn is_drawing(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Render into `buffer`, which must hold at least `width * height * 3` bytes
    ///
    /// The whole image is first filled with the background color. A call made
    /// while another draw is running waits for it to finish.
    ///
    /// # Errors
    /// - `SurfError::InvalidBuffer` if `buffer` is too short
    /// - `SurfError::UnboundParameter` or `SurfError::MalformedExpression` if the surface cannot be
    ///   expanded; the buffer is untouched
    /// - `SurfError::RenderCancelled` if [`Renderer::stop_drawing`] interrupted the call
    pub fn draw(&self, buffer: &mut [u8], width: u32, height: u32) -> Result<(), SurfError> {
        let _exclusive = self.draw_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let expected = width as usize * height as usize * 3;
        if buffer.len() < expected {
            return Err(SurfError::InvalidBuffer {
                expected,
                actual: buffer.len(),
            });
        }

        let token = CancellationToken::new();
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        let result = self.draw_tiles(&mut buffer[..expected], width, height, &token);
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = None;

        if let Err(err) = &result {
            if err.is_cancelled() {
                debug!("draw of {}x{} cancelled", width, height);
            }
        }
        result
    }

    /// Ask the running draw call, if any, to stop
    pub fn stop_drawing(&self) {
        if let Some(token) = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            token.cancel();
        }
    }

    fn draw_tiles(
        &self,
        image: &mut [u8],
        width: u32,
        height: u32,
        token: &CancellationToken,
    ) -> Result<(), SurfError> {
        let started = Instant::now();
        let state = DrawState::new(&self.scene, &self.config, width, height)?;

        let background = to_rgb(state.background);
        for pixel in image.chunks_exact_mut(3) {
            pixel.copy_from_slice(&background);
        }

        let grid = TileGrid::new(width, height, self.workers.current_num_threads());
        debug!(
            "drawing {}x{} of degree {} in {}x{} tiles with {:?}",
            width,
            height,
            state.degree,
            grid.columns(),
            grid.rows(),
            state.pattern
        );
        let tiles = grid.split(image, width);
        let buffers: &ColorBufferPool = &self.buffers;
        self.workers.install(|| {
            tiles
                .into_par_iter()
                .try_for_each(|tile| render_tile(&state, tile, buffers, token))
        })?;
        token.check()?;

        debug!("drew {}x{} in {:?}", width, height, started.elapsed());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use glam::Vec3;

    fn renderer(surface: &str, config: RenderConfig) -> Renderer {
        let workers = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let scene = Scene::new(parse(surface).unwrap()).with_background(Vec3::new(0.0, 0.0, 1.0));
        Renderer::with_resources(scene, config, Arc::new(workers), Arc::new(ColorBufferPool::new()))
    }

    #[test]
    fn test_config_threshold() {
        assert_eq!(RenderConfig::default().threshold(), 0.3);
        let c = RenderConfig::new().with_antialiasing(AntiAliasingMode::Supersampling);
        assert_eq!(c.threshold(), 0.0);
        assert_eq!(c.with_threshold(0.1).threshold(), 0.1);
    }

    #[test]
    fn test_empty_image_is_noop() {
        let r = renderer("x^2+y^2+z^2-0.25", RenderConfig::default());
        let mut buffer = Vec::new();
        assert!(r.draw(&mut buffer, 0, 10).is_ok());
        assert!(r.draw(&mut buffer, 10, 0).is_ok());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let r = renderer("x^2+y^2+z^2-0.25", RenderConfig::default());
        let mut buffer = vec![0u8; 10];
        assert_eq!(
            r.draw(&mut buffer, 2, 2),
            Err(SurfError::InvalidBuffer {
                expected: 12,
                actual: 10
            })
        );
    }

    #[test]
    fn test_unbound_parameter_leaves_buffer() {
        let r = renderer("x^2+y^2+z^2-r", RenderConfig::default());
        let mut buffer = vec![7u8; 4 * 4 * 3];
        assert_eq!(r.draw(&mut buffer, 4, 4), Err(SurfError::unbound("r")));
        assert!(buffer.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_zero_divisor_fails_before_drawing() {
        let r = renderer("(x^2+y^2+z^2)/(2-2)-1", RenderConfig::default());
        let mut buffer = vec![7u8; 4 * 4 * 3];
        assert!(matches!(
            r.draw(&mut buffer, 4, 4),
            Err(SurfError::MalformedExpression(_))
        ));
        assert!(buffer.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_sphere_image_layout() {
        for pattern in [
            AntiAliasingPattern::OrderedGrid1x1,
            AntiAliasingPattern::OrderedGrid2x2,
            AntiAliasingPattern::Quincunx,
            AntiAliasingPattern::OrderedGrid4x4,
        ] {
            let r = renderer("x^2+y^2+z^2-0.25", RenderConfig::new().with_pattern(pattern));
            let (w, h) = (21u32, 21u32);
            let mut buffer = vec![0u8; (w * h * 3) as usize];
            r.draw(&mut buffer, w, h).unwrap();
            let pixel = |x: u32, y: u32| {
                let i = ((y * w + x) * 3) as usize;
                [buffer[i], buffer[i + 1], buffer[i + 2]]
            };
            assert_eq!(pixel(0, 0), [0, 0, 255], "{:?}", pattern);
            assert_eq!(pixel(w - 1, h - 1), [0, 0, 255], "{:?}", pattern);
            let centre = pixel(10, 10);
            assert_ne!(centre, [0, 0, 255], "{:?}", pattern);
            // grey material: equal channels
            assert_eq!(centre[0], centre[1]);
        }
    }

    #[test]
    fn test_stop_without_draw_is_noop() {
        let r = renderer("x", RenderConfig::default());
        assert!(!r.is_drawing());
        r.stop_drawing();
        let mut buffer = vec![0u8; 3 * 3 * 3];
        assert!(r.draw(&mut buffer, 3, 3).is_ok());
    }
}
