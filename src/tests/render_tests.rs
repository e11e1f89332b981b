//! End-to-end draw calls: determinism, cancellation and scratch-buffer reuse

#[cfg(test)]
mod render_scenario_tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use glam::{DVec3, Vec3};
    use rayon::ThreadPoolBuilder;

    use crate::geometry::{Camera, ClipVolume};
    use crate::render::ColorBufferPool;
    use crate::shading::{LightSource, Material};
    use crate::{
        AntiAliasingMode, AntiAliasingPattern, RenderConfig, Renderer, Scene, SurfError, parse,
    };

    const BLUE: [u8; 3] = [0, 0, 255];

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn renderer(surface: &str, config: RenderConfig, threads: usize) -> Renderer {
        let workers = ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
        let scene = Scene::new(parse(surface).unwrap())
            .with_parameter("R", 0.6)
            .with_parameter("r", 0.25)
            .with_background(Vec3::new(0.0, 0.0, 1.0))
            .with_front_material(Material::default().with_color(Vec3::new(0.9, 0.6, 0.2)))
            .with_light(1, Some(LightSource::at(DVec3::new(-2.0, 3.0, 4.0))));
        Renderer::with_resources(scene, config, Arc::new(workers), Arc::new(ColorBufferPool::new()))
    }

    fn draw(r: &Renderer, w: u32, h: u32) -> Vec<u8> {
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        r.draw(&mut buffer, w, h).unwrap();
        buffer
    }

    const TORUS: &str = "(x^2+y^2+z^2+R^2-r^2)^2-4*R^2*(x^2+y^2)";

    #[test]
    fn test_repeated_draws_are_identical() {
        init();
        let r = renderer(TORUS, RenderConfig::default(), 3);
        let first = draw(&r, 48, 32);
        let second = draw(&r, 48, 32);
        assert_eq!(first, second);
        assert!(first.chunks_exact(3).any(|p| p != BLUE));
        assert!(first.chunks_exact(3).any(|p| p == BLUE));
    }

    #[test]
    fn test_torus_has_a_hole() {
        init();
        // Default camera looks down -z, the torus axis
        let r = renderer(TORUS, RenderConfig::default(), 2);
        let (w, h) = (41u32, 41u32);
        let image = draw(&r, w, h);
        let pixel = |x: u32, y: u32| {
            let i = ((y * w + x) * 3) as usize;
            [image[i], image[i + 1], image[i + 2]]
        };
        assert_eq!(pixel(20, 20), BLUE);
        // the ring radius off centre lands on the tube
        let off = (0.6 / (30f64.to_radians().tan() * 3.0) * 20.0).round() as u32;
        assert_ne!(pixel(20 + off, 20), BLUE);
        assert_ne!(pixel(20, 20 - off), BLUE);
    }

    #[test]
    fn test_patterns_keep_background_corners() {
        init();
        let mut images = Vec::new();
        for pattern in [
            AntiAliasingPattern::OrderedGrid1x1,
            AntiAliasingPattern::OrderedGrid3x3,
            AntiAliasingPattern::Quincunx,
        ] {
            let r = renderer("x^2+y^2+z^2-0.36", RenderConfig::new().with_pattern(pattern), 2);
            images.push(draw(&r, 25, 25));
        }
        // Corners are background for every pattern
        for image in &images {
            assert_eq!(&image[..3], &BLUE);
            assert_eq!(&image[image.len() - 3..], &BLUE);
        }
    }

    #[test]
    fn test_orthographic_camera() {
        init();
        let mut r = renderer("x^2+y^2+z^2-0.25", RenderConfig::default(), 2);
        r.scene_mut().camera = Camera::orthographic(2.0)
            .with_transform(glam::DMat4::from_translation(DVec3::new(0.0, 0.0, 3.0)));
        let image = draw(&r, 21, 21);
        let centre = ((10 * 21 + 10) * 3) as usize;
        assert_ne!(&image[centre..centre + 3], &BLUE);
        // sphere radius 0.5 covers a quarter of the 2-wide view
        let edge = ((10 * 21 + 1) * 3) as usize;
        assert_eq!(&image[edge..edge + 3], &BLUE);
    }

    #[test]
    fn test_every_clip_volume_draws() {
        init();
        for clip in [
            ClipVolume::Sphere { radius: 0.8 },
            ClipVolume::Torus {
                major: 0.6,
                minor: 0.3,
            },
            ClipVolume::BlowUp {
                major: 0.6,
                minor: 0.3,
            },
        ] {
            let r = renderer(TORUS, RenderConfig::new().with_clip(clip), 2);
            let mut buffer = vec![0u8; 16 * 12 * 3];
            assert!(r.draw(&mut buffer, 16, 12).is_ok(), "{:?}", clip);
        }
    }

    #[test]
    fn test_scratch_buffers_are_reused() {
        init();
        let r = renderer(TORUS, RenderConfig::default(), 2);
        draw(&r, 20, 20);
        draw(&r, 20, 20);
        let stats = r.buffer_pool().stats();
        assert!(stats.requested >= 2);
        assert!(stats.reused >= 1, "{:?}", stats);
    }

    #[test]
    fn test_concurrent_draws_are_serialised() {
        init();
        let r = Arc::new(renderer(TORUS, RenderConfig::default(), 2));
        let (w, h) = (64u32, 48u32);
        let expected = draw(&r, w, h);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let r = Arc::clone(&r);
                thread::spawn(move || draw(&r, w, h))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert!(!r.is_drawing());
    }

    #[test]
    fn test_stop_drawing_interrupts_promptly() {
        init();
        // Refine every pixel so the full draw takes far longer than the test allows
        let config = RenderConfig::new()
            .with_antialiasing(AntiAliasingMode::Supersampling)
            .with_pattern(AntiAliasingPattern::OrderedGrid4x4);
        let r = Arc::new(renderer(
            "(x^2+y^2+z^2+R^2-r^2)^3-4*R^2*(x^2+y^2)*(x^2+y^2+z^2)",
            config,
            4,
        ));

        let worker = {
            let r = Arc::clone(&r);
            thread::spawn(move || {
                let (w, h) = (1024u32, 1024u32);
                let mut buffer = vec![0u8; (w * h * 3) as usize];
                r.draw(&mut buffer, w, h)
            })
        };

        let waiting = Instant::now();
        while !r.is_drawing() {
            assert!(waiting.elapsed() < Duration::from_secs(10), "draw never started");
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(20));

        let stopped = Instant::now();
        r.stop_drawing();
        let result = worker.join().unwrap();
        assert_eq!(result, Err(SurfError::RenderCancelled));
        assert!(
            stopped.elapsed() < Duration::from_millis(500),
            "cancellation took {:?}",
            stopped.elapsed()
        );
        assert!(!r.is_drawing());

        // The renderer stays usable
        let mut small = vec![0u8; 8 * 8 * 3];
        assert!(r.draw(&mut small, 8, 8).is_ok());
    }
}
