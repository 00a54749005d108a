mod cli;
mod scatter;

use anyhow::{Context, Result};
use clap::Parser;
use prism_math::Vec3;
use prism_scene::{BufferSlot, FrameSink, PrimitiveId, SceneConfig, SceneContext, SceneError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cli::Cli;
use scatter::{random_spheres, scenery, ScatterBounds};

/// Stands in for the GPU: logs every transfer and keeps totals.
#[derive(Default)]
struct LoggingSink {
    uploads: usize,
    bytes: usize,
    sample_offset: usize,
}

impl FrameSink for LoggingSink {
    fn upload(&mut self, slot: BufferSlot, bytes: &[u8], count: usize) {
        log::debug!("Upload {:?}: {} records, {} bytes", slot, count, bytes.len());
        self.uploads += 1;
        self.bytes += bytes.len();
    }

    fn upload_samples(&mut self, bytes: &[u8]) {
        log::info!("Uploaded sample set: {} bytes", bytes.len());
        self.bytes += bytes.len();
    }

    fn set_sample_offset(&mut self, offset: usize) {
        self.sample_offset = offset;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("Starting prism demo (seed {})", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut scene = SceneContext::new(config).context("Failed to create scene context")?;
    for primitive in scenery() {
        scene.spawn(primitive)?;
    }

    let mut spheres: Vec<PrimitiveId> = Vec::with_capacity(cli.spheres);
    for primitive in random_spheres(&mut rng, cli.spheres, ScatterBounds::default()) {
        spheres.push(scene.spawn(primitive)?);
    }
    log::info!("Spawned {} primitives", scene.store().len());

    let dt = 1.0 / cli.fps.max(1.0);
    let mut sink = LoggingSink::default();
    let mut overflowed_frames = 0u64;

    for frame in 1..=cli.frames {
        if cli.nudge_every > 0 && frame % cli.nudge_every == 0 && !spheres.is_empty() {
            let id = spheres[rng.gen_range(0..spheres.len())];
            let offset = Vec3::new(rng.gen_range(-0.5..0.5), 0.0, rng.gen_range(-0.5..0.5));
            scene.edit(id, |p| p.transform.position += offset)?;
        }

        match scene.prepare_frame(dt, &mut sink) {
            Ok(report) => {
                if report.tree_rebuilt {
                    log::debug!(
                        "Frame {}: tree has {} nodes, bounds {:?}",
                        report.frame,
                        scene.tree().len(),
                        scene.tree().bounds()
                    );
                }
            }
            // The registry stays dirty and is retried next frame.
            Err(err @ SceneError::CapacityOverflow { .. }) => {
                if overflowed_frames == 0 {
                    log::warn!("Frame {}: {}", frame, err);
                }
                overflowed_frames += 1;
            }
            Err(err) => return Err(err).context("Frame preparation failed"),
        }
    }

    log::info!(
        "Ran {} frames: {} uploads, {} bytes, final sample offset {}, {} frames with overflow",
        scene.frame(),
        sink.uploads,
        sink.bytes,
        sink.sample_offset,
        overflowed_frames
    );

    Ok(())
}
