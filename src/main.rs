use std::env;

use orrery::{Orrery, OrreryConfig};
use tracing::info;

const DEFAULT_TICKS: u32 = 600;
const ASPECT: f32 = 16.0 / 9.0;

fn main() -> orrery::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ticks = match env::args().nth(1) {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            tracing::warn!(%arg, "tick count is not a number, using {DEFAULT_TICKS}");
            DEFAULT_TICKS
        }),
        None => DEFAULT_TICKS,
    };

    let mut orrery = Orrery::new(OrreryConfig::default())?;
    info!(ticks, nodes = orrery.graph().len(), "running orrery");

    for tick in 1..=ticks {
        orrery.tick(1.0);
        let uniforms = orrery.frame(ASPECT)?;

        if tick % 100 == 0 || tick == ticks {
            let bytes: &[u8] = bytemuck::cast_slice(&uniforms);
            for name in ["sun", "earth", "moon"] {
                if let Some(p) = orrery.position(name) {
                    info!(tick, body = name, x = p.x, y = p.y, z = p.z, "position");
                }
            }
            info!(tick, draws = uniforms.len(), bytes = bytes.len(), "frame ready");
        }
    }

    Ok(())
}
