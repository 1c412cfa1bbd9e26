use clap::Parser;
use pointform::{Preset, PresetConfig};
use std::path::PathBuf;

/// `pointform` - procedural point-cloud scenes in a window.
///
/// Opens one visualization, redraws it at the preset's frame rate and exits
/// on Escape or when the window is closed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Which scene to show: strawberry, particle_x, colliding_cubes or mesh_cubes.
    #[arg(long, env = "POINTFORM_PRESET", default_value = "strawberry", value_parser = parse_preset)]
    pub preset: Preset,

    /// Seed for the point sampler. A random seed is drawn when omitted.
    #[arg(long, env = "POINTFORM_SEED")]
    pub seed: Option<u64>,

    /// Frame-rate cap. Defaults to the preset's own rate.
    #[arg(long, env = "POINTFORM_FPS")]
    pub fps: Option<u32>,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Points in the berry body.
    #[arg(long, env = "POINTFORM_BERRY_POINTS", default_value_t = 2000, allow_negative_numbers = true)]
    pub berry_points: i64,

    /// Points in the leaf cluster.
    #[arg(long, env = "POINTFORM_LEAF_POINTS", default_value_t = 2000, allow_negative_numbers = true)]
    pub leaf_points: i64,

    /// Points in the particle ball.
    #[arg(long, env = "POINTFORM_PARTICLE_POINTS", default_value_t = 500, allow_negative_numbers = true)]
    pub particle_points: i64,

    /// Image drawn on the ground plane. The plane is left out if it fails to load.
    #[arg(long, env = "POINTFORM_GROUND_TEXTURE", default_value = "universe.jpg")]
    pub ground_texture: PathBuf,
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    s.parse::<Preset>().map_err(|e| e.to_string())
}

impl Config {
    pub fn preset_config(&self, seed: u64) -> PresetConfig {
        PresetConfig {
            seed,
            berry_count: self.berry_points,
            leaf_count: self.leaf_points,
            particle_count: self.particle_points,
            ground_texture: self.ground_texture.clone(),
            fps: self.fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_strawberry_scene() {
        let config = Config::try_parse_from(["pointform"]).unwrap();
        assert_eq!(config.preset, Preset::Strawberry);
        let presets = config.preset_config(42);
        assert_eq!(presets.berry_count, 2000);
        assert_eq!(presets.particle_count, 500);
        assert_eq!(presets.seed, 42);
        assert_eq!(presets.fps, None);
    }

    #[test]
    fn rejects_unknown_preset() {
        assert!(Config::try_parse_from(["pointform", "--preset", "teapot"]).is_err());
    }

    #[test]
    fn negative_counts_reach_the_scene_builder() {
        let config = Config::try_parse_from(["pointform", "--leaf-points", "-5"]).unwrap();
        assert_eq!(config.preset_config(0).leaf_count, -5);
    }
}
