//! Ready-made visualizations.

use crate::camera::{Camera, OrbitBounds};
use crate::error::ShapeError;
use crate::geometry::GeometryBuffer;
use crate::point_cloud::{PointCloud, PointMaterial};
use crate::render_loop::{Cadence, RenderLoop};
use crate::scene::{Group, Light, Mesh, MeshMaterial, MeshShape, Scene, Surface};
use crate::shape::{generate, ShapeSpec};
use crate::surface::{RenderSurface, TextureLoader};
use crate::transform::{Motion, Transform};
use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Strawberry,
    ParticleX,
    CollidingCubes,
    MeshCubes,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Strawberry,
        Preset::ParticleX,
        Preset::CollidingCubes,
        Preset::MeshCubes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Strawberry => "strawberry",
            Preset::ParticleX => "particle_x",
            Preset::CollidingCubes => "colliding_cubes",
            Preset::MeshCubes => "mesh_cubes",
        }
    }
}

impl FromStr for Preset {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ShapeError::UnknownPreset(s.to_owned()))
    }
}

/// Knobs shared by every preset.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetConfig {
    pub seed: u64,
    pub berry_count: i64,
    pub leaf_count: i64,
    pub particle_count: i64,
    pub ground_texture: PathBuf,
    /// Overrides each preset's own frame rate.
    pub fps: Option<u32>,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            berry_count: ShapeSpec::DEFAULT_COUNT as i64,
            leaf_count: ShapeSpec::DEFAULT_COUNT as i64,
            particle_count: 500,
            ground_texture: PathBuf::from("universe.jpg"),
            fps: None,
        }
    }
}

/// A scene together with how to look at it and how often to redraw it.
#[derive(Debug)]
pub struct Visualization {
    pub name: &'static str,
    pub scene: Scene,
    pub camera: Camera,
    pub orbit: OrbitBounds,
    pub cadence: Cadence,
}

impl Visualization {
    pub fn into_loop<R: RenderSurface>(self, surface: R) -> RenderLoop<R> {
        RenderLoop::new(surface, self.scene, self.camera, self.cadence).with_orbit(self.orbit)
    }
}

pub fn build(
    preset: Preset,
    config: &PresetConfig,
    textures: &mut dyn TextureLoader,
) -> Result<Visualization, ShapeError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut vis = match preset {
        Preset::Strawberry => strawberry(config, &mut rng)?,
        Preset::ParticleX => particle_x(config, &mut rng, textures)?,
        Preset::CollidingCubes => colliding_cubes()?,
        Preset::MeshCubes => mesh_cubes(),
    };
    // Orbit controls pull the camera inside their bounds on the first update.
    let distance = vis.orbit.clamp_distance(vis.camera.distance());
    vis.camera.set_distance(distance);
    if let Some(fps) = config.fps {
        vis.cadence = Cadence::from_fps(fps);
    }
    log::info!(
        "built {} ({} objects, {} points)",
        vis.name,
        vis.scene.len(),
        vis.scene.point_count()
    );
    Ok(vis)
}

fn cloud<R: Rng>(spec: ShapeSpec, material: PointMaterial, rng: &mut R) -> Result<PointCloud, ShapeError> {
    let points = generate(&spec, rng)?;
    PointCloud::attach(GeometryBuffer::build(&points), material)
}

pub fn strawberry<R: Rng>(config: &PresetConfig, rng: &mut R) -> Result<Visualization, ShapeError> {
    let berry = ShapeSpec::berry(0).with_count(config.berry_count)?;
    let leaves = ShapeSpec::leaves(0).with_count(config.leaf_count)?;

    let mut scene = Scene::new([0.0; 3]);
    // 0.005 rad per frame at 30 fps.
    let spin = Motion::spin(Vec3::new(0.0, 0.15, 0.0));
    let body = scene.add(cloud(berry, PointMaterial::per_vertex(0.01), rng)?);
    let cap = scene.add(cloud(leaves, PointMaterial::per_vertex(0.015), rng)?);
    scene.animate(body, spin);
    scene.animate(cap, spin);

    Ok(Visualization {
        name: Preset::Strawberry.name(),
        scene,
        camera: Camera::perspective(50.0, Vec3::splat(-45.0)),
        orbit: OrbitBounds {
            enable_damping: true,
            ..OrbitBounds::distance(0.5, 10.0)
        },
        cadence: Cadence::from_fps(30),
    })
}

pub fn particle_x<R: Rng>(
    config: &PresetConfig,
    rng: &mut R,
    textures: &mut dyn TextureLoader,
) -> Result<Visualization, ShapeError> {
    let particles = ShapeSpec::ball(0, 5.0, [1.0; 3]).with_count(config.particle_count)?;

    let mut scene = Scene::new([0.0; 3]);
    let group = scene.add(Group::default());
    scene.animate(group, Motion::spin(Vec3::new(0.1, 0.15, 0.0)));

    for angle in [FRAC_PI_4, -FRAC_PI_4] {
        let bar = Mesh::new(
            MeshShape::Cuboid {
                size: Vec3::new(4.0, 0.4, 0.4),
            },
            MeshMaterial::wireframe([1.0; 3]),
        )
        .with_transform(Transform::IDENTITY.with_rotation(Vec3::new(0.0, 0.0, angle)));
        scene.add_to(group, bar)?;
    }

    let dust = scene.add_to(
        group,
        cloud(particles, PointMaterial::uniform([1.0; 3], 0.02, 0.6), rng)?,
    )?;
    scene.animate(dust, Motion::spin(Vec3::new(0.05, 0.075, 0.0)));

    match textures.load_texture(&config.ground_texture) {
        Ok(texture) => {
            let ground = Mesh::new(
                MeshShape::Plane {
                    width: 10.0,
                    height: 10.0,
                },
                MeshMaterial {
                    surface: Surface::Textured(texture),
                    wireframe: false,
                    lit: true,
                },
            )
            .with_transform(
                Transform::from_position(Vec3::new(0.0, -2.0, 0.0))
                    .with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0)),
            );
            scene.add(ground);
        }
        Err(e) => log::warn!("ground plane omitted: {e}"),
    }

    scene.add_light(Light::point(Vec3::splat(5.0), 1.0));
    scene.add_light(Light::ambient(0.2));

    Ok(Visualization {
        name: Preset::ParticleX.name(),
        scene,
        camera: Camera::perspective(75.0, Vec3::new(0.0, 15.0, 0.0)),
        orbit: OrbitBounds::distance(5.0, 12.0),
        cadence: Cadence::from_fps(60),
    })
}

pub fn colliding_cubes() -> Result<Visualization, ShapeError> {
    let corners = [
        (Vec3::new(-2.0, 0.0, 0.0), [0.0, 1.0, 0.0]),
        (Vec3::new(2.0, 0.0, 0.0), [0.0, 0.8, 0.0]),
        (Vec3::new(0.0, 2.0, 0.0), [0.0, 0.6, 0.0]),
    ];

    let mut scene = Scene::new([0.0; 3]);
    let group = scene.add(Group::default());
    scene.animate(
        group,
        Motion::spin(Vec3::new(0.0, 0.0, 0.9)).with_sway(Vec3::new(1.0, 2.0, 0.0)),
    );

    for (position, rgb) in corners {
        let cube = Mesh::new(
            MeshShape::Cuboid {
                size: Vec3::splat(1.5),
            },
            MeshMaterial::solid(rgb),
        )
        .with_transform(Transform::from_position(position));
        scene.add_to(group, cube)?;
    }
    for (i, j) in [(0, 1), (1, 2), (2, 0)] {
        let beam = Mesh::beam(
            corners[i].0,
            corners[j].0,
            0.1,
            MeshMaterial::solid([0.0, 0.5, 0.0]),
        );
        scene.add_to(group, beam)?;
    }

    scene.add_light(Light::ambient(0.9));
    scene.add_light(Light::point(Vec3::new(10.0, 30.0, 10.0), 1.0));

    Ok(Visualization {
        name: Preset::CollidingCubes.name(),
        scene,
        camera: Camera::perspective(100.0, Vec3::new(0.0, 0.0, 10.0)),
        orbit: OrbitBounds::default(),
        cadence: Cadence::from_fps(60),
    })
}

pub fn mesh_cubes() -> Visualization {
    let positions = [
        Vec3::new(2.0, 2.0, 0.0),
        Vec3::new(-2.0, 2.0, 0.0),
        Vec3::new(2.0, -2.0, 0.0),
        Vec3::new(-2.0, -2.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::new(0.0, 0.0, -2.0),
    ];
    let gradient = MeshMaterial {
        surface: Surface::VerticalGradient {
            bottom: [0.0; 3],
            top: [0.0, 1.0, 0.0],
        },
        wireframe: false,
        lit: true,
    };

    let mut scene = Scene::new([0.0; 3]);
    for position in positions {
        scene.add(
            Mesh::new(MeshShape::Cuboid { size: Vec3::ONE }, gradient)
                .with_transform(Transform::from_position(position)),
        );
    }
    for (i, &a) in positions.iter().enumerate() {
        for &b in &positions[i + 1..] {
            scene.add(Mesh::beam(a, b, 0.05, MeshMaterial::solid([0.0, 0.6, 0.0])));
        }
    }

    scene.add_light(Light::ambient(0.5));
    scene.add_light(Light::point(Vec3::splat(10.0), 1.0));

    Visualization {
        name: Preset::MeshCubes.name(),
        scene,
        camera: Camera::perspective(100.0, Vec3::new(0.0, 15.0, 10.0)),
        orbit: OrbitBounds {
            enable_pan: false,
            ..OrbitBounds::distance(1.0, 5.0)
        },
        cadence: Cadence::from_fps(60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::scene::{DrawItem, Object};
    use crate::surface::{NoTextures, TextureHandle};
    use std::path::Path;

    struct OneTexture;

    impl TextureLoader for OneTexture {
        fn load_texture(&mut self, _: &Path) -> Result<TextureHandle, RenderError> {
            Ok(TextureHandle(7))
        }
    }

    #[test]
    fn names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        assert_eq!(
            "teapot".parse::<Preset>().unwrap_err(),
            ShapeError::UnknownPreset("teapot".into())
        );
    }

    #[test]
    fn strawberry_has_both_clouds() {
        let vis = build(Preset::Strawberry, &PresetConfig::default(), &mut NoTextures).unwrap();
        assert_eq!(vis.scene.point_count(), 4000);
        assert!((vis.camera.distance() - 10.0).abs() < 1e-3);
        assert_eq!(vis.cadence, Cadence::from_fps(30));
        assert!(vis.orbit.enable_damping);
    }

    #[test]
    fn negative_count_fails_fast() {
        let config = PresetConfig {
            leaf_count: -1,
            ..PresetConfig::default()
        };
        assert_eq!(
            build(Preset::Strawberry, &config, &mut NoTextures).unwrap_err(),
            ShapeError::NegativeCount(-1)
        );
    }

    #[test]
    fn missing_texture_drops_only_the_ground() {
        let config = PresetConfig::default();
        let without = build(Preset::ParticleX, &config, &mut NoTextures).unwrap();
        let with = build(Preset::ParticleX, &config, &mut OneTexture).unwrap();
        assert_eq!(with.scene.len(), without.scene.len() + 1);
        assert_eq!(without.scene.point_count(), 500);

        let camera = Camera::default();
        let textured = with
            .scene
            .graph(&camera)
            .draw_list()
            .iter()
            .filter(|item| {
                matches!(item, DrawItem::Mesh { mesh, .. }
                    if mesh.material.surface == Surface::Textured(TextureHandle(7)))
            })
            .count();
        assert_eq!(textured, 1);
    }

    #[test]
    fn mesh_cubes_join_every_pair() {
        let vis = mesh_cubes();
        // six cubes plus 6 choose 2 beams
        assert_eq!(vis.scene.len(), 6 + 15);
        assert!(!vis.orbit.enable_pan);
    }

    #[test]
    fn colliding_cubes_sway_inside_a_group() {
        let mut vis = colliding_cubes().unwrap();
        let camera = Camera::default();
        assert_eq!(vis.scene.graph(&camera).draw_list().len(), 6);

        vis.scene.advance(0.0, FRAC_PI_2);
        let root = vis.scene.roots()[0];
        let group = vis
            .scene
            .object(root)
            .map(Object::transform)
            .copied()
            .unwrap();
        assert!((group.position.x - 1.0).abs() < 1e-6);
        assert!(group.position.y.abs() < 1e-5);
    }

    #[test]
    fn fps_override_applies_to_every_preset() {
        let config = PresetConfig {
            fps: Some(10),
            berry_count: 10,
            leaf_count: 10,
            particle_count: 10,
            ..PresetConfig::default()
        };
        for preset in Preset::ALL {
            let vis = build(preset, &config, &mut NoTextures).unwrap();
            assert_eq!(vis.cadence, Cadence::from_fps(10));
        }
    }
}
