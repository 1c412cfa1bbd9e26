//! Mount/unmount lifecycle for visualizations.

use crate::camera::Viewport;
use crate::error::RenderError;
use crate::presets::Visualization;
use crate::render_loop::RenderLoop;
use crate::surface::RenderSurface;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MountId(u64);

/// Owns one [`RenderLoop`] per mounted visualization.
pub struct SceneHost<R: RenderSurface> {
    next_id: u64,
    loops: BTreeMap<MountId, RenderLoop<R>>,
}

impl<R: RenderSurface> Default for SceneHost<R> {
    fn default() -> Self {
        Self {
            next_id: 0,
            loops: BTreeMap::new(),
        }
    }
}

impl<R: RenderSurface> SceneHost<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a loop for `vis`. On failure nothing stays mounted and the
    /// other loops carry on.
    pub fn mount(
        &mut self,
        vis: Visualization,
        surface: R,
        viewport: Viewport,
        now: Duration,
    ) -> Result<MountId, RenderError> {
        let name = vis.name;
        let mut render_loop = vis.into_loop(surface);
        if let Err(e) = render_loop.start(viewport, now) {
            log::error!("could not mount {name}: {e}");
            return Err(e);
        }
        self.next_id += 1;
        let id = MountId(self.next_id);
        self.loops.insert(id, render_loop);
        log::info!("mounted {name} as #{}", id.0);
        Ok(id)
    }

    /// Stops and drops the loop. Returns `false` for an unknown id.
    pub fn unmount(&mut self, id: MountId) -> bool {
        match self.loops.remove(&id) {
            Some(mut render_loop) => {
                render_loop.stop();
                log::info!("unmounted #{}", id.0);
                true
            }
            None => false,
        }
    }

    /// Drives every mounted loop. Returns the number of frames drawn.
    pub fn pump(&mut self, now: Duration) -> usize {
        self.loops.values_mut().map(|l| l.pump(now)).sum()
    }

    pub fn resize(&mut self, id: MountId, viewport: Viewport) {
        if let Some(render_loop) = self.loops.get_mut(&id) {
            render_loop.resize(viewport);
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.loops.values().filter_map(RenderLoop::next_deadline).min()
    }

    pub fn get(&self, id: MountId) -> Option<&RenderLoop<R>> {
        self.loops.get(&id)
    }

    pub fn get_mut(&mut self, id: MountId) -> Option<&mut RenderLoop<R>> {
        self.loops.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Unmounts everything.
    pub fn clear(&mut self) {
        let ids: Vec<MountId> = self.loops.keys().copied().collect();
        for id in ids {
            self.unmount(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{build, Preset, PresetConfig};
    use crate::render_loop::tests::{Call, FakeSurface};
    use crate::render_loop::LoopPhase;
    use crate::surface::NoTextures;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn vis(preset: Preset) -> Visualization {
        let config = PresetConfig {
            berry_count: 50,
            leaf_count: 50,
            particle_count: 50,
            fps: Some(50),
            ..PresetConfig::default()
        };
        build(preset, &config, &mut NoTextures).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn failed_mount_leaves_others_running() {
        let mut host = SceneHost::new();
        let ok = host
            .mount(vis(Preset::Strawberry), FakeSurface::default(), Viewport::new(600, 250), ms(0))
            .unwrap();
        let failing = FakeSurface {
            fail_create: true,
            ..FakeSurface::default()
        };
        assert!(host
            .mount(vis(Preset::MeshCubes), failing, Viewport::new(600, 250), ms(0))
            .is_err());

        assert_eq!(host.len(), 1);
        assert_eq!(host.pump(ms(20)), 1);
        assert_eq!(host.get(ok).map(RenderLoop::phase), Some(LoopPhase::Running));
    }

    #[test]
    fn unmount_stops_and_releases() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut host = SceneHost::new();
        let id = host
            .mount(
                vis(Preset::CollidingCubes),
                FakeSurface {
                    calls: calls.clone(),
                    ..FakeSurface::default()
                },
                Viewport::new(100, 100),
                ms(0),
            )
            .unwrap();
        assert!(host.unmount(id));
        assert!(!host.unmount(id));
        assert_eq!(calls.borrow().last(), Some(&Call::Destroy));
        assert_eq!(host.pump(ms(1000)), 0);
        assert_eq!(host.next_deadline(), None);
    }

    #[test]
    fn pump_drives_every_loop() {
        let mut host = SceneHost::new();
        for preset in Preset::ALL {
            host.mount(vis(preset), FakeSurface::default(), Viewport::new(64, 64), ms(0))
                .unwrap();
        }
        assert_eq!(host.next_deadline(), Some(ms(20)));
        assert_eq!(host.pump(ms(20)), 4);
        host.clear();
        assert!(host.is_empty());
    }

    #[test]
    fn resize_reaches_the_mounted_loop() {
        let mut host = SceneHost::new();
        let id = host
            .mount(vis(Preset::MeshCubes), FakeSurface::default(), Viewport::new(100, 100), ms(0))
            .unwrap();
        host.resize(id, Viewport::new(300, 100));
        let aspect = host.get(id).map(|l| l.camera().aspect);
        assert_eq!(aspect, Some(3.0));
    }
}
