//! Scene state and the per-frame scene graph built from it.
//!
//! [`Scene`] owns every drawable and the motion attached to it. Each tick the
//! render loop advances the motions and then asks for a [`SceneGraph`]: a tree
//! of tagged nodes borrowing from the scene, which a surface walks to issue
//! draw calls.

use crate::camera::Camera;
use crate::error::ShapeError;
use crate::point_cloud::PointCloud;
use crate::surface::TextureHandle;
use crate::transform::{Motion, Transform};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Index of an object inside one [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshShape {
    /// Axis-aligned box centred on the origin.
    Cuboid { size: Vec3 },
    /// Quad in the XY plane facing +Z.
    Plane { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Solid([f32; 3]),
    /// Blends from `bottom` to `top` along local Y.
    VerticalGradient { bottom: [f32; 3], top: [f32; 3] },
    Textured(TextureHandle),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    pub surface: Surface,
    pub wireframe: bool,
    /// Whether scene lights affect the surface.
    pub lit: bool,
}

impl MeshMaterial {
    pub fn solid(rgb: [f32; 3]) -> Self {
        Self {
            surface: Surface::Solid(rgb),
            wireframe: false,
            lit: true,
        }
    }

    pub fn wireframe(rgb: [f32; 3]) -> Self {
        Self {
            surface: Surface::Solid(rgb),
            wireframe: true,
            lit: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub shape: MeshShape,
    pub material: MeshMaterial,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(shape: MeshShape, material: MeshMaterial) -> Self {
        Self {
            shape,
            material,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Thin cuboid whose long (X) axis spans `start` to `end`.
    pub fn beam(start: Vec3, end: Vec3, thickness: f32, material: MeshMaterial) -> Self {
        let dir = end - start;
        let length = dir.length();
        let rotation = Quat::from_rotation_arc(Vec3::X, dir.normalize_or_zero());
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        Self::new(
            MeshShape::Cuboid {
                size: Vec3::new(length, thickness, thickness),
            },
            material,
        )
        .with_transform(Transform::from_position((start + end) * 0.5).with_rotation(Vec3::new(x, y, z)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient { color: [f32; 3], intensity: f32 },
    Point { position: Vec3, color: [f32; 3], intensity: f32 },
}

impl Light {
    pub fn ambient(intensity: f32) -> Self {
        Light::Ambient {
            color: [1.0; 3],
            intensity,
        }
    }

    pub fn point(position: Vec3, intensity: f32) -> Self {
        Light::Point {
            position,
            color: [1.0; 3],
            intensity,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub transform: Transform,
    children: Vec<ObjectId>,
}

impl Group {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }
}

#[derive(Debug)]
pub enum Object {
    Points(PointCloud),
    Mesh(Mesh),
    Group(Group),
}

impl Object {
    pub fn transform(&self) -> &Transform {
        match self {
            Object::Points(cloud) => &cloud.transform,
            Object::Mesh(mesh) => &mesh.transform,
            Object::Group(group) => &group.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Object::Points(cloud) => &mut cloud.transform,
            Object::Mesh(mesh) => &mut mesh.transform,
            Object::Group(group) => &mut group.transform,
        }
    }
}

impl From<PointCloud> for Object {
    fn from(cloud: PointCloud) -> Self {
        Object::Points(cloud)
    }
}

impl From<Mesh> for Object {
    fn from(mesh: Mesh) -> Self {
        Object::Mesh(mesh)
    }
}

impl From<Group> for Object {
    fn from(group: Group) -> Self {
        Object::Group(group)
    }
}

#[derive(Debug)]
struct Slot {
    object: Object,
    motion: Motion,
}

/// Owned scene state: objects in insertion order, their motions and lights.
#[derive(Debug)]
pub struct Scene {
    pub background: [f32; 3],
    slots: Vec<Slot>,
    roots: Vec<ObjectId>,
    lights: Vec<Light>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new([0.0; 3])
    }
}

impl Scene {
    pub fn new(background: [f32; 3]) -> Self {
        Self {
            background,
            slots: Vec::new(),
            roots: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Adds a top-level object.
    pub fn add(&mut self, object: impl Into<Object>) -> ObjectId {
        let id = self.push(object.into());
        self.roots.push(id);
        id
    }

    /// Adds an object as a child of the group `parent`.
    pub fn add_to(&mut self, parent: ObjectId, object: impl Into<Object>) -> Result<ObjectId, ShapeError> {
        match self.slots.get(parent.0).map(|s| &s.object) {
            Some(Object::Group(_)) => {}
            _ => return Err(ShapeError::NotAGroup(parent.0)),
        }
        let id = self.push(object.into());
        if let Some(Slot {
            object: Object::Group(group),
            ..
        }) = self.slots.get_mut(parent.0)
        {
            group.children.push(id);
        }
        Ok(id)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Attaches a motion to `id`. Unknown ids are ignored.
    pub fn animate(&mut self, id: ObjectId, motion: Motion) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.motion = motion;
        }
    }

    fn push(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.slots.len());
        self.slots.push(Slot {
            object,
            motion: Motion::default(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Top-level objects in insertion order.
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.slots.get(id.0).map(|s| &s.object)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.slots.get_mut(id.0).map(|s| &mut s.object)
    }

    pub fn transform(&self, id: ObjectId) -> Option<&Transform> {
        self.object(id).map(Object::transform)
    }

    pub fn point_cloud(&self, id: ObjectId) -> Option<&PointCloud> {
        match self.object(id) {
            Some(Object::Points(cloud)) => Some(cloud),
            _ => None,
        }
    }

    pub fn point_cloud_mut(&mut self, id: ObjectId) -> Option<&mut PointCloud> {
        match self.object_mut(id) {
            Some(Object::Points(cloud)) => Some(cloud),
            _ => None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match &slot.object {
                Object::Points(cloud) => cloud.geometry().len(),
                _ => 0,
            })
            .sum()
    }

    /// Applies every motion once. Returns how many transforms changed.
    pub fn advance(&mut self, delta: f32, elapsed: f32) -> usize {
        let mut moved = 0;
        for slot in &mut self.slots {
            if slot.motion.is_still() {
                continue;
            }
            slot.motion
                .advance(slot.object.transform_mut(), delta, elapsed);
            moved += 1;
        }
        moved
    }

    /// Snapshot of the current state as a tree of tagged nodes.
    pub fn graph<'a>(&'a self, camera: &'a Camera) -> SceneGraph<'a> {
        let mut children: Vec<SceneNode<'a>> = Vec::with_capacity(self.roots.len() + self.lights.len() + 1);
        children.push(SceneNode::Camera(camera));
        children.extend(self.lights.iter().copied().map(SceneNode::Light));
        children.extend(self.roots.iter().map(|&id| self.node(id)));

        SceneGraph {
            background: self.background,
            root: SceneNode::Group {
                transform: Mat4::IDENTITY,
                children,
            },
        }
    }

    fn node(&self, id: ObjectId) -> SceneNode<'_> {
        let object = &self.slots[id.0].object;
        let transform = object.transform().matrix();
        match object {
            Object::Points(cloud) => SceneNode::PointCloud { cloud, transform },
            Object::Mesh(mesh) => SceneNode::Mesh { mesh, transform },
            Object::Group(group) => SceneNode::Group {
                transform,
                children: group.children.iter().map(|&child| self.node(child)).collect(),
            },
        }
    }
}

/// One node of the per-frame scene graph. `transform` is relative to the parent.
#[derive(Debug)]
pub enum SceneNode<'a> {
    Group {
        transform: Mat4,
        children: Vec<SceneNode<'a>>,
    },
    Mesh {
        mesh: &'a Mesh,
        transform: Mat4,
    },
    PointCloud {
        cloud: &'a PointCloud,
        transform: Mat4,
    },
    Light(Light),
    Camera(&'a Camera),
}

/// A drawable resolved to world space.
#[derive(Debug, Clone, Copy)]
pub enum DrawItem<'a> {
    Mesh { mesh: &'a Mesh, world: Mat4 },
    Points { cloud: &'a PointCloud, world: Mat4 },
}

#[derive(Debug)]
pub struct SceneGraph<'a> {
    pub background: [f32; 3],
    pub root: SceneNode<'a>,
}

impl<'a> SceneGraph<'a> {
    /// Depth-first walk handing every node its world matrix.
    pub fn walk(&self, mut visit: impl FnMut(&SceneNode<'a>, Mat4)) {
        fn go<'a>(node: &SceneNode<'a>, parent: Mat4, visit: &mut impl FnMut(&SceneNode<'a>, Mat4)) {
            let world = match node {
                SceneNode::Group { transform, .. }
                | SceneNode::Mesh { transform, .. }
                | SceneNode::PointCloud { transform, .. } => parent * *transform,
                SceneNode::Light(_) | SceneNode::Camera(_) => parent,
            };
            visit(node, world);
            if let SceneNode::Group { children, .. } = node {
                for child in children {
                    go(child, world, visit);
                }
            }
        }
        go(&self.root, Mat4::IDENTITY, &mut visit);
    }

    /// Drawables in traversal order, opaque before transparent.
    pub fn draw_list(&self) -> Vec<DrawItem<'a>> {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        self.walk(|node, world| match *node {
            SceneNode::Mesh { mesh, .. } => opaque.push(DrawItem::Mesh { mesh, world }),
            SceneNode::PointCloud { cloud, .. } => {
                let item = DrawItem::Points { cloud, world };
                if cloud.material().is_transparent() {
                    transparent.push(item);
                } else {
                    opaque.push(item);
                }
            }
            _ => {}
        });
        opaque.extend(transparent);
        opaque
    }

    pub fn lights(&self) -> Vec<Light> {
        let mut lights = Vec::new();
        self.walk(|node, _| {
            if let SceneNode::Light(light) = node {
                lights.push(*light);
            }
        });
        lights
    }

    pub fn camera(&self) -> Option<&'a Camera> {
        let mut found = None;
        self.walk(|node, _| {
            if let (None, SceneNode::Camera(camera)) = (found, node) {
                found = Some(*camera);
            }
        });
        found
    }
}
