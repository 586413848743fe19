// scene.rs - minimal scene graph: named root nodes, transforms, shared model content

use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::error::SceneError;
use crate::pose::CameraPose;
use crate::render::CameraTarget;

pub const CAMERA_NODE: &str = "camera";
pub const MODEL_NODE: &str = "model";
pub const FOCUS_NODE: &str = "model-focus";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Pitch, yaw, roll in radians.
    pub euler: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            euler: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.euler.y, self.euler.x, self.euler.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// Content is shared, so cloning a node (the focused copy of the avatar) is cheap.
#[derive(Debug)]
pub struct Node<M> {
    pub name: String,
    pub transform: Transform,
    pub content: Option<Arc<M>>,
    pub children: Vec<Node<M>>,
}

impl<M> Clone for Node<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            transform: self.transform,
            content: self.content.clone(),
            children: self.children.clone(),
        }
    }
}

impl<M> Node<M> {
    pub fn empty(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            content: None,
            children: Vec::new(),
        }
    }

    pub fn with_content(name: impl Into<String>, transform: Transform, content: Arc<M>) -> Self {
        Self {
            content: Some(content),
            ..Self::empty(name, transform)
        }
    }
}

impl<M> CameraTarget for Node<M> {
    fn set_camera_pose(&mut self, pose: &CameraPose) {
        self.transform.position = pose.position;
        self.transform.euler.x = pose.euler_x;
        self.transform.euler.y = pose.euler_y;
    }
}

/// Root node indices the screen drives directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneBindings {
    pub camera: usize,
    pub model: usize,
    pub focus: usize,
}

#[derive(Debug)]
pub struct Scene<M> {
    pub root: Vec<Node<M>>,
}

impl<M> Scene<M> {
    pub fn new(root: Vec<Node<M>>) -> Self {
        Self { root }
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.root.iter().position(|n| n.name == name)
    }

    /// Fails if any of `camera`, `model` or `model-focus` is missing.
    pub fn bind(&self) -> Result<SceneBindings, SceneError> {
        let find = |name: &str| {
            self.child_index(name)
                .ok_or_else(|| SceneError::MissingNode(name.to_string()))
        };
        Ok(SceneBindings {
            camera: find(CAMERA_NODE)?,
            model: find(MODEL_NODE)?,
            focus: find(FOCUS_NODE)?,
        })
    }

    pub fn node(&self, index: usize) -> &Node<M> {
        &self.root[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node<M> {
        &mut self.root[index]
    }

    /// Swaps the avatar under both anchors. Each anchor must hold at most one
    /// child; otherwise the swap fails and the scene is left as it was.
    pub fn replace_model(
        &mut self,
        bindings: &SceneBindings,
        model: Node<M>,
    ) -> Result<(), SceneError> {
        for anchor in [bindings.model, bindings.focus] {
            let node = &self.root[anchor];
            if node.children.len() > 1 {
                return Err(SceneError::ResidualChildren {
                    node: node.name.clone(),
                    remaining: node.children.len() - 1,
                });
            }
        }
        for anchor in [bindings.model, bindings.focus] {
            self.root[anchor].children.clear();
        }

        self.root[bindings.focus].children.push(model.clone());
        self.root[bindings.model].children.push(model);
        Ok(())
    }

    /// Depth first, with each node's world matrix.
    pub fn visit(&self, mut f: impl FnMut(&Node<M>, Mat4)) {
        fn walk<M>(node: &Node<M>, parent: Mat4, f: &mut impl FnMut(&Node<M>, Mat4)) {
            let world = parent * node.transform.matrix();
            f(node, world);
            for child in &node.children {
                walk(child, world, f);
            }
        }
        for node in &self.root {
            walk(node, Mat4::IDENTITY, &mut f);
        }
    }
}
