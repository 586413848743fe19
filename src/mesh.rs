// mesh.rs - procedural stand-ins for the avatar/dumbbell assets, and the loader's asset source

use std::sync::Arc;

use glam::{Mat3, Mat4, Quat, Vec3};

use statistics_scene::error::LoadError;
use statistics_scene::loader::ModelSource;
use statistics_scene::model::{BodyFatBracket, BuildBracket, Gender, HeightBracket, ModelIdentity};
use statistics_scene::scene::{Node, Scene, Transform, CAMERA_NODE, FOCUS_NODE, MODEL_NODE};

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Cache key on the GPU side.
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub color: [f32; 3],
}

impl MeshData {
    fn named(name: impl Into<String>, color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            color,
            ..Self::default()
        }
    }

    /// Bakes `part` into this mesh under `transform`.
    fn append(&mut self, part: &MeshData, transform: Mat4) {
        let base = self.positions.len() as u32;
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        for (p, n) in part.positions.iter().zip(&part.normals) {
            self.positions
                .push(transform.transform_point3(Vec3::from(*p)).to_array());
            self.normals
                .push((normal_matrix * Vec3::from(*n)).normalize_or_zero().to_array());
        }
        self.indices.extend(part.indices.iter().map(|i| base + i));
    }
}

pub fn build_sphere(radius: f32, lat: usize, lon: usize) -> MeshData {
    let mut mesh = MeshData::default();
    mesh.positions.reserve((lat + 1) * (lon + 1));

    for i in 0..=lat {
        let theta = std::f32::consts::PI * (i as f32) / (lat as f32);
        let y = theta.cos();
        let sin_t = theta.sin();

        for j in 0..=lon {
            let phi = 2.0 * std::f32::consts::PI * (j as f32) / (lon as f32);
            let n = [phi.cos() * sin_t, y, phi.sin() * sin_t];
            mesh.positions.push([n[0] * radius, n[1] * radius, n[2] * radius]);
            mesh.normals.push(n);
        }
    }

    for i in 0..lat {
        for j in 0..lon {
            let a = (i * (lon + 1) + j) as u32;
            let b = a + (lon + 1) as u32;
            mesh.indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    mesh
}

/// Capped cylinder along +Y, centred on the origin.
pub fn build_cylinder(radius: f32, height: f32, segments: usize) -> MeshData {
    let mut mesh = MeshData::default();
    let half = height / 2.0;

    // side
    for j in 0..=segments {
        let phi = 2.0 * std::f32::consts::PI * (j as f32) / (segments as f32);
        let (s, c) = phi.sin_cos();
        for y in [-half, half] {
            mesh.positions.push([c * radius, y, s * radius]);
            mesh.normals.push([c, 0.0, s]);
        }
    }
    for j in 0..segments as u32 {
        let a = j * 2;
        mesh.indices.extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
    }

    // caps
    for (y, ny) in [(-half, -1.0f32), (half, 1.0)] {
        let centre = mesh.positions.len() as u32;
        mesh.positions.push([0.0, y, 0.0]);
        mesh.normals.push([0.0, ny, 0.0]);
        for j in 0..=segments {
            let phi = 2.0 * std::f32::consts::PI * (j as f32) / (segments as f32);
            mesh.positions.push([phi.cos() * radius, y, phi.sin() * radius]);
            mesh.normals.push([0.0, ny, 0.0]);
        }
        for j in 0..segments as u32 {
            let (a, b) = (centre + 1 + j, centre + 2 + j);
            if ny > 0.0 {
                mesh.indices.extend_from_slice(&[centre, b, a]);
            } else {
                mesh.indices.extend_from_slice(&[centre, a, b]);
            }
        }
    }
    mesh
}

pub fn build_box(half: Vec3) -> MeshData {
    let mut mesh = MeshData::default();
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    for (normal, u, v) in faces {
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * half;
            mesh.positions.push(p.to_array());
            mesh.normals.push(normal.to_array());
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

fn limb(from: Vec3, to: Vec3, radius: f32) -> (MeshData, Mat4) {
    let axis = to - from;
    let rotation = Quat::from_rotation_arc(Vec3::Y, axis.normalize_or_zero());
    (
        build_cylinder(radius, axis.length(), 12),
        Mat4::from_rotation_translation(rotation, (from + to) / 2.0),
    )
}

/// Rough body whose proportions follow the identity brackets.
pub fn build_avatar(identity: &ModelIdentity, color: [f32; 3]) -> MeshData {
    let height = match (identity.gender, identity.height) {
        (Gender::Male, HeightBracket::Short) => 1.65,
        (Gender::Male, HeightBracket::Average) => 1.76,
        (Gender::Male, HeightBracket::Tall) => 1.88,
        (Gender::Female, HeightBracket::Short) => 1.53,
        (Gender::Female, HeightBracket::Average) => 1.63,
        (Gender::Female, HeightBracket::Tall) => 1.74,
    };
    let girth = match identity.build {
        BuildBracket::Slim => 0.85,
        BuildBracket::Average => 1.0,
        BuildBracket::Heavy => 1.18,
        BuildBracket::Obese => 1.38,
    };
    let belly = match identity.body_fat {
        BodyFatBracket::Lean => 0.9,
        BodyFatBracket::Fit => 1.0,
        BodyFatBracket::Soft => 1.12,
        BodyFatBracket::High => 1.25,
    };
    let shoulders = match identity.gender {
        Gender::Male => 0.22,
        Gender::Female => 0.18,
    } * girth;

    let mut mesh = MeshData::named(format!("avatar:{identity}"), color);
    let h = height;

    let head = build_sphere(0.11, 16, 24);
    mesh.append(&head, Mat4::from_translation(Vec3::new(0.0, h - 0.12, 0.0)));

    let torso = build_sphere(1.0, 16, 24);
    mesh.append(
        &torso,
        Mat4::from_scale_rotation_translation(
            Vec3::new(shoulders, 0.3 * h / 1.76, 0.13 * girth * belly),
            Quat::IDENTITY,
            Vec3::new(0.0, 0.62 * h, 0.0),
        ),
    );

    let hip_y = 0.48 * h;
    let shoulder_y = 0.8 * h;
    let limb_r = 0.05 * girth;
    for side in [-1.0f32, 1.0] {
        let (leg, t) = limb(
            Vec3::new(side * 0.09 * girth, hip_y, 0.0),
            Vec3::new(side * 0.11 * girth, 0.04, 0.0),
            limb_r * 1.2,
        );
        mesh.append(&leg, t);
        let (arm, t) = limb(
            Vec3::new(side * (shoulders + 0.02), shoulder_y, 0.0),
            Vec3::new(side * (shoulders + 0.08), 0.45 * h, 0.02),
            limb_r,
        );
        mesh.append(&arm, t);
    }
    mesh
}

pub fn build_dumbbell(color: [f32; 3]) -> MeshData {
    let mut mesh = MeshData::named("dumbbell", color);
    let to_x = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    mesh.append(&build_cylinder(0.018, 0.42, 12), Mat4::from_quat(to_x));
    for x in [-0.16f32, 0.16] {
        mesh.append(
            &build_cylinder(0.09, 0.06, 20),
            Mat4::from_rotation_translation(to_x, Vec3::new(x, 0.0, 0.0)),
        );
    }
    mesh
}

pub fn build_floor() -> MeshData {
    let mut mesh = MeshData::named("floor", [0.2, 0.21, 0.24]);
    mesh.append(&build_box(Vec3::new(8.0, 0.01, 6.0)), Mat4::from_translation(Vec3::new(2.5, -0.01, 0.0)));
    mesh
}

/// Builds everything in-process; stands in for the bundled scene and OBJ assets.
pub struct ProceduralModelSource {
    avatar_color: [f32; 3],
}

impl ProceduralModelSource {
    pub fn new(avatar_color: [f32; 3]) -> Self {
        Self { avatar_color }
    }
}

impl ModelSource for ProceduralModelSource {
    type Model = MeshData;

    fn load_scene(&mut self) -> Result<Scene<MeshData>, LoadError> {
        let dumbbell = Arc::new(build_dumbbell([0.55, 0.57, 0.6]));
        let mut rack = Node::empty("dumbbells", Transform::at(Vec3::new(3.1, 0.09, 0.2)));
        for (i, z) in [-0.25f32, 0.25].into_iter().enumerate() {
            let mut transform = Transform::at(Vec3::new(0.0, 0.0, z));
            transform.euler.y = 0.3 * i as f32;
            rack.children
                .push(Node::with_content("dumbbell", transform, dumbbell.clone()));
        }

        Ok(Scene::new(vec![
            Node::empty(CAMERA_NODE, Transform::default()),
            Node::empty(MODEL_NODE, Transform::default()),
            Node::empty(FOCUS_NODE, Transform::at(Vec3::new(5.0, 0.0, 0.0))),
            rack,
            Node::with_content("floor", Transform::default(), Arc::new(build_floor())),
        ]))
    }

    fn load_model(&mut self, identity: &ModelIdentity) -> Result<Node<MeshData>, LoadError> {
        let mesh = build_avatar(identity, self.avatar_color);
        if mesh.indices.is_empty() {
            return Err(LoadError::AssetNotFound(identity.key()));
        }
        Ok(Node::with_content(
            identity.key(),
            Transform::default(),
            Arc::new(mesh),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statistics_scene::model::UserProfile;

    #[test]
    fn sphere_indices_stay_in_range() {
        let sphere = build_sphere(1.0, 4, 6);
        assert_eq!(sphere.positions.len(), 5 * 7);
        assert_eq!(sphere.indices.len(), 4 * 6 * 6);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.positions.len()));
    }

    #[test]
    fn append_offsets_indices() {
        let mut mesh = MeshData::named("pair", [1.0; 3]);
        let part = build_box(Vec3::ONE);
        mesh.append(&part, Mat4::IDENTITY);
        mesh.append(&part, Mat4::from_translation(Vec3::X * 3.0));
        assert_eq!(mesh.positions.len(), 2 * part.positions.len());
        assert_eq!(mesh.indices[part.indices.len()], part.positions.len() as u32);
    }

    #[test]
    fn avatar_mesh_named_after_identity() {
        let identity = ModelIdentity::for_profile(&UserProfile::default());
        let avatar = build_avatar(&identity, [1.0; 3]);
        assert_eq!(avatar.name, format!("avatar:{identity}"));
        assert!(!avatar.indices.is_empty());
    }

    #[test]
    fn procedural_scene_binds() {
        let mut source = ProceduralModelSource::new([1.0; 3]);
        let mut scene = source.load_scene().expect("scene");
        let bindings = scene.bind().expect("bound");
        let identity = ModelIdentity::for_profile(&UserProfile::default());
        let model = source.load_model(&identity).expect("model");
        scene.replace_model(&bindings, model).expect("attached");
        assert_eq!(scene.node(bindings.focus).children.len(), 1);
        assert_eq!(scene.node(bindings.model).children[0].name, identity.key());
    }
}
