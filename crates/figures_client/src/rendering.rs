use bevy::asset::RenderAssetUsages;
use bevy::color::ColorToComponents;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::NoFrustumCulling;
use bevy::sprite::AlphaMode2d;
use figures_simulation::{FrameTriangles, TriangleBatch};

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_scene_mesh)
            .add_systems(Update, upload_frame_triangles);
    }
}

/// Marker: единственный mesh, куда заливаются треугольники debug draw
#[derive(Component)]
pub struct SceneMesh;

/// Пустой dynamic mesh с vertex colors
fn spawn_scene_mesh(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let mesh = meshes.add(build_mesh(&[]));
    let material = materials.add(ColorMaterial {
        color: Color::WHITE,
        alpha_mode: AlphaMode2d::Blend,
        ..default()
    });

    commands.spawn((
        SceneMesh,
        Mesh2d(mesh),
        MeshMaterial2d(material),
        Transform::default(),
        // Вершины в мировых координатах, AABB mesh'а не пересчитываем
        NoFrustumCulling,
        Visibility::Hidden,
    ));
}

/// Батчи последнего шага → один mesh (u32 индексы поверх u16 батчей)
pub fn build_mesh(batches: &[TriangleBatch]) -> Mesh {
    let vertex_count: usize = batches.iter().map(TriangleBatch::vertex_count).sum();
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(vertex_count);
    let mut colors: Vec<[f32; 4]> = Vec::with_capacity(vertex_count);
    let mut indices: Vec<u32> = Vec::with_capacity(vertex_count);

    for batch in batches {
        let base = positions.len() as u32;
        positions.extend(batch.vertices.iter().map(|v| [v.x, v.y, 0.0]));
        colors.extend(batch.colors.iter().map(|&[r, g, b, a]| {
            Color::srgba_u8(r, g, b, a).to_linear().to_f32_array()
        }));
        indices.extend(batch.indices().into_iter().map(|i| base + i as u32));
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
}

/// Перезаливает mesh, когда симуляция собрала новый кадр
fn upload_frame_triangles(
    frame: Res<FrameTriangles>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut query: Query<(&Mesh2d, &mut Visibility), With<SceneMesh>>,
) {
    if !frame.is_changed() {
        return;
    }

    let Ok((mesh2d, mut visibility)) = query.single_mut() else {
        return;
    };

    if frame.batches.iter().all(TriangleBatch::is_empty) {
        *visibility = Visibility::Hidden;
        return;
    }

    if let Some(mesh) = meshes.get_mut(&mesh2d.0) {
        *mesh = build_mesh(&frame.batches);
        *visibility = Visibility::Visible;
    }
}
