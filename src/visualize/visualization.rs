//! Provides visualization window with the animated robot and a control panel.
//!
//! Every frame the simulation is stepped and drawn into Bevy: each draw call becomes one
//! entity carrying the composed world matrix as its global transform, so the non-uniform
//! scales inherited down the scene graph are shown as they are.
//!
//! ```no_run
//! use rs_errand_robot::config::BehaviorConfig;
//! use rs_errand_robot::simulation::Simulation;
//!
//! let simulation = Simulation::new(BehaviorConfig::default()).unwrap();
//! rs_errand_robot::visualization::visualize(simulation);
//! ```
//!
//! Drag the object with the left mouse button and release it: the robot goes for it once
//! it lands. The panel moves the camera and shows the current phases and the charge gauge.

use std::collections::HashMap;
use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::view::NoFrustumCulling;
use bevy::window::PrimaryWindow;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use nalgebra::Matrix4;

use crate::camera::Camera as ViewCamera;
use crate::interaction::{PointerEvent, Viewport};
use crate::meshes::{MeshData, MeshLibrary};
use crate::palette::Rgba;
use crate::render_traits::{DrawTarget, Shape};
use crate::simulation::Simulation;
use crate::state::AnimationState;

/// Simulation, camera and the GPU side resources for the shapes and colors.
#[derive(Resource)]
struct Stage {
    simulation: Simulation,
    camera: ViewCamera,
    paused: bool,
    meshes: HashMap<Shape, Handle<Mesh>>,
    materials: HashMap<[u32; 4], Handle<StandardMaterial>>,
}

/// Marks entities respawned every frame.
#[derive(Component)]
struct Drawn;

/// Open the window and run the simulation in it until the window is closed.
pub fn visualize(simulation: Simulation) {
    App::new()
        .add_plugins((DefaultPlugins, EguiPlugin))
        .insert_resource(Stage {
            simulation,
            camera: ViewCamera::default(),
            paused: false,
            meshes: HashMap::new(),
            materials: HashMap::new(),
        })
        .add_systems(Startup, setup)
        .add_systems(Update, (handle_pointer, animate, sync_camera, control_panel).chain())
        .run();
}

fn to_bevy_mesh(data: &MeshData) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, data.positions.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals.clone());
    mesh
}

fn to_mat4(m: &Matrix4<f64>) -> Mat4 {
    let m: Matrix4<f32> = m.cast();
    // Both are column major
    Mat4::from_cols_slice(m.as_slice())
}

fn setup(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>, mut stage: ResMut<Stage>) {
    let library = MeshLibrary::new();
    for shape in Shape::ALL {
        if let Some(data) = library.get(shape) {
            stage.meshes.insert(shape, meshes.add(to_bevy_mesh(data)));
        }
    }

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 8000.0,
            ..default()
        },
        transform: Transform::from_xyz(5.0, 8.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 3000.0,
            ..default()
        },
        transform: Transform::from_xyz(-5.0, 0.0, -5.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    commands.spawn(Camera3dBundle::default());
}

/// Draw target spawning one entity per draw call.
struct BevyDraw<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a HashMap<Shape, Handle<Mesh>>,
    material_cache: &'a mut HashMap<[u32; 4], Handle<StandardMaterial>>,
    materials: &'a mut Assets<StandardMaterial>,
}

impl BevyDraw<'_, '_, '_> {
    fn material(&mut self, color: &Rgba) -> Handle<StandardMaterial> {
        let key = color.0.map(f32::to_bits);
        let materials = &mut *self.materials;
        self.material_cache.entry(key).or_insert_with(|| {
            materials.add(StandardMaterial {
                base_color: Color::srgba(color.r(), color.g(), color.b(), color.a()),
                alpha_mode: if color.a() < 1.0 { AlphaMode::Blend } else { AlphaMode::Opaque },
                perceptual_roughness: 0.6,
                double_sided: true,
                cull_mode: None,
                ..default()
            })
        }).clone()
    }
}

impl DrawTarget for BevyDraw<'_, '_, '_> {
    fn draw(&mut self, shape: Shape, world: &Matrix4<f64>, color: &Rgba) {
        let Some(mesh) = self.meshes.get(&shape).cloned() else {
            return;
        };
        let material = self.material(color);
        // No Transform component: the world matrix may carry shear
        self.commands.spawn((
            mesh,
            material,
            GlobalTransform::from(Affine3A::from_mat4(to_mat4(world))),
            Visibility::default(),
            InheritedVisibility::VISIBLE,
            ViewVisibility::default(),
            NoFrustumCulling,
            Drawn,
        ));
    }
}

fn handle_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut egui_contexts: EguiContexts,
    mut stage: ResMut<Stage>,
) {
    let stage = &mut *stage;
    // A drag that ends over the panel still has to let go of the object
    if buttons.just_released(MouseButton::Left) {
        stage.simulation.pointer_release();
    }
    if egui_contexts.ctx_mut().wants_pointer_input() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let (width, height) = (window.width() as f64, window.height() as f64);
    if width > 0.0 && height > 0.0 {
        stage.camera.aspect = width / height;
        stage.simulation.drag.viewport = Viewport { width, height };
    }

    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let pointer = PointerEvent::new(cursor.x as f64, cursor.y as f64);
    if buttons.just_pressed(MouseButton::Left) {
        stage.simulation.pointer_press(&stage.camera, &pointer);
    } else if buttons.pressed(MouseButton::Left) {
        stage.simulation.pointer_motion(&stage.camera, &pointer);
    }
}

fn animate(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut stage: ResMut<Stage>,
    drawn: Query<Entity, With<Drawn>>,
) {
    for entity in drawn.iter() {
        commands.entity(entity).despawn();
    }

    let stage = &mut *stage;
    let mut target = BevyDraw {
        commands: &mut commands,
        meshes: &stage.meshes,
        material_cache: &mut stage.materials,
        materials: &mut materials,
    };
    if stage.paused {
        stage.simulation.render(&stage.camera, &mut target);
    } else {
        stage.simulation.frame(&stage.camera, &mut target);
    }
}

/// Place the Bevy camera where the view matrix says, degenerate bases included.
fn sync_camera(stage: Res<Stage>, mut cameras: Query<(&mut Transform, &mut Projection), With<Camera3d>>) {
    let camera = &stage.camera;
    let Some(camera_to_world) = camera.view().try_inverse() else {
        return;
    };
    for (mut transform, mut projection) in cameras.iter_mut() {
        *transform = Transform::from_matrix(to_mat4(&camera_to_world));
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = camera.fovy.to_radians() as f32;
            perspective.near = camera.near as f32;
            perspective.far = camera.far as f32;
        }
    }
}

fn control_panel(mut egui_contexts: EguiContexts, mut stage: ResMut<Stage>) {
    let stage = &mut *stage;
    egui::Window::new("Errand robot").show(egui_contexts.ctx_mut(), |ui| {
        ui.label("Camera eye");
        ui.add(egui::Slider::new(&mut stage.camera.eye.x, -40.0..=40.0).text("X"));
        ui.add(egui::Slider::new(&mut stage.camera.eye.y, -40.0..=40.0).text("Y"));
        ui.add(egui::Slider::new(&mut stage.camera.eye.z, -40.0..=40.0).text("Z"));

        ui.add_space(10.0);
        ui.label("Look at");
        ui.add(egui::Slider::new(&mut stage.camera.at.x, -10.0..=10.0).text("X"));
        ui.add(egui::Slider::new(&mut stage.camera.at.y, -10.0..=10.0).text("Y"));
        ui.add(egui::Slider::new(&mut stage.camera.at.z, -10.0..=10.0).text("Z"));

        ui.add_space(10.0);
        ui.label("Up");
        ui.add(egui::Slider::new(&mut stage.camera.up.x, -1.0..=1.0).text("X"));
        ui.add(egui::Slider::new(&mut stage.camera.up.y, -1.0..=1.0).text("Y"));
        ui.add(egui::Slider::new(&mut stage.camera.up.z, -1.0..=1.0).text("Z"));
        ui.add(egui::Slider::new(&mut stage.camera.fovy, 10.0..=120.0).text("Field of view"));

        ui.add_space(10.0);
        ui.checkbox(&mut stage.paused, "Paused");
        if ui.button("Reset camera").clicked() {
            stage.camera = ViewCamera { aspect: stage.camera.aspect, ..ViewCamera::default() };
        }

        ui.add_space(10.0);
        let simulation = &stage.simulation;
        let state = &simulation.state;
        ui.label(format!("Errand: {:?}", state.errand));
        ui.label(format!("Battery: {:?}", state.battery));
        ui.label(format!("Object: {:?}", state.object.state));
        ui.label(format!("Errands {}, in receptacle {}, charges {}",
                         state.total_cycles, state.collection.len(), state.charges));

        let segments = simulation.config.gauge_segments.max(1);
        let bars = state.gauge_bars(&simulation.config);
        ui.add(egui::ProgressBar::new(bars as f32 / segments as f32)
            .text(format!("Charge {} / {}", bars, segments)));

        if ui.button("Reset robot").clicked() {
            stage.simulation.state = AnimationState::new(&stage.simulation.config);
        }
    });
}
