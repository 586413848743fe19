// main.rs - statistics screen demo: paged stat cards over the shared 3D scene

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod i18n;
mod mesh;
mod renderer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use glam::Mat4;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

use statistics_scene::config::{load_json, load_json_or_default, Preferences, ScreenConfig};
use statistics_scene::loader::ModelLoader;
use statistics_scene::model::{ModelIdentity, UserProfile};
use statistics_scene::render::view_matrix;
use statistics_scene::routes::{DetailRoute, RecordKind};
use statistics_scene::{FrameState, StatisticsSession};

use mesh::{MeshData, ProceduralModelSource};
use renderer::{DrawItem, Renderer};

const FOV_Y_DEG: f32 = 50.0;
/// Movement before a press on the scene counts as a drag rather than a tap.
const TAP_SLOP: f32 = 4.0;

type Session = StatisticsSession<MeshData>;

/// `<exe_dir>/assets/<name>` when present, otherwise `./assets/<name>`.
fn asset_path(name: &str) -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("assets").join(name)))
        .filter(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from("assets").join(name))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pointer {
    Idle,
    Scrolling,
    ScenePressed { start_x: f32 },
    SceneDragging,
}

/// Left-button state plus a smoothed horizontal velocity in logical px/s.
struct PointerTracker {
    mode: Pointer,
    last_x: f32,
    last_time: Instant,
    velocity_x: f32,
}

impl PointerTracker {
    fn new() -> Self {
        Self {
            mode: Pointer::Idle,
            last_x: 0.0,
            last_time: Instant::now(),
            velocity_x: 0.0,
        }
    }

    fn press(&mut self, x: f32, now: Instant) {
        self.last_x = x;
        self.last_time = now;
        self.velocity_x = 0.0;
    }

    /// Returns the horizontal delta since the last sample.
    fn sample(&mut self, x: f32, now: Instant) -> f32 {
        let dx = x - self.last_x;
        let dt = now.duration_since(self.last_time).as_secs_f32();
        if dt > 0.0 {
            self.velocity_x = 0.7 * (dx / dt) + 0.3 * self.velocity_x;
        }
        self.last_x = x;
        self.last_time = now;
        dx
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut current_lang = i18n::resolve_lang_from_args();
    i18n::init(&current_lang);

    let config: ScreenConfig = load_json_or_default(&asset_path("screen.json"));
    let prefs: Preferences = load_json_or_default(&asset_path("preferences.json"));
    let mut profile: UserProfile = load_json_or_default(&asset_path("profile.json"));

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .unwrap(),
    );
    let scale = window.scale_factor() as f32;

    let mut renderer = pollster::block_on(Renderer::new(window.clone()));

    let source = ProceduralModelSource::new(prefs.avatar_color().rgb());
    let mut session: Session =
        StatisticsSession::new(config, prefs, renderer.size.width as f32 / scale)
            .with_loader(ModelLoader::spawn(source));
    if let Err(e) = session.start_loading(&profile) {
        log::error!("{}", i18n::tr_with("error.load", &[("err", e.to_string())]));
    }

    let mut pointer = PointerTracker::new();
    let mut cursor = (0.0f32, 0.0f32);
    let mut status_message: Option<String> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        let now = Instant::now();
        let scale = window.scale_factor() as f32;

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        session.resize(new_size.width as f32 / scale, now);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::Right) => session.step_page(1, now),
                                Some(VirtualKeyCode::Left) => session.step_page(-1, now),
                                Some(VirtualKeyCode::O) => {
                                    if let Some(path) = pick_profile() {
                                        status_message =
                                            open_profile(&path, &mut session, &mut profile);
                                    }
                                }
                                Some(VirtualKeyCode::F11) => toggle_fullscreen(&window),
                                _ => {}
                            }
                        }
                    }

                    WindowEvent::MouseInput {
                        state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        let x = cursor.0;
                        match state {
                            ElementState::Pressed => {
                                pointer.press(x, now);
                                pointer.mode = if session.begin_scroll_drag() {
                                    Pointer::Scrolling
                                } else {
                                    Pointer::ScenePressed { start_x: x }
                                };
                            }
                            ElementState::Released => {
                                let velocity = pointer.velocity_x;
                                match pointer.mode {
                                    Pointer::Scrolling => session.end_scroll_drag(velocity, now),
                                    Pointer::ScenePressed { .. } => {
                                        session.scene_tapped(x, now);
                                    }
                                    Pointer::SceneDragging => {
                                        session.scene_drag_ended(velocity, now)
                                    }
                                    Pointer::Idle => {}
                                }
                                pointer.mode = Pointer::Idle;
                            }
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        let logical = position.to_logical::<f32>(scale as f64);
                        cursor = (logical.x, logical.y);

                        // the pointer stands in for device tilt
                        let size = renderer.size.to_logical::<f32>(scale as f64);
                        if size.width > 0.0 && size.height > 0.0 {
                            session.on_motion(
                                logical.x / size.width * 2.0 - 1.0,
                                logical.y / size.height * 2.0 - 1.0,
                                now,
                            );
                        }

                        match pointer.mode {
                            Pointer::Scrolling => {
                                let dx = pointer.sample(logical.x, now);
                                session.scroll_drag_by(dx, now);
                            }
                            Pointer::ScenePressed { start_x } => {
                                pointer.sample(logical.x, now);
                                if (logical.x - start_x).abs() > TAP_SLOP {
                                    if let Some(mode) = session.scene_drag_began(start_x) {
                                        log::debug!("scene drag: {mode:?}");
                                        session.scene_drag_moved(logical.x, now);
                                        pointer.mode = Pointer::SceneDragging;
                                    } else {
                                        pointer.mode = Pointer::Idle;
                                    }
                                }
                            }
                            Pointer::SceneDragging => {
                                pointer.sample(logical.x, now);
                                session.scene_drag_moved(logical.x, now);
                            }
                            Pointer::Idle => {}
                        }
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(x, y) => x - y,
                            MouseScrollDelta::PixelDelta(pos) => (pos.x - pos.y) as f32 / 20.0,
                        };
                        if scroll.abs() >= 0.5 && !session.pager().is_animating() {
                            session.step_page(scroll.signum() as i32, now);
                        }
                    }

                    WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                        match pointer.mode {
                            Pointer::Scrolling => session.end_scroll_drag(0.0, now),
                            Pointer::SceneDragging => session.scene_drag_cancelled(now),
                            _ => {}
                        }
                        pointer.mode = Pointer::Idle;
                    }

                    WindowEvent::DroppedFile(path) => {
                        status_message = open_profile(&path, &mut session, &mut profile);
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                if let Err(e) = session.poll_loader(now) {
                    log::error!("{}", i18n::tr_with("error.load", &[("err", e.to_string())]));
                    status_message = Some(i18n::tr_with("error.load", &[("err", e.to_string())]));
                }

                let frame = session.tick(now);
                if frame.page == 0 && session.is_scene_ready() {
                    session.play_intro_if_needed(profile.body_fat_percentage.map(f64::from), now);
                }

                let mut draws = Vec::new();
                if let Some(scene) = session.scene() {
                    scene.visit(|node, world| {
                        if let Some(mesh) = &node.content {
                            renderer.upload_mesh(mesh);
                            draws.push(DrawItem {
                                mesh: mesh.name.clone(),
                                world,
                            });
                        }
                    });
                }
                if let Some(pose) = frame.camera {
                    let proj = Mat4::perspective_rh(
                        FOV_Y_DEG.to_radians(),
                        renderer.aspect(),
                        0.05,
                        100.0,
                    );
                    renderer.update_camera(proj * view_matrix(&pose));
                }

                let mut action = None;
                let render_result = renderer.render_with_ui(&window, &draws, |ctx| {
                    action = draw_ui(
                        ctx,
                        &session,
                        &profile,
                        &frame,
                        now,
                        status_message.as_deref(),
                        &mut current_lang,
                    );
                });

                if let Some(action) = action {
                    match action {
                        UiAction::OpenProfile(path) => {
                            status_message = open_profile(&path, &mut session, &mut profile);
                        }
                        UiAction::Row {
                            page,
                            section,
                            row,
                            tag,
                        } => {
                            status_message = session
                                .on_row_activated(page, section, row, tag)
                                .map(|route| {
                                    i18n::tr_with("status.opened", &[("route", route_label(route))])
                                });
                        }
                        UiAction::GoToPage(page) => session.scroll_to_page(page, true, now),
                        UiAction::SetTilt(enabled) => session.set_motion_enabled(enabled, now),
                        UiAction::ToggleFullscreen => toggle_fullscreen(&window),
                        UiAction::LanguageChanged => {
                            i18n::init(&current_lang);
                            window.set_title(&i18n::tr("app.title"));
                        }
                    }
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn toggle_fullscreen(window: &winit::window::Window) {
    if window.fullscreen().is_some() {
        window.set_fullscreen(None);
    } else {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
}

fn pick_profile() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&i18n::tr("file.filter.profile"), &["json"])
        .pick_file()
}

/// Loads a profile file and asks for the matching avatar. Returns a status line.
fn open_profile(path: &Path, session: &mut Session, profile: &mut UserProfile) -> Option<String> {
    let loaded: UserProfile = match load_json(path) {
        Ok(p) => p,
        Err(e) => {
            log::error!("{}: {e}", path.display());
            return Some(i18n::tr_with("error.profile", &[("err", e.to_string())]));
        }
    };
    let identity = ModelIdentity::for_profile(&loaded);
    *profile = loaded;

    match session.reload_model(profile) {
        Ok(true) => Some(i18n::tr_with("status.loading_model", &[("model", identity.key())])),
        Ok(false) => Some(i18n::tr_with("status.model_unchanged", &[("model", identity.key())])),
        Err(e) => Some(i18n::tr_with("error.load", &[("err", e.to_string())])),
    }
}

fn route_label(route: DetailRoute) -> String {
    match route {
        DetailRoute::Birthday => i18n::tr("row.birthday"),
        DetailRoute::Gender => i18n::tr("row.gender"),
        DetailRoute::BmiInfo => i18n::tr("row.bmi"),
        DetailRoute::BmrInfo => i18n::tr("row.bmr"),
        DetailRoute::FfmiInfo => i18n::tr("row.ffmi"),
        DetailRoute::Records(kind) => match kind {
            RecordKind::Height => i18n::tr("row.height"),
            RecordKind::Weight => i18n::tr("row.weight"),
            RecordKind::BodyFat => i18n::tr("row.body_fat"),
            RecordKind::Measurement(m) => m.name().to_string(),
            RecordKind::Lift(l) => l.name().to_string(),
        },
    }
}

enum UiAction {
    OpenProfile(PathBuf),
    Row {
        page: usize,
        section: usize,
        row: usize,
        tag: i32,
    },
    GoToPage(usize),
    SetTilt(bool),
    ToggleFullscreen,
    LanguageChanged,
}

fn fmt_value(value: Option<f32>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}{unit}"))
}

fn draw_ui(
    ctx: &egui::Context,
    session: &Session,
    profile: &UserProfile,
    frame: &FrameState,
    now: Instant,
    status_message: Option<&str>,
    current_lang: &mut String,
) -> Option<UiAction> {
    let mut action = None;

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(i18n::tr("menu.file"), |ui| {
                if ui.button(i18n::tr("menu.open_profile")).clicked() {
                    ui.close_menu();
                    action = pick_profile().map(UiAction::OpenProfile);
                }
                if ui.button(i18n::tr("menu.exit")).clicked() {
                    std::process::exit(0);
                }
            });

            ui.menu_button(i18n::tr("menu.view"), |ui| {
                for page in 0..session.pager().page_count() {
                    let label = i18n::tr(&format!("page.{page}"));
                    if ui.button(label).clicked() {
                        action = Some(UiAction::GoToPage(page));
                        ui.close_menu();
                    }
                }
                ui.separator();
                let mut tilt = session.motion_enabled();
                if ui.checkbox(&mut tilt, i18n::tr("view.tilt")).clicked() {
                    action = Some(UiAction::SetTilt(tilt));
                    ui.close_menu();
                }
                if ui.button(i18n::tr("view.fullscreen")).clicked() {
                    action = Some(UiAction::ToggleFullscreen);
                    ui.close_menu();
                }
            });

            ui.menu_button(i18n::tr("menu.language"), |ui| {
                for (code, name) in i18n::LANGUAGES {
                    if ui.radio_value(current_lang, code.to_string(), name).clicked() {
                        action = Some(UiAction::LanguageChanged);
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if !session.is_scene_ready() {
                ui.label(
                    egui::RichText::new(i18n::tr("status.loading_scene"))
                        .color(egui::Color32::YELLOW),
                );
                ui.label("|");
            }
            ui.label(i18n::tr_with(
                "status.page",
                &[
                    ("page", (frame.page + 1).to_string()),
                    ("count", session.pager().page_count().to_string()),
                ],
            ));
            ui.label("|");
            ui.label(format!("{:.2}", frame.progress.value()));
            if let Some(pose) = frame.camera {
                ui.label("|");
                ui.label(format!(
                    "({:.2}, {:.2}, {:.2}) {:.1}° {:.1}°",
                    pose.position.x,
                    pose.position.y,
                    pose.position.z,
                    pose.euler_x.to_degrees(),
                    pose.euler_y.to_degrees()
                ));
            }
            if let Some(model) = session.current_model_identity() {
                ui.label("|");
                ui.label(model);
            }
            if !frame.paging.user_interaction_enabled {
                ui.label("|");
                ui.label(
                    egui::RichText::new(i18n::tr("status.scene_mode"))
                        .color(egui::Color32::LIGHT_BLUE),
                );
            }
            if let Some(message) = status_message {
                ui.label("|");
                ui.label(message);
            }
        });
    });

    // Pages slide with the pager; the last page is the bare scene.
    let page_width = session.pager().page_width();
    let offset_x = session.pager().offset_x();
    let top = ctx.available_rect().top() + 12.0;
    for page in 0..3usize {
        let left = page as f32 * page_width - offset_x + 16.0;
        if left + page_width < 0.0 || left > page_width {
            continue;
        }
        egui::Area::new(egui::Id::new(("stats_page", page)))
            .fixed_pos(egui::pos2(left, top))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width((page_width * 0.35).clamp(220.0, 360.0));
                    ui.heading(i18n::tr(&format!("page.{page}")));
                    if let Some(row) = draw_page(ui, page, session, profile, now) {
                        action = Some(row);
                    }
                });
            });
    }

    if let Some(alpha) = frame.edge_hint_alpha {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("edge_hint"),
        ));
        let rect = ctx.available_rect();
        let a = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
        painter.rect_filled(
            egui::Rect::from_min_size(rect.left_top(), egui::vec2(6.0, rect.height())),
            0.0,
            egui::Color32::from_white_alpha(a),
        );
        painter.text(
            rect.left_center() + egui::vec2(14.0, 0.0),
            egui::Align2::LEFT_CENTER,
            i18n::tr("hint.edge"),
            egui::FontId::proportional(16.0),
            egui::Color32::from_white_alpha(a),
        );
    }

    action
}

fn row_button(ui: &mut egui::Ui, label: String, value: String) -> bool {
    ui.horizontal(|ui| {
        let clicked = ui.button(label).clicked();
        ui.label(value);
        clicked
    })
    .inner
}

fn draw_page(
    ui: &mut egui::Ui,
    page: usize,
    session: &Session,
    profile: &UserProfile,
    now: Instant,
) -> Option<UiAction> {
    let mut action = None;
    let mut row = |ui: &mut egui::Ui, section, index, tag, label: String, value: String| {
        if row_button(ui, label, value) {
            action = Some(UiAction::Row {
                page,
                section,
                row: index,
                tag,
            });
        }
    };

    match page {
        0 => {
            let gender = i18n::tr(match profile.gender {
                statistics_scene::model::Gender::Male => "gender.male",
                statistics_scene::model::Gender::Female => "gender.female",
            });
            row(ui, 0, 0, 0, i18n::tr("row.birthday"), "-".into());
            row(ui, 0, 1, 0, i18n::tr("row.gender"), gender);
            row(ui, 0, 2, 0, i18n::tr("row.height"), fmt_value(profile.height_cm, " cm"));
            row(ui, 0, 3, 0, i18n::tr("row.weight"), fmt_value(profile.weight_kg, " kg"));
            ui.separator();
            row(ui, 1, 0, 0, i18n::tr("row.bmi"), fmt_value(profile.bmi(), ""));
            row(ui, 1, 1, 0, i18n::tr("row.bmr"), "-".into());
            ui.separator();
            let body_fat = match session.intro() {
                Some(intro) => intro.label_text(now),
                None => fmt_value(profile.body_fat_percentage, "%"),
            };
            row(ui, 2, 0, 0, i18n::tr("row.body_fat"), body_fat);
            if let Some(intro) = session.intro() {
                ui.add(egui::ProgressBar::new(intro.ring_progress(now) as f32).desired_width(160.0));
            }
            row(ui, 2, 1, 0, i18n::tr("row.ffmi"), "-".into());
        }
        1 => {
            ui.horizontal(|ui| {
                row(ui, 0, 0, 0, "Chest".into(), String::new());
                row(ui, 0, 0, 1, "Waist".into(), String::new());
            });
            ui.separator();
            row(ui, 1, 0, 0, "Hips".into(), "-".into());
            ui.separator();
            for (index, name) in ["Arms", "Thighs", "Calves"].into_iter().enumerate() {
                row(ui, 2, index, 0, name.into(), "-".into());
            }
        }
        _ => {
            for (index, name) in ["Bench Press", "Squat", "Deadlift"].into_iter().enumerate() {
                row(ui, 0, index, 0, name.into(), "-".into());
            }
        }
    }
    action
}
