pub mod ring;
pub mod timer;

use winit::window::Window;

use self::ring::RingBuffer;
use self::timer::{SystemPhase, SystemTimers, PHASE_COUNT};

use crate::ecs::components::{Direction, Reaction};
use crate::overlay::PetView;
use crate::pet::{PetKind, ReactionKind};
use crate::render::GpuState;

/// Number of frame times to keep in the histogram.
const FRAME_HISTORY_LEN: usize = 300;
/// Number of reaction log lines kept.
const REACTION_LOG_LEN: usize = 8;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame stats
// ---------------------------------------------------------------------------

/// Rolling frame-time stats plus a periodic FPS log line.
pub struct FrameStats {
    pub frame_times: RingBuffer<f64>,
    pub fps: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    frame_count: u64,
    log_timer: f64,
    log_frames: u32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            avg: 0.0,
            min: 0.0,
            max: 0.0,
            frame_count: 0,
            log_timer: 0.0,
            log_frames: 0,
        }
    }

    pub fn record(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.push(dt);

        let (n, sum, min, max) = self.frame_times.iter().fold(
            (0u32, 0.0, f64::MAX, 0.0f64),
            |(n, s, lo, hi), &t| (n + 1, s + t, lo.min(t), hi.max(t)),
        );
        self.avg = sum / n.max(1) as f64;
        self.min = min;
        self.max = max;
        self.fps = if self.avg > 0.0 { 1.0 / self.avg } else { 0.0 };

        self.log_frames += 1;
        self.log_timer += dt;
        if self.log_timer >= FPS_LOG_INTERVAL {
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                self.log_frames as f64 / self.log_timer,
                self.avg * 1000.0,
                self.min * 1000.0,
                self.max * 1000.0,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frames = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Debug overlay powered by egui.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,

    pub stats: FrameStats,
    /// Per-system timers (fed by the overlay's tick and hover polls).
    pub system_timers: SystemTimers,
    /// Recent reactions, newest last.
    pub reactions: RingBuffer<String>,

    /// UI controls, consumed by the app after each frame.
    pub paused: bool,
    pub respawn_requested: bool,
    /// Single tick requested while paused.
    pub step_requested: bool,
    pub poke_requested: Option<PetKind>,
    pub present_mode_index: usize,
    pub present_mode_changed: bool,

    /// Pet table (updated by app each frame).
    pub pets: Vec<PetView>,
    pub hovered: Option<PetKind>,
    pub tick_count: u64,
    pub tick_alpha: f32,
    pub screen_size: (f32, f32),
}

const PRESENT_MODES: [wgpu::PresentMode; 3] = [
    wgpu::PresentMode::Mailbox,
    wgpu::PresentMode::Fifo,
    wgpu::PresentMode::Immediate,
];

const PRESENT_MODE_LABELS: [&str; 3] = ["Mailbox", "Fifo (vsync)", "Immediate"];

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: false,
            stats: FrameStats::new(),
            system_timers: SystemTimers::new(),
            reactions: RingBuffer::new(REACTION_LOG_LEN),
            paused: false,
            respawn_requested: false,
            step_requested: false,
            poke_requested: None,
            present_mode_index: 0, // Mailbox
            present_mode_changed: false,
            pets: Vec::new(),
            hovered: None,
            tick_count: 0,
            tick_alpha: 0.0,
            screen_size: (0.0, 0.0),
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay {}", if self.visible { "shown" } else { "hidden" });
    }

    /// Note a reaction that just started.
    pub fn log_reaction(&mut self, tick: u64, kind: PetKind, reaction: ReactionKind) {
        self.reactions
            .push(format!("#{tick:>6} {} {}", kind.label(), reaction.label()));
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// The selected present mode.
    pub fn selected_present_mode(&self) -> wgpu::PresentMode {
        PRESENT_MODES[self.present_mode_index]
    }

    /// Run the egui frame and produce paint output.
    /// Returns (clipped_primitives, textures_delta, screen_descriptor).
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        // Snapshot read-only state so the UI closure doesn't borrow self.
        let ui_state = UiSnapshot {
            visible: self.visible,
            fps: self.stats.fps,
            frame_time_avg: self.stats.avg,
            frame_time_min: self.stats.min,
            frame_time_max: self.stats.max,
            frame_times: self.stats.frame_times.iter().copied().collect(),
            system_durations: self.system_timers.durations_us,
            system_total: self.system_timers.total_us(),
            pets: self.pets.clone(),
            hovered: self.hovered,
            reactions: self.reactions.iter().cloned().collect(),
            tick_count: self.tick_count,
            tick_alpha: self.tick_alpha,
            screen_size: self.screen_size,
        };

        let mut controls = UiControls {
            paused: self.paused,
            respawn: false,
            step: false,
            poke: None,
            present_mode_index: self.present_mode_index,
        };

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &ui_state, &mut controls);
        });

        // Write back controls.
        self.paused = controls.paused;
        self.respawn_requested |= controls.respawn;
        self.step_requested |= controls.step;
        if controls.poke.is_some() {
            self.poke_requested = controls.poke;
        }
        if controls.present_mode_index != self.present_mode_index {
            self.present_mode_changed = true;
        }
        self.present_mode_index = controls.present_mode_index;

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before draw_egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw (avoids borrow conflicts with egui_ctx)
// ---------------------------------------------------------------------------

struct UiSnapshot {
    visible: bool,
    fps: f64,
    frame_time_avg: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frame_times: Vec<f64>,
    system_durations: [f64; PHASE_COUNT],
    system_total: f64,
    pets: Vec<PetView>,
    hovered: Option<PetKind>,
    reactions: Vec<String>,
    tick_count: u64,
    tick_alpha: f32,
    screen_size: (f32, f32),
}

struct UiControls {
    paused: bool,
    respawn: bool,
    step: bool,
    poke: Option<PetKind>,
    present_mode_index: usize,
}

/// One-word summary of a pet's reaction for the table.
fn reaction_text(reaction: &Reaction) -> String {
    match reaction {
        Reaction::Idle => "-".to_string(),
        Reaction::Active { kind, remaining } => format!("{} ({remaining})", kind.label()),
    }
}

fn arrow(view: &PetView) -> &'static str {
    match (view.edge.is_horizontal(), view.direction) {
        (true, Direction::Increasing) => "→",
        (true, Direction::Decreasing) => "←",
        (false, Direction::Increasing) => "↓",
        (false, Direction::Decreasing) => "↑",
    }
}

fn draw_ui(ctx: &egui::Context, s: &UiSnapshot, c: &mut UiControls) {
    if !s.visible {
        return;
    }

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Screen Pets")
        .default_pos([10.0, 10.0])
        .default_width(340.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            // --- Performance ---
            ui.heading("Performance");
            ui.label(format!("FPS: {:.1}", s.fps));
            ui.label(format!(
                "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                s.frame_time_avg * 1000.0,
                s.frame_time_min * 1000.0,
                s.frame_time_max * 1000.0,
            ));

            if !s.frame_times.is_empty() {
                let max_time = s
                    .frame_times
                    .iter()
                    .copied()
                    .fold(0.0f64, f64::max)
                    .max(0.020);

                let (response, painter) =
                    ui.allocate_painter(egui::vec2(300.0, 40.0), egui::Sense::hover());
                let rect = response.rect;
                let bar_width = rect.width() / s.frame_times.len() as f32;

                for (i, &t) in s.frame_times.iter().enumerate() {
                    let h = (t / max_time) as f32 * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    let color = if t > 0.01667 {
                        egui::Color32::from_rgb(255, 100, 80)
                    } else {
                        egui::Color32::from_rgb(80, 200, 120)
                    };
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + bar_width, rect.bottom()),
                        ),
                        0.0,
                        color,
                    );
                }
            }
            ui.add_space(4.0);

            // --- System timers ---
            ui.heading("System Timers");
            let total = s.system_total.max(1.0);
            for phase in SystemPhase::ALL {
                let us = s.system_durations[phase as usize];
                ui.label(
                    egui::RichText::new(format!(
                        "{:<12}{:>6.1}us ({:>2.0}%)",
                        phase.label(),
                        us,
                        us / total * 100.0
                    ))
                    .monospace(),
                );
            }
            ui.add_space(4.0);

            // --- Pets ---
            ui.heading("Pets");
            egui::Grid::new("pet_table")
                .striped(true)
                .num_columns(7)
                .show(ui, |ui| {
                    for title in ["Pet", "Edge", "Pos", "Speed", "Gait", "Reaction", ""] {
                        ui.label(egui::RichText::new(title).strong());
                    }
                    ui.end_row();

                    for pet in &s.pets {
                        let name = if s.hovered == Some(pet.kind) {
                            egui::RichText::new(format!("{} {}", pet.kind.emoji(), pet.kind.label()))
                                .color(egui::Color32::from_rgb(255, 200, 50))
                        } else {
                            egui::RichText::new(format!("{} {}", pet.kind.emoji(), pet.kind.label()))
                        };
                        ui.label(name);
                        ui.label(format!("{} {}", pet.edge.label(), arrow(pet)));
                        ui.label(format!("{:.0},{:.0}", pet.pos.x, pet.pos.y));
                        ui.label(format!("{:.2} ({:.2})", pet.speed, pet.base_speed));
                        ui.label(format!("{:>2}", pet.frame));
                        ui.label(reaction_text(&pet.reaction));
                        if ui
                            .add_enabled(pet.reaction.is_idle(), egui::Button::new("Poke").small())
                            .clicked()
                        {
                            c.poke = Some(pet.kind);
                        }
                        ui.end_row();
                    }
                });
            ui.add_space(4.0);

            ui.heading("Recent Reactions");
            if s.reactions.is_empty() {
                ui.label("(none yet)");
            }
            for line in s.reactions.iter().rev() {
                ui.label(egui::RichText::new(line).monospace());
            }
            ui.add_space(4.0);

            // --- Controls ---
            ui.heading("Controls");
            ui.horizontal(|ui| {
                ui.checkbox(&mut c.paused, "Pause");
                if ui
                    .add_enabled(c.paused, egui::Button::new("Step"))
                    .clicked()
                {
                    c.step = true;
                }
                if ui.button("Respawn").clicked() {
                    c.respawn = true;
                }
            });
            ui.horizontal(|ui| {
                ui.label("Present:");
                egui::ComboBox::from_id_salt("present_mode")
                    .selected_text(PRESENT_MODE_LABELS[c.present_mode_index])
                    .show_ui(ui, |ui| {
                        for (i, label) in PRESENT_MODE_LABELS.iter().enumerate() {
                            ui.selectable_value(&mut c.present_mode_index, i, *label);
                        }
                    });
            });
            ui.add_space(4.0);

            // --- Info ---
            ui.label(format!(
                "Screen: {:.0}x{:.0} | Ticks: {} (+{:.2})",
                s.screen_size.0, s.screen_size.1, s.tick_count, s.tick_alpha
            ));
            ui.label("F12: Toggle | ESC: Quit");
        });
}
