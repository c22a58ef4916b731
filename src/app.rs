use std::error::Error;
use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::config::OverlayConfig;
use crate::debug::timer::SystemPhase;
use crate::debug::DebugOverlay;
use crate::overlay::PetOverlay;
#[cfg(windows)]
use crate::platform;
use crate::render::instance::{self, PetInstance};
use crate::render::GpuState;

/// Top-level application state.
struct App {
    config: OverlayConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    debug: Option<DebugOverlay>,

    // Pets + their clock; None until mounted, and again after teardown.
    overlay: Option<PetOverlay>,

    last_frame_time: Option<Instant>,

    // Screen dimensions
    screen_w: u32,
    screen_h: u32,

    // Last known cursor position (only fed by window events off Windows).
    cursor: Vec2,

    // Reusable instance buffer (avoid per-frame allocation)
    instance_buf: Vec<PetInstance>,

    // Startup failure to report once the loop returns.
    fatal: Option<Box<dyn Error>>,
}

impl App {
    fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            debug: None,
            overlay: None,
            last_frame_time: None,
            screen_w: 0,
            screen_h: 0,
            cursor: Vec2::splat(-1.0),
            instance_buf: Vec::with_capacity(16),
            fatal: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or("no monitor found")?;
        let screen_size = monitor.size();

        // No with_transparent(true): that sets WS_EX_LAYERED which creates
        // a GDI backing surface that conflicts with DirectComposition.
        // Start hidden so DWM doesn't cache stale frame state before our
        // overlay style changes take effect.
        let attrs = WindowAttributes::default()
            .with_title("Screen Pets")
            .with_decorations(false)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(screen_size)
            .with_position(winit::dpi::PhysicalPosition::new(0, 0));

        #[cfg(not(windows))]
        let attrs = attrs.with_transparent(true);

        let window = Arc::new(event_loop.create_window(attrs)?);

        #[cfg(windows)]
        platform::win32::setup_overlay(&window);

        let size = window.inner_size();
        self.screen_w = size.width;
        self.screen_h = size.height;

        log::info!(
            "Overlay window created: {}x{} on {:?}",
            size.width,
            size.height,
            monitor.name().unwrap_or_default()
        );

        let gpu = GpuState::new(window.clone())?;
        self.debug = Some(DebugOverlay::new(&window, &gpu));
        self.gpu = Some(gpu);
        log::info!("wgpu + pet pipeline initialized");

        window.set_visible(true);
        self.window = Some(window);
        Ok(())
    }

    /// Current pointer position in screen pixels.
    fn poll_cursor(&self) -> Vec2 {
        #[cfg(windows)]
        {
            let (x, y) = platform::win32::get_mouse_pos();
            Vec2::new(x, y)
        }
        #[cfg(not(windows))]
        {
            self.cursor
        }
    }

    /// Advance the pets by this frame's elapsed time and feed the hover poll.
    fn update(&mut self, dt: f64) {
        let cursor = self.poll_cursor();
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        let mut debug = self.debug.as_mut();

        // Apply debug controls from last frame.
        if let Some(debug) = debug.as_deref_mut() {
            overlay.paused = debug.paused;
            if std::mem::take(&mut debug.respawn_requested) {
                overlay.respawn();
                debug.reactions.clear();
                log::info!("Pets respawned from debug overlay");
            }
            if std::mem::take(&mut debug.step_requested) && overlay.paused {
                overlay.step();
            }
            if let Some(kind) = debug.poke_requested.take() {
                if let Some(reaction) = overlay.poke(kind) {
                    debug.log_reaction(overlay.tick_count(), kind, reaction);
                }
            }
        }

        let started = {
            let mut timers = debug.as_deref_mut().map(|d| &mut d.system_timers);
            overlay.frame(dt, timers.as_deref_mut());
            overlay.pointer_at(cursor, timers)
        };

        if let Some(debug) = debug {
            if let (Some(reaction), Some(kind)) = (started, overlay.hovered()) {
                debug.log_reaction(overlay.tick_count(), kind, reaction);
            }
            debug.pets = overlay.pets();
            debug.hovered = overlay.hovered();
            debug.tick_count = overlay.tick_count();
            debug.tick_alpha = overlay.alpha();
            debug.screen_size = overlay.screen_size();
        }
    }

    fn render(&mut self) {
        let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) else {
            return;
        };

        if let Some(debug) = self.debug.as_mut() {
            debug.system_timers.begin();
        }
        match &self.overlay {
            Some(overlay) => instance::build_instances(overlay.world(), &mut self.instance_buf),
            None => self.instance_buf.clear(),
        }
        if let Some(debug) = self.debug.as_mut() {
            debug.system_timers.end(SystemPhase::BuildInstances);
            debug.system_timers.begin();
        }
        gpu.upload_pets(&self.instance_buf);
        if let Some(debug) = self.debug.as_mut() {
            debug.system_timers.end(SystemPhase::GpuUpload);
            debug.system_timers.begin();
        }

        let Some(mut frame) = gpu.acquire() else {
            return;
        };
        gpu.draw_pets(&mut frame);

        let mut ui_uploads = Vec::new();
        let mut egui_output = None;
        if let Some(debug) = self.debug.as_mut().filter(|d| d.visible) {
            let (primitives, textures_delta, screen_desc) =
                debug.run_frame(window, self.screen_w, self.screen_h);
            ui_uploads = debug.prepare_egui(
                &gpu.device,
                &gpu.queue,
                &mut frame.encoder,
                &primitives,
                &textures_delta,
                &screen_desc,
            );
            {
                let mut pass = frame.overlay_pass();
                debug.render_egui(&mut pass, &primitives, &screen_desc);
            }
            egui_output = Some(textures_delta);
        }

        gpu.present(frame, ui_uploads);

        if let Some(debug) = self.debug.as_mut() {
            if let Some(textures_delta) = egui_output {
                debug.free_textures(&textures_delta);
            }
            debug.system_timers.end(SystemPhase::RenderSubmit);
            if std::mem::take(&mut debug.present_mode_changed) {
                gpu.set_present_mode(debug.selected_present_mode());
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // Reduced motion: no window, no pets, no clock.
        if self.config.reduced_motion {
            log::info!("Reduced motion requested, nothing to show; exiting");
            event_loop.exit();
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
            return;
        }

        self.overlay = PetOverlay::mount(
            &self.config,
            self.screen_w as f32,
            self.screen_h as f32,
        );

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Poll hotkeys (window is click-through so can't receive keyboard events)
        #[cfg(windows)]
        {
            if platform::win32::is_escape_pressed() {
                log::info!("ESC pressed, exiting");
                event_loop.exit();
                return;
            }
            if platform::win32::is_f12_pressed() {
                if let Some(debug) = self.debug.as_mut() {
                    debug.toggle();
                }
            }
        }
        #[cfg(not(windows))]
        let _ = event_loop;

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(debug), Some(window)) = (self.debug.as_mut(), self.window.as_ref()) {
            if debug.visible && debug.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                if new_size.width == self.screen_w && new_size.height == self.screen_h {
                    return;
                }
                self.screen_w = new_size.width;
                self.screen_h = new_size.height;
                if let Some(overlay) = &mut self.overlay {
                    overlay.on_resize(new_size.width as f32, new_size.height as f32);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = Vec2::splat(-1.0);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{Key, NamedKey};
                if !event.state.is_pressed() {
                    return;
                }
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        log::info!("ESC pressed, exiting");
                        event_loop.exit();
                    }
                    Key::Named(NamedKey::F12) => {
                        if let Some(debug) = self.debug.as_mut() {
                            debug.toggle();
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();
                    if let Some(debug) = self.debug.as_mut() {
                        debug.stats.record(dt);
                    }
                    self.update(dt);
                }
                self.last_frame_time = Some(now);

                self.render();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Stop the clock and drop the pets before GPU resources go away.
        self.overlay.take();
        self.debug.take();
        self.gpu.take();
        log::info!("Screen Pets shut down");
    }
}

/// Entry point: create event loop and run.
pub fn run() -> Result<(), Box<dyn Error>> {
    let config = OverlayConfig::load();
    log::info!(
        "Config: reduced_motion={} seed={:?}",
        config.reduced_motion,
        config.seed
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
