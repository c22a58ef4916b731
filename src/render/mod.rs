pub mod instance;
pub mod pipeline;

use std::error::Error;
use std::sync::Arc;
use winit::window::Window;

use self::instance::PetInstance;
use self::pipeline::{Globals, PetPipeline};

/// Surface, device and the pet pipeline.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pets: PetPipeline,
}

/// One acquired swapchain image and the encoder recording into it.
pub struct Frame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl Frame {
    /// Pass for the debug UI, drawn over the pets.
    pub fn overlay_pass(&mut self) -> wgpu::RenderPass<'static> {
        self.encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("debug_ui_pass"),
                color_attachments: &[Some(target(&self.view, wgpu::LoadOp::Load))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime()
    }
}

fn target(view: &wgpu::TextureView, load: wgpu::LoadOp<wgpu::Color>) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        depth_slice: None,
        ops: wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        },
    }
}

impl GpuState {
    pub fn new(window: Arc<Window>) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&instance_descriptor());
        let surface = instance.create_surface(window)?;

        // Five small sprites: the integrated GPU is plenty and saves battery.
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("screenpets_device"),
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Default::default()
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps).ok_or("surface reports no texture formats")?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: pick_present_mode(&caps),
            alpha_mode: pick_alpha_mode(&caps),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "Surface: {:?}, {:?}, {:?} (alpha modes offered: {:?})",
            surface_config.format,
            surface_config.alpha_mode,
            surface_config.present_mode,
            caps.alpha_modes
        );
        surface.configure(&device, &surface_config);

        let pets = PetPipeline::new(
            &device,
            format,
            Globals::new(surface_config.width as f32, surface_config.height as f32),
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            pets,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.pets
            .set_globals(&self.queue, Globals::new(width as f32, height as f32));
    }

    pub fn set_present_mode(&mut self, mode: wgpu::PresentMode) {
        if self.surface_config.present_mode == mode {
            return;
        }
        self.surface_config.present_mode = mode;
        self.surface.configure(&self.device, &self.surface_config);
        log::info!("Present mode: {:?}", mode);
    }

    pub fn upload_pets(&mut self, sprites: &[PetInstance]) {
        self.pets.upload(&self.queue, sprites);
    }

    /// Next swapchain image, or `None` to skip this frame.
    pub fn acquire(&self) -> Option<Frame> {
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return None;
            }
            Err(wgpu::SurfaceError::Timeout) => return None,
            Err(e) => {
                log::warn!("Surface error: {e}");
                return None;
            }
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pet_frame"),
            });
        Some(Frame {
            texture,
            view,
            encoder,
        })
    }

    /// Clear to fully transparent and draw every pet and marker.
    pub fn draw_pets(&self, frame: &mut Frame) {
        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pet_pass"),
            color_attachments: &[Some(target(
                &frame.view,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            ))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.pets.draw(&mut pass);
    }

    /// Submit `before` (e.g. UI buffer uploads) ahead of the frame, then present.
    pub fn present(&self, frame: Frame, before: Vec<wgpu::CommandBuffer>) {
        self.queue
            .submit(before.into_iter().chain(Some(frame.encoder.finish())));
        frame.texture.present();
    }
}

fn pick_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    caps.formats
        .iter()
        .copied()
        .find(|f| *f == wgpu::TextureFormat::Bgra8UnormSrgb)
        .or_else(|| caps.formats.first().copied())
}

/// The pets are drawn premultiplied; anything else is a fallback.
fn pick_alpha_mode(caps: &wgpu::SurfaceCapabilities) -> wgpu::CompositeAlphaMode {
    [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|m| caps.alpha_modes.contains(m))
    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

fn pick_present_mode(caps: &wgpu::SurfaceCapabilities) -> wgpu::PresentMode {
    if caps.present_modes.contains(&wgpu::PresentMode::Mailbox) {
        wgpu::PresentMode::Mailbox
    } else {
        wgpu::PresentMode::Fifo
    }
}

/// DX12 with DirectComposition on Windows (Vulkan WSI there can't do
/// transparent composition); whatever the platform prefers elsewhere.
#[cfg(windows)]
fn instance_descriptor() -> wgpu::InstanceDescriptor {
    wgpu::InstanceDescriptor {
        backends: wgpu::Backends::DX12,
        backend_options: wgpu::BackendOptions {
            dx12: wgpu::Dx12BackendOptions {
                presentation_system: wgpu_types::Dx12SwapchainKind::DxgiFromVisual,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(not(windows))]
fn instance_descriptor() -> wgpu::InstanceDescriptor {
    wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(
        formats: Vec<wgpu::TextureFormat>,
        present_modes: Vec<wgpu::PresentMode>,
        alpha_modes: Vec<wgpu::CompositeAlphaMode>,
    ) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            present_modes,
            alpha_modes,
            ..Default::default()
        }
    }

    #[test]
    fn prefers_srgb_bgra_then_first_offered() {
        let c = caps(
            vec![wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb],
            vec![],
            vec![],
        );
        assert_eq!(pick_format(&c), Some(wgpu::TextureFormat::Bgra8UnormSrgb));

        let c = caps(vec![wgpu::TextureFormat::Rgba8Unorm], vec![], vec![]);
        assert_eq!(pick_format(&c), Some(wgpu::TextureFormat::Rgba8Unorm));

        assert_eq!(pick_format(&caps(vec![], vec![], vec![])), None);
    }

    #[test]
    fn alpha_mode_prefers_premultiplied() {
        let c = caps(
            vec![],
            vec![],
            vec![
                wgpu::CompositeAlphaMode::Opaque,
                wgpu::CompositeAlphaMode::PostMultiplied,
                wgpu::CompositeAlphaMode::PreMultiplied,
            ],
        );
        assert_eq!(pick_alpha_mode(&c), wgpu::CompositeAlphaMode::PreMultiplied);

        let c = caps(vec![], vec![], vec![wgpu::CompositeAlphaMode::Opaque]);
        assert_eq!(pick_alpha_mode(&c), wgpu::CompositeAlphaMode::Auto);
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let c = caps(vec![], vec![wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox], vec![]);
        assert_eq!(pick_present_mode(&c), wgpu::PresentMode::Mailbox);
        let c = caps(vec![], vec![wgpu::PresentMode::Fifo], vec![]);
        assert_eq!(pick_present_mode(&c), wgpu::PresentMode::Fifo);
    }
}
