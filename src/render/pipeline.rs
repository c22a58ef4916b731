use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::instance::PetInstance;
use crate::pet::{PetKind, SPRITE_SIZE};

/// Room around the sprite for the glow.
const GLOW_MARGIN: f32 = 4.0;

/// Pixel half-extent of a quad at scale 1.
pub const QUAD_HALF_EXTENT: f32 = SPRITE_SIZE * 0.5 + GLOW_MARGIN;

/// Every pet plus at most one marker each.
pub const MAX_INSTANCES: usize = PetKind::ALL.len() * 2;

/// One corner of the sprite quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Corner {
    /// Unit offset from the sprite centre, in [-1, 1].
    pub offset: [f32; 2],
    pub uv: [f32; 2],
}

impl Corner {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Corner>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Two triangles, drawn without an index buffer. uv (0,0) is the top-left.
#[rustfmt::skip]
pub const SPRITE_QUAD: [Corner; 6] = [
    Corner { offset: [-1.0, -1.0], uv: [0.0, 0.0] },
    Corner { offset: [ 1.0, -1.0], uv: [1.0, 0.0] },
    Corner { offset: [ 1.0,  1.0], uv: [1.0, 1.0] },
    Corner { offset: [-1.0, -1.0], uv: [0.0, 0.0] },
    Corner { offset: [ 1.0,  1.0], uv: [1.0, 1.0] },
    Corner { offset: [-1.0,  1.0], uv: [0.0, 1.0] },
];

/// Uniform block shared by every sprite. Padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Globals {
    pub screen_size: [f32; 2],
    pub half_extent: f32,
    pub _pad: f32,
}

impl Globals {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            screen_size: [width.max(1.0), height.max(1.0)],
            half_extent: QUAD_HALF_EXTENT,
            _pad: 0.0,
        }
    }
}

/// Pet sprite pipeline: one quad per pet or marker.
pub struct PetPipeline {
    pipeline: wgpu::RenderPipeline,
    quad: wgpu::Buffer,
    instances: wgpu::Buffer,
    globals: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    instance_count: u32,
}

impl PetPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, globals: Globals) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pet_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/pet.wgsl").into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pet_globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<Globals>() as wgpu::BufferAddress,
                    ),
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pet_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        // Output is premultiplied so the compositor can blend it over the desktop.
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pet_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Corner::layout(), PetInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Mirrored sprites wind the other way, so nothing is culled.
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pet_quad"),
            contents: bytemuck::cast_slice(&SPRITE_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pet_instances"),
            size: (MAX_INSTANCES * std::mem::size_of::<PetInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pet_globals"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pet_globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            quad,
            instances,
            globals: globals_buffer,
            globals_bind_group,
            instance_count: 0,
        }
    }

    /// Upload this frame's sprites. Anything past capacity is dropped.
    pub fn upload(&mut self, queue: &wgpu::Queue, sprites: &[PetInstance]) {
        if sprites.len() > MAX_INSTANCES {
            log::warn!(
                "{} sprites queued, only {} fit; extra markers dropped",
                sprites.len(),
                MAX_INSTANCES
            );
        }
        let sprites = &sprites[..sprites.len().min(MAX_INSTANCES)];
        self.instance_count = sprites.len() as u32;
        if !sprites.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(sprites));
        }
    }

    pub fn set_globals(&self, queue: &wgpu::Queue, globals: Globals) {
        queue.write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad.slice(..));
        pass.set_vertex_buffer(1, self.instances.slice(..));
        pass.draw(0..SPRITE_QUAD.len() as u32, 0..self.instance_count);
    }
}
