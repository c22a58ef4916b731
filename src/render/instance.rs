use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::ecs::components::{Direction, Gait, Heading, Pet, Position, Reaction};
use crate::pet::{ReactionKind, SPRITE_SIZE};

/// Shader frame index: what the fragment shader draws for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Pose {
    Stand = 0,
    Stride = 1,
    Hop = 2,
    Spin = 3,
    Flee = 4,
    Love = 5,
    /// Floating heart marker.
    Heart = 8,
    /// Sweat drop marker.
    Sweat = 9,
}

/// Per-instance data uploaded to GPU each frame.
/// Stride = 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PetInstance {
    /// Sprite centre in screen pixels.
    pub position: [f32; 2],
    /// Scale multiplier (width, height).
    pub size: [f32; 2],
    /// RGBA color packed as u32.
    pub color: u32,
    /// [`Pose`] as u32.
    pub frame: u32,
    /// -1.0 mirrors the sprite about its centre so it faces -x.
    pub flip: f32,
}

/// Pixels the sprite lifts while mid-stride.
const STRIDE_BOB: f32 = 2.0;
/// Peak height of a hop in pixels.
const HOP_HEIGHT: f32 = 14.0;
/// Spin mirrors the sprite every this many ticks.
const SPIN_PERIOD: u32 = 5;

const HEART_COLOR: u32 = 0xFF5A7AFF;
const SWEAT_COLOR: u32 = 0x7FC8FFEE;

impl PetInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x2,
        3 => Float32x2,
        4 => Uint32,
        5 => Uint32,
        6 => Float32,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PetInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    /// Build the pet's own instance from its components.
    pub fn from_components(
        pet: &Pet,
        pos: &Position,
        heading: &Heading,
        gait: &Gait,
        reaction: &Reaction,
    ) -> Self {
        let mut center = pos.0 + Vec2::splat(SPRITE_SIZE * 0.5);
        let mut flip = flip_for(heading.0);

        let pose = match *reaction {
            Reaction::Idle => {
                if gait.mid_stride() {
                    center.y -= STRIDE_BOB;
                    Pose::Stride
                } else {
                    Pose::Stand
                }
            }
            Reaction::Active { kind, remaining } => match kind {
                ReactionKind::Hop => {
                    center.y -= hop_offset(remaining);
                    Pose::Hop
                }
                ReactionKind::Spin => {
                    if (remaining / SPIN_PERIOD) % 2 == 1 {
                        flip = -flip;
                    }
                    Pose::Spin
                }
                ReactionKind::Flee => Pose::Flee,
                ReactionKind::Love => Pose::Love,
            },
        };

        Self {
            position: center.into(),
            size: [1.0, 1.0],
            color: pet.0.color(),
            frame: pose as u32,
            flip,
        }
    }

    /// Marker floating above the pet while certain reactions are active.
    pub fn marker(pos: &Position, reaction: &Reaction) -> Option<Self> {
        let (pose, color) = match reaction.kind()? {
            ReactionKind::Love => (Pose::Heart, HEART_COLOR),
            ReactionKind::Flee => (Pose::Sweat, SWEAT_COLOR),
            ReactionKind::Hop | ReactionKind::Spin => return None,
        };
        let center = pos.0 + Vec2::new(SPRITE_SIZE * 0.5, -SPRITE_SIZE * 0.25);
        Some(Self {
            position: center.into(),
            size: [0.5, 0.5],
            color,
            frame: pose as u32,
            flip: 1.0,
        })
    }
}

/// Sprites face +x; anything walking towards smaller coordinates is mirrored.
pub fn flip_for(direction: Direction) -> f32 {
    match direction {
        Direction::Increasing => 1.0,
        Direction::Decreasing => -1.0,
    }
}

fn hop_offset(remaining: u32) -> f32 {
    let total = crate::pet::reaction::REACTION_TICKS as f32;
    let t = 1.0 - remaining as f32 / total;
    (t * std::f32::consts::PI).sin() * HOP_HEIGHT
}

/// Rebuild the instance list (pets first, then markers so they draw on top).
pub fn build_instances(world: &hecs::World, out: &mut Vec<PetInstance>) {
    out.clear();
    let mut query = world.query::<(&Pet, &Position, &Heading, &Gait, &Reaction)>();
    let mut markers = Vec::new();
    for (_, (pet, pos, heading, gait, reaction)) in query.iter() {
        out.push(PetInstance::from_components(pet, pos, heading, gait, reaction));
        markers.extend(PetInstance::marker(pos, reaction));
    }
    out.extend(markers);
}
