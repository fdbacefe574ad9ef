//! GPU side of the battle view
//!
//! The scene is assembled on the CPU in arena pixels; this module maps it to
//! clip space, uploads it as one triangle list and draws it over the field
//! background.

use wgpu::util::DeviceExt;

use glam::Vec2;

use super::scene::Viewport;
use super::vertex::{Vertex, colors};

/// Device, surface and the single pipeline the battle view draws with
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    /// Arena-to-screen mapping for the current surface size
    pub viewport: Viewport,
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        arena: Vec2,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("warhost-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let caps = surface.get_capabilities(adapter);
        // Faction colours are authored in sRGB
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let battle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("battle-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // No uniforms: vertices arrive already in clip space
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("battle-layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("battle-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &battle_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &battle_shader,
                entry_point: Some("fs_main"),
                // Fading effects and corpses rely on alpha blending
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Shape tessellation does not keep a consistent winding
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Placeholder until the first frame is uploaded
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("battle-vertices"),
            contents: bytemuck::cast_slice(&[Vertex::new(0.0, 0.0, [1.0; 4])]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_count: 0,
            viewport: Viewport::new(width, height, arena),
        })
    }

    /// Reconfigure the surface; zero-sized windows (minimised) are ignored
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            return;
        }
        self.viewport = Viewport::new(new_width, new_height, self.viewport.arena);
        self.config.width = new_width;
        self.config.height = new_height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload arena-space vertices and draw them, displaced by `shake` pixels
    pub fn render(&mut self, vertices: &[Vertex], shake: Vec2) -> Result<(), wgpu::SurfaceError> {
        let clip = to_clip_space(&self.viewport, vertices, shake);
        self.vertex_count = clip.len() as u32;
        if !clip.is_empty() {
            self.vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("battle-vertices"),
                    contents: bytemuck::cast_slice(&clip),
                    usage: wgpu::BufferUsages::VERTEX,
                });
        }

        let frame = self.surface.get_current_texture()?;
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("battle-frame"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("battlefield"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(field_background()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            if self.vertex_count > 0 {
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..self.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}

/// Shift arena vertices by the screen shake and map them to clip space
pub fn to_clip_space(viewport: &Viewport, vertices: &[Vertex], shake: Vec2) -> Vec<Vertex> {
    vertices
        .iter()
        .map(|v| {
            let ndc = viewport.arena_to_ndc(Vec2::from(v.position) + shake);
            Vertex::new(ndc.x, ndc.y, v.color)
        })
        .collect()
}

/// Opaque clear colour behind the battlefield
pub fn field_background() -> wgpu::Color {
    wgpu::Color {
        r: colors::BACKGROUND[0] as f64,
        g: colors::BACKGROUND[1] as f64,
        b: colors::BACKGROUND[2] as f64,
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_space_applies_shake_before_mapping() {
        let vp = Viewport::new(800, 600, Vec2::new(800.0, 600.0));
        let red = [1.0, 0.0, 0.0, 1.0];
        let verts = [Vertex::new(400.0, 300.0, red), Vertex::new(0.0, 0.0, red)];

        let still = to_clip_space(&vp, &verts, Vec2::ZERO);
        assert_eq!(still[0].position, [0.0, 0.0]);
        assert_eq!(still[1].position, [-1.0, 1.0]);
        assert_eq!(still[1].color, red);

        // 40 px right and 30 px down on an 800x600 arena
        let shaken = to_clip_space(&vp, &verts, Vec2::new(40.0, 30.0));
        assert!((shaken[0].position[0] - 0.1).abs() < 1e-6);
        assert!((shaken[0].position[1] + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_clip_space_of_empty_frame_is_empty() {
        let vp = Viewport::new(1024, 768, Vec2::new(800.0, 600.0));
        assert!(to_clip_space(&vp, &[], Vec2::new(3.0, -2.0)).is_empty());
    }

    #[test]
    fn test_field_background_is_opaque() {
        let bg = field_background();
        assert_eq!(bg.a, 1.0);
        assert_eq!(bg.r, colors::BACKGROUND[0] as f64);
        assert_eq!(bg.b, colors::BACKGROUND[2] as f64);
    }
}
