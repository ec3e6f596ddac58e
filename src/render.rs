use std::borrow::Cow;

use glam::DVec2;

use crate::canvas::{Canvas, Glow, Rgba};

#[derive(bytemuck::Zeroable, bytemuck::Pod, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub blur: f32,
    pub fill: Rgba,
    pub glow: Rgba,
}

#[derive(bytemuck::Zeroable, bytemuck::Pod, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct LineInstance {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub width: f32,
    pub color: Rgba,
}

/// Canvas commands of one frame, ready for upload
#[derive(Default)]
pub struct ShapeBatch {
    pub circles: Vec<CircleInstance>,
    pub lines: Vec<LineInstance>,
}

impl Canvas for ShapeBatch {
    fn clear(&mut self) {
        self.circles.clear();
        self.lines.clear();
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, fill: Rgba, glow: Glow) {
        self.circles.push(CircleInstance {
            center: center.as_vec2().to_array(),
            radius: radius as f32,
            blur: glow.blur as f32,
            fill,
            glow: glow.color,
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        self.lines.push(LineInstance {
            from: from.as_vec2().to_array(),
            to: to.as_vec2().to_array(),
            width: width as f32,
            color,
        });
    }
}

/// Vertex buffer that grows to fit the largest batch seen so far
struct InstanceBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    len: u32,
}

impl InstanceBuffer {
    const MIN_SIZE: u64 = 4096;

    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        Self {
            label,
            buffer: create_instance_buffer(device, label, Self::MIN_SIZE),
            len: 0,
        }
    }

    fn upload<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[T],
    ) {
        let bytes: &[u8] = bytemuck::cast_slice(instances);
        let size = bytes.len() as u64;
        if size > self.buffer.size() {
            let size = size.next_power_of_two().max(Self::MIN_SIZE);
            self.buffer = create_instance_buffer(device, self.label, size);
        }

        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.len = instances.len() as u32;
    }
}

fn create_instance_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub struct RenderModule {
    pub screen_size_buffer: wgpu::Buffer,
    pub clear_color: wgpu::Color,

    circles: InstanceBuffer,
    lines: InstanceBuffer,

    bind_group: wgpu::BindGroup,
    circle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
}

impl RenderModule {
    pub fn new(device: &wgpu::Device, swapchain_format: wgpu::TextureFormat) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Field Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("render.wgsl"))),
        });

        let screen_size_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Screen Size Buffer"),
            size: 2 * 4,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_size_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("render"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let circle_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader_module,
            swapchain_format,
            ("circle_vertex", "circle_fragment"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<CircleInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32, 3 => Float32x4, 4 => Float32x4],
            },
        );
        let line_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader_module,
            swapchain_format,
            ("line_vertex", "line_fragment"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32, 3 => Float32x4],
            },
        );

        Self {
            screen_size_buffer,
            clear_color: wgpu::Color {
                r: 0.008,
                g: 0.012,
                b: 0.02,
                a: 1.0,
            },

            circles: InstanceBuffer::new(device, "Circle Instances"),
            lines: InstanceBuffer::new(device, "Line Instances"),

            bind_group,
            circle_pipeline,
            line_pipeline,
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &ShapeBatch) {
        self.circles.upload(device, queue, &batch.circles);
        self.lines.upload(device, queue, &batch.lines);
    }

    /// Draws the last uploaded batch, circles below lines
    pub fn begin_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
    ) -> wgpu::RenderPass<'a> {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: None,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_bind_group(0, &self.bind_group, &[]);

        if self.circles.len > 0 {
            rpass.set_pipeline(&self.circle_pipeline);
            rpass.set_vertex_buffer(0, self.circles.buffer.slice(..));
            rpass.draw(0..6, 0..self.circles.len);
        }

        if self.lines.len > 0 {
            rpass.set_pipeline(&self.line_pipeline);
            rpass.set_vertex_buffer(0, self.lines.buffer.slice(..));
            rpass.draw(0..6, 0..self.lines.len);
        }

        rpass
    }

    pub fn update_size(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.screen_size_buffer,
            0,
            bytemuck::bytes_of(&[width.max(1) as f32, height.max(1) as f32]),
        );
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader_module: &wgpu::ShaderModule,
    swapchain_format: wgpu::TextureFormat,
    (vertex, fragment): (&str, &str),
    instances: wgpu::VertexBufferLayout,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(vertex),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader_module,
            entry_point: vertex,
            buffers: &[instances],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader_module,
            entry_point: fragment,
            targets: &[Some(wgpu::ColorTargetState {
                format: swapchain_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAL: Rgba = Rgba::new(0.2, 0.8, 0.7, 0.25);

    #[test]
    fn instance_layouts_match_shader() {
        assert_eq!(std::mem::size_of::<CircleInstance>(), 12 * 4);
        assert_eq!(std::mem::size_of::<LineInstance>(), 9 * 4);
    }

    #[test]
    fn batch_collects_commands() {
        let mut batch = ShapeBatch::default();
        let glow = Glow {
            blur: 4.0,
            color: TEAL.with_alpha(0.4),
        };
        batch.fill_circle(DVec2::new(10.5, 20.0), 1.5, TEAL, glow);
        batch.stroke_line(DVec2::ZERO, DVec2::new(3.0, 4.0), 0.4, TEAL.with_alpha(0.04));

        assert_eq!(
            batch.circles,
            vec![CircleInstance {
                center: [10.5, 20.0],
                radius: 1.5,
                blur: 4.0,
                fill: TEAL,
                glow: TEAL.with_alpha(0.4),
            }]
        );
        assert_eq!(batch.lines.len(), 1);
        assert_eq!(batch.lines[0].to, [3.0, 4.0]);
        assert_eq!(batch.lines[0].width, 0.4);
    }

    #[test]
    fn clear_empties_batch() {
        let mut batch = ShapeBatch::default();
        batch.stroke_line(DVec2::ZERO, DVec2::ONE, 1.0, TEAL);
        batch.clear();
        assert!(batch.circles.is_empty());
        assert!(batch.lines.is_empty());
    }
}
