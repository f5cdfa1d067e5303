use std::borrow::Cow;
use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::shader::{Program, ShaderError, UniformBlock, UniformLocation};

use super::ctx::{RenderCtx, RenderTarget};
use super::target::{ClearColor, FrameTarget, UniformValue, ViewportRect};

/// Clip-space corners of the oversized triangle that covers the viewport for
/// any aspect ratio.
pub const FULLSCREEN_TRIANGLE: [[f32; 2]; 3] = [[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]];

/// Vertex attribute fed from [`FULLSCREEN_TRIANGLE`].
pub const POSITION_ATTRIBUTE: &str = "aPosition";

/// GPU objects for drawing one linked program over the whole surface.
///
/// Owns the pipeline, the static triangle buffer and the uniform buffer with a
/// CPU-side staging copy. Uniform writes are staged and uploaded right before
/// the draw that uses them.
pub struct FullscreenPass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniforms: Option<UniformBinding>,
    warned_type_mismatch: bool,
}

struct UniformBinding {
    group: u32,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    staging: Vec<u8>,
    dirty: bool,
}

impl FullscreenPass {
    /// Creates the pipeline and uploads the fullscreen triangle.
    ///
    /// Fails if `program` does not declare [`POSITION_ATTRIBUTE`].
    pub fn new(ctx: &RenderCtx<'_>, program: &Program) -> Result<Self, ShaderError> {
        let position = program
            .attribute_location(POSITION_ATTRIBUTE)
            .ok_or_else(|| ShaderError::MissingAttribute(POSITION_ATTRIBUTE.to_string()))?;

        let vertex_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("glowfield vertex shader"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(program.vertex().module().clone())),
        });
        let fragment_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("glowfield fragment shader"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(program.fragment().module().clone())),
        });

        // Groups below the uniform block's set get empty layouts.
        let mut bind_group_layouts = Vec::new();
        let mut uniforms = None;
        if let Some(block) = program.uniform_block() {
            for _ in 0..block.group {
                bind_group_layouts.push(ctx.device.create_bind_group_layout(
                    &wgpu::BindGroupLayoutDescriptor {
                        label: Some("glowfield empty bgl"),
                        entries: &[],
                    },
                ));
            }
            let (layout, binding) = create_uniform_binding(ctx, block);
            bind_group_layouts.push(layout);
            uniforms = Some(binding);
        }
        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("glowfield pipeline layout"),
                bind_group_layouts: &layout_refs,
                immediate_size: 0,
            });

        let attributes = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: position,
        }];
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("glowfield fullscreen pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
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

        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("glowfield fullscreen triangle vbo"),
                contents: bytemuck::cast_slice(&FULLSCREEN_TRIANGLE),
                usage: wgpu::BufferUsages::VERTEX,
            });

        log::debug!(
            "fullscreen pass ready (format {:?}, aPosition at location {position})",
            ctx.surface_format
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            uniforms,
            warned_type_mismatch: false,
        })
    }

    /// Stages `value` for the next draw.
    fn write_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        if location.kind != value.kind() {
            if !self.warned_type_mismatch {
                log::warn!(
                    "uniform at offset {} is {}, ignoring {} write",
                    location.offset,
                    location.kind,
                    value.kind()
                );
                self.warned_type_mismatch = true;
            }
            return;
        }

        let Some(uniforms) = self.uniforms.as_mut() else { return };
        let bytes = value.as_bytes();
        let start = location.offset as usize;
        let Some(slot) = uniforms.staging.get_mut(start..start + bytes.len()) else {
            return;
        };
        slot.copy_from_slice(bytes);
        uniforms.dirty = true;
    }

    fn flush_uniforms(&mut self, queue: &wgpu::Queue) {
        if let Some(uniforms) = self.uniforms.as_mut().filter(|u| u.dirty) {
            queue.write_buffer(&uniforms.buffer, 0, &uniforms.staging);
            uniforms.dirty = false;
        }
    }
}

fn create_uniform_binding(
    ctx: &RenderCtx<'_>,
    block: &UniformBlock,
) -> (wgpu::BindGroupLayout, UniformBinding) {
    // Uniform buffers are bound in 16-byte units.
    let size = u64::from(block.size.max(16)).next_multiple_of(16);

    let layout = ctx
        .device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glowfield uniforms bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: block.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size),
                },
                count: None,
            }],
        });

    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("glowfield uniforms ubo"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("glowfield uniforms bind group"),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: block.binding,
            resource: buffer.as_entire_binding(),
        }],
    });

    let binding = UniformBinding {
        group: block.group,
        buffer,
        bind_group,
        staging: vec![0; size as usize],
        dirty: true,
    };
    (layout, binding)
}

/// [`FrameTarget`] recording into the frame's command encoder.
///
/// Without a pass (the program failed to build) only clears reach the GPU.
/// Call [`finish`](Self::finish) so a clear with no following draw still
/// happens.
pub struct GpuFrameTarget<'a, 'c, 't> {
    ctx: &'a RenderCtx<'c>,
    target: &'a mut RenderTarget<'t>,
    pass: Option<&'a mut FullscreenPass>,
    viewport: Option<ViewportRect>,
    pending_clear: Option<ClearColor>,
}

impl<'a, 'c, 't> GpuFrameTarget<'a, 'c, 't> {
    pub fn new(
        ctx: &'a RenderCtx<'c>,
        target: &'a mut RenderTarget<'t>,
        pass: Option<&'a mut FullscreenPass>,
    ) -> Self {
        Self {
            ctx,
            target,
            pass,
            viewport: None,
            pending_clear: None,
        }
    }

    /// Records a pending clear that no draw has consumed.
    pub fn finish(mut self) {
        let Some(color) = self.pending_clear.take() else { return };
        let _rpass = begin_pass(self.target, wgpu::LoadOp::Clear(color.into()));
    }
}

impl FrameTarget for GpuFrameTarget<'_, '_, '_> {
    fn set_viewport(&mut self, viewport: ViewportRect) {
        self.viewport = Some(viewport);
    }

    fn clear(&mut self, color: ClearColor) {
        self.pending_clear = Some(color);
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        if let Some(pass) = self.pass.as_deref_mut() {
            pass.write_uniform(location, value);
        }
    }

    fn draw_arrays(&mut self, vertices: Range<u32>) {
        let Some(pass) = self.pass.as_deref_mut() else {
            log::debug!("draw skipped: no linked program");
            return;
        };

        pass.flush_uniforms(self.ctx.queue);

        let load = match self.pending_clear.take() {
            Some(color) => wgpu::LoadOp::Clear(color.into()),
            None => wgpu::LoadOp::Load,
        };
        let mut rpass = begin_pass(self.target, load);

        if let Some(vp) = self.viewport {
            rpass.set_viewport(
                vp.x as f32,
                vp.y as f32,
                vp.width as f32,
                vp.height as f32,
                0.0,
                1.0,
            );
        }

        rpass.set_pipeline(&pass.pipeline);
        if let Some(uniforms) = &pass.uniforms {
            rpass.set_bind_group(uniforms.group, &uniforms.bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, pass.vertex_buffer.slice(..));
        rpass.draw(vertices, 0..1);
    }
}

fn begin_pass<'e>(target: &'e mut RenderTarget<'_>, load: wgpu::LoadOp<wgpu::Color>) -> wgpu::RenderPass<'e> {
    target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("glowfield fullscreen pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
