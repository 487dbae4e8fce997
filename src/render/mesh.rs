use glam::Vec3;
use log::debug;

use super::context::{BufferTarget, DrawCommand, GraphicsApi, RenderContext, RenderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Int,
    UnsignedInt,
    UnsignedByte,
}

impl AttributeType {
    pub fn size(self) -> usize {
        match self {
            AttributeType::Float | AttributeType::Int | AttributeType::UnsignedInt => 4,
            AttributeType::UnsignedByte => 1,
        }
    }
}

/// One shader input read from the vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub index: u32,
    pub components: usize,
    pub kind: AttributeType,
    pub normalized: bool,
    pub offset: usize,
}

impl VertexAttribute {
    pub fn end(&self) -> usize {
        self.offset + self.components * self.kind.size()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttributeLayout {
    attributes: Vec<VertexAttribute>,
    stride: usize,
}

impl VertexAttributeLayout {
    pub fn new(stride: usize) -> Self {
        Self {
            attributes: Vec::new(),
            stride,
        }
    }

    /// Tightly packed vec3 float positions at location 0.
    pub fn positions() -> Self {
        Self::new(3 * std::mem::size_of::<f32>()).with_attribute(VertexAttribute {
            index: 0,
            components: 3,
            kind: AttributeType::Float,
            normalized: false,
            offset: 0,
        })
    }

    pub fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes covered by the attributes of one vertex.
    pub fn record_size(&self) -> usize {
        self.attributes.iter().map(VertexAttribute::end).max().unwrap_or(0)
    }
}

/// Static vertex + optional index data behind one vertex array object.
#[derive(Debug)]
pub struct GeometryBuffer {
    vertex_array: u32,
    vertex_buffer: u32,
    index_buffer: Option<u32>,
    layout: VertexAttributeLayout,
    vertex_count: usize,
    index_count: Option<usize>,
}

impl GeometryBuffer {
    /// Uploads the data once. The previously bound geometry, if any, stays bound.
    ///
    /// # Panics
    ///
    /// If the layout stride does not match its attributes, or the vertex bytes are not
    /// a whole number of records.
    pub fn create<A: GraphicsApi>(
        ctx: &mut RenderContext<A>,
        vertices: &[f32],
        indices: Option<&[u32]>,
        layout: VertexAttributeLayout,
    ) -> Self {
        let stride = layout.stride();
        assert!(stride > 0, "vertex stride must be non-zero");
        assert_eq!(
            layout.record_size(),
            stride,
            "stride must equal the byte size of one vertex record"
        );
        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        assert_eq!(
            vertex_bytes.len() % stride,
            0,
            "vertex data is not a whole number of {}-byte records",
            stride
        );

        let previous = ctx.state().geometry;
        let api = ctx.api_mut();
        let vertex_array = api.create_vertex_array();
        api.bind_vertex_array(vertex_array);

        let vertex_buffer = api.create_buffer();
        api.upload_buffer(BufferTarget::Vertex, vertex_buffer, vertex_bytes);

        // the index buffer bound while the vertex array is bound is recorded in it
        let index_buffer = indices.map(|indices| {
            let buffer = api.create_buffer();
            api.upload_buffer(BufferTarget::Index, buffer, bytemuck::cast_slice(indices));
            buffer
        });

        for attribute in layout.attributes() {
            api.vertex_attrib_pointer(attribute, stride);
            api.enable_vertex_attrib_array(attribute.index);
        }
        // uploading borrows the binding point, put back whatever was current
        match previous {
            Some(bound) => ctx.bind_geometry(bound.vertex_array, bound.command),
            None => ctx.unbind_geometry(),
        }

        let vertex_count = vertex_bytes.len() / stride;
        debug!(
            "Uploaded geometry {}: {} vertices, {:?} indices",
            vertex_array,
            vertex_count,
            indices.map(<[u32]>::len)
        );

        Self {
            vertex_array,
            vertex_buffer,
            index_buffer,
            layout,
            vertex_count,
            index_count: indices.map(<[u32]>::len),
        }
    }

    pub fn from_mesh<A: GraphicsApi>(ctx: &mut RenderContext<A>, mesh: &MeshData) -> Self {
        let vertices = mesh.vertex_data();
        let indices = (!mesh.indices.is_empty()).then_some(mesh.indices.as_slice());
        Self::create(ctx, &vertices, indices, VertexAttributeLayout::positions())
    }

    pub fn vertex_array(&self) -> u32 {
        self.vertex_array
    }

    pub fn layout(&self) -> &VertexAttributeLayout {
        &self.layout
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> Option<usize> {
        self.index_count
    }

    pub fn draw_command(&self) -> DrawCommand {
        match self.index_count {
            Some(count) => DrawCommand::Elements { count },
            None => DrawCommand::Arrays {
                count: self.vertex_count,
            },
        }
    }

    pub fn is_bound<A: GraphicsApi>(&self, ctx: &RenderContext<A>) -> bool {
        ctx.state()
            .geometry
            .map_or(false, |bound| bound.vertex_array == self.vertex_array)
    }

    pub fn bind<A: GraphicsApi>(&self, ctx: &mut RenderContext<A>) {
        ctx.bind_geometry(self.vertex_array, self.draw_command());
    }

    pub fn unbind<A: GraphicsApi>(&self, ctx: &mut RenderContext<A>) {
        if self.is_bound(ctx) {
            ctx.unbind_geometry();
        }
    }

    /// Releases the vertex array and its buffers. Refused while bound.
    pub fn destroy<A: GraphicsApi>(self, ctx: &mut RenderContext<A>) -> Result<(), RenderError> {
        if self.is_bound(ctx) {
            return Err(RenderError::GeometryStillBound(self.vertex_array));
        }
        let api = ctx.api_mut();
        api.delete_vertex_array(self.vertex_array);
        api.delete_buffer(self.vertex_buffer);
        if let Some(index_buffer) = self.index_buffer {
            api.delete_buffer(index_buffer);
        }
        Ok(())
    }
}

/// CPU-side positions and triangle indices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Four corners plus the center, fanned into four triangles.
    pub fn square() -> Self {
        Self {
            vertices: vec![
                Vec3::new(0.5, 0.5, 0.0),   // top right
                Vec3::new(0.5, -0.5, 0.0),  // bottom right
                Vec3::new(-0.5, -0.5, 0.0), // bottom left
                Vec3::new(-0.5, 0.5, 0.0),  // top left
                Vec3::new(0.0, 0.0, 0.0),   // center
            ],
            indices: vec![2, 3, 4, 0, 1, 4, 0, 3, 4, 1, 2, 4],
        }
    }

    pub fn triangle() -> Self {
        Self {
            vertices: vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.0, 0.5, 0.0),
            ],
            indices: Vec::new(),
        }
    }

    pub fn vertex_data(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }
}
