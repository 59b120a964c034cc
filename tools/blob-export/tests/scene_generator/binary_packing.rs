//! Binary buffer packing for the test scene.

use gltf_json as json;
use json::validation::Checked::Valid;

/// Accumulates one GLB binary buffer plus its views and accessors
#[derive(Default)]
pub(crate) struct BufferBuilder {
    pub data: Vec<u8>,
    pub views: Vec<json::buffer::View>,
    pub accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Append float vectors; returns the accessor index.
    pub fn push_f32<const N: usize>(&mut self, values: &[[f32; N]], with_bounds: bool) -> u32 {
        let type_ = match N {
            2 => json::accessor::Type::Vec2,
            3 => json::accessor::Type::Vec3,
            _ => panic!("unsupported vector width {N}"),
        };

        let (min, max) = if with_bounds {
            let (min, max) = bounds(values);
            (Some(to_value(&min)), Some(to_value(&max)))
        } else {
            (None, None)
        };

        let bytes: Vec<u8> = values.iter().flatten().flat_map(|f| f.to_le_bytes()).collect();
        let view = self.push_view(&bytes, json::buffer::Target::ArrayBuffer);
        self.push_accessor(
            view,
            values.len(),
            json::accessor::ComponentType::F32,
            type_,
            min,
            max,
        )
    }

    /// Append u16 triangle indices; returns the accessor index.
    pub fn push_indices(&mut self, indices: &[u16]) -> u32 {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_view(&bytes, json::buffer::Target::ElementArrayBuffer);
        self.push_accessor(
            view,
            indices.len(),
            json::accessor::ComponentType::U16,
            json::accessor::Type::Scalar,
            None,
            None,
        )
    }

    fn push_view(&mut self, bytes: &[u8], target: json::buffer::Target) -> u32 {
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        while !self.data.len().is_multiple_of(4) {
            self.data.push(0);
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        });
        self.views.len() as u32 - 1
    }

    fn push_accessor(
        &mut self,
        view: u32,
        count: usize,
        component: json::accessor::ComponentType,
        type_: json::accessor::Type,
        min: Option<json::Value>,
        max: Option<json::Value>,
    ) -> u32 {
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(view)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        self.accessors.len() as u32 - 1
    }
}

fn bounds<const N: usize>(values: &[[f32; N]]) -> ([f32; N], [f32; N]) {
    let mut min = [f32::MAX; N];
    let mut max = [f32::MIN; N];
    for v in values {
        for i in 0..N {
            min[i] = min[i].min(v[i]);
            max[i] = max[i].max(v[i]);
        }
    }
    (min, max)
}

fn to_value(values: &[f32]) -> json::Value {
    json::Value::Array(values.iter().copied().map(json::Value::from).collect())
}
