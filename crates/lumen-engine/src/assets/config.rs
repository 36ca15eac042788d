/// What to do with a primitive that fails validation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PrimitivePolicy {
    /// Fail the whole load; the current scene stays.
    #[default]
    Reject,
    /// Drop the primitive with a warning and keep the rest.
    ///
    /// Only malformed or unsupported content is skipped. I/O and GPU
    /// allocation failures still abort.
    SkipAndWarn,
}

/// How to fill normals for primitives that have none.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum NormalPolicy {
    /// Area-weighted vertex normals from counter-clockwise triangle winding.
    /// Points and lines get zero.
    #[default]
    Generate,
    /// Always the zero vector.
    Zero,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub primitive_policy: PrimitivePolicy,
    pub normal_policy: NormalPolicy,
    /// Bake each mesh's node transform into `Mesh::transform`.
    pub flatten_node_transforms: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            primitive_policy: PrimitivePolicy::Reject,
            normal_policy: NormalPolicy::Generate,
            flatten_node_transforms: true,
        }
    }
}
