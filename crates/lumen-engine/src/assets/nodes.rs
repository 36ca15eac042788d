use crate::math::Float4x4;

/// World transform per glTF mesh index.
///
/// Each mesh takes the transform of the first node (depth-first, in scene
/// order) that instances it in the default scene, or the first scene when no
/// default is set. Meshes no node references get identity.
pub(crate) fn mesh_transforms(document: &gltf::Document) -> Vec<Float4x4> {
    let mut out: Vec<Option<Float4x4>> = vec![None; document.meshes().len()];
    let mut visited = vec![false; document.nodes().len()];

    let scene = document.default_scene().or_else(|| document.scenes().next());
    let Some(scene) = scene else {
        return vec![Float4x4::IDENTITY; out.len()];
    };

    let mut stack: Vec<(gltf::Node<'_>, Float4x4)> = scene
        .nodes()
        .map(|n| (n, Float4x4::IDENTITY))
        .collect();
    stack.reverse();

    while let Some((node, parent)) = stack.pop() {
        // Guard against cyclic node graphs in hand-written files.
        if std::mem::replace(&mut visited[node.index()], true) {
            continue;
        }

        let world = parent * Float4x4::from_cols_array_2d(&node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            if let Some(slot) = out.get_mut(mesh.index()) {
                slot.get_or_insert(world);
            }
        }

        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push((child, world));
        }
    }

    out.into_iter()
        .map(|t| t.unwrap_or(Float4x4::IDENTITY))
        .collect()
}
