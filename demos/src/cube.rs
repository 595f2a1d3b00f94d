//! A 20 unit cube as six quads of four corners each.

use crate::textured::QUAD_INDICES;

const S: f32 = 10.0;

/// Faces in the order -Z, +Z, -X, +X, -Y, +Y.
pub const FACES: [[[f32; 3]; 4]; 6] = [
    [[-S, -S, -S], [S, -S, -S], [S, S, -S], [-S, S, -S]],
    [[-S, -S, S], [S, -S, S], [S, S, S], [-S, S, S]],
    [[-S, -S, -S], [-S, S, -S], [-S, S, S], [-S, -S, S]],
    [[S, -S, -S], [S, S, -S], [S, S, S], [S, -S, S]],
    [[-S, -S, -S], [-S, -S, S], [S, -S, S], [S, -S, -S]],
    [[-S, S, -S], [-S, S, S], [S, S, S], [S, S, -S]],
];

/// Corners of every face, one vertex each, built by `vertex`.
pub fn vertices<V>(mut vertex: impl FnMut(usize, [f32; 3]) -> V) -> Vec<V> {
    FACES
        .iter()
        .enumerate()
        .flat_map(|(face, corners)| corners.map(|corner| (face, corner)))
        .map(|(face, corner)| vertex(face, corner))
        .collect()
}

/// Two triangles per face of [`vertices`].
pub fn indices() -> Vec<u16> {
    (0..FACES.len() as u16)
        .flat_map(|face| QUAD_INDICES.map(|i| face * 4 + i))
        .collect()
}
