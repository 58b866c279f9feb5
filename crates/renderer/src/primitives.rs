//! Built-in geometry.

use crate::mesh::Vertex;

const fn v(p: [f32; 3], n: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex::new(p, n, uv)
}

/// Unit cube centred on the origin: 36 vertices, two triangles per face,
/// drawn without an index buffer.
#[rustfmt::skip]
pub fn cube_vertices() -> Vec<Vertex> {
    const BACK: [f32; 3] = [0.0, 0.0, -1.0];
    const FRONT: [f32; 3] = [0.0, 0.0, 1.0];
    const LEFT: [f32; 3] = [-1.0, 0.0, 0.0];
    const RIGHT: [f32; 3] = [1.0, 0.0, 0.0];
    const DOWN: [f32; 3] = [0.0, -1.0, 0.0];
    const UP: [f32; 3] = [0.0, 1.0, 0.0];

    vec![
        v([-0.5, -0.5, -0.5], BACK, [0.0, 0.0]),
        v([ 0.5, -0.5, -0.5], BACK, [1.0, 0.0]),
        v([ 0.5,  0.5, -0.5], BACK, [1.0, 1.0]),
        v([ 0.5,  0.5, -0.5], BACK, [1.0, 1.0]),
        v([-0.5,  0.5, -0.5], BACK, [0.0, 1.0]),
        v([-0.5, -0.5, -0.5], BACK, [0.0, 0.0]),

        v([-0.5, -0.5,  0.5], FRONT, [0.0, 0.0]),
        v([ 0.5, -0.5,  0.5], FRONT, [1.0, 0.0]),
        v([ 0.5,  0.5,  0.5], FRONT, [1.0, 1.0]),
        v([ 0.5,  0.5,  0.5], FRONT, [1.0, 1.0]),
        v([-0.5,  0.5,  0.5], FRONT, [0.0, 1.0]),
        v([-0.5, -0.5,  0.5], FRONT, [0.0, 0.0]),

        v([-0.5,  0.5,  0.5], LEFT, [1.0, 0.0]),
        v([-0.5,  0.5, -0.5], LEFT, [1.0, 1.0]),
        v([-0.5, -0.5, -0.5], LEFT, [0.0, 1.0]),
        v([-0.5, -0.5, -0.5], LEFT, [0.0, 1.0]),
        v([-0.5, -0.5,  0.5], LEFT, [0.0, 0.0]),
        v([-0.5,  0.5,  0.5], LEFT, [1.0, 0.0]),

        v([ 0.5,  0.5,  0.5], RIGHT, [1.0, 0.0]),
        v([ 0.5,  0.5, -0.5], RIGHT, [1.0, 1.0]),
        v([ 0.5, -0.5, -0.5], RIGHT, [0.0, 1.0]),
        v([ 0.5, -0.5, -0.5], RIGHT, [0.0, 1.0]),
        v([ 0.5, -0.5,  0.5], RIGHT, [0.0, 0.0]),
        v([ 0.5,  0.5,  0.5], RIGHT, [1.0, 0.0]),

        v([-0.5, -0.5, -0.5], DOWN, [0.0, 1.0]),
        v([ 0.5, -0.5, -0.5], DOWN, [1.0, 1.0]),
        v([ 0.5, -0.5,  0.5], DOWN, [1.0, 0.0]),
        v([ 0.5, -0.5,  0.5], DOWN, [1.0, 0.0]),
        v([-0.5, -0.5,  0.5], DOWN, [0.0, 0.0]),
        v([-0.5, -0.5, -0.5], DOWN, [0.0, 1.0]),

        v([-0.5,  0.5, -0.5], UP, [0.0, 1.0]),
        v([ 0.5,  0.5, -0.5], UP, [1.0, 1.0]),
        v([ 0.5,  0.5,  0.5], UP, [1.0, 0.0]),
        v([ 0.5,  0.5,  0.5], UP, [1.0, 0.0]),
        v([-0.5,  0.5,  0.5], UP, [0.0, 0.0]),
        v([-0.5,  0.5, -0.5], UP, [0.0, 1.0]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_36_vertices_on_the_unit_box() {
        let cube = cube_vertices();
        assert_eq!(cube.len(), 36);
        for vert in &cube {
            assert!(vert.position.iter().all(|c| c.abs() == 0.5));
            let n = vert.normal;
            assert_eq!(n[0].abs() + n[1].abs() + n[2].abs(), 1.0);
        }
    }

    #[test]
    fn normals_point_out_of_their_face() {
        for vert in cube_vertices() {
            let dot: f32 = (0..3).map(|i| vert.position[i] * vert.normal[i]).sum();
            assert_eq!(dot, 0.5);
        }
    }
}
