use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use smallvec::SmallVec;

use bmesh::mesh::{Duplicates, FaceKey, Mesh, VertexKey};
use bmesh::prelude::*;

const DEPTH: usize = 8;
const WIDTH: usize = 32;

fn quad() -> (Mesh, FaceKey) {
    let mut mesh = Mesh::new();
    let vertices = [
        mesh.make_vertex([1.0, 0.0, -1.0]),
        mesh.make_vertex([-1.0, 0.0, -1.0]),
        mesh.make_vertex([-1.0, 0.0, 1.0]),
        mesh.make_vertex([1.0, 0.0, 1.0]),
    ];
    let face = mesh
        .make_face_from_vertices(&vertices, Duplicates::Reject)
        .unwrap();
    (mesh, face)
}

// Replace the face with a polygon formed from the midpoints of its edges and
// return that polygon.
fn ambo(mesh: &mut Mesh, face: FaceKey) -> FaceKey {
    let corners: SmallVec<[_; 8]> = mesh
        .face(face)
        .unwrap()
        .loops()
        .map(|lp| {
            let lp = mesh.face_loop(lp).unwrap();
            (lp.vertex(), lp.edge())
        })
        .collect();
    let splits: SmallVec<[VertexKey; 8]> = corners
        .into_iter()
        .map(|(vertex, edge)| mesh.split_edge(edge, vertex, 0.5).0)
        .collect();
    let mut face = face;
    for (a, b) in splits.into_iter().perimeter() {
        face = mesh.split_face(face, a, b).0;
    }
    face
}

fn subdivide((mut mesh, mut face): (Mesh, FaceKey)) -> Mesh {
    for _ in 0..DEPTH {
        face = ambo(&mut mesh, face);
    }
    mesh
}

fn grid() -> Mesh {
    let mut mesh = Mesh::with_capacity(
        (WIDTH + 1) * (WIDTH + 1),
        2 * WIDTH * (WIDTH + 1),
        4 * WIDTH * WIDTH,
        WIDTH * WIDTH,
    );
    let vertices: Vec<Vec<_>> = (0..=WIDTH)
        .map(|y| {
            (0..=WIDTH)
                .map(|x| mesh.make_vertex([x as f64, y as f64, 0.0]))
                .collect()
        })
        .collect();
    for y in 0..WIDTH {
        for x in 0..WIDTH {
            mesh.make_face_from_vertices(
                &[
                    vertices[y][x],
                    vertices[y][x + 1],
                    vertices[y + 1][x + 1],
                    vertices[y + 1][x],
                ],
                Duplicates::Reject,
            )
            .unwrap();
        }
    }
    mesh
}

fn dissolve(mut mesh: Mesh) -> Mesh {
    let interior: Vec<_> = mesh
        .vertices()
        .filter(|vertex| !vertex.is_boundary())
        .map(|vertex| vertex.key())
        .collect();
    for vertex in interior.into_iter().step_by(2) {
        let _ = mesh.dissolve_vertex(vertex);
    }
    mesh
}

fn benchmark(criterion: &mut Criterion) {
    criterion.bench_function("subdivide", move |bencher| {
        bencher.iter_batched(quad, subdivide, BatchSize::SmallInput)
    });
    criterion.bench_function("grid", move |bencher| bencher.iter(grid));
    criterion.bench_function("dissolve", move |bencher| {
        bencher.iter_batched(grid, dissolve, BatchSize::LargeInput)
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
