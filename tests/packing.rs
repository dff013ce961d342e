//! Buffer-packer properties: sizing, region layout, born-data round trip,
//! and global index validity.

mod common;

use common::{init_logging, texture};
use mesh_batch::{Mesh, SubMesh};

fn triangle(scale: f32) -> SubMesh {
    SubMesh::new(
        vec![0.0, 0.0, 0.0, scale, 0.0, 0.0, 0.0, scale, 0.0],
        vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        vec![0, 1, 2],
    )
}

fn build_mixed_mesh() -> Mesh {
    let mut mesh = Mesh::new(texture());
    mesh.add_quad(2.0, 2.0); // 4 vertices, 6 indices
    mesh.add_child(triangle(1.0)); // 3 vertices, 3 indices
    mesh.add_quad(4.0, 6.0); // 4 vertices, 6 indices
    mesh.generate_buffer();
    mesh
}

#[test]
fn vertex_buffer_length_is_the_sum_of_all_region_lengths() {
    init_logging();
    let mesh = build_mixed_mesh();

    // 11 vertices: positions 33, uvs 22, opacity 11, rgb 33.
    assert_eq!(mesh.vertex_count(), 11);
    assert_eq!(mesh.vertex_data().len(), 33 + 22 + 11 + 33);
    assert_eq!(mesh.index_data().len(), 6 + 3 + 6);
}

#[test]
fn region_offsets_are_strictly_increasing_and_non_overlapping() {
    let mesh = build_mixed_mesh();
    let offsets = mesh.region_offsets();

    assert_eq!(offsets.position, 0);
    assert_eq!(offsets.uv, 33);
    assert_eq!(offsets.opacity, 33 + 22);
    assert_eq!(offsets.rgb, 33 + 22 + 11);
    assert_eq!(offsets.rgb + 33, mesh.vertex_data().len());
}

#[test]
fn child_offsets_record_running_totals_at_insertion() {
    let mesh = build_mixed_mesh();

    assert_eq!(mesh.child(0).position_offset(), 0);
    assert_eq!(mesh.child(1).position_offset(), 12);
    assert_eq!(mesh.child(2).position_offset(), 12 + 9);

    assert_eq!(mesh.child(0).uv_offset(), 0);
    assert_eq!(mesh.child(1).uv_offset(), 8);
    assert_eq!(mesh.child(2).uv_offset(), 8 + 6);

    assert_eq!(mesh.child(0).index_offset(), 0);
    assert_eq!(mesh.child(1).index_offset(), 6);
    assert_eq!(mesh.child(2).index_offset(), 9);
}

#[test]
fn born_position_and_uv_data_round_trip_into_the_packed_regions() {
    let mesh = build_mixed_mesh();
    let offsets = mesh.region_offsets();

    for child in mesh.children() {
        let pos_start = offsets.position + child.position_offset();
        assert_eq!(
            &mesh.vertex_data()[pos_start..pos_start + child.born_positions().len()],
            child.born_positions()
        );

        let uv_start = offsets.uv + child.uv_offset();
        assert_eq!(
            &mesh.vertex_data()[uv_start..uv_start + child.born_uvs().len()],
            child.born_uvs()
        );
    }
}

#[test]
fn every_packed_index_is_a_valid_global_vertex_index() {
    let mesh = build_mixed_mesh();

    for (slot, child) in mesh.children().iter().enumerate() {
        let start = child.index_offset();
        let span = &mesh.index_data()[start..start + child.index_len()];
        assert_eq!(span, child.indices(), "child {} span mismatch", slot);
        for &index in span {
            assert!(
                (index as usize) < mesh.vertex_count(),
                "index {} outside 0..{}",
                index,
                mesh.vertex_count()
            );
        }
    }

    // Children occupy disjoint vertex ranges in insertion order.
    assert_eq!(mesh.child(1).indices(), &[4, 5, 6]);
    assert!(mesh.child(2).indices().iter().all(|&i| i >= 7));
}

#[test]
fn texture_quad_spans_the_full_texture_in_pixels() {
    let mut mesh = Mesh::new(texture()); // 128 x 64 pixels
    let slot = mesh.add_texture_quad();
    mesh.generate_buffer();

    let child = mesh.child(slot);
    assert_eq!(child.vertex_count(), 4);
    let xs: Vec<f32> = child.born_positions().chunks_exact(3).map(|p| p[0]).collect();
    let ys: Vec<f32> = child.born_positions().chunks_exact(3).map(|p| p[1]).collect();
    assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 64.0);
    assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -64.0);
    assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 32.0);
    assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), -32.0);
}

#[test]
fn regeneration_repeats_the_copy_from_accumulated_offsets() {
    let mut mesh = build_mixed_mesh();
    let before = mesh.vertex_data().to_vec();
    let indices_before = mesh.index_data().to_vec();

    mesh.generate_buffer();
    assert_eq!(mesh.vertex_data(), &before[..]);
    assert_eq!(mesh.index_data(), &indices_before[..]);
}
