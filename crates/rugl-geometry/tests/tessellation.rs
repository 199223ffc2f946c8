use std::collections::{HashMap, HashSet};

use glam::Vec2;
use rugl_core::math::signed_area;
use rugl_geometry::*;
use rugl_render::{Color, Renderer, RendererDescriptor, State};
use rugl_test_utils::RecordingBackend;

/// Turns left, right, right, then left again at 45 degrees.
const ZIGZAG: [(f32, f32); 6] = [
    (0.0, 0.0),
    (10.0, 0.0),
    (10.0, 10.0),
    (20.0, 10.0),
    (20.0, 0.0),
    (30.0, -10.0),
];

const SQUARE: [(f32, f32); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

/// Turns back almost onto itself, twice.
const HAIRPIN: [(f32, f32); 4] = [(0.0, 0.0), (10.0, 0.0), (0.0, 1.0), (10.0, 2.0)];

fn line_through(line: Line, points: &[(f32, f32)]) -> Line {
    let mut line = line;
    for &(x, y) in points {
        line.add_point(Vec2::new(x, y));
    }
    line
}

fn joins() -> Vec<LineJoin> {
    vec![
        LineJoin::None,
        LineJoin::Bevel(BevelJoin),
        LineJoin::Round(RoundDecoration::new(0.25)),
        LineJoin::Miter(MiterDecoration::default()),
        LineJoin::Miter(MiterDecoration::new(1.1, 2.0)),
    ]
}

fn caps() -> Vec<LineCap> {
    vec![
        LineCap::None,
        LineCap::Square(SquareCap),
        LineCap::Round(RoundDecoration::new(0.25)),
        LineCap::Miter(MiterDecoration::default()),
        LineCap::Miter(MiterDecoration::new(1.5, 3.0)),
    ]
}

fn assert_counter_clockwise(shape: &Shape, what: &str) {
    for [a, b, c] in shape.triangle_indices() {
        let area = signed_area(
            shape.vertex(a as usize).truncate(),
            shape.vertex(b as usize).truncate(),
            shape.vertex(c as usize).truncate(),
        );
        assert!(
            area > 0.0,
            "{what}: triangle ({a}, {b}, {c}) has signed area {area}"
        );
    }
}

/// Count how often each undirected edge is used.
fn edge_uses(shape: &Shape) -> HashMap<(u32, u32), usize> {
    let mut uses = HashMap::new();
    for [a, b, c] in shape.triangle_indices() {
        for (from, to) in [(a, b), (b, c), (c, a)] {
            *uses.entry((from.min(to), from.max(to))).or_insert(0) += 1;
        }
    }
    uses
}

#[test]
fn test_open_line_counts() {
    for n in 2..=ZIGZAG.len() {
        let mut line = line_through(Line::new(2.0), &ZIGZAG[..n]);
        let shape = line.build_line(0.0).unwrap();
        assert_eq!(shape.vertex_count(), 2 * n, "{n} points");
        assert_eq!(shape.triangle_count(), 2 * (n - 1), "{n} points");
    }
}

#[test]
fn test_loop_counts() {
    let mut line = line_through(Line::new(1.0), &SQUARE);
    let shape = line.build_loop(0.0).unwrap();
    assert!(shape.vertex_count() >= 8);
    assert_eq!(shape.triangles().len() % 3, 0);
    assert_eq!(shape.vertex_count(), 8);

    // One more quad than the same points left open.
    let mut open = line_through(Line::new(1.0), &SQUARE);
    let open = open.build_line(0.0).unwrap();
    assert_eq!(shape.triangle_count(), open.triangle_count() + 2);
}

#[test]
fn test_every_decoration_winds_counter_clockwise() {
    for join in joins() {
        for cap in caps() {
            let what = format!("{join:?} / {cap:?}");
            let mut line = line_through(Line::new(2.0).with_join(join).with_cap(cap), &ZIGZAG);
            let shape = line.build_line(0.0).unwrap();
            assert_counter_clockwise(&shape, &what);

            // Same path walked backwards swaps every turn direction.
            let reversed: Vec<_> = ZIGZAG.iter().rev().copied().collect();
            let mut line =
                line_through(Line::new(2.0).with_join(join).with_cap(cap), &reversed);
            let shape = line.build_line(0.0).unwrap();
            assert_counter_clockwise(&shape, &what);

            let mut line = line_through(Line::new(2.0).with_join(join).with_cap(cap), &ZIGZAG);
            let shape = line.build_segment_shape(0.0).unwrap();
            assert_counter_clockwise(&shape, &what);
        }
    }
}

#[test]
fn test_hairpins_wind_counter_clockwise() {
    let reversed: Vec<_> = HAIRPIN.iter().rev().copied().collect();
    for join in joins() {
        for cap in caps() {
            for n in 3..=HAIRPIN.len() {
                for points in [&HAIRPIN[..n], &reversed[..n]] {
                    let what = format!("{join:?} / {cap:?} through {points:?}");
                    let mut line =
                        line_through(Line::new(2.0).with_join(join).with_cap(cap), points);
                    let shape = line.build_line(0.0).unwrap();
                    assert_counter_clockwise(&shape, &what);
                }
            }
        }
    }
}

#[test]
fn test_short_segment_loops_wind_counter_clockwise() {
    let sliver = vec![(0.0, 0.0), (10.0, 0.0), (0.0, 1.0)];
    // Only the corner at the start of the short side is too sharp.
    let kite = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 1.0), (0.0, 6.0)];

    for join in joins() {
        for points in [sliver.clone(), kite.clone()] {
            let clockwise: Vec<_> = points.iter().rev().copied().collect();
            for points in [points, clockwise] {
                let what = format!("{join:?} around {points:?}");
                let mut line = line_through(Line::new(1.5).with_join(join), &points);
                let shape = line.build_loop(0.0).unwrap();
                assert_counter_clockwise(&shape, &what);
            }
        }
    }
}

#[test]
fn test_hairpin_without_join_stays_near_the_path() {
    let mut line = line_through(Line::new(2.0), &HAIRPIN[..3]);
    let shape = line.build_line(0.0).unwrap();
    let bounds = shape.bounds();
    assert!(bounds.max().x < 11.0, "{bounds:?}");
    assert!(bounds.min().x > -1.0, "{bounds:?}");
}

#[test]
fn test_loops_wind_counter_clockwise_both_ways() {
    let octagon: Vec<_> = (0..8)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::FRAC_PI_4;
            (angle.cos() * 10.0, angle.sin() * 10.0)
        })
        .collect();
    let clockwise: Vec<_> = octagon.iter().rev().copied().collect();

    for join in joins() {
        for points in [&octagon, &clockwise] {
            let mut line = line_through(Line::new(1.0).with_join(join), points);
            let shape = line.build_loop(0.0).unwrap();
            assert_counter_clockwise(&shape, &format!("{join:?}"));
        }
    }
}

#[test]
fn test_duplicate_points_are_ignored() {
    let mut line = Line::new(1.0);
    line.add_point(Vec2::new(3.0, 4.0));
    line.add_point(Vec2::new(3.0, 4.0));
    assert_eq!(line.point_count(), 1);
    line.add_point(Vec2::new(5.0, 4.0));
    line.add_point(Vec2::new(5.0, 4.0));
    assert_eq!(line.point_count(), 2);
}

#[test]
fn test_colinear_points_collapse() {
    let line = line_through(Line::new(1.0), &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
    assert_eq!(line.point_count(), 2);
    assert_eq!(line.points()[1], Vec2::new(2.0, 2.0));
}

#[test]
fn test_loop_is_edge_manifold() {
    let mut line = line_through(Line::new(1.0), &SQUARE);
    let shape = line.build_loop(0.0).unwrap();
    let uses = edge_uses(&shape);

    assert!(uses.values().all(|&n| n <= 2));
    // The inner and outer rings are the only boundary.
    let boundary = uses.values().filter(|&&n| n == 1).count();
    assert_eq!(boundary, 2 * SQUARE.len());

    // Adjacent triangles traverse their shared edge in opposite directions.
    let mut directed = HashSet::new();
    for [a, b, c] in shape.triangle_indices() {
        for edge in [(a, b), (b, c), (c, a)] {
            assert!(directed.insert(edge), "edge {edge:?} repeated");
        }
    }
}

#[test]
fn test_closing_point_is_ignored() {
    let mut closed: Vec<_> = SQUARE.to_vec();
    closed.push(SQUARE[0]);
    let mut line = line_through(Line::new(1.0), &closed);
    let shape = line.build_loop(0.0).unwrap();
    assert_eq!(shape.vertex_count(), 8);
    assert_eq!(shape.triangle_count(), 8);
}

#[test]
fn test_loop_needs_two_points() {
    let mut line = line_through(Line::new(1.0), &[(1.0, 1.0)]);
    assert!(line.build_loop(0.0).is_none());
    assert_eq!(line.point_count(), 0);
}

#[test]
fn test_building_clears_points() {
    let mut line = line_through(Line::new(1.0), &ZIGZAG);
    line.build_line(0.0).unwrap();
    assert_eq!(line.point_count(), 0);

    // The builder can be reused straight away.
    let mut line = line_through(line, &SQUARE);
    assert_eq!(line.point_count(), 4);
    line.build_loop(0.0).unwrap();
    assert_eq!(line.point_count(), 0);

    let mut line = line_through(line, &SQUARE);
    line.build_segment_shape(0.0).unwrap();
    assert_eq!(line.point_count(), 0);
}

#[test]
fn test_segment_shape_counts() {
    let mut line = line_through(
        Line::new(1.0).with_cap(LineCap::Square(SquareCap)),
        &ZIGZAG,
    );
    let shape = line.build_segment_shape(0.0).unwrap();
    let segments = ZIGZAG.len() - 1;
    // Each segment: a quad and two square caps.
    assert_eq!(shape.vertex_count(), segments * 8);
    assert_eq!(shape.triangle_count(), segments * 6);
}

#[test]
fn test_bevel_join_adds_two_vertices_and_three_triangles() {
    let mut plain = line_through(Line::new(2.0), &ZIGZAG[..3]);
    let plain = plain.build_line(0.0).unwrap();

    let mut bevelled = line_through(
        Line::new(2.0).with_join(LineJoin::Bevel(BevelJoin)),
        &ZIGZAG[..3],
    );
    let bevelled = bevelled.build_line(0.0).unwrap();

    // A join corner has an outer vertex per segment instead of a shared one.
    assert_eq!(bevelled.vertex_count(), plain.vertex_count() + 1 + 2);
    assert_eq!(bevelled.triangle_count(), plain.triangle_count() + 3);
}

#[test]
fn test_line_renders_through_renderer() {
    let backend = RecordingBackend::new();
    let mut renderer = Renderer::new(backend.clone(), RendererDescriptor::default());

    let mut line = line_through(Line::new(2.0), &ZIGZAG);
    let shape = line.build_line(0.5).unwrap().coloured(Color::RED, State::new());
    shape.render(&mut renderer).unwrap();
    shapes::rectangle(0.0, 0.0, 1.0, 1.0, 0.5)
        .coloured(Color::RED, State::new())
        .render(&mut renderer)
        .unwrap();

    assert_eq!(renderer.count_vertices(), 2 * ZIGZAG.len() + 4);
    let stats = renderer.render();
    assert_eq!(stats.triangles, 2 * (ZIGZAG.len() - 1) + 2);
    assert_eq!(backend.count_draws(), 1);
    assert!(
        backend
            .last_colours()
            .iter()
            .all(|&c| c == Color::RED.to_packed())
    );
}
