// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Size, Vec2};
use understory_dnd::config::{DragConfig, SortConfig};
use understory_dnd::input::PointerEvent;
use understory_dnd::sortable::{CachedItem, Flow, relocate};
use understory_dnd::{DragDrop, SessionId};
use understory_scene::{ElementId, Layout, Scene};

const ROW: f64 = 40.0;

struct List {
    scene: Scene,
    dnd: DragDrop<ElementId>,
    rows: Vec<ElementId>,
    items: Vec<SessionId>,
}

fn build_list(n: usize) -> List {
    let mut scene = Scene::new(Size::new(400.0, ROW * n as f64));
    let mut dnd = DragDrop::new();
    let list = scene.insert_element(None, "ul", Layout::stack_vertical(0.0));
    let container = dnd
        .attach_sortable(&scene, list, SortConfig::default())
        .unwrap();
    let rows: Vec<_> = (0..n)
        .map(|_| scene.insert_sized(Some(list), "li", Size::new(200.0, ROW)))
        .collect();
    let items: Vec<_> = rows
        .iter()
        .map(|row| dnd.attach_drag(&mut scene, *row, DragConfig::default()).unwrap())
        .collect();
    dnd.set_items(container, items.clone()).unwrap();
    List {
        scene,
        dnd,
        rows,
        items,
    }
}

/// Pointer samples sweeping from the first row to the last in 10px steps.
fn sweep(n: usize) -> Vec<PointerEvent<ElementId>> {
    let steps = (ROW * n as f64 / 10.0) as usize;
    (0..steps)
        .map(|i| {
            let y = ROW / 2.0 + 10.0 * i as f64;
            PointerEvent::mouse(Point::new(20.0, y), None, Duration::from_millis(i as u64))
        })
        .collect()
}

fn bench_drag_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag_sort");
    for &n in &[16_usize, 128, 512] {
        let path = sweep(n);
        group.throughput(Throughput::Elements(path.len() as u64));
        group.bench_function(format!("sweep_first_to_last/n={n}"), |b| {
            b.iter_batched(
                || build_list(n),
                |List {
                     mut scene,
                     mut dnd,
                     rows,
                     ..
                 }| {
                    let mut down = path[0];
                    down.target = Some(rows[0]);
                    let mut count = dnd.pointer_down(&mut scene, &down).len();
                    for ev in &path[1..] {
                        count += dnd.pointer_move(&mut scene, ev).len();
                    }
                    count += dnd.pointer_up(&mut scene, &path[path.len() - 1]).len();
                    black_box(count);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn column(n: usize) -> Vec<CachedItem<ElementId>> {
    let list = build_list(n);
    list.rows
        .iter()
        .zip(&list.items)
        .enumerate()
        .map(|(i, (element, item))| {
            let y = ROW * i as f64;
            CachedItem {
                item: *item,
                element: *element,
                rect: Rect::new(0.0, y, 200.0, y + ROW),
                offset: Vec2::ZERO,
            }
        })
        .collect()
}

fn bench_relocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("relocate");
    for &n in &[16_usize, 128, 1024] {
        let positions = column(n);
        group.bench_function(format!("first_to_last/n={n}"), |b| {
            b.iter_batched(
                || positions.clone(),
                |mut positions| {
                    relocate(&mut positions, 0, n - 1, Flow::Vertical);
                    black_box(positions);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_drag_sort, bench_relocate);
criterion_main!(benches);
