// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop zone scenarios over a laid-out scene.

use core::time::Duration;

use kurbo::{Point, Rect, Size, Vec2};
use understory_dnd::config::{Axis, DragConfig, DropZoneConfig, RevertPolicy, Tolerance};
use understory_dnd::event::{Event, SessionEvent, ZoneEvent};
use understory_dnd::host::{GlobalListeners, Host, InputKind};
use understory_dnd::input::{MouseButton, PointerEvent};
use understory_dnd::session::DragSession;
use understory_dnd::zone::{Accept, DropZone, ZoneState};
use understory_dnd::{DragDrop, SessionId, ZoneId};
use understory_scene::{ElementId, Scene};

fn at(x: f64, y: f64, target: Option<ElementId>) -> PointerEvent<ElementId> {
    PointerEvent::mouse(Point::new(x, y), target, Duration::ZERO)
}

fn zone_events(events: &[Event<ElementId>]) -> Vec<ZoneEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Zone(z) => Some(*z),
            _ => None,
        })
        .collect()
}

fn claimed(events: &[Event<ElementId>], session: SessionId) -> Vec<ZoneId> {
    events
        .iter()
        .filter_map(|e| match e.session_event(session) {
            Some(SessionEvent::Dropped { zone }) => Some(*zone),
            _ => None,
        })
        .collect()
}

struct Board {
    scene: Scene,
    dnd: DragDrop<ElementId>,
    card: ElementId,
    session: SessionId,
}

fn board(config: DragConfig) -> Board {
    let mut scene = Scene::new(Size::new(800.0, 600.0));
    let mut dnd = DragDrop::new();
    let card = scene.insert_at(None, "div", Rect::new(400.0, 0.0, 450.0, 50.0));
    let session = dnd.attach_drag(&mut scene, card, config).unwrap();
    Board {
        scene,
        dnd,
        card,
        session,
    }
}

impl Board {
    fn zone(
        &mut self,
        parent: Option<ElementId>,
        rect: Rect,
        config: DropZoneConfig,
    ) -> (ElementId, ZoneId) {
        let element = self.scene.insert_at(parent, "section", rect);
        let zone = self
            .dnd
            .attach_drop_zone(&self.scene, element, config, Accept::Any)
            .unwrap();
        (element, zone)
    }

    /// Pick the card up at its (10, 10) and drop it with the pointer at `to`.
    fn drop_at(&mut self, to: Point) -> Vec<Event<ElementId>> {
        let mut events = self
            .dnd
            .pointer_down(&mut self.scene, &at(410.0, 10.0, Some(self.card)));
        events.extend(self.dnd.pointer_move(&mut self.scene, &at(to.x, to.y, None)));
        events.extend(self.dnd.pointer_up(&mut self.scene, &at(to.x, to.y, None)));
        events
    }
}

fn pointer_zone() -> DropZoneConfig {
    DropZoneConfig {
        tolerance: Tolerance::Pointer,
        ..Default::default()
    }
}

#[test]
fn greedy_inner_zone_shadows_outer() {
    let mut b = board(DragConfig::default());
    let (outer_el, outer) = b.zone(None, Rect::new(0.0, 0.0, 300.0, 300.0), pointer_zone());
    let (_, inner) = b.zone(
        Some(outer_el),
        Rect::new(50.0, 50.0, 150.0, 150.0),
        DropZoneConfig {
            greedy: true,
            ..pointer_zone()
        },
    );

    let events = b.drop_at(Point::new(100.0, 100.0));
    assert_eq!(claimed(&events, b.session), vec![inner]);
    let zones = zone_events(&events);
    assert!(zones.contains(&ZoneEvent::Entered {
        zone: outer,
        session: b.session
    }));
    assert!(zones.contains(&ZoneEvent::Dropped {
        zone: inner,
        session: b.session
    }));
    assert!(!zones.contains(&ZoneEvent::Dropped {
        zone: outer,
        session: b.session
    }));

    // Without greed both zones take the drop.
    b.dnd.zone_mut(inner).unwrap().set_greedy(false);
    let events = b.drop_at(Point::new(100.0, 100.0));
    assert_eq!(claimed(&events, b.session), vec![outer, inner]);

    // Outside the inner zone only the outer one is entered.
    b.dnd.zone_mut(inner).unwrap().set_greedy(true);
    let events = b.drop_at(Point::new(250.0, 250.0));
    assert_eq!(claimed(&events, b.session), vec![outer]);
}

#[test]
fn tolerance_modes() {
    // Card is 50x50 and picked up at (10, 10).
    let cases = [
        (Tolerance::Pointer, Point::new(105.0, 105.0), false),
        (Tolerance::Pointer, Point::new(95.0, 95.0), true),
        (Tolerance::Fit, Point::new(95.0, 95.0), false),
        (Tolerance::Fit, Point::new(60.0, 60.0), true),
        (Tolerance::Intersect, Point::new(70.0, 70.0), true),
        (Tolerance::Intersect, Point::new(90.0, 90.0), false),
        (Tolerance::Touch, Point::new(105.0, 105.0), true),
        (Tolerance::Touch, Point::new(200.0, 200.0), false),
    ];
    for (tolerance, to, expected) in cases {
        let mut b = board(DragConfig::default());
        let (_, zone) = b.zone(
            None,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            DropZoneConfig {
                tolerance,
                ..Default::default()
            },
        );
        let events = b.drop_at(to);
        assert_eq!(
            claimed(&events, b.session) == vec![zone],
            expected,
            "{tolerance:?} at {to:?}"
        );
    }
}

#[test]
fn enter_and_exit_only_on_edges() {
    let mut b = board(DragConfig::default());
    let (_, zone) = b.zone(None, Rect::new(0.0, 0.0, 100.0, 100.0), pointer_zone());
    let s = b.session;
    b.dnd
        .pointer_down(&mut b.scene, &at(410.0, 10.0, Some(b.card)));
    let mut events = Vec::new();
    for x in [300.0, 90.0, 80.0, 70.0, 300.0, 290.0] {
        events.extend(b.dnd.pointer_move(&mut b.scene, &at(x, 50.0, None)));
    }
    assert_eq!(
        zone_events(&events),
        vec![
            ZoneEvent::Entered { zone, session: s },
            ZoneEvent::Exited { zone, session: s },
        ]
    );
    assert_eq!(b.dnd.zone(zone).unwrap().state(), ZoneState::Active);
    let events = b.dnd.pointer_up(&mut b.scene, &at(290.0, 50.0, None));
    assert!(claimed(&events, s).is_empty());
    assert_eq!(b.dnd.zone(zone).unwrap().state(), ZoneState::Inactive);
}

#[test]
fn invalid_drop_reverts_standalone_element() {
    let mut b = board(DragConfig {
        revert: RevertPolicy::OnInvalidDrop,
        ..Default::default()
    });
    b.zone(None, Rect::new(0.0, 0.0, 100.0, 100.0), pointer_zone());

    b.drop_at(Point::new(300.0, 300.0));
    assert_eq!(b.scene.translation(b.card), Vec2::ZERO);
    assert_eq!(b.scene.bounding_rect(b.card), Rect::new(400.0, 0.0, 450.0, 50.0));

    b.drop_at(Point::new(50.0, 50.0));
    assert_eq!(b.scene.translation(b.card), Vec2::new(-360.0, 40.0));

    // Offsets accumulate across drags.
    let mut events = b
        .dnd
        .pointer_down(&mut b.scene, &at(50.0, 50.0, Some(b.card)));
    events.extend(b.dnd.pointer_move(&mut b.scene, &at(60.0, 60.0, None)));
    events.extend(b.dnd.pointer_up(&mut b.scene, &at(60.0, 60.0, None)));
    assert_eq!(claimed(&events, b.session).len(), 1);
    assert_eq!(b.scene.translation(b.card), Vec2::new(-350.0, 50.0));
}

#[test]
fn scope_and_selector_acceptance() {
    let mut b = board(DragConfig {
        scope: "tasks".into(),
        ..Default::default()
    });
    b.scene.add_class(b.card, "task");
    let wrong_scope = b.zone(None, Rect::new(0.0, 0.0, 100.0, 100.0), pointer_zone()).1;
    let el = b.scene.insert_at(None, "aside", Rect::new(0.0, 0.0, 100.0, 100.0));
    let by_class = b
        .dnd
        .attach_drop_zone(
            &b.scene,
            el,
            DropZoneConfig {
                scope: "tasks".into(),
                tolerance: Tolerance::Pointer,
                ..Default::default()
            },
            ".task".into(),
        )
        .unwrap();
    let vetoed = b
        .dnd
        .attach_drop_zone(
            &b.scene,
            el,
            DropZoneConfig {
                scope: "tasks".into(),
                ..Default::default()
            },
            Accept::Predicate(Box::new(
                |session: &DragSession<ElementId>, _zone: &DropZone<ElementId>| {
                    session.config().lock_axis.is_some()
                },
            )),
        )
        .unwrap();

    let events = b.drop_at(Point::new(50.0, 50.0));
    assert_eq!(claimed(&events, b.session), vec![by_class]);
    let activated: Vec<_> = zone_events(&events)
        .into_iter()
        .filter_map(|e| match e {
            ZoneEvent::Activated { zone, .. } => Some(zone),
            _ => None,
        })
        .collect();
    assert_eq!(activated, vec![by_class]);
    assert_ne!(activated[0], wrong_scope);
    assert_ne!(activated[0], vetoed);
}

#[test]
fn selector_matches_grabbed_handle() {
    let mut b = board(DragConfig::default());
    let grip = b
        .scene
        .insert_at(Some(b.card), "span", Rect::new(0.0, 0.0, 20.0, 20.0));
    b.scene.add_class(grip, "grip");
    b.dnd
        .session_mut(b.session)
        .unwrap()
        .set_handles(&mut b.scene, vec![grip]);
    let el = b.scene.insert_at(None, "aside", Rect::new(0.0, 0.0, 100.0, 100.0));
    let zone = b
        .dnd
        .attach_drop_zone(&b.scene, el, pointer_zone(), ".grip".into())
        .unwrap();

    let mut events = b.dnd.pointer_down(&mut b.scene, &at(410.0, 10.0, Some(grip)));
    assert_eq!(b.dnd.session(b.session).unwrap().reference_element(), grip);
    assert!(zone_events(&events).contains(&ZoneEvent::Activated {
        zone,
        session: b.session
    }));
    events.extend(b.dnd.pointer_move(&mut b.scene, &at(50.0, 50.0, None)));
    events.extend(b.dnd.pointer_up(&mut b.scene, &at(50.0, 50.0, None)));
    assert_eq!(claimed(&events, b.session), vec![zone]);
}

#[test]
fn lock_axis_and_boundary() {
    let mut scene = Scene::new(Size::new(800.0, 600.0));
    let mut dnd = DragDrop::new();
    let frame = scene.insert_at(None, "main", Rect::new(0.0, 0.0, 300.0, 100.0));
    let card = scene.insert_at(Some(frame), "div", Rect::new(0.0, 0.0, 50.0, 50.0));
    let id = dnd
        .attach_drag(
            &mut scene,
            card,
            DragConfig {
                lock_axis: Some(Axis::X),
                boundary_selector: Some("main".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(dnd.session(id).unwrap().boundary(), Some(frame));

    dnd.pointer_down(&mut scene, &at(10.0, 10.0, Some(card)));
    dnd.pointer_move(&mut scene, &at(120.0, 80.0, None));
    assert_eq!(scene.translation(card), Vec2::new(110.0, 0.0));
    dnd.pointer_move(&mut scene, &at(900.0, 80.0, None));
    assert_eq!(scene.translation(card), Vec2::new(250.0, 0.0));
    dnd.pointer_up(&mut scene, &at(900.0, 80.0, None));
    assert_eq!(scene.bounding_rect(card), Rect::new(250.0, 0.0, 300.0, 50.0));
}

#[test]
fn scroll_offset_is_compensated() {
    let mut b = board(DragConfig::default());
    b.scene.set_scroll(Vec2::new(0.0, 100.0));
    b.dnd
        .pointer_down(&mut b.scene, &at(410.0, 110.0, Some(b.card)));
    b.dnd.pointer_move(&mut b.scene, &at(440.0, 140.0, None));
    assert_eq!(b.scene.translation(b.card), Vec2::new(30.0, 30.0));
}

#[test]
fn touch_drag_and_synthetic_mouse() {
    let mut b = board(DragConfig::default());
    let touch = |x: f64, y: f64, ms: u64, target: Option<ElementId>| {
        PointerEvent::touch(Point::new(x, y), target, Duration::from_millis(ms))
    };
    b.dnd
        .pointer_down(&mut b.scene, &touch(410.0, 10.0, 0, Some(b.card)));
    assert_eq!(b.scene.listen_input(), Some(InputKind::Touch));
    assert!(!b.scene.listeners().contains(GlobalListeners::WHEEL));
    assert!(b.dnd.prevents_default(GlobalListeners::TOUCH_MOVE));
    b.dnd.pointer_move(&mut b.scene, &touch(430.0, 10.0, 10, None));
    assert!(b.dnd.is_dragging(b.session));
    b.dnd.pointer_up(&mut b.scene, &touch(430.0, 10.0, 20, None));

    // The browser's compatibility mouse-down right after the touch is swallowed.
    let synthetic = PointerEvent::mouse(
        Point::new(430.0, 10.0),
        Some(b.card),
        Duration::from_millis(30),
    );
    let events = b.dnd.pointer_down(&mut b.scene, &synthetic);
    assert!(matches!(
        events[0].session_event(b.session),
        Some(SessionEvent::BeforeStarted)
    ));
    assert!(!b.scene.listeners().contains(GlobalListeners::POINTER_MOVE));

    // Auxiliary buttons never arm.
    let secondary = PointerEvent::mouse(
        Point::new(430.0, 10.0),
        Some(b.card),
        Duration::from_secs(5),
    )
    .with_button(MouseButton::Secondary);
    b.dnd.pointer_down(&mut b.scene, &secondary);
    assert!(!b.scene.listeners().contains(GlobalListeners::POINTER_MOVE));

    let real = PointerEvent::mouse(Point::new(430.0, 10.0), Some(b.card), Duration::from_secs(5));
    b.dnd.pointer_down(&mut b.scene, &real);
    assert!(b.scene.listeners().contains(GlobalListeners::POINTER_MOVE | GlobalListeners::WHEEL));
}

#[test]
fn detaching_zone_drops_its_subscription() {
    let mut b = board(DragConfig::default());
    let (_, zone) = b.zone(None, Rect::new(0.0, 0.0, 100.0, 100.0), pointer_zone());
    b.dnd
        .pointer_down(&mut b.scene, &at(410.0, 10.0, Some(b.card)));
    assert!(b.dnd.broker().has_observers(b.session, understory_dnd::broker::Channels::RELEASED));
    b.dnd.detach_drop_zone(zone).unwrap();
    assert!(!b.dnd.broker().has_observers(b.session, understory_dnd::broker::Channels::all()));
    let events = b.dnd.pointer_move(&mut b.scene, &at(50.0, 50.0, None));
    assert!(zone_events(&events).is_empty());
    assert_eq!(b.dnd.detach_drop_zone(zone), Err(understory_dnd::Error::UnknownZone(zone)));
}
