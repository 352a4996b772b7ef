// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop zones: hit-testing a tracked drag against an element.
//!
//! A zone is `Inactive` until a session it accepts starts (pointer-down), then `Active` while it
//! tracks that session and `Entered` while the dragged element is over it by its [`Tolerance`].
//! Enter and exit are reported on edges only.
//!
//! On release every `Entered` zone tracking the session claims the drop, except that a greedy
//! zone suppresses the claims of the zones enclosing it. See [`resolve_claims`].

use core::fmt;

use kurbo::{Point, Rect};

use crate::config::{DropZoneConfig, Tolerance};
use crate::event::ZoneEvent;
use crate::geometry::tolerance_hit;
use crate::host::Host;
use crate::session::DragSession;
use crate::slots::{SessionId, ZoneId};

/// Predicate over a candidate session and the zone evaluating it.
pub type ZonePredicate<E> = Box<dyn Fn(&DragSession<E>, &DropZone<E>) -> bool>;

/// Which sessions a zone accepts.
pub enum Accept<E> {
    /// Every session in scope.
    Any,
    /// Sessions whose root (or attached element) matches the selector.
    Selector(String),
    /// Sessions the predicate approves.
    Predicate(ZonePredicate<E>),
}

impl<E> fmt::Debug for Accept<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<E> Default for Accept<E> {
    fn default() -> Self {
        Self::Any
    }
}

impl<E> From<&str> for Accept<E> {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.into())
    }
}

/// Activation state of a [`DropZone`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ZoneState {
    /// Not tracking any session.
    #[default]
    Inactive,
    /// Tracking a session that is not over the zone.
    Active,
    /// Tracking a session that is over the zone.
    Entered,
}

/// An element that can receive drops.
pub struct DropZone<E> {
    id: ZoneId,
    element: E,
    config: DropZoneConfig,
    accept: Accept<E>,
    enter_predicate: Option<ZonePredicate<E>>,
    state: ZoneState,
    session: Option<SessionId>,
}

impl<E: fmt::Debug> fmt::Debug for DropZone<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropZone")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("config", &self.config)
            .field("accept", &self.accept)
            .field("state", &self.state)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<E: Copy + Eq + fmt::Debug> DropZone<E> {
    pub(crate) fn new(id: ZoneId, element: E, config: DropZoneConfig, accept: Accept<E>) -> Self {
        Self {
            id,
            element,
            config,
            accept,
            enter_predicate: None,
            state: ZoneState::Inactive,
            session: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Element the zone is attached to.
    pub fn element(&self) -> E {
        self.element
    }

    /// Configuration.
    pub fn config(&self) -> &DropZoneConfig {
        &self.config
    }

    /// Activation state.
    pub fn state(&self) -> ZoneState {
        self.state
    }

    /// Session being tracked.
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Returns true while the tracked session is over the zone.
    pub fn is_entered(&self) -> bool {
        self.state == ZoneState::Entered
    }

    /// Returns true if the zone claims drops ahead of the zones enclosing it.
    pub fn is_greedy(&self) -> bool {
        self.config.greedy
    }

    /// Replace the accept criteria. Takes effect from the next drag.
    pub fn set_accept(&mut self, accept: Accept<E>) {
        self.accept = accept;
    }

    /// Set a predicate that can veto otherwise accepted sessions.
    pub fn set_enter_predicate(&mut self, predicate: Option<ZonePredicate<E>>) {
        self.enter_predicate = predicate;
    }

    /// Change the hit-test rule.
    pub fn set_tolerance(&mut self, tolerance: Tolerance) {
        self.config.tolerance = tolerance;
    }

    /// Change greediness.
    pub fn set_greedy(&mut self, greedy: bool) {
        self.config.greedy = greedy;
    }

    /// Change the scope tag.
    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.config.scope = scope.into();
    }

    /// Enable or disable the zone. Takes effect from the next drag.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    /// Decide whether the zone wants to track `session`.
    pub fn can_accept<H: Host<Element = E> + ?Sized>(
        &self,
        host: &H,
        session: &DragSession<E>,
    ) -> bool {
        if self.config.disabled || self.config.scope != session.scope() {
            return false;
        }
        let accepted = match &self.accept {
            Accept::Any => true,
            Accept::Selector(selector) => {
                host.matches_selector(session.root(), selector)
                    || host.matches_selector(session.element(), selector)
                    || host.matches_selector(session.reference_element(), selector)
            }
            Accept::Predicate(predicate) => predicate(session, self),
        };
        accepted
            && self
                .enter_predicate
                .as_ref()
                .is_none_or(|predicate| predicate(session, self))
    }

    /// Start tracking `session`, forgetting any previous one.
    pub(crate) fn activate(&mut self, session: SessionId) -> ZoneEvent {
        self.state = ZoneState::Active;
        self.session = Some(session);
        tracing::debug!(zone = ?self.id, ?session, "zone activated");
        ZoneEvent::Activated {
            zone: self.id,
            session,
        }
    }

    /// Hit-test a move sample, reporting enter and exit edges.
    pub(crate) fn sample(
        &mut self,
        zone_rect: Rect,
        dragged: Rect,
        pointer: Point,
    ) -> Option<ZoneEvent> {
        let session = self.session?;
        let hit = tolerance_hit(self.config.tolerance, zone_rect, dragged, pointer);
        match (self.state, hit) {
            (ZoneState::Active, true) => {
                self.state = ZoneState::Entered;
                Some(ZoneEvent::Entered {
                    zone: self.id,
                    session,
                })
            }
            (ZoneState::Entered, false) => {
                self.state = ZoneState::Active;
                Some(ZoneEvent::Exited {
                    zone: self.id,
                    session,
                })
            }
            _ => None,
        }
    }

    /// Claim the drop if the tracked session is over the zone.
    pub(crate) fn claim(&self) -> Option<ZoneEvent> {
        let session = self.session?;
        self.is_entered().then_some(ZoneEvent::Dropped {
            zone: self.id,
            session,
        })
    }

    /// The tracked drag ended: report it and stop tracking.
    pub(crate) fn end(&mut self) -> Vec<ZoneEvent> {
        let Some(session) = self.session else {
            return Vec::new();
        };
        let mut out = vec![ZoneEvent::Ended {
            zone: self.id,
            session,
        }];
        out.extend(self.deactivate());
        out
    }

    /// Stop tracking without an `Ended` (the session stopped before it started dragging).
    pub(crate) fn deactivate(&mut self) -> Option<ZoneEvent> {
        let session = self.session.take()?;
        self.state = ZoneState::Inactive;
        tracing::debug!(zone = ?self.id, ?session, "zone deactivated");
        Some(ZoneEvent::Deactivated {
            zone: self.id,
            session,
        })
    }
}

/// Decide which entered zones claim a drop.
///
/// `entered` lists `(zone, element, greedy)` for every entered zone tracking the session.
/// A zone claims unless a greedy zone nested inside it (per `is_descendant(ancestor, node)`) is
/// also entered. Order of `entered` is preserved.
pub fn resolve_claims<E: Copy + Eq>(
    entered: &[(ZoneId, E, bool)],
    is_descendant: impl Fn(E, E) -> bool,
) -> Vec<ZoneId> {
    entered
        .iter()
        .filter(|(zone, element, _)| {
            !entered.iter().any(|(other, inner, greedy)| {
                *greedy && other != zone && *inner != *element && is_descendant(*element, *inner)
            })
        })
        .map(|(zone, _, _)| *zone)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DragConfig;
    use crate::slots::{SlotKey, Slots};
    use crate::test_host::MockHost;

    fn zone_with(accept: Accept<u32>, config: DropZoneConfig) -> DropZone<u32> {
        DropZone::new(ZoneId::from_parts(0, 1), 0, config, accept)
    }

    fn session(host: &mut MockHost, scope: &str) -> DragSession<u32> {
        let el = host.add(None, "li", Rect::new(0.0, 0.0, 10.0, 10.0));
        host.add_class(el, "card");
        let mut slots: Slots<SessionId, ()> = Slots::default();
        let id = slots.insert_with(|_| ());
        DragSession::new(
            id,
            el,
            el,
            None,
            DragConfig {
                scope: scope.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn acceptance_rules() {
        let mut host = MockHost::new();
        let s = session(&mut host, "default");
        let other_scope = session(&mut host, "elsewhere");

        let any = zone_with(Accept::Any, DropZoneConfig::default());
        assert!(any.can_accept(&host, &s));
        assert!(!any.can_accept(&host, &other_scope));

        let by_class = zone_with(".card".into(), DropZoneConfig::default());
        assert!(by_class.can_accept(&host, &s));
        let by_tag = zone_with("div".into(), DropZoneConfig::default());
        assert!(!by_tag.can_accept(&host, &s));

        let mut vetoed = zone_with(Accept::Any, DropZoneConfig::default());
        vetoed.set_enter_predicate(Some(Box::new(|_, _| false)));
        assert!(!vetoed.can_accept(&host, &s));

        let pred = zone_with(
            Accept::Predicate(Box::new(|session, zone| {
                session.scope() == zone.config().scope
            })),
            DropZoneConfig::default(),
        );
        assert!(pred.can_accept(&host, &s));

        let disabled = zone_with(
            Accept::Any,
            DropZoneConfig {
                disabled: true,
                ..Default::default()
            },
        );
        assert!(!disabled.can_accept(&host, &s));
    }

    #[test]
    fn enter_and_exit_on_edges_only() {
        let mut zone = zone_with(
            Accept::Any,
            DropZoneConfig {
                tolerance: Tolerance::Pointer,
                ..Default::default()
            },
        );
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let s = SessionId::from_parts(3, 1);
        assert!(zone.sample(rect, Rect::ZERO, Point::new(50.0, 50.0)).is_none());
        zone.activate(s);
        let inside = Point::new(50.0, 50.0);
        let outside = Point::new(150.0, 50.0);
        assert!(matches!(zone.sample(rect, Rect::ZERO, inside), Some(ZoneEvent::Entered { .. })));
        assert_eq!(zone.sample(rect, Rect::ZERO, inside), None);
        assert!(zone.claim().is_some());
        assert!(matches!(zone.sample(rect, Rect::ZERO, outside), Some(ZoneEvent::Exited { .. })));
        assert_eq!(zone.sample(rect, Rect::ZERO, outside), None);
        assert!(zone.claim().is_none());

        let events = zone.end();
        assert!(matches!(events[..], [ZoneEvent::Ended { .. }, ZoneEvent::Deactivated { .. }]));
        assert_eq!(zone.state(), ZoneState::Inactive);
        assert!(zone.end().is_empty());
    }

    #[test]
    fn greedy_children_suppress_ancestors() {
        let outer = ZoneId::from_parts(0, 1);
        let inner = ZoneId::from_parts(1, 1);
        // Element 1 is nested in element 0.
        let nested = |ancestor: u32, node: u32| ancestor == 0 && node == 1;

        let both = [(outer, 0, false), (inner, 1, true)];
        assert_eq!(resolve_claims(&both, nested), vec![inner]);

        let not_greedy = [(outer, 0, false), (inner, 1, false)];
        assert_eq!(resolve_claims(&not_greedy, nested), vec![outer, inner]);

        let only_outer = [(outer, 0, false)];
        assert_eq!(resolve_claims(&only_outer, nested), vec![outer]);
    }
}
