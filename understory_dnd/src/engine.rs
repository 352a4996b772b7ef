// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: attachment, input entry points and notification routing.
//!
//! [`DragDrop`] owns the [`PointerBroker`] and the sessions, zones and containers attached to a
//! host. Each input call runs to completion and returns every [`Event`] it produced, in
//! emission order:
//!
//! 1. the session reacts to the input and emits its own events;
//! 2. each event goes to the session's subscribers (zones, the owning container) in
//!    subscription order, which may emit further events;
//! 3. queued broker notices are drained last, activating zones and containers for sessions that
//!    just started and cleaning up after sessions that stopped.
//!
//! A finished drag reports `Released`, then `Ended`, and only then stops at the broker.
//!
//! ```
//! use understory_dnd::config::DragConfig;
//! use understory_dnd::engine::DragDrop;
//! # use understory_dnd::host::{GlobalListeners, Host, InputKind};
//! # use kurbo::{Rect, Size, Vec2};
//! # #[derive(Default)]
//! # struct Page { translation: Vec2 }
//! # impl Host for Page {
//! #     type Element = u32;
//! #     fn is_element(&self, _: u32) -> bool { true }
//! #     fn bounding_rect(&self, _: u32) -> Rect { Rect::new(0.0, 0.0, 50.0, 50.0) + self.translation }
//! #     fn scroll_offset(&self) -> Vec2 { Vec2::ZERO }
//! #     fn parent(&self, _: u32) -> Option<u32> { None }
//! #     fn next_sibling(&self, _: u32) -> Option<u32> { None }
//! #     fn matches_selector(&self, _: u32, _: &str) -> bool { false }
//! #     fn insert_before(&mut self, _: u32, _: u32, _: Option<u32>) {}
//! #     fn append_to_overlay(&mut self, _: u32) {}
//! #     fn detach(&mut self, _: u32) {}
//! #     fn clone_node(&mut self, n: u32) -> u32 { n }
//! #     fn translation(&self, _: u32) -> Vec2 { self.translation }
//! #     fn set_translation(&mut self, _: u32, t: Vec2) { self.translation = t; }
//! #     fn set_hidden(&mut self, _: u32, _: bool) {}
//! #     fn set_size(&mut self, _: u32, _: Size) {}
//! #     fn set_class(&mut self, _: u32, _: &str, _: bool) {}
//! #     fn listen(&mut self, _: GlobalListeners, _: InputKind) {}
//! #     fn unlisten(&mut self, _: GlobalListeners) {}
//! # }
//! use understory_dnd::input::PointerEvent;
//! use kurbo::Point;
//! use core::time::Duration;
//!
//! let mut page = Page::default();
//! let mut dnd = DragDrop::new();
//! let card = dnd.attach_drag(&mut page, 1, DragConfig::default()).unwrap();
//!
//! let t = Duration::ZERO;
//! dnd.pointer_down(&mut page, &PointerEvent::mouse(Point::new(10.0, 10.0), Some(1), t));
//! dnd.pointer_move(&mut page, &PointerEvent::mouse(Point::new(40.0, 30.0), None, t));
//! dnd.pointer_up(&mut page, &PointerEvent::mouse(Point::new(40.0, 30.0), None, t));
//!
//! assert_eq!(page.translation, Vec2::new(30.0, 20.0));
//! assert_eq!(dnd.session(card).unwrap().passive_transform(), Vec2::new(30.0, 20.0));
//! ```

use core::fmt;
use core::time::Duration;

use kurbo::{Point, Rect, Vec2};

use crate::broker::{BrokerNotice, Channels, Observer, PointerBroker};
use crate::config::{DragConfig, DropZoneConfig, SortConfig};
use crate::error::{Error, Result};
use crate::event::{DropEvent, Event, SessionEvent, SortEvent};
use crate::geometry::{DirectionDelta, point_in_rect};
use crate::host::{self, GlobalListeners, Host};
use crate::input::PointerEvent;
use crate::session::{DragSession, DragState, PointerDown};
use crate::slots::{ContainerId, SessionId, Slots, ZoneId};
use crate::sortable::{CachedItem, SortableContainer, enter_index};
use crate::zone::{Accept, DropZone, resolve_claims};

/// Channels zones subscribe to for an accepted session.
const ZONE_CHANNELS: Channels = Channels::MOVED
    .union(Channels::RELEASED)
    .union(Channels::ENDED);

/// Channels the owning container subscribes to for a member session.
const CONTAINER_CHANNELS: Channels = Channels::STARTED
    .union(Channels::MOVED)
    .union(Channels::ENDED);

fn channel_of<E>(event: &SessionEvent<E>) -> Channels {
    match event {
        SessionEvent::Started { .. } => Channels::STARTED,
        SessionEvent::Moved { .. } => Channels::MOVED,
        SessionEvent::Released => Channels::RELEASED,
        SessionEvent::Ended => Channels::ENDED,
        _ => Channels::empty(),
    }
}

/// A sortable drag in flight.
#[derive(Copy, Clone, Debug)]
struct Transfer {
    session: SessionId,
    source: ContainerId,
    current: ContainerId,
    previous_index: usize,
    pointer: Point,
}

/// Drag, drop and sort engine for one host.
pub struct DragDrop<E> {
    broker: PointerBroker,
    sessions: Slots<SessionId, DragSession<E>>,
    zones: Slots<ZoneId, DropZone<E>>,
    containers: Slots<ContainerId, SortableContainer<E>>,
    transfers: Vec<Transfer>,
}

impl<E> fmt::Debug for DragDrop<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDrop")
            .field("broker", &self.broker)
            .field("sessions", &self.sessions)
            .field("zones", &self.zones)
            .field("containers", &self.containers)
            .field("transfers", &self.transfers.len())
            .finish()
    }
}

impl<E: Copy + Eq + fmt::Debug> Default for DragDrop<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + fmt::Debug> DragDrop<E> {
    /// Create an engine with nothing attached.
    pub fn new() -> Self {
        Self {
            broker: PointerBroker::new(),
            sessions: Slots::default(),
            zones: Slots::default(),
            containers: Slots::default(),
            transfers: Vec::new(),
        }
    }

    /// The broker, for listener and subscription queries.
    pub fn broker(&self) -> &PointerBroker {
        &self.broker
    }

    /// Whether the host should prevent the default action of an event on `listener`.
    pub fn prevents_default(&self, listener: GlobalListeners) -> bool {
        self.broker.prevents_default(listener)
    }

    // --- Sessions ---

    /// Make `element` draggable.
    ///
    /// Root and boundary selectors are resolved against the element's ancestors now; a
    /// selector that matches nothing means no constraint.
    pub fn attach_drag<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        element: E,
        config: DragConfig,
    ) -> Result<SessionId> {
        if !host.is_element(element) {
            return Err(Error::NotAnElement { behavior: "drag" });
        }
        let view: &H = host;
        let root = config
            .root_selector
            .as_deref()
            .and_then(|s| host::closest_ancestor(view, element, s))
            .unwrap_or(element);
        let boundary = config
            .boundary_selector
            .as_deref()
            .and_then(|s| host::closest_ancestor(view, element, s));
        let disabled = config.disabled;
        let id = self
            .sessions
            .insert_with(|id| DragSession::new(id, element, root, boundary, config));
        self.broker.register(host, id);
        if disabled {
            if let Some(session) = self.sessions.get_mut(id) {
                session.set_disabled(host, true);
            }
        }
        tracing::debug!(session = ?id, ?element, ?root, "attached drag");
        Ok(id)
    }

    /// Remove drag behavior, ending any drag in progress without notifications of its own.
    ///
    /// Returns the zone deactivations caused by the teardown.
    pub fn detach_drag<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        id: SessionId,
    ) -> Result<Vec<Event<E>>> {
        let session = self.sessions.get_mut(id).ok_or(Error::UnknownSession(id))?;
        let owner = session.owner();
        session.dispose(host, &mut self.broker);
        if let Some(container) = owner.and_then(|c| self.containers.get_mut(c)) {
            container.remove_item(id);
        }
        let mut out = Vec::new();
        self.drain_notices(host, &mut out);
        self.sessions.remove(id);
        tracing::debug!(session = ?id, "detached drag");
        Ok(out)
    }

    /// A session.
    pub fn session(&self, id: SessionId) -> Option<&DragSession<E>> {
        self.sessions.get(id)
    }

    /// A session, for configuration.
    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut DragSession<E>> {
        self.sessions.get_mut(id)
    }

    /// Returns true if the session is following the pointer.
    pub fn is_dragging(&self, id: SessionId) -> bool {
        self.sessions.get(id).is_some_and(DragSession::is_dragging)
    }

    /// Subscribe an application observer to the moves of `session`.
    ///
    /// Sessions only emit `Moved` while someone observes them.
    pub fn observe_moves(&mut self, session: SessionId) -> Result<Observer> {
        if !self.sessions.contains(session) {
            return Err(Error::UnknownSession(session));
        }
        Ok(self.broker.observe_external(session))
    }

    /// Drop every subscription of an application observer.
    pub fn unobserve(&mut self, observer: Observer) {
        self.broker.unsubscribe_observer(observer);
    }

    // --- Drop zones ---

    /// Make `element` a drop zone.
    pub fn attach_drop_zone<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &H,
        element: E,
        config: DropZoneConfig,
        accept: Accept<E>,
    ) -> Result<ZoneId> {
        if !host.is_element(element) {
            return Err(Error::NotAnElement { behavior: "drop zone" });
        }
        let id = self
            .zones
            .insert_with(|id| DropZone::new(id, element, config, accept));
        tracing::debug!(zone = ?id, ?element, "attached drop zone");
        Ok(id)
    }

    /// Remove a drop zone and its subscriptions.
    pub fn detach_drop_zone(&mut self, id: ZoneId) -> Result<()> {
        self.zones.remove(id).ok_or(Error::UnknownZone(id))?;
        self.broker.unsubscribe_observer(Observer::Zone(id));
        Ok(())
    }

    /// A drop zone.
    pub fn zone(&self, id: ZoneId) -> Option<&DropZone<E>> {
        self.zones.get(id)
    }

    /// A drop zone, for configuration.
    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut DropZone<E>> {
        self.zones.get_mut(id)
    }

    // --- Sortable containers ---

    /// Make `element` a sortable container (initially empty).
    pub fn attach_sortable<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &H,
        element: E,
        config: SortConfig,
    ) -> Result<ContainerId> {
        if !host.is_element(element) {
            return Err(Error::NotAnElement { behavior: "sortable" });
        }
        let id = self
            .containers
            .insert_with(|id| SortableContainer::new(id, element, config));
        tracing::debug!(container = ?id, ?element, "attached sortable");
        Ok(id)
    }

    /// Replace the members of a container, in visual order.
    pub fn set_items(&mut self, id: ContainerId, items: Vec<SessionId>) -> Result<()> {
        if !self.containers.contains(id) {
            return Err(Error::UnknownContainer(id));
        }
        if self
            .transfers
            .iter()
            .any(|t| t.source == id || t.current == id)
        {
            return Err(Error::DragInProgress(id));
        }
        for item in &items {
            let session = self.sessions.get(*item).ok_or(Error::UnknownSession(*item))?;
            if let Some(owner) = session.owner() {
                if owner != id && self.containers.contains(owner) {
                    return Err(Error::AlreadyOwned {
                        session: *item,
                        owner,
                    });
                }
            }
        }
        let previous = self
            .containers
            .get(id)
            .map(|c| c.items().to_vec())
            .unwrap_or_default();
        for item in previous {
            if let Some(session) = self.sessions.get_mut(item) {
                session.set_owner(None);
            }
        }
        for item in &items {
            if let Some(session) = self.sessions.get_mut(*item) {
                session.set_owner(Some(id));
            }
        }
        if let Some(container) = self.containers.get_mut(id) {
            container.set_items(items);
        }
        Ok(())
    }

    /// Let items of `from` be dragged into `to` (one way).
    pub fn connect(&mut self, from: ContainerId, to: ContainerId) -> Result<()> {
        if !self.containers.contains(to) {
            return Err(Error::UnknownContainer(to));
        }
        let container = self
            .containers
            .get_mut(from)
            .ok_or(Error::UnknownContainer(from))?;
        container.connect(to);
        Ok(())
    }

    /// Undo [`connect`](Self::connect).
    pub fn disconnect(&mut self, from: ContainerId, to: ContainerId) -> Result<()> {
        let container = self
            .containers
            .get_mut(from)
            .ok_or(Error::UnknownContainer(from))?;
        container.disconnect(to);
        Ok(())
    }

    /// Remove a container, releasing its members and connections.
    pub fn detach_sortable(&mut self, id: ContainerId) -> Result<()> {
        if !self.containers.contains(id) {
            return Err(Error::UnknownContainer(id));
        }
        if self
            .transfers
            .iter()
            .any(|t| t.source == id || t.current == id)
        {
            return Err(Error::DragInProgress(id));
        }
        if let Some(container) = self.containers.remove(id) {
            for item in container.items() {
                if let Some(session) = self.sessions.get_mut(*item) {
                    session.set_owner(None);
                }
            }
        }
        for other in self.containers.keys() {
            if let Some(container) = self.containers.get_mut(other) {
                container.disconnect(id);
            }
        }
        self.broker.unsubscribe_observer(Observer::Container(id));
        Ok(())
    }

    /// A container.
    pub fn container(&self, id: ContainerId) -> Option<&SortableContainer<E>> {
        self.containers.get(id)
    }

    /// A container, for configuration.
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut SortableContainer<E>> {
        self.containers.get_mut(id)
    }

    // --- Input ---

    /// Deliver a pointer-down (mouse down or touch start).
    ///
    /// The target's draggable ancestors are offered the event innermost first until one
    /// consumes it.
    pub fn pointer_down<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent<E>,
    ) -> Vec<Event<E>> {
        let mut out = Vec::new();
        let mut current = event.target;
        'walk: while let Some(el) = current {
            let candidates: Vec<SessionId> = self
                .sessions
                .iter()
                .filter(|(_, s)| s.root() == el)
                .map(|(id, _)| id)
                .collect();
            for id in candidates {
                let Some(session) = self.sessions.get_mut(id) else {
                    continue;
                };
                let mut emitted = Vec::new();
                let outcome = session.pointer_down(host, &mut self.broker, event, &mut emitted);
                out.extend(
                    emitted
                        .into_iter()
                        .map(|event| Event::Session { session: id, event }),
                );
                if outcome == PointerDown::Consumed {
                    break 'walk;
                }
            }
            current = host.parent(el);
        }
        self.drain_notices(host, &mut out);
        out
    }

    /// Deliver a pointer move to every active session.
    pub fn pointer_move<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent<E>,
    ) -> Vec<Event<E>> {
        let mut out = Vec::new();
        for id in self.broker.active_sessions() {
            let Some(session) = self.sessions.get_mut(id) else {
                continue;
            };
            if let Some(started) = session.try_start(host, event) {
                self.dispatch(host, id, started, &mut out);
            }
            let observed = self.broker.has_observers(id, Channels::MOVED);
            let moved = self
                .sessions
                .get_mut(id)
                .and_then(|s| s.drag_to(host, event, observed));
            if let Some(moved) = moved {
                self.dispatch(host, id, moved, &mut out);
            }
        }
        self.drain_notices(host, &mut out);
        out
    }

    /// Deliver a pointer-up (mouse up or touch end) to every active session.
    pub fn pointer_up<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent<E>,
    ) -> Vec<Event<E>> {
        let mut out = Vec::new();
        for id in self.broker.active_sessions() {
            let Some(session) = self.sessions.get_mut(id) else {
                continue;
            };
            let Some(released) = session.release(host, &mut self.broker) else {
                continue;
            };
            self.dispatch(host, id, released, &mut out);
            let ended = self
                .sessions
                .get_mut(id)
                .and_then(|s| s.settle(host, event.timestamp));
            if let Some(ended) = ended {
                self.end_drag(host, id, ended, &mut out);
            }
        }
        self.drain_notices(host, &mut out);
        out
    }

    /// The host finished a transition on `element` (a preview returning to its placeholder).
    pub fn transition_end<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        element: E,
    ) -> Vec<Event<E>> {
        let mut out = Vec::new();
        for id in self.broker.active_sessions() {
            let ended = self
                .sessions
                .get_mut(id)
                .and_then(|s| s.transition_end(host, element));
            if let Some(ended) = ended {
                self.end_drag(host, id, ended, &mut out);
            }
        }
        self.drain_notices(host, &mut out);
        out
    }

    /// Advance time; finishes return animations whose `transitionend` never arrived.
    pub fn tick<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        now: Duration,
    ) -> Vec<Event<E>> {
        let mut out = Vec::new();
        for id in self.broker.active_sessions() {
            let ended = self.sessions.get_mut(id).and_then(|s| s.tick(host, now));
            if let Some(ended) = ended {
                self.end_drag(host, id, ended, &mut out);
            }
        }
        self.drain_notices(host, &mut out);
        out
    }

    /// Returns true while any session is waiting for its return animation.
    pub fn is_animating(&self) -> bool {
        self.sessions
            .iter()
            .any(|(_, s)| s.state() == DragState::Released)
    }

    // --- Routing ---

    fn end_drag<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        id: SessionId,
        ended: SessionEvent<E>,
        out: &mut Vec<Event<E>>,
    ) {
        self.dispatch(host, id, ended, out);
        if let Some(session) = self.sessions.get_mut(id) {
            session.complete(host, &mut self.broker);
        }
    }

    fn dispatch<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        id: SessionId,
        event: SessionEvent<E>,
        out: &mut Vec<Event<E>>,
    ) {
        let channel = channel_of(&event);
        out.push(Event::Session {
            session: id,
            event: event.clone(),
        });
        if channel.is_empty() {
            return;
        }
        if channel == Channels::RELEASED {
            self.resolve_drop(host, id, out);
        }
        for observer in self.broker.observers(id, channel) {
            match observer {
                Observer::Zone(zone) => self.zone_receive(host, zone, id, &event, out),
                Observer::Container(container) => {
                    self.container_receive(host, container, id, &event, out);
                }
                Observer::External(_) => {}
            }
        }
    }

    fn drain_notices<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        out: &mut Vec<Event<E>>,
    ) {
        while let Some(notice) = self.broker.pop_notice() {
            match notice {
                BrokerNotice::SessionStarted(id) => self.session_started(host, id, out),
                BrokerNotice::SessionStopped(id) => self.session_stopped(id, out),
            }
        }
    }

    fn session_started<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &H,
        id: SessionId,
        out: &mut Vec<Event<E>>,
    ) {
        let Some(session) = self.sessions.get(id) else {
            return;
        };
        // The container subscribes first so it positions the preview before zones hit-test it.
        if let Some(owner) = session.owner() {
            if self.containers.get(owner).is_some_and(|c| !c.is_disabled()) {
                self.broker
                    .subscribe(Observer::Container(owner), id, CONTAINER_CHANNELS);
            }
        }
        for zone_id in self.zones.keys() {
            let Some(zone) = self.zones.get_mut(zone_id) else {
                continue;
            };
            if !zone.can_accept(host, session) {
                continue;
            }
            if let Some(previous) = zone.session() {
                self.broker.unsubscribe(Observer::Zone(zone_id), previous);
            }
            self.broker
                .subscribe(Observer::Zone(zone_id), id, ZONE_CHANNELS);
            out.push(Event::Zone(zone.activate(id)));
        }
    }

    fn session_stopped(&mut self, id: SessionId, out: &mut Vec<Event<E>>) {
        for zone_id in self.zones.keys() {
            if let Some(zone) = self.zones.get_mut(zone_id) {
                if zone.session() == Some(id) {
                    out.extend(zone.deactivate().map(Event::Zone));
                }
            }
            self.broker.unsubscribe(Observer::Zone(zone_id), id);
        }
        if let Some(pos) = self.transfers.iter().position(|t| t.session == id) {
            // Only reachable when a session is detached mid-drag.
            self.transfers.remove(pos);
        }
        for container_id in self.containers.keys() {
            if let Some(container) = self.containers.get_mut(container_id) {
                if container.sorting() == Some(id) {
                    container.finish();
                }
            }
            self.broker.unsubscribe(Observer::Container(container_id), id);
        }
    }

    fn resolve_drop<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &H,
        id: SessionId,
        out: &mut Vec<Event<E>>,
    ) {
        let entered: Vec<(ZoneId, E, bool)> = self
            .broker
            .observers(id, Channels::RELEASED)
            .into_iter()
            .filter_map(|observer| match observer {
                Observer::Zone(zone) => Some(zone),
                _ => None,
            })
            .filter_map(|zone_id| {
                let zone = self.zones.get(zone_id)?;
                (zone.session() == Some(id) && zone.is_entered())
                    .then(|| (zone_id, zone.element(), zone.is_greedy()))
            })
            .collect();
        let claims = resolve_claims(&entered, |ancestor, node| {
            host::contains(host, ancestor, node)
        });
        for zone_id in claims {
            if let Some(session) = self.sessions.get_mut(id) {
                out.push(Event::Session {
                    session: id,
                    event: session.accept_drop(zone_id),
                });
            }
            if let Some(claimed) = self.zones.get(zone_id).and_then(DropZone::claim) {
                out.push(Event::Zone(claimed));
            }
            tracing::debug!(session = ?id, zone = ?zone_id, "drop claimed");
        }
    }

    fn zone_receive<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &H,
        zone_id: ZoneId,
        id: SessionId,
        event: &SessionEvent<E>,
        out: &mut Vec<Event<E>>,
    ) {
        match event {
            SessionEvent::Moved { pointer, .. } => {
                let Some(session) = self.sessions.get(id) else {
                    return;
                };
                let dragged = host.bounding_rect(session.dragged_element());
                let Some(zone) = self.zones.get_mut(zone_id) else {
                    return;
                };
                if zone.session() != Some(id) {
                    return;
                }
                let rect = host.bounding_rect(zone.element());
                out.extend(zone.sample(rect, dragged, *pointer).map(Event::Zone));
            }
            SessionEvent::Ended => {
                if let Some(zone) = self.zones.get_mut(zone_id) {
                    if zone.session() == Some(id) {
                        out.extend(zone.end().into_iter().map(Event::Zone));
                    }
                }
                self.broker.unsubscribe(Observer::Zone(zone_id), id);
            }
            _ => {}
        }
    }

    fn container_receive<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        container: ContainerId,
        id: SessionId,
        event: &SessionEvent<E>,
        out: &mut Vec<Event<E>>,
    ) {
        match event {
            SessionEvent::Started { .. } => self.start_sort(host, container, id),
            SessionEvent::Moved { pointer, delta, .. } => {
                self.move_sort(host, id, *pointer, *delta, out);
            }
            SessionEvent::Ended => self.end_sort(host, container, id, out),
            _ => {}
        }
    }

    fn start_sort<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        source: ContainerId,
        id: SessionId,
    ) {
        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };
        session.init_helpers(host);
        let pointer = session.pointer();
        let Some(container) = self.containers.get(source) else {
            return;
        };
        let previous_index = container.index_of(id).unwrap_or(0);
        let mut involved = vec![source];
        involved.extend_from_slice(container.connected());

        for container_id in involved {
            let members: Vec<(SessionId, E)> = match self.containers.get(container_id) {
                Some(c)
                    if container_id == source
                        || (!c.is_disabled() && c.sorting().is_none_or(|s| s == id)) =>
                {
                    c.items()
                        .iter()
                        .filter_map(|item| {
                            self.sessions.get(*item).map(|s| (*item, s.slot_element()))
                        })
                        .collect()
                }
                _ => continue,
            };
            if let Some(c) = self.containers.get_mut(container_id) {
                c.begin(host, id, members);
            }
        }
        self.transfers.push(Transfer {
            session: id,
            source,
            current: source,
            previous_index,
            pointer,
        });
        tracing::debug!(session = ?id, container = ?source, previous_index, "sort started");
    }

    fn move_sort<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        id: SessionId,
        pointer: Point,
        delta: DirectionDelta,
        out: &mut Vec<Event<E>>,
    ) {
        if let Some(session) = self.sessions.get(id) {
            session.position_preview(host, pointer);
        }
        let Some(transfer) = self.transfers.iter_mut().find(|t| t.session == id) else {
            return;
        };
        transfer.pointer = pointer;
        let (source, mut current) = (transfer.source, transfer.current);

        if let Some(next) = self.container_at(host, source, id, pointer) {
            if next != current {
                self.move_between(host, id, current, next, pointer, out);
                current = next;
            }
        }
        if let Some(container) = self.containers.get_mut(current) {
            out.extend(container.sort(host, id, pointer, delta).map(Event::Sort));
        }
    }

    /// Innermost container taking part in the drag of `id` whose box contains `pointer`.
    fn container_at<H: Host<Element = E> + ?Sized>(
        &self,
        host: &H,
        source: ContainerId,
        id: SessionId,
        pointer: Point,
    ) -> Option<ContainerId> {
        let source_container = self.containers.get(source)?;
        let candidates: Vec<(ContainerId, E)> = core::iter::once(source)
            .chain(source_container.connected().iter().copied())
            .filter_map(|c| {
                let container = self.containers.get(c)?;
                (container.sorting() == Some(id)).then(|| (c, container.element()))
            })
            .filter(|(_, element)| point_in_rect(host.bounding_rect(*element), pointer))
            .collect();
        candidates
            .iter()
            .find(|(c, element)| {
                !candidates.iter().any(|(other, inner)| {
                    other != c && *inner != *element && host::contains(host, *element, *inner)
                })
            })
            .map(|(c, _)| *c)
    }

    fn move_between<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        id: SessionId,
        from: ContainerId,
        to: ContainerId,
        pointer: Point,
        out: &mut Vec<Event<E>>,
    ) {
        let Some(slot) = self.sessions.get(id).map(DragSession::slot_element) else {
            return;
        };
        if let Some(previous) = self.containers.get_mut(from) {
            previous.take_position(id);
        }
        out.push(Event::Session {
            session: id,
            event: SessionEvent::Exited { container: from },
        });
        out.push(Event::Sort(SortEvent::Exited {
            container: from,
            item: id,
        }));

        let Some(target) = self.containers.get_mut(to) else {
            return;
        };
        let index = enter_index(target.positions(), pointer, target.flow(host));
        let reference = target.positions().get(index).map(|p| p.element);
        let parent = reference
            .and_then(|r| host.parent(r))
            .unwrap_or(target.element());
        host.insert_before(parent, slot, reference);
        target.insert_position(
            index,
            CachedItem {
                item: id,
                element: slot,
                rect: Rect::ZERO,
                offset: Vec2::ZERO,
            },
        );
        target.refresh(host);
        if let Some(previous) = self.containers.get_mut(from) {
            previous.refresh(host);
        }
        if let Some(transfer) = self.transfers.iter_mut().find(|t| t.session == id) {
            transfer.current = to;
        }
        out.push(Event::Session {
            session: id,
            event: SessionEvent::Entered { container: to },
        });
        out.push(Event::Sort(SortEvent::Entered {
            container: to,
            item: id,
            index,
        }));
        tracing::debug!(session = ?id, ?from, ?to, index, "item moved between containers");
    }

    fn end_sort<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &H,
        container: ContainerId,
        id: SessionId,
        out: &mut Vec<Event<E>>,
    ) {
        self.broker.unsubscribe(Observer::Container(container), id);
        let Some(pos) = self.transfers.iter().position(|t| t.session == id) else {
            return;
        };
        let transfer = self.transfers.remove(pos);
        let (current_index, is_pointer_over_container) = match self.containers.get(transfer.current)
        {
            Some(c) => (
                c.position_of(id).unwrap_or(c.positions().len()),
                point_in_rect(host.bounding_rect(c.element()), transfer.pointer),
            ),
            None => (0, false),
        };

        if let Some(source) = self.containers.get_mut(transfer.source) {
            source.commit_order();
        }
        if transfer.current != transfer.source {
            if let Some(target) = self.containers.get_mut(transfer.current) {
                target.commit_order();
            }
            if let Some(session) = self.sessions.get_mut(id) {
                session.set_owner(Some(transfer.current));
            }
        }
        for container_id in self.containers.keys() {
            if let Some(c) = self.containers.get_mut(container_id) {
                if c.sorting() == Some(id) {
                    c.finish();
                }
            }
        }

        let dropped = DropEvent {
            item: id,
            container: transfer.current,
            current_index,
            previous_container: transfer.source,
            previous_index: transfer.previous_index,
            is_pointer_over_container,
        };
        tracing::debug!(?dropped, "sort dropped");
        out.push(Event::Sort(SortEvent::Dropped(dropped)));
    }
}
