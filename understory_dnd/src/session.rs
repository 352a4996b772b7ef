// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag session: the per-element state machine behind a single drag.
//!
//! ## States
//!
//! ```text
//! Idle --pointer down--> Armed --threshold--> Dragging --pointer up--> Released --> Ended
//!                          |                                             (animation)
//!                          +--pointer up (click)--> Idle
//! ```
//!
//! An `Ended` session accepts the next pointer-down like an `Idle` one.
//!
//! ## Helpers
//!
//! A session dragged by itself (standalone) follows the pointer with a direct translation of
//! its root element. A session owned by a sortable container gets helpers instead: a preview
//! that follows the pointer in the overlay and a placeholder that holds the element's slot in
//! the tree. On release the preview animates onto the placeholder, then the root element takes
//! the placeholder's place and both helpers are destroyed.
//!
//! Sessions are created by [`DragDrop::attach_drag`](crate::engine::DragDrop::attach_drag); the
//! engine drives them.

use core::time::Duration;

use kurbo::{Point, Rect, Size, Vec2};

use crate::broker::PointerBroker;
use crate::config::{Axis, DragConfig, RevertPolicy};
use crate::event::SessionEvent;
use crate::geometry::{DirectionDelta, DirectionTracker, clamp_to_boundary, manhattan};
use crate::host::{self, HelperTemplate, Host, InputKind};
use crate::input::{PointerEvent, PointerInput};
use crate::slots::{ContainerId, SessionId, ZoneId};

/// Class added to the root element while dragging.
pub const DRAGGING_CLASS: &str = "dnd-dragging";
/// Class added to the preview helper.
pub const PREVIEW_CLASS: &str = "dnd-preview";
/// Class added to the placeholder helper.
pub const PLACEHOLDER_CLASS: &str = "dnd-placeholder";
/// Class added to the preview while it animates onto the placeholder.
pub const ANIMATING_CLASS: &str = "dnd-animating";

/// Mouse events this soon after a touch drag started are treated as emulated and ignored.
pub const MOUSE_EVENT_IGNORE_TIME: Duration = Duration::from_millis(800);

/// Lifecycle state of a [`DragSession`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DragState {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// Pointer is down but has not travelled the start threshold yet.
    Armed,
    /// Following the pointer.
    Dragging,
    /// Pointer released; the preview may still be animating.
    Released,
    /// The last drag is over.
    Ended,
}

/// What a pointer-down did to a session.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerDown {
    /// The session did not take the event; an enclosing draggable may.
    Ignored,
    /// The session took the event, whether or not it armed.
    Consumed,
}

#[derive(Copy, Clone, Debug)]
struct Helpers<E> {
    preview: E,
    placeholder: E,
}

/// One draggable element and the state of its current drag.
#[derive(Debug)]
pub struct DragSession<E> {
    id: SessionId,
    element: E,
    root: E,
    boundary: Option<E>,
    config: DragConfig,
    handles: Vec<E>,
    disabled_handles: Vec<E>,
    preview_template: Option<HelperTemplate>,
    placeholder_template: Option<HelperTemplate>,
    native_interactions: Option<bool>,
    owner: Option<ContainerId>,

    state: DragState,
    has_moved: bool,
    input: InputKind,
    reference: E,
    initial_translation: Option<Vec2>,
    passive: Vec2,
    active: Vec2,
    scroll: Vec2,
    pickup_in_element: Vec2,
    pickup_on_page: Point,
    boundary_rect: Option<Rect>,
    dragged_size: Size,
    direction: DirectionTracker,
    pointer: Point,
    last_touch: Option<Duration>,
    helpers: Option<Helpers<E>>,
    accepted: Vec<ZoneId>,
    animation_deadline: Option<Duration>,
}

impl<E: Copy + Eq + core::fmt::Debug> DragSession<E> {
    pub(crate) fn new(
        id: SessionId,
        element: E,
        root: E,
        boundary: Option<E>,
        config: DragConfig,
    ) -> Self {
        let direction = DirectionTracker::new(Point::ZERO, config.direction_change_threshold);
        Self {
            id,
            element,
            root,
            boundary,
            config,
            handles: Vec::new(),
            disabled_handles: Vec::new(),
            preview_template: None,
            placeholder_template: None,
            native_interactions: None,
            owner: None,
            state: DragState::Idle,
            has_moved: false,
            input: InputKind::Mouse,
            reference: root,
            initial_translation: None,
            passive: Vec2::ZERO,
            active: Vec2::ZERO,
            scroll: Vec2::ZERO,
            pickup_in_element: Vec2::ZERO,
            pickup_on_page: Point::ZERO,
            boundary_rect: None,
            dragged_size: Size::ZERO,
            direction,
            pointer: Point::ZERO,
            last_touch: None,
            helpers: None,
            accepted: Vec::new(),
            animation_deadline: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Element the behavior was attached to.
    pub fn element(&self) -> E {
        self.element
    }

    /// Element that moves: the attached element or the ancestor matched by the root selector.
    pub fn root(&self) -> E {
        self.root
    }

    /// Element whose box constrains the drag, if any.
    pub fn boundary(&self) -> Option<E> {
        self.boundary
    }

    /// Configuration.
    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Scope tag.
    pub fn scope(&self) -> &str {
        &self.config.scope
    }

    /// Lifecycle state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Returns true while the session follows the pointer.
    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Returns true if the pointer moved since the drag started.
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Returns true if a drop zone claimed the current (or last) drag.
    pub fn has_dropped(&self) -> bool {
        !self.accepted.is_empty()
    }

    /// Zones that claimed the current (or last) drag.
    pub fn accepted_zones(&self) -> &[ZoneId] {
        &self.accepted
    }

    /// Offset committed by previous standalone drags.
    pub fn passive_transform(&self) -> Vec2 {
        self.passive
    }

    /// Offset of the current standalone drag (includes the passive part).
    pub fn active_transform(&self) -> Vec2 {
        self.active
    }

    /// Last constrained client-space pointer position.
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Client-space pointer position at pointer-down.
    pub fn pickup_point(&self) -> Point {
        self.pickup_on_page
    }

    /// Direction of travel.
    pub fn direction(&self) -> DirectionDelta {
        self.direction.delta()
    }

    /// Element the pointer-down landed in: the grabbed handle, or the root.
    pub fn reference_element(&self) -> E {
        self.reference
    }

    /// Preview helper, while one exists.
    pub fn preview(&self) -> Option<E> {
        self.helpers.map(|h| h.preview)
    }

    /// Placeholder helper, while one exists.
    pub fn placeholder(&self) -> Option<E> {
        self.helpers.map(|h| h.placeholder)
    }

    /// Element following the pointer: the preview if there is one, the root otherwise.
    pub fn dragged_element(&self) -> E {
        self.preview().unwrap_or(self.root)
    }

    /// Element holding the item's slot in the tree: the placeholder if there is one.
    pub fn slot_element(&self) -> E {
        self.placeholder().unwrap_or(self.root)
    }

    /// Sortable container that owns this session.
    pub fn owner(&self) -> Option<ContainerId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<ContainerId>) {
        self.owner = owner;
    }

    /// Returns true if pointer-downs are ignored.
    pub fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    /// Enable or disable the session.
    pub fn set_disabled<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H, disabled: bool) {
        self.config.disabled = disabled;
        self.toggle_native_interactions(host);
    }

    /// Restrict movement to one axis.
    pub fn set_lock_axis(&mut self, axis: Option<Axis>) {
        self.config.lock_axis = axis;
    }

    /// Change the revert policy.
    pub fn set_revert(&mut self, revert: RevertPolicy) {
        self.config.revert = revert;
    }

    /// Use a host template for the preview instead of cloning the root.
    ///
    /// With a template the preview's top-left corner tracks the pointer itself.
    pub fn set_preview_template(&mut self, template: Option<HelperTemplate>) {
        self.preview_template = template;
    }

    /// Use a host template for the placeholder instead of cloning the root.
    pub fn set_placeholder_template(&mut self, template: Option<HelperTemplate>) {
        self.placeholder_template = template;
    }

    /// Restrict drag initiation to these descendants of the root.
    pub fn set_handles<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H, handles: Vec<E>) {
        for handle in &handles {
            host.set_native_drag_interactions(*handle, false);
        }
        self.disabled_handles.retain(|h| handles.contains(h));
        self.handles = handles;
        self.toggle_native_interactions(host);
    }

    /// Handles configured with [`set_handles`](Self::set_handles).
    pub fn handles(&self) -> &[E] {
        &self.handles
    }

    /// Stop a configured handle from starting drags.
    pub fn disable_handle(&mut self, handle: E) {
        if self.handles.contains(&handle) && !self.disabled_handles.contains(&handle) {
            self.disabled_handles.push(handle);
        }
    }

    /// Let a handle start drags again.
    pub fn enable_handle(&mut self, handle: E) {
        self.disabled_handles.retain(|h| *h != handle);
    }

    fn toggle_native_interactions<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H) {
        let enabled = self.config.disabled || !self.handles.is_empty();
        if self.native_interactions != Some(enabled) {
            self.native_interactions = Some(enabled);
            host.set_native_drag_interactions(self.root, enabled);
        }
    }

    /// Handle a pointer-down that reached the root element.
    ///
    /// Always emits `BeforeStarted`. Arming starts the session at the broker.
    pub(crate) fn pointer_down<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        broker: &mut PointerBroker,
        event: &PointerEvent<E>,
        out: &mut Vec<SessionEvent<E>>,
    ) -> PointerDown {
        out.push(SessionEvent::BeforeStarted);
        if self.config.disabled {
            return PointerDown::Ignored;
        }
        let reference = if self.handles.is_empty() {
            self.root
        } else {
            let grabbed = event.target.and_then(|target| {
                self.handles
                    .iter()
                    .copied()
                    .find(|handle| host::contains(host, *handle, target))
            });
            match grabbed {
                Some(handle) if !self.disabled_handles.contains(&handle) => handle,
                _ => return PointerDown::Ignored,
            }
        };

        let busy = broker.is_dragging(self.id)
            || matches!(self.state, DragState::Dragging | DragState::Released);
        let synthetic = matches!(event.input, PointerInput::Mouse(_))
            && self
                .last_touch
                .is_some_and(|t| event.timestamp < t + MOUSE_EVENT_IGNORE_TIME);
        if busy || event.input.is_auxiliary() || synthetic {
            return PointerDown::Consumed;
        }

        if self.initial_translation.is_none() {
            self.initial_translation = Some(host.translation(self.root));
        }
        self.toggle_native_interactions(host);
        self.state = DragState::Armed;
        self.has_moved = false;
        self.accepted.clear();
        self.input = event.input.kind();
        self.reference = reference;
        self.scroll = host.scroll_offset();
        self.boundary_rect = self.boundary.map(|b| host.bounding_rect(b));

        let pointer = event.page - self.scroll;
        let root_rect = host.bounding_rect(self.root);
        self.pickup_in_element = if self.preview_template.is_some() {
            Vec2::ZERO
        } else {
            pointer - root_rect.origin()
        };
        self.dragged_size = root_rect.size();
        self.pickup_on_page = pointer;
        self.pointer = pointer;
        self.direction = DirectionTracker::new(pointer, self.config.direction_change_threshold);

        broker.start_dragging(host, self.id, self.input);
        tracing::debug!(session = ?self.id, ?pointer, "drag armed");
        PointerDown::Consumed
    }

    /// Cross from `Armed` to `Dragging` once the pointer travelled the start threshold.
    pub(crate) fn try_start<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent<E>,
    ) -> Option<SessionEvent<E>> {
        if self.state != DragState::Armed {
            return None;
        }
        let pointer = event.page - self.scroll;
        if manhattan(pointer, self.pickup_on_page) < self.config.drag_start_threshold {
            return None;
        }
        self.state = DragState::Dragging;
        if self.input == InputKind::Touch {
            self.last_touch = Some(event.timestamp);
        }
        host.set_class(self.root, DRAGGING_CLASS, true);
        tracing::debug!(session = ?self.id, "drag started");
        Some(SessionEvent::Started {
            pointer: self.pickup_on_page,
        })
    }

    /// Follow a pointer sample while dragging.
    ///
    /// Returns `Moved` only when `observed` is set.
    pub(crate) fn drag_to<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent<E>,
        observed: bool,
    ) -> Option<SessionEvent<E>> {
        if self.state != DragState::Dragging {
            return None;
        }
        let pointer = self.constrain(event.page - self.scroll);
        self.has_moved = true;
        self.pointer = pointer;
        let delta = self.direction.update(pointer);

        if self.helpers.is_none() {
            self.active = pointer - self.pickup_on_page + self.passive;
            let initial = self.initial_translation.unwrap_or(Vec2::ZERO);
            host.set_translation(self.root, initial + self.active);
        }

        observed.then_some(SessionEvent::Moved {
            pointer,
            event: *event,
            delta,
        })
    }

    /// Apply the lock axis, then keep the dragged box inside the boundary.
    fn constrain(&self, mut pointer: Point) -> Point {
        match self.config.lock_axis {
            Some(Axis::X) => pointer.y = self.pickup_on_page.y,
            Some(Axis::Y) => pointer.x = self.pickup_on_page.x,
            None => {}
        }
        match self.boundary_rect {
            Some(boundary) => {
                clamp_to_boundary(pointer, self.pickup_in_element, self.dragged_size, boundary)
            }
            None => pointer,
        }
    }

    /// Create the preview and placeholder, moving the root out of the way.
    ///
    /// Called by the owning container when the drag starts. Does nothing if helpers exist.
    pub fn init_helpers<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H) {
        if self.helpers.is_some() {
            return;
        }
        let root_rect = host.bounding_rect(self.root);

        let preview = match self.preview_template.and_then(|t| host.render_template(t)) {
            Some(preview) => {
                host.set_translation(preview, self.pickup_on_page.to_vec2());
                preview
            }
            None => {
                let preview = host.clone_node(self.root);
                host.set_size(preview, root_rect.size());
                host.set_translation(preview, root_rect.origin().to_vec2());
                host.set_class(preview, DRAGGING_CLASS, false);
                preview
            }
        };
        host.set_native_drag_interactions(preview, false);
        host.set_class(preview, PREVIEW_CLASS, true);

        let placeholder = match self
            .placeholder_template
            .and_then(|t| host.render_template(t))
        {
            Some(placeholder) => placeholder,
            None => {
                let placeholder = host.clone_node(self.root);
                host.set_class(placeholder, DRAGGING_CLASS, false);
                placeholder
            }
        };
        host.set_class(placeholder, PLACEHOLDER_CLASS, true);

        if let Some(parent) = host.parent(self.root) {
            host.insert_before(parent, placeholder, Some(self.root));
        }
        host.set_hidden(self.root, true);
        host.append_to_overlay(self.root);
        host.append_to_overlay(preview);

        let size = host.bounding_rect(preview).size();
        if size.width > 0.0 && size.height > 0.0 {
            self.dragged_size = size;
        }
        self.helpers = Some(Helpers {
            preview,
            placeholder,
        });
        tracing::debug!(session = ?self.id, ?preview, ?placeholder, "created drag helpers");
    }

    /// Move the preview so the pickup point sits under `pointer`.
    pub fn position_preview<H: Host<Element = E> + ?Sized>(&self, host: &mut H, pointer: Point) {
        if let Some(helpers) = self.helpers {
            host.set_translation(helpers.preview, pointer.to_vec2() - self.pickup_in_element);
        }
    }

    /// Handle a pointer-up.
    ///
    /// A session that never started is stopped at the broker and returns to `Idle` without
    /// notifications. A dragging session moves to `Released`.
    pub(crate) fn release<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        broker: &mut PointerBroker,
    ) -> Option<SessionEvent<E>> {
        match self.state {
            DragState::Armed => {
                self.state = DragState::Idle;
                broker.stop_dragging(host, self.id);
                tracing::debug!(session = ?self.id, "pointer released before drag start");
                None
            }
            DragState::Dragging => {
                self.state = DragState::Released;
                Some(SessionEvent::Released)
            }
            _ => None,
        }
    }

    /// Record that `zone` claimed the drop.
    pub(crate) fn accept_drop(&mut self, zone: ZoneId) -> SessionEvent<E> {
        if !self.accepted.contains(&zone) {
            self.accepted.push(zone);
        }
        SessionEvent::Dropped { zone }
    }

    /// Resolve a released drag.
    ///
    /// Standalone sessions commit (or revert) their offset and end now. Sessions with helpers
    /// animate the preview onto the placeholder and end now if there is nothing to wait for;
    /// otherwise they stay `Released` until [`transition_end`](Self::transition_end) or
    /// [`tick`](Self::tick).
    pub(crate) fn settle<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        now: Duration,
    ) -> Option<SessionEvent<E>> {
        if self.state != DragState::Released {
            return None;
        }
        let Some(helpers) = self.helpers else {
            self.passive = self.active;
            if self.config.revert.should_revert(self.has_dropped()) {
                self.revert(host);
            }
            return Some(self.end(host));
        };
        if !self.has_moved {
            return Some(self.finish(host));
        }
        let target = host.bounding_rect(helpers.placeholder);
        host.set_class(helpers.preview, ANIMATING_CLASS, true);
        host.set_translation(helpers.preview, target.origin().to_vec2());
        let duration = host.transition_duration(helpers.preview);
        if duration.is_zero() {
            return Some(self.finish(host));
        }
        // transitionend may never fire for short transitions.
        self.animation_deadline = Some(now + duration.mul_f64(1.5));
        None
    }

    /// The host reports a finished transition on `element`.
    pub(crate) fn transition_end<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        element: E,
    ) -> Option<SessionEvent<E>> {
        (self.state == DragState::Released && self.preview() == Some(element))
            .then(|| self.finish(host))
    }

    /// Finish an animation whose deadline passed.
    pub(crate) fn tick<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        now: Duration,
    ) -> Option<SessionEvent<E>> {
        let deadline = self.animation_deadline?;
        (self.state == DragState::Released && now >= deadline).then(|| self.finish(host))
    }

    /// Put the root back in the placeholder's slot and drop the helpers.
    fn finish<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H) -> SessionEvent<E> {
        self.restore(host);
        self.passive = Vec2::ZERO;
        self.active = Vec2::ZERO;
        self.end(host)
    }

    fn restore<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H) {
        let Some(helpers) = self.helpers.take() else {
            return;
        };
        host.set_hidden(self.root, false);
        if let Some(parent) = host.parent(helpers.placeholder) {
            host.insert_before(parent, self.root, Some(helpers.placeholder));
        }
        host.destroy(helpers.preview);
        host.destroy(helpers.placeholder);
    }

    fn end<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H) -> SessionEvent<E> {
        self.animation_deadline = None;
        self.state = DragState::Ended;
        host.set_class(self.root, DRAGGING_CLASS, false);
        tracing::debug!(session = ?self.id, dropped = self.has_dropped(), "drag ended");
        SessionEvent::Ended
    }

    /// Stop at the broker once `Ended` has been delivered.
    pub(crate) fn complete<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        broker: &mut PointerBroker,
    ) {
        broker.stop_dragging(host, self.id);
    }

    /// Reset a standalone element to the translation it had before its first drag.
    pub fn revert<H: Host<Element = E> + ?Sized>(&mut self, host: &mut H) {
        host.set_translation(self.root, self.initial_translation.unwrap_or(Vec2::ZERO));
        self.active = Vec2::ZERO;
        self.passive = Vec2::ZERO;
    }

    /// Tear down before detaching: restore the root and forget the session at the broker.
    pub(crate) fn dispose<H: Host<Element = E> + ?Sized>(
        &mut self,
        host: &mut H,
        broker: &mut PointerBroker,
    ) {
        self.restore(host);
        if self.state != DragState::Idle {
            host.set_class(self.root, DRAGGING_CLASS, false);
        }
        self.state = DragState::Idle;
        broker.unregister(host, self.id);
    }
}
