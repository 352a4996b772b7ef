// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer event broker: one shared set of document listeners for every drag session.
//!
//! ## Listener accounting
//!
//! - The first [`register`](PointerBroker::register)ed session installs the touch-move guard; the
//!   last [`unregister`](PointerBroker::unregister) removes it.
//! - The first session to [`start_dragging`](PointerBroker::start_dragging) installs the move/up
//!   pair plus select-start suppression (and wheel suppression for mouse input); the last one to
//!   [`stop_dragging`](PointerBroker::stop_dragging) removes them.
//!
//! So the move/up pair is installed exactly while at least one session is dragging, no matter how
//! many sessions exist.
//!
//! ## Notifications and subscriptions
//!
//! Starting and stopping queue [`BrokerNotice`]s which the engine drains after each input call,
//! letting zones and containers react to any drag. Observers then subscribe to the specific
//! session's [`Channels`]; [`PointerBroker::observers`] lists them in subscription order.

use std::collections::VecDeque;

use crate::host::{GlobalListeners, Host, InputKind};
use crate::slots::{ContainerId, SessionId, ZoneId};

bitflags::bitflags! {
    /// Session notification channels an observer can subscribe to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Channels: u8 {
        /// `Started`.
        const STARTED  = 0b0001;
        /// `Moved`.
        const MOVED    = 0b0010;
        /// `Released`.
        const RELEASED = 0b0100;
        /// `Ended`.
        const ENDED    = 0b1000;
    }
}

/// Something that subscribes to a session's notifications.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Observer {
    /// A drop zone.
    Zone(ZoneId),
    /// A sortable container.
    Container(ContainerId),
    /// An application observer created with [`PointerBroker::observe_external`].
    External(u32),
}

/// Session start/stop notifications.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BrokerNotice {
    /// A session began dragging (pointer went down on it).
    SessionStarted(SessionId),
    /// A session stopped dragging.
    SessionStopped(SessionId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Subscription {
    observer: Observer,
    session: SessionId,
    channels: Channels,
}

/// Reference-counted owner of the global pointer listeners.
#[derive(Debug, Default)]
pub struct PointerBroker {
    registered: Vec<SessionId>,
    active: Vec<(SessionId, InputKind)>,
    installed: GlobalListeners,
    subscriptions: Vec<Subscription>,
    notices: VecDeque<BrokerNotice>,
    next_external: u32,
}

impl PointerBroker {
    /// Create a broker with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a session for its whole lifetime.
    pub fn register<H: Host + ?Sized>(&mut self, host: &mut H, session: SessionId) {
        if self.registered.contains(&session) {
            return;
        }
        self.registered.push(session);
        if self.registered.len() == 1 {
            host.listen(GlobalListeners::TOUCH_MOVE, InputKind::Touch);
            self.installed |= GlobalListeners::TOUCH_MOVE;
        }
    }

    /// Forget a session: stop it if it is dragging and drop every subscription to it.
    pub fn unregister<H: Host + ?Sized>(&mut self, host: &mut H, session: SessionId) {
        self.stop_dragging(host, session);
        self.subscriptions.retain(|s| s.session != session);
        let before = self.registered.len();
        self.registered.retain(|s| *s != session);
        if before > 0 && self.registered.is_empty() {
            host.unlisten(GlobalListeners::TOUCH_MOVE);
            self.installed.remove(GlobalListeners::TOUCH_MOVE);
        }
    }

    /// Returns true if `session` is registered.
    pub fn is_registered(&self, session: SessionId) -> bool {
        self.registered.contains(&session)
    }

    /// Mark `session` as dragging, installing the shared listeners if it is the first.
    pub fn start_dragging<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        session: SessionId,
        input: InputKind,
    ) {
        if self.is_dragging(session) {
            return;
        }
        self.active.push((session, input));
        if self.active.len() == 1 {
            let listeners = match input {
                InputKind::Mouse => GlobalListeners::DRAG,
                InputKind::Touch => GlobalListeners::DRAG - GlobalListeners::WHEEL,
            };
            host.listen(listeners, input);
            self.installed |= listeners;
            tracing::debug!(?session, ?input, ?listeners, "installed drag listeners");
        }
        self.notices.push_back(BrokerNotice::SessionStarted(session));
    }

    /// Mark `session` as no longer dragging, removing the shared listeners if it was the last.
    pub fn stop_dragging<H: Host + ?Sized>(&mut self, host: &mut H, session: SessionId) {
        let Some(pos) = self.active.iter().position(|(s, _)| *s == session) else {
            return;
        };
        self.active.remove(pos);
        if self.active.is_empty() {
            let listeners = self.installed & GlobalListeners::DRAG;
            if !listeners.is_empty() {
                host.unlisten(listeners);
                self.installed.remove(listeners);
                tracing::debug!(?session, ?listeners, "removed drag listeners");
            }
        }
        self.notices.push_back(BrokerNotice::SessionStopped(session));
    }

    /// Returns true if `session` is currently dragging.
    pub fn is_dragging(&self, session: SessionId) -> bool {
        self.active.iter().any(|(s, _)| *s == session)
    }

    /// Sessions currently dragging, in the order they started.
    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.active.iter().map(|(s, _)| *s).collect()
    }

    /// Listeners currently installed on the host.
    pub fn installed(&self) -> GlobalListeners {
        self.installed
    }

    /// Whether the host should prevent the default action of an event delivered to `listener`.
    ///
    /// Text selection is suppressed during any drag, wheel scrolling during mouse drags and
    /// touch scrolling during touch drags.
    pub fn prevents_default(&self, listener: GlobalListeners) -> bool {
        if self.active.is_empty() || !self.installed.contains(listener) {
            return false;
        }
        if listener == GlobalListeners::SELECT_START || listener == GlobalListeners::WHEEL {
            true
        } else if listener == GlobalListeners::TOUCH_MOVE {
            self.active.iter().any(|(_, input)| *input == InputKind::Touch)
        } else {
            false
        }
    }

    /// Take the oldest pending notice.
    pub fn pop_notice(&mut self) -> Option<BrokerNotice> {
        self.notices.pop_front()
    }

    /// Subscribe `observer` to `channels` of `session`, replacing an existing subscription of
    /// the same pair.
    pub fn subscribe(&mut self, observer: Observer, session: SessionId, channels: Channels) {
        if let Some(sub) = self
            .subscriptions
            .iter_mut()
            .find(|s| s.observer == observer && s.session == session)
        {
            sub.channels = channels;
        } else {
            self.subscriptions.push(Subscription {
                observer,
                session,
                channels,
            });
        }
    }

    /// Remove the subscription of `observer` to `session`.
    pub fn unsubscribe(&mut self, observer: Observer, session: SessionId) {
        self.subscriptions
            .retain(|s| !(s.observer == observer && s.session == session));
    }

    /// Remove every subscription held by `observer`.
    pub fn unsubscribe_observer(&mut self, observer: Observer) {
        self.subscriptions.retain(|s| s.observer != observer);
    }

    /// Returns true if `observer` is subscribed to any channel of `session`.
    pub fn is_subscribed(&self, observer: Observer, session: SessionId) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.observer == observer && s.session == session)
    }

    /// Returns true if anyone subscribed to `channel` of `session`.
    pub fn has_observers(&self, session: SessionId, channel: Channels) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.session == session && s.channels.intersects(channel))
    }

    /// Observers of `channel` of `session`, in subscription order.
    pub fn observers(&self, session: SessionId, channel: Channels) -> Vec<Observer> {
        self.subscriptions
            .iter()
            .filter(|s| s.session == session && s.channels.intersects(channel))
            .map(|s| s.observer)
            .collect()
    }

    /// Create an application observer subscribed to the moves of `session`.
    pub fn observe_external(&mut self, session: SessionId) -> Observer {
        let observer = Observer::External(self.next_external);
        self.next_external = self.next_external.wrapping_add(1);
        self.subscribe(observer, session, Channels::MOVED);
        observer
    }
}
