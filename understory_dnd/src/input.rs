// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input delivered by the host.

use core::time::Duration;

use kurbo::Point;

use crate::host::InputKind;

/// Mouse button that produced a mouse event.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MouseButton {
    /// Primary (usually left) button.
    Primary,
    /// Middle button or wheel press.
    Middle,
    /// Secondary (usually right) button.
    Secondary,
}

/// Source of a pointer event.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointerInput {
    /// Mouse input with the button involved.
    Mouse(MouseButton),
    /// Touch input.
    Touch,
}

impl PointerInput {
    /// The listener family this input uses.
    pub const fn kind(self) -> InputKind {
        match self {
            Self::Mouse(_) => InputKind::Mouse,
            Self::Touch => InputKind::Touch,
        }
    }

    /// Returns true for mouse buttons other than the primary one.
    pub const fn is_auxiliary(self) -> bool {
        matches!(self, Self::Mouse(MouseButton::Middle | MouseButton::Secondary))
    }
}

/// A pointer sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent<E> {
    /// Input source.
    pub input: PointerInput,
    /// Page-space position (client position plus scroll offset).
    pub page: Point,
    /// Element the host hit-tested the event to, if any.
    pub target: Option<E>,
    /// Host timestamp, monotonic.
    pub timestamp: Duration,
}

impl<E> PointerEvent<E> {
    /// A primary-button mouse event.
    pub fn mouse(page: Point, target: Option<E>, timestamp: Duration) -> Self {
        Self {
            input: PointerInput::Mouse(MouseButton::Primary),
            page,
            target,
            timestamp,
        }
    }

    /// A touch event.
    pub fn touch(page: Point, target: Option<E>, timestamp: Duration) -> Self {
        Self {
            input: PointerInput::Touch,
            page,
            target,
            timestamp,
        }
    }

    /// Replace the mouse button (no effect on touch events).
    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        if let PointerInput::Mouse(_) = self.input {
            self.input = PointerInput::Mouse(button);
        }
        self
    }
}
