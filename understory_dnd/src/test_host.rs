// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A layout-free [`Host`] for unit tests: rectangles are fixed at creation and only move by
//! translation or by being attached to the overlay.

use core::time::Duration;

use kurbo::{Point, Rect, Size, Vec2};

use crate::host::{GlobalListeners, HelperTemplate, Host, InputKind};

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    parent: Option<u32>,
    children: Vec<u32>,
    rect: Rect,
    translation: Vec2,
    hidden: bool,
    overlay: bool,
    classes: Vec<String>,
    element: bool,
    alive: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockHost {
    nodes: Vec<Node>,
    pub(crate) installed: GlobalListeners,
    pub(crate) scroll: Vec2,
    pub(crate) transition: Duration,
    pub(crate) templates: Vec<(HelperTemplate, Size)>,
}

impl MockHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add an element with a fixed client rectangle.
    pub(crate) fn add(&mut self, parent: Option<u32>, tag: &str, rect: Rect) -> u32 {
        let id = self.push(Node {
            tag: tag.into(),
            parent,
            children: Vec::new(),
            rect,
            translation: Vec2::ZERO,
            hidden: false,
            overlay: parent.is_none(),
            classes: Vec::new(),
            element: true,
            alive: true,
        });
        if let Some(p) = parent {
            self.nodes[p as usize].children.push(id);
        }
        id
    }

    pub(crate) fn add_text(&mut self, parent: u32) -> u32 {
        let id = self.add(Some(parent), "#text", Rect::ZERO);
        self.nodes[id as usize].element = false;
        id
    }

    fn push(&mut self, node: Node) -> u32 {
        self.nodes.push(node);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Tests create a handful of nodes."
        )]
        let id = (self.nodes.len() - 1) as u32;
        id
    }

    pub(crate) fn has_class(&self, node: u32, class: &str) -> bool {
        self.nodes[node as usize].classes.iter().any(|c| c == class)
    }

    pub(crate) fn is_hidden(&self, node: u32) -> bool {
        self.nodes[node as usize].hidden
    }

    pub(crate) fn is_alive(&self, node: u32) -> bool {
        self.nodes[node as usize].alive
    }

    pub(crate) fn children(&self, node: u32) -> &[u32] {
        &self.nodes[node as usize].children
    }

    pub(crate) fn add_class(&mut self, node: u32, class: &str) {
        self.set_class(node, class, true);
    }

    fn unlink(&mut self, node: u32) {
        if let Some(p) = self.nodes[node as usize].parent.take() {
            self.nodes[p as usize].children.retain(|c| *c != node);
        }
        self.nodes[node as usize].overlay = false;
    }
}

impl Host for MockHost {
    type Element = u32;

    fn is_element(&self, node: u32) -> bool {
        self.nodes[node as usize].element
    }

    fn bounding_rect(&self, element: u32) -> Rect {
        let node = &self.nodes[element as usize];
        if node.hidden || !node.alive || (node.parent.is_none() && !node.overlay) {
            return Rect::ZERO;
        }
        node.rect + node.translation
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn transition_duration(&self, _element: u32) -> Duration {
        self.transition
    }

    fn parent(&self, element: u32) -> Option<u32> {
        self.nodes[element as usize].parent
    }

    fn next_sibling(&self, element: u32) -> Option<u32> {
        let parent = self.nodes[element as usize].parent?;
        let siblings = &self.nodes[parent as usize].children;
        let idx = siblings.iter().position(|c| *c == element)?;
        siblings.get(idx + 1).copied()
    }

    fn matches_selector(&self, element: u32, selector: &str) -> bool {
        let node = &self.nodes[element as usize];
        match selector.strip_prefix('.') {
            Some(class) => node.classes.iter().any(|c| c == class),
            None => node.tag == selector,
        }
    }

    fn insert_before(&mut self, parent: u32, node: u32, reference: Option<u32>) {
        self.unlink(node);
        let children = &mut self.nodes[parent as usize].children;
        let at = reference
            .and_then(|r| children.iter().position(|c| *c == r))
            .unwrap_or(children.len());
        children.insert(at, node);
        self.nodes[node as usize].parent = Some(parent);
    }

    fn append_to_overlay(&mut self, node: u32) {
        self.unlink(node);
        let n = &mut self.nodes[node as usize];
        n.overlay = true;
        n.rect = Rect::from_origin_size(Point::ZERO, n.rect.size());
    }

    fn detach(&mut self, node: u32) {
        self.unlink(node);
    }

    fn destroy(&mut self, node: u32) {
        self.unlink(node);
        self.nodes[node as usize].alive = false;
    }

    fn clone_node(&mut self, node: u32) -> u32 {
        let mut copy = self.nodes[node as usize].clone();
        copy.parent = None;
        copy.children = Vec::new();
        copy.overlay = false;
        self.push(copy)
    }

    fn translation(&self, element: u32) -> Vec2 {
        self.nodes[element as usize].translation
    }

    fn set_translation(&mut self, element: u32, translation: Vec2) {
        self.nodes[element as usize].translation = translation;
    }

    fn set_hidden(&mut self, element: u32, hidden: bool) {
        self.nodes[element as usize].hidden = hidden;
    }

    fn set_size(&mut self, element: u32, size: Size) {
        let n = &mut self.nodes[element as usize];
        n.rect = Rect::from_origin_size(n.rect.origin(), size);
    }

    fn set_class(&mut self, element: u32, class: &str, enabled: bool) {
        let classes = &mut self.nodes[element as usize].classes;
        classes.retain(|c| c != class);
        if enabled {
            classes.push(class.into());
        }
    }

    fn render_template(&mut self, template: HelperTemplate) -> Option<u32> {
        let size = self
            .templates
            .iter()
            .find(|(t, _)| *t == template)
            .map(|(_, s)| *s)?;
        let id = self.add(None, "template", Rect::from_origin_size(Point::ZERO, size));
        self.nodes[id as usize].overlay = false;
        Some(id)
    }

    fn listen(&mut self, listeners: GlobalListeners, _input: InputKind) {
        self.installed |= listeners;
    }

    fn unlisten(&mut self, listeners: GlobalListeners) {
        self.installed.remove(listeners);
    }
}
