// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, layout, queries and the host interface.

use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

use kurbo::{Point, Rect, Size, Vec2};
use understory_dnd::host::{GlobalListeners, HelperTemplate, Host, InputKind};

use crate::types::{ElementFlags, ElementId, Layout, Style};

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    id_attr: Option<String>,
    classes: Vec<String>,
    flags: ElementFlags,
    style: Style,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    translation: Vec2,
    transition: Duration,
    measured: Size,
    rect: Rect,
}

impl Node {
    fn new(tag: &str, style: Style) -> Self {
        Self {
            tag: tag.into(),
            id_attr: None,
            classes: Vec::new(),
            flags: ElementFlags::default(),
            style,
            parent: None,
            children: Vec::new(),
            translation: Vec2::ZERO,
            transition: Duration::ZERO,
            measured: Size::ZERO,
            rect: Rect::ZERO,
        }
    }

    fn is_hidden(&self) -> bool {
        self.flags.contains(ElementFlags::HIDDEN)
    }
}

/// A retained element tree with a document root and an overlay layer.
///
/// Layout runs eagerly after every structural or size change, so geometry queries always
/// reflect the current tree. Translations are applied on top of layout and never move
/// siblings.
pub struct Scene {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    body: ElementId,
    overlay: ElementId,
    scroll: Vec2,
    templates: Vec<(String, Size)>,
    installed: GlobalListeners,
    listen_input: Option<InputKind>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("scroll", &self.scroll)
            .field("installed", &self.installed)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create a scene whose document and overlay both span `viewport`.
    pub fn new(viewport: Size) -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            body: ElementId::new(0, 0),
            overlay: ElementId::new(0, 0),
            scroll: Vec2::ZERO,
            templates: Vec::new(),
            installed: GlobalListeners::empty(),
            listen_input: None,
        };
        let root_style = Style {
            size: Some(viewport),
            ..Style::default()
        };
        scene.body = scene.alloc(Node::new("body", root_style.clone()));
        scene.overlay = scene.alloc(Node::new("overlay", root_style));
        scene.relayout();
        scene
    }

    fn alloc(&mut self, node: Node) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(node);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(node));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        ElementId::new(idx, generation)
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        if self.generations.get(id.idx()) != Some(&id.1) {
            return None;
        }
        self.nodes.get(id.idx())?.as_ref()
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        if self.generations.get(id.idx()) != Some(&id.1) {
            return None;
        }
        self.nodes.get_mut(id.idx())?.as_mut()
    }

    /// The document root.
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// The layer previews and other floating elements are appended to.
    pub fn overlay(&self) -> ElementId {
        self.overlay
    }

    /// Returns true if `id` refers to a live element or text node.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.node(id).is_some()
    }

    // --- Construction ---

    /// Insert an element as the last child of `parent` (the document root if `None`).
    pub fn insert(&mut self, parent: Option<ElementId>, tag: &str, style: Style) -> ElementId {
        let id = self.alloc(Node::new(tag, style));
        let parent = parent.unwrap_or(self.body);
        self.link(parent, id, None);
        self.relayout();
        id
    }

    /// Insert a container sized to fit its children.
    pub fn insert_element(
        &mut self,
        parent: Option<ElementId>,
        tag: &str,
        layout: Layout,
    ) -> ElementId {
        self.insert(
            parent,
            tag,
            Style {
                layout,
                ..Style::default()
            },
        )
    }

    /// Insert a fixed-size element.
    pub fn insert_sized(&mut self, parent: Option<ElementId>, tag: &str, size: Size) -> ElementId {
        self.insert(
            parent,
            tag,
            Style {
                size: Some(size),
                ..Style::default()
            },
        )
    }

    /// Insert a fixed-size element at `rect`, relative to a [`Layout::Free`] parent.
    pub fn insert_at(&mut self, parent: Option<ElementId>, tag: &str, rect: Rect) -> ElementId {
        self.insert(
            parent,
            tag,
            Style {
                size: Some(rect.size()),
                offset: rect.origin().to_vec2(),
                ..Style::default()
            },
        )
    }

    /// Insert a text node; text nodes have no box and cannot carry behaviors.
    pub fn insert_text(&mut self, parent: ElementId) -> ElementId {
        let mut node = Node::new("#text", Style::default());
        node.flags = ElementFlags::empty();
        let id = self.alloc(node);
        self.link(parent, id, None);
        id
    }

    /// Remove an element and its subtree.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.body || id == self.overlay {
            return;
        }
        self.unlink(id);
        self.free_subtree(id);
        self.relayout();
    }

    fn free_subtree(&mut self, id: ElementId) {
        if self.node(id).is_none() {
            return;
        }
        let Some(node) = self.nodes.get_mut(id.idx()).and_then(Option::take) else {
            return;
        };
        self.free_list.push(id.idx());
        for child in node.children {
            self.free_subtree(child);
        }
    }

    fn link(&mut self, parent: ElementId, child: ElementId, reference: Option<ElementId>) {
        if self.node(parent).is_none() || self.node(child).is_none() || parent == child {
            return;
        }
        self.unlink(child);
        if let Some(p) = self.node_mut(parent) {
            let at = reference
                .and_then(|r| p.children.iter().position(|c| *c == r))
                .unwrap_or(p.children.len());
            p.children.insert(at, child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn unlink(&mut self, id: ElementId) {
        let Some(parent) = self.node_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
    }

    // --- Attributes ---

    /// Set the element's `id` attribute.
    pub fn set_id(&mut self, element: ElementId, id: &str) {
        if let Some(n) = self.node_mut(element) {
            n.id_attr = Some(id.into());
        }
    }

    /// The element's `id` attribute.
    pub fn id_attr(&self, element: ElementId) -> Option<&str> {
        self.node(element)?.id_attr.as_deref()
    }

    /// The element's tag.
    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|n| n.tag.as_str())
    }

    /// Add a class to the element.
    pub fn add_class(&mut self, element: ElementId, class: &str) {
        self.set_class(element, class, true);
    }

    /// Returns true if the element carries `class`.
    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Returns true if the element itself is hidden.
    pub fn is_hidden(&self, element: ElementId) -> bool {
        self.node(element).is_some_and(Node::is_hidden)
    }

    /// Flags of the element.
    pub fn flags(&self, element: ElementId) -> Option<ElementFlags> {
        self.node(element).map(|n| n.flags)
    }

    /// Children of the element, in document order.
    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.node(element).map_or(&[], |n| n.children.as_slice())
    }

    /// Change how the element lays out its children.
    pub fn set_layout(&mut self, element: ElementId, layout: Layout) {
        if let Some(n) = self.node_mut(element) {
            n.style.layout = layout;
        }
        self.relayout();
    }

    /// Set the duration of transform transitions on the element.
    pub fn set_transition(&mut self, element: ElementId, duration: Duration) {
        if let Some(n) = self.node_mut(element) {
            n.transition = duration;
        }
    }

    /// Scroll the page.
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = scroll;
    }

    /// Register a helper template rendering an element with `tag` and `size`.
    pub fn register_template(&mut self, tag: &str, size: Size) -> HelperTemplate {
        self.templates.push((tag.into(), size));
        HelperTemplate((self.templates.len() - 1) as u64)
    }

    /// Global listeners currently installed.
    pub fn listeners(&self) -> GlobalListeners {
        self.installed
    }

    /// Input kind the move/up listeners were last installed for.
    pub fn listen_input(&self) -> Option<InputKind> {
        self.listen_input
    }

    // --- Queries ---

    fn is_attached(&self, element: ElementId) -> bool {
        let mut cur = Some(element);
        while let Some(id) = cur {
            if id == self.body || id == self.overlay {
                return true;
            }
            cur = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    /// Deepest visible element of the document (not the overlay) containing `pt`.
    ///
    /// Later siblings are on top of earlier ones.
    pub fn hit_test(&self, pt: Point) -> Option<ElementId> {
        self.hit_test_from(self.body, pt)
    }

    fn hit_test_from(&self, id: ElementId, pt: Point) -> Option<ElementId> {
        let node = self.node(id)?;
        if !node.flags.contains(ElementFlags::ELEMENT) || node.is_hidden() {
            return None;
        }
        for child in node.children.iter().rev() {
            if let Some(hit) = self.hit_test_from(*child, pt) {
                return Some(hit);
            }
        }
        let rect = self.bounding_rect(id);
        (rect.x0 <= pt.x && pt.x <= rect.x1 && rect.y0 <= pt.y && pt.y <= rect.y1).then_some(id)
    }

    fn matches_compound(node: &Node, selector: &str) -> bool {
        let selector = selector.trim();
        if selector.is_empty() {
            return false;
        }
        let tag_end = selector.find(['.', '#']).unwrap_or(selector.len());
        let (tag, mut qualifiers) = selector.split_at(tag_end);
        if !tag.is_empty() && tag != "*" && tag != node.tag {
            return false;
        }
        while let Some(kind) = qualifiers.chars().next() {
            let rest = &qualifiers[1..];
            let end = rest.find(['.', '#']).unwrap_or(rest.len());
            let (name, next) = rest.split_at(end);
            let matched = match kind {
                '.' => node.classes.iter().any(|c| c == name),
                _ => node.id_attr.as_deref() == Some(name),
            };
            if name.is_empty() || !matched {
                return false;
            }
            qualifiers = next;
        }
        true
    }

    // --- Layout ---

    fn relayout(&mut self) {
        for root in [self.body, self.overlay] {
            self.measure(root);
            self.place(root, Point::ZERO);
        }
    }

    fn measure(&mut self, id: ElementId) -> Size {
        let Some(node) = self.node(id) else {
            return Size::ZERO;
        };
        let (hidden, children, style) =
            (node.is_hidden(), node.children.clone(), node.style.clone());
        if hidden {
            if let Some(n) = self.node_mut(id) {
                n.measured = Size::ZERO;
            }
            return Size::ZERO;
        }
        let mut sizes = Vec::with_capacity(children.len());
        for child in &children {
            let size = self.measure(*child);
            let offset = self.node(*child).map_or(Vec2::ZERO, |n| n.style.offset);
            sizes.push((size, offset));
        }
        let visible = || sizes.iter().filter(|(s, _)| *s != Size::ZERO);
        let count = visible().count();
        let gaps = |gap: f64| gap * count.saturating_sub(1) as f64;
        let size = style.size.unwrap_or_else(|| match style.layout {
            Layout::Free => visible().fold(Size::ZERO, |acc, (s, o)| {
                Size::new(acc.width.max(o.x + s.width), acc.height.max(o.y + s.height))
            }),
            Layout::Stack { vertical: true, gap } => Size::new(
                visible().fold(0.0, |w, (s, _)| f64::max(w, s.width)),
                visible().map(|(s, _)| s.height).sum::<f64>() + gaps(gap),
            ),
            Layout::Stack {
                vertical: false,
                gap,
            }
            | Layout::Inline { gap } => Size::new(
                visible().map(|(s, _)| s.width).sum::<f64>() + gaps(gap),
                visible().fold(0.0, |h, (s, _)| f64::max(h, s.height)),
            ),
        });
        if let Some(n) = self.node_mut(id) {
            n.measured = size;
        }
        size
    }

    fn place(&mut self, id: ElementId, origin: Point) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        node.rect = Rect::from_origin_size(origin, node.measured);
        let width = node.measured.width;
        let layout = node.style.layout;
        let children = node.children.clone();

        let mut cursor = origin;
        let mut row_height = 0.0_f64;
        for child in children {
            let Some(c) = self.node(child) else {
                continue;
            };
            let (size, offset, hidden) = (c.measured, c.style.offset, c.is_hidden());
            let at = match layout {
                Layout::Free => origin + offset,
                _ if hidden => cursor,
                Layout::Stack { vertical, gap } => {
                    let at = cursor;
                    if vertical {
                        cursor.y += size.height + gap;
                    } else {
                        cursor.x += size.width + gap;
                    }
                    at
                }
                Layout::Inline { gap } => {
                    if cursor.x > origin.x && cursor.x + size.width > origin.x + width {
                        cursor = Point::new(origin.x, cursor.y + row_height + gap);
                        row_height = 0.0;
                    }
                    let at = cursor;
                    cursor.x += size.width + gap;
                    row_height = row_height.max(size.height);
                    at
                }
            };
            self.place(child, at);
        }
    }
}

impl Host for Scene {
    type Element = ElementId;

    fn is_element(&self, node: ElementId) -> bool {
        self.node(node)
            .is_some_and(|n| n.flags.contains(ElementFlags::ELEMENT))
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        if !self.is_attached(element) {
            return Rect::ZERO;
        }
        let Some(node) = self.node(element) else {
            return Rect::ZERO;
        };
        let mut translation = Vec2::ZERO;
        let mut cur = Some(element);
        while let Some(id) = cur {
            let Some(n) = self.node(id) else {
                break;
            };
            if n.is_hidden() {
                return Rect::ZERO;
            }
            translation += n.translation;
            cur = n.parent;
        }
        node.rect + translation
    }

    fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }

    fn transition_duration(&self, element: ElementId) -> Duration {
        self.node(element).map_or(Duration::ZERO, |n| n.transition)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element)?.parent
    }

    fn next_sibling(&self, element: ElementId) -> Option<ElementId> {
        let siblings = &self.node(self.node(element)?.parent?)?.children;
        let idx = siblings.iter().position(|c| *c == element)?;
        siblings.get(idx + 1).copied()
    }

    fn matches_selector(&self, element: ElementId, selector: &str) -> bool {
        let Some(node) = self.node(element) else {
            return false;
        };
        node.flags.contains(ElementFlags::ELEMENT)
            && selector
                .split(',')
                .any(|part| Self::matches_compound(node, part))
    }

    fn is_inline_flow(&self, container: ElementId) -> bool {
        self.node(container)
            .is_some_and(|n| matches!(n.style.layout, Layout::Inline { .. }))
    }

    fn insert_before(&mut self, parent: ElementId, node: ElementId, reference: Option<ElementId>) {
        self.link(parent, node, reference);
        self.relayout();
    }

    fn append_to_overlay(&mut self, node: ElementId) {
        if let Some(n) = self.node_mut(node) {
            n.style.offset = Vec2::ZERO;
        }
        self.link(self.overlay, node, None);
        self.relayout();
    }

    fn detach(&mut self, node: ElementId) {
        self.unlink(node);
        self.relayout();
    }

    fn destroy(&mut self, node: ElementId) {
        self.remove(node);
    }

    fn clone_node(&mut self, node: ElementId) -> ElementId {
        let Some(source) = self.node(node) else {
            return node;
        };
        let mut copy = source.clone();
        let children = core::mem::take(&mut copy.children);
        copy.parent = None;
        copy.id_attr = None;
        let id = self.alloc(copy);
        for child in children {
            let cloned = self.clone_node(child);
            self.link(id, cloned, None);
        }
        self.measure(id);
        id
    }

    fn translation(&self, element: ElementId) -> Vec2 {
        self.node(element).map_or(Vec2::ZERO, |n| n.translation)
    }

    fn set_translation(&mut self, element: ElementId, translation: Vec2) {
        if let Some(n) = self.node_mut(element) {
            n.translation = translation;
        }
    }

    fn set_hidden(&mut self, element: ElementId, hidden: bool) {
        if let Some(n) = self.node_mut(element) {
            n.flags.set(ElementFlags::HIDDEN, hidden);
        }
        self.relayout();
    }

    fn set_size(&mut self, element: ElementId, size: Size) {
        if let Some(n) = self.node_mut(element) {
            n.style.size = Some(size);
        }
        self.relayout();
    }

    fn set_class(&mut self, element: ElementId, class: &str, enabled: bool) {
        if let Some(n) = self.node_mut(element) {
            n.classes.retain(|c| c != class);
            if enabled {
                n.classes.push(class.into());
            }
        }
    }

    fn set_native_drag_interactions(&mut self, element: ElementId, enabled: bool) {
        if let Some(n) = self.node_mut(element) {
            n.flags.set(ElementFlags::NATIVE_DRAG, enabled);
        }
    }

    fn render_template(&mut self, template: HelperTemplate) -> Option<ElementId> {
        let index = usize::try_from(template.0).ok()?;
        let (tag, size) = self.templates.get(index)?.clone();
        let mut node = Node::new(
            &tag,
            Style {
                size: Some(size),
                ..Style::default()
            },
        );
        node.measured = size;
        node.rect = Rect::from_origin_size(Point::ZERO, size);
        Some(self.alloc(node))
    }

    fn listen(&mut self, listeners: GlobalListeners, input: InputKind) {
        self.installed |= listeners;
        if listeners.intersects(GlobalListeners::DRAG) {
            self.listen_input = Some(input);
        }
    }

    fn unlisten(&mut self, listeners: GlobalListeners) {
        self.installed.remove(listeners);
    }
}
