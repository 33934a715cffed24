use crate::model::task::{SubtaskKey, TaskId};
use crate::ops::state_store::AppState;
use crate::util::time_fmt::format_elapsed;

use super::geometry::{CellMetrics, Point, PxRect};

/// Rows taken by a card's header line (the drag grab affordance)
pub const HEADER_ROWS: usize = 1;
/// Blank rows between consecutive cards
pub const CARD_GAP_ROWS: usize = 1;

/// A displayed subtask row
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub key: SubtaskKey,
    pub title: String,
    pub time_text: String,
    /// Horizontal shift of the row's foreground, applied by swipes
    pub offset_x: f32,
    /// Height fixed for the duration of a swipe
    pub pinned_height: Option<f32>,
}

/// A displayed task card
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub task_id: TaskId,
    pub title: String,
    pub rows: Vec<RowView>,
    /// Taken out of layout while a drag proxy stands in for it
    pub hidden: bool,
}

/// One in-flow entry of the visual list
#[derive(Debug, Clone, PartialEq)]
pub enum ListNode {
    Card(CardView),
    /// Reserves the dragged card's slot and size
    Placeholder { task_id: TaskId, height: f32 },
}

/// Lifted copy of a dragged card, drawn above the list at its own position
#[derive(Debug, Clone, PartialEq)]
pub struct Proxy {
    pub card: CardView,
    pub origin: PxRect,
    pub offset_y: f32,
}

impl Proxy {
    pub fn rect(&self) -> PxRect {
        PxRect {
            y: self.origin.y + self.offset_y,
            ..self.origin
        }
    }
}

/// Laid-out position of `nodes[index]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub index: usize,
    pub rect: PxRect,
}

/// What a pointer landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Header(TaskId),
    Row(SubtaskKey),
}

/// Retained visual representation of the task list.
///
/// Full renders rebuild it from the store; incremental renders patch time
/// text in place; gestures shift rows and move the placeholder and proxy.
/// Painting only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    nodes: Vec<ListNode>,
    proxy: Option<Proxy>,
    scroll_y: f32,
    width: f32,
    viewport_h: f32,
    metrics: CellMetrics,
}

impl ListView {
    pub fn new(metrics: CellMetrics) -> Self {
        ListView {
            nodes: Vec::new(),
            proxy: None,
            scroll_y: 0.0,
            width: 80.0 * metrics.cell_w,
            viewport_h: 24.0 * metrics.cell_h,
            metrics,
        }
    }

    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    pub fn nodes(&self) -> &[ListNode] {
        &self.nodes
    }

    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Visible area size in pixels
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.width = width;
        self.viewport_h = height;
        self.clamp_scroll();
    }

    // -----------------------------------------------------------------------
    // Rebuild and patch
    // -----------------------------------------------------------------------

    /// Replace every node with a fresh card per task, dropping any drag
    /// visuals. Scroll position is kept where the content allows.
    pub fn rebuild(&mut self, state: &AppState) {
        self.nodes = state
            .tasks()
            .map(|task| {
                ListNode::Card(CardView {
                    task_id: task.id,
                    title: task.title.clone(),
                    rows: task
                        .subtasks
                        .iter()
                        .map(|st| RowView {
                            key: task.key(st),
                            title: st.title.clone(),
                            time_text: format_elapsed(st.elapsed_ms),
                            offset_x: 0.0,
                            pinned_height: None,
                        })
                        .collect(),
                    hidden: false,
                })
            })
            .collect();
        self.proxy = None;
        self.clamp_scroll();
    }

    /// Replace a row's time text. Returns true if the text changed.
    pub fn patch_time(&mut self, key: SubtaskKey, text: &str) -> bool {
        match self.row_mut(key) {
            Some(row) if row.time_text != text => {
                row.time_text.clear();
                row.time_text.push_str(text);
                true
            }
            _ => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &RowView> {
        self.cards().flat_map(|c| c.rows.iter())
    }

    pub fn row(&self, key: SubtaskKey) -> Option<&RowView> {
        self.card(key.task_id)?.rows.iter().find(|r| r.key == key)
    }

    fn row_mut(&mut self, key: SubtaskKey) -> Option<&mut RowView> {
        self.card_mut(key.task_id)?
            .rows
            .iter_mut()
            .find(|r| r.key == key)
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardView> {
        self.nodes.iter().filter_map(|n| match n {
            ListNode::Card(c) => Some(c),
            ListNode::Placeholder { .. } => None,
        })
    }

    pub fn card(&self, task_id: TaskId) -> Option<&CardView> {
        self.cards().find(|c| c.task_id == task_id)
    }

    fn card_mut(&mut self, task_id: TaskId) -> Option<&mut CardView> {
        self.nodes.iter_mut().find_map(|n| match n {
            ListNode::Card(c) if c.task_id == task_id => Some(c),
            _ => None,
        })
    }

    /// Task ids in current visual order
    pub fn card_order(&self) -> Vec<TaskId> {
        self.cards().map(|c| c.task_id).collect()
    }

    // -----------------------------------------------------------------------
    // Swipe support
    // -----------------------------------------------------------------------

    /// Shift a row's foreground. Returns false if the row is gone.
    pub fn set_row_offset(&mut self, key: SubtaskKey, dx: f32) -> bool {
        match self.row_mut(key) {
            Some(row) => {
                row.offset_x = dx;
                true
            }
            None => false,
        }
    }

    /// Fix a row's height at its current measured height
    pub fn pin_row_height(&mut self, key: SubtaskKey) -> bool {
        let cell_h = self.metrics.cell_h;
        match self.row_mut(key) {
            Some(row) => {
                row.pinned_height = Some(row.pinned_height.unwrap_or(cell_h));
                true
            }
            None => false,
        }
    }

    pub fn unpin_row_height(&mut self, key: SubtaskKey) -> bool {
        match self.row_mut(key) {
            Some(row) => {
                row.pinned_height = None;
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    fn row_height(&self, row: &RowView) -> f32 {
        row.pinned_height.unwrap_or(self.metrics.cell_h)
    }

    fn card_height(&self, card: &CardView) -> f32 {
        self.metrics.rows_px(HEADER_ROWS)
            + card.rows.iter().map(|r| self.row_height(r)).sum::<f32>()
    }

    fn node_height(&self, node: &ListNode) -> f32 {
        match node {
            ListNode::Card(c) if c.hidden => 0.0,
            ListNode::Card(c) => self.card_height(c),
            ListNode::Placeholder { height, .. } => *height,
        }
    }

    /// Boxes of every in-flow node, top to bottom, in viewport coordinates.
    /// Hidden cards take no space.
    pub fn layout(&self) -> Vec<NodeBox> {
        let gap = self.metrics.rows_px(CARD_GAP_ROWS);
        let mut y = -self.scroll_y;
        let mut boxes = Vec::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            let h = self.node_height(node);
            if h <= 0.0 {
                continue;
            }
            boxes.push(NodeBox {
                index,
                rect: PxRect::new(0.0, y, self.width, h),
            });
            y += h + gap;
        }
        boxes
    }

    fn content_height(&self) -> f32 {
        let gap = self.metrics.rows_px(CARD_GAP_ROWS);
        let heights: Vec<f32> = self
            .nodes
            .iter()
            .map(|n| self.node_height(n))
            .filter(|h| *h > 0.0)
            .collect();
        heights.iter().sum::<f32>() + gap * heights.len().saturating_sub(1) as f32
    }

    pub fn card_rect(&self, task_id: TaskId) -> Option<PxRect> {
        self.layout().into_iter().find_map(|b| match &self.nodes[b.index] {
            ListNode::Card(c) if c.task_id == task_id => Some(b.rect),
            _ => None,
        })
    }

    /// Find the card header or row under `p`. Placeholders, gaps and hidden
    /// cards hit nothing.
    pub fn hit_test(&self, p: Point) -> Option<Hit> {
        let b = self
            .layout()
            .into_iter()
            .find(|b| b.rect.contains_y(p.y))?;
        let card = match &self.nodes[b.index] {
            ListNode::Card(c) => c,
            ListNode::Placeholder { .. } => return None,
        };
        let mut y = b.rect.y + self.metrics.rows_px(HEADER_ROWS);
        if p.y < y {
            return Some(Hit::Header(card.task_id));
        }
        for row in &card.rows {
            y += self.row_height(row);
            if p.y < y {
                return Some(Hit::Row(row.key));
            }
        }
        None
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_y += dy;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max = (self.content_height() - self.viewport_h).max(0.0);
        self.scroll_y = self.scroll_y.clamp(0.0, max);
    }

    // -----------------------------------------------------------------------
    // Drag support
    // -----------------------------------------------------------------------

    /// Lift a card: insert a same-sized placeholder right after it, hide it,
    /// and create a proxy at its current box. Returns that box.
    pub fn lift_card(&mut self, task_id: TaskId) -> Option<PxRect> {
        if self.proxy.is_some() {
            return None;
        }
        let rect = self.card_rect(task_id)?;
        let index = self.card_index(task_id)?;
        let card = self.card_mut(task_id)?;
        card.hidden = true;
        let lifted = CardView {
            hidden: false,
            ..card.clone()
        };
        self.nodes.insert(
            index + 1,
            ListNode::Placeholder {
                task_id,
                height: rect.h,
            },
        );
        self.proxy = Some(Proxy {
            card: lifted,
            origin: rect,
            offset_y: 0.0,
        });
        Some(rect)
    }

    pub fn set_proxy_offset(&mut self, dy: f32) {
        if let Some(proxy) = &mut self.proxy {
            proxy.offset_y = dy;
        }
    }

    pub fn proxy_center_y(&self) -> Option<f32> {
        self.proxy.as_ref().map(|p| p.rect().center_y())
    }

    /// Move the placeholder to sit just before the first visible card whose
    /// vertical centre lies below `center_y`, or to the end if none does.
    /// Returns true if the placeholder changed slot.
    pub fn move_placeholder_for(&mut self, center_y: f32) -> bool {
        let target = self
            .layout()
            .into_iter()
            .find_map(|b| match &self.nodes[b.index] {
                ListNode::Card(c) if !c.hidden && b.rect.center_y() > center_y => {
                    Some(c.task_id)
                }
                _ => None,
            });
        let Some(from) = self.placeholder_index() else {
            return false;
        };
        let placeholder = self.nodes.remove(from);
        let to = target
            .and_then(|id| self.card_index(id))
            .unwrap_or(self.nodes.len());
        self.nodes.insert(to, placeholder);
        to != from
    }

    /// Put the lifted card back where the placeholder stands, show it, and
    /// drop the proxy and placeholder. Returns the card's id.
    pub fn settle_card(&mut self) -> Option<TaskId> {
        let ph = self.placeholder_index()?;
        let task_id = match &self.nodes[ph] {
            ListNode::Placeholder { task_id, .. } => *task_id,
            ListNode::Card(_) => return None,
        };
        self.proxy = None;
        let Some(from) = self.card_index(task_id) else {
            self.nodes.remove(ph);
            return None;
        };
        let mut node = self.nodes.remove(from);
        if let ListNode::Card(card) = &mut node {
            card.hidden = false;
        }
        let ph = self.placeholder_index()?;
        self.nodes[ph] = node;
        Some(task_id)
    }

    /// Abandon a lift: the card never left its slot, so it is shown again and
    /// the proxy and placeholder are dropped.
    pub fn unlift_card(&mut self) {
        self.proxy = None;
        self.nodes
            .retain(|n| !matches!(n, ListNode::Placeholder { .. }));
        for node in &mut self.nodes {
            if let ListNode::Card(card) = node {
                card.hidden = false;
            }
        }
    }

    pub fn placeholder_index(&self) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| matches!(n, ListNode::Placeholder { .. }))
    }

    fn card_index(&self, task_id: TaskId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| matches!(n, ListNode::Card(c) if c.task_id == task_id))
    }
}
