use std::time::{Duration, Instant};

/// Inputs that fully determine card heights. When these are unchanged the
/// cached anchors are still valid and recomputation is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsKey {
    pub width: u16,
    pub item_count: usize,
    /// Item with an open dropdown and the rows that dropdown takes
    pub expanded: Option<(usize, u16)>,
}

/// Linear scroll from one row to another
#[derive(Debug, Clone, Copy)]
pub struct ScrollAnimation {
    from: usize,
    to: usize,
    started: Instant,
    duration: Duration,
    /// Item to focus once the animation lands
    focus: Option<usize>,
}

impl ScrollAnimation {
    fn position(&self, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.started);
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let from = self.from as f64;
        let to = self.to as f64;
        (from + (to - from) * t).round() as usize
    }

    fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

/// Maps the scroll position of the queue pane to a current item.
///
/// Rows are pane rows: card `i` occupies `tops[i]..tops[i] + heights[i]` and
/// its anchor is the vertical midpoint.
#[derive(Debug, Default)]
pub struct Viewport {
    tops: Vec<usize>,
    heights: Vec<usize>,
    anchors: Vec<usize>,
    key: Option<MetricsKey>,
    recomputes: usize,

    /// Rows scrolled off the top of the pane
    pub page_top: usize,
    animation: Option<ScrollAnimation>,
    dirty: bool,
    last_scan: Option<Instant>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Metrics ──

    pub fn needs_metrics(&self, key: &MetricsKey) -> bool {
        self.key.as_ref() != Some(key)
    }

    /// Recompute tops and anchors from card heights, O(n)
    pub fn set_metrics(&mut self, key: MetricsKey, heights: Vec<usize>) {
        self.tops.clear();
        self.anchors.clear();
        let mut top = 0usize;
        for h in &heights {
            self.tops.push(top);
            self.anchors.push(top + h / 2);
            top += h;
        }
        self.heights = heights;
        self.key = Some(key);
        self.recomputes += 1;
        tracing::trace!(items = self.anchors.len(), recomputes = self.recomputes, "anchors recomputed");
        self.page_top = self.page_top.min(self.max_scroll());
    }

    /// Forget the cached key so the next metrics pass always recomputes
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// How many times anchors were actually recomputed
    #[cfg(test)]
    pub fn recomputes(&self) -> usize {
        self.recomputes
    }

    pub fn container_height(&self) -> usize {
        self.tops
            .last()
            .zip(self.heights.last())
            .map(|(t, h)| t + h)
            .unwrap_or(0)
    }

    pub fn top(&self, index: usize) -> Option<usize> {
        self.tops.get(index).copied()
    }

    #[cfg(test)]
    pub fn anchors(&self) -> &[usize] {
        &self.anchors
    }

    // ── Current item ──

    /// Item whose anchor is the first at or below the pane top, scanning
    /// outward from `current`. `None` on an empty queue.
    pub fn current_visible_index(&self, current: usize) -> Option<usize> {
        scan_from(&self.anchors, self.page_top, current)
    }

    /// Card under a pane row, with the row offset inside that card
    pub fn item_at_row(&self, row: usize) -> Option<(usize, usize)> {
        let absolute = self.page_top + row;
        if absolute >= self.container_height() {
            return None;
        }
        let index = self.tops.partition_point(|top| *top <= absolute).checked_sub(1)?;
        Some((index, absolute - self.tops[index]))
    }

    // ── Scrolling ──

    pub fn max_scroll(&self) -> usize {
        self.container_height().saturating_sub(1)
    }

    /// Offset for `Paragraph::scroll`
    pub fn scroll_offset(&self) -> u16 {
        u16::try_from(self.page_top).unwrap_or(u16::MAX)
    }

    /// Manual scroll. Cancels any running animation.
    pub fn scroll_by(&mut self, delta: isize) {
        self.animation = None;
        let target = if delta < 0 {
            self.page_top.saturating_sub(delta.unsigned_abs())
        } else {
            self.page_top.saturating_add(delta as usize)
        };
        self.set_page_top(target);
    }

    /// Jump straight to `row` without animating
    pub fn jump_to(&mut self, row: usize) {
        self.animation = None;
        self.set_page_top(row);
    }

    /// Start a smooth scroll to `row`, focusing `focus` when it lands
    pub fn scroll_to(&mut self, row: usize, duration: Duration, focus: Option<usize>, now: Instant) {
        let to = row.min(self.max_scroll());
        self.animation = Some(ScrollAnimation {
            from: self.page_top,
            to,
            started: now,
            duration,
            focus,
        });
        self.dirty = true;
    }

    /// Advance the animation. Returns the item to focus when it completes.
    pub fn step(&mut self, now: Instant) -> Option<usize> {
        let animation = self.animation?;
        self.set_page_top(animation.position(now));
        if animation.finished(now) {
            self.animation = None;
            if animation.focus.is_some() {
                // landing focus wins over a scan at the final position
                self.dirty = false;
            }
            return animation.focus;
        }
        None
    }

    fn set_page_top(&mut self, row: usize) {
        let row = row.min(self.max_scroll());
        if row != self.page_top {
            self.dirty = true;
        }
        self.page_top = row;
    }

    /// Throttle gate for the current-item scan: true at most once per
    /// `throttle`, and only after the scroll position moved.
    pub fn take_due(&mut self, now: Instant, throttle: Duration) -> bool {
        if !self.dirty {
            return false;
        }
        if let Some(last) = self.last_scan {
            if now.saturating_duration_since(last) < throttle {
                return false;
            }
        }
        self.dirty = false;
        self.last_scan = Some(now);
        true
    }
}

/// Local scan outward from `current` over strictly increasing anchors.
///
/// Scrolled up past the current anchor: walk back while anchors are still at
/// or below `page_top` and land one past the first that is above it.
/// Otherwise walk forward to the first anchor at or below `page_top`.
/// Either walk clamps at the ends of the queue.
pub fn scan_from(anchors: &[usize], page_top: usize, current: usize) -> Option<usize> {
    let last = anchors.len().checked_sub(1)?;
    let current = current.min(last);

    if page_top <= anchors[current] {
        let mut i = current;
        while i > 0 && anchors[i - 1] >= page_top {
            i -= 1;
        }
        Some(i)
    } else {
        let mut i = current;
        while i < last && page_top > anchors[i] {
            i += 1;
        }
        Some(i)
    }
}
