//! Bar timeline: the ordered strip of bars that scrolls across the surface.
//!
//! Bars are kept oldest-first, so the tail is always the right-most bar. New
//! recorded bars enter at the right edge, every bar drifts left by the scroll
//! speed each tick, and a bar is dropped as soon as its trailing edge leaves
//! the surface.

/// What a bar represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    /// Seeded before any audio arrived; drawn as a flat dot and never grows
    Placeholder,
    /// Derived from a real amplitude reading; grows toward its target height
    Recorded,
}

/// One visual segment of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Left edge, in surface units
    pub position: f64,
    pub width: f64,
    pub current_height: f64,
    pub target_height: f64,
    /// Creation timestamp in milliseconds
    pub created_at: f64,
    pub kind: BarKind,
}

impl Bar {
    fn placeholder(position: f64, width: f64) -> Self {
        Self {
            position,
            width,
            current_height: 0.0,
            target_height: 0.0,
            created_at: 0.0,
            kind: BarKind::Placeholder,
        }
    }

    fn recorded(position: f64, width: f64, target_height: f64, created_at: f64) -> Self {
        Self {
            position,
            width,
            current_height: 0.0,
            target_height,
            created_at,
            kind: BarKind::Recorded,
        }
    }

    /// Right-hand edge of the bar.
    pub fn trailing_edge(&self) -> f64 {
        self.position + self.width
    }

    pub fn is_recorded(&self) -> bool {
        self.kind == BarKind::Recorded
    }
}

/// Ordered, scrolling collection of bars.
#[derive(Debug, Clone)]
pub struct BarTimeline {
    bars: Vec<Bar>,
    bar_width: f64,
    bar_gap: f64,
}

impl BarTimeline {
    /// Creates an empty timeline with the given bar geometry.
    pub fn new(bar_width: f64, bar_gap: f64) -> Self {
        Self {
            bars: Vec::new(),
            bar_width,
            bar_gap,
        }
    }

    /// Distance between the left edges of two neighbouring bars.
    pub fn spacing(&self) -> f64 {
        self.bar_width + self.bar_gap
    }

    /// Discards every bar and lays placeholders across the surface.
    ///
    /// Placeholders start at offset 0 and repeat every `bar_width + bar_gap`
    /// while the offset is still inside the surface. Re-seeding is a full reset.
    pub fn seed_placeholders(&mut self, surface_width: f64, bar_width: f64, bar_gap: f64) {
        self.bar_width = bar_width;
        self.bar_gap = bar_gap;
        self.bars.clear();

        let step = self.spacing();
        if step <= 0.0 {
            return;
        }

        let mut index = 0u32;
        loop {
            let offset = f64::from(index) * step;
            if offset >= surface_width {
                break;
            }
            self.bars.push(Bar::placeholder(offset, bar_width));
            index += 1;
        }
    }

    /// Left edge a newly appended bar would get.
    pub fn append_position(&self, surface_width: f64) -> f64 {
        surface_width - self.bar_width
    }

    /// Returns true when a new bar fits at the right edge.
    ///
    /// The tail bar, whatever its kind, must sit a full spacing to the left of
    /// the append position. This keeps positions strictly increasing and
    /// recorded bars at least `bar_width + bar_gap` apart.
    pub fn has_room(&self, surface_width: f64) -> bool {
        match self.bars.last() {
            Some(tail) => self.append_position(surface_width) - tail.position >= self.spacing(),
            None => true,
        }
    }

    /// Appends a recorded bar at the right edge if there is room.
    ///
    /// The bar starts flat and grows toward `target_height` as
    /// [`update_heights`](Self::update_heights) is called.
    pub fn try_append(&mut self, target_height: f64, now: f64, surface_width: f64) -> bool {
        if !self.has_room(surface_width) {
            return false;
        }

        let position = self.append_position(surface_width);
        self.bars.push(Bar::recorded(
            position,
            self.bar_width,
            target_height.max(0.0),
            now,
        ));
        true
    }

    /// Scrolls every bar left and drops the ones that left the surface.
    ///
    /// Returns how many bars were removed.
    pub fn advance_and_cull(&mut self, scroll_speed: f64) -> usize {
        for bar in &mut self.bars {
            bar.position -= scroll_speed;
        }

        let before = self.bars.len();
        self.bars.retain(|bar| bar.trailing_edge() >= 0.0);
        before - self.bars.len()
    }

    /// Moves every recorded bar along its growth curve.
    ///
    /// `ease` maps linear progress in `[0, 1]` to eased progress in `[0, 1]`.
    /// A non-positive `expand_duration` completes the growth immediately.
    pub fn update_heights<F>(&mut self, now: f64, expand_duration: f64, ease: F)
    where
        F: Fn(f64) -> f64,
    {
        for bar in self.bars.iter_mut().filter(|bar| bar.is_recorded()) {
            let progress = if expand_duration > 0.0 {
                ((now - bar.created_at) / expand_duration).clamp(0.0, 1.0)
            } else {
                1.0
            };

            let height = bar.target_height * ease(progress);
            bar.current_height = height
                .max(bar.current_height)
                .max(0.0)
                .min(bar.target_height);
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Number of bars built from real samples.
    pub fn recorded_count(&self) -> usize {
        self.bars.iter().filter(|bar| bar.is_recorded()).count()
    }
}
