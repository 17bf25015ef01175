//! Timeline strip: lays merged ticks out across terminal columns and draws
//! them as colored segments.

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use tickline_core::model::{Bucket, StatusKind, Tick};

use super::theme::theme;

const BODY: &str = "█";
const ROUND_LEFT: &str = "▐";
const ROUND_RIGHT: &str = "▌";
const GAP: &str = "·";

/// Timestamp span of the bucket sequence the ticks were merged from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketRange {
    pub first_ts: i64,
    pub step: i64,
    pub count: usize,
}

impl BucketRange {
    pub fn of(buckets: &[Bucket]) -> Option<Self> {
        let first = buckets.first()?;
        let step = match buckets.get(1) {
            Some(second) if second.ts > first.ts => second.ts - first.ts,
            _ => 1,
        };
        Some(Self {
            first_ts: first.ts,
            step,
            count: buckets.len(),
        })
    }

    fn index_of(&self, ts: i64) -> u64 {
        ((ts - self.first_ts) / self.step).max(0) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub x: u16,
    pub width: u16,
    pub status: StatusKind,
    pub rounded_left: bool,
    pub rounded_right: bool,
}

/// Column span for each tick. Every tick gets at least one column, and
/// segments never overlap; ticks that fall past the right edge are dropped.
pub fn layout(ticks: &[Tick], range: &BucketRange, cols: u16) -> Vec<Segment> {
    if cols == 0 || range.count == 0 {
        return Vec::new();
    }

    let total = range.count as u64;
    let cols64 = u64::from(cols);
    let mut segments = Vec::with_capacity(ticks.len());
    let mut next_free = 0u64;

    for tick in ticks {
        let start = (range.index_of(tick.start_ts) * cols64 / total).max(next_free);
        let end = ((range.index_of(tick.end_ts) + 1) * cols64 / total).min(cols64);
        if start >= cols64 {
            break;
        }
        let end = end.max(start + 1);

        segments.push(Segment {
            x: start as u16,
            width: (end - start) as u16,
            status: tick.status(),
            rounded_left: tick.rounded_left,
            rounded_right: tick.rounded_right,
        });
        next_free = end;
    }

    segments
}

pub struct TimelineStrip<'a> {
    ticks: &'a [Tick],
    range: BucketRange,
}

impl<'a> TimelineStrip<'a> {
    pub fn new(ticks: &'a [Tick], range: BucketRange) -> Self {
        Self { ticks, range }
    }
}

impl Widget for TimelineStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let y = area.y + area.height / 2;

        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(GAP).set_fg(theme().palette.text_muted);
            }
        }

        for segment in layout(self.ticks, &self.range, area.width) {
            let color = theme().status_color(segment.status);
            let last = segment.width - 1;
            for offset in 0..segment.width {
                let symbol = if segment.width > 1 && offset == 0 && segment.rounded_left {
                    ROUND_LEFT
                } else if segment.width > 1 && offset == last && segment.rounded_right {
                    ROUND_RIGHT
                } else {
                    BODY
                };
                if let Some(cell) = buf.cell_mut((area.x + segment.x + offset, y)) {
                    cell.set_symbol(symbol).set_fg(color);
                }
            }
        }
    }
}
