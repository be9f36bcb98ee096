// ── Map geometry and device links ──

use serde::{Deserialize, Serialize};

/// A point on the map canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `(0,0)` and `(1,1)` mark a line endpoint that was never drawn.
    pub fn is_sentinel(&self) -> bool {
        let at = |v: f64| (self.x - v).abs() < f64::EPSILON && (self.y - v).abs() < f64::EPSILON;
        at(0.0) || at(1.0)
    }
}

/// One segment of a drawn link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

/// Upstream RF link from a Sensor or Repeater to a Radio or Repeater.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RfLink {
    pub dst_id: String,
    pub lines: Vec<Line>,
}

impl RfLink {
    pub fn new(dst_id: impl Into<String>, lines: Vec<Line>) -> Self {
        Self {
            dst_id: dst_id.into(),
            lines,
        }
    }

    /// A link counts only when it names a target and has real geometry.
    pub fn is_drawn(&self) -> bool {
        !self.dst_id.is_empty()
            && !self.lines.is_empty()
            && !self.lines.iter().any(|l| l.b.is_sentinel())
    }
}

/// Contact-closure link from a Sensor to a channel on a CC card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CcLink {
    pub dst_id: String,
    pub lines: Vec<Line>,
}

impl CcLink {
    pub fn new(dst_id: impl Into<String>) -> Self {
        Self {
            dst_id: dst_id.into(),
            lines: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_to(x: f64, y: f64) -> Line {
        Line {
            a: Point::new(40.0, 40.0),
            b: Point::new(x, y),
        }
    }

    #[test]
    fn drawn_link_needs_target_and_geometry() {
        assert!(RfLink::new("SPP0", vec![line_to(120.0, 80.0)]).is_drawn());
        assert!(!RfLink::new("", vec![line_to(120.0, 80.0)]).is_drawn());
        assert!(!RfLink::new("SPP0", Vec::new()).is_drawn());
    }

    #[test]
    fn sentinel_endpoints_mean_undrawn() {
        assert!(!RfLink::new("SPP0", vec![line_to(0.0, 0.0)]).is_drawn());
        assert!(!RfLink::new("SPP0", vec![line_to(1.0, 1.0)]).is_drawn());
        assert!(RfLink::new("SPP0", vec![line_to(1.0, 0.0)]).is_drawn());
    }
}
