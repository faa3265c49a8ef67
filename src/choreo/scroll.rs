use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{DotError, DotResult},
    foundation::math::lerp,
};

/// A scroll range scrubbing a slice of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerRegion {
    /// Scroll offset where the region starts, in pixels.
    pub start_px: f64,
    /// Scroll offset where the region ends, in pixels.
    pub end_px: f64,
    /// Timeline time at `start_px`.
    pub from_time: f64,
    /// Timeline time at `end_px`.
    pub to_time: f64,
}

/// Maps page scroll offset to timeline time through ordered trigger regions.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScrollMap {
    regions: Vec<TriggerRegion>,
}

impl ScrollMap {
    /// Validate and build a map. Regions must be finite, non-overlapping, in increasing
    /// scroll order, and never move time backward.
    pub fn new(regions: Vec<TriggerRegion>) -> DotResult<Self> {
        let mut prev: Option<&TriggerRegion> = None;
        for r in &regions {
            let finite = [r.start_px, r.end_px, r.from_time, r.to_time]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                return Err(DotError::validation("trigger region values must be finite"));
            }
            if r.end_px < r.start_px {
                return Err(DotError::validation("trigger region end_px must be >= start_px"));
            }
            if r.to_time < r.from_time {
                return Err(DotError::validation("trigger region to_time must be >= from_time"));
            }
            if let Some(p) = prev {
                if r.start_px < p.end_px {
                    return Err(DotError::validation("trigger regions must not overlap"));
                }
                if r.from_time < p.to_time {
                    return Err(DotError::validation(
                        "trigger regions must not move time backward",
                    ));
                }
            }
            prev = Some(r);
        }
        Ok(Self { regions })
    }

    /// Single region mapping `[0, span_px]` onto `[0, duration]`.
    pub fn linear(span_px: f64, duration: f64) -> DotResult<Self> {
        Self::new(vec![TriggerRegion {
            start_px: 0.0,
            end_px: span_px,
            from_time: 0.0,
            to_time: duration,
        }])
    }

    /// Regions in scroll order.
    pub fn regions(&self) -> &[TriggerRegion] {
        &self.regions
    }

    /// Timeline time for a scroll offset.
    ///
    /// Inside a region time is interpolated linearly; between regions it holds the
    /// previous region's end; before the first region it is that region's start.
    pub fn time_at(&self, scroll_px: f64) -> f64 {
        let Some(first) = self.regions.first() else {
            return 0.0;
        };
        if !scroll_px.is_finite() {
            return first.from_time;
        }
        let mut held = first.from_time;
        for r in &self.regions {
            if scroll_px < r.start_px {
                return held;
            }
            if scroll_px <= r.end_px {
                let span = r.end_px - r.start_px;
                if span <= 0.0 {
                    return r.to_time;
                }
                let t = (scroll_px - r.start_px) / span;
                return lerp(r.from_time, r.to_time, t);
            }
            held = r.to_time;
        }
        held
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/scroll.rs"]
mod tests;
