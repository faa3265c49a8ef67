use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    animation::ease::Ease,
    compose::stage::{ElementId, Stage},
    foundation::error::{DotError, DotResult},
    foundation::math::lerp,
    scene::{
        Scene,
        dot::{Dot, DotAttrs, DotField},
        registry::MAX_PARENT_DEPTH,
        target::Target,
    },
};

/// One interpolation record: drive `target` from `from` to `to` over
/// `[start, start + duration]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    /// Property being driven.
    pub target: Target,
    /// Start value; `None` continues from the previous tween on the same target, or
    /// from the scene value when the timeline is sealed.
    #[serde(default)]
    pub from: Option<f64>,
    /// End value.
    pub to: f64,
    /// Start time in timeline units.
    pub start: f64,
    /// Duration in timeline units (`>= 0`).
    pub duration: f64,
    /// Easing applied to normalized progress.
    #[serde(default)]
    pub ease: Ease,
}

impl Tween {
    /// Tween toward `to`, continuing from whatever value the target holds.
    pub fn new(target: Target, to: f64, start: f64, duration: f64, ease: Ease) -> Self {
        Self {
            target,
            from: None,
            to,
            start,
            duration,
            ease,
        }
    }

    /// Pin the start value.
    pub fn from_value(mut self, from: f64) -> Self {
        self.from = Some(from);
        self
    }

    /// End time.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Eased value at `time` given the resolved start value.
    pub fn value_at(&self, from: f64, time: f64) -> f64 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let p = ((time - self.start) / self.duration).clamp(0.0, 1.0);
        lerp(from, self.to, self.ease.apply(p))
    }

    fn validate(&self) -> DotResult<()> {
        let finite = self.to.is_finite()
            && self.start.is_finite()
            && self.duration.is_finite()
            && self.from.is_none_or(f64::is_finite);
        if !finite {
            return Err(DotError::validation(format!(
                "tween on {:?} has non-finite values",
                self.target
            )));
        }
        if self.duration < 0.0 {
            return Err(DotError::validation(format!(
                "tween on {:?} has negative duration",
                self.target
            )));
        }
        Ok(())
    }
}

/// Entity lifecycle change scheduled on the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CueAction {
    /// Create a dynamic dot.
    Spawn {
        /// Dot id.
        id: String,
        /// Attributes merged over defaults.
        #[serde(default)]
        attrs: DotAttrs,
    },
    /// Remove a dynamic dot.
    Despawn {
        /// Dot id.
        id: String,
    },
}

impl CueAction {
    /// Dot id this cue manages.
    pub fn id(&self) -> &str {
        match self {
            Self::Spawn { id, .. } | Self::Despawn { id } => id,
        }
    }
}

/// A [`CueAction`] at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Time the action takes effect.
    pub at: f64,
    /// What happens.
    pub action: CueAction,
}

#[derive(Clone, Debug)]
struct Track {
    target: Target,
    /// Tween indices ordered by start.
    tweens: Vec<usize>,
    /// Resolved start value per entry of `tweens`.
    froms: Vec<f64>,
}

/// Explicit tween scheduler advanced by [`Timeline::tick`].
///
/// Ticking is scrub-safe: the scene is made to reflect `time` regardless of the
/// previous tick, so scrolling backward restores earlier values and removes dots
/// spawned later.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
    cues: Vec<Cue>,
    tracks: Vec<Track>,
    cue_ids: BTreeMap<String, Vec<usize>>,
    sealed: bool,
    halted: bool,
    time: Option<f64>,
}

impl Timeline {
    /// Empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tween. Unseals the timeline.
    pub fn push_tween(&mut self, tween: Tween) {
        self.tweens.push(tween);
        self.sealed = false;
    }

    /// Append a cue. Unseals the timeline.
    pub fn push_cue(&mut self, at: f64, action: CueAction) {
        self.cues.push(Cue { at, action });
        self.sealed = false;
    }

    /// Tweens in their current order (start order once sealed).
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Cues in their current order (time order once sealed).
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Latest tween end or cue time; `0` for an empty timeline.
    pub fn duration(&self) -> f64 {
        let tweens = self.tweens.iter().map(Tween::end);
        let cues = self.cues.iter().map(|c| c.at);
        tweens.chain(cues).fold(0.0, f64::max)
    }

    /// Time of the last applied tick.
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    /// Return `true` once [`Timeline::seal`] succeeded and nothing was pushed since.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Stop reacting to ticks.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Return `true` after [`Timeline::halt`].
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Validate records and resolve every missing `from` against `scene`.
    #[tracing::instrument(skip_all, fields(tweens = self.tweens.len(), cues = self.cues.len()))]
    pub fn seal(&mut self, scene: &Scene) -> DotResult<()> {
        for t in &self.tweens {
            t.validate()?;
        }
        for c in &self.cues {
            if c.action.id().trim().is_empty() {
                return Err(DotError::validation(format!(
                    "cue at {} has an empty dot id",
                    c.at
                )));
            }
            if !c.at.is_finite() {
                return Err(DotError::validation(format!(
                    "cue for '{}' has non-finite time",
                    c.action.id()
                )));
            }
            if let CueAction::Spawn { id, attrs } = &c.action {
                attrs
                    .validate()
                    .map_err(|e| DotError::validation(format!("spawn cue '{id}': {e}")))?;
            }
        }

        self.tweens.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.cues.sort_by(|a, b| a.at.total_cmp(&b.at));

        let mut cue_ids: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, c) in self.cues.iter().enumerate() {
            cue_ids.entry(c.action.id().to_owned()).or_default().push(i);
        }
        for (id, idxs) in &cue_ids {
            if scene.dots.get(id).is_some_and(|d| d.anchor) {
                return Err(DotError::validation(format!(
                    "anchor dot '{id}' cannot be spawned or despawned by cues"
                )));
            }
            if !matches!(self.cues[idxs[0]].action, CueAction::Spawn { .. }) {
                return Err(DotError::validation(format!(
                    "first cue for '{id}' must spawn it"
                )));
            }
        }
        self.check_spawn_parents(scene)?;
        self.cue_ids = cue_ids;

        let mut by_target: BTreeMap<Target, Vec<usize>> = BTreeMap::new();
        for (i, t) in self.tweens.iter().enumerate() {
            by_target.entry(t.target.clone()).or_default().push(i);
        }
        let mut tracks = Vec::with_capacity(by_target.len());
        for (target, tweens) in by_target {
            let baseline = self.baseline(&target, scene).ok_or_else(|| {
                DotError::validation(format!("tween targets unknown dot in {target:?}"))
            })?;
            let froms = self.resolve_froms(&tweens, baseline);
            tracks.push(Track {
                target,
                tweens,
                froms,
            });
        }
        self.tracks = tracks;
        self.sealed = true;
        tracing::debug!(
            tracks = self.tracks.len(),
            duration = self.duration(),
            "timeline sealed"
        );
        Ok(())
    }

    /// Make `scene` reflect timeline time `time`. Seals on first use; no-op once halted.
    pub fn tick(&mut self, time: f64, scene: &mut Scene, stage: &mut dyn Stage) -> DotResult<()> {
        if self.halted {
            return Ok(());
        }
        if !time.is_finite() {
            return Err(DotError::animation("tick time must be finite"));
        }
        if !self.sealed {
            self.seal(scene)?;
        }

        for (id, idxs) in &self.cue_ids {
            let k = idxs.partition_point(|&i| self.cues[i].at <= time);
            let live = k
                .checked_sub(1)
                .map(|j| &self.cues[idxs[j]].action)
                .and_then(|a| match a {
                    CueAction::Spawn { attrs, .. } => Some(attrs),
                    CueAction::Despawn { .. } => None,
                });
            match live {
                Some(attrs) if !scene.dots.contains(id) => {
                    scene.dots.create(id, attrs.clone(), None, stage)?;
                }
                None if scene.dots.contains(id) => {
                    scene.dots.remove(id, stage);
                }
                _ => {}
            }
        }

        for track in &self.tracks {
            let k = track
                .tweens
                .partition_point(|&i| self.tweens[i].start <= time);
            let v = match k.checked_sub(1) {
                None => track.froms[0],
                Some(j) => self.tweens[track.tweens[j]].value_at(track.froms[j], time),
            };
            if !scene.write(&track.target, v) {
                tracing::trace!(prop = ?track.target, "tween target not present");
            }
        }

        self.time = Some(time);
        Ok(())
    }

    /// Value `target` would hold at `time` given the tweens pushed so far.
    pub fn sample(&self, target: &Target, time: f64, scene: &Scene) -> Option<f64> {
        let baseline = self.baseline(target, scene)?;
        let mut idxs: Vec<usize> = (0..self.tweens.len())
            .filter(|&i| &self.tweens[i].target == target)
            .collect();
        idxs.sort_by(|&a, &b| self.tweens[a].start.total_cmp(&self.tweens[b].start));
        if idxs.is_empty() {
            return Some(baseline);
        }
        let froms = self.resolve_froms(&idxs, baseline);
        let k = idxs.partition_point(|&i| self.tweens[i].start <= time);
        Some(match k.checked_sub(1) {
            None => froms[0],
            Some(j) => self.tweens[idxs[j]].value_at(froms[j], time),
        })
    }

    /// State dot `id` would have at `time` given the tweens and cues pushed so far.
    pub fn dot_snapshot(&self, id: &str, time: f64, scene: &Scene) -> Option<Dot> {
        let mut dot = match scene.dots.get(id) {
            Some(d) => d.clone(),
            None => {
                let attrs = self.spawn_attrs(id, time)?;
                Dot::new(id, attrs.clone(), ElementId(u64::MAX), false)
            }
        };
        for field in DotField::ALL {
            let target = Target::dot(id, field);
            if self.tweens.iter().any(|t| t.target == target) {
                if let Some(v) = self.sample(&target, time, scene) {
                    field.set(&mut dot, v);
                }
            }
        }
        Some(dot)
    }

    /// Return `true` when some cue spawns `id`.
    pub fn spawns(&self, id: &str) -> bool {
        self.cues
            .iter()
            .any(|c| matches!(&c.action, CueAction::Spawn { id: s, .. } if s == id))
    }

    /// Attributes of the latest spawn of `id` at or before `time`, else its first spawn.
    fn spawn_attrs(&self, id: &str, time: f64) -> Option<&DotAttrs> {
        let mut first = None;
        let mut latest: Option<(f64, &DotAttrs)> = None;
        for c in &self.cues {
            if let CueAction::Spawn { id: s, attrs } = &c.action {
                if s != id {
                    continue;
                }
                if first.is_none_or(|(at, _)| c.at < at) {
                    first = Some((c.at, attrs));
                }
                if c.at <= time && latest.is_none_or(|(at, _)| c.at >= at) {
                    latest = Some((c.at, attrs));
                }
            }
        }
        latest.or(first).map(|(_, a)| a)
    }

    /// Reject spawn cues whose parent chain, through scene dots and other spawn cues,
    /// loops back to the spawned dot or runs deeper than [`MAX_PARENT_DEPTH`].
    fn check_spawn_parents(&self, scene: &Scene) -> DotResult<()> {
        let mut parents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for dot in scene.dots.iter() {
            if let Some(p) = dot.parent.as_deref() {
                parents.entry(dot.id.as_str()).or_default().push(p);
            }
        }
        for c in &self.cues {
            if let CueAction::Spawn { id, attrs } = &c.action {
                if let Some(p) = attrs.parent.as_deref() {
                    parents.entry(id.as_str()).or_default().push(p);
                }
            }
        }

        for c in &self.cues {
            let CueAction::Spawn { id, attrs } = &c.action else {
                continue;
            };
            let Some(parent) = attrs.parent.as_deref() else {
                continue;
            };
            let mut pending = vec![(parent, 1)];
            while let Some((p, depth)) = pending.pop() {
                if p == id {
                    return Err(DotError::validation(format!(
                        "spawn cue '{id}' would make the dot its own ancestor"
                    )));
                }
                if depth > MAX_PARENT_DEPTH {
                    return Err(DotError::validation(format!(
                        "spawn cue '{id}' parent chain exceeds depth {MAX_PARENT_DEPTH}"
                    )));
                }
                if let Some(next) = parents.get(p) {
                    pending.extend(next.iter().map(|&n| (n, depth + 1)));
                }
            }
        }
        Ok(())
    }

    fn baseline(&self, target: &Target, scene: &Scene) -> Option<f64> {
        if let Some(v) = scene.read(target) {
            return Some(v);
        }
        let Target::Dot { id, field } = target else {
            return None;
        };
        let attrs = self.spawn_attrs(id, f64::NEG_INFINITY)?;
        let dot = Dot::new(id.as_str(), attrs.clone(), ElementId(u64::MAX), false);
        Some(field.get(&dot))
    }

    fn resolve_froms(&self, idxs: &[usize], baseline: f64) -> Vec<f64> {
        let mut prev = baseline;
        idxs.iter()
            .map(|&i| {
                let t = &self.tweens[i];
                let from = t.from.unwrap_or(prev);
                prev = t.to;
                from
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/timeline.rs"]
mod tests;
