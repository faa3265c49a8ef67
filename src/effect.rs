use crate::{
    choreo::{scroll::ScrollMap, timeline::Timeline},
    compose::{
        compositor::{Compositor, Frame},
        stage::{HostEvent, ListenerId, Stage},
    },
    config::EffectConfig,
    foundation::core::Layout,
    foundation::error::DotResult,
    scene::Scene,
};

/// A running logo effect: scene, choreography and the listeners it holds on a stage.
///
/// Built by [`LogoEffect::init`], driven by [`LogoEffect::on_scroll`] and
/// [`LogoEffect::on_resize`], and torn down by [`LogoEffect::cleanup`].
#[derive(Debug)]
pub struct LogoEffect {
    scene: Scene,
    compositor: Compositor,
    timeline: Timeline,
    scroll: ScrollMap,
    layout: Layout,
    listeners: Vec<ListenerId>,
    scroll_px: f64,
    frame: Frame,
    active: bool,
}

impl LogoEffect {
    /// Bind anchors, build the choreography and render the frame for scroll offset 0.
    ///
    /// Returns `Ok(None)` without touching the stage when an anchor element is missing.
    #[tracing::instrument(skip_all, fields(anchors = config.anchors.len()))]
    pub fn init(
        config: &EffectConfig,
        stage: &mut dyn Stage,
        layout: Layout,
    ) -> DotResult<Option<Self>> {
        config.validate()?;

        let mut bound = Vec::with_capacity(config.anchors.len());
        for anchor in &config.anchors {
            let Some(element) = stage.find_anchor(&anchor.element) else {
                tracing::warn!(
                    element = %anchor.element,
                    "anchor element missing, effect disabled"
                );
                return Ok(None);
            };
            bound.push((anchor, element));
        }

        let mut scene = Scene::new(config.ellipse);
        for (anchor, element) in bound {
            let attrs = anchor
                .attrs
                .clone()
                .with_palette_defaults(config.palette.primary, config.palette.accent);
            scene
                .dots
                .create(&anchor.dot_id, attrs, Some(element), stage)?;
        }

        let (timeline, scroll) = config.choreography().build(&scene)?;

        let mut effect = Self {
            scene,
            compositor: Compositor::new(config.tuning),
            timeline,
            scroll,
            layout,
            listeners: Vec::new(),
            scroll_px: 0.0,
            frame: Frame::default(),
            active: true,
        };
        // Listeners are registered only once the first frame is on the stage.
        if let Err(e) = effect.on_scroll(0.0, stage) {
            effect.cleanup(stage);
            return Err(e);
        }
        effect.listeners = vec![
            stage.listen(HostEvent::Resize),
            stage.listen(HostEvent::Scroll),
        ];
        tracing::debug!(
            dots = effect.scene.dots.len(),
            duration = effect.timeline.duration(),
            "effect initialized"
        );
        Ok(Some(effect))
    }

    /// Map a scroll offset to timeline time, advance the timeline and render.
    ///
    /// Does nothing after [`LogoEffect::cleanup`].
    pub fn on_scroll(&mut self, scroll_px: f64, stage: &mut dyn Stage) -> DotResult<&Frame> {
        if !self.active {
            return Ok(&self.frame);
        }
        self.scroll_px = scroll_px;
        let time = self.scroll.time_at(scroll_px);
        self.timeline.tick(time, &mut self.scene, stage)?;
        self.frame = self.compositor.render(&mut self.scene, &self.layout, stage);
        Ok(&self.frame)
    }

    /// Store a new layout and re-render the current state.
    pub fn on_resize(&mut self, layout: Layout, stage: &mut dyn Stage) -> &Frame {
        self.layout = layout;
        if self.active {
            self.frame = self.compositor.render(&mut self.scene, &self.layout, stage);
        }
        &self.frame
    }

    /// Remove listeners and dynamic dots and halt the timeline. Anchors are left in place.
    ///
    /// Safe to call more than once.
    pub fn cleanup(&mut self, stage: &mut dyn Stage) {
        for listener in self.listeners.drain(..) {
            stage.unlisten(listener);
        }
        self.timeline.halt();
        for id in self.scene.dots.dynamic_ids() {
            self.scene.dots.remove(&id, stage);
        }
        if self.active {
            tracing::debug!(anchors = self.scene.dots.len(), "effect cleaned up");
        }
        self.active = false;
    }

    /// Return `true` until [`LogoEffect::cleanup`] runs.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The sealed choreography.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Scroll-to-time mapping.
    pub fn scroll_map(&self) -> &ScrollMap {
        &self.scroll
    }

    /// Current layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Last scroll offset received.
    pub fn scroll_px(&self) -> f64 {
        self.scroll_px
    }

    /// Last rendered frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}
