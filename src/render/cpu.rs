use kurbo::Shape as _;

use crate::{
    compose::{
        compositor::DotFrame,
        stage::{ElementId, HostEvent, ListenerId, RecordingStage, Stage},
    },
    foundation::core::{Affine, Rect, Rgba8},
    foundation::error::{DotError, DotResult},
};

/// Flattening tolerance used when converting dot ellipses to paths.
const ELLIPSE_TOLERANCE: f64 = 0.1;

/// A rendered frame in RGBA8 format.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data, suitable for PNG output.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_in_place(&mut out);
        }
        out
    }
}

/// Raster stage: records applied frames like [`RecordingStage`] and paints them on demand.
#[derive(Clone, Debug)]
pub struct CpuStage {
    inner: RecordingStage,
    width: u32,
    height: u32,
    background: Rgba8,
}

impl CpuStage {
    /// Transparent stage with no anchors.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: RecordingStage::new(),
            width,
            height,
            background: Rgba8::rgba(0, 0, 0, 0),
        }
    }

    /// Stage pre-populated with named anchor elements.
    pub fn with_anchors<I, S>(width: u32, height: u32, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: RecordingStage::with_anchors(names),
            ..Self::new(width, height)
        }
    }

    /// Fill the frame with `color` before painting dots.
    pub fn with_background(mut self, color: Rgba8) -> Self {
        self.background = color;
        self
    }

    /// Underlying recorded element state.
    pub fn recording(&self) -> &RecordingStage {
        &self.inner
    }

    /// Paint every attached element's last frame, lowest `z` first, as a filled ellipse.
    pub fn finish(&self) -> DotResult<FrameRGBA> {
        let width: u16 = self.width.try_into().map_err(|_| {
            DotError::validation(format!("frame width exceeds u16: {}", self.width))
        })?;
        let height: u16 = self.height.try_into().map_err(|_| {
            DotError::validation(format!("frame height exceeds u16: {}", self.height))
        })?;
        if width == 0 || height == 0 {
            return Err(DotError::validation("frame size must be non-zero"));
        }

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let mut pixmap = vello_cpu::Pixmap::new(width, height);

        if self.background.a > 0 {
            let bg = self.background;
            ctx.set_transform(affine_to_cpu(Affine::IDENTITY));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        let mut frames = self.inner.live_frames();
        frames.sort_by_key(|f| f.z);
        for f in frames {
            draw_dot(&mut ctx, f);
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_dot(ctx: &mut vello_cpu::RenderContext, f: &DotFrame) {
    let opacity = f.opacity.clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 || f.width <= 0.0 || f.height <= 0.0 {
        return;
    }
    let path = kurbo::Ellipse::from_rect(Rect::new(0.0, 0.0, f.width, f.height))
        .to_path(ELLIPSE_TOLERANCE);
    let c = f.fill;
    ctx.set_transform(affine_to_cpu(f.transform));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_path(&bezpath_to_cpu(&path));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

impl Stage for CpuStage {
    fn find_anchor(&self, name: &str) -> Option<ElementId> {
        self.inner.find_anchor(name)
    }

    fn spawn_element(&mut self, dot_id: &str) -> ElementId {
        self.inner.spawn_element(dot_id)
    }

    fn remove_element(&mut self, element: ElementId) {
        self.inner.remove_element(element)
    }

    fn apply(&mut self, element: ElementId, frame: &DotFrame) {
        self.inner.apply(element, frame)
    }

    fn listen(&mut self, event: HostEvent) -> ListenerId {
        self.inner.listen(event)
    }

    fn unlisten(&mut self, listener: ListenerId) {
        self.inner.unlisten(listener)
    }

    fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
