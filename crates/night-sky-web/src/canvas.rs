use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::Vec2;
use night_sky::renderer::ColorStop;
use night_sky::{BlendMode, Color, Fill, LayerId, ProbeError, ProbeSurface, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasGradient, CanvasRenderingContext2d, Document, HtmlCanvasElement};

/// CSS color string for a canvas style.
fn css(color: Color) -> String {
    let c = color.sanitized();
    format!(
        "rgba({},{},{},{:.4})",
        (c.r * 255.0).round() as u8,
        (c.g * 255.0).round() as u8,
        (c.b * 255.0).round() as u8,
        c.a
    )
}

fn composite_op(mode: BlendMode) -> &'static str {
    match mode {
        BlendMode::Normal => "source-over",
        BlendMode::Additive => "lighter",
        BlendMode::Darken => "darken",
        BlendMode::Screen => "screen",
    }
}

fn add_stops(gradient: &CanvasGradient, stops: &[ColorStop]) -> Result<(), JsValue> {
    for (offset, color) in stops {
        gradient.add_color_stop(offset.clamp(0.0, 1.0), &css(*color))?;
    }
    Ok(())
}

/// Create a 2D context on a fresh offscreen canvas.
pub fn offscreen_context(document: &Document, width: u32, height: u32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width.max(1));
    canvas.set_height(height.max(1));
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;
    Ok((canvas, ctx))
}

/// `Surface` over a Canvas2D context, with offscreen canvases as layers.
pub struct CanvasSurface {
    document: Document,
    main: CanvasRenderingContext2d,
    width: f32,
    height: f32,
    layers: HashMap<u32, (HtmlCanvasElement, CanvasRenderingContext2d)>,
    /// Layer currently receiving draws, if any.
    target: Option<u32>,
    next_layer: u32,
    blend: BlendMode,
}

impl CanvasSurface {
    pub fn new(document: Document, main: CanvasRenderingContext2d, width: f32, height: f32) -> Self {
        Self {
            document,
            main,
            width,
            height,
            layers: HashMap::new(),
            target: None,
            next_layer: 0,
            blend: BlendMode::Normal,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn cx(&self) -> &CanvasRenderingContext2d {
        self.target
            .and_then(|id| self.layers.get(&id))
            .map(|(_, ctx)| ctx)
            .unwrap_or(&self.main)
    }

    /// Install `fill` as the fill style. Glows use `center` and `radius`;
    /// vertical gradients span `top..bottom`.
    #[allow(deprecated)]
    fn apply_fill(&self, fill: &Fill, center: Vec2, radius: f32, top: f32, bottom: f32) -> Result<(), JsValue> {
        let cx = self.cx();
        match fill {
            Fill::Solid(color) => cx.set_fill_style(&JsValue::from_str(&css(*color))),
            Fill::Glow(stops) => {
                let g = cx.create_radial_gradient(
                    center.x as f64,
                    center.y as f64,
                    0.0,
                    center.x as f64,
                    center.y as f64,
                    radius.max(0.01) as f64,
                )?;
                add_stops(&g, stops)?;
                cx.set_fill_style(&g);
            }
            Fill::Vertical(stops) => {
                let g = cx.create_linear_gradient(0.0, top as f64, 0.0, bottom as f64);
                add_stops(&g, stops)?;
                cx.set_fill_style(&g);
            }
            Fill::Radial(grad) => {
                let g = cx.create_radial_gradient(
                    grad.center.x as f64,
                    grad.center.y as f64,
                    grad.r0.max(0.0) as f64,
                    grad.center.x as f64,
                    grad.center.y as f64,
                    grad.r1.max(grad.r0 + 0.01) as f64,
                )?;
                add_stops(&g, grad.stops)?;
                cx.set_fill_style(&g);
            }
        }
        Ok(())
    }

    fn try_ellipse(&self, center: Vec2, radii: Vec2, rotation: f32, fill: &Fill) -> Result<(), JsValue> {
        let cx = self.cx();
        let rx = radii.x.max(0.01);
        let ry = radii.y.max(0.01);
        cx.save();
        cx.translate(center.x as f64, center.y as f64)?;
        cx.rotate(rotation as f64)?;
        cx.scale(1.0, (ry / rx) as f64)?;
        // Gradients live in the scaled frame, so a circle of radius rx
        // becomes the ellipse. Other gradients degrade to a centered glow.
        let local = match fill {
            Fill::Radial(grad) => Fill::Glow(grad.stops),
            Fill::Vertical(stops) => Fill::Glow(*stops),
            other => *other,
        };
        self.apply_fill(&local, Vec2::ZERO, rx, -rx, rx)?;
        cx.begin_path();
        cx.arc(0.0, 0.0, rx as f64, 0.0, TAU)?;
        cx.fill();
        cx.restore();
        Ok(())
    }

    fn warn(op: &str, err: JsValue) {
        log::warn!("canvas {} failed: {:?}", op, err);
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.blend = mode;
        if let Err(e) = self.cx().set_global_composite_operation(composite_op(mode)) {
            Self::warn("blend", e);
        }
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, fill: &Fill) {
        let center = origin + size * 0.5;
        match self.apply_fill(fill, center, size.max_element() * 0.5, origin.y, origin.y + size.y) {
            Ok(()) => self.cx().fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64),
            Err(e) => Self::warn("fill_rect", e),
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, fill: &Fill) {
        if radius <= 0.0 {
            return;
        }
        let result = self.apply_fill(fill, center, radius, center.y - radius, center.y + radius).and_then(|_| {
            let cx = self.cx();
            cx.begin_path();
            cx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)?;
            cx.fill();
            Ok(())
        });
        if let Err(e) = result {
            Self::warn("fill_circle", e);
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, fill: &Fill) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        if let Err(e) = self.try_ellipse(center, radii, rotation, fill) {
            self.cx().restore();
            Self::warn("fill_ellipse", e);
        }
    }

    #[allow(deprecated)]
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() || width <= 0.0 {
            return;
        }
        let cx = self.cx();
        cx.set_stroke_style(&JsValue::from_str(&css(color)));
        cx.set_line_width(width as f64);
        cx.set_line_cap("round");
        cx.begin_path();
        cx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            cx.line_to(p.x as f64, p.y as f64);
        }
        cx.stroke();
    }

    #[allow(deprecated)]
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        if radius <= 0.0 || width <= 0.0 {
            return;
        }
        let cx = self.cx();
        cx.set_stroke_style(&JsValue::from_str(&css(color)));
        cx.set_line_width(width as f64);
        cx.begin_path();
        if let Err(e) = cx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU) {
            Self::warn("stroke_circle", e);
            return;
        }
        cx.stroke();
    }

    fn begin_layer(&mut self, width: f32, height: f32) -> LayerId {
        let id = self.next_layer;
        self.next_layer += 1;
        match offscreen_context(&self.document, width.round() as u32, height.round() as u32) {
            Ok(layer) => {
                self.layers.insert(id, layer);
                self.target = Some(id);
            }
            Err(e) => Self::warn("begin_layer", e),
        }
        LayerId(id)
    }

    fn end_layer(&mut self) {
        self.target = None;
        let _ = self.main.set_global_composite_operation(composite_op(self.blend));
    }

    fn draw_layer(&mut self, layer: LayerId, offset: Vec2) {
        let Some((canvas, _)) = self.layers.get(&layer.0) else {
            return;
        };
        if let Err(e) = self.cx().draw_image_with_html_canvas_element(canvas, offset.x as f64, offset.y as f64) {
            Self::warn("draw_layer", e);
        }
    }

    fn release_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer.0);
        if self.target == Some(layer.0) {
            self.target = None;
        }
    }
}

impl ProbeSurface for CanvasSurface {
    fn probe_fill(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) -> Result<(), ProbeError> {
        let stops = [(0.0, inner), (1.0, outer)];
        self.apply_fill(&Fill::Glow(&stops), center, radius, 0.0, 0.0)
            .and_then(|_| {
                let cx = self.cx();
                cx.begin_path();
                cx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)?;
                cx.fill();
                Ok(())
            })
            .map_err(|e| ProbeError::Fill(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_clamps_and_formats() {
        assert_eq!(css(Color::new(1.0, 0.5, 0.0, 0.25)), "rgba(255,128,0,0.2500)");
        assert_eq!(css(Color::new(2.0, -1.0, f32::NAN, 3.0)), "rgba(255,0,0,1.0000)");
    }

    #[test]
    fn blend_modes_map_to_canvas_ops() {
        assert_eq!(composite_op(BlendMode::Additive), "lighter");
        assert_eq!(composite_op(BlendMode::Darken), "darken");
        assert_eq!(composite_op(BlendMode::Normal), "source-over");
    }
}
