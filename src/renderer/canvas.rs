//! Canvas 2D backend for Prime Drop

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

use super::scene::{
    DrawItem, EFFECT_FONT_SIZE, GROUND_COLOR, LABEL_COLOR, LABEL_STROKE, Palette, Scene, fit_scale,
};
use crate::consts::{GAME_HEIGHT, GAME_WIDTH};

const FONT_FAMILY: &str = "'Jua', 'Trebuchet MS', sans-serif";

/// Paints scenes onto a `<canvas>` sized for the device pixel ratio
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pixel_ratio: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut renderer = Self {
            canvas,
            ctx,
            pixel_ratio: 1.0,
        };
        renderer.resize(None);
        Ok(renderer)
    }

    /// Fit the canvas inside `wrap` and match the backing store to the
    /// device pixel ratio (capped at 1.5)
    pub fn resize(&mut self, wrap: Option<&Element>) {
        self.pixel_ratio = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
            .clamp(1.0, 1.5);
        self.canvas
            .set_width((GAME_WIDTH as f64 * self.pixel_ratio).round() as u32);
        self.canvas
            .set_height((GAME_HEIGHT as f64 * self.pixel_ratio).round() as u32);

        let Some(wrap) = wrap else { return };
        let rect = wrap.get_bounding_client_rect();
        if rect.width() < 10.0 || rect.height() < 10.0 {
            return;
        }
        let scale = fit_scale(rect.width(), rect.height());
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{GAME_WIDTH}px"));
        let _ = style.set_property("height", &format!("{GAME_HEIGHT}px"));
        let _ = style.set_property(
            "transform",
            &format!("translate(-50%, -50%) scale({scale})"),
        );
    }

    /// Convert a client x coordinate into playfield x
    pub fn client_to_game_x(&self, client_x: f64) -> Option<f32> {
        let rect = self.canvas.get_bounding_client_rect();
        let scale_x = rect.width() / GAME_WIDTH as f64;
        if scale_x <= 0.0 {
            return None;
        }
        Some(((client_x - rect.left()) / scale_x) as f32)
    }

    /// Whether a client x coordinate is on the left half of the canvas
    pub fn is_left_half(&self, client_x: f64) -> bool {
        let rect = self.canvas.get_bounding_client_rect();
        client_x < rect.left() + rect.width() / 2.0
    }

    pub fn render(&self, scene: &Scene) {
        let ctx = &self.ctx;
        let r = self.pixel_ratio;
        let _ = ctx.set_transform(r, 0.0, 0.0, r, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, GAME_WIDTH as f64, GAME_HEIGHT as f64);

        ctx.save();
        let _ = ctx.translate(scene.offset.x as f64, scene.offset.y as f64);
        for item in &scene.items {
            match item {
                DrawItem::Ground { top, height } => {
                    ctx.set_fill_style_str(GROUND_COLOR);
                    ctx.fill_rect(0.0, *top as f64, GAME_WIDTH as f64, *height as f64);
                }
                DrawItem::Ball {
                    center,
                    radius,
                    palette,
                    label,
                    font_size,
                } => {
                    self.draw_ball(center.x as f64, center.y as f64, *radius as f64, palette);
                    self.draw_label(label, center.x as f64, center.y as f64, *radius as f64, *font_size);
                }
                DrawItem::Text {
                    text,
                    pos,
                    color,
                    alpha,
                } => {
                    ctx.set_global_alpha(*alpha as f64);
                    ctx.set_fill_style_str(color);
                    ctx.set_font(&format!("700 {EFFECT_FONT_SIZE}px {FONT_FAMILY}"));
                    ctx.set_text_align("center");
                    ctx.set_text_baseline("middle");
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                    ctx.set_global_alpha(1.0);
                }
                DrawItem::Dot {
                    pos,
                    size,
                    color,
                    alpha,
                } => {
                    ctx.set_global_alpha(*alpha as f64);
                    ctx.set_fill_style_str(color);
                    ctx.begin_path();
                    let _ = ctx.arc(pos.x as f64, pos.y as f64, *size as f64, 0.0, std::f64::consts::TAU);
                    ctx.fill();
                    ctx.set_global_alpha(1.0);
                }
            }
        }
        ctx.restore();
    }

    /// Radial-gradient ball with an outline and a glossy highlight
    fn draw_ball(&self, x: f64, y: f64, radius: f64, palette: &Palette) {
        let ctx = &self.ctx;
        ctx.save();
        let _ = ctx.translate(x, y);

        if let Ok(gradient) =
            ctx.create_radial_gradient(-radius * 0.3, -radius * 0.4, radius * 0.2, 0.0, 0.0, radius)
        {
            let _ = gradient.add_color_stop(0.0, palette.light);
            let _ = gradient.add_color_stop(1.0, palette.base);
            ctx.set_fill_style_canvas_gradient(&gradient);
        } else {
            ctx.set_fill_style_str(palette.base);
        }
        ctx.begin_path();
        let _ = ctx.arc(0.0, 0.0, radius, 0.0, std::f64::consts::TAU);
        ctx.fill();

        ctx.set_line_width((radius * 0.08).max(2.0));
        ctx.set_stroke_style_str(palette.outline);
        ctx.stroke();

        ctx.set_global_alpha(0.6);
        ctx.set_fill_style_str("#ffffff");
        ctx.begin_path();
        let _ = ctx.ellipse(
            -radius * 0.35,
            -radius * 0.35,
            radius * 0.22,
            radius * 0.16,
            -0.4,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        ctx.restore();
    }

    fn draw_label(&self, text: &str, x: f64, y: f64, radius: f64, font_size: f32) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(LABEL_COLOR);
        ctx.set_stroke_style_str(LABEL_STROKE);
        ctx.set_font(&format!("700 {font_size}px {FONT_FAMILY}"));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_line_width((radius * 0.12).max(3.0));
        let _ = ctx.stroke_text(text, x, y);
        let _ = ctx.fill_text(text, x, y);
    }
}
