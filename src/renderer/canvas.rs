//! Canvas 2D surface (browser only)

use glam::Vec2;
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::{Color, Surface};
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

fn css(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({},{},{},{:.3})",
        (r * 255.0) as u8,
        (g * 255.0) as u8,
        (b * 255.0) as u8,
        a.clamp(0.0, 1.0)
    )
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        ctx.set_text_align("center");
        Ok(Self { canvas, ctx })
    }

    /// Reset the transform so playfield units map onto the canvas
    pub fn begin_frame(&mut self) {
        let sx = self.canvas.width() as f64 / PLAYFIELD_WIDTH as f64;
        let sy = self.canvas.height() as f64 / PLAYFIELD_HEIGHT as f64;
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0).ok();
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.ctx.translate(offset.x as f64, offset.y as f64).ok();
    }

    fn rotate(&mut self, radians: f32) {
        self.ctx.rotate(radians as f64).ok();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.begin_path();
        self.ctx
            .ellipse(
                center.x as f64,
                center.y as f64,
                radii.x.abs() as f64,
                radii.y.abs() as f64,
                0.0,
                0.0,
                TAU,
            )
            .ok();
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, font_size: f32, color: Color) {
        self.ctx.set_font(&format!("bold {}px monospace", font_size.round()));
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }
}
