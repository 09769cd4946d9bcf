// SVG rendering surface, for snapshots and headless hosts.
//
// Each `resize()` starts a fresh document, so rendering a frame into an
// `SvgSurface` leaves exactly that frame behind. Colors are split into a hex
// fill and an opacity (color alpha × plant alpha); ellipse rotation becomes a
// `rotate()` transform about the ellipse center.

use crate::plant::StemCurve;
use crate::render::Surface;
use crate::types::{Point, Rgba};
use std::fmt::Write;

#[derive(Clone, Debug, Default)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// The complete SVG document for the last frame.
    pub fn document(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = num(self.width),
            h = num(self.height),
            body = self.body,
        )
    }
}

impl Surface for SvgSurface {
    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.body.clear();
    }

    fn fill_background(&mut self, color: Rgba) {
        let _ = writeln!(
            self.body,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            color.hex()
        );
    }

    fn stroke_curve(&mut self, curve: &StemCurve, width: f64, color: Rgba, alpha: f64) {
        let _ = writeln!(
            self.body,
            "<path d=\"M{} C{} {} {}\" fill=\"none\" stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\"/>",
            pt(curve.start),
            pt(curve.c1),
            pt(curve.c2),
            pt(curve.end),
            color.hex(),
            num(opacity(color, alpha)),
            num(width),
        );
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, rotation: f64, color: Rgba, alpha: f64) {
        let (cx, cy) = (num(center.x), num(center.y));
        let _ = writeln!(
            self.body,
            "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{}\" ry=\"{}\" fill=\"{}\" fill-opacity=\"{}\" transform=\"rotate({} {cx} {cy})\"/>",
            num(rx),
            num(ry),
            color.hex(),
            num(opacity(color, alpha)),
            num(rotation.to_degrees()),
        );
    }
}

fn opacity(color: Rgba, alpha: f64) -> f64 {
    (f64::from(color.a) * alpha).clamp(0.0, 1.0)
}

fn pt(p: Point) -> String {
    format!("{},{}", num(p.x), num(p.y))
}

/// Up to two decimals, trailing zeros dropped.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(2.0), "2");
        assert_eq!(num(0.126), "0.13");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(1250.5), "1250.5");
    }

    #[test]
    fn frame_produces_a_document() {
        let mut svg = SvgSurface::new();
        svg.resize(640.0, 480.0);
        svg.fill_background(Rgba::new(0xf3, 0xf1, 0xe8, 1.0));
        let curve = StemCurve {
            start: Point::new(10.0, 100.0),
            c1: Point::new(12.0, 70.0),
            c2: Point::new(8.0, 40.0),
            end: Point::new(11.0, 0.0),
        };
        svg.stroke_curve(&curve, 2.0, Rgba::new(212, 112, 102, 0.55), 1.0);
        svg.fill_ellipse(Point::new(11.0, 0.0), 20.0, 10.0, 0.0, Rgba::new(255, 0, 0, 0.5), 0.5);

        let doc = svg.document();
        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"640\" height=\"480\""));
        assert!(doc.contains("fill=\"#f3f1e8\""));
        assert!(doc.contains("d=\"M10,100 C12,70 8,40 11,0\""));
        assert!(doc.contains("stroke-opacity=\"0.55\""));
        assert!(doc.contains("fill-opacity=\"0.25\""));
        assert!(doc.contains("rotate(0 11 0)"));
        assert!(doc.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn resize_starts_a_new_frame() {
        let mut svg = SvgSurface::new();
        svg.resize(10.0, 10.0);
        svg.fill_background(Rgba::new(0, 0, 0, 1.0));
        svg.resize(20.0, 20.0);
        assert!(!svg.document().contains("<rect"));
        assert_eq!((svg.width(), svg.height()), (20.0, 20.0));
    }
}
