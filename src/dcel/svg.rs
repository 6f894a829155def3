// Copyright 2025 The planar-dcel Authors
// License: MIT
//
// Diagnostic SVG rendering. Coordinates are converted to f64 here and only
// here; nothing computed from the picture feeds back into the geometry.

use std::fmt::{self, Write};

use super::{Dcel, EdgeIdx};

#[derive(Clone, Debug, PartialEq)]
pub struct SvgOptions {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub stroke_width: f64,
    pub vertex_radius: f64,
    pub edge_color: String,
    pub vertex_color: String,
    /// Draw each half-edge separately, nudged to its face side, with an arrow.
    pub draw_arrows: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            margin: 20.0,
            stroke_width: 1.5,
            vertex_radius: 3.0,
            edge_color: "#1f4e79".into(),
            vertex_color: "#c0392b".into(),
            draw_arrows: false,
        }
    }
}

/// Maps model coordinates into the drawing area, y pointing down.
struct Viewport {
    min_x: f64,
    max_y: f64,
    scale: f64,
    margin: f64,
}

impl Viewport {
    fn fit(d: &Dcel, opts: &SvgOptions) -> Self {
        let (lo, hi) = match d.bounding_box() {
            Some((lo, hi)) => (lo.to_f64(), hi.to_f64()),
            None => ((0.0, 0.0), (1.0, 1.0)),
        };
        let span_x = (hi.0 - lo.0).max(f64::EPSILON);
        let span_y = (hi.1 - lo.1).max(f64::EPSILON);
        let avail_x = (opts.width - 2.0 * opts.margin).max(1.0);
        let avail_y = (opts.height - 2.0 * opts.margin).max(1.0);
        Self {
            min_x: lo.0,
            max_y: hi.1,
            scale: (avail_x / span_x).min(avail_y / span_y),
            margin: opts.margin,
        }
    }

    fn map(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.margin + (x - self.min_x) * self.scale,
            self.margin + (self.max_y - y) * self.scale,
        )
    }
}

impl Dcel {
    pub fn write_svg<W: Write>(&self, out: &mut W, opts: &SvgOptions) -> fmt::Result {
        let view = Viewport::fit(self, opts);
        writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = opts.width,
            h = opts.height
        )?;
        if opts.draw_arrows {
            writeln!(
                out,
                "  <defs><marker id=\"arrow\" markerWidth=\"6\" markerHeight=\"6\" refX=\"5\" refY=\"3\" orient=\"auto\"><path d=\"M0,0 L6,3 L0,6 z\" fill=\"{}\"/></marker></defs>",
                opts.edge_color
            )?;
        }
        writeln!(
            out,
            "  <g stroke=\"{}\" stroke-width=\"{}\" fill=\"none\">",
            opts.edge_color, opts.stroke_width
        )?;
        for e in 0..self.num_edges() as EdgeIdx {
            let a = view.map(self.location(self.origin(e)).to_f64());
            let b = view.map(self.location(self.dest(e)).to_f64());
            if opts.draw_arrows {
                let (dx, dy) = (b.0 - a.0, b.1 - a.1);
                let len = (dx * dx + dy * dy).sqrt().max(f64::EPSILON);
                // Screen y points down, so the face side (model left) is (dy, -dx).
                let off = 2.0 * opts.stroke_width;
                let (nx, ny) = (dy / len * off, -dx / len * off);
                let (sx, sy) = (a.0 + nx + dx * 0.1, a.1 + ny + dy * 0.1);
                let (ex, ey) = (b.0 + nx - dx * 0.1, b.1 + ny - dy * 0.1);
                writeln!(
                    out,
                    "    <line x1=\"{sx:.2}\" y1=\"{sy:.2}\" x2=\"{ex:.2}\" y2=\"{ey:.2}\" marker-end=\"url(#arrow)\"><title>e{e} f{}</title></line>",
                    self.incface(e)
                )?;
            } else if e < self.twin(e) {
                writeln!(
                    out,
                    "    <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>",
                    a.0, a.1, b.0, b.1
                )?;
            }
        }
        writeln!(out, "  </g>")?;
        writeln!(out, "  <g fill=\"{}\">", opts.vertex_color)?;
        for (i, v) in self.vertices.iter().enumerate() {
            let (cx, cy) = view.map(v.location.to_f64());
            writeln!(
                out,
                "    <circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{}\"><title>v{i} {}</title></circle>",
                opts.vertex_radius, v.location
            )?;
        }
        writeln!(out, "  </g>")?;
        writeln!(out, "</svg>")
    }

    pub fn to_svg(&self, opts: &SvgOptions) -> String {
        let mut s = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_svg(&mut s, opts);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::RatPoint;

    #[test]
    fn draws_every_edge_and_vertex() {
        let d = Dcel::closed_path(&[
            RatPoint::from_ints(0, 0),
            RatPoint::from_ints(4, 0),
            RatPoint::from_ints(0, 3),
        ])
        .unwrap();
        let svg = d.to_svg(&SvgOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<line").count(), 3);
        assert_eq!(svg.matches("<circle").count(), 3);

        let arrows = d.to_svg(&SvgOptions {
            draw_arrows: true,
            ..SvgOptions::default()
        });
        assert_eq!(arrows.matches("<line").count(), 6);
        assert!(arrows.contains("marker-end"));
    }

    #[test]
    fn empty_subdivision_is_a_blank_canvas() {
        let svg = Dcel::new().to_svg(&SvgOptions::default());
        assert_eq!(svg.matches("<line").count(), 0);
        assert_eq!(svg.matches("<circle").count(), 0);
    }
}
