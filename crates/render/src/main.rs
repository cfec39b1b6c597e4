//! Generate preview renders of the demo SDF shapes for the README.
//!
//! Usage: `render_preview [VIEW.json]`. The optional file holds a
//! `RenderState` (any subset of its fields); without it each shape is framed
//! automatically.

use std::error::Error;
use std::{env, fs};

use parking_lot::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sdf_kernel::geometry::point::{Point2d, Point3d};
use sdf_kernel::geometry::spline::CubicSpline2d;
use sdf_kernel::geometry::vector::Vec3;
use sdf_kernel::shapes::{Cuboid3d, Sphere3d};
use sdf_kernel::traits::{Sdf2, Sdf3};
use sdf_render::{CancelToken, FnSink, Framebuffer, RenderConfig, RenderProgress, RenderState, Renderer3};

const RESOLUTION: (u32, u32) = (160, 120);

/// Render `shape` and write it as a binary PPM under `docs/renders/`.
fn render_to_ppm<S: Sdf3>(name: &str, shape: S, view: Option<RenderState>) -> Result<(), Box<dyn Error>> {
    let config = RenderConfig::default();
    let hit_color = config.hit_color;
    let mut renderer = Renderer3::with_config(shape, config);

    let state = view.unwrap_or_else(|| {
        RenderState::default()
            .with_camera(Point3d::ORIGIN, -0.4, 0.6, 10.0)
            .frame_box(&renderer.bounding_box())
    });
    let state = RwLock::new(state);
    let cancel = CancelToken::new();

    let mut next_report = 0.25;
    let sink = FnSink(|progress: RenderProgress, _: &Framebuffer| {
        if progress.fraction() >= next_report {
            info!(shape = name, rendered = progress.rendered, total = progress.total, "partial render");
            next_report += 0.25;
        }
    });

    let frame = renderer.render(&state, RESOLUTION, &cancel, sink)?;
    fs::write(format!("docs/renders/{name}.ppm"), frame.to_ppm())?;

    let hits = frame.pixels().iter().filter(|p| **p == hit_color).count();
    println!(
        "  {name}: {w}x{h}, {hits} surface pixels",
        w = frame.width(),
        h = frame.height(),
    );
    Ok(())
}

/// Draw the polygonized spline, its knots and bounding box as SVG.
fn spline_to_svg(spline: &CubicSpline2d, knots: &[Point2d], width: f64, height: f64, title: &str) -> String {
    let bb = spline.bounding_box();
    let padding = 40.0;
    let avail_w = width - 2.0 * padding;
    let avail_h = height - 2.0 * padding - 25.0;
    let size = bb.size();
    let data_w = size.x.max(0.001);
    let data_h = size.y.max(0.001);
    let scale = (avail_w / data_w).min(avail_h / data_h);
    let offset_x = padding + (avail_w - data_w * scale) / 2.0;
    let offset_y = padding + 25.0 + (avail_h - data_h * scale) / 2.0;

    // SVG y grows downwards.
    let tx = |x: f64| -> f64 { (x - bb.min.x) * scale + offset_x };
    let ty = |y: f64| -> f64 { (bb.max.y - y) * scale + offset_y };

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" style=\"background:#1a1a2e\">\n\
         <text x=\"{}\" y=\"20\" font-family=\"monospace\" font-size=\"13\" fill=\"#8892b0\" text-anchor=\"middle\">{title}</text>\n",
        width / 2.0
    );

    svg.push_str(&format!(
        "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"#3a3a5a\" stroke-dasharray=\"4 3\"/>\n",
        tx(bb.min.x),
        ty(bb.max.y),
        size.x * scale,
        size.y * scale,
    ));

    let points: Vec<String> = spline
        .polygonize(spline.segments().len() * 24 + 1)
        .iter()
        .map(|p| format!("{:.1},{:.1}", tx(p.x), ty(p.y)))
        .collect();
    svg.push_str(&format!(
        "  <polyline points=\"{}\" fill=\"none\" stroke=\"#64a0dc\" stroke-width=\"1.5\"/>\n",
        points.join(" ")
    ));

    for k in knots {
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"#dc503c\"/>\n",
            tx(k.x),
            ty(k.y)
        ));
    }

    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-family=\"monospace\" font-size=\"10\" fill=\"#5a6080\" \
         text-anchor=\"middle\">{} segments, {} knots</text>\n",
        width / 2.0,
        height - 8.0,
        spline.segments().len(),
        spline.knot_count()
    ));
    svg.push_str("</svg>\n");
    svg
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let view = match env::args().nth(1) {
        Some(path) => Some(serde_json::from_str::<RenderState>(&fs::read_to_string(&path)?)?),
        None => None,
    };
    if let Some(view) = &view {
        view.validate()?;
    }

    fs::create_dir_all("docs/renders")?;

    println!("=== Sphere Tracing ===");

    // 1. Sphere
    render_to_ppm("sphere", Sphere3d::new(Point3d::ORIGIN, 5.0)?, view)?;

    // 2. Box
    render_to_ppm(
        "cuboid",
        Cuboid3d::new(Point3d::ORIGIN, Vec3::new(10.0, 8.0, 6.0))?,
        view,
    )?;

    println!("\n=== Spline Profiles ===");

    // 3. S-curve through six knots
    {
        let knots = vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(2.0, 3.0),
            Point2d::new(4.0, 1.0),
            Point2d::new(6.0, -2.0),
            Point2d::new(8.0, 0.5),
            Point2d::new(10.0, 2.0),
        ];
        let spline = CubicSpline2d::new(&knots)?;
        let svg = spline_to_svg(&spline, &knots, 400.0, 300.0, "Natural cubic spline (6 knots)");
        fs::write("docs/renders/spline.svg", svg)?;
        let probe = Point2d::new(5.0, 2.0);
        println!(
            "  spline: {} segments, distance from ({}, {}) = {:.3}",
            spline.segments().len(),
            probe.x,
            probe.y,
            spline.distance(probe)
        );
    }

    println!("\nAll renders written to docs/renders/");
    Ok(())
}
