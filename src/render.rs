//! Backend execution: walk a `SceneGraph` and draw its commands onto a
//! plotters backend, then encode the result. Two backends are supported:
//! an in-memory RGB bitmap encoded to PNG, and the plotters SVG string
//! backend.

use anyhow::{anyhow, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::ir::{DrawCommand, HAlign, SceneGraph, VAlign};
use crate::OutputFormat;

/// Render a scene to encoded bytes in the requested format. SVG output is
/// UTF-8 text returned as bytes so both formats share a signature.
pub fn render_scene(scene: &SceneGraph, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Png => render_png(scene),
        OutputFormat::Svg => Ok(render_svg(scene)?.into_bytes()),
    }
}

/// Rasterize to an RGB buffer and encode as PNG.
pub fn render_png(scene: &SceneGraph) -> Result<Vec<u8>> {
    let (width, height) = (scene.width, scene.height);
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        execute(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

/// Draw into the plotters SVG string backend.
pub fn render_svg(scene: &SceneGraph) -> Result<String> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (scene.width, scene.height)).into_drawing_area();
        execute(&root, scene)?;
        root.present().map_err(|e| anyhow!("{}", e))?;
    }
    Ok(svg)
}

fn execute<DB>(root: &DrawingArea<DB, Shift>, scene: &SceneGraph) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&scene.background)
        .map_err(|e| anyhow!("Failed to fill background: {}", e))?;

    for command in &scene.commands {
        match command {
            DrawCommand::Rect {
                tl,
                br,
                color,
                alpha,
                filled,
                ..
            } => {
                let style = if *filled {
                    color.mix(*alpha).filled()
                } else {
                    color.mix(*alpha).stroke_width(1)
                };
                root.draw(&Rectangle::new([*tl, *br], style))
                    .map_err(|e| anyhow!("Failed to draw rect: {}", e))?;
            }
            DrawCommand::Polyline {
                points,
                color,
                width,
                ..
            } => {
                root.draw(&PathElement::new(
                    points.clone(),
                    color.stroke_width(*width),
                ))
                .map_err(|e| anyhow!("Failed to draw polyline: {}", e))?;
            }
            DrawCommand::Polygon {
                points,
                color,
                alpha,
                ..
            } => {
                root.draw(&Polygon::new(points.clone(), color.mix(*alpha).filled()))
                    .map_err(|e| anyhow!("Failed to draw polygon: {}", e))?;
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
                filled,
                ..
            } => {
                let style = if *filled {
                    color.filled()
                } else {
                    color.stroke_width(1)
                };
                root.draw(&Circle::new(*center, *radius, style))
                    .map_err(|e| anyhow!("Failed to draw circle: {}", e))?;
            }
            DrawCommand::Wedge {
                center,
                radius,
                start_angle,
                end_angle,
                color,
                ..
            } => {
                let points = wedge_points(*center, *radius, *start_angle, *end_angle);
                root.draw(&Polygon::new(points, color.filled()))
                    .map_err(|e| anyhow!("Failed to draw wedge: {}", e))?;
            }
            DrawCommand::Text {
                content,
                pos,
                font_px,
                color,
                h_align,
                v_align,
                rotated,
            } => {
                let h_pos = match h_align {
                    HAlign::Left => HPos::Left,
                    HAlign::Center => HPos::Center,
                    HAlign::Right => HPos::Right,
                };
                let v_pos = match v_align {
                    VAlign::Top => VPos::Top,
                    VAlign::Middle => VPos::Center,
                    VAlign::Bottom => VPos::Bottom,
                };
                let mut style = ("sans-serif", *font_px as f64)
                    .into_font()
                    .color(color)
                    .pos(Pos::new(h_pos, v_pos));
                if *rotated {
                    style = style.transform(FontTransform::Rotate270);
                }
                root.draw_text(content, &style, *pos)
                    .map_err(|e| anyhow!("Failed to draw text: {}", e))?;
            }
        }
    }
    Ok(())
}

/// Approximate a pie slice as a fan polygon. Angles are radians clockwise
/// from 12 o'clock.
fn wedge_points(
    center: (i32, i32),
    radius: i32,
    start_angle: f64,
    end_angle: f64,
) -> Vec<(i32, i32)> {
    let sweep = (end_angle - start_angle).max(0.0);
    let steps = ((sweep / 0.05).ceil() as usize).max(2);
    let r = radius as f64;

    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let a = start_angle + sweep * (i as f64 / steps as f64);
        points.push((
            center.0 + (r * a.sin()).round() as i32,
            center.1 - (r * a.cos()).round() as i32,
        ));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{HAlign, VAlign};
    use plotters::style::RGBColor;

    /// PNG files always start with the 8-byte signature.
    pub fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    fn demo_scene() -> SceneGraph {
        let mut scene = SceneGraph::new(200, 150);
        scene.commands.push(DrawCommand::Rect {
            tl: (10, 10),
            br: (60, 100),
            color: RGBColor(68, 114, 196),
            alpha: 1.0,
            filled: true,
            delay_ms: 0,
        });
        scene.commands.push(DrawCommand::Wedge {
            center: (140, 70),
            radius: 40,
            start_angle: 0.0,
            end_angle: std::f64::consts::PI,
            color: RGBColor(237, 125, 49),
            delay_ms: 0,
        });
        scene.commands.push(DrawCommand::Text {
            content: "demo".into(),
            pos: (100, 10),
            font_px: 12,
            color: RGBColor(60, 60, 60),
            h_align: HAlign::Center,
            v_align: VAlign::Top,
            rotated: false,
        });
        scene
    }

    #[test]
    fn test_png_output_has_signature() {
        let bytes = render_png(&demo_scene()).unwrap();
        assert!(is_valid_png(&bytes));
    }

    #[test]
    fn test_svg_output_is_svg() {
        let svg = render_svg(&demo_scene()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_render_scene_dispatch() {
        let png = render_scene(&demo_scene(), OutputFormat::Png).unwrap();
        assert!(is_valid_png(&png));
        let svg = render_scene(&demo_scene(), OutputFormat::Svg).unwrap();
        assert!(String::from_utf8(svg).unwrap().contains("<svg"));
    }

    #[test]
    fn test_wedge_fan_starts_at_center() {
        let points = wedge_points((50, 50), 10, 0.0, std::f64::consts::FRAC_PI_2);
        assert_eq!(points[0], (50, 50));
        // First arc point is straight up from center
        assert_eq!(points[1], (50, 40));
        // Last arc point is at 3 o'clock
        assert_eq!(*points.last().unwrap(), (60, 50));
    }
}
