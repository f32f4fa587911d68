// Frame to SVG document rendering
use crate::application::graph::{Frame, SeriesPath};
use crate::domain::interaction::Crosshair;
use crate::domain::viewport::PlotRect;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::{self, Write};

const AXIS_COLOR: &str = "#6C6C6C";
const PLOT_FILL: &str = "#FFFFFF";
const CROSSHAIR_COLOR: &str = "#9A9A9A";
const FONT_FAMILY: &str = "Inter, sans-serif";
const TICK_HALF_LENGTH: f64 = 5.0;
const X_LABEL_OFFSET: f64 = 25.0;
const Y_LABEL_OFFSET: f64 = 20.0;

pub fn render_svg(frame: &Frame) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(4096);

    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="rg-svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
        w = frame.width,
        h = frame.height,
        font = FONT_FAMILY,
    )?;

    write_header(&mut out, frame)?;

    if let Some(rect) = &frame.plot {
        write!(
            out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" style="fill: {}"/>"#,
            rect.left, rect.top, rect.width, rect.height, PLOT_FILL
        )?;
        write_axes(&mut out, frame, rect)?;
        for series in &frame.series {
            write_series(&mut out, series)?;
        }
        if let Some(crosshair) = &frame.crosshair {
            write_crosshair(&mut out, crosshair, rect)?;
        }
    }

    out.push_str("</svg>");
    Ok(out)
}

fn write_header(out: &mut String, frame: &Frame) -> fmt::Result {
    let baseline = (frame.plot.map(|r| r.top).unwrap_or(frame.height) / 2.0).max(12.0);
    write!(
        out,
        r##"<text class="rg-graph-title" x="10" y="{:.2}" fill="#222222" font-weight="600">{} <tspan class="rg-x-range-title" fill="{}" font-weight="400">{}</tspan></text>"##,
        baseline,
        encode_text(&frame.title),
        AXIS_COLOR,
        encode_text(&frame.subtitle)
    )?;

    // pause glyph while running, play glyph while paused
    let glyph_x = (frame.width - 30.0).max(0.0);
    let glyph_top = baseline - 10.0;
    if frame.paused {
        write!(
            out,
            r#"<polygon class="rg-control-play" points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}"/>"#,
            glyph_x,
            glyph_top,
            glyph_x,
            glyph_top + 12.0,
            glyph_x + 10.0,
            glyph_top + 6.0,
            AXIS_COLOR
        )
    } else {
        write!(
            out,
            r#"<g class="rg-control-pause" fill="{c}"><rect x="{:.2}" y="{:.2}" width="3" height="12"/><rect x="{:.2}" y="{:.2}" width="3" height="12"/></g>"#,
            glyph_x,
            glyph_top,
            glyph_x + 6.0,
            glyph_top,
            c = AXIS_COLOR
        )
    }
}

fn write_axes(out: &mut String, frame: &Frame, rect: &PlotRect) -> fmt::Result {
    let axis_y = rect.bottom();
    for tick in &frame.x_ticks {
        write!(
            out,
            r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{c}"/><text x="{x:.2}" y="{:.2}" fill="{c}" text-anchor="middle">{}</text>"#,
            axis_y + TICK_HALF_LENGTH,
            axis_y - TICK_HALF_LENGTH,
            axis_y + X_LABEL_OFFSET,
            encode_text(&tick.label),
            x = tick.position,
            c = AXIS_COLOR
        )?;
    }

    let axis_x = rect.left;
    for tick in &frame.y_ticks {
        write!(
            out,
            r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{c}"/><text x="{:.2}" y="{y:.2}" fill="{c}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            axis_x - TICK_HALF_LENGTH,
            axis_x + TICK_HALF_LENGTH,
            axis_x - Y_LABEL_OFFSET,
            encode_text(&tick.label),
            y = tick.position,
            c = AXIS_COLOR
        )?;
    }
    Ok(())
}

fn write_series(out: &mut String, series: &SeriesPath) -> fmt::Result {
    write!(
        out,
        r#"<polyline class="rg-series" data-key="{}" fill="none" stroke="{}" stroke-width="2" stroke-linejoin="round" stroke-linecap="round" points=""#,
        encode_double_quoted_attribute(&series.key),
        encode_double_quoted_attribute(&series.color)
    )?;
    for (i, (x, y)) in series.points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(out, "{:.2},{:.2}", x, y)?;
    }
    out.push_str(r#""/>"#);
    Ok(())
}

fn write_crosshair(out: &mut String, crosshair: &Crosshair, rect: &PlotRect) -> fmt::Result {
    write!(
        out,
        r#"<g class="rg-crosshair" stroke="{c}" stroke-dasharray="4 4"><line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}"/><line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}"/></g>"#,
        rect.top,
        rect.bottom(),
        rect.left,
        rect.right(),
        x = crosshair.x,
        y = crosshair.y,
        c = CROSSHAIR_COLOR
    )?;
    write!(
        out,
        r#"<text class="rg-crosshair-time" x="{:.2}" y="{:.2}" fill="{c}" text-anchor="middle">{}</text><text class="rg-crosshair-value" x="{:.2}" y="{:.2}" fill="{c}" dominant-baseline="middle">{}</text>"#,
        crosshair.x,
        rect.top - 6.0,
        encode_text(&crosshair.time_label),
        rect.right() + 6.0,
        crosshair.y,
        encode_text(&crosshair.value_label),
        c = AXIS_COLOR
    )?;

    for (i, readout) in crosshair.readouts.iter().enumerate() {
        write!(
            out,
            r#"<text class="rg-readout" x="{:.2}" y="{:.2}" fill="{}">{}: {}</text>"#,
            rect.left + 8.0,
            rect.top + 16.0 + 16.0 * i as f64,
            encode_double_quoted_attribute(&readout.color),
            encode_text(&readout.label),
            encode_text(&readout.value_label)
        )?;
    }
    Ok(())
}
