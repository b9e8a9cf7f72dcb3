use crate::error::EditError;
use crate::render::ffmpeg::graph::{Filter, FilterChain, FilterGraph, Label};
use crate::text::{
    Coordinate, CustomPosition, FontResolver, HorizontalAlign, PositionPreset, TextElement,
    TextLayer, TextPosition, VerticalAlign, color_to_ffmpeg,
};

use super::util::{alpha_ramp, escape_drawtext, escape_ffmpeg_path, format_number};

/// Distance kept from the frame edge by the position presets.
pub const EDGE_PADDING: u32 = 40;

/// Open end of an enable window.
const OPEN_END: f64 = 999_999.0;

/// Draw every non-empty layer on top of `video`, in order.
pub fn apply_text_layers(
    graph: &mut FilterGraph,
    video: Label,
    layers: &[TextLayer],
    fonts: &FontResolver,
) -> Result<Label, EditError> {
    let mut current = video;
    for (index, layer) in layers.iter().enumerate() {
        let chain = layer_chain(layer, fonts);
        if chain.is_empty() {
            continue;
        }
        let label = layer_label(graph, &layer.id, index);
        current = graph.add(vec![(&current).into()], chain, &label)?;
    }
    Ok(current)
}

/// `text_<id>`, suffixed with the layer index when another layer already took it.
fn layer_label(graph: &FilterGraph, id: &str, index: usize) -> String {
    let base = format!("text_{}", label_safe(id));
    if !graph.contains(&base) {
        return base;
    }
    let mut suffix = index;
    loop {
        let candidate = format!("{base}_{suffix}");
        if !graph.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// All elements of a layer, lowest `z_index` first.
pub fn layer_chain(layer: &TextLayer, fonts: &FontResolver) -> FilterChain {
    let mut chain = FilterChain::new();
    for element in layer.sorted_elements() {
        chain.push(text_filter(element, fonts));
    }
    chain
}

pub fn text_filter(element: &TextElement, fonts: &FontResolver) -> Filter {
    let style = &element.style;
    let font = &style.font;
    let text = escape_drawtext(&style.transform.apply(&element.text)).replace('\n', "\\n");
    let (x, y) = position_expressions(&element.position);

    let mut filter = Filter::new("drawtext")
        .arg("text", format!("'{text}'"))
        .arg(
            "font",
            format!("'{}'", escape_drawtext(&fonts.font_with_fallback(&font.family))),
        )
        .arg("fontsize", font.size);
    if let Some(path) = fonts.font_path(&font.family, font.weight) {
        filter = filter.arg("fontfile", format!("'{}'", escape_ffmpeg_path(&path)));
    }
    filter = filter
        .arg("fontcolor", color_to_ffmpeg(style.color.primary()))
        .arg("x", x)
        .arg("y", y);

    if let Some(stroke) = &style.stroke
        && stroke.width > 0
    {
        filter = filter
            .arg("borderw", stroke.width)
            .arg("bordercolor", color_to_ffmpeg(&stroke.color));
    }

    if let Some(shadow) = &style.shadow {
        filter = filter
            .arg("shadowcolor", color_to_ffmpeg(&shadow.color))
            .arg("shadowx", shadow.offset_x)
            .arg("shadowy", shadow.offset_y);
    }

    if let Some(background) = &style.background {
        filter = filter
            .arg("box", 1)
            .arg("boxcolor", color_to_ffmpeg(&background.color))
            .arg("boxborderw", background.padding.uniform());
    }

    if (font.line_height - 1.0).abs() > f64::EPSILON {
        let spacing = ((font.line_height - 1.0) * font.size as f64).round() as i64;
        filter = filter.arg("line_spacing", spacing);
    }

    if element.start_time.is_some() || element.end_time.is_some() {
        filter = filter.arg(
            "enable",
            format!(
                "'between(t,{},{})'",
                format_number(element.start_time.unwrap_or(0.0)),
                format_number(element.end_time.unwrap_or(OPEN_END))
            ),
        );
    }

    let ramp = alpha_ramp(
        element.start_time.unwrap_or(0.0),
        element.end_time,
        element.fade_in.unwrap_or(0.0),
        element.fade_out.unwrap_or(0.0),
        element.fade_easing,
    );
    let opacity = style.opacity.filter(|o| *o < 1.0);
    match (opacity, ramp) {
        (Some(opacity), Some(ramp)) => {
            filter.arg("alpha", format!("'{}*({ramp})'", format_number(opacity)))
        }
        (None, Some(ramp)) => filter.arg("alpha", format!("'{ramp}'")),
        (Some(opacity), None) => filter.arg("alpha", format_number(opacity)),
        (None, None) => filter,
    }
}

/// `x`/`y` expressions in terms of `w`, `h`, `text_w` and `text_h`, so the
/// same string works at any output size.
pub fn position_expressions(position: &TextPosition) -> (String, String) {
    match position {
        TextPosition::Preset(preset) => preset_expressions(*preset),
        TextPosition::Custom(custom) => custom_expressions(custom),
    }
}

fn preset_expressions(preset: PositionPreset) -> (String, String) {
    let left = EDGE_PADDING.to_string();
    let center_x = "(w-text_w)/2".to_string();
    let right = format!("w-text_w-{EDGE_PADDING}");
    let top = EDGE_PADDING.to_string();
    let middle = "(h-text_h)/2".to_string();
    let bottom = format!("h-text_h-{EDGE_PADDING}");

    match preset {
        PositionPreset::TopLeft => (left, top),
        PositionPreset::TopCenter => (center_x, top),
        PositionPreset::TopRight => (right, top),
        PositionPreset::MiddleLeft => (left, middle),
        PositionPreset::MiddleCenter => (center_x, middle),
        PositionPreset::MiddleRight => (right, middle),
        PositionPreset::BottomLeft => (left, bottom),
        PositionPreset::BottomCenter => (center_x, bottom),
        PositionPreset::BottomRight => (right, bottom),
    }
}

fn custom_expressions(custom: &CustomPosition) -> (String, String) {
    let mut x = coordinate_expression(&custom.x, "w");
    match custom.align_x {
        HorizontalAlign::Left => {}
        HorizontalAlign::Center => x.push_str("-text_w/2"),
        HorizontalAlign::Right => x.push_str("-text_w"),
    }

    let mut y = coordinate_expression(&custom.y, "h");
    match custom.align_y {
        VerticalAlign::Top => {}
        VerticalAlign::Middle => y.push_str("-text_h/2"),
        VerticalAlign::Bottom => y.push_str("-text_h"),
    }
    (x, y)
}

fn coordinate_expression(coordinate: &Coordinate, axis: &str) -> String {
    if let Some(fraction) = coordinate.percent() {
        return format!("{axis}*{}", format_number(fraction));
    }
    match coordinate {
        Coordinate::Pixels(px) => format_number(*px),
        Coordinate::Expr(expr) => expr.trim().to_string(),
    }
}

fn label_safe(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
