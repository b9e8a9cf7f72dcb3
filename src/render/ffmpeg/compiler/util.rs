use std::path::Path;

use crate::transitions::{Easing, Transition, easing_expr};

/// Decimal form used inside filter arguments: rounded to the microsecond,
/// no trailing zeros, `3.0` prints as `3`.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1_000_000.0).round() / 1_000_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

/// Escape text for a single-quoted drawtext `text=` value.
///
/// Order matters: backslashes go first so later escapes are not doubled.
pub fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('%', "%%")
}

pub fn escape_ffmpeg_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
}

/// Seconds a transition actually overlaps its neighbours; cuts overlap nothing.
pub fn overlap(transition: &Transition) -> f64 {
    if transition.is_cut() {
        0.0
    } else {
        transition.duration
    }
}

/// Alpha expression ramping up after `start` and down before `end`, shaped by `easing`.
pub fn alpha_ramp(
    start: f64,
    end: Option<f64>,
    fade_in: f64,
    fade_out: f64,
    easing: Easing,
) -> Option<String> {
    let fade_out = if end.is_some() { fade_out } else { 0.0 };
    let end = end.unwrap_or(0.0);
    let rise = easing_expr(
        easing,
        &format!("(t-{})/{}", format_number(start), format_number(fade_in)),
    );
    let fall = easing_expr(
        easing,
        &format!("({}-t)/{}", format_number(end), format_number(fade_out)),
    );

    match (fade_in > 0.0, fade_out > 0.0) {
        (true, true) => Some(format!(
            "if(lt(t,{}),{rise},if(gt(t,{}),{fall},1))",
            format_number(start + fade_in),
            format_number(end - fade_out)
        )),
        (true, false) => Some(format!(
            "if(lt(t,{}),{rise},1)",
            format_number(start + fade_in)
        )),
        (false, true) => Some(format!(
            "if(gt(t,{}),{fall},1)",
            format_number(end - fade_out)
        )),
        (false, false) => None,
    }
}

/// Render a command for display, quoting arguments that a shell would split.
pub fn command_string(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| {
            if arg.contains(' ') || arg.contains(';') || arg.contains('[') {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
