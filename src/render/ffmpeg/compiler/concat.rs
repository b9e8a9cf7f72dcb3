use crate::error::EditError;
use crate::render::ffmpeg::graph::{Filter, FilterGraph, Label};
use crate::transitions::Transition;

use super::util::{format_number, overlap};

/// Where the joined streams end up.
#[derive(Debug, Clone, Copy)]
pub struct ConcatOutputs<'a> {
    pub video: &'a str,
    pub audio: &'a str,
}

/// Start of every transition inside the already-joined stream, `None` for cuts.
///
/// The running length starts at the first clip. Each join moves it forward by
/// the next clip minus whatever the transition overlaps.
pub fn transition_offsets(durations: &[f64], transitions: &[Transition]) -> Vec<Option<f64>> {
    let Some(first) = durations.first() else {
        return Vec::new();
    };

    let mut running = *first;
    let mut offsets = Vec::with_capacity(durations.len().saturating_sub(1));
    for (i, next) in durations.iter().skip(1).enumerate() {
        let td = transitions.get(i).map(overlap).unwrap_or(0.0);
        offsets.push((td > 0.0).then(|| (running - td).max(0.0)));
        running = running - td + next;
    }
    offsets
}

/// Join per-clip streams pairwise, left to right.
///
/// Intermediate pairs write `xv{i}`/`xa{i}`; the last pair writes `outputs`.
pub fn build_concat_chain(
    graph: &mut FilterGraph,
    video: &[Label],
    audio: &[Label],
    durations: &[f64],
    transitions: &[Transition],
    outputs: ConcatOutputs<'_>,
) -> Result<(Label, Label), EditError> {
    let (Some(first_video), Some(first_audio)) = (video.first(), audio.first()) else {
        return Err(EditError::NoClips);
    };

    if video.len() == 1 {
        let v = graph.add(vec![first_video.into()], Filter::new("copy"), outputs.video)?;
        let a = graph.add(vec![first_audio.into()], Filter::new("acopy"), outputs.audio)?;
        return Ok((v, a));
    }

    let offsets = transition_offsets(durations, transitions);
    let mut current_video = first_video.clone();
    let mut current_audio = first_audio.clone();
    let last = video.len() - 2;

    for i in 0..=last {
        let (video_name, audio_name) = if i == last {
            (outputs.video.to_string(), outputs.audio.to_string())
        } else {
            (format!("xv{i}"), format!("xa{i}"))
        };

        let next_video = &video[i + 1];
        let next_audio = &audio[i + 1];
        let transition = transitions.get(i).copied().unwrap_or_default();
        let xfade = transition.kind.definition().xfade;

        let (video_filter, audio_filter) = match (offsets.get(i).copied().flatten(), xfade) {
            (Some(offset), Some(name)) => {
                let duration = format_number(transition.duration);
                (
                    Filter::new("xfade")
                        .arg("transition", name)
                        .arg("duration", &duration)
                        .arg("offset", format_number(offset)),
                    Filter::new("acrossfade")
                        .arg("d", &duration)
                        .arg("c1", "tri")
                        .arg("c2", "tri"),
                )
            }
            _ => (
                Filter::new("concat").arg("n", 2).arg("v", 1).arg("a", 0),
                Filter::new("concat").arg("n", 2).arg("v", 0).arg("a", 1),
            ),
        };

        current_video = graph.add(
            vec![(&current_video).into(), next_video.into()],
            video_filter,
            &video_name,
        )?;
        current_audio = graph.add(
            vec![(&current_audio).into(), next_audio.into()],
            audio_filter,
            &audio_name,
        )?;
    }

    Ok((current_video, current_audio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ffmpeg::graph::Pad;
    use crate::transitions::TransitionType;

    fn clip_labels(graph: &mut FilterGraph, count: usize) -> (Vec<Label>, Vec<Label>) {
        let mut video = Vec::new();
        let mut audio = Vec::new();
        for i in 0..count {
            video.push(graph.add(vec![Pad::video(i)], Filter::new("null"), &format!("v{i}")).unwrap());
            audio.push(graph.add(vec![Pad::audio(i)], Filter::new("anull"), &format!("a{i}")).unwrap());
        }
        (video, audio)
    }

    const OUTPUTS: ConcatOutputs<'static> = ConcatOutputs {
        video: "outv",
        audio: "outa",
    };

    #[test]
    fn offsets_follow_running_length() {
        let fade = Transition::new(TransitionType::Fade, Some(0.5), None);
        let offsets = transition_offsets(&[3.0, 3.0, 4.0], &[fade, fade]);
        assert_eq!(offsets, vec![Some(2.5), Some(5.0)]);

        let offsets = transition_offsets(&[3.0, 3.0, 4.0], &[Transition::none(), fade]);
        assert_eq!(offsets, vec![None, Some(5.5)]);
    }

    #[test]
    fn successive_transitions_never_overlap() {
        let durations = [2.0, 5.0, 1.5, 4.0, 3.0];
        let transitions = [
            Transition::new(TransitionType::Fade, Some(0.8), None),
            Transition::new(TransitionType::SlideLeft, Some(0.4), None),
            Transition::none(),
            Transition::new(TransitionType::Crossfade, Some(1.0), None),
        ];
        let offsets = transition_offsets(&durations, &transitions);
        let mut previous_end = 0.0;
        for (offset, transition) in offsets.iter().zip(transitions.iter()) {
            if let Some(offset) = offset {
                assert!(*offset >= previous_end - 1e-9);
                previous_end = offset + transition.duration;
            }
        }
    }

    #[test]
    fn single_clip_is_copied() {
        let mut graph = FilterGraph::new();
        let (video, audio) = clip_labels(&mut graph, 1);
        build_concat_chain(&mut graph, &video, &audio, &[3.0], &[], OUTPUTS).unwrap();
        let rendered = graph.render();
        assert!(rendered.contains("[v0]copy[outv]"));
        assert!(rendered.contains("[a0]acopy[outa]"));
    }

    #[test]
    fn cuts_and_crossfades_chain_through_numbered_labels() {
        let mut graph = FilterGraph::new();
        let (video, audio) = clip_labels(&mut graph, 3);
        let fade = Transition::new(TransitionType::Crossfade, Some(0.5), None);
        build_concat_chain(
            &mut graph,
            &video,
            &audio,
            &[3.0, 3.0, 3.0],
            &[Transition::none(), fade],
            OUTPUTS,
        )
        .unwrap();

        let rendered = graph.render();
        assert!(rendered.contains("[v0][v1]concat=n=2:v=1:a=0[xv0]"));
        assert!(rendered.contains("[a0][a1]concat=n=2:v=0:a=1[xa0]"));
        assert!(rendered.contains("[xv0][v2]xfade=transition=dissolve:duration=0.5:offset=5.5[outv]"));
        assert!(rendered.contains("[xa0][a2]acrossfade=d=0.5:c1=tri:c2=tri[outa]"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let mut graph = FilterGraph::new();
        let err = build_concat_chain(&mut graph, &[], &[], &[], &[], OUTPUTS).unwrap_err();
        assert_eq!(err, EditError::NoClips);
    }
}
