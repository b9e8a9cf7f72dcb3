use crate::audio::{AudioRole, AudioTrack};
use crate::error::EditError;
use crate::render::ffmpeg::graph::{Filter, FilterChain, FilterGraph, Label, Pad};

use super::FfmpegCompiler;
use super::inputs::InputPlan;
use super::util::format_number;

/// End of an open trim window.
const OPEN_TRIM_END: f64 = 999_999.0;

/// Sample cap for `aloop`; large enough to hold any track window.
const LOOP_SIZE: &str = "2e+09";

const DUCK_THRESHOLD: f64 = 0.02;
const DUCK_RATIO: u32 = 6;
const DUCK_ATTACK_MS: u32 = 200;
const DUCK_RELEASE_MS: u32 = 1000;

impl FfmpegCompiler<'_> {
    /// Per-track chains followed by the mix with the concatenated clip audio.
    pub(super) fn build_audio_mix(
        &self,
        graph: &mut FilterGraph,
        inputs: &InputPlan,
        clip_audio: &Label,
        total_duration: f64,
    ) -> Result<Label, EditError> {
        let tracks = &self.config.audio_tracks;
        if tracks.is_empty() {
            return graph.add(vec![clip_audio.into()], Filter::new("acopy"), "mixeda");
        }

        let mut labels = Vec::with_capacity(tracks.len());
        for (j, track) in tracks.iter().enumerate() {
            labels.push(graph.add(
                vec![Pad::audio(inputs.track_input(j))],
                track_chain(track, total_duration),
                &format!("music{j}"),
            )?);
        }

        if self.config.duck_music {
            labels = apply_ducking(graph, tracks, labels)?;
        }

        let mut mix_inputs: Vec<Pad> = vec![clip_audio.into()];
        mix_inputs.extend(labels.iter().map(Pad::from));
        let mix = Filter::new("amix")
            .arg("inputs", mix_inputs.len())
            .arg("duration", "longest")
            .arg("normalize", 0);
        graph.add(mix_inputs, mix, "mixeda")
    }
}

/// Linear chain for one track: trim, loop, volume, delay, fades, final trim.
///
/// Looping happens before the delay so the repeated window still starts at
/// the track's own zero.
pub fn track_chain(track: &AudioTrack, total_duration: f64) -> FilterChain {
    let mut chain = FilterChain::new();

    if track.has_trim() {
        chain.push(
            Filter::new("atrim")
                .arg("start", format_number(track.trim_start.unwrap_or(0.0)))
                .arg("end", format_number(track.trim_end.unwrap_or(OPEN_TRIM_END))),
        );
        chain.push(Filter::new("asetpts").positional("PTS-STARTPTS"));
    }

    if track.looped {
        chain.push(
            Filter::new("aloop")
                .arg("loop", track.loop_count(total_duration))
                .arg("size", LOOP_SIZE),
        );
    }

    if (track.volume - 1.0).abs() > f64::EPSILON {
        chain.push(Filter::new("volume").positional(format_number(track.volume)));
    }

    if track.start_at > 0.0 {
        let ms = (track.start_at * 1000.0).round() as u64;
        chain.push(Filter::new("adelay").positional(format!("{ms}|{ms}")));
    }

    if track.fade_in > 0.0 {
        chain.push(
            Filter::new("afade")
                .arg("t", "in")
                .arg("st", format_number(track.start_at))
                .arg("d", format_number(track.fade_in)),
        );
    }

    if track.fade_out > 0.0 {
        chain.push(
            Filter::new("afade")
                .arg("t", "out")
                .arg("st", format_number((total_duration - track.fade_out).max(0.0)))
                .arg("d", format_number(track.fade_out)),
        );
    }

    chain.then(
        Filter::new("atrim")
            .positional(0)
            .positional(format_number(total_duration)),
    )
}

/// Route music tracks through a sidechain compressor keyed on the first
/// voiceover. Returns the labels to mix, in track order.
fn apply_ducking(
    graph: &mut FilterGraph,
    tracks: &[AudioTrack],
    labels: Vec<Label>,
) -> Result<Vec<Label>, EditError> {
    let Some(voice) = tracks.iter().position(|t| t.role == AudioRole::Voiceover) else {
        return Ok(labels);
    };
    let music: Vec<usize> = tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.role == AudioRole::Music)
        .map(|(j, _)| j)
        .collect();
    if music.is_empty() {
        return Ok(labels);
    }

    let mut outputs = vec!["voice_mix".to_string()];
    outputs.extend((0..music.len()).map(|i| format!("voice_key{i}")));
    let names: Vec<&str> = outputs.iter().map(String::as_str).collect();
    let split = graph.add_multi(
        vec![(&labels[voice]).into()],
        Filter::new("asplit").positional(names.len()),
        &names,
    )?;

    let mut mixed = labels.clone();
    mixed[voice] = split[0].clone();
    for (i, &k) in music.iter().enumerate() {
        let compressor = Filter::new("sidechaincompress")
            .arg("threshold", DUCK_THRESHOLD)
            .arg("ratio", DUCK_RATIO)
            .arg("attack", DUCK_ATTACK_MS)
            .arg("release", DUCK_RELEASE_MS);
        mixed[k] = graph.add(
            vec![(&labels[k]).into(), (&split[i + 1]).into()],
            compressor,
            &format!("ducked{k}"),
        )?;
    }
    Ok(mixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_track_chain_order() {
        let track = AudioTrack::new("music.mp3")
            .trimmed(Some(0.0), Some(4.0))
            .looping(true)
            .with_volume(0.3)
            .starting_at(1.5)
            .with_fades(2.0, 3.0);
        assert_eq!(
            track_chain(&track, 15.0).to_string(),
            "atrim=start=0:end=4,asetpts=PTS-STARTPTS,aloop=loop=5:size=2e+09,volume=0.3,adelay=1500|1500,afade=t=in:st=1.5:d=2,afade=t=out:st=12:d=3,atrim=0:15"
        );
    }

    #[test]
    fn plain_track_is_only_cut_to_length() {
        let track = AudioTrack::new("vo.wav").with_volume(1.0).with_fades(0.0, 0.0);
        assert_eq!(track_chain(&track, 6.0).to_string(), "atrim=0:6");
    }

    #[test]
    fn open_trim_end_and_clamped_fade_out() {
        let track = AudioTrack::new("a.wav")
            .with_volume(1.0)
            .trimmed(Some(2.0), None)
            .with_fades(0.0, 10.0);
        let chain = track_chain(&track, 4.0).to_string();
        assert!(chain.starts_with("atrim=start=2:end=999999,asetpts=PTS-STARTPTS"));
        assert!(chain.contains("afade=t=out:st=0:d=10"));
    }
}
