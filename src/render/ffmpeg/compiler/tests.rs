use std::collections::HashSet;

use super::{EncodeProfile, FfmpegCompileOutput, FfmpegCompiler, InputPlan};
use crate::audio::AudioTrack;
use crate::clip::Clip;
use crate::presets::{Quality, VideoFormat};
use crate::render::ffmpeg::graph::Pad;
use crate::render::pipeline::{OutputSettings, PipelineBuilder, PipelineConfig};
use crate::subtitles::{SubtitleConfig, SubtitleEntry, SubtitleStyle};
use crate::text::{FontConfig, PositionPreset, TextElement, TextLayer, TextStyle};
use crate::transitions::{Transition, TransitionType};

fn clip(duration: f64) -> Clip {
    Clip::new("clip.mp4").with_duration(duration)
}

fn compile(config: &PipelineConfig) -> FfmpegCompileOutput {
    config.compile(&crate::text::FontResolver::offline()).unwrap()
}

fn filter_complex(output: &FfmpegCompileOutput) -> &str {
    let idx = output
        .args
        .iter()
        .position(|arg| arg == "-filter_complex")
        .unwrap();
    &output.args[idx + 1]
}

#[test]
fn two_clip_concat_without_transition() {
    let config = PipelineBuilder::new()
        .add_clips([clip(3.0), clip(3.0)])
        .set_transitions([Transition::none()])
        .set_output("out.mp4", None)
        .build()
        .unwrap();
    let output = compile(&config);
    let graph = filter_complex(&output);

    assert!((output.total_duration - 6.0).abs() < 1e-9);
    assert_eq!(graph.matches("concat=n=2:v=1:a=0").count(), 1);
    assert_eq!(graph.matches("concat=n=2:v=0:a=1").count(), 1);
    assert!(graph.contains("[v0][v1]concat=n=2:v=1:a=0[concatv]"));
    assert!(!graph.contains("xfade"));
}

#[test]
fn two_clip_fade_offset() {
    let config = PipelineBuilder::new()
        .add_clips([clip(3.0), clip(3.0)])
        .set_transitions([Transition::new(TransitionType::Fade, Some(0.5), None)])
        .set_output("out.mp4", None)
        .build()
        .unwrap();
    let output = compile(&config);
    let graph = filter_complex(&output);

    assert!((output.total_duration - 5.5).abs() < 1e-9);
    assert!(graph.contains("[v0][v1]xfade=transition=fade:duration=0.5:offset=2.5[concatv]"));
    assert!(graph.contains("[a0][a1]acrossfade=d=0.5:c1=tri:c2=tri[concata]"));
}

#[test]
fn argument_vector_shape() {
    let config = PipelineBuilder::new()
        .add_clips([Clip::new("a.mp4").with_duration(2.0), Clip::new("b.mp4").with_duration(2.0)])
        .add_audio_track(AudioTrack::background_music("bed.mp3"))
        .set_quality(Quality::Draft)
        .set_output("out/final.mp4", None)
        .build()
        .unwrap();
    let output = compile(&config);
    let args: Vec<&str> = output.args.iter().map(String::as_str).collect();

    assert_eq!(&args[..6], ["-i", "a.mp4", "-i", "b.mp4", "-i", "bed.mp3"]);
    assert_eq!(args[6], "-filter_complex");
    let tail = &args[8..];
    assert_eq!(
        tail,
        [
            "-map", "[outv]", "-map", "[outa]", "-c:v", "libx264", "-preset", "medium", "-crf",
            "28", "-c:a", "aac", "-b:a", "192k", "-movflags", "+faststart", "-y",
            "out/final.mp4",
        ]
    );
    assert_eq!(output.command("ffmpeg")[0], "ffmpeg");
}

#[test]
fn webm_uses_vp9_and_opus() {
    let mut output = OutputSettings::new("out.webm");
    output.video_bitrate = None;
    let mut args = Vec::new();
    EncodeProfile::for_output(&output).push_to(&mut args);
    assert_eq!(output.format, VideoFormat::Webm);
    assert_eq!(
        args,
        ["-c:v", "libvpx-vp9", "-crf", "20", "-b:v", "0", "-c:a", "libopus", "-b:a", "192k", "-y"]
    );
}

#[test]
fn stages_appear_in_dependency_order() {
    let config = PipelineBuilder::new()
        .add_clips([clip(4.0), clip(4.0), clip(4.0)])
        .set_all_transitions(Transition::new(TransitionType::Crossfade, Some(0.5), None))
        .add_background_music("bed.mp3", None)
        .add_voiceover("vo.wav", 0.0)
        .set_subtitles(SubtitleConfig {
            entries: vec![SubtitleEntry {
                id: "1".into(),
                start_time: 0.0,
                end_time: 2.0,
                text: "hello".into(),
            }],
            style: SubtitleStyle::default(),
            word_by_word: false,
        })
        .add_text_layer(TextLayer::new(
            "title",
            vec![
                TextElement::new("Title", TextStyle::new(FontConfig::new("Inter", 80), "#FFFFFF"))
                    .at(PositionPreset::TopCenter),
            ],
        ))
        .set_output("out.mp4", None)
        .build()
        .unwrap();
    let output = compile(&config);
    let graph = filter_complex(&output);

    let markers = [
        "[v0]",
        "[xv0]",
        "[concatv]",
        "[3:a]",
        "[4:a]",
        "amix=inputs=3:duration=longest:normalize=0[mixeda]",
        "[concatv]drawtext=",
        "[subv]drawtext=",
        "[text_title]copy[outv]",
        "[mixeda]anull[outa]",
    ];
    let mut last = 0;
    for marker in markers {
        let pos = graph
            .find(marker)
            .unwrap_or_else(|| panic!("missing {marker} in\n{graph}"));
        assert!(pos >= last, "{marker} out of order in\n{graph}");
        last = pos;
    }
}

#[test]
fn audio_track_inputs_follow_clips() {
    let config = PipelineBuilder::new()
        .add_clips([clip(5.0), clip(5.0), clip(5.0)])
        .set_all_transitions(Transition::none())
        .add_audio_track(
            AudioTrack::background_music("bed.mp3")
                .trimmed(Some(0.0), Some(4.0))
                .looping(true),
        )
        .set_output("out.mp4", None)
        .build()
        .unwrap();
    let output = compile(&config);
    let graph = filter_complex(&output);
    assert!(graph.contains("[3:a]atrim=start=0:end=4,asetpts=PTS-STARTPTS,aloop=loop=5:size=2e+09"));
    assert!(graph.contains("atrim=0:15[music0]"));
    assert!(graph.contains("[concata][music0]amix=inputs=2"));
}

#[test]
fn no_tracks_pass_clip_audio_through() {
    let config = PipelineBuilder::new()
        .add_clip(clip(3.0))
        .set_output("out.mp4", None)
        .build()
        .unwrap();
    let graph = filter_complex(&compile(&config)).to_string();
    assert!(graph.contains("[v0]copy[concatv]"));
    assert!(graph.contains("[concata]acopy[mixeda]"));
    assert!(graph.contains("[concatv]copy[outv]"));
    assert!(!graph.contains("amix"));
}

#[test]
fn ducking_keys_music_on_the_voiceover() {
    let config = PipelineBuilder::new()
        .add_clips([clip(3.0), clip(3.0)])
        .add_background_music("bed.mp3", None)
        .add_voiceover("vo.wav", 0.5)
        .duck_music(true)
        .set_output("out.mp4", None)
        .build()
        .unwrap();
    let graph = filter_complex(&compile(&config)).to_string();
    assert!(graph.contains("[music1]asplit=2[voice_mix][voice_key0]"));
    assert!(graph.contains(
        "[music0][voice_key0]sidechaincompress=threshold=0.02:ratio=6:attack=200:release=1000[ducked0]"
    ));
    assert!(graph.contains("[concata][ducked0][voice_mix]amix=inputs=3"));
}

#[test]
fn every_label_is_written_once() {
    let config = PipelineBuilder::new()
        .add_clips([clip(3.0), clip(2.0), clip(4.0), clip(3.0)])
        .set_transition(0, Transition::new(TransitionType::SlideLeft, Some(0.4), None))
        .set_transition(2, Transition::new(TransitionType::Glitch, Some(0.2), None))
        .add_background_music("bed.mp3", None)
        .add_voiceover("vo.wav", 0.0)
        .duck_music(true)
        .set_subtitles(SubtitleConfig {
            entries: vec![
                SubtitleEntry {
                    id: "1".into(),
                    start_time: 0.0,
                    end_time: 1.0,
                    text: "[one]".into(),
                },
                SubtitleEntry {
                    id: "2".into(),
                    start_time: 1.0,
                    end_time: 2.0,
                    text: "two".into(),
                },
            ],
            style: SubtitleStyle::default(),
            word_by_word: true,
        })
        .set_output("out.mp4", None)
        .build()
        .unwrap();
    let fonts = crate::text::FontResolver::offline();
    let graph = FfmpegCompiler::new(&config, &fonts)
        .build_filter_graph(&InputPlan::build(&config), config.total_duration())
        .unwrap();

    // every label is written once and only read after it was written
    let mut written = HashSet::new();
    for node in graph.nodes() {
        for input in &node.inputs {
            if let Pad::Label(label) = input {
                assert!(written.contains(label.as_str()), "{label} read before written");
            }
        }
        for output in &node.outputs {
            assert!(written.insert(output.as_str().to_string()), "{output} written twice");
        }
    }
    assert!(written.contains("outv"));
    assert!(written.contains("outa"));
    assert!(written.contains("ducked0"));
}
