//! Graph Tests
//!
//! Filter graph compilation and output naming through the public API.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use test_case::test_case;

use slowverb::graph::{compile, reverb_curve, FilterStage};
use slowverb::naming::{file_name, suffix};
use slowverb::params::{EffectParameters, PRESETS};

fn params(tempo: f64, pitch: i32, reverb: u8) -> EffectParameters {
    EffectParameters::new(tempo, pitch, reverb).unwrap()
}

// === Compilation ===

#[test]
fn test_identity_graph_is_anull() {
    assert_eq!(compile(&params(1.0, 0, 0)).serialize(), "anull");
}

#[test]
fn test_pitch_across_range() {
    for pitch in -12..=12 {
        let graph = compile(&params(1.0, pitch, 0));
        if pitch == 0 {
            assert_eq!(graph.stages(), &[FilterStage::Passthrough]);
            continue;
        }

        let multiplier = 2f64.powf(f64::from(pitch) / 12.0);
        let target = (44_100.0 * multiplier).round() as u32;
        assert_eq!(
            graph.serialize(),
            format!("asetrate={},aresample=44100", target)
        );
    }
}

#[test]
fn test_tempo_across_range() {
    let mut tempo = 0.5;
    while tempo <= 2.0 {
        let graph = compile(&params(tempo, 0, 0));
        let tempo_stages: Vec<_> = graph
            .stages()
            .iter()
            .filter(|s| matches!(s, FilterStage::Tempo { .. }))
            .collect();

        if tempo == 1.0 {
            assert!(tempo_stages.is_empty());
        } else {
            assert_eq!(tempo_stages, vec![&FilterStage::Tempo { factor: tempo }]);
        }
        tempo += 0.25;
    }
}

#[test]
fn test_full_reverb_values() {
    let echo = reverb_curve(100);
    assert_relative_eq!(echo.in_gain, 0.80);
    assert_relative_eq!(echo.out_gain, 0.88);
    assert_eq!(echo.delays_ms, [70, 105, 154]);
    assert_eq!(
        compile(&params(1.0, 0, 100)).serialize(),
        "aecho=0.8:0.88:70|105|154:0.55|0.40|0.30"
    );
}

#[test]
fn test_dry_has_no_echo() {
    let graph = compile(&params(0.75, -3, 0));
    assert!(!graph.stages().iter().any(|s| matches!(s, FilterStage::Echo(_))));
}

#[test]
fn test_preset_graphs() {
    let rendered: Vec<(&str, String)> = PRESETS
        .iter()
        .map(|p| (p.id, compile(&p.params()).serialize()))
        .collect();

    assert_eq!(
        rendered,
        vec![
            (
                "slowed-light",
                "asetrate=39289,aresample=44100,atempo=0.85,aecho=0.8:0.754:49|74|108:0.31|0.23|0.16"
                    .to_string()
            ),
            (
                "slowed-heavy",
                "asetrate=37084,aresample=44100,atempo=0.75,aecho=0.8:0.826:61|92|134:0.45|0.33|0.24"
                    .to_string()
            ),
            (
                "slowed-classic",
                "atempo=0.8,aecho=0.8:0.79:55|83|121:0.38|0.28|0.20".to_string()
            ),
            (
                "nightcore-light",
                "asetrate=49501,aresample=44100,atempo=1.2,aecho=0.8:0.727:45|67|98:0.25|0.19|0.13"
                    .to_string()
            ),
            (
                "nightcore-heavy",
                "asetrate=55563,aresample=44100,atempo=1.35,aecho=0.8:0.745:48|71|105:0.29|0.21|0.15"
                    .to_string()
            ),
            ("reset", "anull".to_string()),
        ]
    );
}

#[test]
fn test_compile_twice_is_identical() {
    for preset in PRESETS {
        let p = preset.params();
        assert_eq!(compile(&p).serialize(), compile(&p).serialize());
    }
}

// === Naming ===

#[test_case(0.8, -2, 50, "_slowed_pitch_down_reverb" ; "slowed pitched down")]
#[test_case(1.0, 0, 0, "_processed" ; "nothing applied")]
#[test_case(1.35, 4, 25, "_sped_pitch_up_reverb" ; "nightcore")]
fn test_suffix(tempo: f64, pitch: i32, reverb: u8, expected: &str) {
    assert_eq!(suffix(&params(tempo, pitch, reverb)), expected);
}

#[test]
fn test_output_file_name() {
    assert_eq!(file_name("song.wav", &params(0.8, 0, 50)), "song_slowed_reverb.mp3");
    assert_eq!(file_name("song.flac", &params(1.0, 0, 0)), "song_processed.mp3");
}
