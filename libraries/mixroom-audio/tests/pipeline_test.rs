//! End-to-end tests of the mix pipeline
//!
//! Tests cover:
//! - Determinism: same input and preset give bit-identical output
//! - Layout preservation: channels, sample rate, frame count, WAV length
//! - Round trip: encoder output read back with an independent WAV reader
//! - Preset isolation and the raw/loud scenarios
//! - Decode failures and context discipline across many files

use mixroom_audio::{
    analyze, chain_for, encode_wav, ContextTracker, MixEngine, OfflineRenderer, WAV_HEADER_LEN,
};
use mixroom_core::{
    AudioBuffer, ContextKind, EngineSettings, MixPreset, MixroomError, SampleRate,
};
use std::f32::consts::PI;
use std::io::Cursor;

// ============================================================================
// TEST UTILITIES
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sine(frequency: f32, amplitude: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Stereo test signal with low-end rumble, mids and a different right channel
fn program_material(sample_rate: u32, frames: usize) -> AudioBuffer {
    let rumble = sine(40.0, 0.3, sample_rate, frames);
    let tone = sine(440.0, 0.4, sample_rate, frames);
    let presence = sine(3000.0, 0.1, sample_rate, frames);
    let left: Vec<f32> = (0..frames).map(|i| rumble[i] + tone[i] + presence[i]).collect();
    let right: Vec<f32> = (0..frames).map(|i| rumble[i] - tone[i] * 0.5).collect();
    AudioBuffer::new(vec![left, right], SampleRate::new(sample_rate)).unwrap()
}

/// 16-bit WAV file written with hound
fn wav_file(buffer: &AudioBuffer) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate().as_hz(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for sample in buffer.to_interleaved() {
            writer
                .write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn read_wav(bytes: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(Result::unwrap).collect();
    (spec, samples)
}

fn engine() -> MixEngine {
    init_tracing();
    MixEngine::new(&EngineSettings::default())
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[tokio::test]
async fn processing_is_deterministic() {
    let engine = engine();
    let file = wav_file(&program_material(44_100, 22_050));

    for preset in MixPreset::ALL {
        let first = engine
            .process_track(file.clone(), Some("wav"), preset)
            .await
            .unwrap();
        let second = engine
            .process_track(file.clone(), Some("wav"), preset)
            .await
            .unwrap();

        assert_eq!(first.wav, second.wav, "{preset} output differs");
        assert_eq!(first.stats, second.stats, "{preset} stats differ");
    }
}

#[tokio::test]
async fn output_layout_matches_input() {
    let engine = engine();

    for (sample_rate, channels) in [(44_100, 1), (48_000, 2), (22_050, 2)] {
        let frames = sample_rate as usize / 4;
        let channel_data = (0..channels)
            .map(|c| sine(220.0 * (c + 1) as f32, 0.5, sample_rate, frames))
            .collect();
        let input = AudioBuffer::new(channel_data, SampleRate::new(sample_rate)).unwrap();
        let file = wav_file(&input);

        for preset in MixPreset::ALL {
            let mix = engine
                .process_track(file.clone(), Some("wav"), preset)
                .await
                .unwrap();

            assert_eq!(mix.wav.len(), WAV_HEADER_LEN + frames * channels * 2);
            let (spec, samples) = read_wav(&mix.wav);
            assert_eq!(spec.channels as usize, channels);
            assert_eq!(spec.sample_rate, sample_rate);
            assert_eq!(spec.bits_per_sample, 16);
            assert_eq!(samples.len(), frames * channels);
            assert!((mix.duration_secs - frames as f64 / f64::from(sample_rate)).abs() < 1e-9);
        }
    }
}

#[test]
fn encoded_wav_round_trips_within_one_lsb() {
    let input = program_material(44_100, 4_410);
    let wav = encode_wav(&input).unwrap();
    let (spec, samples) = read_wav(&wav);

    assert_eq!(spec.channels, 2);
    for (original, decoded) in input.to_interleaved().iter().zip(samples) {
        if original.abs() >= 1.0 {
            continue;
        }
        let restored = if decoded < 0 {
            f32::from(decoded) / 32768.0
        } else {
            f32::from(decoded) / 32767.0
        };
        assert!(
            (restored - original).abs() <= 1.0 / 32767.0,
            "{original} came back as {restored}"
        );
    }
}

#[test]
fn presets_produce_distinct_output_without_touching_input() {
    let input = program_material(44_100, 44_100);
    let snapshot = input.clone();
    let renderer = OfflineRenderer::new(ContextTracker::new(1), 128);

    let outputs: Vec<AudioBuffer> = MixPreset::ALL
        .iter()
        .map(|&preset| renderer.render(&input, chain_for(preset)).unwrap())
        .collect();

    for (i, a) in outputs.iter().enumerate() {
        for b in &outputs[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert_eq!(input, snapshot);
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn raw_preset_on_quiet_tone() {
    let engine = engine();
    let tone = AudioBuffer::mono(sine(440.0, 0.3, 44_100, 44_100), SampleRate::CD_QUALITY).unwrap();

    let mix = engine
        .process_track(wav_file(&tone), Some("wav"), MixPreset::Raw)
        .await
        .unwrap();

    assert!((mix.stats.peak - 0.3).abs() < 1e-3, "peak {}", mix.stats.peak);
    assert!((mix.stats.rms - 0.3 * std::f32::consts::FRAC_1_SQRT_2).abs() < 2e-3);
    assert_eq!(mix.stats.clipping_count, 0);
    assert!(!mix.stats.clipping);
    assert_eq!(mix.stats.score, 90);
    assert_eq!(mix.stats.summary(), "Peak: 0.30, RMS: 0.212, Clips: 0");
}

#[test]
fn loud_preset_leaves_only_the_leading_transient_clipped() {
    let mut samples = sine(100.0, 0.6, 44_100, 44_100);
    for (i, sample) in samples.iter_mut().take(2000).enumerate() {
        *sample = if i % 2 == 0 { 1.0 } else { -1.0 };
    }
    let source = AudioBuffer::mono(samples, SampleRate::CD_QUALITY).unwrap();

    let source_stats = analyze(&source);
    assert_eq!(source_stats.clipping_count, 2000);
    assert_eq!(source_stats.score, 50);

    let renderer = OfflineRenderer::new(ContextTracker::new(1), 128);
    let output = renderer.render(&source, chain_for(MixPreset::Loud)).unwrap();
    assert_eq!(output.frames(), source.frames());
    assert!(output.channel(0).iter().all(|s| s.is_finite()));

    // Both compressors smooth their attack, so the first frames pass the
    // limiter before it clamps down: the opening sample overshoots to ~1.92
    let stats = analyze(&output);
    assert!((stats.peak - 1.922).abs() < 1e-3, "peak {}", stats.peak);
    assert!(output.channel(0)[0].abs() >= stats.peak);
    assert_eq!(stats.clipping_count, 24);
    assert!(output.channel(0)[2000..].iter().all(|s| s.abs() < 0.3));
    assert!((stats.rms - 0.2083).abs() < 1e-3, "rms {}", stats.rms);
    assert_eq!(stats.score, 100);
}

#[tokio::test]
async fn zero_byte_file_is_decode_error() {
    let engine = engine();
    let err = engine
        .process_track(Vec::new(), Some("mp3"), MixPreset::Clean)
        .await
        .unwrap_err();
    assert!(matches!(err, MixroomError::Decode(_)));
    assert!(err.is_user_recoverable());
}

#[tokio::test]
async fn sequential_files_hold_one_context_at_a_time() {
    let engine = engine();
    let presets = MixPreset::ALL;

    for i in 0..20 {
        let tone = AudioBuffer::mono(
            sine(200.0 + i as f32 * 30.0, 0.5, 22_050, 2_205),
            SampleRate::new(22_050),
        )
        .unwrap();
        engine
            .process_track(wav_file(&tone), Some("wav"), presets[i % presets.len()])
            .await
            .unwrap();

        assert_eq!(engine.contexts().open_count(), 0, "file {i} leaked a context");
    }

    assert_eq!(engine.contexts().peak_open(), 1);
}

#[tokio::test]
async fn failed_files_release_contexts_too() {
    let engine = engine();
    for _ in 0..10 {
        let _ = engine
            .process_track(b"RIFF garbage".to_vec(), Some("wav"), MixPreset::Clean)
            .await;
        assert_eq!(engine.contexts().open_count(), 0);
    }
}

#[tokio::test]
async fn exhausted_contexts_fail_fast() {
    init_tracing();
    let engine = MixEngine::new(&EngineSettings {
        max_open_contexts: 1,
        render_quantum: 128,
    });
    let file = wav_file(&program_material(8_000, 800));

    let held = engine.contexts().open(ContextKind::Render).unwrap();
    let err = engine
        .process_track(file.clone(), Some("wav"), MixPreset::Clean)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MixroomError::ResourceExhausted {
            kind: ContextKind::Decode,
            limit: 1
        }
    ));
    assert!(!err.is_user_recoverable());

    drop(held);
    assert!(engine
        .process_track(file, Some("wav"), MixPreset::Clean)
        .await
        .is_ok());
}

#[tokio::test]
async fn concurrent_tracks_stay_within_limit() {
    let engine = engine();
    let file = wav_file(&program_material(22_050, 11_025));

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            let file = file.clone();
            tokio::spawn(async move {
                engine
                    .process_track(file, Some("wav"), MixPreset::ALL[i])
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(engine.contexts().open_count(), 0);
    assert!(engine.contexts().peak_open() <= 6);
}

#[tokio::test]
async fn process_file_reads_from_disk() {
    let engine = engine();
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("take-01.wav");
    std::fs::write(&path, wav_file(&program_material(44_100, 4_410))).unwrap();

    let mix = engine.process_file(&path, MixPreset::Dark).await.unwrap();
    assert_eq!(mix.preset, MixPreset::Dark);
    assert_eq!(mix.wav.len(), WAV_HEADER_LEN + 4_410 * 2 * 2);
}
