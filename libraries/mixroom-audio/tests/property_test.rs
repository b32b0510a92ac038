//! Property-based tests for the analyzer, encoder and renderer

use mixroom_audio::{
    analyze, chain_for, encode_wav, score_for, ContextTracker, OfflineRenderer, WAV_HEADER_LEN,
};
use mixroom_core::{AudioBuffer, MixPreset, SampleRate};
use proptest::prelude::*;

fn preset_strategy() -> impl Strategy<Value = MixPreset> {
    prop::sample::select(MixPreset::ALL.to_vec())
}

proptest! {
    #[test]
    fn clipping_penalties_are_cumulative(peak in 0.0f32..2.0, rms in 0.0f32..1.0) {
        let clean = score_for(peak, rms, 0);
        prop_assert_eq!(score_for(peak, rms, 100), clean);
        prop_assert_eq!(score_for(peak, rms, 150), clean.saturating_sub(20));
        prop_assert_eq!(score_for(peak, rms, 1000), clean.saturating_sub(20));
        prop_assert_eq!(score_for(peak, rms, 1001), clean.saturating_sub(50));
    }

    #[test]
    fn score_never_increases_with_clipping(
        peak in 0.0f32..2.0,
        rms in 0.0f32..1.0,
        a in 0u64..5000,
        b in 0u64..5000,
    ) {
        let (fewer, more) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score_for(peak, rms, more) <= score_for(peak, rms, fewer));
        prop_assert!(score_for(peak, rms, more) <= 100);
    }

    #[test]
    fn analysis_counts_every_clipped_sample(
        samples in prop::collection::vec(-1.5f32..1.5, 1..2000),
    ) {
        let expected = samples.iter().filter(|s| s.abs() >= 0.99).count() as u64;
        let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));

        let stats = analyze(&AudioBuffer::mono(samples, SampleRate::CD_QUALITY).unwrap());
        prop_assert_eq!(stats.clipping_count, expected);
        prop_assert_eq!(stats.clipping, expected > 0);
        prop_assert_eq!(stats.peak, peak);
        prop_assert!(stats.rms <= stats.peak + 1e-6);
    }

    #[test]
    fn wav_length_is_exact(
        frames in 0usize..3000,
        channels in 1usize..4,
        sample_rate in prop::sample::select(vec![8_000u32, 22_050, 44_100, 48_000, 96_000]),
    ) {
        let buffer = AudioBuffer::new(vec![vec![0.25; frames]; channels], SampleRate::new(sample_rate)).unwrap();
        let wav = encode_wav(&buffer).unwrap();

        prop_assert_eq!(wav.len(), WAV_HEADER_LEN + frames * channels * 2);
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        prop_assert_eq!(data_size as usize, frames * channels * 2);
    }

    #[test]
    fn rendering_preserves_layout_and_stays_finite(
        samples in prop::collection::vec(-1.0f32..1.0, 1..4000),
        stereo in any::<bool>(),
        preset in preset_strategy(),
    ) {
        let channels = if stereo { 2 } else { 1 };
        let usable = samples.len() - samples.len() % channels;
        prop_assume!(usable > 0);
        let input = AudioBuffer::from_interleaved(&samples[..usable], channels, SampleRate::CD_QUALITY).unwrap();

        let renderer = OfflineRenderer::new(ContextTracker::new(1), 128);
        let output = renderer.render(&input, chain_for(preset)).unwrap();

        prop_assert_eq!(output.channel_count(), input.channel_count());
        prop_assert_eq!(output.frames(), input.frames());
        prop_assert_eq!(output.sample_rate(), input.sample_rate());
        prop_assert!(output.channels().flatten().all(|s| s.is_finite()));
    }
}
