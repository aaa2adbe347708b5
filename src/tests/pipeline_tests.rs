//! # End-to-End Decode Tests
//!
//! These tests drive the whole measurement path (edge timestamps, capture buffer,
//! frame search, averaging, temperature lookup and reporting) with synthetic UTI
//! signals, the way the binary does in `--simulate` mode. They run quickly and need
//! no hardware.

use std::fs;
use tempfile::TempDir;
use uti_pt100_lib::config::UtiConfig;
use uti_pt100_lib::curve::TemperatureCurve;
use uti_pt100_lib::decoder::Decoder;
use uti_pt100_lib::report::{load_last_reading, report_all, FileSink, ReadingSink};
use uti_pt100_lib::sample_buffer::{EdgeCapture, RecordOutcome, SampleBuffer};
use uti_pt100_lib::simulator::UtiSimulator;
use uti_pt100_lib::DecodeError;

fn decoder_for(config: &UtiConfig) -> Decoder {
    Decoder::new(config, TemperatureCurve::pt100()).expect("default config is valid")
}

/// Test that simulated sensors decode to their own temperature across the table.
///
/// Covers all three temperature bands and every start phase within a cycle.
#[test]
fn simulated_temperatures_decode_within_tolerance() {
    let config = UtiConfig::default();
    let decoder = decoder_for(&config);

    for phase in 0..4 {
        let simulator = UtiSimulator::new(config.reference_resistance).with_phase(phase);
        let mut celsius = -45.0;
        while celsius <= 395.0 {
            let buffer = simulator
                .capture(decoder.curve(), celsius, config.capacity)
                .expect("temperature inside table");
            let m = decoder
                .decode_measurement(&buffer)
                .unwrap_or_else(|e| panic!("{celsius}°C phase {phase}: {e}"));

            assert!(
                (m.temperature_c - celsius).abs() < 0.1,
                "{celsius}°C at phase {phase} decoded as {:.3}°C",
                m.temperature_c
            );
            assert!(m.sof_index > 0 && m.sof_index < config.cycle_length + 1);
            assert_eq!(m.cycles_skipped, 0);
            celsius += 12.5;
        }
    }
}

/// Test that cycles longer than four slots decode when the simulator and the
/// decoder share the configured cycle length.
#[test]
fn five_slot_cycles_decode_at_every_phase() {
    let config = UtiConfig {
        cycle_length: 5,
        ..UtiConfig::default()
    };
    let decoder = decoder_for(&config);

    for phase in 0..5 {
        let simulator = UtiSimulator::new(config.reference_resistance)
            .with_cycle_length(config.cycle_length)
            .with_phase(phase);
        let buffer = simulator
            .capture(decoder.curve(), 25.0, config.capacity)
            .unwrap();
        let m = decoder
            .decode_measurement(&buffer)
            .unwrap_or_else(|e| panic!("phase {phase}: {e}"));

        assert!(
            (m.temperature_c - 25.0).abs() < 0.1,
            "phase {phase} decoded as {:.3}°C",
            m.temperature_c
        );
        assert!(m.sof_index > 0 && m.sof_index <= config.cycle_length);
        assert_eq!(m.cycles_used, 12);
    }
}

/// Test that edges arriving after the buffer sealed do not change the result.
#[test]
fn edges_after_seal_are_ignored() {
    let config = UtiConfig::default();
    let decoder = decoder_for(&config);
    let simulator = UtiSimulator::new(config.reference_resistance);

    let timestamps = simulator.edge_timestamps(109.73, 5_000, config.capacity + 20);
    let mut capture = EdgeCapture::new(config.capacity);
    let outcomes: Vec<RecordOutcome> = timestamps.iter().map(|&ts| capture.on_edge(ts)).collect();

    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == RecordOutcome::Sealed)
            .count(),
        1
    );
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == RecordOutcome::Overrun)
            .count(),
        20
    );

    let buffer = capture.into_buffer();
    let reference = SampleBuffer::from_durations(simulator.durations(109.73, config.capacity));
    assert_eq!(
        decoder.decode_measurement(&buffer).unwrap(),
        decoder.decode_measurement(&reference).unwrap()
    );
}

/// Test that buffers too short to hold a complete cycle after the frame start
/// never produce a value.
#[test]
fn short_buffers_report_insufficient_cycles() {
    let simulator = UtiSimulator::new(100.0).with_phase(1);
    // Phase 1 puts the frame start at index 3
    for len in 0..7 {
        let config = UtiConfig {
            capacity: len.max(1),
            ..UtiConfig::default()
        };
        let decoder = decoder_for(&config);
        let buffer = SampleBuffer::from_durations(simulator.durations(109.73, len));
        assert!(
            matches!(
                decoder.decode(&buffer),
                Err(DecodeError::InsufficientCycles { .. })
            ),
            "length {len} should not decode"
        );
    }
}

/// Test that an injected pair of equal minima is reported, not guessed.
#[test]
fn equal_minima_abort_the_session() {
    let decoder = decoder_for(&UtiConfig::default());
    let mut durations = UtiSimulator::new(100.0)
        .with_phase(1)
        .durations(109.73, 64);
    durations[3] = 100;
    durations[4] = 100;

    let outcome = decoder.decode(&SampleBuffer::from_durations(durations));
    assert_eq!(outcome, Err(DecodeError::AmbiguousSof { index: 3 }));
    assert!(outcome.unwrap_err().is_session_fatal());
}

/// Test the unweighted mean over exactly three cycles with known resistances.
#[test]
fn three_cycle_buffer_averages_known_resistances() {
    let config = UtiConfig {
        capacity: 13,
        ..UtiConfig::default()
    };
    let decoder = decoder_for(&config);

    // Noff = 21, Nab = 220: R = 100 * (Ncd - 21) / 199
    #[rustfmt::skip]
    let buffer = SampleBuffer::from_durations(vec![
        5_000,
        10, 11, 220, 160,
        10, 11, 220, 220,
        10, 11, 220, 300,
    ]);
    let m = decoder.decode_measurement(&buffer).unwrap();
    let expected = [160.0, 220.0, 300.0]
        .iter()
        .map(|ncd: &f64| 100.0 * (ncd - 21.0) / 199.0)
        .sum::<f64>()
        / 3.0;

    assert_eq!(m.sof_index, 1);
    assert_eq!(m.cycles_used, 3);
    assert!((m.resistance_ohms - expected).abs() < 1e-9);
    assert!((m.temperature_c - 8.59).abs() < 0.01, "{m:?}");
}

/// Test that decoding the same sealed buffer twice is bit-identical.
#[test]
fn repeated_decode_is_bit_identical() {
    let config = UtiConfig::default();
    let decoder = decoder_for(&config);
    let buffer = UtiSimulator::new(100.0)
        .capture(decoder.curve(), 237.5, config.capacity)
        .unwrap();

    let first = decoder.decode_measurement(&buffer).unwrap();
    for _ in 0..10 {
        let again = decoder.decode_measurement(&buffer).unwrap();
        assert_eq!(again.resistance_ohms.to_bits(), first.resistance_ohms.to_bits());
        assert_eq!(again.temperature_c.to_bits(), first.temperature_c.to_bits());
        assert_eq!(again, first);
    }
}

/// Test that reports reach the files and failures leave them alone.
#[test]
fn session_outcomes_reach_report_files() {
    let dir = TempDir::new().expect("Should create temp dir");
    let temp_path = dir.path().join("temperature.txt");
    let json_path = dir.path().join("reading.json");

    let config = UtiConfig::default();
    let decoder = decoder_for(&config);
    let mut sinks: Vec<Box<dyn ReadingSink>> = vec![Box::new(FileSink::new(&temp_path, &json_path))];

    let buffer = UtiSimulator::new(100.0)
        .capture(decoder.curve(), 60.0, config.capacity)
        .unwrap();
    let outcome = decoder.decode(&buffer);
    report_all(&mut sinks, &outcome);

    let written: f64 = fs::read_to_string(&temp_path)
        .expect("temperature file written")
        .trim()
        .parse()
        .expect("single number");
    assert!((written - 60.0).abs() < 0.1);

    let saved = load_last_reading(&json_path).expect("reading file written");
    assert_eq!(saved.measurement, outcome.unwrap().measurement);

    // A failed session keeps the previous temperature
    report_all(
        &mut sinks,
        &Err(DecodeError::InsufficientCycles { fitted: 0, valid: 0 }),
    );
    let kept: f64 = fs::read_to_string(&temp_path).unwrap().trim().parse().unwrap();
    assert_eq!(kept, written);
}
