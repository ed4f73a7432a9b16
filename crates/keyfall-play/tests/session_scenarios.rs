use keyfall_input::{
    EdgeDetector, InputEdge, InputSource, KeyMap, ScriptedInput, ScriptedInputConfig,
};
use keyfall_model::Chart;
use keyfall_play::recorder::{RecordingRenderer, RecordingSounds, SoundCue};
use keyfall_play::{Session, SessionError, SessionPhase, TickOutcome};
use keyfall_rule::{Grade, Rating};
use keyfall_timing::{AudioClock, ManualClockHandle, ManualOutput};

type TestSession = Session<ManualOutput, RecordingRenderer, RecordingSounds>;

const FRAME_US: i64 = 16_667;

fn session_with(lane_count: usize, notes: &[(usize, f64)]) -> (TestSession, ManualClockHandle) {
    let (output, handle) = ManualOutput::with_handle();
    let chart = Chart::from_secs(lane_count, notes).unwrap();
    let session = Session::new(
        AudioClock::new(output),
        chart,
        RecordingRenderer::new(),
        RecordingSounds::new(),
    );
    (session, handle)
}

/// Tick at frame cadence until the session ends, feeding scripted input.
fn run_to_end(
    session: &mut TestSession,
    handle: &ManualClockHandle,
    mut script: Option<&mut ScriptedInput>,
) -> keyfall_play::SessionReport {
    for _ in 0..100_000 {
        handle.advance_us(FRAME_US);
        if let Some(script) = script.as_deref_mut() {
            let song = session.song_time_us();
            for stamped in script.poll_up_to(song) {
                session
                    .input_queue_mut()
                    .push(stamped.edge, stamped.song_time_us);
            }
        }
        if let TickOutcome::Ended(report) = session.tick() {
            return report;
        }
    }
    panic!("session never ended");
}

// --- scenarios ---

#[test]
fn end_to_end_good_hit() {
    let (mut session, handle) = session_with(4, &[(0, 2.0)]);
    session.start().unwrap();

    handle.set_time_us(2_090_000);
    let result = session.handle_press(0).unwrap();
    assert_eq!(result.rating, Rating::Good);
    assert_eq!(result.offset_us, 90_000);
    assert_eq!(session.stats().score(), 50);
    assert_eq!(session.stats().current_combo(), 1);
}

#[test]
fn miss_by_timeout() {
    let (mut session, handle) = session_with(4, &[(0, 1.0)]);
    session.start().unwrap();

    while session.song_time_us() <= 1_121_000 {
        handle.advance_us(FRAME_US);
        assert_eq!(session.tick(), TickOutcome::Continue);
    }
    assert!(session.chart().notes()[0].is_judged());
    assert_eq!(session.stats().miss_count(), 1);
    assert_eq!(session.stats().current_combo(), 0);
    assert!(session.sounds().cues().contains(&SoundCue::Miss));
}

#[test]
fn every_note_judged_exactly_once() {
    let notes: Vec<(usize, f64)> = (0..40)
        .map(|i| (i % 4, 1.0 + i as f64 * 0.137))
        .collect();
    let (mut session, handle) = session_with(4, &notes);
    let mut script = ScriptedInput::new(
        session.chart(),
        ScriptedInputConfig {
            miss_every: Some(3),
            ..Default::default()
        },
    );
    session.start().unwrap();

    let report = run_to_end(&mut session, &handle, Some(&mut script));
    assert_eq!(report.total_notes, 40);
    assert_eq!(report.judged_count(), 40);
    assert_eq!(report.miss_count as usize, script.skipped_notes());
    assert!(session.chart().all_judged());
}

#[test]
fn skipping_frames_still_judges_everything() {
    let (mut session, handle) = session_with(2, &[(0, 1.0), (1, 1.5), (0, 2.0)]);
    session.start().unwrap();

    handle.set_time_us(500_000);
    assert_eq!(session.tick(), TickOutcome::Continue);
    // One huge frame gap straight past the end of the chart
    handle.set_time_us(10_000_000);
    let TickOutcome::Ended(report) = session.tick() else {
        panic!("expected the session to end");
    };
    assert_eq!(report.miss_count, 3);
    assert!(session.chart().all_judged());
}

#[test]
fn autoplay_scores_all_perfect() {
    let notes: Vec<(usize, f64)> = (0..25).map(|i| (i % 4, 0.5 + i as f64 * 0.2)).collect();
    let (mut session, handle) = session_with(4, &notes);
    let mut script = ScriptedInput::new(session.chart(), ScriptedInputConfig::default());
    session.start().unwrap();

    let report = run_to_end(&mut session, &handle, Some(&mut script));
    assert_eq!(report.perfect_count, 25);
    assert_eq!(report.score, 2_500);
    assert_eq!(report.max_combo, 25);
    assert_eq!(report.accuracy, 100.0);
    assert_eq!(report.grade, Grade::S);
    assert!(report.is_full_combo());
    assert_eq!(session.sounds().chimes(), vec![10, 20]);
}

#[test]
fn late_autoplay_lands_in_good_window() {
    let notes: Vec<(usize, f64)> = (0..10).map(|i| (0, 1.0 + i as f64 * 0.5)).collect();
    let (mut session, handle) = session_with(1, &notes);
    let mut script = ScriptedInput::new(
        session.chart(),
        ScriptedInputConfig {
            offset_us: 90_000,
            ..Default::default()
        },
    );
    session.start().unwrap();

    let report = run_to_end(&mut session, &handle, Some(&mut script));
    assert_eq!(report.good_count, 10);
    assert_eq!(report.slow_count, 10);
    assert_eq!(report.mean_offset_us, Some(90_000));
    assert_eq!(report.accuracy, 50.0);
    assert_eq!(report.grade, Grade::F);
}

#[test]
fn pause_does_not_shift_judgment() {
    let (mut session, handle) = session_with(4, &[(2, 2.0)]);
    session.start().unwrap();

    handle.set_time_us(1_000_000);
    session.tick();
    session.pause();
    // Ten seconds on the pause screen
    handle.advance_us(10_000_000);
    session.tick();
    assert_eq!(session.song_time_us(), 1_000_000);
    assert_eq!(session.stats().miss_count(), 0);
    session.resume();

    handle.advance_us(1_000_000);
    let result = session.handle_press(2).unwrap();
    assert_eq!(result.rating, Rating::Perfect);
    assert_eq!(result.offset_us, 0);
}

#[test]
fn restart_replays_same_chart() {
    let (mut session, handle) = session_with(4, &[(0, 1.0), (1, 1.5)]);
    for _ in 0..3 {
        session.start().unwrap();
        assert_eq!(session.song_time_us(), 0);
        let report = run_to_end(&mut session, &handle, None);
        assert_eq!(report.miss_count, 2);
        assert_eq!(session.phase(), SessionPhase::Ended);
        session.reset();
        assert_eq!(session.chart().judged_count(), 0);
    }
    assert_eq!(handle.open_count(), 3);
    assert_eq!(handle.close_count(), 3);
}

#[test]
fn stop_mid_song_then_start_again() {
    let (mut session, handle) = session_with(4, &[(0, 1.0), (0, 5.0)]);
    session.start().unwrap();
    handle.advance_us(2_000_000);
    session.tick();
    assert_eq!(session.stats().miss_count(), 1);

    session.stop();
    assert_eq!(session.tick(), TickOutcome::Stopped);
    assert!(!handle.is_open());

    // start() clears the previous attempt
    session.start().unwrap();
    assert_eq!(session.stats().total_judged(), 0);
    assert_eq!(session.song_time_us(), 0);
    handle.advance_us(1_000_000);
    assert_eq!(session.handle_press(0).map(|r| r.rating), Some(Rating::Perfect));
}

#[test]
fn start_failure_surfaces_and_allows_retry() {
    let (mut session, handle) = session_with(4, &[(0, 1.0)]);
    handle.set_refuse_open(true);
    let err = session.start().unwrap_err();
    assert!(matches!(err, SessionError::PlaybackUnavailable(_)));
    assert!(err.to_string().contains("playback unavailable"));
    assert_eq!(session.phase(), SessionPhase::Idle);

    handle.set_refuse_open(false);
    session.start().unwrap();
    assert_eq!(session.phase(), SessionPhase::Running);
}

#[test]
fn teardown_failure_does_not_block_restart() {
    let (mut session, handle) = session_with(4, &[(0, 1.0)]);
    session.start().unwrap();
    handle.set_fail_close(true);
    session.stop();
    assert!(!handle.is_open());

    handle.set_fail_close(false);
    session.start().unwrap();
    assert!(handle.is_open());
}

#[test]
fn calibration_offset_delays_song_time() {
    let (mut session, handle) = session_with(4, &[(0, 1.0)]);
    session.clock_mut().set_offset(0.05);
    session.start().unwrap();

    handle.set_time_us(1_050_000);
    let result = session.handle_press(0).unwrap();
    assert_eq!(result.offset_us, 0);
}

#[test]
fn held_key_judges_once() {
    let (mut session, handle) = session_with(4, &[(1, 1.0), (1, 1.1)]);
    let keys = KeyMap::default();
    let mut detector = EdgeDetector::new();
    session.start().unwrap();

    handle.set_time_us(1_000_000);
    let lane = keys.lane_for("f").unwrap();
    // Key repeat delivers several downs for one physical press
    for _ in 0..5 {
        if let Some(edge) = detector.press(InputSource::Keyboard("f".into()), lane) {
            session.queue_edge(edge);
        }
    }
    handle.advance_us(FRAME_US);
    session.tick();
    assert_eq!(session.stats().total_judged(), 1);
    assert!(!session.chart().notes()[1].is_judged());
}

#[test]
fn unmapped_key_is_ignored() {
    let (mut session, handle) = session_with(4, &[(0, 1.0)]);
    let keys = KeyMap::default();
    session.start().unwrap();
    handle.set_time_us(1_000_000);
    assert_eq!(keys.lane_for("z"), None);
    session.tick();
    assert_eq!(session.stats().total_judged(), 0);
}

#[test]
fn queued_edges_keep_arrival_order() {
    let (mut session, handle) = session_with(4, &[(0, 1.0), (0, 1.2)]);
    session.start().unwrap();
    handle.set_time_us(1_300_000);
    session
        .input_queue_mut()
        .push(InputEdge::press(InputSource::Touch(1), 0), 1_000_000);
    session
        .input_queue_mut()
        .push(InputEdge::release(InputSource::Touch(1), 0), 1_050_000);
    session
        .input_queue_mut()
        .push(InputEdge::press(InputSource::Touch(1), 0), 1_250_000);
    session.tick();

    assert_eq!(session.stats().perfect_count(), 2);
    assert_eq!(
        session.sounds().cues(),
        &[SoundCue::Hit(Rating::Perfect), SoundCue::Hit(Rating::Perfect)]
    );
}

#[test]
fn input_before_start_is_ignored() {
    let (mut session, _handle) = session_with(4, &[(0, 0.0)]);
    assert_eq!(session.handle_press(0), None);
    assert_eq!(session.stats().total_judged(), 0);
}

#[test]
fn report_serializes_for_results_screen() {
    let (mut session, handle) = session_with(4, &[(0, 1.0)]);
    session.start().unwrap();
    handle.set_time_us(1_000_000);
    session.handle_press(0);
    let report = run_to_end(&mut session, &handle, None);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"perfectCount\":1"));
    assert!(json.contains("\"grade\":\"S\""));
}
