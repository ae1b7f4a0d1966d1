//! Manager-level lifecycle tests: set/get, replacement, overlap policy,
//! stop idempotence, event ordering, and effector degradation.

mod common;

use common::{harness, harness_with, settings, RecordingAudio};
use reveille_core::{AlarmEvent, RingState, RuntimeOptions};

#[tokio::test]
async fn set_then_get_roundtrip() {
    let h = harness();
    let mut s = settings(1);
    s.payload = Some("breakfast".into());

    h.manager.set_alarm(s.clone()).unwrap();

    let stored = h.manager.get_alarms().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], s);
    assert_eq!(h.manager.get_alarm(1).unwrap(), s);
    assert_eq!(h.manager.alarm_state(1), Some(RingState::Scheduled));
    assert!(!h.manager.is_ringing(Some(1)));
}

#[tokio::test]
async fn get_alarm_for_unknown_id_is_not_found() {
    let h = harness();
    assert!(h.manager.get_alarm(42).is_err());
}

#[tokio::test]
async fn invalid_settings_rejected_before_any_mutation() {
    let h = harness();
    let mut s = settings(1);
    s.volume_settings.volume = Some(2.0);

    assert!(h.manager.set_alarm(s).is_err());
    assert!(h.manager.get_alarms().unwrap().is_empty());
    assert!(h.scheduler.armed_ids().is_empty());
}

#[tokio::test]
async fn setting_colliding_id_replaces_and_stops_the_first() {
    let h = harness();
    h.manager.set_alarm(settings(1)).unwrap();
    assert!(h.scheduler.fire(1));
    assert!(h.manager.is_ringing(Some(1)));
    assert!(h.audio.is_playing(1));

    let mut replacement = settings(1);
    replacement.asset_audio_path = "sounds/horn.mp3".into();
    h.manager.set_alarm(replacement.clone()).unwrap();

    // The first ringer was stopped before the second registration.
    assert!(!h.manager.is_ringing(Some(1)));
    assert!(!h.audio.is_playing(1));
    assert_eq!(h.sink.stopped_ids(), vec![1]);

    let stored = h.manager.get_alarms().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], replacement);
    assert_eq!(h.manager.alarm_state(1), Some(RingState::Scheduled));
}

#[tokio::test]
async fn first_ringer_wins_when_overlap_disallowed() {
    let h = harness();
    h.manager.set_alarm(settings(1)).unwrap();
    h.manager.set_alarm(settings(2)).unwrap();

    assert!(h.scheduler.fire(1));
    assert!(h.scheduler.fire(2));

    assert!(h.manager.is_ringing(Some(1)));
    assert!(!h.manager.is_ringing(Some(2)));
    assert_eq!(h.sink.rang_ids(), vec![1]);
    // The late arrival was fully stopped: record gone, nothing armed.
    assert!(h.manager.get_alarm(2).is_err());
    // Strict policy: a never-rang alarm emits no stopped event.
    assert!(h.sink.stopped_ids().is_empty());
}

#[tokio::test]
async fn overlap_allowed_alarms_ring_concurrently() {
    let h = harness();
    let mut a = settings(1);
    a.allow_alarm_overlap = true;
    let mut b = settings(2);
    b.allow_alarm_overlap = true;

    h.manager.set_alarm(a).unwrap();
    h.manager.set_alarm(b).unwrap();
    h.scheduler.fire(1);
    h.scheduler.fire(2);

    assert!(h.manager.is_ringing(Some(1)));
    assert!(h.manager.is_ringing(Some(2)));
    assert_eq!(h.sink.rang_ids(), vec![1, 2]);
}

#[tokio::test]
async fn stop_is_idempotent_and_emits_once() {
    let h = harness();
    h.manager.set_alarm(settings(1)).unwrap();
    h.scheduler.fire(1);
    assert!(h.manager.is_ringing(Some(1)));

    h.manager.stop_alarm(1).unwrap();
    assert!(!h.manager.is_ringing(Some(1)));
    assert_eq!(h.sink.stopped_ids(), vec![1]);

    // Second stop: same end state, no extra event, no error.
    h.manager.stop_alarm(1).unwrap();
    assert!(!h.manager.is_ringing(Some(1)));
    assert_eq!(h.sink.stopped_ids(), vec![1]);
}

#[tokio::test]
async fn stop_of_unknown_id_is_benign() {
    let h = harness();
    h.manager.stop_alarm(999).unwrap();
    assert!(h.sink.events().is_empty());
}

#[tokio::test]
async fn events_for_one_id_are_causally_ordered() {
    let h = harness();
    let mut s = settings(1);
    s.payload = Some("p1".into());
    h.manager.set_alarm(s).unwrap();
    h.scheduler.fire(1);
    h.manager.stop_alarm(1).unwrap();

    let events = h.sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        AlarmEvent::Rang { alarm_id: 1, payload: Some(p), .. } if p.as_str() == "p1"
    ));
    assert!(matches!(
        &events[1],
        AlarmEvent::Stopped { alarm_id: 1, payload: Some(p), .. } if p.as_str() == "p1"
    ));
}

#[tokio::test]
async fn cancelling_scheduled_alarm_is_silent_by_default() {
    let h = harness();
    h.manager.set_alarm(settings(1)).unwrap();
    h.manager.stop_alarm(1).unwrap();

    assert!(h.sink.events().is_empty());
    assert!(h.manager.get_alarms().unwrap().is_empty());
    assert!(h.scheduler.armed_ids().is_empty());
}

#[tokio::test]
async fn cancelling_scheduled_alarm_notifies_when_configured() {
    let options = RuntimeOptions {
        notify_cancelled: true,
        ..Default::default()
    };
    let h = harness_with(options, RecordingAudio::default());
    h.manager.set_alarm(settings(1)).unwrap();
    h.manager.stop_alarm(1).unwrap();

    assert_eq!(h.sink.stopped_ids(), vec![1]);
}

#[tokio::test]
async fn rings_without_sound_when_audio_fails() {
    let h = harness_with(RuntimeOptions::default(), RecordingAudio::failing());
    h.manager.set_alarm(settings(1)).unwrap();
    h.scheduler.fire(1);

    // Degraded, not failed: state and event still happen.
    assert!(h.manager.is_ringing(Some(1)));
    assert_eq!(h.sink.rang_ids(), vec![1]);
    assert_eq!(h.notification.shown_ids(), vec![1]);
}

#[tokio::test]
async fn stop_transitions_survive_persistence_failure() {
    use common::{FlakyStore, RecordingSink};
    use std::sync::Arc;

    let store = Arc::new(FlakyStore::default());
    let scheduler = Arc::new(reveille_core::ManualScheduler::new());
    let sink = Arc::new(RecordingSink::default());
    let manager = reveille_core::AlarmManager::new(
        store.clone(),
        scheduler.clone(),
        reveille_core::Effects::null(),
        sink.clone(),
        RuntimeOptions::default(),
    );

    manager.set_alarm(settings(1)).unwrap();
    scheduler.fire(1);
    assert!(manager.is_ringing(Some(1)));

    // Durable storage degrades; the in-memory ring state must stay
    // authoritative and the stop must still go through.
    store.fail_writes(true);
    manager.stop_alarm(1).unwrap();
    assert!(!manager.is_ringing(Some(1)));
    assert_eq!(sink.stopped_ids(), vec![1]);

    // And a degraded store also fails set_alarm loudly.
    assert!(manager.set_alarm(settings(2)).is_err());
}

#[tokio::test]
async fn stop_all_clears_every_live_and_stored_alarm() {
    let h = harness();
    h.manager.set_alarm(settings(1)).unwrap();
    h.manager.set_alarm(settings(2)).unwrap();
    h.manager.set_alarm(settings(3)).unwrap();
    h.scheduler.fire(1);

    h.manager.stop_all().unwrap();

    assert!(!h.manager.is_ringing(None));
    assert!(h.manager.get_alarms().unwrap().is_empty());
    assert!(h.scheduler.armed_ids().is_empty());
    // Only the alarm that actually rang notifies under the strict policy.
    assert_eq!(h.sink.stopped_ids(), vec![1]);
}

#[tokio::test]
async fn kill_warning_follows_the_stored_set() {
    let h = harness();
    assert!(h.notification.kill_warning().is_none());

    h.manager.set_alarm(settings(1)).unwrap();
    let (title, _) = h.notification.kill_warning().expect("warning shown");
    assert_eq!(title, "Your alarms may not ring");

    h.manager
        .set_warning_notification_on_kill("Heads up".into(), "Alarms need the app".into());
    let (title, body) = h.notification.kill_warning().expect("warning kept");
    assert_eq!(title, "Heads up");
    assert_eq!(body, "Alarms need the app");

    h.manager.stop_alarm(1).unwrap();
    assert!(h.notification.kill_warning().is_none());
}

#[tokio::test]
async fn alarms_opting_out_do_not_hold_the_kill_warning() {
    let h = harness();
    let mut s = settings(1);
    s.warning_notification_on_kill = false;
    h.manager.set_alarm(s).unwrap();

    assert!(h.notification.kill_warning().is_none());
}

#[tokio::test]
async fn system_volume_restored_exactly_once() {
    let h = harness();
    let mut s = settings(1);
    s.volume_settings.volume = Some(0.5);
    h.manager.set_alarm(s).unwrap();
    h.scheduler.fire(1);
    assert!((h.system_volume.level() - 0.5).abs() < 1e-9);

    h.manager.stop_alarm(1).unwrap();
    assert!((h.system_volume.level() - 0.8).abs() < 1e-9);
    // One capture-set, one restore-set.
    assert_eq!(h.system_volume.set_history(), vec![0.5, 0.8]);

    // A second stop must not restore again.
    h.manager.stop_alarm(1).unwrap();
    assert_eq!(h.system_volume.set_history(), vec![0.5, 0.8]);
}

#[tokio::test]
async fn overlapping_ringers_restore_volume_when_the_last_stops() {
    let h = harness();
    for id in [1, 2] {
        let mut s = settings(id);
        s.allow_alarm_overlap = true;
        s.volume_settings.volume = Some(0.6);
        h.manager.set_alarm(s).unwrap();
        h.scheduler.fire(id);
    }
    assert!((h.system_volume.level() - 0.6).abs() < 1e-9);

    h.manager.stop_alarm(1).unwrap();
    // First stop must not restore while another holder rings.
    assert!((h.system_volume.level() - 0.6).abs() < 1e-9);

    h.manager.stop_alarm(2).unwrap();
    assert!((h.system_volume.level() - 0.8).abs() < 1e-9);
}
