use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::time::sleep;

use timer_app::{
    notify::{AlertRequest, Alerts},
    state::{NotificationSettings, SoundRequest, TimerConfig, TimerDraft},
    tasks::resume_persisted_timer,
    ConfigStore, FileStore, TimerRuntime,
};

struct Silent;

#[async_trait]
impl Alerts for Silent {
    async fn notify(&self, _alert: AlertRequest) {}
    async fn play_start_sound(&self, _sound: SoundRequest) {}
}

fn open(dir: &std::path::Path) -> ConfigStore {
    ConfigStore::new(Arc::new(FileStore::open(dir).unwrap()))
}

fn tea(id: &str, duration: f64) -> TimerConfig {
    TimerDraft {
        name: "Tea".into(),
        duration,
        ..TimerDraft::default()
    }
    .into_config(id.into())
    .unwrap()
}

#[test]
fn timers_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(dir.path());
        store.upsert_timer(tea("a", 45.0)).unwrap();
        store.upsert_timer(tea("b", 10.0)).unwrap();
    }

    let store = open(dir.path());
    let timers = store.load_timers().unwrap();
    assert_eq!(timers.len(), 2);
    let b = store.find_timer("b").unwrap();
    // default intervals above the duration were dropped
    assert_eq!(b.notifications.intervals, vec![5.0]);
    assert!(dir.path().join("timers.json").exists());
}

#[test]
fn malformed_files_read_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("timers.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("active_timer.json"), "[1, 2").unwrap();
    std::fs::write(dir.path().join("settings.json"), "\"loud\"").unwrap();

    let store = open(dir.path());
    assert!(store.load_timers().is_err());
    assert!(store.timers().is_empty());
    assert!(store.active_timer().is_none());
    assert_eq!(store.settings(), NotificationSettings::default());
}

#[tokio::test(start_paused = true)]
async fn interrupted_run_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = tea("a", 1.0);

    {
        let store = open(dir.path());
        store.upsert_timer(config.clone()).unwrap();
        let runtime = TimerRuntime::new(store.clone(), Arc::new(Silent));
        runtime.activate(config).await.unwrap();
        runtime.start().await.unwrap();
        sleep(Duration::from_millis(5_500)).await;
        runtime.shutdown().await;
    }

    let store = open(dir.path());
    let runtime = TimerRuntime::new(store.clone(), Arc::new(Silent));
    let view = resume_persisted_timer(&runtime, &store).await.unwrap();
    assert_eq!(view.timer_id, "a");
    assert_eq!(view.remaining_time, 55_000);
    assert!(view.is_running);
    assert!(runtime.is_ticking().await);

    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(runtime.view().await.unwrap().remaining_time, 53_000);
}

#[tokio::test(start_paused = true)]
async fn snapshot_of_a_deleted_timer_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let config = tea("gone", 1.0);
    store.upsert_timer(config.clone()).unwrap();

    let runtime = TimerRuntime::new(store.clone(), Arc::new(Silent));
    runtime.activate(config).await.unwrap();
    runtime.start().await.unwrap();
    runtime.shutdown().await;
    assert!(store.active_timer().is_some());

    assert!(store.delete_timer("gone").unwrap());
    let fresh = TimerRuntime::new(store.clone(), Arc::new(Silent));
    assert!(resume_persisted_timer(&fresh, &store).await.is_none());
    assert!(store.active_timer().is_none());
    assert!(!dir.path().join("active_timer.json").exists());
}

#[tokio::test(start_paused = true)]
async fn completed_run_leaves_nothing_to_resume() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    let config = tea("short", 0.05);
    store.upsert_timer(config.clone()).unwrap();

    let runtime = TimerRuntime::new(store.clone(), Arc::new(Silent));
    runtime.activate(config).await.unwrap();
    runtime.start().await.unwrap();
    sleep(Duration::from_millis(3_500)).await;

    assert_eq!(runtime.view().await.unwrap().remaining_time, 0);
    assert!(store.active_timer().is_none());
    let next = TimerRuntime::new(store.clone(), Arc::new(Silent));
    assert!(resume_persisted_timer(&next, &store).await.is_none());
}

#[test]
fn concurrent_creates_on_disk_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    std::thread::scope(|scope| {
        for i in 0..16 {
            let store = store.clone();
            scope.spawn(move || {
                store.upsert_timer(tea(&format!("t{}", i), 5.0)).unwrap();
            });
        }
    });

    let reopened = open(dir.path());
    assert_eq!(reopened.load_timers().unwrap().len(), 16);
}

#[test]
fn one_bad_entry_does_not_wipe_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path());
    store.upsert_timer(tea("a", 10.0)).unwrap();
    store.upsert_timer(tea("b", 10.0)).unwrap();

    let path = dir.path().join("timers.json");
    let damaged = std::fs::read_to_string(&path)
        .unwrap()
        .replacen("\"default\"", "\"Beep\"", 1);
    std::fs::write(&path, &damaged).unwrap();

    assert!(store.upsert_timer(tea("c", 10.0)).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), damaged);
}
