use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tempfile::TempDir;
use tippbot::gateway::{RecordingNotifier, ReminderRunner, StoredReminderScheduler};
use tippbot::{init_db, ChatId, FixedClock, GameSettings, LifecycleManager, Repository};

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

struct Harness {
    lifecycle: LifecycleManager,
    runner: ReminderRunner,
    notifier: Arc<RecordingNotifier>,
    clock: Arc<FixedClock>,
    _temp: TempDir,
}

async fn setup() -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let clock = Arc::new(FixedClock::new(at("2025-06-06T10:00:00Z")));
    let notifier = Arc::new(RecordingNotifier::new());

    let lifecycle = LifecycleManager::new(
        repo.clone(),
        Arc::new(StoredReminderScheduler::new(repo.clone())),
        clock.clone(),
        GameSettings::default(),
    );
    let runner = ReminderRunner::new(
        repo,
        notifier.clone(),
        clock.clone(),
        std::time::Duration::from_millis(10),
    );

    Harness {
        lifecycle,
        runner,
        notifier,
        clock,
        _temp: temp_dir,
    }
}

#[tokio::test]
async fn test_reminder_delivered_half_an_hour_before_kickoff() {
    let h = setup().await;
    let chat = ChatId::new(-1001);
    h.lifecycle
        .create(chat, "A vs B", "2025-06-06 20:45")
        .await
        .unwrap();

    h.clock.set(at("2025-06-06T20:14:59Z"));
    assert_eq!(h.runner.dispatch_due().await.unwrap(), 0);

    h.clock.advance(Duration::seconds(1));
    assert_eq!(h.runner.dispatch_due().await.unwrap(), 1);

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, chat);
    assert!(sent[0].1.contains("A vs B"));
    assert!(sent[0].1.contains("06.06.2025 20:45"));

    // Delivered once only.
    h.clock.advance(Duration::minutes(10));
    assert_eq!(h.runner.dispatch_due().await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleted_match_has_no_reminder() {
    let h = setup().await;
    let created = h
        .lifecycle
        .create(ChatId::new(-1001), "A vs B", "2025-06-06 20:45")
        .await
        .unwrap();
    assert!(h.lifecycle.delete(created.id).await.unwrap());

    h.clock.set(at("2025-06-06T20:30:00Z"));
    assert_eq!(h.runner.dispatch_due().await.unwrap(), 0);
    assert!(h.notifier.sent().is_empty());
}
