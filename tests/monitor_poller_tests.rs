
use common_test_utils::{fast_app_settings, wait_until, FakeSource};
use shinobi_view::config_loader::MasterConfig;
use shinobi_view::core::layout;
use shinobi_view::core::monitor_manager::MonitorManager;
use shinobi_view::core::monitor_poller::{MonitorPoller, PollTiming, RepaintHook};
use shinobi_view::core::snapshot_source::SnapshotSource;
use shinobi_view::shinobi::monitor_entity::{MonitorEntity, MonitorState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

const WAIT: Duration = Duration::from_secs(5);

fn counting_repaint() -> (RepaintHook, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook_count = Arc::clone(&count);
    let hook: RepaintHook = Arc::new(move || {
        hook_count.fetch_add(1, Ordering::SeqCst);
    });
    (hook, count)
}

fn poller_for(source: Arc<FakeSource>, repaint: RepaintHook) -> MonitorPoller {
    let entity = MonitorEntity::new(
        "cam1".to_string(),
        "http://nvr.local".to_string(),
        "/KEY/monitor/GRP/cam1".to_string(),
    );
    let timing = PollTiming::from(&fast_app_settings());
    MonitorPoller::new(entity, source as Arc<dyn SnapshotSource>, timing, repaint)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn retries_metadata_until_it_succeeds() {
    let source = FakeSource::new(3);
    let (repaint, repaints) = counting_repaint();
    let mut poller = poller_for(Arc::clone(&source), repaint);

    poller.start(&Handle::current());
    assert_eq!(poller.state(), MonitorState::Loading);

    assert!(wait_until(WAIT, || poller.metadata().is_some()).await);
    assert_eq!(source.metadata_calls(), 4);
    assert_eq!(poller.metadata().unwrap().snapshot, "/snap/KEY/monitor/GRP/cam1.jpg");

    assert!(wait_until(WAIT, || poller.state() == MonitorState::Playing).await);
    assert!(repaints.load(Ordering::SeqCst) >= 1);
    poller.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delivers_decoded_frames() {
    let source = FakeSource::new(0);
    let (repaint, _) = counting_repaint();
    let mut poller = poller_for(Arc::clone(&source), repaint);
    poller.start(&Handle::current());

    assert!(wait_until(WAIT, || source.snapshot_calls() >= 3).await);
    let frame = poller.take_latest_frame().expect("a frame was queued");
    assert_eq!((frame.width, frame.height), (8, 6));
    poller.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_halts_polling_and_resets_state() {
    let source = FakeSource::new(0);
    let (repaint, _) = counting_repaint();
    let mut poller = poller_for(Arc::clone(&source), repaint);
    poller.start(&Handle::current());
    assert!(wait_until(WAIT, || poller.state() == MonitorState::Playing).await);

    poller.stop();
    assert!(!poller.is_running());
    assert_eq!(poller.state(), MonitorState::Stopped);
    assert!(poller.metadata().is_none());

    let calls_at_stop = source.snapshot_calls();
    tokio::time::sleep(Duration::from_millis(150)).await;
    // a request that was already in flight may still land
    assert!(source.snapshot_calls() <= calls_at_stop + 1);
    assert_eq!(poller.state(), MonitorState::Stopped);
    assert!(poller.take_latest_frame().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_start_is_ignored() {
    let source = FakeSource::new(0);
    let (repaint, _) = counting_repaint();
    let mut poller = poller_for(Arc::clone(&source), repaint);

    poller.start(&Handle::current());
    poller.start(&Handle::current());
    assert!(wait_until(WAIT, || poller.metadata().is_some()).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.metadata_calls(), 1);
    poller.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bad_snapshots_are_skipped_until_a_good_one_arrives() {
    // one failed request, then one undecodable body
    let source = FakeSource::with_snapshot_failures(0, 2);
    let (repaint, repaints) = counting_repaint();
    let mut poller = poller_for(Arc::clone(&source), repaint);
    poller.start(&Handle::current());

    assert!(wait_until(WAIT, || poller.state() == MonitorState::Playing).await);
    assert!(source.snapshot_calls() >= 3);
    assert!(repaints.load(Ordering::SeqCst) >= 1);
    let frame = poller.take_latest_frame().expect("a good frame after the failures");
    assert_eq!((frame.width, frame.height), (8, 6));
    poller.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_cancels_metadata_retries() {
    let source = FakeSource::new(usize::MAX);
    let (repaint, repaints) = counting_repaint();
    let mut poller = poller_for(Arc::clone(&source), repaint);
    poller.start(&Handle::current());

    assert!(wait_until(WAIT, || source.metadata_calls() >= 2).await);
    poller.stop();
    assert!(!poller.is_running());
    assert_eq!(poller.state(), MonitorState::Stopped);

    let calls_at_stop = source.metadata_calls();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(source.metadata_calls() <= calls_at_stop + 1);
    assert_eq!(source.snapshot_calls(), 0);
    assert_eq!(repaints.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stopped_tile_can_start_again() {
    let source = FakeSource::new(0);
    let (repaint, _) = counting_repaint();
    let mut poller = poller_for(Arc::clone(&source), repaint);

    poller.start(&Handle::current());
    assert!(wait_until(WAIT, || poller.state() == MonitorState::Playing).await);
    poller.stop();
    assert_eq!(poller.state(), MonitorState::Stopped);

    poller.start(&Handle::current());
    assert!(poller.is_running());
    assert!(wait_until(WAIT, || poller.state() == MonitorState::Playing).await);
    // metadata is fetched afresh after a restart
    assert_eq!(source.metadata_calls(), 2);
    assert!(poller.metadata().is_some());
    poller.stop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn manager_fills_auto_grid_in_order() {
    let mut config = MasterConfig::default();
    config.shinobi.server = "http://nvr.local/".to_string();
    config.shinobi.api_key = "KEY".to_string();
    config.shinobi.group_key = "GRP".to_string();
    config.monitors = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    config.app_settings = fast_app_settings();

    let source = FakeSource::new(0);
    let (repaint, _) = counting_repaint();
    let grid = layout::auto_layout(config.monitors.len());
    let mut manager = MonitorManager::new(&config, grid, source as Arc<dyn SnapshotSource>, repaint);

    let ids: Vec<String> = manager.tiles().iter().map(|t| t.poller.monitor_id()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    // 3 monitors -> 2 columns, 2 rows, last cell unused
    assert_eq!(manager.layout().slot_count(), 3);
    assert_eq!(manager.tiles()[1].cell.x, 0.5);
    assert_eq!(manager.tiles()[2].cell.y, 0.5);

    manager.start_all(&Handle::current());
    assert!(
        wait_until(WAIT, || manager
            .tiles()
            .iter()
            .all(|t| t.poller.state() == MonitorState::Playing))
        .await
    );
    manager.stop_all();
    assert!(manager.tiles().iter().all(|t| t.poller.state() == MonitorState::Stopped));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn manager_hides_monitors_beyond_layout_slots() {
    let mut config = MasterConfig::default();
    config.shinobi.server = "http://nvr.local".to_string();
    config.shinobi.api_key = "KEY".to_string();
    config.shinobi.group_key = "GRP".to_string();
    config.monitors = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let (repaint, _) = counting_repaint();
    let single = layout::auto_layout(1);
    let manager = MonitorManager::new(&config, single, FakeSource::new(0) as Arc<dyn SnapshotSource>, repaint);
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.tiles()[0].poller.monitor_id(), "a");
}
