use crate::config_loader::MasterConfig;
use crate::core::layout::{self, CellRect, Layout};
use crate::core::monitor_poller::{MonitorPoller, PollTiming, RepaintHook};
use crate::core::snapshot_source::SnapshotSource;
use crate::errors::AppError;
use crate::shinobi::monitor_entity::MonitorEntity;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;

pub struct MonitorTile {
    pub poller: MonitorPoller,
    pub cell: CellRect,
}

pub struct MonitorManager {
    layout: Layout,
    tiles: Vec<MonitorTile>,
}

/// The configured layout: the auto grid sized to the enabled monitors, or a named file.
pub fn resolve_layout(master_config: &MasterConfig) -> Result<Layout, AppError> {
    if master_config.shinobi.is_auto_layout() {
        return Ok(layout::auto_layout(master_config.monitors.len()));
    }
    layout::load_layout(
        Path::new(&master_config.app_settings.layouts_directory),
        &master_config.shinobi.layout,
    )
}

impl MonitorManager {
    /// Pairs enabled monitors with layout slots in order. Monitors beyond the
    /// last slot are not shown; slots beyond the last monitor stay empty.
    pub fn new(
        master_config: &MasterConfig,
        layout: Layout,
        source: Arc<dyn SnapshotSource>,
        repaint: RepaintHook,
    ) -> Self {
        debug!("🛠️ Initializing MonitorManager...");
        let start_time = Instant::now();
        let server = master_config.shinobi.server_base().to_string();
        let timing = PollTiming::from(&master_config.app_settings);
        let cells = layout.cells();

        let monitor_paths = master_config.monitor_paths();
        if monitor_paths.len() > cells.len() {
            warn!(
                "⚠️ Layout '{}' has {} slot(s) but {} monitor(s) are enabled; the rest are hidden.",
                layout.name,
                cells.len(),
                monitor_paths.len()
            );
        }

        let tiles: Vec<MonitorTile> = monitor_paths
            .into_iter()
            .zip(cells)
            .map(|((mid, path), cell)| {
                debug!("  Adding monitor '{}' at {:?}", mid, cell);
                let entity = MonitorEntity::new(mid, server.clone(), path);
                MonitorTile {
                    poller: MonitorPoller::new(entity, Arc::clone(&source), timing, Arc::clone(&repaint)),
                    cell,
                }
            })
            .collect();

        info!("✅ MonitorManager initialized with {} tile(s) in {:?}.", tiles.len(), start_time.elapsed());
        MonitorManager { layout, tiles }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn tiles(&self) -> &[MonitorTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn start_all(&mut self, runtime: &Handle) {
        info!("▶️ Starting {} monitor tile(s).", self.tiles.len());
        for tile in &mut self.tiles {
            tile.poller.start(runtime);
        }
    }

    pub fn stop_all(&mut self) {
        info!("⏹️ Stopping {} monitor tile(s).", self.tiles.len());
        for tile in &mut self.tiles {
            tile.poller.stop();
        }
    }
}
