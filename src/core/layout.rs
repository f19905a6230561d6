//! Tile arrangements: the automatic square-ish grid and named layout files.
//!
//! A layout file is a YAML tree stored as `{layouts_directory}/{name}.yaml`:
//!
//! ```yaml
//! type: row
//! children:
//!   - type: monitor
//!     weight: 2
//!   - type: column
//!     children:
//!       - type: monitor
//!       - type: monitor
//! ```
//!
//! Monitor slots are numbered depth-first, left to right; enabled monitors
//! are assigned to slots in that order.

use crate::errors::AppError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const LAYOUT_EXTENSION: &str = "yaml";

fn unit_weight() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutNode {
    Monitor {
        #[serde(default = "unit_weight")]
        weight: f32,
    },
    Empty {
        #[serde(default = "unit_weight")]
        weight: f32,
    },
    Row {
        #[serde(default = "unit_weight")]
        weight: f32,
        children: Vec<LayoutNode>,
    },
    Column {
        #[serde(default = "unit_weight")]
        weight: f32,
        children: Vec<LayoutNode>,
    },
    Grid {
        #[serde(default = "unit_weight")]
        weight: f32,
        cols: usize,
        children: Vec<LayoutNode>,
    },
}

/// A rectangle in normalized coordinates: the full view is `0..1` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl CellRect {
    pub const FULL: CellRect = CellRect { x: 0.0, y: 0.0, w: 1.0, h: 1.0 };
}

impl LayoutNode {
    fn weight(&self) -> f32 {
        let w = match self {
            LayoutNode::Monitor { weight }
            | LayoutNode::Empty { weight }
            | LayoutNode::Row { weight, .. }
            | LayoutNode::Column { weight, .. }
            | LayoutNode::Grid { weight, .. } => *weight,
        };
        if w.is_finite() && w > 0.0 { w } else { 1.0 }
    }

    fn slot_count(&self) -> usize {
        match self {
            LayoutNode::Monitor { .. } => 1,
            LayoutNode::Empty { .. } => 0,
            LayoutNode::Row { children, .. }
            | LayoutNode::Column { children, .. }
            | LayoutNode::Grid { children, .. } => children.iter().map(LayoutNode::slot_count).sum(),
        }
    }

    fn collect_cells(&self, area: CellRect, out: &mut Vec<CellRect>) {
        match self {
            LayoutNode::Monitor { .. } => out.push(area),
            LayoutNode::Empty { .. } => {}
            LayoutNode::Row { children, .. } => {
                let total: f32 = children.iter().map(LayoutNode::weight).sum();
                let mut x = area.x;
                for child in children {
                    let w = area.w * child.weight() / total;
                    child.collect_cells(CellRect { x, y: area.y, w, h: area.h }, out);
                    x += w;
                }
            }
            LayoutNode::Column { children, .. } => {
                let total: f32 = children.iter().map(LayoutNode::weight).sum();
                let mut y = area.y;
                for child in children {
                    let h = area.h * child.weight() / total;
                    child.collect_cells(CellRect { x: area.x, y, w: area.w, h }, out);
                    y += h;
                }
            }
            LayoutNode::Grid { cols, children, .. } => {
                if children.is_empty() {
                    return;
                }
                let cols = (*cols).max(1);
                let rows = children.len().div_ceil(cols);
                let w = area.w / cols as f32;
                let h = area.h / rows as f32;
                for (i, child) in children.iter().enumerate() {
                    let (row, col) = (i / cols, i % cols);
                    let cell = CellRect {
                        x: area.x + col as f32 * w,
                        y: area.y + row as f32 * h,
                        w,
                        h,
                    };
                    child.collect_cells(cell, out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub name: String,
    pub root: LayoutNode,
}

impl Layout {
    pub fn slot_count(&self) -> usize {
        self.root.slot_count()
    }

    /// Rectangles of every monitor slot, in slot order.
    pub fn cells(&self) -> Vec<CellRect> {
        let mut out = Vec::with_capacity(self.slot_count());
        self.root.collect_cells(CellRect::FULL, &mut out);
        out
    }
}

/// Smallest `c` with `c * c >= n`.
pub fn auto_columns(n: usize) -> usize {
    let mut cols = 0;
    while cols * cols < n {
        cols += 1;
    }
    cols
}

/// Square-ish grid with one slot per monitor.
pub fn auto_layout(monitor_count: usize) -> Layout {
    Layout {
        name: crate::shinobi_config::AUTO_LAYOUT.to_string(),
        root: LayoutNode::Grid {
            weight: 1.0,
            cols: auto_columns(monitor_count),
            children: vec![LayoutNode::Monitor { weight: 1.0 }; monitor_count],
        },
    }
}

pub fn load_layout(layouts_dir: &Path, name: &str) -> Result<Layout, AppError> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::Layout(format!("invalid layout name '{}'", name)));
    }
    let path = layouts_dir.join(format!("{}.{}", name, LAYOUT_EXTENSION));
    debug!("Loading layout '{}' from {}", name, path.display());
    let text = fs::read_to_string(&path)
        .map_err(|e| AppError::Layout(format!("cannot read '{}': {}", path.display(), e)))?;
    let root: LayoutNode = serde_yaml::from_str(&text)
        .map_err(|e| AppError::Layout(format!("cannot parse '{}': {}", path.display(), e)))?;
    let layout = Layout { name: name.to_string(), root };
    if layout.slot_count() == 0 {
        warn!("Layout '{}' has no monitor slots.", name);
    }
    Ok(layout)
}

/// Layout names available in `layouts_dir`, sorted. A missing directory lists nothing.
pub fn available_layouts(layouts_dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(layouts_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No layouts directory at {}: {}", layouts_dir.display(), e);
            return Vec::new();
        }
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(LAYOUT_EXTENSION))
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}
