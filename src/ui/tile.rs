use crate::core::layout::CellRect;
use crate::core::snapshot_source::SnapshotFrame;
use crate::shinobi::monitor_entity::MonitorState;
use egui::{pos2, vec2, Align2, Color32, ColorImage, FontId, Rect, TextureHandle, TextureOptions};

const TILE_GAP: f32 = 1.0;
const SPINNER_SIZE: f32 = 32.0;

/// Screen rectangle of a layout cell inside `area`.
pub fn cell_to_rect(cell: CellRect, area: Rect) -> Rect {
    let min = pos2(area.min.x + cell.x * area.width(), area.min.y + cell.y * area.height());
    Rect::from_min_size(min, vec2(cell.w * area.width(), cell.h * area.height())).shrink(TILE_GAP)
}

/// Swaps a freshly decoded frame into the tile texture, creating it on first use.
pub fn upload_frame(ctx: &egui::Context, slot: &mut Option<TextureHandle>, name: &str, frame: SnapshotFrame) {
    let image = ColorImage::from_rgba_unmultiplied([frame.width as usize, frame.height as usize], &frame.rgba);
    match slot {
        Some(texture) => texture.set(image, TextureOptions::LINEAR),
        None => *slot = Some(ctx.load_texture(name, image, TextureOptions::LINEAR)),
    }
}

/// Last snapshot stretched over the whole cell, or a spinner until the first one arrives.
pub fn paint_tile(
    ui: &mut egui::Ui,
    rect: Rect,
    texture: Option<&TextureHandle>,
    state: MonitorState,
    monitor_id: &str,
) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, Color32::from_gray(12));

    if let Some(texture) = texture {
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        painter.image(texture.id(), rect, uv, Color32::WHITE);
        return;
    }

    let spinner_rect = Rect::from_center_size(rect.center(), vec2(SPINNER_SIZE, SPINNER_SIZE));
    if state != MonitorState::Stopped {
        ui.put(spinner_rect, egui::Spinner::new().size(SPINNER_SIZE));
    }
    let caption = match state {
        MonitorState::Stopped => format!("{} (stopped)", monitor_id),
        _ => format!("Loading {}…", monitor_id),
    };
    painter.text(
        spinner_rect.center_bottom() + vec2(0.0, 8.0),
        Align2::CENTER_TOP,
        caption,
        FontId::proportional(14.0),
        Color32::GRAY,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_cells_into_area() {
        let area = Rect::from_min_size(pos2(10.0, 20.0), vec2(200.0, 100.0));
        let rect = cell_to_rect(CellRect { x: 0.5, y: 0.5, w: 0.5, h: 0.5 }, area);
        assert_eq!(rect.min, pos2(110.0 + TILE_GAP, 70.0 + TILE_GAP));
        assert_eq!(rect.max, pos2(210.0 - TILE_GAP, 120.0 - TILE_GAP));
    }
}
