use crate::shinobi::models::MonitorSummary;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorRow {
    pub summary: MonitorSummary,
    pub enabled: bool,
}

/// The settings panel's monitor list: which monitors are shown and in what order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorSelection {
    rows: Vec<MonitorRow>,
}

impl MonitorSelection {
    /// Enabled monitors first, in configured order, then the remaining server
    /// monitors in server order. Configured IDs the server no longer knows are dropped.
    pub fn from_server(all: Vec<MonitorSummary>, enabled: &[String]) -> Self {
        let mut rows = Vec::with_capacity(all.len());
        for mid in enabled {
            if let Some(summary) = all.iter().find(|m| &m.mid == mid) {
                if !rows.iter().any(|r: &MonitorRow| &r.summary.mid == mid) {
                    rows.push(MonitorRow { summary: summary.clone(), enabled: true });
                }
            }
        }
        let enabled_set: HashSet<&String> = enabled.iter().collect();
        for summary in all {
            if !enabled_set.contains(&summary.mid) {
                rows.push(MonitorRow { summary, enabled: false });
            }
        }
        MonitorSelection { rows }
    }

    pub fn rows(&self) -> &[MonitorRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.rows.get_mut(index) {
            Some(row) if row.enabled != enabled => {
                row.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    pub fn toggle(&mut self, index: usize) -> bool {
        match self.rows.get(index) {
            Some(row) => {
                let enabled = !row.enabled;
                self.set_enabled(index, enabled)
            }
            None => false,
        }
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.rows.len() {
            return false;
        }
        self.rows.swap(index, index - 1);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.rows.len() {
            return false;
        }
        self.rows.swap(index, index + 1);
        true
    }

    /// IDs to persist as the `monitors` list, in display order.
    pub fn enabled_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.summary.mid.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(mid: &str) -> MonitorSummary {
        MonitorSummary { mid: mid.into(), name: mid.to_uppercase(), groups: vec![] }
    }

    fn ids(sel: &MonitorSelection) -> Vec<&str> {
        sel.rows().iter().map(|r| r.summary.mid.as_str()).collect()
    }

    #[test]
    fn enabled_first_in_config_order() {
        let all = vec![summary("a"), summary("b"), summary("c"), summary("d")];
        let sel = MonitorSelection::from_server(all, &["c".into(), "gone".into(), "a".into()]);
        assert_eq!(ids(&sel), vec!["c", "a", "b", "d"]);
        assert_eq!(sel.enabled_ids(), vec!["c", "a"]);
    }

    #[test]
    fn moves_are_bounded() {
        let mut sel = MonitorSelection::from_server(vec![summary("a"), summary("b")], &[]);
        assert!(!sel.move_up(0));
        assert!(!sel.move_down(1));
        assert!(!sel.move_down(7));
        assert!(sel.move_down(0));
        assert_eq!(ids(&sel), vec!["b", "a"]);
    }

    #[test]
    fn reorder_changes_persisted_order() {
        let mut sel =
            MonitorSelection::from_server(vec![summary("a"), summary("b"), summary("c")], &["a".into()]);
        assert!(sel.toggle(2));
        assert_eq!(sel.enabled_ids(), vec!["a", "c"]);
        sel.move_up(2);
        sel.move_up(1);
        assert_eq!(sel.enabled_ids(), vec!["c", "a"]);
        assert!(sel.toggle(0));
        assert_eq!(sel.enabled_ids(), vec!["a"]);
        assert!(!sel.toggle(9));
    }
}
