use std::collections::HashMap;

use log::warn;

/// Key name -> lane lookup.
///
/// Names are matched case-insensitively so a held Shift does not unmap a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    lanes: HashMap<String, usize>,
    /// First key that made it into the map for each lane.
    primary: Vec<Option<String>>,
    lane_count: usize,
}

impl KeyMap {
    /// Default four-lane layout.
    pub const DEFAULT_BINDINGS: [&'static str; 4] = ["d", "f", "j", "k"];

    /// Build from per-lane binding lists: `bindings[lane]` holds every key
    /// name bound to that lane. A key bound twice keeps its first lane.
    pub fn from_bindings(bindings: &[Vec<String>]) -> Self {
        let mut lanes = HashMap::new();
        let mut primary = vec![None; bindings.len()];
        for (lane, keys) in bindings.iter().enumerate() {
            for key in keys {
                let name = normalize(key);
                if let Some(prev) = lanes.get(&name) {
                    warn!("Key {key} already bound to lane {prev}; ignoring binding to lane {lane}");
                    continue;
                }
                if primary[lane].is_none() {
                    primary[lane] = Some(key.clone());
                }
                lanes.insert(name, lane);
            }
        }
        for (lane, key) in primary.iter().enumerate() {
            if key.is_none() {
                warn!("Lane {lane} has no key bound");
            }
        }
        Self {
            lanes,
            primary,
            lane_count: bindings.len(),
        }
    }

    pub fn lane_for(&self, key: &str) -> Option<usize> {
        self.lanes.get(&normalize(key)).copied()
    }

    /// First key bound to `lane`, as it was written in the bindings.
    pub fn key_for(&self, lane: usize) -> Option<&str> {
        self.primary.get(lane)?.as_deref()
    }

    /// Number of lanes the bindings were built for.
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings: Vec<Vec<String>> = Self::DEFAULT_BINDINGS
            .iter()
            .map(|k| vec![k.to_string()])
            .collect();
        Self::from_bindings(&bindings)
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}
