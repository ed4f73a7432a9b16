use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::error::ChartError;

/// On-disk chart description. Times are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFile {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    pub lane_count: usize,
    pub notes: Vec<ChartFileNote>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChartFileNote {
    pub lane: usize,
    /// Target time in seconds
    pub time: f64,
}

impl ChartFile {
    pub fn to_chart(&self) -> Result<Chart, ChartError> {
        let pairs: Vec<(usize, f64)> = self.notes.iter().map(|n| (n.lane, n.time)).collect();
        Chart::from_secs(self.lane_count, &pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_builds_chart() {
        let json = r#"{
            "title": "Test",
            "laneCount": 4,
            "notes": [
                { "lane": 3, "time": 2.5 },
                { "lane": 0, "time": 1.0 }
            ]
        }"#;
        let file: ChartFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.title, "Test");
        assert!(file.artist.is_empty());

        let chart = file.to_chart().unwrap();
        assert_eq!(chart.lane_count(), 4);
        assert_eq!(chart.notes()[0].lane, 0);
        assert_eq!(chart.notes()[1].target_time_us, 2_500_000);
    }

    #[test]
    fn invalid_lane_is_reported() {
        let json = r#"{ "laneCount": 2, "notes": [{ "lane": 2, "time": 1.0 }] }"#;
        let file: ChartFile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            file.to_chart(),
            Err(ChartError::LaneOutOfRange { lane: 2, .. })
        ));
    }

    #[test]
    fn far_future_time_is_reported() {
        let json = r#"{ "laneCount": 4, "notes": [{ "lane": 0, "time": 1e19 }] }"#;
        let file: ChartFile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            file.to_chart(),
            Err(ChartError::TimeOutOfRange { index: 0, .. })
        ));
    }
}
