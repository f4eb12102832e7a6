use serde::{Deserialize, Serialize};

const IMPORTING_MESSAGE: &str = "Looking for new activities on Strava...";
const DOWNLOADING_MESSAGE: &str = "Downloading new activities from Strava...";
const COMPUTING_MESSAGE: &str = "Regenerating map metadata. This may take 1-2 minutes...";
const UP_TO_DATE_MESSAGE: &str = "Map is fully up to date";
const FULL_PERCENT: &str = "100.00";

/// Tile build counters reported alongside `ProcessingMap`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTileCounts {
    #[serde(default)]
    pub processing: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub completed: u64,
}

impl MapTileCounts {
    pub fn new(processing: u64, failed: u64, completed: u64) -> Self {
        Self {
            processing,
            failed,
            completed,
        }
    }

    /// Saturates at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.processing
            .saturating_add(self.failed)
            .saturating_add(self.completed)
    }

    /// `part` as a percentage of the total, formatted with two decimals.
    /// A zero total reports `0.00`.
    fn percent(&self, part: u64) -> String {
        if self.total() == 0 {
            return format!("{:.2}", 0.0);
        }
        let total = self.processing as f64 + self.failed as f64 + self.completed as f64;
        format!("{:.2}", 100.0 * part as f64 / total)
    }

    pub fn completed_percent(&self) -> String {
        self.percent(self.completed)
    }

    pub fn failed_percent(&self) -> String {
        self.percent(self.failed)
    }

    pub fn processing_percent(&self) -> String {
        self.percent(self.processing)
    }

    /// No tile is left in flight.
    pub fn is_settled(&self) -> bool {
        self.processing == 0 && self.total() > 0
    }
}

/// Stage of the backend pipeline for the signed-in athlete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingState {
    ImportingActivities,
    DownloadingActivities,
    ComputingMapParams,
    ProcessingMap(MapTileCounts),
    Unknown(String),
}

impl ProcessingState {
    pub fn from_tag(tag: &str, counts: Option<MapTileCounts>) -> Self {
        match tag {
            "ImportingActivities" => Self::ImportingActivities,
            "DownloadingActivities" => Self::DownloadingActivities,
            "ComputingMapParams" => Self::ComputingMapParams,
            "ProcessingMap" => Self::ProcessingMap(counts.unwrap_or_default()),
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::ImportingActivities => "ImportingActivities",
            Self::DownloadingActivities => "DownloadingActivities",
            Self::ComputingMapParams => "ComputingMapParams",
            Self::ProcessingMap(_) => "ProcessingMap",
            Self::Unknown(tag) => tag,
        }
    }

    /// Polling stops once this holds.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ProcessingMap(counts) if counts.is_settled())
    }

    pub fn status_line(&self) -> StatusLine {
        match self {
            Self::ImportingActivities => StatusLine::working(IMPORTING_MESSAGE),
            Self::DownloadingActivities => StatusLine::working(DOWNLOADING_MESSAGE),
            Self::ComputingMapParams => StatusLine::working(COMPUTING_MESSAGE),
            Self::ProcessingMap(counts) => {
                let completed = counts.completed_percent();
                if completed == FULL_PERCENT {
                    return StatusLine::new(StatusIcon::Complete, UP_TO_DATE_MESSAGE);
                }
                StatusLine::working(format!(
                    "Map is rebuilding. {completed}% complete, {}% failed. This may be slow at first, but should speed up. Move map around or refresh to see updates.",
                    counts.failed_percent()
                ))
            }
            Self::Unknown(tag) => StatusLine::new(
                StatusIcon::Warning,
                format!("Something may have gone wrong: {tag}"),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusIcon {
    Working,
    Complete,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub icon: StatusIcon,
    pub text: String,
}

impl StatusLine {
    pub fn new(icon: StatusIcon, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
        }
    }

    fn working(text: impl Into<String>) -> Self {
        Self::new(StatusIcon::Working, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_known_tags() {
        assert_eq!(
            ProcessingState::from_tag("ImportingActivities", None).status_line().text,
            IMPORTING_MESSAGE
        );
        assert_eq!(
            ProcessingState::from_tag("DownloadingActivities", None).status_line().text,
            DOWNLOADING_MESSAGE
        );
        assert_eq!(
            ProcessingState::from_tag("ComputingMapParams", None).status_line().text,
            COMPUTING_MESSAGE
        );
    }

    #[test]
    fn unknown_tag_renders_warning() {
        let state = ProcessingState::from_tag("Error::1::strava down", None);
        let line = state.status_line();
        assert_eq!(line.icon, StatusIcon::Warning);
        assert_eq!(line.text, "Something may have gone wrong: Error::1::strava down");
        assert!(!state.is_terminal());
    }

    #[test]
    fn full_completion_reports_up_to_date() {
        let state = ProcessingState::ProcessingMap(MapTileCounts::new(0, 0, 10));
        let line = state.status_line();
        assert_eq!(line.text, UP_TO_DATE_MESSAGE);
        assert_eq!(line.icon, StatusIcon::Complete);
        assert!(state.is_terminal());
    }

    #[test]
    fn rebuilding_message_has_two_decimal_percentages() {
        let state = ProcessingState::ProcessingMap(MapTileCounts::new(1, 1, 1));
        assert_eq!(
            state.status_line().text,
            "Map is rebuilding. 33.33% complete, 33.33% failed. This may be slow at first, but should speed up. Move map around or refresh to see updates."
        );
        assert!(!state.is_terminal());
    }

    #[test]
    fn settled_with_failures_is_terminal_but_not_up_to_date() {
        let state = ProcessingState::ProcessingMap(MapTileCounts::new(0, 3, 1));
        assert!(state.is_terminal());
        assert!(state.status_line().text.starts_with("Map is rebuilding. 25.00% complete, 75.00% failed."));
    }

    #[test]
    fn every_settled_count_is_terminal() {
        for failed in 0..6 {
            for completed in 0..6 {
                let counts = MapTileCounts::new(0, failed, completed);
                let state = ProcessingState::ProcessingMap(counts);
                assert_eq!(state.is_terminal(), failed + completed > 0);
            }
        }
    }

    #[test]
    fn empty_counts_keep_polling() {
        let state = ProcessingState::from_tag("ProcessingMap", None);
        assert_eq!(state, ProcessingState::ProcessingMap(MapTileCounts::default()));
        assert!(!state.is_terminal());
        assert!(state.status_line().text.contains("0.00% complete"));
    }

    #[test]
    fn tiny_remainder_still_polls() {
        let counts = MapTileCounts::new(1, 0, 99_999);
        assert_eq!(counts.processing_percent(), "0.00");
        assert!(!ProcessingState::ProcessingMap(counts).is_terminal());
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let pending = ProcessingState::ProcessingMap(MapTileCounts::new(u64::MAX, 1, 0));
        assert_eq!(MapTileCounts::new(u64::MAX, 1, 0).total(), u64::MAX);
        assert!(pending.status_line().text.starts_with("Map is rebuilding. 0.00% complete"));
        assert!(!pending.is_terminal());

        let settled = ProcessingState::ProcessingMap(MapTileCounts::new(0, u64::MAX, u64::MAX));
        assert!(settled.is_terminal());
        assert!(settled.status_line().text.starts_with("Map is rebuilding. 50.00% complete, 50.00% failed."));
    }
}
