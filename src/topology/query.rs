use serde::Deserialize;

use super::source::SourceError;

/// Rolling window the backend aggregates probe samples over, in minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow(u32);

impl TimeWindow {
    pub const MIN_MINUTES: u32 = 1;
    pub const MAX_MINUTES: u32 = 60;
    pub const PRESETS: [u32; 4] = [1, 10, 30, 60];

    pub fn new(minutes: u32) -> Result<Self, SourceError> {
        if (Self::MIN_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(SourceError::WindowOutOfRange(minutes))
        }
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self(10)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Average,
    Minimum,
}

impl Aggregation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Average => "Average In Range",
            Self::Minimum => "Worst In Range",
        }
    }

    /// Value of the `method` parameter understood by the status endpoint.
    pub fn method_param(self) -> &'static str {
        match self {
            Self::Average => "default",
            Self::Minimum => "min",
        }
    }

    pub fn prometheus_fn(self) -> &'static str {
        match self {
            Self::Average => "avg_over_time",
            Self::Minimum => "min_over_time",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Average => Self::Minimum,
            Self::Minimum => Self::Average,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusQuery {
    pub window: TimeWindow,
    pub aggregation: Aggregation,
}

impl StatusQuery {
    pub fn status_params(self) -> [(&'static str, String); 2] {
        [
            ("window", self.window.minutes().to_string()),
            ("method", self.aggregation.method_param().to_owned()),
        ]
    }

    pub fn promql(self, filter: &str) -> String {
        format!(
            "{}(probe_success{}[{}m])",
            self.aggregation.prometheus_fn(),
            filter,
            self.window.minutes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_values_outside_one_hour() {
        assert!(TimeWindow::new(0).is_err());
        assert!(TimeWindow::new(61).is_err());
        assert_eq!(TimeWindow::new(60).unwrap().minutes(), 60);
    }

    #[test]
    fn promql_uses_aggregation_and_filter() {
        let query = StatusQuery {
            window: TimeWindow::new(30).unwrap(),
            aggregation: Aggregation::Minimum,
        };
        assert_eq!(
            query.promql(r#"{job="blackbox"}"#),
            r#"min_over_time(probe_success{job="blackbox"}[30m])"#
        );
        assert_eq!(query.status_params()[1].1, "min");
    }
}
