//! Configuration of statistics derivation.

/// Options of [StatisticsMath](crate::statistics::math::StatisticsMath).
/// Options are read once when a `StatisticsMath` is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsOptions {
    use_histograms: bool,
}

impl StatisticsOptions {
    /// Creates options with histograms disabled.
    pub fn new() -> Self {
        StatisticsOptions::default()
    }

    /// Enables or disables composition of histograms.
    /// When histograms are disabled derived statistics never contain histograms.
    pub fn with_histograms(mut self, value: bool) -> Self {
        self.use_histograms = value;
        self
    }

    /// Whether composition of histograms is enabled.
    pub fn use_histograms(&self) -> bool {
        self.use_histograms
    }
}
