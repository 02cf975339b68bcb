use std::fmt;

// ---------------------------------------------------------------------------
// View mode – which temporal aggregation runs
// ---------------------------------------------------------------------------

/// The user-selected lens for the temporal tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Yearly,
    Monthly,
    Hourly,
    MonthHour,
    Category,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::Yearly,
        ViewMode::Monthly,
        ViewMode::Hourly,
        ViewMode::MonthHour,
        ViewMode::Category,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Yearly => "Yearly",
            ViewMode::Monthly => "Monthly",
            ViewMode::Hourly => "Hourly",
            ViewMode::MonthHour => "Month × Hour",
            ViewMode::Category => "AQI Category",
        }
    }

    /// Whether this mode takes a caller-selected metric. Yearly plots its
    /// own pollutant multi-select and Category counts labels, so neither
    /// shows the metric selector. Keeping this a pure function decouples
    /// parameter validation from widget rendering.
    pub fn requires_metric(self) -> bool {
        !matches!(self, ViewMode::Yearly | ViewMode::Category)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
