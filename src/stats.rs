use serde::Serialize;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Streaming mean/min/max over the present values of a column.
#[derive(Debug, Clone, Default)]
pub struct ColumnStats {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(match self.min {
            Some(current) => current.min(value),
            None => value,
        });
        self.max = Some(match self.max {
            Some(current) => current.max(value),
            None => value,
        });
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }

    /// `None` until at least one value has been added.
    pub fn finish(&self) -> Option<NumericStats> {
        Some(NumericStats {
            mean: self.mean()?,
            min: self.min?,
            max: self.max?,
        })
    }
}

impl FromIterator<f64> for ColumnStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = ColumnStats::new();
        for value in iter {
            stats.add_value(value);
        }
        stats
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_mean_min_and_max() {
        let stats: ColumnStats = [10.0, 20.0, 30.0].into_iter().collect();
        assert_eq!(stats.count(), 3);
        assert_eq!(
            stats.finish(),
            Some(NumericStats {
                mean: 20.0,
                min: 10.0,
                max: 30.0
            })
        );
    }

    #[test]
    fn empty_accumulator_has_no_stats() {
        assert_eq!(ColumnStats::new().finish(), None);
        assert_eq!(ColumnStats::new().mean(), None);
    }

    #[test]
    fn format_number_trims_integral_values() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(27.5), "27.5000");
        assert_eq!(format_number(-1.0 / 3.0), "-0.3333");
    }
}
