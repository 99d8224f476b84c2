//! Statistics Calculator Module
//! Descriptive summaries and the price vs dividend correlation.

use super::metrics::{group_by, GroupKey, Measure, MetricsError, Record};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for the correlation t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics for one measure (count, mean, std, quartiles).
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub measure: Measure,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Summary of one group, e.g. the monthly dividends of a single property.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub summary: Summary,
}

/// Linear relationship between two variables.
#[derive(Debug, Clone, Serialize)]
pub struct Correlation {
    pub n: usize,
    /// Pearson correlation coefficient.
    pub r: f64,
    /// Least-squares line `y = slope * x + intercept`.
    pub slope: f64,
    pub intercept: f64,
    /// Two-tailed p-value of `r`; NaN with fewer than three points.
    pub p_value: f64,
    pub is_significant: bool,
}

impl Correlation {
    /// Conventional label for |r|.
    pub fn strength(&self) -> &'static str {
        match self.r.abs() {
            r if r < 0.3 => "weak",
            r if r < 0.7 => "moderate",
            _ => "strong",
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(measure: Measure, values: &[f64]) -> Summary {
        let n = values.len();
        if n == 0 {
            return Summary {
                measure,
                count: 0,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                p25: f64::NAN,
                median: f64::NAN,
                p75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            f64::NAN
        };

        Summary {
            measure,
            count: n,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries of several measures over any table; nulls are skipped.
    pub fn describe<R: Record>(
        rows: &[R],
        measures: &[Measure],
    ) -> Result<Vec<Summary>, MetricsError> {
        measures
            .iter()
            .map(|&measure| {
                if !R::supports_measure(measure) {
                    return Err(MetricsError::Unsupported {
                        column: measure.name().to_string(),
                        table: R::TABLE,
                    });
                }
                let values: Vec<f64> = rows.iter().filter_map(|r| r.measure(measure)).collect();
                Ok(Self::compute_descriptive_stats(measure, &values))
            })
            .collect()
    }

    /// Summary of `measure` within each `key` group, in key order. Groups
    /// with no value for the measure are left out.
    pub fn describe_by<R: Record>(
        rows: &[R],
        key: GroupKey,
        measure: Measure,
    ) -> Result<Vec<GroupSummary>, MetricsError> {
        if !R::supports_key(key) {
            return Err(MetricsError::Unsupported {
                column: key.name().to_string(),
                table: R::TABLE,
            });
        }
        if !R::supports_measure(measure) {
            return Err(MetricsError::Unsupported {
                column: measure.name().to_string(),
                table: R::TABLE,
            });
        }

        let groups = group_by(rows, |r| r.key(key).unwrap_or_default());
        Ok(groups
            .into_iter()
            .filter_map(|(key, members)| {
                let values: Vec<f64> = members.iter().filter_map(|r| r.measure(measure)).collect();
                if values.is_empty() {
                    return None;
                }
                Some(GroupSummary {
                    key,
                    summary: Self::compute_descriptive_stats(measure, &values),
                })
            })
            .collect())
    }

    /// Pearson correlation with a least-squares fit and t-test p-value.
    pub fn correlate(pairs: &[(f64, f64)]) -> Result<Correlation, MetricsError> {
        let n = pairs.len();
        if n < 2 {
            return Err(MetricsError::Degenerate(format!(
                "need at least two points, got {n}"
            )));
        }

        let nf = n as f64;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for &(x, y) in pairs {
            sxx += (x - mean_x).powi(2);
            syy += (y - mean_y).powi(2);
            sxy += (x - mean_x) * (y - mean_y);
        }

        if sxx == 0.0 || syy == 0.0 {
            return Err(MetricsError::Degenerate(
                "one of the variables has no variance".to_string(),
            ));
        }

        let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let p_value = Self::correlation_p_value(r, n);

        Ok(Correlation {
            n,
            r,
            slope,
            intercept,
            p_value,
            is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
        })
    }

    /// Two-tailed p-value of `r` from Student's t with n - 2 degrees of freedom.
    fn correlation_p_value(r: f64, n: usize) -> f64 {
        if n < 3 {
            return f64::NAN;
        }
        if r.abs() >= 1.0 {
            return 0.0;
        }

        let df = (n - 2) as f64;
        let t = r * (df / (1.0 - r * r)).sqrt();

        if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
            2.0 * (1.0 - dist.cdf(t.abs()))
        } else {
            f64::NAN
        }
    }
}
