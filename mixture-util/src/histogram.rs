use crate::backend::DefaultBeta;
use crate::density::{BetaMixtureDensity, ProbabilityDensityFunction};
use crate::error::{validate_sample, ValidationError};
use crate::model::MixtureModel;

pub const DEFAULT_NUM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub observed_count: usize,
    /// observed count / (k * width)
    pub observed_density: f64,
    /// `k * (F(upper) - F(lower))` under the model
    pub expected_count: f64,
    /// model density at the bin midpoint
    pub fitted_density: f64,
}

/// Equal-width histogram of p-values on [0, 1] next to a fitted model
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: Vec<HistogramBin>,
    num_p_values: usize,
}

impl Histogram {
    pub fn new(
        model: &MixtureModel,
        sample: &[f64],
        num_bins: usize,
    ) -> Result<Self, ValidationError> {
        validate_sample(sample)?;
        if num_bins == 0 {
            return Err(ValidationError::Argument {
                name: "bins",
                value: 0.0,
                reason: "need at least one bin",
            });
        }

        let kk = sample.len() as f64;
        let width = 1.0 / num_bins as f64;

        let mut counts = vec![0_usize; num_bins];
        for &x in sample {
            // x = 1 falls in the last bin
            let b = ((x * num_bins as f64) as usize).min(num_bins - 1);
            counts[b] += 1;
        }

        let pdf = BetaMixtureDensity::new(DefaultBeta);
        let mut bins = Vec::with_capacity(num_bins);
        for (b, &observed_count) in counts.iter().enumerate() {
            let lower = b as f64 * width;
            let upper = if b + 1 == num_bins {
                1.0
            } else {
                (b + 1) as f64 * width
            };
            bins.push(HistogramBin {
                lower,
                upper,
                observed_count,
                observed_density: observed_count as f64 / (kk * width),
                expected_count: kk * (model.cdf(upper) - model.cdf(lower)),
                fitted_density: pdf.evaluate(model, 0.5 * (lower + upper))?,
            });
        }

        Ok(Self {
            bins,
            num_p_values: sample.len(),
        })
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    pub fn num_p_values(&self) -> usize {
        self.num_p_values
    }

    pub fn to_tsv(&self) -> Vec<Box<str>> {
        let mut lines = vec![
            "lower\tupper\tobserved\tobserved_density\texpected\tfitted_density".into(),
        ];
        lines.extend(self.bins.iter().map(|bin| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                bin.lower,
                bin.upper,
                bin.observed_count,
                bin.observed_density,
                bin.expected_count,
                bin.fitted_density
            )
            .into_boxed_str()
        }));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_histogram_totals() {
        let model = MixtureModel::new(0.7, 0.6, 3.0).unwrap();
        let sample: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        let hist = Histogram::new(&model, &sample, 10).unwrap();

        assert_eq!(hist.bins().len(), 10);
        let observed: usize = hist.bins().iter().map(|b| b.observed_count).sum();
        assert_eq!(observed, 101);
        let expected: f64 = hist.bins().iter().map(|b| b.expected_count).sum();
        assert_abs_diff_eq!(expected, 101.0, epsilon = 1e-8);
        assert_eq!(hist.bins()[9].observed_count, 11);

        let area: f64 = hist
            .bins()
            .iter()
            .map(|b| b.observed_density * (b.upper - b.lower))
            .sum();
        assert_abs_diff_eq!(area, 1.0, epsilon = 1e-12);
        assert_eq!(hist.to_tsv().len(), 11);
    }

    #[test]
    fn test_histogram_rejects_bad_input() {
        let model = MixtureModel::new(0.7, 0.6, 3.0).unwrap();
        assert!(Histogram::new(&model, &[], 10).is_err());
        assert!(Histogram::new(&model, &[0.5], 0).is_err());
    }
}
