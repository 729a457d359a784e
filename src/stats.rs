// 📊 Aggregation helpers
// Medians, percentages, population-weighted medians and gap interpolation.

/// Plain median. NaN values are ignored; even counts average the two
/// middle values.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut values: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Median written as an integer column (truncated toward zero)
pub fn median_i64<I>(values: I) -> Option<i64>
where
    I: IntoIterator<Item = f64>,
{
    median(values).map(|m| m.trunc() as i64)
}

/// Round to one decimal place, half away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage rounded to one decimal. None when the denominator is zero.
pub fn pct(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(round1(numerator / denominator * 100.0))
}

/// Median of per-tract medians, weighted by tract population.
///
/// Samples are sorted by value, unknown values first, and each one covers
/// the midpoint of its weight band: `position = (cumulative - weight / 2) /
/// total`. The first sample whose position reaches 0.5 is the weighted
/// median.
///
/// Unknown values still carry their weight, so the selected sample can be
/// one without a value: that is `Some(None)`. Samples without a weight never
/// get a position. `None` means no sample reached the midpoint.
pub fn weighted_median(samples: &[(Option<f64>, Option<f64>)]) -> Option<Option<f64>> {
    let mut samples: Vec<(Option<f64>, Option<f64>)> = samples
        .iter()
        .map(|(value, weight)| (value.filter(|v| !v.is_nan()), weight.filter(|w| !w.is_nan())))
        .collect();
    samples.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (a, b) => a.is_some().cmp(&b.is_some()),
    });

    let total: f64 = samples.iter().filter_map(|(_, w)| *w).sum();
    if total <= 0.0 {
        return None;
    }

    let mut cumulative = 0.0;
    for (value, weight) in samples {
        let weight = match weight {
            Some(weight) => weight,
            None => continue,
        };
        cumulative += weight;
        if (cumulative - weight / 2.0) / total >= 0.5 {
            return Some(value);
        }
    }
    None
}

/// Fill gaps in an evenly spaced series: linear between known points,
/// then carry the first/last known value out to the ends.
pub fn interpolate_linear(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut filled = series.to_vec();
    let known: Vec<usize> = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    let (first, last) = match (known.first(), known.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return filled,
    };

    for pair in known.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        let (lo_value, hi_value) = match (series[lo], series[hi]) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        let span = (hi - lo) as f64;
        for (i, slot) in filled.iter_mut().enumerate().take(hi).skip(lo + 1) {
            let t = (i - lo) as f64 / span;
            *slot = Some(lo_value + (hi_value - lo_value) * t);
        }
    }

    // forward fill, then backward fill
    let last_value = series[last];
    for slot in filled.iter_mut().skip(last + 1) {
        *slot = last_value;
    }
    let first_value = series[first];
    for slot in filled.iter_mut().take(first) {
        *slot = first_value;
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(Vec::<f64>::new()), None);
        assert_eq!(median(vec![f64::NAN, 5.0]), Some(5.0));
        assert_eq!(median_i64(vec![1.0, 2.0]), Some(1), "1.5 truncates to 1");
    }

    #[test]
    fn test_pct() {
        assert_eq!(pct(1.0, 3.0), Some(33.3));
        assert_eq!(pct(2.0, 3.0), Some(66.7));
        assert_eq!(pct(5.0, 0.0), None);
        assert_eq!(round1(0.05), 0.1);
    }

    fn known(samples: &[(f64, f64)]) -> Vec<(Option<f64>, Option<f64>)> {
        samples.iter().map(|(v, w)| (Some(*v), Some(*w))).collect()
    }

    #[test]
    fn test_weighted_median() {
        // 100 people at 50k, 300 at 80k: the middle person is at 80k
        assert_eq!(weighted_median(&known(&[(50_000.0, 100.0), (80_000.0, 300.0)])), Some(Some(80_000.0)));

        // Equal weights: positions are 0.25 and 0.75, so the upper value wins
        assert_eq!(weighted_median(&known(&[(10.0, 1.0), (20.0, 1.0)])), Some(Some(20.0)));

        // Order of input doesn't matter
        assert_eq!(
            weighted_median(&known(&[(30.0, 1.0), (10.0, 1.0), (20.0, 1.0)])),
            Some(Some(20.0))
        );

        assert_eq!(weighted_median(&[]), None);
        assert_eq!(weighted_median(&known(&[(10.0, 0.0)])), None);
    }

    #[test]
    fn test_weighted_median_unknowns() {
        // An unknown income sorts first but still counts its population
        let samples = vec![(None, Some(300.0)), (Some(10.0), Some(100.0)), (Some(20.0), Some(100.0))];
        assert_eq!(weighted_median(&samples), Some(Some(10.0)), "midpoint shifts down");

        // Unknown tracts holding the middle person make the median unknown
        let samples = vec![(None, Some(300.0)), (None, Some(300.0)), (Some(10.0), Some(100.0))];
        assert_eq!(weighted_median(&samples), Some(None));

        // Tracts without population are ignored
        let samples = vec![(Some(1.0), None), (Some(10.0), Some(1.0)), (Some(20.0), Some(1.0))];
        assert_eq!(weighted_median(&samples), Some(Some(20.0)));
    }

    #[test]
    fn test_interpolate_linear() {
        let series = vec![None, Some(1.0), None, None, Some(4.0), None];
        let filled = interpolate_linear(&series);
        assert_eq!(
            filled,
            vec![Some(1.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(4.0)]
        );

        assert_eq!(interpolate_linear(&[None, None]), vec![None, None]);
        assert_eq!(interpolate_linear(&[Some(2.0)]), vec![Some(2.0)]);
    }
}
