//! Numeric summaries over P&L samples.

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(sum(values) / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator). Zero below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = sum(values) / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Percentile `p` in `[0, 100]` with linear interpolation between the two
/// closest ranks (rank = p/100 * (n - 1) over the sorted sample).
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !p.is_finite() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Historical Value at Risk: the `(100 - confidence)`th percentile of the
/// daily P&L sample.
pub fn value_at_risk(values: &[f64], confidence: u8) -> Option<f64> {
    percentile(values, 100.0 - f64::from(confidence))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins between the sample minimum and maximum. Every bin is
/// half-open except the last, which also holds the maximum.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let (Some(lo), Some(hi)) = (min(values), max(values)) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if hi == lo {
        return vec![Bin {
            lower: lo - 0.5,
            upper: hi + 0.5,
            count: values.len(),
        }];
    }

    let width = (hi - lo) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
