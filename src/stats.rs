use crate::chart::BoxStats;

/// Resolution of the violin density curve
const KDE_GRID_POINTS: usize = 128;

/// Value at fraction `p` of an ascending slice, blending the two nearest ranks
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    match sorted_data {
        [] => 0.0,
        [only] => *only,
        _ => {
            let pos = p * (sorted_data.len() - 1) as f64;
            let below = sorted_data[pos.floor() as usize];
            let above = sorted_data[pos.ceil() as usize];
            below + (above - below) * pos.fract()
        }
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut ys = values.to_vec();
    ys.sort_by(|a, b| a.total_cmp(b));
    ys
}

/// Quartiles, Tukey whiskers (1.5 IQR) and outliers. `None` for no data.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() { return None; }
    let ys = sorted(values);

    let q1 = percentile(&ys, 0.25);
    let median = percentile(&ys, 0.50);
    let q3 = percentile(&ys, 0.75);
    let iqr = q3 - q1;

    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    // Whiskers reach the most extreme data inside the fences
    let lower_whisker = ys.iter().copied().find(|&v| v >= lower_fence).unwrap_or(q1);
    let upper_whisker = ys.iter().rev().copied().find(|&v| v <= upper_fence).unwrap_or(q3);

    let outliers = ys
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

/// Kernel width for the violin density, after Silverman.
///
/// Falls back to 1.0 when there is no spread to measure.
pub fn silverman_bandwidth(data: &[f64]) -> f64 {
    if data.len() < 2 { return 1.0; }
    let n = data.len() as f64;

    let mean = data.iter().sum::<f64>() / n;
    let sample_var = data.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    let sigma = sample_var.sqrt();

    let ys = sorted(data);
    let spread = percentile(&ys, 0.75) - percentile(&ys, 0.25);

    let scale = if spread > 0.0 { sigma.min(spread / 1.34) } else { sigma };
    if scale > 0.0 {
        0.9 * scale * n.powf(-0.2)
    } else {
        1.0
    }
}

/// Standard normal density
fn normal_pdf(u: f64) -> f64 {
    (-0.5 * u * u).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Density of `data` sampled at evenly spaced heights.
///
/// The sampled span reaches three bandwidths past the extreme values. The
/// returned curve is scaled to a peak of 1.
pub fn compute_kde(data: &[f64], bandwidth: f64) -> (Vec<f64>, Vec<f64>) {
    if data.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let ys = sorted(data);
    let lo = ys[0] - 3.0 * bandwidth;
    let hi = ys[ys.len() - 1] + 3.0 * bandwidth;
    if hi <= lo {
        return (vec![ys[0]], vec![1.0]);
    }

    let step = (hi - lo) / (KDE_GRID_POINTS - 1) as f64;
    let heights: Vec<f64> = (0..KDE_GRID_POINTS).map(|i| lo + step * i as f64).collect();
    // Unnormalized sums; scaled to a peak of 1 below
    let mut curve: Vec<f64> = heights
        .iter()
        .map(|&h| ys.iter().map(|&v| normal_pdf((h - v) / bandwidth)).sum())
        .collect();

    let peak = curve.iter().copied().fold(0.0, f64::max);
    if peak > 0.0 {
        curve.iter_mut().for_each(|d| *d /= peak);
    }

    (heights, curve)
}

/// Equal-width histogram with exactly `bin_count` bins over [min, max].
///
/// The last bin is closed on the right so the maximum is counted.
/// Returns (edges, counts); edges has `bin_count + 1` entries.
pub fn histogram(values: &[f64], bin_count: usize) -> (Vec<f64>, Vec<usize>) {
    if values.is_empty() || bin_count == 0 {
        return (vec![], vec![]);
    }

    let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    // A constant column still gets a visible unit-wide span
    let (start, width) = if max > min {
        (min, (max - min) / bin_count as f64)
    } else {
        (min - 0.5, 1.0 / bin_count as f64)
    };

    let edges: Vec<f64> = (0..=bin_count).map(|i| start + i as f64 * width).collect();
    let mut counts = vec![0usize; bin_count];
    for &v in values {
        let idx = ((v - start) / width).floor() as isize;
        let idx = idx.clamp(0, bin_count as isize - 1) as usize;
        counts[idx] += 1;
    }

    (edges, counts)
}
