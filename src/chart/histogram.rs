use super::ChartError;

/// Number of grid points the density curve is evaluated on.
pub const KDE_GRID_POINTS: usize = 200;

// ---------------------------------------------------------------------------
// Equal-width binning
// ---------------------------------------------------------------------------

/// Counts of values in equal-width bins.
///
/// Bins are half-open `[edge[i], edge[i + 1])` except the last, which also
/// includes its right edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite `values` into `bins` bins spanning their min..max.
    ///
    /// A degenerate range (all values equal) is widened by half a unit on
    /// each side. No finite values yields an empty histogram.
    pub fn compute(values: &[f64], bins: usize) -> Result<Self, ChartError> {
        if bins == 0 {
            return Err(ChartError::InvalidBins);
        }
        let Some((mut lo, mut hi)) = finite_min_max(values) else {
            return Ok(Histogram {
                edges: Vec::new(),
                counts: Vec::new(),
            });
        };
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &v in values.iter().filter(|v| v.is_finite()) {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Histogram { edges, counts })
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// Midpoint of every bin.
    pub fn centers(&self) -> impl Iterator<Item = f64> + '_ {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

fn finite_min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Gaussian KDE of `values` on an even grid over their min..max.
///
/// Bandwidth follows Scott's rule (`σ·n^(-1/5)` with the sample standard
/// deviation). The density is multiplied by `scale`; pass
/// `n * bin_width` to overlay it on a histogram of counts. Returns `None`
/// when fewer than two finite values or zero spread leave nothing to
/// estimate.
pub fn kde_curve(values: &[f64], grid_points: usize, scale: f64) -> Option<Vec<[f64; 2]>> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = data.len();
    if n < 2 || grid_points < 2 {
        return None;
    }

    let mean = data.iter().sum::<f64>() / n as f64;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 || !std_dev.is_finite() {
        return None;
    }
    let bandwidth = std_dev * (n as f64).powf(-0.2);

    let (lo, hi) = finite_min_max(&data)?;
    let step = (hi - lo) / (grid_points - 1) as f64;
    let norm = scale / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let curve = (0..grid_points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = data
                .iter()
                .map(|&v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            [x, density * norm]
        })
        .collect();
    Some(curve)
}

/// The x position of the highest point of a density curve.
pub fn peak_duration(curve: &[[f64; 2]]) -> Option<f64> {
    curve
        .iter()
        .max_by(|a, b| a[1].total_cmp(&b[1]))
        .map(|p| p[0])
}
