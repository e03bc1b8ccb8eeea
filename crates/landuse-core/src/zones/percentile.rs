//! Order-statistic percentiles with linear interpolation between the
//! closest ranks (Hyndman-Fan type 7).

/// Percentile `q` (0–100) of an ascending, non-empty slice.
///
/// Position `(n − 1)·q/100` is split into an index and fraction `t`; the
/// result is interpolated between the neighbouring order statistics. For
/// `t ≥ 0.5` the interpolation runs from the upper neighbour, which keeps the
/// result exact at `t = 1`.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = (n - 1) as f64 * (q / 100.0);
    let lo = pos.floor().max(0.0);
    let i = (lo as usize).min(n - 1);
    let j = (i + 1).min(n - 1);
    lerp(sorted[i], sorted[j], pos - lo)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}
