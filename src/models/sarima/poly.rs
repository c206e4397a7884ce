//! Lag polynomials for the multiplicative seasonal model.
//!
//! A polynomial `c(B) = c_0 + c_1 B + c_2 B^2 + ...` is stored as its
//! coefficient vector `[c_0, c_1, ...]`.

/// Product of two lag polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 + sign * (c_1 B^step + c_2 B^(2 step) + ...)`.
fn expand(coefs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefs.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// `φ(B) Φ(B^s)` with the sign convention `1 - φ_1 B - ...`.
pub fn ar_polynomial(ar: &[f64], seasonal_ar: &[f64], period: usize) -> Vec<f64> {
    multiply(&expand(ar, 1, -1.0), &expand(seasonal_ar, period.max(1), -1.0))
}

/// `θ(B) Θ(B^s)` with the sign convention `1 + θ_1 B + ...`.
pub fn ma_polynomial(ma: &[f64], seasonal_ma: &[f64], period: usize) -> Vec<f64> {
    multiply(&expand(ma, 1, 1.0), &expand(seasonal_ma, period.max(1), 1.0))
}

/// `(1 - B)^d (1 - B^s)^D`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    let seasonal = expand(&[1.0], period.max(1), -1.0);
    for _ in 0..seasonal_d {
        poly = multiply(&poly, &seasonal);
    }
    poly
}

/// Apply a lag polynomial: `w_t = Σ c_k y_{t-k}` for `t >= deg(c)`.
///
/// The output has `series.len() - deg(c)` entries, or none when the series
/// is too short.
pub fn apply_filter(poly: &[f64], series: &[f64]) -> Vec<f64> {
    let lag = poly.len().saturating_sub(1);
    if poly.is_empty() || series.len() <= lag {
        return vec![];
    }
    (lag..series.len())
        .map(|t| poly.iter().enumerate().map(|(k, c)| c * series[t - k]).sum())
        .collect()
}

/// Invert a monic differencing polynomial over future values.
///
/// Given the history `y` and future filtered values `w`, returns the future
/// `y_t = w_t - Σ_{k>=1} c_k y_{t-k}`.
pub fn integrate(poly: &[f64], history: &[f64], future: &[f64]) -> Vec<f64> {
    let mut extended = history.to_vec();
    for &w in future {
        let t = extended.len();
        let carried: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(k, _)| *k <= t)
            .map(|(k, c)| c * extended[t - k])
            .sum();
        extended.push(w - carried);
    }
    extended.split_off(history.len())
}

/// First `count` ψ-weights of `ma(B) / ar(B)` for monic `ar`.
pub fn psi_weights(ar: &[f64], ma: &[f64], count: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(count);
    for j in 0..count {
        let mut value = ma.get(j).copied().unwrap_or(0.0);
        for k in 1..=j.min(ar.len().saturating_sub(1)) {
            value -= ar[k] * psi[j - k];
        }
        psi.push(value);
    }
    psi
}
