//! Numerically stable primitives for log-domain HMM recursions.

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        sum += (*v - max).exp();
    }
    max + sum.ln()
}

/// Stable log(sum(exp(a_i + b_i))) without allocating the pairwise sums.
///
/// Used by the forward and backward passes, where `a` is a row of log
/// probabilities and `b` a column of log transition weights.
pub fn log_sum_exp_pairs<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)> + Clone,
{
    let mut max = f64::NEG_INFINITY;
    for (a, b) in pairs.clone() {
        let v = a + b;
        if v.is_nan() {
            return f64::NAN;
        }
        if v > max {
            max = v;
        }
    }
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        return max;
    }
    let mut sum = 0.0;
    for (a, b) in pairs {
        sum += (a + b - max).exp();
    }
    max + sum.ln()
}

/// Stable log(exp(a) + exp(b)).
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    if a == f64::INFINITY || b == f64::INFINITY {
        return f64::INFINITY;
    }
    let m = a.max(b);
    let diff = (a - b).abs();
    m + (-diff).exp().ln_1p()
}

/// Natural log of a probability, mapping 0 to NEG_INFINITY explicitly.
pub fn ln_prob(p: f64) -> f64 {
    if p <= 0.0 {
        f64::NEG_INFINITY
    } else {
        p.ln()
    }
}
