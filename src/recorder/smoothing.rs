use std::iter;

/// Centered box-filter moving average with edge-replication padding.
///
/// The input is padded with `window` copies of its first value on the left
/// and `window` copies of its last value on the right, convolved with a
/// uniform kernel of width `window` (output the length of the padded input,
/// kernel centered the way a "same"-mode convolution centers it), and then
/// trimmed by `window` on each side. The result has the length of `values`.
///
/// An empty input logs a warning and yields an empty result.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
        log::warn!("moving average received an empty series");
        return Vec::new();
    };
    if window == 0 {
        log::warn!("moving average window must be >= 1, returning series unsmoothed");
        return values.to_vec();
    }

    let padded: Vec<f64> = iter::repeat(first)
        .take(window)
        .chain(values.iter().copied())
        .chain(iter::repeat(last).take(window))
        .collect();

    // Output index t of the trimmed "same" convolution averages the padded
    // slice starting at t + offset + 1; it never reaches past the padding.
    let offset = window - 1 - window / 2;
    let scale = 1.0 / window as f64;
    (0..values.len())
        .map(|t| {
            let start = t + offset + 1;
            padded[start..start + window].iter().sum::<f64>() * scale
        })
        .collect()
}
