/// mean returns the arithmetic mean, or `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f32>
where
    I: IntoIterator<Item = f32>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f32, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}

/// clamp_score pins a score into [0, 100]; NaN becomes 0.
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        return 0.0
    }
    score.clamp(0.0, 100.0)
}

/// weighted_mean averages `(value, weight)` pairs, returning `None` when
/// the weights sum to zero.
pub fn weighted_mean<I>(pairs: I) -> Option<f32>
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let (weighted_sum, total_weight) = pairs
        .into_iter()
        .fold((0.0f32, 0.0f32), |(s, w), (value, weight)| (s + value * weight, w + weight));
    if total_weight > 0.0 {
        Some(weighted_sum / total_weight)
    } else {
        None
    }
}
