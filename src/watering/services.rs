/// Litres delivered by a run of `duration` minutes at `rate_lpm`, rounded to cents of a litre.
pub fn water_used(duration: i32, rate_lpm: f64) -> f64 {
    (f64::from(duration) * rate_lpm * 100.0).round() / 100.0
}

/// Sum for display; the database returns `NULL` when there is nothing to add.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
