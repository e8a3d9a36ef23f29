//! Tempo decomposition for backends with a bounded per-stage stretch range

/// Slowest factor a single `atempo` stage accepts
pub const MIN_STAGE: f64 = 0.5;

/// Fastest factor a single `atempo` stage accepts
pub const MAX_STAGE: f64 = 2.0;

/// Split `speed` into stages that each lie in `[0.5, 2.0]`.
///
/// The product of the returned factors equals `speed`. The last entry is the
/// residual and is always present, so `tempo_stages(1.0) == [1.0]`.
/// Non-positive or non-finite speeds yield an empty list.
pub fn tempo_stages(speed: f64) -> Vec<f64> {
    if !speed.is_finite() || speed <= 0.0 {
        return Vec::new();
    }

    let mut stages = Vec::new();
    let mut residual = speed;
    while residual > MAX_STAGE {
        stages.push(MAX_STAGE);
        residual /= MAX_STAGE;
    }
    while residual < MIN_STAGE {
        stages.push(MIN_STAGE);
        residual /= MIN_STAGE;
    }
    stages.push(residual);
    stages
}

/// Whether a speed needs any tempo stage at all
pub fn is_unity(speed: f64) -> bool {
    (speed - 1.0).abs() < 1e-9
}
