//! Progress side channel.

/// Receives one update per completed generation step.
pub trait ProgressReporter: Send + Sync {
    /// `fraction` is in `[0, 1]`.
    fn report(&self, step: &str, fraction: f32);
}

/// Logs progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, step: &str, fraction: f32) {
        tracing::info!("[{:>3.0}%] {}", fraction * 100.0, step);
    }
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, f32) + Send + Sync,
{
    fn report(&self, step: &str, fraction: f32) {
        self(step, fraction)
    }
}
