use std::time::Instant;

/// Logs pipeline stage boundaries with the time elapsed since the run began.
///
/// Computational functions never see the clock; the code driving the stages
/// calls `stage` once each stage is done.
#[derive(Clone, Copy, Debug)]
pub struct StageTimer {
	start: Instant,
}

impl StageTimer {
	pub fn start() -> Self {
		Self { start: Instant::now() }
	}

	/// Seconds since `start`.
	pub fn elapsed(&self) -> f64 {
		self.start.elapsed().as_secs_f64()
	}

	pub fn stage(&self, message: &str) {
		log::info!("[  {:.2}  ] {}", self.elapsed(), message);
	}
}
