//! Traveling "impulse" dots animated along links.
//!
//! Impulses suggest signal flow between nodes. They are purely visual: the
//! system owns only ephemeral per-impulse phase, spawns on its own clock
//! independent of the orbital loop's timing, and is reset wholesale whenever
//! the visible link set changes so an impulse never starts mid-flight on a
//! link it wasn't spawned for.
//!
//! Impulses are keyed by the link's index in the view state's stable link
//! list, giving each link one identity regardless of endpoint order.

/// A single dot traveling along one link.
#[derive(Clone, Debug)]
pub struct Impulse {
	/// Index into the view state's link list.
	pub link: usize,
	/// Position along the line, 0 at source, 1 at target.
	pub progress: f64,
	/// Progress per second.
	pub speed: f64,
}

/// Spawns, advances and retires impulses for a fixed link set.
pub struct ImpulseSystem {
	impulses: Vec<Impulse>,
	link_count: usize,
	spawn_clock: f64,
	spawn_serial: u64,
}

/// Seconds between spawn attempts.
const SPAWN_INTERVAL: f64 = 0.35;

impl ImpulseSystem {
	pub fn new(link_count: usize) -> Self {
		Self {
			impulses: Vec::new(),
			link_count,
			spawn_clock: 0.0,
			spawn_serial: 0,
		}
	}

	/// Discard all impulses and adopt a new link set.
	pub fn reset(&mut self, link_count: usize) {
		self.impulses.clear();
		self.link_count = link_count;
		self.spawn_clock = 0.0;
	}

	/// In-flight impulses, for the painter.
	pub fn impulses(&self) -> &[Impulse] {
		&self.impulses
	}

	/// At most one impulse in flight per ~3 links, with a small floor so
	/// sparse graphs still show activity.
	fn capacity(&self) -> usize {
		if self.link_count == 0 {
			0
		} else {
			(self.link_count / 3).max(2)
		}
	}

	/// Advance all impulses by `dt` seconds, retire the ones that reached
	/// the far end, and periodically spawn new ones.
	pub fn update(&mut self, dt: f64) {
		if self.link_count == 0 {
			return;
		}

		for impulse in &mut self.impulses {
			impulse.progress += impulse.speed * dt;
		}
		self.impulses.retain(|i| i.progress < 1.0);

		self.spawn_clock += dt;
		while self.spawn_clock >= SPAWN_INTERVAL {
			self.spawn_clock -= SPAWN_INTERVAL;
			if self.impulses.len() >= self.capacity() {
				continue;
			}
			self.spawn_serial += 1;
			let roll = pseudo_random(self.spawn_serial as f64 * 0.61);
			self.impulses.push(Impulse {
				link: (roll * self.link_count as f64) as usize % self.link_count,
				progress: 0.0,
				speed: 0.25 + pseudo_random(self.spawn_serial as f64 * 1.37) * 0.35,
			});
		}
	}

	/// Whether anything is animating (the caller may skip redraws if not).
	pub fn is_active(&self) -> bool {
		!self.impulses.is_empty()
	}
}

/// Deterministic pseudo-random in [0, 1); same shape as the layout jitter.
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn impulses_spawn_with_zero_progress() {
		let mut system = ImpulseSystem::new(6);
		system.update(SPAWN_INTERVAL);
		assert!(system.is_active());
		for i in system.impulses() {
			assert_eq!(i.progress, 0.0);
			assert!(i.link < 6);
			assert!(i.speed > 0.0);
		}
	}

	#[test]
	fn impulses_retire_at_full_progress() {
		let mut system = ImpulseSystem::new(3);
		system.update(SPAWN_INTERVAL);
		assert!(system.is_active());
		// Slowest speed is 0.25 progress/s: 5 seconds finishes any impulse
		// spawned above; spawns during this step also age past 1.0 except
		// the very last batch, so drain twice with no spawning in between.
		for _ in 0..3 {
			system.update(4.9);
		}
		for i in system.impulses() {
			assert!(i.progress < 1.0);
		}
	}

	#[test]
	fn reset_clears_in_flight_impulses() {
		let mut system = ImpulseSystem::new(8);
		system.update(1.0);
		assert!(system.is_active());
		system.reset(4);
		assert!(!system.is_active());
		system.update(SPAWN_INTERVAL);
		for i in system.impulses() {
			assert!(i.link < 4, "impulse on stale link index {}", i.link);
			assert_eq!(i.progress, 0.0);
		}
	}

	#[test]
	fn capacity_is_bounded_by_link_count() {
		let mut system = ImpulseSystem::new(9);
		for _ in 0..100 {
			system.update(SPAWN_INTERVAL);
		}
		assert!(system.impulses().len() <= 3);
	}

	#[test]
	fn empty_link_set_spawns_nothing() {
		let mut system = ImpulseSystem::new(0);
		system.update(10.0);
		assert!(!system.is_active());
	}
}
