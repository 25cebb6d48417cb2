use super::state::Particle;

/// Fixed-capacity dust pool. Storage is reserved once; culling compacts in place
/// and spawns past capacity are dropped.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
}

impl ParticlePool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Integrates every particle and removes the ones whose life ran out.
    pub fn advance(&mut self, delta_time: f32, gravity: f32) {
        for particle in &mut self.particles {
            particle.x += particle.vx * delta_time;
            particle.y += particle.vy * delta_time;
            particle.vy += gravity * delta_time;
            particle.life -= delta_time;
        }
        self.particles.retain(|particle| particle.life > 0.0);
    }

    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.is_full() || particle.life <= 0.0 {
            return false;
        }
        self.particles.push(particle);
        true
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(life: f32) -> Particle {
        Particle {
            x: 0.0,
            y: 0.0,
            vx: -10.0,
            vy: -100.0,
            life,
            max_life: 1.0,
            size: 3.0,
        }
    }

    #[test]
    fn expired_particles_are_removed_in_the_tick_they_expire() {
        let mut pool = ParticlePool::with_capacity(8);
        assert!(pool.spawn(particle(0.05)));
        assert!(pool.spawn(particle(0.5)));

        pool.advance(0.1, 400.0);

        assert_eq!(pool.len(), 1);
        assert!(pool.iter().all(|p| p.life > 0.0));
    }

    #[test]
    fn particles_fall_under_gravity() {
        let mut pool = ParticlePool::with_capacity(1);
        pool.spawn(particle(1.0));
        pool.advance(0.5, 400.0);

        let p = pool.iter().next().copied().expect("particle should survive");
        assert_eq!(p.x, -5.0);
        assert_eq!(p.y, -50.0);
        assert_eq!(p.vy, 100.0);
    }

    #[test]
    fn spawns_beyond_capacity_are_dropped_without_growing() {
        let mut pool = ParticlePool::with_capacity(4);
        let reserved = pool.particles.capacity();
        for _ in 0..10 {
            pool.spawn(particle(1.0));
        }
        assert_eq!(pool.len(), 4);
        assert!(pool.is_full());
        assert_eq!(pool.particles.capacity(), reserved);
        assert!(!pool.spawn(particle(1.0)));
    }
}
