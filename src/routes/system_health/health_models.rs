use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

pub const HEALTH_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize)]
pub struct CpuHealth {
    pub load_percent: f64,
    pub cores: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryHealth {
    pub total_gb: f64,
    pub used_gb: f64,
    pub percent_used: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskHealth {
    pub total_gb: f64,
    pub used_gb: f64,
    pub percent_used: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkHealth {
    pub received_mb: f64,
    pub transmitted_mb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealthData {
    pub cpu: CpuHealth,
    pub memory: MemoryHealth,
    pub disk: DiskHealth,
    pub network: NetworkHealth,
    pub database: DatabaseHealth,
    pub api_ms: u64,
    pub timestamp: String,
    pub from_cache: bool,
}

// Best-effort cache so back-to-back dashboard refreshes do not hammer the
// host metrics collection.
pub struct HealthCache {
    inner: Mutex<Option<(Instant, SystemHealthData)>>,
}

impl HealthCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    pub fn get_fresh(&self, now: Instant) -> Option<SystemHealthData> {
        let guard = self.inner.lock().ok()?;
        match guard.as_ref() {
            Some((stored_at, data)) if now.duration_since(*stored_at) < HEALTH_CACHE_TTL => {
                let mut data = data.clone();
                data.from_cache = true;
                Some(data)
            }
            _ => None,
        }
    }

    pub fn store(&self, data: SystemHealthData, now: Instant) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some((now, data));
        }
    }
}

impl Default for HealthCache {
    fn default() -> Self {
        Self::new()
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    round1(bytes as f64 / (1024.0 * 1024.0 * 1024.0))
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    round1(bytes as f64 / (1024.0 * 1024.0))
}

pub fn percent_used(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(used as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> SystemHealthData {
        SystemHealthData {
            cpu: CpuHealth { load_percent: 12.5, cores: 8 },
            memory: MemoryHealth { total_gb: 16.0, used_gb: 8.0, percent_used: 50.0 },
            disk: DiskHealth { total_gb: 500.0, used_gb: 250.0, percent_used: 50.0 },
            network: NetworkHealth { received_mb: 1.0, transmitted_mb: 2.0 },
            database: DatabaseHealth { connected: true, latency_ms: 3 },
            api_ms: 20,
            timestamp: "2025-01-01T00:00:00Z".into(),
            from_cache: false,
        }
    }

    #[test]
    fn cache_hits_within_ttl() {
        let cache = HealthCache::new();
        let now = Instant::now();
        cache.store(sample_data(), now);

        let hit = cache.get_fresh(now + Duration::from_secs(10)).unwrap();
        assert!(hit.from_cache);
        assert_eq!(hit.cpu.cores, 8);
    }

    #[test]
    fn cache_expires_after_ttl() {
        let cache = HealthCache::new();
        let now = Instant::now();
        cache.store(sample_data(), now);

        assert!(cache.get_fresh(now + HEALTH_CACHE_TTL).is_none());
        assert!(cache.get_fresh(now + Duration::from_secs(60)).is_none());
    }

    #[test]
    fn empty_cache_misses() {
        let cache = HealthCache::new();
        assert!(cache.get_fresh(Instant::now()).is_none());
    }

    #[test]
    fn unit_conversions_round_to_one_decimal() {
        assert_eq!(bytes_to_gb(8 * 1024 * 1024 * 1024), 8.0);
        assert_eq!(bytes_to_mb(1_572_864), 1.5);
        assert_eq!(percent_used(1, 3), 33.3);
        assert_eq!(percent_used(0, 0), 0.0);
    }
}
