use std::time::Instant;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use log::error;
use sqlx::MySqlPool;
use sysinfo::{Disks, Networks, System};

use super::health_models::{
    bytes_to_gb, bytes_to_mb, percent_used, round1, CpuHealth, DatabaseHealth, DiskHealth,
    HealthCache, MemoryHealth, NetworkHealth, SystemHealthData,
};
use crate::routes::guard;

pub async fn get_system_health(
    pool: web::Data<MySqlPool>,
    cache: web::Data<HealthCache>,
    req: HttpRequest,
) -> impl Responder {
    if let Err(resp) = guard::current_admin(pool.get_ref(), &req).await {
        return resp;
    }

    if let Some(cached) = cache.get_fresh(Instant::now()) {
        return HttpResponse::Ok().json(cached);
    }

    let data = collect_system_health(pool.get_ref()).await;
    cache.store(data.clone(), Instant::now());
    HttpResponse::Ok().json(data)
}

async fn collect_system_health(pool: &MySqlPool) -> SystemHealthData {
    let started = Instant::now();

    let mut sys = System::new_all();
    sys.refresh_cpu();
    // CPU usage needs two samples a beat apart.
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu();
    sys.refresh_memory();

    let cpu = CpuHealth {
        load_percent: round1(sys.global_cpu_info().cpu_usage() as f64),
        cores: sys.cpus().len(),
    };

    let memory = MemoryHealth {
        total_gb: bytes_to_gb(sys.total_memory()),
        used_gb: bytes_to_gb(sys.used_memory()),
        percent_used: percent_used(sys.used_memory(), sys.total_memory()),
    };

    let disks = Disks::new_with_refreshed_list();
    let (disk_total, disk_available) = disks
        .iter()
        .fold((0u64, 0u64), |(total, available), disk| {
            (total + disk.total_space(), available + disk.available_space())
        });
    let disk_used = disk_total.saturating_sub(disk_available);
    let disk = DiskHealth {
        total_gb: bytes_to_gb(disk_total),
        used_gb: bytes_to_gb(disk_used),
        percent_used: percent_used(disk_used, disk_total),
    };

    let networks = Networks::new_with_refreshed_list();
    let (received, transmitted) = networks
        .iter()
        .fold((0u64, 0u64), |(rx, tx), (_name, data)| {
            (rx + data.total_received(), tx + data.total_transmitted())
        });
    let network = NetworkHealth {
        received_mb: bytes_to_mb(received),
        transmitted_mb: bytes_to_mb(transmitted),
    };

    let database = ping_database(pool).await;

    SystemHealthData {
        cpu,
        memory,
        disk,
        network,
        database,
        api_ms: started.elapsed().as_millis() as u64,
        timestamp: Utc::now().to_rfc3339(),
        from_cache: false,
    }
}

async fn ping_database(pool: &MySqlPool) -> DatabaseHealth {
    let started = Instant::now();
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => DatabaseHealth {
            connected: true,
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => {
            error!("Database health check failed: {}", e);
            DatabaseHealth {
                connected: false,
                latency_ms: started.elapsed().as_millis() as u64,
            }
        }
    }
}
