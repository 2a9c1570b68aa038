//! One-shot metric sampling via sysinfo.

use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// One sample of the four monitored metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSnapshot {
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub disk_percent: f32,
    pub process_count: usize,
}

/// Take one sample of CPU, memory, disk, and process count.
///
/// CPU usage needs two refreshes separated by the minimum update interval to
/// produce a meaningful delta, so this call blocks for that long.
pub fn sample() -> HealthSnapshot {
    let mut sys = System::new_all();

    sys.refresh_cpu_usage();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();
    let cpu_percent = sys.global_cpu_usage();

    let mem_percent = if sys.total_memory() == 0 {
        0.0
    } else {
        sys.used_memory() as f32 / sys.total_memory() as f32 * 100.0
    };

    HealthSnapshot {
        cpu_percent,
        mem_percent,
        disk_percent: root_disk_percent(),
        process_count: sys.processes().len(),
    }
}

/// Usage of the root filesystem, falling back to the largest disk when no
/// mount point is exactly `/` (e.g. some containers).
fn root_disk_percent() -> f32 {
    let disks = Disks::new_with_refreshed_list();

    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == std::path::Path::new("/"))
        .or_else(|| disks.list().iter().max_by_key(|d| d.total_space()));

    match disk {
        Some(disk) if disk.total_space() > 0 => {
            let used = disk.total_space() - disk.available_space();
            used as f32 / disk.total_space() as f32 * 100.0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_yields_plausible_readings() {
        let snapshot = sample();

        assert!(snapshot.cpu_percent >= 0.0);
        assert!((0.0..=100.0).contains(&snapshot.mem_percent));
        assert!((0.0..=100.0).contains(&snapshot.disk_percent));
        assert!(snapshot.process_count > 0);
    }
}
