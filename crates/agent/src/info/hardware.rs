//! Hardware: cpu model, memory capacity, disks and network interfaces.

use sysinfo::{Disks, Networks, System};

use super::{ratio, InfoItem};

pub fn collect() -> Vec<InfoItem> {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    sys.refresh_memory();

    let mut items = Vec::new();
    if let Some(first) = sys.cpus().first() {
        items.push(
            InfoItem::new("cpu", "cpu")
                .pair("cpu-arch", std::env::consts::ARCH)
                .pair("cpu-logical-cores", sys.cpus().len())
                .pair("cpu-frequency", format!("{}MHz", first.frequency()))
                .pair("cpu-brand", first.brand())
                .pair("cpu-vendor", first.vendor_id()),
        );
    }
    items.push(InfoItem::new("memory", "memory").pair("capacity", sys.total_memory()));
    items.extend(disks());
    items.extend(interfaces());
    items
}

fn disks() -> Vec<InfoItem> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter_map(|disk| {
            let device = disk.name().to_string_lossy();
            let name = device.strip_prefix("/dev/")?.to_string();
            let total = disk.total_space();
            let free = disk.available_space();
            let used = total.saturating_sub(free);
            Some(
                InfoItem::new("disk", name)
                    .pair("fstype", disk.file_system().to_string_lossy())
                    .pair("path", disk.mount_point().display())
                    .pair("total", total)
                    .pair("free", free)
                    .pair("used", used)
                    .pair("free-percent", ratio(free as f64, total as f64))
                    .pair("used-percent", ratio(used as f64, total as f64)),
            )
        })
        .collect()
}

fn interfaces() -> Vec<InfoItem> {
    let networks = Networks::new_with_refreshed_list();
    networks
        .list()
        .iter()
        .map(|(name, data)| InfoItem::new("net", name.as_str()).pair("mac", data.mac_address()))
        .collect()
}
