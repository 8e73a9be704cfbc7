//! Load: cpu load, memory pressure and per-NIC traffic counters.

use sysinfo::{Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::{ratio, InfoItem};

pub fn collect() -> Vec<InfoItem> {
    let mut items = cpu_load();
    items.extend(memory_load());
    items.extend(nic_load());
    items
}

fn cpu_load() -> Vec<InfoItem> {
    let avg = System::load_average();
    let load = InfoItem::new("cpu", "cpu")
        .pair("load1", format!("{:.2}", avg.one))
        .pair("load5", format!("{:.2}", avg.five))
        .pair("load15", format!("{:.2}", avg.fifteen));

    // usage is a delta between two refreshes
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();

    let used = f64::from(sys.global_cpu_usage()) / 100.0;
    let mut usage = InfoItem::new("cpu", "usage")
        .pair("used", format!("{:.2}", used))
        .pair("idle", format!("{:.2}", 1.0 - used));
    for (i, cpu) in sys.cpus().iter().enumerate() {
        usage = usage.pair(format!("cpu{}", i), format!("{:.2}", f64::from(cpu.cpu_usage()) / 100.0));
    }

    vec![load, usage]
}

fn memory_load() -> Vec<InfoItem> {
    let mut sys = System::new();
    sys.refresh_memory();

    let total = sys.total_memory();
    let available = sys.available_memory();
    let used = total.saturating_sub(available);
    let virt = InfoItem::new("memory", "virtual")
        .pair("total", total)
        .pair("used", used)
        .pair("free", available)
        .pair("used-percent", ratio(used as f64, total as f64))
        .pair("free-percent", ratio(available as f64, total as f64));

    let swap_total = sys.total_swap();
    let swap = InfoItem::new("memory", "swap")
        .pair("total", swap_total)
        .pair("used", sys.used_swap())
        .pair("free", sys.free_swap())
        .pair("used-percent", ratio(sys.used_swap() as f64, swap_total as f64))
        .pair("free-percent", ratio(sys.free_swap() as f64, swap_total as f64));

    vec![virt, swap]
}

fn nic_load() -> Vec<InfoItem> {
    let networks = Networks::new_with_refreshed_list();
    networks
        .list()
        .iter()
        .map(|(name, data)| {
            InfoItem::new("net", name.as_str())
                .pair("bytes-sent", data.total_transmitted())
                .pair("bytes-recv", data.total_received())
                .pair("packets-sent", data.total_packets_transmitted())
                .pair("packets-recv", data.total_packets_received())
                .pair("errin", data.total_errors_on_received())
                .pair("errout", data.total_errors_on_transmitted())
        })
        .collect()
}
