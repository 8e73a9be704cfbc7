//! System: OS identity, kernel tunables and transparent hugepages.

use std::fs;
use std::path::Path;
use std::process::Command;

use sysinfo::System;
use tracing::debug;

use super::{InfoItem, InfoPair};

const PROC_SYS: &str = "/proc/sys";
const THP_ENABLED: &str = "/sys/kernel/mm/transparent_hugepage/enabled";

pub fn collect() -> Vec<InfoItem> {
    let mut items = vec![os_identity()];

    let mut pairs = walk_sysctl(Path::new(PROC_SYS));
    if pairs.is_empty() {
        pairs = sysctl_command();
    }
    if !pairs.is_empty() {
        let mut sysctl = InfoItem::new("system", "sysctl");
        sysctl.pairs = pairs;
        items.push(sysctl);
    }

    if let Some(thp) = transparent_hugepage(Path::new(THP_ENABLED)) {
        items.push(thp);
    }
    items
}

fn os_identity() -> InfoItem {
    let unknown = || "unknown".to_string();
    InfoItem::new("system", "os")
        .pair("os-name", System::name().unwrap_or_else(unknown))
        .pair("os-version", System::os_version().unwrap_or_else(unknown))
        .pair("kernel-version", System::kernel_version().unwrap_or_else(unknown))
        .pair("hostname", System::host_name().unwrap_or_else(unknown))
        .pair("uptime", System::uptime())
}

/// Every readable file under `root`, keyed by its relative path with `/`
/// turned into `.` (`net/core/somaxconn` -> `net.core.somaxconn`).
pub fn walk_sysctl(root: &Path) -> Vec<InfoPair> {
    let mut pairs = Vec::new();
    walk(root, root, &mut pairs);
    pairs
}

fn walk(root: &Path, dir: &Path, pairs: &mut Vec<InfoPair>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => walk(root, &path, pairs),
            Ok(_) => {
                // write-only and permission-restricted entries are skipped
                let Ok(content) = fs::read(&path) else {
                    continue;
                };
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                pairs.push(InfoPair {
                    key: relative.to_string_lossy().replace('/', "."),
                    value: String::from_utf8_lossy(&content).trim().to_string(),
                });
            }
            Err(_) => {}
        }
    }
}

fn sysctl_command() -> Vec<InfoPair> {
    let output = match Command::new("sysctl").arg("-a").output() {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, "sysctl -a unavailable");
            return Vec::new();
        }
    };
    parse_sysctl_output(&String::from_utf8_lossy(&output.stdout))
}

/// `key: value` (BSD) or `key = value` (Linux procps) lines.
fn parse_sysctl_output(text: &str) -> Vec<InfoPair> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(" = ").or_else(|| line.split_once(':'))?;
            Some(InfoPair {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

fn transparent_hugepage(path: &Path) -> Option<InfoItem> {
    let content = fs::read_to_string(path).ok()?;
    Some(InfoItem::new("system", "kernel").pair("transparent_hugepage_enabled", content.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_sysctl_keys_and_values() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("net/core")).unwrap();
        fs::write(root.path().join("net/core/somaxconn"), "4096\n").unwrap();
        fs::write(root.path().join("net/core/rmem_max"), " 212992 \n").unwrap();
        fs::create_dir_all(root.path().join("vm")).unwrap();
        fs::write(root.path().join("vm/swappiness"), "60\n").unwrap();

        let pairs = walk_sysctl(root.path());
        let flat: Vec<(&str, &str)> = pairs.iter().map(|p| (p.key.as_str(), p.value.as_str())).collect();
        assert_eq!(
            flat,
            vec![
                ("net.core.rmem_max", "212992"),
                ("net.core.somaxconn", "4096"),
                ("vm.swappiness", "60"),
            ]
        );
    }

    #[test]
    fn test_walk_sysctl_missing_root() {
        assert!(walk_sysctl(Path::new("/nonexistent/proc/sys")).is_empty());
    }

    #[test]
    fn test_parse_sysctl_output() {
        let pairs = parse_sysctl_output("kern.ostype: Darwin\nvm.swappiness = 60\ngarbage\n");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].key, "kern.ostype");
        assert_eq!(pairs[0].value, "Darwin");
        assert_eq!(pairs[1].key, "vm.swappiness");
        assert_eq!(pairs[1].value, "60");
    }

    #[test]
    fn test_transparent_hugepage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enabled");
        fs::write(&path, "always [madvise] never\n").unwrap();
        let item = transparent_hugepage(&path).unwrap();
        assert_eq!(item.name, "kernel");
        assert_eq!(item.pairs[0].value, "always [madvise] never");
        assert!(transparent_hugepage(&dir.path().join("missing")).is_none());
    }

    #[test]
    fn test_os_identity_keys() {
        let item = os_identity();
        assert_eq!(item.tp, "system");
        assert_eq!(item.pairs.len(), 5);
    }
}
