//! Info module: host facts reported by the ServerInfo RPC.
//!
//! Items are `(tp, name, pairs)` triples, e.g. `("memory", "swap",
//! [("total", "2147483648"), ...])`.

pub mod hardware;
pub mod load;
pub mod system;

/// Which collectors to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    All,
    Hardware,
    System,
    Load,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPair {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoItem {
    pub tp: String,
    pub name: String,
    pub pairs: Vec<InfoPair>,
}

impl InfoItem {
    pub fn new(tp: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tp: tp.into(),
            name: name.into(),
            pairs: Vec::new(),
        }
    }

    pub fn pair(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push(InfoPair {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }
}

/// Two-decimal rendering shared by every ratio.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> String {
    if denominator == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", numerator / denominator)
}

/// Run the collectors for `kind`. Blocking: the load collector samples
/// cpu usage over a short interval.
pub fn collect(kind: InfoKind) -> Vec<InfoItem> {
    let mut items = match kind {
        InfoKind::Load => load::collect(),
        InfoKind::Hardware => hardware::collect(),
        InfoKind::System => system::collect(),
        InfoKind::All => {
            let mut all = load::collect();
            all.extend(hardware::collect());
            all.extend(system::collect());
            all
        }
    };
    sort_items(&mut items);
    items
}

pub(crate) fn sort_items(items: &mut [InfoItem]) {
    items.sort_by(|a, b| a.tp.cmp(&b.tp).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_items_by_type_then_name() {
        let mut items = vec![
            InfoItem::new("net", "eth0"),
            InfoItem::new("cpu", "usage"),
            InfoItem::new("memory", "swap"),
            InfoItem::new("cpu", "cpu"),
            InfoItem::new("memory", "virtual"),
        ];
        sort_items(&mut items);
        let order: Vec<(&str, &str)> = items.iter().map(|i| (i.tp.as_str(), i.name.as_str())).collect();
        assert_eq!(
            order,
            vec![("cpu", "cpu"), ("cpu", "usage"), ("memory", "swap"), ("memory", "virtual"), ("net", "eth0")]
        );
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(1.0, 4.0), "0.25");
        assert_eq!(ratio(3.0, 0.0), "0.00");
    }

    #[test]
    fn test_collect_load_is_sorted_and_has_memory() {
        let items = collect(InfoKind::Load);
        assert!(items.iter().any(|i| i.tp == "memory" && i.name == "virtual"));
        assert!(items
            .windows(2)
            .all(|w| (w[0].tp.as_str(), w[0].name.as_str()) <= (w[1].tp.as_str(), w[1].name.as_str())));
    }
}
