use std::collections::BTreeMap;
use serde::Serialize;
use crate::decoder::DecodedEvent;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub count_per_path: BTreeMap<String, usize>,
    pub count_per_pid: BTreeMap<String, usize>,
    pub count_per_write_path: BTreeMap<String, usize>,
    pub pid_to_process: BTreeMap<String, String>,
    pub paths_count: usize,
    pub pid_count: usize,
    pub write_paths_count: usize,
}

/// Folds decoded events into the three count tables. A pid keeps the process
/// name of its first event in input order.
pub fn aggregate(events: &[DecodedEvent]) -> Statistics {
    let mut count_per_path: BTreeMap<String, usize> = BTreeMap::new();
    let mut count_per_pid: BTreeMap<String, usize> = BTreeMap::new();
    let mut count_per_write_path: BTreeMap<String, usize> = BTreeMap::new();
    let mut pid_to_process: BTreeMap<String, String> = BTreeMap::new();
    for d in events {
        let e = &d.event;
        *count_per_path.entry(e.path.clone()).or_insert(0) += 1;
        *count_per_pid.entry(e.pid.clone()).or_insert(0) += 1;
        if d.is_write() { *count_per_write_path.entry(e.path.clone()).or_insert(0) += 1; }
        pid_to_process.entry(e.pid.clone()).or_insert_with(|| e.process.clone());
    }
    Statistics {
        paths_count: count_per_path.len(),
        pid_count: count_per_pid.len(),
        write_paths_count: count_per_write_path.len(),
        count_per_path,
        count_per_pid,
        count_per_write_path,
        pid_to_process,
    }
}

/// Count descending; ties keep ascending key order.
pub fn sorted_by_count(map: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut v: Vec<(&str, usize)> = map.iter().map(|(k, c)| (k.as_str(), *c)).collect();
    v.sort_by(|a, b| b.1.cmp(&a.1));
    v
}

impl Statistics {
    pub fn process_of(&self, pid: &str) -> &str {
        self.pid_to_process.get(pid).map(|s| s.as_str()).unwrap_or("")
    }
}
