use crate::parser::ParseOutcome;
use crate::stats::{Statistics, sorted_by_count};

pub fn render_markdown(stats: &Statistics, outcome: &ParseOutcome) -> String {
    let mut s = String::new();
    s.push_str("# File Access Report\n\n");

    s.push_str("## Summary\n");
    s.push_str(&format!("- Lines: {}\n", outcome.total_lines));
    s.push_str(&format!("- Parsed: {}\n", outcome.parsed));
    s.push_str(&format!("- Parse errors: {}\n", outcome.errors));
    s.push_str(&format!("- Paths: {}\n", stats.paths_count));
    s.push_str(&format!("- Write paths: {}\n", stats.write_paths_count));
    s.push_str(&format!("- PIDs: {}\n\n", stats.pid_count));

    s.push_str("## Paths\n");
    if stats.count_per_path.is_empty() { s.push_str("None\n"); } else { for (p, c) in sorted_by_count(&stats.count_per_path) { s.push_str(&format!("- `{}`: {}\n", p, c)); } }
    s.push('\n');

    s.push_str("## Write Paths\n");
    if stats.count_per_write_path.is_empty() { s.push_str("None\n"); } else { for (p, c) in sorted_by_count(&stats.count_per_write_path) { s.push_str(&format!("- `{}`: {}\n", p, c)); } }
    s.push('\n');

    s.push_str("## PIDs\n");
    if stats.count_per_pid.is_empty() { s.push_str("None\n"); } else { for (pid, c) in sorted_by_count(&stats.count_per_pid) { s.push_str(&format!("- {} ({}): {}\n", pid, stats.process_of(pid), c)); } }
    s
}
