use crate::stats::{Statistics, sorted_by_count};
use crate::Theme;

const BASE_CSS: &str = "body{margin:0;background:var(--bg);color:var(--fg);font-family:Segoe UI,system-ui,-apple-system,Arial,sans-serif} .container{max-width:1200px;margin:0 auto;padding:24px} .header{display:flex;align-items:center;justify-content:space-between;gap:12px;margin-bottom:16px} .title{font-size:20px;font-weight:600;letter-spacing:.2px} .sub{color:var(--muted);font-size:13px} .grid{display:grid;grid-template-columns:repeat(3,minmax(0,1fr));gap:12px} .card{background:var(--card);border:1px solid var(--border);border-radius:10px;padding:14px} .metric{display:flex;align-items:center;justify-content:space-between;text-decoration:none;color:var(--fg)} .metric .label{color:var(--muted);font-size:12px} .metric .value{font-size:22px;font-weight:700} .section{margin-top:18px} .section h3{margin:0 0 10px 0;font-size:16px;font-weight:600} .entries{list-style:none;margin:0;padding:0} .entries li{padding:6px 10px;border-bottom:1px solid var(--border);font-family:Consolas,Monaco,monospace;font-size:13px;word-break:break-all} .entries li:last-child{border-bottom:none} .proc{color:var(--accent)} .count{color:var(--muted)} .footer{margin-top:22px;color:var(--muted);font-size:12px} @media (max-width:900px){.grid{grid-template-columns:1fr}}";

/// Renders the report. Path and process strings are inserted verbatim.
pub fn render_html(stats: &Statistics, theme: Theme) -> String {
    let mut s = String::new();
    s.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>File Access Report</title><style>");
    match theme {
        Theme::Dark => s.push_str(":root{--bg:#0a0e13;--fg:#ffffff;--muted:#c0c4cc;--card:#0d131a;--border:#243041;--accent:#3b82f6} "),
        Theme::Light => s.push_str(":root{--bg:#f7fafc;--fg:#111827;--muted:#6b7280;--card:#ffffff;--border:#e5e7eb;--accent:#2563eb} "),
    }
    s.push_str(BASE_CSS);
    s.push_str("</style></head><body><div class=\"container\">");
    s.push_str("<div class=\"header\"><div class=\"title\">File Access Report</div></div>");
    s.push_str("<div class=\"grid\" id=\"summary\">");
    s.push_str(&metric("paths", "Paths", stats.paths_count));
    s.push_str(&metric("write-paths", "Write Paths", stats.write_paths_count));
    s.push_str(&metric("pids", "PIDs", stats.pid_count));
    s.push_str("</div>");

    s.push_str("<div class=\"section\" id=\"paths\"><h3>Paths</h3><div class=\"card\"><ul class=\"entries\">");
    for (path, c) in sorted_by_count(&stats.count_per_path) {
        s.push_str(&format!("<li>{}: <span class=\"count\">{}</span></li>", path, c));
    }
    s.push_str("</ul></div></div>");

    s.push_str("<div class=\"section\" id=\"write-paths\"><h3>Write Paths</h3><div class=\"card\"><ul class=\"entries\">");
    for (path, c) in sorted_by_count(&stats.count_per_write_path) {
        s.push_str(&format!("<li>{}: <span class=\"count\">{}</span></li>", path, c));
    }
    s.push_str("</ul></div></div>");

    s.push_str("<div class=\"section\" id=\"pids\"><h3>PIDs</h3><div class=\"card\"><ul class=\"entries\">");
    for (pid, c) in sorted_by_count(&stats.count_per_pid) {
        s.push_str(&format!("<li data-pid=\"{}\">{} <span class=\"proc\">({})</span>: <span class=\"count\">{}</span></li>", pid, pid, stats.process_of(pid), c));
    }
    s.push_str("</ul></div></div>");
    s.push_str(&format!("<div class=\"footer\">Generated by fstrace-report {}</div></div></body></html>", env!("CARGO_PKG_VERSION")));
    s
}

fn metric(anchor: &str, label: &str, value: usize) -> String {
    format!("<a class=\"card metric\" href=\"#{}\"><div class=\"label\">{}</div><div class=\"value\">{}</div></a>", anchor, label, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_event;
    use crate::parser::parse_log;
    use crate::stats::aggregate;

    fn stats_for(text: &str) -> Statistics {
        let decoded: Vec<_> = parse_log(text).events.into_iter().map(decode_event).collect();
        aggregate(&decoded)
    }

    #[test]
    fn summary_links_to_sections() {
        let html = render_html(&stats_for("p(1): W /a\n"), Theme::Dark);
        for id in ["paths", "write-paths", "pids"] {
            assert!(html.contains(&format!("href=\"#{}\"", id)));
            assert!(html.contains(&format!("id=\"{}\"", id)));
        }
    }

    #[test]
    fn entries_sorted_by_count_desc() {
        let html = render_html(&stats_for("p(1): R /low\np(1): R /high\np(2): R /high\n"), Theme::Light);
        let hi = html.find("<li>/high: ").unwrap();
        let lo = html.find("<li>/low: ").unwrap();
        assert!(hi < lo);
    }

    #[test]
    fn pid_entries_carry_attribute_and_process() {
        let html = render_html(&stats_for("myproc(123): CO /tmp/a.txt\n"), Theme::Dark);
        assert!(html.contains("<li data-pid=\"123\">123 <span class=\"proc\">(myproc)</span>: <span class=\"count\">1</span></li>"));
    }

    #[test]
    fn content_is_not_escaped() {
        let html = render_html(&stats_for("p(1): W /tmp/<b>x</b>\n"), Theme::Dark);
        assert!(html.contains("<li>/tmp/<b>x</b>: "));
    }

    #[test]
    fn rendering_is_deterministic() {
        let s = stats_for("a(1): O /x\nb(2): O /y\nc(3): W /z\n");
        assert_eq!(render_html(&s, Theme::Dark), render_html(&s, Theme::Dark));
    }
}
