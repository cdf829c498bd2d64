use std::sync::OnceLock;
use regex::Regex;
use serde::Serialize;

// process(pid): FLAGS path, anchored at the end of the line
const LINE_PATTERN: &str = r"([\w:\[\]\-()]+)\((\d+)\): ([A-Z+<>]+) (.+)$";

static LINE_RE: OnceLock<Regex> = OnceLock::new();

fn line_re() -> &'static Regex {
    LINE_RE.get_or_init(|| Regex::new(LINE_PATTERN).expect("line pattern compiles"))
}

/// One trace record, only ever built by [`parse_line`] with every field non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub pid: String,
    pub process: String,
    pub path: String,
    pub raw_operation: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line does not match the trace pattern")]
    NoMatch,
    #[error("missing {field} in matched line (groups: {groups:?})")]
    MissingField { field: &'static str, groups: Vec<Option<String>> },
}

pub fn parse_line(line: &str) -> Result<Event, ParseError> {
    let caps = match line_re().captures(line) {
        Some(c) => c,
        None => { log::debug!("no match: {}", line); return Err(ParseError::NoMatch) }
    };
    let groups: Vec<Option<String>> = (1..=4).map(|i| caps.get(i).map(|m| m.as_str().to_string())).collect();
    let field = |i: usize, name: &'static str| -> Result<String, ParseError> {
        match groups[i - 1].as_deref() {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => {
                log::warn!("incomplete trace record {:?} from line: {}", groups, line);
                Err(ParseError::MissingField { field: name, groups: groups.clone() })
            }
        }
    };
    let process = field(1, "process")?;
    let pid = field(2, "pid")?;
    let raw_operation = field(3, "operation")?;
    let path = field(4, "path")?;
    Ok(Event { pid, process, path, raw_operation })
}

/// Parsed events of one log plus the counters printed in the final summary.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ParseOutcome {
    pub events: Vec<Event>,
    pub parsed: usize,
    pub errors: usize,
    pub total_lines: usize,
}

impl ParseOutcome {
    pub fn record(&mut self, res: Result<Event, ParseError>) {
        self.total_lines += 1;
        match res {
            Ok(ev) => { self.parsed += 1; self.events.push(ev) }
            Err(_) => self.errors += 1,
        }
    }
}

/// Blank lines are skipped before parsing and are not counted.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|l| !l.is_empty())
}

pub fn parse_log(text: &str) -> ParseOutcome {
    let mut out = ParseOutcome::default();
    for line in non_empty_lines(text) { out.record(parse_line(line)); }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fields_after_prefix() {
        let ev = parse_line("foo bar myproc(123): CO /tmp/a.txt").unwrap();
        assert_eq!(ev.pid, "123");
        assert_eq!(ev.process, "myproc");
        assert_eq!(ev.raw_operation, "CO");
        assert_eq!(ev.path, "/tmp/a.txt");
    }

    #[test]
    fn path_keeps_spaces() {
        let ev = parse_line("12:00:01 Finder(77): R /Users/me/My Documents/a b.txt").unwrap();
        assert_eq!(ev.process, "Finder");
        assert_eq!(ev.path, "/Users/me/My Documents/a b.txt");
    }

    #[test]
    fn process_name_allows_brackets_and_colons() {
        let ev = parse_line("kworker:[u8]-x_y(4242): W+ /var/log/syslog").unwrap();
        assert_eq!(ev.process, "kworker:[u8]-x_y");
        assert_eq!(ev.pid, "4242");
        assert_eq!(ev.raw_operation, "W+");
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line("nothing to see here"), Err(ParseError::NoMatch));
        assert_eq!(parse_line("proc(abc): O /tmp/x"), Err(ParseError::NoMatch));
        assert_eq!(parse_line("proc(1): o /tmp/x"), Err(ParseError::NoMatch));
        assert_eq!(parse_line("proc(1): O "), Err(ParseError::NoMatch));
    }

    #[test]
    fn parse_log_counts_errors_and_skips_blank_lines() {
        let text = "a(1): W /a\n\nbroken line\r\nb(2): R /a\n";
        let out = parse_log(text);
        assert_eq!(out.parsed, 2);
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.errors, 1);
        assert_eq!(out.total_lines, 3);
    }

    #[test]
    fn repeated_matches_are_independent() {
        let a = parse_line("p(1): O /one").unwrap();
        let b = parse_line("q(2): C /two").unwrap();
        assert_eq!(a.path, "/one");
        assert_eq!(b.path, "/two");
    }
}
