//! Line format for task lists.
//!
//! Each task is one line:
//!
//! ```text
//! <id>[!] <start>-[<end>] "<name>"
//! ```
//!
//! `!` marks the active task and an empty `<end>` marks an open task. Inside
//! the quotes `\\`, `\"`, `\n` and `\r` are escaped. The parser also accepts
//! a line wrapped in `[` `]`, trailing whitespace and blank lines.

use crate::clock;
use crate::error::AppError;
use crate::model::{Task, TaskId, TaskList, Timestamp};
use std::collections::BTreeMap;
use std::fmt;

pub(crate) fn write_task(f: &mut impl fmt::Write, task: &Task) -> fmt::Result {
    write!(f, "{}", task.id)?;
    if task.is_active {
        f.write_char('!')?;
    }
    write!(f, " {}-", task.start)?;
    if let Some(end) = task.end {
        write!(f, "{end}")?;
    }
    f.write_str(" \"")?;
    for ch in task.name.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            other => f.write_char(other)?,
        }
    }
    f.write_char('"')
}

pub(crate) fn format_list(list: &TaskList) -> String {
    let mut out = String::new();
    for task in list.iter() {
        out.push_str(&task.to_string());
        out.push('\n');
    }
    out
}

pub(crate) fn parse_list(input: &str) -> Result<TaskList, AppError> {
    let mut tasks: BTreeMap<TaskId, Task> = BTreeMap::new();
    let mut active: Option<TaskId> = None;

    for (index, raw) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let task = parse_line(line, line_number)?;

        if tasks.contains_key(&task.id) {
            return Err(AppError::malformed(
                line_number,
                format!("duplicate task id {}", task.id),
            ));
        }

        if task.is_active {
            if let Some(previous) = active {
                return Err(AppError::malformed(
                    line_number,
                    format!("task {} is active but task {previous} already is", task.id),
                ));
            }
            active = Some(task.id);
        }

        tasks.insert(task.id, task);
    }

    TaskList::from_parts(tasks, active)
}

fn parse_line(line: &str, line_number: usize) -> Result<Task, AppError> {
    let mut scanner = Scanner {
        rest: line,
        line: line_number,
    };

    let bracketed = scanner.eat('[');
    let id = scanner.id()?;
    let is_active = scanner.eat('!');
    scanner.expect(' ')?;
    let start = scanner.timestamp("start time")?;
    scanner.expect('-')?;
    let end = if scanner.peek() == Some(' ') {
        None
    } else {
        Some(scanner.timestamp("end time")?)
    };
    scanner.expect(' ')?;
    let name = scanner.quoted()?;
    if bracketed {
        scanner.expect(']')?;
    }
    scanner.finish()?;

    Ok(Task {
        id,
        name,
        start,
        end,
        is_active,
    })
}

struct Scanner<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn error<M: Into<String>>(&self, reason: M) -> AppError {
        AppError::malformed(self.line, reason)
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        match self.rest.strip_prefix(expected) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), AppError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected:?} at {:?}", self.rest)))
        }
    }

    fn digits(&mut self) -> &'a str {
        let len = self
            .rest
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at(len);
        self.rest = rest;
        digits
    }

    fn id(&mut self) -> Result<TaskId, AppError> {
        let digits = self.digits();
        if digits.is_empty() {
            return Err(self.error("expected a task id"));
        }
        let id: TaskId = digits
            .parse()
            .map_err(|_| self.error(format!("task id {digits} is out of range")))?;
        if id == 0 {
            return Err(self.error("task id must be positive"));
        }
        Ok(id)
    }

    fn timestamp(&mut self, what: &str) -> Result<Timestamp, AppError> {
        let negative = self.eat('-');
        let digits = self.digits();
        if digits.is_empty() {
            return Err(self.error(format!("expected {what}")));
        }
        let literal = if negative {
            format!("-{digits}")
        } else {
            digits.to_string()
        };
        let timestamp: Timestamp = literal
            .parse()
            .map_err(|_| self.error(format!("{what} {literal} is out of range")))?;
        if !clock::is_representable(timestamp) {
            return Err(self.error(format!("{what} {literal} is out of range")));
        }
        Ok(timestamp)
    }

    fn quoted(&mut self) -> Result<String, AppError> {
        self.expect('"')?;
        let mut name = String::new();
        let rest = self.rest;
        let mut chars = rest.char_indices();

        loop {
            let Some((index, ch)) = chars.next() else {
                return Err(self.error("unterminated task name"));
            };
            match ch {
                '"' => {
                    self.rest = &rest[index + 1..];
                    break;
                }
                '\\' => match chars.next() {
                    Some((_, '\\')) => name.push('\\'),
                    Some((_, '"')) => name.push('"'),
                    Some((_, 'n')) => name.push('\n'),
                    Some((_, 'r')) => name.push('\r'),
                    Some((_, other)) => {
                        return Err(self.error(format!("unknown escape \\{other} in task name")));
                    }
                    None => return Err(self.error("unterminated task name")),
                },
                other => name.push(other),
            }
        }

        if name.trim().is_empty() {
            return Err(self.error("task name is empty"));
        }
        if name.trim() != name {
            return Err(self.error("task name has surrounding whitespace"));
        }
        Ok(name)
    }

    fn finish(&self) -> Result<(), AppError> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(self.error(format!("unexpected trailing text {:?}", self.rest)))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::TaskList;

    fn sample() -> (TaskList, u64, u64) {
        let mut list = TaskList::new();
        let first = list.create_at("Task 1", 1_700_000_000).unwrap().id();
        let second = list.create_at("Task 2", 1_700_000_100).unwrap().id();
        list.finish_at(second, 1_700_000_200).unwrap();
        list.activate(first).unwrap();
        (list, first, second)
    }

    #[test]
    fn formats_active_and_finished_lines() {
        let (list, _, _) = sample();

        assert_eq!(
            list.format(),
            "1! 1700000000- \"Task 1\"\n2 1700000100-1700000200 \"Task 2\"\n"
        );
    }

    #[test]
    fn parse_reconstructs_formatted_list() {
        let (list, first, second) = sample();

        let parsed = TaskList::parse(&list.format()).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get(first).unwrap(), list.get(first).unwrap());
        assert_eq!(parsed.get(second).unwrap(), list.get(second).unwrap());
        assert!(parsed.get(second).unwrap().end().is_some());
        assert!(parsed.get(first).unwrap().is_active());
        assert_eq!(parsed.active_id(), Some(first));
        assert_eq!(parsed, list);
    }

    #[test]
    fn round_trips_names_with_delimiters() {
        let mut list = TaskList::new();
        for name in [
            r#"quote " inside"#,
            r"back\slash",
            "two\nlines",
            "[bracketed] 12-34 \"x\"",
            "tab\tand\rreturn",
            "ünïcødé ✓",
        ] {
            list.create_at(name, 42).unwrap();
        }

        let parsed: TaskList = list.format().parse().unwrap();

        assert_eq!(parsed, list);
        assert_eq!(list.format().lines().count(), 6);
    }

    #[test]
    fn round_trips_negative_timestamps() {
        let mut list = TaskList::new();
        let id = list.create_at("old", -5).unwrap().id();
        list.finish_at(id, -3).unwrap();

        let text = list.format();
        assert_eq!(text, "1 -5--3 \"old\"\n");
        assert_eq!(TaskList::parse(&text).unwrap(), list);
    }

    #[test]
    fn empty_input_is_an_empty_list() {
        assert!(TaskList::parse("").unwrap().is_empty());
        assert!(TaskList::parse("\n  \n").unwrap().is_empty());
        assert_eq!(TaskList::new().format(), "");
    }

    #[test]
    fn tolerates_brackets_and_trailing_whitespace() {
        let parsed = TaskList::parse("[3! 10-20 \"a\"]  \r\n7 11- \"b\"\t\n").unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.active_id(), Some(3));
        assert_eq!(parsed.get(3).unwrap().end(), Some(20));
        assert_eq!(parsed.get(7).unwrap().end(), None);
    }

    #[test]
    fn parsed_list_continues_after_highest_id() {
        let mut parsed = TaskList::parse("2 10- \"a\"\n9 11- \"b\"\n").unwrap();

        assert_eq!(parsed.create_at("c", 12).unwrap().id(), 10);
    }

    #[test]
    fn rejects_two_active_markers() {
        let err = TaskList::parse("1! 10- \"a\"\n2! 11- \"b\"\n").unwrap_err();

        assert_eq!(err.code(), "malformed_input");
        assert!(err.message().contains("line 2"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = TaskList::parse("1 10- \"a\"\n1 11- \"b\"\n").unwrap_err();

        assert_eq!(err.code(), "malformed_input");
        assert!(err.message().contains("duplicate task id 1"));
    }

    #[test]
    fn rejects_lines_outside_the_grammar() {
        for line in [
            "hello",
            "0 10- \"zero id\"",
            "1 10 \"no dash\"",
            "1 10-x \"bad end\"",
            "1 -10- ",
            "1 10- \"unterminated",
            "1 10- \"bad \\t escape\"",
            "1 10- \"\"",
            "1 10- \"a\" extra",
            "[1 10- \"a\"",
            "1  10- \"double space\"",
            "99999999999999999999 10- \"huge\"",
            "1 10- \"   \"",
            "1 10- \" padded\"",
            "1 10- \"padded\\n\"",
        ] {
            let err = TaskList::parse(line).unwrap_err();
            assert_eq!(err.code(), "malformed_input", "accepted {line:?}");
        }
    }

    #[test]
    fn rejects_timestamps_beyond_the_calendar() {
        for line in [
            "1 300000000000- \"far future\"",
            "1 10-300000000000 \"far end\"",
            "1 -300000000000- \"far past\"",
        ] {
            let err = TaskList::parse(line).unwrap_err();
            assert_eq!(err.code(), "malformed_input", "accepted {line:?}");
            assert!(err.message().contains("out of range"));
        }
    }

    #[test]
    fn every_parsed_task_renders() {
        let text = "1! 253402300799- \"last second\"\n2 -377705116800-0 \"first day\"\n";
        let list = TaskList::parse(text).unwrap();

        for task in list.iter() {
            crate::render::human_line(task, time::UtcOffset::UTC).unwrap();
        }
    }

    #[test]
    fn reports_the_failing_line_number() {
        let err = TaskList::parse("1 10- \"a\"\n\n3 oops\n").unwrap_err();

        assert_eq!(
            err,
            crate::error::AppError::MalformedInput {
                line: 3,
                reason: "expected start time".to_string(),
            }
        );
    }
}
