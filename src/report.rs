use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use wordcount_core::AuthorTally;

/// Rows echoed to the terminal; the file always gets all of them.
pub const TERMINAL_ROWS: usize = 10;

pub fn report_file_name(display_name: &str) -> String {
    format!("{}_word_count.txt", display_name)
}

/// Ranked result table for one search.
#[derive(Debug, Clone)]
pub struct Report {
    needle: String,
    generated_at: DateTime<Local>,
    rows: Vec<(String, u64)>,
    user_width: usize,
    count_width: usize,
}

impl Report {
    pub fn new(needle: &str, tally: &AuthorTally, generated_at: DateTime<Local>) -> Self {
        let rows = tally.ranked();
        // "+ 2" leaves room for the "u/" prefix.
        let user_width = rows
            .iter()
            .map(|(user, _)| user.chars().count() + 2)
            .max()
            .unwrap_or(0);
        let count_width = rows
            .iter()
            .map(|(_, count)| count.to_string().len())
            .max()
            .unwrap_or(0);

        Self {
            needle: needle.to_string(),
            generated_at,
            rows,
            user_width,
            count_width,
        }
    }

    pub fn titles(&self) -> String {
        format!(
            "{:<uw$}\t{:>cw$}",
            "User",
            "Count",
            uw = self.user_width,
            cw = self.count_width
        )
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|(user, count)| {
                format!(
                    "{:<uw$}\t{:>cw$}",
                    format!("u/{}", user),
                    count,
                    uw = self.user_width,
                    cw = self.count_width
                )
            })
            .collect()
    }

    pub fn footer(&self) -> String {
        "-".repeat(self.user_width + self.count_width + 4)
    }

    /// The block appended to the report file.
    pub fn render_file_section(&self) -> String {
        let mut out = format!(
            "'{}' count on {}\n\n{}\n",
            self.needle,
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            self.titles()
        );
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("\n{}\n\n", self.footer()));
        out
    }

    pub fn render_terminal(&self) -> String {
        let mut out = format!("\n{}\n", self.titles());
        for line in self.lines().into_iter().take(TERMINAL_ROWS) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("{}\n\n", self.footer()));
        out
    }

    pub fn append_to(&self, path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.render_file_section().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
    }

    fn sample_tally() -> AuthorTally {
        vec![
            ("alice".to_string(), 3),
            ("bo".to_string(), 12),
            ("carol".to_string(), 3),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(report_file_name("rust"), "rust_word_count.txt");
    }

    #[test]
    fn test_columns_are_aligned() {
        let report = Report::new("cat", &sample_tally(), fixed_time());

        assert_eq!(report.titles(), "User   \tCount");
        assert_eq!(
            report.lines(),
            vec!["u/bo   \t12", "u/alice\t 3", "u/carol\t 3"]
        );
        assert_eq!(report.footer(), "-".repeat(7 + 2 + 4));
    }

    #[test]
    fn test_file_section_layout() {
        let report = Report::new("cat", &sample_tally(), fixed_time());
        let section = report.render_file_section();

        assert!(section.starts_with("'cat' count on 2024-03-01 12:30:05\n\nUser   \tCount\n"));
        assert!(section.contains("u/alice\t 3\n"));
        assert!(section.ends_with("\n-------------\n\n"));
    }

    #[test]
    fn test_terminal_shows_top_rows_only() {
        let tally: AuthorTally = (0..15)
            .map(|i| (format!("user{:02}", i), 20 - i as u64))
            .collect();
        let report = Report::new("cat", &tally, fixed_time());

        let rendered = report.render_terminal();
        assert!(rendered.contains("u/user09"));
        assert!(!rendered.contains("u/user10"));
        assert_eq!(report.lines().len(), 15);
    }

    #[test]
    fn test_empty_tally() {
        let report = Report::new("cat", &AuthorTally::new(), fixed_time());
        assert_eq!(report.titles(), "User\tCount");
        assert!(report.lines().is_empty());
        assert_eq!(report.footer(), "----");
        assert_eq!(report.render_terminal(), "\nUser\tCount\n----\n\n");
    }

    #[test]
    fn test_append_keeps_previous_searches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(report_file_name("rust"));
        let report = Report::new("cat", &sample_tally(), fixed_time());

        report.append_to(&path).unwrap();
        report.append_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("'cat' count on").count(), 2);
    }
}
