use indicatif::{ProgressBar, ProgressStyle};

/// Receives one call per processed file, in processing order.
pub trait ProgressSink {
    fn on_file(&mut self, current: usize, total: usize, filename: &str);

    fn finish(&mut self) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize, &str),
{
    fn on_file(&mut self, current: usize, total: usize, filename: &str) {
        self(current, total, filename)
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_file(&mut self, _current: usize, _total: usize, _filename: &str) {}
}

const NAME_WIDTH: usize = 30;

/// Terminal progress bar, created on the first file so its length is known.
pub struct BarProgress {
    label: &'static str,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new(label: &'static str) -> Self {
        Self { label, bar: None }
    }
}

impl ProgressSink for BarProgress {
    fn on_file(&mut self, current: usize, total: usize, filename: &str) {
        let label = self.label;
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{prefix} |{bar:40}| {percent:>3}% ({pos}/{len}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█░"),
            );
            bar.set_prefix(label);
            bar
        });
        bar.set_position(current as u64);
        bar.set_message(truncate_name(filename, NAME_WIDTH));
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Keep the tail of long names: `...` plus the last `max_width - 3` characters.
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let len = name.chars().count();
    if len <= max_width {
        return name.to_string();
    }
    let keep = max_width.saturating_sub(3);
    let tail: String = name.chars().skip(len - keep).collect();
    format!("...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_kept() {
        assert_eq!(truncate_name("a.txt", 30), "a.txt");
    }

    #[test]
    fn long_names_keep_the_tail() {
        let name = "a_really_long_file_name_that_goes_on_and_on.md";
        let out = truncate_name(name, 30);
        assert_eq!(out.chars().count(), 30);
        assert!(out.starts_with("..."));
        assert!(out.ends_with("_on_and_on.md"));
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |c: usize, t: usize, f: &str| seen.push((c, t, f.to_string()));
            sink.on_file(1, 2, "x.md");
            sink.on_file(2, 2, "y.md");
            sink.finish();
        }
        assert_eq!(seen, vec![(1, 2, "x.md".to_string()), (2, 2, "y.md".to_string())]);
    }
}
