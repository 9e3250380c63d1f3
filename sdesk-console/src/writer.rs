use std::io;

use console::Term;

const MAX_LINE_WIDTH: usize = 150;

/// Right-align `prefix` inside a column of `prefix_len` cells, followed by one space.
pub fn gen_prefix(prefix: &str, prefix_len: u16) -> String {
    let width = console::measure_text_width(prefix);
    let column = (prefix_len as usize).saturating_sub(1);

    let mut real_prefix = " ".repeat(column.saturating_sub(width));
    real_prefix.push_str(prefix);
    real_prefix.push(' ');
    real_prefix
}

/// Split `msg` into lines no wider than `max_len` display cells.
///
/// Embedded newlines are kept as line breaks. Words longer than `max_len`
/// are hard-split.
pub fn wrap_lines(msg: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut res = vec![];

    for paragraph in msg.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split(' ') {
            let word_width = console::measure_text_width(word);
            let needed = if line.is_empty() { word_width } else { word_width + 1 };

            if line_width + needed > max_len && !line.is_empty() {
                res.push(std::mem::take(&mut line));
                line_width = 0;
            }

            if word_width > max_len {
                let mut chunk = String::new();
                let mut chunk_width = 0;
                for c in word.chars() {
                    let w = console::measure_text_width(c.encode_utf8(&mut [0; 4]));
                    if chunk_width + w > max_len {
                        res.push(std::mem::take(&mut chunk));
                        chunk_width = 0;
                    }
                    chunk.push(c);
                    chunk_width += w;
                }
                line = chunk;
                line_width = chunk_width;
                continue;
            }

            if !line.is_empty() {
                line.push(' ');
                line_width += 1;
            }

            line.push_str(word);
            line_width += word_width;
        }

        res.push(line);
    }

    res
}

pub struct Writer {
    term: Term,
    prefix_len: u16,
}

impl Default for Writer {
    fn default() -> Self {
        Writer {
            term: Term::stderr(),
            prefix_len: 10,
        }
    }
}

impl Writer {
    pub fn show_cursor(&self) -> io::Result<()> {
        self.term.show_cursor()
    }

    /// Width left for the message after the prefix column
    pub fn get_max_len(&self) -> u16 {
        let (_, cols) = self.term.size_checked().unwrap_or((25, 80));
        let len = cols.saturating_sub(self.prefix_len);

        len.min(MAX_LINE_WIDTH as u16)
    }

    fn write_prefix(&self, prefix: &str) -> io::Result<()> {
        self.term.write_str(&gen_prefix(prefix, self.prefix_len))
    }

    /// Write `msg` after `prefix`; continuation lines get an empty prefix column.
    pub fn writeln(&self, prefix: &str, msg: &str) -> io::Result<()> {
        let lines = wrap_lines(msg, self.get_max_len().into());

        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                self.write_prefix(prefix)?;
            } else {
                self.write_prefix("")?;
            }
            self.term.write_line(line)?;
        }

        Ok(())
    }
}
