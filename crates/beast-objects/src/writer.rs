// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Simple line-based writer for XML with two-space indentation.

use crate::escape::escape_attribute;

/// Tracks indentation and handles line-based output.
pub struct XmlWriter {
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    /// Write a string, handling indentation at line starts.
    pub fn write(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                self.out.push('\n');
                self.at_line_start = true;
            } else {
                if self.at_line_start {
                    for _ in 0..self.indent {
                        self.out.push_str("  ");
                    }
                }
                self.at_line_start = false;
                self.out.push(c);
            }
        }
    }

    /// Write a complete line (adds newline at end).
    pub fn line(&mut self, s: &str) {
        self.write(s);
        self.write("\n");
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write `<name a="..." b="..."` without closing the tag.
    pub fn open_tag<'a>(&mut self, name: &str, attributes: impl IntoIterator<Item = (&'a str, &'a str)>) {
        self.write("<");
        self.write(name);
        for (key, value) in attributes {
            self.write(" ");
            self.write(key);
            self.write("=\"");
            self.write(&escape_attribute(value));
            self.write("\"");
        }
    }

    pub fn close_tag(&mut self, name: &str) {
        self.line(&format!("</{}>", name));
    }

    pub fn into_inner(self) -> String {
        self.out
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}
