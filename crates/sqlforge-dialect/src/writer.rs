//! Token-level SQL text builder
//!
//! Keeps spacing consistent: tokens are separated by one space, except
//! directly after an opening parenthesis, before a closing one, and between a
//! function name and its argument list.

#[derive(Debug, Default)]
pub struct SqlWriter {
    buf: String,
    needs_space: bool,
}

/// Marker returned when a bracketed frame is opened.
#[must_use]
#[derive(Debug)]
pub struct Frame {
    close: &'static str,
}

impl SqlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn space(&mut self) {
        if self.needs_space {
            self.buf.push(' ');
        }
    }

    /// Writes a keyword, operator symbol or any other bare token.
    pub fn keyword(&mut self, token: &str) {
        self.space();
        self.buf.push_str(token);
        self.needs_space = true;
    }

    pub fn literal(&mut self, text: &str) {
        self.keyword(text);
    }

    pub fn identifier(&mut self, text: &str) {
        self.keyword(text);
    }

    /// `,` between list items.
    pub fn sep(&mut self) {
        self.buf.push(',');
        self.needs_space = true;
    }

    pub fn start_fun_call(&mut self, name: &str) -> Frame {
        self.space();
        self.buf.push_str(name);
        self.buf.push('(');
        self.needs_space = false;
        Frame { close: ")" }
    }

    pub fn start_parens(&mut self) -> Frame {
        self.space();
        self.buf.push('(');
        self.needs_space = false;
        Frame { close: ")" }
    }

    pub fn end(&mut self, frame: Frame) {
        self.buf.push_str(frame.close);
        self.needs_space = true;
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
