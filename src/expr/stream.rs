use crate::expr::reader::ReadError;

#[derive(Debug)]
pub struct Stream<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Stream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    pub fn pop(&mut self) -> Option<char> {
        let char = self.peek()?;
        self.pos += char.len_utf8();
        Some(char)
    }

    /// Skips whitespace and `;` line comments.
    pub fn skip_ws(&mut self) {
        while let Some(char) = self.peek() {
            if char.is_whitespace() {
                self.pop();
            } else if char == ';' {
                while let Some(char) = self.pop() {
                    if char == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    pub fn expect_eof(&self) -> Result<(), ReadError> {
        if self.pos >= self.text.len() {
            Ok(())
        } else {
            Err(self.error("end of input"))
        }
    }

    pub fn take_while<F>(&mut self, pred: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(char) = self.peek()
            && pred(char)
        {
            self.pop();
        }
        &self.text[start..self.pos]
    }

    pub fn error(&self, expected: &'static str) -> ReadError {
        ReadError::new(self.pos, expected)
    }
}
