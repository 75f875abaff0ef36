// OData lexer - tokenizes query option values

use super::errors::{GrammarError, GrammarResult};
use super::token::Token;

/// A token together with the byte offset it starts at
pub type Spanned = (Token, usize);

pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().collect(),
            position: 0,
        }
    }

    /// Tokenize the whole input. The last token is always `Token::Eof`.
    pub fn tokenize(mut self) -> GrammarResult<Vec<Spanned>> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.0 == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> GrammarResult<Spanned> {
        self.skip_whitespace();

        let (offset, c) = match self.current() {
            Some(current) => current,
            None => return Ok((Token::Eof, self.input.len())),
        };

        let token = match c {
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '*' => {
                self.advance();
                Token::Star
            }
            '-' => {
                self.advance();
                Token::Minus
            }
            '\'' => self.read_string(offset)?,
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            ch => {
                return Err(GrammarError::UnexpectedChar {
                    ch,
                    position: offset,
                })
            }
        };

        Ok((token, offset))
    }

    fn current(&self) -> Option<(usize, char)> {
        self.chars.get(self.position).copied()
    }

    fn current_char(&self) -> Option<char> {
        self.current().map(|(_, c)| c)
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.position + 1).map(|(_, c)| *c)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn offset(&self) -> usize {
        self.current()
            .map(|(offset, _)| offset)
            .unwrap_or(self.input.len())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Identifiers may contain '/' to form navigation paths (`Address/City`)
    fn read_identifier(&mut self) -> Token {
        let start = self.offset();
        while matches!(self.current_char(), Some(c) if c.is_alphanumeric() || c == '_' || c == '/')
        {
            self.advance();
        }
        let word = &self.input[start..self.offset()];
        Token::keyword(word).unwrap_or_else(|| Token::Identifier(word.to_string()))
    }

    fn read_number(&mut self) -> Token {
        let start = self.offset();
        self.consume_digits();

        if self.current_char() == Some('.') && matches!(self.peek_char(), Some(c) if c.is_ascii_digit())
        {
            self.advance();
            self.consume_digits();
        }

        if matches!(self.current_char(), Some('e') | Some('E')) {
            let signed = matches!(self.peek_char(), Some('+') | Some('-'));
            let digit_at = if signed { 2 } else { 1 };
            let has_digit = self
                .chars
                .get(self.position + digit_at)
                .map(|(_, c)| c.is_ascii_digit())
                .unwrap_or(false);
            if has_digit {
                self.position += digit_at;
                self.consume_digits();
            }
        }

        Token::Number(self.input[start..self.offset()].to_string())
    }

    fn consume_digits(&mut self) {
        while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Single-quoted string; a doubled quote is an escaped quote
    fn read_string(&mut self, start: usize) -> GrammarResult<Token> {
        self.advance();
        let mut value = String::new();

        loop {
            match self.current_char() {
                None => return Err(GrammarError::UnterminatedString(start)),
                Some('\'') => {
                    self.advance();
                    if self.current_char() == Some('\'') {
                        value.push('\'');
                        self.advance();
                    } else {
                        return Ok(Token::String(value));
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn test_comparison_tokens() {
        assert_eq!(
            tokens("age gt 10 and name eq 'Bob'"),
            vec![
                Token::Identifier("age".into()),
                Token::Gt,
                Token::Number("10".into()),
                Token::And,
                Token::Identifier("name".into()),
                Token::Eq,
                Token::String("Bob".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("1.5 2e3 7E-2 42"),
            vec![
                Token::Number("1.5".into()),
                Token::Number("2e3".into()),
                Token::Number("7E-2".into()),
                Token::Number("42".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(
            tokens("'O''Brien'"),
            vec![Token::String("O'Brien".into()), Token::Eof]
        );
    }

    #[test]
    fn test_paths_and_punctuation() {
        assert_eq!(
            tokens("(Address/City,*)"),
            vec![
                Token::LeftParen,
                Token::Identifier("Address/City".into()),
                Token::Comma,
                Token::Star,
                Token::RightParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let spanned = Lexer::new("a  eq 1").tokenize().unwrap();
        let offsets: Vec<usize> = spanned.iter().map(|(_, offset)| *offset).collect();
        assert_eq!(offsets, vec![0, 3, 6, 7]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("name eq 'Bob").tokenize().unwrap_err();
        assert_eq!(err, GrammarError::UnterminatedString(8));
    }

    #[test]
    fn test_unexpected_char() {
        let err = Lexer::new("age > 10").tokenize().unwrap_err();
        assert_eq!(
            err,
            GrammarError::UnexpectedChar {
                ch: '>',
                position: 4
            }
        );
    }
}
