//! A replayable position in a token slice.
//!
//! The cursor is `Copy`: taking a snapshot is copying it, and restoring after a failed
//! alternative is assigning the copy back. Nothing is ever rolled back by side effect.

use super::Token;

/// A position in a token slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor<'t> {
    tokens: &'t [Token],
    position: usize,
}

/// A saved cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Snapshot(usize);

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }

    /// Raw index of the next token, whitespace included.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.position)
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.position = snapshot.0;
    }

    /// This cursor moved past any whitespace.
    pub fn skip_whitespace(self) -> Self {
        let mut position = self.position;
        while matches!(self.tokens.get(position), Some(Token::Whitespace)) {
            position += 1;
        }
        Self { position, ..self }
    }

    /// The next significant token, without consuming it.
    pub fn peek(&self) -> Option<&'t Token> {
        let skipped = self.skip_whitespace();
        skipped.tokens.get(skipped.position)
    }

    /// The next token, whitespace included, without consuming it.
    pub fn peek_raw(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    /// Consume the next significant token.
    pub fn advance(&mut self) -> Option<&'t Token> {
        let skipped = self.skip_whitespace();
        let token = skipped.tokens.get(skipped.position)?;
        self.position = skipped.position + 1;
        Some(token)
    }

    /// Consume the next significant token, returning the cursor after it.
    pub fn next_token(self) -> Option<(&'t Token, Self)> {
        let mut cursor = self;
        let token = cursor.advance()?;
        Some((token, cursor))
    }

    /// Consume the next token, whitespace included.
    pub fn next_raw(self) -> Option<(&'t Token, Self)> {
        let token = self.tokens.get(self.position)?;
        Some((
            token,
            Self {
                position: self.position + 1,
                ..self
            },
        ))
    }

    /// Only whitespace (or nothing) remains.
    pub fn is_at_end(&self) -> bool {
        self.peek().is_none()
    }

    /// The raw token immediately before the cursor is whitespace.
    pub fn follows_whitespace(&self) -> bool {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .is_some_and(Token::is_whitespace)
    }

    /// Tokens between this cursor and a later one, with surrounding whitespace trimmed.
    pub fn slice_to(&self, end: &Cursor<'t>) -> &'t [Token] {
        let mut slice = &self.tokens[self.position.min(end.position)..end.position];
        while let Some((Token::Whitespace, rest)) = slice.split_first() {
            slice = rest;
        }
        while let Some((Token::Whitespace, rest)) = slice.split_last() {
            slice = rest;
        }
        slice
    }

    /// The last significant token before the cursor.
    pub fn previous_significant(&self) -> Option<&'t Token> {
        self.tokens[..self.position.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|token| !token.is_whitespace())
    }

    /// Whether the cursor stands where a comma-separated list may begin: at the start of
    /// the input, right after a function or open bracket, or right after a comma.
    pub fn opens_list(&self) -> bool {
        matches!(
            self.previous_significant(),
            None | Some(
                Token::Function(_)
                    | Token::OpenParen
                    | Token::OpenSquare
                    | Token::OpenCurly
                    | Token::Comma
            )
        )
    }

    /// Whether `other` stands at the same significant position: the two differ only by
    /// whitespace.
    pub fn same_significant_position(&self, other: &Cursor<'t>) -> bool {
        self.skip_whitespace().position == other.skip_whitespace().position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    #[test]
    fn test_advance_skips_whitespace() {
        let tokens = tokenize("a  b");
        let mut cursor = Cursor::new(&tokens);
        assert_eq!(cursor.advance(), Some(&Token::Ident("a".into())));
        assert_eq!(cursor.peek_raw(), Some(&Token::Whitespace));
        assert_eq!(cursor.advance(), Some(&Token::Ident("b".into())));
        assert!(cursor.is_at_end());
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn test_snapshot_restore() {
        let tokens = tokenize("a b c");
        let mut cursor = Cursor::new(&tokens);
        cursor.advance();
        let saved = cursor.snapshot();
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_at_end());
        cursor.restore(saved);
        assert_eq!(cursor.peek(), Some(&Token::Ident("b".into())));
    }

    #[test]
    fn test_follows_whitespace() {
        let tokens = tokenize("1 + 2");
        let (_, after_one) = Cursor::new(&tokens).next_token().unwrap();
        assert!(!after_one.follows_whitespace());
        let at_plus = after_one.skip_whitespace();
        assert!(at_plus.follows_whitespace());
    }

    #[test]
    fn test_opens_list() {
        let tokens = tokenize("a, f( b");
        let mut cursor = Cursor::new(&tokens);
        assert!(cursor.opens_list());
        cursor.advance();
        assert!(!cursor.opens_list());
        cursor.advance();
        assert!(cursor.opens_list());
        cursor.advance();
        assert!(cursor.opens_list());
        cursor.advance();
        assert!(!cursor.opens_list());
    }

    #[test]
    fn test_slice_trims_whitespace() {
        let tokens = tokenize(" a b ");
        let start = Cursor::new(&tokens);
        let mut end = start;
        end.advance();
        end.advance();
        let end = Cursor {
            position: tokens.len(),
            ..end
        };
        assert_eq!(
            start.slice_to(&end),
            &[
                Token::Ident("a".into()),
                Token::Whitespace,
                Token::Ident("b".into())
            ]
        );
    }
}
