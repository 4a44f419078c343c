//! Query Parser
//!
//! This module turns a raw query line into an ordered command sequence.
//! Parsing never fails: an unknown keyword or a missing argument anywhere in
//! the line discards every command parsed so far.

use super::command::{Command, Keyword};

/// Query Parser
pub struct Parser<'a> {
    tokens: Vec<&'a str>,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser over whitespace separated tokens
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace().collect(),
            position: 0,
        }
    }

    /// Parse the whole line, all or nothing
    pub fn parse(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();

        while !self.is_at_end() {
            match self.parse_command() {
                Some(command) => commands.push(command),
                None => return Vec::new(),
            }
        }

        commands
    }

    fn parse_command(&mut self) -> Option<Command> {
        let keyword = Keyword::from_token(self.advance()?)?;

        let command = match keyword {
            Keyword::From => Command::From(self.expect_argument()?.to_string()),
            Keyword::Select => Command::Select(split_columns(self.expect_argument()?)),
            Keyword::Take => Command::Take(leading_integer(self.expect_argument()?)),
            Keyword::OrderBy => Command::OrderBy(self.expect_argument()?.to_string()),
            Keyword::Join => Command::Join {
                path: self.expect_argument()?.to_string(),
                column: self.expect_argument()?.to_string(),
            },
            Keyword::CountBy => Command::CountBy(self.expect_argument()?.to_string()),
        };

        Some(command)
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect_argument(&mut self) -> Option<&'a str> {
        self.advance()
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

/// Parse a query line into commands; invalid input yields no commands
pub fn parse(input: &str) -> Vec<Command> {
    Parser::new(input).parse()
}

/// Split a `select` argument on commas, dropping trailing empty names
fn split_columns(token: &str) -> Vec<String> {
    let mut columns: Vec<String> = token.split(',').map(str::to_string).collect();
    while columns.last().is_some_and(|c| c.is_empty()) {
        columns.pop();
    }
    columns
}

/// Integer prefix of a token, `0` when there is none.
///
/// `"12abc"` reads as 12 and `"foo"` as 0; out-of-range values saturate.
fn leading_integer(token: &str) -> i64 {
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        value = value
            .saturating_mul(10)
            .saturating_add(if negative { -digit } else { digit });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(path: &str) -> Command {
        Command::From(path.to_string())
    }

    fn join(path: &str, column: &str) -> Command {
        Command::Join {
            path: path.to_string(),
            column: column.to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \t ").is_empty());
    }

    #[test]
    fn test_invalid_command() {
        assert!(parse("foo bar boo").is_empty());
    }

    #[test]
    fn test_from() {
        assert_eq!(parse(" from  name "), vec![from("name")]);
        assert_eq!(parse("FrOm Name"), vec![from("Name")]);
        assert_eq!(parse("FROM a"), parse("from a"));
        assert!(parse("from").is_empty());
    }

    #[test]
    fn test_select() {
        assert_eq!(parse(" select  name "), vec![Command::Select(vec!["name".to_string()])]);
        assert_eq!(
            parse("select name1,name2"),
            vec![Command::Select(vec!["name1".to_string(), "name2".to_string()])]
        );
        assert_eq!(parse("SeLeCt Name"), vec![Command::Select(vec!["Name".to_string()])]);
        assert!(parse("select").is_empty());
    }

    #[test]
    fn test_select_comma_edges() {
        assert_eq!(
            parse("select a,,b,"),
            vec![Command::Select(vec!["a".to_string(), String::new(), "b".to_string()])]
        );
        assert_eq!(parse("select ,"), vec![Command::Select(vec![])]);
    }

    #[test]
    fn test_take() {
        assert_eq!(parse(" take  55 "), vec![Command::Take(55)]);
        assert_eq!(parse("TaKe 12"), vec![Command::Take(12)]);
        assert_eq!(parse("take foo"), vec![Command::Take(0)]);
        assert_eq!(parse("take -5"), vec![Command::Take(-5)]);
        assert_eq!(parse("take 7rows"), vec![Command::Take(7)]);
        assert_eq!(parse("take 99999999999999999999"), vec![Command::Take(i64::MAX)]);
        assert!(parse("take").is_empty());
    }

    #[test]
    fn test_orderby() {
        assert_eq!(parse(" orderby name "), vec![Command::OrderBy("name".to_string())]);
        assert_eq!(parse("Orderby Name"), vec![Command::OrderBy("Name".to_string())]);
        assert!(parse("orderby").is_empty());
    }

    #[test]
    fn test_join() {
        assert_eq!(parse(" join foo bar"), vec![join("foo", "bar")]);
        assert_eq!(parse("Join Foo baR"), vec![join("Foo", "baR")]);
        assert!(parse("join").is_empty());
        assert!(parse("join foo").is_empty());
    }

    #[test]
    fn test_countby() {
        assert_eq!(parse(" countby name "), vec![Command::CountBy("name".to_string())]);
        assert_eq!(parse("Countby Name"), vec![Command::CountBy("Name".to_string())]);
        assert!(parse("countby").is_empty());
    }

    #[test]
    fn test_multiple_commands() {
        assert_eq!(
            parse("  froM foo joiN bar boo"),
            vec![from("foo"), join("bar", "boo")]
        );
        assert_eq!(
            parse("from a select x,y take 2 orderby x countby y"),
            vec![
                from("a"),
                Command::Select(vec!["x".to_string(), "y".to_string()]),
                Command::Take(2),
                Command::OrderBy("x".to_string()),
                Command::CountBy("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_trailing_malformed_command_discards_all() {
        assert!(parse(" from foo join bar foo take").is_empty());
        assert!(parse("from a join b").is_empty());
        assert!(parse("from a take 1 bogus x").is_empty());
    }

    #[test]
    fn test_keyword_as_argument() {
        assert_eq!(parse("from take"), vec![from("take")]);
        assert_eq!(parse("orderby from"), vec![Command::OrderBy("from".to_string())]);
    }
}
