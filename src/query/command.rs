//! Query commands
//!
//! A query is an ordered sequence of commands applied left to right to a
//! single table. Each command carries its typed arguments.

use std::fmt;

/// Whitelisted operation keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    From,
    Select,
    Take,
    OrderBy,
    Join,
    CountBy,
}

impl Keyword {
    /// Match a keyword, ignoring case
    pub fn from_token(token: &str) -> Option<Keyword> {
        match token.to_lowercase().as_str() {
            "from" => Some(Keyword::From),
            "select" => Some(Keyword::Select),
            "take" => Some(Keyword::Take),
            "orderby" => Some(Keyword::OrderBy),
            "join" => Some(Keyword::Join),
            "countby" => Some(Keyword::CountBy),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Keyword::From => "from",
            Keyword::Select => "select",
            Keyword::Take => "take",
            Keyword::OrderBy => "orderby",
            Keyword::Join => "join",
            Keyword::CountBy => "countby",
        };
        write!(f, "{}", name)
    }
}

/// A parsed query command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `from <path>`: load a table
    From(String),
    /// `select <c1[,c2,...]>`: project columns
    Select(Vec<String>),
    /// `take <n>`: keep the first n rows
    Take(i64),
    /// `orderby <col>`: sort numerically descending
    OrderBy(String),
    /// `join <path> <col>`: equi-join with another table
    Join { path: String, column: String },
    /// `countby <col>`: count rows per distinct value
    CountBy(String),
}

impl Command {
    pub fn keyword(&self) -> Keyword {
        match self {
            Command::From(_) => Keyword::From,
            Command::Select(_) => Keyword::Select,
            Command::Take(_) => Keyword::Take,
            Command::OrderBy(_) => Keyword::OrderBy,
            Command::Join { .. } => Keyword::Join,
            Command::CountBy(_) => Keyword::CountBy,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.keyword())?;
        match self {
            Command::From(path) => write!(f, "{}", path),
            Command::Select(columns) => write!(f, "{}", columns.join(",")),
            Command::Take(limit) => write!(f, "{}", limit),
            Command::OrderBy(column) | Command::CountBy(column) => write!(f, "{}", column),
            Command::Join { path, column } => write!(f, "{} {}", path, column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(Keyword::from_token("FrOm"), Some(Keyword::From));
        assert_eq!(Keyword::from_token("ORDERBY"), Some(Keyword::OrderBy));
        assert_eq!(Keyword::from_token("order"), None);
    }

    #[test]
    fn test_command_display() {
        let join = Command::Join {
            path: "b.csv".to_string(),
            column: "id".to_string(),
        };
        assert_eq!(join.to_string(), "join b.csv id");
        assert_eq!(
            Command::Select(vec!["a".to_string(), "b".to_string()]).to_string(),
            "select a,b"
        );
        assert_eq!(Command::Take(-3).to_string(), "take -3");
    }
}
