//! Query executor
//!
//! Applies parsed commands in order to a fresh table. Loading commands
//! (`from`, `join`) pull their data through a [`Source`].

use tracing::debug;

use crate::error::Result;
use crate::query::Command;
use crate::storage::Source;
use crate::table::{JoinStrategy, Table};

/// Execution engine over a data source
pub struct Executor<'a> {
    source: &'a mut dyn Source,
    join_strategy: JoinStrategy,
}

impl<'a> Executor<'a> {
    pub fn new(source: &'a mut dyn Source) -> Self {
        Self {
            source,
            join_strategy: JoinStrategy::default(),
        }
    }

    /// Set the algorithm used by `join`
    pub fn join_strategy(mut self, strategy: JoinStrategy) -> Self {
        self.join_strategy = strategy;
        self
    }

    /// Run a command list against an empty table
    pub fn run(&mut self, commands: &[Command]) -> Result<Table> {
        let mut table = Table::new();
        for command in commands {
            self.execute(&mut table, command)?;
        }
        Ok(table)
    }

    /// Apply one command to `table`
    pub fn execute(&mut self, table: &mut Table, command: &Command) -> Result<()> {
        debug!(command = %command, "executing");

        match command {
            Command::From(path) => table.load(self.source, path)?,
            Command::Select(columns) => table.select(columns),
            Command::Take(limit) => table.take(*limit),
            Command::OrderBy(column) => table.order_by(column),
            Command::Join { path, column } => {
                table.join(self.source, path, column, self.join_strategy)?
            }
            Command::CountBy(column) => table.count_by(column),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::query::parse;
    use crate::table::Cell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemorySource {
        files: HashMap<String, String>,
        requests: Vec<String>,
    }

    impl MemorySource {
        fn with(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                requests: Vec::new(),
            }
        }
    }

    impl Source for MemorySource {
        fn fetch(&mut self, id: &str) -> Result<String> {
            self.requests.push(id.to_string());
            Ok(self.files.get(id).cloned().unwrap_or_default())
        }
    }

    struct DeadSource;

    impl Source for DeadSource {
        fn fetch(&mut self, _id: &str) -> Result<String> {
            Err(Error::ConnectionClosed)
        }
    }

    const ORDERS: &str = "orderid,customerid,employerid\n1,2,3\n2,2,1\n3,1,2\n";
    const CUSTOMERS: &str = "customerid,customername,contactname\n1,Alice,Bob\n2,Carol,Dave\n";

    fn run(source: &mut MemorySource, query: &str) -> Table {
        Executor::new(source).run(&parse(query)).unwrap()
    }

    #[test]
    fn test_empty_query() {
        let mut source = MemorySource::default();
        let table = run(&mut source, "");
        assert!(table.columns().is_empty());
        assert!(source.requests.is_empty());
    }

    #[test]
    fn test_from_select_take() {
        let mut source = MemorySource::with(&[("orders.csv", ORDERS)]);
        let table = run(&mut source, "from orders.csv select orderid take 2");

        assert_eq!(table.columns(), &["orderid".to_string()]);
        assert_eq!(table.rows(), &[vec![Cell::from(1)], vec![Cell::from(2)]]);
    }

    #[test]
    fn test_join_then_countby() {
        let mut source = MemorySource::with(&[("orders.csv", ORDERS), ("customers.csv", CUSTOMERS)]);
        let table = run(
            &mut source,
            "from orders.csv join customers.csv customerid countby customername",
        );

        assert_eq!(
            table.columns(),
            &["customername".to_string(), "count".to_string()]
        );
        assert!(table.rows().contains(&vec![Cell::from("Carol"), Cell::from(2)]));
        assert!(table.rows().contains(&vec![Cell::from("Alice"), Cell::from(1)]));
        assert_eq!(source.requests, vec!["orders.csv", "customers.csv"]);
    }

    #[test]
    fn test_strategies_agree() {
        let query = "from orders.csv join customers.csv customerid";
        let mut a = MemorySource::with(&[("orders.csv", ORDERS), ("customers.csv", CUSTOMERS)]);
        let mut b = MemorySource::with(&[("orders.csv", ORDERS), ("customers.csv", CUSTOMERS)]);

        let mut hashed = Executor::new(&mut a)
            .join_strategy(JoinStrategy::Hash)
            .run(&parse(query))
            .unwrap();
        let mut merged = Executor::new(&mut b)
            .join_strategy(JoinStrategy::SortMerge)
            .run(&parse(query))
            .unwrap();

        assert_eq!(hashed.columns(), merged.columns());
        hashed.order_by("orderid");
        merged.order_by("orderid");
        assert_eq!(hashed.rows(), merged.rows());
    }

    #[test]
    fn test_invalid_query_does_nothing() {
        let mut source = MemorySource::with(&[("orders.csv", ORDERS)]);
        let table = run(&mut source, "from orders.csv take");
        assert!(table.rows().is_empty());
        assert!(source.requests.is_empty());
    }

    #[test]
    fn test_transport_failure_aborts() {
        let mut source = DeadSource;
        let result = Executor::new(&mut source).run(&parse("from a.csv"));
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }
}
