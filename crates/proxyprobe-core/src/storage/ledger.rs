//! Daily cost ledger: calendar day -> cumulative cents spent.
//!
//! The ledger is the one piece of shared mutated state in the pipeline. It is
//! an explicitly-owned object injected where needed, and every update is a
//! read-modify-write executed under the connection mutex so concurrent writers
//! cannot lose increments. A new day implicitly starts at zero.

use chrono::{Local, NaiveDate};
use rusqlite::{params, OptionalExtension};

use super::Store;

#[derive(Clone)]
pub struct CostLedger {
    store: Store,
}

impl CostLedger {
    /// Shares the store's connection; ledger rows live next to the evaluation
    /// records they account for.
    pub fn new(store: &Store) -> Self {
        Self {
            store: store.clone(),
        }
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn spent_today(&self) -> anyhow::Result<f64> {
        self.spent_on(Self::today())
    }

    pub fn spent_on(&self, day: NaiveDate) -> anyhow::Result<f64> {
        let conn = self.store.conn.lock().unwrap();
        let spent: Option<f64> = conn
            .query_row(
                "SELECT spent_cents FROM daily_costs WHERE day = ?1",
                params![day.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(spent.unwrap_or(0.0))
    }

    /// Adds cost to today's total and returns the new total.
    pub fn add_cost(&self, cents: f64) -> anyhow::Result<f64> {
        self.add_cost_on(Self::today(), cents)
    }

    pub fn add_cost_on(&self, day: NaiveDate, cents: f64) -> anyhow::Result<f64> {
        let conn = self.store.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO daily_costs (day, spent_cents) VALUES (?1, ?2)
             ON CONFLICT(day) DO UPDATE SET spent_cents = spent_cents + excluded.spent_cents",
            params![day.to_string(), cents],
        )?;
        let total: f64 = conn.query_row(
            "SELECT spent_cents FROM daily_costs WHERE day = ?1",
            params![day.to_string()],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}
