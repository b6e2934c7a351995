//! SQLite-backed evaluation record store and cost ledger.
//!
//! Records are append-only: a forced re-evaluation inserts a new row for the
//! same fingerprint and readers always see the latest version, so the audit
//! trail of superseded judgments survives. Each row carries the full record as
//! JSON; indexed columns exist only for lookup. Unknown fields in stored JSON
//! are ignored on load, which keeps old stores readable after the record type
//! grows.

pub mod ledger;
pub mod schema;

pub use ledger::CostLedger;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{Evaluation, SubjectKind};

#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(schema::DDL)?;
        Ok(())
    }

    /// Latest record for a fingerprint, or None on a cache miss.
    pub fn get(&self, fingerprint: &str) -> anyhow::Result<Option<Evaluation>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<String> = conn
            .query_row(
                "SELECT record_json FROM evaluations
                 WHERE fingerprint = ?1 ORDER BY id DESC LIMIT 1",
                params![fingerprint],
                |row| row.get(0),
            )
            .optional()?;
        row.map(|json| decode(&json)).transpose()
    }

    /// Appends a record. Same-fingerprint writes race only under force;
    /// the later insert wins for readers.
    pub fn put(&self, evaluation: &Evaluation) -> anyhow::Result<()> {
        let json = serde_json::to_string(evaluation).context("failed to encode evaluation")?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO evaluations
               (fingerprint, subject_id, subject_kind, model, prompt_version, record_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                evaluation.fingerprint,
                evaluation.subject_id,
                evaluation.subject_kind.as_str(),
                evaluation.model,
                evaluation.prompt_version,
                json,
                evaluation.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All current records, one per fingerprint (latest version), in insertion
    /// order. Rows whose JSON no longer decodes are skipped rather than
    /// poisoning the whole scan.
    pub fn all(&self) -> anyhow::Result<Vec<Evaluation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT record_json FROM evaluations
             WHERE id IN (SELECT MAX(id) FROM evaluations GROUP BY fingerprint)
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            let json = row?;
            match decode(&json) {
                Ok(eval) => out.push(eval),
                Err(err) => tracing::warn!(%err, "skipping undecodable evaluation row"),
            }
        }
        Ok(out)
    }

    /// Latest record for a subject under a given model and prompt, regardless
    /// of which exact text produced it. Batch tooling uses this to report
    /// `[cached]` without recomputing fingerprints.
    pub fn find_by_subject(
        &self,
        subject_id: &str,
        kind: SubjectKind,
        model: &str,
        prompt_version: &str,
    ) -> anyhow::Result<Option<Evaluation>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<String> = conn
            .query_row(
                "SELECT record_json FROM evaluations
                 WHERE subject_id = ?1 AND subject_kind = ?2 AND model = ?3 AND prompt_version = ?4
                 ORDER BY id DESC LIMIT 1",
                params![subject_id, kind.as_str(), model, prompt_version],
                |row| row.get(0),
            )
            .optional()?;
        row.map(|json| decode(&json)).transpose()
    }

    /// Prompt versions that have at least one cached record.
    pub fn prompts_with_data(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT DISTINCT prompt_version FROM evaluations ORDER BY prompt_version")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn decode(json: &str) -> anyhow::Result<Evaluation> {
    serde_json::from_str(json).context("failed to decode evaluation record")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verdict;
    use chrono::Utc;

    fn evaluation(fingerprint: &str, verdict: Verdict) -> Evaluation {
        Evaluation {
            id: format!("eval-{fingerprint}"),
            subject_id: "p-1".into(),
            subject_kind: SubjectKind::Original,
            model: "claude-sonnet".into(),
            prompt_version: "baseline".into(),
            fingerprint: fingerprint.into(),
            summary: "s".into(),
            verdict,
            rationale: "r".into(),
            raw_response: "raw".into(),
            created_at: Utc::now(),
            cost_cents: 0.5,
        }
    }

    fn memory_store() -> Store {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = memory_store();
        store.put(&evaluation("fp-1", Verdict::For)).unwrap();
        let got = store.get("fp-1").unwrap().unwrap();
        assert_eq!(got.verdict, Verdict::For);
        assert!(store.get("fp-2").unwrap().is_none());
    }

    #[test]
    fn forced_rewrite_appends_and_latest_wins() {
        let store = memory_store();
        store.put(&evaluation("fp-1", Verdict::For)).unwrap();
        store.put(&evaluation("fp-1", Verdict::Against)).unwrap();

        assert_eq!(store.get("fp-1").unwrap().unwrap().verdict, Verdict::Against);

        // all() sees one record per fingerprint.
        let all = store.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].verdict, Verdict::Against);

        // Both versions remain in the underlying table for audit.
        let conn = store.conn.lock().unwrap();
        let versions: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM evaluations WHERE fingerprint = 'fp-1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(versions, 2);
    }

    #[test]
    fn unknown_fields_in_stored_records_are_tolerated() {
        let store = memory_store();
        let mut value = serde_json::to_value(evaluation("fp-1", Verdict::Abstain)).unwrap();
        value["future_field"] = serde_json::json!({"nested": true});
        let conn = store.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO evaluations
               (fingerprint, subject_id, subject_kind, model, prompt_version, record_json, created_at)
             VALUES ('fp-1', 'p-1', 'original', 'claude-sonnet', 'baseline', ?1, '2026-01-01T00:00:00Z')",
            params![value.to_string()],
        )
        .unwrap();
        drop(conn);

        let got = store.get("fp-1").unwrap().unwrap();
        assert_eq!(got.verdict, Verdict::Abstain);
    }

    #[test]
    fn find_by_subject_filters_on_model_and_prompt() {
        let store = memory_store();
        let mut e = evaluation("fp-1", Verdict::For);
        store.put(&e).unwrap();

        e.fingerprint = "fp-2".into();
        e.prompt_version = "skeptical".into();
        e.verdict = Verdict::Against;
        store.put(&e).unwrap();

        let baseline = store
            .find_by_subject("p-1", SubjectKind::Original, "claude-sonnet", "baseline")
            .unwrap()
            .unwrap();
        assert_eq!(baseline.verdict, Verdict::For);

        assert!(store
            .find_by_subject("p-1", SubjectKind::Variant, "claude-sonnet", "baseline")
            .unwrap()
            .is_none());

        assert_eq!(
            store.prompts_with_data().unwrap(),
            vec!["baseline".to_string(), "skeptical".to_string()]
        );
    }
}
