pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS evaluations (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  fingerprint TEXT NOT NULL,
  subject_id TEXT NOT NULL,
  subject_kind TEXT NOT NULL,
  model TEXT NOT NULL,
  prompt_version TEXT NOT NULL,
  record_json TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_evaluations_fingerprint ON evaluations(fingerprint);
CREATE INDEX IF NOT EXISTS idx_evaluations_subject ON evaluations(subject_id, subject_kind);

CREATE TABLE IF NOT EXISTS daily_costs (
  day TEXT PRIMARY KEY,
  spent_cents REAL NOT NULL
);
"#;
