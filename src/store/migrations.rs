use rusqlite::Connection;

/// Apply the schema. Idempotent; runs at every open.
pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            owner TEXT NOT NULL,
            title TEXT NOT NULL,
            theme TEXT NOT NULL,
            background_noise TEXT NOT NULL,
            ai_questions_enabled INTEGER NOT NULL,
            expected_duration INTEGER NOT NULL,
            actual_duration INTEGER,
            status TEXT NOT NULL DEFAULT 'created',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS audio_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL REFERENCES sessions(id),
            file_path TEXT NOT NULL,
            transcription TEXT,
            duration REAL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_audio_data_session
            ON audio_data(session_id, created_at);

        CREATE TABLE IF NOT EXISTS analysis_results (
            session_id TEXT PRIMARY KEY REFERENCES sessions(id),
            overall_score REAL,
            expression_score REAL,
            comprehension_score REAL,
            delivery_score REAL,
            engagement_score REAL,
            analysis_data TEXT NOT NULL DEFAULT '{}',
            video_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
}
