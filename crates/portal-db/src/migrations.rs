use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            photo       TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS study_sessions (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            subject     TEXT NOT NULL,
            topic       TEXT NOT NULL,
            duration    INTEGER NOT NULL,
            difficulty  TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            date        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_study_sessions_user
            ON study_sessions(user_id);

        CREATE TABLE IF NOT EXISTS books (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            author       TEXT NOT NULL,
            price        REAL NOT NULL,
            condition    TEXT NOT NULL,
            contact      TEXT NOT NULL,
            seller_id    TEXT NOT NULL REFERENCES users(id),
            seller_name  TEXT NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS interview_tips (
            id          TEXT PRIMARY KEY,
            tip         TEXT NOT NULL,
            user_id     TEXT NOT NULL REFERENCES users(id),
            user_name   TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS common_questions (
            id          TEXT PRIMARY KEY,
            question    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS mock_interviews (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            user_name   TEXT NOT NULL,
            mentor      TEXT NOT NULL,
            date        TEXT NOT NULL,
            time        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_mock_interviews_user
            ON mock_interviews(user_id);

        -- Seed the common interview questions shown on the prep page
        INSERT OR IGNORE INTO common_questions (id, question, created_at) VALUES
            ('00000000-0000-0000-0000-000000000001', 'Tell me about yourself.', '2024-01-01T00:00:00Z'),
            ('00000000-0000-0000-0000-000000000002', 'What are your strengths and weaknesses?', '2024-01-01T00:00:00Z'),
            ('00000000-0000-0000-0000-000000000003', 'Why do you want to work here?', '2024-01-01T00:00:00Z'),
            ('00000000-0000-0000-0000-000000000004', 'Describe a challenge you faced and how you handled it.', '2024-01-01T00:00:00Z'),
            ('00000000-0000-0000-0000-000000000005', 'Where do you see yourself in five years?', '2024-01-01T00:00:00Z');
        ",
    )?;

    info!("portal schema migrated");
    Ok(())
}
