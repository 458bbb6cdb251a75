use crate::Database;
use crate::models::{
    BookRow, CommonQuestionRow, InterviewTipRow, MockInterviewRow, StudySessionRow, UserRow,
};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    /// Inserts a new user. Returns false when the email is already taken;
    /// the UNIQUE index is the authority, not any lookup the caller did
    /// beforehand.
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, username, email, password_hash),
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Overwrites username/email, and the photo path when one is given.
    /// Returns the updated row, or None when the user no longer exists.
    pub fn update_user_profile(
        &self,
        id: &str,
        username: &str,
        email: &str,
        photo: Option<&str>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let changed = match photo {
                Some(photo) => conn.execute(
                    "UPDATE users SET username = ?1, email = ?2, photo = ?3 WHERE id = ?4",
                    (username, email, photo, id),
                )?,
                None => conn.execute(
                    "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3",
                    (username, email, id),
                )?,
            };
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id", id)
        })
    }

    // -- Study sessions --

    pub fn insert_study_session(&self, row: &StudySessionRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO study_sessions (id, user_id, subject, topic, duration, difficulty, completed, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    row.id,
                    row.user_id,
                    row.subject,
                    row.topic,
                    row.duration,
                    row.difficulty,
                    row.completed,
                    row.date
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_study_sessions(&self, user_id: &str) -> Result<Vec<StudySessionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, subject, topic, duration, difficulty, completed, date
                 FROM study_sessions WHERE user_id = ?1 ORDER BY date",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(StudySessionRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        subject: row.get(2)?,
                        topic: row.get(3)?,
                        duration: row.get(4)?,
                        difficulty: row.get(5)?,
                        completed: row.get(6)?,
                        date: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Full replacement of a session's fields, filtered by (id, owner) so a
    /// caller can never touch another user's row. Returns false when no such
    /// pair exists.
    pub fn update_study_session(&self, id: &str, user_id: &str, row: &StudySessionRow) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE study_sessions
                 SET subject = ?1, topic = ?2, duration = ?3, difficulty = ?4, completed = ?5, date = ?6
                 WHERE id = ?7 AND user_id = ?8",
                rusqlite::params![
                    row.subject,
                    row.topic,
                    row.duration,
                    row.difficulty,
                    row.completed,
                    row.date,
                    id,
                    user_id
                ],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Books --

    pub fn insert_book(&self, row: &BookRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO books (id, title, author, price, condition, contact, seller_id, seller_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    row.id,
                    row.title,
                    row.author,
                    row.price,
                    row.condition,
                    row.contact,
                    row.seller_id,
                    row.seller_name,
                    row.created_at
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_books(&self) -> Result<Vec<BookRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, author, price, condition, contact, seller_id, seller_name, created_at
                 FROM books ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(BookRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        author: row.get(2)?,
                        price: row.get(3)?,
                        condition: row.get(4)?,
                        contact: row.get(5)?,
                        seller_id: row.get(6)?,
                        seller_name: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Interview tips --

    pub fn insert_interview_tip(&self, row: &InterviewTipRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO interview_tips (id, tip, user_id, user_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![row.id, row.tip, row.user_id, row.user_name, row.created_at],
            )?;
            Ok(())
        })
    }

    pub fn list_interview_tips(&self) -> Result<Vec<InterviewTipRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tip, user_id, user_name, created_at
                 FROM interview_tips ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(InterviewTipRow {
                        id: row.get(0)?,
                        tip: row.get(1)?,
                        user_id: row.get(2)?,
                        user_name: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Common questions --

    pub fn list_common_questions(&self) -> Result<Vec<CommonQuestionRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, question, created_at FROM common_questions ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CommonQuestionRow {
                        id: row.get(0)?,
                        question: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Mock interviews --

    pub fn insert_mock_interview(&self, row: &MockInterviewRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO mock_interviews (id, user_id, user_name, mentor, date, time, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    row.id,
                    row.user_id,
                    row.user_name,
                    row.mentor,
                    row.date,
                    row.time,
                    row.created_at
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_mock_interviews(&self, user_id: &str) -> Result<Vec<MockInterviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, user_name, mentor, date, time, created_at
                 FROM mock_interviews WHERE user_id = ?1 ORDER BY date, time",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MockInterviewRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        user_name: row.get(2)?,
                        mentor: row.get(3)?,
                        date: row.get(4)?,
                        time: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // column is a fixed identifier chosen by the callers above, never user input
    let sql = format!(
        "SELECT id, username, email, password, photo FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                photo: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
