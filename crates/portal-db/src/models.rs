/// Database row types — these map directly to SQLite rows.
/// Distinct from portal-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub photo: Option<String>,
}

pub struct StudySessionRow {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub topic: String,
    pub duration: u32,
    pub difficulty: String,
    pub completed: bool,
    pub date: String,
}

pub struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub condition: String,
    pub contact: String,
    pub seller_id: String,
    pub seller_name: String,
    pub created_at: String,
}

pub struct InterviewTipRow {
    pub id: String,
    pub tip: String,
    pub user_id: String,
    pub user_name: String,
    pub created_at: String,
}

pub struct CommonQuestionRow {
    pub id: String,
    pub question: String,
    pub created_at: String,
}

pub struct MockInterviewRow {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub mentor: String,
    pub date: String,
    pub time: String,
    pub created_at: String,
}
