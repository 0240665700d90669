use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct RatingRow {
    pub id: i64,
    pub subject_id: String,
    pub rater_id: String,
    pub rater_name: Option<String>,
    pub score: i32,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct SubjectRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub discipline: Option<String>,
    pub rating: f64,
    pub reviews: i32,
    pub review_band: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}
