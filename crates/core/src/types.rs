/// All database primary keys are SQLite INTEGER rowids.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar days (attendance, leave ranges, deadlines) carry no time zone.
pub type Day = chrono::NaiveDate;
