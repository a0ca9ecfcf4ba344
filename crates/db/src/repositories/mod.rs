//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument. Multi-step mutations open
//! their own transaction.

pub mod attendance_repo;
pub mod comment_repo;
pub mod currency_repo;
pub mod customer_repo;
pub mod customer_settlement_repo;
pub mod document_repo;
pub mod enquiry_repo;
pub mod holiday_repo;
pub mod notification_repo;
pub mod outsource_team_repo;
pub mod project_repo;
pub mod session_repo;
pub mod settlement_repo;
pub mod task_repo;
pub mod time_off_repo;
pub mod time_sheet_repo;
pub mod todo_repo;
pub mod user_repo;

pub use attendance_repo::AttendanceRepo;
pub use comment_repo::CommentRepo;
pub use currency_repo::CurrencyRepo;
pub use customer_repo::CustomerRepo;
pub use customer_settlement_repo::CustomerSettlementRepo;
pub use document_repo::DocumentRepo;
pub use enquiry_repo::EnquiryRepo;
pub use holiday_repo::HolidayRepo;
pub use notification_repo::NotificationRepo;
pub use outsource_team_repo::OutsourceTeamRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use settlement_repo::SettlementRepo;
pub use task_repo::TaskRepo;
pub use time_off_repo::TimeOffRepo;
pub use time_sheet_repo::TimeSheetRepo;
pub use todo_repo::TodoRepo;
pub use user_repo::UserRepo;

/// SQL expression for the current UTC time in the same RFC 3339 form as the
/// column defaults.
pub(crate) const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
