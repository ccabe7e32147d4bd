pub mod store;
pub mod types;

pub use store::MailStore;
pub use types::{EmailDetail, EmailPayload, EmailSection, SectionMatch, StoredEmail};
