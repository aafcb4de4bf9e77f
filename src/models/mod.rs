pub mod invite;

pub use invite::{InviteRecord, normalize_code, normalize_email, storage_key};
