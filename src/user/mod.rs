pub use models::UserId;

mod models;
