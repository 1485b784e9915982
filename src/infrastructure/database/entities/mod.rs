//! Database entities module
//!
//! Ids are stored as hyphenated UUID strings and money as decimal strings
//! so no precision is lost on the way through SQLite.

pub mod payment_method;
pub mod reservation;
pub mod setting;
pub mod settlement;
pub mod slot;
pub mod system_log;
pub mod user_profile;

pub use payment_method::Entity as PaymentMethod;
pub use reservation::Entity as Reservation;
pub use setting::Entity as Setting;
pub use settlement::Entity as Settlement;
pub use slot::Entity as Slot;
pub use system_log::Entity as SystemLog;
pub use user_profile::Entity as UserProfile;
