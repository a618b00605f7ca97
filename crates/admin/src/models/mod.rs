//! Admin session state and display types.

pub mod session;
pub mod views;

pub use session::{AdminProfile, CurrentAdmin, keys as session_keys};
pub use views::AdminUserView;
