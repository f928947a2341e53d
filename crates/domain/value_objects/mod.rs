pub mod access_window;
pub mod consultations;
pub mod doctors;
pub mod enums;
pub mod patients;
pub mod users;
