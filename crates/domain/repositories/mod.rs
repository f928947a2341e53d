pub mod doctors;
pub mod interest_entries;
pub mod patient_profiles;
pub mod users;
