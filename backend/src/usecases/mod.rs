pub mod consultation_rooms;
pub mod doctors;
pub mod errors;
pub mod patients;
pub mod payments;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;
