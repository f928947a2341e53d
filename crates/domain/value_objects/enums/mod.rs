pub mod consultation_statuses;
pub mod payment_methods;
pub mod user_roles;
