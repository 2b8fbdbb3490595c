pub mod errors;
pub mod rules;
pub mod validation;
pub mod value_objects;
