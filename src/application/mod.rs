pub mod builder;
pub mod dto;
pub mod form_validator;
pub mod input_validator;

pub use builder::{GuardBuilder, GuardComponents};
pub use dto::{validate_request, FormErrors, ValidatedRequest};
pub use form_validator::{
    validate_batch, validate_form, BatchOutcome, FieldSpec, FormData, FormOutcome, FormSchema,
    FormValidator,
};
pub use input_validator::{validate_input, InputValidator, ValidationOutcome};
