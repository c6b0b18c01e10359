//! Address classification and the validation pipeline built on top of it.

pub mod batch;
pub mod classifier;
pub mod syntax;
pub mod validator;

pub use batch::{BatchCoordinator, ProgressHook};
pub use classifier::{ClassificationSets, DomainClass, DomainClassifier};
pub use validator::EmailValidator;
