//! Shared UI primitives.

pub mod button;
pub mod card;
pub mod input;

pub use button::{Button, ButtonVariant};
pub use card::{Card, CardBody, CardHeader};
pub use input::{SelectInput, TextInput};
