pub mod schema;
pub mod session;

pub use schema::{CompiledSchema, FieldKey, FormValues, Rule, SchemaError, Violation};
pub use session::{FormEvent, FormState};
