//! Core data model: orders, editors, and their enums.

mod editor;
mod order;

pub use editor::{Editor, Employment, Role, month_key};
pub use order::{
    Assignment, FieldEdits, Order, ParseEnumError, PendingEdit, Priority, Status, TeamEdit,
};
