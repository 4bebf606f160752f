pub mod common;
pub mod cycle;
pub mod document;
pub mod expense;
pub mod income;

pub use common::{Amounted, Displayable};
pub use cycle::IncomeCycle;
pub use document::UserDocument;
pub use expense::{Expense, NewExpense};
pub use income::Income;
