mod category;
mod expense;
mod user;

pub use category::Category;
pub use expense::{Expense, FormError, NewExpense};
pub(crate) use expense::parse_date;
pub use user::User;
