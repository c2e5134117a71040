pub mod access_tokens;
pub mod auth;
pub mod expenses;
pub mod incomes;
pub mod invoices;
pub mod taxes;
pub mod users;
