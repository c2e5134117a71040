pub mod access_token;
pub mod expense;
pub mod income;
pub mod invoice;
pub mod tax;
pub mod user;
pub mod workspace;

pub use access_token::WorkspaceAccessToken;
pub use expense::Expense;
pub use income::Income;
pub use invoice::Invoice;
pub use tax::Tax;
pub use user::User;
pub use workspace::Workspace;
