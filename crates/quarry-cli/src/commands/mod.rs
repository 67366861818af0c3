//! Command implementations.

pub mod books;
pub mod extract;
pub mod search;
pub mod show;
pub mod status;

pub use self::books::execute_books;
pub use self::extract::execute_extract;
pub use self::search::execute_search;
pub use self::show::execute_show;
pub use self::status::execute_status;
