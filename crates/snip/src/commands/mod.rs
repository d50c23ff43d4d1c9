/// `snip clean` command implementation.
mod clean;
/// `snip list` command implementation.
mod list;
/// Interactive menu.
mod menu;

pub use clean::clean;
pub use list::list;
pub use menu::menu;
