//! Small helpers shared by the router core and the command-line tool.

pub mod date;
pub mod html;
pub mod link;
pub mod plural;
