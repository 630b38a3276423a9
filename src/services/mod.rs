pub mod idp;
pub mod inbox;
