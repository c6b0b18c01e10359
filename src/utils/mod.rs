pub mod dns;
pub mod smtp;
