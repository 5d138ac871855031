pub mod build;
pub mod init;
pub mod preview;
pub mod resolve;
pub mod site;
pub mod validate;
