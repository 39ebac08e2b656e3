pub mod branding_script;
pub mod client;
pub mod expense;
pub mod immersion;
pub mod script;
