pub mod chatmodels;
pub mod notificationmodel;
pub mod reviewmodel;
pub mod usermodel;
pub mod workrequestmodel;
