pub mod chatapi;
pub mod client;
pub mod notificationapi;
pub mod reviewapi;
pub mod userapi;
pub mod workrequestapi;

pub use client::{RawResponse, RequestBody, RequestOptions, ResourceClient};
