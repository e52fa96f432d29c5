pub mod dispatch;
pub mod fcm;
pub mod health;
pub mod message;
pub mod push;
pub mod status;
pub mod webhook;
