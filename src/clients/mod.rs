pub mod fcm;
pub mod health;
pub mod provider;
pub mod webhook;
