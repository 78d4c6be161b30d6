pub mod message_builder;
pub mod transport;
