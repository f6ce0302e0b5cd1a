//! Concrete completion services, one per supported provider.

pub mod chat;
pub mod openai;
pub mod zhipu;
