//! Model provider gateways

mod openai;

pub use openai::{KICKOFF_MESSAGE, OpenAiGateway, OpenAiGatewayConfig};
