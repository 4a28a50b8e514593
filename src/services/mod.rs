pub mod fallback;
pub mod generation_gateway;
pub mod prompts;
pub mod topic_store;

pub use generation_gateway::{parse_exam_payload, GenerationGateway, ParseOutcome};
pub use topic_store::{DeleteOutcome, TopicStore, CUSTOM_TOPICS_KEY};
