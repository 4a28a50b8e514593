pub mod exam;
pub mod loaders;
pub mod question;
pub mod topic;

pub use exam::{is_correct, AnswerMap, ExamResult, PASS_SCORE};
pub use loaders::{load_material_file, ImportedMaterial};
pub use question::{Question, QuestionKind};
pub use topic::{system_topics, StudyTopic};
