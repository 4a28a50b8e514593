pub mod countdown;
pub mod exam_flow;
pub mod exam_session;

pub use countdown::Countdown;
pub use exam_flow::{ExamCommand, ExamFlow, ExamOutcome, ExamUpdate};
pub use exam_session::{ExamPhase, ExamSession, TickOutcome};
