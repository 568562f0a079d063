pub mod dictionary;
pub mod lesson;

use crate::session::lesson::LessonText;

pub trait TextGenerator {
    fn generate(&mut self, candidates: &[String]) -> LessonText;
}
