//! The bot's interaction handlers and the registry that routes to them.

use anyhow::Result;

use crate::custom_id::CustomId;
use crate::registry::{HandlerRegistry, Matcher};

mod access;
mod hello;
mod quiz;
mod subject;

pub use access::{RemoveAccess, RevertAccess};
pub use hello::Hello;
pub use quiz::{MakeQuiz, QuizModalSubmit, QuizSelectMenu};
pub use subject::MakeSubject;

pub fn registry() -> Result<HandlerRegistry> {
    HandlerRegistry::builder()
        .command("hello", Hello)
        .command("make_subject", MakeSubject)
        .command("remove_access", RemoveAccess)
        .command("make_quiz", MakeQuiz)
        .component(Matcher::prefix(CustomId::REVERT_ACCESS_PREFIX), RevertAccess)
        .component(Matcher::exact(CustomId::QUIZ_SELECT_MENU), QuizSelectMenu)
        .modal(CustomId::MAKE_QUIZ_MODAL_PREFIX, QuizModalSubmit)
        .build()
}
