
use std::fmt;

/// State carried through Discord component and modal `custom_id` strings.
///
/// Every id the bot sends out is built here and every id it receives is parsed
/// here. The layouts must stay readable for buttons already sitting in DMs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomId {
    /// `revert_access-<channel_id>-<user_id>`
    RevertAccess { channel_id: String, user_id: String },
    /// `quizSelectMenu`
    QuizSelectMenu,
    /// `makeQuizModal|<channel_id>`
    MakeQuizModal { channel_id: String },
}

impl CustomId {
    pub const REVERT_ACCESS_PREFIX: &'static str = "revert_access-";
    pub const QUIZ_SELECT_MENU: &'static str = "quizSelectMenu";
    pub const MAKE_QUIZ_MODAL_PREFIX: &'static str = "makeQuizModal";

    const MODAL_SEPARATOR: char = '|';

    pub fn parse(value: &str) -> Option<Self> {
        if let Some(rest) = value.strip_prefix(Self::REVERT_ACCESS_PREFIX) {
            let (channel_id, user_id) = rest.split_once('-')?;
            if !is_snowflake(channel_id) || !is_snowflake(user_id) {
                return None;
            }
            return Some(Self::RevertAccess {
                channel_id: channel_id.into(),
                user_id: user_id.into(),
            });
        }
        if value == Self::QUIZ_SELECT_MENU {
            return Some(Self::QuizSelectMenu);
        }
        if let Some(rest) = value.strip_prefix(Self::MAKE_QUIZ_MODAL_PREFIX) {
            let channel_id = rest.strip_prefix(Self::MODAL_SEPARATOR)?;
            if !is_snowflake(channel_id) {
                return None;
            }
            return Some(Self::MakeQuizModal {
                channel_id: channel_id.into(),
            });
        }
        None
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RevertAccess { channel_id, user_id } => {
                write!(f, "{}{channel_id}-{user_id}", Self::REVERT_ACCESS_PREFIX)
            }
            Self::QuizSelectMenu => f.write_str(Self::QUIZ_SELECT_MENU),
            Self::MakeQuizModal { channel_id } => {
                write!(f, "{}{}{channel_id}", Self::MAKE_QUIZ_MODAL_PREFIX, Self::MODAL_SEPARATOR)
            }
        }
    }
}

// Discord ids are decimal u64s.
fn is_snowflake(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_revert_access() {
        let id = CustomId::parse("revert_access-123-456").unwrap();
        assert_eq!(
            id,
            CustomId::RevertAccess {
                channel_id: "123".into(),
                user_id: "456".into()
            }
        );
        assert_eq!(id.to_string(), "revert_access-123-456");
    }

    #[test]
    fn parses_quiz_ids() {
        assert_eq!(CustomId::parse("quizSelectMenu"), Some(CustomId::QuizSelectMenu));
        let modal = CustomId::MakeQuizModal {
            channel_id: "999".into(),
        };
        assert_eq!(modal.to_string(), "makeQuizModal|999");
        assert_eq!(CustomId::parse("makeQuizModal|999"), Some(modal));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(CustomId::parse("revert_access-123"), None);
        assert_eq!(CustomId::parse("revert_access-abc-456"), None);
        assert_eq!(CustomId::parse("revert_access-123-456-789"), None);
        assert_eq!(CustomId::parse("makeQuizModal"), None);
        assert_eq!(CustomId::parse("makeQuizModal|"), None);
        assert_eq!(CustomId::parse("quizSelectMenu2"), None);
        assert_eq!(CustomId::parse(""), None);
    }
}
