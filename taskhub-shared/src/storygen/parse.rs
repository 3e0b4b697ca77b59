/// Parsing of provider output into user stories
///
/// A line counts as a story when, after list numbering and bullets are
/// stripped, it reads `As a <role>, I want to <action>, so that <benefit>`.

use once_cell::sync::Lazy;
use regex::Regex;

static STORY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^As a .+, I want to .+, so that .+").expect("story pattern is a valid regex")
});

const LIST_MARKERS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', '-', ')', ' '];

/// Whether `line` is a well-formed user story
pub fn is_user_story(line: &str) -> bool {
    STORY_PATTERN.is_match(line)
}

/// Splits provider text into user stories
///
/// Non-conforming lines are discarded. When no line conforms, the raw text
/// is returned as the only story.
pub fn parse_user_stories(text: &str) -> Vec<String> {
    let stories: Vec<String> = text
        .lines()
        .map(|line| line.trim().trim_start_matches(LIST_MARKERS))
        .filter(|line| is_user_story(line))
        .map(str::to_string)
        .collect();

    if stories.is_empty() {
        vec![text.to_string()]
    } else {
        stories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_lines() {
        let text = "As a user, I want to log in, so that I can see my tasks.\n\
                    As an admin, I want to ban users, so that the board stays clean.\n\
                    As a manager, I want to assign tasks, so that work is shared.";

        let stories = parse_user_stories(text);

        // "As an admin" does not match the "As a " form
        assert_eq!(stories.len(), 2);
        assert_eq!(
            stories[0],
            "As a user, I want to log in, so that I can see my tasks."
        );
    }

    #[test]
    fn test_parse_strips_numbering_and_bullets() {
        let text = "Here are your stories:\n\
                    1. As a user, I want to reset my password, so that I regain access.\n\
                    2) As a user, I want to log out, so that my session ends.\n\
                    - As a guest, I want to sign up, so that I can join.\n\
                    \n\
                    Let me know if you need more.";

        let stories = parse_user_stories(text);

        assert_eq!(
            stories,
            vec![
                "As a user, I want to reset my password, so that I regain access.",
                "As a user, I want to log out, so that my session ends.",
                "As a guest, I want to sign up, so that I can join.",
            ]
        );
        assert!(stories.iter().all(|s| is_user_story(s)));
    }

    #[test]
    fn test_parse_falls_back_to_raw_text() {
        let text = "I could not come up with anything useful.";
        assert_eq!(parse_user_stories(text), vec![text.to_string()]);
    }

    #[test]
    fn test_incomplete_story_is_rejected() {
        assert!(!is_user_story("As a user, I want to log in."));
        assert!(!is_user_story("I want to log in, so that I can work."));
        assert!(is_user_story(
            "As a developer, I want to see my tasks, so that I know what to do"
        ));
    }
}
