use crate::pr::PullRequestContext;

/// Bodies longer than this many characters are cut before prompting.
pub const MAX_BODY_CHARS: usize = 2000;

/// Stands in for an absent or empty PR description.
pub const EMPTY_BODY_PLACEHOLDER: &str = "No description provided.";

const SYSTEM_INSTRUCTION: &str = "You are the repository assistant for this project. \
Introduce yourself as the assistant, briefly explain what you can help with on this pull request \
(answering questions, summarizing changes, pointing out likely review concerns), and invite the \
author to reply to you in this thread. Keep the comment between 4 and 8 sentences. \
Never include code diffs, patches or commits.";

/// System and user messages for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt for a newly opened pull request.
pub fn compose(ctx: &PullRequestContext) -> Prompt {
    let body = if ctx.body.is_empty() {
        EMPTY_BODY_PLACEHOLDER.to_string()
    } else {
        truncate_chars(&ctx.body, MAX_BODY_CHARS)
    };

    let user = format!(
        "A new pull request was just opened.\n\
         \n\
         Repository: {repo}\n\
         Title: {title}\n\
         Author: @{author}\n\
         Merge status: {status}\n\
         \n\
         Description:\n\
         {body}\n\
         \n\
         Write the first comment on this pull request. In it:\n\
         1. Introduce yourself as the repository assistant.\n\
         2. Say that you will follow this thread and respond to replies.\n\
         3. On its own line immediately after the introduction, give an estimated review \
         resolution time in minutes, formatted as \"Estimated resolution time: N minutes\".\n\
         4. Return only the comment body, with no surrounding commentary.",
        repo = ctx.full_name,
        title = ctx.title,
        author = ctx.author,
        status = ctx.merge_status,
        body = body,
    );

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::test_context;

    #[test]
    fn test_user_prompt_interpolates_metadata() {
        let mut ctx = test_context();
        ctx.body = "Fixes the flaky login test.".to_string();
        let prompt = compose(&ctx);

        assert!(prompt.user.contains("Repository: acme/widgets"));
        assert!(prompt.user.contains("Title: Fix bug"));
        assert!(prompt.user.contains("Author: @alice"));
        assert!(prompt.user.contains("Merge status: mergeable"));
        assert!(prompt.user.contains("Fixes the flaky login test."));
        assert!(prompt.user.contains("minutes"));
        assert!(prompt.user.contains("Return only the comment body"));
    }

    #[test]
    fn test_system_instruction_is_constant() {
        let a = compose(&test_context());
        let mut other = test_context();
        other.title = "Something else".to_string();
        let b = compose(&other);
        assert_eq!(a.system, b.system);
        assert!(a.system.contains("4 and 8 sentences"));
        assert!(a.system.contains("Never include code diffs"));
    }

    #[test]
    fn test_empty_body_uses_placeholder() {
        let mut ctx = test_context();
        ctx.body = String::new();
        assert!(compose(&ctx).user.contains(EMPTY_BODY_PLACEHOLDER));

        ctx.body = "  \n\t".to_string();
        let user = compose(&ctx).user;
        assert!(!user.contains(EMPTY_BODY_PLACEHOLDER));
        assert!(user.contains("  \n\t"));
    }

    #[test]
    fn test_long_body_is_truncated_to_exact_prefix() {
        let mut ctx = test_context();
        let kept = "a".repeat(MAX_BODY_CHARS);
        ctx.body = format!("{}{}", kept, "ZZZZ");
        let prompt = compose(&ctx);

        assert!(prompt.user.contains(&format!("\n{}\n", kept)));
        assert!(!prompt.user.contains('Z'));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_BODY_CHARS + 5);
        let truncated = truncate_chars(&text, MAX_BODY_CHARS);
        assert_eq!(truncated.chars().count(), MAX_BODY_CHARS);
        assert_eq!(truncate_chars("short", MAX_BODY_CHARS), "short");
    }
}
