//! Prompt assembly for the vision backend
//!
//! Section order is contractual: the downstream model weights later
//! instructions over earlier ones, so the constraint and leniency blocks
//! must come after the context framing or they get overridden.

use crate::scoring::LENIENCY_ATTEMPT;

/// Fixed system instruction sent with every request
pub const SYSTEM_INSTRUCTION: &str = "You are a photography coach reviewing interior shots \
     for a property shoot. Judge composition and framing only and answer tersely.";

/// How many prior feedback strings are replayed to the model
const RECENT_FEEDBACK_LIMIT: usize = 2;

/// Inputs for one prompt build
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub room_type: &'a str,
    pub attempt: u32,
    pub angle_reset: bool,
    /// Most-recent-first; only the first two entries are used.
    pub recent_feedback: Vec<&'a str>,
    pub constraints: &'a [String],
    pub word_limit: u32,
}

/// Build the user instruction for one assessment call
pub fn build(ctx: &PromptContext<'_>) -> String {
    let mut sections = Vec::new();

    // 1. Context framing: room, attempt, and the new-angle marker.
    let marker = if ctx.angle_reset { " (NEW ANGLE)" } else { "" };
    sections.push(format!(
        "You are reviewing a {} photo, attempt #{}{}.",
        ctx.room_type, ctx.attempt, marker
    ));

    // 2. Hard negative: composition only.
    sections.push(
        "Never discuss lighting, exposure, brightness, or shadow. \
         Comment on composition and framing only."
            .to_string(),
    );

    // 3. Response length cap.
    sections.push(format!("Respond in at most {} words.", ctx.word_limit));

    // 4. Prior feedback, skipped after an angle reset since it applied
    //    to a different framing.
    if !ctx.angle_reset && !ctx.recent_feedback.is_empty() {
        let mut block = String::from("You already gave this feedback on earlier attempts:\n");
        for feedback in ctx.recent_feedback.iter().take(RECENT_FEEDBACK_LIMIT) {
            block.push_str("- ");
            block.push_str(feedback);
            block.push('\n');
        }
        block.push_str("Do not repeat these points.");
        sections.push(block);
    }

    // 5. Known constraints, after the framing so they take precedence.
    if !ctx.constraints.is_empty() {
        let mut block = String::from("Known physical constraints of this space:\n");
        for constraint in ctx.constraints {
            block.push_str("- ");
            block.push_str(constraint);
            block.push('\n');
        }
        block.push_str("Never suggest an action that contradicts a known constraint.");
        sections.push(block);
    }

    // 6. Leniency once the photographer has retried enough.
    if ctx.attempt >= LENIENCY_ATTEMPT {
        sections.push(
            "The photographer has retried this shot several times. \
             Be lenient and favor accepting the shot."
                .to_string(),
        );
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(constraints: &'a [String]) -> PromptContext<'a> {
        PromptContext {
            room_type: "living room",
            attempt: 1,
            angle_reset: false,
            recent_feedback: Vec::new(),
            constraints,
            word_limit: 40,
        }
    }

    #[test]
    fn states_room_type_and_attempt() {
        let prompt = build(&ctx(&[]));
        assert!(prompt.contains("living room"));
        assert!(prompt.contains("attempt #1"));
    }

    #[test]
    fn marks_new_angle_on_reset() {
        let mut context = ctx(&[]);
        context.angle_reset = true;
        assert!(build(&context).contains("(NEW ANGLE)"));
        assert!(!build(&ctx(&[])).contains("(NEW ANGLE)"));
    }

    #[test]
    fn always_forbids_lighting_talk() {
        let prompt = build(&ctx(&[]));
        for banned in ["lighting", "exposure", "brightness", "shadow"] {
            assert!(prompt.contains(banned), "missing ban on {banned}");
        }
        assert!(prompt.contains("composition"));
    }

    #[test]
    fn states_word_limit() {
        let mut context = ctx(&[]);
        context.word_limit = 25;
        assert!(build(&context).contains("at most 25 words"));
    }

    #[test]
    fn lists_recent_feedback_verbatim() {
        let mut context = ctx(&[]);
        context.recent_feedback = vec!["Move slightly left", "Raise the tripod"];
        let prompt = build(&context);
        assert!(prompt.contains("- Move slightly left"));
        assert!(prompt.contains("- Raise the tripod"));
        assert!(prompt.contains("Do not repeat"));
    }

    #[test]
    fn caps_recent_feedback_at_two() {
        let mut context = ctx(&[]);
        context.recent_feedback = vec!["one", "two", "three"];
        let prompt = build(&context);
        assert!(prompt.contains("- one"));
        assert!(prompt.contains("- two"));
        assert!(!prompt.contains("- three"));
    }

    #[test]
    fn omits_prior_feedback_after_reset() {
        let mut context = ctx(&[]);
        context.angle_reset = true;
        context.recent_feedback = vec!["Move slightly left"];
        let prompt = build(&context);
        assert!(!prompt.contains("Move slightly left"));
        assert!(!prompt.contains("Do not repeat"));
    }

    #[test]
    fn lists_constraints_verbatim() {
        let constraints = vec!["cannot move back further".to_string()];
        let prompt = build(&ctx(&constraints));
        assert!(prompt.contains("- cannot move back further"));
        assert!(prompt.contains("contradicts a known constraint"));
    }

    #[test]
    fn omits_constraint_block_when_empty() {
        assert!(!build(&ctx(&[])).contains("Known physical constraints"));
    }

    #[test]
    fn asks_for_leniency_from_attempt_three() {
        let mut context = ctx(&[]);
        context.attempt = 3;
        assert!(build(&context).contains("Be lenient"));

        context.attempt = 2;
        assert!(!build(&context).contains("Be lenient"));
    }

    #[test]
    fn constraint_block_comes_after_context_framing() {
        // Precedence is last-wins downstream, so constraints must sit
        // later in the text than the framing and the word cap.
        let constraints = vec!["cannot move back further".to_string()];
        let mut context = ctx(&constraints);
        context.attempt = 3;
        let prompt = build(&context);

        let framing = prompt.find("attempt #").unwrap();
        let cap = prompt.find("at most").unwrap();
        let constraint = prompt.find("Known physical constraints").unwrap();
        let leniency = prompt.find("Be lenient").unwrap();
        assert!(framing < cap);
        assert!(cap < constraint);
        assert!(constraint < leniency);
    }
}
