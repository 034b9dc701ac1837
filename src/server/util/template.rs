//! Placeholder substitution for custom command responses and welcome/leave messages.

/// Values available to a response template.
#[derive(Debug, Clone)]
pub struct TemplateContext<'a> {
    pub user_id: u64,
    pub user_name: &'a str,
    pub server_name: &'a str,
    /// `None` for member events, which have no originating channel.
    pub channel_id: Option<u64>,
    pub member_count: u64,
}

/// Placeholders that need guild information fetched from Discord.
pub fn needs_guild_summary(template: &str) -> bool {
    template.contains("{server}") || template.contains("{membercount}")
}

/// Replaces the recognised placeholders in a single left-to-right pass.
///
/// Recognised: `{user}` (mention), `{user.name}`, `{server}`, `{channel}` (mention) and
/// `{membercount}`. Anything else between braces, and unbalanced braces, is copied through
/// untouched. Substituted values are never re-scanned, so a user named `{server}` stays
/// literal.
pub fn render(template: &str, ctx: &TemplateContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let Some(end) = candidate.find('}') else {
            out.push_str(candidate);
            return out;
        };

        let token = &candidate[1..end];
        match token {
            "user" => out.push_str(&format!("<@{}>", ctx.user_id)),
            "user.name" => out.push_str(ctx.user_name),
            "server" => out.push_str(ctx.server_name),
            "channel" => match ctx.channel_id {
                Some(id) => out.push_str(&format!("<#{}>", id)),
                None => out.push_str("{channel}"),
            },
            "membercount" => out.push_str(&ctx.member_count.to_string()),
            _ => {
                // Not a placeholder: emit the brace and keep scanning after it, so a later
                // `{` inside this span can still start a real placeholder.
                out.push('{');
                rest = &candidate[1..];
                continue;
            }
        }

        rest = &candidate[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext<'static> {
        TemplateContext {
            user_id: 42,
            user_name: "ferris",
            server_name: "Rustaceans",
            channel_id: Some(7),
            member_count: 1300,
        }
    }

    #[test]
    fn substitutes_every_placeholder() {
        let rendered = render(
            "Hi {user} ({user.name}) in {channel}, welcome to {server}! We are {membercount}.",
            &ctx(),
        );

        assert_eq!(
            rendered,
            "Hi <@42> (ferris) in <#7>, welcome to Rustaceans! We are 1300."
        );
    }

    #[test]
    fn leaves_unknown_tokens_and_stray_braces() {
        assert_eq!(render("{unknown} {user", &ctx()), "{unknown} {user");
        assert_eq!(render("{{user}}", &ctx()), "{<@42>}");
    }

    #[test]
    fn does_not_rescan_substituted_values() {
        let mut context = ctx();
        context.user_name = "{server}";

        assert_eq!(render("{user.name}", &context), "{server}");
    }

    #[test]
    fn channel_placeholder_kept_without_channel() {
        let mut context = ctx();
        context.channel_id = None;

        assert_eq!(render("see {channel}", &context), "see {channel}");
    }

    #[test]
    fn detects_guild_placeholders() {
        assert!(needs_guild_summary("{membercount} members"));
        assert!(!needs_guild_summary("hello {user}"));
    }
}
