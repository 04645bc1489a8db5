/// Context toolset: information about the authenticated user. Always enabled.

use crate::core::translations::Translations;
use crate::tools::{ToolRegistry, Toolset, optional, output_schema, tool};

pub fn register(registry: &mut ToolRegistry, t: &mut Translations) {
    let mut toolset = Toolset::new(
        t,
        "context",
        "Tools that provide context about the current user and GitHub context you are operating in",
    )
    .with_tools(vec![tool(
        t,
        "get_me",
        "Get details of the authenticated GitHub user. Use this when a request includes \"me\", \"my\". The output will not change unless the user changes their profile, so only call this once.",
        true,
        &[optional("reason", "string", "Optional: reason the session was created")],
        output_schema("object", "Profile of the authenticated user"),
    )]);
    toolset.enabled = true;
    registry.register(toolset);
}
