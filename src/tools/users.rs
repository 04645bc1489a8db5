use crate::core::translations::Translations;
use crate::tools::{ToolRegistry, Toolset, optional, output_schema, required, tool};

pub fn register(registry: &mut ToolRegistry, t: &mut Translations) {
    let toolset = Toolset::new(t, "users", "GitHub User related tools").with_tools(vec![tool(
        t,
        "search_users",
        "Search for GitHub users",
        true,
        &[
            required("q", "string", "Search query using GitHub users search syntax"),
            optional("sort", "string", "Sort field by category (followers, repositories, joined)"),
            optional("order", "string", "Sort order (asc, desc)"),
            optional("page", "number", "Page number for pagination (min 1)"),
            optional("perPage", "number", "Results per page for pagination (min 1, max 100)"),
        ],
        output_schema("object", "Matching users with total count"),
    )]);
    registry.register(toolset);
}
