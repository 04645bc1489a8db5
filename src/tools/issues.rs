use crate::core::translations::Translations;
use crate::tools::{ToolRegistry, Toolset, optional, output_schema, required, tool};

pub fn register(registry: &mut ToolRegistry, t: &mut Translations) {
    let toolset = Toolset::new(t, "issues", "GitHub Issues related tools").with_tools(vec![
        tool(
            t,
            "get_issue",
            "Get details of a specific issue in a GitHub repository.",
            true,
            &[
                required("owner", "string", "The owner of the repository"),
                required("repo", "string", "The name of the repository"),
                required("issue_number", "number", "The number of the issue"),
            ],
            output_schema("object", "The issue"),
        ),
        tool(
            t,
            "search_issues",
            "Search for issues in GitHub repositories.",
            true,
            &[
                required("q", "string", "Search query using GitHub issues search syntax"),
                optional("sort", "string", "Sort field by number of matches of categories"),
                optional("order", "string", "Sort order"),
                optional("page", "number", "Page number for pagination (min 1)"),
                optional("perPage", "number", "Results per page for pagination (min 1, max 100)"),
            ],
            output_schema("object", "Matching issues with total count"),
        ),
        tool(
            t,
            "list_issues",
            "List issues in a GitHub repository.",
            true,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                optional("state", "string", "Filter by state"),
                optional("labels", "array", "Filter by labels"),
                optional("page", "number", "Page number for pagination (min 1)"),
                optional("perPage", "number", "Results per page for pagination (min 1, max 100)"),
            ],
            output_schema("array", "Issues"),
        ),
        tool(
            t,
            "get_issue_comments",
            "Get comments for a specific issue in a GitHub repository.",
            true,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                required("issue_number", "number", "Issue number"),
            ],
            output_schema("array", "Issue comments"),
        ),
        tool(
            t,
            "create_issue",
            "Create a new issue in a GitHub repository.",
            false,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                required("title", "string", "Issue title"),
                optional("body", "string", "Issue body content"),
                optional("assignees", "array", "Usernames to assign to this issue"),
                optional("labels", "array", "Labels to apply to this issue"),
            ],
            output_schema("object", "The created issue"),
        ),
        tool(
            t,
            "add_issue_comment",
            "Add a comment to a specific issue in a GitHub repository.",
            false,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                required("issue_number", "number", "Issue number to comment on"),
                required("body", "string", "Comment content"),
            ],
            output_schema("object", "The created comment"),
        ),
        tool(
            t,
            "update_issue",
            "Update an existing issue in a GitHub repository.",
            false,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                required("issue_number", "number", "Issue number to update"),
                optional("title", "string", "New title"),
                optional("body", "string", "New description"),
                optional("state", "string", "New state"),
            ],
            output_schema("object", "The updated issue"),
        ),
    ]);
    registry.register(toolset);
}
