use crate::core::translations::Translations;
use crate::tools::{ToolRegistry, Toolset, optional, output_schema, required, tool};

pub fn register(registry: &mut ToolRegistry, t: &mut Translations) {
    let toolset = Toolset::new(t, "repos", "GitHub Repository related tools").with_tools(vec![
        tool(
            t,
            "search_repositories",
            "Search for GitHub repositories",
            true,
            &[
                required("query", "string", "Search query"),
                optional("page", "number", "Page number for pagination (min 1)"),
                optional("perPage", "number", "Results per page for pagination (min 1, max 100)"),
            ],
            output_schema("object", "Matching repositories with total count"),
        ),
        tool(
            t,
            "get_file_contents",
            "Get the contents of a file or directory from a GitHub repository",
            true,
            &[
                required("owner", "string", "Repository owner (username or organization)"),
                required("repo", "string", "Repository name"),
                required("path", "string", "Path to file/directory"),
                optional("branch", "string", "Branch to get contents from"),
            ],
            output_schema("object", "File content or directory listing"),
        ),
        tool(
            t,
            "list_branches",
            "List branches in a GitHub repository",
            true,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                optional("page", "number", "Page number for pagination (min 1)"),
                optional("perPage", "number", "Results per page for pagination (min 1, max 100)"),
            ],
            output_schema("array", "Branches"),
        ),
        tool(
            t,
            "list_commits",
            "Get list of commits of a branch in a GitHub repository",
            true,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                optional("sha", "string", "Branch name"),
                optional("page", "number", "Page number for pagination (min 1)"),
                optional("perPage", "number", "Results per page for pagination (min 1, max 100)"),
            ],
            output_schema("array", "Commits"),
        ),
        tool(
            t,
            "create_or_update_file",
            "Create or update a single file in a GitHub repository. If updating, you must provide the SHA of the file you want to update.",
            false,
            &[
                required("owner", "string", "Repository owner (username or organization)"),
                required("repo", "string", "Repository name"),
                required("path", "string", "Path where to create/update the file"),
                required("content", "string", "Content of the file"),
                required("message", "string", "Commit message"),
                required("branch", "string", "Branch to create/update the file in"),
                optional("sha", "string", "SHA of file being replaced (for updates)"),
            ],
            output_schema("object", "The commit and resulting file"),
        ),
        tool(
            t,
            "create_repository",
            "Create a new GitHub repository in your account",
            false,
            &[
                required("name", "string", "Repository name"),
                optional("description", "string", "Repository description"),
                optional("private", "boolean", "Whether repo should be private"),
                optional("autoInit", "boolean", "Initialize with README"),
            ],
            output_schema("object", "The created repository"),
        ),
        tool(
            t,
            "create_branch",
            "Create a new branch in a GitHub repository",
            false,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                required("branch", "string", "Name for new branch"),
                optional("from_branch", "string", "Source branch (defaults to repo default)"),
            ],
            output_schema("object", "The created reference"),
        ),
        tool(
            t,
            "fork_repository",
            "Fork a GitHub repository to your account or specified organization",
            false,
            &[
                required("owner", "string", "Repository owner"),
                required("repo", "string", "Repository name"),
                optional("organization", "string", "Organization to fork to"),
            ],
            output_schema("object", "The forked repository"),
        ),
    ]);
    registry.register(toolset);
}
