use crate::core::translations::Translations;
use crate::tools::{ToolRegistry, Toolset, optional, output_schema, required, tool};

pub fn register(registry: &mut ToolRegistry, t: &mut Translations) {
    let toolset = Toolset::new(t, "pull_requests", "GitHub Pull Request related tools")
        .with_tools(vec![
            tool(
                t,
                "get_pull_request",
                "Get details of a specific pull request in a GitHub repository.",
                true,
                &[
                    required("owner", "string", "Repository owner"),
                    required("repo", "string", "Repository name"),
                    required("pullNumber", "number", "Pull request number"),
                ],
                output_schema("object", "The pull request"),
            ),
            tool(
                t,
                "list_pull_requests",
                "List pull requests in a GitHub repository.",
                true,
                &[
                    required("owner", "string", "Repository owner"),
                    required("repo", "string", "Repository name"),
                    optional("state", "string", "Filter by state"),
                    optional("base", "string", "Filter by base branch"),
                    optional("page", "number", "Page number for pagination (min 1)"),
                    optional("perPage", "number", "Results per page for pagination (min 1, max 100)"),
                ],
                output_schema("array", "Pull requests"),
            ),
            tool(
                t,
                "get_pull_request_files",
                "Get the files changed in a specific pull request.",
                true,
                &[
                    required("owner", "string", "Repository owner"),
                    required("repo", "string", "Repository name"),
                    required("pullNumber", "number", "Pull request number"),
                ],
                output_schema("array", "Changed files"),
            ),
            tool(
                t,
                "get_pull_request_status",
                "Get the status of a specific pull request.",
                true,
                &[
                    required("owner", "string", "Repository owner"),
                    required("repo", "string", "Repository name"),
                    required("pullNumber", "number", "Pull request number"),
                ],
                output_schema("object", "Combined commit status"),
            ),
            tool(
                t,
                "create_pull_request",
                "Create a new pull request in a GitHub repository.",
                false,
                &[
                    required("owner", "string", "Repository owner"),
                    required("repo", "string", "Repository name"),
                    required("title", "string", "PR title"),
                    required("head", "string", "Branch containing changes"),
                    required("base", "string", "Branch to merge into"),
                    optional("body", "string", "PR description"),
                    optional("draft", "boolean", "Create as draft PR"),
                ],
                output_schema("object", "The created pull request"),
            ),
            tool(
                t,
                "merge_pull_request",
                "Merge a pull request in a GitHub repository.",
                false,
                &[
                    required("owner", "string", "Repository owner"),
                    required("repo", "string", "Repository name"),
                    required("pullNumber", "number", "Pull request number"),
                    optional("commit_title", "string", "Title for merge commit"),
                    optional("merge_method", "string", "Merge method"),
                ],
                output_schema("object", "The merge result"),
            ),
            tool(
                t,
                "update_pull_request_branch",
                "Update the branch of a pull request with the latest changes from the base branch.",
                false,
                &[
                    required("owner", "string", "Repository owner"),
                    required("repo", "string", "Repository name"),
                    required("pullNumber", "number", "Pull request number"),
                    optional("expectedHeadSha", "string", "The expected SHA of the pull request's HEAD ref"),
                ],
                output_schema("object", "The update result"),
            ),
        ]);
    registry.register(toolset);
}
