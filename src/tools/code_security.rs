use crate::core::translations::Translations;
use crate::tools::{ToolRegistry, Toolset, optional, output_schema, required, tool};

pub fn register(registry: &mut ToolRegistry, t: &mut Translations) {
    let toolset = Toolset::new(
        t,
        "code_security",
        "Code security related tools, such as GitHub Code Scanning",
    )
    .with_tools(vec![
        tool(
            t,
            "get_code_scanning_alert",
            "Get details of a specific code scanning alert in a GitHub repository.",
            true,
            &[
                required("owner", "string", "The owner of the repository."),
                required("repo", "string", "The name of the repository."),
                required("alertNumber", "number", "The number of the alert."),
            ],
            output_schema("object", "The code scanning alert"),
        ),
        tool(
            t,
            "list_code_scanning_alerts",
            "List code scanning alerts in a GitHub repository.",
            true,
            &[
                required("owner", "string", "The owner of the repository."),
                required("repo", "string", "The name of the repository."),
                optional("ref", "string", "The Git reference for the results you want to list."),
                optional("state", "string", "State of the code scanning alerts to list."),
                optional("severity", "string", "Only code scanning alerts with this severity will be returned."),
            ],
            output_schema("array", "Code scanning alerts"),
        ),
    ]);
    registry.register(toolset);
}
